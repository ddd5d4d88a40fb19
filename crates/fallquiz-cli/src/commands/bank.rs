use std::path::PathBuf;

use clap::Subcommand;
use fallquiz_core::QuestionBank;

#[derive(Subcommand)]
pub enum BankAction {
    /// Load and validate a question bank (TOML, or JSON by extension)
    Check {
        /// Bank file
        file: PathBuf,
    },
}

pub fn run(action: BankAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        BankAction::Check { file } => {
            let bank = QuestionBank::load(&file)?;
            let mut selections = 0;
            for (subject, category, stage, count) in bank.selections() {
                println!("{subject}/{category}/{stage}: {count}");
                selections += 1;
            }
            println!("{} questions in {selections} selections", bank.len());
        }
    }
    Ok(())
}

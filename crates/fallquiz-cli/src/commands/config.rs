use std::path::PathBuf;

use clap::Subcommand;
use fallquiz_core::SessionConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective config as TOML
    Show {
        /// Config file to load (defaults are used when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Get a single config value
    Get {
        /// Config key (e.g. "base_fall_ms", "speed")
        key: String,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub fn load(path: Option<&PathBuf>) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(SessionConfig::load(path)?),
        None => Ok(SessionConfig::default()),
    }
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show { config } => {
            let config = load(config.as_ref())?;
            print!("{}", config.to_toml_string()?);
            println!("# fall_duration_ms = {}", config.fall_duration_ms());
        }
        ConfigAction::Get { key, config } => {
            let config = load(config.as_ref())?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
    }
    Ok(())
}

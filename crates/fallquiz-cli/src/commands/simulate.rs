//! Headless session run with a scripted player.
//!
//! Time is driven by a `ManualClock`, so with `--seed` the whole run,
//! event stream included, is reproducible.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use fallquiz_core::{
    Event, ManualClock, NullSink, Question, QuestionBank, QuestionSource, SessionController,
    SessionMode, SessionState,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;

/// Clock step while waiting on the player or the feedback display.
const STEP_MS: u64 = 100;

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Finite,
    Infinite,
}

impl From<ModeArg> for SessionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Finite => SessionMode::Finite,
            ModeArg::Infinite => SessionMode::Infinite,
        }
    }
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Question bank file
    #[arg(long)]
    bank: PathBuf,
    /// Subject to play (first in the bank when omitted)
    #[arg(long)]
    subject: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    stage: Option<u32>,
    /// Session config file
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "finite")]
    mode: ModeArg,
    /// Seed for the session and the player
    #[arg(long)]
    seed: Option<u64>,
    /// Probability that the player picks the correct option
    #[arg(long, default_value = "0.8")]
    accuracy: f64,
    /// How long the player takes to answer
    #[arg(long, default_value = "1000")]
    reaction_ms: u64,
    /// Abandon after this many resolved questions. Required in infinite mode.
    #[arg(long)]
    max_questions: Option<usize>,
    /// Print every event as a JSON line before the summary
    #[arg(long)]
    events: bool,
}

/// Answers after a fixed reaction time, correctly with probability
/// `accuracy`, otherwise picks a random enabled wrong option.
struct ScriptedPlayer {
    rng: Mcg128Xsl64,
    accuracy: f64,
    reaction_ms: u64,
}

impl ScriptedPlayer {
    fn choose(&mut self, question: &Question, disabled: &[usize]) -> usize {
        if self.rng.gen_bool(self.accuracy) {
            return question.correct_index;
        }
        let wrong: Vec<usize> = (0..question.options.len())
            .filter(|i| *i != question.correct_index && !disabled.contains(i))
            .collect();
        if wrong.is_empty() {
            return question.correct_index;
        }
        wrong[self.rng.gen_range(0..wrong.len())]
    }
}

fn pick_selection(
    bank: &QuestionBank,
    args: &SimulateArgs,
) -> Result<(String, String, u32), Box<dyn std::error::Error>> {
    bank.selections()
        .find(|(subject, category, stage, _)| {
            args.subject.as_deref().map_or(true, |s| s == *subject)
                && args.category.as_deref().map_or(true, |c| c == *category)
                && args.stage.map_or(true, |st| st == *stage)
        })
        .map(|(subject, category, stage, _)| (subject.to_string(), category.to_string(), stage))
        .ok_or_else(|| "no questions match the requested selection".into())
}

fn emit(events: Vec<Event>, print: bool) -> Result<(), Box<dyn std::error::Error>> {
    if print {
        for event in events {
            println!("{}", serde_json::to_string(&event)?);
        }
    }
    Ok(())
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&args.accuracy) {
        return Err(format!("accuracy must be between 0 and 1, got {}", args.accuracy).into());
    }
    if matches!(args.mode, ModeArg::Infinite) && args.max_questions.is_none() {
        return Err("--max-questions is required in infinite mode".into());
    }

    let bank = QuestionBank::load(&args.bank)?;
    let (subject, category, stage) = pick_selection(&bank, &args)?;
    let mut config = super::config::load(args.config.as_ref())?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let feedback_delay_ms = config.feedback_delay_ms;

    let mut player = ScriptedPlayer {
        rng: match args.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed.wrapping_add(1)),
            None => Mcg128Xsl64::from_entropy(),
        },
        accuracy: args.accuracy,
        reaction_ms: args.reaction_ms,
    };

    tracing::info!(%subject, %category, stage, "simulating session");
    let questions = bank.fetch_questions(&subject, &category, stage)?;
    let clock = ManualClock::new();
    let mut ctl = SessionController::new(Box::new(clock.clone()), Box::new(NullSink));
    ctl.start(questions, args.mode.into(), config)?;
    emit(ctl.drain_events(), args.events)?;

    let mut resolved = 0usize;
    loop {
        match ctl.state() {
            SessionState::Playing => {
                if args.max_questions.is_some_and(|max| resolved >= max) {
                    ctl.abandon();
                } else {
                    let mut waited = 0;
                    while waited < player.reaction_ms && ctl.state() == SessionState::Playing {
                        let step = STEP_MS.min(player.reaction_ms - waited);
                        clock.advance(step);
                        waited += step;
                        ctl.tick();
                    }
                    if ctl.state() == SessionState::Playing {
                        let choice = match ctl.current_question() {
                            Some(question) => {
                                let disabled = ctl
                                    .powerups()
                                    .map(|p| p.disabled_options.clone())
                                    .unwrap_or_default();
                                player.choose(question, &disabled)
                            }
                            None => 0,
                        };
                        ctl.answer(choice);
                    }
                    resolved += 1;
                }
            }
            SessionState::Feedback => {
                clock.advance(STEP_MS.min(feedback_delay_ms.max(1)));
                ctl.tick();
            }
            _ => break,
        }
        emit(ctl.drain_events(), args.events)?;
    }

    let summary = ctl
        .summary()
        .ok_or("session ended without a summary")?;
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

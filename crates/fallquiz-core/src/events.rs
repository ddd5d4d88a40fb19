use serde::{Deserialize, Serialize};

use crate::question::Question;
use crate::report::SessionSummary;

/// Every observable change in a session produces an Event.
/// The presentation layer drains them from the controller after each call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A new question started falling.
    QuestionChanged {
        /// Position of this question instance within the run.
        index: usize,
        question: Question,
    },
    /// Fall position, 0.0 (top) to 1.0 (deadline). Only sent on change.
    PositionUpdated { position: f64 },
    FeedbackShown {
        correct: bool,
        message: String,
        points_awarded: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        explanation: Option<String>,
    },
    ScoreChanged { score: u64, delta: u64 },
    LifeChanged { lives: u32 },
    PowerupChanged {
        freeze_charges: u32,
        bomb_charges: u32,
        frozen: bool,
        disabled_options: Vec<usize>,
    },
    StreakChanged {
        active: bool,
        count: u32,
        multiplier: u32,
    },
    SessionPaused,
    SessionResumed,
    SessionEnded { summary: SessionSummary },
}

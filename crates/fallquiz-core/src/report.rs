//! End-of-session results and where they go.
//!
//! The controller hands a [`SessionSummary`] to its [`ProgressSink`] exactly
//! once, on entering results. Reporting is fire-and-forget: the sink returns
//! nothing and the engine never waits on or retries it.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::session::{AnsweredRecord, SessionMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub score: u64,
    pub correct_answers: Vec<AnsweredRecord>,
    pub wrong_answers: Vec<AnsweredRecord>,
    /// False when the session ended on lives or was abandoned.
    pub completed: bool,
    pub mode: SessionMode,
    pub best_multiplier: u32,
    pub lives_remaining: u32,
    pub questions_resolved: usize,
}

impl SessionSummary {
    /// Fraction of resolved questions answered correctly.
    pub fn accuracy(&self) -> f64 {
        if self.questions_resolved == 0 {
            return 0.0;
        }
        self.correct_answers.len() as f64 / self.questions_resolved as f64
    }
}

/// Receives the session result.
pub trait ProgressSink {
    fn report_session_result(&self, summary: &SessionSummary);
}

/// Discards results.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report_session_result(&self, _summary: &SessionSummary) {}
}

/// Keeps every reported result in memory. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    results: Arc<Mutex<Vec<SessionSummary>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> Vec<SessionSummary> {
        match self.results.lock() {
            Ok(results) => results.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.results().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProgressSink for MemorySink {
    fn report_session_result(&self, summary: &SessionSummary) {
        match self.results.lock() {
            Ok(mut results) => results.push(summary.clone()),
            Err(poisoned) => poisoned.into_inner().push(summary.clone()),
        }
    }
}

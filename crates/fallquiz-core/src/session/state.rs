use serde::{Deserialize, Serialize};

/// Session phase. Mutated only by the controller.
///
/// ```text
/// Menu -> Playing <-> Paused
///           |  ^
///           v  |
///         Feedback -> Results
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Menu,
    Playing,
    Paused,
    Feedback,
    Results,
}

impl SessionState {
    /// Whether a session exists and has not yet reached results.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            SessionState::Playing | SessionState::Paused | SessionState::Feedback
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Ends when the question list is exhausted.
    #[default]
    Finite,
    /// Replenishes its question pool as it depletes.
    Infinite,
}

mod controller;
mod fall_clock;
mod lives;
mod powerup;
mod score;
mod state;
mod streak;

pub use controller::{SessionController, SessionSnapshot};
pub use fall_clock::{FallClock, FallTick};
pub use lives::LifeTracker;
pub use powerup::{PowerupBank, PowerupState, BOMB_TARGETS};
pub use score::{calculate_points, AnsweredRecord, ScoreKeeper, ScoreState};
pub use state::{SessionMode, SessionState};
pub use streak::{StreakEngine, StreakState};

//! # Fallquiz Core Library
//!
//! Session engine for a timed, single-player quiz: each question falls
//! toward a deadline and the player has to pick an answer before it lands.
//! The library is a pure in-memory simulation with no I/O inside a session;
//! presenters, question storage and result persistence sit outside it.
//!
//! ## Architecture
//!
//! - **Session Controller**: the state machine and sole entry point for
//!   input. It requires the caller to periodically invoke `tick()`; every
//!   timer is advanced from that call using an injected [`Clock`]
//! - **Fall Clock**: fall position from accumulated elapsed time
//! - **Streak Engine**: fast-answer multiplier with its own countdown
//! - **Powerup Bank**: freeze and bomb charges
//! - **Score Keeper / Life Tracker**: points, answer log and lives
//!
//! ## Key Components
//!
//! - [`SessionController`]: Core session state machine
//! - [`SessionConfig`]: TOML-loadable tuning
//! - [`Event`]: Everything a presenter needs to render
//! - [`QuestionSource`] / [`ProgressSink`]: External collaborators

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod question;
pub mod report;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{SessionConfig, SpeedProfile};
pub use error::{ConfigError, CoreError, Result};
pub use events::Event;
pub use question::{Question, QuestionBank, QuestionSet, QuestionSource};
pub use report::{MemorySink, NullSink, ProgressSink, SessionSummary};
pub use session::{
    AnsweredRecord, SessionController, SessionMode, SessionSnapshot, SessionState, StreakState,
};

//! Session controller.
//!
//! The controller owns the state machine and every per-session component.
//! It has no internal threads or callbacks: the caller invokes [`tick`]
//! periodically and every timer (fall, streak countdown, freeze, feedback
//! delay) is advanced from that single pump by the time elapsed since the
//! previous reading. A timer only receives time while its phase is active,
//! so leaving a phase can never leave a stale callback behind.
//!
//! ## State Transitions
//!
//! ```text
//! Menu -> Playing -> Feedback -> Playing ... -> Results
//!           ^  |
//!           |  v
//!          Paused
//! ```
//!
//! Every input is guarded by the current state. Calls that arrive in the
//! wrong state (late clicks, double taps, a miss racing an answer) are
//! ignored and return `false`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut ctl = SessionController::new(Box::new(SystemClock::new()), Box::new(NullSink));
//! ctl.start(questions, SessionMode::Finite, SessionConfig::default())?;
//! // In a loop:
//! ctl.tick();
//! for event in ctl.drain_events() { /* render */ }
//! ```
//!
//! [`tick`]: SessionController::tick

use std::collections::VecDeque;

use rand::{RngCore, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use super::fall_clock::FallClock;
use super::lives::LifeTracker;
use super::powerup::{PowerupBank, PowerupState};
use super::score::ScoreKeeper;
use super::state::{SessionMode, SessionState};
use super::streak::{StreakEngine, StreakState};
use crate::clock::Clock;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::events::Event;
use crate::question::{Question, QuestionSet, QuestionSource};
use crate::report::{ProgressSink, SessionSummary};

/// Serializable view of a session for presenters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub mode: Option<SessionMode>,
    pub question_index: Option<usize>,
    pub position: f64,
    pub score: u64,
    pub lives: u32,
    pub streak: Option<StreakState>,
    pub powerups: Option<PowerupState>,
}

/// Everything created at `start()` and discarded on return to the menu.
struct Session {
    config: SessionConfig,
    questions: QuestionSet,
    fall: FallClock,
    streak: StreakEngine,
    powerups: PowerupBank,
    score: ScoreKeeper,
    lives: LifeTracker,
    /// Reading at which timers were last advanced.
    last_tick_ms: u64,
    last_position: f64,
    /// Display delay of the Feedback phase.
    feedback_remaining_ms: Option<u64>,
    /// Cursor of the most recently resolved question instance.
    resolved_instance: Option<usize>,
    resolved_count: usize,
    summary: Option<SessionSummary>,
}

impl Session {
    fn take_delta(&mut self, now_ms: u64) -> u64 {
        let delta = now_ms.saturating_sub(self.last_tick_ms);
        self.last_tick_ms = self.last_tick_ms.max(now_ms);
        delta
    }

    fn powerup_event(&self) -> Event {
        let state = self.powerups.state();
        Event::PowerupChanged {
            freeze_charges: state.freeze_charges,
            bomb_charges: state.bomb_charges,
            frozen: state.frozen,
            disabled_options: state.disabled_options.clone(),
        }
    }

    fn streak_event(&self) -> Event {
        let state = self.streak.state();
        Event::StreakChanged {
            active: state.active,
            count: state.count,
            multiplier: state.multiplier,
        }
    }
}

pub struct SessionController {
    clock: Box<dyn Clock>,
    rng: Box<dyn RngCore>,
    sink: Box<dyn ProgressSink>,
    state: SessionState,
    session: Option<Session>,
    events: VecDeque<Event>,
}

impl SessionController {
    /// Create a controller in the `Menu` state with an entropy-seeded
    /// random source.
    pub fn new(clock: Box<dyn Clock>, sink: Box<dyn ProgressSink>) -> Self {
        Self {
            clock,
            rng: Box::new(Mcg128Xsl64::from_entropy()),
            sink,
            state: SessionState::Menu,
            session: None,
            events: VecDeque::new(),
        }
    }

    /// Replace the random source used for option shuffling, bomb targets
    /// and replenishment. A `seed` in the session config overrides it.
    pub fn with_rng(mut self, rng: Box<dyn RngCore>) -> Self {
        self.rng = rng;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> Option<SessionMode> {
        self.session.as_ref().map(|s| s.questions.mode())
    }

    pub fn config(&self) -> Option<&SessionConfig> {
        self.session.as_ref().map(|s| &s.config)
    }

    /// The question currently falling or being shown feedback for.
    pub fn current_question(&self) -> Option<&Question> {
        if !self.state.is_live() {
            return None;
        }
        self.session.as_ref()?.questions.current()
    }

    pub fn question_index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.questions.cursor())
    }

    /// Fall position as of the last tick.
    pub fn position(&self) -> f64 {
        self.session
            .as_ref()
            .map(|s| s.fall.position())
            .unwrap_or(0.0)
    }

    pub fn score(&self) -> u64 {
        self.session.as_ref().map(|s| s.score.score()).unwrap_or(0)
    }

    pub fn lives(&self) -> u32 {
        self.session.as_ref().map(|s| s.lives.lives()).unwrap_or(0)
    }

    pub fn streak(&self) -> Option<&StreakState> {
        self.session.as_ref().map(|s| s.streak.state())
    }

    pub fn powerups(&self) -> Option<&PowerupState> {
        self.session.as_ref().map(|s| s.powerups.state())
    }

    pub fn is_frozen(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.powerups.is_frozen())
    }

    /// The final result, once the session reached `Results`.
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.session.as_ref()?.summary.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            mode: self.mode(),
            question_index: self.question_index(),
            position: self.position(),
            score: self.score(),
            lives: self.lives(),
            streak: self.streak().copied(),
            powerups: self.powerups().cloned(),
        }
    }

    /// Take every event produced since the previous drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a session from `Menu` (or from `Results` for a replay).
    ///
    /// Calling this while a session is live is ignored.
    ///
    /// # Errors
    ///
    /// `EmptyQuestionSet` or `InvalidQuestion` for unusable questions and
    /// `Config` for an invalid config. No session is created on error.
    pub fn start(
        &mut self,
        questions: Vec<Question>,
        mode: SessionMode,
        config: SessionConfig,
    ) -> Result<()> {
        if self.state.is_live() {
            tracing::debug!(state = ?self.state, "start ignored: session already live");
            return Ok(());
        }
        config.validate()?;
        if let Some(seed) = config.seed {
            self.rng = Box::new(Mcg128Xsl64::seed_from_u64(seed));
        }
        let mut questions = QuestionSet::new(questions, mode, config.replenish_threshold)?;
        if config.shuffle_options {
            questions.shuffle_options(self.rng.as_mut());
        }

        let now = self.clock.now_ms();
        let mut fall = FallClock::new(config.fall_duration_ms());
        fall.reset(now);

        tracing::info!(
            ?mode,
            questions = questions.len(),
            fall_ms = fall.duration_ms(),
            "session started"
        );

        let session = Session {
            streak: StreakEngine::new(
                config.streak_window_ms,
                config.streak_tick_ms,
                config.max_multiplier,
            ),
            powerups: PowerupBank::new(
                config.freeze_charges,
                config.bomb_charges,
                config.freeze_duration_ms,
            ),
            score: ScoreKeeper::new(config.base_points, config.golden_points),
            lives: LifeTracker::new(config.lives_for(mode)),
            questions,
            fall,
            last_tick_ms: now,
            last_position: 0.0,
            feedback_remaining_ms: None,
            resolved_instance: None,
            resolved_count: 0,
            summary: None,
            config,
        };
        self.events.push_back(Event::LifeChanged {
            lives: session.lives.lives(),
        });
        self.events.push_back(session.powerup_event());
        self.session = Some(session);
        self.state = SessionState::Playing;
        self.emit_question_changed();
        Ok(())
    }

    /// Fetch questions from `source` and start.
    pub fn start_from_source(
        &mut self,
        source: &dyn QuestionSource,
        subject: &str,
        category: &str,
        stage: u32,
        mode: SessionMode,
        config: SessionConfig,
    ) -> Result<()> {
        let questions = source.fetch_questions(subject, category, stage)?;
        self.start(questions, mode, config)
    }

    /// Advance every live timer to the clock's current reading.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        match self.state {
            SessionState::Playing => self.pump_playing(now),
            SessionState::Feedback => self.pump_feedback(now),
            _ => {}
        }
    }

    /// Answer the current question.
    ///
    /// Ignored unless playing, the option exists and is not disabled, and
    /// the question has not been resolved yet. Timers are brought up to
    /// date first, so an answer arriving after the deadline loses to the
    /// miss.
    pub fn answer(&mut self, option_index: usize) -> bool {
        if self.state != SessionState::Playing {
            tracing::debug!(state = ?self.state, option_index, "answer ignored");
            return false;
        }
        self.tick();
        if self.state != SessionState::Playing {
            return false;
        }
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        let Some(question) = session.questions.current() else {
            return false;
        };
        if option_index >= question.options.len() || session.powerups.is_disabled(option_index) {
            tracing::debug!(option_index, "answer ignored: option unavailable");
            return false;
        }
        self.resolve(Some(option_index))
    }

    /// Resolve the current question as missed. Normally driven by `tick`.
    pub fn miss(&mut self) -> bool {
        if self.state != SessionState::Playing {
            return false;
        }
        self.resolve(None)
    }

    pub fn pause(&mut self) -> bool {
        if self.state != SessionState::Playing {
            tracing::debug!(state = ?self.state, "pause ignored");
            return false;
        }
        self.tick();
        if self.state != SessionState::Playing {
            return false;
        }
        let now = self.clock.now_ms();
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.fall.pause(now);
        self.state = SessionState::Paused;
        self.events.push_back(Event::SessionPaused);
        tracing::debug!("session paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != SessionState::Paused {
            tracing::debug!(state = ?self.state, "resume ignored");
            return false;
        }
        let now = self.clock.now_ms();
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.fall.resume(now);
        // Paused time is dropped for every timer, not only the fall.
        session.last_tick_ms = now;
        self.state = SessionState::Playing;
        self.events.push_back(Event::SessionResumed);
        tracing::debug!("session resumed");
        true
    }

    pub fn use_freeze(&mut self) -> bool {
        if self.state != SessionState::Playing {
            tracing::debug!(state = ?self.state, "freeze ignored");
            return false;
        }
        self.tick();
        if self.state != SessionState::Playing {
            return false;
        }
        let now = self.clock.now_ms();
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !session.powerups.use_freeze() {
            tracing::debug!("freeze unavailable");
            return false;
        }
        session.fall.freeze(now);
        self.events.push_back(session.powerup_event());
        tracing::debug!(position = session.fall.position(), "freeze used");
        true
    }

    pub fn use_bomb(&mut self) -> bool {
        if self.state != SessionState::Playing {
            tracing::debug!(state = ?self.state, "bomb ignored");
            return false;
        }
        self.tick();
        if self.state != SessionState::Playing {
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(targets) = session
            .powerups
            .use_bomb(session.questions.current(), self.rng.as_mut())
        else {
            tracing::debug!("bomb unavailable");
            return false;
        };
        self.events.push_back(session.powerup_event());
        tracing::debug!(?targets, "bomb used");
        true
    }

    /// Leave the feedback display and show the next question, or results.
    ///
    /// Runs automatically once the feedback delay has elapsed.
    pub fn advance(&mut self) -> bool {
        if self.state != SessionState::Feedback {
            tracing::debug!(state = ?self.state, "advance ignored");
            return false;
        }
        let now = self.clock.now_ms();
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.feedback_remaining_ms = None;
        if session.lives.is_depleted() {
            self.finish(false);
            return true;
        }
        if !session.questions.advance(self.rng.as_mut()) {
            self.finish(true);
            return true;
        }
        session.fall.reset(now);
        session.last_tick_ms = now;
        session.last_position = 0.0;
        if session.powerups.clear_disabled() {
            self.events.push_back(session.powerup_event());
        }
        self.state = SessionState::Playing;
        self.emit_question_changed();
        true
    }

    /// End a live session early. Reported as not completed.
    pub fn abandon(&mut self) -> bool {
        if !self.state.is_live() {
            return false;
        }
        tracing::debug!(state = ?self.state, "session abandoned");
        self.finish(false);
        true
    }

    /// Discard a finished session and go back to the menu.
    pub fn return_to_menu(&mut self) -> bool {
        if self.state != SessionState::Results {
            return false;
        }
        self.session = None;
        self.state = SessionState::Menu;
        true
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn pump_playing(&mut self, now: u64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let from = session.last_tick_ms;
        let delta = session.take_delta(now);

        // Freeze expiry is handled before the fall so that only the part
        // of this delta after expiry moves the question.
        if let Some(offset) = session.powerups.advance(delta) {
            session.fall.unfreeze(from + offset);
            self.events.push_back(session.powerup_event());
            tracing::debug!("freeze expired");
        }

        let tick = session.fall.tick(now);
        if tick.position != session.last_position {
            session.last_position = tick.position;
            self.events.push_back(Event::PositionUpdated {
                position: tick.position,
            });
        }
        if tick.missed {
            self.resolve(None);
            return;
        }

        if session.streak.advance(delta) {
            self.events.push_back(session.streak_event());
        }
        tracing::trace!(delta, position = tick.position, "tick");
    }

    fn pump_feedback(&mut self, now: u64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let delta = session.take_delta(now);
        let due = match session.feedback_remaining_ms.as_mut() {
            Some(remaining) => {
                *remaining = remaining.saturating_sub(delta);
                *remaining == 0
            }
            None => false,
        };
        if due {
            self.advance();
        }
    }

    /// Resolve the current question instance once. `None` means missed.
    fn resolve(&mut self, chosen: Option<usize>) -> bool {
        let now = self.clock.now_ms();
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(question) = session.questions.current().cloned() else {
            return false;
        };
        let instance = session.questions.cursor();
        if session.resolved_instance == Some(instance) {
            return false;
        }
        session.resolved_instance = Some(instance);
        session.resolved_count += 1;

        let correct = chosen.is_some_and(|i| question.is_correct(i));
        let in_reward_zone = chosen.is_some() && session.fall.in_reward_zone();
        session.fall.stop(now);

        if session.streak.update(correct, in_reward_zone) {
            self.events.push_back(session.streak_event());
        }
        let multiplier = session.streak.multiplier();
        let points = session.score.apply(&question, chosen, correct, multiplier);
        if !correct {
            session.lives.decrement();
            self.events.push_back(Event::LifeChanged {
                lives: session.lives.lives(),
            });
        }

        let froze = session.powerups.cancel_freeze();
        let cleared = session.powerups.clear_disabled();
        if froze || cleared {
            self.events.push_back(session.powerup_event());
        }

        tracing::debug!(
            question = %question.id,
            ?chosen,
            correct,
            points,
            multiplier,
            "question resolved"
        );
        self.events.push_back(Event::FeedbackShown {
            correct,
            message: feedback_message(&question, chosen, correct),
            points_awarded: points,
            explanation: question.explanation.clone(),
        });
        if points > 0 {
            self.events.push_back(Event::ScoreChanged {
                score: session.score.score(),
                delta: points,
            });
        }

        session.feedback_remaining_ms = Some(session.config.feedback_delay_ms);
        self.state = SessionState::Feedback;
        true
    }

    fn finish(&mut self, completed: bool) {
        let now = self.clock.now_ms();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.summary.is_some() {
            return;
        }
        session.fall.stop(now);
        session.powerups.cancel_freeze();
        session.feedback_remaining_ms = None;

        let score = session.score.state();
        let summary = SessionSummary {
            score: score.score,
            correct_answers: score.correct_answers.clone(),
            wrong_answers: score.wrong_answers.clone(),
            completed,
            mode: session.questions.mode(),
            best_multiplier: session.streak.best_multiplier(),
            lives_remaining: session.lives.lives(),
            questions_resolved: session.resolved_count,
        };
        session.summary = Some(summary.clone());
        self.state = SessionState::Results;

        tracing::info!(
            score = summary.score,
            completed,
            correct = summary.correct_answers.len(),
            wrong = summary.wrong_answers.len(),
            "session ended"
        );
        self.sink.report_session_result(&summary);
        self.events.push_back(Event::SessionEnded { summary });
    }

    fn emit_question_changed(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(question) = session.questions.current() else {
            return;
        };
        self.events.push_back(Event::QuestionChanged {
            index: session.questions.cursor(),
            question: question.clone(),
        });
        self.events
            .push_back(Event::PositionUpdated { position: 0.0 });
    }
}

fn feedback_message(question: &Question, chosen: Option<usize>, correct: bool) -> String {
    match (chosen, correct) {
        (_, true) => "Correct!".to_string(),
        (None, false) => format!("Time's up! The answer was: {}", question.correct_option()),
        (Some(_), false) => format!("Wrong! The answer was: {}", question.correct_option()),
    }
}

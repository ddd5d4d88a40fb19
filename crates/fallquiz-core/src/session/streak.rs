//! Consecutive-fast-answer multiplier with its own countdown.
//!
//! The multiplier only grows on correct answers given in the reward zone
//! and only ever falls back by a full reset to 1. The countdown runs on a
//! fixed tick while the streak is active; when it runs out the streak
//! resets no matter what the player is doing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub active: bool,
    pub count: u32,
    pub multiplier: u32,
    pub time_remaining_ms: u64,
    pub window_ms: u64,
}

impl StreakState {
    fn idle(window_ms: u64) -> Self {
        Self {
            active: false,
            count: 0,
            multiplier: 1,
            time_remaining_ms: 0,
            window_ms,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StreakEngine {
    state: StreakState,
    max_multiplier: u32,
    tick_ms: u64,
    /// Milliseconds accumulated towards the next countdown tick.
    pending_ms: u64,
    best_multiplier: u32,
}

impl StreakEngine {
    pub fn new(window_ms: u64, tick_ms: u64, max_multiplier: u32) -> Self {
        Self {
            state: StreakState::idle(window_ms),
            max_multiplier: max_multiplier.max(1),
            tick_ms: tick_ms.max(1),
            pending_ms: 0,
            best_multiplier: 1,
        }
    }

    pub fn state(&self) -> &StreakState {
        &self.state
    }

    pub fn multiplier(&self) -> u32 {
        self.state.multiplier
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Highest multiplier reached since creation.
    pub fn best_multiplier(&self) -> u32 {
        self.best_multiplier
    }

    /// Apply a resolved answer. Returns whether the state changed.
    ///
    /// A correct answer outside the reward zone leaves an active streak
    /// untouched: the multiplier holds and the countdown keeps running
    /// without being refreshed.
    pub fn update(&mut self, correct: bool, in_reward_zone: bool) -> bool {
        let before = self.state;
        match (correct, in_reward_zone) {
            (false, _) => self.reset(),
            (true, true) => {
                self.state.multiplier = if self.state.active {
                    (self.state.multiplier + 1).min(self.max_multiplier)
                } else {
                    2.min(self.max_multiplier)
                };
                self.state.count += 1;
                self.state.active = true;
                self.state.time_remaining_ms = self.state.window_ms;
                self.pending_ms = 0;
                self.best_multiplier = self.best_multiplier.max(self.state.multiplier);
            }
            (true, false) => {}
        }
        self.state != before
    }

    /// Run the countdown for `delta_ms`. Returns `true` if the streak
    /// expired during this call.
    pub fn advance(&mut self, delta_ms: u64) -> bool {
        if !self.state.active {
            return false;
        }
        self.pending_ms = self.pending_ms.saturating_add(delta_ms);
        while self.pending_ms >= self.tick_ms {
            self.pending_ms -= self.tick_ms;
            self.state.time_remaining_ms = self.state.time_remaining_ms.saturating_sub(self.tick_ms);
            if self.state.time_remaining_ms == 0 {
                tracing::debug!(count = self.state.count, "streak window expired");
                self.reset();
                return true;
            }
        }
        false
    }

    pub fn reset(&mut self) {
        self.state = StreakState::idle(self.state.window_ms);
        self.pending_ms = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> StreakEngine {
        StreakEngine::new(1_000, 100, 4)
    }

    #[test]
    fn first_fast_answer_starts_at_two() {
        let mut streak = engine();
        assert!(streak.update(true, true));
        assert_eq!(streak.multiplier(), 2);
        assert!(streak.is_active());
        assert_eq!(streak.state().time_remaining_ms, 1_000);
    }

    #[test]
    fn multiplier_climbs_and_caps() {
        let mut streak = engine();
        let seen: Vec<u32> = (0..5)
            .map(|_| {
                streak.update(true, true);
                streak.multiplier()
            })
            .collect();
        assert_eq!(seen, vec![2, 3, 4, 4, 4]);
        assert_eq!(streak.state().count, 5);
        assert_eq!(streak.best_multiplier(), 4);
    }

    #[test]
    fn wrong_answer_resets() {
        let mut streak = engine();
        streak.update(true, true);
        streak.update(true, true);
        assert!(streak.update(false, true));
        assert_eq!(*streak.state(), StreakState::idle(1_000));
    }

    #[test]
    fn slow_correct_answer_does_not_start_streak() {
        let mut streak = engine();
        assert!(!streak.update(true, false));
        assert_eq!(streak.multiplier(), 1);
        assert!(!streak.is_active());
    }

    #[test]
    fn slow_correct_answer_holds_without_refresh() {
        let mut streak = engine();
        streak.update(true, true);
        streak.advance(400);
        assert!(!streak.update(true, false));
        assert_eq!(streak.multiplier(), 2);
        assert_eq!(streak.state().time_remaining_ms, 600);
    }

    #[test]
    fn countdown_moves_in_whole_ticks() {
        let mut streak = engine();
        streak.update(true, true);
        streak.advance(150);
        assert_eq!(streak.state().time_remaining_ms, 900);
        streak.advance(50);
        assert_eq!(streak.state().time_remaining_ms, 800);
    }

    #[test]
    fn countdown_expiry_resets() {
        let mut streak = engine();
        streak.update(true, true);
        streak.update(true, true);
        assert!(!streak.advance(999));
        assert!(streak.advance(1));
        assert_eq!(streak.multiplier(), 1);
        assert!(!streak.is_active());
        // Best survives a reset.
        assert_eq!(streak.best_multiplier(), 3);
    }

    #[test]
    fn inactive_streak_ignores_time() {
        let mut streak = engine();
        assert!(!streak.advance(10_000));
        assert_eq!(streak.state().time_remaining_ms, 0);
    }
}

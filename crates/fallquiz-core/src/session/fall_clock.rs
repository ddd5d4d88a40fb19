//! Fall progress for the current question.
//!
//! The clock accumulates elapsed milliseconds between readings instead of
//! remembering when the fall began. Pausing or freezing drops the anchor
//! reading; resuming sets a fresh one. Time spent paused or frozen is
//! therefore never counted, no matter how long it lasts.

/// Result of a single [`FallClock::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallTick {
    /// 0.0 at the top, 1.0 at the deadline.
    pub position: f64,
    /// True on exactly one tick: the first one at or past the deadline.
    pub missed: bool,
}

#[derive(Debug, Clone)]
pub struct FallClock {
    duration_ms: u64,
    elapsed_ms: u64,
    /// Reading at which elapsed time was last flushed.
    /// `Some` only while running, not paused and not frozen.
    anchor_ms: Option<u64>,
    running: bool,
    paused: bool,
    frozen: bool,
    missed: bool,
}

impl FallClock {
    /// Create a stopped clock. `duration_ms` is clamped to at least 1.
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms: duration_ms.max(1),
            elapsed_ms: 0,
            anchor_ms: None,
            running: false,
            paused: false,
            frozen: false,
            missed: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Position as of the last flush.
    pub fn position(&self) -> f64 {
        self.elapsed_ms as f64 / self.duration_ms as f64
    }

    /// Upper half of the path, strictly above the midpoint.
    pub fn in_reward_zone(&self) -> bool {
        self.position() < 0.5
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn has_missed(&self) -> bool {
        self.missed
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Zero the position, clear pause and freeze, and start falling.
    pub fn reset(&mut self, now_ms: u64) {
        self.elapsed_ms = 0;
        self.missed = false;
        self.paused = false;
        self.frozen = false;
        self.running = true;
        self.anchor_ms = None;
        self.sync_anchor(now_ms);
    }

    /// Stop counting; the position stays where it is.
    pub fn stop(&mut self, now_ms: u64) {
        self.flush(now_ms);
        self.running = false;
        self.sync_anchor(now_ms);
    }

    pub fn tick(&mut self, now_ms: u64) -> FallTick {
        self.flush(now_ms);
        let missed = if self.elapsed_ms >= self.duration_ms && !self.missed {
            self.missed = true;
            true
        } else {
            false
        };
        FallTick {
            position: self.position(),
            missed,
        }
    }

    pub fn pause(&mut self, now_ms: u64) {
        self.flush(now_ms);
        self.paused = true;
        self.sync_anchor(now_ms);
    }

    pub fn resume(&mut self, now_ms: u64) {
        self.flush(now_ms);
        self.paused = false;
        self.sync_anchor(now_ms);
    }

    pub fn freeze(&mut self, now_ms: u64) {
        self.flush(now_ms);
        self.frozen = true;
        self.sync_anchor(now_ms);
    }

    /// `at_ms` may lie before the latest reading when a freeze expired
    /// part-way through a tick; only time after it is counted.
    pub fn unfreeze(&mut self, at_ms: u64) {
        self.flush(at_ms);
        self.frozen = false;
        self.sync_anchor(at_ms);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush(&mut self, now_ms: u64) {
        if let Some(anchor) = self.anchor_ms {
            // Backwards readings count as zero and keep the anchor.
            if now_ms > anchor {
                let delta = now_ms - anchor;
                self.elapsed_ms = self.elapsed_ms.saturating_add(delta).min(self.duration_ms);
                self.anchor_ms = Some(now_ms);
            }
        }
    }

    fn sync_anchor(&mut self, now_ms: u64) {
        if self.running && !self.paused && !self.frozen {
            if self.anchor_ms.is_none() {
                self.anchor_ms = Some(now_ms);
            }
        } else {
            self.anchor_ms = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(duration: u64) -> FallClock {
        let mut clock = FallClock::new(duration);
        clock.reset(0);
        clock
    }

    #[test]
    fn position_tracks_elapsed_fraction() {
        let mut clock = running(1_000);
        assert_eq!(clock.tick(250).position, 0.25);
        assert_eq!(clock.tick(500).position, 0.5);
        assert!(!clock.in_reward_zone());
    }

    #[test]
    fn stopped_clock_does_not_move() {
        let mut clock = FallClock::new(1_000);
        assert_eq!(clock.tick(800).position, 0.0);
    }

    #[test]
    fn miss_fires_exactly_once() {
        let mut clock = running(1_000);
        assert!(!clock.tick(999).missed);
        assert!(clock.tick(1_000).missed);
        assert!(!clock.tick(1_500).missed);
        assert!(!clock.tick(5_000).missed);
        assert_eq!(clock.position(), 1.0);
        assert!(clock.has_missed());
    }

    #[test]
    fn long_pause_costs_nothing() {
        let mut clock = running(1_000);
        clock.tick(300);
        clock.pause(300);
        assert_eq!(clock.tick(100_000).position, 0.3);
        clock.resume(100_000);
        assert_eq!(clock.tick(100_200).position, 0.5);
    }

    #[test]
    fn pause_resume_without_time_is_lossless() {
        let mut clock = running(1_000);
        let before = clock.tick(420).position;
        clock.pause(420);
        clock.resume(420);
        assert_eq!(clock.tick(420).position, before);
    }

    #[test]
    fn frozen_position_is_constant() {
        let mut clock = running(1_000);
        clock.tick(600);
        clock.freeze(600);
        let a = clock.tick(700).position;
        let b = clock.tick(5_000).position;
        assert_eq!(a, 0.6);
        assert_eq!(a, b);
        assert!(!clock.has_missed());
    }

    #[test]
    fn freeze_composes_with_pause() {
        let mut clock = running(1_000);
        clock.tick(100);
        clock.freeze(100);
        clock.pause(200);
        clock.unfreeze(300);
        // Still paused: no progress.
        assert_eq!(clock.tick(900).position, 0.1);
        clock.resume(900);
        assert_eq!(clock.tick(1_000).position, 0.2);
    }

    #[test]
    fn unfreeze_mid_tick_counts_only_the_remainder() {
        let mut clock = running(1_000);
        clock.freeze(0);
        clock.unfreeze(700);
        assert_eq!(clock.tick(1_000).position, 0.3);
    }

    #[test]
    fn backwards_reading_is_clamped() {
        let mut clock = running(1_000);
        clock.tick(500);
        assert_eq!(clock.tick(200).position, 0.5);
        // Anchor stays at 500, so 600 only adds 100.
        assert_eq!(clock.tick(600).position, 0.6);
    }

    #[test]
    fn reset_clears_everything() {
        let mut clock = running(1_000);
        clock.tick(1_000);
        clock.freeze(1_000);
        clock.pause(1_000);
        clock.reset(2_000);
        assert!(!clock.is_paused());
        assert!(!clock.is_frozen());
        assert!(!clock.has_missed());
        assert_eq!(clock.tick(2_100).position, 0.1);
    }
}

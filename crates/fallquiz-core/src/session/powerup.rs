//! Consumable power-ups.
//!
//! - **Freeze** stalls the fall for a fixed duration. Its timer counts down
//!   only while the controller feeds it time, so a pause suspends it.
//! - **Bomb** disables up to two wrong options on the current question
//!   until the next question is shown.

use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::question::Question;

pub const BOMB_TARGETS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerupState {
    pub freeze_charges: u32,
    pub bomb_charges: u32,
    pub frozen: bool,
    pub freeze_remaining_ms: u64,
    /// Sorted option indices the player cannot pick.
    pub disabled_options: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct PowerupBank {
    state: PowerupState,
    freeze_duration_ms: u64,
}

impl PowerupBank {
    pub fn new(freeze_charges: u32, bomb_charges: u32, freeze_duration_ms: u64) -> Self {
        Self {
            state: PowerupState {
                freeze_charges,
                bomb_charges,
                frozen: false,
                freeze_remaining_ms: 0,
                disabled_options: Vec::new(),
            },
            freeze_duration_ms,
        }
    }

    pub fn state(&self) -> &PowerupState {
        &self.state
    }

    pub fn is_frozen(&self) -> bool {
        self.state.frozen
    }

    pub fn is_disabled(&self, option_index: usize) -> bool {
        self.state.disabled_options.contains(&option_index)
    }

    /// Spend a freeze charge. No-op when out of charges or already frozen.
    pub fn use_freeze(&mut self) -> bool {
        if self.state.freeze_charges == 0 || self.state.frozen {
            return false;
        }
        self.state.freeze_charges -= 1;
        self.state.frozen = true;
        self.state.freeze_remaining_ms = self.freeze_duration_ms;
        true
    }

    /// Run the freeze timer for `delta_ms`.
    ///
    /// Returns `Some(offset)` when the freeze ran out inside this delta,
    /// where `offset` is how far into the delta it expired.
    pub fn advance(&mut self, delta_ms: u64) -> Option<u64> {
        if !self.state.frozen {
            return None;
        }
        if delta_ms >= self.state.freeze_remaining_ms {
            let offset = self.state.freeze_remaining_ms;
            self.cancel_freeze();
            return Some(offset);
        }
        self.state.freeze_remaining_ms -= delta_ms;
        None
    }

    /// Drop an active freeze without refunding the charge.
    pub fn cancel_freeze(&mut self) -> bool {
        let was_frozen = self.state.frozen;
        self.state.frozen = false;
        self.state.freeze_remaining_ms = 0;
        was_frozen
    }

    /// Spend a bomb charge on `question`.
    ///
    /// Picks up to [`BOMB_TARGETS`] wrong options that are not already
    /// disabled. When none are left, nothing is spent. Returns the newly
    /// disabled indices.
    pub fn use_bomb(
        &mut self,
        question: Option<&Question>,
        rng: &mut dyn RngCore,
    ) -> Option<Vec<usize>> {
        if self.state.bomb_charges == 0 {
            return None;
        }
        let question = question?;
        let candidates: Vec<usize> = (0..question.options.len())
            .filter(|&i| i != question.correct_index && !self.is_disabled(i))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let mut targets: Vec<usize> = candidates
            .choose_multiple(rng, BOMB_TARGETS)
            .copied()
            .collect();
        targets.sort_unstable();

        self.state.bomb_charges -= 1;
        self.state.disabled_options.extend(targets.iter().copied());
        self.state.disabled_options.sort_unstable();
        Some(targets)
    }

    /// Returns whether anything was cleared.
    pub fn clear_disabled(&mut self) -> bool {
        let had_any = !self.state.disabled_options.is_empty();
        self.state.disabled_options.clear();
        had_any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    fn four_options() -> Question {
        Question::new(
            "q",
            "pick",
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            2,
        )
    }

    #[test]
    fn freeze_spends_a_charge() {
        let mut bank = PowerupBank::new(2, 0, 3_000);
        assert!(bank.use_freeze());
        assert!(bank.is_frozen());
        assert_eq!(bank.state().freeze_charges, 1);
    }

    #[test]
    fn freeze_refused_while_frozen_or_empty() {
        let mut bank = PowerupBank::new(1, 0, 3_000);
        assert!(bank.use_freeze());
        let mut empty = PowerupBank::new(0, 0, 3_000);
        assert!(!empty.use_freeze());
        bank.state.freeze_charges = 1;
        assert!(!bank.use_freeze());
        assert_eq!(bank.state().freeze_charges, 1);
    }

    #[test]
    fn freeze_expiry_reports_offset() {
        let mut bank = PowerupBank::new(1, 0, 1_000);
        bank.use_freeze();
        assert_eq!(bank.advance(400), None);
        assert_eq!(bank.state().freeze_remaining_ms, 600);
        assert_eq!(bank.advance(1_000), Some(600));
        assert!(!bank.is_frozen());
        assert_eq!(bank.advance(1_000), None);
    }

    #[test]
    fn bomb_disables_two_wrong_options() {
        let mut rng = Mcg128Xsl64::seed_from_u64(3);
        let mut bank = PowerupBank::new(0, 1, 0);
        let question = four_options();
        let targets = bank.use_bomb(Some(&question), &mut rng).unwrap();
        assert_eq!(targets.len(), 2);
        assert!(!targets.contains(&2));
        assert_eq!(bank.state().disabled_options, targets);
        assert_eq!(bank.state().bomb_charges, 0);
        assert!(bank.use_bomb(Some(&question), &mut rng).is_none());
    }

    #[test]
    fn second_bomb_takes_the_last_wrong_option() {
        let mut rng = Mcg128Xsl64::seed_from_u64(3);
        let mut bank = PowerupBank::new(0, 3, 0);
        let question = four_options();
        bank.use_bomb(Some(&question), &mut rng).unwrap();
        let second = bank.use_bomb(Some(&question), &mut rng).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(bank.state().disabled_options, vec![0, 1, 3]);
        // Nothing left to disable: charge is kept.
        assert!(bank.use_bomb(Some(&question), &mut rng).is_none());
        assert_eq!(bank.state().bomb_charges, 1);
    }

    #[test]
    fn bomb_needs_a_question() {
        let mut rng = Mcg128Xsl64::seed_from_u64(3);
        let mut bank = PowerupBank::new(0, 1, 0);
        assert!(bank.use_bomb(None, &mut rng).is_none());
        assert_eq!(bank.state().bomb_charges, 1);
    }

    #[test]
    fn clear_disabled_reports_change() {
        let mut rng = Mcg128Xsl64::seed_from_u64(3);
        let mut bank = PowerupBank::new(0, 1, 0);
        assert!(!bank.clear_disabled());
        bank.use_bomb(Some(&four_options()), &mut rng);
        assert!(bank.clear_disabled());
        assert!(bank.state().disabled_options.is_empty());
    }
}

//! Point calculation and the answer log used for the end-of-session report.

use serde::{Deserialize, Serialize};

use crate::question::Question;

/// One resolved question instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredRecord {
    pub question: Question,
    /// `None` when the question fell past the deadline.
    pub chosen_option: Option<usize>,
    pub correct: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u64,
    pub correct_answers: Vec<AnsweredRecord>,
    pub wrong_answers: Vec<AnsweredRecord>,
}

/// Points for a correct answer to `question` at `multiplier`.
pub fn calculate_points(
    question: &Question,
    multiplier: u32,
    base_points: u64,
    golden_points: u64,
) -> u64 {
    let base = if question.golden {
        golden_points
    } else {
        base_points
    };
    base.saturating_mul(u64::from(multiplier))
}

#[derive(Debug, Clone)]
pub struct ScoreKeeper {
    state: ScoreState,
    base_points: u64,
    golden_points: u64,
}

impl ScoreKeeper {
    pub fn new(base_points: u64, golden_points: u64) -> Self {
        Self {
            state: ScoreState::default(),
            base_points,
            golden_points,
        }
    }

    pub fn state(&self) -> &ScoreState {
        &self.state
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    /// Record a resolution and return the points awarded.
    ///
    /// Wrong answers and misses award nothing; the total never decreases.
    pub fn apply(
        &mut self,
        question: &Question,
        chosen_option: Option<usize>,
        correct: bool,
        multiplier: u32,
    ) -> u64 {
        let record = AnsweredRecord {
            question: question.clone(),
            chosen_option,
            correct,
        };
        if !correct {
            self.state.wrong_answers.push(record);
            return 0;
        }
        let points = calculate_points(question, multiplier, self.base_points, self.golden_points);
        self.state.score = self.state.score.saturating_add(points);
        self.state.correct_answers.push(record);
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question::new("q", "2 + 2", vec!["4".into(), "5".into()], 0)
    }

    #[test]
    fn base_points_times_multiplier() {
        assert_eq!(calculate_points(&question(), 1, 10, 30), 10);
        assert_eq!(calculate_points(&question(), 3, 10, 30), 30);
    }

    #[test]
    fn golden_uses_golden_base() {
        assert_eq!(calculate_points(&question().golden(), 2, 10, 30), 60);
    }

    #[test]
    fn correct_answer_is_logged_and_scored() {
        let mut keeper = ScoreKeeper::new(10, 30);
        assert_eq!(keeper.apply(&question(), Some(0), true, 1), 10);
        assert_eq!(keeper.score(), 10);
        assert_eq!(keeper.state().correct_answers.len(), 1);
        assert!(keeper.state().wrong_answers.is_empty());
    }

    #[test]
    fn wrong_answer_scores_nothing() {
        let mut keeper = ScoreKeeper::new(10, 30);
        assert_eq!(keeper.apply(&question(), Some(1), false, 4), 0);
        assert_eq!(keeper.apply(&question(), None, false, 1), 0);
        assert_eq!(keeper.score(), 0);
        let wrong = &keeper.state().wrong_answers;
        assert_eq!(wrong.len(), 2);
        assert_eq!(wrong[0].chosen_option, Some(1));
        assert_eq!(wrong[1].chosen_option, None);
    }
}

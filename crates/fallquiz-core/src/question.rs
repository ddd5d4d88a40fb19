//! Questions, the per-session question set, and question sources.

use std::collections::BTreeMap;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::session::SessionMode;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 4;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    /// Golden questions score `golden_points` instead of `base_points`.
    #[serde(default)]
    pub golden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            options,
            correct_index,
            golden: false,
            explanation: None,
        }
    }

    pub fn golden(mut self) -> Self {
        self.golden = true;
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn correct_option(&self) -> &str {
        self.options
            .get(self.correct_index)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_index
    }

    /// Check option count and correct index.
    pub fn validate(&self) -> Result<()> {
        let count = self.options.len();
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&count) {
            return Err(CoreError::InvalidQuestion {
                id: self.id.clone(),
                reason: format!("expected {MIN_OPTIONS}-{MAX_OPTIONS} options, got {count}"),
            });
        }
        if self.correct_index >= count {
            return Err(CoreError::InvalidQuestion {
                id: self.id.clone(),
                reason: format!(
                    "correct_index {} out of bounds for {count} options",
                    self.correct_index
                ),
            });
        }
        Ok(())
    }

    /// Copy with options permuted; `correct_index` follows the correct text.
    pub fn shuffled(&self, rng: &mut dyn RngCore) -> Question {
        let mut order: Vec<usize> = (0..self.options.len()).collect();
        order.shuffle(rng);
        let options = order.iter().map(|&i| self.options[i].clone()).collect();
        let correct_index = order
            .iter()
            .position(|&i| i == self.correct_index)
            .unwrap_or(self.correct_index);
        Question {
            options,
            correct_index,
            ..self.clone()
        }
    }
}

/// Ordered questions for one run.
///
/// Finite sets are exhausted once the cursor passes the last question.
/// Infinite sets append a reshuffled copy of the initial batch whenever
/// fewer than `replenish_threshold` questions remain ahead of the cursor,
/// and always before running dry. Questions already played are dropped on
/// replenish, so the buffer stays near one batch plus the threshold.
#[derive(Debug, Clone)]
pub struct QuestionSet {
    batch: Vec<Question>,
    queue: Vec<Question>,
    /// Instance index of the current question across the whole run.
    cursor: usize,
    /// Questions dropped from the front of `queue`.
    dropped: usize,
    mode: SessionMode,
    replenish_threshold: usize,
}

impl QuestionSet {
    /// Build a set, validating every question.
    ///
    /// # Errors
    ///
    /// `EmptyQuestionSet` when `questions` is empty, `InvalidQuestion` for
    /// the first malformed entry.
    pub fn new(
        questions: Vec<Question>,
        mode: SessionMode,
        replenish_threshold: usize,
    ) -> Result<Self> {
        if questions.is_empty() {
            return Err(CoreError::EmptyQuestionSet);
        }
        for q in &questions {
            q.validate()?;
        }
        Ok(Self {
            batch: questions.clone(),
            queue: questions,
            cursor: 0,
            dropped: 0,
            mode,
            replenish_threshold,
        })
    }

    /// Shuffle each question's options once for this session.
    pub fn shuffle_options(&mut self, rng: &mut dyn RngCore) {
        for q in self.queue.iter_mut() {
            *q = q.shuffled(rng);
        }
        self.batch = self.queue.clone();
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn current(&self) -> Option<&Question> {
        self.queue.get(self.slot())
    }

    /// Position of the current question instance within the run.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Questions still ahead of the current one.
    pub fn remaining(&self) -> usize {
        self.queue.len().saturating_sub(self.slot() + 1)
    }

    /// Questions scheduled so far, played ones included.
    pub fn len(&self) -> usize {
        self.dropped + self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move to the next question. Returns `false` when the set is exhausted.
    pub fn advance(&mut self, rng: &mut dyn RngCore) -> bool {
        if self.slot() < self.queue.len() {
            self.cursor += 1;
        }
        if self.mode == SessionMode::Infinite
            && (self.current().is_none() || self.remaining() < self.replenish_threshold)
        {
            self.replenish(rng);
        }
        self.current().is_some()
    }

    fn slot(&self) -> usize {
        self.cursor - self.dropped
    }

    fn replenish(&mut self, rng: &mut dyn RngCore) {
        let played = self.slot();
        self.queue.drain(..played);
        self.dropped += played;

        let mut next = self.batch.clone();
        next.shuffle(rng);
        tracing::debug!(added = next.len(), dropped = played, "replenishing question set");
        self.queue.extend(next);
    }
}

/// Supplies the ordered question list for a run.
pub trait QuestionSource {
    fn fetch_questions(&self, subject: &str, category: &str, stage: u32) -> Result<Vec<Question>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BankEntry {
    subject: String,
    category: String,
    #[serde(default)]
    stage: u32,
    id: String,
    text: String,
    options: Vec<String>,
    correct_index: usize,
    #[serde(default)]
    golden: bool,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BankFile {
    #[serde(default)]
    questions: Vec<BankEntry>,
}

type BankKey = (String, String, u32);

/// Question bank keyed by subject, category and stage.
///
/// Loaded from TOML (`[[questions]]` tables) or JSON (`{"questions": [...]}`).
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    entries: BTreeMap<BankKey, Vec<Question>>,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, subject: &str, category: &str, stage: u32, question: Question) {
        self.entries
            .entry((subject.to_string(), category.to_string(), stage))
            .or_default()
            .push(question);
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: BankFile = toml::from_str(content)?;
        Self::from_file(file)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: BankFile = serde_json::from_str(content)?;
        Self::from_file(file)
    }

    /// Load a bank from disk; `.json` files are parsed as JSON, all
    /// others as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    fn from_file(file: BankFile) -> Result<Self> {
        let mut bank = Self::new();
        for entry in file.questions {
            let question = Question {
                id: entry.id,
                text: entry.text,
                options: entry.options,
                correct_index: entry.correct_index,
                golden: entry.golden,
                explanation: entry.explanation,
            };
            question.validate()?;
            bank.insert(&entry.subject, &entry.category, entry.stage, question);
        }
        Ok(bank)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct (subject, category, stage) selections with their sizes.
    pub fn selections(&self) -> impl Iterator<Item = (&str, &str, u32, usize)> + '_ {
        self.entries
            .iter()
            .map(|((s, c, st), qs)| (s.as_str(), c.as_str(), *st, qs.len()))
    }
}

impl QuestionSource for QuestionBank {
    fn fetch_questions(&self, subject: &str, category: &str, stage: u32) -> Result<Vec<Question>> {
        Ok(self
            .entries
            .get(&(subject.to_string(), category.to_string(), stage))
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    fn q(id: &str, n: usize) -> Question {
        let options = (0..n).map(|i| format!("{id}-opt{i}")).collect();
        Question::new(id, format!("question {id}"), options, 0)
    }

    #[test]
    fn validate_rejects_bad_option_counts() {
        assert!(q("a", 1).validate().is_err());
        assert!(q("a", 5).validate().is_err());
        assert!(q("a", 2).validate().is_ok());
        assert!(q("a", 4).validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_answer() {
        let mut question = q("a", 3);
        question.correct_index = 3;
        assert!(matches!(
            question.validate(),
            Err(CoreError::InvalidQuestion { .. })
        ));
    }

    #[test]
    fn shuffled_keeps_correct_text() {
        let mut rng = Mcg128Xsl64::seed_from_u64(9);
        let question = q("a", 4);
        for _ in 0..20 {
            let shuffled = question.shuffled(&mut rng);
            assert_eq!(shuffled.correct_option(), "a-opt0");
            let mut sorted = shuffled.options.clone();
            sorted.sort();
            assert_eq!(sorted, question.options);
        }
    }

    #[test]
    fn empty_set_is_rejected() {
        let err = QuestionSet::new(Vec::new(), SessionMode::Finite, 3).unwrap_err();
        assert!(matches!(err, CoreError::EmptyQuestionSet));
    }

    #[test]
    fn finite_set_exhausts() {
        let mut rng = Mcg128Xsl64::seed_from_u64(1);
        let mut set = QuestionSet::new(vec![q("a", 2), q("b", 2)], SessionMode::Finite, 3).unwrap();
        assert_eq!(set.current().unwrap().id, "a");
        assert!(set.advance(&mut rng));
        assert_eq!(set.current().unwrap().id, "b");
        assert!(!set.advance(&mut rng));
        assert!(set.current().is_none());
        assert!(!set.advance(&mut rng));
    }

    #[test]
    fn infinite_set_replenishes_below_threshold() {
        let mut rng = Mcg128Xsl64::seed_from_u64(1);
        let mut set =
            QuestionSet::new(vec![q("a", 2), q("b", 2), q("c", 2)], SessionMode::Infinite, 2)
                .unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.advance(&mut rng));
        // One question left ahead, below threshold of 2.
        assert_eq!(set.len(), 6);
        for _ in 0..50 {
            assert!(set.advance(&mut rng));
            assert!(set.remaining() >= 2);
        }
        assert_eq!(set.cursor(), 51);
    }

    #[test]
    fn infinite_set_never_runs_dry_without_threshold() {
        let mut rng = Mcg128Xsl64::seed_from_u64(4);
        let mut set =
            QuestionSet::new(vec![q("a", 2), q("b", 2)], SessionMode::Infinite, 0).unwrap();
        for i in 1..=10 {
            assert!(set.advance(&mut rng));
            assert_eq!(set.cursor(), i);
            assert!(set.current().is_some());
        }
    }

    #[test]
    fn infinite_set_drops_played_questions() {
        let mut rng = Mcg128Xsl64::seed_from_u64(5);
        let mut set =
            QuestionSet::new(vec![q("a", 2), q("b", 2), q("c", 2)], SessionMode::Infinite, 2)
                .unwrap();
        for _ in 0..1_000 {
            assert!(set.advance(&mut rng));
        }
        assert_eq!(set.cursor(), 1_000);
        assert!(set.queue.len() <= 3 + 2);
        assert!(set.len() > 1_000);
    }

    #[test]
    fn bank_loads_toml_and_filters() {
        let bank = QuestionBank::from_toml_str(
            r#"
            [[questions]]
            subject = "math"
            category = "add"
            stage = 1
            id = "m1"
            text = "1 + 1"
            options = ["2", "3"]
            correct_index = 0

            [[questions]]
            subject = "math"
            category = "add"
            stage = 2
            id = "m2"
            text = "2 + 2"
            options = ["4", "5", "6"]
            correct_index = 0
            golden = true
            "#,
        )
        .unwrap();
        assert_eq!(bank.len(), 2);
        let stage_two = bank.fetch_questions("math", "add", 2).unwrap();
        assert_eq!(stage_two.len(), 1);
        assert!(stage_two[0].golden);
        assert!(bank.fetch_questions("math", "sub", 1).unwrap().is_empty());
    }

    #[test]
    fn bank_rejects_invalid_entries() {
        let result = QuestionBank::from_json_str(
            r#"{"questions": [{"subject": "s", "category": "c", "id": "x",
                "text": "t", "options": ["only"], "correct_index": 0}]}"#,
        );
        assert!(result.is_err());
    }
}

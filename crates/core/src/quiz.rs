//! Quiz engine: sequential navigation over a fixed question list, answer
//! selection and scoring.
//!
//! A `QuizSession` lives only while the quiz is open; nothing here is persisted.

use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::model::{QuestionId, QuizError, QuizQuestion, rounded_percent};

/// Minimum score (inclusive) that counts as passing and completes the topic.
pub const PASSING_SCORE: u8 = 70;

#[must_use]
pub fn is_passing(score: u8) -> bool {
    score >= PASSING_SCORE
}

/// Outcome of moving forward in a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStep {
    /// Moved to the question at this index.
    Next(usize),
    /// The last question was passed; the quiz is over.
    Finished { score: u8 },
}

/// Per-question line of the results view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerReview {
    pub question_id: QuestionId,
    pub selected: Option<usize>,
    pub correct: usize,
    pub is_correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Arc<[QuizQuestion]>,
    current: usize,
    selections: Vec<Option<usize>>,
    finished: bool,
}

impl QuizSession {
    /// Opens a fresh session over `questions`.
    ///
    /// An empty question list starts out finished with a score of 0.
    #[must_use]
    pub fn new(questions: impl Into<Arc<[QuizQuestion]>>) -> Self {
        let questions = questions.into();
        let len = questions.len();
        Self {
            questions,
            current: 0,
            selections: vec![None; len],
            finished: len == 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current)
    }

    /// Selected option per question, aligned with `questions()`.
    #[must_use]
    pub fn selections(&self) -> &[Option<usize>] {
        &self.selections
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.selections.iter().filter(|s| s.is_some()).count()
    }

    /// Records (or overwrites) the chosen option for a question.
    ///
    /// Questions may be answered in any order.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::QuestionOutOfRange` or `QuizError::OptionOutOfRange`
    /// when either index does not exist.
    pub fn select_answer(&mut self, question: usize, option: usize) -> Result<(), QuizError> {
        let Some(q) = self.questions.get(question) else {
            return Err(QuizError::QuestionOutOfRange {
                index: question,
                len: self.questions.len(),
            });
        };
        if option >= q.options().len() {
            return Err(QuizError::OptionOutOfRange {
                question,
                option,
                options: q.options().len(),
            });
        }
        self.selections[question] = Some(option);
        Ok(())
    }

    /// Moves to the next question, or finishes the quiz on the last one.
    ///
    /// Once finished, further calls keep returning `Finished` with the current score.
    pub fn advance(&mut self) -> QuizStep {
        if !self.finished && self.current + 1 < self.questions.len() {
            self.current += 1;
            return QuizStep::Next(self.current);
        }
        self.finished = true;
        QuizStep::Finished {
            score: self.score(),
        }
    }

    /// Moves back one question, staying at 0 on the first.
    pub fn retreat(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    /// Percentage of questions answered correctly; unanswered ones count as wrong.
    #[must_use]
    pub fn score(&self) -> u8 {
        let Some(total) = NonZeroUsize::new(self.questions.len()) else {
            return 0;
        };
        let correct = self
            .questions
            .iter()
            .zip(&self.selections)
            .filter(|(q, selected)| q.is_correct(**selected))
            .count();
        rounded_percent(correct, total)
    }

    /// Back to the first question with no answers, for a retake.
    pub fn reset(&mut self) {
        self.current = 0;
        self.selections.iter_mut().for_each(|s| *s = None);
        self.finished = self.questions.is_empty();
    }

    #[must_use]
    pub fn breakdown(&self) -> Vec<AnswerReview> {
        self.questions
            .iter()
            .zip(&self.selections)
            .map(|(q, selected)| AnswerReview {
                question_id: q.id().clone(),
                selected: *selected,
                correct: q.correct(),
                is_correct: q.is_correct(*selected),
                explanation: q.explanation().to_string(),
            })
            .collect()
    }
}

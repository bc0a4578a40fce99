use thiserror::Error;

use crate::model::ids::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("question must have at least one option")]
    NoOptions,

    #[error("correct option {correct} is out of range for {options} options")]
    CorrectOutOfRange { correct: usize, options: usize },

    #[error("question {index} is out of range for a quiz of {len}")]
    QuestionOutOfRange { index: usize, len: usize },

    #[error("option {option} is out of range for question {question} ({options} options)")]
    OptionOutOfRange {
        question: usize,
        option: usize,
        options: usize,
    },
}

/// A multiple-choice question, supplied by the content catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct: usize,
    explanation: String,
}

impl QuizQuestion {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoOptions` if `options` is empty, or
    /// `QuizError::CorrectOutOfRange` if `correct` does not index an option.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct: usize,
        explanation: impl Into<String>,
    ) -> Result<Self, QuizError> {
        if options.is_empty() {
            return Err(QuizError::NoOptions);
        }
        if correct >= options.len() {
            return Err(QuizError::CorrectOutOfRange {
                correct,
                options: options.len(),
            });
        }
        Ok(Self {
            id,
            prompt: prompt.into(),
            options,
            correct,
            explanation: explanation.into(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Index into `options()` of the right answer.
    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn is_correct(&self, selected: Option<usize>) -> bool {
        selected == Some(self.correct)
    }
}

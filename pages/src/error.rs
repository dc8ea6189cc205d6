//! Page Error Types
//!
//! Two error families cross the page boundary. [`SubmissionError`] is a
//! recoverable, field-level input problem: the learner is shown the message
//! next to the field and asked to resubmit. [`PageError`] covers programmer
//! contract violations and fatal configuration problems (e.g. a protocol
//! violation by the execution service); expected grading failures are never
//! reported through it.

use thiserror::Error;

/// A recoverable input problem on one form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct SubmissionError {
    pub field: String,
    pub message: String,
}

impl SubmissionError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A contract violation or fatal configuration problem.
#[derive(Debug, Error)]
pub enum PageError {
    /// A render/parse/grade operation was invoked on a page that does not
    /// take answers.
    #[error("{location}: page does not take an answer")]
    NoAnswerExpected { location: String },

    /// The stored answer data does not belong to this page type.
    #[error("{location}: answer data does not belong to this page type")]
    AnswerShape { location: String },

    /// A configuration defect: corrupt page data, an out-of-range
    /// correctness value, or a protocol violation by the execution service.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PageError {
    pub fn no_answer_expected(location: &str) -> Self {
        PageError::NoAnswerExpected {
            location: location.to_string(),
        }
    }

    pub fn answer_shape(location: &str) -> Self {
        PageError::AnswerShape {
            location: location.to_string(),
        }
    }
}

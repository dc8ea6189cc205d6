//! The uniform grading outcome record.
//!
//! Every grade call, for every page type, is normalized into an
//! [`AnswerFeedback`]: a correctness degree, the correct-answer text, the
//! learner-facing feedback, and a normalized form of the answer for
//! analytics. The record is produced fresh on every grade and never mutated.

use serde::{Deserialize, Serialize};

use crate::error::PageError;

/// The analytics form of a submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizedAnswer {
    /// No normalized form can be produced for this answer kind.
    Unavailable,
    /// No answer was submitted.
    NotProvided,
    /// The normalized answer text.
    Text(String),
}

/// Derive generic feedback text from a correctness degree.
pub fn auto_feedback(correctness: Option<f64>) -> String {
    match correctness {
        Some(c) if c == 0.0 => "Your answer is not correct.".to_string(),
        Some(c) if c == 1.0 => "Your answer is correct.".to_string(),
        Some(c) if c > 0.5 => {
            format!("Your answer is mostly correct. ({:.1} %)", 100.0 * c)
        }
        Some(c) => format!("Your answer is somewhat correct. ({:.1} %)", 100.0 * c),
        None => "The correctness of your answer could not be determined.".to_string(),
    }
}

/// A normalized grading outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerFeedback {
    /// Degree of correctness in [0, 1], or `None` when indeterminate.
    pub correctness: Option<f64>,
    /// A full sentence (or HTML block) describing the correct answer, when
    /// one is determinable.
    pub correct_answer: Option<String>,
    /// Learner-facing feedback. Never reveals the correct answer.
    pub feedback: String,
    pub normalized_answer: NormalizedAnswer,
}

impl AnswerFeedback {
    /// Build a feedback record. A present correctness outside [0, 1] is a
    /// configuration error. Absent `feedback` is derived from the
    /// correctness via [`auto_feedback`].
    pub fn new(
        correctness: Option<f64>,
        correct_answer: Option<String>,
        feedback: Option<String>,
        normalized_answer: NormalizedAnswer,
    ) -> Result<Self, PageError> {
        if let Some(c) = correctness {
            if !(0.0..=1.0).contains(&c) {
                return Err(PageError::Config(format!(
                    "invalid correctness value {c}"
                )));
            }
        }

        let feedback = feedback.unwrap_or_else(|| auto_feedback(correctness));

        Ok(Self {
            correctness,
            correct_answer,
            feedback,
            normalized_answer,
        })
    }

    /// The fixed outcome for a missing submission: correctness 0 and a
    /// "No answer provided." feedback.
    pub fn no_answer(correct_answer: Option<String>) -> Self {
        Self {
            correctness: Some(0.0),
            correct_answer,
            feedback: "No answer provided.".to_string(),
            normalized_answer: NormalizedAnswer::NotProvided,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_correctness_rejected() {
        for c in [-0.1, 1.1, 2.0, f64::NAN] {
            let result = AnswerFeedback::new(Some(c), None, None, NormalizedAnswer::Unavailable);
            assert!(result.is_err(), "correctness {c} should be rejected");
        }
    }

    #[test]
    fn test_boundary_correctness_accepted() {
        for c in [0.0, 0.5, 1.0] {
            assert!(
                AnswerFeedback::new(Some(c), None, None, NormalizedAnswer::Unavailable).is_ok()
            );
        }
        assert!(AnswerFeedback::new(None, None, None, NormalizedAnswer::Unavailable).is_ok());
    }

    #[test]
    fn test_auto_feedback_texts() {
        assert_eq!(auto_feedback(Some(0.0)), "Your answer is not correct.");
        assert_eq!(auto_feedback(Some(1.0)), "Your answer is correct.");
        assert_eq!(
            auto_feedback(Some(0.8)),
            "Your answer is mostly correct. (80.0 %)"
        );
        assert_eq!(
            auto_feedback(Some(0.25)),
            "Your answer is somewhat correct. (25.0 %)"
        );
        assert_eq!(
            auto_feedback(None),
            "The correctness of your answer could not be determined."
        );
    }

    #[test]
    fn test_explicit_feedback_wins_over_auto() {
        let fb = AnswerFeedback::new(
            Some(1.0),
            Some("A correct answer is: 'cat'.".into()),
            Some("Nice.".into()),
            NormalizedAnswer::Text("cat".into()),
        )
        .unwrap();
        assert_eq!(fb.feedback, "Nice.");
    }

    #[test]
    fn test_no_answer_record() {
        let fb = AnswerFeedback::no_answer(Some("A correct answer is: 'cat'.".into()));
        assert_eq!(fb.correctness, Some(0.0));
        assert_eq!(fb.feedback, "No answer provided.");
        assert_eq!(fb.normalized_answer, NormalizedAnswer::NotProvided);
    }
}

//! Persistable per-learner page state and answer records.

use serde::{Deserialize, Serialize};

/// Data generated once per (page, learner-visit) and persisted by the
/// caller. Currently the only generated state is the choice permutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageData {
    /// Display order of choice options: `permutation[display] = source`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permutation: Option<Vec<usize>>,
}

/// A structured, persistable learner response. Serialized as either
/// `{"answer": "..."}` or `{"choice": n}`; each page type only understands
/// its own variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerData {
    Text { answer: String },
    Choice { choice: usize },
}

impl AnswerData {
    pub fn text(answer: impl Into<String>) -> Self {
        AnswerData::Text {
            answer: answer.into(),
        }
    }

    pub fn choice(choice: usize) -> Self {
        AnswerData::Choice { choice }
    }

    pub fn as_answer(&self) -> Option<&str> {
        match self {
            AnswerData::Text { answer } => Some(answer),
            AnswerData::Choice { .. } => None,
        }
    }

    pub fn as_choice(&self) -> Option<usize> {
        match self {
            AnswerData::Choice { choice } => Some(*choice),
            AnswerData::Text { .. } => None,
        }
    }
}

/// Persisted input from deferred or human grading. Opaque to this crate;
/// passed through to the page type unchanged.
pub type GradeData = serde_json::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_data_wire_shapes() {
        let text = serde_json::to_value(AnswerData::text("42")).unwrap();
        assert_eq!(text, serde_json::json!({"answer": "42"}));

        let choice = serde_json::to_value(AnswerData::choice(2)).unwrap();
        assert_eq!(choice, serde_json::json!({"choice": 2}));
    }

    #[test]
    fn test_answer_data_round_trip() {
        let parsed: AnswerData = serde_json::from_str(r#"{"choice": 1}"#).unwrap();
        assert_eq!(parsed.as_choice(), Some(1));
        assert!(parsed.as_answer().is_none());

        let parsed: AnswerData = serde_json::from_str(r#"{"answer": "x"}"#).unwrap();
        assert_eq!(parsed.as_answer(), Some("x"));
    }

    #[test]
    fn test_page_data_omits_absent_permutation() {
        let json = serde_json::to_string(&PageData::default()).unwrap();
        assert_eq!(json, "{}");

        let data = PageData {
            permutation: Some(vec![2, 0, 1]),
        };
        let back: PageData = serde_json::from_str(&serde_json::to_string(&data).unwrap()).unwrap();
        assert_eq!(back, data);
    }
}

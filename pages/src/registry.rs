//! Page type registry.
//!
//! Maps a descriptor's `type` tag to the page type that validates and owns
//! it. The table is static and closed; an unknown tag is a fatal validation
//! error, never a silently skipped page.

use serde::de::DeserializeOwned;
use serde_json::Value;
use util::validation::{ValidationContext, ValidationError};

use crate::Page;
use crate::choice::ChoiceQuestion;
use crate::code::CodeQuestion;
use crate::content::ContentPage;
use crate::symbolic::SymbolicQuestion;
use crate::text::TextQuestion;

type PageBuilder =
    fn(&mut ValidationContext, &str, &Value) -> Result<Box<dyn Page>, ValidationError>;

fn build_content(
    vctx: &mut ValidationContext,
    location: &str,
    desc: &Value,
) -> Result<Box<dyn Page>, ValidationError> {
    Ok(Box::new(ContentPage::from_desc(vctx, location, desc)?))
}

fn build_text(
    vctx: &mut ValidationContext,
    location: &str,
    desc: &Value,
) -> Result<Box<dyn Page>, ValidationError> {
    Ok(Box::new(TextQuestion::from_desc(vctx, location, desc)?))
}

fn build_choice(
    vctx: &mut ValidationContext,
    location: &str,
    desc: &Value,
) -> Result<Box<dyn Page>, ValidationError> {
    Ok(Box::new(ChoiceQuestion::from_desc(vctx, location, desc)?))
}

fn build_code(
    vctx: &mut ValidationContext,
    location: &str,
    desc: &Value,
) -> Result<Box<dyn Page>, ValidationError> {
    Ok(Box::new(CodeQuestion::from_desc(vctx, location, desc)?))
}

fn build_symbolic(
    vctx: &mut ValidationContext,
    location: &str,
    desc: &Value,
) -> Result<Box<dyn Page>, ValidationError> {
    Ok(Box::new(SymbolicQuestion::from_desc(vctx, location, desc)?))
}

static PAGE_TYPES: &[(&str, PageBuilder)] = &[
    ("Page", build_content),
    ("TextQuestion", build_text),
    ("ChoiceQuestion", build_choice),
    ("CodeQuestion", build_code),
    ("SymbolicQuestion", build_symbolic),
];

/// Build a page from a JSON descriptor, dispatching on its `type` field.
pub fn build_page(
    vctx: &mut ValidationContext,
    location: &str,
    desc: &Value,
) -> Result<Box<dyn Page>, ValidationError> {
    let tag = desc
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::new(location, "missing page type"))?;

    let builder = PAGE_TYPES
        .iter()
        .find(|(candidate, _)| *candidate == tag)
        .map(|(_, builder)| builder)
        .ok_or_else(|| {
            ValidationError::new(location, format!("unknown page type '{tag}'"))
        })?;

    builder(vctx, location, desc)
}

/// Deserialize a typed descriptor, turning shape problems (missing required
/// fields, unknown fields) into fatal validation errors at `location`.
pub(crate) fn deserialize_desc<T: DeserializeOwned>(
    location: &str,
    desc: &Value,
) -> Result<T, ValidationError> {
    serde_json::from_value(desc.clone())
        .map_err(|e| ValidationError::new(location, format!("invalid descriptor: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_type_is_fatal() {
        let mut vctx = ValidationContext::new();
        let desc = json!({"type": "EssayQuestion", "id": "q1"});
        let err = build_page(&mut vctx, "quiz, page 1", &desc).unwrap_err();
        assert!(err.message.contains("unknown page type 'EssayQuestion'"));
    }

    #[test]
    fn test_missing_type_is_fatal() {
        let mut vctx = ValidationContext::new();
        let err = build_page(&mut vctx, "quiz, page 1", &json!({"id": "q1"})).unwrap_err();
        assert!(err.message.contains("missing page type"));
    }

    #[test]
    fn test_dispatch_reaches_page_types() {
        let mut vctx = ValidationContext::new();
        let desc = json!({
            "type": "Page",
            "id": "intro",
            "title": "Welcome",
            "content": "Hello there.",
        });
        let page = build_page(&mut vctx, "quiz, page 1", &desc).unwrap();
        assert_eq!(page.id(), "intro");
        assert!(!page.expects_answer());
    }
}

//! # Matcher Engine
//!
//! Pluggable strategies for scoring a learner's text answer against an
//! authored pattern. A match specification is a string of the form
//! `<kind>pattern`; an older `kind:pattern` form is still accepted with a
//! deprecation warning. The kind tag is resolved through a static registry
//! into one of the closed set of [`Matcher`] variants, each carrying its
//! pattern pre-validated at construction time.

pub mod symexpr;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use util::validation::{ValidationContext, ValidationError};

use crate::error::SubmissionError;
use self::symexpr::Expr;

/// A compiled answer matcher. Scores are 0.0 or 1.0.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// String equality, case-sensitive.
    CaseSensPlain { pattern: String },
    /// Case-folded string equality.
    Plain { pattern: String },
    /// Anchored-at-start pattern match.
    Pattern { regex: Regex, case_sensitive: bool },
    /// Algebraic equivalence of symbolic expressions.
    SymExpr { pattern: String, expr: Expr },
}

struct MatcherKind {
    tag: &'static str,
    build: fn(&str, &str) -> Result<Matcher, ValidationError>,
}

static MATCHER_KINDS: &[MatcherKind] = &[
    MatcherKind {
        tag: "case_sens_plain",
        build: |_, pattern| {
            Ok(Matcher::CaseSensPlain {
                pattern: pattern.to_string(),
            })
        },
    },
    MatcherKind {
        tag: "plain",
        build: |_, pattern| {
            Ok(Matcher::Plain {
                pattern: pattern.to_string(),
            })
        },
    },
    MatcherKind {
        tag: "regex",
        build: |location, pattern| build_pattern(location, pattern, false),
    },
    MatcherKind {
        tag: "case_sens_regex",
        build: |location, pattern| build_pattern(location, pattern, true),
    },
    MatcherKind {
        tag: "sym_expr",
        build: |location, pattern| {
            let expr = symexpr::parse(pattern).map_err(|e| {
                ValidationError::new(location, format!("invalid symbolic answer: {e}"))
            })?;
            Ok(Matcher::SymExpr {
                pattern: pattern.to_string(),
                expr,
            })
        },
    },
];

fn build_pattern(
    location: &str,
    pattern: &str,
    case_sensitive: bool,
) -> Result<Matcher, ValidationError> {
    // Anchor at the start only, like a prefix match against the whole
    // candidate.
    let regex = RegexBuilder::new(&format!(r"\A(?:{pattern})"))
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| ValidationError::new(location, format!("invalid pattern: {e}")))?;
    Ok(Matcher::Pattern {
        regex,
        case_sensitive,
    })
}

static PREFERRED_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^<([a-zA-Z0-9_:.]+)>(.*)$").unwrap()
});
static DEPRECATED_FORM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^([a-zA-Z0-9_.]+):(.*)$").unwrap()
});

/// Parse one match specification string into a compiled [`Matcher`].
///
/// Accepts `<kind>pattern`, or the deprecated `kind:pattern` form with a
/// warning on `vctx`. An unknown kind tag or an uncompilable pattern is a
/// fatal validation error carrying `location`.
pub fn parse_matcher(
    vctx: &mut ValidationContext,
    location: &str,
    spec: &str,
) -> Result<Matcher, ValidationError> {
    let (tag, pattern) = if let Some(caps) = PREFERRED_FORM.captures(spec) {
        (caps[1].to_string(), caps[2].to_string())
    } else if let Some(caps) = DEPRECATED_FORM.captures(spec) {
        vctx.add_warning(location, "uses deprecated 'matcher:answer' style");
        (caps[1].to_string(), caps[2].to_string())
    } else {
        return Err(ValidationError::new(
            location,
            format!("does not specify match type: '{spec}'"),
        ));
    };

    let kind = MATCHER_KINDS
        .iter()
        .find(|kind| kind.tag == tag)
        .ok_or_else(|| {
            ValidationError::new(location, format!("unknown match type '{tag}'"))
        })?;

    (kind.build)(location, &pattern)
}

impl Matcher {
    /// Score a candidate answer: 1.0 on a match, 0.0 otherwise.
    pub fn grade(&self, candidate: &str) -> f64 {
        let matched = match self {
            Matcher::CaseSensPlain { pattern } => candidate == pattern,
            Matcher::Plain { pattern } => {
                candidate.to_lowercase() == pattern.to_lowercase()
            }
            Matcher::Pattern { regex, .. } => regex.is_match(candidate),
            Matcher::SymExpr { expr, .. } => match symexpr::parse(candidate) {
                Ok(candidate_expr) => symexpr::equivalent(expr, &candidate_expr),
                Err(_) => false,
            },
        };
        if matched { 1.0 } else { 0.0 }
    }

    /// Pre-grade validation of a candidate. Rejects input that cannot be
    /// scored meaningfully, with a field-level error for the learner.
    pub fn validate(&self, candidate: &str) -> Result<(), SubmissionError> {
        if let Matcher::SymExpr { .. } = self {
            symexpr::parse(candidate)
                .map_err(|e| SubmissionError::new("answer", e.to_string()))?;
        }
        Ok(())
    }

    /// The canonical correct-answer text, when one is determinable. Pattern
    /// matchers cannot supply one.
    pub fn correct_answer_text(&self) -> Option<&str> {
        match self {
            Matcher::CaseSensPlain { pattern }
            | Matcher::Plain { pattern }
            | Matcher::SymExpr { pattern, .. } => Some(pattern),
            Matcher::Pattern { .. } => None,
        }
    }

    pub fn is_case_sensitive(&self) -> bool {
        match self {
            Matcher::CaseSensPlain { .. } | Matcher::SymExpr { .. } => true,
            Matcher::Plain { .. } => false,
            Matcher::Pattern { case_sensitive, .. } => *case_sensitive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(spec: &str) -> Matcher {
        let mut vctx = ValidationContext::new();
        parse_matcher(&mut vctx, "page test", spec).unwrap()
    }

    #[test]
    fn test_plain_is_case_insensitive() {
        let matcher = parse_ok("<plain>Foo");
        assert_eq!(matcher.grade("foo"), 1.0);
        assert_eq!(matcher.grade("FOO"), 1.0);
        assert_eq!(matcher.grade("bar"), 0.0);
        assert!(!matcher.is_case_sensitive());
    }

    #[test]
    fn test_case_sens_plain_rejects_other_case() {
        let matcher = parse_ok("<case_sens_plain>Foo");
        assert_eq!(matcher.grade("Foo"), 1.0);
        assert_eq!(matcher.grade("foo"), 0.0);
        assert!(matcher.is_case_sensitive());
    }

    #[test]
    fn test_regex_is_anchored_at_start() {
        let matcher = parse_ok("<regex>ab.*");
        assert_eq!(matcher.grade("abXYZ"), 1.0);
        assert_eq!(matcher.grade("ABxyz"), 1.0);
        assert_eq!(matcher.grade("xab"), 0.0);
        assert!(matcher.correct_answer_text().is_none());
    }

    #[test]
    fn test_case_sens_regex() {
        let matcher = parse_ok("<case_sens_regex>ab.*");
        assert_eq!(matcher.grade("abXYZ"), 1.0);
        assert_eq!(matcher.grade("ABxyz"), 0.0);
        assert!(matcher.is_case_sensitive());
    }

    #[test]
    fn test_sym_expr_equivalence() {
        let matcher = parse_ok("<sym_expr>2*x + 1");
        assert_eq!(matcher.grade("1 + x + x"), 1.0);
        assert_eq!(matcher.grade("2*x"), 0.0);
        assert!(matcher.validate("x +").is_err());
        assert!(matcher.validate("x + 1").is_ok());
    }

    #[test]
    fn test_deprecated_form_warns() {
        let mut vctx = ValidationContext::new();
        let matcher = parse_matcher(&mut vctx, "page test", "plain:Foo").unwrap();
        assert_eq!(matcher.grade("foo"), 1.0);
        assert_eq!(vctx.warnings().len(), 1);
        assert!(vctx.warnings()[0].message.contains("deprecated"));
    }

    #[test]
    fn test_unknown_kind_is_fatal() {
        let mut vctx = ValidationContext::new();
        let err = parse_matcher(&mut vctx, "page test", "<fuzzy>Foo").unwrap_err();
        assert!(err.message.contains("unknown match type"));
        assert_eq!(err.location, "page test");
    }

    #[test]
    fn test_missing_kind_is_fatal() {
        let mut vctx = ValidationContext::new();
        assert!(parse_matcher(&mut vctx, "page test", "just text").is_err());
    }

    #[test]
    fn test_bad_regex_is_fatal() {
        let mut vctx = ValidationContext::new();
        let err = parse_matcher(&mut vctx, "page test", "<regex>a(b").unwrap_err();
        assert!(err.message.contains("invalid pattern"));
    }

    #[test]
    fn test_pattern_may_span_lines() {
        let matcher = parse_ok("<plain>line one\nline two");
        assert_eq!(matcher.grade("Line One\nLine Two"), 1.0);
    }
}

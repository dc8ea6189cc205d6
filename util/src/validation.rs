//! Validation support for authored course content.
//!
//! Content validation distinguishes two severities: fatal errors, which make
//! a page unusable and carry the location of the offending descriptor, and
//! warnings, which are collected on a [`ValidationContext`] and reported to
//! the content author without blocking the page.

use thiserror::Error;

/// A fatal content validation failure, reported with the location of the
/// descriptor that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {message}")]
pub struct ValidationError {
    pub location: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// A non-fatal validation finding (e.g. use of a deprecated syntax).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    pub location: String,
    pub message: String,
}

/// Collects warnings while a batch of page descriptors is validated.
#[derive(Debug, Default)]
pub struct ValidationContext {
    warnings: Vec<ValidationWarning>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a non-fatal warning against the given location.
    pub fn add_warning(&mut self, location: &str, message: &str) {
        log::warn!("{location}: {message}");
        self.warnings.push(ValidationWarning {
            location: location.to_string(),
            message: message.to_string(),
        });
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }
}

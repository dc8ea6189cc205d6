//! Wire protocol of the sandboxed code-execution service.
//!
//! Both messages are string-keyed JSON objects. Optional request fields are
//! copied verbatim from the page descriptor and omitted entirely when the
//! descriptor does not carry them.

use serde::{Deserialize, Serialize};

/// One execution request. Serialized as a single JSON object and sent over a
/// fresh connection per grading call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub compile_only: bool,
    pub user_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names_for_user: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names_from_user: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_code: Option<String>,
}

impl RunRequest {
    /// A grading run of the given user code, with no setup or test code.
    pub fn for_user_code(user_code: impl Into<String>) -> Self {
        Self {
            compile_only: false,
            user_code: user_code.into(),
            setup_code: None,
            names_for_user: None,
            names_from_user: None,
            test_code: None,
        }
    }
}

/// The closed set of result kinds the service may report. Any other string
/// fails deserialization and is treated as a protocol violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Success,
    UserCompileError,
    UserError,
    UncaughtError,
    SetupCompileError,
    SetupError,
    TestCompileError,
    TestError,
}

impl RunOutcome {
    /// The wire string for this outcome.
    pub fn as_str(self) -> &'static str {
        match self {
            RunOutcome::Success => "success",
            RunOutcome::UserCompileError => "user_compile_error",
            RunOutcome::UserError => "user_error",
            RunOutcome::UncaughtError => "uncaught_error",
            RunOutcome::SetupCompileError => "setup_compile_error",
            RunOutcome::SetupError => "setup_error",
            RunOutcome::TestCompileError => "test_compile_error",
            RunOutcome::TestError => "test_error",
        }
    }

    /// True for outcomes caused by the grading infrastructure or the question
    /// author, not the learner. These must be escalated to an operator.
    pub fn is_infrastructure_failure(self) -> bool {
        matches!(
            self,
            RunOutcome::UncaughtError
                | RunOutcome::SetupCompileError
                | RunOutcome::SetupError
                | RunOutcome::TestCompileError
                | RunOutcome::TestError
        )
    }

    /// True for outcomes caused by the learner's own code.
    pub fn is_learner_error(self) -> bool {
        matches!(self, RunOutcome::UserCompileError | RunOutcome::UserError)
    }
}

/// The service's response for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResponse {
    pub result: RunOutcome,
    /// Partial-credit score in [0, 1], when the test code awards one.
    #[serde(default)]
    pub points: Option<f64>,
    /// Free-form feedback items produced by the test code.
    #[serde(default)]
    pub feedback: Option<Vec<String>>,
    #[serde(default)]
    pub traceback: Option<String>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
}

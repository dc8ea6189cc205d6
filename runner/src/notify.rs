//! Operator-escalation port for broken code questions.
//!
//! When grading fails for a reason the learner did not cause, the grade call
//! still returns degraded learner-facing feedback, but the full diagnostic
//! payload goes out through this port so an operator can fix the question or
//! the sandbox. The port is a trait so tests can capture the reports instead
//! of asserting on delivery.

use std::sync::Mutex;

use crate::protocol::RunResponse;

const RULE: &str = "-------------------------------------";

/// One escalated grading failure, ready for an operator channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenQuestionReport {
    pub course: String,
    pub page_id: String,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, report: BrokenQuestionReport);
}

/// Escalation sink that writes reports to the error log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, report: BrokenQuestionReport) {
        log::error!(
            "[{}] broken code question '{}':\n{}",
            report.course,
            report.page_id,
            report.message
        );
    }
}

/// Escalation sink that keeps reports in memory, for tests.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    reports: Mutex<Vec<BrokenQuestionReport>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<BrokenQuestionReport> {
        self.reports.lock().expect("notifier lock poisoned").clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, report: BrokenQuestionReport) {
        self.reports
            .lock()
            .expect("notifier lock poisoned")
            .push(report);
    }
}

fn push_section(parts: &mut Vec<String>, name: &str, value: &str) {
    parts.push(RULE.to_string());
    parts.push(name.to_string());
    parts.push(RULE.to_string());
    parts.push(value.to_string());
}

/// Render the full diagnostic payload for an escalated response: the result
/// kind, every non-empty response section in stable order, and the submitted
/// code.
pub fn broken_report_body(response: &RunResponse, user_code: &str) -> String {
    let mut parts = vec![format!("RESULT: {}", response.result.as_str())];

    if let Some(feedback) = &response.feedback {
        if !feedback.is_empty() {
            push_section(&mut parts, "feedback", &feedback.join("\n"));
        }
    }
    if let Some(points) = response.points {
        push_section(&mut parts, "points", &points.to_string());
    }
    if let Some(stderr) = response.stderr.as_deref().filter(|s| !s.is_empty()) {
        push_section(&mut parts, "stderr", stderr);
    }
    if let Some(stdout) = response.stdout.as_deref().filter(|s| !s.is_empty()) {
        push_section(&mut parts, "stdout", stdout);
    }
    if let Some(traceback) = response.traceback.as_deref().filter(|s| !s.is_empty()) {
        push_section(&mut parts, "traceback", traceback);
    }

    push_section(&mut parts, "user code", user_code);
    parts.push(RULE.to_string());
    parts.join("\n")
}

/// Render the diagnostic payload for a round trip that produced no response
/// at all (connection failure or timeout).
pub fn failed_request_body(error: &str, user_code: &str) -> String {
    let mut parts = vec![format!("RESULT: {error}")];
    push_section(&mut parts, "user code", user_code);
    parts.push(RULE.to_string());
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::RunOutcome;

    fn test_response() -> RunResponse {
        RunResponse {
            result: RunOutcome::TestError,
            points: None,
            feedback: None,
            traceback: Some("Traceback: boom".into()),
            stdout: Some(String::new()),
            stderr: None,
        }
    }

    #[test]
    fn test_memory_notifier_captures_reports() {
        let notifier = MemoryNotifier::new();
        notifier.notify(BrokenQuestionReport {
            course: "cs101".into(),
            page_id: "quiz-3".into(),
            message: "payload".into(),
        });

        let reports = notifier.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].page_id, "quiz-3");
    }

    #[test]
    fn test_broken_report_body_sections() {
        let body = broken_report_body(&test_response(), "def f(): pass");

        assert!(body.starts_with("RESULT: test_error"));
        assert!(body.contains("traceback"));
        assert!(body.contains("Traceback: boom"));
        assert!(body.contains("user code"));
        assert!(body.contains("def f(): pass"));
        // empty stdout and absent stderr produce no section
        assert!(!body.contains("stdout"));
        assert!(!body.contains("stderr"));
    }

    #[test]
    fn test_failed_request_body() {
        let body = failed_request_body("run service did not answer within 31s", "x = 1");
        assert!(body.starts_with("RESULT: run service did not answer"));
        assert!(body.contains("x = 1"));
    }
}

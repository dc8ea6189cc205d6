//! Code questions graded by the sandboxed execution service.
//!
//! Grading performs one request/response round trip per call. Learner-caused
//! failures (their code does not compile or raises) come back as informative
//! feedback; infrastructure- or author-caused failures come back as an
//! apology to the learner while the full diagnostic payload is escalated
//! through the operator notification port.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use util::markup::html_escape;
use util::validation::{ValidationContext, ValidationError};

use runner::notify::{broken_report_body, failed_request_body};
use runner::{BrokenQuestionReport, RunError, RunRequest, RunResponse};

use crate::data::{AnswerData, GradeData, PageData};
use crate::error::{PageError, SubmissionError};
use crate::feedback::{auto_feedback, AnswerFeedback, NormalizedAnswer};
use crate::form::PageForm;
use crate::registry::deserialize_desc;
use crate::{Page, PageContext};

/// Upper bound on the authored sandbox timeout, in seconds.
const MAX_TIMEOUT_SECS: f64 = 3600.0;

const GRADING_FAILED_APOLOGY: &str = "<p>The grading code failed. Sorry about that. \
The staff has been informed, and if this problem is due to an issue with the \
grading code, it will be fixed as soon as possible. In the meantime, you'll see \
a traceback below that may help you figure out what went wrong.</p>";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CodeDesc {
    #[serde(rename = "type")]
    _type: String,
    id: String,
    title: String,
    value: f64,
    prompt: String,
    /// Sandbox execution budget in seconds.
    timeout: f64,
    #[serde(default)]
    setup_code: Option<String>,
    #[serde(default)]
    names_for_user: Option<Vec<String>>,
    #[serde(default)]
    names_from_user: Option<Vec<String>>,
    #[serde(default)]
    test_code: Option<String>,
    #[serde(default)]
    correct_code: Option<String>,
}

/// A question answered with a program, executed and scored remotely.
pub struct CodeQuestion {
    location: String,
    desc: CodeDesc,
}

impl CodeQuestion {
    pub fn from_desc(
        _vctx: &mut ValidationContext,
        location: &str,
        desc: &serde_json::Value,
    ) -> Result<Self, ValidationError> {
        let desc: CodeDesc = deserialize_desc(location, desc)?;

        if !(desc.timeout > 0.0 && desc.timeout <= MAX_TIMEOUT_SECS) {
            return Err(ValidationError::new(
                location,
                format!(
                    "timeout must be between 0 and {MAX_TIMEOUT_SECS} seconds, got {}",
                    desc.timeout
                ),
            ));
        }

        Ok(Self {
            location: location.to_string(),
            desc,
        })
    }

    fn correct_answer_text(&self) -> Option<String> {
        self.desc.correct_code.as_deref().map(|code| {
            format!(
                "The following code is a valid answer:<pre>{}</pre>",
                html_escape(code)
            )
        })
    }

    fn request_for(&self, user_code: &str) -> RunRequest {
        RunRequest {
            setup_code: self.desc.setup_code.clone(),
            names_for_user: self.desc.names_for_user.clone(),
            names_from_user: self.desc.names_from_user.clone(),
            test_code: self.desc.test_code.clone(),
            ..RunRequest::for_user_code(user_code)
        }
    }

    fn escalate(&self, ctx: &PageContext, message: String) {
        ctx.notifier.notify(BrokenQuestionReport {
            course: ctx.course.clone(),
            page_id: self.desc.id.clone(),
            message,
        });
    }

    /// Assemble learner-facing feedback and correctness from a decoded
    /// response. Escalation for infrastructure failures happens here.
    fn feedback_from_response(
        &self,
        ctx: &PageContext,
        response: &RunResponse,
        user_code: &str,
    ) -> Result<AnswerFeedback, PageError> {
        use runner::RunOutcome;

        let mut parts: Vec<String> = Vec::new();

        if response.result.is_infrastructure_failure() {
            self.escalate(ctx, broken_report_body(response, user_code));
            parts.push(GRADING_FAILED_APOLOGY.to_string());
        } else {
            match response.result {
                RunOutcome::UserCompileError => {
                    parts.push(
                        "<p>Your code failed to compile. An error message is below.</p>"
                            .to_string(),
                    );
                }
                RunOutcome::UserError => {
                    parts.push(
                        "<p>Your code failed with an exception. A traceback is below.</p>"
                            .to_string(),
                    );
                }
                _ => {}
            }
        }

        // Points drive correctness for every result kind; the partial-credit
        // summary appears only when the service awarded one.
        let correctness = response.points;
        if correctness.is_some() {
            parts.push(format!("<p><b>{}</b></p>", auto_feedback(correctness)));
        }

        if let Some(items) = response.feedback.as_deref().filter(|f| !f.is_empty()) {
            let list = items
                .iter()
                .map(|item| format!("<li>{}</li>", html_escape(item)))
                .collect::<String>();
            parts.push(format!(
                "<p>Here is some feedback on your code:<ul>{list}</ul></p>"
            ));
        }
        if let Some(traceback) = response.traceback.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!(
                "<p>This is the exception traceback:<pre>{}</pre></p>",
                html_escape(traceback)
            ));
        }
        if let Some(stdout) = response.stdout.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!(
                "<p>Your code printed the following output:<pre>{}</pre></p>",
                html_escape(stdout)
            ));
        }
        if let Some(stderr) = response.stderr.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!(
                "<p>Your code printed the following error messages:<pre>{}</pre></p>",
                html_escape(stderr)
            ));
        }

        AnswerFeedback::new(
            correctness,
            self.correct_answer_text(),
            Some(parts.concat()),
            NormalizedAnswer::Unavailable,
        )
    }
}

#[async_trait]
impl Page for CodeQuestion {
    fn id(&self) -> &str {
        &self.desc.id
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn title(&self, _ctx: &PageContext, _page_data: &PageData) -> String {
        self.desc.title.clone()
    }

    fn body(&self, ctx: &PageContext, _page_data: &PageData) -> String {
        ctx.render_markup(&self.desc.prompt)
    }

    fn expects_answer(&self) -> bool {
        true
    }

    fn max_points(&self, _page_data: &PageData) -> f64 {
        self.desc.value
    }

    fn render(
        &self,
        _ctx: &PageContext,
        _page_data: &PageData,
        answer_data: Option<&AnswerData>,
        answer_is_final: bool,
    ) -> Result<PageForm, PageError> {
        let value = match answer_data {
            Some(data) => Some(
                data.as_answer()
                    .ok_or_else(|| PageError::answer_shape(&self.location))?
                    .to_string(),
            ),
            None => None,
        };
        Ok(PageForm::code(value, answer_is_final))
    }

    fn parse_submission(
        &self,
        _ctx: &PageContext,
        _page_data: &PageData,
        raw: &str,
    ) -> Result<AnswerData, SubmissionError> {
        if raw.trim().is_empty() {
            return Err(SubmissionError::new("answer", "code may not be empty"));
        }
        Ok(AnswerData::text(raw))
    }

    async fn grade(
        &self,
        ctx: &PageContext,
        _page_data: &PageData,
        answer_data: Option<&AnswerData>,
        _grade_data: Option<&GradeData>,
    ) -> Result<Option<AnswerFeedback>, PageError> {
        // No answer: grade locally, never contact the run service.
        let Some(data) = answer_data else {
            return Ok(Some(AnswerFeedback::no_answer(self.correct_answer_text())));
        };
        let user_code = data
            .as_answer()
            .ok_or_else(|| PageError::answer_shape(&self.location))?;

        let request = self.request_for(user_code);
        let timeout = Duration::from_secs_f64(self.desc.timeout);

        match ctx.runner.run(&request, timeout).await {
            Ok(response) => Ok(Some(self.feedback_from_response(ctx, &response, user_code)?)),
            Err(RunError::Protocol(message)) => Err(PageError::Config(format!(
                "{}: {message}",
                self.location
            ))),
            Err(error @ (RunError::Io(_) | RunError::Timeout(_))) => {
                self.escalate(ctx, failed_request_body(&error.to_string(), user_code));
                Ok(Some(AnswerFeedback::new(
                    None,
                    self.correct_answer_text(),
                    Some(GRADING_FAILED_APOLOGY.to_string()),
                    NormalizedAnswer::Unavailable,
                )?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runner::RunOutcome;
    use serde_json::json;

    fn question(correct_code: Option<&str>) -> CodeQuestion {
        let mut vctx = ValidationContext::new();
        let mut desc = json!({
            "type": "CodeQuestion",
            "id": "fib",
            "title": "Fibonacci",
            "value": 2.0,
            "prompt": "Write fib(n).",
            "timeout": 5.0,
            "test_code": "check(fib)",
        });
        if let Some(code) = correct_code {
            desc["correct_code"] = json!(code);
        }
        CodeQuestion::from_desc(&mut vctx, "quiz, page 4", &desc).unwrap()
    }

    #[test]
    fn test_out_of_range_timeout_is_fatal() {
        let mut vctx = ValidationContext::new();
        // values that are non-positive, absurdly large, or not a number
        // would otherwise reach Duration construction at grade time
        for timeout in [0.0, -1.0, 1e30, f64::NAN] {
            let desc = json!({
                "type": "CodeQuestion",
                "id": "fib",
                "title": "Fibonacci",
                "value": 2.0,
                "prompt": "Write fib(n).",
                "timeout": timeout,
            });
            assert!(CodeQuestion::from_desc(&mut vctx, "quiz, page 4", &desc).is_err());
        }
    }

    #[test]
    fn test_request_carries_descriptor_fields() {
        let q = question(None);
        let req = q.request_for("def fib(n): return n");
        assert!(!req.compile_only);
        assert_eq!(req.test_code.as_deref(), Some("check(fib)"));
        assert!(req.setup_code.is_none());
    }

    #[test]
    fn test_correct_code_is_escaped() {
        let q = question(Some("def fib(n):\n    return n if n < 2 else 1"));
        let text = q.correct_answer_text().unwrap();
        assert!(text.starts_with("The following code is a valid answer:<pre>"));
        assert!(text.contains("n &lt; 2"));
    }

    #[test]
    fn test_success_response_feedback() {
        let q = question(None);
        let ctx = crate::test_support::test_ctx();
        let response = RunResponse {
            result: RunOutcome::Success,
            points: Some(0.8),
            feedback: Some(vec!["edge case n=0 failed".into()]),
            traceback: None,
            stdout: None,
            stderr: None,
        };

        let fb = q.feedback_from_response(&ctx, &response, "code").unwrap();
        assert_eq!(fb.correctness, Some(0.8));
        assert!(fb.feedback.contains("mostly correct"));
        assert!(fb.feedback.contains("<li>edge case n=0 failed</li>"));
    }

    #[test]
    fn test_user_error_is_not_escalated() {
        use std::sync::Arc;

        let q = question(None);
        let notifier = Arc::new(runner::MemoryNotifier::new());
        let ctx = PageContext::new(
            "test-course",
            Arc::new(util::markup::PlainHtml),
            runner::RunClient::new("localhost", 1),
            notifier.clone(),
        );
        let response = RunResponse {
            result: RunOutcome::UserError,
            points: None,
            feedback: None,
            traceback: Some("ZeroDivisionError".into()),
            stdout: None,
            stderr: None,
        };

        let fb = q.feedback_from_response(&ctx, &response, "code").unwrap();
        // without points the correctness stays indeterminate and no
        // partial-credit summary is shown
        assert_eq!(fb.correctness, None);
        assert!(!fb.feedback.contains("could not be determined"));
        assert!(fb.feedback.contains("failed with an exception"));
        assert!(fb.feedback.contains("ZeroDivisionError"));
        assert!(notifier.reports().is_empty());
    }

    #[test]
    fn test_points_drive_correctness_for_every_result_kind() {
        let q = question(None);
        let ctx = crate::test_support::test_ctx();
        let response = RunResponse {
            result: RunOutcome::UserError,
            points: Some(0.5),
            feedback: None,
            traceback: Some("IndexError".into()),
            stdout: None,
            stderr: None,
        };

        let fb = q.feedback_from_response(&ctx, &response, "code").unwrap();
        assert_eq!(fb.correctness, Some(0.5));
        assert!(fb.feedback.contains("failed with an exception"));
        assert!(fb.feedback.contains("somewhat correct"));
    }

    #[test]
    fn test_infrastructure_failure_is_escalated() {
        use std::sync::Arc;

        let q = question(None);
        let notifier = Arc::new(runner::MemoryNotifier::new());
        let ctx = PageContext::new(
            "test-course",
            Arc::new(util::markup::PlainHtml),
            runner::RunClient::new("localhost", 1),
            notifier.clone(),
        );
        let response = RunResponse {
            result: RunOutcome::TestError,
            points: Some(1.0),
            feedback: None,
            traceback: Some("KeyError in test".into()),
            stdout: None,
            stderr: None,
        };

        let fb = q
            .feedback_from_response(&ctx, &response, "def f(): pass")
            .unwrap();
        // a broken run still apologizes and escalates, but awarded points
        // are reported as usual
        assert_eq!(fb.correctness, Some(1.0));
        assert!(fb.feedback.contains("Sorry about that"));

        let reports = notifier.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].page_id, "fib");
        assert!(reports[0].message.contains("RESULT: test_error"));
        assert!(reports[0].message.contains("def f(): pass"));
    }
}

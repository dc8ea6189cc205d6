//! # Pages Library
//!
//! Core logic for presenting and grading the pages of a course flow. A page
//! is one unit of course content: static prose, a text question, a choice
//! question, or a code question graded by a sandboxed execution service.
//!
//! ## Key Concepts
//! - **Page**: the polymorphic lifecycle contract every page type implements
//!   (generate page data once, render, parse a submission, grade).
//! - **Matchers**: pluggable strategies for scoring text answers against
//!   authored patterns.
//! - **AnswerFeedback**: the uniform record every grading outcome is
//!   normalized into.
//! - **Registry**: static lookup from a descriptor's type tag to the page
//!   type that validates and owns it.

pub mod choice;
pub mod code;
pub mod content;
pub mod data;
pub mod error;
pub mod feedback;
pub mod form;
pub mod matchers;
pub mod permute;
pub mod registry;
pub mod symbolic;
pub mod text;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use runner::{Notifier, RunClient};
use util::markup::MarkupRenderer;

use crate::data::{AnswerData, GradeData, PageData};
use crate::error::{PageError, SubmissionError};
use crate::feedback::AnswerFeedback;
use crate::form::PageForm;

/// Everything a page needs from the surrounding system to render and grade:
/// the course identity (for escalation reports), the markup collaborator,
/// the execution-service client, and the operator-escalation port.
#[derive(Clone)]
pub struct PageContext {
    pub course: String,
    pub markup: Arc<dyn MarkupRenderer>,
    pub runner: RunClient,
    pub notifier: Arc<dyn Notifier>,
}

impl PageContext {
    pub fn new(
        course: impl Into<String>,
        markup: Arc<dyn MarkupRenderer>,
        runner: RunClient,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            course: course.into(),
            markup,
            runner,
            notifier,
        }
    }

    pub fn render_markup(&self, text: &str) -> String {
        self.markup.render(text)
    }
}

/// The abstract contract of a flow page.
///
/// Lifecycle: page data is generated exactly once per learner-visit and then
/// persisted by the caller; render and grade receive that same stored value
/// on every call. Grading is a pure function of descriptor, page data, and
/// answer data — the only side effects are the code question's round trip to
/// the execution service and its operator escalation.
#[async_trait]
pub trait Page: Send + Sync {
    /// The page identifier from the descriptor.
    fn id(&self) -> &str;

    /// A location string for error reporting.
    fn location(&self) -> &str;

    /// Generate the per-learner-visit data for this page (e.g. a choice
    /// permutation). Called exactly once per visit; the result is persisted
    /// and never regenerated, so re-randomizing here cannot change grading
    /// for an attempt in progress.
    fn make_page_data(&self) -> PageData {
        PageData::default()
    }

    /// The plain-text title of this page.
    fn title(&self, ctx: &PageContext, page_data: &PageData) -> String;

    /// The HTML body of this page.
    fn body(&self, ctx: &PageContext, page_data: &PageData) -> String;

    /// Whether this page takes an answer at all. When false, the render,
    /// parse, and grade operations do not apply.
    fn expects_answer(&self) -> bool;

    /// How many points are achievable on this page.
    fn max_points(&self, _page_data: &PageData) -> f64 {
        0.0
    }

    /// Build the input surface for this page, pre-populated from
    /// `answer_data` when present. When `answer_is_final` is true the
    /// surface must be read-only.
    fn render(
        &self,
        _ctx: &PageContext,
        _page_data: &PageData,
        _answer_data: Option<&AnswerData>,
        _answer_is_final: bool,
    ) -> Result<PageForm, PageError> {
        Err(PageError::no_answer_expected(self.location()))
    }

    /// Validate raw submitted input and extract the persistable answer data.
    /// Failures are field-level and recoverable: the learner is asked to
    /// resubmit and no grade is recorded.
    fn parse_submission(
        &self,
        _ctx: &PageContext,
        _page_data: &PageData,
        _raw: &str,
    ) -> Result<AnswerData, SubmissionError> {
        Err(SubmissionError::new(
            "answer",
            "this page does not take an answer",
        ))
    }

    /// Grade the answer in `answer_data`.
    ///
    /// `answer_data` of `None` means no answer was submitted and always
    /// grades as correctness 0 with a "No answer provided." feedback.
    /// `Ok(None)` means the grade is not yet available (deferred or human
    /// grading). Expected failure classes never escape this method; only
    /// contract violations may.
    async fn grade(
        &self,
        _ctx: &PageContext,
        _page_data: &PageData,
        _answer_data: Option<&AnswerData>,
        _grade_data: Option<&GradeData>,
    ) -> Result<Option<AnswerFeedback>, PageError> {
        Err(PageError::no_answer_expected(self.location()))
    }
}

impl fmt::Debug for dyn Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page").field("id", &self.id()).finish()
    }
}

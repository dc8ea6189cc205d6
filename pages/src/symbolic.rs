//! Deprecated symbolic-equivalence questions.
//!
//! Kept only for older course content; new content should use a text
//! question with a `<sym_expr>` matcher, which grades identically. Using
//! this page type emits a validation warning.

use async_trait::async_trait;
use serde::Deserialize;
use util::validation::{ValidationContext, ValidationError};

use crate::data::{AnswerData, GradeData, PageData};
use crate::error::{PageError, SubmissionError};
use crate::feedback::{AnswerFeedback, NormalizedAnswer};
use crate::form::PageForm;
use crate::matchers::symexpr::{self, Expr};
use crate::registry::deserialize_desc;
use crate::{Page, PageContext};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SymbolicDesc {
    #[serde(rename = "type")]
    _type: String,
    id: String,
    title: String,
    value: f64,
    prompt: String,
    answers: Vec<String>,
}

/// A question graded by algebraic equivalence with any of its authored
/// answers.
#[derive(Debug)]
pub struct SymbolicQuestion {
    location: String,
    desc: SymbolicDesc,
    answers: Vec<Expr>,
}

impl SymbolicQuestion {
    pub fn from_desc(
        vctx: &mut ValidationContext,
        location: &str,
        desc: &serde_json::Value,
    ) -> Result<Self, ValidationError> {
        vctx.add_warning(
            location,
            "uses deprecated SymbolicQuestion; use a TextQuestion with a \
             '<sym_expr>' answer instead",
        );

        let desc: SymbolicDesc = deserialize_desc(location, desc)?;

        if desc.answers.is_empty() {
            return Err(ValidationError::new(location, "at least one answer expected"));
        }
        let answers = desc
            .answers
            .iter()
            .enumerate()
            .map(|(i, answer)| {
                symexpr::parse(answer).map_err(|e| {
                    ValidationError::new(
                        format!("{location}, answer {}", i + 1),
                        e.to_string(),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            location: location.to_string(),
            desc,
            answers,
        })
    }

    fn correct_answer_sentence(&self) -> String {
        format!("A correct answer is: '{}'.", self.desc.answers[0])
    }
}

#[async_trait]
impl Page for SymbolicQuestion {
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
        Ok(PageForm::text(value, answer_is_final))
    }

    fn parse_submission(
        &self,
        _ctx: &PageContext,
        _page_data: &PageData,
        raw: &str,
    ) -> Result<AnswerData, SubmissionError> {
        let answer = raw.trim();
        if answer.is_empty() {
            return Err(SubmissionError::new("answer", "answer may not be empty"));
        }
        symexpr::parse(answer).map_err(|e| SubmissionError::new("answer", e.to_string()))?;
        Ok(AnswerData::text(answer))
    }

    async fn grade(
        &self,
        _ctx: &PageContext,
        _page_data: &PageData,
        answer_data: Option<&AnswerData>,
        _grade_data: Option<&GradeData>,
    ) -> Result<Option<AnswerFeedback>, PageError> {
        let correct_answer = self.correct_answer_sentence();

        let Some(data) = answer_data else {
            return Ok(Some(AnswerFeedback::no_answer(Some(correct_answer))));
        };
        let answer = data
            .as_answer()
            .ok_or_else(|| PageError::answer_shape(&self.location))?
            .trim();

        // A stored answer always went through parse_submission, so a parse
        // failure here is corrupt data.
        let candidate = symexpr::parse(answer).map_err(|e| {
            PageError::Config(format!("{}: stored answer did not parse: {e}", self.location))
        })?;

        let correctness = if self
            .answers
            .iter()
            .any(|expr| symexpr::equivalent(expr, &candidate))
        {
            1.0
        } else {
            0.0
        };

        Ok(Some(AnswerFeedback::new(
            Some(correctness),
            Some(correct_answer),
            None,
            NormalizedAnswer::Unavailable,
        )?))
    }
}

//! Free-text questions graded by the matcher engine.

use async_trait::async_trait;
use serde::Deserialize;
use util::validation::{ValidationContext, ValidationError};

use crate::data::{AnswerData, GradeData, PageData};
use crate::error::{PageError, SubmissionError};
use crate::feedback::{AnswerFeedback, NormalizedAnswer};
use crate::form::PageForm;
use crate::matchers::{Matcher, parse_matcher};
use crate::registry::deserialize_desc;
use crate::{Page, PageContext};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TextDesc {
    #[serde(rename = "type")]
    _type: String,
    id: String,
    title: String,
    value: f64,
    prompt: String,
    answers: Vec<String>,
}

/// A question answered with one line of text, scored as the maximum over
/// its matchers.
#[derive(Debug)]
pub struct TextQuestion {
    location: String,
    desc: TextDesc,
    matchers: Vec<Matcher>,
}

impl TextQuestion {
    pub fn from_desc(
        vctx: &mut ValidationContext,
        location: &str,
        desc: &serde_json::Value,
    ) -> Result<Self, ValidationError> {
        let desc: TextDesc = deserialize_desc(location, desc)?;

        if desc.answers.is_empty() {
            return Err(ValidationError::new(location, "at least one answer expected"));
        }

        let matchers = desc
            .answers
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                parse_matcher(vctx, &format!("{location}, answer {}", i + 1), spec)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // The no-answer and wrong-answer feedback both need a canonical
        // correct answer; a question made only of pattern matchers cannot
        // supply one.
        if !matchers
            .iter()
            .any(|m| m.correct_answer_text().is_some())
        {
            return Err(ValidationError::new(
                location,
                "no matcher is able to provide a plain-text correct answer",
            ));
        }

        Ok(Self {
            location: location.to_string(),
            desc,
            matchers,
        })
    }

    fn correct_answer_sentence(&self) -> Result<String, PageError> {
        let Some(text) = self
            .matchers
            .iter()
            .find_map(|m| m.correct_answer_text())
        else {
            return Err(PageError::Config(format!(
                "{}: no canonical correct answer available",
                self.location
            )));
        };
        Ok(format!("A correct answer is: '{text}'."))
    }

    fn any_case_sensitive(&self) -> bool {
        self.matchers.iter().any(Matcher::is_case_sensitive)
    }
}

#[async_trait]
impl Page for TextQuestion {
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
        for matcher in &self.matchers {
            matcher.validate(answer)?;
        }
        Ok(AnswerData::text(answer))
    }

    async fn grade(
        &self,
        _ctx: &PageContext,
        _page_data: &PageData,
        answer_data: Option<&AnswerData>,
        _grade_data: Option<&GradeData>,
    ) -> Result<Option<AnswerFeedback>, PageError> {
        let correct_answer = self.correct_answer_sentence()?;

        let Some(data) = answer_data else {
            return Ok(Some(AnswerFeedback::no_answer(Some(correct_answer))));
        };
        let answer = data
            .as_answer()
            .ok_or_else(|| PageError::answer_shape(&self.location))?
            .trim();

        let scored: Vec<(f64, Option<&str>)> = self
            .matchers
            .iter()
            .map(|m| (m.grade(answer), m.correct_answer_text()))
            .collect();
        let correctness = scored
            .iter()
            .map(|(score, _)| *score)
            .fold(0.0_f64, f64::max);

        // Prefer the correct-answer text of a matcher that achieved the
        // best score, falling back to any matcher that can supply one.
        let best_text = scored
            .iter()
            .filter(|(score, _)| *score == correctness)
            .find_map(|(_, text)| *text);
        let correct_answer = match best_text {
            Some(text) => format!("A correct answer is: '{text}'."),
            None => correct_answer,
        };

        let normalized = if self.any_case_sensitive() {
            answer.to_string()
        } else {
            answer.to_lowercase()
        };

        Ok(Some(AnswerFeedback::new(
            Some(correctness),
            Some(correct_answer),
            None,
            NormalizedAnswer::Text(normalized),
        )?))
    }
}

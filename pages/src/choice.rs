//! Multiple-choice questions with a persisted display permutation.

use async_trait::async_trait;
use serde::Deserialize;
use util::content::remove_prefix;
use util::validation::{ValidationContext, ValidationError};

use crate::data::{AnswerData, GradeData, PageData};
use crate::error::{PageError, SubmissionError};
use crate::feedback::{AnswerFeedback, NormalizedAnswer};
use crate::form::{ChoiceOption, PageForm};
use crate::permute::{is_permutation, make_permutation};
use crate::registry::deserialize_desc;
use crate::{Page, PageContext};

/// Authoring-time marker on correct options, stripped before display.
const CORRECT_TAG: &str = "~CORRECT~";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChoiceDesc {
    #[serde(rename = "type")]
    _type: String,
    id: String,
    title: String,
    value: f64,
    prompt: String,
    choices: Vec<String>,
    #[serde(default)]
    shuffle: bool,
}

/// A single-selection choice question. Options are shown in the permuted
/// order stored in `PageData`; grading maps the chosen display index back to
/// the authored option.
#[derive(Debug)]
pub struct ChoiceQuestion {
    location: String,
    desc: ChoiceDesc,
}

impl ChoiceQuestion {
    pub fn from_desc(
        _vctx: &mut ValidationContext,
        location: &str,
        desc: &serde_json::Value,
    ) -> Result<Self, ValidationError> {
        let desc: ChoiceDesc = deserialize_desc(location, desc)?;

        let correct_count = desc
            .choices
            .iter()
            .filter(|choice| choice.starts_with(CORRECT_TAG))
            .count();
        if correct_count == 0 {
            return Err(ValidationError::new(
                location,
                format!(
                    "one or more correct answer(s) expected, {correct_count} found"
                ),
            ));
        }

        Ok(Self {
            location: location.to_string(),
            desc,
        })
    }

    fn is_correct(&self, source_index: usize) -> bool {
        self.desc.choices[source_index].starts_with(CORRECT_TAG)
    }

    /// Strip the correctness marker and render the option text.
    fn process_choice(&self, ctx: &PageContext, source_index: usize) -> String {
        ctx.render_markup(remove_prefix(CORRECT_TAG, &self.desc.choices[source_index]))
    }

    fn permutation<'a>(&self, page_data: &'a PageData) -> Result<&'a [usize], PageError> {
        let perm = page_data.permutation.as_deref().ok_or_else(|| {
            PageError::Config(format!("{}: page data has no permutation", self.location))
        })?;
        if !is_permutation(perm, self.desc.choices.len()) {
            return Err(PageError::Config(format!(
                "{}: stored permutation does not match the choice count",
                self.location
            )));
        }
        Ok(perm)
    }

    fn correct_answer_text(&self, ctx: &PageContext) -> Result<String, PageError> {
        let Some(source_index) = (0..self.desc.choices.len()).find(|&i| self.is_correct(i))
        else {
            return Err(PageError::Config(format!(
                "{}: no correct choice found",
                self.location
            )));
        };
        Ok(format!(
            "A correct answer is: {}",
            self.process_choice(ctx, source_index)
        ))
    }
}

#[async_trait]
impl Page for ChoiceQuestion {
    fn id(&self) -> &str {
        &self.desc.id
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn make_page_data(&self) -> PageData {
        PageData {
            permutation: Some(make_permutation(self.desc.choices.len(), self.desc.shuffle)),
        }
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
        ctx: &PageContext,
        page_data: &PageData,
        answer_data: Option<&AnswerData>,
        answer_is_final: bool,
    ) -> Result<PageForm, PageError> {
        let perm = self.permutation(page_data)?;

        let options = perm
            .iter()
            .enumerate()
            .map(|(display_index, &source_index)| ChoiceOption {
                index: display_index,
                html: self.process_choice(ctx, source_index),
            })
            .collect();

        let selected = match answer_data {
            Some(data) => Some(
                data.as_choice()
                    .ok_or_else(|| PageError::answer_shape(&self.location))?,
            ),
            None => None,
        };

        Ok(PageForm::choices(options, selected, answer_is_final))
    }

    fn parse_submission(
        &self,
        _ctx: &PageContext,
        page_data: &PageData,
        raw: &str,
    ) -> Result<AnswerData, SubmissionError> {
        let display_index: usize = raw
            .trim()
            .parse()
            .map_err(|_| SubmissionError::new("choice", "a choice must be selected"))?;

        let option_count = page_data
            .permutation
            .as_ref()
            .map(Vec::len)
            .unwrap_or(self.desc.choices.len());
        if display_index >= option_count {
            return Err(SubmissionError::new(
                "choice",
                "the selected choice does not exist",
            ));
        }

        Ok(AnswerData::choice(display_index))
    }

    async fn grade(
        &self,
        ctx: &PageContext,
        page_data: &PageData,
        answer_data: Option<&AnswerData>,
        _grade_data: Option<&GradeData>,
    ) -> Result<Option<AnswerFeedback>, PageError> {
        let correct_answer = self.correct_answer_text(ctx)?;

        let Some(data) = answer_data else {
            return Ok(Some(AnswerFeedback::no_answer(Some(correct_answer))));
        };
        let display_index = data
            .as_choice()
            .ok_or_else(|| PageError::answer_shape(&self.location))?;

        let perm = self.permutation(page_data)?;
        let source_index = *perm.get(display_index).ok_or_else(|| {
            PageError::Config(format!(
                "{}: stored choice {display_index} is out of range",
                self.location
            ))
        })?;

        let correctness = if self.is_correct(source_index) { 1.0 } else { 0.0 };

        Ok(Some(AnswerFeedback::new(
            Some(correctness),
            Some(correct_answer),
            None,
            NormalizedAnswer::Text(self.process_choice(ctx, source_index)),
        )?))
    }
}

//! Input surfaces produced by page rendering.
//!
//! A [`PageForm`] is the structured description of the single input a page
//! presents: a text line, a code area, or a radio-button choice list. The
//! caller embeds the HTML rendering into its own form chrome.

use util::markup::html_escape;

/// One selectable option, keyed by its display index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub index: usize,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Text {
        value: Option<String>,
    },
    Code {
        value: Option<String>,
    },
    Choice {
        options: Vec<ChoiceOption>,
        selected: Option<usize>,
    },
}

/// An input surface, pre-populated with any stored answer. `read_only` is
/// set once the answer is final.
#[derive(Debug, Clone, PartialEq)]
pub struct PageForm {
    pub field: FormField,
    pub read_only: bool,
}

impl PageForm {
    pub fn text(value: Option<String>, read_only: bool) -> Self {
        Self {
            field: FormField::Text { value },
            read_only,
        }
    }

    pub fn code(value: Option<String>, read_only: bool) -> Self {
        Self {
            field: FormField::Code { value },
            read_only,
        }
    }

    pub fn choices(options: Vec<ChoiceOption>, selected: Option<usize>, read_only: bool) -> Self {
        Self {
            field: FormField::Choice { options, selected },
            read_only,
        }
    }

    pub fn to_html(&self) -> String {
        match &self.field {
            FormField::Text { value } => format!(
                r#"<input type="text" name="answer" value="{}" autofocus{}>"#,
                html_escape(value.as_deref().unwrap_or("")),
                if self.read_only { " readonly" } else { "" }
            ),
            FormField::Code { value } => format!(
                r#"<textarea name="answer" class="code" autofocus{}>{}</textarea>"#,
                if self.read_only { " readonly" } else { "" },
                html_escape(value.as_deref().unwrap_or(""))
            ),
            FormField::Choice { options, selected } => options
                .iter()
                .map(|option| {
                    format!(
                        r#"<label><input type="radio" name="choice" value="{}"{}{}> {}</label>"#,
                        option.index,
                        if *selected == Some(option.index) {
                            " checked"
                        } else {
                            ""
                        },
                        if self.read_only { " disabled" } else { "" },
                        option.html
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

//! Static content pages. No answer, no grading.

use serde::Deserialize;
use util::validation::{ValidationContext, ValidationError};

use crate::registry::deserialize_desc;
use crate::{Page, PageContext};
use crate::data::PageData;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ContentDesc {
    #[serde(rename = "type")]
    _type: String,
    id: String,
    title: String,
    content: String,
}

/// A page of static prose.
pub struct ContentPage {
    location: String,
    desc: ContentDesc,
}

impl ContentPage {
    pub fn from_desc(
        _vctx: &mut ValidationContext,
        location: &str,
        desc: &serde_json::Value,
    ) -> Result<Self, ValidationError> {
        let desc: ContentDesc = deserialize_desc(location, desc)?;
        Ok(Self {
            location: location.to_string(),
            desc,
        })
    }
}

impl Page for ContentPage {
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
        ctx.render_markup(&self.desc.content)
    }

    fn expects_answer(&self) -> bool {
        false
    }
}

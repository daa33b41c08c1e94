//! Research area model matching `research.json`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::form::{self, FieldValues, FormField, ListSeparator};
use super::ContentItem;
use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchArea {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Keys the edit form does not manage, preserved as read.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const SCHEMA: &[FormField] = &[
    FormField::text("title", "Title").required(),
    FormField::text("subtitle", "Subtitle"),
    FormField::text_area("description", "Description"),
    FormField::list("keywords", "Keywords", ListSeparator::Comma),
];

impl ContentItem for ResearchArea {
    fn id(&self) -> &str {
        &self.id
    }

    fn schema() -> &'static [FormField] {
        SCHEMA
    }

    fn to_fields(&self) -> FieldValues {
        FieldValues::from([
            ("title".to_string(), self.title.clone()),
            ("subtitle".to_string(), self.subtitle.clone()),
            ("description".to_string(), self.description.clone()),
            (
                "keywords".to_string(),
                form::join_list(&self.keywords, ListSeparator::Comma),
            ),
        ])
    }

    fn from_fields(id: String, fields: &FieldValues) -> Result<Self, AppError> {
        Ok(Self {
            id,
            title: form::required(fields, "title")?,
            subtitle: form::optional(fields, "subtitle"),
            description: form::optional(fields, "description"),
            keywords: form::list(fields, "keywords", ListSeparator::Comma),
            extra: Map::new(),
        })
    }

    fn keep_unmanaged(&mut self, previous: &Self) {
        self.extra = previous.extra.clone();
    }
}

//! News item model matching `news.json`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::form::{self, FieldValues, FormField};
use super::ContentItem;
use crate::errors::AppError;

/// A dated news entry. The collection is kept newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub text: String,
    /// Keys the edit form does not manage, preserved as read.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const SCHEMA: &[FormField] = &[
    FormField::text("date", "Date").required(),
    FormField::text_area("text", "Text").required(),
];

impl ContentItem for NewsItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn schema() -> &'static [FormField] {
        SCHEMA
    }

    fn to_fields(&self) -> FieldValues {
        FieldValues::from([
            ("date".to_string(), self.date.clone()),
            ("text".to_string(), self.text.clone()),
        ])
    }

    fn from_fields(id: String, fields: &FieldValues) -> Result<Self, AppError> {
        Ok(Self {
            id,
            date: form::required(fields, "date")?,
            text: form::required(fields, "text")?,
            extra: Map::new(),
        })
    }

    fn keep_unmanaged(&mut self, previous: &Self) {
        self.extra = previous.extra.clone();
    }
}

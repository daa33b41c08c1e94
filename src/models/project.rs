//! Project model matching `projects.json`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::form::{self, FieldValues, FormField, ListSeparator};
use super::ContentItem;
use crate::errors::AppError;

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Exploratory,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Exploratory => "exploratory",
            ProjectStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProjectStatus::Active),
            "exploratory" => Some(ProjectStatus::Exploratory),
            "completed" => Some(ProjectStatus::Completed),
            _ => None,
        }
    }
}

/// A project listed on the projects page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub status: ProjectStatus,
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
    FormField::select("status", "Status", &["active", "exploratory", "completed"]),
    FormField::text_area("description", "Description"),
    FormField::list("keywords", "Keywords", ListSeparator::Comma),
];

impl ContentItem for Project {
    fn id(&self) -> &str {
        &self.id
    }

    fn schema() -> &'static [FormField] {
        SCHEMA
    }

    fn to_fields(&self) -> FieldValues {
        FieldValues::from([
            ("title".to_string(), self.title.clone()),
            ("status".to_string(), self.status.as_str().to_string()),
            ("description".to_string(), self.description.clone()),
            (
                "keywords".to_string(),
                form::join_list(&self.keywords, ListSeparator::Comma),
            ),
        ])
    }

    fn from_fields(id: String, fields: &FieldValues) -> Result<Self, AppError> {
        let status = form::required(fields, "status")?;
        let status = ProjectStatus::parse(&status)
            .ok_or_else(|| AppError::Validation(format!("Unknown project status '{}'", status)))?;

        Ok(Self {
            id,
            title: form::required(fields, "title")?,
            status,
            description: form::optional(fields, "description"),
            keywords: form::list(fields, "keywords", ListSeparator::Comma),
            extra: Map::new(),
        })
    }

    fn keep_unmanaged(&mut self, previous: &Self) {
        self.extra = previous.extra.clone();
    }
}

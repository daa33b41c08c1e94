//! Opportunity model matching `opportunities.json`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::form::{self, FieldValues, FormField, ListSeparator};
use super::ContentItem;
use crate::errors::AppError;

/// Whether an opportunity accepts applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityStatus {
    Open,
    Closed,
}

impl OpportunityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityStatus::Open => "open",
            OpportunityStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(OpportunityStatus::Open),
            "closed" => Some(OpportunityStatus::Closed),
            _ => None,
        }
    }
}

/// A fellowship or position advertised on the opportunities page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub status: OpportunityStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub commitment: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub screening_questions: Vec<String>,
    /// Path of the downloadable application form.
    #[serde(default)]
    pub download_file: String,
    /// Keys the edit form does not manage, preserved as read.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const SCHEMA: &[FormField] = &[
    FormField::text("title", "Title").required(),
    FormField::select("status", "Status", &["open", "closed"]),
    FormField::text_area("description", "Description"),
    FormField::text("commitment", "Commitment"),
    FormField::text_area("background", "Background"),
    FormField::list("benefits", "Benefits (one per line)", ListSeparator::Newline),
    FormField::list(
        "screeningQuestions",
        "Screening questions (one per line)",
        ListSeparator::Newline,
    ),
    FormField::text("downloadFile", "Download file"),
];

impl ContentItem for Opportunity {
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
            ("commitment".to_string(), self.commitment.clone()),
            ("background".to_string(), self.background.clone()),
            (
                "benefits".to_string(),
                form::join_list(&self.benefits, ListSeparator::Newline),
            ),
            (
                "screeningQuestions".to_string(),
                form::join_list(&self.screening_questions, ListSeparator::Newline),
            ),
            ("downloadFile".to_string(), self.download_file.clone()),
        ])
    }

    fn from_fields(id: String, fields: &FieldValues) -> Result<Self, AppError> {
        let status = form::required(fields, "status")?;
        let status = OpportunityStatus::parse(&status).ok_or_else(|| {
            AppError::Validation(format!("Unknown opportunity status '{}'", status))
        })?;

        Ok(Self {
            id,
            title: form::required(fields, "title")?,
            status,
            description: form::optional(fields, "description"),
            commitment: form::optional(fields, "commitment"),
            background: form::optional(fields, "background"),
            benefits: form::list(fields, "benefits", ListSeparator::Newline),
            screening_questions: form::list(fields, "screeningQuestions", ListSeparator::Newline),
            download_file: form::optional(fields, "downloadFile"),
            extra: Map::new(),
        })
    }

    fn keep_unmanaged(&mut self, previous: &Self) {
        self.extra = previous.extra.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_round_trip_through_form() {
        let json = r#"{
            "id": "opportunity-1",
            "title": "Research Fellow",
            "status": "open",
            "description": "Join us",
            "commitment": "10h/week",
            "background": "Any",
            "benefits": ["Mentoring", "Stipend"],
            "screeningQuestions": ["Why us?"],
            "downloadFile": "files/form.pdf"
        }"#;
        let original: Opportunity = serde_json::from_str(json).unwrap();
        let rebuilt = Opportunity::from_fields(original.id.clone(), &original.to_fields()).unwrap();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_rejects_unknown_status() {
        let fields = FieldValues::from([
            ("title".to_string(), "Intern".to_string()),
            ("status".to_string(), "pending".to_string()),
        ]);
        let err = Opportunity::from_fields("opportunity-2".to_string(), &fields).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

//! Person model matching the entries of `people.json`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::form::{self, FieldValues, FormField};
use super::ContentItem;
use crate::errors::AppError;

/// The three groups a person can be listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubCategory {
    Leads,
    Fellows,
    Alumni,
}

impl SubCategory {
    pub const ALL: [SubCategory; 3] = [SubCategory::Leads, SubCategory::Fellows, SubCategory::Alumni];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubCategory::Leads => "leads",
            SubCategory::Fellows => "fellows",
            SubCategory::Alumni => "alumni",
        }
    }
}

impl fmt::Display for SubCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "leads" => Ok(SubCategory::Leads),
            "fellows" => Ok(SubCategory::Fellows),
            "alumni" => Ok(SubCategory::Alumni),
            other => Err(AppError::Validation(format!(
                "Unknown people category '{}'",
                other
            ))),
        }
    }
}

/// External profile links for a person. Only `linkedin` is editable; other links are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A person shown on the people page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub photo: String,
    /// Free-text research interests, rendered verbatim.
    #[serde(default)]
    pub keywords: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<PersonLinks>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Form field holding the group a person is listed under.
pub const CATEGORY_FIELD: &str = "category";

const SCHEMA: &[FormField] = &[
    FormField::select(CATEGORY_FIELD, "Category", &["leads", "fellows", "alumni"]),
    FormField::text("name", "Name").required(),
    FormField::text("photo", "Photo path"),
    FormField::text("keywords", "Keywords"),
    FormField::url("linkedin", "LinkedIn URL"),
];

impl ContentItem for Person {
    fn id(&self) -> &str {
        &self.id
    }

    fn schema() -> &'static [FormField] {
        SCHEMA
    }

    fn to_fields(&self) -> FieldValues {
        let linkedin = self
            .links
            .as_ref()
            .and_then(|l| l.linkedin.clone())
            .unwrap_or_default();
        FieldValues::from([
            ("name".to_string(), self.name.clone()),
            ("photo".to_string(), self.photo.clone()),
            ("keywords".to_string(), self.keywords.clone()),
            ("linkedin".to_string(), linkedin),
        ])
    }

    fn from_fields(id: String, fields: &FieldValues) -> Result<Self, AppError> {
        let linkedin = form::optional(fields, "linkedin");
        Ok(Self {
            id,
            name: form::required(fields, "name")?,
            photo: form::optional(fields, "photo"),
            keywords: form::optional(fields, "keywords"),
            links: (!linkedin.is_empty()).then(|| PersonLinks {
                linkedin: Some(linkedin),
                extra: Map::new(),
            }),
            extra: Map::new(),
        })
    }

    fn keep_unmanaged(&mut self, previous: &Self) {
        self.extra = previous.extra.clone();

        let kept = previous
            .links
            .as_ref()
            .map(|links| links.extra.clone())
            .unwrap_or_default();
        if !kept.is_empty() {
            self.links.get_or_insert_with(PersonLinks::default).extra = kept;
        }
    }
}

/// The people collection: three ordered groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeopleGroups {
    #[serde(default)]
    pub leads: Vec<Person>,
    #[serde(default)]
    pub fellows: Vec<Person>,
    #[serde(default)]
    pub alumni: Vec<Person>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PeopleGroups {
    pub fn group(&self, category: SubCategory) -> &Vec<Person> {
        match category {
            SubCategory::Leads => &self.leads,
            SubCategory::Fellows => &self.fellows,
            SubCategory::Alumni => &self.alumni,
        }
    }

    pub fn group_mut(&mut self, category: SubCategory) -> &mut Vec<Person> {
        match category {
            SubCategory::Leads => &mut self.leads,
            SubCategory::Fellows => &mut self.fellows,
            SubCategory::Alumni => &mut self.alumni,
        }
    }

    /// Group containing the person with this id, searching all three.
    pub fn locate(&self, id: &str) -> Option<SubCategory> {
        SubCategory::ALL
            .into_iter()
            .find(|category| self.group(*category).iter().any(|p| p.id == id))
    }

    /// Total number of people across all groups.
    pub fn len(&self) -> usize {
        self.leads.len() + self.fellows.len() + self.alumni.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.leads
            .iter()
            .chain(self.fellows.iter())
            .chain(self.alumni.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_omitted_without_linkedin() {
        let fields = FieldValues::from([("name".to_string(), "Ada".to_string())]);
        let person = Person::from_fields("person-1".to_string(), &fields).unwrap();
        assert!(person.links.is_none());
        let json = serde_json::to_value(&person).unwrap();
        assert!(json.get("links").is_none());
    }

    #[test]
    fn test_locate_searches_every_group() {
        let groups: PeopleGroups = serde_json::from_str(
            r#"{"leads":[{"id":"a","name":"A"}],"alumni":[{"id":"c","name":"C"}]}"#,
        )
        .unwrap();
        assert_eq!(groups.locate("a"), Some(SubCategory::Leads));
        assert_eq!(groups.locate("c"), Some(SubCategory::Alumni));
        assert_eq!(groups.locate("z"), None);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_sub_category_parse() {
        assert_eq!("fellows".parse::<SubCategory>().unwrap(), SubCategory::Fellows);
        assert!("staff".parse::<SubCategory>().is_err());
    }
}

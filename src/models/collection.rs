//! Collection types and the decoded shape of each collection file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    ContentItem, FormField, NewsItem, Opportunity, PeopleGroups, Person, Project, ResearchArea,
};
use crate::errors::AppError;

/// The five content collections the admin panel edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    News,
    People,
    Projects,
    Research,
    Opportunities,
}

impl CollectionType {
    pub const ALL: [CollectionType; 5] = [
        CollectionType::News,
        CollectionType::People,
        CollectionType::Projects,
        CollectionType::Research,
        CollectionType::Opportunities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionType::News => "news",
            CollectionType::People => "people",
            CollectionType::Projects => "projects",
            CollectionType::Research => "research",
            CollectionType::Opportunities => "opportunities",
        }
    }

    /// File name of the collection inside the data directory.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }

    /// Prefix of generated item ids.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            CollectionType::News => "news",
            CollectionType::People => "person",
            CollectionType::Projects => "project",
            CollectionType::Research => "research",
            CollectionType::Opportunities => "opportunity",
        }
    }

    /// New items go to the front of date-ordered collections.
    pub fn newest_first(&self) -> bool {
        matches!(self, CollectionType::News)
    }

    pub fn form_schema(&self) -> &'static [FormField] {
        match self {
            CollectionType::News => NewsItem::schema(),
            CollectionType::People => Person::schema(),
            CollectionType::Projects => Project::schema(),
            CollectionType::Research => ResearchArea::schema(),
            CollectionType::Opportunities => Opportunity::schema(),
        }
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown collection type '{}'", s)))
    }
}

/// Opaque token for the exact bytes of a collection file at last read (the GitHub blob SHA).
///
/// A write is only accepted by the store when it carries the hash of the current content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl ContentHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A decoded collection file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Collection {
    News(Vec<NewsItem>),
    People(PeopleGroups),
    Projects(Vec<Project>),
    Research(Vec<ResearchArea>),
    Opportunities(Vec<Opportunity>),
}

impl Collection {
    /// Decode the raw file bytes according to the collection type.
    pub fn decode(collection_type: CollectionType, bytes: &[u8]) -> Result<Self, AppError> {
        let collection = match collection_type {
            CollectionType::News => Collection::News(serde_json::from_slice(bytes)?),
            CollectionType::People => Collection::People(serde_json::from_slice(bytes)?),
            CollectionType::Projects => Collection::Projects(serde_json::from_slice(bytes)?),
            CollectionType::Research => Collection::Research(serde_json::from_slice(bytes)?),
            CollectionType::Opportunities => {
                Collection::Opportunities(serde_json::from_slice(bytes)?)
            }
        };
        Ok(collection)
    }

    /// Encode as the file is stored: two-space indented JSON with a trailing newline.
    pub fn encode(&self) -> Result<Vec<u8>, AppError> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    pub fn collection_type(&self) -> CollectionType {
        match self {
            Collection::News(_) => CollectionType::News,
            Collection::People(_) => CollectionType::People,
            Collection::Projects(_) => CollectionType::Projects,
            Collection::Research(_) => CollectionType::Research,
            Collection::Opportunities(_) => CollectionType::Opportunities,
        }
    }

    /// Number of items, summed over all groups for people.
    pub fn len(&self) -> usize {
        match self {
            Collection::News(items) => items.len(),
            Collection::People(groups) => groups.len(),
            Collection::Projects(items) => items.len(),
            Collection::Research(items) => items.len(),
            Collection::Opportunities(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every item id in collection order.
    pub fn ids(&self) -> Vec<&str> {
        fn of<T: ContentItem>(items: &[T]) -> Vec<&str> {
            items.iter().map(|item| item.id()).collect()
        }

        match self {
            Collection::News(items) => of(items),
            Collection::People(groups) => groups.iter().map(|p| p.id.as_str()).collect(),
            Collection::Projects(items) => of(items),
            Collection::Research(items) => of(items),
            Collection::Opportunities(items) => of(items),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids().contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collection_type() {
        assert_eq!("news".parse::<CollectionType>().unwrap(), CollectionType::News);
        assert_eq!(
            "opportunities".parse::<CollectionType>().unwrap(),
            CollectionType::Opportunities
        );
        assert!(matches!(
            "events".parse::<CollectionType>(),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(CollectionType::People.file_name(), "people.json");
    }

    #[test]
    fn test_decode_people() {
        let json = br#"{
            "leads": [{"id": "person-1", "name": "Ada", "photo": "a.jpg", "keywords": "ai",
                       "links": {"linkedin": "https://linkedin.com/in/ada"}}],
            "fellows": [],
            "alumni": [{"id": "person-2", "name": "Bo", "photo": "b.jpg", "keywords": "law"}]
        }"#;
        let collection = Collection::decode(CollectionType::People, json).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.ids(), vec!["person-1", "person-2"]);
        assert_eq!(collection.collection_type(), CollectionType::People);
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let err = Collection::decode(CollectionType::News, br#"{"leads": []}"#).unwrap_err();
        assert!(matches!(err, AppError::MalformedContent(_)));

        let err = Collection::decode(
            CollectionType::Projects,
            br#"[{"id": "project-1", "title": "X", "status": "paused"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::MalformedContent(_)));
    }

    #[test]
    fn test_encode_is_pretty_with_trailing_newline() {
        let collection = Collection::News(vec![NewsItem {
            id: "news-1".to_string(),
            date: "Jan 2026".to_string(),
            text: "Launch".to_string(),
            extra: Default::default(),
        }]);
        let bytes = collection.encode().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("[\n  {\n    \"id\": \"news-1\""));
        assert!(text.ends_with("]\n"));
    }
}

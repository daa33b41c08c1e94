//! Pure in-memory edit operations on a collection.
//!
//! None of these touch the remote store: they take the cached collection and return a new
//! value that the caller then commits.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    form, Collection, CollectionType, ContentItem, FieldValues, PeopleGroups, Person,
    SubCategory, CATEGORY_FIELD,
};

/// Transient state of one add or edit action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSession {
    pub collection_type: CollectionType,
    /// `None` while creating a new item.
    pub item_id: Option<String>,
    /// People only: the group the item is in, or is being created in.
    pub sub_category: Option<SubCategory>,
}

impl EditSession {
    pub fn is_creation(&self) -> bool {
        self.item_id.is_none()
    }
}

/// Generate `{prefix}-{millis}-{random}` that does not collide with any existing id.
pub fn generate_id(prefix: &str, taken: &HashSet<&str>) -> String {
    loop {
        let random = Uuid::new_v4().simple().to_string();
        let id = format!("{}-{}-{}", prefix, Utc::now().timestamp_millis(), &random[..8]);
        if !taken.contains(id.as_str()) {
            return id;
        }
    }
}

/// Start a creation session (no id) or locate the item to edit.
pub fn begin_edit(
    collection: &Collection,
    item_id: Option<&str>,
    sub_category: Option<SubCategory>,
) -> Result<EditSession, AppError> {
    let collection_type = collection.collection_type();

    let Some(id) = item_id else {
        let sub_category = match collection {
            Collection::People(_) => Some(sub_category.unwrap_or(SubCategory::Leads)),
            _ => None,
        };
        return Ok(EditSession {
            collection_type,
            item_id: None,
            sub_category,
        });
    };

    let sub_category = match collection {
        Collection::People(groups) => Some(groups.locate(id).ok_or_else(|| not_found(id))?),
        other if other.contains(id) => None,
        _ => return Err(not_found(id)),
    };

    Ok(EditSession {
        collection_type,
        item_id: Some(id.to_string()),
        sub_category,
    })
}

/// Form values for the session: blank for a creation, the item's current values otherwise.
pub fn prefill(collection: &Collection, session: &EditSession) -> Result<FieldValues, AppError> {
    fn current<T: ContentItem>(items: &[T], id: &str) -> Result<FieldValues, AppError> {
        items
            .iter()
            .find(|item| item.id() == id)
            .map(ContentItem::to_fields)
            .ok_or_else(|| not_found(id))
    }

    let mut fields = match session.item_id.as_deref() {
        None => FieldValues::new(),
        Some(id) => match collection {
            Collection::News(items) => current(items, id)?,
            Collection::People(groups) => groups
                .iter()
                .find(|p| p.id == id)
                .map(ContentItem::to_fields)
                .ok_or_else(|| not_found(id))?,
            Collection::Projects(items) => current(items, id)?,
            Collection::Research(items) => current(items, id)?,
            Collection::Opportunities(items) => current(items, id)?,
        },
    };

    if let Some(category) = session.sub_category {
        fields.insert(CATEGORY_FIELD.to_string(), category.to_string());
    }
    Ok(fields)
}

/// Apply submitted form values, producing the full collection to commit.
pub fn apply_edit(
    collection: &Collection,
    session: &EditSession,
    fields: &FieldValues,
) -> Result<Collection, AppError> {
    check_session(collection, session)?;
    let taken: HashSet<&str> = collection.ids().into_iter().collect();
    let prefix = session.collection_type.id_prefix();
    let newest_first = session.collection_type.newest_first();

    let updated = match collection {
        Collection::News(items) => {
            Collection::News(apply_flat(items, session, fields, &taken, prefix, newest_first)?)
        }
        Collection::People(groups) => {
            Collection::People(apply_people(groups, session, fields, &taken, prefix)?)
        }
        Collection::Projects(items) => Collection::Projects(apply_flat(
            items,
            session,
            fields,
            &taken,
            prefix,
            newest_first,
        )?),
        Collection::Research(items) => Collection::Research(apply_flat(
            items,
            session,
            fields,
            &taken,
            prefix,
            newest_first,
        )?),
        Collection::Opportunities(items) => Collection::Opportunities(apply_flat(
            items,
            session,
            fields,
            &taken,
            prefix,
            newest_first,
        )?),
    };
    Ok(updated)
}

/// Remove the session's item, keeping the order of the rest.
pub fn delete_item(collection: &Collection, session: &EditSession) -> Result<Collection, AppError> {
    check_session(collection, session)?;
    let id = session.item_id.as_deref().ok_or(AppError::NoActiveEdit)?;

    let updated = match collection {
        Collection::News(items) => Collection::News(remove_flat(items, id)?),
        Collection::People(groups) => {
            let category = groups.locate(id).ok_or_else(|| not_found(id))?;
            let mut groups = groups.clone();
            groups.group_mut(category).retain(|p| p.id != id);
            Collection::People(groups)
        }
        Collection::Projects(items) => Collection::Projects(remove_flat(items, id)?),
        Collection::Research(items) => Collection::Research(remove_flat(items, id)?),
        Collection::Opportunities(items) => Collection::Opportunities(remove_flat(items, id)?),
    };
    Ok(updated)
}

fn apply_flat<T: ContentItem>(
    items: &[T],
    session: &EditSession,
    fields: &FieldValues,
    taken: &HashSet<&str>,
    prefix: &str,
    newest_first: bool,
) -> Result<Vec<T>, AppError> {
    let mut items = items.to_vec();

    match session.item_id.as_deref() {
        None => {
            let item = T::from_fields(generate_id(prefix, taken), fields)?;
            if newest_first {
                items.insert(0, item);
            } else {
                items.push(item);
            }
        }
        Some(id) => {
            let position = items
                .iter()
                .position(|item| item.id() == id)
                .ok_or_else(|| not_found(id))?;
            let mut item = T::from_fields(id.to_string(), fields)?;
            item.keep_unmanaged(&items[position]);
            items[position] = item;
        }
    }

    Ok(items)
}

fn apply_people(
    groups: &PeopleGroups,
    session: &EditSession,
    fields: &FieldValues,
    taken: &HashSet<&str>,
    prefix: &str,
) -> Result<PeopleGroups, AppError> {
    let mut groups = groups.clone();

    // The submitted category wins over the one the session was opened with
    let submitted = form::optional(fields, CATEGORY_FIELD);
    let target = if submitted.is_empty() {
        session.sub_category
    } else {
        Some(submitted.parse::<SubCategory>()?)
    };

    match session.item_id.as_deref() {
        None => {
            let person = Person::from_fields(generate_id(prefix, taken), fields)?;
            groups
                .group_mut(target.unwrap_or(SubCategory::Leads))
                .push(person);
        }
        Some(id) => {
            let original = groups.locate(id).ok_or_else(|| not_found(id))?;
            let mut person = Person::from_fields(id.to_string(), fields)?;
            if let Some(previous) = groups.group(original).iter().find(|p| p.id == id) {
                person.keep_unmanaged(previous);
            }
            let target = target.unwrap_or(original);

            if target == original {
                let group = groups.group_mut(original);
                if let Some(slot) = group.iter_mut().find(|p| p.id == id) {
                    *slot = person;
                }
            } else {
                tracing::debug!("Moving {} from {} to {}", id, original, target);
                groups.group_mut(original).retain(|p| p.id != id);
                groups.group_mut(target).push(person);
            }
        }
    }

    Ok(groups)
}

fn remove_flat<T: ContentItem>(items: &[T], id: &str) -> Result<Vec<T>, AppError> {
    if !items.iter().any(|item| item.id() == id) {
        return Err(not_found(id));
    }
    Ok(items.iter().filter(|item| item.id() != id).cloned().collect())
}

fn check_session(collection: &Collection, session: &EditSession) -> Result<(), AppError> {
    if collection.collection_type() != session.collection_type {
        return Err(AppError::BadRequest(format!(
            "Edit session is for {}, not {}",
            session.collection_type,
            collection.collection_type()
        )));
    }
    Ok(())
}

fn not_found(id: &str) -> AppError {
    AppError::ItemNotFound(format!("Item {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewsItem, Project, ProjectStatus};

    fn values(pairs: &[(&str, &str)]) -> FieldValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn news() -> Collection {
        Collection::News(vec![NewsItem {
            id: "news-1".to_string(),
            date: "Jan 2026".to_string(),
            text: "Launch".to_string(),
            extra: Default::default(),
        }])
    }

    fn projects() -> Collection {
        Collection::Projects(
            ["a", "b", "c"]
                .iter()
                .map(|name| Project {
                    id: format!("project-{}", name),
                    title: name.to_uppercase(),
                    status: ProjectStatus::Active,
                    description: String::new(),
                    keywords: vec![],
                    extra: Default::default(),
                })
                .collect(),
        )
    }

    fn people() -> Collection {
        let person = |id: &str| Person {
            id: id.to_string(),
            name: id.to_uppercase(),
            photo: String::new(),
            keywords: String::new(),
            links: None,
            extra: Default::default(),
        };
        Collection::People(PeopleGroups {
            leads: vec![person("lead-1"), person("lead-2")],
            fellows: vec![person("fellow-1")],
            alumni: vec![],
            extra: Default::default(),
        })
    }

    #[test]
    fn test_create_news_goes_to_front() {
        let collection = news();
        let session = begin_edit(&collection, None, None).unwrap();
        assert!(session.is_creation());

        let updated = apply_edit(
            &collection,
            &session,
            &values(&[("date", "Feb 2026"), ("text", "Update")]),
        )
        .unwrap();

        let Collection::News(items) = &updated else {
            panic!("expected news");
        };
        assert_eq!(items.len(), 2);
        assert!(items[0].id.starts_with("news-"));
        assert_ne!(items[0].id, "news-1");
        assert_eq!(items[0].text, "Update");
        assert_eq!(items[1].id, "news-1");
    }

    #[test]
    fn test_create_project_appends_with_fresh_id() {
        let collection = projects();
        let session = begin_edit(&collection, None, None).unwrap();
        let updated = apply_edit(
            &collection,
            &session,
            &values(&[("title", "D"), ("status", "exploratory"), ("keywords", "x, y")]),
        )
        .unwrap();

        assert_eq!(updated.len(), collection.len() + 1);
        let ids = updated.ids();
        let new_id = ids[3];
        assert!(new_id.starts_with("project-"));
        assert!(!collection.contains(new_id));
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_generated_ids_do_not_collide_in_a_burst() {
        let ids: Vec<String> = (0..200)
            .map(|_| generate_id("news", &HashSet::new()))
            .collect();
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_update_keeps_position_and_id() {
        let collection = projects();
        let session = begin_edit(&collection, Some("project-b"), None).unwrap();
        let updated = apply_edit(
            &collection,
            &session,
            &values(&[("title", "Renamed"), ("status", "completed")]),
        )
        .unwrap();

        assert_eq!(updated.len(), collection.len());
        assert_eq!(updated.ids(), collection.ids());
        let Collection::Projects(items) = &updated else {
            panic!("expected projects");
        };
        assert_eq!(items[1].title, "Renamed");
        assert_eq!(items[1].status, ProjectStatus::Completed);
    }

    #[test]
    fn test_begin_edit_unknown_item() {
        let err = begin_edit(&projects(), Some("project-z"), None).unwrap_err();
        assert!(matches!(err, AppError::ItemNotFound(_)));
        let err = begin_edit(&people(), Some("nobody"), None).unwrap_err();
        assert!(matches!(err, AppError::ItemNotFound(_)));
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let collection = news();
        let session = begin_edit(&collection, None, None).unwrap();
        let err = apply_edit(&collection, &session, &values(&[("date", "Mar 2026")])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_delete_preserves_order() {
        let collection = projects();
        let session = begin_edit(&collection, Some("project-b"), None).unwrap();
        let updated = delete_item(&collection, &session).unwrap();
        assert_eq!(updated.len(), collection.len() - 1);
        assert_eq!(updated.ids(), vec!["project-a", "project-c"]);
    }

    #[test]
    fn test_delete_without_target() {
        let collection = projects();
        let session = begin_edit(&collection, None, None).unwrap();
        assert_eq!(delete_item(&collection, &session), Err(AppError::NoActiveEdit));
    }

    #[test]
    fn test_person_edit_records_group() {
        let collection = people();
        let session = begin_edit(&collection, Some("fellow-1"), None).unwrap();
        assert_eq!(session.sub_category, Some(SubCategory::Fellows));

        let fields = prefill(&collection, &session).unwrap();
        assert_eq!(fields["category"], "fellows");
        assert_eq!(fields["name"], "FELLOW-1");
    }

    #[test]
    fn test_person_move_between_groups() {
        let collection = people();
        let session = begin_edit(&collection, Some("lead-1"), None).unwrap();
        let updated = apply_edit(
            &collection,
            &session,
            &values(&[("name", "Lead One"), ("category", "alumni")]),
        )
        .unwrap();

        let Collection::People(groups) = &updated else {
            panic!("expected people");
        };
        assert_eq!(updated.len(), collection.len());
        assert_eq!(groups.leads.len(), 1);
        assert_eq!(groups.leads[0].id, "lead-2");
        assert_eq!(groups.fellows.len(), 1);
        assert_eq!(groups.alumni.len(), 1);
        assert_eq!(groups.alumni[0].id, "lead-1");
        assert_eq!(groups.alumni[0].name, "Lead One");
    }

    #[test]
    fn test_person_create_in_requested_group() {
        let collection = people();
        let session = begin_edit(&collection, None, Some(SubCategory::Fellows)).unwrap();
        let updated =
            apply_edit(&collection, &session, &values(&[("name", "New Fellow")])).unwrap();

        let Collection::People(groups) = &updated else {
            panic!("expected people");
        };
        assert_eq!(groups.fellows.len(), 2);
        assert!(groups.fellows[1].id.starts_with("person-"));
    }

    #[test]
    fn test_person_delete() {
        let collection = people();
        let session = begin_edit(&collection, Some("lead-2"), None).unwrap();
        let updated = delete_item(&collection, &session).unwrap();
        assert_eq!(updated.len(), 2);
        assert!(!updated.contains("lead-2"));
    }

    #[test]
    fn test_session_for_other_collection_is_rejected() {
        let session = begin_edit(&news(), None, None).unwrap();
        let err = apply_edit(&projects(), &session, &FieldValues::new()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_edit_keeps_keys_outside_the_form() {
        let collection = Collection::decode(
            CollectionType::Projects,
            br#"[
                {"id": "project-a", "title": "A", "status": "active", "featured": true},
                {"id": "project-b", "title": "B", "status": "active", "partners": ["x"]}
            ]"#,
        )
        .unwrap();
        let session = begin_edit(&collection, Some("project-b"), None).unwrap();
        let updated = apply_edit(
            &collection,
            &session,
            &values(&[("title", "B2"), ("status", "completed")]),
        )
        .unwrap();

        let json = serde_json::to_value(&updated).unwrap();
        assert_eq!(json[0]["featured"], true);
        assert_eq!(json[1]["title"], "B2");
        assert_eq!(json[1]["partners"], serde_json::json!(["x"]));
    }

    #[test]
    fn test_moved_person_keeps_other_links() {
        let collection = Collection::decode(
            CollectionType::People,
            br#"{
                "leads": [{"id": "p1", "name": "Ada", "pronouns": "she/her",
                           "links": {"linkedin": "https://linkedin.com/in/ada",
                                     "website": "https://ada.dev"}}],
                "fellows": [],
                "alumni": []
            }"#,
        )
        .unwrap();
        let session = begin_edit(&collection, Some("p1"), None).unwrap();
        // LinkedIn cleared in the form; the website link is not managed by it
        let updated = apply_edit(
            &collection,
            &session,
            &values(&[("name", "Ada"), ("category", "alumni")]),
        )
        .unwrap();

        let json = serde_json::to_value(&updated).unwrap();
        let moved = &json["alumni"][0];
        assert_eq!(moved["pronouns"], "she/her");
        assert_eq!(moved["links"]["website"], "https://ada.dev");
        assert!(moved["links"].get("linkedin").is_none());
    }
}

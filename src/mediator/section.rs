//! Per-collection editing state.
//!
//! Each collection type has one [`Section`] guarded by its own mutex. A write holds the lock
//! from `Editing` through `Saving`, so writes to the same collection never interleave while
//! other collections stay available.

use serde::Serialize;
use tokio::sync::Mutex;

use super::edit::EditSession;
use crate::errors::AppError;
use crate::models::{Collection, CollectionType, ContentHash};

/// Lifecycle of a section: `Idle → Loading → Loaded → Editing → Saving → Loaded`, with
/// `Saving → Error` on a failed commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionState {
    Idle,
    Loading,
    Loaded,
    Editing,
    Saving,
    Error,
}

/// A collection as last read, with the hash needed to write it back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedCollection {
    pub collection: Collection,
    pub hash: ContentHash,
}

#[derive(Debug)]
pub struct Section {
    collection_type: CollectionType,
    state: SectionState,
    loaded: Option<LoadedCollection>,
    session: Option<EditSession>,
    last_error: Option<String>,
}

impl Section {
    pub fn new(collection_type: CollectionType) -> Self {
        Self {
            collection_type,
            state: SectionState::Idle,
            loaded: None,
            session: None,
            last_error: None,
        }
    }

    pub fn collection_type(&self) -> CollectionType {
        self.collection_type
    }

    pub fn state(&self) -> SectionState {
        self.state
    }

    pub fn loaded(&self) -> Option<&LoadedCollection> {
        self.loaded.as_ref()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Enter `Loading`. Any failed-save session is dropped; an open edit must be cancelled
    /// first.
    pub fn begin_loading(&mut self) -> Result<(), AppError> {
        match self.state {
            SectionState::Idle | SectionState::Loaded | SectionState::Error => {
                self.state = SectionState::Loading;
                self.session = None;
                Ok(())
            }
            _ => Err(self.illegal("reload")),
        }
    }

    /// Leave `Loading` with the outcome of the read. On failure the previous cache, if any,
    /// stays usable.
    pub fn finish_loading(
        &mut self,
        result: Result<LoadedCollection, AppError>,
    ) -> Result<&LoadedCollection, AppError> {
        if self.state != SectionState::Loading {
            return Err(self.illegal("finish loading"));
        }

        match result {
            Ok(loaded) => {
                self.state = SectionState::Loaded;
                self.last_error = None;
                let loaded = self.loaded.insert(loaded);
                Ok(&*loaded)
            }
            Err(e) => {
                self.state = if self.loaded.is_some() {
                    SectionState::Loaded
                } else {
                    SectionState::Idle
                };
                self.last_error = Some(e.message());
                Err(e)
            }
        }
    }

    pub fn start_editing(&mut self, session: EditSession) -> Result<(), AppError> {
        if self.state != SectionState::Loaded {
            return Err(self.illegal("start editing"));
        }
        self.session = Some(session);
        self.state = SectionState::Editing;
        Ok(())
    }

    /// Discard the session without touching the remote store.
    pub fn cancel(&mut self) -> Result<(), AppError> {
        match self.state {
            SectionState::Editing | SectionState::Error => {
                self.session = None;
                self.last_error = None;
                self.state = SectionState::Loaded;
                Ok(())
            }
            _ => Err(self.illegal("cancel")),
        }
    }

    /// The session a submit or delete acts on. After a failed save the session is kept so the
    /// commit can be re-issued.
    pub fn active_session(&self) -> Result<&EditSession, AppError> {
        match (self.state, self.session.as_ref()) {
            (SectionState::Editing | SectionState::Error, Some(session)) => Ok(session),
            _ => Err(AppError::BadRequest(format!(
                "No edit in progress for {}",
                self.collection_type
            ))),
        }
    }

    pub fn begin_saving(&mut self) -> Result<(), AppError> {
        self.active_session()?;
        self.state = SectionState::Saving;
        Ok(())
    }

    pub fn save_succeeded(&mut self, loaded: LoadedCollection) {
        self.loaded = Some(loaded);
        self.session = None;
        self.last_error = None;
        self.state = SectionState::Loaded;
    }

    pub fn save_failed(&mut self, error: &AppError) {
        self.last_error = Some(error.message());
        self.state = SectionState::Error;
    }

    fn illegal(&self, action: &str) -> AppError {
        AppError::BadRequest(format!(
            "Cannot {} {} while {:?}",
            action, self.collection_type, self.state
        ))
    }
}

/// All sections of the admin panel, one per collection type.
#[derive(Debug)]
pub struct AdminContext {
    sections: [Mutex<Section>; 5],
}

impl AdminContext {
    pub fn new() -> Self {
        Self {
            sections: CollectionType::ALL.map(|t| Mutex::new(Section::new(t))),
        }
    }

    pub fn section(&self, collection_type: CollectionType) -> &Mutex<Section> {
        &self.sections[collection_type as usize]
    }
}

impl Default for AdminContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewsItem;

    fn loaded(hash: &str) -> LoadedCollection {
        LoadedCollection {
            collection: Collection::News(vec![NewsItem {
                id: "news-1".to_string(),
                date: "Jan 2026".to_string(),
                text: "Launch".to_string(),
                extra: Default::default(),
            }]),
            hash: ContentHash::new(hash),
        }
    }

    fn creation() -> EditSession {
        EditSession {
            collection_type: CollectionType::News,
            item_id: None,
            sub_category: None,
        }
    }

    #[test]
    fn test_happy_path() {
        let mut section = Section::new(CollectionType::News);
        assert_eq!(section.state(), SectionState::Idle);

        section.begin_loading().unwrap();
        assert_eq!(section.state(), SectionState::Loading);
        section.finish_loading(Ok(loaded("h1"))).unwrap();
        assert_eq!(section.state(), SectionState::Loaded);

        section.start_editing(creation()).unwrap();
        assert_eq!(section.state(), SectionState::Editing);
        section.begin_saving().unwrap();
        assert_eq!(section.state(), SectionState::Saving);

        section.save_succeeded(loaded("h2"));
        assert_eq!(section.state(), SectionState::Loaded);
        assert!(section.session().is_none());
        assert_eq!(section.loaded().unwrap().hash.as_str(), "h2");
    }

    #[test]
    fn test_failed_save_allows_retry_or_cancel() {
        let mut section = Section::new(CollectionType::News);
        section.begin_loading().unwrap();
        section.finish_loading(Ok(loaded("h1"))).unwrap();
        section.start_editing(creation()).unwrap();
        section.begin_saving().unwrap();

        section.save_failed(&AppError::RemoteUnavailable("down".to_string()));
        assert_eq!(section.state(), SectionState::Error);
        assert_eq!(section.last_error(), Some("down"));
        assert!(section.active_session().is_ok());

        section.begin_saving().unwrap();
        section.save_failed(&AppError::RemoteUnavailable("still down".to_string()));

        section.cancel().unwrap();
        assert_eq!(section.state(), SectionState::Loaded);
        assert_eq!(section.loaded().unwrap().hash.as_str(), "h1");
    }

    #[test]
    fn test_failed_initial_load_returns_to_idle() {
        let mut section = Section::new(CollectionType::News);
        section.begin_loading().unwrap();
        let err = section
            .finish_loading(Err(AppError::RemoteUnavailable("offline".to_string())))
            .unwrap_err();
        assert!(matches!(err, AppError::RemoteUnavailable(_)));
        assert_eq!(section.state(), SectionState::Idle);
    }

    #[test]
    fn test_illegal_transitions() {
        let mut section = Section::new(CollectionType::News);
        assert!(section.start_editing(creation()).is_err());
        assert!(section.cancel().is_err());
        assert!(section.begin_saving().is_err());

        section.begin_loading().unwrap();
        section.finish_loading(Ok(loaded("h1"))).unwrap();
        section.start_editing(creation()).unwrap();
        // An open edit has to be cancelled before reloading
        assert!(matches!(
            section.begin_loading(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_context_has_a_section_per_type() {
        let context = AdminContext::new();
        for t in CollectionType::ALL {
            let section = context.section(t).try_lock().unwrap();
            assert_eq!(section.collection_type(), t);
        }
    }
}

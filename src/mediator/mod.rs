//! Content mediator.
//!
//! Sits between the edit form and the remote store: reads a collection with its hash, applies
//! in-memory edits, and writes the whole collection back guarded by the hash it was read at.

mod edit;
mod section;

pub use edit::*;
pub use section::*;

use crate::config::Config;
use crate::errors::AppError;
use crate::github::GitHubStore;
use crate::models::{Collection, CollectionType, ContentHash};

#[derive(Debug, Clone)]
pub struct ContentMediator {
    store: GitHubStore,
    config: Config,
}

impl ContentMediator {
    pub fn new(store: GitHubStore, config: Config) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &GitHubStore {
        &self.store
    }

    fn path(&self, collection_type: CollectionType) -> String {
        self.config.collection_path(&collection_type.file_name())
    }

    /// Fetch and decode a collection together with its current hash.
    pub async fn read(
        &self,
        collection_type: CollectionType,
    ) -> Result<(Collection, ContentHash), AppError> {
        let path = self.path(collection_type);
        let object = self.store.get_object(&path).await?;
        let text = String::from_utf8(object.content)?;
        let collection = Collection::decode(collection_type, text.as_bytes())?;

        tracing::info!(
            "Read {} ({} items) at {}",
            path,
            collection.len(),
            object.hash
        );
        Ok((collection, object.hash))
    }

    /// Same as [`read`](Self::read), packaged for a section cache.
    pub async fn load(&self, collection_type: CollectionType) -> Result<LoadedCollection, AppError> {
        let (collection, hash) = self.read(collection_type).await?;
        Ok(LoadedCollection { collection, hash })
    }

    /// Replace the collection file, conditional on `prior_hash` still being current.
    ///
    /// A stale hash comes back as [`AppError::Conflict`]; nothing is merged or retried.
    pub async fn commit(
        &self,
        collection_type: CollectionType,
        collection: &Collection,
        prior_hash: &ContentHash,
        message: &str,
    ) -> Result<ContentHash, AppError> {
        if collection.collection_type() != collection_type {
            return Err(AppError::BadRequest(format!(
                "Cannot write a {} collection to {}",
                collection.collection_type(),
                collection_type.file_name()
            )));
        }

        let path = self.path(collection_type);
        let content = collection.encode()?;
        let hash = self
            .store
            .put_object(&path, &content, prior_hash, message)
            .await?;

        tracing::info!("Committed {} ({} -> {})", path, prior_hash, hash);
        Ok(hash)
    }

    /// Commit message used when the caller does not supply one.
    pub fn default_message(&self, collection_type: CollectionType) -> String {
        format!("Update {} via admin panel", self.path(collection_type))
    }
}

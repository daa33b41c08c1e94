//! Local persistence of the GitHub access token.
//!
//! The admin backend holds exactly one credential. It lives in a file so that it survives
//! restarts, and is cleared whenever validation against GitHub fails.

use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use crate::errors::AppError;

#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    token: RwLock<Option<String>>,
}

impl CredentialStore {
    /// Open the store, loading a previously saved token. A seed token replaces whatever was
    /// stored.
    pub async fn open(path: &Path, seed: Option<String>) -> Result<Self, AppError> {
        let store = Self {
            path: path.to_path_buf(),
            token: RwLock::new(None),
        };

        match seed {
            Some(token) => store.save(&token).await?,
            None => {
                let stored = match tokio::fs::read_to_string(path).await {
                    Ok(contents) => Some(contents.trim().to_string()).filter(|t| !t.is_empty()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                    Err(e) => return Err(e.into()),
                };
                *store.token.write().await = stored;
            }
        }

        Ok(store)
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn save(&self, token: &str) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, token.trim()).await?;
        *self.token.write().await = Some(token.trim().to_string());
        tracing::info!("Stored GitHub credential at {:?}", self.path);
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        *self.token.write().await = None;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::info!("Cleared stored GitHub credential");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_then_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("credential");

        let store = CredentialStore::open(&path, None).await.unwrap();
        assert!(store.token().await.is_none());

        store.save("ghp_example\n").await.unwrap();
        let reopened = CredentialStore::open(&path, None).await.unwrap();
        assert_eq!(reopened.token().await.as_deref(), Some("ghp_example"));
    }

    #[tokio::test]
    async fn test_clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credential");

        let store = CredentialStore::open(&path, Some("seeded".to_string()))
            .await
            .unwrap();
        assert!(path.exists());

        store.clear().await.unwrap();
        assert!(store.token().await.is_none());
        assert!(!path.exists());

        // Clearing twice is fine
        store.clear().await.unwrap();
    }
}

//! Configuration module for the content admin backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for the admin API (required in production)
    pub api_psk: Option<String>,
    /// Base URL of the GitHub REST API
    pub github_api: String,
    /// Owner of the content repository
    pub github_owner: String,
    /// Name of the content repository
    pub github_repo: String,
    /// Branch that commits are written to
    pub github_branch: String,
    /// Directory inside the repository holding the collection files
    pub data_dir: String,
    /// Token seeded into the credential store at startup
    pub github_token: Option<String>,
    /// File the GitHub credential is persisted in
    pub credential_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let api_psk = env::var("CONTENT_ADMIN_API_PSK").ok();

        let github_api = env::var("CONTENT_ADMIN_GITHUB_API")
            .unwrap_or_else(|_| "https://api.github.com".to_string())
            .trim_end_matches('/')
            .to_string();

        let github_owner = env::var("CONTENT_ADMIN_GITHUB_OWNER").unwrap_or_default();
        let github_repo = env::var("CONTENT_ADMIN_GITHUB_REPO").unwrap_or_default();

        let github_branch =
            env::var("CONTENT_ADMIN_GITHUB_BRANCH").unwrap_or_else(|_| "main".to_string());

        let data_dir = env::var("CONTENT_ADMIN_DATA_DIR")
            .unwrap_or_else(|_| "data".to_string())
            .trim_matches('/')
            .to_string();

        let github_token = env::var("CONTENT_ADMIN_GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let credential_path = env::var("CONTENT_ADMIN_CREDENTIAL_PATH")
            .unwrap_or_else(|_| "./data/credential".to_string())
            .into();

        let bind_addr = env::var("CONTENT_ADMIN_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| AppError::BadRequest(format!("Invalid CONTENT_ADMIN_BIND_ADDR: {}", e)))?;

        let log_level = env::var("CONTENT_ADMIN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            api_psk,
            github_api,
            github_owner,
            github_repo,
            github_branch,
            data_dir,
            github_token,
            credential_path,
            bind_addr,
            log_level,
        })
    }

    /// Repository path of a collection file, e.g. `data/news.json`.
    pub fn collection_path(&self, file_name: &str) -> String {
        if self.data_dir.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", self.data_dir, file_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        for key in [
            "CONTENT_ADMIN_API_PSK",
            "CONTENT_ADMIN_GITHUB_API",
            "CONTENT_ADMIN_GITHUB_BRANCH",
            "CONTENT_ADMIN_DATA_DIR",
            "CONTENT_ADMIN_GITHUB_TOKEN",
            "CONTENT_ADMIN_CREDENTIAL_PATH",
            "CONTENT_ADMIN_BIND_ADDR",
            "CONTENT_ADMIN_LOG_LEVEL",
        ] {
            env::remove_var(key);
        }

        let config = Config::from_env().unwrap();

        assert!(config.api_psk.is_none());
        assert!(config.github_token.is_none());
        assert_eq!(config.github_api, "https://api.github.com");
        assert_eq!(config.github_branch, "main");
        assert_eq!(config.credential_path, PathBuf::from("./data/credential"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.collection_path("news.json"), "data/news.json");
    }
}

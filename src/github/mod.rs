//! GitHub contents API client.
//!
//! The content repository is used as a document store: each collection is one file, read and
//! replaced whole. Replacing a file requires the blob SHA it currently has, so a write against
//! a stale SHA is rejected by GitHub.

mod credential;

pub use credential::CredentialStore;

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::AppError;
use crate::models::ContentHash;

const ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("content-admin/", env!("CARGO_PKG_VERSION"));

/// Raw file contents together with the hash they were read at.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content: Vec<u8>,
    pub hash: ContentHash,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    sha: &'a str,
    branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    content: ContentRef,
}

#[derive(Debug, Deserialize)]
struct ContentRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

/// Client for the file-level operations of one repository branch.
#[derive(Debug, Clone)]
pub struct GitHubStore {
    http: Client,
    api_base: String,
    owner: String,
    repo: String,
    branch: String,
    credential: Arc<CredentialStore>,
}

impl GitHubStore {
    pub fn new(config: &Config, credential: Arc<CredentialStore>) -> Result<Self, AppError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: config.github_api.clone(),
            owner: config.github_owner.clone(),
            repo: config.github_repo.clone(),
            branch: config.github_branch.clone(),
            credential,
        })
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    async fn bearer(&self) -> Result<String, AppError> {
        self.credential
            .token()
            .await
            .ok_or_else(|| AppError::PermissionDenied("No GitHub token configured".to_string()))
    }

    /// Fetch a file and decode its base64 transport encoding.
    pub async fn get_object(&self, path: &str) -> Result<StoredObject, AppError> {
        let token = self.bearer().await?;
        tracing::debug!("GET contents {} on {}", path, self.branch);

        let response = self
            .http
            .get(self.contents_url(path))
            .query(&[("ref", self.branch.as_str())])
            .bearer_auth(token)
            .header(header::ACCEPT, ACCEPT)
            .send()
            .await?;
        let response = check_status(response, path, None).await?;
        let body: ContentsResponse = response.json().await?;

        if let Some(encoding) = body.encoding.as_deref() {
            if encoding != "base64" {
                return Err(AppError::MalformedContent(format!(
                    "{} uses unsupported encoding '{}'",
                    path, encoding
                )));
            }
        }

        Ok(StoredObject {
            content: decode_transport(&body.content)?,
            hash: ContentHash(body.sha),
        })
    }

    /// Replace a file, conditional on it still having `prior_hash`. Returns the new hash.
    pub async fn put_object(
        &self,
        path: &str,
        content: &[u8],
        prior_hash: &ContentHash,
        message: &str,
    ) -> Result<ContentHash, AppError> {
        let token = self.bearer().await?;
        tracing::debug!("PUT contents {} on {} (prior {})", path, self.branch, prior_hash);

        let request = PutContentsRequest {
            message,
            content: STANDARD.encode(content),
            sha: prior_hash.as_str(),
            branch: &self.branch,
        };

        let response = self
            .http
            .put(self.contents_url(path))
            .bearer_auth(token)
            .header(header::ACCEPT, ACCEPT)
            .json(&request)
            .send()
            .await?;
        let response = check_status(response, path, Some(prior_hash)).await?;
        let body: PutContentsResponse = response.json().await?;

        Ok(ContentHash(body.content.sha))
    }

    /// Validate a token against the identity endpoint, returning the account login.
    pub async fn current_user(&self, token: &str) -> Result<String, AppError> {
        let response = self
            .http
            .get(format!("{}/user", self.api_base))
            .bearer_auth(token)
            .header(header::ACCEPT, ACCEPT)
            .send()
            .await?;
        let response = check_status(response, "user", None).await?;
        let user: UserResponse = response.json().await?;
        Ok(user.login)
    }
}

/// The contents API wraps base64 at 60 columns; strip whitespace before decoding.
fn decode_transport(content: &str) -> Result<Vec<u8>, AppError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

/// Map non-success responses onto the error taxonomy.
async fn check_status(
    response: Response,
    path: &str,
    prior_hash: Option<&ContentHash>,
) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GitHubErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or(body);
    tracing::warn!("GitHub returned {} for {}: {}", status, path, message);

    let err = match (status, prior_hash) {
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => {
            AppError::PermissionDenied(format!("GitHub refused access to {}: {}", path, message))
        }
        (StatusCode::NOT_FOUND, _) => {
            AppError::RemoteUnavailable(format!("{} not found in repository", path))
        }
        (StatusCode::CONFLICT, Some(prior)) => AppError::Conflict {
            message: format!("{} changed since it was read: {}", path, message),
            prior_hash: prior.to_string(),
        },
        (StatusCode::UNPROCESSABLE_ENTITY, Some(prior)) if message.contains("sha") => {
            AppError::Conflict {
                message: format!("{} changed since it was read: {}", path, message),
                prior_hash: prior.to_string(),
            }
        }
        _ => AppError::RemoteUnavailable(format!(
            "GitHub returned {} for {}: {}",
            status, path, message
        )),
    };
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_transport_ignores_line_wrapping() {
        let encoded = STANDARD.encode(r#"[{"id":"news-1","date":"Jan 2026","text":"Launch"}]"#);
        let (head, tail) = encoded.split_at(20);
        let wrapped = format!("{}\n{}\n", head, tail);
        let decoded = decode_transport(&wrapped).unwrap();
        assert!(String::from_utf8(decoded).unwrap().contains("Launch"));
    }

    #[test]
    fn test_decode_transport_rejects_garbage() {
        let err = decode_transport("not*base64").unwrap_err();
        assert!(matches!(err, AppError::MalformedContent(_)));
    }
}

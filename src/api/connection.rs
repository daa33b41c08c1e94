//! GitHub connection endpoints.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
}

impl ConnectionStatus {
    fn connected(login: String) -> Self {
        Self {
            connected: true,
            login: Some(login),
        }
    }

    fn disconnected() -> Self {
        Self {
            connected: false,
            login: None,
        }
    }
}

/// Request body for storing a GitHub token.
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub token: String,
}

/// GET /api/connection - Check the stored credential against GitHub.
///
/// A credential GitHub rejects is cleared, returning the panel to the unauthenticated state.
pub async fn get_connection(State(state): State<AppState>) -> ApiResult<ConnectionStatus> {
    let Some(token) = state.credential.token().await else {
        return success(ConnectionStatus::disconnected(), None);
    };

    match state.mediator.store().current_user(&token).await {
        Ok(login) => success(ConnectionStatus::connected(login), None),
        Err(AppError::PermissionDenied(message)) => {
            tracing::warn!("Stored GitHub credential rejected: {}", message);
            state.credential.clear().await?;
            success(ConnectionStatus::disconnected(), None)
        }
        Err(e) => Err(e),
    }
}

/// POST /api/connection - Validate and store a GitHub token.
pub async fn connect(
    State(state): State<AppState>,
    Json(request): Json<ConnectRequest>,
) -> ApiResult<ConnectionStatus> {
    let token = request.token.trim();
    if token.is_empty() {
        return Err(AppError::Validation("Token is required".to_string()));
    }

    match state.mediator.store().current_user(token).await {
        Ok(login) => {
            state.credential.save(token).await?;
            tracing::info!("Connected to GitHub as {}", login);
            success(ConnectionStatus::connected(login), None)
        }
        Err(e @ AppError::PermissionDenied(_)) => {
            state.credential.clear().await?;
            Err(e)
        }
        Err(e) => Err(e),
    }
}

/// DELETE /api/connection - Forget the stored token.
pub async fn disconnect(State(state): State<AppState>) -> ApiResult<ConnectionStatus> {
    state.credential.clear().await?;
    success(ConnectionStatus::disconnected(), None)
}

//! Content Admin Backend
//!
//! Edits the site's JSON content collections in a GitHub repository, writing each collection
//! back with a compare-and-swap on its blob SHA.

mod api;
mod auth;
mod config;
mod errors;
mod github;
mod mediator;
mod models;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use github::{CredentialStore, GitHubStore};
use mediator::{AdminContext, ContentMediator};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub mediator: Arc<ContentMediator>,
    pub context: Arc<AdminContext>,
    pub credential: Arc<CredentialStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the credential store, GitHub client and mediator from configuration.
    pub async fn from_config(config: Config) -> Result<Self, errors::AppError> {
        let credential = Arc::new(
            CredentialStore::open(&config.credential_path, config.github_token.clone()).await?,
        );
        let store = GitHubStore::new(&config, credential.clone())?;
        let mediator = Arc::new(ContentMediator::new(store, config.clone()));

        Ok(Self {
            mediator,
            context: Arc::new(AdminContext::new()),
            credential,
            config: Arc::new(config),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Content Admin Backend");
    tracing::info!(
        "Content repository: {}/{} ({})",
        config.github_owner,
        config.github_repo,
        config.github_branch
    );
    tracing::info!("Data directory: {}", config.data_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.github_owner.is_empty() || config.github_repo.is_empty() {
        tracing::warn!(
            "CONTENT_ADMIN_GITHUB_OWNER / CONTENT_ADMIN_GITHUB_REPO not set; collection reads will fail"
        );
    }

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!(
            "No admin API key configured (CONTENT_ADMIN_API_PSK). Authentication is disabled!"
        );
    }

    let bind_addr = config.bind_addr;
    let state = AppState::from_config(config).await?;

    if state.credential.token().await.is_none() {
        tracing::info!("No GitHub credential stored; POST /api/connection to connect");
    }

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router. Every admin action is registered here once.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // GitHub connection
        .route(
            "/connection",
            get(api::get_connection)
                .post(api::connect)
                .delete(api::disconnect),
        )
        // Collections
        .route("/collections/{kind}", get(api::get_collection))
        .route("/collections/{kind}/schema", get(api::get_schema))
        .route("/collections/{kind}/state", get(api::get_section_state))
        .route(
            "/collections/{kind}/edit",
            post(api::begin_edit).delete(api::cancel_edit),
        )
        .route("/collections/{kind}/edit/submit", post(api::submit_edit))
        .route("/collections/{kind}/edit/delete", post(api::delete_edit))
        // Apply admin key middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_key_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

//! Collection editing endpoints.

use std::future::Future;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::mediator::{self, EditSession, LoadedCollection, Section, SectionState};
use crate::models::{
    Collection, CollectionType, ContentHash, FieldValues, FormField, SubCategory,
};
use crate::AppState;

/// Snapshot of a section for the admin UI.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    pub collection_type: CollectionType,
    pub state: SectionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<EditSession>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl SectionView {
    fn of(section: &Section) -> Self {
        Self {
            collection_type: section.collection_type(),
            state: section.state(),
            session: section.session().cloned(),
            last_error: section.last_error().map(str::to_string),
        }
    }
}

/// An opened edit form: the session plus the values to prefill.
#[derive(Debug, Serialize)]
pub struct EditView {
    pub session: EditSession,
    pub fields: FieldValues,
    pub schema: &'static [FormField],
}

/// Request body for opening an edit form.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginEditRequest {
    /// Omit to create a new item.
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub sub_category: Option<SubCategory>,
}

/// Request body for saving the open edit form.
#[derive(Debug, Deserialize)]
pub struct SubmitEditRequest {
    pub fields: FieldValues,
    #[serde(default)]
    pub message: Option<String>,
    /// Hash to commit against instead of the cached one.
    #[serde(default)]
    pub hash: Option<ContentHash>,
}

/// Request body for deleting the item of the open edit form.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteEditRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub hash: Option<ContentHash>,
}

/// GET /api/collections/:type - Read a collection and its hash.
///
/// While an edit is open the cached copy is returned instead of reloading.
pub async fn get_collection(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Collection> {
    let collection_type: CollectionType = kind.parse()?;

    let loaded = detached(async move {
        let mut section = state.context.section(collection_type).lock().await;
        let cached = match section.state() {
            SectionState::Editing => section.loaded().cloned(),
            _ => None,
        };
        match cached {
            Some(cached) => Ok(cached),
            None => reload(&state, &mut section).await,
        }
    })
    .await?;

    success(loaded.collection, Some(loaded.hash))
}

/// GET /api/collections/:type/schema - Form fields for the collection type.
pub async fn get_schema(Path(kind): Path<String>) -> ApiResult<&'static [FormField]> {
    let collection_type: CollectionType = kind.parse()?;
    success(collection_type.form_schema(), None)
}

/// GET /api/collections/:type/state - Current section state.
pub async fn get_section_state(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<SectionView> {
    let collection_type: CollectionType = kind.parse()?;
    let section = state.context.section(collection_type).lock().await;
    let hash = section.loaded().map(|l| l.hash.clone());
    success(SectionView::of(&section), hash)
}

/// POST /api/collections/:type/edit - Open an add or edit form.
pub async fn begin_edit(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(request): Json<BeginEditRequest>,
) -> ApiResult<EditView> {
    let collection_type: CollectionType = kind.parse()?;

    let (loaded, session, fields) = detached(async move {
        let mut section = state.context.section(collection_type).lock().await;
        let loaded = match section.loaded().cloned() {
            Some(cached) => cached,
            None => reload(&state, &mut section).await?,
        };

        let session = mediator::begin_edit(
            &loaded.collection,
            request.item_id.as_deref(),
            request.sub_category,
        )?;
        let fields = mediator::prefill(&loaded.collection, &session)?;
        section.start_editing(session.clone())?;
        Ok::<_, AppError>((loaded, session, fields))
    })
    .await?;

    tracing::debug!(
        "Editing {} item {:?}",
        collection_type,
        session.item_id.as_deref().unwrap_or("<new>")
    );

    success(
        EditView {
            session,
            fields,
            schema: collection_type.form_schema(),
        },
        Some(loaded.hash),
    )
}

/// DELETE /api/collections/:type/edit - Close the form without saving.
pub async fn cancel_edit(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<SectionView> {
    let collection_type: CollectionType = kind.parse()?;
    let mut section = state.context.section(collection_type).lock().await;
    section.cancel()?;

    let hash = section.loaded().map(|l| l.hash.clone());
    success(SectionView::of(&section), hash)
}

/// POST /api/collections/:type/edit/submit - Apply the form and commit.
pub async fn submit_edit(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(request): Json<SubmitEditRequest>,
) -> ApiResult<Collection> {
    let collection_type: CollectionType = kind.parse()?;

    let saved = detached(async move {
        let mut section = state.context.section(collection_type).lock().await;
        let session = section.active_session()?.clone();
        let cached = cached_collection(&section)?;
        let updated = mediator::apply_edit(&cached.collection, &session, &request.fields)?;

        let prior_hash = request.hash.unwrap_or(cached.hash);
        let message = commit_message(&state, collection_type, request.message);
        save(&state, &mut section, updated, &prior_hash, &message).await
    })
    .await?;

    success(saved.collection, Some(saved.hash))
}

/// POST /api/collections/:type/edit/delete - Delete the item of the open form and commit.
pub async fn delete_edit(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(request): Json<DeleteEditRequest>,
) -> ApiResult<Collection> {
    let collection_type: CollectionType = kind.parse()?;

    let saved = detached(async move {
        let mut section = state.context.section(collection_type).lock().await;
        let session = section.active_session()?.clone();
        let cached = cached_collection(&section)?;
        let updated = mediator::delete_item(&cached.collection, &session)?;

        let prior_hash = request.hash.unwrap_or(cached.hash);
        let message = commit_message(&state, collection_type, request.message);
        save(&state, &mut section, updated, &prior_hash, &message).await
    })
    .await?;

    success(saved.collection, Some(saved.hash))
}

/// Run section work on its own task. Axum drops a handler's future when the client goes away;
/// a section left in `Loading` or `Saving` would then reject every later action.
async fn detached<T, F>(work: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(|e| AppError::Internal(format!("Section task failed: {}", e)))?
}

/// Read the collection through the section's `Loading` state.
async fn reload(state: &AppState, section: &mut Section) -> Result<LoadedCollection, AppError> {
    section.begin_loading()?;
    let result = state.mediator.load(section.collection_type()).await;
    section.finish_loading(result).cloned()
}

fn cached_collection(section: &Section) -> Result<LoadedCollection, AppError> {
    section.loaded().cloned().ok_or_else(|| {
        AppError::BadRequest(format!("{} has not been loaded", section.collection_type()))
    })
}

fn commit_message(
    state: &AppState,
    collection_type: CollectionType,
    requested: Option<String>,
) -> String {
    requested
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| state.mediator.default_message(collection_type))
}

/// Commit through the section's `Saving` state, then reload.
async fn save(
    state: &AppState,
    section: &mut Section,
    updated: Collection,
    prior_hash: &ContentHash,
    message: &str,
) -> Result<LoadedCollection, AppError> {
    let collection_type = section.collection_type();
    section.begin_saving()?;

    let hash = match state
        .mediator
        .commit(collection_type, &updated, prior_hash, message)
        .await
    {
        Ok(hash) => hash,
        Err(e) => {
            tracing::warn!("Commit of {} failed: {}", collection_type, e);
            section.save_failed(&e);
            return Err(e);
        }
    };

    // GitHub reads can lag behind a write; keep what we committed unless the reload caught up
    let loaded = match state.mediator.load(collection_type).await {
        Ok(reloaded) if reloaded.hash == hash => reloaded,
        Ok(_) => {
            tracing::debug!("Reload of {} returned an older hash", collection_type);
            LoadedCollection {
                collection: updated,
                hash,
            }
        }
        Err(e) => {
            tracing::warn!("Reload of {} after commit failed: {}", collection_type, e);
            LoadedCollection {
                collection: updated,
                hash,
            }
        }
    };

    section.save_succeeded(loaded.clone());
    Ok(loaded)
}

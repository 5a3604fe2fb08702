//! Handlers for the `/composer/drafts` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use opc_core::page::Page;
use opc_core::page_id::LogicalPageId;
use opc_core::types::{DbId, Timestamp};
use opc_events::ComposerEvent;

use crate::error::{AppError, AppResult};
use crate::render::{self, RenderMode};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Body of `POST /composer/drafts`. `key == 0` creates a new draft.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftRequest {
    #[serde(default)]
    pub key: DbId,
    /// Serialized logical page id token.
    pub page_id: String,
    #[serde(default)]
    pub name: String,
    #[validate(length(min = 1, message = "url must not be empty"))]
    pub url: String,
    #[serde(default)]
    pub publish_from: Option<Timestamp>,
    #[serde(default)]
    pub publish_to: Option<Timestamp>,
    #[serde(default)]
    pub customer_groups: Option<Vec<DbId>>,
    /// Serialized area tree.
    #[serde(default)]
    pub areas: Value,
    /// Editor performing the save; becomes the lock owner.
    #[validate(length(min = 1, message = "user must not be empty"))]
    pub user: String,
}

/// Body of `POST /composer/drafts/{key}/lock`.
#[derive(Debug, Deserialize, Validate)]
pub struct LockRequest {
    #[validate(length(min = 1, message = "user must not be empty"))]
    pub user: String,
}

/// Body of `POST /composer/drafts/{key}/publish`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub publish_from: Option<Timestamp>,
    pub publish_to: Option<Timestamp>,
    #[serde(default)]
    pub customer_groups: Option<Vec<DbId>>,
}

/// Body of `PUT /composer/drafts/{key}/name`.
#[derive(Debug, Deserialize, Validate)]
pub struct RenameRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/composer/drafts/{key}
pub async fn get(
    State(state): State<AppState>,
    Path(key): Path<DbId>,
) -> AppResult<Json<DataResponse<Value>>> {
    let page = state.pages.get_draft(&state.pool, key).await?;
    let live = state.pages.live_keys(&state.pool, &page.id).await?;
    Ok(Json(DataResponse {
        data: page.to_json(Utc::now(), Some(&live)),
    }))
}

/// GET /api/v1/composer/pages/{page_id}/drafts
pub async fn list_for_page(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> AppResult<Json<DataResponse<Vec<Value>>>> {
    let id = LogicalPageId::parse(&page_id)?;
    let drafts = state.pages.get_drafts(&state.pool, &id).await?;
    let live = state.pages.live_keys(&state.pool, &id).await?;
    let now = Utc::now();
    Ok(Json(DataResponse {
        data: drafts
            .iter()
            .map(|page| page.to_json(now, Some(&live)))
            .collect(),
    }))
}

/// POST /api/v1/composer/drafts
pub async fn save(
    State(state): State<AppState>,
    Json(input): Json<SaveDraftRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Value>>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let created = input.key == 0;
    let now = Utc::now();

    let mut page = Page::new(LogicalPageId::parse(&input.page_id)?);
    page.key = input.key;
    page.name = input.name;
    page.url = input.url;
    page.publish_from = input.publish_from;
    page.publish_to = input.publish_to;
    page.customer_groups = input.customer_groups;
    page.locked_by = input.user.clone();
    page.locked_at = Some(now);
    page.last_modified = Some(now);
    page.deserialize_areas(&input.areas, &state.registry);

    state.pages.save_draft(&state.pool, &mut page).await?;

    state.event_bus.publish(
        ComposerEvent::new("composer.draft.saved")
            .with_page(page.key, page.id.encode())
            .with_actor(input.user.clone()),
    );

    let live = state.pages.live_keys(&state.pool, &page.id).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(DataResponse {
            data: page.to_json(Utc::now(), Some(&live)),
        }),
    ))
}

/// DELETE /api/v1/composer/drafts/{key}
pub async fn delete(
    State(state): State<AppState>,
    Path(key): Path<DbId>,
) -> AppResult<StatusCode> {
    // Load first so the event can carry the logical id.
    let page = state.pages.get_draft(&state.pool, key).await?;
    state.pages.delete_draft(&state.pool, key).await?;

    state
        .event_bus
        .publish(ComposerEvent::new("composer.draft.deleted").with_page(key, page.id.encode()));
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/composer/drafts/{key}/lock
pub async fn lock(
    State(state): State<AppState>,
    Path(key): Path<DbId>,
    Json(input): Json<LockRequest>,
) -> AppResult<Json<DataResponse<Value>>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let result = state.pages.lock_draft(&state.pool, key, &input.user).await?;
    if result == opc_core::locking::LockDraftResult::Locked {
        let mut event = ComposerEvent::new("composer.draft.locked").with_actor(input.user.clone());
        event.page_key = Some(key);
        state.event_bus.publish(event);
    }
    Ok(Json(DataResponse {
        data: serde_json::json!({ "result": result }),
    }))
}

/// POST /api/v1/composer/drafts/{key}/unlock
pub async fn unlock(
    State(state): State<AppState>,
    Path(key): Path<DbId>,
) -> AppResult<StatusCode> {
    state.pages.unlock_draft(&state.pool, key).await?;
    let mut event = ComposerEvent::new("composer.draft.unlocked");
    event.page_key = Some(key);
    state.event_bus.publish(event);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/composer/drafts/{key}/publish
pub async fn publish(
    State(state): State<AppState>,
    Path(key): Path<DbId>,
    Json(input): Json<PublishRequest>,
) -> AppResult<StatusCode> {
    state
        .pages
        .save_draft_publication_status(
            &state.pool,
            key,
            input.publish_from,
            input.publish_to,
            input.customer_groups.as_deref(),
        )
        .await?;
    let mut event = ComposerEvent::new("composer.draft.published");
    event.page_key = Some(key);
    state.event_bus.publish(event);
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/composer/drafts/{key}/name
pub async fn rename(
    State(state): State<AppState>,
    Path(key): Path<DbId>,
    Json(input): Json<RenameRequest>,
) -> AppResult<StatusCode> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    state.pages.save_draft_name(&state.pool, key, &input.name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/composer/drafts/{key}/preview
pub async fn preview(
    State(state): State<AppState>,
    Path(key): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    render_draft(state, key, RenderMode::Preview).await
}

/// GET /api/v1/composer/drafts/{key}/final
pub async fn final_output(
    State(state): State<AppState>,
    Path(key): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    render_draft(state, key, RenderMode::Final).await
}

async fn render_draft(
    state: AppState,
    key: DbId,
    mode: RenderMode,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let page = state.pages.get_draft(&state.pool, key).await?;
    Ok(Json(DataResponse {
        data: render::render_page(&page, &state.hooks, mode),
    }))
}

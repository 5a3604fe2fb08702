//! Handlers for revision snapshots of drafts.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use opc_core::area::AreaList;
use opc_core::types::DbId;
use opc_events::ComposerEvent;

use crate::error::AppResult;
use crate::render::{self, RenderMode};
use crate::response::DataResponse;
use crate::state::AppState;

use opc_db::store::page_store::PAGE_REVISION_TYPE;

/// GET /api/v1/composer/drafts/{key}/revisions
pub async fn list(
    State(state): State<AppState>,
    Path(key): Path<DbId>,
) -> AppResult<Json<DataResponse<Value>>> {
    let revisions = state
        .pages
        .revisions()
        .list(&state.pool, PAGE_REVISION_TYPE, key)
        .await?;
    // The stored row snapshot stays server-side; the list view carries
    // identification metadata only.
    let data: Vec<Value> = revisions
        .iter()
        .map(|rev| {
            serde_json::json!({
                "id": rev.id,
                "referenceId": rev.reference_id,
                "author": rev.author,
                "createdAt": rev.created_at,
            })
        })
        .collect();
    Ok(Json(DataResponse { data: Value::Array(data) }))
}

/// GET /api/v1/composer/revisions/{id}/preview
///
/// Renders the area tree captured in the snapshot, without touching the
/// live draft.
pub async fn preview(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let revision = state.pages.revisions().get(&state.pool, id).await?;

    let mut areas = AreaList::new();
    if let Some(content) = revision.content.get("content") {
        areas.deserialize_value(content, &state.registry);
    }
    let rendered = areas
        .areas()
        .map(|area| render::render_area(area, &state.hooks, RenderMode::Preview))
        .collect();
    Ok(Json(DataResponse { data: rendered }))
}

/// POST /api/v1/composer/revisions/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Value>>> {
    let restored = state
        .pages
        .revisions()
        .restore_revision(&state.pool, id, false)
        .await?;

    if restored {
        state
            .event_bus
            .publish(ComposerEvent::new("composer.revision.restored"));
    }
    Ok(Json(DataResponse {
        data: serde_json::json!({ "restored": restored }),
    }))
}

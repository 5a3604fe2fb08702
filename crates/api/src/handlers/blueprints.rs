//! Handlers for the `/composer/blueprints` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use opc_core::blueprint::Blueprint;
use opc_core::types::DbId;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /composer/blueprints`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBlueprintRequest {
    #[serde(default)]
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub plugin_id: Option<DbId>,
    /// Serialized portlet instance subtree.
    pub content: Value,
}

fn blueprint_json(blueprint: &Blueprint) -> Value {
    serde_json::json!({
        "id": blueprint.id,
        "name": blueprint.name,
        "pluginId": blueprint.plugin_id,
        "content": blueprint.content_json(),
    })
}

/// GET /api/v1/composer/blueprints
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Value>>>> {
    let blueprints = state.blueprints.list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: blueprints.iter().map(blueprint_json).collect(),
    }))
}

/// GET /api/v1/composer/blueprints/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Value>>> {
    let blueprint = state.blueprints.load(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: blueprint_json(&blueprint),
    }))
}

/// POST /api/v1/composer/blueprints
pub async fn save(
    State(state): State<AppState>,
    Json(input): Json<SaveBlueprintRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Value>>)> {
    let created = input.id == 0;
    let mut blueprint = Blueprint::from_content(
        input.id,
        input.name,
        input.plugin_id,
        &input.content,
        &state.registry,
    )?;
    state.blueprints.save(&state.pool, &mut blueprint).await?;

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(DataResponse {
            data: blueprint_json(&blueprint),
        }),
    ))
}

/// DELETE /api/v1/composer/blueprints/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.blueprints.delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

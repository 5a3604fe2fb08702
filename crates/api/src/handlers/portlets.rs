//! Handler for the editor's portlet palette.

use axum::extract::State;
use axum::Json;

use opc_core::portlet::{PortletMeta, MISSING_PORTLET_GROUP};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/composer/portlets
///
/// Registered portlet descriptors sorted by display group then title.
/// Placeholder descriptors for unresolvable classes never reach the
/// palette.
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<PortletMeta>>>> {
    let portlets = state
        .registry
        .list()
        .into_iter()
        .filter(|meta| meta.group != MISSING_PORTLET_GROUP)
        .collect();
    Ok(Json(DataResponse { data: portlets }))
}

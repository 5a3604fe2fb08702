//! Route definitions for the composer admin surface.

pub mod health;

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{blueprints, drafts, portlets, revisions};
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /composer/drafts                         POST   save (create or update)
/// /composer/drafts/{key}                   GET    draft with derived status
///                                          DELETE delete
/// /composer/drafts/{key}/lock              POST   tri-state lock result
/// /composer/drafts/{key}/unlock            POST   force unlock
/// /composer/drafts/{key}/publish           POST   publication window + groups
/// /composer/drafts/{key}/name              PUT    rename
/// /composer/drafts/{key}/revisions         GET    snapshot list
/// /composer/drafts/{key}/preview           GET    per-area preview strings
/// /composer/drafts/{key}/final             GET    per-area final strings
///
/// /composer/pages/{page_id}/drafts         GET    drafts of a logical id
///
/// /composer/revisions/{id}/preview         GET    snapshot preview strings
/// /composer/revisions/{id}/restore         POST   roll back to snapshot
///
/// /composer/blueprints                     GET, POST
/// /composer/blueprints/{id}                GET, DELETE
///
/// /composer/portlets                       GET    editor palette
/// ```
pub fn api_routes() -> Router<AppState> {
    let composer = Router::new()
        .route("/drafts", post(drafts::save))
        .route("/drafts/{key}", get(drafts::get).delete(drafts::delete))
        .route("/drafts/{key}/lock", post(drafts::lock))
        .route("/drafts/{key}/unlock", post(drafts::unlock))
        .route("/drafts/{key}/publish", post(drafts::publish))
        .route("/drafts/{key}/name", put(drafts::rename))
        .route("/drafts/{key}/revisions", get(revisions::list))
        .route("/drafts/{key}/preview", get(drafts::preview))
        .route("/drafts/{key}/final", get(drafts::final_output))
        .route("/pages/{page_id}/drafts", get(drafts::list_for_page))
        .route("/revisions/{id}/preview", get(revisions::preview))
        .route("/revisions/{id}/restore", post(revisions::restore))
        .route("/blueprints", get(blueprints::list).post(blueprints::save))
        .route(
            "/blueprints/{id}",
            get(blueprints::get).delete(blueprints::delete),
        )
        .route("/portlets", get(portlets::list));

    Router::new().nest("/composer", composer)
}

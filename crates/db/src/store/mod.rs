//! Store layer: draft/publish/revision orchestration over the repositories.

use sqlx::PgPool;

use opc_core::error::CoreError;
use opc_core::registry::PortletRegistry;

use crate::repositories::{PluginRepo, PortletRepo};

pub mod blueprint_store;
pub mod page_store;
pub mod revision_store;

pub use blueprint_store::BlueprintStore;
pub use page_store::PageStore;
pub use revision_store::{RevisionMapping, RevisionMappings, RevisionStore, DEFAULT_MAX_REVISIONS};

/// Errors crossing the store boundary: domain rule violations or database
/// failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Build the in-process portlet registry from the `portlets` and `plugins`
/// tables. Equivalent to any previously cached state; called at startup.
pub async fn load_portlet_registry(
    pool: &PgPool,
    safe_mode: bool,
) -> Result<PortletRegistry, sqlx::Error> {
    let registry = PortletRegistry::new(safe_mode);
    for row in PortletRepo::list(pool).await? {
        registry.register(row.into_meta());
    }
    for plugin in PluginRepo::list(pool).await? {
        registry.register_plugin(plugin.id, plugin.active);
    }
    Ok(registry)
}

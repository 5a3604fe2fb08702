use std::sync::Arc;

use opc_core::hooks::HookRegistry;
use opc_core::registry::PortletRegistry;
use opc_db::store::{BlueprintStore, PageStore};
use opc_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: opc_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Portlet class -> descriptor resolution, loaded at startup.
    pub registry: Arc<PortletRegistry>,
    /// Fire-and-continue extension points.
    pub hooks: Arc<HookRegistry>,
    /// Draft lifecycle orchestration.
    pub pages: Arc<PageStore>,
    /// Blueprint persistence.
    pub blueprints: Arc<BlueprintStore>,
    /// Centralized bus for composer lifecycle events.
    pub event_bus: Arc<EventBus>,
}

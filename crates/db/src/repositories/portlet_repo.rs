//! Repositories for the `portlets` registry mapping and `plugins` tables.

use sqlx::PgPool;

use crate::models::portlet::{PluginRow, PortletRow};

const PORTLET_COLUMNS: &str = "id, class, plugin_id, active, display_group, title, \
                               css_files, js_files, property_schema, is_container, \
                               created_at, updated_at";

/// Provides access to the portlet class -> metadata mapping.
pub struct PortletRepo;

impl PortletRepo {
    /// All registered portlet rows, for populating the in-process registry.
    pub async fn list(pool: &PgPool) -> Result<Vec<PortletRow>, sqlx::Error> {
        let query = format!("SELECT {PORTLET_COLUMNS} FROM portlets ORDER BY display_group, title");
        sqlx::query_as::<_, PortletRow>(&query)
            .fetch_all(pool)
            .await
    }
}

/// Provides access to plugin availability.
pub struct PluginRepo;

impl PluginRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<PluginRow>, sqlx::Error> {
        sqlx::query_as::<_, PluginRow>(
            "SELECT id, name, active, created_at FROM plugins ORDER BY id",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn create(pool: &PgPool, name: &str, active: bool) -> Result<PluginRow, sqlx::Error> {
        sqlx::query_as::<_, PluginRow>(
            "INSERT INTO plugins (name, active) VALUES ($1, $2)
             RETURNING id, name, active, created_at",
        )
        .bind(name)
        .bind(active)
        .fetch_one(pool)
        .await
    }
}

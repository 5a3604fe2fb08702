//! Portlet registry mapping rows and plugin availability rows.

use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

use opc_core::portlet::PortletMeta;
use opc_core::types::{DbId, Timestamp};

/// A row from the `portlets` registry mapping table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PortletRow {
    pub id: DbId,
    pub class: String,
    pub plugin_id: Option<DbId>,
    pub active: bool,
    pub display_group: String,
    pub title: String,
    pub css_files: Value,
    pub js_files: Value,
    pub property_schema: Value,
    pub is_container: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PortletRow {
    /// Convert to the in-process registry descriptor.
    pub fn into_meta(self) -> PortletMeta {
        PortletMeta {
            class: self.class,
            portlet_id: self.id,
            plugin_id: self.plugin_id,
            active: self.active,
            group: self.display_group,
            title: self.title,
            css_files: string_list(&self.css_files),
            js_files: string_list(&self.js_files),
            property_schema: self.property_schema,
            is_container: self.is_container,
        }
    }
}

/// A row from the `plugins` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PluginRow {
    pub id: DbId,
    pub name: String,
    pub active: bool,
    pub created_at: Timestamp,
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

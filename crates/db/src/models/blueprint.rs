//! Blueprint rows.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use opc_core::types::{DbId, Timestamp};

/// A row from the `blueprints` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlueprintRow {
    pub id: DbId,
    pub name: String,
    pub plugin_id: Option<DbId>,
    /// Serialized portlet instance subtree.
    pub content: Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload for a new blueprint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlueprint {
    pub name: String,
    pub plugin_id: Option<DbId>,
    pub content: Value,
}

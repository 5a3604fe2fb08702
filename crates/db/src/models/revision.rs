//! Revision snapshot rows.

use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

use opc_core::types::{DbId, Timestamp};

/// A row from the `revisions` table: an immutable snapshot of one entity's
/// content at a point in time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RevisionRow {
    pub id: DbId,
    /// Mapped entity type (e.g. `"page"`).
    pub entity_type: String,
    /// Primary key of the snapshotted entity.
    pub reference_id: DbId,
    /// Full row snapshot, plus an optional `references` sub-object for
    /// secondary-table snapshots.
    pub content: Value,
    pub author: Option<String>,
    /// Table/primary-key recorded at snapshot time; used to restore types
    /// that are no longer in the static mapping.
    pub custom_table: Option<String>,
    pub custom_primary_key: Option<String>,
    pub created_at: Timestamp,
}

/// Insert payload for a new revision row.
#[derive(Debug, Clone)]
pub struct CreateRevision {
    pub entity_type: String,
    pub reference_id: DbId,
    pub content: Value,
    pub author: Option<String>,
    pub custom_table: Option<String>,
    pub custom_primary_key: Option<String>,
}

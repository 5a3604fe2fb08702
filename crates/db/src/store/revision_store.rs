//! Generic entity snapshot/restore.
//!
//! Any mapped entity type can be snapshotted into the `revisions` table and
//! restored from it. The page store uses this for pre-update snapshots of
//! draft rows; further types (and even types added after a snapshot was
//! taken) are supported through the mapping registry and the
//! `custom_table`/`custom_primary_key` columns recorded on every snapshot.

use std::collections::HashMap;

use serde_json::Value;
use sqlx::PgPool;

use opc_core::error::CoreError;
use opc_core::types::DbId;

use crate::models::revision::{CreateRevision, RevisionRow};
use crate::repositories::RevisionRepo;
use crate::store::StoreResult;

/// Default number of snapshots kept per `(type, reference)` pair.
pub const DEFAULT_MAX_REVISIONS: i64 = 5;

/// Key used inside snapshot content for gathered reference rows.
const REFERENCES_KEY: &str = "references";

// ---------------------------------------------------------------------------
// Mapping registry
// ---------------------------------------------------------------------------

/// Where an entity type lives: its table, primary key column, and an
/// optional secondary table of reference rows.
#[derive(Debug, Clone)]
pub struct RevisionMapping {
    pub table: String,
    pub primary_key: String,
    pub reference_table: Option<String>,
    pub reference_key: Option<String>,
}

impl RevisionMapping {
    pub fn new(table: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            primary_key: primary_key.into(),
            reference_table: None,
            reference_key: None,
        }
    }

    pub fn with_references(
        mut self,
        table: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        self.reference_table = Some(table.into());
        self.reference_key = Some(key.into());
        self
    }
}

/// Explicitly constructed, extensible type -> mapping registry.
#[derive(Debug, Clone, Default)]
pub struct RevisionMappings {
    map: HashMap<String, RevisionMapping>,
}

impl RevisionMappings {
    /// The built-in mappings: composer pages.
    pub fn with_defaults() -> Self {
        let mut mappings = Self::default();
        mappings.register("page", RevisionMapping::new("pages", "id"));
        mappings
    }

    pub fn register(&mut self, entity_type: impl Into<String>, mapping: RevisionMapping) {
        self.map.insert(entity_type.into(), mapping);
    }

    pub fn get(&self, entity_type: &str) -> Option<&RevisionMapping> {
        self.map.get(entity_type)
    }
}

// ---------------------------------------------------------------------------
// RevisionStore
// ---------------------------------------------------------------------------

/// Snapshot/restore service over the mapping registry.
pub struct RevisionStore {
    mappings: RevisionMappings,
    max_revisions: i64,
}

impl RevisionStore {
    pub fn new(mappings: RevisionMappings, max_revisions: i64) -> Self {
        Self {
            mappings,
            max_revisions,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(RevisionMappings::with_defaults(), DEFAULT_MAX_REVISIONS)
    }

    pub fn max_revisions(&self) -> i64 {
        self.max_revisions
    }

    /// Snapshot the current state of a mapped entity.
    ///
    /// Returns `Ok(true)` when a new snapshot row was written. `Ok(false)`
    /// covers every benign skip: revisioning disabled (`max_revisions <= 0`),
    /// entity row absent, reference gathering came up empty or undeclared,
    /// or the content matches the latest stored snapshot (idempotence).
    /// Errors are reserved for contract violations (unmapped type, bad key)
    /// and database failures.
    pub async fn add_revision(
        &self,
        pool: &PgPool,
        entity_type: &str,
        key: DbId,
        secondary: bool,
        author: Option<&str>,
    ) -> StoreResult<bool> {
        if self.max_revisions <= 0 {
            return Ok(false);
        }
        let mapping = self.mappings.get(entity_type).ok_or_else(|| {
            CoreError::Validation(format!("No revision mapping for entity type '{entity_type}'"))
        })?;
        if key <= 0 {
            return Err(CoreError::InvalidArgument(
                "revision reference key must be positive".into(),
            )
            .into());
        }

        let Some(mut content) =
            RevisionRepo::fetch_entity_json(pool, &mapping.table, &mapping.primary_key, key)
                .await?
        else {
            return Ok(false);
        };

        if secondary {
            if let Some(reference_table) = &mapping.reference_table {
                // A declared reference table without a declared key field,
                // or with zero reference rows, skips the whole snapshot.
                let Some(reference_key) = &mapping.reference_key else {
                    return Ok(false);
                };
                let rows = RevisionRepo::fetch_reference_rows(
                    pool,
                    reference_table,
                    &mapping.primary_key,
                    key,
                    reference_key,
                )
                .await?;
                if rows.is_empty() {
                    return Ok(false);
                }
                let references: serde_json::Map<String, Value> = rows.into_iter().collect();
                match content.as_object_mut() {
                    Some(obj) => {
                        obj.insert(REFERENCES_KEY.to_string(), Value::Object(references));
                    }
                    None => return Ok(false),
                }
            }
        }

        // Idempotence: identical content to the latest snapshot is a no-op.
        if let Some(latest) = RevisionRepo::latest_for(pool, entity_type, key).await? {
            if latest.content == content {
                return Ok(false);
            }
        }

        RevisionRepo::create(
            pool,
            &CreateRevision {
                entity_type: entity_type.to_string(),
                reference_id: key,
                content,
                author: author.map(str::to_string),
                custom_table: Some(mapping.table.clone()),
                custom_primary_key: Some(mapping.primary_key.clone()),
            },
        )
        .await?;

        let pruned = RevisionRepo::prune(pool, entity_type, key, self.max_revisions).await?;
        if pruned > 0 {
            tracing::debug!(entity_type, key, pruned, "Pruned old revisions");
        }
        Ok(true)
    }

    /// List snapshots for a mapped entity, newest first.
    pub async fn list(
        &self,
        pool: &PgPool,
        entity_type: &str,
        key: DbId,
    ) -> StoreResult<Vec<RevisionRow>> {
        Ok(RevisionRepo::list_for(pool, entity_type, key).await?)
    }

    /// Load a single snapshot row.
    pub async fn get(&self, pool: &PgPool, id: DbId) -> StoreResult<RevisionRow> {
        RevisionRepo::find_by_id(pool, id)
            .await?
            .ok_or_else(|| CoreError::NotFound { entity: "Revision", id }.into())
    }

    /// Write a snapshot back into its source table(s).
    ///
    /// The mapping is resolved from the registry, falling back to the
    /// table/primary-key recorded on the snapshot itself for types that are
    /// no longer mapped. The primary key column is stripped before writing
    /// (the identity is never overwritten); secondary restores strip both
    /// key columns from each reference row.
    ///
    /// The consumed snapshot row is deleted only when at least one row was
    /// actually updated; otherwise it is preserved and `Ok(false)` reports
    /// the failure.
    pub async fn restore_revision(
        &self,
        pool: &PgPool,
        id: DbId,
        secondary: bool,
    ) -> StoreResult<bool> {
        let revision = self.get(pool, id).await?;

        let (table, primary_key) = match self.mappings.get(&revision.entity_type) {
            Some(mapping) => (mapping.table.clone(), mapping.primary_key.clone()),
            None => match (&revision.custom_table, &revision.custom_primary_key) {
                (Some(table), Some(pk)) => (table.clone(), pk.clone()),
                _ => {
                    return Err(CoreError::Validation(format!(
                        "Revision type '{}' is unmapped and records no custom table",
                        revision.entity_type
                    ))
                    .into())
                }
            },
        };

        let Some(content) = revision.content.as_object() else {
            return Err(CoreError::Validation("revision content is not a JSON object".into()).into());
        };
        let mut fields = content.clone();
        fields.remove(&primary_key);
        let references = fields.remove(REFERENCES_KEY);

        let mut updated = RevisionRepo::restore_entity(
            pool,
            &table,
            &primary_key,
            revision.reference_id,
            &fields,
        )
        .await?;

        if secondary {
            if let (Some(mapping), Some(Value::Object(references))) =
                (self.mappings.get(&revision.entity_type), references)
            {
                if let (Some(reference_table), Some(reference_key)) =
                    (&mapping.reference_table, &mapping.reference_key)
                {
                    for (reference_value, row) in &references {
                        let Some(row) = row.as_object() else { continue };
                        let mut row_fields = row.clone();
                        row_fields.remove(&primary_key);
                        row_fields.remove(reference_key);
                        updated += RevisionRepo::restore_reference_row(
                            pool,
                            reference_table,
                            &primary_key,
                            revision.reference_id,
                            reference_key,
                            reference_value,
                            &row_fields,
                        )
                        .await?;
                    }
                }
            }
        }

        if updated == 0 {
            return Ok(false);
        }
        RevisionRepo::delete(pool, id).await?;
        tracing::info!(
            revision_id = id,
            entity_type = %revision.entity_type,
            reference_id = revision.reference_id,
            "Revision restored",
        );
        Ok(true)
    }
}

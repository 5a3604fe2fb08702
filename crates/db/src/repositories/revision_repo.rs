//! Repository for the `revisions` table, plus the generic row-snapshot
//! queries used by the revision store.
//!
//! The snapshot/restore queries interpolate table and column identifiers.
//! Those identifiers come exclusively from the in-process mapping registry
//! and from snapshots this service wrote itself, never from request input.

use serde_json::{Map, Value};
use sqlx::PgPool;

use opc_core::types::DbId;

use crate::models::revision::{CreateRevision, RevisionRow};

/// Column list shared across queries.
const COLUMNS: &str =
    "id, entity_type, reference_id, content, author, custom_table, custom_primary_key, created_at";

/// Provides storage operations for entity snapshots.
pub struct RevisionRepo;

impl RevisionRepo {
    /// Insert a new snapshot row.
    pub async fn create(pool: &PgPool, input: &CreateRevision) -> Result<RevisionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO revisions (entity_type, reference_id, content, author, \
                                    custom_table, custom_primary_key)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RevisionRow>(&query)
            .bind(&input.entity_type)
            .bind(input.reference_id)
            .bind(&input.content)
            .bind(&input.author)
            .bind(&input.custom_table)
            .bind(&input.custom_primary_key)
            .fetch_one(pool)
            .await
    }

    /// Find a snapshot by its surrogate key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RevisionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM revisions WHERE id = $1");
        sqlx::query_as::<_, RevisionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All snapshots for one entity, newest first.
    pub async fn list_for(
        pool: &PgPool,
        entity_type: &str,
        reference_id: DbId,
    ) -> Result<Vec<RevisionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM revisions
             WHERE entity_type = $1 AND reference_id = $2
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, RevisionRow>(&query)
            .bind(entity_type)
            .bind(reference_id)
            .fetch_all(pool)
            .await
    }

    /// The most recent snapshot for one entity, if any.
    pub async fn latest_for(
        pool: &PgPool,
        entity_type: &str,
        reference_id: DbId,
    ) -> Result<Option<RevisionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM revisions
             WHERE entity_type = $1 AND reference_id = $2
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, RevisionRow>(&query)
            .bind(entity_type)
            .bind(reference_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete everything beyond the newest `keep` snapshots for one entity.
    /// Returns the number of pruned rows.
    pub async fn prune(
        pool: &PgPool,
        entity_type: &str,
        reference_id: DbId,
        keep: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM revisions
             WHERE entity_type = $1 AND reference_id = $2
               AND id NOT IN (
                   SELECT id FROM revisions
                   WHERE entity_type = $1 AND reference_id = $2
                   ORDER BY created_at DESC, id DESC
                   LIMIT $3
               )",
        )
        .bind(entity_type)
        .bind(reference_id)
        .bind(keep)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete a consumed snapshot. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM revisions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Generic snapshot/restore queries over mapped entity tables
    // -----------------------------------------------------------------------

    /// Fetch a mapped entity row as JSON (`to_jsonb` of the whole row).
    pub async fn fetch_entity_json(
        pool: &PgPool,
        table: &str,
        primary_key: &str,
        key: DbId,
    ) -> Result<Option<Value>, sqlx::Error> {
        let query = format!("SELECT to_jsonb(t) FROM {table} t WHERE {primary_key} = $1");
        sqlx::query_scalar::<_, Value>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Fetch all reference rows of a mapped entity, keyed by the mapping's
    /// reference key field.
    pub async fn fetch_reference_rows(
        pool: &PgPool,
        reference_table: &str,
        primary_key: &str,
        key: DbId,
        reference_key: &str,
    ) -> Result<Vec<(String, Value)>, sqlx::Error> {
        let query = format!(
            "SELECT {reference_key}::text, to_jsonb(t)
             FROM {reference_table} t
             WHERE {primary_key} = $1"
        );
        sqlx::query_as::<_, (String, Value)>(&query)
            .bind(key)
            .fetch_all(pool)
            .await
    }

    /// Write a snapshot's fields back into the entity row.
    ///
    /// `fields` must not contain the primary key column (the identity is
    /// never overwritten). Returns the number of updated rows.
    pub async fn restore_entity(
        pool: &PgPool,
        table: &str,
        primary_key: &str,
        key: DbId,
        fields: &Map<String, Value>,
    ) -> Result<u64, sqlx::Error> {
        if fields.is_empty() {
            return Ok(0);
        }
        let columns = fields.keys().cloned().collect::<Vec<_>>().join(", ");
        let query = format!(
            "UPDATE {table} SET ({columns}) = \
             (SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1))
             WHERE {primary_key} = $2"
        );
        let result = sqlx::query(&query)
            .bind(Value::Object(fields.clone()))
            .bind(key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Write a reference-row snapshot back, addressed by `(primary key,
    /// reference key value)`. Both key columns must already be stripped
    /// from `fields`.
    #[allow(clippy::too_many_arguments)]
    pub async fn restore_reference_row(
        pool: &PgPool,
        reference_table: &str,
        primary_key: &str,
        key: DbId,
        reference_key: &str,
        reference_value: &str,
        fields: &Map<String, Value>,
    ) -> Result<u64, sqlx::Error> {
        if fields.is_empty() {
            return Ok(0);
        }
        let columns = fields.keys().cloned().collect::<Vec<_>>().join(", ");
        let query = format!(
            "UPDATE {reference_table} SET ({columns}) = \
             (SELECT {columns} FROM jsonb_populate_record(NULL::{reference_table}, $1))
             WHERE {primary_key} = $2 AND {reference_key}::text = $3"
        );
        let result = sqlx::query(&query)
            .bind(Value::Object(fields.clone()))
            .bind(key)
            .bind(reference_value)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

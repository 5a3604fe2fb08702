//! Repository for the `seo_aliases` lookup table.

use sqlx::PgPool;

use opc_core::types::DbId;

/// Provides opportunistic alias lookups for URL derivation.
pub struct SeoRepo;

impl SeoRepo {
    /// Look up the alias for one entity key in one language.
    pub async fn lookup(
        pool: &PgPool,
        key_field: &str,
        key_value: DbId,
        lang_id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT alias FROM seo_aliases
             WHERE key_field = $1 AND key_value = $2 AND lang_id = $3",
        )
        .bind(key_field)
        .bind(key_value)
        .bind(lang_id)
        .fetch_optional(pool)
        .await
    }

    /// Seed or replace an alias. Returns the row id.
    pub async fn upsert(
        pool: &PgPool,
        key_field: &str,
        key_value: DbId,
        lang_id: DbId,
        alias: &str,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO seo_aliases (key_field, key_value, lang_id, alias)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_seo_aliases_lookup
             DO UPDATE SET alias = EXCLUDED.alias
             RETURNING id",
        )
        .bind(key_field)
        .bind(key_value)
        .bind(lang_id)
        .bind(alias)
        .fetch_one(pool)
        .await
    }
}

//! SEO alias rows.

use serde::Serialize;
use sqlx::FromRow;

use opc_core::types::DbId;

/// A row from the `seo_aliases` lookup table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeoAliasRow {
    pub id: DbId,
    /// Which entity key the alias belongs to (`product`, `category`,
    /// `attribute`, `manufacturer`, ...).
    pub key_field: String,
    pub key_value: DbId,
    pub lang_id: DbId,
    pub alias: String,
}

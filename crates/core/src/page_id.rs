//! The structured logical page identifier.
//!
//! A composer page does not exist on its own: it decorates some piece of
//! shop content (a product detail page, a category listing, a static link,
//! a search result page...). The logical id is a JSON token describing that
//! target. Several draft and published rows share the same logical id; the
//! surrogate row key identifies one concrete draft.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Structured identifier of the content a page decorates.
///
/// Serialized as a compact JSON object, e.g.
/// `{"type":"product","id":42,"lang":1}`. The serialized form is stored in
/// the `page_id` column and compared as a string, so [`LogicalPageId::encode`]
/// must be deterministic: field order is fixed and optional maps keep their
/// insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalPageId {
    /// Kind of decorated content (`product`, `category`, `link`, `search`, ...).
    #[serde(rename = "type")]
    pub page_type: String,

    /// Key of the decorated entity within its own table.
    pub id: DbId,

    /// Language the page is composed for.
    pub lang: DbId,

    /// Selected attribute filters (attribute key -> value key), present only
    /// for filtered category pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribs: Option<IndexMap<String, DbId>>,

    /// Manufacturer filter key, present only for manufacturer-filtered pages.
    #[serde(
        rename = "manufacturerFilter",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub manufacturer_filter: Option<DbId>,
}

impl LogicalPageId {
    pub fn new(page_type: impl Into<String>, id: DbId, lang: DbId) -> Self {
        Self {
            page_type: page_type.into(),
            id,
            lang,
            attribs: None,
            manufacturer_filter: None,
        }
    }

    /// Parse a stored `page_id` column value.
    ///
    /// An empty string is rejected as an invalid argument; malformed JSON is
    /// a serialization error.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        if raw.trim().is_empty() {
            return Err(CoreError::InvalidArgument(
                "logical page id must not be empty".into(),
            ));
        }
        Ok(serde_json::from_str(raw)?)
    }

    /// Canonical string form, as stored and compared in the database.
    pub fn encode(&self) -> String {
        // Field order is fixed by the struct declaration, so two equal ids
        // always encode to the same string.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl std::fmt::Display for LogicalPageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

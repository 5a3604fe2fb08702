//! Page draft/publication rows and their mapping to the domain aggregate.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use opc_core::error::CoreError;
use opc_core::page::Page;
use opc_core::page_id::LogicalPageId;
use opc_core::registry::PortletRegistry;
use opc_core::types::{DbId, Timestamp};

/// A row from the `pages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PageRow {
    pub id: DbId,
    /// Serialized logical page id token.
    pub page_id: String,
    pub name: String,
    pub url: String,
    pub publish_from: Option<Timestamp>,
    pub publish_to: Option<Timestamp>,
    /// Serialized area tree.
    pub content: Value,
    pub locked_by: String,
    pub locked_at: Option<Timestamp>,
    /// Comma-delimited group ids; `None` = all groups.
    pub customer_groups: Option<String>,
    /// Bumped on every content-changing save.
    pub rev_id: DbId,
    pub last_modified: Timestamp,
    pub created_at: Timestamp,
}

impl PageRow {
    /// Rehydrate the domain aggregate, resolving portlets through the
    /// registry so missing classes degrade to placeholders.
    pub fn into_page(self, registry: &PortletRegistry) -> Result<Page, CoreError> {
        let mut page = Page::new(LogicalPageId::parse(&self.page_id)?);
        page.key = self.id;
        page.name = self.name;
        page.url = self.url;
        page.publish_from = self.publish_from;
        page.publish_to = self.publish_to;
        page.locked_by = self.locked_by;
        page.locked_at = self.locked_at;
        page.customer_groups = parse_customer_groups(self.customer_groups.as_deref());
        page.rev_id = self.rev_id;
        page.last_modified = Some(self.last_modified);
        page.deserialize_areas(&self.content, registry);
        Ok(page)
    }
}

/// Insert/update payload derived from the domain aggregate.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePageRow {
    pub page_id: String,
    pub name: String,
    pub url: String,
    pub publish_from: Option<Timestamp>,
    pub publish_to: Option<Timestamp>,
    pub content: Value,
    pub locked_by: String,
    pub locked_at: Option<Timestamp>,
    pub customer_groups: Option<String>,
    pub rev_id: DbId,
}

impl CreatePageRow {
    pub fn from_page(page: &Page) -> Self {
        Self {
            page_id: page.id.encode(),
            name: page.name.clone(),
            url: page.url.clone(),
            publish_from: page.publish_from,
            publish_to: page.publish_to,
            content: page.area_json(),
            locked_by: page.locked_by.clone(),
            locked_at: page.locked_at,
            customer_groups: encode_customer_groups(page.customer_groups.as_deref()),
            rev_id: page.rev_id,
        }
    }
}

/// Parse the delimited `customer_groups` column. `None` or blank = all.
pub fn parse_customer_groups(raw: Option<&str>) -> Option<Vec<DbId>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(
        raw.split(',')
            .filter_map(|part| part.trim().parse::<DbId>().ok())
            .collect(),
    )
}

/// Encode a group set back into the delimited column form.
pub fn encode_customer_groups(groups: Option<&[DbId]>) -> Option<String> {
    groups.map(|ids| {
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    })
}

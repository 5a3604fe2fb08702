//! Draft lifecycle orchestration: load, save, lock, publish, delete.
//!
//! This is the write path of the composer. Draft saves are strict (any
//! validation failure aborts before the first write); the pre-update
//! revision snapshot is best-effort relative to the save itself, but when
//! taken it is committed before the row update so a crash between the two
//! never leaves a snapshot newer than the row it precedes.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;

use opc_core::error::CoreError;
use opc_core::hooks::HookRegistry;
use opc_core::locking::LockDraftResult;
use opc_core::page::Page;
use opc_core::page_id::LogicalPageId;
use opc_core::registry::PortletRegistry;
use opc_core::types::{DbId, Timestamp};

use crate::models::page::{encode_customer_groups, CreatePageRow, PageRow};
use crate::repositories::{PageRepo, SeoRepo};
use crate::store::revision_store::RevisionStore;
use crate::store::StoreResult;

/// Entity type under which page snapshots are stored.
pub const PAGE_REVISION_TYPE: &str = "page";

pub struct PageStore {
    registry: Arc<PortletRegistry>,
    hooks: Arc<HookRegistry>,
    revisions: RevisionStore,
    /// Customer group assumed when a caller passes group id 0.
    default_customer_group: DbId,
}

impl PageStore {
    pub fn new(
        registry: Arc<PortletRegistry>,
        hooks: Arc<HookRegistry>,
        revisions: RevisionStore,
        default_customer_group: DbId,
    ) -> Self {
        Self {
            registry,
            hooks,
            revisions,
            default_customer_group,
        }
    }

    pub fn registry(&self) -> &PortletRegistry {
        &self.registry
    }

    pub fn revisions(&self) -> &RevisionStore {
        &self.revisions
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Load a draft by surrogate key.
    ///
    /// When an SEO-friendly URL can be derived for the page's logical id,
    /// it overrides the stored URL on the returned instance only; nothing
    /// is persisted.
    pub async fn get_draft(&self, pool: &PgPool, key: DbId) -> StoreResult<Page> {
        let row = self.get_draft_row(pool, key).await?;
        let mut page = row.into_page(&self.registry)?;

        if let Some(url) = self.get_page_seo(pool, &page.id).await? {
            page.url = url;
        }
        self.hooks.fire_page_loaded(&mut page);
        Ok(page)
    }

    /// Load the raw draft row, failing with NotFound when absent.
    pub async fn get_draft_row(&self, pool: &PgPool, key: DbId) -> StoreResult<PageRow> {
        PageRepo::find_by_id(pool, key)
            .await?
            .ok_or_else(|| CoreError::NotFound { entity: "Page", id: key }.into())
    }

    /// All drafts sharing a logical page id, newest first.
    pub async fn get_drafts(&self, pool: &PgPool, id: &LogicalPageId) -> StoreResult<Vec<Page>> {
        let rows = PageRepo::list_by_page_id(pool, &id.encode()).await?;
        let mut pages = Vec::with_capacity(rows.len());
        for row in rows {
            pages.push(row.into_page(&self.registry)?);
        }
        Ok(pages)
    }

    /// Keys currently serving a logical id (newest started window per group
    /// scope), for deriving draft statuses (the liveness filter).
    pub async fn live_keys(&self, pool: &PgPool, id: &LogicalPageId) -> StoreResult<Vec<DbId>> {
        Ok(PageRepo::find_live_keys(pool, &id.encode()).await?)
    }

    /// Resolve the publication row serving a logical id for one customer
    /// group. A group id of 0 stands for "use the session default".
    pub async fn get_public_page_row(
        &self,
        pool: &PgPool,
        id: &LogicalPageId,
        customer_group_id: DbId,
    ) -> StoreResult<Option<Page>> {
        let group = if customer_group_id == 0 {
            self.default_customer_group
        } else {
            customer_group_id
        };
        let Some(row) = PageRepo::find_public_row(pool, &id.encode(), group).await? else {
            return Ok(None);
        };
        let mut page = row.into_page(&self.registry)?;
        self.hooks.fire_public_page_resolved(&mut page);
        Ok(Some(page))
    }

    /// Resolve the public row for each candidate group and deduplicate by
    /// page key: a page visible to several groups appears once.
    pub async fn get_public_pages(
        &self,
        pool: &PgPool,
        id: &LogicalPageId,
        customer_groups: &[DbId],
    ) -> StoreResult<Vec<Page>> {
        let mut pages: Vec<Page> = Vec::new();
        for &group in customer_groups {
            if let Some(page) = self.get_public_page_row(pool, id, group).await? {
                if !pages.iter().any(|p| p.key == page.key) {
                    pages.push(page);
                }
            }
        }
        Ok(pages)
    }

    // -----------------------------------------------------------------------
    // Saving
    // -----------------------------------------------------------------------

    /// Persist a draft: insert when `key == 0`, update otherwise.
    ///
    /// Validation failures abort before any write. On update, a revision
    /// snapshot of the pre-update row is taken first whenever the stored
    /// area tree differs from the submitted one; snapshot failures are
    /// logged and never block the save. On insert, the generated key is
    /// written back onto the page.
    pub async fn save_draft(&self, pool: &PgPool, page: &mut Page) -> StoreResult<()> {
        if !page.is_modifiable {
            return Err(CoreError::Validation(
                "synthetic fallback pages cannot be saved".into(),
            )
            .into());
        }
        if page.url.is_empty() {
            return Err(CoreError::Validation("page url must not be empty".into()).into());
        }
        if page.last_modified.is_none() {
            return Err(CoreError::Validation("page lastModified must be set".into()).into());
        }
        if page.locked_at.is_none() {
            return Err(CoreError::Validation("page lockedAt must be set".into()).into());
        }

        self.hooks.fire_draft_presave(page);
        page.last_modified = Some(Utc::now());

        if page.key > 0 {
            let existing = self.get_draft_row(pool, page.key).await?;
            page.rev_id = existing.rev_id;
            if existing.content != page.area_json() {
                page.rev_id = existing.rev_id + 1;
                // Snapshot the pre-update row before touching it. Revisioning
                // is best-effort relative to the draft save.
                let author = (!page.locked_by.is_empty()).then_some(page.locked_by.as_str());
                match self
                    .revisions
                    .add_revision(pool, PAGE_REVISION_TYPE, page.key, false, author)
                    .await
                {
                    Ok(written) => {
                        if written {
                            tracing::debug!(page_key = page.key, "Draft snapshot taken");
                        }
                    }
                    Err(err) => {
                        tracing::warn!(page_key = page.key, error = %err, "Draft snapshot failed");
                    }
                }
            }

            let input = CreatePageRow::from_page(page);
            let affected = PageRepo::update_draft(
                pool,
                page.key,
                &input,
                page.last_modified.unwrap_or_else(Utc::now),
            )
            .await?;
            if affected == 0 {
                return Err(CoreError::NotFound { entity: "Page", id: page.key }.into());
            }
        } else {
            let input = CreatePageRow::from_page(page);
            let row = PageRepo::create(pool, &input).await?;
            page.key = row.id;
        }

        tracing::info!(page_key = page.key, page_id = %page.id, "Draft saved");
        Ok(())
    }

    /// Persist only the lock fields of a draft.
    pub async fn save_draft_lock_status(&self, pool: &PgPool, page: &Page) -> StoreResult<()> {
        let affected =
            PageRepo::update_lock(pool, page.key, &page.locked_by, page.locked_at).await?;
        if affected == 0 {
            return Err(CoreError::NotFound { entity: "Page", id: page.key }.into());
        }
        Ok(())
    }

    /// Persist only the publication window and group scope of a draft.
    pub async fn save_draft_publication_status(
        &self,
        pool: &PgPool,
        key: DbId,
        publish_from: Option<Timestamp>,
        publish_to: Option<Timestamp>,
        customer_groups: Option<&[DbId]>,
    ) -> StoreResult<()> {
        let groups = encode_customer_groups(customer_groups);
        let affected =
            PageRepo::update_publication(pool, key, publish_from, publish_to, groups.as_deref())
                .await?;
        if affected == 0 {
            return Err(CoreError::NotFound { entity: "Page", id: key }.into());
        }
        tracing::info!(page_key = key, "Draft publication status saved");
        Ok(())
    }

    /// Persist only the display name of a draft.
    pub async fn save_draft_name(&self, pool: &PgPool, key: DbId, name: &str) -> StoreResult<()> {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("draft name must not be empty".into()).into());
        }
        let affected = PageRepo::update_name(pool, key, name).await?;
        if affected == 0 {
            return Err(CoreError::NotFound { entity: "Page", id: key }.into());
        }
        Ok(())
    }

    /// Delete a draft row. NotFound when the key is unknown.
    pub async fn delete_draft(&self, pool: &PgPool, key: DbId) -> StoreResult<()> {
        if !PageRepo::delete(pool, key).await? {
            return Err(CoreError::NotFound { entity: "Page", id: key }.into());
        }
        tracing::info!(page_key = key, "Draft deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Locking
    // -----------------------------------------------------------------------

    /// Try to take the advisory draft lock for `user`.
    ///
    /// Editing is refused outright while database migrations are pending.
    /// Otherwise the 60-second lock rule applies: acquiring refreshes the
    /// lock timestamp and persists it; losing leaves the stored lock alone.
    pub async fn lock_draft(
        &self,
        pool: &PgPool,
        key: DbId,
        user: &str,
    ) -> StoreResult<LockDraftResult> {
        if crate::has_pending_migrations(pool).await? {
            return Ok(LockDraftResult::PendingMigrations);
        }

        let row = self.get_draft_row(pool, key).await?;
        let mut page = row.into_page(&self.registry)?;
        if !page.lock(user, Utc::now())? {
            return Ok(LockDraftResult::LockedByOther);
        }
        self.save_draft_lock_status(pool, &page).await?;
        Ok(LockDraftResult::Locked)
    }

    /// Clear the advisory lock unconditionally (ownership is not checked).
    pub async fn unlock_draft(&self, pool: &PgPool, key: DbId) -> StoreResult<()> {
        let affected = PageRepo::update_lock(pool, key, "", None).await?;
        if affected == 0 {
            return Err(CoreError::NotFound { entity: "Page", id: key }.into());
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // SEO derivation
    // -----------------------------------------------------------------------

    /// Best-effort derivation of a human-readable path for a logical id.
    ///
    /// All-or-nothing: the primary alias and the alias of *every* attribute
    /// and manufacturer filter must resolve, otherwise the derivation yields
    /// `None` and the stored URL stands.
    pub async fn get_page_seo(
        &self,
        pool: &PgPool,
        id: &LogicalPageId,
    ) -> StoreResult<Option<String>> {
        let Some(base) = SeoRepo::lookup(pool, &id.page_type, id.id, id.lang).await? else {
            return Ok(None);
        };
        let mut segments = vec![base];

        if let Some(attribs) = &id.attribs {
            for value_key in attribs.values() {
                let Some(alias) = SeoRepo::lookup(pool, "attribute", *value_key, id.lang).await?
                else {
                    return Ok(None);
                };
                segments.push(alias);
            }
        }
        if let Some(manufacturer) = id.manufacturer_filter {
            let Some(alias) = SeoRepo::lookup(pool, "manufacturer", manufacturer, id.lang).await?
            else {
                return Ok(None);
            };
            segments.push(alias);
        }

        Ok(Some(segments.join("/")))
    }
}

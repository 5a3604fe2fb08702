//! Repository for the `pages` table.

use sqlx::PgPool;

use opc_core::types::{DbId, Timestamp};

use crate::models::page::{CreatePageRow, PageRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, page_id, name, url, publish_from, publish_to, content, \
                       locked_by, locked_at, customer_groups, rev_id, last_modified, created_at";

/// Provides row-level operations for page drafts and publications.
pub struct PageRepo;

impl PageRepo {
    /// Insert a new draft row, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePageRow) -> Result<PageRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO pages (page_id, name, url, publish_from, publish_to, content, \
                                locked_by, locked_at, customer_groups, rev_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PageRow>(&query)
            .bind(&input.page_id)
            .bind(&input.name)
            .bind(&input.url)
            .bind(input.publish_from)
            .bind(input.publish_to)
            .bind(&input.content)
            .bind(&input.locked_by)
            .bind(input.locked_at)
            .bind(&input.customer_groups)
            .bind(input.rev_id)
            .fetch_one(pool)
            .await
    }

    /// Find a draft row by its surrogate key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PageRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pages WHERE id = $1");
        sqlx::query_as::<_, PageRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all draft/publication rows sharing a logical page id, newest
    /// first.
    pub async fn list_by_page_id(
        pool: &PgPool,
        page_id: &str,
    ) -> Result<Vec<PageRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM pages WHERE page_id = $1 ORDER BY last_modified DESC");
        sqlx::query_as::<_, PageRow>(&query)
            .bind(page_id)
            .fetch_all(pool)
            .await
    }

    /// Full-content update of an existing draft row.
    ///
    /// Returns the number of affected rows (0 when the key is unknown).
    pub async fn update_draft(
        pool: &PgPool,
        id: DbId,
        input: &CreatePageRow,
        last_modified: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE pages SET name = $2, url = $3, publish_from = $4, publish_to = $5, \
                              content = $6, locked_by = $7, locked_at = $8, \
                              customer_groups = $9, rev_id = $10, last_modified = $11
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.url)
        .bind(input.publish_from)
        .bind(input.publish_to)
        .bind(&input.content)
        .bind(&input.locked_by)
        .bind(input.locked_at)
        .bind(&input.customer_groups)
        .bind(input.rev_id)
        .bind(last_modified)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Partial update of the advisory lock fields.
    pub async fn update_lock(
        pool: &PgPool,
        id: DbId,
        locked_by: &str,
        locked_at: Option<Timestamp>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE pages SET locked_by = $2, locked_at = $3 WHERE id = $1")
            .bind(id)
            .bind(locked_by)
            .bind(locked_at)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Partial update of the publication window and group scope.
    pub async fn update_publication(
        pool: &PgPool,
        id: DbId,
        publish_from: Option<Timestamp>,
        publish_to: Option<Timestamp>,
        customer_groups: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE pages SET publish_from = $2, publish_to = $3, customer_groups = $4, \
                              last_modified = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(publish_from)
        .bind(publish_to)
        .bind(customer_groups)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Partial update of the draft name.
    pub async fn update_name(pool: &PgPool, id: DbId, name: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE pages SET name = $2, last_modified = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete a draft row. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Resolve the currently-serving publication row for a logical page id
    /// and customer group: publication window contains `now`, group scope
    /// absent or includes the group, most recently started window wins.
    pub async fn find_public_row(
        pool: &PgPool,
        page_id: &str,
        customer_group_id: DbId,
    ) -> Result<Option<PageRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pages
             WHERE page_id = $1
               AND publish_from IS NOT NULL AND publish_from <= NOW()
               AND (publish_to IS NULL OR publish_to > NOW())
               AND (customer_groups IS NULL OR customer_groups = ''
                    OR (',' || customer_groups || ',') LIKE ('%,' || $2::text || ',%'))
             ORDER BY publish_from DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, PageRow>(&query)
            .bind(page_id)
            .bind(customer_group_id)
            .fetch_optional(pool)
            .await
    }

    /// Keys of the rows currently *serving* a logical page id: inside their
    /// publication window, newest started window per group scope. An
    /// in-window row superseded by a newer window is not live. Used as the
    /// liveness filter when deriving draft statuses.
    pub async fn find_live_keys(pool: &PgPool, page_id: &str) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT id FROM (
                 SELECT DISTINCT ON (customer_groups) id, publish_from
                 FROM pages
                 WHERE page_id = $1
                   AND publish_from IS NOT NULL AND publish_from <= NOW()
                   AND (publish_to IS NULL OR publish_to > NOW())
                 ORDER BY customer_groups, publish_from DESC, id DESC
             ) serving
             ORDER BY publish_from DESC",
        )
        .bind(page_id)
        .fetch_all(pool)
        .await
    }
}

//! Integration tests for publication resolution.
//!
//! - Publication window checks (open, future, expired)
//! - Customer group scoping, including the default-group fallback
//! - Most-recently-started window wins
//! - Live-key derivation and multi-group deduplication

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::PgPool;

use opc_core::area::Area;
use opc_core::hooks::HookRegistry;
use opc_core::page::{Page, PageStatus};
use opc_core::page_id::LogicalPageId;
use opc_core::portlet::PropertyValue;
use opc_core::types::DbId;
use opc_db::store::{load_portlet_registry, PageStore, RevisionStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const DEFAULT_GROUP: DbId = 1;

async fn page_store(pool: &PgPool) -> PageStore {
    let registry = Arc::new(load_portlet_registry(pool, false).await.unwrap());
    PageStore::new(
        registry,
        Arc::new(HookRegistry::new()),
        RevisionStore::with_defaults(),
        DEFAULT_GROUP,
    )
}

fn logical_id() -> LogicalPageId {
    LogicalPageId::new("product", 42, 1)
}

async fn saved_draft(store: &PageStore, pool: &PgPool, name: &str) -> Page {
    let mut page = Page::new(logical_id());
    page.name = name.into();
    page.url = "/product/42".into();
    page.last_modified = Some(Utc::now());
    page.locked_at = Some(Utc::now());

    let mut portlet = store.registry().resolve("Text").unwrap().into_instance();
    portlet.set_property("text", PropertyValue::Scalar(json!(name)));
    let mut area = Area::new("main");
    area.add_portlet(portlet);
    page.area_list.put(area);

    store.save_draft(pool, &mut page).await.unwrap();
    page
}

async fn publish(
    store: &PageStore,
    pool: &PgPool,
    key: DbId,
    from_offset_hours: i64,
    to_offset_hours: Option<i64>,
    groups: Option<&[DbId]>,
) {
    store
        .save_draft_publication_status(
            pool,
            key,
            Some(Utc::now() + Duration::hours(from_offset_hours)),
            to_offset_hours.map(|h| Utc::now() + Duration::hours(h)),
            groups,
        )
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Window checks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn open_window_resolves(pool: PgPool) {
    let store = page_store(&pool).await;
    let page = saved_draft(&store, &pool, "live").await;
    publish(&store, &pool, page.key, -1, None, None).await;

    let public = store
        .get_public_page_row(&pool, &logical_id(), DEFAULT_GROUP)
        .await
        .unwrap();
    assert_eq!(public.unwrap().key, page.key);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unpublished_and_future_windows_do_not_resolve(pool: PgPool) {
    let store = page_store(&pool).await;
    let _draft = saved_draft(&store, &pool, "draft").await;
    let planned = saved_draft(&store, &pool, "planned").await;
    publish(&store, &pool, planned.key, 1, None, None).await;

    let public = store
        .get_public_page_row(&pool, &logical_id(), DEFAULT_GROUP)
        .await
        .unwrap();
    assert!(public.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_window_does_not_resolve(pool: PgPool) {
    let store = page_store(&pool).await;
    let page = saved_draft(&store, &pool, "expired").await;
    publish(&store, &pool, page.key, -2, Some(-1), None).await;

    let public = store
        .get_public_page_row(&pool, &logical_id(), DEFAULT_GROUP)
        .await
        .unwrap();
    assert!(public.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn most_recently_started_window_wins(pool: PgPool) {
    let store = page_store(&pool).await;
    let older = saved_draft(&store, &pool, "older").await;
    let newer = saved_draft(&store, &pool, "newer").await;
    publish(&store, &pool, older.key, -2, None, None).await;
    publish(&store, &pool, newer.key, -1, None, None).await;

    let public = store
        .get_public_page_row(&pool, &logical_id(), DEFAULT_GROUP)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(public.key, newer.key);
}

// ---------------------------------------------------------------------------
// Group scoping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn group_scope_filters_publication(pool: PgPool) {
    let store = page_store(&pool).await;
    let page = saved_draft(&store, &pool, "wholesale").await;
    publish(&store, &pool, page.key, -1, None, Some(&[2, 3])).await;

    let for_wholesale = store
        .get_public_page_row(&pool, &logical_id(), 2)
        .await
        .unwrap();
    assert!(for_wholesale.is_some());

    let for_retail = store
        .get_public_page_row(&pool, &logical_id(), 4)
        .await
        .unwrap();
    assert!(for_retail.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn group_zero_falls_back_to_the_default_group(pool: PgPool) {
    let store = page_store(&pool).await;
    let page = saved_draft(&store, &pool, "default-scoped").await;
    publish(&store, &pool, page.key, -1, None, Some(&[DEFAULT_GROUP])).await;

    let public = store
        .get_public_page_row(&pool, &logical_id(), 0)
        .await
        .unwrap();
    assert!(public.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn multi_digit_groups_do_not_match_by_substring(pool: PgPool) {
    let store = page_store(&pool).await;
    let page = saved_draft(&store, &pool, "scoped").await;
    publish(&store, &pool, page.key, -1, None, Some(&[12])).await;

    // Group 1 and 2 are substrings of "12" but must not match.
    assert!(store
        .get_public_page_row(&pool, &logical_id(), 1)
        .await
        .unwrap()
        .is_none());
    assert!(store
        .get_public_page_row(&pool, &logical_id(), 2)
        .await
        .unwrap()
        .is_none());
    assert!(store
        .get_public_page_row(&pool, &logical_id(), 12)
        .await
        .unwrap()
        .is_some());
}

// ---------------------------------------------------------------------------
// Live keys and deduplication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn live_keys_feed_the_status_derivation(pool: PgPool) {
    let store = page_store(&pool).await;
    let live = saved_draft(&store, &pool, "live").await;
    let waiting = saved_draft(&store, &pool, "waiting").await;
    publish(&store, &pool, live.key, -1, None, None).await;
    publish(&store, &pool, waiting.key, -2, None, None).await;

    // Both rows are in-window, but only the most recently started window
    // serves, so only its key is live.
    let keys = store.live_keys(&pool, &logical_id()).await.unwrap();
    assert_eq!(keys, vec![live.key]);

    let drafts = store.get_drafts(&pool, &logical_id()).await.unwrap();
    let now = Utc::now();
    for draft in &drafts {
        let expected = if draft.key == live.key {
            PageStatus::Public
        } else {
            PageStatus::Planned
        };
        assert_eq!(draft.status(now, Some(&keys)), expected);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn each_group_scope_keeps_its_own_serving_key(pool: PgPool) {
    let store = page_store(&pool).await;
    let retail = saved_draft(&store, &pool, "retail").await;
    let wholesale = saved_draft(&store, &pool, "wholesale").await;
    publish(&store, &pool, retail.key, -2, None, Some(&[1])).await;
    publish(&store, &pool, wholesale.key, -1, None, Some(&[2])).await;

    // Windows with different group scopes do not supersede each other.
    let keys = store.live_keys(&pool, &logical_id()).await.unwrap();
    assert_eq!(keys, vec![wholesale.key, retail.key]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn multi_group_resolution_deduplicates_by_key(pool: PgPool) {
    let store = page_store(&pool).await;
    let page = saved_draft(&store, &pool, "everyone").await;
    // No group scope: the same row serves every group.
    publish(&store, &pool, page.key, -1, None, None).await;

    let pages = store
        .get_public_pages(&pool, &logical_id(), &[1, 2, 3])
        .await
        .unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].key, page.key);
}

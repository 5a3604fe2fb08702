//! Integration tests for the draft lifecycle endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, put_json};
use serde_json::json;
use sqlx::PgPool;

const PAGE_ID: &str = r#"{"type":"product","id":42,"lang":1}"#;

/// Percent-encode the characters of a logical page id token that are not
/// valid in a URI path segment.
fn encode_page_id(page_id: &str) -> String {
    page_id
        .replace('%', "%25")
        .replace('"', "%22")
        .replace('{', "%7B")
        .replace('}', "%7D")
}

fn draft_body(key: i64, text: &str) -> serde_json::Value {
    json!({
        "key": key,
        "pageId": PAGE_ID,
        "name": "Product 42",
        "url": "/product/42",
        "areas": [{
            "id": "main",
            "content": [{"class": "Text", "properties": {"text": text}}],
        }],
        "user": "alice",
    })
}

/// Create a draft and return its assigned key.
async fn create_draft(app: &axum::Router, text: &str) -> i64 {
    let response = post_json(app.clone(), "/api/v1/composer/drafts", &draft_body(0, text)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["key"].as_i64().expect("key must be assigned")
}

// ---------------------------------------------------------------------------
// Save and load
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn save_creates_draft_and_returns_envelope(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let response = post_json(
        app.clone(),
        "/api/v1/composer/drafts",
        &draft_body(0, "Hello"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let data = &json["data"];
    assert!(data["key"].as_i64().unwrap() > 0);
    assert_eq!(data["id"], PAGE_ID);
    assert_eq!(data["name"], "Product 42");
    assert_eq!(data["url"], "/product/42");
    // No publication window yet: draft status.
    assert_eq!(data["status"], 2);
    assert_eq!(data["lockedBy"], "alice");
    assert_eq!(
        data["areas"][0]["content"][0]["properties"]["text"],
        "Hello"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn save_with_existing_key_updates_and_returns_200(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let key = create_draft(&app, "v1").await;

    let response = post_json(
        app.clone(),
        "/api/v1/composer/drafts",
        &draft_body(key, "v2"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(
        get(app.clone(), &format!("/api/v1/composer/drafts/{key}")).await,
    )
    .await;
    assert_eq!(
        json["data"]["areas"][0]["content"][0]["properties"]["text"],
        "v2"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_unknown_draft_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let response = get(app, "/api/v1/composer/drafts/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn save_with_empty_url_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let mut body = draft_body(0, "Hello");
    body["url"] = json!("");
    let response = post_json(app, "/api/v1/composer/drafts", &body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn save_with_unknown_key_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let response = post_json(app, "/api/v1/composer/drafts", &draft_body(9999, "x")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn drafts_of_a_page_are_listed_together(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    create_draft(&app, "first").await;
    create_draft(&app, "second").await;

    let uri = format!(
        "/api/v1/composer/pages/{}/drafts",
        encode_page_id(PAGE_ID)
    );
    let response = get(app.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Locking
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn lock_returns_tri_state_result_codes(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let key = create_draft(&app, "Hello").await;

    // The save left alice holding the lock; re-locking as alice refreshes it.
    let response = post_json(
        app.clone(),
        &format!("/api/v1/composer/drafts/{key}/lock"),
        &json!({"user": "alice"}),
    )
    .await;
    let json = common::expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["result"], 0);

    // A fresh lock blocks another editor.
    let response = post_json(
        app.clone(),
        &format!("/api/v1/composer/drafts/{key}/lock"),
        &json!({"user": "bob"}),
    )
    .await;
    let json = common::expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["result"], 1);

    // After a force unlock, bob can take the lock.
    let response = common::post_empty(
        app.clone(),
        &format!("/api/v1/composer/drafts/{key}/unlock"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        app.clone(),
        &format!("/api/v1/composer/drafts/{key}/lock"),
        &json!({"user": "bob"}),
    )
    .await;
    let json = common::expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["result"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lock_with_empty_user_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let key = create_draft(&app, "Hello").await;

    let response = post_json(
        app,
        &format!("/api/v1/composer/drafts/{key}/lock"),
        &json!({"user": ""}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Publication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn publish_opens_the_window_and_derives_public_status(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let key = create_draft(&app, "Hello").await;

    let from = chrono::Utc::now() - chrono::Duration::hours(1);
    let response = post_json(
        app.clone(),
        &format!("/api/v1/composer/drafts/{key}/publish"),
        &json!({"publishFrom": from, "publishTo": null}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(
        get(app.clone(), &format!("/api/v1/composer/drafts/{key}")).await,
    )
    .await;
    assert_eq!(json["data"]["status"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn future_window_derives_planned_status(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let key = create_draft(&app, "Hello").await;

    let from = chrono::Utc::now() + chrono::Duration::hours(1);
    let response = post_json(
        app.clone(),
        &format!("/api/v1/composer/drafts/{key}/publish"),
        &json!({"publishFrom": from}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(
        get(app.clone(), &format!("/api/v1/composer/drafts/{key}")).await,
    )
    .await;
    assert_eq!(json["data"]["status"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn superseded_window_reports_planned_status(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let older = create_draft(&app, "older").await;
    let newer = create_draft(&app, "newer").await;

    for (key, hours) in [(older, 2), (newer, 1)] {
        let from = chrono::Utc::now() - chrono::Duration::hours(hours);
        let response = post_json(
            app.clone(),
            &format!("/api/v1/composer/drafts/{key}/publish"),
            &json!({"publishFrom": from}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    // Both windows are open, but only the most recently started one serves.
    let json = body_json(
        get(app.clone(), &format!("/api/v1/composer/drafts/{newer}")).await,
    )
    .await;
    assert_eq!(json["data"]["status"], 0);

    let json = body_json(
        get(app.clone(), &format!("/api/v1/composer/drafts/{older}")).await,
    )
    .await;
    assert_eq!(json["data"]["status"], 1);
}

// ---------------------------------------------------------------------------
// Rename and delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn rename_persists_the_new_name(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let key = create_draft(&app, "Hello").await;

    let response = put_json(
        app.clone(),
        &format!("/api/v1/composer/drafts/{key}/name"),
        &json!({"name": "Spring campaign"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(
        get(app.clone(), &format!("/api/v1/composer/drafts/{key}")).await,
    )
    .await;
    assert_eq!(json["data"]["name"], "Spring campaign");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rename_to_empty_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let key = create_draft(&app, "Hello").await;

    let response = put_json(
        app,
        &format!("/api/v1/composer/drafts/{key}/name"),
        &json!({"name": ""}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_removes_the_draft(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let key = create_draft(&app, "Hello").await;

    let response = delete(app.clone(), &format!("/api/v1/composer/drafts/{key}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app.clone(), &format!("/api/v1/composer/drafts/{key}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn preview_renders_one_string_per_area(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let key = create_draft(&app, "Hello").await;

    let response = get(
        app.clone(),
        &format!("/api/v1/composer/drafts/{key}/preview"),
    )
    .await;
    let json = common::expect_status(response, StatusCode::OK).await;

    let areas = json["data"].as_array().unwrap();
    assert_eq!(areas.len(), 1);
    assert!(areas[0].as_str().unwrap().contains("[Text]"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_portlets_appear_in_preview_but_not_final(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let mut body = draft_body(0, "Hello");
    body["areas"] = json!([{
        "id": "main",
        "content": [{"class": "UninstalledPortlet", "properties": {}}],
    }]);
    let response = post_json(app.clone(), "/api/v1/composer/drafts", &body).await;
    let json = common::expect_status(response, StatusCode::CREATED).await;
    let key = json["data"]["key"].as_i64().unwrap();

    let preview = body_json(
        get(
            app.clone(),
            &format!("/api/v1/composer/drafts/{key}/preview"),
        )
        .await,
    )
    .await;
    assert!(preview["data"][0]
        .as_str()
        .unwrap()
        .contains("missing portlet: UninstalledPortlet"));

    let fin = body_json(
        get(app.clone(), &format!("/api/v1/composer/drafts/{key}/final")).await,
    )
    .await;
    assert_eq!(fin["data"][0], "");
}

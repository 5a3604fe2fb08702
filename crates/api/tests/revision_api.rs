//! Integration tests for the revision snapshot endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use serde_json::json;
use sqlx::PgPool;

const PAGE_ID: &str = r#"{"type":"product","id":42,"lang":1}"#;

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

/// Create a draft with `v1` content, then overwrite it with `v2`, leaving
/// one snapshot of the `v1` state behind. Returns the draft key.
async fn draft_with_one_revision(app: &axum::Router) -> i64 {
    let response = post_json(app.clone(), "/api/v1/composer/drafts", &draft_body(0, "v1")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let key = body_json(response).await["data"]["key"].as_i64().unwrap();

    let response = post_json(
        app.clone(),
        "/api/v1/composer/drafts",
        &draft_body(key, "v2"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    key
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn content_change_leaves_a_listed_snapshot(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let key = draft_with_one_revision(&app).await;

    let response = get(
        app.clone(),
        &format!("/api/v1/composer/drafts/{key}/revisions"),
    )
    .await;
    let json = common::expect_status(response, StatusCode::OK).await;

    let revisions = json["data"].as_array().unwrap();
    assert_eq!(revisions.len(), 1);
    assert_eq!(revisions[0]["referenceId"].as_i64(), Some(key));
    assert_eq!(revisions[0]["author"], "alice");
    assert!(revisions[0]["id"].as_i64().unwrap() > 0);
    // The row snapshot itself is not part of the listing.
    assert!(revisions[0].get("content").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn fresh_draft_has_no_revisions(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let response = post_json(app.clone(), "/api/v1/composer/drafts", &draft_body(0, "v1")).await;
    let key = body_json(response).await["data"]["key"].as_i64().unwrap();

    let json = body_json(
        get(
            app.clone(),
            &format!("/api/v1/composer/drafts/{key}/revisions"),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn revision_preview_renders_the_snapshot_tree(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let key = draft_with_one_revision(&app).await;

    let json = body_json(
        get(
            app.clone(),
            &format!("/api/v1/composer/drafts/{key}/revisions"),
        )
        .await,
    )
    .await;
    let revision_id = json["data"][0]["id"].as_i64().unwrap();

    let response = get(
        app.clone(),
        &format!("/api/v1/composer/revisions/{revision_id}/preview"),
    )
    .await;
    let json = common::expect_status(response, StatusCode::OK).await;

    let areas = json["data"].as_array().unwrap();
    assert_eq!(areas.len(), 1);
    assert!(areas[0].as_str().unwrap().contains("[Text]"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn restore_rolls_the_draft_back_and_consumes_the_snapshot(pool: PgPool) {
    let app = common::build_test_app(pool).await;
    let key = draft_with_one_revision(&app).await;

    let json = body_json(
        get(
            app.clone(),
            &format!("/api/v1/composer/drafts/{key}/revisions"),
        )
        .await,
    )
    .await;
    let revision_id = json["data"][0]["id"].as_i64().unwrap();

    let response = common::post_empty(
        app.clone(),
        &format!("/api/v1/composer/revisions/{revision_id}/restore"),
    )
    .await;
    let json = common::expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["restored"], true);

    // The draft content is back at v1.
    let json = body_json(
        get(app.clone(), &format!("/api/v1/composer/drafts/{key}")).await,
    )
    .await;
    assert_eq!(
        json["data"]["areas"][0]["content"][0]["properties"]["text"],
        "v1"
    );

    // The consumed snapshot is gone from the listing.
    let json = body_json(
        get(
            app.clone(),
            &format!("/api/v1/composer/drafts/{key}/revisions"),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn restore_of_unknown_revision_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let response = common::post_empty(app, "/api/v1/composer/revisions/9999/restore").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

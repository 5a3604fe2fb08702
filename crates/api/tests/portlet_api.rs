//! Integration test for the editor portlet palette.

mod common;

use axum::http::StatusCode;
use common::get;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn palette_lists_the_seeded_portlets(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let response = get(app, "/api/v1/composer/portlets").await;
    let json = common::expect_status(response, StatusCode::OK).await;

    let classes: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["class"].as_str().unwrap())
        .collect();
    assert!(classes.contains(&"Text"));
    assert!(classes.contains(&"Image"));
    assert!(classes.contains(&"Grid"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn palette_entries_carry_editor_metadata(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let response = get(app, "/api/v1/composer/portlets").await;
    let json = common::expect_status(response, StatusCode::OK).await;

    let grid = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["class"] == "Grid")
        .expect("Grid portlet must be seeded");
    assert_eq!(grid["is_container"], true);
    assert_eq!(grid["group"], "layout");
    assert!(grid["property_schema"].is_object());
}

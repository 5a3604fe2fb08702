//! Persistence layer for the One Page Composer backend.
//!
//! Thin repositories (one zero-sized struct per table, `&PgPool` first
//! argument) plus a store layer implementing the draft/publish/revision
//! orchestration on top of them.

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod store;

pub type DbPool = sqlx::PgPool;

/// Embedded migration set (workspace `db/migrations`).
pub static MIGRATOR: Migrator = sqlx::migrate!("../../db/migrations");

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Cheap connectivity probe.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Whether the embedded migration set is not fully applied yet.
///
/// Draft editing is refused while migrations are pending (lock result
/// code 2), since a half-migrated schema could corrupt stored content.
pub async fn has_pending_migrations(pool: &DbPool) -> Result<bool, sqlx::Error> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = TRUE")
            .fetch_one(pool)
            .await?;
    Ok((applied as usize) < MIGRATOR.iter().len())
}

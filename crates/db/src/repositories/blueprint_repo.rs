//! Repository for the `blueprints` table.

use sqlx::PgPool;

use opc_core::types::DbId;

use crate::models::blueprint::{BlueprintRow, CreateBlueprint};

const COLUMNS: &str = "id, name, plugin_id, content, created_at, updated_at";

/// Provides CRUD operations for saved portlet subtrees.
pub struct BlueprintRepo;

impl BlueprintRepo {
    pub async fn create(pool: &PgPool, input: &CreateBlueprint) -> Result<BlueprintRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO blueprints (name, plugin_id, content)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BlueprintRow>(&query)
            .bind(&input.name)
            .bind(input.plugin_id)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BlueprintRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM blueprints WHERE id = $1");
        sqlx::query_as::<_, BlueprintRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all blueprints ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<BlueprintRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM blueprints ORDER BY name");
        sqlx::query_as::<_, BlueprintRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Replace name and content of an existing blueprint.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &CreateBlueprint,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE blueprints SET name = $2, content = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.content)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blueprints WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

//! Blueprint persistence: saving and loading reusable portlet subtrees.

use std::sync::Arc;

use sqlx::PgPool;

use opc_core::blueprint::Blueprint;
use opc_core::error::CoreError;
use opc_core::registry::PortletRegistry;
use opc_core::types::DbId;

use crate::models::blueprint::{BlueprintRow, CreateBlueprint};
use crate::repositories::BlueprintRepo;
use crate::store::StoreResult;

/// Maps a plugin-owned localization key to a display name. Identity for
/// deployments without a translation layer.
pub type BlueprintNameLocalizer = dyn Fn(&str) -> String + Send + Sync;

pub struct BlueprintStore {
    registry: Arc<PortletRegistry>,
    localizer: Option<Box<BlueprintNameLocalizer>>,
}

impl BlueprintStore {
    pub fn new(registry: Arc<PortletRegistry>) -> Self {
        Self {
            registry,
            localizer: None,
        }
    }

    /// Install a localizer for plugin-owned blueprint names. Names of
    /// plugin-less blueprints are always returned verbatim.
    pub fn with_localizer(
        mut self,
        localizer: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.localizer = Some(Box::new(localizer));
        self
    }

    /// Persist a blueprint: insert when `id == 0`, update otherwise. The
    /// generated id is written back on insert.
    pub async fn save(&self, pool: &PgPool, blueprint: &mut Blueprint) -> StoreResult<()> {
        blueprint.validate()?;
        let input = CreateBlueprint {
            name: blueprint.name.clone(),
            plugin_id: blueprint.plugin_id,
            content: blueprint.content_json(),
        };

        if blueprint.id > 0 {
            let affected = BlueprintRepo::update(pool, blueprint.id, &input).await?;
            if affected == 0 {
                return Err(CoreError::NotFound {
                    entity: "Blueprint",
                    id: blueprint.id,
                }
                .into());
            }
        } else {
            let row = BlueprintRepo::create(pool, &input).await?;
            blueprint.id = row.id;
        }

        tracing::info!(blueprint_id = blueprint.id, name = %blueprint.name, "Blueprint saved");
        Ok(())
    }

    /// Load one blueprint, rebuilding its instance subtree through the
    /// registry so removed portlet classes degrade to placeholders.
    pub async fn load(&self, pool: &PgPool, id: DbId) -> StoreResult<Blueprint> {
        let row = BlueprintRepo::find_by_id(pool, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Blueprint",
                id,
            })?;
        self.from_row(row)
    }

    /// All blueprints, ordered by name.
    pub async fn list(&self, pool: &PgPool) -> StoreResult<Vec<Blueprint>> {
        let rows = BlueprintRepo::list(pool).await?;
        rows.into_iter().map(|row| self.from_row(row)).collect()
    }

    pub async fn delete(&self, pool: &PgPool, id: DbId) -> StoreResult<()> {
        if !BlueprintRepo::delete(pool, id).await? {
            return Err(CoreError::NotFound {
                entity: "Blueprint",
                id,
            }
            .into());
        }
        tracing::info!(blueprint_id = id, "Blueprint deleted");
        Ok(())
    }

    fn from_row(&self, row: BlueprintRow) -> StoreResult<Blueprint> {
        let name = match (&self.localizer, row.plugin_id) {
            (Some(localize), Some(_)) => localize(&row.name),
            _ => row.name.clone(),
        };
        Ok(Blueprint::from_content(
            row.id,
            name,
            row.plugin_id,
            &row.content,
            &self.registry,
        )?)
    }
}

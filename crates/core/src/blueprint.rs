//! Blueprints: named, reusable saved portlet subtrees.
//!
//! A blueprint is independent of any page. Saving a configured portlet
//! instance as a blueprint lets editors re-insert the same block elsewhere.

use serde_json::Value;

use crate::error::CoreError;
use crate::portlet::PortletInstance;
use crate::registry::PortletRegistry;
use crate::types::DbId;

#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    /// Surrogate key; 0 until persisted.
    pub id: DbId,

    pub name: String,

    /// Owning plugin, when the blueprint ships with one. Plugin-owned names
    /// are localization keys rather than literal names.
    pub plugin_id: Option<DbId>,

    /// The saved subtree: one portlet instance, possibly with nested areas.
    pub instance: PortletInstance,
}

impl Blueprint {
    /// Validate a blueprint for saving. An empty name is rejected before
    /// any write happens.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation(
                "blueprint name must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Serialized instance subtree, as stored in the blueprint row.
    pub fn content_json(&self) -> Value {
        self.instance.to_json()
    }

    /// Rebuild the instance subtree from a stored row's JSON content.
    pub fn from_content(
        id: DbId,
        name: String,
        plugin_id: Option<DbId>,
        content: &Value,
        registry: &PortletRegistry,
    ) -> Result<Self, CoreError> {
        let instance = PortletInstance::from_json(content, registry)?;
        Ok(Self {
            id,
            name,
            plugin_id,
            instance,
        })
    }
}

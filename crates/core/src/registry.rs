//! The portlet registry: class name -> type descriptor resolution.
//!
//! The registry replaces the source platform's reflective class loading
//! with an explicit factory map populated at startup from the `portlets`
//! table. Resolution never fails for unknown classes; it degrades to a
//! deactivated placeholder so stored content survives uninstalled plugins.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::CoreError;
use crate::portlet::{PortletInstance, PortletMeta};
use crate::types::DbId;

/// Outcome of resolving a class name.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedPortlet {
    /// Known, active, and (if plugin-provided) its plugin is available.
    Available(PortletMeta),
    /// Unknown class, inactive portlet, unavailable plugin, or safe mode.
    /// Carries the requested class name and the owning plugin if one is
    /// known, for admin-side messaging.
    Missing {
        class: String,
        plugin_id: Option<DbId>,
    },
}

impl ResolvedPortlet {
    /// Build a placeable instance from the resolution result.
    pub fn into_instance(self) -> PortletInstance {
        match self {
            ResolvedPortlet::Available(meta) => PortletInstance::new(meta),
            ResolvedPortlet::Missing { class, plugin_id } => {
                PortletInstance::missing(class, plugin_id)
            }
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ResolvedPortlet::Missing { .. })
    }
}

/// Explicitly constructed registry object, shared via `Arc` where needed.
///
/// Interior mutability lets the mapping be extended after construction
/// without requiring `&mut` throughout the deserialization call chain. A
/// from-scratch rebuild from the `portlets` table is functionally
/// equivalent to any cached state.
#[derive(Debug, Default)]
pub struct PortletRegistry {
    portlets: RwLock<HashMap<String, PortletMeta>>,
    plugins: RwLock<HashMap<DbId, bool>>,
    /// When set, every plugin-provided portlet resolves as missing.
    safe_mode: bool,
}

impl PortletRegistry {
    pub fn new(safe_mode: bool) -> Self {
        Self {
            portlets: RwLock::new(HashMap::new()),
            plugins: RwLock::new(HashMap::new()),
            safe_mode,
        }
    }

    pub fn safe_mode(&self) -> bool {
        self.safe_mode
    }

    /// Insert or replace the descriptor for a class.
    pub fn register(&self, meta: PortletMeta) {
        self.portlets
            .write()
            .expect("portlet registry lock poisoned")
            .insert(meta.class.clone(), meta);
    }

    /// Record whether a plugin is installed and active.
    pub fn register_plugin(&self, plugin_id: DbId, active: bool) {
        self.plugins
            .write()
            .expect("portlet registry lock poisoned")
            .insert(plugin_id, active);
    }

    /// Resolve a class name to a portlet descriptor.
    ///
    /// - `""` is a contract violation (`InvalidArgument`), distinct from an
    ///   unknown class.
    /// - Unknown classes resolve to [`ResolvedPortlet::Missing`]; this is
    ///   never an error.
    /// - Known but inactive portlets, portlets of unknown/inactive plugins,
    ///   and all plugin portlets under safe mode resolve as missing with the
    ///   plugin reference attached.
    pub fn resolve(&self, class: &str) -> Result<ResolvedPortlet, CoreError> {
        if class.is_empty() {
            return Err(CoreError::InvalidArgument(
                "portlet class must not be empty".into(),
            ));
        }

        let portlets = self
            .portlets
            .read()
            .expect("portlet registry lock poisoned");
        let Some(meta) = portlets.get(class) else {
            return Ok(ResolvedPortlet::Missing {
                class: class.to_string(),
                plugin_id: None,
            });
        };

        if !meta.active {
            return Ok(ResolvedPortlet::Missing {
                class: class.to_string(),
                plugin_id: meta.plugin_id,
            });
        }

        if let Some(plugin_id) = meta.plugin_id {
            let plugin_active = *self
                .plugins
                .read()
                .expect("portlet registry lock poisoned")
                .get(&plugin_id)
                .unwrap_or(&false);
            if self.safe_mode || !plugin_active {
                return Ok(ResolvedPortlet::Missing {
                    class: class.to_string(),
                    plugin_id: Some(plugin_id),
                });
            }
        }

        Ok(ResolvedPortlet::Available(meta.clone()))
    }

    /// Snapshot of all registered descriptors, for the editor palette.
    pub fn list(&self) -> Vec<PortletMeta> {
        let mut all: Vec<PortletMeta> = self
            .portlets
            .read()
            .expect("portlet registry lock poisoned")
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| (&a.group, &a.title).cmp(&(&b.group, &b.title)));
        all
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

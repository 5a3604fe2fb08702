//! Portlet type descriptors and placed portlet instances.
//!
//! A *portlet* is a content-block type (text, image, product slider, ...)
//! registered in the `portlets` table. A *portlet instance* is one placed,
//! configured occurrence of a portlet inside an area. Instances carry an
//! ordered property bag and, for container portlets, nested sub-areas.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

use crate::area::{Area, AreaList};
use crate::error::CoreError;
use crate::registry::PortletRegistry;
use crate::types::DbId;

/// Display group for portlets whose implementation is unavailable.
pub const MISSING_PORTLET_GROUP: &str = "hidden";

// ---------------------------------------------------------------------------
// PortletMeta
// ---------------------------------------------------------------------------

/// Metadata describing a portlet type, as stored in the registry mapping.
///
/// This is the type descriptor, not a per-placement instance: one
/// `PortletMeta` exists per registered class, shared by every placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortletMeta {
    /// Class name, unique within the shop or within its owning plugin.
    pub class: String,

    /// Surrogate key of the registry row. 0 for placeholder metas.
    pub portlet_id: DbId,

    /// Owning plugin, if the portlet is plugin-provided.
    pub plugin_id: Option<DbId>,

    /// Whether the portlet is available for placement.
    pub active: bool,

    /// Display group in the editor palette.
    pub group: String,

    /// Human-readable title shown in the editor.
    pub title: String,

    /// CSS files this portlet type requires when rendered.
    pub css_files: Vec<String>,

    /// JS files this portlet type requires when rendered.
    pub js_files: Vec<String>,

    /// Declarative editor-form schema. Opaque to this layer.
    pub property_schema: Value,

    /// Whether instances of this portlet may contain sub-areas.
    pub is_container: bool,
}

impl PortletMeta {
    /// A deactivated placeholder for a class that cannot be resolved.
    ///
    /// Keeps the requested class name so the content round-trips unchanged
    /// and the admin UI can show which class is missing.
    pub fn missing(class: impl Into<String>, plugin_id: Option<DbId>) -> Self {
        let class = class.into();
        Self {
            title: class.clone(),
            class,
            portlet_id: 0,
            plugin_id,
            active: false,
            group: MISSING_PORTLET_GROUP.to_string(),
            css_files: Vec::new(),
            js_files: Vec::new(),
            property_schema: Value::Null,
            is_container: false,
        }
    }
}

// ---------------------------------------------------------------------------
// PropertyValue
// ---------------------------------------------------------------------------

/// A single entry in a portlet instance's property bag.
///
/// Most properties are plain JSON scalars/objects. Container portlets may
/// store whole nested area lists as property values.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// An opaque scalar/object/array value, passed through unchanged.
    Scalar(Value),
    /// A nested area list (container portlets only).
    Areas(AreaList),
}

impl PropertyValue {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            PropertyValue::Scalar(v) => Some(v),
            PropertyValue::Areas(_) => None,
        }
    }

    pub fn as_areas(&self) -> Option<&AreaList> {
        match self {
            PropertyValue::Scalar(_) => None,
            PropertyValue::Areas(a) => Some(a),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            PropertyValue::Scalar(v) => v.clone(),
            PropertyValue::Areas(list) => list.to_json(),
        }
    }

    /// Rebuild a property value from its JSON form.
    ///
    /// A value is treated as a nested area list only when it is an array
    /// whose every element looks like an area object (`id` + `content`
    /// keys). Everything else is an opaque scalar. Scalars therefore must
    /// not mimic that exact shape; the editor never produces such values.
    pub fn from_json(value: &Value, registry: &PortletRegistry) -> Self {
        if let Value::Array(items) = value {
            let looks_like_areas = !items.is_empty()
                && items.iter().all(|item| {
                    item.as_object()
                        .is_some_and(|o| o.contains_key("id") && o.contains_key("content"))
                });
            if looks_like_areas {
                let mut list = AreaList::new();
                list.deserialize(items, registry);
                return PropertyValue::Areas(list);
            }
        }
        PropertyValue::Scalar(value.clone())
    }
}

// ---------------------------------------------------------------------------
// PortletInstance
// ---------------------------------------------------------------------------

/// One placed, configured portlet inside an area.
///
/// Serializes to `{class, id, missing, properties, areas}`. Instances whose
/// class could not be resolved keep the original class name (`missing` set),
/// so content is never dropped just because a plugin is uninstalled.
#[derive(Debug, Clone, PartialEq)]
pub struct PortletInstance {
    /// Resolved type descriptor. A placeholder for missing classes.
    pub meta: PortletMeta,

    /// True when the class was unknown, inactive, or its plugin unavailable.
    pub missing: bool,

    /// Ordered property bag. Insertion order is the editor's field order.
    pub properties: IndexMap<String, PropertyValue>,

    /// Nested sub-areas (container portlets only; empty otherwise).
    pub sub_areas: AreaList,
}

impl PortletInstance {
    pub fn new(meta: PortletMeta) -> Self {
        Self {
            meta,
            missing: false,
            properties: IndexMap::new(),
            sub_areas: AreaList::new(),
        }
    }

    /// A placeholder instance preserving the unresolvable class name.
    pub fn missing(class: impl Into<String>, plugin_id: Option<DbId>) -> Self {
        Self {
            meta: PortletMeta::missing(class, plugin_id),
            missing: true,
            properties: IndexMap::new(),
            sub_areas: AreaList::new(),
        }
    }

    /// A classless placeholder for a structurally broken content node (not
    /// an object, or no string `class`). The raw node rides along as a
    /// property so the content survives load/save cycles.
    pub fn malformed(node: Value) -> Self {
        let mut instance = Self::missing("", None);
        instance.set_property("raw", PropertyValue::Scalar(node));
        instance
    }

    pub fn class(&self) -> &str {
        &self.meta.class
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.properties.insert(name.into(), value);
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn to_json(&self) -> Value {
        let properties: Value = self
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect::<serde_json::Map<String, Value>>()
            .into();

        json!({
            "class": self.meta.class,
            "id": self.meta.portlet_id,
            "missing": self.missing,
            "properties": properties,
            "areas": self.sub_areas.to_json(),
        })
    }

    /// Rebuild an instance from its JSON form, resolving the class through
    /// the registry. Unknown or unavailable classes degrade to placeholder
    /// instances; only a structurally broken node is an error.
    pub fn from_json(value: &Value, registry: &PortletRegistry) -> Result<Self, CoreError> {
        let obj = value.as_object().ok_or_else(|| {
            CoreError::Validation("portlet instance must be a JSON object".into())
        })?;
        let class = obj
            .get("class")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::Validation("portlet instance is missing 'class'".into()))?;

        // An empty class marks a previously degraded node; it round-trips
        // as a classless placeholder instead of hitting the registry.
        let mut instance = if class.is_empty() {
            PortletInstance::missing("", None)
        } else {
            registry.resolve(class)?.into_instance()
        };

        if let Some(Value::Object(props)) = obj.get("properties") {
            for (name, raw) in props {
                instance
                    .properties
                    .insert(name.clone(), PropertyValue::from_json(raw, registry));
            }
        }
        if let Some(Value::Array(areas)) = obj.get("areas") {
            instance.sub_areas.deserialize(areas, registry);
        }
        Ok(instance)
    }
}

// ---------------------------------------------------------------------------
// Asset aggregation over the instance subtree
// ---------------------------------------------------------------------------

impl PortletInstance {
    /// Collect this instance's declared CSS files plus those of every
    /// portlet in its nested sub-areas, preserving first-seen order.
    pub(crate) fn collect_css(&self, out: &mut indexmap::IndexSet<String>) {
        for file in &self.meta.css_files {
            out.insert(file.clone());
        }
        for area in self.sub_areas.areas() {
            area.collect_css(out);
        }
        for value in self.properties.values() {
            if let PropertyValue::Areas(list) = value {
                for area in list.areas() {
                    area.collect_css(out);
                }
            }
        }
    }

    /// JS counterpart of [`collect_css`](Self::collect_css).
    pub(crate) fn collect_js(&self, out: &mut indexmap::IndexSet<String>) {
        for file in &self.meta.js_files {
            out.insert(file.clone());
        }
        for area in self.sub_areas.areas() {
            area.collect_js(out);
        }
        for value in self.properties.values() {
            if let PropertyValue::Areas(list) = value {
                for area in list.areas() {
                    area.collect_js(out);
                }
            }
        }
    }

    /// All nested sub-areas, direct and property-held.
    pub fn nested_areas(&self) -> impl Iterator<Item = &Area> {
        self.sub_areas.areas().chain(
            self.properties
                .values()
                .filter_map(PropertyValue::as_areas)
                .flat_map(AreaList::areas),
        )
    }
}

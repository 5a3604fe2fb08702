//! Areas and area lists: the containers of the page content tree.
//!
//! A page owns one [`AreaList`]; each [`Area`] holds an ordered sequence of
//! portlet instances; container portlets hold further area lists. The tree
//! therefore alternates Area -> PortletInstance -> AreaList -> Area...

use indexmap::{IndexMap, IndexSet};
use serde_json::{json, Value};

use crate::portlet::PortletInstance;
use crate::registry::PortletRegistry;

// ---------------------------------------------------------------------------
// Area
// ---------------------------------------------------------------------------

/// An ordered slot holding portlet instances. Rendering order = list order.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    id: String,
    content: Vec<PortletInstance>,
}

impl Area {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Append a portlet instance. Order is significant.
    pub fn add_portlet(&mut self, instance: PortletInstance) {
        self.content.push(instance);
    }

    pub fn content(&self) -> &[PortletInstance] {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut Vec<PortletInstance> {
        &mut self.content
    }

    /// Distinct union of CSS files declared by this area's portlets and,
    /// recursively, by every portlet in their nested sub-areas. A file
    /// referenced by several portlets appears exactly once, in first-seen
    /// order.
    pub fn get_css_list(&self) -> Vec<String> {
        let mut set = IndexSet::new();
        self.collect_css(&mut set);
        set.into_iter().collect()
    }

    /// JS counterpart of [`get_css_list`](Self::get_css_list).
    pub fn get_js_list(&self) -> Vec<String> {
        let mut set = IndexSet::new();
        self.collect_js(&mut set);
        set.into_iter().collect()
    }

    pub(crate) fn collect_css(&self, out: &mut IndexSet<String>) {
        for instance in &self.content {
            instance.collect_css(out);
        }
    }

    pub(crate) fn collect_js(&self, out: &mut IndexSet<String>) {
        for instance in &self.content {
            instance.collect_js(out);
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "content": self.content.iter().map(PortletInstance::to_json).collect::<Vec<_>>(),
        })
    }

    /// Rebuild an area from `{id, content}` JSON. Portlet nodes that fail to
    /// resolve degrade to placeholders inside `PortletInstance::from_json`;
    /// nodes without an object/class shape degrade to classless placeholders
    /// carrying the raw node. Content is never dropped.
    pub fn from_json(value: &Value, registry: &PortletRegistry) -> Option<Self> {
        let obj = value.as_object()?;
        let id = obj.get("id")?.as_str()?;
        let mut area = Area::new(id);
        if let Some(Value::Array(content)) = obj.get("content") {
            for node in content {
                let instance = PortletInstance::from_json(node, registry)
                    .unwrap_or_else(|_| PortletInstance::malformed(node.clone()));
                area.add_portlet(instance);
            }
        }
        Some(area)
    }
}

// ---------------------------------------------------------------------------
// AreaList
// ---------------------------------------------------------------------------

/// A keyed collection of areas. No duplicate ids; last write wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AreaList {
    areas: IndexMap<String, Area>,
}

impl AreaList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert by area id: an existing area with the same id is replaced.
    pub fn put(&mut self, area: Area) {
        self.areas.insert(area.id().to_string(), area);
    }

    pub fn get(&self, id: &str) -> Option<&Area> {
        self.areas.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Area> {
        self.areas.get_mut(id)
    }

    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.areas.values()
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Serialized as a list of area objects.
    pub fn to_json(&self) -> Value {
        Value::Array(self.areas.values().map(Area::to_json).collect())
    }

    /// Clear existing content and rebuild from a list of area objects.
    ///
    /// Each area's portlet instances are constructed through the registry,
    /// so unknown portlet classes degrade to placeholders instead of failing
    /// the whole deserialize.
    pub fn deserialize(&mut self, items: &[Value], registry: &PortletRegistry) {
        self.areas.clear();
        for item in items {
            if let Some(area) = Area::from_json(item, registry) {
                self.put(area);
            }
        }
    }

    /// Convenience: rebuild from any JSON value (non-arrays clear the list).
    pub fn deserialize_value(&mut self, value: &Value, registry: &PortletRegistry) {
        match value {
            Value::Array(items) => self.deserialize(items, registry),
            _ => self.areas.clear(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

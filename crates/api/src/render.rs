//! Minimal per-area text renderer for preview endpoints.
//!
//! The composer does not own storefront templating. The preview/final
//! endpoints return one string per area, built from portlet class names,
//! so the admin UI can show the draft's structure. Missing portlets render
//! a visible marker in preview mode and nothing in final mode.

use opc_core::area::Area;
use opc_core::hooks::HookRegistry;
use opc_core::page::Page;
use opc_core::portlet::PortletInstance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Admin preview: missing portlets show a placeholder marker.
    Preview,
    /// Final output: missing portlets are omitted entirely.
    Final,
}

/// Render every top-level area of a page, one string per area, in area
/// order. Registered render hooks run once per area and may rewrite the
/// fragment list before it is joined.
pub fn render_page(page: &Page, hooks: &HookRegistry, mode: RenderMode) -> Vec<String> {
    page.area_list
        .areas()
        .map(|area| render_area(area, hooks, mode))
        .collect()
}

/// Render one area to a newline-joined fragment string.
pub fn render_area(area: &Area, hooks: &HookRegistry, mode: RenderMode) -> String {
    let mut fragments = Vec::new();
    for instance in area.content() {
        render_instance(instance, mode, 0, &mut fragments);
    }
    hooks.fire_area_rendered(area, &mut fragments);
    fragments.join("\n")
}

fn render_instance(
    instance: &PortletInstance,
    mode: RenderMode,
    depth: usize,
    out: &mut Vec<String>,
) {
    let indent = "  ".repeat(depth);
    if instance.missing {
        if mode == RenderMode::Preview {
            out.push(format!(
                "{indent}<!-- missing portlet: {} -->",
                instance.class()
            ));
        }
        return;
    }

    out.push(format!("{indent}[{}]", instance.class()));
    for area in instance.nested_areas() {
        out.push(format!("{indent}  ({})", area.id()));
        for nested in area.content() {
            render_instance(nested, mode, depth + 2, out);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

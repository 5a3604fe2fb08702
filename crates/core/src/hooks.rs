//! Fire-and-continue extension points.
//!
//! Collaborators register transformer functions that run in registration
//! order at fixed points of the draft lifecycle. Hooks receive the in-flight
//! value mutably and may change it; they cannot abort the surrounding
//! operation (no return value to veto with).

use crate::area::Area;
use crate::page::Page;

type PageHook = Box<dyn Fn(&mut Page) + Send + Sync>;
type RenderHook = Box<dyn Fn(&Area, &mut Vec<String>) + Send + Sync>;

/// Registry of hook pipelines, one per extension point.
#[derive(Default)]
pub struct HookRegistry {
    draft_presave: Vec<PageHook>,
    page_loaded: Vec<PageHook>,
    public_page_resolved: Vec<PageHook>,
    area_rendered: Vec<RenderHook>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs before a draft is validated and written.
    pub fn on_draft_presave(&mut self, hook: impl Fn(&mut Page) + Send + Sync + 'static) {
        self.draft_presave.push(Box::new(hook));
    }

    /// Runs after a draft row was loaded and rehydrated.
    pub fn on_page_loaded(&mut self, hook: impl Fn(&mut Page) + Send + Sync + 'static) {
        self.page_loaded.push(Box::new(hook));
    }

    /// Runs after a public page row was resolved for a storefront request.
    pub fn on_public_page_resolved(&mut self, hook: impl Fn(&mut Page) + Send + Sync + 'static) {
        self.public_page_resolved.push(Box::new(hook));
    }

    /// Runs after an area was rendered to preview/final fragments.
    pub fn on_area_rendered(
        &mut self,
        hook: impl Fn(&Area, &mut Vec<String>) + Send + Sync + 'static,
    ) {
        self.area_rendered.push(Box::new(hook));
    }

    pub fn fire_draft_presave(&self, page: &mut Page) {
        for hook in &self.draft_presave {
            hook(page);
        }
    }

    pub fn fire_page_loaded(&self, page: &mut Page) {
        for hook in &self.page_loaded {
            hook(page);
        }
    }

    pub fn fire_public_page_resolved(&self, page: &mut Page) {
        for hook in &self.public_page_resolved {
            hook(page);
        }
    }

    pub fn fire_area_rendered(&self, area: &Area, fragments: &mut Vec<String>) {
        for hook in &self.area_rendered {
            hook(area, fragments);
        }
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("draft_presave", &self.draft_presave.len())
            .field("page_loaded", &self.page_loaded.len())
            .field("public_page_resolved", &self.public_page_resolved.len())
            .field("area_rendered", &self.area_rendered.len())
            .finish()
    }
}

//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod blueprint_repo;
pub mod page_repo;
pub mod portlet_repo;
pub mod revision_repo;
pub mod seo_repo;

pub use blueprint_repo::BlueprintRepo;
pub use page_repo::PageRepo;
pub use portlet_repo::{PluginRepo, PortletRepo};
pub use revision_repo::RevisionRepo;
pub use seo_repo::SeoRepo;

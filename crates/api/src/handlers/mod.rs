//! HTTP handlers for the composer admin surface.

pub mod blueprints;
pub mod drafts;
pub mod portlets;
pub mod revisions;

//! Composer event bus.
//!
//! In-process publish/subscribe hub for draft lifecycle events, backed by
//! `tokio::sync::broadcast`. Admin-side collaborators (cache invalidation,
//! audit trails, live preview refresh) subscribe here instead of polling
//! the `pages` table.

pub mod bus;

pub use bus::{ComposerEvent, EventBus};

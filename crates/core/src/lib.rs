//! Domain logic for the One Page Composer backend.
//!
//! This crate is pure: no I/O, no database access. The persistence layer
//! (`opc-db`) and the HTTP layer (`opc-api`) build on the types and rules
//! defined here.

pub mod area;
pub mod blueprint;
pub mod error;
pub mod hooks;
pub mod locking;
pub mod page;
pub mod page_id;
pub mod portlet;
pub mod registry;
pub mod types;

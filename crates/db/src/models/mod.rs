//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Create/update DTOs where the table is written through the store layer

pub mod blueprint;
pub mod page;
pub mod portlet;
pub mod revision;
pub mod seo;

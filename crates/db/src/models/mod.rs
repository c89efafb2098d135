//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) where the entity is patchable

pub mod audit;
pub mod file_upload;
pub mod response;
pub mod session;
pub mod template;

//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the writes the lifecycle performs

pub mod application;
pub mod deadline_extension;
pub mod event;
pub mod spot;
pub mod status;

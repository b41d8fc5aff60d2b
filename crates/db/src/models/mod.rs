//! Entity structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row and, where the API creates rows, a `Deserialize` create
//! DTO.

pub mod alert;
pub mod alert_rule;
pub mod device;
pub mod reading;

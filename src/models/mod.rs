//! Plain records exchanged with the backend service.
//!
//! Field names follow the backend document attributes (camelCase, `$id`).

pub mod appointment;
pub mod enums;
pub mod identity;
pub mod patient;

pub use appointment::*;
pub use enums::*;
pub use identity::*;
pub use patient::*;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid {field} value: '{value}'")]
    InvalidEnum { field: String, value: String },
}

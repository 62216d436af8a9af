//! Record-creation and lookup actions.
//!
//! Each action takes validated input, calls the backend collaborators in
//! sequence, and returns an explicit `Result`. The only recovery policy is
//! in `create_identity`: an email conflict turns into a lookup of the
//! existing identity. Every other failure is logged and propagated.

pub mod appointment;
pub mod identity;
pub mod patient;

pub use appointment::*;
pub use identity::*;
pub use patient::*;

use serde::de::DeserializeOwned;

use crate::backend::ServiceError;

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("{0} not found")]
    NotFound(String),

    /// The file upload succeeded but the record referencing it was not
    /// created. The file stays in the bucket.
    #[error("Uploaded file {file_id} has no patient record: {source}")]
    OrphanedUpload {
        file_id: String,
        #[source]
        source: ServiceError,
    },

    #[error("Malformed {what} document: {reason}")]
    Malformed { what: &'static str, reason: String },
}

impl ActionError {
    /// Service errors that mean "the thing does not exist" become `NotFound`.
    fn from_lookup(err: ServiceError, what: impl Into<String>) -> Self {
        match err {
            ServiceError::NotFound(_) => Self::NotFound(what.into()),
            other => Self::Service(other),
        }
    }
}

fn from_document<T: DeserializeOwned>(
    what: &'static str,
    doc: serde_json::Value,
) -> Result<T, ActionError> {
    serde_json::from_value(doc).map_err(|e| ActionError::Malformed {
        what,
        reason: e.to_string(),
    })
}

fn to_document<T: serde::Serialize>(
    what: &'static str,
    value: &T,
) -> Result<serde_json::Value, ActionError> {
    serde_json::to_value(value).map_err(|e| ActionError::Malformed {
        what,
        reason: e.to_string(),
    })
}

//! Collaborator seams for the hosted backend service.
//!
//! Three traits mirror the three backend products the application uses:
//! - IdentityService: user accounts, email is the de-duplication key
//! - DocumentDatabase: patient and appointment documents
//! - BlobStorage: uploaded identification documents
//!
//! `AppwriteClient` implements all three over REST; `InMemoryBackend`
//! implements them in-process for tests and offline development.

pub mod appwrite;
pub mod memory;

use std::sync::{Arc, LazyLock};

use futures_util::future::BoxFuture;
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::config::{AppConfig, BackendKind};
use crate::models::{FileRef, Identity, NewIdentity, UploadedDocument};

pub use appwrite::AppwriteClient;
pub use memory::InMemoryBackend;

/// Errors reported by backend collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// A uniqueness constraint was violated (HTTP 409).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Cannot connect to backend at {0}")]
    Connection(String),

    #[error("Backend request timed out")]
    Timeout,

    #[error("Failed to parse backend response: {0}")]
    ResponseParsing(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

pub type ServiceFuture<'a, T> = BoxFuture<'a, Result<T, ServiceError>>;

/// Generate a unique document/user/file id accepted by the backend.
pub fn unique_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Ids the backend accepts: up to 36 characters from `a-zA-Z0-9._-`, not
/// starting with a special character.
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,35}$").unwrap());

pub fn is_valid_id(id: &str) -> bool {
    ID_RE.is_match(id)
}

/// Query filter understood by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Equal { attribute: String, values: Vec<String> },
    OrderDesc(String),
    Limit(usize),
}

#[derive(Serialize)]
struct QueryJson<'a> {
    method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<serde_json::Value>,
}

impl Query {
    pub fn equal(attribute: &str, value: &str) -> Self {
        Self::Equal {
            attribute: attribute.to_string(),
            values: vec![value.to_string()],
        }
    }

    /// Wire form: `{"method":"equal","attribute":"email","values":["a@b.co"]}`.
    pub fn to_json(&self) -> String {
        let body = match self {
            Self::Equal { attribute, values } => QueryJson {
                method: "equal",
                attribute: Some(attribute.as_str()),
                values: Some(serde_json::json!(values)),
            },
            Self::OrderDesc(attribute) => QueryJson {
                method: "orderDesc",
                attribute: Some(attribute.as_str()),
                values: None,
            },
            Self::Limit(limit) => QueryJson {
                method: "limit",
                attribute: None,
                values: Some(serde_json::json!([limit])),
            },
        };
        serde_json::to_string(&body).unwrap_or_default()
    }
}

/// Database + collection pair addressing one document collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    pub database_id: String,
    pub collection_id: String,
}

impl CollectionRef {
    pub fn new(database_id: &str, collection_id: &str) -> Self {
        Self {
            database_id: database_id.to_string(),
            collection_id: collection_id.to_string(),
        }
    }
}

/// User accounts. Email is unique per project.
pub trait IdentityService: Send + Sync {
    fn create<'a>(&'a self, user_id: &'a str, new: &'a NewIdentity) -> ServiceFuture<'a, Identity>;

    fn list<'a>(&'a self, queries: &'a [Query]) -> ServiceFuture<'a, Vec<Identity>>;

    fn get<'a>(&'a self, user_id: &'a str) -> ServiceFuture<'a, Identity>;
}

/// Schemaless JSON documents grouped in collections.
pub trait DocumentDatabase: Send + Sync {
    fn create_document<'a>(
        &'a self,
        collection: &'a CollectionRef,
        document_id: &'a str,
        fields: serde_json::Value,
    ) -> ServiceFuture<'a, serde_json::Value>;

    fn list_documents<'a>(
        &'a self,
        collection: &'a CollectionRef,
        queries: &'a [Query],
    ) -> ServiceFuture<'a, Vec<serde_json::Value>>;

    fn update_document<'a>(
        &'a self,
        collection: &'a CollectionRef,
        document_id: &'a str,
        fields: serde_json::Value,
    ) -> ServiceFuture<'a, serde_json::Value>;
}

/// File buckets.
pub trait BlobStorage: Send + Sync {
    fn create_file<'a>(
        &'a self,
        bucket_id: &'a str,
        file_id: &'a str,
        document: &'a UploadedDocument,
    ) -> ServiceFuture<'a, FileRef>;
}

/// Handles to the three collaborators, cloned into every request.
#[derive(Clone)]
pub struct Backend {
    pub identities: Arc<dyn IdentityService>,
    pub documents: Arc<dyn DocumentDatabase>,
    pub storage: Arc<dyn BlobStorage>,
}

impl Backend {
    /// One object serving all three roles.
    pub fn shared<T>(inner: Arc<T>) -> Self
    where
        T: IdentityService + DocumentDatabase + BlobStorage + 'static,
    {
        Self {
            identities: inner.clone(),
            documents: inner.clone(),
            storage: inner,
        }
    }

    /// Build the backend selected by configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, ServiceError> {
        match config.backend {
            BackendKind::Appwrite => Ok(Self::shared(Arc::new(AppwriteClient::new(config)?))),
            BackendKind::Memory => {
                tracing::warn!("Using in-memory backend; data is lost on restart");
                Ok(Self::shared(Arc::new(InMemoryBackend::new())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_query_wire_format() {
        let q = Query::equal("email", "ada@example.com");
        assert_eq!(
            q.to_json(),
            r#"{"method":"equal","attribute":"email","values":["ada@example.com"]}"#
        );
    }

    #[test]
    fn order_and_limit_wire_format() {
        assert_eq!(
            Query::OrderDesc("$createdAt".into()).to_json(),
            r#"{"method":"orderDesc","attribute":"$createdAt"}"#
        );
        assert_eq!(Query::Limit(25).to_json(), r#"{"method":"limit","values":[25]}"#);
    }

    #[test]
    fn unique_ids_are_backend_safe() {
        let id = unique_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, unique_id());
    }

    #[test]
    fn id_syntax() {
        assert!(is_valid_id("user-1"));
        assert!(is_valid_id(&unique_id()));
        assert!(is_valid_id("a.b_c"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("-lead"));
        assert!(!is_valid_id("x\ny"));
        assert!(!is_valid_id("a/b"));
        assert!(!is_valid_id(&"a".repeat(37)));
    }
}

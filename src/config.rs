use std::net::SocketAddr;
use std::time::Duration;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Application-level constants
pub const APP_NAME: &str = "CarePulse";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Length of the admin passkey entered in the passkey prompt.
pub const ADMIN_PASSKEY_LEN: usize = 6;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "carepulse=info,carepulse_lib=info,tower_http=warn"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Which backend implementation serves the actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Appwrite,
    /// In-process backend for offline development; nothing is persisted.
    Memory,
}

/// Shared admin passkey. Zeroed on drop, redacted in `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AdminPasskey(String);

impl AdminPasskey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AdminPasskey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminPasskey(***)")
    }
}

/// Process configuration, read once at start and shared by reference.
#[derive(Clone)]
pub struct AppConfig {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
    pub database_id: String,
    pub patient_collection_id: String,
    pub doctor_collection_id: Option<String>,
    pub appointment_collection_id: String,
    pub bucket_id: String,
    pub admin_passkey: AdminPasskey,
    pub bind_addr: SocketAddr,
    pub backend: BackendKind,
    pub http_timeout: Duration,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("api_key", &"***")
            .field("database_id", &self.database_id)
            .field("patient_collection_id", &self.patient_collection_id)
            .field("doctor_collection_id", &self.doctor_collection_id)
            .field("appointment_collection_id", &self.appointment_collection_id)
            .field("bucket_id", &self.bucket_id)
            .field("admin_passkey", &self.admin_passkey)
            .field("bind_addr", &self.bind_addr)
            .field("backend", &self.backend)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// With `CAREPULSE_BACKEND=memory` the Appwrite identifiers become
    /// optional and fall back to placeholder values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match get("CAREPULSE_BACKEND").as_deref() {
            None | Some("appwrite") => BackendKind::Appwrite,
            Some("memory") => BackendKind::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "CAREPULSE_BACKEND",
                    reason: format!("expected 'appwrite' or 'memory', got '{other}'"),
                })
            }
        };

        let required = |key: &'static str, placeholder: &str| -> Result<String, ConfigError> {
            match get(key) {
                Some(v) => Ok(v),
                None if backend == BackendKind::Memory => Ok(placeholder.to_string()),
                None => Err(ConfigError::Missing(key)),
            }
        };

        let endpoint = required("APPWRITE_ENDPOINT", "http://localhost/v1")?
            .trim_end_matches('/')
            .to_string();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ConfigError::Invalid {
                key: "APPWRITE_ENDPOINT",
                reason: "must be an http(s) URL".into(),
            });
        }

        let admin_passkey = get("CAREPULSE_ADMIN_PASSKEY")
            .ok_or(ConfigError::Missing("CAREPULSE_ADMIN_PASSKEY"))?;
        if admin_passkey.chars().count() != ADMIN_PASSKEY_LEN {
            return Err(ConfigError::Invalid {
                key: "CAREPULSE_ADMIN_PASSKEY",
                reason: format!("must be exactly {ADMIN_PASSKEY_LEN} characters"),
            });
        }

        let bind_addr = get("CAREPULSE_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "CAREPULSE_BIND_ADDR",
                reason: e.to_string(),
            })?;

        let http_timeout = match get("CAREPULSE_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: "CAREPULSE_HTTP_TIMEOUT_SECS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            endpoint,
            project_id: required("APPWRITE_PROJECT_ID", "local")?,
            api_key: required("APPWRITE_API_KEY", "local")?,
            database_id: required("APPWRITE_DATABASE_ID", "carepulse")?,
            patient_collection_id: required("APPWRITE_PATIENT_COLLECTION_ID", "patients")?,
            doctor_collection_id: get("APPWRITE_DOCTOR_COLLECTION_ID"),
            appointment_collection_id: required(
                "APPWRITE_APPOINTMENT_COLLECTION_ID",
                "appointments",
            )?,
            bucket_id: required("APPWRITE_BUCKET_ID", "documents")?,
            admin_passkey: AdminPasskey::new(admin_passkey),
            bind_addr,
            backend,
            http_timeout: Duration::from_secs(http_timeout),
        })
    }

    /// Public view URL for a file stored in the configured bucket.
    pub fn file_view_url(&self, file_id: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.endpoint, self.bucket_id, file_id, self.project_id
        )
    }

    /// Configuration for tests: memory backend, passkey `123456`.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::from_lookup(|key| match key {
            "CAREPULSE_BACKEND" => Some("memory".into()),
            "APPWRITE_ENDPOINT" => Some("https://cloud.appwrite.io/v1".into()),
            "APPWRITE_PROJECT_ID" => Some("proj".into()),
            "APPWRITE_BUCKET_ID" => Some("bucket".into()),
            "CAREPULSE_ADMIN_PASSKEY" => Some("123456".into()),
            _ => None,
        })
        .expect("test configuration is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn full_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("APPWRITE_ENDPOINT", "https://cloud.appwrite.io/v1/"),
            ("APPWRITE_PROJECT_ID", "proj"),
            ("APPWRITE_API_KEY", "secret-key"),
            ("APPWRITE_DATABASE_ID", "db"),
            ("APPWRITE_PATIENT_COLLECTION_ID", "patients"),
            ("APPWRITE_APPOINTMENT_COLLECTION_ID", "appointments"),
            ("APPWRITE_BUCKET_ID", "bucket"),
            ("CAREPULSE_ADMIN_PASSKEY", "111111"),
        ]
    }

    #[test]
    fn loads_full_appwrite_config() {
        let config = AppConfig::from_lookup(lookup_from(&full_env())).unwrap();
        assert_eq!(config.backend, BackendKind::Appwrite);
        assert_eq!(config.endpoint, "https://cloud.appwrite.io/v1");
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.doctor_collection_id.is_none());
    }

    #[test]
    fn missing_required_key_is_reported() {
        let env: Vec<_> = full_env()
            .into_iter()
            .filter(|(k, _)| *k != "APPWRITE_BUCKET_ID")
            .collect();
        let err = AppConfig::from_lookup(lookup_from(&env)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("APPWRITE_BUCKET_ID")));
    }

    #[test]
    fn passkey_must_have_six_characters() {
        let mut env = full_env();
        env.retain(|(k, _)| *k != "CAREPULSE_ADMIN_PASSKEY");
        env.push(("CAREPULSE_ADMIN_PASSKEY", "12345"));
        let err = AppConfig::from_lookup(lookup_from(&env)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "CAREPULSE_ADMIN_PASSKEY", .. }
        ));
    }

    #[test]
    fn memory_backend_fills_placeholders() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CAREPULSE_BACKEND", "memory"),
            ("CAREPULSE_ADMIN_PASSKEY", "654321"),
        ]))
        .unwrap();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.bucket_id, "documents");
    }

    #[test]
    fn unknown_backend_rejected() {
        let mut env = full_env();
        env.push(("CAREPULSE_BACKEND", "firebase"));
        assert!(AppConfig::from_lookup(lookup_from(&env)).is_err());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = AppConfig::from_lookup(lookup_from(&full_env())).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(!debug.contains("111111"));
    }

    #[test]
    fn file_view_url_composes_endpoint_bucket_and_file() {
        let config = AppConfig::for_tests();
        assert_eq!(
            config.file_view_url("file-1"),
            "https://cloud.appwrite.io/v1/storage/buckets/bucket/files/file-1/view?project=proj"
        );
    }

    #[test]
    fn app_name_is_carepulse() {
        assert_eq!(APP_NAME, "CarePulse");
    }
}

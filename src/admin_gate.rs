//! Passkey gate in front of the admin dashboard.
//!
//! The unlocked state is remembered in a local key-value store under
//! `accessKey`, holding the passkey in base64. The encoding is obfuscation
//! only: anyone with access to the store can recover the passkey.

use std::collections::HashMap;

use axum::http::{header, HeaderMap, HeaderValue};
use base64::Engine;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::config::{AdminPasskey, ADMIN_PASSKEY_LEN};

pub const ACCESS_KEY: &str = "accessKey";
pub const ADMIN_PATH: &str = "/admin";
pub const HOME_PATH: &str = "/";

/// Browser-local key-value storage.
pub trait LocalStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Store backed by the request's cookies. Writes become `Set-Cookie`
/// headers on the response.
#[derive(Debug, Default)]
pub struct CookieStore {
    cookies: HashMap<String, String>,
    pending: Vec<String>,
}

impl CookieStore {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let cookies = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|raw| raw.split(';'))
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                Some((name.trim().to_string(), value.trim().to_string()))
            })
            .collect();
        Self {
            cookies,
            pending: Vec::new(),
        }
    }

    /// `Set-Cookie` values for everything written through this store.
    pub fn set_cookie_headers(&self) -> Vec<HeaderValue> {
        self.pending
            .iter()
            .filter_map(|cookie| HeaderValue::from_str(cookie).ok())
            .collect()
    }
}

impl LocalStore for CookieStore {
    fn get(&self, key: &str) -> Option<String> {
        self.cookies.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.cookies.insert(key.to_string(), value.to_string());
        self.pending
            .push(format!("{key}={value}; Path=/; HttpOnly; SameSite=Lax"));
    }

    fn remove(&mut self, key: &str) {
        self.cookies.remove(key);
        self.pending.push(format!("{key}=; Path=/; Max-Age=0"));
    }
}

pub fn encode_key(secret: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(secret.as_bytes())
}

/// Reverse of `encode_key`. `None` for anything that is not base64 UTF-8.
pub fn decode_key(encoded: &str) -> Option<Zeroizing<String>> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    String::from_utf8(bytes).ok().map(Zeroizing::new)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("Invalid passkey. Please try again")]
    PasskeyMismatch,
}

pub struct AdminGate<'a> {
    expected: &'a AdminPasskey,
}

impl<'a> AdminGate<'a> {
    pub fn new(expected: &'a AdminPasskey) -> Self {
        Self { expected }
    }

    fn matches(&self, candidate: &str) -> bool {
        candidate
            .as_bytes()
            .ct_eq(self.expected.expose().as_bytes())
            .into()
    }

    /// Unlocked when the store already holds the expected secret.
    pub fn on_route_entry(&self, store: &dyn LocalStore) -> GateState {
        let unlocked = store
            .get(ACCESS_KEY)
            .and_then(|stored| decode_key(&stored))
            .is_some_and(|secret| self.matches(&secret));
        if unlocked {
            GateState::Unlocked
        } else {
            GateState::Locked
        }
    }

    /// Check a typed passkey. Only a match is persisted.
    pub fn submit_passkey(
        &self,
        store: &mut dyn LocalStore,
        attempt: &str,
    ) -> Result<GateState, GateError> {
        let attempt = attempt.trim();
        if attempt.chars().count() != ADMIN_PASSKEY_LEN || !self.matches(attempt) {
            tracing::warn!("Admin passkey rejected");
            return Err(GateError::PasskeyMismatch);
        }
        store.set(ACCESS_KEY, &encode_key(attempt));
        tracing::info!("Admin access granted");
        Ok(GateState::Unlocked)
    }

    /// Where to go after the passkey check. Dismissing the prompt always
    /// leads home; an unlocked gate is only entered through `/admin`.
    pub fn destination(&self, state: GateState) -> &'static str {
        match state {
            GateState::Unlocked => ADMIN_PATH,
            GateState::Locked => HOME_PATH,
        }
    }

    /// Prompt dismissed without a successful submit.
    pub fn close(&self) -> &'static str {
        HOME_PATH
    }
}

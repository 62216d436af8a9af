//! In-process backend with the same observable contract as the hosted one.
//!
//! Emulates email uniqueness (409 → `Conflict`), query filtering,
//! `$createdAt` ordering, and supports fault injection so callers can be
//! tested against every failure path. A call can also be held open to
//! exercise overlapping requests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use futures_util::FutureExt;
use tokio::sync::oneshot;

use super::{
    BlobStorage, CollectionRef, DocumentDatabase, IdentityService, Query, ServiceError,
    ServiceFuture,
};
use crate::models::{FileRef, Identity, NewIdentity, UploadedDocument};

/// Backend operations, used for call logging and fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateUser,
    ListUsers,
    GetUser,
    CreateDocument,
    ListDocuments,
    UpdateDocument,
    CreateFile,
}

#[derive(Default)]
struct MemoryState {
    users: Vec<Identity>,
    collections: HashMap<CollectionRef, Vec<serde_json::Value>>,
    files: HashMap<(String, String), UploadedDocument>,
    calls: Vec<Operation>,
    faults: HashMap<Operation, ServiceError>,
    holds: HashMap<Operation, (oneshot::Sender<()>, oneshot::Receiver<()>)>,
    sequence: u64,
}

/// Handle on a held call: `entered` fires once the call is waiting,
/// sending on `release` lets it proceed.
pub struct HeldCall {
    pub entered: oneshot::Receiver<()>,
    pub release: oneshot::Sender<()>,
}

#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<MemoryState>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, ServiceError> {
        self.state
            .lock()
            .map_err(|_| ServiceError::HttpClient("memory backend lock poisoned".into()))
    }

    /// Wait here if a hold is armed for `op`.
    async fn pass(&self, op: Operation) {
        let hold = self.state.lock().ok().and_then(|mut s| s.holds.remove(&op));
        if let Some((entered, release)) = hold {
            let _ = entered.send(());
            let _ = release.await;
        }
    }

    /// Record the call, then fail it if a fault is armed for `op`.
    fn enter(&self, op: Operation) -> Result<MutexGuard<'_, MemoryState>, ServiceError> {
        let mut state = self.lock()?;
        state.calls.push(op);
        if let Some(err) = state.faults.remove(&op) {
            return Err(err);
        }
        Ok(state)
    }

    /// Make the next call to `op` fail with `err`.
    pub fn fail_next(&self, op: Operation, err: ServiceError) {
        if let Ok(mut state) = self.state.lock() {
            state.faults.insert(op, err);
        }
    }

    /// Make the next call to `op` wait until released.
    pub fn hold_next(&self, op: Operation) -> HeldCall {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        if let Ok(mut state) = self.state.lock() {
            state.holds.insert(op, (entered_tx, release_rx));
        }
        HeldCall {
            entered: entered_rx,
            release: release_tx,
        }
    }

    /// Operations performed so far, in order.
    pub fn calls(&self) -> Vec<Operation> {
        self.state.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }

    pub fn call_count(&self, op: Operation) -> usize {
        self.calls().into_iter().filter(|c| *c == op).count()
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().map(|s| s.users.len()).unwrap_or(0)
    }

    pub fn file_count(&self) -> usize {
        self.state.lock().map(|s| s.files.len()).unwrap_or(0)
    }

    pub fn documents(&self, collection: &CollectionRef) -> Vec<serde_json::Value> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.collections.get(collection).cloned())
            .unwrap_or_default()
    }
}

fn attribute_text(doc: &serde_json::Value, attribute: &str) -> Option<String> {
    match doc.get(attribute)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn apply_queries(mut docs: Vec<serde_json::Value>, queries: &[Query]) -> Vec<serde_json::Value> {
    for query in queries {
        match query {
            Query::Equal { attribute, values } => docs.retain(|doc| {
                attribute_text(doc, attribute)
                    .map(|v| values.contains(&v))
                    .unwrap_or(false)
            }),
            Query::OrderDesc(attribute) => {
                // Newest insertions first on ties.
                docs.reverse();
                docs.sort_by(|a, b| attribute_text(b, attribute).cmp(&attribute_text(a, attribute)));
            }
            Query::Limit(limit) => docs.truncate(*limit),
        }
    }
    docs
}

impl IdentityService for InMemoryBackend {
    fn create<'a>(&'a self, user_id: &'a str, new: &'a NewIdentity) -> ServiceFuture<'a, Identity> {
        async move {
            self.pass(Operation::CreateUser).await;
            let mut state = self.enter(Operation::CreateUser)?;
            if state
                .users
                .iter()
                .any(|u| u.id == user_id || u.email.eq_ignore_ascii_case(&new.email))
            {
                return Err(ServiceError::Conflict(
                    "A user with the same id, email, or phone already exists in this project."
                        .into(),
                ));
            }
            let identity = Identity {
                id: user_id.to_string(),
                name: new.name.clone(),
                email: new.email.clone(),
                phone: new.phone.clone(),
            };
            state.users.push(identity.clone());
            Ok(identity)
        }
        .boxed()
    }

    fn list<'a>(&'a self, queries: &'a [Query]) -> ServiceFuture<'a, Vec<Identity>> {
        async move {
            self.pass(Operation::ListUsers).await;
            let state = self.enter(Operation::ListUsers)?;
            let docs = state
                .users
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| ServiceError::ResponseParsing(e.to_string()))?;
            apply_queries(docs, queries)
                .into_iter()
                .map(|doc| {
                    serde_json::from_value(doc)
                        .map_err(|e| ServiceError::ResponseParsing(e.to_string()))
                })
                .collect()
        }
        .boxed()
    }

    fn get<'a>(&'a self, user_id: &'a str) -> ServiceFuture<'a, Identity> {
        async move {
            self.pass(Operation::GetUser).await;
            let state = self.enter(Operation::GetUser)?;
            state
                .users
                .iter()
                .find(|u| u.id == user_id)
                .cloned()
                .ok_or_else(|| ServiceError::NotFound(format!("user {user_id}")))
        }
        .boxed()
    }
}

impl DocumentDatabase for InMemoryBackend {
    fn create_document<'a>(
        &'a self,
        collection: &'a CollectionRef,
        document_id: &'a str,
        fields: serde_json::Value,
    ) -> ServiceFuture<'a, serde_json::Value> {
        async move {
            self.pass(Operation::CreateDocument).await;
            let mut state = self.enter(Operation::CreateDocument)?;
            let serde_json::Value::Object(mut doc) = fields else {
                return Err(ServiceError::Status {
                    status: 400,
                    message: "Document data must be an object".into(),
                });
            };
            state.sequence += 1;
            // Sequence suffix keeps `$createdAt` strictly increasing.
            let created_at = format!(
                "{}.{:06}+00:00",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S"),
                state.sequence
            );
            let docs = state.collections.entry(collection.clone()).or_default();
            if docs.iter().any(|d| d["$id"] == document_id) {
                return Err(ServiceError::Conflict(format!(
                    "Document with the requested ID '{document_id}' already exists."
                )));
            }
            doc.insert("$id".into(), document_id.into());
            doc.insert("$createdAt".into(), created_at.into());
            let doc = serde_json::Value::Object(doc);
            docs.push(doc.clone());
            Ok(doc)
        }
        .boxed()
    }

    fn list_documents<'a>(
        &'a self,
        collection: &'a CollectionRef,
        queries: &'a [Query],
    ) -> ServiceFuture<'a, Vec<serde_json::Value>> {
        async move {
            self.pass(Operation::ListDocuments).await;
            let state = self.enter(Operation::ListDocuments)?;
            let docs = state.collections.get(collection).cloned().unwrap_or_default();
            Ok(apply_queries(docs, queries))
        }
        .boxed()
    }

    fn update_document<'a>(
        &'a self,
        collection: &'a CollectionRef,
        document_id: &'a str,
        fields: serde_json::Value,
    ) -> ServiceFuture<'a, serde_json::Value> {
        async move {
            self.pass(Operation::UpdateDocument).await;
            let mut state = self.enter(Operation::UpdateDocument)?;
            let doc = state
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|d| d["$id"] == document_id))
                .ok_or_else(|| ServiceError::NotFound(format!("document {document_id}")))?;
            if let (Some(target), serde_json::Value::Object(changes)) = (doc.as_object_mut(), fields) {
                target.extend(changes);
            }
            Ok(doc.clone())
        }
        .boxed()
    }
}

impl BlobStorage for InMemoryBackend {
    fn create_file<'a>(
        &'a self,
        bucket_id: &'a str,
        file_id: &'a str,
        document: &'a UploadedDocument,
    ) -> ServiceFuture<'a, FileRef> {
        async move {
            self.pass(Operation::CreateFile).await;
            let mut state = self.enter(Operation::CreateFile)?;
            state
                .files
                .insert((bucket_id.to_string(), file_id.to_string()), document.clone());
            Ok(FileRef {
                id: file_id.to_string(),
            })
        }
        .boxed()
    }
}

//! Shared state handed to every handler.

use std::sync::Arc;

use crate::backend::Backend;
use crate::config::AppConfig;
use crate::forms::SubmissionFlags;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub backend: Backend,
    /// Busy flags of forms being submitted, shared across requests.
    pub submissions: Arc<SubmissionFlags>,
}

impl AppContext {
    pub fn new(config: AppConfig, backend: Backend) -> Self {
        Self {
            config: Arc::new(config),
            backend,
            submissions: Arc::new(SubmissionFlags::new()),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_context() -> (AppContext, Arc<crate::backend::InMemoryBackend>) {
    let memory = Arc::new(crate::backend::InMemoryBackend::new());
    let ctx = AppContext::new(AppConfig::for_tests(), Backend::shared(memory.clone()));
    (ctx, memory)
}

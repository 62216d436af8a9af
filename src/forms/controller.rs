//! Submission state machine for one form.
//!
//! Editing → Submitting → Success, or Failed when the action errors.
//! Validation errors keep the form in Editing. A Failed form can be
//! submitted again. One submission runs at a time per busy flag; handlers
//! share the flag of one form instance through `SubmissionFlags`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use super::schema::{FieldErrors, FormSchema};
use super::state::FormState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Editing,
    Submitting,
    Success,
    Failed,
}

#[derive(Debug)]
pub enum SubmitOutcome<T, E> {
    /// Validation failed; the action was not called.
    Invalid(FieldErrors),
    /// Another submission on this controller is in flight.
    Busy,
    Success(T),
    Failed(E),
}

/// Busy flags keyed by form instance (form name plus the record it acts
/// for). An entry lives while a controller holds it.
#[derive(Debug, Default)]
pub struct SubmissionFlags {
    flags: Mutex<HashMap<String, Weak<AtomicBool>>>,
}

impl SubmissionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// The flag shared by every in-flight submit of `key`.
    pub fn flag(&self, key: &str) -> Arc<AtomicBool> {
        let Ok(mut flags) = self.flags.lock() else {
            return Arc::new(AtomicBool::new(false));
        };
        flags.retain(|_, flag| flag.strong_count() > 0);
        if let Some(flag) = flags.get(key).and_then(Weak::upgrade) {
            return flag;
        }
        let flag = Arc::new(AtomicBool::new(false));
        flags.insert(key.to_string(), Arc::downgrade(&flag));
        flag
    }

    /// Keys with a live controller.
    pub fn len(&self) -> usize {
        self.flags
            .lock()
            .map(|flags| flags.values().filter(|f| f.strong_count() > 0).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Clears the busy flag when the submission ends, including on panic or
/// when the future is dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct FormController<S: FormSchema> {
    schema: S,
    busy: Arc<AtomicBool>,
    status: Mutex<FormStatus>,
}

impl<S: FormSchema> FormController<S> {
    pub fn new(schema: S) -> Self {
        Self::with_flag(schema, Arc::new(AtomicBool::new(false)))
    }

    /// Controller whose busy flag is shared with other controllers of the
    /// same form instance.
    pub fn with_flag(schema: S, busy: Arc<AtomicBool>) -> Self {
        Self {
            schema,
            busy,
            status: Mutex::new(FormStatus::Editing),
        }
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    pub fn status(&self) -> FormStatus {
        self.status
            .lock()
            .map(|s| *s)
            .unwrap_or(FormStatus::Editing)
    }

    fn set_status(&self, status: FormStatus) {
        if let Ok(mut current) = self.status.lock() {
            *current = status;
        }
    }

    /// Validate `state` and, if valid, run `action` with the typed values.
    pub async fn submit<T, E, F, Fut>(&self, state: &FormState, action: F) -> SubmitOutcome<T, E>
    where
        F: FnOnce(S::Output) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Submit ignored while a submission is in flight");
            return SubmitOutcome::Busy;
        }
        let _guard = BusyGuard(&self.busy);

        let values = match self.schema.validate(state) {
            Ok(values) => values,
            Err(errors) => {
                tracing::debug!(fields = errors.len(), "Form validation failed");
                self.set_status(FormStatus::Editing);
                return SubmitOutcome::Invalid(errors);
            }
        };

        self.set_status(FormStatus::Submitting);
        match action(values).await {
            Ok(record) => {
                self.set_status(FormStatus::Success);
                SubmitOutcome::Success(record)
            }
            Err(e) => {
                tracing::error!(error = %e, "Form submission failed");
                self.set_status(FormStatus::Failed);
                SubmitOutcome::Failed(e)
            }
        }
    }
}

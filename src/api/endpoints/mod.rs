//! Page handlers, one module per screen.

pub mod admin;
pub mod appointments;
pub mod health;
pub mod intake;
pub mod register;

use std::collections::HashMap;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use crate::actions::{create_appointment, update_appointment, ActionError};
use crate::api::error::ApiError;
use crate::api::pages::SUBMIT_FAILED_MESSAGE;
use crate::backend::{is_valid_id, Backend};
use crate::config::AppConfig;
use crate::forms::{AppointmentSubmission, FieldErrors, FormState, SubmitOutcome};
use crate::models::Appointment;

const SUBMIT_BUSY_MESSAGE: &str = "This form is already being submitted.";

pub(crate) fn page(status: StatusCode, html: String) -> Response {
    (status, Html(html)).into_response()
}

/// Reject path ids the backend would never have issued. Decoded path
/// segments may carry control characters.
pub(crate) fn checked_id(id: &str) -> Result<&str, ApiError> {
    if is_valid_id(id) {
        Ok(id)
    } else {
        Err(ApiError::BadRequest(format!("Invalid identifier {id:?}")))
    }
}

/// 303 to `location`, failing instead of panicking on a bad header value.
pub(crate) fn see_other(location: &str) -> Result<Response, ApiError> {
    let value = HeaderValue::from_str(location)
        .map_err(|_| ApiError::BadRequest(format!("Invalid redirect target {location:?}")))?;
    Ok((StatusCode::SEE_OTHER, [(header::LOCATION, value)]).into_response())
}

pub(crate) fn form_state(fields: HashMap<String, String>) -> FormState {
    fields.into_iter().collect()
}

/// Why a submit did not produce a record, and how to re-render the form.
pub(crate) struct Rejection {
    pub status: StatusCode,
    pub errors: FieldErrors,
    pub banner: Option<&'static str>,
}

/// Split a submit outcome into the record or a re-render instruction.
pub(crate) fn settle<T, E>(outcome: SubmitOutcome<T, E>) -> Result<T, Rejection> {
    match outcome {
        SubmitOutcome::Success(record) => Ok(record),
        SubmitOutcome::Invalid(errors) => Err(Rejection {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            errors,
            banner: None,
        }),
        SubmitOutcome::Busy => Err(Rejection {
            status: StatusCode::CONFLICT,
            errors: FieldErrors::default(),
            banner: Some(SUBMIT_BUSY_MESSAGE),
        }),
        SubmitOutcome::Failed(_) => Err(Rejection {
            status: StatusCode::BAD_GATEWAY,
            errors: FieldErrors::default(),
            banner: Some(SUBMIT_FAILED_MESSAGE),
        }),
    }
}

/// Run the action behind a validated appointment form.
pub(crate) async fn apply_appointment(
    backend: &Backend,
    config: &AppConfig,
    submission: AppointmentSubmission,
) -> Result<Appointment, ActionError> {
    match submission {
        AppointmentSubmission::Create(new) => create_appointment(backend, config, &new).await,
        AppointmentSubmission::Update {
            appointment_id,
            user_id,
            action,
            update,
        } => update_appointment(backend, config, &appointment_id, &user_id, action, &update).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_with_control_characters_are_bad_requests() {
        assert_eq!(checked_id("user-1").unwrap(), "user-1");
        assert!(matches!(checked_id("x\ny"), Err(ApiError::BadRequest(_))));
        assert!(matches!(checked_id("../admin"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn see_other_sets_location() {
        let resp = see_other("/patients/u1/register").unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/patients/u1/register");
        assert!(matches!(see_other("/x\ny"), Err(ApiError::BadRequest(_))));
    }
}

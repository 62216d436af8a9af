//! `/patients/:user_id/new-appointment` — appointment requests.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::response::{Html, Response};
use axum::Form;
use serde::Deserialize;

use super::{apply_appointment, checked_id, form_state, page, see_other, settle};
use crate::actions::{get_appointment, get_patient_by_user};
use crate::api::error::ApiError;
use crate::api::pages;
use crate::api::types::AppContext;
use crate::forms::{AppointmentForm, FieldErrors, FormController};

#[derive(Debug, Deserialize)]
pub struct SuccessParams {
    pub appointment_id: String,
}

pub async fn show(
    State(ctx): State<AppContext>,
    Path(user_id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let user_id = checked_id(&user_id)?;
    let patient = get_patient_by_user(&ctx.backend, &ctx.config, user_id).await?;
    let form = AppointmentForm::create(user_id, &patient.id);
    Ok(Html(pages::new_appointment_page(
        &form,
        user_id,
        &form.initial_state(),
        &FieldErrors::default(),
        None,
    )))
}

/// `POST` — one request per user in flight at a time.
pub async fn submit(
    State(ctx): State<AppContext>,
    Path(user_id): Path<String>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let user_id = checked_id(&user_id)?;
    let patient = get_patient_by_user(&ctx.backend, &ctx.config, user_id).await?;
    let controller = FormController::with_flag(
        AppointmentForm::create(user_id, &patient.id),
        ctx.submissions.flag(&format!("appointment:{user_id}")),
    );
    let state = form_state(fields);
    let outcome = controller
        .submit(&state, |submission| {
            apply_appointment(&ctx.backend, &ctx.config, submission)
        })
        .await;

    match settle(outcome) {
        Ok(appointment) => see_other(&format!(
            "/patients/{user_id}/new-appointment/success?appointment_id={}",
            appointment.id
        )),
        Err(rejection) => Ok(page(
            rejection.status,
            pages::new_appointment_page(
                controller.schema(),
                user_id,
                &state,
                &rejection.errors,
                rejection.banner,
            ),
        )),
    }
}

/// `GET .../success?appointment_id=` — confirmation with doctor and time.
pub async fn success(
    State(ctx): State<AppContext>,
    Path(user_id): Path<String>,
    Query(params): Query<SuccessParams>,
) -> Result<Html<String>, ApiError> {
    let user_id = checked_id(&user_id)?;
    let appointment_id = checked_id(&params.appointment_id)?;
    let appointment = get_appointment(&ctx.backend, &ctx.config, appointment_id).await?;
    Ok(Html(pages::appointment_success_page(user_id, &appointment)))
}

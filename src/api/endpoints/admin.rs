//! `/admin` — passkey-gated dashboard plus schedule/cancel actions.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use super::{apply_appointment, checked_id, form_state, page, settle};
use crate::actions::{get_appointment, get_recent_appointments};
use crate::admin_gate::{AdminGate, CookieStore, GateState};
use crate::api::error::ApiError;
use crate::api::pages::{self, PasskeyPrompt, RejectedAction};
use crate::api::types::AppContext;
use crate::forms::{AppointmentForm, FieldErrors, FormController, FormState, UserForm};
use crate::models::AppointmentAction;

const PROMPT_PATH: &str = "/?admin=true";

#[derive(Debug, Deserialize)]
pub struct PasskeyForm {
    #[serde(default)]
    pub passkey: String,
}

fn gate_state(ctx: &AppContext, headers: &HeaderMap) -> GateState {
    let store = CookieStore::from_headers(headers);
    AdminGate::new(&ctx.config.admin_passkey).on_route_entry(&store)
}

pub async fn dashboard(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if gate_state(&ctx, &headers) == GateState::Locked {
        return Ok(Redirect::to(PROMPT_PATH).into_response());
    }
    let summary = get_recent_appointments(&ctx.backend, &ctx.config).await?;
    Ok(Html(pages::admin_page(&summary, None, None)).into_response())
}

/// `POST /admin/passkey` — a match stores the key cookie and opens the
/// dashboard; a mismatch re-shows the prompt with the error.
pub async fn submit_passkey(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Form(form): Form<PasskeyForm>,
) -> Response {
    let mut store = CookieStore::from_headers(&headers);
    let gate = AdminGate::new(&ctx.config.admin_passkey);
    match gate.submit_passkey(&mut store, &form.passkey) {
        Ok(state) => {
            let mut response = Redirect::to(gate.destination(state)).into_response();
            for cookie in store.set_cookie_headers() {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            response
        }
        Err(e) => page(
            StatusCode::UNAUTHORIZED,
            pages::intake_page(
                &UserForm,
                &FormState::new(),
                &FieldErrors::default(),
                None,
                PasskeyPrompt::Rejected(&e.to_string()),
            ),
        ),
    }
}

/// `GET /admin/close` — prompt dismissed.
pub async fn close(State(ctx): State<AppContext>) -> Redirect {
    Redirect::to(AdminGate::new(&ctx.config.admin_passkey).close())
}

pub async fn schedule(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(appointment_id): Path<String>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    apply(ctx, headers, appointment_id, AppointmentAction::Schedule, fields).await
}

pub async fn cancel(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(appointment_id): Path<String>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    apply(ctx, headers, appointment_id, AppointmentAction::Cancel, fields).await
}

async fn apply(
    ctx: AppContext,
    headers: HeaderMap,
    appointment_id: String,
    action: AppointmentAction,
    fields: HashMap<String, String>,
) -> Result<Response, ApiError> {
    if gate_state(&ctx, &headers) == GateState::Locked {
        return Ok(Redirect::to(PROMPT_PATH).into_response());
    }

    let appointment_id = checked_id(&appointment_id)?;
    let appointment = get_appointment(&ctx.backend, &ctx.config, appointment_id).await?;
    let controller = FormController::with_flag(
        AppointmentForm::for_action(action, appointment),
        ctx.submissions.flag(&format!("admin:{appointment_id}")),
    );
    let state = form_state(fields);
    let outcome = controller
        .submit(&state, |submission| {
            apply_appointment(&ctx.backend, &ctx.config, submission)
        })
        .await;

    match settle(outcome) {
        Ok(_) => Ok(Redirect::to(crate::admin_gate::ADMIN_PATH).into_response()),
        Err(rejection) => {
            let summary = get_recent_appointments(&ctx.backend, &ctx.config).await?;
            let rejected = RejectedAction {
                appointment_id,
                action,
                state: &state,
                errors: &rejection.errors,
            };
            Ok(page(
                rejection.status,
                pages::admin_page(&summary, Some(&rejected), rejection.banner),
            ))
        }
    }
}

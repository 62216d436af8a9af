//! `/` — intake form creating (or reusing) the visitor's identity.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use super::{form_state, page, see_other, settle};
use crate::actions::create_identity;
use crate::admin_gate::{AdminGate, CookieStore, GateState, ADMIN_PATH};
use crate::api::error::ApiError;
use crate::api::pages::{self, PasskeyPrompt};
use crate::api::types::AppContext;
use crate::forms::{FieldErrors, FormController, FormState, UserForm};

#[derive(Debug, Default, Deserialize)]
pub struct IntakeParams {
    #[serde(default)]
    pub admin: bool,
}

/// `GET /` — intake form; `?admin=true` adds the passkey prompt, or goes
/// straight to the dashboard when this browser is already unlocked.
pub async fn show(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Query(params): Query<IntakeParams>,
) -> Response {
    let prompt = if params.admin {
        let store = CookieStore::from_headers(&headers);
        match AdminGate::new(&ctx.config.admin_passkey).on_route_entry(&store) {
            GateState::Unlocked => return Redirect::to(ADMIN_PATH).into_response(),
            GateState::Locked => PasskeyPrompt::Shown,
        }
    } else {
        PasskeyPrompt::Hidden
    };
    Html(pages::intake_page(
        &UserForm,
        &FormState::new(),
        &FieldErrors::default(),
        None,
        prompt,
    ))
    .into_response()
}

/// `POST /` — create the identity, then continue to registration.
/// Submits for the same email are serialized.
pub async fn submit(
    State(ctx): State<AppContext>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let state = form_state(fields);
    let controller = match state.text("email") {
        Some(email) => FormController::with_flag(
            UserForm,
            ctx.submissions
                .flag(&format!("intake:{}", email.to_ascii_lowercase())),
        ),
        None => FormController::new(UserForm),
    };
    let backend = &ctx.backend;
    let outcome = controller
        .submit(&state, |new| async move { create_identity(backend, &new).await })
        .await;

    match settle(outcome) {
        Ok(identity) => see_other(&format!("/patients/{}/register", identity.id)),
        Err(rejection) => Ok(page(
            rejection.status,
            pages::intake_page(
                controller.schema(),
                &state,
                &rejection.errors,
                rejection.banner,
                PasskeyPrompt::Hidden,
            ),
        )),
    }
}

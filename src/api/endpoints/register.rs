//! `/patients/:user_id/register` — patient registration with an optional
//! identification document upload.

use axum::extract::{Multipart, Path, State};
use axum::response::{Html, IntoResponse, Response};

use super::{checked_id, page, see_other, settle};
use crate::actions::{get_identity, get_patient_by_user, register_patient, ActionError};
use crate::api::error::ApiError;
use crate::api::pages;
use crate::api::types::AppContext;
use crate::forms::{FieldErrors, FormController, FormState, PatientForm};
use crate::models::UploadedDocument;

/// Upper bound for the multipart body, document included.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const DOCUMENT_FIELD: &str = "identificationDocument";

fn new_appointment_path(user_id: &str) -> String {
    format!("/patients/{user_id}/new-appointment")
}

/// `GET` — registration form prefilled from the identity. Users who are
/// already registered go straight to booking.
pub async fn show(
    State(ctx): State<AppContext>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let user_id = checked_id(&user_id)?;
    if is_registered(&ctx, user_id).await? {
        return see_other(&new_appointment_path(user_id));
    }

    let user = get_identity(&ctx.backend, user_id).await?;
    let form = PatientForm::new(&user.id);
    let state = PatientForm::initial_state(&user.name, &user.email, &user.phone);
    Ok(Html(pages::register_page(
        &form,
        user_id,
        &state,
        &FieldErrors::default(),
        None,
    ))
    .into_response())
}

async fn is_registered(ctx: &AppContext, user_id: &str) -> Result<bool, ApiError> {
    match get_patient_by_user(&ctx.backend, &ctx.config, user_id).await {
        Ok(_) => Ok(true),
        Err(ActionError::NotFound(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// `POST` — multipart form; text parts become form values, the document
/// part is forwarded to blob storage as-is. Only one registration per
/// user runs at a time; a repeat after success goes straight to booking.
pub async fn submit(
    State(ctx): State<AppContext>,
    Path(user_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let user_id = checked_id(&user_id)?;
    get_identity(&ctx.backend, user_id).await?;
    if is_registered(&ctx, user_id).await? {
        return see_other(&new_appointment_path(user_id));
    }
    let (state, document) = read_registration(&mut multipart).await?;

    let controller = FormController::with_flag(
        PatientForm::new(user_id),
        ctx.submissions.flag(&format!("register:{user_id}")),
    );
    let backend = &ctx.backend;
    let config = &ctx.config;
    let outcome = controller
        .submit(&state, |registration| async move {
            register_patient(backend, config, &registration, document.as_ref()).await
        })
        .await;

    match settle(outcome) {
        Ok(patient) => {
            tracing::info!(patient_id = %patient.id, "Patient registered");
            see_other(&new_appointment_path(user_id))
        }
        Err(rejection) => Ok(page(
            rejection.status,
            pages::register_page(
                controller.schema(),
                user_id,
                &state,
                &rejection.errors,
                rejection.banner,
            ),
        )),
    }
}

async fn read_registration(
    multipart: &mut Multipart,
) -> Result<(FormState, Option<UploadedDocument>), ApiError> {
    let mut state = FormState::new();
    let mut document = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == DOCUMENT_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            // Browsers send an empty part when no file was picked.
            if !file_name.is_empty() && !bytes.is_empty() {
                document = Some(UploadedDocument {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            state.set(&name, value);
        }
    }

    Ok((state, document))
}

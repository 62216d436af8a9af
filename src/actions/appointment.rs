use chrono::{DateTime, Utc};

use crate::backend::{unique_id, Backend, CollectionRef, Query};
use crate::config::{AppConfig, APP_NAME};
use crate::models::{
    Appointment, AppointmentAction, AppointmentSummary, AppointmentUpdate, NewAppointment,
};

use super::{from_document, to_document, ActionError};

fn appointment_collection(config: &AppConfig) -> CollectionRef {
    CollectionRef::new(&config.database_id, &config.appointment_collection_id)
}

/// Human-readable appointment time, e.g. `Tue, Jan 15, 9:30 AM`.
pub fn format_date_time(at: &DateTime<Utc>) -> String {
    at.format("%a, %b %-d, %-I:%M %p").to_string()
}

pub async fn create_appointment(
    backend: &Backend,
    config: &AppConfig,
    new: &NewAppointment,
) -> Result<Appointment, ActionError> {
    let data = to_document("appointment", new)?;
    let document_id = unique_id();
    let doc = backend
        .documents
        .create_document(&appointment_collection(config), &document_id, data)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "An error occurred while creating a new appointment");
            e
        })?;

    let appointment: Appointment = from_document("appointment", doc)?;
    tracing::info!(appointment_id = %appointment.id, user_id = %appointment.user_id, "Appointment requested");
    Ok(appointment)
}

pub async fn get_appointment(
    backend: &Backend,
    config: &AppConfig,
    appointment_id: &str,
) -> Result<Appointment, ActionError> {
    let queries = [Query::equal("$id", appointment_id)];
    let doc = backend
        .documents
        .list_documents(&appointment_collection(config), &queries)
        .await
        .map_err(|e| {
            tracing::error!(appointment_id, error = %e, "An error occurred while retrieving the appointment");
            e
        })?
        .into_iter()
        .next()
        .ok_or_else(|| ActionError::NotFound(format!("appointment {appointment_id}")))?;
    from_document("appointment", doc)
}

/// All appointments, newest first, with per-status counts.
pub async fn get_recent_appointments(
    backend: &Backend,
    config: &AppConfig,
) -> Result<AppointmentSummary, ActionError> {
    let queries = [Query::OrderDesc("$createdAt".into())];
    let docs = backend
        .documents
        .list_documents(&appointment_collection(config), &queries)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "An error occurred while retrieving the recent appointments");
            e
        })?;

    let appointments = docs
        .into_iter()
        .map(|doc| from_document("appointment", doc))
        .collect::<Result<Vec<Appointment>, _>>()?;
    Ok(AppointmentSummary::from_appointments(appointments))
}

/// Text sent to the patient after an admin schedules or cancels.
pub fn notification_message(action: AppointmentAction, update: &AppointmentUpdate) -> String {
    match action {
        AppointmentAction::Schedule => format!(
            "Greetings from {APP_NAME}. Your appointment is confirmed for {} with Dr. {}",
            format_date_time(&update.schedule),
            update.primary_physician
        ),
        AppointmentAction::Cancel => format!(
            "We regret to inform that your appointment for {} is cancelled. Reason: {}",
            format_date_time(&update.schedule),
            update.cancellation_reason.as_deref().unwrap_or("not given")
        ),
    }
}

/// Apply a schedule or cancel update and notify the patient.
///
/// Notification delivery is logged; no messaging provider is wired in.
pub async fn update_appointment(
    backend: &Backend,
    config: &AppConfig,
    appointment_id: &str,
    user_id: &str,
    action: AppointmentAction,
    update: &AppointmentUpdate,
) -> Result<Appointment, ActionError> {
    let data = to_document("appointment", update)?;
    let doc = backend
        .documents
        .update_document(&appointment_collection(config), appointment_id, data)
        .await
        .map_err(|e| {
            tracing::error!(appointment_id, error = %e, "An error occurred while updating the appointment");
            ActionError::from_lookup(e, format!("appointment {appointment_id}"))
        })?;
    let appointment: Appointment = from_document("appointment", doc)?;

    let message = notification_message(action, update);
    tracing::info!(user_id, appointment_id, %action, %message, "Appointment notification");

    Ok(appointment)
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

/// Validated values for a new appointment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub user_id: String,
    /// Patient document id.
    pub patient: String,
    pub primary_physician: String,
    pub schedule: DateTime<Utc>,
    pub reason: String,
    pub note: Option<String>,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    pub user_id: String,
    pub patient: String,
    pub primary_physician: String,
    pub schedule: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
}

/// Fields changed when an admin schedules or cancels an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentUpdate {
    pub primary_physician: String,
    pub schedule: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub cancellation_reason: Option<String>,
}

/// Admin dashboard view: status counts plus the most recent appointments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSummary {
    pub total_count: usize,
    pub scheduled_count: usize,
    pub pending_count: usize,
    pub cancelled_count: usize,
    pub documents: Vec<Appointment>,
}

impl AppointmentSummary {
    pub fn from_appointments(documents: Vec<Appointment>) -> Self {
        let mut summary = Self {
            total_count: documents.len(),
            ..Self::default()
        };
        for appointment in &documents {
            match appointment.status {
                AppointmentStatus::Scheduled => summary.scheduled_count += 1,
                AppointmentStatus::Pending => summary.pending_count += 1,
                AppointmentStatus::Cancelled => summary.cancelled_count += 1,
            }
        }
        summary.documents = documents;
        summary
    }
}

#[cfg(test)]
pub(crate) fn sample_appointment(id: &str, status: AppointmentStatus) -> Appointment {
    Appointment {
        id: id.to_string(),
        created_at: None,
        user_id: "user-1".into(),
        patient: "patient-1".into(),
        primary_physician: "John Green".into(),
        schedule: "2030-01-15T09:30:00Z".parse().unwrap(),
        status,
        reason: Some("Annual check-up".into()),
        note: None,
        cancellation_reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_each_status() {
        let summary = AppointmentSummary::from_appointments(vec![
            sample_appointment("a", AppointmentStatus::Pending),
            sample_appointment("b", AppointmentStatus::Scheduled),
            sample_appointment("c", AppointmentStatus::Pending),
            sample_appointment("d", AppointmentStatus::Cancelled),
        ]);
        assert_eq!(summary.total_count, 4);
        assert_eq!(summary.pending_count, 2);
        assert_eq!(summary.scheduled_count, 1);
        assert_eq!(summary.cancelled_count, 1);
        assert_eq!(summary.documents[0].id, "a");
    }

    #[test]
    fn deserializes_backend_document() {
        let json = r#"{
            "$id": "appt-1",
            "$createdAt": "2024-03-12T10:00:00.000+00:00",
            "userId": "user-1",
            "patient": "patient-1",
            "primaryPhysician": "Leila Cameron",
            "schedule": "2024-04-01T14:00:00.000+00:00",
            "status": "scheduled",
            "reason": "Follow-up",
            "note": null,
            "cancellationReason": null
        }"#;
        let appointment: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
        assert!(appointment.created_at.is_some());
        assert!(appointment.note.is_none());
    }
}

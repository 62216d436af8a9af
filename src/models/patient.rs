use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use super::enums::Gender;

/// Validated registration form values for one patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRegistration {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(deserialize_with = "date_or_datetime")]
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub address: String,
    pub occupation: String,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    pub primary_physician: String,
    pub insurance_provider: String,
    pub insurance_policy_number: String,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub current_medication: Option<String>,
    #[serde(default)]
    pub family_medical_history: Option<String>,
    #[serde(default)]
    pub past_medical_history: Option<String>,
    #[serde(default)]
    pub identification_type: Option<String>,
    #[serde(default)]
    pub identification_number: Option<String>,
    pub treatment_consent: bool,
    pub disclosure_consent: bool,
    pub privacy_consent: bool,
}

/// Datetime collections hand dates back as
/// `1990-12-10T00:00:00.000+00:00`; plain `1990-12-10` is read as-is.
fn date_or_datetime<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| serde::de::Error::custom(format!("invalid birth date: {raw}")))
}

/// Document body written to the patient collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDocumentFields<'a> {
    pub identification_document_id: Option<&'a str>,
    pub identification_document_url: Option<String>,
    #[serde(flatten)]
    pub registration: &'a PatientRegistration,
}

/// A patient document as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub identification_document_id: Option<String>,
    #[serde(default)]
    pub identification_document_url: Option<String>,
    #[serde(flatten)]
    pub registration: PatientRegistration,
}

/// Identification document attached to a registration. Forwarded to blob
/// storage untouched.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("file_name", &self.file_name)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

/// Reference to a file held in blob storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    #[serde(rename = "$id")]
    pub id: String,
}

#[cfg(test)]
pub(crate) fn sample_registration(user_id: &str) -> PatientRegistration {
    PatientRegistration {
        user_id: user_id.to_string(),
        name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        phone: "+15551234567".into(),
        birth_date: NaiveDate::from_ymd_opt(1990, 12, 10).unwrap(),
        gender: Gender::Female,
        address: "12 Analytical Row, London".into(),
        occupation: "Mathematician".into(),
        emergency_contact_name: "Charles Babbage".into(),
        emergency_contact_number: "+15557654321".into(),
        primary_physician: "John Green".into(),
        insurance_provider: "BlueCross".into(),
        insurance_policy_number: "ABC123456".into(),
        allergies: None,
        current_medication: None,
        family_medical_history: None,
        past_medical_history: None,
        identification_type: Some("Passport".into()),
        identification_number: Some("P1234567".into()),
        treatment_consent: true,
        disclosure_consent: true,
        privacy_consent: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_fields_flatten_registration() {
        let registration = sample_registration("user-1");
        let fields = PatientDocumentFields {
            identification_document_id: None,
            identification_document_url: None,
            registration: &registration,
        };
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["birthDate"], "1990-12-10");
        assert_eq!(json["gender"], "female");
        assert!(json["identificationDocumentId"].is_null());
        assert!(json["identificationDocumentUrl"].is_null());
    }

    #[test]
    fn record_reads_back_document_with_id() {
        let registration = sample_registration("user-2");
        let mut json = serde_json::to_value(&registration).unwrap();
        json["$id"] = "patient-9".into();
        json["identificationDocumentId"] = "file-1".into();
        let record: PatientRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.id, "patient-9");
        assert_eq!(record.identification_document_id.as_deref(), Some("file-1"));
        assert_eq!(record.registration.user_id, "user-2");
    }

    #[test]
    fn birth_date_accepts_datetime_attribute() {
        let mut json = serde_json::to_value(sample_registration("user-3")).unwrap();
        json["$id"] = "patient-3".into();
        json["birthDate"] = "1990-12-10T00:00:00.000+00:00".into();
        let record: PatientRecord = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(
            record.registration.birth_date,
            NaiveDate::from_ymd_opt(1990, 12, 10).unwrap()
        );

        json["birthDate"] = "10/12/1990".into();
        let err = serde_json::from_value::<PatientRecord>(json).unwrap_err();
        assert!(err.to_string().contains("invalid birth date"));
    }

    #[test]
    fn uploaded_document_debug_hides_contents() {
        let doc = UploadedDocument {
            file_name: "id.png".into(),
            bytes: vec![1, 2, 3],
        };
        let debug = format!("{doc:?}");
        assert!(debug.contains("size_bytes: 3"));
    }
}

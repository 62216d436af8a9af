//! Validation schemas for the intake, registration and appointment forms.
//!
//! A schema declares its fields (for rendering) and turns a submitted
//! `FormState` into a typed value, or into per-field error messages.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use super::catalog;
use super::field::{BoundField, FieldKind, FormField};
use super::state::FormState;
use super::escape_html;
use crate::models::{
    Appointment, AppointmentAction, AppointmentStatus, AppointmentUpdate, Gender, NewAppointment,
    NewIdentity, PatientRegistration,
};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+\d{10,15}$").unwrap());

/// Value format of `datetime-local` inputs.
pub const DATETIME_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Field name → first validation message for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Record a message; the first message per field wins.
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

pub trait FormSchema: Send + Sync {
    type Output: Send;

    /// Fields in display order.
    fn fields(&self) -> Vec<FormField>;

    fn validate(&self, state: &FormState) -> Result<Self::Output, FieldErrors>;
}

/// Accumulates errors while reading typed values out of a form.
struct Checker<'a> {
    state: &'a FormState,
    errors: FieldErrors,
}

impl<'a> Checker<'a> {
    fn new(state: &'a FormState) -> Self {
        Self {
            state,
            errors: FieldErrors::default(),
        }
    }

    fn fail<T>(&mut self, field: &str, message: &str) -> Option<T> {
        self.errors.insert(field, message);
        None
    }

    /// Trimmed text with a character-length range.
    fn text(
        &mut self,
        field: &str,
        min: usize,
        max: usize,
        min_message: &str,
        max_message: &str,
    ) -> Option<String> {
        let value = self.state.text(field).unwrap_or("");
        let len = value.chars().count();
        if len < min {
            return self.fail(field, min_message);
        }
        if len > max {
            return self.fail(field, max_message);
        }
        Some(value.to_string())
    }

    fn optional_text(&self, field: &str) -> Option<String> {
        self.state.text(field).map(str::to_string)
    }

    /// Like `text`, but a blank value is accepted as `None`.
    fn optional_bounded(
        &mut self,
        field: &str,
        max: usize,
        max_message: &str,
    ) -> Result<Option<String>, ()> {
        match self.state.text(field) {
            None => Ok(None),
            Some(value) if value.chars().count() > max => {
                self.errors.insert(field, max_message);
                Err(())
            }
            Some(value) => Ok(Some(value.to_string())),
        }
    }

    fn email(&mut self, field: &str) -> Option<String> {
        match self.state.text(field) {
            Some(value) if EMAIL_RE.is_match(value) => Some(value.to_string()),
            _ => self.fail(field, "Invalid email address"),
        }
    }

    fn phone(&mut self, field: &str) -> Option<String> {
        match self.state.text(field) {
            Some(value) if PHONE_RE.is_match(value) => Some(value.to_string()),
            _ => self.fail(field, "Invalid phone number"),
        }
    }

    fn date(&mut self, field: &str, message: &str) -> Option<NaiveDate> {
        match self
            .state
            .text(field)
            .and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
        {
            Some(date) => Some(date),
            None => self.fail(field, message),
        }
    }

    fn date_time(&mut self, field: &str, message: &str) -> Option<DateTime<Utc>> {
        match self.state.text(field).and_then(parse_date_time) {
            Some(at) => Some(at),
            None => self.fail(field, message),
        }
    }

    fn consent(&mut self, field: &str, message: &str) -> bool {
        if self.state.checked(field) {
            true
        } else {
            self.errors.insert(field, message);
            false
        }
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, FieldErrors> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(self.errors),
        }
    }
}

/// Parse a `datetime-local` value (interpreted as UTC) or an RFC 3339 time.
pub fn parse_date_time(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(at.with_timezone(&Utc));
    }
    [DATETIME_INPUT_FORMAT, "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn name_field(c: &mut Checker<'_>) -> Option<String> {
    c.text(
        "name",
        2,
        50,
        "Name must be at least 2 characters",
        "Name must be at most 50 characters",
    )
}

fn identity_fields() -> Vec<FormField> {
    vec![
        FormField::new(FieldKind::Input, "name")
            .label("Full name")
            .placeholder("John Doe")
            .icon("/assets/icons/user.svg", "user"),
        FormField::new(FieldKind::Input, "email")
            .label("Email")
            .placeholder("johndoe@gmail.com")
            .icon("/assets/icons/email.svg", "email"),
        FormField::new(FieldKind::PhoneInput, "phone")
            .label("Phone number")
            .placeholder("(555) 123-4567"),
    ]
}

/// Intake form: name, email and phone.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserForm;

impl FormSchema for UserForm {
    type Output = NewIdentity;

    fn fields(&self) -> Vec<FormField> {
        identity_fields()
    }

    fn validate(&self, state: &FormState) -> Result<NewIdentity, FieldErrors> {
        let mut c = Checker::new(state);
        let name = name_field(&mut c);
        let email = c.email("email");
        let phone = c.phone("phone");
        let value = match (name, email, phone) {
            (Some(name), Some(email), Some(phone)) => Some(NewIdentity { name, email, phone }),
            _ => None,
        };
        c.finish(value)
    }
}

fn gender_radios(field: BoundField<'_>) -> String {
    let mut html = String::from(r#"<div class="radio-group">"#);
    for option in catalog::GENDER_OPTIONS {
        let value = option.as_str();
        let checked = if field.value == value { " checked" } else { "" };
        let label = catalog::gender_label(*option);
        html.push_str(&format!(
            r#"<div class="radio-group-item"><input type="radio" id="{value}" name="{name}" value="{value}"{checked}><label for="{value}" class="cursor-pointer">{label}</label></div>"#,
            name = escape_html(field.name),
        ));
    }
    html.push_str("</div>");
    html
}

fn document_upload(field: BoundField<'_>) -> String {
    format!(
        r#"<label class="file-upload"><input type="file" name="{}" accept="image/*,application/pdf"><span><span class="text-green-500">Click to upload </span>or drag and drop</span><span>SVG, PNG, JPG or GIF (max. 800x400px)</span></label>"#,
        escape_html(field.name)
    )
}

/// Patient registration form, bound to the identity created at intake.
#[derive(Debug, Clone)]
pub struct PatientForm {
    pub user_id: String,
}

impl PatientForm {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
        }
    }

    /// Values shown on first render: identity details plus default gender.
    pub fn initial_state(name: &str, email: &str, phone: &str) -> FormState {
        FormState::new()
            .with("name", name)
            .with("email", email)
            .with("phone", phone)
            .with("gender", Gender::Male.as_str())
    }
}

impl FormSchema for PatientForm {
    type Output = PatientRegistration;

    fn fields(&self) -> Vec<FormField> {
        let mut fields = identity_fields();
        fields.extend([
            FormField::new(FieldKind::DatePicker, "birthDate").label("Date of birth"),
            FormField::new(FieldKind::Skeleton, "gender")
                .label("Gender")
                .render_skeleton(gender_radios),
            FormField::new(FieldKind::Input, "address")
                .label("Address")
                .placeholder("14 street, New york, NY - 5101"),
            FormField::new(FieldKind::Input, "occupation")
                .label("Occupation")
                .placeholder("Software Engineer"),
            FormField::new(FieldKind::Input, "emergencyContactName")
                .label("Emergency contact name")
                .placeholder("Guardian's name"),
            FormField::new(FieldKind::PhoneInput, "emergencyContactNumber")
                .label("Emergency contact number")
                .placeholder("(555) 123-4567"),
            FormField::new(FieldKind::Select, "primaryPhysician")
                .label("Primary care physician")
                .placeholder("Select a physician")
                .options(catalog::doctor_options()),
            FormField::new(FieldKind::Input, "insuranceProvider")
                .label("Insurance provider")
                .placeholder("BlueCross BlueShield"),
            FormField::new(FieldKind::Input, "insurancePolicyNumber")
                .label("Insurance policy number")
                .placeholder("ABC123456789"),
            FormField::new(FieldKind::Textarea, "allergies")
                .label("Allergies (if any)")
                .placeholder("Peanuts, Penicillin, Pollen"),
            FormField::new(FieldKind::Textarea, "currentMedication")
                .label("Current medications")
                .placeholder("Ibuprofen 200mg, Levothyroxine 50mcg"),
            FormField::new(FieldKind::Textarea, "familyMedicalHistory")
                .label("Family medical history (if relevant)")
                .placeholder("Mother had brain cancer, Father has hypertension"),
            FormField::new(FieldKind::Textarea, "pastMedicalHistory")
                .label("Past medical history")
                .placeholder("Appendectomy in 2015, Asthma diagnosis in childhood"),
            FormField::new(FieldKind::Select, "identificationType")
                .label("Identification type")
                .placeholder("Select identification type")
                .options(catalog::identification_type_options()),
            FormField::new(FieldKind::Input, "identificationNumber")
                .label("Identification number")
                .placeholder("123456789"),
            FormField::new(FieldKind::Skeleton, "identificationDocument")
                .label("Scanned copy of identification document")
                .render_skeleton(document_upload),
            FormField::new(FieldKind::Checkbox, "treatmentConsent")
                .label("I consent to receive treatment for my health condition."),
            FormField::new(FieldKind::Checkbox, "disclosureConsent").label(
                "I consent to the use and disclosure of my health information for treatment purposes.",
            ),
            FormField::new(FieldKind::Checkbox, "privacyConsent")
                .label("I acknowledge that I have reviewed and agree to the privacy policy"),
        ]);
        fields
    }

    fn validate(&self, state: &FormState) -> Result<PatientRegistration, FieldErrors> {
        let mut c = Checker::new(state);
        let name = name_field(&mut c);
        let email = c.email("email");
        let phone = c.phone("phone");
        let birth_date = c.date("birthDate", "Date of birth is required");
        let gender = match state.text("gender").and_then(|g| g.parse::<Gender>().ok()) {
            Some(gender) => Some(gender),
            None => c.fail("gender", "Select a gender"),
        };
        let address = c.text(
            "address",
            5,
            500,
            "Address must be at least 5 characters",
            "Address must be at most 500 characters",
        );
        let occupation = c.text(
            "occupation",
            2,
            500,
            "Occupation must be at least 2 characters",
            "Occupation must be at most 500 characters",
        );
        let emergency_contact_name = c.text(
            "emergencyContactName",
            2,
            50,
            "Contact name must be at least 2 characters",
            "Contact name must be at most 50 characters",
        );
        let emergency_contact_number = c.phone("emergencyContactNumber");
        let primary_physician = c.text(
            "primaryPhysician",
            2,
            usize::MAX,
            "Select at least one doctor",
            "",
        );
        let insurance_provider = c.text(
            "insuranceProvider",
            2,
            50,
            "Insurance name must be at least 2 characters",
            "Insurance name must be at most 50 characters",
        );
        let insurance_policy_number = c.text(
            "insurancePolicyNumber",
            2,
            50,
            "Policy number must be at least 2 characters",
            "Policy number must be at most 50 characters",
        );
        let treatment_consent = c.consent(
            "treatmentConsent",
            "You must consent to treatment in order to proceed",
        );
        let disclosure_consent = c.consent(
            "disclosureConsent",
            "You must consent to disclosure in order to proceed",
        );
        let privacy_consent =
            c.consent("privacyConsent", "You must consent to privacy in order to proceed");

        let value = (|| {
            Some(PatientRegistration {
                user_id: self.user_id.clone(),
                name: name?,
                email: email?,
                phone: phone?,
                birth_date: birth_date?,
                gender: gender?,
                address: address?,
                occupation: occupation?,
                emergency_contact_name: emergency_contact_name?,
                emergency_contact_number: emergency_contact_number?,
                primary_physician: primary_physician?,
                insurance_provider: insurance_provider?,
                insurance_policy_number: insurance_policy_number?,
                allergies: c.optional_text("allergies"),
                current_medication: c.optional_text("currentMedication"),
                family_medical_history: c.optional_text("familyMedicalHistory"),
                past_medical_history: c.optional_text("pastMedicalHistory"),
                identification_type: c.optional_text("identificationType"),
                identification_number: c.optional_text("identificationNumber"),
                treatment_consent,
                disclosure_consent,
                privacy_consent,
            })
        })();
        c.finish(value)
    }
}

/// Which appointment form is shown, with the record it acts on.
#[derive(Debug, Clone)]
pub enum AppointmentFormKind {
    Create { user_id: String, patient_id: String },
    Schedule(Appointment),
    Cancel(Appointment),
}

/// Validated appointment form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentSubmission {
    Create(NewAppointment),
    Update {
        appointment_id: String,
        user_id: String,
        action: AppointmentAction,
        update: AppointmentUpdate,
    },
}

#[derive(Debug, Clone)]
pub struct AppointmentForm {
    pub kind: AppointmentFormKind,
}

impl AppointmentForm {
    pub fn create(user_id: &str, patient_id: &str) -> Self {
        Self {
            kind: AppointmentFormKind::Create {
                user_id: user_id.to_string(),
                patient_id: patient_id.to_string(),
            },
        }
    }

    pub fn for_action(action: AppointmentAction, appointment: Appointment) -> Self {
        let kind = match action {
            AppointmentAction::Schedule => AppointmentFormKind::Schedule(appointment),
            AppointmentAction::Cancel => AppointmentFormKind::Cancel(appointment),
        };
        Self { kind }
    }

    pub fn appointment(&self) -> Option<&Appointment> {
        match &self.kind {
            AppointmentFormKind::Create { .. } => None,
            AppointmentFormKind::Schedule(a) | AppointmentFormKind::Cancel(a) => Some(a),
        }
    }

    /// Form values prefilled from the appointment being acted on.
    pub fn initial_state(&self) -> FormState {
        let Some(appointment) = self.appointment() else {
            return FormState::new();
        };
        let mut state = FormState::new()
            .with("primaryPhysician", appointment.primary_physician.as_str())
            .with(
                "schedule",
                appointment.schedule.format(DATETIME_INPUT_FORMAT).to_string(),
            );
        for (name, value) in [
            ("reason", &appointment.reason),
            ("note", &appointment.note),
            ("cancellationReason", &appointment.cancellation_reason),
        ] {
            if let Some(value) = value {
                state.set(name, value.as_str());
            }
        }
        state
    }

    /// Label of the submit button.
    pub fn submit_label(&self) -> &'static str {
        match self.kind {
            AppointmentFormKind::Create { .. } => "Submit Appointment",
            AppointmentFormKind::Schedule(_) => "Schedule Appointment",
            AppointmentFormKind::Cancel(_) => "Cancel Appointment",
        }
    }

    fn validate_schedule_fields(
        c: &mut Checker<'_>,
    ) -> (Option<String>, Option<DateTime<Utc>>) {
        let physician = c.text(
            "primaryPhysician",
            2,
            usize::MAX,
            "Select at least one doctor",
            "",
        );
        let schedule = c.date_time("schedule", "Select an appointment date and time");
        (physician, schedule)
    }
}

impl FormSchema for AppointmentForm {
    type Output = AppointmentSubmission;

    fn fields(&self) -> Vec<FormField> {
        if let AppointmentFormKind::Cancel(_) = self.kind {
            return vec![FormField::new(FieldKind::Textarea, "cancellationReason")
                .label("Reason for cancellation")
                .placeholder("Urgent meeting came up")];
        }
        let locked = matches!(self.kind, AppointmentFormKind::Schedule(_));
        vec![
            FormField::new(FieldKind::Select, "primaryPhysician")
                .label("Doctor")
                .placeholder("Select a doctor")
                .options(catalog::doctor_options()),
            FormField::new(FieldKind::DatePicker, "schedule")
                .label("Expected appointment date")
                .show_time_select(true)
                .date_format("MM/dd/yyyy - h:mm aa"),
            FormField::new(FieldKind::Textarea, "reason")
                .label("Appointment reason")
                .placeholder("Annual monthly check-up")
                .disabled(locked),
            FormField::new(FieldKind::Textarea, "note")
                .label("Comments/notes")
                .placeholder("Prefer afternoon appointments, if possible")
                .disabled(locked),
        ]
    }

    fn validate(&self, state: &FormState) -> Result<AppointmentSubmission, FieldErrors> {
        let mut c = Checker::new(state);
        let value = match &self.kind {
            AppointmentFormKind::Create {
                user_id,
                patient_id,
            } => {
                let (physician, schedule) = Self::validate_schedule_fields(&mut c);
                let reason = c.text(
                    "reason",
                    2,
                    500,
                    "Reason must be at least 2 characters",
                    "Reason must be at most 500 characters",
                );
                let note = c.optional_text("note");
                match (physician, schedule, reason) {
                    (Some(primary_physician), Some(schedule), Some(reason)) => {
                        Some(AppointmentSubmission::Create(NewAppointment {
                            user_id: user_id.clone(),
                            patient: patient_id.clone(),
                            primary_physician,
                            schedule,
                            reason,
                            note,
                            status: AppointmentStatus::Pending,
                        }))
                    }
                    _ => None,
                }
            }
            AppointmentFormKind::Schedule(appointment) => {
                let (physician, schedule) = Self::validate_schedule_fields(&mut c);
                match (physician, schedule) {
                    (Some(primary_physician), Some(schedule)) => {
                        Some(AppointmentSubmission::Update {
                            appointment_id: appointment.id.clone(),
                            user_id: appointment.user_id.clone(),
                            action: AppointmentAction::Schedule,
                            update: AppointmentUpdate {
                                primary_physician,
                                schedule,
                                status: AppointmentStatus::Scheduled,
                                cancellation_reason: None,
                            },
                        })
                    }
                    _ => None,
                }
            }
            AppointmentFormKind::Cancel(appointment) => {
                let reason = match c.optional_bounded(
                    "cancellationReason",
                    500,
                    "Reason must be at most 500 characters",
                ) {
                    Ok(Some(reason)) if reason.chars().count() >= 2 => Some(reason),
                    Ok(_) => c.fail("cancellationReason", "Reason must be at least 2 characters"),
                    Err(()) => None,
                };
                reason.map(|reason| AppointmentSubmission::Update {
                    appointment_id: appointment.id.clone(),
                    user_id: appointment.user_id.clone(),
                    action: AppointmentAction::Cancel,
                    update: AppointmentUpdate {
                        primary_physician: appointment.primary_physician.clone(),
                        schedule: appointment.schedule,
                        status: AppointmentStatus::Cancelled,
                        cancellation_reason: Some(reason),
                    },
                })
            }
        };
        c.finish(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appointment::sample_appointment;

    fn valid_user() -> FormState {
        FormState::new()
            .with("name", "Ada Lovelace")
            .with("email", "ada@example.com")
            .with("phone", "+15551234567")
    }

    fn valid_patient() -> FormState {
        let mut state = valid_user();
        for (k, v) in [
            ("birthDate", "1990-12-10"),
            ("gender", "female"),
            ("address", "12 Analytical Row"),
            ("occupation", "Mathematician"),
            ("emergencyContactName", "Charles"),
            ("emergencyContactNumber", "+15557654321"),
            ("primaryPhysician", "John Green"),
            ("insuranceProvider", "BlueCross"),
            ("insurancePolicyNumber", "ABC123"),
            ("treatmentConsent", "on"),
            ("disclosureConsent", "on"),
            ("privacyConsent", "on"),
        ] {
            state.set(k, v);
        }
        state
    }

    #[test]
    fn user_form_accepts_valid_input() {
        let identity = UserForm.validate(&valid_user()).unwrap();
        assert_eq!(identity.name, "Ada Lovelace");
        assert_eq!(identity.phone, "+15551234567");
    }

    #[test]
    fn user_form_reports_every_invalid_field() {
        let state = FormState::new()
            .with("name", "A")
            .with("email", "not-an-email")
            .with("phone", "5551234567");
        let errors = UserForm.validate(&state).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("name"), Some("Name must be at least 2 characters"));
        assert_eq!(errors.get("email"), Some("Invalid email address"));
        assert_eq!(errors.get("phone"), Some("Invalid phone number"));
    }

    #[test]
    fn name_longer_than_fifty_rejected() {
        let state = valid_user().with("name", "x".repeat(51));
        let errors = UserForm.validate(&state).unwrap_err();
        assert_eq!(errors.get("name"), Some("Name must be at most 50 characters"));
    }

    #[test]
    fn phone_length_bounds() {
        assert!(PHONE_RE.is_match("+1234567890"));
        assert!(PHONE_RE.is_match("+123456789012345"));
        assert!(!PHONE_RE.is_match("+123456789"));
        assert!(!PHONE_RE.is_match("+1234567890123456"));
    }

    #[test]
    fn patient_form_builds_registration() {
        let registration = PatientForm::new("user-1").validate(&valid_patient()).unwrap();
        assert_eq!(registration.user_id, "user-1");
        assert_eq!(registration.gender, Gender::Female);
        assert_eq!(registration.birth_date, NaiveDate::from_ymd_opt(1990, 12, 10).unwrap());
        assert_eq!(registration.allergies, None);
        assert!(registration.privacy_consent);
    }

    #[test]
    fn each_missing_consent_has_its_own_message() {
        let mut state = valid_patient();
        for consent in ["treatmentConsent", "disclosureConsent", "privacyConsent"] {
            state.set(consent, "");
        }
        let errors = PatientForm::new("u").validate(&state).unwrap_err();
        assert_eq!(
            errors.get("treatmentConsent"),
            Some("You must consent to treatment in order to proceed")
        );
        assert_eq!(
            errors.get("disclosureConsent"),
            Some("You must consent to disclosure in order to proceed")
        );
        assert_eq!(
            errors.get("privacyConsent"),
            Some("You must consent to privacy in order to proceed")
        );
    }

    #[test]
    fn patient_form_requires_physician_and_address() {
        let state = valid_patient()
            .with("primaryPhysician", "")
            .with("address", "abc");
        let errors = PatientForm::new("u").validate(&state).unwrap_err();
        assert_eq!(errors.get("primaryPhysician"), Some("Select at least one doctor"));
        assert_eq!(errors.get("address"), Some("Address must be at least 5 characters"));
    }

    #[test]
    fn patient_form_declares_all_field_kinds() {
        let fields = PatientForm::new("u").fields();
        let kinds: std::collections::HashSet<_> = fields.iter().map(|f| f.kind).collect();
        assert!(kinds.contains(&FieldKind::Skeleton));
        assert!(kinds.contains(&FieldKind::Checkbox));
        assert!(kinds.contains(&FieldKind::DatePicker));
        assert!(kinds.contains(&FieldKind::Select));
        assert!(kinds.contains(&FieldKind::Textarea));
        assert!(kinds.contains(&FieldKind::PhoneInput));
    }

    #[test]
    fn create_appointment_form_yields_pending_request() {
        let form = AppointmentForm::create("user-1", "patient-1");
        let state = FormState::new()
            .with("primaryPhysician", "Leila Cameron")
            .with("schedule", "2030-01-15T09:30")
            .with("reason", "Annual check-up");
        let AppointmentSubmission::Create(new) = form.validate(&state).unwrap() else {
            panic!("expected create submission");
        };
        assert_eq!(new.status, AppointmentStatus::Pending);
        assert_eq!(new.patient, "patient-1");
        assert_eq!(new.schedule.to_rfc3339(), "2030-01-15T09:30:00+00:00");
        assert_eq!(new.note, None);
    }

    #[test]
    fn create_appointment_requires_reason_and_schedule() {
        let form = AppointmentForm::create("u", "p");
        let state = FormState::new().with("primaryPhysician", "Leila Cameron");
        let errors = form.validate(&state).unwrap_err();
        assert_eq!(errors.get("reason"), Some("Reason must be at least 2 characters"));
        assert!(errors.get("schedule").is_some());
    }

    #[test]
    fn schedule_form_ignores_missing_reason() {
        let appointment = sample_appointment("a1", AppointmentStatus::Pending);
        let form = AppointmentForm::for_action(AppointmentAction::Schedule, appointment);
        let state = form.initial_state().with("reason", "");
        match form.validate(&state).unwrap() {
            AppointmentSubmission::Update {
                appointment_id,
                action,
                update,
                ..
            } => {
                assert_eq!(appointment_id, "a1");
                assert_eq!(action, AppointmentAction::Schedule);
                assert_eq!(update.status, AppointmentStatus::Scheduled);
                assert_eq!(update.primary_physician, "John Green");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn cancel_form_requires_reason() {
        let appointment = sample_appointment("a1", AppointmentStatus::Scheduled);
        let form = AppointmentForm::for_action(AppointmentAction::Cancel, appointment.clone());
        let errors = form.validate(&FormState::new()).unwrap_err();
        assert_eq!(
            errors.get("cancellationReason"),
            Some("Reason must be at least 2 characters")
        );

        let state = FormState::new().with("cancellationReason", "Urgent meeting came up");
        let AppointmentSubmission::Update { update, .. } = form.validate(&state).unwrap() else {
            panic!("expected update");
        };
        assert_eq!(update.status, AppointmentStatus::Cancelled);
        assert_eq!(update.schedule, appointment.schedule);
        assert_eq!(update.cancellation_reason.as_deref(), Some("Urgent meeting came up"));
    }

    #[test]
    fn cancel_form_shows_only_reason_field() {
        let form = AppointmentForm::for_action(
            AppointmentAction::Cancel,
            sample_appointment("a1", AppointmentStatus::Pending),
        );
        let fields = form.fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "cancellationReason");
    }

    #[test]
    fn initial_state_prefills_schedule_for_datetime_input() {
        let form = AppointmentForm::for_action(
            AppointmentAction::Schedule,
            sample_appointment("a1", AppointmentStatus::Pending),
        );
        let state = form.initial_state();
        assert_eq!(state.value("schedule"), "2030-01-15T09:30");
        assert_eq!(state.value("reason"), "Annual check-up");
    }

    #[test]
    fn parses_rfc3339_and_local_inputs() {
        assert!(parse_date_time("2030-01-15T09:30").is_some());
        assert!(parse_date_time("2030-01-15T09:30:00Z").is_some());
        assert!(parse_date_time("15/01/2030").is_none());
    }
}

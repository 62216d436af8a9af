//! Server-side forms: field rendering, submitted values, validation
//! schemas, and the submission state machine.

pub mod catalog;
pub mod controller;
pub mod field;
pub mod schema;
pub mod state;

pub use controller::{FormController, FormStatus, SubmissionFlags, SubmitOutcome};
pub use field::{FieldKind, FormField, Icon, SelectOption};
pub use schema::{
    AppointmentForm, AppointmentFormKind, AppointmentSubmission, FieldErrors, FormSchema,
    PatientForm, UserForm,
};
pub use state::FormState;

/// Escape text for HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_and_quotes() {
        assert_eq!(
            escape_html(r#"<b a="1">Tom & 'Jerry'</b>"#),
            "&lt;b a=&quot;1&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }
}

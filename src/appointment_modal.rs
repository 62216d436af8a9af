//! Schedule/cancel dialog shown next to each appointment on the admin page.

use crate::admin_gate::ADMIN_PATH;
use crate::forms::schema::AppointmentForm;
use crate::forms::{escape_html, FieldErrors, FormSchema, FormState};
use crate::models::{Appointment, AppointmentAction, AppointmentStatus};

/// How the dialog trigger button is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriggerState {
    pub disabled: bool,
    pub muted: bool,
}

/// Cancelling a cancelled appointment is disabled. Repeating the current
/// status (schedule on scheduled, cancel on cancelled) is muted.
pub fn trigger_state(action: AppointmentAction, status: AppointmentStatus) -> TriggerState {
    let is_cancelled =
        action == AppointmentAction::Cancel && status == AppointmentStatus::Cancelled;
    let is_scheduled =
        action == AppointmentAction::Schedule && status == AppointmentStatus::Scheduled;
    TriggerState {
        disabled: is_cancelled,
        muted: is_cancelled || is_scheduled,
    }
}

fn capitalized(action: AppointmentAction) -> &'static str {
    match action {
        AppointmentAction::Schedule => "Schedule",
        AppointmentAction::Cancel => "Cancel",
    }
}

pub fn title(action: AppointmentAction) -> String {
    format!("{} Appointment", capitalized(action))
}

pub fn description(action: AppointmentAction) -> String {
    format!("Please fill in the following details to {action} appointment")
}

/// Form target for an admin action on one appointment.
pub fn action_path(appointment_id: &str, action: AppointmentAction) -> String {
    format!("{ADMIN_PATH}/appointments/{}/{action}", escape_html(appointment_id))
}

pub struct AppointmentModal<'a> {
    pub appointment: &'a Appointment,
    pub action: AppointmentAction,
}

impl<'a> AppointmentModal<'a> {
    pub fn new(appointment: &'a Appointment, action: AppointmentAction) -> Self {
        Self {
            appointment,
            action,
        }
    }

    pub fn trigger(&self) -> TriggerState {
        trigger_state(self.action, self.appointment.status)
    }

    /// Render trigger and dialog. `submitted` holds the rejected values
    /// when re-rendering after a failed submit; the dialog is then open.
    pub fn render(&self, submitted: Option<(&FormState, &FieldErrors)>) -> String {
        let trigger = self.trigger();
        let mut classes = String::from("shad-ghost-btn capitalize");
        if self.action == AppointmentAction::Schedule {
            classes.push_str(" text-green-500");
        }
        if trigger.muted {
            classes.push_str(" cursor-not-allowed opacity-50");
        }

        if trigger.disabled {
            return format!(
                r#"<button type="button" class="{classes}" disabled>{}</button>"#,
                self.action
            );
        }

        let form = AppointmentForm::for_action(self.action, self.appointment.clone());
        let initial = form.initial_state();
        let empty = FieldErrors::default();
        let (state, errors, open) = match submitted {
            Some((state, errors)) => (state, errors, " open"),
            None => (&initial, &empty, ""),
        };
        let fields: String = form
            .fields()
            .iter()
            .map(|field| field.render(state, errors))
            .collect();
        let submit_class = match self.action {
            AppointmentAction::Schedule => "shad-primary-btn",
            AppointmentAction::Cancel => "shad-danger-btn",
        };

        format!(
            r#"<details class="shad-dialog"{open}>
<summary class="{classes}">{action}</summary>
<div class="dialog-content">
<h3 class="capitalize">{title}</h3>
<p>{description}</p>
<form method="post" action="{path}" class="space-y-6">
{fields}
<button type="submit" class="{submit_class} w-full">{submit}</button>
</form>
</div>
</details>"#,
            action = self.action,
            title = title(self.action),
            description = description(self.action),
            path = action_path(&self.appointment.id, self.action),
            submit = form.submit_label(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::appointment::sample_appointment;

    #[test]
    fn trigger_rules() {
        use AppointmentAction::*;
        use AppointmentStatus::*;

        assert_eq!(trigger_state(Cancel, Cancelled), TriggerState { disabled: true, muted: true });
        assert_eq!(trigger_state(Schedule, Scheduled), TriggerState { disabled: false, muted: true });
        assert_eq!(trigger_state(Schedule, Pending), TriggerState::default());
        assert_eq!(trigger_state(Cancel, Scheduled), TriggerState::default());
        assert_eq!(trigger_state(Schedule, Cancelled), TriggerState::default());
    }

    #[test]
    fn title_and_description_follow_action() {
        assert_eq!(title(AppointmentAction::Schedule), "Schedule Appointment");
        assert_eq!(
            description(AppointmentAction::Cancel),
            "Please fill in the following details to cancel appointment"
        );
    }

    #[test]
    fn disabled_trigger_has_no_form() {
        let appointment = sample_appointment("a1", AppointmentStatus::Cancelled);
        let html = AppointmentModal::new(&appointment, AppointmentAction::Cancel).render(None);
        assert!(html.contains("disabled"));
        assert!(!html.contains("<form"));
    }

    #[test]
    fn schedule_dialog_posts_to_admin_action() {
        let appointment = sample_appointment("a1", AppointmentStatus::Pending);
        let html = AppointmentModal::new(&appointment, AppointmentAction::Schedule).render(None);
        assert!(html.contains(r#"action="/admin/appointments/a1/schedule""#));
        assert!(html.contains("Schedule Appointment"));
        assert!(html.contains(r#"value="2030-01-15T09:30""#));
        assert!(!html.contains("<details class=\"shad-dialog\" open>"));
    }

    #[test]
    fn rejected_submit_reopens_with_errors() {
        let appointment = sample_appointment("a1", AppointmentStatus::Pending);
        let state = FormState::new();
        let mut errors = FieldErrors::default();
        errors.insert("cancellationReason", "Reason must be at least 2 characters");
        let html = AppointmentModal::new(&appointment, AppointmentAction::Cancel)
            .render(Some((&state, &errors)));
        assert!(html.contains("<details class=\"shad-dialog\" open>"));
        assert!(html.contains("Reason must be at least 2 characters"));
    }
}

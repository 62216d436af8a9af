//! Server-rendered HTML pages.

use std::fmt::Write as _;

use crate::actions::format_date_time;
use crate::appointment_modal::AppointmentModal;
use crate::config::{ADMIN_PASSKEY_LEN, APP_NAME};
use crate::forms::catalog::find_doctor;
use crate::forms::{escape_html, FieldErrors, FormSchema, FormState};
use crate::models::{Appointment, AppointmentAction, AppointmentStatus, AppointmentSummary};

/// Banner shown when a submit reached the backend and failed.
pub const SUBMIT_FAILED_MESSAGE: &str = "Something went wrong. Please try again.";

/// A rejected admin action to re-open on the dashboard.
pub struct RejectedAction<'a> {
    pub appointment_id: &'a str,
    pub action: AppointmentAction,
    pub state: &'a FormState,
    pub errors: &'a FieldErrors,
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title} | {APP_NAME}</title>
<style>
*,*::before,*::after{{box-sizing:border-box}}
body{{margin:0;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:#131619;color:#fff;min-height:100vh}}
.container{{max-width:860px;margin:0 auto;padding:40px 24px}}
.logo{{font-weight:700;font-size:1.25rem;color:#24ae7c;margin-bottom:40px;display:block;text-decoration:none}}
h1{{font-size:2rem;margin:0 0 8px}}
.sub{{color:#abb8c4;margin:0 0 32px}}
.form-item{{margin-bottom:20px}}
.shad-input-label{{display:block;font-size:.85rem;color:#abb8c4;margin-bottom:6px}}
.shad-input,.shad-textArea,.shad-select-trigger,.input-phone,.date-picker{{width:100%;padding:12px;border-radius:8px;border:1px solid #363a3d;background:#1a1d21;color:#fff}}
.input-group{{display:flex;align-items:center;gap:8px;border:1px solid #363a3d;border-radius:8px;background:#1a1d21}}
.input-group input{{border:none}}
.radio-group{{display:flex;gap:12px}}
.radio-group-item{{flex:1;border:1px dashed #363a3d;border-radius:8px;padding:10px}}
.shad-error{{color:#f37877;font-size:.8rem;margin:6px 0 0}}
.banner{{background:#3e1716;border:1px solid #f37877;color:#f37877;padding:12px;border-radius:8px;margin-bottom:24px}}
.shad-primary-btn,.shad-danger-btn{{display:block;width:100%;padding:14px;border:none;border-radius:8px;font-weight:600;color:#fff;cursor:pointer}}
.shad-primary-btn{{background:#24ae7c}}
.shad-danger-btn{{background:#f24e43}}
.shad-ghost-btn{{background:none;border:none;color:#fff;cursor:pointer;list-style:none}}
.text-green-500{{color:#24ae7c}}
.opacity-50{{opacity:.5}}
.cursor-not-allowed{{cursor:not-allowed}}
.capitalize{{text-transform:capitalize}}
.stats{{display:flex;gap:16px;margin-bottom:32px}}
.stat-card{{flex:1;background:#1a1d21;border-radius:12px;padding:20px}}
.stat-card strong{{font-size:2rem;display:block}}
table{{width:100%;border-collapse:collapse}}
th,td{{text-align:left;padding:12px;border-bottom:1px solid #363a3d;vertical-align:top}}
.status-badge{{padding:4px 10px;border-radius:999px;font-size:.75rem;font-weight:600}}
.status-scheduled{{background:#0d2a1f;color:#24ae7c}}
.status-pending{{background:#152432;color:#79b5ec}}
.status-cancelled{{background:#3e1716;color:#f37877}}
.shad-dialog{{display:inline-block}}
.dialog-content{{background:#1a1d21;border-radius:12px;padding:20px;margin-top:8px;min-width:320px}}
.overlay{{position:fixed;inset:0;background:rgba(0,0,0,.7);display:flex;align-items:center;justify-content:center}}
.modal{{background:#1a1d21;border-radius:12px;padding:32px;max-width:420px;width:100%}}
.modal-header{{display:flex;justify-content:space-between;align-items:center}}
.modal-header a{{color:#abb8c4;text-decoration:none}}
.doctor{{display:flex;align-items:center;gap:8px}}
.doctor img{{width:32px;height:32px;border-radius:50%}}
.copyright{{color:#76828d;font-size:.8rem;margin-top:40px}}
</style>
</head>
<body>
<div class="container">
<a href="/" class="logo">{APP_NAME}</a>
{body}
<p class="copyright">&copy; 2024 {APP_NAME}</p>
</div>
</body>
</html>"#,
        title = escape_html(title),
    )
}

fn banner(message: Option<&str>) -> String {
    message
        .map(|m| format!(r#"<div class="banner" role="alert">{}</div>"#, escape_html(m)))
        .unwrap_or_default()
}

/// All fields of a schema inside one form element.
fn render_form<S: FormSchema>(
    schema: &S,
    action: &str,
    state: &FormState,
    errors: &FieldErrors,
    submit_label: &str,
    multipart: bool,
) -> String {
    let enctype = if multipart {
        r#" enctype="multipart/form-data""#
    } else {
        ""
    };
    let mut html = format!(
        r#"<form method="post" action="{}"{enctype} class="space-y-6">"#,
        escape_html(action)
    );
    for field in schema.fields() {
        html.push_str(&field.render(state, errors));
    }
    let _ = write!(
        html,
        r#"<button type="submit" class="shad-primary-btn">{}</button></form>"#,
        escape_html(submit_label)
    );
    html
}

fn passkey_modal(error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<p class="shad-error">{}</p>"#, escape_html(e)))
        .unwrap_or_default();
    format!(
        r#"<div class="overlay">
<div class="modal">
<div class="modal-header"><h2>Admin Access Verification</h2><a href="/admin/close" aria-label="Close">&times;</a></div>
<p class="sub">To access the admin page, please enter the passkey.</p>
<form method="post" action="/admin/passkey">
<input type="password" name="passkey" inputmode="numeric" maxlength="{ADMIN_PASSKEY_LEN}" minlength="{ADMIN_PASSKEY_LEN}" autocomplete="off" class="shad-input" autofocus>
{error}
<button type="submit" class="shad-primary-btn" style="margin-top:16px">Enter Admin Passkey</button>
</form>
</div>
</div>"#
    )
}

/// Passkey prompt overlay state on the intake page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasskeyPrompt<'a> {
    Hidden,
    Shown,
    Rejected(&'a str),
}

pub fn intake_page<S: FormSchema>(
    schema: &S,
    state: &FormState,
    errors: &FieldErrors,
    failure: Option<&str>,
    prompt: PasskeyPrompt<'_>,
) -> String {
    let overlay = match prompt {
        PasskeyPrompt::Hidden => String::new(),
        PasskeyPrompt::Shown => passkey_modal(None),
        PasskeyPrompt::Rejected(message) => passkey_modal(Some(message)),
    };
    let body = format!(
        r#"<section>
<h1>Hi there 👋</h1>
<p class="sub">Get started with appointments.</p>
{banner}
{form}
<p><a href="/?admin=true" class="text-green-500">Admin</a></p>
</section>
{overlay}"#,
        banner = banner(failure),
        form = render_form(schema, "/", state, errors, "Get Started", false),
    );
    layout("Get Started", &body)
}

pub fn register_page<S: FormSchema>(
    schema: &S,
    user_id: &str,
    state: &FormState,
    errors: &FieldErrors,
    failure: Option<&str>,
) -> String {
    let action = format!("/patients/{user_id}/register");
    let body = format!(
        r#"<section>
<h1>Welcome 👋</h1>
<p class="sub">Let us know more about yourself.</p>
{banner}
{form}
</section>"#,
        banner = banner(failure),
        form = render_form(schema, &action, state, errors, "Submit and Continue", true),
    );
    layout("Register", &body)
}

pub fn new_appointment_page<S: FormSchema>(
    schema: &S,
    user_id: &str,
    state: &FormState,
    errors: &FieldErrors,
    failure: Option<&str>,
) -> String {
    let action = format!("/patients/{user_id}/new-appointment");
    let body = format!(
        r#"<section>
<h1>New Appointment</h1>
<p class="sub">Request a new appointment in 10 seconds.</p>
{banner}
{form}
</section>"#,
        banner = banner(failure),
        form = render_form(schema, &action, state, errors, "Submit Appointment", false),
    );
    layout("New Appointment", &body)
}

fn doctor_badge(name: &str) -> String {
    let image = find_doctor(name)
        .map(|d| format!(r#"<img src="{}" alt="doctor">"#, d.image))
        .unwrap_or_default();
    format!(
        r#"<span class="doctor">{image}<span>Dr. {}</span></span>"#,
        escape_html(name)
    )
}

pub fn appointment_success_page(user_id: &str, appointment: &Appointment) -> String {
    let body = format!(
        r#"<section class="success">
<h1>Your <span class="text-green-500">appointment request</span> has been successfully submitted!</h1>
<p class="sub">We'll be in touch shortly to confirm.</p>
<div class="request-details">
<p>Requested appointment details:</p>
{doctor}
<p>{when}</p>
</div>
<a href="/patients/{user_id}/new-appointment" class="shad-primary-btn" style="text-align:center;text-decoration:none">New Appointment</a>
</section>"#,
        doctor = doctor_badge(&appointment.primary_physician),
        when = escape_html(&format_date_time(&appointment.schedule)),
        user_id = escape_html(user_id),
    );
    layout("Success", &body)
}

fn status_badge(status: AppointmentStatus) -> String {
    let label = match status {
        AppointmentStatus::Scheduled => "Scheduled",
        AppointmentStatus::Pending => "Pending",
        AppointmentStatus::Cancelled => "Cancelled",
    };
    format!(r#"<span class="status-badge status-{status}">{label}</span>"#)
}

pub fn admin_page(
    summary: &AppointmentSummary,
    rejected: Option<&RejectedAction<'_>>,
    failure: Option<&str>,
) -> String {
    let mut rows = String::new();
    for (index, appointment) in summary.documents.iter().enumerate() {
        let mut actions = String::new();
        for action in AppointmentAction::ALL {
            let submitted = rejected
                .filter(|r| r.appointment_id == appointment.id && r.action == *action)
                .map(|r| (r.state, r.errors));
            actions.push_str(&AppointmentModal::new(appointment, *action).render(submitted));
        }
        let _ = write!(
            rows,
            r#"<tr><td>{n}</td><td>{patient}</td><td>{status}</td><td>{when}</td><td>{doctor}</td><td>{actions}</td></tr>"#,
            n = index + 1,
            patient = escape_html(&appointment.patient),
            status = status_badge(appointment.status),
            when = escape_html(&format_date_time(&appointment.schedule)),
            doctor = doctor_badge(&appointment.primary_physician),
        );
    }
    if summary.documents.is_empty() {
        rows.push_str(r#"<tr><td colspan="6">No results.</td></tr>"#);
    }

    let body = format!(
        r#"<section>
<h1>Welcome 👋</h1>
<p class="sub">Start the day with managing new appointments</p>
{banner}
<div class="stats">
<div class="stat-card"><strong>{scheduled}</strong>Total number of scheduled appointments</div>
<div class="stat-card"><strong>{pending}</strong>Total number of pending appointments</div>
<div class="stat-card"><strong>{cancelled}</strong>Total number of cancelled appointments</div>
</div>
<table>
<thead><tr><th>#</th><th>Patient</th><th>Status</th><th>Appointment</th><th>Doctor</th><th>Actions</th></tr></thead>
<tbody>{rows}</tbody>
</table>
</section>"#,
        banner = banner(failure),
        scheduled = summary.scheduled_count,
        pending = summary.pending_count,
        cancelled = summary.cancelled_count,
    );
    layout("Admin", &body)
}

pub fn error_page(title: &str, message: &str) -> String {
    let body = format!(
        r#"<section><h1>{}</h1><p class="sub">{}</p><p><a href="/" class="text-green-500">Back to start</a></p></section>"#,
        escape_html(title),
        escape_html(message)
    );
    layout(title, &body)
}

//! Field renderer: one HTML control per field kind.
//!
//! The kind set is closed; `render` matches it exhaustively, so adding a
//! kind without a renderer is a compile error. Each control is bound to the
//! field's current value in `FormState` and followed by its error message.

use std::fmt::Write as _;
use std::sync::Arc;

use super::escape_html;
use super::schema::FieldErrors;
use super::state::FormState;

const DEFAULT_DATE_FORMAT: &str = "MM/dd/yyyy";
const CALENDAR_ICON: &str = "/assets/icons/calendar.svg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Input,
    Textarea,
    PhoneInput,
    Checkbox,
    DatePicker,
    Select,
    Skeleton,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Textarea => "textarea",
            Self::PhoneInput => "phoneInput",
            Self::Checkbox => "checkbox",
            Self::DatePicker => "datePicker",
            Self::Select => "select",
            Self::Skeleton => "skeleton",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown field kind: '{0}'")]
pub struct UnknownFieldKind(pub String);

impl std::str::FromStr for FieldKind {
    type Err = UnknownFieldKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(Self::Input),
            "textarea" => Ok(Self::Textarea),
            "phoneInput" => Ok(Self::PhoneInput),
            "checkbox" => Ok(Self::Checkbox),
            "datePicker" => Ok(Self::DatePicker),
            "select" => Ok(Self::Select),
            "skeleton" => Ok(Self::Skeleton),
            other => Err(UnknownFieldKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub src: String,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub image: Option<String>,
}

impl SelectOption {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            image: None,
        }
    }
}

/// Field passed to a custom renderer: its name and current value.
#[derive(Debug, Clone, Copy)]
pub struct BoundField<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

pub type SkeletonRenderer = Arc<dyn Fn(BoundField<'_>) -> String + Send + Sync>;

/// Declaration of one form field and its presentation options.
#[derive(Clone)]
pub struct FormField {
    pub kind: FieldKind,
    pub name: String,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub icon: Option<Icon>,
    pub disabled: bool,
    pub date_format: Option<String>,
    pub show_time_select: bool,
    pub options: Vec<SelectOption>,
    pub render_skeleton: Option<SkeletonRenderer>,
}

impl std::fmt::Debug for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormField")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl FormField {
    pub fn new(kind: FieldKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            label: None,
            placeholder: None,
            icon: None,
            disabled: false,
            date_format: None,
            show_time_select: false,
            options: Vec::new(),
            render_skeleton: None,
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn icon(mut self, src: &str, alt: &str) -> Self {
        self.icon = Some(Icon {
            src: src.to_string(),
            alt: Some(alt.to_string()),
        });
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn date_format(mut self, format: &str) -> Self {
        self.date_format = Some(format.to_string());
        self
    }

    pub fn show_time_select(mut self, show: bool) -> Self {
        self.show_time_select = show;
        self
    }

    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn render_skeleton<F>(mut self, render: F) -> Self
    where
        F: Fn(BoundField<'_>) -> String + Send + Sync + 'static,
    {
        self.render_skeleton = Some(Arc::new(render));
        self
    }

    /// Render the labelled control plus its error message.
    pub fn render(&self, state: &FormState, errors: &FieldErrors) -> String {
        let mut html = String::from(r#"<div class="form-item">"#);

        if self.kind != FieldKind::Checkbox {
            if let Some(label) = &self.label {
                let _ = write!(
                    html,
                    r#"<label class="shad-input-label" for="{}">{}</label>"#,
                    escape_html(&self.name),
                    escape_html(label)
                );
            }
        }

        html.push_str(&self.render_control(state.value(&self.name)));

        if let Some(message) = errors.get(&self.name) {
            let _ = write!(html, r#"<p class="shad-error">{}</p>"#, escape_html(message));
        }
        html.push_str("</div>");
        html
    }

    fn render_control(&self, value: &str) -> String {
        let name = escape_html(&self.name);
        let value_attr = escape_html(value);
        let placeholder = escape_html(self.placeholder.as_deref().unwrap_or(""));
        let disabled = if self.disabled { " disabled" } else { "" };

        match self.kind {
            FieldKind::Input => {
                let icon = self
                    .icon
                    .as_ref()
                    .map(|icon| {
                        format!(
                            r#"<img src="{}" height="24" width="24" alt="{}" class="ml-2">"#,
                            escape_html(&icon.src),
                            escape_html(icon.alt.as_deref().unwrap_or("icon"))
                        )
                    })
                    .unwrap_or_default();
                format!(
                    r#"<div class="input-group">{icon}<input type="text" id="{name}" name="{name}" value="{value_attr}" placeholder="{placeholder}" class="shad-input"{disabled}></div>"#
                )
            }
            FieldKind::Textarea => format!(
                r#"<textarea id="{name}" name="{name}" placeholder="{placeholder}" class="shad-textArea"{disabled}>{value_attr}</textarea>"#
            ),
            FieldKind::PhoneInput => format!(
                r#"<input type="tel" id="{name}" name="{name}" value="{value_attr}" placeholder="{placeholder}" data-default-country="US" pattern="\+[0-9]{{10,15}}" class="input-phone"{disabled}>"#
            ),
            FieldKind::Checkbox => {
                let checked = if matches!(value, "on" | "true" | "1") {
                    " checked"
                } else {
                    ""
                };
                format!(
                    r#"<div class="checkbox-group"><input type="checkbox" id="{name}" name="{name}"{checked}{disabled}><label for="{name}" class="checkbox-label">{}</label></div>"#,
                    escape_html(self.label.as_deref().unwrap_or(""))
                )
            }
            FieldKind::DatePicker => {
                let input_type = if self.show_time_select {
                    "datetime-local"
                } else {
                    "date"
                };
                let format = escape_html(self.date_format.as_deref().unwrap_or(DEFAULT_DATE_FORMAT));
                format!(
                    r#"<div class="input-group"><img src="{CALENDAR_ICON}" height="24" width="24" alt="calendar" class="ml-2"><input type="{input_type}" id="{name}" name="{name}" value="{value_attr}" data-date-format="{format}" class="date-picker"{disabled}></div>"#
                )
            }
            FieldKind::Select => {
                let mut html = format!(
                    r#"<select id="{name}" name="{name}" class="shad-select-trigger"{disabled}><option value="">{placeholder}</option>"#
                );
                for option in &self.options {
                    let selected = if option.value == value { " selected" } else { "" };
                    let image = option
                        .image
                        .as_ref()
                        .map(|src| format!(r#" data-image="{}""#, escape_html(src)))
                        .unwrap_or_default();
                    let _ = write!(
                        html,
                        r#"<option value="{}"{image}{selected}>{}</option>"#,
                        escape_html(&option.value),
                        escape_html(&option.label)
                    );
                }
                html.push_str("</select>");
                html
            }
            FieldKind::Skeleton => self
                .render_skeleton
                .as_ref()
                .map(|render| {
                    render(BoundField {
                        name: &self.name,
                        value,
                    })
                })
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn no_errors() -> FieldErrors {
        FieldErrors::default()
    }

    #[test]
    fn parses_known_kinds_and_rejects_unknown() {
        for kind in [
            FieldKind::Input,
            FieldKind::Textarea,
            FieldKind::PhoneInput,
            FieldKind::Checkbox,
            FieldKind::DatePicker,
            FieldKind::Select,
            FieldKind::Skeleton,
        ] {
            assert_eq!(FieldKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(FieldKind::from_str("slider").is_err());
    }

    #[test]
    fn input_renders_icon_label_and_bound_value() {
        let field = FormField::new(FieldKind::Input, "name")
            .label("Full name")
            .placeholder("John Doe")
            .icon("/assets/icons/user.svg", "user");
        let state = FormState::new().with("name", "Ada");
        let html = field.render(&state, &no_errors());

        assert!(html.contains(r#"<label class="shad-input-label" for="name">Full name</label>"#));
        assert!(html.contains(r#"alt="user""#));
        assert!(html.contains(r#"value="Ada""#));
        assert!(html.contains(r#"placeholder="John Doe""#));
    }

    #[test]
    fn icon_alt_defaults_to_icon() {
        let mut field = FormField::new(FieldKind::Input, "email");
        field.icon = Some(Icon {
            src: "/e.svg".into(),
            alt: None,
        });
        let html = field.render(&FormState::new(), &no_errors());
        assert!(html.contains(r#"alt="icon""#));
    }

    #[test]
    fn textarea_honours_disabled() {
        let field = FormField::new(FieldKind::Textarea, "note").disabled(true);
        let html = field.render(&FormState::new().with("note", "hi"), &no_errors());
        assert!(html.contains("disabled>hi</textarea>"));
    }

    #[test]
    fn phone_input_is_tel() {
        let field = FormField::new(FieldKind::PhoneInput, "phone").placeholder("(555) 123-4567");
        let html = field.render(&FormState::new(), &no_errors());
        assert!(html.contains(r#"type="tel""#));
        assert!(html.contains(r#"data-default-country="US""#));
    }

    #[test]
    fn checkbox_has_inline_label_only() {
        let field = FormField::new(FieldKind::Checkbox, "treatmentConsent").label("I consent");
        let html = field.render(&FormState::new().with("treatmentConsent", "on"), &no_errors());
        assert!(!html.contains("shad-input-label"));
        assert!(html.contains(r#"class="checkbox-label">I consent</label>"#));
        assert!(html.contains(" checked"));
    }

    #[test]
    fn date_picker_defaults_and_time_select() {
        let date = FormField::new(FieldKind::DatePicker, "birthDate");
        let html = date.render(&FormState::new(), &no_errors());
        assert!(html.contains(r#"type="date""#));
        assert!(html.contains(r#"data-date-format="MM/dd/yyyy""#));

        let schedule = FormField::new(FieldKind::DatePicker, "schedule")
            .show_time_select(true)
            .date_format("MM/dd/yyyy - h:mm aa");
        let html = schedule.render(&FormState::new(), &no_errors());
        assert!(html.contains(r#"type="datetime-local""#));
        assert!(html.contains("h:mm aa"));
    }

    #[test]
    fn select_marks_current_value() {
        let field = FormField::new(FieldKind::Select, "gender")
            .placeholder("Select")
            .options(vec![
                SelectOption::new("male", "Male"),
                SelectOption::new("female", "Female"),
            ]);
        let html = field.render(&FormState::new().with("gender", "female"), &no_errors());
        assert!(html.contains(r#"<option value="female" selected>Female</option>"#));
        assert!(html.contains(r#"<option value="male">Male</option>"#));
    }

    #[test]
    fn skeleton_uses_callback_or_renders_nothing() {
        let field = FormField::new(FieldKind::Skeleton, "gender")
            .render_skeleton(|f| format!("<span>{}={}</span>", f.name, f.value));
        let html = field.render(&FormState::new().with("gender", "other"), &no_errors());
        assert!(html.contains("<span>gender=other</span>"));

        let bare = FormField::new(FieldKind::Skeleton, "gender");
        assert_eq!(
            bare.render(&FormState::new(), &no_errors()),
            r#"<div class="form-item"></div>"#
        );
    }

    #[test]
    fn error_message_rendered_and_values_escaped() {
        let field = FormField::new(FieldKind::Input, "name");
        let mut errors = FieldErrors::default();
        errors.insert("name", "Name must be at least 2 characters");
        let html = field.render(&FormState::new().with("name", "<x>"), &errors);
        assert!(html.contains(r#"value="&lt;x&gt;""#));
        assert!(html.contains(r#"<p class="shad-error">Name must be at least 2 characters</p>"#));
    }
}

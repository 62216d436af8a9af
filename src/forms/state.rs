use std::collections::BTreeMap;

/// Current values of one form, keyed by field name.
///
/// Values are kept as submitted (HTML form encoding); checkboxes are
/// present with `on`/`true` when checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: BTreeMap<String, String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Raw value, empty when the field was not submitted.
    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    /// Trimmed value, `None` when blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        Some(self.value(name).trim()).filter(|v| !v.is_empty())
    }

    pub fn checked(&self, name: &str) -> bool {
        matches!(self.value(name), "on" | "true" | "1")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_read_as_none() {
        let state = FormState::new().with("name", "   ");
        assert_eq!(state.text("name"), None);
        assert_eq!(state.value("missing"), "");
    }

    #[test]
    fn checkbox_values() {
        let state: FormState = [("a", "on"), ("b", "false")].into_iter().collect();
        assert!(state.checked("a"));
        assert!(!state.checked("b"));
        assert!(!state.checked("c"));
    }
}

//! Select options and select field state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One entry of a select list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Option whose value and label are the same text.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name)
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.insert(key.into(), value.to_string());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Single-value select: the current value plus its candidate options.
///
/// An empty string is never stored as a value; it means "nothing selected".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectField {
    value: Option<String>,
    options: Vec<SelectOption>,
}

impl SelectField {
    pub fn new(options: Vec<SelectOption>) -> Self {
        Self {
            value: None,
            options,
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    /// The option matching the current value.
    pub fn selected(&self) -> Option<&SelectOption> {
        let value = self.value.as_deref()?;
        self.options.iter().find(|option| option.value == value)
    }

    pub fn offers(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }

    /// Set the value without checking it against the options.
    /// Returns `true` if the value changed.
    pub fn set_value(&mut self, value: Option<String>) -> bool {
        let value = value.filter(|v| !v.is_empty());
        if self.value == value {
            return false;
        }
        self.value = value;
        true
    }

    /// Replace the options. The value survives only if still offered.
    /// Returns `true` if the value changed.
    pub fn set_options(&mut self, options: Vec<SelectOption>) -> bool {
        self.options = options;
        match self.value.as_deref() {
            Some(value) if !self.offers(value) => {
                self.value = None;
                true
            }
            _ => false,
        }
    }

    /// Clear both value and options. Returns `true` if the value changed.
    pub fn clear(&mut self) -> bool {
        self.set_options(Vec::new())
    }
}

/// Multi-value select.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiSelectField {
    values: Vec<String>,
    options: Vec<SelectOption>,
}

impl MultiSelectField {
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn selected(&self) -> impl Iterator<Item = &SelectOption> {
        self.options
            .iter()
            .filter(|option| self.values.contains(&option.value))
    }

    /// Select exactly the offered values among `values`, in option order.
    /// Returns `true` if the selection changed.
    pub fn set_values<I, V>(&mut self, values: I) -> bool
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        let wanted: Vec<V> = values.into_iter().collect();
        let next: Vec<String> = self
            .options
            .iter()
            .filter(|option| wanted.iter().any(|v| v.as_ref() == option.value))
            .map(|option| option.value.clone())
            .collect();
        if next == self.values {
            return false;
        }
        self.values = next;
        true
    }

    /// Replace the options, keeping only still-offered selections.
    /// Returns `true` if the selection changed.
    pub fn set_options(&mut self, options: Vec<SelectOption>) -> bool {
        self.options = options;
        let before = self.values.len();
        let options = &self.options;
        self.values
            .retain(|value| options.iter().any(|option| &option.value == value));
        self.values.len() != before
    }

    pub fn clear(&mut self) -> bool {
        self.set_options(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(values: &[&str]) -> Vec<SelectOption> {
        values.iter().map(|v| SelectOption::named(*v)).collect()
    }

    #[test]
    fn test_value_survives_when_still_offered() {
        let mut field = SelectField::new(options(&["Lead", "Pacemaker"]));
        field.set_value(Some("Lead".to_string()));

        assert!(!field.set_options(options(&["Lead", "Stent"])));
        assert_eq!(field.value(), Some("Lead"));
    }

    #[test]
    fn test_value_cleared_when_no_longer_offered() {
        let mut field = SelectField::new(options(&["Lead"]));
        field.set_value(Some("Lead".to_string()));

        assert!(field.set_options(options(&["Stent"])));
        assert_eq!(field.value(), None);
    }

    #[test]
    fn test_empty_string_is_no_value() {
        let mut field = SelectField::default();
        assert!(!field.set_value(Some(String::new())));
        assert_eq!(field.value(), None);
    }

    #[test]
    fn test_selected_option_carries_attributes() {
        let mut field = SelectField::new(vec![
            SelectOption::new("1", "A").with_attribute("product", 9),
        ]);
        field.set_value(Some("1".to_string()));
        assert_eq!(field.selected().and_then(|o| o.attribute("product")), Some("9"));
    }

    #[test]
    fn test_multi_select_keeps_offered_values() {
        let mut field = MultiSelectField::default();
        field.set_options(options(&["1", "2", "3"]));
        assert!(field.set_values(["3", "1", "9"]));
        assert_eq!(field.values(), ["1".to_string(), "3".to_string()]);

        assert!(field.set_options(options(&["3"])));
        assert_eq!(field.values(), ["3".to_string()]);
        assert_eq!(field.selected().count(), 1);
    }
}

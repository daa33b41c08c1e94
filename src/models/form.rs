//! Form-field schema and submitted field values.
//!
//! Every collection type maps to a static list of [`FormField`]s. The admin UI renders a form
//! from that list and submits the values back as a flat name-to-string map.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::errors::AppError;

/// Submitted form values keyed by field name.
pub type FieldValues = BTreeMap<String, String>;

/// How the values of a list field are separated in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ListSeparator {
    Comma,
    Newline,
}

impl ListSeparator {
    fn split_char(self) -> char {
        match self {
            ListSeparator::Comma => ',',
            ListSeparator::Newline => '\n',
        }
    }

    fn joiner(self) -> &'static str {
        match self {
            ListSeparator::Comma => ", ",
            ListSeparator::Newline => "\n",
        }
    }
}

/// Input widget for a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    TextArea,
    Url,
    Select { options: &'static [&'static str] },
    List { separator: ListSeparator },
}

/// A single field of an edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
}

impl FormField {
    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            required: false,
        }
    }

    pub const fn text_area(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::TextArea,
            required: false,
        }
    }

    pub const fn url(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Url,
            required: false,
        }
    }

    pub const fn select(
        name: &'static str,
        label: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Select { options },
            required: true,
        }
    }

    pub const fn list(name: &'static str, label: &'static str, separator: ListSeparator) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::List { separator },
            required: false,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Trimmed value of a field, empty when absent.
pub fn optional(fields: &FieldValues, name: &str) -> String {
    fields
        .get(name)
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Trimmed value of a field that must be present and non-blank.
pub fn required(fields: &FieldValues, name: &str) -> Result<String, AppError> {
    let value = optional(fields, name);
    if value.is_empty() {
        return Err(AppError::Validation(format!("Field '{}' is required", name)));
    }
    Ok(value)
}

/// Split a list field into trimmed, non-empty entries.
pub fn list(fields: &FieldValues, name: &str, separator: ListSeparator) -> Vec<String> {
    fields
        .get(name)
        .map(|v| {
            v.split(separator.split_char())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Render list entries back into the form representation.
pub fn join_list(values: &[String], separator: ListSeparator) -> String {
    values.join(separator.joiner())
}

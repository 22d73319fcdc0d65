//! User-facing message catalog.
//!
//! Templates use `#NAME#` placeholders, filled with [`Messages::fill`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub write_forbidden: String,
    pub delete_forbidden: String,
    pub read_forbidden: String,
    /// `#ID#` is the element id
    pub edit_title: String,
    pub new_element: String,
    /// `#ID#` is the requested id
    pub not_found: String,
    pub return_to_list: String,
    pub add_element: String,
    pub delete_element: String,
    pub delete_confirm: String,
    pub actions: String,
    /// `#FIELD#` is the field title
    pub required: String,
    /// `#FIELD#`, `#MAX#`
    pub too_long: String,
    pub not_a_number: String,
    /// `#FIELD#`, `#MIN#`, `#MAX#`
    pub out_of_range: String,
    /// `#FIELD#`, `#VALUE#`
    pub invalid_option: String,
    /// `#FIELD#`, `#VALUE#`
    pub invalid_reference: String,
    pub read_only: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            write_forbidden: "You are not allowed to edit this element".to_string(),
            delete_forbidden: "You are not allowed to delete this element".to_string(),
            read_forbidden: "You are not allowed to view these elements".to_string(),
            edit_title: "Edit element #ID#".to_string(),
            new_element: "New element".to_string(),
            not_found: "Element #ID# not found".to_string(),
            return_to_list: "Return to list".to_string(),
            add_element: "Add element".to_string(),
            delete_element: "Delete element".to_string(),
            delete_confirm: "Delete this element?".to_string(),
            actions: "Actions".to_string(),
            required: "#FIELD# required".to_string(),
            too_long: "#FIELD# is longer than #MAX# characters".to_string(),
            not_a_number: "#FIELD# must be a number".to_string(),
            out_of_range: "#FIELD# must be between #MIN# and #MAX#".to_string(),
            invalid_option: "#FIELD#: '#VALUE#' is not an allowed value".to_string(),
            invalid_reference: "#FIELD#: '#VALUE#' is not a valid reference".to_string(),
            read_only: "#FIELD# cannot be changed".to_string(),
        }
    }
}

impl Messages {
    /// Replace every `#KEY#` placeholder listed in `values`.
    pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
        values
            .iter()
            .fold(template.to_string(), |text, (key, value)| {
                text.replace(&format!("#{key}#"), value)
            })
    }
}

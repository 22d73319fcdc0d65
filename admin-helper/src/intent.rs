//! Intent: what the user asked the current request to do.
//!
//! Derived once from transport parameters so the controllers never look at
//! raw `save` / `apply` / `action` keys themselves.

use admin_helper_store::Row;
use indexmap::IndexMap;
use serde_json::Value;

use crate::flash::SessionId;

/// Request parameters as decoded by the host (query string and form body).
pub type RequestParams = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Show the element, or a blank form for a new one
    View,
    /// Save and stay on the edit page
    Apply,
    /// Save and return to the list
    Save,
    Delete,
    /// A host-defined action handled by `AdminView::custom_action`
    Custom(String),
}

impl Intent {
    /// Derive the intent from request parameters.
    ///
    /// `apply` wins over `save` when both are present. Without either, a
    /// non-empty `action` selects `Delete` or a custom action.
    pub fn from_params(params: &RequestParams) -> Self {
        if params.contains_key("apply") {
            return Self::Apply;
        }
        if params.contains_key("save") {
            return Self::Save;
        }
        match params.get("action").and_then(Value::as_str).map(str::trim) {
            Some("delete") => Self::Delete,
            Some(action) if !action.is_empty() => Self::Custom(action.to_string()),
            _ => Self::View,
        }
    }

    /// Whether this intent submits the edit form.
    pub fn is_submit(&self) -> bool {
        matches!(self, Self::Apply | Self::Save)
    }
}

/// One request to the edit page, detached from the transport.
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub intent: Intent,
    pub session: SessionId,
    /// Submitted `FIELDS` values
    pub fields: Row,
    /// Every other parameter, the primary key included
    pub params: RequestParams,
}

impl EditRequest {
    pub fn new(session: SessionId, intent: Intent) -> Self {
        Self {
            intent,
            session,
            fields: Row::new(),
            params: RequestParams::new(),
        }
    }

    /// Split decoded parameters into the intent, the `FIELDS` object and
    /// the rest.
    pub fn from_params(session: SessionId, mut params: RequestParams) -> Self {
        let intent = Intent::from_params(&params);
        let fields = match params.shift_remove("FIELDS") {
            Some(Value::Object(map)) => map.into_iter().collect(),
            _ => Row::new(),
        };
        Self {
            intent,
            session,
            fields,
            params,
        }
    }

    pub fn with_field(mut self, code: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(code.into(), value.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }
}

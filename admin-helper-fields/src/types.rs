//! Core field and tab types for admin interface settings.
//!
//! All types serialize to/from YAML via serde. A field configuration
//! describes one attribute of the edited entity and the widget that edits
//! it. Interface settings bundle the ordered fields and tabs of one view.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FieldsError, Result};

/// Id of the tab synthesised when a view declares no tabs.
pub const DEFAULT_TAB_ID: &str = "DEFAULT_TAB";

fn default_true() -> bool {
    true
}

/// A single option in a select field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectOption {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SelectOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// The widget that edits a field, tagged by kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum WidgetKind {
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
        #[serde(default)]
        multiline: bool,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default)]
        integer: bool,
    },
    /// Stored as `"Y"` / `"N"`.
    Boolean,
    Select {
        options: Vec<SelectOption>,
        #[serde(default)]
        multiple: bool,
    },
    /// Stores ids of another entity type.
    Reference {
        entity: String,
        #[serde(default)]
        multiple: bool,
    },
    /// Read-only derived value, never written back to storage.
    Computed { derive: String },
    /// A host-provided widget registered with the factory under `name`.
    Custom {
        name: String,
        #[serde(default, skip_serializing_if = "Value::is_null")]
        settings: Value,
    },
}

impl WidgetKind {
    /// Plain single-line text.
    pub fn text() -> Self {
        Self::Text {
            max_length: None,
            multiline: false,
        }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom {
            name: name.into(),
            settings: Value::Null,
        }
    }

    /// The tag the widget factory dispatches on.
    pub fn kind_tag(&self) -> &str {
        match self {
            Self::Text { .. } => "text",
            Self::Number { .. } => "number",
            Self::Boolean => "boolean",
            Self::Select { .. } => "select",
            Self::Reference { .. } => "reference",
            Self::Computed { .. } => "computed",
            Self::Custom { name, .. } => name.as_str(),
        }
    }
}

/// Configuration of one field of a view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldConfig {
    /// Field code, filled from the map key when parsed from YAML.
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub title: String,
    pub widget: WidgetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub force_select: bool,
    #[serde(default, rename = "virtual")]
    pub virtual_: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldConfig {
    pub fn new(code: impl Into<String>, widget: WidgetKind) -> Self {
        let code = code.into();
        Self {
            title: code.clone(),
            code,
            widget,
            tab: None,
            visible: true,
            force_select: false,
            virtual_: false,
            required: false,
            read_only: false,
            default: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn on_tab(mut self, tab: impl Into<String>) -> Self {
        self.tab = Some(tab.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn virtual_field(mut self) -> Self {
        self.virtual_ = true;
        self
    }

    pub fn force_select(mut self) -> Self {
        self.force_select = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Virtual fields are derived values; computed widgets are always virtual.
    pub fn is_virtual(&self) -> bool {
        self.virtual_ || matches!(self.widget, WidgetKind::Computed { .. })
    }

    /// Whether the gateway should load this field.
    pub fn is_selected(&self) -> bool {
        !self.is_virtual() || self.force_select
    }
}

/// A tab of the edit page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabConfig {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl TabConfig {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: String::new(),
            visible: true,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_TAB_ID
    }
}

/// The complete interface declaration of one `(module, view)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InterfaceSettings {
    #[serde(default)]
    pub fields: IndexMap<String, FieldConfig>,
    #[serde(default)]
    pub tabs: Vec<TabConfig>,
}

impl InterfaceSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Re-adding a code replaces it in place.
    pub fn field(mut self, field: FieldConfig) -> Self {
        self.fields.insert(field.code.clone(), field);
        self
    }

    pub fn tab(mut self, tab: TabConfig) -> Self {
        self.tabs.push(tab);
        self
    }

    /// Parse settings from YAML. Field codes are taken from the map keys.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut settings: InterfaceSettings = serde_yaml_ng::from_str(yaml)?;
        for (code, field) in settings.fields.iter_mut() {
            field.code = code.clone();
            if field.title.is_empty() {
                field.title = code.clone();
            }
        }
        Ok(settings)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get_field(&self, code: &str) -> Option<&FieldConfig> {
        self.fields.get(code)
    }

    pub fn require_field(&self, code: &str) -> Result<&FieldConfig> {
        self.fields
            .get(code)
            .ok_or_else(|| FieldsError::FieldNotFound {
                code: code.to_string(),
            })
    }

    /// Codes the gateway should load: virtual fields only when force-selected.
    pub fn select_codes(&self) -> Vec<String> {
        self.fields
            .values()
            .filter(|f| f.is_selected())
            .map(|f| f.code.clone())
            .collect()
    }

    /// Declared tabs, or a single default tab when none were declared.
    pub fn effective_tabs(&self, default_label: &str) -> Vec<TabConfig> {
        if self.tabs.is_empty() {
            vec![TabConfig::new(DEFAULT_TAB_ID, default_label)]
        } else {
            self.tabs.clone()
        }
    }
}

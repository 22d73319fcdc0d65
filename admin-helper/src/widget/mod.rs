//! Widgets: per-field delegates of the edit and list pages.
//!
//! The factory builds one widget per field per request. A widget reads its
//! field from the row it was created with, normalises and validates the
//! submitted value before save, reacts after save, and describes how the
//! field is shown.

mod boolean;
mod choice;
mod computed;
mod factory;
mod number;
mod text;

use std::sync::Arc;

use admin_helper_config::{AdminConfig, Messages};
use admin_helper_fields::{FieldConfig, SelectOption, WidgetKind};
use admin_helper_store::{id_of, EntityHandle, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use boolean::BooleanWidget;
pub use choice::{ReferenceWidget, SelectWidget};
pub use computed::{ComputedWidget, Derivation};
pub use factory::{WidgetConstructor, WidgetFactory, WidgetScope};
pub use number::NumberWidget;
pub use text::TextWidget;

/// Where in the page lifecycle a widget is being used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    View,
    /// Building the fields of the edit page tabs
    ShowTabElements,
    /// Pre-save processing of a submitted form
    EditActionBefore,
    /// Post-save processing after a successful write
    EditActionAfter,
    /// Binding one row of the list page
    ListRow,
}

/// What a widget knows about its field, its page and the current row.
#[derive(Debug, Clone)]
pub struct WidgetContext {
    pub code: String,
    /// Copy of the field configuration; views may adjust it per row
    pub settings: FieldConfig,
    pub entity: EntityHandle,
    pub module: String,
    pub view: String,
    pub primary_key: String,
    /// The whole row, so widgets can look at sibling fields
    pub row: Row,
    pub stage: Stage,
    pub config: Arc<AdminConfig>,
    errors: Vec<String>,
}

impl WidgetContext {
    pub fn new(
        settings: FieldConfig,
        entity: EntityHandle,
        module: impl Into<String>,
        view: impl Into<String>,
        row: Row,
        config: Arc<AdminConfig>,
    ) -> Self {
        Self {
            code: settings.code.clone(),
            primary_key: entity.primary_key.clone(),
            settings,
            entity,
            module: module.into(),
            view: view.into(),
            row,
            stage: Stage::View,
            config,
            errors: Vec::new(),
        }
    }

    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    pub fn title(&self) -> &str {
        if self.settings.title.is_empty() {
            &self.code
        } else {
            &self.settings.title
        }
    }

    pub fn messages(&self) -> &Messages {
        &self.config.messages
    }

    /// The field's value in the current row.
    pub fn current(&self) -> Option<&Value> {
        self.row.get(&self.code)
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Record `template` with `#FIELD#` and the given placeholders filled.
    pub fn add_message(&mut self, template: &str, values: &[(&str, &str)]) {
        let title = self.title().to_string();
        let mut all = vec![("FIELD", title.as_str())];
        all.extend_from_slice(values);
        let message = Messages::fill(template, &all);
        self.errors.push(message);
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Whether `data` describes an element that has no id yet.
    ///
    /// During a submit the edit controller has already dropped any key the
    /// gateway does not know, so a present key means a stored element.
    pub fn is_new(&self, data: &Row) -> bool {
        data.get(&self.primary_key).and_then(id_of).is_none()
    }
}

/// How one field is shown on the edit page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldView {
    pub code: String,
    pub title: String,
    /// Widget kind tag, e.g. `text` or a custom widget name
    pub kind: String,
    pub value: Value,
    pub required: bool,
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub multiple: bool,
}

pub trait Widget: Send + Sync {
    fn context(&self) -> &WidgetContext;

    fn context_mut(&mut self) -> &mut WidgetContext;

    /// Normalise and validate the submitted value before save.
    ///
    /// May rewrite or remove the field in `data`. Problems are recorded in
    /// the context and reported through [`Widget::validation_errors`].
    fn process_edit_action(&mut self, data: &mut Row) {
        prepare_submitted(self.context_mut(), data);
    }

    fn validation_errors(&self) -> &[String] {
        self.context().errors()
    }

    /// Runs after a successful save with the persisted data, new id included.
    fn process_after_save(&mut self, _data: &Row) {}

    fn set_data(&mut self, row: Row) {
        self.context_mut().row = row;
    }

    fn value(&self) -> Value {
        self.context().current().cloned().unwrap_or(Value::Null)
    }

    /// Describe the field for the edit form; the primary key is never editable.
    fn edit_field(&self, is_pk: bool) -> FieldView {
        let ctx = self.context();
        FieldView {
            code: ctx.code.clone(),
            title: ctx.title().to_string(),
            kind: ctx.settings.widget.kind_tag().to_string(),
            value: self.value(),
            required: ctx.settings.required,
            read_only: is_pk || ctx.settings.read_only || ctx.settings.is_virtual(),
            options: Vec::new(),
            multiple: false,
        }
    }

    /// Value shown in the list column.
    fn list_cell(&self) -> Value {
        self.value()
    }
}

/// Checks shared by the built-in widgets.
///
/// Read-only fields are dropped from the submission. A new element gets the
/// configured default for a missing field. Required fields must be present
/// and non-empty on new elements, and non-empty whenever submitted.
/// Returns the submitted value when it is present and non-empty.
pub fn prepare_submitted(ctx: &mut WidgetContext, data: &mut Row) -> Option<Value> {
    let code = ctx.code.clone();
    if ctx.settings.read_only && code != ctx.primary_key {
        data.shift_remove(&code);
        return None;
    }

    let is_new = ctx.is_new(data);
    if is_new && !data.contains_key(&code) {
        if let Some(default) = ctx.settings.default.clone() {
            data.insert(code.clone(), default);
        }
    }

    match data.get(&code) {
        Some(value) if !is_blank(value) => Some(value.clone()),
        Some(_) => {
            if ctx.settings.required {
                let template = ctx.messages().required.clone();
                ctx.add_message(&template, &[]);
            }
            None
        }
        None => {
            if ctx.settings.required && is_new {
                let template = ctx.messages().required.clone();
                ctx.add_message(&template, &[]);
            }
            None
        }
    }
}

/// Null, whitespace-only strings and empty arrays count as no value.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Render a scalar for messages and option matching.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Options a widget kind offers, for the edit form.
pub(crate) fn kind_options(kind: &WidgetKind) -> (Vec<SelectOption>, bool) {
    match kind {
        WidgetKind::Select { options, multiple } => (options.clone(), *multiple),
        WidgetKind::Reference { multiple, .. } => (Vec::new(), *multiple),
        _ => (Vec::new(), false),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use admin_helper_fields::FieldConfig;

    pub fn context(field: FieldConfig, row: Row) -> WidgetContext {
        WidgetContext::new(
            field,
            EntityHandle::new("products", "b_products"),
            "shop",
            "products",
            row,
            Arc::new(AdminConfig::default()),
        )
    }

    pub fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

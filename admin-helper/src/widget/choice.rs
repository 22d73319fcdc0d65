//! Widgets whose value is picked from a set: fixed options or another
//! entity's ids.

use admin_helper_fields::WidgetKind;
use admin_helper_store::{id_of, Row};
use serde_json::Value;

use super::{kind_options, prepare_submitted, scalar_text, FieldView, Widget, WidgetContext};

/// Split a submission into its values; multiple fields accept arrays.
fn submitted_values(value: &Value, multiple: bool) -> Vec<Value> {
    match value {
        Value::Array(items) if multiple => items.clone(),
        other => vec![other.clone()],
    }
}

fn store(values: Vec<Value>, multiple: bool) -> Value {
    if multiple {
        Value::Array(values)
    } else {
        values.into_iter().next().unwrap_or(Value::Null)
    }
}

fn choice_field(widget: &dyn Widget, is_pk: bool) -> FieldView {
    let ctx = widget.context();
    let (options, multiple) = kind_options(&ctx.settings.widget);
    FieldView {
        code: ctx.code.clone(),
        title: ctx.title().to_string(),
        kind: ctx.settings.widget.kind_tag().to_string(),
        value: widget.value(),
        required: ctx.settings.required,
        read_only: is_pk || ctx.settings.read_only,
        options,
        multiple,
    }
}

/// Value restricted to the configured options.
pub struct SelectWidget {
    ctx: WidgetContext,
}

impl SelectWidget {
    pub fn new(ctx: WidgetContext) -> Self {
        Self { ctx }
    }
}

impl Widget for SelectWidget {
    fn context(&self) -> &WidgetContext {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut WidgetContext {
        &mut self.ctx
    }

    fn process_edit_action(&mut self, data: &mut Row) {
        let Some(value) = prepare_submitted(&mut self.ctx, data) else {
            return;
        };
        let (options, multiple) = kind_options(&self.ctx.settings.widget);

        let mut accepted = Vec::new();
        let mut rejected = false;
        for item in submitted_values(&value, multiple) {
            let text = scalar_text(&item);
            if options.iter().any(|o| o.value == text) {
                accepted.push(Value::String(text));
            } else {
                let template = self.ctx.messages().invalid_option.clone();
                self.ctx.add_message(&template, &[("VALUE", &text)]);
                rejected = true;
            }
        }
        if !rejected {
            data.insert(self.ctx.code.clone(), store(accepted, multiple));
        }
    }

    fn edit_field(&self, is_pk: bool) -> FieldView {
        choice_field(self, is_pk)
    }

    /// Shows the option label instead of the stored value.
    fn list_cell(&self) -> Value {
        let WidgetKind::Select { options, .. } = &self.ctx.settings.widget else {
            return self.value();
        };
        let label = |item: &Value| {
            let text = scalar_text(item);
            let label = options
                .iter()
                .find(|o| o.value == text)
                .and_then(|o| o.label.clone())
                .unwrap_or(text);
            Value::String(label)
        };
        match self.value() {
            Value::Null => Value::Null,
            Value::Array(items) => Value::Array(items.iter().map(label).collect()),
            item => label(&item),
        }
    }
}

/// Ids of records of another entity.
///
/// Only the id shape is checked here; whether the record exists is the
/// gateway's business when it writes.
pub struct ReferenceWidget {
    ctx: WidgetContext,
}

impl ReferenceWidget {
    pub fn new(ctx: WidgetContext) -> Self {
        Self { ctx }
    }

    /// Token of the referenced entity.
    pub fn target(&self) -> Option<&str> {
        match &self.ctx.settings.widget {
            WidgetKind::Reference { entity, .. } => Some(entity.as_str()),
            _ => None,
        }
    }
}

impl Widget for ReferenceWidget {
    fn context(&self) -> &WidgetContext {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut WidgetContext {
        &mut self.ctx
    }

    fn process_edit_action(&mut self, data: &mut Row) {
        let Some(value) = prepare_submitted(&mut self.ctx, data) else {
            return;
        };
        let (_, multiple) = kind_options(&self.ctx.settings.widget);

        let mut ids = Vec::new();
        for item in submitted_values(&value, multiple) {
            match id_of(&item) {
                Some(id) if is_id_shaped(&id) => ids.push(Value::String(id)),
                _ => {
                    let template = self.ctx.messages().invalid_reference.clone();
                    self.ctx
                        .add_message(&template, &[("VALUE", &scalar_text(&item))]);
                }
            }
        }
        if self.ctx.errors().is_empty() {
            data.insert(self.ctx.code.clone(), store(ids, multiple));
        }
    }

    fn edit_field(&self, is_pk: bool) -> FieldView {
        choice_field(self, is_pk)
    }
}

fn is_id_shaped(id: &str) -> bool {
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

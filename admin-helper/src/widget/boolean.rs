use admin_helper_store::Row;
use serde_json::Value;

use super::{prepare_submitted, Widget, WidgetContext};

/// Checkbox stored as `"Y"` / `"N"`.
pub struct BooleanWidget {
    ctx: WidgetContext,
}

impl BooleanWidget {
    pub fn new(ctx: WidgetContext) -> Self {
        Self { ctx }
    }

    /// Map form and JSON spellings of a checkbox onto `Y` / `N`.
    pub fn normalize(value: &Value) -> &'static str {
        let checked = match value {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            Value::String(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "y" | "yes" | "1" | "true" | "on"
            ),
            _ => false,
        };
        if checked {
            "Y"
        } else {
            "N"
        }
    }
}

impl Widget for BooleanWidget {
    fn context(&self) -> &WidgetContext {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut WidgetContext {
        &mut self.ctx
    }

    fn process_edit_action(&mut self, data: &mut Row) {
        prepare_submitted(&mut self.ctx, data);
        if let Some(value) = data.get_mut(&self.ctx.code) {
            *value = Value::String(Self::normalize(value).to_string());
        }
    }

    fn list_cell(&self) -> Value {
        match self.ctx.current() {
            Some(value) => Value::String(Self::normalize(value).to_string()),
            None => Value::Null,
        }
    }
}

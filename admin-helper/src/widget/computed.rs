use std::sync::Arc;

use admin_helper_store::Row;
use serde_json::Value;

use super::{FieldView, Widget, WidgetContext};

/// Derives a value from the whole row.
pub type Derivation = Arc<dyn Fn(&Row) -> Value + Send + Sync>;

/// Read-only value derived from sibling fields.
///
/// Never written back: the field is removed from submissions before save.
pub struct ComputedWidget {
    ctx: WidgetContext,
    derive: Option<Derivation>,
}

impl ComputedWidget {
    /// A widget without a derivation shows whatever the row holds.
    pub fn new(ctx: WidgetContext, derive: Option<Derivation>) -> Self {
        Self { ctx, derive }
    }
}

impl Widget for ComputedWidget {
    fn context(&self) -> &WidgetContext {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut WidgetContext {
        &mut self.ctx
    }

    fn process_edit_action(&mut self, data: &mut Row) {
        data.shift_remove(&self.ctx.code);
    }

    fn value(&self) -> Value {
        match &self.derive {
            Some(derive) => derive(&self.ctx.row),
            None => self.ctx.current().cloned().unwrap_or(Value::Null),
        }
    }

    fn edit_field(&self, _is_pk: bool) -> FieldView {
        let ctx = self.context();
        FieldView {
            code: ctx.code.clone(),
            title: ctx.title().to_string(),
            kind: ctx.settings.widget.kind_tag().to_string(),
            value: self.value(),
            required: false,
            read_only: true,
            options: Vec::new(),
            multiple: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::test_support::{context, row};
    use admin_helper_fields::{FieldConfig, WidgetKind};
    use serde_json::json;

    fn full_name() -> Derivation {
        Arc::new(|row: &Row| {
            let part = |code: &str| row.get(code).and_then(Value::as_str).unwrap_or_default().to_string();
            json!(format!("{} {}", part("FIRST"), part("LAST")).trim())
        })
    }

    #[test]
    fn derives_from_siblings_and_never_saves() {
        let field = FieldConfig::new(
            "FULL_NAME",
            WidgetKind::Computed {
                derive: "full_name".into(),
            },
        );
        let current = row(&[("FIRST", json!("Ada")), ("LAST", json!("Lovelace"))]);
        let mut widget = ComputedWidget::new(context(field, current), Some(full_name()));

        assert_eq!(widget.list_cell(), json!("Ada Lovelace"));
        assert!(widget.edit_field(false).read_only);

        let mut data = row(&[("FULL_NAME", json!("forged")), ("FIRST", json!("Ada"))]);
        widget.process_edit_action(&mut data);
        assert!(!data.contains_key("FULL_NAME"));
        assert!(widget.validation_errors().is_empty());
    }
}

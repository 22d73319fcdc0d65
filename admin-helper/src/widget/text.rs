use admin_helper_fields::WidgetKind;
use admin_helper_store::Row;
use serde_json::Value;

use super::{prepare_submitted, scalar_text, Widget, WidgetContext};

/// Single or multi-line string field.
///
/// Submitted values are trimmed and stored as strings.
pub struct TextWidget {
    ctx: WidgetContext,
}

impl TextWidget {
    pub fn new(ctx: WidgetContext) -> Self {
        Self { ctx }
    }

    fn max_length(&self) -> Option<usize> {
        match &self.ctx.settings.widget {
            WidgetKind::Text { max_length, .. } => *max_length,
            _ => None,
        }
    }
}

impl Widget for TextWidget {
    fn context(&self) -> &WidgetContext {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut WidgetContext {
        &mut self.ctx
    }

    fn process_edit_action(&mut self, data: &mut Row) {
        let Some(value) = prepare_submitted(&mut self.ctx, data) else {
            if let Some(Value::String(s)) = data.get_mut(&self.ctx.code) {
                *s = s.trim().to_string();
            }
            return;
        };

        let text = scalar_text(&value).trim().to_string();
        if let Some(max) = self.max_length() {
            if text.chars().count() > max {
                let template = self.ctx.messages().too_long.clone();
                self.ctx.add_message(&template, &[("MAX", &max.to_string())]);
            }
        }
        data.insert(self.ctx.code.clone(), Value::String(text));
    }
}

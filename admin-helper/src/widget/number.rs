use admin_helper_fields::WidgetKind;
use admin_helper_store::Row;
use serde_json::{Number, Value};

use super::{is_blank, prepare_submitted, scalar_text, Widget, WidgetContext};

/// Integer or decimal field with optional bounds.
///
/// Numeric strings from forms are parsed and stored as JSON numbers; a
/// blank optional value is stored as null.
pub struct NumberWidget {
    ctx: WidgetContext,
}

impl NumberWidget {
    pub fn new(ctx: WidgetContext) -> Self {
        Self { ctx }
    }

    fn bounds(&self) -> (Option<f64>, Option<f64>, bool) {
        match &self.ctx.settings.widget {
            WidgetKind::Number { min, max, integer } => (*min, *max, *integer),
            _ => (None, None, false),
        }
    }

    fn parse(&self, value: &Value) -> Option<Value> {
        let (_, _, integer) = self.bounds();
        if integer {
            return parse_integer(value).map(Value::Number);
        }
        let n = match value {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if !n.is_finite() {
            return None;
        }
        Number::from_f64(n).map(Value::Number)
    }
}

/// Largest integer an `f64` holds exactly.
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_991.0;

/// Parse an integer without a float round trip. Whole floats such as `3.0`
/// are accepted only while they are exact.
fn parse_integer(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.clone()),
        Value::Number(n) => whole_float(n.as_f64()?),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                return Some(Number::from(n));
            }
            if let Ok(n) = s.parse::<u64>() {
                return Some(Number::from(n));
            }
            if s.chars().all(|c| c.is_ascii_digit() || c == '-' || c == '+') {
                // Digits only but too wide for 64 bits
                return None;
            }
            whole_float(s.parse::<f64>().ok()?)
        }
        _ => None,
    }
}

fn whole_float(n: f64) -> Option<Number> {
    if !n.is_finite() || n.fract() != 0.0 || n.abs() > MAX_EXACT_FLOAT_INT {
        return None;
    }
    Some(Number::from(n as i64))
}

impl Widget for NumberWidget {
    fn context(&self) -> &WidgetContext {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut WidgetContext {
        &mut self.ctx
    }

    fn process_edit_action(&mut self, data: &mut Row) {
        let Some(value) = prepare_submitted(&mut self.ctx, data) else {
            if data.get(&self.ctx.code).is_some_and(is_blank) {
                data.insert(self.ctx.code.clone(), Value::Null);
            }
            return;
        };

        let Some(parsed) = self.parse(&value) else {
            let template = self.ctx.messages().not_a_number.clone();
            self.ctx.add_message(&template, &[]);
            return;
        };

        let (min, max, _) = self.bounds();
        let n = parsed.as_f64().unwrap_or_default();
        let below = min.is_some_and(|min| n < min);
        let above = max.is_some_and(|max| n > max);
        if below || above {
            let template = self.ctx.messages().out_of_range.clone();
            let min = min.map(|m| m.to_string()).unwrap_or_else(|| "-".into());
            let max = max.map(|m| m.to_string()).unwrap_or_else(|| "-".into());
            self.ctx
                .add_message(&template, &[("MIN", &min), ("MAX", &max), ("VALUE", &scalar_text(&value))]);
            return;
        }
        data.insert(self.ctx.code.clone(), parsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::test_support::{context, row};
    use admin_helper_fields::FieldConfig;
    use serde_json::json;

    fn widget(min: Option<f64>, max: Option<f64>, integer: bool) -> NumberWidget {
        let field = FieldConfig::new("AGE", WidgetKind::Number { min, max, integer }).with_title("Age");
        NumberWidget::new(context(field, Row::new()))
    }

    #[test]
    fn parses_form_strings() {
        let mut widget = widget(None, None, true);
        let mut data = row(&[("AGE", json!(" 42 "))]);
        widget.process_edit_action(&mut data);
        assert_eq!(data["AGE"], json!(42));
        assert!(widget.validation_errors().is_empty());
    }

    #[test]
    fn rejects_garbage_and_fractions_for_integers() {
        let mut widget = widget(None, None, true);
        let mut data = row(&[("AGE", json!("forty"))]);
        widget.process_edit_action(&mut data);
        assert_eq!(widget.validation_errors(), ["Age must be a number"]);

        let mut widget = self::widget(None, None, true);
        let mut data = row(&[("AGE", json!(1.5))]);
        widget.process_edit_action(&mut data);
        assert_eq!(widget.validation_errors().len(), 1);
    }

    #[test]
    fn wide_integers_are_kept_exact_or_rejected() {
        let mut widget = widget(None, None, true);
        let mut data = row(&[("AGE", json!("9007199254740993"))]);
        widget.process_edit_action(&mut data);
        assert!(widget.validation_errors().is_empty());
        assert_eq!(data["AGE"], json!(9_007_199_254_740_993_i64));

        for garbage in ["1e30", "99999999999999999999999", "3.5"] {
            let mut widget = self::widget(None, None, true);
            let mut data = row(&[("AGE", json!(garbage))]);
            widget.process_edit_action(&mut data);
            assert_eq!(widget.validation_errors(), ["Age must be a number"], "{garbage}");
            assert_eq!(data["AGE"], json!(garbage));
        }

        let mut widget = self::widget(None, None, true);
        let mut data = row(&[("AGE", json!("12.0"))]);
        widget.process_edit_action(&mut data);
        assert_eq!(data["AGE"], json!(12));
    }

    #[test]
    fn enforces_bounds() {
        let mut widget = widget(Some(0.0), Some(120.0), false);
        let mut data = row(&[("AGE", json!("130"))]);
        widget.process_edit_action(&mut data);
        assert_eq!(widget.validation_errors(), ["Age must be between 0 and 120"]);
        assert_eq!(data["AGE"], json!("130"));
    }

    #[test]
    fn blank_optional_value_becomes_null() {
        let mut widget = widget(None, None, false);
        let mut data = row(&[("ID", json!("1")), ("AGE", json!(""))]);
        widget.process_edit_action(&mut data);
        assert_eq!(data["AGE"], Value::Null);
        assert!(widget.validation_errors().is_empty());
    }
}

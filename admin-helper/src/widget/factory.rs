//! WidgetFactory: builds the widget for a field code.
//!
//! Dispatches on the field's widget kind tag. Built-in kinds need no setup;
//! `custom` kinds and `computed` derivations are registered by name at
//! bootstrap.

use std::collections::HashMap;
use std::sync::Arc;

use admin_helper_config::AdminConfig;
use admin_helper_fields::{InterfaceSettings, WidgetKind};
use admin_helper_store::{EntityHandle, Row};
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    BooleanWidget, ComputedWidget, Derivation, NumberWidget, ReferenceWidget, SelectWidget, Stage,
    TextWidget, Widget, WidgetContext,
};
use crate::error::{AdminError, Result};
use crate::view::AdminView;

/// Builds a host-provided widget from its prepared context.
pub type WidgetConstructor = Arc<dyn Fn(WidgetContext) -> Box<dyn Widget> + Send + Sync>;

/// The page a widget is built for.
pub struct WidgetScope<'a> {
    pub settings: &'a InterfaceSettings,
    pub entity: &'a EntityHandle,
    pub view: &'a dyn AdminView,
    pub primary_key: &'a str,
    pub config: &'a Arc<AdminConfig>,
}

#[derive(Default)]
pub struct WidgetFactory {
    constructors: HashMap<String, WidgetConstructor>,
    derivations: HashMap<String, Derivation>,
}

impl WidgetFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the constructor for `custom` fields named `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(WidgetContext) -> Box<dyn Widget> + Send + Sync + 'static,
    {
        let name = name.into();
        if self
            .constructors
            .insert(name.clone(), Arc::new(constructor))
            .is_some()
        {
            warn!(widget = %name, "custom widget constructor replaced");
        }
    }

    pub fn with_widget<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(WidgetContext) -> Box<dyn Widget> + Send + Sync + 'static,
    {
        self.register(name, constructor);
        self
    }

    /// Register the function behind `computed` fields deriving `name`.
    pub fn register_derivation<F>(&mut self, name: impl Into<String>, derive: F)
    where
        F: Fn(&Row) -> Value + Send + Sync + 'static,
    {
        self.derivations.insert(name.into(), Arc::new(derive));
    }

    pub fn with_derivation<F>(mut self, name: impl Into<String>, derive: F) -> Self
    where
        F: Fn(&Row) -> Value + Send + Sync + 'static,
    {
        self.register_derivation(name, derive);
        self
    }

    pub fn has_widget(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Build the widget for `code`, then let the view adjust it for `row`.
    pub fn create(
        &self,
        scope: &WidgetScope<'_>,
        code: &str,
        row: &Row,
        stage: Stage,
    ) -> Result<Box<dyn Widget>> {
        let settings = scope
            .settings
            .get_field(code)
            .ok_or_else(|| AdminError::NoWidget {
                code: code.to_string(),
            })?
            .clone();

        let mut ctx = WidgetContext::new(
            settings,
            scope.entity.clone(),
            scope.view.module(),
            scope.view.view_name(),
            row.clone(),
            Arc::clone(scope.config),
        )
        .with_primary_key(scope.primary_key);
        ctx.stage = stage;
        scope.view.on_widget_created(&mut ctx, row);

        let kind = ctx.settings.widget.kind_tag().to_string();
        debug!(code, %kind, ?stage, "creating widget");
        self.build(ctx)
    }

    /// Build the widget matching the context's widget kind.
    pub fn build(&self, ctx: WidgetContext) -> Result<Box<dyn Widget>> {
        let widget: Box<dyn Widget> = match &ctx.settings.widget {
            WidgetKind::Text { .. } => Box::new(TextWidget::new(ctx)),
            WidgetKind::Number { .. } => Box::new(NumberWidget::new(ctx)),
            WidgetKind::Boolean => Box::new(BooleanWidget::new(ctx)),
            WidgetKind::Select { .. } => Box::new(SelectWidget::new(ctx)),
            WidgetKind::Reference { .. } => Box::new(ReferenceWidget::new(ctx)),
            WidgetKind::Computed { derive } => {
                let derivation = self.derivations.get(derive).cloned();
                if derivation.is_none() {
                    warn!(code = %ctx.code, %derive, "no derivation registered, showing stored value");
                }
                Box::new(ComputedWidget::new(ctx, derivation))
            }
            WidgetKind::Custom { name, .. } => {
                let constructor =
                    self.constructors
                        .get(name)
                        .ok_or_else(|| AdminError::UnknownWidgetKind {
                            code: ctx.code.clone(),
                            kind: name.clone(),
                        })?;
                constructor(ctx)
            }
        };
        Ok(widget)
    }
}

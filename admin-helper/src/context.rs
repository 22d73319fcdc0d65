//! Shared services injected into every controller.

use std::sync::Arc;

use admin_helper_config::AdminConfig;
use admin_helper_fields::FieldRegistry;
use admin_helper_store::EntityRegistry;

use crate::flash::FlashStore;
use crate::widget::WidgetFactory;

/// Everything a controller needs besides the view and the request.
///
/// Built once at bootstrap and cloned into each request; all members are
/// shared, so cloning is cheap.
#[derive(Clone)]
pub struct AdminContext {
    pub config: Arc<AdminConfig>,
    pub fields: Arc<FieldRegistry>,
    pub entities: Arc<EntityRegistry>,
    pub widgets: Arc<WidgetFactory>,
    pub flash: Arc<FlashStore>,
}

impl AdminContext {
    pub fn new(config: AdminConfig, fields: FieldRegistry, entities: EntityRegistry) -> Self {
        Self {
            config: Arc::new(config),
            fields: Arc::new(fields),
            entities: Arc::new(entities),
            widgets: Arc::new(WidgetFactory::new()),
            flash: Arc::new(FlashStore::new()),
        }
    }

    /// Replace the default widget factory, e.g. one with custom widgets.
    pub fn with_widgets(mut self, widgets: WidgetFactory) -> Self {
        self.widgets = Arc::new(widgets);
        self
    }

    pub fn with_flash(mut self, flash: Arc<FlashStore>) -> Self {
        self.flash = flash;
        self
    }
}

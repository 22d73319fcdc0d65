//! State shared by the list and edit controllers of one view.

use std::sync::Arc;

use admin_helper_fields::InterfaceSettings;
use admin_helper_store::{EntityGateway, Row};
use tracing::{debug, warn};

use crate::context::AdminContext;
use crate::error::Result;
use crate::flash::SessionId;
use crate::url::ViewUrls;
use crate::view::AdminView;
use crate::widget::{Stage, Widget, WidgetScope};

pub(crate) struct HelperBase {
    pub ctx: AdminContext,
    pub view: Arc<dyn AdminView>,
    pub settings: Arc<InterfaceSettings>,
    pub gateway: Arc<dyn EntityGateway>,
    pub urls: ViewUrls,
    pub primary_key: String,
}

impl HelperBase {
    /// Resolve the view's field configuration and gateway.
    ///
    /// Both failures are wiring mistakes and surface as configuration errors.
    pub fn new(ctx: AdminContext, view: Arc<dyn AdminView>) -> Result<Self> {
        let settings = ctx.fields.get(view.module(), view.view_name())?;
        let gateway = ctx.entities.resolve(view.entity())?;
        let urls = ViewUrls::for_view(&ctx.config, view.as_ref());
        let primary_key = view
            .primary_key()
            .unwrap_or(ctx.config.primary_key.as_str())
            .to_string();
        debug!(
            module = view.module(),
            view = view.view_name(),
            table = gateway.table_name(),
            "admin helper ready"
        );
        Ok(Self {
            ctx,
            view,
            settings,
            gateway,
            urls,
            primary_key,
        })
    }

    pub fn create_widget(&self, code: &str, row: &Row, stage: Stage) -> Result<Box<dyn Widget>> {
        let scope = WidgetScope {
            settings: &self.settings,
            entity: self.gateway.handle(),
            view: self.view.as_ref(),
            primary_key: &self.primary_key,
            config: &self.ctx.config,
        };
        self.ctx.widgets.create(&scope, code, row, stage)
    }

    /// General and read access; a denial is reported to the session.
    pub fn check_read_rights(&self, session: &SessionId) -> bool {
        if self.view.has_rights() && self.view.has_read_rights() {
            return true;
        }
        warn!(
            module = self.view.module(),
            view = self.view.view_name(),
            %session,
            "read access denied"
        );
        self.ctx
            .flash
            .add_errors(session, [self.ctx.config.messages.read_forbidden.clone()]);
        false
    }

    /// Codes to load: selected fields plus the primary key.
    pub fn select(&self, codes: impl IntoIterator<Item = String>) -> Vec<String> {
        let mut select: Vec<String> = codes.into_iter().collect();
        if !select.contains(&self.primary_key) {
            select.insert(0, self.primary_key.clone());
        }
        select
    }
}

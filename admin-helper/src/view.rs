//! AdminView: the host's per-page hooks.
//!
//! A view names its module, page and entity; everything else has a default.
//! Override the rights checks to gate access, `on_widget_created` to tune
//! widgets per row, and `custom_action` to handle host-defined actions.

use std::sync::Arc;

use admin_helper_store::{EntityGateway, Row};
use async_trait::async_trait;

use crate::edit::EditOutcome;
use crate::error::Result;
use crate::flash::{FlashStore, SessionId};
use crate::url::{UrlParams, ViewUrls};
use crate::widget::WidgetContext;

#[async_trait]
pub trait AdminView: Send + Sync {
    /// Namespace of the view; must be non-empty.
    fn module(&self) -> &str;

    fn view_name(&self) -> &str;

    /// Token resolved through the `EntityRegistry`.
    fn entity(&self) -> &str;

    /// Page name of the list view when it differs from `view_name`
    fn list_view_name(&self) -> Option<&str> {
        None
    }

    /// Page name of the edit view when it differs from `view_name`
    fn edit_view_name(&self) -> Option<&str> {
        None
    }

    /// Direct list page address, bypassing the router
    fn list_page_url(&self) -> Option<&str> {
        None
    }

    /// Direct edit page address, bypassing the router
    fn edit_page_url(&self) -> Option<&str> {
        None
    }

    /// Primary key column; `None` uses the configured default.
    fn primary_key(&self) -> Option<&str> {
        None
    }

    /// Params added to every generated list and edit link.
    fn additional_url_params(&self) -> UrlParams {
        UrlParams::new()
    }

    /// General access to the view.
    fn has_rights(&self) -> bool {
        true
    }

    fn has_read_rights(&self) -> bool {
        true
    }

    fn has_write_rights(&self) -> bool {
        true
    }

    fn has_delete_rights(&self) -> bool {
        true
    }

    /// Offer the delete entry in the edit page menu.
    fn show_delete_button(&self) -> bool {
        true
    }

    /// Adjust a freshly built widget for the row it will work on.
    fn on_widget_created(&self, _widget: &mut WidgetContext, _row: &Row) {}

    /// Handle an action other than `delete`.
    ///
    /// `Ok(None)` means the action is not handled and the page renders as
    /// usual.
    async fn custom_action(
        &self,
        _action: &str,
        _id: Option<&str>,
        _ctx: &ActionContext,
    ) -> Result<Option<EditOutcome>> {
        Ok(None)
    }
}

/// What a custom action can reach: the element, its store and the flash
/// channel of the acting session.
pub struct ActionContext {
    pub gateway: Arc<dyn EntityGateway>,
    pub flash: Arc<FlashStore>,
    pub session: SessionId,
    pub urls: ViewUrls,
    /// The loaded element, empty for a new one
    pub data: Row,
}

impl ActionContext {
    /// Redirect to the list page, keeping its filter state.
    pub fn redirect_to_list(&self) -> EditOutcome {
        EditOutcome::redirect(
            self.urls
                .list_page_url(&crate::url::url_params([("restore_query", "Y")])),
        )
    }
}

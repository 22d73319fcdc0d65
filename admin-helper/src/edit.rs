//! EditController: the element page.
//!
//! A submit (`Save` / `Apply`) runs the edit pipeline:
//!
//! 1. write rights, or stop with an error
//! 2. the gateway decides whether the element exists; a key it does not know
//!    is dropped and the element is saved as new
//! 3. every field's widget normalises and validates the submission, in
//!    registration order, and all problems are collected
//! 4. any problem: the form is shown again with the data as submitted
//! 5. `update` or `add` writes the element; a rejected write shows the form
//!    again with the gateway's messages
//! 6. post-save hooks run and the controller redirects
//!
//! Everything else loads the element (or a blank one), runs the requested
//! action and shows the page. Errors and notes travel through the flash
//! channel and end up on whichever page the session sees next.

use std::sync::Arc;

use admin_helper_config::Messages;
use admin_helper_fields::TabConfig;
use admin_helper_store::{id_of, PersistResult, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::context::AdminContext;
use crate::error::{AdminError, Result};
use crate::flash::{FlashMessages, SessionId};
use crate::helper::HelperBase;
use crate::intent::{EditRequest, Intent};
use crate::url::{url_params, UrlParams};
use crate::view::{ActionContext, AdminView};
use crate::widget::{FieldView, Stage, Widget};

/// What the host should do with the request.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Render(Box<EditPage>),
    /// Send the browser elsewhere; flash messages wait for the next page
    Redirect {
        url: String,
        /// Id of the element this request created
        created_id: Option<String>,
    },
}

impl EditOutcome {
    pub fn redirect(url: impl Into<String>) -> Self {
        Self::Redirect {
            url: url.into(),
            created_id: None,
        }
    }

    pub fn page(&self) -> Option<&EditPage> {
        match self {
            Self::Render(page) => Some(page.as_ref()),
            Self::Redirect { .. } => None,
        }
    }

    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            Self::Redirect { url, .. } => Some(url.as_str()),
            Self::Render(_) => None,
        }
    }
}

/// One tab of the edit form with the fields shown on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabView {
    pub id: String,
    pub label: String,
    pub icon: String,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub text: String,
    pub icon: String,
    pub link: String,
    /// Question to confirm before following the link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MenuEntry {
    Link(MenuItem),
    Separator,
    Submenu {
        text: String,
        icon: String,
        items: Vec<MenuItem>,
    },
}

/// Everything the host needs to render the element page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditPage {
    pub title: String,
    pub is_new: bool,
    /// The element as loaded, or as submitted when a save was rejected
    pub data: Row,
    pub tabs: Vec<TabView>,
    /// Values carried through the form without a visible field
    pub hidden: Row,
    pub menu: Vec<MenuEntry>,
    pub form_action: String,
    pub back_url: String,
    pub messages: FlashMessages,
}

enum EditResult {
    Saved { id: String, created: bool },
    Rejected,
}

pub struct EditController {
    base: HelperBase,
}

impl EditController {
    pub fn new(ctx: AdminContext, view: Arc<dyn AdminView>) -> Result<Self> {
        Ok(Self {
            base: HelperBase::new(ctx, view)?,
        })
    }

    pub fn primary_key(&self) -> &str {
        &self.base.primary_key
    }

    pub async fn handle(&self, request: EditRequest) -> Result<EditOutcome> {
        if !self.base.check_read_rights(&request.session) {
            return Ok(EditOutcome::Render(Box::new(
                self.denied_page(&request.session),
            )));
        }

        if request.intent.is_submit() {
            self.submit(request).await
        } else {
            self.show(request).await
        }
    }

    async fn submit(&self, request: EditRequest) -> Result<EditOutcome> {
        let pk = &self.base.primary_key;
        let mut data = request.fields.clone();
        if let Some(id) = request.param(pk) {
            data.insert(pk.clone(), id.clone());
        }
        for code in self.base.settings.fields.keys() {
            if code == pk {
                continue;
            }
            if let Some(value) = request.param(code) {
                data.insert(code.clone(), value.clone());
            }
        }

        match self.edit_action(&request.session, &mut data).await? {
            EditResult::Saved { id, created } => {
                let url = match request.intent {
                    Intent::Apply => self
                        .base
                        .urls
                        .edit_page_url(&url_params([(pk.as_str(), id.as_str())])),
                    _ => self.list_url(),
                };
                Ok(EditOutcome::Redirect {
                    url,
                    created_id: created.then_some(id),
                })
            }
            EditResult::Rejected => Ok(EditOutcome::Render(Box::new(
                self.page(&request.session, data)?,
            ))),
        }
    }

    async fn show(&self, request: EditRequest) -> Result<EditOutcome> {
        let session = &request.session;
        let id = request.param(&self.base.primary_key).and_then(id_of);

        let data = match &id {
            Some(id) => match self.load_element(id).await? {
                Some(row) => row,
                None => {
                    warn!(view = self.base.view.view_name(), %id, "element not found");
                    let note =
                        Messages::fill(&self.base.ctx.config.messages.not_found, &[("ID", id.as_str())]);
                    self.base.ctx.flash.add_notes(session, [note]);
                    return Ok(EditOutcome::redirect(self.list_url()));
                }
            },
            None => Row::new(),
        };

        match &request.intent {
            Intent::Delete => {
                if let Some(id) = &id {
                    self.delete_element(session, id).await;
                    return Ok(EditOutcome::redirect(self.list_url()));
                }
            }
            Intent::Custom(action) => {
                let ctx = ActionContext {
                    gateway: Arc::clone(&self.base.gateway),
                    flash: Arc::clone(&self.base.ctx.flash),
                    session: session.clone(),
                    urls: self.base.urls.clone(),
                    data: data.clone(),
                };
                if let Some(outcome) = self
                    .base
                    .view
                    .custom_action(action, id.as_deref(), &ctx)
                    .await?
                {
                    return Ok(outcome);
                }
            }
            _ => {}
        }

        Ok(EditOutcome::Render(Box::new(self.page(session, data)?)))
    }

    /// Load the element; virtual fields only when force-selected.
    async fn load_element(&self, id: &str) -> Result<Option<Row>> {
        let select = self.base.select(self.base.settings.select_codes());
        Ok(self.base.gateway.get_by_id(id, &select).await?)
    }

    async fn edit_action(&self, session: &SessionId, data: &mut Row) -> Result<EditResult> {
        let base = &self.base;
        let messages = &base.ctx.config.messages;
        if !base.view.has_write_rights() {
            warn!(view = base.view.view_name(), %session, "write access denied");
            base.ctx
                .flash
                .add_errors(session, [messages.write_forbidden.clone()]);
            return Ok(EditResult::Rejected);
        }

        // The gateway decides whether the element exists. A key it does not
        // know is dropped so widgets and hooks treat the element as new.
        let pk = &base.primary_key;
        let id = data.get(pk).and_then(id_of);
        let existing = match &id {
            Some(id) => base
                .gateway
                .get_by_id(id, std::slice::from_ref(pk))
                .await?
                .is_some(),
            None => false,
        };
        let id = match id {
            Some(id) if !existing => {
                debug!(%id, "submitted key is not stored, saving as a new element");
                data.shift_remove(pk);
                None
            }
            id => id,
        };

        // Rejected submits are shown again exactly as typed
        let submitted = data.clone();

        let mut widgets = Vec::with_capacity(base.settings.fields.len());
        let mut errors = Vec::new();
        for code in base.settings.fields.keys() {
            let mut widget = base.create_widget(code, data, Stage::EditActionBefore)?;
            widget.process_edit_action(data);
            errors.extend(widget.validation_errors().iter().cloned());
            widgets.push(widget);
        }
        if !errors.is_empty() {
            debug!(count = errors.len(), "validation failed");
            base.ctx.flash.add_errors(session, errors);
            *data = submitted;
            return Ok(EditResult::Rejected);
        }

        let row = self.persisted_row(data);
        let result = match &id {
            Some(id) => base.gateway.update(id, row).await,
            None => base.gateway.add(row).await,
        };
        if !result.is_success() {
            warn!(
                entity = %base.gateway.handle().name,
                errors = ?result.errors,
                "gateway rejected the write"
            );
            base.ctx
                .flash
                .add_errors(session, result.error_messages().to_vec());
            *data = submitted;
            return Ok(EditResult::Rejected);
        }

        let id = match id {
            Some(id) => id,
            None => result.id.clone().ok_or_else(|| AdminError::MissingId {
                entity: base.gateway.handle().name.clone(),
            })?,
        };
        data.insert(pk.clone(), Value::String(id.clone()));
        info!(
            entity = %base.gateway.handle().name,
            %id,
            created = !existing,
            "element saved"
        );

        for widget in &mut widgets {
            widget.context_mut().stage = Stage::EditActionAfter;
            widget.set_data(data.clone());
            widget.process_after_save(data);
        }

        Ok(EditResult::Saved {
            id,
            created: !existing,
        })
    }

    /// Configured, stored fields only. The key travels separately.
    fn persisted_row(&self, data: &Row) -> Row {
        data.iter()
            .filter(|(code, _)| **code != self.base.primary_key)
            .filter(|(code, _)| {
                self.base
                    .settings
                    .get_field(code)
                    .is_some_and(|field| !field.is_virtual())
            })
            .map(|(code, value)| (code.clone(), value.clone()))
            .collect()
    }

    /// Delete with its own rights check; the outcome goes to the flash channel.
    pub async fn delete_element(&self, session: &SessionId, id: &str) -> PersistResult {
        let base = &self.base;
        if !base.view.has_delete_rights() {
            warn!(view = base.view.view_name(), %session, %id, "delete access denied");
            let message = base.ctx.config.messages.delete_forbidden.clone();
            base.ctx.flash.add_errors(session, [message.clone()]);
            return PersistResult::failed([message]);
        }

        let result = base.gateway.delete(id).await;
        if result.is_success() {
            info!(entity = %base.gateway.handle().name, %id, "element deleted");
        } else {
            base.ctx
                .flash
                .add_errors(session, result.error_messages().to_vec());
        }
        result
    }

    fn list_url(&self) -> String {
        self.base
            .urls
            .list_page_url(&url_params([("restore_query", "Y")]))
    }

    fn element_id(&self, data: &Row) -> Option<String> {
        data.get(&self.base.primary_key).and_then(id_of)
    }

    fn page(&self, session: &SessionId, data: Row) -> Result<EditPage> {
        let base = &self.base;
        let config = &base.ctx.config;
        let id = self.element_id(&data);

        let title = match &id {
            Some(id) => Messages::fill(&config.messages.edit_title, &[("ID", id.as_str())]),
            None => config.messages.new_element.clone(),
        };

        let tabs = self.tabs(&data)?;
        let hidden = self.hidden_fields(&data, !base.settings.tabs.is_empty());

        let mut form_params = UrlParams::new();
        if let Some(id) = &id {
            form_params.insert(base.primary_key.clone(), id.clone());
        }

        Ok(EditPage {
            title,
            is_new: id.is_none(),
            menu: self.menu(id.as_deref()),
            form_action: base.urls.edit_page_url(&form_params),
            back_url: base.urls.list_page_url(&url_params([
                ("lang", config.language.as_str()),
                ("restore_query", "Y"),
            ])),
            messages: base.ctx.flash.take(session),
            data,
            tabs,
            hidden,
        })
    }

    fn tabs(&self, data: &Row) -> Result<Vec<TabView>> {
        let base = &self.base;
        let default_tab = &base.ctx.config.default_tab;
        let mut views = Vec::new();

        for tab in base.settings.effective_tabs(&default_tab.label) {
            if !tab.visible {
                continue;
            }
            let mut fields = Vec::new();
            for code in base.settings.fields.keys() {
                let widget = base.create_widget(code, data, Stage::ShowTabElements)?;
                if !on_tab(widget.as_ref(), &tab) {
                    continue;
                }
                fields.push(widget.edit_field(*code == base.primary_key));
            }
            let icon = if tab.is_default() && tab.icon.is_empty() {
                default_tab.icon.clone()
            } else {
                tab.icon.clone()
            };
            views.push(TabView {
                id: tab.id,
                label: tab.label,
                icon,
                fields,
            });
        }
        Ok(views)
    }

    /// Force-selected fields without a tab travel as hidden values when
    /// declared tabs leave them off the form.
    fn hidden_fields(&self, data: &Row, tabs_declared: bool) -> Row {
        self.base
            .settings
            .fields
            .values()
            .filter(|field| field.tab.is_none() && field.force_select)
            .filter(|field| tabs_declared || !field.visible)
            .map(|field| {
                let value = data.get(&field.code).cloned().unwrap_or(Value::Null);
                (field.code.clone(), value)
            })
            .collect()
    }

    fn menu(&self, id: Option<&str>) -> Vec<MenuEntry> {
        let base = &self.base;
        let config = &base.ctx.config;
        let messages = &config.messages;
        let lang = config.language.as_str();

        let mut menu = vec![MenuEntry::Link(MenuItem {
            text: messages.return_to_list.clone(),
            icon: "btn_list".to_string(),
            link: self.list_url(),
            confirm: None,
        })];

        let Some(id) = id else {
            return menu;
        };

        let mut actions = Vec::new();
        if base.view.has_write_rights() {
            actions.push(MenuItem {
                text: messages.add_element.clone(),
                icon: "edit".to_string(),
                link: base.urls.edit_page_url(&url_params([
                    ("action", "add"),
                    ("lang", lang),
                    ("restore_query", "Y"),
                ])),
                confirm: None,
            });
        }
        if base.view.show_delete_button() && base.view.has_delete_rights() {
            actions.push(MenuItem {
                text: messages.delete_element.clone(),
                icon: "delete".to_string(),
                link: base.urls.edit_page_url(&url_params([
                    (base.primary_key.as_str(), id),
                    ("action", "delete"),
                    ("lang", lang),
                    ("restore_query", "Y"),
                ])),
                confirm: Some(messages.delete_confirm.clone()),
            });
        }

        if !actions.is_empty() {
            menu.push(MenuEntry::Separator);
            menu.push(MenuEntry::Submenu {
                text: messages.actions.clone(),
                icon: "btn_new".to_string(),
                items: actions,
            });
        }
        menu
    }

    fn denied_page(&self, session: &SessionId) -> EditPage {
        let base = &self.base;
        EditPage {
            title: String::new(),
            is_new: true,
            data: Row::new(),
            tabs: Vec::new(),
            hidden: Row::new(),
            menu: Vec::new(),
            form_action: base.urls.edit_page_url(&UrlParams::new()),
            back_url: self.list_url(),
            messages: base.ctx.flash.take(session),
        }
    }
}

/// A field shows on its own tab; the default tab shows every field.
fn on_tab(widget: &dyn Widget, tab: &TabConfig) -> bool {
    let settings = &widget.context().settings;
    if !settings.visible {
        return false;
    }
    tab.is_default() || settings.tab.as_deref() == Some(tab.id.as_str())
}

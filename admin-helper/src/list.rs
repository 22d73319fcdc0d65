//! ListController: the page listing a view's elements.
//!
//! Filter, sort and paging go to the gateway untouched. Every visible field
//! becomes a column whose cells come from the field's widget.

use std::sync::Arc;

use admin_helper_store::{id_of, ListQuery, SortBy};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::context::AdminContext;
use crate::error::Result;
use crate::flash::{FlashMessages, SessionId};
use crate::helper::HelperBase;
use crate::url::{url_params, UrlParams};
use crate::view::AdminView;
use crate::widget::Stage;

/// Bulk actions applied to selected rows before the page is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    Delete(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct ListRequest {
    pub session: SessionId,
    /// 1-based page number
    pub page: usize,
    /// Rows per page; `None` shows all rows
    pub page_size: Option<usize>,
    pub filter: IndexMap<String, Value>,
    pub sort: Option<SortBy>,
    pub action: Option<ListAction>,
}

impl ListRequest {
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            page: 1,
            page_size: None,
            filter: IndexMap::new(),
            sort: None,
            action: None,
        }
    }

    pub fn with_page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page.max(1);
        self.page_size = Some(page_size);
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.insert(field.into(), value.into());
        self
    }

    pub fn with_sort(mut self, sort: SortBy) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_action(mut self, action: ListAction) -> Self {
        self.action = Some(action);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListColumn {
    pub code: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRow {
    pub id: Option<String>,
    pub cells: IndexMap<String, Value>,
    pub edit_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage {
    pub columns: Vec<ListColumn>,
    pub rows: Vec<ListRow>,
    /// Matching rows across all pages
    pub total: usize,
    pub page: usize,
    /// Link to a blank edit page, when the user may create elements
    pub add_url: Option<String>,
    pub messages: FlashMessages,
}

pub struct ListController {
    base: HelperBase,
}

impl ListController {
    pub fn new(ctx: AdminContext, view: Arc<dyn AdminView>) -> Result<Self> {
        Ok(Self {
            base: HelperBase::new(ctx, view)?,
        })
    }

    pub async fn handle(&self, request: ListRequest) -> Result<ListPage> {
        let session = &request.session;
        if !self.base.check_read_rights(session) {
            return Ok(ListPage {
                columns: Vec::new(),
                rows: Vec::new(),
                total: 0,
                page: request.page,
                add_url: None,
                messages: self.base.ctx.flash.take(session),
            });
        }

        if let Some(ListAction::Delete(ids)) = &request.action {
            self.group_delete(session, ids).await;
        }

        let columns = self.columns();
        let query = self.query(&request);
        let result = self.base.gateway.list(&query).await?;
        debug!(
            view = self.base.view.view_name(),
            rows = result.rows.len(),
            total = result.total,
            "list loaded"
        );

        let mut rows = Vec::with_capacity(result.rows.len());
        for row in result.rows {
            let id = row.get(&self.base.primary_key).and_then(id_of);
            let mut cells = IndexMap::new();
            for column in &columns {
                let widget = self.base.create_widget(&column.code, &row, Stage::ListRow)?;
                cells.insert(column.code.clone(), widget.list_cell());
            }
            let mut params = UrlParams::new();
            if let Some(id) = &id {
                params.insert(self.base.primary_key.clone(), id.clone());
            }
            rows.push(ListRow {
                edit_url: self.base.urls.edit_page_url(&params),
                id,
                cells,
            });
        }

        let add_url = self
            .base
            .view
            .has_write_rights()
            .then(|| self.base.urls.edit_page_url(&UrlParams::new()));

        Ok(ListPage {
            columns,
            rows,
            total: result.total,
            page: request.page,
            add_url,
            messages: self.base.ctx.flash.take(session),
        })
    }

    fn columns(&self) -> Vec<ListColumn> {
        self.base
            .settings
            .fields
            .values()
            .filter(|field| field.visible)
            .map(|field| ListColumn {
                code: field.code.clone(),
                title: if field.title.is_empty() {
                    field.code.clone()
                } else {
                    field.title.clone()
                },
            })
            .collect()
    }

    /// Visible stored fields plus the primary key; paging is 1-based.
    fn query(&self, request: &ListRequest) -> ListQuery {
        let select = self.base.select(
            self.base
                .settings
                .fields
                .values()
                .filter(|field| field.visible && field.is_selected())
                .map(|field| field.code.clone()),
        );
        let offset = match request.page_size {
            Some(size) => (request.page.max(1) - 1) * size,
            None => 0,
        };
        ListQuery {
            select,
            filter: request.filter.clone(),
            sort: request.sort.clone(),
            offset,
            limit: request.page_size,
        }
    }

    /// Delete every id; failures are collected into the flash channel.
    async fn group_delete(&self, session: &SessionId, ids: &[String]) {
        let base = &self.base;
        if !base.view.has_delete_rights() {
            warn!(view = base.view.view_name(), %session, "group delete denied");
            base.ctx
                .flash
                .add_errors(session, [base.ctx.config.messages.delete_forbidden.clone()]);
            return;
        }

        let mut errors = Vec::new();
        let mut deleted = 0usize;
        for id in ids {
            let result = base.gateway.delete(id).await;
            if result.is_success() {
                deleted += 1;
            } else {
                errors.extend(result.errors);
            }
        }
        info!(
            entity = %base.gateway.handle().name,
            deleted,
            failed = ids.len() - deleted,
            "group delete"
        );
        base.ctx.flash.add_errors(session, errors);
    }

    /// Link back to this list keeping its filter state.
    pub fn list_url(&self) -> String {
        self.base
            .urls
            .list_page_url(&url_params([("restore_query", "Y")]))
    }
}

//! Declarative list and edit pages for any entity store.
//!
//! A host registers, per `(module, view)`, the fields and tabs of an admin
//! page once. This crate then drives both pages: rights checks, loading,
//! per-field widgets, the validate, persist and post-process pipeline,
//! delete and custom actions, canonical links and flash messages across
//! redirects.
//!
//! Nothing here renders markup. Controllers return view models
//! ([`EditPage`], [`ListPage`]) or a redirect, and the host renders them.
//!
//! ```no_run
//! use std::sync::Arc;
//! use admin_helper::{AdminContext, AdminView, EditController, EditRequest, SessionId};
//! use admin_helper_config::AdminConfig;
//! use admin_helper_fields::{FieldConfig, FieldRegistry, InterfaceSettings, WidgetKind};
//! use admin_helper_store::{EntityRegistry, MemoryGateway};
//!
//! struct Companies;
//!
//! impl AdminView for Companies {
//!     fn module(&self) -> &str { "crm" }
//!     fn view_name(&self) -> &str { "companies" }
//!     fn entity(&self) -> &str { "companies" }
//! }
//!
//! # async fn run(params: admin_helper::RequestParams) -> admin_helper::Result<()> {
//! let fields = FieldRegistry::new();
//! fields.register(
//!     "crm",
//!     "companies",
//!     InterfaceSettings::new().field(FieldConfig::new("NAME", WidgetKind::text()).required()),
//! );
//! let entities = EntityRegistry::new()
//!     .with("companies", Arc::new(MemoryGateway::new("companies", "crm_companies")));
//! let ctx = AdminContext::new(AdminConfig::load(None)?, fields, entities);
//!
//! let controller = EditController::new(ctx, Arc::new(Companies))?;
//! let outcome = controller
//!     .handle(EditRequest::from_params(SessionId::new("session"), params))
//!     .await?;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

mod context;
mod edit;
mod error;
mod flash;
mod helper;
mod intent;
mod list;
mod url;
mod view;
pub mod widget;

pub use context::AdminContext;
pub use edit::{EditController, EditOutcome, EditPage, MenuEntry, MenuItem, TabView};
pub use error::{AdminError, Result};
pub use flash::{FlashMessages, FlashStore, SessionId};
pub use intent::{EditRequest, Intent, RequestParams};
pub use list::{ListAction, ListColumn, ListController, ListPage, ListRequest, ListRow};
pub use url::{url_params, UrlParams, ViewUrls};
pub use view::{ActionContext, AdminView};
pub use widget::{FieldView, Stage, Widget, WidgetContext, WidgetFactory};

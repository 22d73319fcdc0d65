//! Field and tab registry for declarative admin views
//!
//! `admin-helper-fields` is a schema-only crate. It knows how a view's fields
//! and tabs are configured, not how their values are stored or rendered.
//!
//! # Architecture
//!
//! - **Keyed by module and view**: every admin page is addressed by `(module, view)`
//! - **Write once**: a second registration for the same key is rejected and the
//!   first one stays in effect
//! - **Ordered**: fields keep their registration order, which drives widget order
//!   in the edit pipeline
//! - **YAML friendly**: interface settings can be declared in YAML and parsed at bootstrap

pub mod error;
pub mod registry;
pub mod types;

pub use error::{FieldsError, Result};
pub use registry::FieldRegistry;
pub use types::{
    FieldConfig, InterfaceSettings, SelectOption, TabConfig, WidgetKind, DEFAULT_TAB_ID,
};

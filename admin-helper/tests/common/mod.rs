//! Shared fixtures for the controller integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use admin_helper::{
    ActionContext, AdminContext, AdminView, EditOutcome, FlashStore, Result, SessionId,
    WidgetContext, WidgetFactory,
};
use admin_helper_config::AdminConfig;
use admin_helper_fields::{
    FieldConfig, FieldRegistry, InterfaceSettings, SelectOption, TabConfig, WidgetKind,
};
use admin_helper_store::{
    EntityGateway, EntityHandle, EntityRegistry, ListQuery, ListResult, MemoryGateway,
    PersistResult, Row,
};
use async_trait::async_trait;
use serde_json::{json, Value};

pub const LIST_URL: &str = "/admin/route?lang=en&module=crm&view=companies&restore_query=Y";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("admin_helper=debug")
        .with_test_writer()
        .try_init();
}

pub fn row(pairs: &[(&str, Value)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

pub fn session() -> SessionId {
    SessionId::new("editor-1")
}

/// Companies page with switchable rights.
pub struct CompaniesView {
    pub read: bool,
    pub write: bool,
    pub delete: bool,
}

impl Default for CompaniesView {
    fn default() -> Self {
        Self {
            read: true,
            write: true,
            delete: true,
        }
    }
}

#[async_trait]
impl AdminView for CompaniesView {
    fn module(&self) -> &str {
        "crm"
    }

    fn view_name(&self) -> &str {
        "companies"
    }

    fn entity(&self) -> &str {
        "companies"
    }

    fn has_read_rights(&self) -> bool {
        self.read
    }

    fn has_write_rights(&self) -> bool {
        self.write
    }

    fn has_delete_rights(&self) -> bool {
        self.delete
    }

    /// The registration code is fixed once a company exists.
    fn on_widget_created(&self, widget: &mut WidgetContext, row: &Row) {
        if widget.code == "CODE" && row.contains_key("ID") {
            widget.settings.read_only = true;
        }
    }

    async fn custom_action(
        &self,
        action: &str,
        id: Option<&str>,
        ctx: &ActionContext,
    ) -> Result<Option<EditOutcome>> {
        let (Some(id), "archive") = (id, action) else {
            return Ok(None);
        };
        let result = ctx
            .gateway
            .update(id, row(&[("ACTIVE", json!("N"))]))
            .await;
        if result.is_success() {
            ctx.flash.add_notes(&ctx.session, [format!("{id} archived")]);
        }
        Ok(Some(ctx.redirect_to_list()))
    }
}

/// Contacts page with declared tabs.
pub struct ContactsView;

impl AdminView for ContactsView {
    fn module(&self) -> &str {
        "crm"
    }

    fn view_name(&self) -> &str {
        "contacts"
    }

    fn entity(&self) -> &str {
        "contacts"
    }

    fn show_delete_button(&self) -> bool {
        false
    }
}

pub fn companies_settings() -> InterfaceSettings {
    InterfaceSettings::new()
        .field(FieldConfig::new(
            "ID",
            WidgetKind::Number {
                min: None,
                max: None,
                integer: true,
            },
        ))
        .field(FieldConfig::new("NAME", WidgetKind::text()).required())
        .field(FieldConfig::new("CODE", WidgetKind::text()))
        .field(FieldConfig::new("CITY", WidgetKind::text()).with_title("City"))
        .field(
            FieldConfig::new(
                "EMPLOYEES",
                WidgetKind::Number {
                    min: Some(0.0),
                    max: Some(100000.0),
                    integer: true,
                },
            )
            .with_title("Employees"),
        )
        .field(FieldConfig::new("ACTIVE", WidgetKind::Boolean).with_default("Y"))
        .field(FieldConfig::new(
            "LABEL",
            WidgetKind::Computed {
                derive: "label".into(),
            },
        ))
}

pub fn contacts_settings() -> InterfaceSettings {
    InterfaceSettings::new()
        .tab(TabConfig::new("main", "Contact"))
        .tab(TabConfig::new("extra", "More").with_icon("more"))
        .tab(TabConfig::new("audit", "Audit").hidden())
        .field(FieldConfig::new("ID", WidgetKind::text()).on_tab("main"))
        .field(FieldConfig::new("NAME", WidgetKind::text()).on_tab("main"))
        .field(FieldConfig::new("NOTES", WidgetKind::text()).on_tab("extra"))
        .field(FieldConfig::new("INTERNAL", WidgetKind::text()).on_tab("main").hidden())
        .field(FieldConfig::new("TOKEN", WidgetKind::text()).force_select())
        .field(FieldConfig::new("CREATED_BY", WidgetKind::text()).on_tab("audit"))
        .field(
            FieldConfig::new(
                "STATUS",
                WidgetKind::Select {
                    options: vec![SelectOption::new("lead"), SelectOption::new("customer")],
                    multiple: false,
                },
            )
            .on_tab("audit"),
        )
}

/// Delegates to a [`MemoryGateway`] and counts writes.
pub struct CountingGateway {
    pub inner: MemoryGateway,
    pub adds: AtomicUsize,
    pub updates: AtomicUsize,
    pub deletes: AtomicUsize,
    pub selects: Mutex<Vec<Vec<String>>>,
}

impl CountingGateway {
    pub fn new(inner: MemoryGateway) -> Self {
        Self {
            inner,
            adds: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            selects: Mutex::new(Vec::new()),
        }
    }

    pub fn adds(&self) -> usize {
        self.adds.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub async fn stored(&self, id: &str) -> Option<Row> {
        self.inner.get_by_id(id, &[]).await.unwrap()
    }
}

#[async_trait]
impl EntityGateway for CountingGateway {
    fn handle(&self) -> &EntityHandle {
        self.inner.handle()
    }

    async fn get_by_id(&self, id: &str, select: &[String]) -> admin_helper_store::Result<Option<Row>> {
        self.selects.lock().unwrap().push(select.to_vec());
        self.inner.get_by_id(id, select).await
    }

    async fn add(&self, row: Row) -> PersistResult {
        self.adds.fetch_add(1, Ordering::SeqCst);
        self.inner.add(row).await
    }

    async fn update(&self, id: &str, row: Row) -> PersistResult {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update(id, row).await
    }

    async fn delete(&self, id: &str) -> PersistResult {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(id).await
    }

    async fn list(&self, query: &ListQuery) -> admin_helper_store::Result<ListResult> {
        self.inner.list(query).await
    }
}

/// A wired context plus handles on its stores.
pub struct Fixture {
    pub ctx: AdminContext,
    pub companies: Arc<CountingGateway>,
    pub contacts: Arc<MemoryGateway>,
    pub flash: Arc<FlashStore>,
}

pub fn fixture() -> Fixture {
    fixture_with(MemoryGateway::new("companies", "crm_companies"), WidgetFactory::new())
}

pub fn fixture_with(companies: MemoryGateway, widgets: WidgetFactory) -> Fixture {
    init_tracing();

    let fields = FieldRegistry::new();
    assert!(fields.register("crm", "companies", companies_settings()));
    assert!(fields.register("crm", "contacts", contacts_settings()));

    let companies = Arc::new(CountingGateway::new(companies));
    let contacts = Arc::new(MemoryGateway::new("contacts", "crm_contacts"));
    let entities = EntityRegistry::new()
        .with("companies", companies.clone())
        .with("contacts", contacts.clone());

    let widgets = widgets.with_derivation("label", |row: &Row| {
        let name = row.get("NAME").and_then(Value::as_str).unwrap_or_default();
        let city = row.get("CITY").and_then(Value::as_str).unwrap_or_default();
        json!(format!("{name} ({city})"))
    });

    let flash = Arc::new(FlashStore::new());
    let ctx = AdminContext::new(AdminConfig::default(), fields, entities)
        .with_widgets(widgets)
        .with_flash(flash.clone());

    Fixture {
        ctx,
        companies,
        contacts,
        flash,
    }
}

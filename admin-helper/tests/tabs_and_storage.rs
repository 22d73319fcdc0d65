//! Tab layout of declared tabs, and the edit cycle against file storage

mod common;

use std::sync::Arc;

use admin_helper::{AdminContext, EditController, EditOutcome, EditRequest, Intent, MenuEntry};
use admin_helper_config::AdminConfig;
use admin_helper_fields::{FieldConfig, FieldRegistry, InterfaceSettings, WidgetKind};
use admin_helper_store::{EntityGateway, EntityRegistry, FileGateway};
use common::{fixture, row, session, CompaniesView, ContactsView};
use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn declared_tabs_show_their_own_fields() {
    let fixture = fixture();
    fixture
        .contacts
        .seed([row(&[
            ("ID", json!("1")),
            ("NAME", json!("Milton")),
            ("NOTES", json!("red stapler")),
            ("INTERNAL", json!("x")),
            ("TOKEN", json!("t-1")),
            ("CREATED_BY", json!("bill")),
        ])])
        .await;
    let controller = EditController::new(fixture.ctx.clone(), Arc::new(ContactsView)).unwrap();

    let page = controller
        .handle(EditRequest::new(session(), Intent::View).with_param("ID", "1"))
        .await
        .unwrap()
        .page()
        .cloned()
        .unwrap();

    let tabs: Vec<_> = page.tabs.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(tabs, ["main", "extra"]);

    let main: Vec<_> = page.tabs[0].fields.iter().map(|f| f.code.as_str()).collect();
    assert_eq!(main, ["ID", "NAME"]);
    assert_eq!(page.tabs[0].icon, "");
    let extra: Vec<_> = page.tabs[1].fields.iter().map(|f| f.code.as_str()).collect();
    assert_eq!(extra, ["NOTES"]);
    assert_eq!(page.tabs[1].icon, "more");

    assert_eq!(page.hidden.len(), 1);
    assert_eq!(page.hidden["TOKEN"], json!("t-1"));

    // Delete is suppressed by the view, adding is still offered
    let MenuEntry::Submenu { items, .. } = &page.menu[2] else {
        panic!("expected the actions submenu");
    };
    assert_eq!(items.len(), 1);
    assert!(items[0].link.contains("action=add"));
}

#[tokio::test]
async fn default_tab_layout_carries_no_hidden_values() {
    let fixture = fixture();
    let controller =
        EditController::new(fixture.ctx.clone(), Arc::new(CompaniesView::default())).unwrap();
    let page = controller
        .handle(EditRequest::new(session(), Intent::View))
        .await
        .unwrap()
        .page()
        .cloned()
        .unwrap();
    assert!(page.hidden.is_empty());
}

#[tokio::test]
async fn edit_cycle_against_file_storage() {
    common::init_tracing();
    let temp = TempDir::new().unwrap();
    let gateway = Arc::new(FileGateway::new("companies", temp.path().join("companies")));

    let fields = FieldRegistry::new();
    fields.register(
        "crm",
        "companies",
        InterfaceSettings::new()
            .field(FieldConfig::new("NAME", WidgetKind::text()).required())
            .field(FieldConfig::new("CITY", WidgetKind::text())),
    );
    let entities = EntityRegistry::new().with("companies", gateway.clone());
    let ctx = AdminContext::new(AdminConfig::default(), fields, entities);
    let controller = EditController::new(ctx, Arc::new(CompaniesView::default())).unwrap();

    let outcome = controller
        .handle(
            EditRequest::new(session(), Intent::Apply)
                .with_field("NAME", "Acme")
                .with_field("CITY", "Springfield"),
        )
        .await
        .unwrap();
    let EditOutcome::Redirect { url, created_id } = outcome else {
        panic!("expected a redirect");
    };
    let id = created_id.unwrap();
    assert!(url.ends_with(&format!("&ID={id}")));
    assert!(temp.path().join("companies").join(format!("{id}.yaml")).exists());

    let page = controller
        .handle(EditRequest::new(session(), Intent::View).with_param("ID", id.clone()))
        .await
        .unwrap()
        .page()
        .cloned()
        .unwrap();
    assert_eq!(page.data["NAME"], json!("Acme"));

    let outcome = controller
        .handle(
            EditRequest::new(session(), Intent::Save)
                .with_param("ID", id.clone())
                .with_field("CITY", "Shelbyville"),
        )
        .await
        .unwrap();
    assert_eq!(outcome.redirect_url(), Some(common::LIST_URL));

    let stored = gateway.get_by_id(&id, &[]).await.unwrap().unwrap();
    assert_eq!(stored["NAME"], json!("Acme"));
    assert_eq!(stored["CITY"], json!("Shelbyville"));
}

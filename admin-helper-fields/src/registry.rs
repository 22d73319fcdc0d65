//! FieldRegistry: the process-wide store of interface settings.
//!
//! Populated once at bootstrap and shared by `Arc` with every controller.
//! Each `(module, view)` key can be written exactly once; readers receive
//! cheap `Arc` snapshots that never change underneath them.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::error::{FieldsError, Result};
use crate::types::InterfaceSettings;

/// Registry of interface settings keyed by `(module, view)`.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    views: DashMap<(String, String), Arc<InterfaceSettings>>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the settings of a view.
    ///
    /// Returns `false` without touching the registry when `module` is empty,
    /// `settings` declares no fields, or the key is already registered.
    /// Concurrent registrations of one key are resolved by the entry lock:
    /// exactly one caller wins.
    pub fn register(&self, module: &str, view: &str, settings: InterfaceSettings) -> bool {
        if module.is_empty() {
            warn!(view, "rejected interface registration without module");
            return false;
        }
        if settings.is_empty() {
            warn!(module, view, "rejected empty interface registration");
            return false;
        }

        match self.views.entry((module.to_string(), view.to_string())) {
            Entry::Occupied(_) => {
                warn!(module, view, "interface already registered, keeping first");
                false
            }
            Entry::Vacant(slot) => {
                debug!(
                    module,
                    view,
                    fields = settings.fields.len(),
                    tabs = settings.tabs.len(),
                    "registered interface"
                );
                slot.insert(Arc::new(settings));
                true
            }
        }
    }

    /// Parse YAML settings and register them.
    ///
    /// Malformed YAML is an error; a rejected registration is `Ok(false)`.
    pub fn register_yaml(&self, module: &str, view: &str, yaml: &str) -> Result<bool> {
        let settings = InterfaceSettings::from_yaml(yaml)?;
        Ok(self.register(module, view, settings))
    }

    /// Settings of a view. A missing view is a configuration error.
    pub fn get(&self, module: &str, view: &str) -> Result<Arc<InterfaceSettings>> {
        self.views
            .get(&(module.to_string(), view.to_string()))
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| FieldsError::NotConfigured {
                module: module.to_string(),
                view: view.to_string(),
            })
    }

    pub fn contains(&self, module: &str, view: &str) -> bool {
        self.views
            .contains_key(&(module.to_string(), view.to_string()))
    }

    /// Names of the views registered for a module, sorted.
    pub fn views(&self, module: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .views
            .iter()
            .filter(|entry| entry.key().0 == module)
            .map(|entry| entry.key().1.clone())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldConfig, TabConfig, WidgetKind};

    fn settings_with(code: &str) -> InterfaceSettings {
        InterfaceSettings::new()
            .field(FieldConfig::new(code, WidgetKind::text()))
            .tab(TabConfig::new("MAIN", "Main"))
    }

    #[test]
    fn register_and_get() {
        let registry = FieldRegistry::new();
        assert!(registry.register("shop", "orders", settings_with("NAME")));

        let settings = registry.get("shop", "orders").unwrap();
        assert!(settings.get_field("NAME").is_some());
        assert!(registry.contains("shop", "orders"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn second_registration_is_rejected_and_first_kept() {
        let registry = FieldRegistry::new();
        assert!(registry.register("shop", "orders", settings_with("NAME")));
        assert!(!registry.register("shop", "orders", settings_with("TITLE")));

        let settings = registry.get("shop", "orders").unwrap();
        assert!(settings.get_field("NAME").is_some());
        assert!(settings.get_field("TITLE").is_none());
    }

    #[test]
    fn same_view_in_other_module_is_independent() {
        let registry = FieldRegistry::new();
        assert!(registry.register("shop", "items", settings_with("NAME")));
        assert!(registry.register("blog", "items", settings_with("TITLE")));
        assert!(registry.get("blog", "items").unwrap().get_field("TITLE").is_some());
        assert_eq!(registry.views("shop"), vec!["items"]);
    }

    #[test]
    fn empty_module_or_settings_rejected() {
        let registry = FieldRegistry::new();
        assert!(!registry.register("", "orders", settings_with("NAME")));
        assert!(!registry.register("shop", "orders", InterfaceSettings::new()));
        assert!(registry.is_empty());
    }

    #[test]
    fn missing_view_is_configuration_error() {
        let registry = FieldRegistry::new();
        let err = registry.get("shop", "missing").unwrap_err();
        assert!(err.is_configuration_error());
        assert!(matches!(err, FieldsError::NotConfigured { .. }));
    }

    #[test]
    fn register_yaml_rejects_malformed_input() {
        let registry = FieldRegistry::new();
        assert!(registry.register_yaml("shop", "orders", "fields: [").is_err());
        let yaml = "fields:\n  NAME:\n    widget:\n      kind: text\n";
        assert!(registry.register_yaml("shop", "orders", yaml).unwrap());
        assert!(!registry.register_yaml("shop", "orders", yaml).unwrap());
    }

    #[tokio::test]
    async fn concurrent_registration_has_single_winner() {
        let registry = Arc::new(FieldRegistry::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.register("shop", "orders", settings_with(&format!("F{i}")))
            }));
        }

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(registry.get("shop", "orders").unwrap().fields.len(), 1);
    }
}

//! Admin helper configuration management using Figment
//!
//! Configuration is layered with a clear precedence (later sources win):
//!
//! 1. Built-in defaults ([`AdminConfig::default`])
//! 2. An optional configuration file (TOML, YAML or JSON, chosen by extension)
//! 3. Environment variables prefixed with `ADMIN_HELPER_`; nested keys are
//!    separated by a double underscore (`ADMIN_HELPER_DEFAULT_TAB__LABEL`)
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! router_url: /bitrix/admin/route.php
//! language: de
//! primary_key: ID
//! default_tab:
//!   label: Element
//! messages:
//!   new_element: Neues Element
//! ```

mod error;
mod messages;

use std::path::Path;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub use error::{ConfigError, ConfigResult};
pub use messages::Messages;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "ADMIN_HELPER_";

/// Settings of the synthesised tab used when a view declares none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultTab {
    pub label: String,
    pub icon: String,
}

impl Default for DefaultTab {
    fn default() -> Self {
        Self {
            label: "Element".to_string(),
            icon: "main_user_edit".to_string(),
        }
    }
}

/// Runtime configuration shared by every admin controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Address of the request router every list and edit page goes through
    pub router_url: String,
    /// Value of the `lang` parameter on generated links
    pub language: String,
    /// Primary key column used when a view does not override it
    pub primary_key: String,
    pub default_tab: DefaultTab,
    pub messages: Messages,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            router_url: "/admin/route".to_string(),
            language: "en".to_string(),
            primary_key: "ID".to_string(),
            default_tab: DefaultTab::default(),
            messages: Messages::default(),
        }
    }
}

impl AdminConfig {
    /// Load defaults, then `file` when given, then `ADMIN_HELPER_*` variables.
    pub fn load(file: Option<&Path>) -> ConfigResult<Self> {
        let figment = Self::figment(file)?;
        let config: AdminConfig = figment.extract()?;
        debug!(
            router_url = %config.router_url,
            language = %config.language,
            "loaded admin configuration"
        );
        Ok(config)
    }

    /// Build the layered figment without extracting it.
    pub fn figment(file: Option<&Path>) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(AdminConfig::default()));

        if let Some(path) = file {
            trace!("Loading config file: {}", path.display());
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => return Err(ConfigError::unsupported_format(path)),
            };
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_defaults_without_sources() {
        let config = AdminConfig::load(None).unwrap();
        assert_eq!(config, AdminConfig::default());
        assert_eq!(config.default_tab.label, "Element");
    }

    #[test]
    #[serial]
    fn test_yaml_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("admin.yaml");
        fs::write(
            &path,
            "router_url: /bitrix/admin/route.php\nlanguage: de\nmessages:\n  new_element: Neues Element\n",
        )
        .unwrap();

        let config = AdminConfig::load(Some(&path)).unwrap();
        assert_eq!(config.router_url, "/bitrix/admin/route.php");
        assert_eq!(config.language, "de");
        assert_eq!(config.messages.new_element, "Neues Element");
        // Untouched keys keep their defaults
        assert_eq!(config.primary_key, "ID");
        assert_eq!(config.messages.actions, Messages::default().actions);
    }

    #[test]
    #[serial]
    fn test_toml_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("admin.toml");
        fs::write(&path, "primary_key = \"UF_ID\"\n[default_tab]\nlabel = \"Main\"\n").unwrap();

        let config = AdminConfig::load(Some(&path)).unwrap();
        assert_eq!(config.primary_key, "UF_ID");
        assert_eq!(config.default_tab.label, "Main");
        assert_eq!(config.default_tab.icon, "main_user_edit");
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("admin.json");
        fs::write(&path, r#"{"language": "fr"}"#).unwrap();

        std::env::set_var("ADMIN_HELPER_LANGUAGE", "it");
        std::env::set_var("ADMIN_HELPER_DEFAULT_TAB__LABEL", "Scheda");
        let config = AdminConfig::load(Some(&path));
        std::env::remove_var("ADMIN_HELPER_LANGUAGE");
        std::env::remove_var("ADMIN_HELPER_DEFAULT_TAB__LABEL");

        let config = config.unwrap();
        assert_eq!(config.language, "it");
        assert_eq!(config.default_tab.label, "Scheda");
    }

    #[test]
    #[serial]
    fn test_unsupported_extension() {
        let err = AdminConfig::load(Some(Path::new("admin.ini"))).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }
}

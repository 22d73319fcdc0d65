//! Canonical links to list and edit pages.
//!
//! Other tooling links to these pages, so the shape is fixed:
//!
//! ```text
//! {router_url}?lang={lang}&module={module}&view={view}[&{params}]
//! {page_url}?lang={lang}[&{params}]
//! ```
//!
//! Caller params never repeat `lang`, `module` or `view`; those keys are
//! dropped before the rest is form-urlencoded in insertion order.

use indexmap::IndexMap;

use admin_helper_config::AdminConfig;

use crate::view::AdminView;

/// Query parameters for a generated link, in output order.
pub type UrlParams = IndexMap<String, String>;

const RESERVED: [&str; 3] = ["lang", "module", "view"];

/// Link builder for one `(module, view)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewUrls {
    router_url: String,
    language: String,
    module: String,
    list_view: String,
    edit_view: String,
    list_page_url: Option<String>,
    edit_page_url: Option<String>,
    additional: UrlParams,
}

impl ViewUrls {
    pub fn new(config: &AdminConfig, module: impl Into<String>, view: impl Into<String>) -> Self {
        let view = view.into();
        Self {
            router_url: config.router_url.clone(),
            language: config.language.clone(),
            module: module.into(),
            list_view: view.clone(),
            edit_view: view,
            list_page_url: None,
            edit_page_url: None,
            additional: UrlParams::new(),
        }
    }

    /// Links for `view`, honouring its list/edit names and URL overrides.
    pub fn for_view(config: &AdminConfig, view: &dyn AdminView) -> Self {
        let mut urls = Self::new(config, view.module(), view.view_name());
        if let Some(name) = view.list_view_name() {
            urls.list_view = name.to_string();
        }
        if let Some(name) = view.edit_view_name() {
            urls.edit_view = name.to_string();
        }
        urls.list_page_url = view.list_page_url().map(str::to_string);
        urls.edit_page_url = view.edit_page_url().map(str::to_string);
        urls.additional = view.additional_url_params();
        urls
    }

    pub fn with_list_view(mut self, name: impl Into<String>) -> Self {
        self.list_view = name.into();
        self
    }

    pub fn with_edit_view(mut self, name: impl Into<String>) -> Self {
        self.edit_view = name.into();
        self
    }

    /// Link list pages to `url` instead of the router.
    pub fn with_list_page_url(mut self, url: impl Into<String>) -> Self {
        self.list_page_url = Some(url.into());
        self
    }

    /// Link edit pages to `url` instead of the router.
    pub fn with_edit_page_url(mut self, url: impl Into<String>) -> Self {
        self.edit_page_url = Some(url.into());
        self
    }

    /// Params added to every list and edit link, before the caller's own.
    pub fn with_additional_params(mut self, params: UrlParams) -> Self {
        self.additional = params;
        self
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Link to `view`, or to `default_url` when one is given.
    pub fn view_url(&self, view: &str, default_url: Option<&str>, params: &UrlParams) -> String {
        let mut url = match default_url {
            Some(base) => format!("{base}?lang={}", self.language),
            None => format!(
                "{}?lang={}&module={}&view={view}",
                self.router_url, self.language, self.module
            ),
        };

        let query = encode(params);
        if !query.is_empty() {
            url.push('&');
            url.push_str(&query);
        }
        url
    }

    pub fn list_page_url(&self, params: &UrlParams) -> String {
        self.view_url(
            &self.list_view,
            self.list_page_url.as_deref(),
            &self.with_additional(params),
        )
    }

    pub fn edit_page_url(&self, params: &UrlParams) -> String {
        self.view_url(
            &self.edit_view,
            self.edit_page_url.as_deref(),
            &self.with_additional(params),
        )
    }

    fn with_additional(&self, params: &UrlParams) -> UrlParams {
        if self.additional.is_empty() {
            return params.clone();
        }
        let mut merged = self.additional.clone();
        merged.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

fn encode(params: &UrlParams) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        if !RESERVED.contains(&key.as_str()) {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}

/// Build [`UrlParams`] from string pairs.
pub fn url_params<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> UrlParams
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

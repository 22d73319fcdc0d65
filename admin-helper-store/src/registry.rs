//! EntityRegistry: entity tokens mapped to concrete gateways.
//!
//! Populated at startup. Resolution never builds anything on demand: an
//! unknown token is a wiring error.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::gateway::EntityGateway;

#[derive(Default)]
pub struct EntityRegistry {
    gateways: HashMap<String, Arc<dyn EntityGateway>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a gateway under `token`, replacing any previous one.
    pub fn register(&mut self, token: impl Into<String>, gateway: Arc<dyn EntityGateway>) {
        let token = token.into();
        debug!(%token, table = gateway.table_name(), "registered entity gateway");
        self.gateways.insert(token, gateway);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, token: impl Into<String>, gateway: Arc<dyn EntityGateway>) -> Self {
        self.register(token, gateway);
        self
    }

    pub fn resolve(&self, token: &str) -> Result<Arc<dyn EntityGateway>> {
        self.gateways
            .get(token)
            .cloned()
            .ok_or_else(|| StoreError::UnresolvableEntity {
                token: token.to_string(),
            })
    }

    /// Table name behind `token`, for display and diagnostics.
    pub fn table_name_of(&self, token: &str) -> Result<String> {
        Ok(self.resolve(token)?.table_name().to_string())
    }

    pub fn tokens(&self) -> Vec<&str> {
        let mut tokens: Vec<&str> = self.gateways.keys().map(String::as_str).collect();
        tokens.sort_unstable();
        tokens
    }
}

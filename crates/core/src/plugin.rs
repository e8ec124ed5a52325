use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::adapters::DatabaseAdapter;
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::payments::PaymentsGateway;
use crate::session::SessionManager;
use crate::types::{AppRequest, AppResponse, HttpMethod};

/// Plugin trait implemented by each feature area (invoices, billing, teams, ...).
///
/// Generic over `DB` so plugins share the orchestrator's concrete adapter.
#[async_trait]
pub trait AppPlugin<DB: DatabaseAdapter>: Send + Sync {
    /// Plugin name - should be unique
    fn name(&self) -> &'static str;

    /// Routes that this plugin handles
    fn routes(&self) -> Vec<Route>;

    /// Called when the plugin is initialized
    async fn on_init(&self, ctx: &mut AppContext<DB>) -> AppResult<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called for each request - return Some(response) to handle, None to pass through
    async fn on_request(
        &self,
        req: &AppRequest,
        ctx: &AppContext<DB>,
    ) -> AppResult<Option<AppResponse>>;
}

/// Route definition for plugins
#[derive(Debug, Clone)]
pub struct Route {
    pub path: String,
    pub method: HttpMethod,
    /// Identifier for the operation, used in logs and route listings.
    pub operation_id: String,
}

impl Route {
    pub fn new(method: HttpMethod, path: impl Into<String>, operation_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            operation_id: operation_id.into(),
        }
    }

    pub fn get(path: impl Into<String>, operation_id: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path, operation_id)
    }

    pub fn post(path: impl Into<String>, operation_id: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path, operation_id)
    }

    pub fn put(path: impl Into<String>, operation_id: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path, operation_id)
    }

    pub fn delete(path: impl Into<String>, operation_id: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path, operation_id)
    }
}

/// Context passed to plugin methods
pub struct AppContext<DB: DatabaseAdapter> {
    pub config: Arc<AppConfig>,
    pub database: Arc<DB>,
    pub gateway: Arc<dyn PaymentsGateway>,
    session_manager: Arc<SessionManager<DB>>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl<DB: DatabaseAdapter> AppContext<DB> {
    pub fn new(
        config: Arc<AppConfig>,
        database: Arc<DB>,
        gateway: Arc<dyn PaymentsGateway>,
    ) -> Self {
        let session_manager = Arc::new(SessionManager::new(config.clone(), database.clone()));
        Self {
            config,
            database,
            gateway,
            session_manager,
            metadata: HashMap::new(),
        }
    }

    pub fn session_manager(&self) -> &SessionManager<DB> {
        &self.session_manager
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.metadata.insert(key.into(), value);
    }

    pub fn get_metadata(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }
}

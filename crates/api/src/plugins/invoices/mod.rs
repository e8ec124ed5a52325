pub mod handlers;
#[cfg(test)]
mod tests;
pub mod types;

use async_trait::async_trait;
use vendhub_core::adapters::DatabaseAdapter;
use vendhub_core::{AppContext, AppPlugin, AppRequest, AppResponse, AppResult, HttpMethod, Route};

/// Configuration for the Invoices plugin
#[derive(Debug, Clone)]
pub struct InvoicesConfig {
    /// Maximum line items accepted on a single invoice (default: 50)
    pub max_items_per_invoice: usize,
}

impl Default for InvoicesConfig {
    fn default() -> Self {
        Self {
            max_items_per_invoice: 50,
        }
    }
}

impl InvoicesConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Invoicing feature area: creation, listing, the send action, payment
/// collection, and deletion.
pub struct InvoicesPlugin {
    config: InvoicesConfig,
}

impl InvoicesPlugin {
    pub fn new() -> Self {
        Self {
            config: InvoicesConfig::default(),
        }
    }

    pub fn with_config(config: InvoicesConfig) -> Self {
        Self { config }
    }

    pub fn max_items_per_invoice(mut self, max: usize) -> Self {
        self.config.max_items_per_invoice = max;
        self
    }
}

impl Default for InvoicesPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<DB: DatabaseAdapter> AppPlugin<DB> for InvoicesPlugin {
    fn name(&self) -> &'static str {
        "invoices"
    }

    fn routes(&self) -> Vec<Route> {
        vec![
            Route::post("/invoices/create", "create_invoice"),
            Route::get("/invoices/list", "list_invoices"),
            Route::get("/invoices/get", "get_invoice"),
            Route::post("/invoices/send", "send_invoice"),
            Route::post("/invoices/mark-paid", "mark_invoice_paid"),
            Route::post("/invoices/pay", "pay_invoice"),
            Route::post("/invoices/delete", "delete_invoice"),
        ]
    }

    async fn on_request(
        &self,
        req: &AppRequest,
        ctx: &AppContext<DB>,
    ) -> AppResult<Option<AppResponse>> {
        match (req.method(), req.path()) {
            (HttpMethod::Post, "/invoices/create") => Ok(Some(
                handlers::handle_create_invoice(req, ctx, &self.config).await?,
            )),
            (HttpMethod::Get, "/invoices/list") => {
                Ok(Some(handlers::handle_list_invoices(req, ctx).await?))
            }
            (HttpMethod::Get, "/invoices/get") => {
                Ok(Some(handlers::handle_get_invoice(req, ctx).await?))
            }
            (HttpMethod::Post, "/invoices/send") => {
                Ok(Some(handlers::handle_send_invoice(req, ctx).await?))
            }
            (HttpMethod::Post, "/invoices/mark-paid") => {
                Ok(Some(handlers::handle_mark_paid(req, ctx).await?))
            }
            (HttpMethod::Post, "/invoices/pay") => {
                Ok(Some(handlers::handle_pay_invoice(req, ctx).await?))
            }
            (HttpMethod::Post, "/invoices/delete") => {
                Ok(Some(handlers::handle_delete_invoice(req, ctx).await?))
            }
            _ => Ok(None),
        }
    }
}

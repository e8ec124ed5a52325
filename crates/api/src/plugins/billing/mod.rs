pub mod handlers;
#[cfg(test)]
mod tests;
pub mod types;

use async_trait::async_trait;
use vendhub_core::adapters::DatabaseAdapter;
use vendhub_core::{AppContext, AppPlugin, AppRequest, AppResponse, AppResult, HttpMethod, Route};

/// Billing feature area: subscription lifecycle, the hosted billing portal,
/// and the usage dashboard. All money movement happens on the payments
/// gateway; the rows here only mirror it.
pub struct BillingPlugin;

impl BillingPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BillingPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<DB: DatabaseAdapter> AppPlugin<DB> for BillingPlugin {
    fn name(&self) -> &'static str {
        "billing"
    }

    fn routes(&self) -> Vec<Route> {
        vec![
            Route::get("/billing/subscription", "get_subscription"),
            Route::post("/billing/subscribe", "subscribe"),
            Route::post("/billing/change-plan", "change_plan"),
            Route::post("/billing/cancel", "cancel_subscription"),
            Route::post("/billing/portal", "create_portal_session"),
            Route::get("/billing/usage", "get_usage"),
        ]
    }

    async fn on_request(
        &self,
        req: &AppRequest,
        ctx: &AppContext<DB>,
    ) -> AppResult<Option<AppResponse>> {
        match (req.method(), req.path()) {
            (HttpMethod::Get, "/billing/subscription") => {
                Ok(Some(handlers::handle_get_subscription(req, ctx).await?))
            }
            (HttpMethod::Post, "/billing/subscribe") => {
                Ok(Some(handlers::handle_subscribe(req, ctx).await?))
            }
            (HttpMethod::Post, "/billing/change-plan") => {
                Ok(Some(handlers::handle_change_plan(req, ctx).await?))
            }
            (HttpMethod::Post, "/billing/cancel") => {
                Ok(Some(handlers::handle_cancel_subscription(req, ctx).await?))
            }
            (HttpMethod::Post, "/billing/portal") => {
                Ok(Some(handlers::handle_portal(req, ctx).await?))
            }
            (HttpMethod::Get, "/billing/usage") => {
                Ok(Some(handlers::handle_usage(req, ctx).await?))
            }
            _ => Ok(None),
        }
    }
}

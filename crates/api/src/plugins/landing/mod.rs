use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;
use vendhub_core::adapters::DatabaseAdapter;
use vendhub_core::{
    plans, AppContext, AppPlugin, AppRequest, AppResponse, AppResult, HttpMethod, Logger as _,
    Route,
};

/// Landing-site feature area: the public pricing catalog and the contact
/// form. Both are unauthenticated.
pub struct LandingPlugin;

impl LandingPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LandingPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize, Validate)]
struct ContactRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    name: String,
    #[validate(email(message = "Invalid email address"))]
    email: String,
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    message: String,
}

#[derive(Debug, Serialize)]
struct ContactResponse {
    received: bool,
}

/// The contact form goes nowhere persistent: it is logged and acknowledged,
/// matching the marketing site's behavior.
async fn handle_contact<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let body: ContactRequest = match vendhub_core::validate_request_body(req) {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    ctx.config.logger.info(&format!(
        "contact form: {} <{}>: {}",
        body.name, body.email, body.message
    ));

    Ok(AppResponse::json(200, &ContactResponse { received: true })?)
}

async fn handle_plans() -> AppResult<AppResponse> {
    Ok(AppResponse::json(200, &plans::catalog())?)
}

#[async_trait]
impl<DB: DatabaseAdapter> AppPlugin<DB> for LandingPlugin {
    fn name(&self) -> &'static str {
        "landing"
    }

    fn routes(&self) -> Vec<Route> {
        vec![
            Route::get("/landing/plans", "list_plans"),
            Route::post("/landing/contact", "submit_contact"),
        ]
    }

    async fn on_request(
        &self,
        req: &AppRequest,
        ctx: &AppContext<DB>,
    ) -> AppResult<Option<AppResponse>> {
        match (req.method(), req.path()) {
            (HttpMethod::Get, "/landing/plans") => Ok(Some(handle_plans().await?)),
            (HttpMethod::Post, "/landing/contact") => Ok(Some(handle_contact(req, ctx).await?)),
            _ => Ok(None),
        }
    }
}

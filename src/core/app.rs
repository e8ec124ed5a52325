use std::sync::Arc;

use serde::Deserialize;

use vendhub_core::{
    middleware::{
        self, BodyLimitConfig, BodyLimitMiddleware, CorsConfig, CorsMiddleware, Middleware,
        RateLimitConfig, RateLimitMiddleware,
    },
    AppConfig, AppContext, AppError, AppPlugin, AppRequest, AppResponse, AppResult,
    DatabaseAdapter, HealthCheckResponse, HttpMethod, MockPaymentsGateway, OkResponse,
    PaymentsGateway, SessionManager, UpdateProfile,
};

#[derive(Debug, Deserialize)]
struct UpdateMeRequest {
    name: Option<String>,
    avatar_url: Option<String>,
}

/// The main platform instance, generic over the database adapter.
pub struct VendHub<DB: DatabaseAdapter> {
    config: Arc<AppConfig>,
    plugins: Vec<Box<dyn AppPlugin<DB>>>,
    middlewares: Vec<Box<dyn Middleware>>,
    database: Arc<DB>,
    context: AppContext<DB>,
}

/// Initial builder for configuring the platform.
///
/// Call `.database(adapter)` to obtain a [`TypedAppBuilder`] that can
/// accept plugins and middleware.
pub struct AppBuilder {
    config: AppConfig,
    gateway: Option<Arc<dyn PaymentsGateway>>,
    rate_limit_config: Option<RateLimitConfig>,
    cors_config: Option<CorsConfig>,
    body_limit_config: Option<BodyLimitConfig>,
    custom_middlewares: Vec<Box<dyn Middleware>>,
}

/// Typed builder returned by [`AppBuilder::database`].
pub struct TypedAppBuilder<DB: DatabaseAdapter> {
    config: AppConfig,
    database: Arc<DB>,
    gateway: Option<Arc<dyn PaymentsGateway>>,
    plugins: Vec<Box<dyn AppPlugin<DB>>>,
    rate_limit_config: Option<RateLimitConfig>,
    cors_config: Option<CorsConfig>,
    body_limit_config: Option<BodyLimitConfig>,
    custom_middlewares: Vec<Box<dyn Middleware>>,
}

impl AppBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            gateway: None,
            rate_limit_config: None,
            cors_config: None,
            body_limit_config: None,
            custom_middlewares: Vec::new(),
        }
    }

    /// Set the database adapter, returning a [`TypedAppBuilder`].
    pub fn database<DB: DatabaseAdapter>(self, database: DB) -> TypedAppBuilder<DB> {
        TypedAppBuilder {
            config: self.config,
            database: Arc::new(database),
            gateway: self.gateway,
            plugins: Vec::new(),
            rate_limit_config: self.rate_limit_config,
            cors_config: self.cors_config,
            body_limit_config: self.body_limit_config,
            custom_middlewares: self.custom_middlewares,
        }
    }

    /// Set the payments gateway.
    pub fn gateway<G: PaymentsGateway + 'static>(mut self, gateway: G) -> Self {
        self.gateway = Some(Arc::new(gateway));
        self
    }

    /// Configure rate limiting.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit_config = Some(config);
        self
    }

    /// Configure CORS.
    pub fn cors(mut self, config: CorsConfig) -> Self {
        self.cors_config = Some(config);
        self
    }

    /// Configure body size limit.
    pub fn body_limit(mut self, config: BodyLimitConfig) -> Self {
        self.body_limit_config = Some(config);
        self
    }
}

impl<DB: DatabaseAdapter> TypedAppBuilder<DB> {
    /// Add a plugin.
    pub fn plugin<P: AppPlugin<DB> + 'static>(mut self, plugin: P) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Set the payments gateway.
    pub fn gateway<G: PaymentsGateway + 'static>(mut self, gateway: G) -> Self {
        self.gateway = Some(Arc::new(gateway));
        self
    }

    /// Configure rate limiting.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit_config = Some(config);
        self
    }

    /// Configure CORS.
    pub fn cors(mut self, config: CorsConfig) -> Self {
        self.cors_config = Some(config);
        self
    }

    /// Configure body size limit.
    pub fn body_limit(mut self, config: BodyLimitConfig) -> Self {
        self.body_limit_config = Some(config);
        self
    }

    /// Add a custom middleware.
    pub fn middleware<M: Middleware + 'static>(mut self, mw: M) -> Self {
        self.custom_middlewares.push(Box::new(mw));
        self
    }

    /// Build the platform instance.
    pub async fn build(self) -> AppResult<VendHub<DB>> {
        self.config.validate()?;

        let config = Arc::new(self.config);
        let database = self.database;

        // A deterministic in-process gateway keeps dev and test setups
        // working without payment credentials.
        let gateway = self
            .gateway
            .unwrap_or_else(|| Arc::new(MockPaymentsGateway::new()));

        let mut context = AppContext::new(config.clone(), database.clone(), gateway);

        // Initialize all plugins
        for plugin in &self.plugins {
            plugin.on_init(&mut context).await?;
        }

        // Build middleware chain (order matters: body limit → rate limit → CORS → custom)
        let mut middlewares: Vec<Box<dyn Middleware>> = vec![
            Box::new(BodyLimitMiddleware::new(
                self.body_limit_config.unwrap_or_default(),
            )),
            Box::new(RateLimitMiddleware::new(
                self.rate_limit_config.unwrap_or_default(),
            )),
            Box::new(CorsMiddleware::new(self.cors_config.unwrap_or_default())),
        ];

        middlewares.extend(self.custom_middlewares);

        Ok(VendHub {
            config,
            plugins: self.plugins,
            middlewares,
            database,
            context,
        })
    }
}

impl<DB: DatabaseAdapter> VendHub<DB> {
    /// Create a new builder.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(config: AppConfig) -> AppBuilder {
        AppBuilder::new(config)
    }

    /// Handle a platform request.
    ///
    /// Errors from plugins and core handlers are automatically converted
    /// into standardized JSON responses via [`AppError::into_response`],
    /// producing `{ "error": "..." }` with the appropriate HTTP status code.
    pub async fn handle_request(&self, req: AppRequest) -> AppResult<AppResponse> {
        match self.handle_request_inner(&req).await {
            Ok(response) => middleware::run_after(&self.middlewares, &req, response).await,
            Err(err) => {
                let response = err.into_response();
                middleware::run_after(&self.middlewares, &req, response).await
            }
        }
    }

    /// Inner request handler that may return errors.
    async fn handle_request_inner(&self, req: &AppRequest) -> AppResult<AppResponse> {
        // Run before-request middleware chain
        if let Some(response) = middleware::run_before(&self.middlewares, req).await? {
            return Ok(response);
        }

        // Handle core endpoints first
        if let Some(response) = self.handle_core_request(req).await? {
            return Ok(response);
        }

        // Try each plugin until one handles the request
        for plugin in &self.plugins {
            if let Some(response) = plugin.on_request(req, &self.context).await? {
                return Ok(response);
            }
        }

        // No handler found
        Err(AppError::not_found("No handler found for this request"))
    }

    /// Get the configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the database adapter.
    pub fn database(&self) -> &Arc<DB> {
        &self.database
    }

    /// Get the session manager.
    pub fn session_manager(&self) -> &SessionManager<DB> {
        self.context.session_manager()
    }

    /// Get the plugin context.
    pub fn context(&self) -> &AppContext<DB> {
        &self.context
    }

    /// Get all plugins.
    pub fn plugins(&self) -> &[Box<dyn AppPlugin<DB>>] {
        &self.plugins
    }

    /// Get plugin by name.
    pub fn get_plugin(&self, name: &str) -> Option<&dyn AppPlugin<DB>> {
        self.plugins
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    /// List all plugin names.
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Handle core platform requests.
    async fn handle_core_request(&self, req: &AppRequest) -> AppResult<Option<AppResponse>> {
        match (req.method(), req.path()) {
            (HttpMethod::Get, "/ok") => {
                Ok(Some(AppResponse::json(200, &OkResponse { ok: true })?))
            }
            (HttpMethod::Get, "/health") => Ok(Some(AppResponse::json(
                200,
                &HealthCheckResponse {
                    status: "ok",
                    service: "vendhub",
                },
            )?)),
            (HttpMethod::Get, "/me") => Ok(Some(self.handle_get_me(req).await?)),
            (HttpMethod::Post, "/me/update") => Ok(Some(self.handle_update_me(req).await?)),
            _ => Ok(None),
        }
    }

    /// Current user's profile.
    async fn handle_get_me(&self, req: &AppRequest) -> AppResult<AppResponse> {
        let user = self.extract_current_user(req).await?;
        Ok(AppResponse::json(200, &user)?)
    }

    /// Profile update. Email changes belong to the hosted auth service and
    /// are not accepted here.
    async fn handle_update_me(&self, req: &AppRequest) -> AppResult<AppResponse> {
        let current_user = self.extract_current_user(req).await?;

        let update_req: UpdateMeRequest = req
            .body_as_json()
            .map_err(|e| AppError::bad_request(format!("Invalid JSON: {}", e)))?;

        let update = UpdateProfile {
            email: None,
            name: update_req.name,
            avatar_url: update_req.avatar_url,
        };

        let updated = self
            .database
            .update_profile(&current_user.id, update)
            .await?;

        Ok(AppResponse::json(200, &updated)?)
    }

    /// Extract current user from request (validates session).
    async fn extract_current_user(&self, req: &AppRequest) -> AppResult<vendhub_core::UserProfile> {
        let token = self
            .session_manager()
            .extract_session_token(req)
            .ok_or(AppError::Unauthenticated)?;

        let session = self
            .session_manager()
            .get_session(&token)
            .await?
            .ok_or(AppError::SessionNotFound)?;

        let user = self
            .database
            .get_profile_by_id(&session.user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        Ok(user)
    }
}

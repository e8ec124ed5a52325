use super::Middleware;
use crate::error::AppResult;
use crate::types::{AppRequest, AppResponse, HttpMethod};
use async_trait::async_trait;

/// Configuration for CORS middleware.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins. An empty list means no CORS headers are added.
    /// Use `["*"]` to allow all origins (not recommended for production).
    pub allowed_origins: Vec<String>,

    /// Allowed HTTP methods.
    pub allowed_methods: Vec<String>,

    /// Allowed request headers.
    pub allowed_headers: Vec<String>,

    /// Headers exposed to the browser.
    pub exposed_headers: Vec<String>,

    /// Whether credentials (cookies, authorization) are allowed.
    pub allow_credentials: bool,

    /// Max age for preflight cache (seconds).
    pub max_age: u64,

    /// Whether CORS handling is enabled.
    pub enabled: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allowed_methods: vec![
                "GET".into(),
                "POST".into(),
                "PUT".into(),
                "DELETE".into(),
                "PATCH".into(),
                "OPTIONS".into(),
            ],
            allowed_headers: vec![
                "Content-Type".into(),
                "Authorization".into(),
                "X-Requested-With".into(),
            ],
            exposed_headers: Vec::new(),
            allow_credentials: true,
            max_age: 86400,
            enabled: true,
        }
    }
}

impl CorsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origins.push(origin.into());
        self
    }

    pub fn allow_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }

    pub fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = seconds;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// CORS middleware.
///
/// Handles preflight OPTIONS requests and adds CORS response headers.
pub struct CorsMiddleware {
    config: CorsConfig,
}

impl CorsMiddleware {
    pub fn new(config: CorsConfig) -> Self {
        Self { config }
    }

    fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.config.allowed_origins.is_empty() {
            return false;
        }
        self.config
            .allowed_origins
            .iter()
            .any(|o| o == "*" || o == origin)
    }

    fn cors_headers(&self, origin: &str) -> Vec<(String, String)> {
        let mut headers = Vec::new();

        // Echo the request origin when credentials are on (wildcard is
        // rejected by browsers in that mode)
        let allow_origin = if self.config.allow_credentials {
            origin.to_string()
        } else if self.config.allowed_origins.contains(&"*".to_string()) {
            "*".to_string()
        } else {
            origin.to_string()
        };

        headers.push(("Access-Control-Allow-Origin".into(), allow_origin));

        if self.config.allow_credentials {
            headers.push(("Access-Control-Allow-Credentials".into(), "true".into()));
        }

        if !self.config.exposed_headers.is_empty() {
            headers.push((
                "Access-Control-Expose-Headers".into(),
                self.config.exposed_headers.join(", "),
            ));
        }

        headers.push(("Vary".into(), "Origin".into()));
        headers
    }
}

#[async_trait]
impl Middleware for CorsMiddleware {
    fn name(&self) -> &'static str {
        "cors"
    }

    async fn before_request(&self, req: &AppRequest) -> AppResult<Option<AppResponse>> {
        if !self.config.enabled {
            return Ok(None);
        }

        // Only preflight requests are answered here; everything else gets
        // its headers in after_request.
        if req.method != HttpMethod::Options {
            return Ok(None);
        }

        let Some(origin) = req.headers.get("origin") else {
            return Ok(None);
        };

        if !self.is_origin_allowed(origin) {
            return Ok(Some(AppResponse::new(403)));
        }

        let mut response = AppResponse::new(204);
        for (name, value) in self.cors_headers(origin) {
            response = response.with_header(name, value);
        }
        response = response
            .with_header(
                "Access-Control-Allow-Methods",
                self.config.allowed_methods.join(", "),
            )
            .with_header(
                "Access-Control-Allow-Headers",
                self.config.allowed_headers.join(", "),
            )
            .with_header("Access-Control-Max-Age", self.config.max_age.to_string());

        Ok(Some(response))
    }

    async fn after_request(
        &self,
        req: &AppRequest,
        mut response: AppResponse,
    ) -> AppResult<AppResponse> {
        if !self.config.enabled {
            return Ok(response);
        }

        if let Some(origin) = req.headers.get("origin") {
            if self.is_origin_allowed(origin) {
                for (name, value) in self.cors_headers(origin) {
                    response = response.with_header(name, value);
                }
            }
        }

        Ok(response)
    }
}

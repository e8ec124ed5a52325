use chrono::Duration;
use std::sync::Arc;

use crate::error::AppError;
use crate::logger::{Logger, TracingLogger};
use crate::plans::PlanId;

/// Main configuration for the VendHub platform service.
#[derive(Clone)]
pub struct AppConfig {
    /// Secret key for signing session cookies.
    pub secret: String,

    /// Application name, used for cookie prefixes and log lines.
    ///
    /// Defaults to `"VendHub"`.
    pub app_name: String,

    /// Base URL of the deployment (e.g. `"http://localhost:3000"`).
    pub base_url: String,

    /// Base path where the API routes are mounted.
    ///
    /// All routes handled by the platform are prefixed with this path, so
    /// with the default `"/api"` the invoice-creation route becomes
    /// `"/api/invoices/create"`.
    pub base_path: String,

    /// Origins trusted for cross-origin checks. Supports glob patterns
    /// (e.g. `"https://*.example.com"`).
    pub trusted_origins: Vec<String>,

    /// Logger implementation.
    ///
    /// Defaults to a [`TracingLogger`] that delegates to the `tracing`
    /// crate. Set a custom implementation to integrate with your own
    /// logging infrastructure.
    pub logger: Arc<dyn Logger>,

    /// Session configuration
    pub session: SessionConfig,

    /// Billing configuration
    pub billing: BillingConfig,
}

/// Session-specific configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session expiration duration
    pub expires_in: Duration,

    /// Renew the session expiry on activity
    pub update_age: bool,

    /// Cookie name for session token
    pub cookie_name: String,

    /// Cookie settings
    pub cookie_secure: bool,
    pub cookie_http_only: bool,
}

/// Billing-specific configuration
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Plan assigned to companies without a subscription row.
    pub default_plan: PlanId,

    /// URL the billing portal redirects back to.
    pub portal_return_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            app_name: "VendHub".to_string(),
            base_url: "http://localhost:3000".to_string(),
            base_path: "/api".to_string(),
            trusted_origins: Vec::new(),
            logger: Arc::new(TracingLogger),
            session: SessionConfig::default(),
            billing: BillingConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expires_in: Duration::hours(24 * 7), // 7 days
            update_age: true,
            cookie_name: "vendhub.session-token".to_string(),
            cookie_secure: true,
            cookie_http_only: true,
        }
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            default_plan: PlanId::Starter,
            portal_return_url: "http://localhost:3000/billing".to_string(),
        }
    }
}

impl AppConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set the application name.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Set the base URL (e.g. `"https://vendhub.example"`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the base path where the API routes are mounted.
    pub fn base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = path.into();
        self
    }

    /// Add a trusted origin. Supports glob patterns (e.g. `"https://*.example.com"`).
    pub fn trusted_origin(mut self, origin: impl Into<String>) -> Self {
        self.trusted_origins.push(origin.into());
        self
    }

    /// Set all trusted origins at once.
    pub fn trusted_origins(mut self, origins: Vec<String>) -> Self {
        self.trusted_origins = origins;
        self
    }

    /// Set a custom logger implementation.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Set the session expiration duration.
    pub fn session_expires_in(mut self, duration: Duration) -> Self {
        self.session.expires_in = duration;
        self
    }

    /// Set the plan assumed for companies without a subscription.
    pub fn default_plan(mut self, plan: PlanId) -> Self {
        self.billing.default_plan = plan;
        self
    }

    /// Set the billing-portal return URL.
    pub fn portal_return_url(mut self, url: impl Into<String>) -> Self {
        self.billing.portal_return_url = url.into();
        self
    }

    /// Check whether a given origin matches any of the `trusted_origins`.
    pub fn is_origin_trusted(&self, origin: &str) -> bool {
        self.trusted_origins
            .iter()
            .any(|pattern| glob_match(pattern, origin))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.secret.is_empty() {
            return Err(AppError::config("Secret key cannot be empty"));
        }

        if self.secret.len() < 32 {
            return Err(AppError::config(
                "Secret key must be at least 32 characters",
            ));
        }

        Ok(())
    }
}

/// Simple glob-pattern matching for origin strings.
///
/// Supports `*` as a wildcard matching any character sequence. For example,
/// `"https://*.example.com"` matches `"https://app.example.com"`.
pub fn glob_match(pattern: &str, value: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == value;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.is_empty() {
        return true;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];

    if !value.starts_with(first) || !value.ends_with(last) {
        return false;
    }

    // Walk through the value, matching each part in order
    let mut pos = 0;
    for part in &parts {
        if part.is_empty() {
            continue;
        }
        match value[pos..].find(part) {
            Some(idx) => pos += idx + part.len(),
            None => return false,
        }
    }

    true
}

use super::Middleware;
use crate::error::AppResult;
use crate::types::{AppRequest, AppResponse};
use async_trait::async_trait;

/// Configuration for body size limit middleware.
#[derive(Debug, Clone)]
pub struct BodyLimitConfig {
    /// Maximum body size in bytes. Defaults to 1 MB.
    pub max_bytes: usize,

    /// Whether the middleware is enabled.
    pub enabled: bool,
}

impl Default for BodyLimitConfig {
    fn default() -> Self {
        Self {
            max_bytes: 1_048_576, // 1 MB
            enabled: true,
        }
    }
}

impl BodyLimitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_bytes(mut self, max: usize) -> Self {
        self.max_bytes = max;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Body size limit middleware.
///
/// Rejects requests whose body exceeds the configured maximum size.
pub struct BodyLimitMiddleware {
    config: BodyLimitConfig,
}

impl BodyLimitMiddleware {
    pub fn new(config: BodyLimitConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Middleware for BodyLimitMiddleware {
    fn name(&self) -> &'static str {
        "body-limit"
    }

    async fn before_request(&self, req: &AppRequest) -> AppResult<Option<AppResponse>> {
        if !self.config.enabled {
            return Ok(None);
        }

        if let Some(body) = &req.body {
            if body.len() > self.config.max_bytes {
                return Ok(Some(AppResponse::json(
                    413,
                    &serde_json::json!({
                        "error": format!(
                            "Request body exceeds maximum size of {} bytes",
                            self.config.max_bytes
                        ),
                    }),
                )?));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpMethod;

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mw = BodyLimitMiddleware::new(BodyLimitConfig::new().max_bytes(8));
        let mut req = AppRequest::new(HttpMethod::Post, "/invoices/create");
        req.body = Some(vec![0u8; 16]);

        let resp = mw.before_request(&req).await.unwrap();
        assert_eq!(resp.unwrap().status, 413);
    }

    #[tokio::test]
    async fn small_body_passes() {
        let mw = BodyLimitMiddleware::new(BodyLimitConfig::new().max_bytes(8));
        let mut req = AppRequest::new(HttpMethod::Post, "/invoices/create");
        req.body = Some(vec![0u8; 4]);

        assert!(mw.before_request(&req).await.unwrap().is_none());
    }
}

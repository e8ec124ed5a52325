//! # VendHub
//!
//! Service-side platform for a vending-partnership SaaS: invoicing,
//! billing, and team management over a hosted database and a payments
//! gateway, both represented by trait seams with in-process
//! implementations for development and tests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vendhub::{AppBuilder, AppConfig};
//! use vendhub::adapters::MemoryDatabaseAdapter;
//! use vendhub::plugins::{BillingPlugin, InvoicesPlugin, TeamsPlugin};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::new("your-secret-key-that-is-at-least-32-chars");
//!
//!     let app = AppBuilder::new(config)
//!         .database(MemoryDatabaseAdapter::new())
//!         .plugin(TeamsPlugin::new())
//!         .plugin(InvoicesPlugin::new())
//!         .plugin(BillingPlugin::new())
//!         .build()
//!         .await?;
//!
//!     let _ = app;
//!     Ok(())
//! }
//! ```

// Core module — the VendHub struct lives here in the root crate because it
// orchestrates plugins (from vendhub-api) + core (from vendhub-core)
pub mod core;
pub mod handlers;

// Re-export core abstractions
pub use vendhub_core::{
    catalog, invoice_total, plan, usage_percent, AppConfig, AppContext, AppError, AppPlugin,
    AppRequest, AppResponse, AppResult, AuditLogEntry, BodyLimitConfig, BodyLimitMiddleware,
    ChangeEvent, ChangeFeed, ChangeOp, Company, CorsConfig, CorsMiddleware, CreateCompany,
    CreateInvitation, CreateInvoice, CreateMembership, CreatePayment, CreateProfile,
    CreateSession, CreateSubscription, DatabaseAdapter, DatabaseError, GatewaySubscription,
    HttpMethod, Invitation, InvitationStatus, Invoice, InvoiceItem, InvoiceStatus, Logger,
    Membership, MemoryDatabaseAdapter, Middleware, MockPaymentsGateway, Payment, PaymentIntent,
    PaymentsGateway, Plan, PlanId, PlanLimit, PortalSession, QueryCache, spawn_invalidator,
    RateLimitConfig,
    RateLimitMiddleware, RecordAudit, Route, Session, SessionManager, Subscription,
    SubscriptionStatus, TracingLogger, UpdateCompany, UpdateProfile, UpdateSubscription,
    UserProfile,
};

// Re-export adapters
pub mod adapters {
    pub use vendhub_core::adapters::{
        AuditOps, ChangeFeedOps, CompanyOps, DatabaseAdapter, InvitationOps, InvoiceOps,
        MembershipOps, MemoryDatabaseAdapter, PaymentOps, ProfileOps, SessionOps, SubscriptionOps,
    };

    #[cfg(feature = "rest-client")]
    pub use vendhub_core::adapters::{RestClientConfig, RestDatabaseAdapter};
}

// Re-export plugins
pub mod plugins {
    pub use vendhub_api::plugins::*;
}

// Re-export the main VendHub struct
pub use crate::core::{AppBuilder, TypedAppBuilder, VendHub};

#[cfg(feature = "axum")]
pub use crate::handlers::axum::AxumIntegration;

#[cfg(test)]
mod tests {
    use super::adapters::{ProfileOps, SessionOps};
    use super::*;
    use serde_json::json;

    fn test_config() -> AppConfig {
        AppConfig::new("test-secret-key-that-is-at-least-32-characters-long")
            .base_url("http://localhost:3000")
    }

    async fn create_test_app() -> VendHub<MemoryDatabaseAdapter> {
        AppBuilder::new(test_config())
            .database(MemoryDatabaseAdapter::new())
            .plugin(plugins::TeamsPlugin::new())
            .plugin(plugins::InvoicesPlugin::new())
            .plugin(plugins::BillingPlugin::new())
            .plugin(plugins::AuditPlugin::new())
            .plugin(plugins::LandingPlugin::new())
            .build()
            .await
            .expect("Failed to create test app instance")
    }

    async fn session_token(app: &VendHub<MemoryDatabaseAdapter>, email: &str) -> String {
        let user = app
            .database()
            .create_profile(CreateProfile::new(email))
            .await
            .unwrap();
        let session = app
            .database()
            .create_session(CreateSession {
                user_id: user.id,
                expires_at: chrono::Utc::now() + chrono::Duration::hours(24),
                ip_address: None,
                user_agent: None,
                active_company_id: None,
            })
            .await
            .unwrap();
        session.token
    }

    fn authed_post(path: &str, token: &str, body: serde_json::Value) -> AppRequest {
        let mut request = AppRequest::new(HttpMethod::Post, path);
        request.body = Some(body.to_string().into_bytes());
        request
            .headers
            .insert("content-type".to_string(), "application/json".to_string());
        request
            .headers
            .insert("authorization".to_string(), format!("Bearer {}", token));
        request
    }

    #[tokio::test]
    async fn test_app_builder() {
        let app = create_test_app().await;
        assert_eq!(
            app.plugin_names(),
            vec!["teams", "invoices", "billing", "audit", "landing"]
        );
        assert_eq!(
            app.config().secret,
            "test-secret-key-that-is-at-least-32-characters-long"
        );
    }

    #[tokio::test]
    async fn test_config_validation() {
        let err = AppBuilder::new(AppConfig::new("short"))
            .database(MemoryDatabaseAdapter::new())
            .build()
            .await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_health_and_ok_routes() {
        let app = create_test_app().await;

        let response = app
            .handle_request(AppRequest::new(HttpMethod::Get, "/health"))
            .await
            .unwrap();
        assert_eq!(response.status, 200);

        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["service"], "vendhub");

        let response = app
            .handle_request(AppRequest::new(HttpMethod::Get, "/ok"))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = create_test_app().await;

        let response = app
            .handle_request(AppRequest::new(HttpMethod::Get, "/nope"))
            .await
            .unwrap();
        assert_eq!(response.status, 404);

        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_me_round_trip() {
        let app = create_test_app().await;
        let token = session_token(&app, "me@example.com").await;

        let mut request = AppRequest::new(HttpMethod::Get, "/me");
        request
            .headers
            .insert("authorization".to_string(), format!("Bearer {}", token));
        let response = app.handle_request(request).await.unwrap();
        assert_eq!(response.status, 200);

        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["email"], "me@example.com");

        let request = authed_post("/me/update", &token, json!({ "name": "Route Operator" }));
        let response = app.handle_request(request).await.unwrap();
        assert_eq!(response.status, 200);

        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["name"], "Route Operator");
    }

    #[tokio::test]
    async fn test_me_requires_session() {
        let app = create_test_app().await;

        let response = app
            .handle_request(AppRequest::new(HttpMethod::Get, "/me"))
            .await
            .unwrap();
        assert_eq!(response.status, 401);
    }

    #[tokio::test]
    async fn test_plugin_dispatch_reaches_landing() {
        let app = create_test_app().await;

        let response = app
            .handle_request(AppRequest::new(HttpMethod::Get, "/landing/plans"))
            .await
            .unwrap();
        assert_eq!(response.status, 200);

        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body.as_array().unwrap().len(), 3);
    }
}

pub mod audit;
pub mod billing;
pub(crate) mod helpers;
pub mod invoices;
pub mod landing;
pub mod teams;

pub use audit::AuditPlugin;
pub use billing::BillingPlugin;
pub use invoices::{InvoicesConfig, InvoicesPlugin};
pub use landing::LandingPlugin;
pub use teams::{TeamsConfig, TeamsPlugin};

#[cfg(test)]
pub(crate) mod test_helpers {
    use std::collections::HashMap;
    use std::sync::Arc;

    use chrono::Duration;
    use vendhub_core::adapters::{
        CompanyOps, MembershipOps, MemoryDatabaseAdapter, ProfileOps, SessionOps,
    };
    use vendhub_core::{
        AppConfig, AppContext, AppRequest, Company, CreateCompany, CreateMembership,
        CreateProfile, CreateSession, HttpMethod, MockPaymentsGateway, Session, UserProfile,
    };

    pub(crate) fn test_config() -> AppConfig {
        AppConfig::new("test-secret-key-that-is-at-least-32-characters-long")
            .base_url("http://localhost:3000")
    }

    pub(crate) fn create_test_context() -> (
        AppContext<MemoryDatabaseAdapter>,
        Arc<MockPaymentsGateway>,
    ) {
        let database = Arc::new(MemoryDatabaseAdapter::new());
        let gateway = Arc::new(MockPaymentsGateway::new());
        let ctx = AppContext::new(Arc::new(test_config()), database, gateway.clone());
        (ctx, gateway)
    }

    /// Create a context with a user who owns (or belongs to, per `role`) a
    /// company, plus a session scoped to that company.
    pub(crate) async fn create_company_context(
        role: &str,
    ) -> (
        AppContext<MemoryDatabaseAdapter>,
        Arc<MockPaymentsGateway>,
        UserProfile,
        Company,
        Session,
    ) {
        let (ctx, gateway) = create_test_context();

        let user = ctx
            .database
            .create_profile(
                CreateProfile::new(format!("{}@example.com", role)).with_name("Test User"),
            )
            .await
            .unwrap();

        let company = ctx
            .database
            .create_company(CreateCompany {
                id: None,
                name: "Acme Vending".to_string(),
                slug: "acme-vending".to_string(),
                logo: None,
            })
            .await
            .unwrap();

        ctx.database
            .create_membership(CreateMembership {
                company_id: company.id.clone(),
                user_id: user.id.clone(),
                role: role.to_string(),
            })
            .await
            .unwrap();

        let session = ctx
            .database
            .create_session(CreateSession {
                user_id: user.id.clone(),
                expires_at: chrono::Utc::now() + Duration::hours(24),
                ip_address: None,
                user_agent: None,
                active_company_id: Some(company.id.clone()),
            })
            .await
            .unwrap();

        (ctx, gateway, user, company, session)
    }

    pub(crate) fn create_app_request(
        method: HttpMethod,
        path: &str,
        token: Option<&str>,
        body: Option<Vec<u8>>,
        query: HashMap<String, String>,
    ) -> AppRequest {
        let mut req = AppRequest::new(method, path);
        if let Some(token) = token {
            req.headers
                .insert("authorization".to_string(), format!("Bearer {}", token));
        }
        if body.is_some() {
            req.headers
                .insert("content-type".to_string(), "application/json".to_string());
        }
        req.body = body;
        req.query = query;
        req
    }
}

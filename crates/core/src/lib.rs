//! # VendHub Core
//!
//! Core abstractions for the VendHub platform service.
//! Contains adapter traits, domain types, configuration, money arithmetic,
//! and error handling.

pub mod adapters;
pub mod config;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod money;
pub mod payments;
pub mod plans;
pub mod plugin;
pub mod realtime;
pub mod session;
pub mod types;
pub mod types_billing;
pub mod types_tenant;

// Re-export commonly used items
pub use adapters::{
    AuditOps, ChangeFeedOps, CompanyOps, DatabaseAdapter, InvitationOps, InvoiceOps,
    MembershipOps, MemoryDatabaseAdapter, PaymentOps, ProfileOps, SessionOps, SubscriptionOps,
};
#[cfg(feature = "rest-client")]
pub use adapters::{RestClientConfig, RestDatabaseAdapter};
pub use config::{AppConfig, BillingConfig, SessionConfig};
pub use error::{validate_request_body, validation_error_response, AppError, AppResult, DatabaseError};
pub use logger::{default_logger, Logger, TracingLogger};
pub use middleware::{
    BodyLimitConfig, BodyLimitMiddleware, CorsConfig, CorsMiddleware, EndpointRateLimit,
    Middleware, RateLimitConfig, RateLimitMiddleware,
};
pub use money::{invoice_total, usage_percent, PlanLimit};
pub use payments::{
    GatewaySubscription, MockPaymentsGateway, PaymentIntent, PaymentsGateway, PortalSession,
};
pub use plans::{catalog, plan, Plan, PlanId};
pub use plugin::{AppContext, AppPlugin, Route};
pub use realtime::{spawn_invalidator, ChangeEvent, ChangeFeed, ChangeOp, QueryCache};
pub use session::SessionManager;
pub use types::{
    AppRequest, AppResponse, AuditLogEntry, Company, CreateCompany, CreateInvitation,
    CreateInvoice, CreateMembership, CreatePayment, CreateProfile, CreateSession,
    CreateSubscription, ErrorMessageResponse, HealthCheckResponse, HttpMethod, Invitation,
    InvitationStatus, Invoice, InvoiceItem, InvoiceStatus, Membership, OkResponse, Payment,
    RateLimitErrorResponse, RecordAudit, Session, Subscription, SubscriptionStatus, UpdateCompany,
    UpdateProfile, UpdateSubscription, UserProfile,
};

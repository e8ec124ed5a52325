use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::error::AppResult;
use crate::realtime::ChangeEvent;
use crate::types::{
    AuditLogEntry, Company, CreateCompany, CreateInvitation, CreateInvoice, CreateMembership,
    CreatePayment, CreateProfile, CreateSession, CreateSubscription, Invitation, InvitationStatus,
    Invoice, InvoiceStatus, Membership, Payment, RecordAudit, Session, Subscription, UpdateCompany,
    UpdateProfile, UpdateSubscription, UserProfile,
};

/// User-profile persistence operations.
#[async_trait]
pub trait ProfileOps: Send + Sync + 'static {
    async fn create_profile(&self, profile: CreateProfile) -> AppResult<UserProfile>;
    async fn get_profile_by_id(&self, id: &str) -> AppResult<Option<UserProfile>>;
    async fn get_profile_by_email(&self, email: &str) -> AppResult<Option<UserProfile>>;
    async fn update_profile(&self, id: &str, update: UpdateProfile) -> AppResult<UserProfile>;
    async fn delete_profile(&self, id: &str) -> AppResult<()>;
}

/// Session persistence operations.
#[async_trait]
pub trait SessionOps: Send + Sync + 'static {
    async fn create_session(&self, session: CreateSession) -> AppResult<Session>;
    async fn get_session(&self, token: &str) -> AppResult<Option<Session>>;
    async fn get_user_sessions(&self, user_id: &str) -> AppResult<Vec<Session>>;
    async fn update_session_expiry(&self, token: &str, expires_at: DateTime<Utc>) -> AppResult<()>;
    async fn delete_session(&self, token: &str) -> AppResult<()>;
    async fn delete_user_sessions(&self, user_id: &str) -> AppResult<()>;
    async fn delete_expired_sessions(&self) -> AppResult<usize>;
    async fn update_session_active_company(
        &self,
        token: &str,
        company_id: Option<&str>,
    ) -> AppResult<Session>;
}

/// Company persistence operations.
#[async_trait]
pub trait CompanyOps: Send + Sync + 'static {
    async fn create_company(&self, company: CreateCompany) -> AppResult<Company>;
    async fn get_company_by_id(&self, id: &str) -> AppResult<Option<Company>>;
    async fn get_company_by_slug(&self, slug: &str) -> AppResult<Option<Company>>;
    async fn update_company(&self, id: &str, update: UpdateCompany) -> AppResult<Company>;
    async fn delete_company(&self, id: &str) -> AppResult<()>;
    async fn list_user_companies(&self, user_id: &str) -> AppResult<Vec<Company>>;
}

/// Membership persistence operations.
#[async_trait]
pub trait MembershipOps: Send + Sync + 'static {
    async fn create_membership(&self, membership: CreateMembership) -> AppResult<Membership>;
    async fn get_membership(&self, company_id: &str, user_id: &str)
        -> AppResult<Option<Membership>>;
    async fn get_membership_by_id(&self, id: &str) -> AppResult<Option<Membership>>;
    async fn update_membership_role(&self, membership_id: &str, role: &str)
        -> AppResult<Membership>;
    async fn delete_membership(&self, membership_id: &str) -> AppResult<()>;
    async fn list_company_members(&self, company_id: &str) -> AppResult<Vec<Membership>>;
    async fn count_company_members(&self, company_id: &str) -> AppResult<usize>;
}

/// Invitation persistence operations.
#[async_trait]
pub trait InvitationOps: Send + Sync + 'static {
    async fn create_invitation(&self, invitation: CreateInvitation) -> AppResult<Invitation>;
    async fn get_invitation_by_id(&self, id: &str) -> AppResult<Option<Invitation>>;
    async fn get_pending_invitation(
        &self,
        company_id: &str,
        email: &str,
    ) -> AppResult<Option<Invitation>>;
    async fn update_invitation_status(
        &self,
        id: &str,
        status: InvitationStatus,
    ) -> AppResult<Invitation>;
    async fn list_company_invitations(&self, company_id: &str) -> AppResult<Vec<Invitation>>;
    async fn list_invitations_for_email(&self, email: &str) -> AppResult<Vec<Invitation>>;
}

/// Invoice persistence operations.
///
/// `create_invoice` inserts the invoice row together with its item rows as
/// one operation: a partially inserted invoice is never observable through
/// this trait.
#[async_trait]
pub trait InvoiceOps: Send + Sync + 'static {
    async fn create_invoice(&self, invoice: CreateInvoice) -> AppResult<Invoice>;
    async fn get_invoice_by_id(&self, id: &str) -> AppResult<Option<Invoice>>;
    async fn list_company_invoices(&self, company_id: &str) -> AppResult<Vec<Invoice>>;
    async fn update_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
        sent_at: Option<DateTime<Utc>>,
    ) -> AppResult<Invoice>;
    async fn delete_invoice(&self, id: &str) -> AppResult<()>;
    async fn count_company_invoices_since(
        &self,
        company_id: &str,
        since: DateTime<Utc>,
    ) -> AppResult<usize>;
}

/// Payment persistence operations.
#[async_trait]
pub trait PaymentOps: Send + Sync + 'static {
    async fn create_payment(&self, payment: CreatePayment) -> AppResult<Payment>;
    async fn list_invoice_payments(&self, invoice_id: &str) -> AppResult<Vec<Payment>>;
    async fn list_company_payments(&self, company_id: &str) -> AppResult<Vec<Payment>>;
}

/// Subscription persistence operations.
#[async_trait]
pub trait SubscriptionOps: Send + Sync + 'static {
    async fn create_subscription(&self, subscription: CreateSubscription)
        -> AppResult<Subscription>;
    async fn get_company_subscription(&self, company_id: &str) -> AppResult<Option<Subscription>>;
    async fn update_subscription(
        &self,
        id: &str,
        update: UpdateSubscription,
    ) -> AppResult<Subscription>;
}

/// Audit-log persistence operations.
#[async_trait]
pub trait AuditOps: Send + Sync + 'static {
    async fn record_audit(&self, entry: RecordAudit) -> AppResult<AuditLogEntry>;
    /// Entries for a company, newest first.
    async fn list_company_audit(&self, company_id: &str) -> AppResult<Vec<AuditLogEntry>>;
}

/// Access to the adapter's change feed.
///
/// The feed carries an event for every write the adapter performs; the
/// hosted database's own feed implementation stays external.
pub trait ChangeFeedOps: Send + Sync + 'static {
    fn changes(&self) -> broadcast::Receiver<ChangeEvent>;
}

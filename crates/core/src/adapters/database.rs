pub use super::traits::{
    AuditOps, ChangeFeedOps, CompanyOps, InvitationOps, InvoiceOps, MembershipOps, PaymentOps,
    ProfileOps, SessionOps, SubscriptionOps,
};

/// Database adapter trait for the hosted database client.
///
/// Combines all entity-specific operation traits. Any type that implements
/// all sub-traits (`ProfileOps`, `InvoiceOps`, etc.) automatically
/// implements `DatabaseAdapter` via the blanket impl.
///
/// Use the sub-traits directly when you only need a subset of operations
/// (e.g., a plugin that only touches invoices and memberships).
pub trait DatabaseAdapter:
    ProfileOps
    + SessionOps
    + CompanyOps
    + MembershipOps
    + InvitationOps
    + InvoiceOps
    + PaymentOps
    + SubscriptionOps
    + AuditOps
    + ChangeFeedOps
{
}

impl<T> DatabaseAdapter for T where
    T: ProfileOps
        + SessionOps
        + CompanyOps
        + MembershipOps
        + InvitationOps
        + InvoiceOps
        + PaymentOps
        + SubscriptionOps
        + AuditOps
        + ChangeFeedOps
{
}

//! Billing-side entities: invoices, payments, subscriptions, and audit log
//! entries, mirroring the hosted tables `invoices`, `invoice_items`,
//! `payments`, `subscriptions`, and `audit_logs`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::money;
use crate::plans::PlanId;

/// Invoice lifecycle states. Transitions are simple linear enum updates
/// performed by direct writes; `Overdue` is derived from `Sent` past its
/// due date rather than stored (see [`Invoice::display_status`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
}

/// One row of an invoice: description, quantity, and unit price in minor
/// currency units (cents).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct InvoiceItem {
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
    #[validate(range(min = 0, message = "Unit price cannot be negative"))]
    pub unit_price_minor: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub company_id: String,
    pub customer_email: String,
    pub currency: String,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub items: Vec<InvoiceItem>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Total amount in minor currency units: Σ(quantity × unit price).
    pub fn total_minor(&self) -> i64 {
        money::invoice_total(&self.items)
    }

    /// Whether the "send" action applies. Only draft invoices can be sent;
    /// clients hide the action otherwise rather than receiving an error.
    pub fn can_send(&self) -> bool {
        self.status == InvoiceStatus::Draft
    }

    /// Status as displayed: a sent invoice past its due date reads as
    /// overdue. Stored status is never rewritten to `Overdue`.
    pub fn display_status(&self, today: NaiveDate) -> InvoiceStatus {
        if self.status == InvoiceStatus::Sent && self.due_date < today {
            InvoiceStatus::Overdue
        } else {
            self.status
        }
    }
}

/// Invoice creation data. Items are inserted together with the invoice row
/// in a single adapter operation.
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub id: Option<String>,
    pub company_id: String,
    pub customer_email: String,
    pub currency: String,
    pub due_date: NaiveDate,
    pub items: Vec<InvoiceItem>,
}

/// A recorded payment against an invoice. The payment provider owns the
/// actual money movement; this row only mirrors its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub invoice_id: String,
    pub company_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub intent_id: String,
    pub created_at: DateTime<Utc>,
}

/// Payment creation data
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub invoice_id: String,
    pub company_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub intent_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
}

/// A company's billing subscription, mirroring the gateway's record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub company_id: String,
    pub plan_id: PlanId,
    pub gateway_customer_id: String,
    pub gateway_subscription_id: String,
    pub status: SubscriptionStatus,
    pub current_period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

/// Subscription creation data
#[derive(Debug, Clone)]
pub struct CreateSubscription {
    pub company_id: String,
    pub plan_id: PlanId,
    pub gateway_customer_id: String,
    pub gateway_subscription_id: String,
    pub current_period_end: DateTime<Utc>,
}

/// Subscription update data
#[derive(Debug, Clone, Default)]
pub struct UpdateSubscription {
    pub plan_id: Option<PlanId>,
    pub status: Option<SubscriptionStatus>,
    pub current_period_end: Option<DateTime<Utc>>,
}

/// One audit trail entry for a tenant-visible mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: String,
    pub company_id: String,
    pub actor_id: String,
    pub action: String,
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

/// Audit entry creation data
#[derive(Debug, Clone)]
pub struct RecordAudit {
    pub company_id: String,
    pub actor_id: String,
    pub action: String,
    pub subject: String,
}

impl RecordAudit {
    pub fn new(
        company_id: impl Into<String>,
        actor_id: impl Into<String>,
        action: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            company_id: company_id.into(),
            actor_id: actor_id.into(),
            action: action.into(),
            subject: subject.into(),
        }
    }
}

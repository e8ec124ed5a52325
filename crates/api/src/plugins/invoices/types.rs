use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use vendhub_core::{Invoice, InvoiceItem, InvoiceStatus, Payment};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    #[validate(email(message = "Invalid customer email"))]
    pub customer_email: String,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,
    pub due_date: NaiveDate,
    /// Defaults to the session's active company.
    pub company_id: Option<String>,
    #[validate(
        length(min = 1, message = "At least one line item is required"),
        nested
    )]
    pub items: Vec<InvoiceItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListInvoicesQuery {
    pub company_id: Option<String>,
    pub company_slug: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GetInvoiceQuery {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct SendInvoiceRequest {
    pub invoice_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkPaidRequest {
    pub invoice_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PayInvoiceRequest {
    pub invoice_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteInvoiceRequest {
    pub invoice_id: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Invoice as returned to clients: stored fields plus the derived total and
/// the display status (a sent invoice past its due date reads as overdue).
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: String,
    pub company_id: String,
    pub customer_email: String,
    pub currency: String,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub items: Vec<InvoiceItem>,
    pub sent_at: Option<chrono::DateTime<Utc>>,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
    pub total_minor: i64,
    pub can_send: bool,
}

impl InvoiceResponse {
    pub fn from_invoice(invoice: Invoice) -> Self {
        let today = Utc::now().date_naive();
        let total_minor = invoice.total_minor();
        let can_send = invoice.can_send();
        Self {
            status: invoice.display_status(today),
            id: invoice.id,
            company_id: invoice.company_id,
            customer_email: invoice.customer_email,
            currency: invoice.currency,
            due_date: invoice.due_date,
            items: invoice.items,
            sent_at: invoice.sent_at,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
            total_minor,
            can_send,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListInvoicesResponse {
    pub invoices: Vec<InvoiceResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct PayInvoiceResponse {
    pub invoice: InvoiceResponse,
    pub payment: Payment,
    pub client_secret: String,
}

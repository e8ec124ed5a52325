use chrono::Utc;

use vendhub_core::adapters::DatabaseAdapter;
use vendhub_core::{
    AppContext, AppError, AppRequest, AppResponse, AppResult, CreateInvoice, CreatePayment,
    Invoice, InvoiceStatus, Logger as _, PaymentsGateway as _, RecordAudit, Session, UserProfile,
};

use super::types::{
    CreateInvoiceRequest, DeleteInvoiceRequest, GetInvoiceQuery, InvoiceResponse,
    ListInvoicesQuery, ListInvoicesResponse, MarkPaidRequest, PayInvoiceRequest,
    PayInvoiceResponse, SendInvoiceRequest, SuccessResponse,
};
use super::InvoicesConfig;
use crate::plugins::helpers::{parse_query, require_member, require_session, resolve_company_id};
use crate::plugins::teams::rbac::{role_allows, Action, Resource};

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

async fn load_member_invoice<DB: DatabaseAdapter>(
    invoice_id: &str,
    user: &UserProfile,
    ctx: &AppContext<DB>,
) -> AppResult<Invoice> {
    let invoice = ctx
        .database
        .get_invoice_by_id(invoice_id)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice not found"))?;

    require_member(ctx, &invoice.company_id, &user.id).await?;
    Ok(invoice)
}

pub(crate) async fn create_invoice_core<DB: DatabaseAdapter>(
    body: &CreateInvoiceRequest,
    user: &UserProfile,
    session: &Session,
    config: &InvoicesConfig,
    ctx: &AppContext<DB>,
) -> AppResult<InvoiceResponse> {
    let company_id = resolve_company_id(body.company_id.as_deref(), None, session, ctx).await?;

    let member = require_member(ctx, &company_id, &user.id).await?;
    if !role_allows(&member.role, &Resource::Invoice, &Action::Create) {
        return Err(AppError::forbidden(
            "You don't have permission to create invoices",
        ));
    }

    if body.items.len() > config.max_items_per_invoice {
        return Err(AppError::bad_request(format!(
            "An invoice can carry at most {} line items",
            config.max_items_per_invoice
        )));
    }

    let invoice_data = CreateInvoice {
        id: None,
        company_id: company_id.clone(),
        customer_email: body.customer_email.clone(),
        currency: body.currency.to_uppercase(),
        due_date: body.due_date,
        items: body.items.clone(),
    };

    let invoice = ctx.database.create_invoice(invoice_data).await?;

    ctx.database
        .record_audit(RecordAudit::new(
            &company_id,
            &user.id,
            "invoice.created",
            &invoice.id,
        ))
        .await?;

    Ok(InvoiceResponse::from_invoice(invoice))
}

pub(crate) async fn list_invoices_core<DB: DatabaseAdapter>(
    query: &ListInvoicesQuery,
    user: &UserProfile,
    session: &Session,
    ctx: &AppContext<DB>,
) -> AppResult<ListInvoicesResponse> {
    let company_id = resolve_company_id(
        query.company_id.as_deref(),
        query.company_slug.as_deref(),
        session,
        ctx,
    )
    .await?;

    require_member(ctx, &company_id, &user.id).await?;

    let invoices = ctx.database.list_company_invoices(&company_id).await?;
    let total = invoices.len();
    let invoices = invoices
        .into_iter()
        .map(InvoiceResponse::from_invoice)
        .collect();

    Ok(ListInvoicesResponse { invoices, total })
}

pub(crate) async fn get_invoice_core<DB: DatabaseAdapter>(
    query: &GetInvoiceQuery,
    user: &UserProfile,
    ctx: &AppContext<DB>,
) -> AppResult<InvoiceResponse> {
    if query.id.is_empty() {
        return Err(AppError::bad_request("Missing invoice id"));
    }

    let invoice = load_member_invoice(&query.id, user, ctx).await?;
    Ok(InvoiceResponse::from_invoice(invoice))
}

/// The "send" action: a direct write of `sent` + the send timestamp.
///
/// Draft-only gating is a client-side affair (the action is hidden unless
/// [`Invoice::can_send`] holds); the write itself does not check the prior
/// status, matching how the hosted app performs the transition.
pub(crate) async fn send_invoice_core<DB: DatabaseAdapter>(
    body: &SendInvoiceRequest,
    user: &UserProfile,
    ctx: &AppContext<DB>,
) -> AppResult<InvoiceResponse> {
    let invoice = load_member_invoice(&body.invoice_id, user, ctx).await?;

    let updated = ctx
        .database
        .update_invoice_status(&invoice.id, InvoiceStatus::Sent, Some(Utc::now()))
        .await?;

    ctx.database
        .record_audit(RecordAudit::new(
            &updated.company_id,
            &user.id,
            "invoice.sent",
            &updated.id,
        ))
        .await?;
    ctx.config.logger.info(&format!(
        "invoice {} sent to {}",
        updated.id, updated.customer_email
    ));

    Ok(InvoiceResponse::from_invoice(updated))
}

pub(crate) async fn mark_paid_core<DB: DatabaseAdapter>(
    body: &MarkPaidRequest,
    user: &UserProfile,
    ctx: &AppContext<DB>,
) -> AppResult<InvoiceResponse> {
    let invoice = load_member_invoice(&body.invoice_id, user, ctx).await?;

    let member = require_member(ctx, &invoice.company_id, &user.id).await?;
    if !role_allows(&member.role, &Resource::Invoice, &Action::Update) {
        return Err(AppError::forbidden(
            "You don't have permission to update invoices",
        ));
    }

    let updated = ctx
        .database
        .update_invoice_status(&invoice.id, InvoiceStatus::Paid, None)
        .await?;

    ctx.database
        .record_audit(RecordAudit::new(
            &updated.company_id,
            &user.id,
            "invoice.paid",
            &updated.id,
        ))
        .await?;

    Ok(InvoiceResponse::from_invoice(updated))
}

/// Collect payment for an invoice: create a payment intent on the gateway,
/// mirror it as a `payments` row, and mark the invoice paid.
pub(crate) async fn pay_invoice_core<DB: DatabaseAdapter>(
    body: &PayInvoiceRequest,
    user: &UserProfile,
    ctx: &AppContext<DB>,
) -> AppResult<PayInvoiceResponse> {
    let invoice = load_member_invoice(&body.invoice_id, user, ctx).await?;

    if invoice.status == InvoiceStatus::Paid {
        return Err(AppError::bad_request("Invoice is already paid"));
    }

    let amount = invoice.total_minor();
    let intent = ctx
        .gateway
        .create_payment_intent(amount, &invoice.currency)
        .await?;

    let payment = ctx
        .database
        .create_payment(CreatePayment {
            invoice_id: invoice.id.clone(),
            company_id: invoice.company_id.clone(),
            amount_minor: amount,
            currency: invoice.currency.clone(),
            intent_id: intent.intent_id.clone(),
        })
        .await?;

    let updated = ctx
        .database
        .update_invoice_status(&invoice.id, InvoiceStatus::Paid, None)
        .await?;

    ctx.database
        .record_audit(RecordAudit::new(
            &updated.company_id,
            &user.id,
            "invoice.paid",
            &updated.id,
        ))
        .await?;

    Ok(PayInvoiceResponse {
        invoice: InvoiceResponse::from_invoice(updated),
        payment,
        client_secret: intent.client_secret,
    })
}

pub(crate) async fn delete_invoice_core<DB: DatabaseAdapter>(
    body: &DeleteInvoiceRequest,
    user: &UserProfile,
    ctx: &AppContext<DB>,
) -> AppResult<SuccessResponse> {
    let invoice = load_member_invoice(&body.invoice_id, user, ctx).await?;

    let member = require_member(ctx, &invoice.company_id, &user.id).await?;
    if !role_allows(&member.role, &Resource::Invoice, &Action::Delete) {
        return Err(AppError::forbidden(
            "You don't have permission to delete invoices",
        ));
    }

    ctx.database.delete_invoice(&invoice.id).await?;

    ctx.database
        .record_audit(RecordAudit::new(
            &invoice.company_id,
            &user.id,
            "invoice.deleted",
            &invoice.id,
        ))
        .await?;

    Ok(SuccessResponse { success: true })
}

// ---------------------------------------------------------------------------
// Request handlers
// ---------------------------------------------------------------------------

pub async fn handle_create_invoice<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
    config: &InvoicesConfig,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let body: CreateInvoiceRequest = match vendhub_core::validate_request_body(req) {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    let response = create_invoice_core(&body, &user, &session, config, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

pub async fn handle_list_invoices<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let query = parse_query::<ListInvoicesQuery>(&req.query);
    let response = list_invoices_core(&query, &user, &session, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

pub async fn handle_get_invoice<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, _session) = require_session(req, ctx).await?;
    let query = parse_query::<GetInvoiceQuery>(&req.query);
    let response = get_invoice_core(&query, &user, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

pub async fn handle_send_invoice<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, _session) = require_session(req, ctx).await?;
    let body: SendInvoiceRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let response = send_invoice_core(&body, &user, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

pub async fn handle_mark_paid<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, _session) = require_session(req, ctx).await?;
    let body: MarkPaidRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let response = mark_paid_core(&body, &user, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

pub async fn handle_pay_invoice<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, _session) = require_session(req, ctx).await?;
    let body: PayInvoiceRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let response = pay_invoice_core(&body, &user, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

pub async fn handle_delete_invoice<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, _session) = require_session(req, ctx).await?;
    let body: DeleteInvoiceRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let response = delete_invoice_core(&body, &user, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

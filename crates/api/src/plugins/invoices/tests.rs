use std::collections::HashMap;

use vendhub_core::adapters::{AuditOps, InvoiceOps, PaymentOps, ProfileOps, SessionOps};
use vendhub_core::{HttpMethod, InvoiceStatus};

use super::handlers;
use super::InvoicesConfig;
use crate::plugins::test_helpers;

fn invoice_body(company_id: &str, due_date: &str) -> serde_json::Value {
    serde_json::json!({
        "customer_email": "customer@example.com",
        "currency": "usd",
        "due_date": due_date,
        "company_id": company_id,
        "items": [
            { "description": "Snack restock", "quantity": 2, "unit_price_minor": 500 },
            { "description": "Service visit", "quantity": 1, "unit_price_minor": 300 },
        ],
    })
}

async fn create_invoice(
    ctx: &vendhub_core::AppContext<vendhub_core::MemoryDatabaseAdapter>,
    token: &str,
    company_id: &str,
    due_date: &str,
) -> serde_json::Value {
    let req = test_helpers::create_app_request(
        HttpMethod::Post,
        "/invoices/create",
        Some(token),
        Some(invoice_body(company_id, due_date).to_string().into_bytes()),
        HashMap::new(),
    );
    let response = handlers::handle_create_invoice(&req, ctx, &InvoicesConfig::default())
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    serde_json::from_slice(&response.body).unwrap()
}

#[tokio::test]
async fn create_invoice_computes_total_and_starts_draft() {
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("owner").await;

    let invoice = create_invoice(&ctx, &session.token, &company.id, "2026-09-01").await;

    assert_eq!(invoice["status"], "draft");
    assert_eq!(invoice["total_minor"], 1300);
    assert_eq!(invoice["can_send"], true);
    assert_eq!(invoice["currency"], "USD");
}

#[tokio::test]
async fn create_invoice_requires_authentication() {
    let (ctx, _gw, _user, company, _session) = test_helpers::create_company_context("owner").await;

    let req = test_helpers::create_app_request(
        HttpMethod::Post,
        "/invoices/create",
        None,
        Some(invoice_body(&company.id, "2026-09-01").to_string().into_bytes()),
        HashMap::new(),
    );
    let err = handlers::handle_create_invoice(&req, &ctx, &InvoicesConfig::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 401);
}

#[tokio::test]
async fn create_invoice_rejects_invalid_body_with_details() {
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("owner").await;

    let body = serde_json::json!({
        "customer_email": "not-an-email",
        "currency": "usd",
        "due_date": "2026-09-01",
        "company_id": company.id,
        "items": [],
    });
    let req = test_helpers::create_app_request(
        HttpMethod::Post,
        "/invoices/create",
        Some(&session.token),
        Some(body.to_string().into_bytes()),
        HashMap::new(),
    );

    let response = handlers::handle_create_invoice(&req, &ctx, &InvoicesConfig::default())
        .await
        .unwrap();
    assert_eq!(response.status, 400);

    let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body["error"], "Validation failed");
    assert!(body["details"]["customer_email"].is_array());
    assert!(body["details"]["items"].is_array());
}

#[tokio::test]
async fn create_invoice_requires_membership() {
    let (ctx, _gw, _user, company, _session) = test_helpers::create_company_context("owner").await;

    // A second user with a session but no membership in the company
    let outsider = ctx
        .database
        .create_profile(vendhub_core::CreateProfile::new("outsider@example.com"))
        .await
        .unwrap();
    let outsider_session = ctx
        .database
        .create_session(vendhub_core::CreateSession {
            user_id: outsider.id.clone(),
            expires_at: chrono::Utc::now() + chrono::Duration::hours(1),
            ip_address: None,
            user_agent: None,
            active_company_id: None,
        })
        .await
        .unwrap();

    let req = test_helpers::create_app_request(
        HttpMethod::Post,
        "/invoices/create",
        Some(&outsider_session.token),
        Some(invoice_body(&company.id, "2026-09-01").to_string().into_bytes()),
        HashMap::new(),
    );
    let err = handlers::handle_create_invoice(&req, &ctx, &InvoicesConfig::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn send_marks_invoice_sent_and_records_audit() {
    let (ctx, _gw, user, company, session) = test_helpers::create_company_context("owner").await;
    let invoice = create_invoice(&ctx, &session.token, &company.id, "2026-09-01").await;

    let body = serde_json::json!({ "invoice_id": invoice["id"] });
    let req = test_helpers::create_app_request(
        HttpMethod::Post,
        "/invoices/send",
        Some(&session.token),
        Some(body.to_string().into_bytes()),
        HashMap::new(),
    );
    let response = handlers::handle_send_invoice(&req, &ctx).await.unwrap();
    assert_eq!(response.status, 200);

    let sent: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(sent["status"], "sent");
    assert_eq!(sent["can_send"], false);
    assert!(sent["sent_at"].is_string());

    let audit = ctx.database.list_company_audit(&company.id).await.unwrap();
    assert_eq!(audit[0].action, "invoice.sent");
    assert_eq!(audit[0].actor_id, user.id);
}

#[tokio::test]
async fn send_is_not_rejected_for_non_draft_invoices() {
    // The prior-status check is a client-side affair; the server writes
    // unconditionally.
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("owner").await;
    let invoice = create_invoice(&ctx, &session.token, &company.id, "2026-09-01").await;

    let body = serde_json::json!({ "invoice_id": invoice["id"] });
    for _ in 0..2 {
        let req = test_helpers::create_app_request(
            HttpMethod::Post,
            "/invoices/send",
            Some(&session.token),
            Some(body.to_string().into_bytes()),
            HashMap::new(),
        );
        let response = handlers::handle_send_invoice(&req, &ctx).await.unwrap();
        assert_eq!(response.status, 200);
    }
}

#[tokio::test]
async fn sent_invoice_past_due_date_displays_overdue() {
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("owner").await;
    let invoice = create_invoice(&ctx, &session.token, &company.id, "2020-01-01").await;

    let body = serde_json::json!({ "invoice_id": invoice["id"] });
    let req = test_helpers::create_app_request(
        HttpMethod::Post,
        "/invoices/send",
        Some(&session.token),
        Some(body.to_string().into_bytes()),
        HashMap::new(),
    );
    let response = handlers::handle_send_invoice(&req, &ctx).await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(sent["status"], "overdue");

    // The stored status stays `sent`; overdue is derived at read time.
    let stored = ctx
        .database
        .get_invoice_by_id(invoice["id"].as_str().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, InvoiceStatus::Sent);
}

#[tokio::test]
async fn pay_creates_intent_and_payment_row() {
    let (ctx, gateway, _user, company, session) =
        test_helpers::create_company_context("owner").await;
    let invoice = create_invoice(&ctx, &session.token, &company.id, "2026-09-01").await;
    let invoice_id = invoice["id"].as_str().unwrap().to_string();

    let body = serde_json::json!({ "invoice_id": invoice_id });
    let req = test_helpers::create_app_request(
        HttpMethod::Post,
        "/invoices/pay",
        Some(&session.token),
        Some(body.to_string().into_bytes()),
        HashMap::new(),
    );
    let response = handlers::handle_pay_invoice(&req, &ctx).await.unwrap();
    assert_eq!(response.status, 200);

    let paid: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(paid["invoice"]["status"], "paid");
    assert_eq!(paid["payment"]["amount_minor"], 1300);
    assert!(paid["client_secret"].is_string());

    assert!(gateway
        .calls()
        .iter()
        .any(|c| c.starts_with("create_payment_intent")));

    let payments = ctx.database.list_invoice_payments(&invoice_id).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount_minor, 1300);
}

#[tokio::test]
async fn paying_a_paid_invoice_is_rejected() {
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("owner").await;
    let invoice = create_invoice(&ctx, &session.token, &company.id, "2026-09-01").await;

    let body = serde_json::json!({ "invoice_id": invoice["id"] });
    let pay = |body: serde_json::Value| {
        test_helpers::create_app_request(
            HttpMethod::Post,
            "/invoices/pay",
            Some(&session.token),
            Some(body.to_string().into_bytes()),
            HashMap::new(),
        )
    };

    handlers::handle_pay_invoice(&pay(body.clone()), &ctx)
        .await
        .unwrap();
    let err = handlers::handle_pay_invoice(&pay(body), &ctx)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn members_cannot_delete_invoices() {
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("member").await;
    let invoice = create_invoice(&ctx, &session.token, &company.id, "2026-09-01").await;

    let body = serde_json::json!({ "invoice_id": invoice["id"] });
    let req = test_helpers::create_app_request(
        HttpMethod::Post,
        "/invoices/delete",
        Some(&session.token),
        Some(body.to_string().into_bytes()),
        HashMap::new(),
    );
    let err = handlers::handle_delete_invoice(&req, &ctx).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn owners_can_delete_invoices() {
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("owner").await;
    let invoice = create_invoice(&ctx, &session.token, &company.id, "2026-09-01").await;
    let invoice_id = invoice["id"].as_str().unwrap().to_string();

    let body = serde_json::json!({ "invoice_id": invoice_id });
    let req = test_helpers::create_app_request(
        HttpMethod::Post,
        "/invoices/delete",
        Some(&session.token),
        Some(body.to_string().into_bytes()),
        HashMap::new(),
    );
    let response = handlers::handle_delete_invoice(&req, &ctx).await.unwrap();
    assert_eq!(response.status, 200);

    assert!(ctx
        .database
        .get_invoice_by_id(&invoice_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn list_scopes_to_company_and_carries_totals() {
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("owner").await;
    create_invoice(&ctx, &session.token, &company.id, "2026-09-01").await;
    create_invoice(&ctx, &session.token, &company.id, "2026-10-01").await;

    let mut query = HashMap::new();
    query.insert("company_id".to_string(), company.id.clone());
    let req = test_helpers::create_app_request(
        HttpMethod::Get,
        "/invoices/list",
        Some(&session.token),
        None,
        query,
    );
    let response = handlers::handle_list_invoices(&req, &ctx).await.unwrap();
    assert_eq!(response.status, 200);

    let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body["total"], 2);
    assert_eq!(body["invoices"][0]["total_minor"], 1300);
}

use std::collections::HashMap;

use chrono::NaiveDate;
use vendhub_core::adapters::InvoiceOps;
use vendhub_core::{CreateInvoice, HttpMethod, InvoiceItem};

use super::handlers;
use crate::plugins::test_helpers;

fn post(path: &str, token: &str, body: serde_json::Value) -> vendhub_core::AppRequest {
    test_helpers::create_app_request(
        HttpMethod::Post,
        path,
        Some(token),
        Some(body.to_string().into_bytes()),
        HashMap::new(),
    )
}

fn get(path: &str, token: &str, company_id: &str) -> vendhub_core::AppRequest {
    let mut query = HashMap::new();
    query.insert("company_id".to_string(), company_id.to_string());
    test_helpers::create_app_request(HttpMethod::Get, path, Some(token), None, query)
}

#[tokio::test]
async fn company_without_subscription_is_on_the_default_plan() {
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("owner").await;

    let response =
        handlers::handle_get_subscription(&get("/billing/subscription", &session.token, &company.id), &ctx)
            .await
            .unwrap();
    assert_eq!(response.status, 200);

    let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert!(body["subscription"].is_null());
    assert_eq!(body["plan"]["id"], "starter");
}

#[tokio::test]
async fn subscribe_creates_gateway_subscription_and_row() {
    let (ctx, gateway, _user, company, session) =
        test_helpers::create_company_context("owner").await;

    let body = serde_json::json!({ "plan": "growth", "company_id": company.id });
    let response = handlers::handle_subscribe(&post("/billing/subscribe", &session.token, body), &ctx)
        .await
        .unwrap();
    assert_eq!(response.status, 200);

    let subscription: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(subscription["plan_id"], "growth");
    assert_eq!(subscription["status"], "active");

    assert_eq!(gateway.calls(), vec!["create_subscription:growth".to_string()]);
}

#[tokio::test]
async fn double_subscribe_conflicts() {
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("owner").await;

    let body = serde_json::json!({ "plan": "growth", "company_id": company.id });
    handlers::handle_subscribe(&post("/billing/subscribe", &session.token, body.clone()), &ctx)
        .await
        .unwrap();
    let err = handlers::handle_subscribe(&post("/billing/subscribe", &session.token, body), &ctx)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn billing_mutations_require_the_owner_role() {
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("admin").await;

    let body = serde_json::json!({ "plan": "growth", "company_id": company.id });
    let err = handlers::handle_subscribe(&post("/billing/subscribe", &session.token, body), &ctx)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn change_plan_and_cancel_round_trip() {
    let (ctx, gateway, _user, company, session) =
        test_helpers::create_company_context("owner").await;

    let body = serde_json::json!({ "plan": "growth", "company_id": company.id });
    handlers::handle_subscribe(&post("/billing/subscribe", &session.token, body), &ctx)
        .await
        .unwrap();

    let body = serde_json::json!({ "plan": "scale", "company_id": company.id });
    let response =
        handlers::handle_change_plan(&post("/billing/change-plan", &session.token, body), &ctx)
            .await
            .unwrap();
    let changed: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(changed["plan_id"], "scale");

    let body = serde_json::json!({ "company_id": company.id });
    let response = handlers::handle_cancel_subscription(&post("/billing/cancel", &session.token, body), &ctx)
        .await
        .unwrap();
    let canceled: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(canceled["status"], "canceled");

    let calls = gateway.calls();
    assert!(calls.iter().any(|c| c.starts_with("update_subscription")));
    assert!(calls.iter().any(|c| c.starts_with("cancel_subscription")));
}

#[tokio::test]
async fn portal_returns_gateway_url() {
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("owner").await;

    let body = serde_json::json!({ "plan": "growth", "company_id": company.id });
    handlers::handle_subscribe(&post("/billing/subscribe", &session.token, body), &ctx)
        .await
        .unwrap();

    let body = serde_json::json!({ "company_id": company.id });
    let response = handlers::handle_portal(&post("/billing/portal", &session.token, body), &ctx)
        .await
        .unwrap();
    let portal: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert!(portal["url"].as_str().unwrap().contains("/portal/"));
}

#[tokio::test]
async fn usage_meters_report_clamped_percentages() {
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("owner").await;

    // Starter allows 10 invoices / month; create 5.
    for i in 0..5 {
        ctx.database
            .create_invoice(CreateInvoice {
                id: None,
                company_id: company.id.clone(),
                customer_email: format!("c{}@example.com", i),
                currency: "USD".to_string(),
                due_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                items: vec![InvoiceItem {
                    description: "restock".to_string(),
                    quantity: 1,
                    unit_price_minor: 100,
                }],
            })
            .await
            .unwrap();
    }

    let response = handlers::handle_usage(&get("/billing/usage", &session.token, &company.id), &ctx)
        .await
        .unwrap();
    let usage: serde_json::Value = serde_json::from_slice(&response.body).unwrap();

    assert_eq!(usage["plan"], "starter");
    assert_eq!(usage["invoices"]["used"], 5);
    assert_eq!(usage["invoices"]["percent"], 50);
    assert_eq!(usage["members"]["used"], 1);
}

#[tokio::test]
async fn unlimited_plan_reports_zero_percent() {
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("owner").await;

    let body = serde_json::json!({ "plan": "scale", "company_id": company.id });
    handlers::handle_subscribe(&post("/billing/subscribe", &session.token, body), &ctx)
        .await
        .unwrap();

    for i in 0..20 {
        ctx.database
            .create_invoice(CreateInvoice {
                id: None,
                company_id: company.id.clone(),
                customer_email: format!("c{}@example.com", i),
                currency: "USD".to_string(),
                due_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                items: vec![],
            })
            .await
            .unwrap();
    }

    let response = handlers::handle_usage(&get("/billing/usage", &session.token, &company.id), &ctx)
        .await
        .unwrap();
    let usage: serde_json::Value = serde_json::from_slice(&response.body).unwrap();

    assert_eq!(usage["plan"], "scale");
    assert_eq!(usage["invoices"]["used"], 20);
    assert_eq!(usage["invoices"]["percent"], 0);
    assert_eq!(usage["invoices"]["limit"], "unlimited");
}

//! Property-based tests using `proptest` for the money arithmetic and the
//! request-validation boundary. Random inputs cover classes of values that
//! hand-written tests miss.

use proptest::prelude::*;

use vendhub::adapters::{ProfileOps, SessionOps};
use vendhub::plugins::{InvoicesPlugin, TeamsPlugin};
use vendhub::{
    invoice_total, usage_percent, AppBuilder, AppConfig, AppRequest, CreateProfile, CreateSession,
    HttpMethod, InvoiceItem, MemoryDatabaseAdapter, PlanLimit, VendHub,
};

fn item_strategy() -> impl Strategy<Value = InvoiceItem> {
    ("[a-z]{1,16}", 1i64..=1_000, 0i64..=1_000_000).prop_map(
        |(description, quantity, unit_price_minor)| InvoiceItem {
            description,
            quantity,
            unit_price_minor,
        },
    )
}

proptest! {
    /// For all valid inputs (quantity ≥ 1, unit price ≥ 0) the total is
    /// non-negative and equals the item-by-item sum.
    #[test]
    fn invoice_total_is_nonnegative_sum(items in proptest::collection::vec(item_strategy(), 0..16)) {
        let total = invoice_total(&items);

        prop_assert!(total >= 0);

        let expected: i64 = items.iter().map(|i| i.quantity * i.unit_price_minor).sum();
        prop_assert_eq!(total, expected);

        if items.is_empty() {
            prop_assert_eq!(total, 0);
        }
    }

    /// Appending an item never decreases the total.
    #[test]
    fn invoice_total_is_monotone(
        items in proptest::collection::vec(item_strategy(), 0..8),
        extra in item_strategy(),
    ) {
        let base = invoice_total(&items);
        let mut extended = items;
        extended.push(extra);
        prop_assert!(invoice_total(&extended) >= base);
    }

    /// The display percentage is always within [0, 100] for finite limits.
    #[test]
    fn usage_percent_is_clamped(current in any::<u64>(), limit in 1u64..=1_000_000) {
        let pct = usage_percent(current, PlanLimit::Limited(limit));
        prop_assert!(pct <= 100);
        if current >= limit {
            prop_assert_eq!(pct, 100);
        }
    }

    /// An unbounded limit reads 0% no matter the usage.
    #[test]
    fn unlimited_always_reads_zero(current in any::<u64>()) {
        prop_assert_eq!(usage_percent(current, PlanLimit::Unlimited), 0);
    }
}

// ---------------------------------------------------------------------------
// Validation boundary properties (driven through the full request pipeline)
// ---------------------------------------------------------------------------

async fn app_with_owner() -> (VendHub<MemoryDatabaseAdapter>, String, String) {
    let app = AppBuilder::new(
        AppConfig::new("property-secret-key-at-least-32-characters!").base_url("http://localhost"),
    )
    .database(MemoryDatabaseAdapter::new())
    .plugin(TeamsPlugin::new())
    .plugin(InvoicesPlugin::new())
    .build()
    .await
    .unwrap();

    let user = app
        .database()
        .create_profile(CreateProfile::new("owner@example.com"))
        .await
        .unwrap();
    let token = app
        .database()
        .create_session(CreateSession {
            user_id: user.id,
            expires_at: chrono::Utc::now() + chrono::Duration::hours(1),
            ip_address: None,
            user_agent: None,
            active_company_id: None,
        })
        .await
        .unwrap()
        .token;

    let mut req = AppRequest::new(HttpMethod::Post, "/teams/create");
    req.headers
        .insert("authorization".to_string(), format!("Bearer {}", token));
    req.body = Some(
        serde_json::json!({ "name": "Acme", "slug": "acme" })
            .to_string()
            .into_bytes(),
    );
    let response = app.handle_request(req).await.unwrap();
    assert_eq!(response.status, 200);
    let company: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    let company_id = company["id"].as_str().unwrap().to_string();

    (app, token, company_id)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Non-positive quantities must be rejected by schema validation; they
    /// never reach the totaling arithmetic.
    #[test]
    fn nonpositive_quantities_are_rejected(quantity in -1_000i64..=0) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (app, token, company_id) = app_with_owner().await;

            let mut req = AppRequest::new(HttpMethod::Post, "/invoices/create");
            req.headers
                .insert("authorization".to_string(), format!("Bearer {}", token));
            req.body = Some(
                serde_json::json!({
                    "customer_email": "customer@example.com",
                    "currency": "USD",
                    "due_date": "2026-09-01",
                    "company_id": company_id,
                    "items": [
                        { "description": "x", "quantity": quantity, "unit_price_minor": 100 },
                    ],
                })
                .to_string()
                .into_bytes(),
            );

            let response = app.handle_request(req).await.unwrap();
            prop_assert_eq!(
                response.status, 400,
                "quantity {} should be rejected", quantity
            );
            Ok(())
        })?;
    }

    /// Negative unit prices must be rejected the same way.
    #[test]
    fn negative_prices_are_rejected(price in -1_000_000i64..0) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (app, token, company_id) = app_with_owner().await;

            let mut req = AppRequest::new(HttpMethod::Post, "/invoices/create");
            req.headers
                .insert("authorization".to_string(), format!("Bearer {}", token));
            req.body = Some(
                serde_json::json!({
                    "customer_email": "customer@example.com",
                    "currency": "USD",
                    "due_date": "2026-09-01",
                    "company_id": company_id,
                    "items": [
                        { "description": "x", "quantity": 1, "unit_price_minor": price },
                    ],
                })
                .to_string()
                .into_bytes(),
            );

            let response = app.handle_request(req).await.unwrap();
            prop_assert_eq!(response.status, 400, "price {} should be rejected", price);
            Ok(())
        })?;
    }

    /// Valid random invoices are accepted and their reported total matches
    /// the arithmetic exactly.
    #[test]
    fn valid_invoices_round_trip_their_total(
        items in proptest::collection::vec(item_strategy(), 1..8)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (app, token, company_id) = app_with_owner().await;

            let expected = invoice_total(&items);

            let mut req = AppRequest::new(HttpMethod::Post, "/invoices/create");
            req.headers
                .insert("authorization".to_string(), format!("Bearer {}", token));
            req.body = Some(
                serde_json::json!({
                    "customer_email": "customer@example.com",
                    "currency": "USD",
                    "due_date": "2026-09-01",
                    "company_id": company_id,
                    "items": items,
                })
                .to_string()
                .into_bytes(),
            );

            let response = app.handle_request(req).await.unwrap();
            prop_assert_eq!(response.status, 200);

            let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
            prop_assert_eq!(body["total_minor"].as_i64(), Some(expected));
            Ok(())
        })?;
    }
}

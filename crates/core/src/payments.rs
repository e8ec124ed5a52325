//! Payments provider client seam.
//!
//! The payments platform owns every money-movement state machine; this
//! repository only invokes it. [`PaymentsGateway`] is the trait the billing
//! and invoice plugins call through, and [`MockPaymentsGateway`] is the
//! deterministic implementation used by tests and local development.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::AppResult;
use crate::plans::PlanId;

/// A subscription record as the gateway reports it.
#[derive(Debug, Clone, Serialize)]
pub struct GatewaySubscription {
    pub customer_id: String,
    pub subscription_id: String,
    pub plan_id: PlanId,
    pub current_period_end: DateTime<Utc>,
}

/// A payment intent created on the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntent {
    pub intent_id: String,
    pub client_secret: String,
    pub amount_minor: i64,
    pub currency: String,
}

/// A hosted billing-portal session.
#[derive(Debug, Clone, Serialize)]
pub struct PortalSession {
    pub url: String,
}

/// Trait for the payments provider client. Implement this to integrate with
/// your payment platform's SDK.
#[async_trait]
pub trait PaymentsGateway: Send + Sync {
    /// Create a subscription for a customer on the given plan.
    async fn create_subscription(
        &self,
        customer_email: &str,
        plan: PlanId,
    ) -> AppResult<GatewaySubscription>;

    /// Move an existing subscription to a different plan.
    async fn update_subscription(
        &self,
        subscription_id: &str,
        plan: PlanId,
    ) -> AppResult<GatewaySubscription>;

    /// Cancel a subscription.
    async fn cancel_subscription(&self, subscription_id: &str) -> AppResult<()>;

    /// Create a billing-portal session for a customer.
    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> AppResult<PortalSession>;

    /// Create a payment intent for a one-off charge.
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> AppResult<PaymentIntent>;
}

/// Deterministic in-process gateway for tests and local development.
///
/// Ids are sequential (`cus_1`, `sub_2`, `pi_3`, ...) and every call is
/// recorded for assertions.
pub struct MockPaymentsGateway {
    counter: AtomicU64,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockPaymentsGateway {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The call log, in invocation order (e.g. `"create_subscription:growth"`).
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}_{}", prefix, n)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for MockPaymentsGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentsGateway for MockPaymentsGateway {
    async fn create_subscription(
        &self,
        customer_email: &str,
        plan: PlanId,
    ) -> AppResult<GatewaySubscription> {
        self.record(format!("create_subscription:{}", plan.as_str()));
        let _ = customer_email;
        Ok(GatewaySubscription {
            customer_id: self.next_id("cus"),
            subscription_id: self.next_id("sub"),
            plan_id: plan,
            current_period_end: Utc::now() + Duration::days(30),
        })
    }

    async fn update_subscription(
        &self,
        subscription_id: &str,
        plan: PlanId,
    ) -> AppResult<GatewaySubscription> {
        self.record(format!(
            "update_subscription:{}:{}",
            subscription_id,
            plan.as_str()
        ));
        Ok(GatewaySubscription {
            customer_id: self.next_id("cus"),
            subscription_id: subscription_id.to_string(),
            plan_id: plan,
            current_period_end: Utc::now() + Duration::days(30),
        })
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> AppResult<()> {
        self.record(format!("cancel_subscription:{}", subscription_id));
        Ok(())
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> AppResult<PortalSession> {
        self.record(format!("create_portal_session:{}", customer_id));
        Ok(PortalSession {
            url: format!(
                "https://billing.mock/portal/{}?return_url={}",
                customer_id, return_url
            ),
        })
    }

    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> AppResult<PaymentIntent> {
        let intent_id = self.next_id("pi");
        self.record(format!("create_payment_intent:{}", intent_id));
        Ok(PaymentIntent {
            client_secret: format!("{}_secret", intent_id),
            intent_id,
            amount_minor,
            currency: currency.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_gateway_issues_sequential_ids() {
        let gateway = MockPaymentsGateway::new();

        let sub = gateway
            .create_subscription("owner@example.com", PlanId::Growth)
            .await
            .unwrap();
        assert_eq!(sub.customer_id, "cus_1");
        assert_eq!(sub.subscription_id, "sub_2");

        let intent = gateway.create_payment_intent(1300, "USD").await.unwrap();
        assert_eq!(intent.intent_id, "pi_3");
        assert_eq!(intent.amount_minor, 1300);
    }

    #[tokio::test]
    async fn mock_gateway_records_calls() {
        let gateway = MockPaymentsGateway::new();
        gateway
            .create_subscription("owner@example.com", PlanId::Starter)
            .await
            .unwrap();
        gateway.cancel_subscription("sub_2").await.unwrap();

        assert_eq!(
            gateway.calls(),
            vec![
                "create_subscription:starter".to_string(),
                "cancel_subscription:sub_2".to_string(),
            ]
        );
    }
}

use serde::{Deserialize, Serialize};

use vendhub_core::money::PlanLimit;
use vendhub_core::{Plan, PlanId, Subscription};

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionQuery {
    pub company_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub plan: PlanId,
    pub company_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePlanRequest {
    pub plan: PlanId,
    pub company_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CancelSubscriptionRequest {
    pub company_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PortalRequest {
    pub company_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub subscription: Option<Subscription>,
    pub plan: Plan,
}

#[derive(Debug, Serialize)]
pub struct PortalResponse {
    pub url: String,
}

/// One dashboard meter: a count against a plan ceiling with the clamped
/// display percentage.
#[derive(Debug, Serialize)]
pub struct UsageMeter {
    pub used: u64,
    pub limit: PlanLimit,
    pub percent: u8,
}

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub plan: PlanId,
    pub invoices: UsageMeter,
    pub members: UsageMeter,
}

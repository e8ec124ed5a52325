use chrono::{Datelike, TimeZone, Utc};

use vendhub_core::adapters::DatabaseAdapter;
use vendhub_core::money::{usage_percent, PlanLimit};
use vendhub_core::{
    plans, AppContext, AppError, AppRequest, AppResponse, AppResult, CreateSubscription,
    PaymentsGateway as _, RecordAudit, Session, Subscription, SubscriptionStatus,
    UpdateSubscription, UserProfile,
};

use super::types::{
    CancelSubscriptionRequest, ChangePlanRequest, PortalRequest, PortalResponse, SubscribeRequest,
    SubscriptionQuery, SubscriptionResponse, UsageMeter, UsageResponse,
};
use crate::plugins::helpers::{parse_query, require_member, require_session, resolve_company_id};
use crate::plugins::teams::rbac::{role_allows, Action, Resource};

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

async fn require_billing_manager<DB: DatabaseAdapter>(
    company_id: &str,
    user: &UserProfile,
    ctx: &AppContext<DB>,
) -> AppResult<()> {
    let member = require_member(ctx, company_id, &user.id).await?;
    if !role_allows(&member.role, &Resource::Billing, &Action::Manage) {
        return Err(AppError::forbidden(
            "You don't have permission to manage billing",
        ));
    }
    Ok(())
}

/// The plan a company is effectively on: its active subscription's plan, or
/// the configured default when no subscription row exists.
fn effective_plan_id<DB: DatabaseAdapter>(
    subscription: Option<&Subscription>,
    ctx: &AppContext<DB>,
) -> vendhub_core::PlanId {
    subscription
        .filter(|s| s.is_active())
        .map(|s| s.plan_id)
        .unwrap_or(ctx.config.billing.default_plan)
}

/// Start of the current calendar month, the billing period for usage meters.
fn period_start() -> chrono::DateTime<Utc> {
    let today = Utc::now().date_naive();
    let first = today.with_day(1).unwrap_or(today);
    Utc.from_utc_datetime(&first.and_hms_opt(0, 0, 0).unwrap_or_default())
}

pub(crate) async fn get_subscription_core<DB: DatabaseAdapter>(
    query: &SubscriptionQuery,
    user: &UserProfile,
    session: &Session,
    ctx: &AppContext<DB>,
) -> AppResult<SubscriptionResponse> {
    let company_id = resolve_company_id(query.company_id.as_deref(), None, session, ctx).await?;
    require_member(ctx, &company_id, &user.id).await?;

    let subscription = ctx.database.get_company_subscription(&company_id).await?;
    let plan = plans::plan(effective_plan_id(subscription.as_ref(), ctx));

    Ok(SubscriptionResponse { subscription, plan })
}

pub(crate) async fn subscribe_core<DB: DatabaseAdapter>(
    body: &SubscribeRequest,
    user: &UserProfile,
    session: &Session,
    ctx: &AppContext<DB>,
) -> AppResult<Subscription> {
    let company_id = resolve_company_id(body.company_id.as_deref(), None, session, ctx).await?;
    require_billing_manager(&company_id, user, ctx).await?;

    if let Some(existing) = ctx.database.get_company_subscription(&company_id).await? {
        if existing.is_active() {
            return Err(AppError::conflict(
                "Company already has an active subscription",
            ));
        }
    }

    let gateway_sub = ctx
        .gateway
        .create_subscription(&user.email, body.plan)
        .await?;

    let subscription = ctx
        .database
        .create_subscription(CreateSubscription {
            company_id: company_id.clone(),
            plan_id: gateway_sub.plan_id,
            gateway_customer_id: gateway_sub.customer_id,
            gateway_subscription_id: gateway_sub.subscription_id,
            current_period_end: gateway_sub.current_period_end,
        })
        .await?;

    ctx.database
        .record_audit(RecordAudit::new(
            &company_id,
            &user.id,
            "billing.subscribed",
            body.plan.as_str(),
        ))
        .await?;

    Ok(subscription)
}

pub(crate) async fn change_plan_core<DB: DatabaseAdapter>(
    body: &ChangePlanRequest,
    user: &UserProfile,
    session: &Session,
    ctx: &AppContext<DB>,
) -> AppResult<Subscription> {
    let company_id = resolve_company_id(body.company_id.as_deref(), None, session, ctx).await?;
    require_billing_manager(&company_id, user, ctx).await?;

    let subscription = ctx
        .database
        .get_company_subscription(&company_id)
        .await?
        .filter(|s| s.is_active())
        .ok_or_else(|| AppError::not_found("No active subscription"))?;

    let gateway_sub = ctx
        .gateway
        .update_subscription(&subscription.gateway_subscription_id, body.plan)
        .await?;

    let updated = ctx
        .database
        .update_subscription(
            &subscription.id,
            UpdateSubscription {
                plan_id: Some(gateway_sub.plan_id),
                status: None,
                current_period_end: Some(gateway_sub.current_period_end),
            },
        )
        .await?;

    ctx.database
        .record_audit(RecordAudit::new(
            &company_id,
            &user.id,
            "billing.plan_changed",
            body.plan.as_str(),
        ))
        .await?;

    Ok(updated)
}

pub(crate) async fn cancel_subscription_core<DB: DatabaseAdapter>(
    body: &CancelSubscriptionRequest,
    user: &UserProfile,
    session: &Session,
    ctx: &AppContext<DB>,
) -> AppResult<Subscription> {
    let company_id = resolve_company_id(body.company_id.as_deref(), None, session, ctx).await?;
    require_billing_manager(&company_id, user, ctx).await?;

    let subscription = ctx
        .database
        .get_company_subscription(&company_id)
        .await?
        .filter(|s| s.is_active())
        .ok_or_else(|| AppError::not_found("No active subscription"))?;

    ctx.gateway
        .cancel_subscription(&subscription.gateway_subscription_id)
        .await?;

    let updated = ctx
        .database
        .update_subscription(
            &subscription.id,
            UpdateSubscription {
                plan_id: None,
                status: Some(SubscriptionStatus::Canceled),
                current_period_end: None,
            },
        )
        .await?;

    ctx.database
        .record_audit(RecordAudit::new(
            &company_id,
            &user.id,
            "billing.canceled",
            &subscription.gateway_subscription_id,
        ))
        .await?;

    Ok(updated)
}

pub(crate) async fn portal_core<DB: DatabaseAdapter>(
    body: &PortalRequest,
    user: &UserProfile,
    session: &Session,
    ctx: &AppContext<DB>,
) -> AppResult<PortalResponse> {
    let company_id = resolve_company_id(body.company_id.as_deref(), None, session, ctx).await?;
    require_billing_manager(&company_id, user, ctx).await?;

    let subscription = ctx
        .database
        .get_company_subscription(&company_id)
        .await?
        .ok_or_else(|| AppError::not_found("No subscription on record"))?;

    let portal = ctx
        .gateway
        .create_portal_session(
            &subscription.gateway_customer_id,
            &ctx.config.billing.portal_return_url,
        )
        .await?;

    Ok(PortalResponse { url: portal.url })
}

pub(crate) async fn usage_core<DB: DatabaseAdapter>(
    query: &SubscriptionQuery,
    user: &UserProfile,
    session: &Session,
    ctx: &AppContext<DB>,
) -> AppResult<UsageResponse> {
    let company_id = resolve_company_id(query.company_id.as_deref(), None, session, ctx).await?;
    require_member(ctx, &company_id, &user.id).await?;

    let subscription = ctx.database.get_company_subscription(&company_id).await?;
    let plan_id = effective_plan_id(subscription.as_ref(), ctx);
    let plan = plans::plan(plan_id);

    let invoices_used = ctx
        .database
        .count_company_invoices_since(&company_id, period_start())
        .await? as u64;
    let members_used = ctx.database.count_company_members(&company_id).await? as u64;

    Ok(UsageResponse {
        plan: plan_id,
        invoices: meter(invoices_used, plan.invoice_limit),
        members: meter(members_used, plan.member_limit),
    })
}

fn meter(used: u64, limit: PlanLimit) -> UsageMeter {
    UsageMeter {
        used,
        limit,
        percent: usage_percent(used, limit),
    }
}

// ---------------------------------------------------------------------------
// Request handlers
// ---------------------------------------------------------------------------

pub async fn handle_get_subscription<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let query = parse_query::<SubscriptionQuery>(&req.query);
    let response = get_subscription_core(&query, &user, &session, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

pub async fn handle_subscribe<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let body: SubscribeRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let response = subscribe_core(&body, &user, &session, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

pub async fn handle_change_plan<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let body: ChangePlanRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let response = change_plan_core(&body, &user, &session, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

pub async fn handle_cancel_subscription<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let body: CancelSubscriptionRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let response = cancel_subscription_core(&body, &user, &session, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

pub async fn handle_portal<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let body: PortalRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let response = portal_core(&body, &user, &session, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

pub async fn handle_usage<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let query = parse_query::<SubscriptionQuery>(&req.query);
    let response = usage_core(&query, &user, &session, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

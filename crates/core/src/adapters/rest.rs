//! Hosted-database client over its REST interface.
//!
//! The hosted BaaS exposes every table through a PostgREST-style endpoint
//! (`{base}/rest/v1/{table}`) plus RPC functions under `/rest/v1/rpc/`.
//! This adapter is the Rust counterpart of the JavaScript client the
//! reference app calls: each operation is one HTTP round-trip carrying the
//! service key, with `Prefer: return=representation` on writes.
//!
//! Multi-row invoice creation goes through the `create_invoice_with_items`
//! RPC so the hosted database inserts invoice and items in one transaction.
//!
//! The hosted realtime feed is a separate websocket service; like the
//! reference app, this client only surfaces the writes it performed itself
//! on its local [`ChangeFeed`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::{AppError, AppResult, DatabaseError};
use crate::realtime::{ChangeEvent, ChangeFeed, ChangeOp};
use crate::types::{
    AuditLogEntry, Company, CreateCompany, CreateInvitation, CreateInvoice, CreateMembership,
    CreatePayment, CreateProfile, CreateSession, CreateSubscription, Invitation, InvitationStatus,
    Invoice, InvoiceStatus, Membership, Payment, RecordAudit, Session, Subscription,
    SubscriptionStatus, UpdateCompany, UpdateProfile, UpdateSubscription, UserProfile,
};

use super::traits::{
    AuditOps, ChangeFeedOps, CompanyOps, InvitationOps, InvoiceOps, MembershipOps, PaymentOps,
    ProfileOps, SessionOps, SubscriptionOps,
};

/// Connection settings for the hosted database.
#[derive(Debug, Clone)]
pub struct RestClientConfig {
    /// Project base URL, e.g. `"https://abc123.hosted.example"`.
    pub base_url: String,
    /// Service-role key sent as both `apikey` and bearer token.
    pub service_key: String,
}

impl RestClientConfig {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            service_key: service_key.into(),
        }
    }

    /// Read `VENDHUB_DB_URL` / `VENDHUB_DB_SERVICE_KEY` from the environment.
    pub fn from_env() -> AppResult<Self> {
        let base_url = std::env::var("VENDHUB_DB_URL")
            .map_err(|_| AppError::config("VENDHUB_DB_URL is not set"))?;
        let service_key = std::env::var("VENDHUB_DB_SERVICE_KEY")
            .map_err(|_| AppError::config("VENDHUB_DB_SERVICE_KEY is not set"))?;
        Ok(Self::new(base_url, service_key))
    }
}

/// REST-backed database adapter.
pub struct RestDatabaseAdapter {
    http: reqwest::Client,
    config: RestClientConfig,
    feed: ChangeFeed,
}

impl RestDatabaseAdapter {
    pub fn new(config: RestClientConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&config.service_key)
                .map_err(|_| AppError::config("Service key contains invalid characters"))?,
        );
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {}", config.service_key))
                .map_err(|_| AppError::config("Service key contains invalid characters"))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            feed: ChangeFeed::new(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url, table)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.config.base_url, function)
    }

    /// One-shot connectivity probe used by the `doctor` binary.
    pub async fn probe(&self) -> AppResult<()> {
        let url = format!("{}?select=id&limit=1", self.table_url("user_profiles"));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        check_status(&response)?;
        Ok(())
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, filter: &str) -> AppResult<Vec<T>> {
        let url = format!("{}?{}", self.table_url(table), filter);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        check_status(&response)?;
        let rows = response
            .json::<Vec<T>>()
            .await
            .map_err(|e| DatabaseError::Query(format!("Malformed response: {}", e)))?;
        Ok(rows)
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filter: &str,
    ) -> AppResult<Option<T>> {
        let mut rows = self.select::<T>(table, &format!("{}&limit=1", filter)).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    async fn insert<T: DeserializeOwned, B: Serialize>(&self, table: &str, body: &B)
        -> AppResult<T> {
        let response = self
            .http
            .post(self.table_url(table))
            .header("prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        check_status(&response)?;
        let mut rows = response
            .json::<Vec<T>>()
            .await
            .map_err(|e| DatabaseError::Query(format!("Malformed response: {}", e)))?;
        if rows.is_empty() {
            return Err(DatabaseError::Query("Insert returned no rows".to_string()).into());
        }
        Ok(rows.remove(0))
    }

    async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        filter: &str,
        body: &B,
    ) -> AppResult<Vec<T>> {
        let url = format!("{}?{}", self.table_url(table), filter);
        let response = self
            .http
            .patch(&url)
            .header("prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        check_status(&response)?;
        let rows = response
            .json::<Vec<T>>()
            .await
            .map_err(|e| DatabaseError::Query(format!("Malformed response: {}", e)))?;
        Ok(rows)
    }

    async fn patch_one<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        filter: &str,
        body: &B,
        missing: &str,
    ) -> AppResult<T> {
        let mut rows = self.patch::<T, B>(table, filter, body).await?;
        if rows.is_empty() {
            return Err(AppError::not_found(missing));
        }
        Ok(rows.remove(0))
    }

    async fn delete(&self, table: &str, filter: &str) -> AppResult<()> {
        let url = format!("{}?{}", self.table_url(table), filter);
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        check_status(&response)?;
        Ok(())
    }

    async fn count(&self, table: &str, filter: &str) -> AppResult<usize> {
        // The id-only projection keeps the payload small; the hosted API has
        // no bare COUNT endpoint without an RPC.
        #[derive(serde::Deserialize)]
        struct IdRow {
            #[allow(dead_code)]
            id: String,
        }
        let rows = self
            .select::<IdRow>(table, &format!("select=id&{}", filter))
            .await?;
        Ok(rows.len())
    }

    fn emit(&self, table: &'static str, op: ChangeOp, row_id: &str) {
        self.feed.emit(ChangeEvent::new(table, op, row_id));
    }
}

fn check_status(response: &reqwest::Response) -> AppResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let err = match status.as_u16() {
        409 => DatabaseError::Constraint(format!("Constraint violation ({})", status)),
        _ => DatabaseError::Query(format!("Request failed with status {}", status)),
    };
    Err(err.into())
}

fn encode(value: &str) -> String {
    // Filter values land in a query string; percent-encode the separators.
    value
        .replace('%', "%25")
        .replace('&', "%26")
        .replace('#', "%23")
        .replace('+', "%2B")
}

impl ChangeFeedOps for RestDatabaseAdapter {
    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.feed.subscribe()
    }
}

#[async_trait]
impl ProfileOps for RestDatabaseAdapter {
    async fn create_profile(&self, create: CreateProfile) -> AppResult<UserProfile> {
        let id = create.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
        let body = serde_json::json!({
            "id": id,
            "email": create.email,
            "name": create.name,
            "avatar_url": create.avatar_url,
        });
        let profile: UserProfile = self.insert("user_profiles", &body).await?;
        self.emit("user_profiles", ChangeOp::Insert, &profile.id);
        Ok(profile)
    }

    async fn get_profile_by_id(&self, id: &str) -> AppResult<Option<UserProfile>> {
        self.select_one("user_profiles", &format!("select=*&id=eq.{}", encode(id)))
            .await
    }

    async fn get_profile_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        self.select_one(
            "user_profiles",
            &format!("select=*&email=eq.{}", encode(email)),
        )
        .await
    }

    async fn update_profile(&self, id: &str, update: UpdateProfile) -> AppResult<UserProfile> {
        let profile = self
            .patch_one(
                "user_profiles",
                &format!("id=eq.{}", encode(id)),
                &update,
                "Profile not found",
            )
            .await?;
        self.emit("user_profiles", ChangeOp::Update, id);
        Ok(profile)
    }

    async fn delete_profile(&self, id: &str) -> AppResult<()> {
        self.delete("user_profiles", &format!("id=eq.{}", encode(id)))
            .await?;
        self.emit("user_profiles", ChangeOp::Delete, id);
        Ok(())
    }
}

#[async_trait]
impl SessionOps for RestDatabaseAdapter {
    async fn create_session(&self, create: CreateSession) -> AppResult<Session> {
        let body = serde_json::json!({
            "id": Uuid::new_v4().to_string(),
            "token": format!("sess_{}", Uuid::new_v4().simple()),
            "user_id": create.user_id,
            "expires_at": create.expires_at,
            "ip_address": create.ip_address,
            "user_agent": create.user_agent,
            "active_company_id": create.active_company_id,
        });
        self.insert("sessions", &body).await
    }

    async fn get_session(&self, token: &str) -> AppResult<Option<Session>> {
        self.select_one("sessions", &format!("select=*&token=eq.{}", encode(token)))
            .await
    }

    async fn get_user_sessions(&self, user_id: &str) -> AppResult<Vec<Session>> {
        self.select(
            "sessions",
            &format!("select=*&user_id=eq.{}", encode(user_id)),
        )
        .await
    }

    async fn update_session_expiry(&self, token: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        let body = serde_json::json!({ "expires_at": expires_at });
        self.patch::<Session, _>("sessions", &format!("token=eq.{}", encode(token)), &body)
            .await?;
        Ok(())
    }

    async fn delete_session(&self, token: &str) -> AppResult<()> {
        self.delete("sessions", &format!("token=eq.{}", encode(token)))
            .await
    }

    async fn delete_user_sessions(&self, user_id: &str) -> AppResult<()> {
        self.delete("sessions", &format!("user_id=eq.{}", encode(user_id)))
            .await
    }

    async fn delete_expired_sessions(&self) -> AppResult<usize> {
        let now = Utc::now().to_rfc3339();
        let expired = self
            .count("sessions", &format!("expires_at=lt.{}", encode(&now)))
            .await?;
        self.delete("sessions", &format!("expires_at=lt.{}", encode(&now)))
            .await?;
        Ok(expired)
    }

    async fn update_session_active_company(
        &self,
        token: &str,
        company_id: Option<&str>,
    ) -> AppResult<Session> {
        let body = serde_json::json!({ "active_company_id": company_id });
        self.patch_one(
            "sessions",
            &format!("token=eq.{}", encode(token)),
            &body,
            "Session not found",
        )
        .await
    }
}

#[async_trait]
impl CompanyOps for RestDatabaseAdapter {
    async fn create_company(&self, create: CreateCompany) -> AppResult<Company> {
        let id = create.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
        let body = serde_json::json!({
            "id": id,
            "name": create.name,
            "slug": create.slug,
            "logo": create.logo,
        });
        let company: Company = self.insert("companies", &body).await?;
        self.emit("companies", ChangeOp::Insert, &company.id);
        Ok(company)
    }

    async fn get_company_by_id(&self, id: &str) -> AppResult<Option<Company>> {
        self.select_one("companies", &format!("select=*&id=eq.{}", encode(id)))
            .await
    }

    async fn get_company_by_slug(&self, slug: &str) -> AppResult<Option<Company>> {
        self.select_one("companies", &format!("select=*&slug=eq.{}", encode(slug)))
            .await
    }

    async fn update_company(&self, id: &str, update: UpdateCompany) -> AppResult<Company> {
        let company = self
            .patch_one(
                "companies",
                &format!("id=eq.{}", encode(id)),
                &update,
                "Company not found",
            )
            .await?;
        self.emit("companies", ChangeOp::Update, id);
        Ok(company)
    }

    async fn delete_company(&self, id: &str) -> AppResult<()> {
        // Dependent rows cascade via the hosted schema's foreign keys.
        self.delete("companies", &format!("id=eq.{}", encode(id)))
            .await?;
        self.emit("companies", ChangeOp::Delete, id);
        Ok(())
    }

    async fn list_user_companies(&self, user_id: &str) -> AppResult<Vec<Company>> {
        let memberships: Vec<Membership> = self
            .select(
                "company_memberships",
                &format!("select=*&user_id=eq.{}", encode(user_id)),
            )
            .await?;

        let mut companies = Vec::with_capacity(memberships.len());
        for membership in &memberships {
            if let Some(company) = self.get_company_by_id(&membership.company_id).await? {
                companies.push(company);
            }
        }
        companies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(companies)
    }
}

#[async_trait]
impl MembershipOps for RestDatabaseAdapter {
    async fn create_membership(&self, create: CreateMembership) -> AppResult<Membership> {
        let body = serde_json::json!({
            "id": Uuid::new_v4().to_string(),
            "company_id": create.company_id,
            "user_id": create.user_id,
            "role": create.role,
        });
        let membership: Membership = self.insert("company_memberships", &body).await?;
        self.emit("company_memberships", ChangeOp::Insert, &membership.id);
        Ok(membership)
    }

    async fn get_membership(
        &self,
        company_id: &str,
        user_id: &str,
    ) -> AppResult<Option<Membership>> {
        self.select_one(
            "company_memberships",
            &format!(
                "select=*&company_id=eq.{}&user_id=eq.{}",
                encode(company_id),
                encode(user_id)
            ),
        )
        .await
    }

    async fn get_membership_by_id(&self, id: &str) -> AppResult<Option<Membership>> {
        self.select_one(
            "company_memberships",
            &format!("select=*&id=eq.{}", encode(id)),
        )
        .await
    }

    async fn update_membership_role(&self, membership_id: &str, role: &str)
        -> AppResult<Membership> {
        let body = serde_json::json!({ "role": role });
        let membership = self
            .patch_one(
                "company_memberships",
                &format!("id=eq.{}", encode(membership_id)),
                &body,
                "Membership not found",
            )
            .await?;
        self.emit("company_memberships", ChangeOp::Update, membership_id);
        Ok(membership)
    }

    async fn delete_membership(&self, membership_id: &str) -> AppResult<()> {
        self.delete(
            "company_memberships",
            &format!("id=eq.{}", encode(membership_id)),
        )
        .await?;
        self.emit("company_memberships", ChangeOp::Delete, membership_id);
        Ok(())
    }

    async fn list_company_members(&self, company_id: &str) -> AppResult<Vec<Membership>> {
        self.select(
            "company_memberships",
            &format!(
                "select=*&company_id=eq.{}&order=created_at.asc",
                encode(company_id)
            ),
        )
        .await
    }

    async fn count_company_members(&self, company_id: &str) -> AppResult<usize> {
        self.count(
            "company_memberships",
            &format!("company_id=eq.{}", encode(company_id)),
        )
        .await
    }
}

#[async_trait]
impl InvitationOps for RestDatabaseAdapter {
    async fn create_invitation(&self, create: CreateInvitation) -> AppResult<Invitation> {
        let body = serde_json::json!({
            "id": Uuid::new_v4().to_string(),
            "company_id": create.company_id,
            "email": create.email,
            "role": create.role,
            "status": "pending",
            "inviter_id": create.inviter_id,
            "expires_at": create.expires_at,
        });
        let invitation: Invitation = self.insert("invitations", &body).await?;
        self.emit("invitations", ChangeOp::Insert, &invitation.id);
        Ok(invitation)
    }

    async fn get_invitation_by_id(&self, id: &str) -> AppResult<Option<Invitation>> {
        self.select_one("invitations", &format!("select=*&id=eq.{}", encode(id)))
            .await
    }

    async fn get_pending_invitation(
        &self,
        company_id: &str,
        email: &str,
    ) -> AppResult<Option<Invitation>> {
        self.select_one(
            "invitations",
            &format!(
                "select=*&company_id=eq.{}&email=ilike.{}&status=eq.pending",
                encode(company_id),
                encode(email)
            ),
        )
        .await
    }

    async fn update_invitation_status(
        &self,
        id: &str,
        status: InvitationStatus,
    ) -> AppResult<Invitation> {
        let body = serde_json::json!({ "status": status });
        let invitation = self
            .patch_one(
                "invitations",
                &format!("id=eq.{}", encode(id)),
                &body,
                "Invitation not found",
            )
            .await?;
        self.emit("invitations", ChangeOp::Update, id);
        Ok(invitation)
    }

    async fn list_company_invitations(&self, company_id: &str) -> AppResult<Vec<Invitation>> {
        self.select(
            "invitations",
            &format!(
                "select=*&company_id=eq.{}&order=created_at.asc",
                encode(company_id)
            ),
        )
        .await
    }

    async fn list_invitations_for_email(&self, email: &str) -> AppResult<Vec<Invitation>> {
        self.select(
            "invitations",
            &format!("select=*&email=ilike.{}&order=created_at.asc", encode(email)),
        )
        .await
    }
}

#[async_trait]
impl InvoiceOps for RestDatabaseAdapter {
    async fn create_invoice(&self, create: CreateInvoice) -> AppResult<Invoice> {
        // One transaction on the hosted side: the RPC inserts the invoice
        // row and its items together and returns the embedded row.
        let id = create.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
        let body = serde_json::json!({
            "invoice": {
                "id": id,
                "company_id": create.company_id,
                "customer_email": create.customer_email,
                "currency": create.currency,
                "due_date": create.due_date,
                "status": "draft",
            },
            "items": create.items,
        });

        let response = self
            .http
            .post(self.rpc_url("create_invoice_with_items"))
            .json(&body)
            .send()
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        check_status(&response)?;
        let invoice = response
            .json::<Invoice>()
            .await
            .map_err(|e| DatabaseError::Query(format!("Malformed response: {}", e)))?;

        self.emit("invoices", ChangeOp::Insert, &invoice.id);
        Ok(invoice)
    }

    async fn get_invoice_by_id(&self, id: &str) -> AppResult<Option<Invoice>> {
        self.select_one(
            "invoices",
            &format!("select=*,items:invoice_items(*)&id=eq.{}", encode(id)),
        )
        .await
    }

    async fn list_company_invoices(&self, company_id: &str) -> AppResult<Vec<Invoice>> {
        self.select(
            "invoices",
            &format!(
                "select=*,items:invoice_items(*)&company_id=eq.{}&order=created_at.desc",
                encode(company_id)
            ),
        )
        .await
    }

    async fn update_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
        sent_at: Option<DateTime<Utc>>,
    ) -> AppResult<Invoice> {
        let mut body = serde_json::json!({ "status": status });
        if let Some(sent_at) = sent_at {
            body["sent_at"] = serde_json::json!(sent_at);
        }
        // Re-read with embedded items: PATCH representation has no embeds.
        self.patch::<serde_json::Value, _>("invoices", &format!("id=eq.{}", encode(id)), &body)
            .await?;
        let invoice = self
            .get_invoice_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Invoice not found"))?;
        self.emit("invoices", ChangeOp::Update, id);
        Ok(invoice)
    }

    async fn delete_invoice(&self, id: &str) -> AppResult<()> {
        self.delete("invoices", &format!("id=eq.{}", encode(id)))
            .await?;
        self.emit("invoices", ChangeOp::Delete, id);
        Ok(())
    }

    async fn count_company_invoices_since(
        &self,
        company_id: &str,
        since: DateTime<Utc>,
    ) -> AppResult<usize> {
        self.count(
            "invoices",
            &format!(
                "company_id=eq.{}&created_at=gte.{}",
                encode(company_id),
                encode(&since.to_rfc3339())
            ),
        )
        .await
    }
}

#[async_trait]
impl PaymentOps for RestDatabaseAdapter {
    async fn create_payment(&self, create: CreatePayment) -> AppResult<Payment> {
        let body = serde_json::json!({
            "id": Uuid::new_v4().to_string(),
            "invoice_id": create.invoice_id,
            "company_id": create.company_id,
            "amount_minor": create.amount_minor,
            "currency": create.currency,
            "intent_id": create.intent_id,
        });
        let payment: Payment = self.insert("payments", &body).await?;
        self.emit("payments", ChangeOp::Insert, &payment.id);
        Ok(payment)
    }

    async fn list_invoice_payments(&self, invoice_id: &str) -> AppResult<Vec<Payment>> {
        self.select(
            "payments",
            &format!(
                "select=*&invoice_id=eq.{}&order=created_at.asc",
                encode(invoice_id)
            ),
        )
        .await
    }

    async fn list_company_payments(&self, company_id: &str) -> AppResult<Vec<Payment>> {
        self.select(
            "payments",
            &format!(
                "select=*&company_id=eq.{}&order=created_at.asc",
                encode(company_id)
            ),
        )
        .await
    }
}

#[async_trait]
impl SubscriptionOps for RestDatabaseAdapter {
    async fn create_subscription(&self, create: CreateSubscription) -> AppResult<Subscription> {
        let body = serde_json::json!({
            "id": Uuid::new_v4().to_string(),
            "company_id": create.company_id,
            "plan_id": create.plan_id,
            "gateway_customer_id": create.gateway_customer_id,
            "gateway_subscription_id": create.gateway_subscription_id,
            "status": "active",
            "current_period_end": create.current_period_end,
        });
        let subscription: Subscription = self.insert("subscriptions", &body).await?;
        self.emit("subscriptions", ChangeOp::Insert, &subscription.id);
        Ok(subscription)
    }

    async fn get_company_subscription(&self, company_id: &str) -> AppResult<Option<Subscription>> {
        let active = self
            .select_one(
                "subscriptions",
                &format!(
                    "select=*&company_id=eq.{}&status=eq.active",
                    encode(company_id)
                ),
            )
            .await?;
        if active.is_some() {
            return Ok(active);
        }
        self.select_one(
            "subscriptions",
            &format!(
                "select=*&company_id=eq.{}&order=created_at.desc",
                encode(company_id)
            ),
        )
        .await
    }

    async fn update_subscription(
        &self,
        id: &str,
        update: UpdateSubscription,
    ) -> AppResult<Subscription> {
        let mut body = serde_json::Map::new();
        if let Some(plan_id) = update.plan_id {
            body.insert("plan_id".to_string(), serde_json::json!(plan_id));
        }
        if let Some(status) = update.status {
            let status_value = match status {
                SubscriptionStatus::Active => "active",
                SubscriptionStatus::Canceled => "canceled",
            };
            body.insert("status".to_string(), serde_json::json!(status_value));
        }
        if let Some(period_end) = update.current_period_end {
            body.insert(
                "current_period_end".to_string(),
                serde_json::json!(period_end),
            );
        }

        let subscription = self
            .patch_one(
                "subscriptions",
                &format!("id=eq.{}", encode(id)),
                &serde_json::Value::Object(body),
                "Subscription not found",
            )
            .await?;
        self.emit("subscriptions", ChangeOp::Update, id);
        Ok(subscription)
    }
}

#[async_trait]
impl AuditOps for RestDatabaseAdapter {
    async fn record_audit(&self, entry: RecordAudit) -> AppResult<AuditLogEntry> {
        let body = serde_json::json!({
            "id": Uuid::new_v4().to_string(),
            "company_id": entry.company_id,
            "actor_id": entry.actor_id,
            "action": entry.action,
            "subject": entry.subject,
        });
        let record: AuditLogEntry = self.insert("audit_logs", &body).await?;
        self.emit("audit_logs", ChangeOp::Insert, &record.id);
        Ok(record)
    }

    async fn list_company_audit(&self, company_id: &str) -> AppResult<Vec<AuditLogEntry>> {
        self.select(
            "audit_logs",
            &format!(
                "select=*&company_id=eq.{}&order=created_at.desc",
                encode(company_id)
            ),
        )
        .await
    }
}

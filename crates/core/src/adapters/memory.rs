use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
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

/// In-memory database adapter for testing and development.
///
/// Stores rows in `Arc<Mutex<HashMap>>` maps with secondary indexes for
/// email, slug, and token lookups, and emits a [`ChangeEvent`] for every
/// write (except session churn, which the hosted feed does not surface
/// either). Deleting a company cascades to its dependent rows, mirroring
/// the hosted schema's cascade rules.
#[derive(Clone)]
pub struct MemoryDatabaseAdapter {
    profiles: Arc<Mutex<HashMap<String, UserProfile>>>,
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    companies: Arc<Mutex<HashMap<String, Company>>>,
    memberships: Arc<Mutex<HashMap<String, Membership>>>,
    invitations: Arc<Mutex<HashMap<String, Invitation>>>,
    invoices: Arc<Mutex<HashMap<String, Invoice>>>,
    payments: Arc<Mutex<HashMap<String, Payment>>>,
    subscriptions: Arc<Mutex<HashMap<String, Subscription>>>,
    audit_log: Arc<Mutex<Vec<AuditLogEntry>>>,
    email_index: Arc<Mutex<HashMap<String, String>>>,
    slug_index: Arc<Mutex<HashMap<String, String>>>,
    feed: ChangeFeed,
}

impl MemoryDatabaseAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn emit(&self, table: &'static str, op: ChangeOp, row_id: &str) {
        self.feed.emit(ChangeEvent::new(table, op, row_id));
    }
}

impl Default for MemoryDatabaseAdapter {
    fn default() -> Self {
        Self {
            profiles: Arc::new(Mutex::new(HashMap::new())),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            companies: Arc::new(Mutex::new(HashMap::new())),
            memberships: Arc::new(Mutex::new(HashMap::new())),
            invitations: Arc::new(Mutex::new(HashMap::new())),
            invoices: Arc::new(Mutex::new(HashMap::new())),
            payments: Arc::new(Mutex::new(HashMap::new())),
            subscriptions: Arc::new(Mutex::new(HashMap::new())),
            audit_log: Arc::new(Mutex::new(Vec::new())),
            email_index: Arc::new(Mutex::new(HashMap::new())),
            slug_index: Arc::new(Mutex::new(HashMap::new())),
            feed: ChangeFeed::new(),
        }
    }
}

impl ChangeFeedOps for MemoryDatabaseAdapter {
    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.feed.subscribe()
    }
}

#[async_trait]
impl ProfileOps for MemoryDatabaseAdapter {
    async fn create_profile(&self, create: CreateProfile) -> AppResult<UserProfile> {
        let mut profiles = self.profiles.lock().unwrap();
        let mut email_index = self.email_index.lock().unwrap();

        if email_index.contains_key(&create.email) {
            return Err(AppError::conflict("A profile with this email already exists"));
        }

        let id = create.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
        let now = Utc::now();
        let profile = UserProfile {
            id: id.clone(),
            email: create.email.clone(),
            name: create.name,
            avatar_url: create.avatar_url,
            created_at: now,
            updated_at: now,
        };

        email_index.insert(create.email, id.clone());
        profiles.insert(id.clone(), profile.clone());
        drop(profiles);
        drop(email_index);

        self.emit("user_profiles", ChangeOp::Insert, &id);
        Ok(profile)
    }

    async fn get_profile_by_id(&self, id: &str) -> AppResult<Option<UserProfile>> {
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.get(id).cloned())
    }

    async fn get_profile_by_email(&self, email: &str) -> AppResult<Option<UserProfile>> {
        let email_index = self.email_index.lock().unwrap();
        let profiles = self.profiles.lock().unwrap();

        if let Some(id) = email_index.get(email) {
            Ok(profiles.get(id).cloned())
        } else {
            Ok(None)
        }
    }

    async fn update_profile(&self, id: &str, update: UpdateProfile) -> AppResult<UserProfile> {
        let mut profiles = self.profiles.lock().unwrap();
        let mut email_index = self.email_index.lock().unwrap();

        let profile = profiles.get_mut(id).ok_or(AppError::UserNotFound)?;

        if let Some(new_email) = &update.email {
            if let Some(existing) = email_index.get(new_email) {
                if existing != id {
                    return Err(AppError::conflict(
                        "A profile with this email already exists",
                    ));
                }
            }
            email_index.remove(&profile.email);
            email_index.insert(new_email.clone(), id.to_string());
            profile.email = new_email.clone();
        }
        if let Some(name) = &update.name {
            profile.name = Some(name.clone());
        }
        if let Some(avatar_url) = &update.avatar_url {
            profile.avatar_url = Some(avatar_url.clone());
        }
        profile.updated_at = Utc::now();

        let updated = profile.clone();
        drop(profiles);
        drop(email_index);

        self.emit("user_profiles", ChangeOp::Update, id);
        Ok(updated)
    }

    async fn delete_profile(&self, id: &str) -> AppResult<()> {
        let mut profiles = self.profiles.lock().unwrap();
        let mut email_index = self.email_index.lock().unwrap();

        if let Some(profile) = profiles.remove(id) {
            email_index.remove(&profile.email);
        }
        drop(profiles);
        drop(email_index);

        self.emit("user_profiles", ChangeOp::Delete, id);
        Ok(())
    }
}

// Session churn is not broadcast on the change feed.
#[async_trait]
impl SessionOps for MemoryDatabaseAdapter {
    async fn create_session(&self, create: CreateSession) -> AppResult<Session> {
        let mut sessions = self.sessions.lock().unwrap();

        let now = Utc::now();
        let token = format!("sess_{}", Uuid::new_v4().simple());
        let session = Session {
            id: Uuid::new_v4().to_string(),
            token: token.clone(),
            user_id: create.user_id,
            expires_at: create.expires_at,
            created_at: now,
            updated_at: now,
            ip_address: create.ip_address,
            user_agent: create.user_agent,
            active_company_id: create.active_company_id,
        };

        sessions.insert(token, session.clone());
        Ok(session)
    }

    async fn get_session(&self, token: &str) -> AppResult<Option<Session>> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions.get(token).cloned())
    }

    async fn get_user_sessions(&self, user_id: &str) -> AppResult<Vec<Session>> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_session_expiry(&self, token: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(session) = sessions.get_mut(token) {
            session.expires_at = expires_at;
            session.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_session(&self, token: &str) -> AppResult<()> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.remove(token);
        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: &str) -> AppResult<()> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.retain(|_, s| s.user_id != user_id);
        Ok(())
    }

    async fn delete_expired_sessions(&self) -> AppResult<usize> {
        let mut sessions = self.sessions.lock().unwrap();
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        Ok(before - sessions.len())
    }

    async fn update_session_active_company(
        &self,
        token: &str,
        company_id: Option<&str>,
    ) -> AppResult<Session> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(token)
            .ok_or(AppError::SessionNotFound)?;
        session.active_company_id = company_id.map(|s| s.to_string());
        session.updated_at = Utc::now();
        Ok(session.clone())
    }
}

#[async_trait]
impl CompanyOps for MemoryDatabaseAdapter {
    async fn create_company(&self, create: CreateCompany) -> AppResult<Company> {
        let mut companies = self.companies.lock().unwrap();
        let mut slug_index = self.slug_index.lock().unwrap();

        if slug_index.contains_key(&create.slug) {
            return Err(AppError::conflict("Slug is already taken"));
        }

        let id = create.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
        let now = Utc::now();
        let company = Company {
            id: id.clone(),
            name: create.name,
            slug: create.slug.clone(),
            logo: create.logo,
            created_at: now,
            updated_at: now,
        };

        slug_index.insert(create.slug, id.clone());
        companies.insert(id.clone(), company.clone());
        drop(companies);
        drop(slug_index);

        self.emit("companies", ChangeOp::Insert, &id);
        Ok(company)
    }

    async fn get_company_by_id(&self, id: &str) -> AppResult<Option<Company>> {
        let companies = self.companies.lock().unwrap();
        Ok(companies.get(id).cloned())
    }

    async fn get_company_by_slug(&self, slug: &str) -> AppResult<Option<Company>> {
        let slug_index = self.slug_index.lock().unwrap();
        let companies = self.companies.lock().unwrap();

        if let Some(id) = slug_index.get(slug) {
            Ok(companies.get(id).cloned())
        } else {
            Ok(None)
        }
    }

    async fn update_company(&self, id: &str, update: UpdateCompany) -> AppResult<Company> {
        let mut companies = self.companies.lock().unwrap();
        let mut slug_index = self.slug_index.lock().unwrap();

        let company = companies
            .get_mut(id)
            .ok_or_else(|| AppError::not_found("Company not found"))?;

        if let Some(new_slug) = &update.slug {
            if let Some(existing) = slug_index.get(new_slug) {
                if existing != id {
                    return Err(AppError::conflict("Slug is already taken"));
                }
            }
            slug_index.remove(&company.slug);
            slug_index.insert(new_slug.clone(), id.to_string());
            company.slug = new_slug.clone();
        }
        if let Some(name) = &update.name {
            company.name = name.clone();
        }
        if let Some(logo) = &update.logo {
            company.logo = Some(logo.clone());
        }
        company.updated_at = Utc::now();

        let updated = company.clone();
        drop(companies);
        drop(slug_index);

        self.emit("companies", ChangeOp::Update, id);
        Ok(updated)
    }

    async fn delete_company(&self, id: &str) -> AppResult<()> {
        {
            let mut companies = self.companies.lock().unwrap();
            let mut slug_index = self.slug_index.lock().unwrap();
            if let Some(company) = companies.remove(id) {
                slug_index.remove(&company.slug);
            }
        }

        // Cascade, as the hosted schema's foreign keys would.
        self.memberships
            .lock()
            .unwrap()
            .retain(|_, m| m.company_id != id);
        self.invitations
            .lock()
            .unwrap()
            .retain(|_, i| i.company_id != id);
        self.invoices
            .lock()
            .unwrap()
            .retain(|_, inv| inv.company_id != id);
        self.payments
            .lock()
            .unwrap()
            .retain(|_, p| p.company_id != id);
        self.subscriptions
            .lock()
            .unwrap()
            .retain(|_, s| s.company_id != id);

        self.emit("companies", ChangeOp::Delete, id);
        Ok(())
    }

    async fn list_user_companies(&self, user_id: &str) -> AppResult<Vec<Company>> {
        let memberships = self.memberships.lock().unwrap();
        let companies = self.companies.lock().unwrap();

        let mut result: Vec<Company> = memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| companies.get(&m.company_id).cloned())
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }
}

#[async_trait]
impl MembershipOps for MemoryDatabaseAdapter {
    async fn create_membership(&self, create: CreateMembership) -> AppResult<Membership> {
        let mut memberships = self.memberships.lock().unwrap();

        if memberships
            .values()
            .any(|m| m.company_id == create.company_id && m.user_id == create.user_id)
        {
            return Err(AppError::conflict("Already a member of this company"));
        }

        let id = Uuid::new_v4().to_string();
        let membership = Membership {
            id: id.clone(),
            company_id: create.company_id,
            user_id: create.user_id,
            role: create.role,
            created_at: Utc::now(),
        };

        memberships.insert(id.clone(), membership.clone());
        drop(memberships);

        self.emit("company_memberships", ChangeOp::Insert, &id);
        Ok(membership)
    }

    async fn get_membership(
        &self,
        company_id: &str,
        user_id: &str,
    ) -> AppResult<Option<Membership>> {
        let memberships = self.memberships.lock().unwrap();
        Ok(memberships
            .values()
            .find(|m| m.company_id == company_id && m.user_id == user_id)
            .cloned())
    }

    async fn get_membership_by_id(&self, id: &str) -> AppResult<Option<Membership>> {
        let memberships = self.memberships.lock().unwrap();
        Ok(memberships.get(id).cloned())
    }

    async fn update_membership_role(&self, membership_id: &str, role: &str)
        -> AppResult<Membership> {
        let mut memberships = self.memberships.lock().unwrap();
        let membership = memberships
            .get_mut(membership_id)
            .ok_or_else(|| AppError::not_found("Membership not found"))?;
        membership.role = role.to_string();
        let updated = membership.clone();
        drop(memberships);

        self.emit("company_memberships", ChangeOp::Update, membership_id);
        Ok(updated)
    }

    async fn delete_membership(&self, membership_id: &str) -> AppResult<()> {
        let mut memberships = self.memberships.lock().unwrap();
        memberships.remove(membership_id);
        drop(memberships);

        self.emit("company_memberships", ChangeOp::Delete, membership_id);
        Ok(())
    }

    async fn list_company_members(&self, company_id: &str) -> AppResult<Vec<Membership>> {
        let memberships = self.memberships.lock().unwrap();
        let mut result: Vec<Membership> = memberships
            .values()
            .filter(|m| m.company_id == company_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    async fn count_company_members(&self, company_id: &str) -> AppResult<usize> {
        let memberships = self.memberships.lock().unwrap();
        Ok(memberships
            .values()
            .filter(|m| m.company_id == company_id)
            .count())
    }
}

#[async_trait]
impl InvitationOps for MemoryDatabaseAdapter {
    async fn create_invitation(&self, create: CreateInvitation) -> AppResult<Invitation> {
        let mut invitations = self.invitations.lock().unwrap();

        let id = Uuid::new_v4().to_string();
        let invitation = Invitation {
            id: id.clone(),
            company_id: create.company_id,
            email: create.email,
            role: create.role,
            status: InvitationStatus::Pending,
            inviter_id: create.inviter_id,
            expires_at: create.expires_at,
            created_at: Utc::now(),
        };

        invitations.insert(id.clone(), invitation.clone());
        drop(invitations);

        self.emit("invitations", ChangeOp::Insert, &id);
        Ok(invitation)
    }

    async fn get_invitation_by_id(&self, id: &str) -> AppResult<Option<Invitation>> {
        let invitations = self.invitations.lock().unwrap();
        Ok(invitations.get(id).cloned())
    }

    async fn get_pending_invitation(
        &self,
        company_id: &str,
        email: &str,
    ) -> AppResult<Option<Invitation>> {
        let invitations = self.invitations.lock().unwrap();
        Ok(invitations
            .values()
            .find(|i| {
                i.company_id == company_id
                    && i.email.eq_ignore_ascii_case(email)
                    && i.status == InvitationStatus::Pending
            })
            .cloned())
    }

    async fn update_invitation_status(
        &self,
        id: &str,
        status: InvitationStatus,
    ) -> AppResult<Invitation> {
        let mut invitations = self.invitations.lock().unwrap();
        let invitation = invitations
            .get_mut(id)
            .ok_or_else(|| AppError::not_found("Invitation not found"))?;
        invitation.status = status;
        let updated = invitation.clone();
        drop(invitations);

        self.emit("invitations", ChangeOp::Update, id);
        Ok(updated)
    }

    async fn list_company_invitations(&self, company_id: &str) -> AppResult<Vec<Invitation>> {
        let invitations = self.invitations.lock().unwrap();
        let mut result: Vec<Invitation> = invitations
            .values()
            .filter(|i| i.company_id == company_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    async fn list_invitations_for_email(&self, email: &str) -> AppResult<Vec<Invitation>> {
        let invitations = self.invitations.lock().unwrap();
        let mut result: Vec<Invitation> = invitations
            .values()
            .filter(|i| i.email.eq_ignore_ascii_case(email))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }
}

#[async_trait]
impl InvoiceOps for MemoryDatabaseAdapter {
    async fn create_invoice(&self, create: CreateInvoice) -> AppResult<Invoice> {
        let mut invoices = self.invoices.lock().unwrap();

        let id = create.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
        let now = Utc::now();
        let invoice = Invoice {
            id: id.clone(),
            company_id: create.company_id,
            customer_email: create.customer_email,
            currency: create.currency,
            due_date: create.due_date,
            status: InvoiceStatus::Draft,
            items: create.items,
            sent_at: None,
            created_at: now,
            updated_at: now,
        };

        invoices.insert(id.clone(), invoice.clone());
        drop(invoices);

        self.emit("invoices", ChangeOp::Insert, &id);
        Ok(invoice)
    }

    async fn get_invoice_by_id(&self, id: &str) -> AppResult<Option<Invoice>> {
        let invoices = self.invoices.lock().unwrap();
        Ok(invoices.get(id).cloned())
    }

    async fn list_company_invoices(&self, company_id: &str) -> AppResult<Vec<Invoice>> {
        let invoices = self.invoices.lock().unwrap();
        let mut result: Vec<Invoice> = invoices
            .values()
            .filter(|i| i.company_id == company_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn update_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
        sent_at: Option<DateTime<Utc>>,
    ) -> AppResult<Invoice> {
        let mut invoices = self.invoices.lock().unwrap();
        let invoice = invoices
            .get_mut(id)
            .ok_or_else(|| AppError::not_found("Invoice not found"))?;
        invoice.status = status;
        if sent_at.is_some() {
            invoice.sent_at = sent_at;
        }
        invoice.updated_at = Utc::now();
        let updated = invoice.clone();
        drop(invoices);

        self.emit("invoices", ChangeOp::Update, id);
        Ok(updated)
    }

    async fn delete_invoice(&self, id: &str) -> AppResult<()> {
        let mut invoices = self.invoices.lock().unwrap();
        invoices.remove(id);
        drop(invoices);

        self.payments
            .lock()
            .unwrap()
            .retain(|_, p| p.invoice_id != id);

        self.emit("invoices", ChangeOp::Delete, id);
        Ok(())
    }

    async fn count_company_invoices_since(
        &self,
        company_id: &str,
        since: DateTime<Utc>,
    ) -> AppResult<usize> {
        let invoices = self.invoices.lock().unwrap();
        Ok(invoices
            .values()
            .filter(|i| i.company_id == company_id && i.created_at >= since)
            .count())
    }
}

#[async_trait]
impl PaymentOps for MemoryDatabaseAdapter {
    async fn create_payment(&self, create: CreatePayment) -> AppResult<Payment> {
        let mut payments = self.payments.lock().unwrap();

        let id = Uuid::new_v4().to_string();
        let payment = Payment {
            id: id.clone(),
            invoice_id: create.invoice_id,
            company_id: create.company_id,
            amount_minor: create.amount_minor,
            currency: create.currency,
            intent_id: create.intent_id,
            created_at: Utc::now(),
        };

        payments.insert(id.clone(), payment.clone());
        drop(payments);

        self.emit("payments", ChangeOp::Insert, &id);
        Ok(payment)
    }

    async fn list_invoice_payments(&self, invoice_id: &str) -> AppResult<Vec<Payment>> {
        let payments = self.payments.lock().unwrap();
        let mut result: Vec<Payment> = payments
            .values()
            .filter(|p| p.invoice_id == invoice_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    async fn list_company_payments(&self, company_id: &str) -> AppResult<Vec<Payment>> {
        let payments = self.payments.lock().unwrap();
        let mut result: Vec<Payment> = payments
            .values()
            .filter(|p| p.company_id == company_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }
}

#[async_trait]
impl SubscriptionOps for MemoryDatabaseAdapter {
    async fn create_subscription(&self, create: CreateSubscription) -> AppResult<Subscription> {
        let mut subscriptions = self.subscriptions.lock().unwrap();

        if subscriptions
            .values()
            .any(|s| s.company_id == create.company_id && s.status == SubscriptionStatus::Active)
        {
            return Err(AppError::conflict(
                "Company already has an active subscription",
            ));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let subscription = Subscription {
            id: id.clone(),
            company_id: create.company_id,
            plan_id: create.plan_id,
            gateway_customer_id: create.gateway_customer_id,
            gateway_subscription_id: create.gateway_subscription_id,
            status: SubscriptionStatus::Active,
            current_period_end: create.current_period_end,
            created_at: now,
            updated_at: now,
        };

        subscriptions.insert(id.clone(), subscription.clone());
        drop(subscriptions);

        self.emit("subscriptions", ChangeOp::Insert, &id);
        Ok(subscription)
    }

    async fn get_company_subscription(&self, company_id: &str) -> AppResult<Option<Subscription>> {
        let subscriptions = self.subscriptions.lock().unwrap();
        // Prefer the active row; fall back to the most recent canceled one.
        let mut rows: Vec<&Subscription> = subscriptions
            .values()
            .filter(|s| s.company_id == company_id)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .iter()
            .find(|s| s.status == SubscriptionStatus::Active)
            .or(rows.first())
            .map(|s| (*s).clone()))
    }

    async fn update_subscription(
        &self,
        id: &str,
        update: UpdateSubscription,
    ) -> AppResult<Subscription> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let subscription = subscriptions
            .get_mut(id)
            .ok_or_else(|| AppError::not_found("Subscription not found"))?;

        if let Some(plan_id) = update.plan_id {
            subscription.plan_id = plan_id;
        }
        if let Some(status) = update.status {
            subscription.status = status;
        }
        if let Some(period_end) = update.current_period_end {
            subscription.current_period_end = period_end;
        }
        subscription.updated_at = Utc::now();

        let updated = subscription.clone();
        drop(subscriptions);

        self.emit("subscriptions", ChangeOp::Update, id);
        Ok(updated)
    }
}

#[async_trait]
impl AuditOps for MemoryDatabaseAdapter {
    async fn record_audit(&self, entry: RecordAudit) -> AppResult<AuditLogEntry> {
        let mut audit_log = self.audit_log.lock().unwrap();

        let id = Uuid::new_v4().to_string();
        let record = AuditLogEntry {
            id: id.clone(),
            company_id: entry.company_id,
            actor_id: entry.actor_id,
            action: entry.action,
            subject: entry.subject,
            created_at: Utc::now(),
        };

        audit_log.push(record.clone());
        drop(audit_log);

        self.emit("audit_logs", ChangeOp::Insert, &id);
        Ok(record)
    }

    async fn list_company_audit(&self, company_id: &str) -> AppResult<Vec<AuditLogEntry>> {
        let audit_log = self.audit_log.lock().unwrap();
        let mut result: Vec<AuditLogEntry> = audit_log
            .iter()
            .filter(|e| e.company_id == company_id)
            .cloned()
            .collect();
        result.reverse();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn create_invoice_data(company_id: &str) -> CreateInvoice {
        CreateInvoice {
            id: None,
            company_id: company_id.to_string(),
            customer_email: "customer@example.com".to_string(),
            currency: "USD".to_string(),
            due_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            items: vec![crate::types::InvoiceItem {
                description: "Machine restock".to_string(),
                quantity: 2,
                unit_price_minor: 500,
            }],
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let db = MemoryDatabaseAdapter::new();
        db.create_profile(CreateProfile::new("a@example.com"))
            .await
            .unwrap();

        let err = db
            .create_profile(CreateProfile::new("a@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let db = MemoryDatabaseAdapter::new();
        db.create_company(CreateCompany {
            id: None,
            name: "Acme".to_string(),
            slug: "acme".to_string(),
            logo: None,
        })
        .await
        .unwrap();

        let err = db
            .create_company(CreateCompany {
                id: None,
                name: "Acme 2".to_string(),
                slug: "acme".to_string(),
                logo: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn invoice_created_with_items_and_draft_status() {
        let db = MemoryDatabaseAdapter::new();
        let invoice = db.create_invoice(create_invoice_data("co-1")).await.unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.items.len(), 1);
        assert_eq!(invoice.total_minor(), 1000);

        let fetched = db.get_invoice_by_id(&invoice.id).await.unwrap().unwrap();
        assert_eq!(fetched.items, invoice.items);
    }

    #[tokio::test]
    async fn writes_are_broadcast_on_the_change_feed() {
        let db = MemoryDatabaseAdapter::new();
        let mut changes = db.changes();

        let invoice = db.create_invoice(create_invoice_data("co-1")).await.unwrap();

        let event = changes.recv().await.unwrap();
        assert_eq!(event.table, "invoices");
        assert_eq!(event.op, ChangeOp::Insert);
        assert_eq!(event.row_id, invoice.id);
    }

    #[tokio::test]
    async fn company_delete_cascades() {
        let db = MemoryDatabaseAdapter::new();
        let company = db
            .create_company(CreateCompany {
                id: None,
                name: "Acme".to_string(),
                slug: "acme".to_string(),
                logo: None,
            })
            .await
            .unwrap();
        db.create_membership(CreateMembership {
            company_id: company.id.clone(),
            user_id: "user-1".to_string(),
            role: "owner".to_string(),
        })
        .await
        .unwrap();
        db.create_invoice(create_invoice_data(&company.id)).await.unwrap();

        db.delete_company(&company.id).await.unwrap();

        assert!(db.get_company_by_id(&company.id).await.unwrap().is_none());
        assert_eq!(db.count_company_members(&company.id).await.unwrap(), 0);
        assert!(db
            .list_company_invoices(&company.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn second_active_subscription_is_rejected() {
        let db = MemoryDatabaseAdapter::new();
        let create = CreateSubscription {
            company_id: "co-1".to_string(),
            plan_id: crate::plans::PlanId::Growth,
            gateway_customer_id: "cus_1".to_string(),
            gateway_subscription_id: "sub_1".to_string(),
            current_period_end: Utc::now() + chrono::Duration::days(30),
        };
        db.create_subscription(create.clone()).await.unwrap();

        let err = db.create_subscription(create).await.unwrap_err();
        assert_eq!(err.status_code(), 409);
    }
}

//! Tenant-side entities: user profiles, sessions, companies, memberships,
//! and invitations. These mirror the hosted database tables `user_profiles`,
//! `sessions`, `companies`, `company_memberships`, and `invitations`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user profile row. Identity itself (credentials, OAuth) lives in the
/// hosted auth service; this is the application-visible mirror.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    /// Company this session is currently scoped to, if any.
    pub active_company_id: Option<String>,
}

/// Tenant entity backing the `companies` table. Everything billable and
/// every membership hangs off one of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The join entity associating a user with a company and a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: String,
    pub company_id: String,
    pub user_id: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Invitation lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub id: String,
    pub company_id: String,
    pub email: String,
    pub role: String,
    pub status: InvitationStatus,
    pub inviter_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Profile creation data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfile {
    pub id: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl CreateProfile {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: Some(Uuid::new_v4().to_string()),
            email: email.into(),
            name: None,
            avatar_url: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

/// Profile update data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Session creation data
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub active_company_id: Option<String>,
}

/// Company creation data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompany {
    pub id: Option<String>,
    pub name: String,
    pub slug: String,
    pub logo: Option<String>,
}

/// Company update data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub logo: Option<String>,
}

/// Membership creation data
#[derive(Debug, Clone)]
pub struct CreateMembership {
    pub company_id: String,
    pub user_id: String,
    pub role: String,
}

/// Invitation creation data
#[derive(Debug, Clone)]
pub struct CreateInvitation {
    pub company_id: String,
    pub email: String,
    pub role: String,
    pub inviter_id: String,
    pub expires_at: DateTime<Utc>,
}

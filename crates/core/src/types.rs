use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Re-export tenant and billing types
pub use super::types_billing::{
    AuditLogEntry, CreateInvoice, CreatePayment, CreateSubscription, Invoice, InvoiceItem,
    InvoiceStatus, Payment, RecordAudit, Subscription, SubscriptionStatus, UpdateSubscription,
};
pub use super::types_tenant::{
    Company, CreateCompany, CreateInvitation, CreateMembership, CreateProfile, CreateSession,
    Invitation, InvitationStatus, Membership, Session, UpdateCompany, UpdateProfile, UserProfile,
};

/// HTTP method enumeration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

/// Platform request wrapper.
///
/// Framework-agnostic: the axum integration converts incoming requests into
/// this shape before dispatch, and tests construct it directly.
#[derive(Debug, Clone)]
pub struct AppRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
    pub query: HashMap<String, String>,
}

/// Platform response wrapper
#[derive(Debug, Clone)]
pub struct AppResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl AppRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            body: None,
            query: HashMap::new(),
        }
    }

    /// Construct a request from all public parts.
    ///
    /// Prefer [`AppRequest::new`] when you only need method + path.
    pub fn from_parts(
        method: HttpMethod,
        path: String,
        headers: HashMap<String, String>,
        body: Option<Vec<u8>>,
        query: HashMap<String, String>,
    ) -> Self {
        Self {
            method,
            path,
            headers,
            body,
            query,
        }
    }

    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers.get(name)
    }

    pub fn body_as_json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        if let Some(body) = &self.body {
            serde_json::from_slice(body)
        } else {
            serde_json::from_str("{}")
        }
    }
}

impl AppResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn json<T: Serialize>(status: u16, data: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(data)?;
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());

        Ok(Self {
            status,
            headers,
            body,
        })
    }

    pub fn text(status: u16, text: impl Into<String>) -> Self {
        let body = text.into().into_bytes();
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "text/plain".to_string());

        Self {
            status,
            headers,
            body,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Generic `{ ok: bool }` response used by `/ok` and health endpoints.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Health-check response for `/health`.
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// Error body `{ error: String }`.
#[derive(Debug, Serialize)]
pub struct ErrorMessageResponse {
    pub error: String,
}

/// Rate-limit error response with `retry_after` field.
#[derive(Debug, Serialize)]
pub struct RateLimitErrorResponse {
    pub error: &'static str,
    pub retry_after: u64,
}

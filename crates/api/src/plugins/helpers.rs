//! Shared helpers for plugin implementations.
//!
//! Extracted to avoid duplicating common patterns across plugins.

use vendhub_core::adapters::DatabaseAdapter;
use vendhub_core::{AppContext, AppError, AppRequest, AppResult, Membership, Session, UserProfile};

/// Require an authenticated session, resolving the user and session from a
/// Bearer token or the signed session cookie.
pub(crate) async fn require_session<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<(UserProfile, Session)> {
    let session_manager = ctx.session_manager();

    if let Some(token) = session_manager.extract_session_token(req) {
        if let Some(session) = session_manager.get_session(&token).await? {
            if let Some(user) = ctx.database.get_profile_by_id(&session.user_id).await? {
                return Ok((user, session));
            }
        }
    }

    Err(AppError::Unauthenticated)
}

/// Resolve a company ID from an explicit id, a slug, or the session's
/// active company, in that order.
pub(crate) async fn resolve_company_id<DB: DatabaseAdapter>(
    company_id: Option<&str>,
    company_slug: Option<&str>,
    session: &Session,
    ctx: &AppContext<DB>,
) -> AppResult<String> {
    if let Some(id) = company_id {
        return Ok(id.to_string());
    }

    if let Some(slug) = company_slug {
        if let Some(company) = ctx.database.get_company_by_slug(slug).await? {
            return Ok(company.id);
        }
        return Err(AppError::not_found("Company not found"));
    }

    session
        .active_company_id
        .clone()
        .ok_or_else(|| AppError::bad_request("No active company"))
}

/// Require that the user is a member of the company.
pub(crate) async fn require_member<DB: DatabaseAdapter>(
    ctx: &AppContext<DB>,
    company_id: &str,
    user_id: &str,
) -> AppResult<Membership> {
    ctx.database
        .get_membership(company_id, user_id)
        .await?
        .ok_or_else(|| AppError::forbidden("Not a member of this company"))
}

/// Parse query parameters into a struct, falling back to defaults on
/// missing or malformed values.
pub(crate) fn parse_query<T: Default + serde::de::DeserializeOwned>(
    query: &std::collections::HashMap<String, String>,
) -> T {
    let json_value =
        serde_json::to_value(query).unwrap_or(serde_json::Value::Object(Default::default()));
    serde_json::from_value(json_value).unwrap_or_default()
}

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::adapters::{ProfileOps, SessionOps};
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::types::{CreateSession, Session, UserProfile};

type HmacSha256 = Hmac<Sha256>;

/// Session manager handles session creation, validation, and cleanup.
///
/// Sessions themselves are issued by the hosted auth service; this manager
/// is the application-side view of that table plus the signed-cookie
/// handling the reference stack performs client-side.
pub struct SessionManager<DB> {
    config: Arc<AppConfig>,
    database: Arc<DB>,
}

impl<DB: SessionOps + ProfileOps> SessionManager<DB> {
    pub fn new(config: Arc<AppConfig>, database: Arc<DB>) -> Self {
        Self { config, database }
    }

    /// Create a new session for a user
    pub async fn create_session(
        &self,
        user: &UserProfile,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<Session> {
        let expires_at = Utc::now() + self.config.session.expires_in;

        let create_session = CreateSession {
            user_id: user.id.clone(),
            expires_at,
            ip_address,
            user_agent,
            active_company_id: None,
        };

        let session = self.database.create_session(create_session).await?;
        Ok(session)
    }

    /// Get session by token.
    ///
    /// Expired sessions are deleted on access; live sessions have their
    /// expiry renewed when `update_age` is configured.
    pub async fn get_session(&self, token: &str) -> AppResult<Option<Session>> {
        let session = self.database.get_session(token).await?;

        if let Some(ref session) = session {
            if session.expires_at < Utc::now() {
                self.database.delete_session(token).await?;
                return Ok(None);
            }

            if self.config.session.update_age {
                let new_expires_at = Utc::now() + self.config.session.expires_in;
                let _ = self
                    .database
                    .update_session_expiry(token, new_expires_at)
                    .await;
            }
        }

        Ok(session)
    }

    /// Delete a session
    pub async fn delete_session(&self, token: &str) -> AppResult<()> {
        self.database.delete_session(token).await?;
        Ok(())
    }

    /// Get all live sessions for a user
    pub async fn list_user_sessions(&self, user_id: &str) -> AppResult<Vec<Session>> {
        let sessions = self.database.get_user_sessions(user_id).await?;
        let now = Utc::now();

        Ok(sessions
            .into_iter()
            .filter(|session| session.expires_at > now)
            .collect())
    }

    /// Revoke all sessions for a user, returning how many were live.
    pub async fn revoke_all_user_sessions(&self, user_id: &str) -> AppResult<usize> {
        let sessions = self.list_user_sessions(user_id).await?;
        let count = sessions.len();

        self.database.delete_user_sessions(user_id).await?;
        Ok(count)
    }

    /// Cleanup expired sessions
    pub async fn cleanup_expired_sessions(&self) -> AppResult<usize> {
        let count = self.database.delete_expired_sessions().await?;
        Ok(count)
    }

    /// Sign a session token with HMAC-SHA256 using the config secret.
    ///
    /// Returns the signed value in the format `token.base64url_signature`.
    pub fn sign_token(&self, token: &str) -> String {
        let signature = compute_hmac_signature(token, &self.config.secret);
        format!("{}.{}", token, signature)
    }

    /// Verify an HMAC-signed cookie value and extract the raw token.
    ///
    /// Expects the format `token.base64url_signature`. Returns `Some(token)`
    /// if the signature is valid, `None` otherwise.
    pub fn verify_signed_token(&self, signed_value: &str) -> Option<String> {
        verify_and_extract_token(signed_value, &self.config.secret)
    }

    /// Extract session token from a request.
    ///
    /// Tries Bearer token from the Authorization header first (no HMAC
    /// verification), then falls back to parsing the configured cookie from
    /// the Cookie header (with HMAC signature verification).
    pub fn extract_session_token(&self, req: &crate::types::AppRequest) -> Option<String> {
        if let Some(auth_header) = req.headers.get("authorization") {
            if let Some(token) = auth_header.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }

        if let Some(cookie_header) = req.headers.get("cookie") {
            let cookie_name = &self.config.session.cookie_name;
            for part in cookie_header.split(';') {
                let part = part.trim();
                if let Some(value) = part.strip_prefix(&format!("{}=", cookie_name)) {
                    if !value.is_empty() {
                        return self.verify_signed_token(value);
                    }
                }
            }
        }

        None
    }
}

/// Compute HMAC-SHA256 signature for a token, returning base64url-encoded signature.
fn compute_hmac_signature(token: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(token.as_bytes());
    let result = mac.finalize();
    URL_SAFE_NO_PAD.encode(result.into_bytes())
}

/// Verify an HMAC-signed value and extract the raw token.
fn verify_and_extract_token(signed_value: &str, secret: &str) -> Option<String> {
    let (token, signature) = signed_value.rsplit_once('.')?;
    if token.is_empty() || signature.is_empty() {
        return None;
    }

    let expected_signature = compute_hmac_signature(token, secret);

    // Constant-time comparison to prevent timing attacks
    if signature.len() != expected_signature.len() {
        return None;
    }
    let matches = signature
        .as_bytes()
        .iter()
        .zip(expected_signature.as_bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));
    if matches != 0 {
        return None;
    }

    Some(token.to_string())
}

/// Sign a session token with HMAC-SHA256 (standalone, for use outside SessionManager).
pub fn sign_session_token(token: &str, secret: &str) -> String {
    let signature = compute_hmac_signature(token, secret);
    format!("{}.{}", token, signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryDatabaseAdapter;
    use crate::types::{AppRequest, CreateProfile, HttpMethod};

    fn test_config() -> Arc<AppConfig> {
        Arc::new(AppConfig::new(
            "test-secret-key-that-is-at-least-32-characters-long",
        ))
    }

    async fn manager_with_user() -> (SessionManager<MemoryDatabaseAdapter>, UserProfile) {
        let db = Arc::new(MemoryDatabaseAdapter::new());
        let user = db
            .create_profile(CreateProfile::new("session@example.com"))
            .await
            .unwrap();
        (SessionManager::new(test_config(), db), user)
    }

    #[tokio::test]
    async fn session_round_trip() {
        let (manager, user) = manager_with_user().await;

        let session = manager.create_session(&user, None, None).await.unwrap();
        assert!(session.token.starts_with("sess_"));
        assert_eq!(session.user_id, user.id);

        let retrieved = manager
            .get_session(&session.token)
            .await
            .unwrap()
            .expect("session should exist");
        assert_eq!(retrieved.id, session.id);

        manager.delete_session(&session.token).await.unwrap();
        assert!(manager.get_session(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn signed_token_round_trip() {
        let (manager, _user) = manager_with_user().await;

        let signed = manager.sign_token("sess_abc123");
        assert_eq!(
            manager.verify_signed_token(&signed).as_deref(),
            Some("sess_abc123")
        );

        assert!(manager.verify_signed_token("sess_abc123.forged").is_none());
        assert!(manager.verify_signed_token("").is_none());
    }

    #[tokio::test]
    async fn bearer_token_is_extracted() {
        let (manager, _user) = manager_with_user().await;

        let mut req = AppRequest::new(HttpMethod::Get, "/invoices/list");
        req.headers
            .insert("authorization".to_string(), "Bearer sess_xyz".to_string());

        assert_eq!(
            manager.extract_session_token(&req).as_deref(),
            Some("sess_xyz")
        );
    }

    #[tokio::test]
    async fn cookie_token_requires_valid_signature() {
        let (manager, _user) = manager_with_user().await;

        let signed = manager.sign_token("sess_cookie");
        let mut req = AppRequest::new(HttpMethod::Get, "/invoices/list");
        req.headers.insert(
            "cookie".to_string(),
            format!("vendhub.session-token={}", signed),
        );
        assert_eq!(
            manager.extract_session_token(&req).as_deref(),
            Some("sess_cookie")
        );

        let mut forged = AppRequest::new(HttpMethod::Get, "/invoices/list");
        forged.headers.insert(
            "cookie".to_string(),
            "vendhub.session-token=sess_cookie.bogus".to_string(),
        );
        assert!(manager.extract_session_token(&forged).is_none());
    }
}

use thiserror::Error;

/// Platform error types.
///
/// Each variant maps to an HTTP status code via [`AppError::status_code`].
/// Use [`AppError::into_response`] to produce the standardized JSON body
/// `{ "error": "...", "details"?: {...} }`.
#[derive(Error, Debug)]
pub enum AppError {
    // --- 400 Bad Request ---
    #[error("{0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // --- 401 Unauthorized ---
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Session not found or expired")]
    SessionNotFound,

    // --- 403 Forbidden ---
    #[error("{0}")]
    Forbidden(String),

    // --- 404 Not Found ---
    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    NotFound(String),

    // --- 409 Conflict ---
    #[error("{0}")]
    Conflict(String),

    // --- 429 Too Many Requests ---
    #[error("Too many requests")]
    RateLimited,

    // --- 500 Internal Server Error ---
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Payments gateway error: {0}")]
    Gateway(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Plugin error: {plugin} - {message}")]
    Plugin { plugin: String, message: String },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => 400,
            Self::Unauthenticated | Self::SessionNotFound => 401,
            Self::Forbidden(_) => 403,
            Self::UserNotFound | Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::RateLimited => 429,
            Self::Config(_)
            | Self::Database(_)
            | Self::Gateway(_)
            | Self::Serialization(_)
            | Self::Plugin { .. }
            | Self::Internal(_) => 500,
        }
    }

    /// Convert this error into a standardized [`AppResponse`](crate::types::AppResponse)
    /// with the body `{ "error": "..." }`.
    ///
    /// Internal errors (500) use a generic message to avoid leaking details.
    pub fn into_response(self) -> crate::types::AppResponse {
        let status = self.status_code();
        let message = match status {
            500 => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        crate::types::AppResponse::json(status, &serde_json::json!({ "error": message }))
            .unwrap_or_else(|_| crate::types::AppResponse::text(status, &message))
    }

    // --- Constructors ---

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn plugin(plugin: &str, message: impl Into<String>) -> Self {
        Self::Plugin {
            plugin: plugin.to_string(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Convert `validator::ValidationErrors` into the standardized error body.
///
/// Returns a 400 response with `{ "error": "Validation failed", "details": {...} }`
/// where `details` maps field names to their failure messages.
pub fn validation_error_response(errors: &validator::ValidationErrors) -> crate::types::AppResponse {
    let field_errors: std::collections::HashMap<_, Vec<String>> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
                .collect();
            (field, messages)
        })
        .collect();

    let body = serde_json::json!({
        "error": "Validation failed",
        "details": field_errors,
    });

    crate::types::AppResponse::json(400, &body)
        .unwrap_or_else(|_| crate::types::AppResponse::text(400, "Validation failed"))
}

/// Validate a request body, returning a parsed + validated value or an error response.
pub fn validate_request_body<T>(
    req: &crate::types::AppRequest,
) -> Result<T, crate::types::AppResponse>
where
    T: serde::de::DeserializeOwned + validator::Validate,
{
    let value: T = req.body_as_json().map_err(|e| {
        crate::types::AppResponse::json(
            400,
            &serde_json::json!({ "error": format!("Invalid JSON: {}", e) }),
        )
        .unwrap_or_else(|_| crate::types::AppResponse::text(400, "Invalid JSON"))
    })?;

    value.validate().map_err(|e| validation_error_response(&e))?;

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_boundary_classification() {
        assert_eq!(AppError::bad_request("x").status_code(), 400);
        assert_eq!(AppError::Unauthenticated.status_code(), 401);
        assert_eq!(AppError::forbidden("x").status_code(), 403);
        assert_eq!(AppError::not_found("x").status_code(), 404);
        assert_eq!(AppError::conflict("x").status_code(), 409);
        assert_eq!(AppError::RateLimited.status_code(), 429);
        assert_eq!(AppError::gateway("x").status_code(), 500);
        assert_eq!(
            AppError::Database(DatabaseError::Query("x".into())).status_code(),
            500
        );
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let response = AppError::internal("connection string was postgres://secret").into_response();
        assert_eq!(response.status, 500);

        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn client_errors_carry_their_message() {
        let response = AppError::bad_request("Slug is already taken").into_response();
        assert_eq!(response.status, 400);

        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["error"], "Slug is already taken");
    }
}

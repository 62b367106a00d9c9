// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::access::ScopeError;
use crate::database::DatabaseError;
use crate::services::allocation::AllocationError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError { message, field_errors } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR"
                });

                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }

                response
            }
            _ => json!({
                "error": true,
                "message": self.message(),
                "code": self.error_code()
            }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn field_error(field: impl Into<String>, problem: impl Into<String>) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(field.into(), problem.into());
        ApiError::ValidationError {
            message: "Invalid field format".to_string(),
            field_errors: Some(field_errors),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<ScopeError> for ApiError {
    fn from(err: ScopeError) -> Self {
        match err {
            ScopeError::NotFound(what) => {
                // unknown role or unmapped score: deny, never default
                tracing::warn!("Access denied: {} not recognised", what);
                ApiError::forbidden("No privilege for user type")
            }
            ScopeError::InsufficientScore { .. } => ApiError::forbidden("Not enough privilege"),
            ScopeError::InvalidLocationCode { code, reason } => {
                ApiError::field_error("location_code", format!("{}: {}", code, reason))
            }
            ScopeError::IdGenerationExhausted { parent, attempts } => {
                tracing::error!("Code generation under {} exhausted after {} attempts", parent, attempts);
                ApiError::internal_server_error("Could not allocate a code, please retry")
            }
            ScopeError::ConcurrentAllocationConflict(code) => {
                ApiError::conflict(format!("Code {} was allocated concurrently, please retry", code))
            }
            ScopeError::InvalidScopeTable(msg) | ScopeError::InvalidRoleTable(msg) => {
                tracing::error!("Access configuration error: {}", msg);
                ApiError::internal_server_error("Access configuration error")
            }
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(format!("Not found: {}", msg)),
            DatabaseError::UniqueViolation(key) => ApiError::conflict(format!("{} already exists", key)),
            DatabaseError::ConnectionError(msg) => {
                tracing::error!("Database connection error: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::MigrationError(msg) => {
                tracing::error!("Migration error: {}", msg);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<AllocationError> for ApiError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::Scope(e) => e.into(),
            AllocationError::Database(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_errors_map_to_statuses() {
        let cases = [
            (ScopeError::NotFound("role 'Janitor'".into()), StatusCode::FORBIDDEN),
            (ScopeError::InsufficientScore { score: 1, required: 3 }, StatusCode::FORBIDDEN),
            (ScopeError::invalid_code("DCL", "too short"), StatusCode::BAD_REQUEST),
            (
                ScopeError::IdGenerationExhausted { parent: "DCL".into(), attempts: 50 },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ScopeError::ConcurrentAllocationConflict("DCL-234".into()), StatusCode::CONFLICT),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn database_errors_hide_details() {
        let err = ApiError::from(DatabaseError::ConnectionError("refused on 10.0.0.5".into()));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!err.message().contains("10.0.0.5"));
    }

    #[test]
    fn validation_error_carries_field() {
        let body = ApiError::from(ScopeError::invalid_code("DCL", "too short")).to_json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["field_errors"]["location_code"].as_str().unwrap().contains("too short"));
    }
}

use thiserror::Error;

/// Errors raised while deriving a caller's scope or allocating hierarchy codes.
///
/// None of these are fatal to the process; the HTTP layer maps each one to a
/// status code (see `crate::error`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// Unknown role name, or a score below every configured threshold.
    /// Callers must treat this as a denial.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Score {score} is below the required {required}")]
    InsufficientScore { score: u8, required: u8 },

    #[error("Invalid location code '{code}': {reason}")]
    InvalidLocationCode { code: String, reason: String },

    #[error("Could not generate a free code under '{parent}' after {attempts} attempts")]
    IdGenerationExhausted { parent: String, attempts: usize },

    #[error("Code already allocated: {0}")]
    ConcurrentAllocationConflict(String),

    #[error("Invalid scope table: {0}")]
    InvalidScopeTable(String),

    #[error("Invalid role table: {0}")]
    InvalidRoleTable(String),
}

impl ScopeError {
    pub fn invalid_code(code: impl Into<String>, reason: impl Into<String>) -> Self {
        ScopeError::InvalidLocationCode {
            code: code.into(),
            reason: reason.into(),
        }
    }
}

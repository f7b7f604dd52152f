//! The module contains the error the engine can throw.
//!
//! Validation errors are field-scoped: [`EngineError::field`] names the
//! request field the error refers to, so callers can attach the message to
//! the right input.
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("{0}")]
    ExistingCategory(String),
    #[error("{0}")]
    ExistingBudget(String),
    #[error("\"{0}\" already present!")]
    ExistingUser(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("{0}")]
    InvalidCategory(String),
    #[error("{0}")]
    KindMismatch(String),
    #[error("Invalid ordering: {0}")]
    InvalidOrdering(String),
    #[error("Invalid type: {0}")]
    InvalidKind(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Request field the error refers to, if it is a validation error.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::ExistingCategory(_) | Self::InvalidName(_) => Some("name"),
            Self::ExistingBudget(_) => Some("month"),
            Self::ExistingUser(_) => Some("username"),
            Self::InvalidAmount(_) => Some("amount"),
            Self::InvalidDate(_) => Some("date"),
            Self::InvalidCategory(_) => Some("category"),
            Self::KindMismatch(_) | Self::InvalidKind(_) => Some("type"),
            Self::InvalidOrdering(_) => Some("ordering"),
            Self::KeyNotFound(_)
            | Self::InvalidCredentials
            | Self::PasswordHash(_)
            | Self::Database(_) => None,
        }
    }
}

/// Turns a unique-constraint violation into `conflict`, keeps any other
/// database error as is.
pub(crate) fn on_unique_violation(err: DbErr, conflict: impl FnOnce() -> EngineError) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => conflict(),
        _ => EngineError::Database(err),
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingCategory(a), Self::ExistingCategory(b)) => a == b,
            (Self::ExistingBudget(a), Self::ExistingBudget(b)) => a == b,
            (Self::ExistingUser(a), Self::ExistingUser(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::InvalidCategory(a), Self::InvalidCategory(b)) => a == b,
            (Self::KindMismatch(a), Self::KindMismatch(b)) => a == b,
            (Self::InvalidOrdering(a), Self::InvalidOrdering(b)) => a == b,
            (Self::InvalidKind(a), Self::InvalidKind(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::PasswordHash(a), Self::PasswordHash(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_name_their_field() {
        assert_eq!(
            EngineError::KindMismatch("x".to_string()).field(),
            Some("type")
        );
        assert_eq!(
            EngineError::InvalidCategory("x".to_string()).field(),
            Some("category")
        );
        assert_eq!(
            EngineError::ExistingBudget("x".to_string()).field(),
            Some("month")
        );
        assert_eq!(EngineError::KeyNotFound("x".to_string()).field(), None);
    }

    #[test]
    fn non_unique_database_errors_are_kept() {
        let err = on_unique_violation(DbErr::Custom("boom".to_string()), || {
            EngineError::ExistingCategory("dup".to_string())
        });
        assert!(matches!(err, EngineError::Database(_)));
    }
}

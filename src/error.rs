//! Gift transaction error types.
//!
//! Stable string codes and HTTP status suggestions are kept alongside the
//! variants so API layers map errors consistently.

use thiserror::Error;

/// Errors surfaced by the gift coordinator and ledger repository.
#[derive(Error, Debug, Clone)]
pub enum GiftError {
    // === Validation Errors ===
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Sender and receiver cannot be the same account")]
    SameAccount,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Unknown gift: {0}")]
    UnknownGift(String),

    // === Balance Errors ===
    #[error("Insufficient diamonds")]
    InsufficientFunds,

    #[error("Insufficient coins")]
    InsufficientCoins,

    #[error("Below minimum redeemable coin amount ({0})")]
    BelowMinimumRedeem(u64),

    // === Transient / System Errors ===
    #[error("Concurrent modification detected (retries exhausted)")]
    Conflict,

    #[error("Transaction timed out before commit")]
    Timeout,

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Internal system error: {0}")]
    Internal(String),
}

impl GiftError {
    /// Stable error code for API responses and audit records.
    pub fn code(&self) -> &'static str {
        match self {
            GiftError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            GiftError::SameAccount => "SAME_ACCOUNT",
            GiftError::InvalidAmount => "INVALID_AMOUNT",
            GiftError::InvalidQuantity => "INVALID_QUANTITY",
            GiftError::UnknownGift(_) => "UNKNOWN_GIFT",
            GiftError::InsufficientFunds => "INSUFFICIENT_FUNDS",
            GiftError::InsufficientCoins => "INSUFFICIENT_COINS",
            GiftError::BelowMinimumRedeem(_) => "BELOW_MINIMUM_REDEEM",
            GiftError::Conflict => "CONFLICT",
            GiftError::Timeout => "TIMEOUT",
            GiftError::PersistenceUnavailable(_) => "PERSISTENCE_UNAVAILABLE",
            GiftError::Internal(_) => "INTERNAL",
        }
    }

    /// HTTP status code suggestion.
    pub fn http_status(&self) -> u16 {
        match self {
            GiftError::SameAccount
            | GiftError::InvalidAmount
            | GiftError::InvalidQuantity
            | GiftError::UnknownGift(_)
            | GiftError::BelowMinimumRedeem(_) => 400,
            GiftError::AccountNotFound(_) => 404,
            GiftError::InsufficientFunds | GiftError::InsufficientCoins => 422,
            GiftError::Conflict | GiftError::Timeout => 409,
            GiftError::PersistenceUnavailable(_) => 503,
            GiftError::Internal(_) => 500,
        }
    }

    /// Whether the caller may retry the request unchanged.
    ///
    /// Validation and funds errors are final; only transient failures are
    /// worth a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GiftError::Conflict | GiftError::Timeout | GiftError::PersistenceUnavailable(_)
        )
    }
}

impl From<anyhow::Error> for GiftError {
    fn from(e: anyhow::Error) -> Self {
        GiftError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(GiftError::InsufficientFunds.code(), "INSUFFICIENT_FUNDS");
        assert_eq!(GiftError::SameAccount.code(), "SAME_ACCOUNT");
        assert_eq!(
            GiftError::AccountNotFound("x".into()).code(),
            "ACCOUNT_NOT_FOUND"
        );
    }

    #[test]
    fn test_http_status() {
        assert_eq!(GiftError::InvalidAmount.http_status(), 400);
        assert_eq!(GiftError::AccountNotFound("x".into()).http_status(), 404);
        assert_eq!(GiftError::InsufficientFunds.http_status(), 422);
        assert_eq!(GiftError::Conflict.http_status(), 409);
        assert_eq!(
            GiftError::PersistenceUnavailable("down".into()).http_status(),
            503
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(GiftError::Conflict.is_retryable());
        assert!(GiftError::Timeout.is_retryable());
        assert!(!GiftError::InsufficientFunds.is_retryable());
        assert!(!GiftError::InvalidAmount.is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            GiftError::InsufficientFunds.to_string(),
            "Insufficient diamonds"
        );
    }
}

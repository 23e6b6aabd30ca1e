//! # Error Module
//!
//! Domain errors for Chama, built with thiserror.

use rust_decimal::Decimal;
use thiserror::Error;

/// Core domain errors.
///
/// Pure validation and state-machine failures, independent of storage.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    // === Money errors ===
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Repayment {amount} exceeds remaining balance {balance}")]
    ExceedsBalance { amount: Decimal, balance: Decimal },

    // === Member errors ===
    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Invalid member status: {0}")]
    InvalidMemberStatus(String),

    // === Loan errors ===
    #[error("Invalid loan plan: {0} (choose 1_month, 6_months or 12_months)")]
    InvalidPlan(String),

    #[error("Invalid loan status: {0}")]
    InvalidLoanStatus(String),

    // === Configuration errors ===
    #[error("Invalid lending policy: {0}")]
    InvalidPolicy(String),
}

/// Result type alias with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Whether this error rejects an amount
    pub fn is_amount_error(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidAmount(_) | CoreError::ExceedsBalance { .. }
        )
    }

    /// Whether this error rejects malformed user input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidName(_)
                | CoreError::InvalidPhone(_)
                | CoreError::InvalidMemberStatus(_)
                | CoreError::InvalidPlan(_)
                | CoreError::InvalidLoanStatus(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_display() {
        let err = CoreError::ExceedsBalance {
            amount: dec!(500),
            balance: dec!(120.50),
        };
        assert_eq!(
            err.to_string(),
            "Repayment 500 exceeds remaining balance 120.50"
        );

        let err = CoreError::InvalidPlan("weekly".to_string());
        assert!(err.to_string().contains("weekly"));
    }

    #[test]
    fn test_error_checks() {
        assert!(CoreError::InvalidAmount("0".to_string()).is_amount_error());
        assert!(CoreError::InvalidPhone("123".to_string()).is_input_error());
        assert!(!CoreError::InvalidPolicy("x".to_string()).is_input_error());
    }
}

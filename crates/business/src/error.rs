//! Business layer errors
//!
//! Every failure carries a stable [`FailureKind`] and a readable reason.
//! Lower-layer errors are wrapped and classified, never retried.

use chama_core::CoreError;
use chama_persistence::PersistenceError;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Failure taxonomy presented to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InvalidAmount,
    InvalidInput,
    NotFound,
    TenureTooShort,
    OutstandingLoanExists,
    ExceedsIndividualCap,
    ExceedsGroupCap,
    ExceedsBalance,
    DuplicatePhone,
    MemberHasDependents,
    ConcurrentModification,
    Storage,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidAmount => "InvalidAmount",
            FailureKind::InvalidInput => "InvalidInput",
            FailureKind::NotFound => "NotFound",
            FailureKind::TenureTooShort => "TenureTooShort",
            FailureKind::OutstandingLoanExists => "OutstandingLoanExists",
            FailureKind::ExceedsIndividualCap => "ExceedsIndividualCap",
            FailureKind::ExceedsGroupCap => "ExceedsGroupCap",
            FailureKind::ExceedsBalance => "ExceedsBalance",
            FailureKind::DuplicatePhone => "DuplicatePhone",
            FailureKind::MemberHasDependents => "MemberHasDependents",
            FailureKind::ConcurrentModification => "ConcurrentModification",
            FailureKind::Storage => "Storage",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Business operation errors
#[derive(Debug, Error)]
pub enum BusinessError {
    // === Eligibility errors ===
    #[error("Member #{member_id} joined {join_date}; {required_days} days of membership are required")]
    TenureTooShort {
        member_id: i64,
        join_date: NaiveDateTime,
        required_days: i64,
    },

    #[error("Member #{member_id} already has outstanding loan #{loan_id}")]
    OutstandingLoanExists { member_id: i64, loan_id: i64 },

    #[error("Requested {requested} exceeds individual cap {cap}")]
    ExceedsIndividualCap { requested: Decimal, cap: Decimal },

    #[error("Outstanding loans would reach {would_be}, above group contributions {ceiling}")]
    ExceedsGroupCap { would_be: Decimal, ceiling: Decimal },

    // === Member errors ===
    #[error("Phone number already registered: {0}")]
    DuplicatePhone(String),

    #[error("Member #{member_id} has {contributions} contribution(s) and {loans} loan(s); delete those first")]
    MemberHasDependents {
        member_id: i64,
        contributions: i64,
        loans: i64,
    },

    // === Loan errors ===
    #[error("Loan #{0} was modified concurrently; nothing was applied")]
    ConcurrentModification(i64),

    // === Wrapped errors ===
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Result type alias for business operations
pub type BusinessResult<T> = Result<T, BusinessError>;

impl BusinessError {
    /// Stable failure kind for the presentation layer
    pub fn kind(&self) -> FailureKind {
        match self {
            BusinessError::TenureTooShort { .. } => FailureKind::TenureTooShort,
            BusinessError::OutstandingLoanExists { .. } => FailureKind::OutstandingLoanExists,
            BusinessError::ExceedsIndividualCap { .. } => FailureKind::ExceedsIndividualCap,
            BusinessError::ExceedsGroupCap { .. } => FailureKind::ExceedsGroupCap,
            BusinessError::DuplicatePhone(_) => FailureKind::DuplicatePhone,
            BusinessError::MemberHasDependents { .. } => FailureKind::MemberHasDependents,
            BusinessError::ConcurrentModification(_) => FailureKind::ConcurrentModification,
            BusinessError::Core(err) => match err {
                CoreError::InvalidAmount(_) => FailureKind::InvalidAmount,
                CoreError::ExceedsBalance { .. } => FailureKind::ExceedsBalance,
                _ => FailureKind::InvalidInput,
            },
            BusinessError::Persistence(err) => match err {
                PersistenceError::NotFound { .. } => FailureKind::NotFound,
                PersistenceError::StaleWrite { .. } => FailureKind::ConcurrentModification,
                _ => FailureKind::Storage,
            },
        }
    }

    /// Human-readable reason
    pub fn reason(&self) -> String {
        self.to_string()
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == FailureKind::NotFound
    }
}

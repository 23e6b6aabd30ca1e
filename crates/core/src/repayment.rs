//! # Repayment Module
//!
//! Immutable record of money paid against a loan.

use crate::error::CoreResult;
use crate::money::positive_amount;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated repayment, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRepayment {
    pub loan_id: i64,
    pub amount: Decimal,
    pub paid_at: NaiveDateTime,
}

impl NewRepayment {
    pub fn new(loan_id: i64, amount: Decimal, paid_at: NaiveDateTime) -> CoreResult<Self> {
        Ok(Self {
            loan_id,
            amount: positive_amount(amount, "Repayment")?,
            paid_at,
        })
    }
}

/// A stored repayment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repayment {
    pub id: i64,
    pub loan_id: i64,
    pub amount: Decimal,
    pub paid_at: NaiveDateTime,
}

impl fmt::Display for Repayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repayment #{} of {} on loan #{} at {}",
            self.id, self.amount, self.loan_id, self.paid_at
        )
    }
}

//! # Loan Module
//!
//! Loan plans, the loan record, and the repayment state machine.
//!
//! ```text
//!   ACTIVE ──balance = 0──────────────► PAID (terminal)
//!     │                                   ▲
//!     └─past due, balance > 0─► DEFAULTED ┘ balance = 0
//! ```
//!
//! The stored status only changes when a repayment is applied. Readers use
//! [`Loan::effective_status`], which also reports an overdue ACTIVE loan
//! as DEFAULTED, so every surface agrees on the same status.

use crate::error::{CoreError, CoreResult};
use crate::money::{positive_amount, round_money};
use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanStatus {
    /// Being repaid
    Active,
    /// Fully repaid
    Paid,
    /// Past due with a remaining balance
    Defaulted,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "ACTIVE",
            LoanStatus::Paid => "PAID",
            LoanStatus::Defaulted => "DEFAULTED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Some(LoanStatus::Active),
            "PAID" => Some(LoanStatus::Paid),
            "DEFAULTED" => Some(LoanStatus::Defaulted),
            _ => None,
        }
    }

    /// ACTIVE or DEFAULTED: counts against the group ceiling and blocks a new loan
    pub fn is_outstanding(&self) -> bool {
        matches!(self, LoanStatus::Active | LoanStatus::Defaulted)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Paid)
    }

    /// Status after a repayment leaves `balance`.
    ///
    /// DEFAULTED never returns to ACTIVE; PAID is only reached at zero.
    pub fn after_repayment(self, balance: Decimal, overdue: bool) -> LoanStatus {
        if balance <= Decimal::ZERO {
            return LoanStatus::Paid;
        }
        match self {
            LoanStatus::Defaulted => LoanStatus::Defaulted,
            _ if overdue => LoanStatus::Defaulted,
            _ => LoanStatus::Active,
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Repayment plan: term length and flat interest rate.
///
/// Interest is charged once on the principal at issuance; it neither
/// compounds nor accrues with elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanPlan {
    /// 30 days @ 2%
    #[serde(rename = "1_month")]
    OneMonth,
    /// 180 days @ 4%
    #[serde(rename = "6_months")]
    SixMonths,
    /// 365 days @ 7%
    #[serde(rename = "12_months")]
    TwelveMonths,
}

impl LoanPlan {
    pub fn code(&self) -> &'static str {
        match self {
            LoanPlan::OneMonth => "1_month",
            LoanPlan::SixMonths => "6_months",
            LoanPlan::TwelveMonths => "12_months",
        }
    }

    /// Accepts `1_month`, `6-months`, `12 months`, or the bare month count
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "1_month" | "1_months" | "1" => Some(LoanPlan::OneMonth),
            "6_months" | "6_month" | "6" => Some(LoanPlan::SixMonths),
            "12_months" | "12_month" | "12" => Some(LoanPlan::TwelveMonths),
            _ => None,
        }
    }

    /// Parse or fail with `InvalidPlan`
    pub fn parse(s: &str) -> CoreResult<Self> {
        Self::from_str(s).ok_or_else(|| CoreError::InvalidPlan(s.to_string()))
    }

    pub fn term_days(&self) -> i64 {
        match self {
            LoanPlan::OneMonth => 30,
            LoanPlan::SixMonths => 180,
            LoanPlan::TwelveMonths => 365,
        }
    }

    pub fn term(&self) -> Duration {
        Duration::days(self.term_days())
    }

    /// Interest as a percentage of principal (2.00, 4.00, 7.00)
    pub fn interest_rate_percent(&self) -> Decimal {
        match self {
            LoanPlan::OneMonth => Decimal::new(200, 2),
            LoanPlan::SixMonths => Decimal::new(400, 2),
            LoanPlan::TwelveMonths => Decimal::new(700, 2),
        }
    }

    /// Interest as a fraction of principal (0.02, 0.04, 0.07)
    pub fn interest_rate(&self) -> Decimal {
        self.interest_rate_percent() / Decimal::ONE_HUNDRED
    }
}

impl fmt::Display for LoanPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} days @ {}%)",
            self.code(),
            self.term_days(),
            self.interest_rate_percent()
        )
    }
}

/// Terms fixed at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub member_id: i64,
    pub principal: Decimal,
    pub issued_at: NaiveDateTime,
    pub due_at: NaiveDateTime,
    /// Percentage, e.g. 4.00
    pub interest_rate: Decimal,
    /// Principal plus interest, rounded to cents
    pub balance: Decimal,
}

impl LoanTerms {
    pub fn new(
        member_id: i64,
        principal: Decimal,
        plan: LoanPlan,
        issued_at: NaiveDateTime,
    ) -> CoreResult<Self> {
        let principal = positive_amount(principal, "Loan")?;
        let interest = principal * plan.interest_rate();

        Ok(Self {
            member_id,
            principal,
            issued_at,
            due_at: issued_at + plan.term(),
            interest_rate: plan.interest_rate_percent(),
            balance: round_money(principal + interest),
        })
    }
}

/// A stored loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: i64,
    pub member_id: i64,
    pub principal: Decimal,
    pub issued_at: NaiveDateTime,
    pub due_at: NaiveDateTime,
    pub interest_rate: Decimal,
    pub balance: Decimal,
    pub status: LoanStatus,
}

impl Loan {
    /// Past the due date with money still owed
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        self.due_at < now && self.balance > Decimal::ZERO
    }

    /// Status as every read path reports it
    pub fn effective_status(&self, now: NaiveDateTime) -> LoanStatus {
        match self.status {
            LoanStatus::Active if self.is_overdue(now) => LoanStatus::Defaulted,
            status => status,
        }
    }

    /// Copy with `status` replaced by the effective status
    pub fn as_of(mut self, now: NaiveDateTime) -> Self {
        self.status = self.effective_status(now);
        self
    }

    pub fn is_outstanding(&self, now: NaiveDateTime) -> bool {
        self.effective_status(now).is_outstanding()
    }

    /// Interest charged at issuance
    pub fn interest(&self) -> Decimal {
        round_money(self.principal * self.interest_rate / Decimal::ONE_HUNDRED)
    }

    /// Compute the result of a repayment without mutating anything.
    pub fn apply_repayment(
        &self,
        amount: Decimal,
        now: NaiveDateTime,
    ) -> CoreResult<RepaymentOutcome> {
        let amount = positive_amount(amount, "Repayment")?;
        if amount > self.balance {
            return Err(CoreError::ExceedsBalance {
                amount,
                balance: self.balance,
            });
        }

        let mut balance = round_money(self.balance - amount);
        if balance < Decimal::ZERO {
            balance = Decimal::ZERO;
        }
        let status = self
            .status
            .after_repayment(balance, self.due_at < now);

        Ok(RepaymentOutcome {
            loan_id: self.id,
            amount,
            previous_balance: self.balance,
            balance,
            previous_status: self.status,
            status,
        })
    }
}

impl fmt::Display for Loan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loan #{} (member #{}, principal {}, balance {}, due {}, {})",
            self.id,
            self.member_id,
            self.principal,
            self.balance,
            self.due_at.date(),
            self.status
        )
    }
}

/// Balance and status change produced by one repayment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentOutcome {
    pub loan_id: i64,
    pub amount: Decimal,
    pub previous_balance: Decimal,
    pub balance: Decimal,
    pub previous_status: LoanStatus,
    pub status: LoanStatus,
}

impl RepaymentOutcome {
    pub fn is_paid_off(&self) -> bool {
        self.status == LoanStatus::Paid
    }
}

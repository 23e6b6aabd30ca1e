//! Database schema definitions
//!
//! Row types for sqlx mapping from SQLite tables.
//! The schema is defined in migrations/20261014000000_init.sql

use crate::error::{PersistenceError, PersistenceResult};
use chama_core::{
    from_cents, Contribution, Loan, LoanStatus, Member, MemberStatus, PhoneNumber, Repayment,
};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Row type for table `members`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct MemberRow {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub join_date: NaiveDateTime,
    pub status: String,
}

/// Row type for table `contributions`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ContributionRow {
    pub id: i64,
    pub member_id: i64,
    pub amount_cents: i64,
    pub date: NaiveDateTime,
    pub contribution_day: NaiveDate,
}

/// Row type for table `loans`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct LoanRow {
    pub id: i64,
    pub member_id: i64,
    pub principal_cents: i64,
    pub issued_at: NaiveDateTime,
    pub due_at: NaiveDateTime,
    pub interest_rate: String, // Decimal stored as TEXT
    pub balance_cents: i64,
    pub status: String,
}

/// Row type for table `repayments`
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct RepaymentRow {
    pub id: i64,
    pub loan_id: i64,
    pub amount_cents: i64,
    pub paid_at: NaiveDateTime,
}

// === Conversion implementations ===

impl TryFrom<MemberRow> for Member {
    type Error = PersistenceError;

    fn try_from(row: MemberRow) -> PersistenceResult<Self> {
        let status = MemberStatus::from_str(&row.status)
            .ok_or_else(|| PersistenceError::invalid_enum("members.status", &row.status))?;
        let phone = PhoneNumber::parse(&row.phone)
            .map_err(|e| PersistenceError::invalid_record("Member", e))?;

        Ok(Member {
            id: row.id,
            name: row.name,
            phone,
            join_date: row.join_date,
            status,
        })
    }
}

impl From<ContributionRow> for Contribution {
    fn from(row: ContributionRow) -> Self {
        Contribution {
            id: row.id,
            member_id: row.member_id,
            amount: from_cents(row.amount_cents),
            date: row.date,
        }
    }
}

impl TryFrom<LoanRow> for Loan {
    type Error = PersistenceError;

    fn try_from(row: LoanRow) -> PersistenceResult<Self> {
        let status = LoanStatus::from_str(&row.status)
            .ok_or_else(|| PersistenceError::invalid_enum("loans.status", &row.status))?;
        let interest_rate = Decimal::from_str(&row.interest_rate)
            .map_err(|e| PersistenceError::InvalidDecimal(format!("{}: {}", row.interest_rate, e)))?;

        Ok(Loan {
            id: row.id,
            member_id: row.member_id,
            principal: from_cents(row.principal_cents),
            issued_at: row.issued_at,
            due_at: row.due_at,
            interest_rate,
            balance: from_cents(row.balance_cents),
            status,
        })
    }
}

impl From<RepaymentRow> for Repayment {
    fn from(row: RepaymentRow) -> Self {
        Repayment {
            id: row.id,
            loan_id: row.loan_id,
            amount: from_cents(row.amount_cents),
            paid_at: row.paid_at,
        }
    }
}

/// Convert a batch of rows, failing on the first bad one
pub fn convert_all<R, T>(rows: Vec<R>) -> PersistenceResult<Vec<T>>
where
    T: TryFrom<R, Error = PersistenceError>,
{
    rows.into_iter().map(T::try_from).collect()
}

//! Loan eligibility rules
//!
//! Rules run in a fixed order and the first failure wins:
//!
//! 1. membership tenure
//! 2. no loan in ACTIVE or DEFAULTED
//! 3. individual exposure cap (multiple of own contributions)
//! 4. group solvency cap (outstanding plus request within group savings)
//!
//! The amount itself is validated by the caller before any rule runs.
//! [`evaluate`] reads everything through one connection, so inside a
//! transaction it sees a single snapshot.

use crate::error::{BusinessError, BusinessResult};
use chama_core::{from_cents, LendingPolicy, Loan, Member};
use chama_persistence::{convert_all, ContributionRepo, LoanRepo, MemberRepo};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::SqliteConnection;
use tracing::debug;

/// Figures the rules were checked against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eligibility {
    pub member: Member,
    pub member_contributions: Decimal,
    pub individual_cap: Decimal,
    pub group_contributions: Decimal,
    pub group_outstanding: Decimal,
}

/// Rule 1
pub fn check_tenure(
    member: &Member,
    policy: &LendingPolicy,
    now: NaiveDateTime,
) -> BusinessResult<()> {
    let eligible_from = now.checked_sub_signed(policy.min_tenure());
    if eligible_from.map_or(true, |cutoff| member.join_date > cutoff) {
        return Err(BusinessError::TenureTooShort {
            member_id: member.id,
            join_date: member.join_date,
            required_days: policy.min_tenure_days,
        });
    }
    Ok(())
}

/// Rule 2, on the member's loans
pub fn check_no_outstanding_loan(
    member_id: i64,
    loans: &[Loan],
    now: NaiveDateTime,
) -> BusinessResult<()> {
    if let Some(blocking) = loans.iter().find(|loan| loan.is_outstanding(now)) {
        return Err(BusinessError::OutstandingLoanExists {
            member_id,
            loan_id: blocking.id,
        });
    }
    Ok(())
}

/// Rule 3
pub fn check_individual_cap(
    amount: Decimal,
    member_contributions: Decimal,
    policy: &LendingPolicy,
) -> BusinessResult<Decimal> {
    let cap = policy.individual_cap(member_contributions);
    if amount > cap {
        return Err(BusinessError::ExceedsIndividualCap {
            requested: amount,
            cap,
        });
    }
    Ok(cap)
}

/// Rule 4
pub fn check_group_cap(
    amount: Decimal,
    group_outstanding: Decimal,
    group_contributions: Decimal,
) -> BusinessResult<()> {
    let would_be = group_outstanding + amount;
    if would_be > group_contributions {
        return Err(BusinessError::ExceedsGroupCap {
            would_be,
            ceiling: group_contributions,
        });
    }
    Ok(())
}

/// Run every rule for a positive, rounded `amount`.
pub async fn evaluate(
    conn: &mut SqliteConnection,
    policy: &LendingPolicy,
    member_id: i64,
    amount: Decimal,
    now: NaiveDateTime,
) -> BusinessResult<Eligibility> {
    let member = Member::try_from(MemberRepo::get_by_id(&mut *conn, member_id).await?)?;
    check_tenure(&member, policy, now)?;

    let loans: Vec<Loan> = convert_all(LoanRepo::get_outstanding_for_member(&mut *conn, member_id).await?)?;
    check_no_outstanding_loan(member_id, &loans, now)?;

    let member_contributions =
        from_cents(ContributionRepo::total_for_member(&mut *conn, member_id).await?);
    let individual_cap = check_individual_cap(amount, member_contributions, policy)?;

    let group_contributions = from_cents(ContributionRepo::total_all(&mut *conn).await?);
    let group_outstanding = from_cents(LoanRepo::outstanding_total(&mut *conn).await?);
    check_group_cap(amount, group_outstanding, group_contributions)?;

    debug!(
        member_id,
        amount = %amount,
        individual_cap = %individual_cap,
        group_contributions = %group_contributions,
        group_outstanding = %group_outstanding,
        "Loan request eligible"
    );

    Ok(Eligibility {
        member,
        member_contributions,
        individual_cap,
        group_contributions,
        group_outstanding,
    })
}

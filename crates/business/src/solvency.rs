//! Group solvency - aggregates across every member
//!
//! Read-only. Outstanding means ACTIVE or DEFAULTED; arrears means a
//! loan whose effective status is DEFAULTED.

use crate::error::BusinessResult;
use crate::services::ServiceContext;
use chama_core::{from_cents, Loan, LoanStatus, Member};
use chama_persistence::{convert_all, ContributionRepo, LoanRepo, MemberRepo};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// A member holding a defaulted loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrearsEntry {
    pub member_id: i64,
    pub member_name: String,
    pub phone: String,
    pub loan_id: i64,
    pub balance: Decimal,
    pub due_at: NaiveDateTime,
    pub days_overdue: i64,
}

/// Loan counts by effective status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoanCounts {
    pub active: i64,
    pub paid: i64,
    pub defaulted: i64,
}

impl LoanCounts {
    fn tally(loans: &[Loan]) -> Self {
        let mut counts = Self::default();
        for loan in loans {
            match loan.status {
                LoanStatus::Active => counts.active += 1,
                LoanStatus::Paid => counts.paid += 1,
                LoanStatus::Defaulted => counts.defaulted += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> i64 {
        self.active + self.paid + self.defaulted
    }
}

/// Group-wide position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub as_of: NaiveDateTime,
    pub member_count: i64,
    pub contribution_total: Decimal,
    pub outstanding_total: Decimal,
    /// `contribution_total - outstanding_total`, never below zero
    pub lending_headroom: Decimal,
    pub loans: LoanCounts,
}

/// Solvency Service
pub struct SolvencyService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SolvencyService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Sum of all contributions
    pub async fn group_contribution_total(&self) -> BusinessResult<Decimal> {
        let cents = ContributionRepo::total_all(self.ctx.pool()).await?;
        Ok(from_cents(cents))
    }

    /// Sum of balances over ACTIVE and DEFAULTED loans
    pub async fn group_outstanding_total(&self) -> BusinessResult<Decimal> {
        let cents = LoanRepo::outstanding_total(self.ctx.pool()).await?;
        Ok(from_cents(cents))
    }

    /// Members holding a defaulted loan, by loan ID
    pub async fn members_in_arrears(&self) -> BusinessResult<Vec<ArrearsEntry>> {
        let now = self.ctx.now();
        let loans: Vec<Loan> = convert_all(LoanRepo::get_outstanding(self.ctx.pool()).await?)?;
        let members: Vec<Member> = convert_all(MemberRepo::get_all(self.ctx.pool()).await?)?;
        let members: HashMap<i64, Member> = members.into_iter().map(|m| (m.id, m)).collect();

        let entries: Vec<ArrearsEntry> = loans
            .into_iter()
            .map(|loan| loan.as_of(now))
            .filter(|loan| loan.status == LoanStatus::Defaulted)
            .filter_map(|loan| {
                let member = members.get(&loan.member_id)?;
                Some(ArrearsEntry {
                    member_id: member.id,
                    member_name: member.name.clone(),
                    phone: member.phone.to_string(),
                    loan_id: loan.id,
                    balance: loan.balance,
                    due_at: loan.due_at,
                    days_overdue: (now - loan.due_at).num_days().max(0),
                })
            })
            .collect();

        debug!(count = entries.len(), "Arrears computed");
        Ok(entries)
    }

    pub async fn group_summary(&self) -> BusinessResult<GroupSummary> {
        let now = self.ctx.now();
        let contribution_total = self.group_contribution_total().await?;
        let outstanding_total = self.group_outstanding_total().await?;
        let member_count = MemberRepo::count(self.ctx.pool()).await?;

        let loans: Vec<Loan> = convert_all(LoanRepo::get_all(self.ctx.pool()).await?)?;
        let loans: Vec<Loan> = loans.into_iter().map(|loan| loan.as_of(now)).collect();

        Ok(GroupSummary {
            as_of: now,
            member_count,
            contribution_total,
            outstanding_total,
            lending_headroom: (contribution_total - outstanding_total).max(Decimal::ZERO),
            loans: LoanCounts::tally(&loans),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{member_joined_days_ago, test_context};
    use crate::{ContributionService, LoanService};
    use chama_core::LoanPlan;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_empty_group() {
        let (ctx, _clock) = test_context().await;
        let summary = SolvencyService::new(&ctx).group_summary().await.unwrap();
        assert_eq!(summary.member_count, 0);
        assert_eq!(summary.contribution_total, Decimal::ZERO);
        assert_eq!(summary.lending_headroom, Decimal::ZERO);
        assert_eq!(summary.loans.total(), 0);
    }

    #[tokio::test]
    async fn test_totals_and_arrears() {
        let (ctx, clock) = test_context().await;
        let a = member_joined_days_ago(&ctx, "Kamau", "0711000001", 90).await;
        let b = member_joined_days_ago(&ctx, "Njoki", "0711000002", 90).await;
        let contributions = ContributionService::new(&ctx);
        contributions.record(a.id, dec!(1000)).await.unwrap();
        contributions.record(b.id, dec!(1000)).await.unwrap();

        let loans = LoanService::new(&ctx);
        let short = loans.issue(a.id, dec!(500), LoanPlan::OneMonth).await.unwrap();
        let long = loans.issue(b.id, dec!(500), LoanPlan::SixMonths).await.unwrap();
        loans.repay(long.id, dec!(20)).await.unwrap();

        let solvency = SolvencyService::new(&ctx);
        assert_eq!(solvency.group_contribution_total().await.unwrap(), dec!(2000));
        // 510 + (520 - 20)
        assert_eq!(solvency.group_outstanding_total().await.unwrap(), dec!(1010));
        assert!(solvency.members_in_arrears().await.unwrap().is_empty());

        clock.advance(Duration::days(35));
        let arrears = solvency.members_in_arrears().await.unwrap();
        assert_eq!(arrears.len(), 1);
        assert_eq!(arrears[0].member_id, a.id);
        assert_eq!(arrears[0].loan_id, short.id);
        assert_eq!(arrears[0].balance, dec!(510));
        assert_eq!(arrears[0].days_overdue, 5);

        let summary = solvency.group_summary().await.unwrap();
        assert_eq!(summary.member_count, 2);
        assert_eq!(summary.lending_headroom, dec!(990));
        assert_eq!(summary.loans, LoanCounts { active: 1, paid: 0, defaulted: 1 });
    }
}

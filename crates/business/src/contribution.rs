//! Contribution aggregator
//!
//! Records savings with same-day merge and sums them per member.

use crate::error::BusinessResult;
use crate::services::{ContributionReceipt, ServiceContext};
use chama_core::{from_cents, to_cents, Contribution, CoreError, NewContribution, MAX_AMOUNT};
use chama_persistence::{ContributionRepo, MemberRepo, PersistenceError};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Contribution Service
pub struct ContributionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ContributionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a contribution dated now.
    ///
    /// A second contribution on the same local calendar day increases the
    /// existing record instead of creating another one. A day's total is
    /// bounded by [`MAX_AMOUNT`] like any single amount.
    pub async fn record(&self, member_id: i64, amount: Decimal) -> BusinessResult<ContributionReceipt> {
        let contribution = NewContribution::new(member_id, amount, self.ctx.now())?;

        MemberRepo::get_by_id(self.ctx.pool(), member_id).await?;
        let (row, merged) =
            ContributionRepo::upsert_for_day(self.ctx.pool(), &contribution, to_cents(MAX_AMOUNT)?)
                .await?
                .ok_or_else(|| {
                    CoreError::InvalidAmount(format!(
                        "Contribution {} would take the day's total above {}",
                        contribution.amount, MAX_AMOUNT
                    ))
                })?;
        let recorded: Contribution = row.into();

        info!(
            member_id,
            contribution_id = recorded.id,
            amount = %contribution.amount,
            day_total = %recorded.amount,
            merged,
            "Contribution recorded"
        );

        Ok(ContributionReceipt {
            contribution: recorded,
            amount: contribution.amount,
            merged,
        })
    }

    /// All-time total for a member; zero when there are none
    pub async fn total_for_member(&self, member_id: i64) -> BusinessResult<Decimal> {
        let cents = ContributionRepo::total_for_member(self.ctx.pool(), member_id).await?;
        debug!(member_id, cents, "Member contribution total");
        Ok(from_cents(cents))
    }

    pub async fn get(&self, contribution_id: i64) -> BusinessResult<Contribution> {
        let row = ContributionRepo::get_by_id(self.ctx.pool(), contribution_id).await?;
        Ok(row.into())
    }

    /// A member's contributions, oldest first
    pub async fn list_for_member(&self, member_id: i64) -> BusinessResult<Vec<Contribution>> {
        MemberRepo::get_by_id(self.ctx.pool(), member_id).await?;
        let rows = ContributionRepo::get_by_member(self.ctx.pool(), member_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_all(&self) -> BusinessResult<Vec<Contribution>> {
        let rows = ContributionRepo::get_all(self.ctx.pool()).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Admin delete. Lowers the group ceiling, so it waits for issuance.
    pub async fn delete(&self, contribution_id: i64) -> BusinessResult<Contribution> {
        let _ledger = self.ctx.lock_ledger().await;
        let mut tx = self.ctx.pool().begin().await.map_err(PersistenceError::from)?;

        let contribution: Contribution =
            ContributionRepo::get_by_id(&mut *tx, contribution_id).await?.into();
        ContributionRepo::delete(&mut *tx, contribution_id).await?;
        tx.commit().await.map_err(PersistenceError::from)?;

        info!(
            contribution_id,
            member_id = contribution.member_id,
            amount = %contribution.amount,
            "Contribution deleted"
        );
        Ok(contribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::testing::{member_joined_days_ago, test_context};
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_non_positive_amounts_persist_nothing() {
        let (ctx, _clock) = test_context().await;
        let member = member_joined_days_ago(&ctx, "Wanjiru", "0712345678", 0).await;
        let service = ContributionService::new(&ctx);

        for amount in [dec!(0), dec!(-5), dec!(0.001)] {
            let err = service.record(member.id, amount).await.unwrap_err();
            assert_eq!(err.kind(), FailureKind::InvalidAmount);
        }
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_amounts_are_rejected() {
        let (ctx, _clock) = test_context().await;
        let member = member_joined_days_ago(&ctx, "Wanjiru", "0712345678", 0).await;
        let service = ContributionService::new(&ctx);

        let err = service.record(member.id, Decimal::MAX).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidAmount);
        assert!(service.list_all().await.unwrap().is_empty());

        let receipt = service.record(member.id, MAX_AMOUNT).await.unwrap();
        let err = service.record(member.id, dec!(0.01)).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidAmount);
        assert_eq!(
            service.get(receipt.contribution.id).await.unwrap().amount,
            MAX_AMOUNT
        );
    }

    #[tokio::test]
    async fn test_unknown_member_is_not_found() {
        let (ctx, _clock) = test_context().await;
        let err = ContributionService::new(&ctx)
            .record(99, dec!(100))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotFound);
    }

    #[tokio::test]
    async fn test_same_day_contributions_merge() {
        let (ctx, clock) = test_context().await;
        let member = member_joined_days_ago(&ctx, "Wanjiru", "0712345678", 0).await;
        let service = ContributionService::new(&ctx);

        let first = service.record(member.id, dec!(100)).await.unwrap();
        clock.advance(Duration::hours(3));
        let second = service.record(member.id, dec!(50)).await.unwrap();

        assert!(!first.merged);
        assert!(second.merged);
        assert_eq!(second.contribution.id, first.contribution.id);
        assert_eq!(second.contribution.amount, dec!(150.00));
        assert_eq!(second.amount, dec!(50.00));

        let all = service.list_for_member(member.id).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].amount, dec!(150.00));
    }

    #[tokio::test]
    async fn test_next_day_creates_new_record() {
        let (ctx, clock) = test_context().await;
        let member = member_joined_days_ago(&ctx, "Wanjiru", "0712345678", 0).await;
        let service = ContributionService::new(&ctx);

        service.record(member.id, dec!(100)).await.unwrap();
        clock.advance(Duration::days(1));
        let next = service.record(member.id, dec!(25.50)).await.unwrap();
        assert!(!next.merged);

        assert_eq!(service.list_for_member(member.id).await.unwrap().len(), 2);
        assert_eq!(service.total_for_member(member.id).await.unwrap(), dec!(125.50));
    }

    #[tokio::test]
    async fn test_total_is_idempotent_and_zero_without_records() {
        let (ctx, _clock) = test_context().await;
        let member = member_joined_days_ago(&ctx, "Wanjiru", "0712345678", 0).await;
        let service = ContributionService::new(&ctx);

        assert_eq!(service.total_for_member(member.id).await.unwrap(), Decimal::ZERO);
        service.record(member.id, dec!(1000)).await.unwrap();

        let a = service.total_for_member(member.id).await.unwrap();
        let b = service.total_for_member(member.id).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a, dec!(1000));
    }

    #[tokio::test]
    async fn test_delete_contribution() {
        let (ctx, _clock) = test_context().await;
        let member = member_joined_days_ago(&ctx, "Wanjiru", "0712345678", 0).await;
        let service = ContributionService::new(&ctx);

        let receipt = service.record(member.id, dec!(100)).await.unwrap();
        let deleted = service.delete(receipt.contribution.id).await.unwrap();
        assert_eq!(deleted.amount, dec!(100));
        assert!(service.get(receipt.contribution.id).await.unwrap_err().is_not_found());
        assert!(service.delete(receipt.contribution.id).await.unwrap_err().is_not_found());
    }
}

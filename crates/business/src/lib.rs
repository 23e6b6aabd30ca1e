//! # Chama Business
//!
//! Business logic layer - members, contributions, loan eligibility,
//! the loan lifecycle and group solvency.
//!
//! ```rust,ignore
//! let ctx = ServiceContext::new(&db);
//! ContributionService::new(&ctx).record(member_id, dec!(500)).await?;
//! let loan = LoanService::new(&ctx).issue(member_id, dec!(1000), LoanPlan::OneMonth).await?;
//! ```

pub mod contribution;
pub mod eligibility;
pub mod error;
pub mod loan;
pub mod member;
pub mod services;
pub mod solvency;

pub use contribution::ContributionService;
pub use eligibility::Eligibility;
pub use error::{BusinessError, BusinessResult, FailureKind};
pub use loan::LoanService;
pub use member::MemberService;
pub use services::{ContributionReceipt, LoanDeletion, RepaymentReceipt, ServiceContext};
pub use solvency::{ArrearsEntry, GroupSummary, LoanCounts, SolvencyService};

#[cfg(test)]
pub(crate) mod testing {
    use crate::{ContributionService, MemberService, ServiceContext};
    use chama_core::{FixedClock, LendingPolicy, Member};
    use chama_persistence::Database;
    use chrono::{Duration, NaiveDate};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    /// In-memory ledger with a pinned clock
    pub async fn test_context() -> (ServiceContext, Arc<FixedClock>) {
        let db = Database::in_memory().await.unwrap();
        let now = NaiveDate::from_ymd_opt(2026, 5, 4)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let clock = Arc::new(FixedClock::new(now));
        let ctx = ServiceContext::from_parts(db.pool().clone(), clock.clone(), LendingPolicy::default());
        (ctx, clock)
    }

    pub async fn member_joined_days_ago(
        ctx: &ServiceContext,
        name: &str,
        phone: &str,
        days: i64,
    ) -> Member {
        MemberService::new(ctx)
            .register_joined(name, phone, ctx.now() - Duration::days(days))
            .await
            .unwrap()
    }

    /// Savings from a member who never borrows
    pub async fn seed_group_savings(ctx: &ServiceContext, amount: Decimal) {
        let saver = member_joined_days_ago(ctx, "Group Saver", "0799000000", 365).await;
        ContributionService::new(ctx).record(saver.id, amount).await.unwrap();
    }
}

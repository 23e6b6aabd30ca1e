//! Service context and shared result types
//!
//! The context owns everything a service needs: the pool, the clock, the
//! lending policy and the locks that serialize ledger writers.

use chama_core::{Clock, Contribution, LendingPolicy, Loan, Repayment, RepaymentOutcome, SystemClock};
use chama_persistence::Database;
use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

/// Context for business operations
pub struct ServiceContext {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    policy: LendingPolicy,
    /// Held by writers that move the group ceiling or outstanding total
    ledger_lock: Mutex<()>,
    loan_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ServiceContext {
    /// Create new service context from database, using the system clock
    /// and the default lending policy
    pub fn new(db: &Database) -> Self {
        Self::from_parts(db.pool().clone(), Arc::new(SystemClock), LendingPolicy::default())
    }

    /// Create from pool, clock and policy directly
    pub fn from_parts(pool: SqlitePool, clock: Arc<dyn Clock>, policy: LendingPolicy) -> Self {
        Self {
            pool,
            clock,
            policy,
            ledger_lock: Mutex::new(()),
            loan_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_policy(mut self, policy: LendingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn policy(&self) -> &LendingPolicy {
        &self.policy
    }

    /// Current time, second precision
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Serialize with every other ledger writer
    pub async fn lock_ledger(&self) -> MutexGuard<'_, ()> {
        self.ledger_lock.lock().await
    }

    /// Serialize with other writers of the same loan
    pub async fn lock_loan(&self, loan_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.loan_locks.lock().await;
            locks
                .entry(loan_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Drop the lock entry of a deleted or paid-off loan
    pub(crate) async fn forget_loan(&self, loan_id: i64) {
        self.loan_locks.lock().await.remove(&loan_id);
    }

    #[cfg(test)]
    pub(crate) async fn tracked_loan_locks(&self) -> usize {
        self.loan_locks.lock().await.len()
    }
}

/// Result of recording a contribution
#[derive(Debug, Clone)]
pub struct ContributionReceipt {
    /// The day's record after the write
    pub contribution: Contribution,
    /// Amount added by this call
    pub amount: rust_decimal::Decimal,
    /// Whether an existing same-day record was increased
    pub merged: bool,
}

/// Result of applying a repayment
#[derive(Debug, Clone)]
pub struct RepaymentReceipt {
    pub repayment: Repayment,
    pub loan: Loan,
    pub outcome: RepaymentOutcome,
}

/// What an admin loan delete removed
#[derive(Debug, Clone)]
pub struct LoanDeletion {
    pub loan: Loan,
    pub repayments_removed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chama_core::FixedClock;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_context_uses_injected_clock() {
        let at = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let db = Database::in_memory().await.unwrap();
        let ctx = ServiceContext::new(&db).with_clock(Arc::new(FixedClock::new(at)));
        assert_eq!(ctx.now(), at);
        assert_eq!(ctx.policy().min_tenure_days, 60);
    }

    #[tokio::test]
    async fn test_loan_locks_are_per_loan() {
        let db = Database::in_memory().await.unwrap();
        let ctx = ServiceContext::new(&db);

        let first = ctx.lock_loan(1).await;
        // a different loan is not blocked
        let _second = ctx.lock_loan(2).await;
        drop(first);
        let _again = ctx.lock_loan(1).await;
    }
}

//! Repository implementations for SQLite
//!
//! CRUD operations for all tables. Every function takes any SQLite
//! executor, so callers can run it on the pool or inside a transaction.

use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::*;
use chama_core::{
    to_cents, LoanStatus, LoanTerms, MemberStatus, NewContribution, NewMember, NewRepayment,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{SqliteExecutor, SqlitePool};
use std::str::FromStr;

fn cents(amount: rust_decimal::Decimal) -> PersistenceResult<i64> {
    to_cents(amount).map_err(|e| PersistenceError::InvalidDecimal(e.to_string()))
}

// ============================================================================
// Member Repository
// ============================================================================

/// Repository for the members table
pub struct MemberRepo;

impl MemberRepo {
    /// Get member by ID
    pub async fn get_by_id<'e, E>(executor: E, id: i64) -> PersistenceResult<MemberRow>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, MemberRow>("SELECT * FROM members WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Member", id))
    }

    /// Find member by canonical phone number
    pub async fn find_by_phone<'e, E>(executor: E, phone: &str) -> PersistenceResult<Option<MemberRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let row = sqlx::query_as::<_, MemberRow>("SELECT * FROM members WHERE phone = ?")
            .bind(phone)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Get all members
    pub async fn get_all<'e, E>(executor: E) -> PersistenceResult<Vec<MemberRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, MemberRow>("SELECT * FROM members ORDER BY id")
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    /// Get members by status
    pub async fn get_by_status<'e, E>(
        executor: E,
        status: MemberStatus,
    ) -> PersistenceResult<Vec<MemberRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows =
            sqlx::query_as::<_, MemberRow>("SELECT * FROM members WHERE status = ? ORDER BY id")
                .bind(status.as_str())
                .fetch_all(executor)
                .await?;
        Ok(rows)
    }

    /// Insert new member, returning the stored row
    pub async fn insert<'e, E>(executor: E, member: &NewMember) -> PersistenceResult<MemberRow>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, MemberRow>(
            "INSERT INTO members (name, phone, join_date, status) VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(&member.name)
        .bind(member.phone.as_str())
        .bind(member.join_date)
        .bind(member.status.as_str())
        .fetch_one(executor)
        .await
        .map_err(PersistenceError::classify)
    }

    /// Update status
    pub async fn update_status<'e, E>(
        executor: E,
        id: i64,
        status: MemberStatus,
    ) -> PersistenceResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("UPDATE members SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Member", id));
        }
        Ok(())
    }

    /// Delete member
    pub async fn delete<'e, E>(executor: E, id: i64) -> PersistenceResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await
            .map_err(PersistenceError::classify)?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Member", id));
        }
        Ok(())
    }

    /// Count members
    pub async fn count<'e, E>(executor: E) -> PersistenceResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM members")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Contribution Repository
// ============================================================================

/// Repository for the contributions table
pub struct ContributionRepo;

impl ContributionRepo {
    /// Add to the member's record for the contribution's day, or create it.
    ///
    /// One statement keyed by `(member_id, contribution_day)`. Returns the
    /// resulting row and whether an existing row was merged into, or `None`
    /// when the merged day total would pass `max_day_cents`.
    pub async fn upsert_for_day<'e, E>(
        executor: E,
        contribution: &NewContribution,
        max_day_cents: i64,
    ) -> PersistenceResult<Option<(ContributionRow, bool)>>
    where
        E: SqliteExecutor<'e>,
    {
        let amount_cents = cents(contribution.amount)?;
        let row = sqlx::query_as::<_, ContributionRow>(
            r#"
            INSERT INTO contributions (member_id, amount_cents, date, contribution_day)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(member_id, contribution_day) DO UPDATE SET
                amount_cents = contributions.amount_cents + excluded.amount_cents
            WHERE contributions.amount_cents <= ? - excluded.amount_cents
            RETURNING *
            "#,
        )
        .bind(contribution.member_id)
        .bind(amount_cents)
        .bind(contribution.date)
        .bind(contribution.day())
        .bind(max_day_cents)
        .fetch_optional(executor)
        .await
        .map_err(PersistenceError::classify)?;

        // amounts are positive, so a merged row is strictly larger
        Ok(row.map(|row| {
            let merged = row.amount_cents > amount_cents;
            (row, merged)
        }))
    }

    /// Get contribution by ID
    pub async fn get_by_id<'e, E>(executor: E, id: i64) -> PersistenceResult<ContributionRow>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, ContributionRow>("SELECT * FROM contributions WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Contribution", id))
    }

    /// Get contributions of a member, oldest first
    pub async fn get_by_member<'e, E>(
        executor: E,
        member_id: i64,
    ) -> PersistenceResult<Vec<ContributionRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, ContributionRow>(
            "SELECT * FROM contributions WHERE member_id = ? ORDER BY date, id",
        )
        .bind(member_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Get all contributions
    pub async fn get_all<'e, E>(executor: E) -> PersistenceResult<Vec<ContributionRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows =
            sqlx::query_as::<_, ContributionRow>("SELECT * FROM contributions ORDER BY date, id")
                .fetch_all(executor)
                .await?;
        Ok(rows)
    }

    /// Sum of a member's contributions in cents; 0 when there are none
    pub async fn total_for_member<'e, E>(executor: E, member_id: i64) -> PersistenceResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM contributions WHERE member_id = ?",
        )
        .bind(member_id)
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }

    /// Sum of all contributions in cents
    pub async fn total_all<'e, E>(executor: E) -> PersistenceResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COALESCE(SUM(amount_cents), 0) FROM contributions")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }

    /// Count a member's contributions
    pub async fn count_for_member<'e, E>(executor: E, member_id: i64) -> PersistenceResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contributions WHERE member_id = ?")
            .bind(member_id)
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }

    /// Count all contributions
    pub async fn count<'e, E>(executor: E) -> PersistenceResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contributions")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }

    /// Delete contribution
    pub async fn delete<'e, E>(executor: E, id: i64) -> PersistenceResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM contributions WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Contribution", id));
        }
        Ok(())
    }
}

// ============================================================================
// Loan Repository
// ============================================================================

/// Repository for the loans table
pub struct LoanRepo;

impl LoanRepo {
    /// Insert an ACTIVE loan with the given terms
    pub async fn insert<'e, E>(executor: E, terms: &LoanTerms) -> PersistenceResult<LoanRow>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, LoanRow>(
            r#"
            INSERT INTO loans (member_id, principal_cents, issued_at, due_at, interest_rate, balance_cents, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(terms.member_id)
        .bind(cents(terms.principal)?)
        .bind(terms.issued_at)
        .bind(terms.due_at)
        .bind(terms.interest_rate.to_string())
        .bind(cents(terms.balance)?)
        .bind(LoanStatus::Active.as_str())
        .fetch_one(executor)
        .await
        .map_err(PersistenceError::classify)
    }

    /// Get loan by ID
    pub async fn get_by_id<'e, E>(executor: E, id: i64) -> PersistenceResult<LoanRow>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, LoanRow>("SELECT * FROM loans WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Loan", id))
    }

    /// Get loans of a member, oldest first
    pub async fn get_by_member<'e, E>(executor: E, member_id: i64) -> PersistenceResult<Vec<LoanRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, LoanRow>(
            "SELECT * FROM loans WHERE member_id = ? ORDER BY issued_at, id",
        )
        .bind(member_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Get loans stored as ACTIVE or DEFAULTED
    pub async fn get_outstanding<'e, E>(executor: E) -> PersistenceResult<Vec<LoanRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, LoanRow>(
            "SELECT * FROM loans WHERE status IN ('ACTIVE', 'DEFAULTED') ORDER BY id",
        )
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Get a member's ACTIVE or DEFAULTED loans
    pub async fn get_outstanding_for_member<'e, E>(
        executor: E,
        member_id: i64,
    ) -> PersistenceResult<Vec<LoanRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, LoanRow>(
            "SELECT * FROM loans WHERE member_id = ? AND status IN ('ACTIVE', 'DEFAULTED') ORDER BY id",
        )
        .bind(member_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Sum of balances on ACTIVE or DEFAULTED loans in cents
    pub async fn outstanding_total<'e, E>(executor: E) -> PersistenceResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(balance_cents), 0) FROM loans WHERE status IN ('ACTIVE', 'DEFAULTED')",
        )
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }

    /// Get all loans
    pub async fn get_all<'e, E>(executor: E) -> PersistenceResult<Vec<LoanRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, LoanRow>("SELECT * FROM loans ORDER BY id")
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    /// Compare-and-swap the balance and status.
    ///
    /// Only applies when the stored balance still equals `expected_cents`;
    /// otherwise another writer got there first and `StaleWrite` is returned.
    pub async fn update_balance<'e, E>(
        executor: E,
        id: i64,
        expected_cents: i64,
        balance_cents: i64,
        status: LoanStatus,
    ) -> PersistenceResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE loans SET balance_cents = ?, status = ? WHERE id = ? AND balance_cents = ?",
        )
        .bind(balance_cents)
        .bind(status.as_str())
        .bind(id)
        .bind(expected_cents)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::stale_write("Loan", id));
        }
        Ok(())
    }

    /// Count a member's loans
    pub async fn count_for_member<'e, E>(executor: E, member_id: i64) -> PersistenceResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM loans WHERE member_id = ?")
            .bind(member_id)
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }

    /// Count all loans
    pub async fn count<'e, E>(executor: E) -> PersistenceResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM loans")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }

    /// Delete loan
    pub async fn delete<'e, E>(executor: E, id: i64) -> PersistenceResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM loans WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await
            .map_err(PersistenceError::classify)?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Loan", id));
        }
        Ok(())
    }
}

// ============================================================================
// Repayment Repository
// ============================================================================

/// Repository for the repayments table
pub struct RepaymentRepo;

impl RepaymentRepo {
    /// Insert repayment
    pub async fn insert<'e, E>(executor: E, repayment: &NewRepayment) -> PersistenceResult<RepaymentRow>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, RepaymentRow>(
            "INSERT INTO repayments (loan_id, amount_cents, paid_at) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(repayment.loan_id)
        .bind(cents(repayment.amount)?)
        .bind(repayment.paid_at)
        .fetch_one(executor)
        .await
        .map_err(PersistenceError::classify)
    }

    /// Get repayments of a loan, oldest first
    pub async fn get_by_loan<'e, E>(executor: E, loan_id: i64) -> PersistenceResult<Vec<RepaymentRow>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, RepaymentRow>(
            "SELECT * FROM repayments WHERE loan_id = ? ORDER BY paid_at, id",
        )
        .bind(loan_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    /// Count all repayments
    pub async fn count<'e, E>(executor: E) -> PersistenceResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM repayments")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }

    /// Delete every repayment of a loan, returning how many were removed
    pub async fn delete_by_loan<'e, E>(executor: E, loan_id: i64) -> PersistenceResult<u64>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM repayments WHERE loan_id = ?")
            .bind(loan_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

// ============================================================================
// Database initialization
// ============================================================================

/// Create a database connection pool
pub async fn create_pool(database_url: &str) -> PersistenceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.foreign_keys(true);
    let pool = SqlitePool::connect_with(options).await?;
    Ok(pool)
}

/// Run migrations
pub async fn run_migrations(pool: &SqlitePool) -> PersistenceResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// Create the database file if needed and apply the schema
pub async fn init_database(database_url: &str) -> PersistenceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePool::connect_with(options).await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Private in-memory database with the schema applied.
///
/// Held on a single connection that never expires, since every new
/// connection to `sqlite::memory:` is a fresh empty database.
pub async fn in_memory_database() -> PersistenceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chama_core::{LoanPlan, NewMember};
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal_macros::dec;

    const DAY_LIMIT: i64 = i64::MAX / 2;

    fn at(day: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 6, day)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    async fn pool_with_member() -> (SqlitePool, i64) {
        let pool = in_memory_database().await.unwrap();
        let member = NewMember::new("Njeri Kamau", "0711000111", at(1, 9)).unwrap();
        let row = MemberRepo::insert(&pool, &member).await.unwrap();
        (pool, row.id)
    }

    #[tokio::test]
    async fn test_member_roundtrip_and_phone_lookup() {
        let (pool, id) = pool_with_member().await;

        let row = MemberRepo::get_by_id(&pool, id).await.unwrap();
        assert_eq!(row.phone, "+254711000111");
        assert_eq!(row.status, "ACTIVE");

        let found = MemberRepo::find_by_phone(&pool, "+254711000111").await.unwrap();
        assert_eq!(found.map(|m| m.id), Some(id));
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_unique_violation() {
        let (pool, _) = pool_with_member().await;
        let twin = NewMember::new("Njeri Other", "+254711000111", at(2, 9)).unwrap();
        let err = MemberRepo::insert(&pool, &twin).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_same_day_upsert_merges() {
        let (pool, id) = pool_with_member().await;

        let morning = NewContribution::new(id, dec!(100), at(3, 8)).unwrap();
        let evening = NewContribution::new(id, dec!(50.50), at(3, 20)).unwrap();
        let next_day = NewContribution::new(id, dec!(10), at(4, 8)).unwrap();

        let (first, merged) = ContributionRepo::upsert_for_day(&pool, &morning, DAY_LIMIT)
            .await
            .unwrap()
            .unwrap();
        assert!(!merged);
        let (second, merged) = ContributionRepo::upsert_for_day(&pool, &evening, DAY_LIMIT)
            .await
            .unwrap()
            .unwrap();
        assert!(merged);
        assert_eq!(second.id, first.id);
        assert_eq!(second.amount_cents, 15_050);
        assert_eq!(second.date, at(3, 8));

        ContributionRepo::upsert_for_day(&pool, &next_day, DAY_LIMIT)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ContributionRepo::count_for_member(&pool, id).await.unwrap(), 2);
        assert_eq!(ContributionRepo::total_for_member(&pool, id).await.unwrap(), 16_050);
    }

    #[tokio::test]
    async fn test_same_day_upsert_respects_day_limit() {
        let (pool, id) = pool_with_member().await;
        let first = NewContribution::new(id, dec!(600), at(3, 8)).unwrap();
        let second = NewContribution::new(id, dec!(500), at(3, 9)).unwrap();

        ContributionRepo::upsert_for_day(&pool, &first, 100_000)
            .await
            .unwrap()
            .unwrap();
        let refused = ContributionRepo::upsert_for_day(&pool, &second, 100_000)
            .await
            .unwrap();
        assert!(refused.is_none());
        assert_eq!(ContributionRepo::total_for_member(&pool, id).await.unwrap(), 60_000);

        let (row, merged) = ContributionRepo::upsert_for_day(&pool, &second, 110_000)
            .await
            .unwrap()
            .unwrap();
        assert!(merged);
        assert_eq!(row.amount_cents, 110_000);
    }

    #[tokio::test]
    async fn test_contribution_for_missing_member_fails() {
        let pool = in_memory_database().await.unwrap();
        let orphan = NewContribution::new(99, dec!(100), at(3, 8)).unwrap();
        let err = ContributionRepo::upsert_for_day(&pool, &orphan, DAY_LIMIT)
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn test_loan_balance_compare_and_swap() {
        let (pool, id) = pool_with_member().await;
        let terms = LoanTerms::new(id, dec!(1000), LoanPlan::OneMonth, at(5, 9)).unwrap();
        let loan = LoanRepo::insert(&pool, &terms).await.unwrap();
        assert_eq!(loan.balance_cents, 102_000);
        assert_eq!(LoanRepo::outstanding_total(&pool).await.unwrap(), 102_000);

        LoanRepo::update_balance(&pool, loan.id, 102_000, 52_000, LoanStatus::Active)
            .await
            .unwrap();

        // stale expectation is refused
        let err = LoanRepo::update_balance(&pool, loan.id, 102_000, 0, LoanStatus::Paid)
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::StaleWrite { .. }));

        let row = LoanRepo::get_by_id(&pool, loan.id).await.unwrap();
        assert_eq!(row.balance_cents, 52_000);
    }

    #[tokio::test]
    async fn test_outstanding_excludes_paid() {
        let (pool, id) = pool_with_member().await;
        let terms = LoanTerms::new(id, dec!(100), LoanPlan::OneMonth, at(5, 9)).unwrap();
        let loan = LoanRepo::insert(&pool, &terms).await.unwrap();
        LoanRepo::update_balance(&pool, loan.id, loan.balance_cents, 0, LoanStatus::Paid)
            .await
            .unwrap();

        assert_eq!(LoanRepo::outstanding_total(&pool).await.unwrap(), 0);
        assert!(LoanRepo::get_outstanding(&pool).await.unwrap().is_empty());
        assert_eq!(LoanRepo::get_by_id(&pool, loan.id).await.unwrap().status, "PAID");
    }

    #[tokio::test]
    async fn test_repayments_by_loan() {
        let (pool, id) = pool_with_member().await;
        let terms = LoanTerms::new(id, dec!(100), LoanPlan::OneMonth, at(5, 9)).unwrap();
        let loan = LoanRepo::insert(&pool, &terms).await.unwrap();

        for h in [10, 11] {
            let repayment = NewRepayment::new(loan.id, dec!(10), at(6, h)).unwrap();
            RepaymentRepo::insert(&pool, &repayment).await.unwrap();
        }

        let rows = RepaymentRepo::get_by_loan(&pool, loan.id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(RepaymentRepo::delete_by_loan(&pool, loan.id).await.unwrap(), 2);
        LoanRepo::delete(&pool, loan.id).await.unwrap();
        assert_eq!(LoanRepo::count(&pool).await.unwrap(), 0);
    }
}

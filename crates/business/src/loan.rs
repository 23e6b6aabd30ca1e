//! Loan lifecycle - issuance, repayment, queries, admin delete
//!
//! Every loan returned from here carries its effective status: a stored
//! ACTIVE loan past due with money owed reads as DEFAULTED. Only a
//! repayment writes a new status back.

use crate::eligibility::{self, Eligibility};
use crate::error::{BusinessError, BusinessResult};
use crate::services::{LoanDeletion, RepaymentReceipt, ServiceContext};
use chama_core::{
    positive_amount, to_cents, Loan, LoanPlan, LoanStatus, LoanTerms, NewRepayment, Repayment,
};
use chama_persistence::{convert_all, LoanRepo, LoanRow, MemberRepo, PersistenceError, RepaymentRepo};
use rust_decimal::Decimal;
use tracing::{info, warn};

/// Loan Service
pub struct LoanService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LoanService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn to_loans(&self, rows: Vec<LoanRow>) -> BusinessResult<Vec<Loan>> {
        let now = self.ctx.now();
        let loans: Vec<Loan> = convert_all(rows)?;
        Ok(loans.into_iter().map(|loan| loan.as_of(now)).collect())
    }

    /// Issue a loan if every eligibility rule passes.
    ///
    /// Checks and insert share one transaction under the ledger lock, so
    /// the group cap is checked against the state the loan is added to.
    pub async fn issue(&self, member_id: i64, amount: Decimal, plan: LoanPlan) -> BusinessResult<Loan> {
        let amount = positive_amount(amount, "Loan amount")?;

        let _ledger = self.ctx.lock_ledger().await;
        let now = self.ctx.now();
        let mut tx = self.ctx.pool().begin().await.map_err(PersistenceError::from)?;

        let eligibility: Eligibility =
            match eligibility::evaluate(&mut *tx, self.ctx.policy(), member_id, amount, now).await {
                Ok(eligibility) => eligibility,
                Err(err) => {
                    warn!(member_id, amount = %amount, kind = %err.kind(), "Loan request rejected");
                    return Err(err);
                }
            };

        let terms = LoanTerms::new(eligibility.member.id, amount, plan, now)?;
        let row = LoanRepo::insert(&mut *tx, &terms).await?;
        tx.commit().await.map_err(PersistenceError::from)?;

        let loan = Loan::try_from(row)?;
        info!(
            loan_id = loan.id,
            member_id,
            principal = %loan.principal,
            balance = %loan.balance,
            plan = plan.code(),
            due = %loan.due_at,
            "Loan issued"
        );
        Ok(loan)
    }

    /// Apply a repayment and move the loan through its state machine.
    ///
    /// The repayment row and the balance update commit together. The
    /// update only lands if the balance is still the one read here.
    pub async fn repay(&self, loan_id: i64, amount: Decimal) -> BusinessResult<RepaymentReceipt> {
        let amount = positive_amount(amount, "Repayment")?;

        let _loan_guard = self.ctx.lock_loan(loan_id).await;
        let now = self.ctx.now();
        let mut tx = self.ctx.pool().begin().await.map_err(PersistenceError::from)?;

        let loan = Loan::try_from(LoanRepo::get_by_id(&mut *tx, loan_id).await?)?;
        let outcome = loan.apply_repayment(amount, now)?;

        let repayment = NewRepayment::new(loan_id, outcome.amount, now)?;
        let repayment: Repayment = RepaymentRepo::insert(&mut *tx, &repayment).await?.into();

        LoanRepo::update_balance(
            &mut *tx,
            loan_id,
            to_cents(loan.balance)?,
            to_cents(outcome.balance)?,
            outcome.status,
        )
        .await
        .map_err(|e| match e {
            PersistenceError::StaleWrite { .. } => BusinessError::ConcurrentModification(loan_id),
            other => other.into(),
        })?;
        tx.commit().await.map_err(PersistenceError::from)?;

        if outcome.status.is_terminal() {
            drop(_loan_guard);
            self.ctx.forget_loan(loan_id).await;
        }

        let loan = Loan {
            balance: outcome.balance,
            status: outcome.status,
            ..loan
        };
        info!(
            loan_id,
            repayment_id = repayment.id,
            amount = %outcome.amount,
            balance = %outcome.balance,
            from = outcome.previous_status.as_str(),
            to = outcome.status.as_str(),
            "Repayment applied"
        );
        Ok(RepaymentReceipt {
            repayment,
            loan,
            outcome,
        })
    }

    /// Get loan by ID
    pub async fn get(&self, loan_id: i64) -> BusinessResult<Loan> {
        let row = LoanRepo::get_by_id(self.ctx.pool(), loan_id).await?;
        Ok(Loan::try_from(row)?.as_of(self.ctx.now()))
    }

    pub async fn list(&self) -> BusinessResult<Vec<Loan>> {
        let rows = LoanRepo::get_all(self.ctx.pool()).await?;
        self.to_loans(rows)
    }

    /// A member's loans, oldest first
    pub async fn for_member(&self, member_id: i64) -> BusinessResult<Vec<Loan>> {
        MemberRepo::get_by_id(self.ctx.pool(), member_id).await?;
        let rows = LoanRepo::get_by_member(self.ctx.pool(), member_id).await?;
        self.to_loans(rows)
    }

    /// Loans whose effective status matches
    pub async fn by_status(&self, status: LoanStatus) -> BusinessResult<Vec<Loan>> {
        let loans = self.list().await?;
        Ok(loans.into_iter().filter(|loan| loan.status == status).collect())
    }

    pub async fn repayments(&self, loan_id: i64) -> BusinessResult<Vec<Repayment>> {
        LoanRepo::get_by_id(self.ctx.pool(), loan_id).await?;
        let rows = RepaymentRepo::get_by_loan(self.ctx.pool(), loan_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Admin delete of a loan together with its repayments
    pub async fn delete(&self, loan_id: i64) -> BusinessResult<LoanDeletion> {
        let _ledger = self.ctx.lock_ledger().await;
        let _loan_guard = self.ctx.lock_loan(loan_id).await;
        let mut tx = self.ctx.pool().begin().await.map_err(PersistenceError::from)?;

        let loan = Loan::try_from(LoanRepo::get_by_id(&mut *tx, loan_id).await?)?;
        let repayments_removed = RepaymentRepo::delete_by_loan(&mut *tx, loan_id).await?;
        LoanRepo::delete(&mut *tx, loan_id).await?;
        tx.commit().await.map_err(PersistenceError::from)?;

        drop(_loan_guard);
        self.ctx.forget_loan(loan_id).await;

        info!(loan_id, member_id = loan.member_id, repayments_removed, "Loan deleted");
        Ok(LoanDeletion {
            loan: loan.as_of(self.ctx.now()),
            repayments_removed,
        })
    }
}

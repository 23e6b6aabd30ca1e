//! # Chama Core
//!
//! Domain types for a rotating savings group: members, contributions,
//! loans and repayments, plus the lending policy and the loan state machine.
//!
//! Nothing in this crate touches storage; the persistence and business
//! crates build on these types.

pub mod clock;
pub mod contribution;
pub mod error;
pub mod loan;
pub mod member;
pub mod money;
pub mod policy;
pub mod repayment;

pub use clock::{Clock, FixedClock, SystemClock};
pub use contribution::{Contribution, NewContribution};
pub use error::{CoreError, CoreResult};
pub use loan::{Loan, LoanPlan, LoanStatus, LoanTerms, RepaymentOutcome};
pub use member::{Member, MemberStatus, NewMember, PhoneNumber};
pub use money::{
    format_money, from_cents, positive_amount, round_money, to_cents, CURRENCY_CODE, MAX_AMOUNT,
};
pub use policy::LendingPolicy;
pub use repayment::{NewRepayment, Repayment};

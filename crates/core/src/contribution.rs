//! # Contribution Module
//!
//! A member's savings deposit. One record per member per calendar day;
//! a second deposit on the same day is added to that record.

use crate::error::CoreResult;
use crate::money::positive_amount;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated contribution, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContribution {
    pub member_id: i64,
    pub amount: Decimal,
    pub date: NaiveDateTime,
}

impl NewContribution {
    /// Factory: the amount must be positive, and is rounded to cents
    pub fn new(member_id: i64, amount: Decimal, date: NaiveDateTime) -> CoreResult<Self> {
        Ok(Self {
            member_id,
            amount: positive_amount(amount, "Contribution")?,
            date,
        })
    }

    /// Local calendar day the contribution is merged under
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}

/// A stored contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: i64,
    pub member_id: i64,
    pub amount: Decimal,
    pub date: NaiveDateTime,
}

impl Contribution {
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}

impl fmt::Display for Contribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Contribution #{} of {} by member #{} on {}",
            self.id, self.amount, self.member_id, self.date
        )
    }
}

/// Sum of contribution amounts; zero for an empty slice
pub fn total(contributions: &[Contribution]) -> Decimal {
    contributions.iter().map(|c| c.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use rust_decimal_macros::dec;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 4)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_contribution_validates_amount() {
        assert!(matches!(
            NewContribution::new(1, dec!(0), noon()),
            Err(CoreError::InvalidAmount(_))
        ));
        let c = NewContribution::new(1, dec!(250.555), noon()).unwrap();
        assert_eq!(c.amount, dec!(250.56));
        assert_eq!(c.day(), NaiveDate::from_ymd_opt(2026, 5, 4).unwrap());
    }

    #[test]
    fn test_total() {
        let rows = vec![
            Contribution { id: 1, member_id: 1, amount: dec!(100.25), date: noon() },
            Contribution { id: 2, member_id: 1, amount: dec!(899.75), date: noon() },
        ];
        assert_eq!(total(&rows), dec!(1000.00));
        assert_eq!(total(&[]), Decimal::ZERO);
    }
}

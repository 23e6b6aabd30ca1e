//! Lending policy with configurable limits
//!
//! Defaults are the group's constitution: 60 days of membership before a
//! first loan, and a loan of at most 3x the member's savings.

use crate::error::{CoreError, CoreResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Limits applied by the eligibility rules.
///
/// Every field can be overridden from a JSON file; missing fields keep
/// their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingPolicy {
    /// Days a member must have belonged to the group
    #[serde(default = "default_min_tenure_days")]
    pub min_tenure_days: i64,

    /// Loan principal ceiling as a multiple of the member's contributions
    #[serde(default = "default_exposure_multiple")]
    pub exposure_multiple: Decimal,
}

/// Longest tenure a policy may demand, about a century
pub const MAX_TENURE_DAYS: i64 = 36_500;

/// Largest exposure multiple a policy may grant
pub const MAX_EXPOSURE_MULTIPLE: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

fn default_min_tenure_days() -> i64 {
    60
}

fn default_exposure_multiple() -> Decimal {
    Decimal::new(3, 0)
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self {
            min_tenure_days: default_min_tenure_days(),
            exposure_multiple: default_exposure_multiple(),
        }
    }
}

impl LendingPolicy {
    /// Load and validate from a JSON file
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::InvalidPolicy(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> CoreResult<Self> {
        let policy: Self =
            serde_json::from_str(json).map_err(|e| CoreError::InvalidPolicy(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !(0..=MAX_TENURE_DAYS).contains(&self.min_tenure_days) {
            return Err(CoreError::InvalidPolicy(format!(
                "min_tenure_days must be between 0 and {}, got {}",
                MAX_TENURE_DAYS, self.min_tenure_days
            )));
        }
        if self.exposure_multiple <= Decimal::ZERO || self.exposure_multiple > MAX_EXPOSURE_MULTIPLE {
            return Err(CoreError::InvalidPolicy(format!(
                "exposure_multiple must be positive and at most {}, got {}",
                MAX_EXPOSURE_MULTIPLE, self.exposure_multiple
            )));
        }
        Ok(())
    }

    /// Minimum tenure as chrono Duration, saturating for unvalidated values
    pub fn min_tenure(&self) -> chrono::Duration {
        chrono::Duration::try_days(self.min_tenure_days).unwrap_or(chrono::Duration::MAX)
    }

    /// Ceiling on a single member's principal, saturating at `Decimal::MAX`
    pub fn individual_cap(&self, member_contributions: Decimal) -> Decimal {
        member_contributions
            .checked_mul(self.exposure_multiple)
            .unwrap_or(Decimal::MAX)
    }
}

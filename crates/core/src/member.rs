//! # Member Module
//!
//! Members of the group, their status, and phone number normalization.

use crate::error::{CoreError, CoreResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum display name length after trimming
pub const MIN_NAME_LEN: usize = 2;

/// Country prefix of canonical phone numbers
pub const PHONE_PREFIX: &str = "+254";

/// Membership status.
///
/// Set only through an explicit status change; it does not feed the
/// lending rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberStatus {
    Active,
    Inactive,
    Suspended,
}

impl MemberStatus {
    /// Code stored in the DB
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "ACTIVE",
            MemberStatus::Inactive => "INACTIVE",
            MemberStatus::Suspended => "SUSPENDED",
        }
    }

    /// Parse, case-insensitive
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Some(MemberStatus::Active),
            "INACTIVE" => Some(MemberStatus::Inactive),
            "SUSPENDED" => Some(MemberStatus::Suspended),
            _ => None,
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical Kenyan phone number, `+254` followed by nine digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalize user input.
    ///
    /// Accepts `+2547XXXXXXXX`, `07XXXXXXXX` and `7XXXXXXXX`.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let raw: String = input.trim().chars().filter(|c| !c.is_whitespace()).collect();

        let subscriber = if let Some(rest) = raw.strip_prefix(PHONE_PREFIX) {
            rest
        } else if let Some(rest) = raw.strip_prefix('0') {
            rest
        } else if raw.starts_with('7') {
            raw.as_str()
        } else {
            return Err(CoreError::InvalidPhone(format!(
                "{} (expected +254…, 07… or 7…)",
                input.trim()
            )));
        };

        if subscriber.len() != 9 || !subscriber.chars().all(|c| c.is_ascii_digit()) {
            return Err(CoreError::InvalidPhone(format!(
                "{} (expected 9 digits after the country code)",
                input.trim()
            )));
        }
        if !raw.starts_with(PHONE_PREFIX) && !subscriber.starts_with('7') {
            return Err(CoreError::InvalidPhone(format!(
                "{} (local numbers start with 07)",
                input.trim()
            )));
        }

        Ok(Self(format!("{}{}", PHONE_PREFIX, subscriber)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated member data, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub phone: PhoneNumber,
    pub join_date: NaiveDateTime,
    pub status: MemberStatus,
}

impl NewMember {
    /// Factory: trims and validates the name, normalizes the phone.
    pub fn new(name: &str, phone: &str, join_date: NaiveDateTime) -> CoreResult<Self> {
        let name = name.trim();
        if name.chars().count() < MIN_NAME_LEN {
            return Err(CoreError::InvalidName(format!(
                "'{}' must be at least {} characters long",
                name, MIN_NAME_LEN
            )));
        }

        Ok(Self {
            name: name.to_string(),
            phone: PhoneNumber::parse(phone)?,
            join_date,
            status: MemberStatus::Active,
        })
    }

    pub fn with_status(mut self, status: MemberStatus) -> Self {
        self.status = status;
        self
    }
}

/// A stored member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub phone: PhoneNumber,
    pub join_date: NaiveDateTime,
    pub status: MemberStatus,
}

impl Member {
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    /// Whole days since joining
    pub fn tenure_days(&self, now: NaiveDateTime) -> i64 {
        (now - self.join_date).num_days()
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{} - {}, {})", self.name, self.id, self.phone, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn joined() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 10)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_member_status_str() {
        assert_eq!(MemberStatus::Suspended.as_str(), "SUSPENDED");
        assert_eq!(MemberStatus::from_str("inactive"), Some(MemberStatus::Inactive));
        assert_eq!(MemberStatus::from_str("gone"), None);
    }

    #[test]
    fn test_phone_normalization() {
        assert_eq!(PhoneNumber::parse("0712345678").unwrap().as_str(), "+254712345678");
        assert_eq!(PhoneNumber::parse("712345678").unwrap().as_str(), "+254712345678");
        assert_eq!(PhoneNumber::parse(" +254712345678 ").unwrap().as_str(), "+254712345678");
        assert_eq!(PhoneNumber::parse("0712 345 678").unwrap().as_str(), "+254712345678");
    }

    #[test]
    fn test_phone_rejects_bad_input() {
        for bad in ["", "12345", "0812345678", "07123", "+2547123456789", "07abcdefgh"] {
            assert!(
                matches!(PhoneNumber::parse(bad), Err(CoreError::InvalidPhone(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_new_member_trims_name() {
        let member = NewMember::new("  Wanjiku  ", "0712345678", joined()).unwrap();
        assert_eq!(member.name, "Wanjiku");
        assert_eq!(member.status, MemberStatus::Active);
    }

    #[test]
    fn test_new_member_rejects_short_name() {
        let err = NewMember::new(" A ", "0712345678", joined()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidName(_)));
    }

    #[test]
    fn test_tenure_days() {
        let member = Member {
            id: 1,
            name: "Otieno".to_string(),
            phone: PhoneNumber::parse("0712345678").unwrap(),
            join_date: joined(),
            status: MemberStatus::Active,
        };
        assert_eq!(member.tenure_days(joined() + chrono::Duration::days(61)), 61);
        assert_eq!(
            format!("{}", member),
            "Otieno (#1 - +254712345678, ACTIVE)"
        );
    }
}

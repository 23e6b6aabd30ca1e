//! Member management - registration, lookup, status, delete
//!
//! Phone numbers are normalized before every write and lookup, so the
//! uniqueness check always compares canonical forms.

use crate::error::{BusinessError, BusinessResult};
use crate::services::ServiceContext;
use chama_core::{Member, MemberStatus, NewMember, PhoneNumber};
use chama_persistence::{convert_all, ContributionRepo, LoanRepo, MemberRepo, PersistenceError};
use chrono::NaiveDateTime;
use tracing::{info, warn};

/// Member Service
pub struct MemberService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MemberService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a member joining now
    pub async fn register(&self, name: &str, phone: &str) -> BusinessResult<Member> {
        self.register_joined(name, phone, self.ctx.now()).await
    }

    /// Register a member with an explicit join date (backfilling records)
    pub async fn register_joined(
        &self,
        name: &str,
        phone: &str,
        join_date: NaiveDateTime,
    ) -> BusinessResult<Member> {
        let new_member = NewMember::new(name, phone, join_date)?;

        if MemberRepo::find_by_phone(self.ctx.pool(), new_member.phone.as_str())
            .await?
            .is_some()
        {
            return Err(BusinessError::DuplicatePhone(new_member.phone.to_string()));
        }

        // the unique index still decides if another writer raced us
        let row = MemberRepo::insert(self.ctx.pool(), &new_member)
            .await
            .map_err(|e| match e {
                PersistenceError::UniqueViolation(_) => {
                    BusinessError::DuplicatePhone(new_member.phone.to_string())
                }
                other => other.into(),
            })?;
        let member = Member::try_from(row)?;

        info!(member_id = member.id, phone = %member.phone, "Member registered");
        Ok(member)
    }

    /// Get member by ID
    pub async fn get(&self, member_id: i64) -> BusinessResult<Member> {
        let row = MemberRepo::get_by_id(self.ctx.pool(), member_id).await?;
        Ok(Member::try_from(row)?)
    }

    /// Find by phone in any accepted input format
    pub async fn find_by_phone(&self, phone: &str) -> BusinessResult<Option<Member>> {
        let phone = PhoneNumber::parse(phone)?;
        match MemberRepo::find_by_phone(self.ctx.pool(), phone.as_str()).await? {
            Some(row) => Ok(Some(Member::try_from(row)?)),
            None => Ok(None),
        }
    }

    /// All members, by ID
    pub async fn list(&self) -> BusinessResult<Vec<Member>> {
        let rows = MemberRepo::get_all(self.ctx.pool()).await?;
        Ok(convert_all(rows)?)
    }

    pub async fn list_active(&self) -> BusinessResult<Vec<Member>> {
        let rows = MemberRepo::get_by_status(self.ctx.pool(), MemberStatus::Active).await?;
        Ok(convert_all(rows)?)
    }

    /// Set status, returning the updated member
    pub async fn set_status(&self, member_id: i64, status: MemberStatus) -> BusinessResult<Member> {
        MemberRepo::update_status(self.ctx.pool(), member_id, status).await?;
        info!(member_id, status = status.as_str(), "Member status updated");
        self.get(member_id).await
    }

    /// Hard delete.
    ///
    /// Refused while the member still owns contributions or loans.
    pub async fn delete(&self, member_id: i64) -> BusinessResult<Member> {
        let _ledger = self.ctx.lock_ledger().await;
        let mut tx = self.ctx.pool().begin().await.map_err(PersistenceError::from)?;

        let member = Member::try_from(MemberRepo::get_by_id(&mut *tx, member_id).await?)?;
        let contributions = ContributionRepo::count_for_member(&mut *tx, member_id).await?;
        let loans = LoanRepo::count_for_member(&mut *tx, member_id).await?;
        if contributions > 0 || loans > 0 {
            warn!(member_id, contributions, loans, "Member delete refused");
            return Err(BusinessError::MemberHasDependents {
                member_id,
                contributions,
                loans,
            });
        }

        MemberRepo::delete(&mut *tx, member_id).await?;
        tx.commit().await.map_err(PersistenceError::from)?;

        info!(member_id, "Member deleted");
        Ok(member)
    }

    pub async fn count(&self) -> BusinessResult<i64> {
        Ok(MemberRepo::count(self.ctx.pool()).await?)
    }
}

use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    CreateMemberCmd, EngineError, Member, ResultEngine, UpdateMemberCmd, adjustments, members,
    mobile::normalize_mobile, purchases, sessions,
};

use super::{
    Engine, cas_update_member, expired_member_ids, normalize_optional_text,
    normalize_required_text, require_branch, require_member, with_tx,
};

/// Filters for listing members. All set fields are AND-combined.
#[derive(Clone, Debug, Default)]
pub struct MemberSearchFilter {
    /// Substring match against full name or mobile number.
    pub search: Option<String>,
    pub branch_id: Option<String>,
    /// Expiry state of the member's latest purchase, as of today.
    pub is_expired: Option<bool>,
}

impl Engine {
    /// Registers a new member keyed by their normalized mobile number.
    pub async fn create_member(&self, cmd: CreateMemberCmd) -> ResultEngine<Member> {
        let full_name = normalize_required_text(&cmd.full_name, "member name")?;
        let mobile = normalize_mobile(&cmd.mobile)?;
        let email = normalize_optional_text(cmd.email.as_deref());

        with_tx!(self, |db_tx| {
            let existing = members::Entity::find()
                .filter(members::Column::Mobile.eq(mobile.as_str()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(mobile));
            }
            if let Some(branch_id) = &cmd.branch_id {
                require_branch(&db_tx, branch_id).await?;
            }

            let member = Member::new(full_name, mobile, email, cmd.branch_id.clone(), Utc::now())?;
            members::ActiveModel::from(&member).insert(&db_tx).await?;
            Ok(member)
        })
    }

    /// Fetches a member by id.
    pub async fn member(&self, member_id: &str) -> ResultEngine<Member> {
        let model = require_member(&self.database, member_id).await?;
        Ok(Member::from(model))
    }

    /// Fetches a member by mobile number; the input is normalized first.
    pub async fn member_by_mobile(&self, mobile: &str) -> ResultEngine<Member> {
        let mobile = normalize_mobile(mobile)?;
        let model = members::Entity::find()
            .filter(members::Column::Mobile.eq(mobile.as_str()))
            .one(&self.database)
            .await?
            .ok_or(EngineError::MemberNotFound(mobile))?;
        Ok(Member::from(model))
    }

    /// Patches member fields; unset fields keep their current value.
    pub async fn update_member(
        &self,
        member_id: &str,
        cmd: UpdateMemberCmd,
    ) -> ResultEngine<Member> {
        with_tx!(self, |db_tx| {
            let member = require_member(&db_tx, member_id).await?;
            // `ActiveModelTrait` also has a `default`, so the plain call is
            // ambiguous.
            let mut patch = <members::ActiveModel as Default>::default();

            if let Some(full_name) = &cmd.full_name {
                patch.full_name =
                    ActiveValue::Set(normalize_required_text(full_name, "member name")?);
            }
            if let Some(mobile) = &cmd.mobile {
                let mobile = normalize_mobile(mobile)?;
                if mobile != member.mobile {
                    let taken = members::Entity::find()
                        .filter(members::Column::Mobile.eq(mobile.as_str()))
                        .filter(members::Column::Id.ne(member.id.as_str()))
                        .one(&db_tx)
                        .await?;
                    if taken.is_some() {
                        return Err(EngineError::ExistingKey(mobile));
                    }
                }
                patch.mobile = ActiveValue::Set(mobile);
            }
            if let Some(email) = &cmd.email {
                patch.email = ActiveValue::Set(normalize_optional_text(Some(email)));
            }
            if let Some(branch_id) = &cmd.branch_id {
                require_branch(&db_tx, branch_id).await?;
                patch.branch_id = ActiveValue::Set(Some(branch_id.clone()));
            }

            cas_update_member(&db_tx, &member, patch).await?;
            let updated = require_member(&db_tx, member_id).await?;
            Ok(Member::from(updated))
        })
    }

    /// Removes a member together with their purchase, session, and
    /// adjustment history.
    pub async fn delete_member(&self, member_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let member = require_member(&db_tx, member_id).await?;

            sessions::Entity::delete_many()
                .filter(sessions::Column::MemberId.eq(member.id.as_str()))
                .exec(&db_tx)
                .await?;
            purchases::Entity::delete_many()
                .filter(purchases::Column::MemberId.eq(member.id.as_str()))
                .exec(&db_tx)
                .await?;
            adjustments::Entity::delete_many()
                .filter(adjustments::Column::MemberId.eq(member.id.as_str()))
                .exec(&db_tx)
                .await?;
            members::Entity::delete_by_id(member.id.as_str())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Searches members, newest first. `page` is 1-indexed.
    ///
    /// Returns the page of members and the total match count.
    pub async fn search_members(
        &self,
        filter: &MemberSearchFilter,
        page: u64,
        page_size: u64,
    ) -> ResultEngine<(Vec<Member>, u64)> {
        let mut query = members::Entity::find().order_by_desc(members::Column::CreatedAt);

        if let Some(search) = filter.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            // A digits-only term is matched against the normalized mobile key.
            let mobile_term = if search.chars().all(|c| c.is_ascii_digit()) {
                normalize_mobile(search).unwrap_or_else(|_| search.to_string())
            } else {
                search.to_string()
            };
            query = query.filter(
                Condition::any()
                    .add(members::Column::FullName.contains(search))
                    .add(members::Column::Mobile.contains(&mobile_term)),
            );
        }
        if let Some(branch_id) = &filter.branch_id {
            query = query.filter(members::Column::BranchId.eq(branch_id.as_str()));
        }
        if let Some(is_expired) = filter.is_expired {
            let expired = expired_member_ids(Utc::now().date_naive());
            query = if is_expired {
                query.filter(members::Column::Id.in_subquery(expired))
            } else {
                query.filter(members::Column::Id.not_in_subquery(expired))
            };
        }

        let page_size = page_size.clamp(1, 200);
        let paginator = query.paginate(&self.database, page_size);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((models.into_iter().map(Member::from).collect(), total))
    }
}

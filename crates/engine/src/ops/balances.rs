use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
    TransactionTrait, Value, prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    AdjustBalanceCmd, BalanceAdjustment, EngineError, Hours, Member, ResultEngine, RolloverStatus,
    SessionStatus, adjustments, members, purchases, purchases::expiry_dates, sessions,
};

use super::{
    Engine, cas_update_member, expired_member_ids, expiring_member_ids, normalize_required_text,
    require_member, with_tx,
};

/// Window used for the dashboard's expiring-soon count.
const EXPIRING_SOON_DAYS: u64 = 30;

/// A member's real-time balance, computed fresh on every read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub granted: Hours,
    pub used: Hours,
    /// `granted - used`; may be negative after voids or corrections.
    pub balance: Hours,
    /// Whether the member's latest purchase has expired. A member with no
    /// purchase is never expired.
    pub is_expired: bool,
}

/// One row of the expiring-soon report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiringMember {
    pub member: Member,
    pub expiry_date: NaiveDate,
    pub days_left: i64,
}

/// Venue-wide counters for the admin dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_members: u64,
    pub active_members: u64,
    pub expired_members: u64,
    pub total_hours_granted: Hours,
    pub total_hours_used: Hours,
    pub total_balance: Hours,
    pub active_sessions: u64,
    pub members_expiring_soon: u64,
    pub pending_rollovers: u64,
}

impl Engine {
    /// Real-time balance for one member.
    ///
    /// The granted/used pair is read inside a transaction so the two totals
    /// always come from the same snapshot.
    pub async fn balance(&self, member_id: &str) -> ResultEngine<BalanceSummary> {
        with_tx!(self, |db_tx| {
            let member = require_member(&db_tx, member_id).await?;
            let latest = purchases::Entity::find()
                .filter(purchases::Column::MemberId.eq(member.id.as_str()))
                .order_by_desc(purchases::Column::PurchaseDate)
                .one(&db_tx)
                .await?;

            let is_expired = latest
                .is_some_and(|p| Utc::now().date_naive() > expiry_dates(p.purchase_date).0);
            let granted = Hours::new(member.total_hours_granted_centi);
            let used = Hours::new(member.total_hours_used_centi);
            Ok(BalanceSummary {
                granted,
                used,
                balance: granted - used,
                is_expired,
            })
        })
    }

    /// Applies a manual, audited balance adjustment.
    ///
    /// The delta goes straight into the used-hours total; a negative delta
    /// grants hours. Every call writes exactly one audit row, including a
    /// zero-delta call.
    pub async fn adjust_balance(&self, cmd: AdjustBalanceCmd) -> ResultEngine<BalanceAdjustment> {
        let reason = normalize_required_text(&cmd.reason, "adjustment reason")?;
        let actor = normalize_required_text(&cmd.actor, "actor")?;

        with_tx!(self, |db_tx| {
            let member = require_member(&db_tx, &cmd.member_id).await?;
            let new_used = Hours::new(member.total_hours_used_centi)
                .checked_add(cmd.delta)
                .ok_or_else(|| {
                    EngineError::Validation("adjustment overflows the used-hours total".to_string())
                })?;

            let adjustment =
                BalanceAdjustment::new(member.id.clone(), cmd.delta, reason, actor, Utc::now());
            adjustments::ActiveModel::from(&adjustment)
                .insert(&db_tx)
                .await?;

            let patch = members::ActiveModel {
                total_hours_used_centi: ActiveValue::Set(new_used.centi()),
                ..Default::default()
            };
            cas_update_member(&db_tx, &member, patch).await?;

            Ok(adjustment)
        })
    }

    /// Lists a member's adjustment audit trail, newest first. `page` is
    /// 1-indexed.
    pub async fn member_adjustments(
        &self,
        member_id: &str,
        page: u64,
        page_size: u64,
    ) -> ResultEngine<(Vec<BalanceAdjustment>, u64)> {
        require_member(&self.database, member_id).await?;

        let page_size = page_size.clamp(1, 200);
        let paginator = adjustments::Entity::find()
            .filter(adjustments::Column::MemberId.eq(member_id))
            .order_by_desc(adjustments::Column::CreatedAt)
            .paginate(&self.database, page_size);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((
            models.into_iter().map(BalanceAdjustment::from).collect(),
            total,
        ))
    }

    /// Members whose latest purchase expires within the next `days` days,
    /// soonest first.
    pub async fn members_expiring_soon(&self, days: u64) -> ResultEngine<Vec<ExpiringMember>> {
        let today = Utc::now().date_naive();
        let models = members::Entity::find()
            .filter(members::Column::Id.in_subquery(expiring_member_ids(today, days)?))
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let latest = purchases::Entity::find()
                .filter(purchases::Column::MemberId.eq(model.id.as_str()))
                .order_by_desc(purchases::Column::PurchaseDate)
                .one(&self.database)
                .await?;
            let Some(latest) = latest else { continue };
            let expiry = expiry_dates(latest.purchase_date).0;
            out.push(ExpiringMember {
                member: Member::from(model),
                expiry_date: expiry,
                days_left: (expiry - today).num_days(),
            });
        }
        out.sort_by_key(|e| e.expiry_date);
        Ok(out)
    }

    /// Venue-wide dashboard counters, optionally scoped to one branch.
    pub async fn dashboard_stats(&self, branch_id: Option<&str>) -> ResultEngine<DashboardStats> {
        let today = Utc::now().date_naive();

        let mut member_query = members::Entity::find();
        if let Some(branch) = branch_id {
            member_query = member_query.filter(members::Column::BranchId.eq(branch));
        }
        let total_members = member_query.clone().count(&self.database).await?;
        let expired_members = member_query
            .clone()
            .filter(members::Column::Id.in_subquery(expired_member_ids(today)))
            .count(&self.database)
            .await?;
        let members_expiring_soon = member_query
            .filter(
                members::Column::Id.in_subquery(expiring_member_ids(today, EXPIRING_SOON_DAYS)?),
            )
            .count(&self.database)
            .await?;

        let (granted_centi, used_centi) = self.hour_totals(branch_id).await?;
        let total_hours_granted = Hours::new(granted_centi);
        let total_hours_used = Hours::new(used_centi);

        let mut session_query = sessions::Entity::find()
            .filter(sessions::Column::Status.eq(SessionStatus::Active.as_str()));
        if let Some(branch) = branch_id {
            session_query = session_query.filter(sessions::Column::BranchId.eq(branch));
        }
        let active_sessions = session_query.count(&self.database).await?;

        let mut rollover_query = purchases::Entity::find()
            .filter(purchases::Column::RolloverStatus.eq(RolloverStatus::Pending.as_str()));
        if let Some(branch) = branch_id {
            rollover_query = rollover_query
                .join(JoinType::InnerJoin, purchases::Relation::Members.def())
                .filter(members::Column::BranchId.eq(branch));
        }
        let pending_rollovers = rollover_query.count(&self.database).await?;

        Ok(DashboardStats {
            total_members,
            active_members: total_members - expired_members,
            expired_members,
            total_hours_granted,
            total_hours_used,
            total_balance: total_hours_granted - total_hours_used,
            active_sessions,
            members_expiring_soon,
            pending_rollovers,
        })
    }

    /// Summed granted/used centihours over all members, via one aggregate
    /// query.
    async fn hour_totals(&self, branch_id: Option<&str>) -> ResultEngine<(i64, i64)> {
        let backend = self.database.get_database_backend();
        let (branch_cond, values) = match branch_id {
            Some(branch) => (" WHERE branch_id = ?", vec![branch.into()]),
            None => ("", Vec::<Value>::new()),
        };
        let stmt = Statement::from_sql_and_values(
            backend,
            format!(
                "SELECT COALESCE(SUM(total_hours_granted_centi), 0) AS granted, \
                 COALESCE(SUM(total_hours_used_centi), 0) AS used \
                 FROM members{branch_cond}"
            ),
            values,
        );
        let row = self.database.query_one(stmt).await?;
        let granted = row
            .as_ref()
            .and_then(|r| r.try_get("", "granted").ok())
            .unwrap_or(0);
        let used = row
            .as_ref()
            .and_then(|r| r.try_get("", "used").ok())
            .unwrap_or(0);
        Ok((granted, used))
    }
}

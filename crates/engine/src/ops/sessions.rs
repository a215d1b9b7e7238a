use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{
    EndSession, EngineError, GamingSession, Hours, ResultEngine, SessionStatus, StartSessionCmd,
    members, purchases, purchases::expiry_dates, sessions,
};

use super::{Engine, cas_update_member, require_branch, require_member, with_tx};

/// Checks applied before a session may start. Both are enabled by default;
/// venues that tolerate starting on an empty or expired plan can switch
/// either off.
#[derive(Clone, Copy, Debug)]
pub struct StartPolicy {
    /// Reject starts when the member's balance is zero or negative.
    pub require_positive_balance: bool,
    /// Reject starts when the member's latest plan has expired.
    pub block_expired_plan: bool,
}

impl Default for StartPolicy {
    fn default() -> Self {
        Self {
            require_positive_balance: true,
            block_expired_plan: true,
        }
    }
}

async fn require_session<C: ConnectionTrait>(
    db: &C,
    session_id: &str,
) -> ResultEngine<sessions::Model> {
    sessions::Entity::find_by_id(session_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("session not exists".to_string()))
}

impl Engine {
    /// Starts a gaming session for a member.
    ///
    /// A member can hold at most one active session at a time. The configured
    /// [`StartPolicy`] decides whether an empty balance or an expired plan
    /// blocks the start; neither check is ever re-applied when the session
    /// ends.
    pub async fn start_session(&self, cmd: StartSessionCmd) -> ResultEngine<GamingSession> {
        let started_at = cmd.started_at.unwrap_or_else(Utc::now);

        with_tx!(self, |db_tx| {
            let member = require_member(&db_tx, &cmd.member_id).await?;
            require_branch(&db_tx, &cmd.branch_id).await?;

            let active = sessions::Entity::find()
                .filter(sessions::Column::MemberId.eq(member.id.as_str()))
                .filter(sessions::Column::Status.eq(SessionStatus::Active.as_str()))
                .one(&db_tx)
                .await?;
            if active.is_some() {
                return Err(EngineError::ExistingKey(
                    "member already has an active session".to_string(),
                ));
            }

            if self.start_policy.require_positive_balance
                && member.total_hours_granted_centi <= member.total_hours_used_centi
            {
                return Err(EngineError::Validation(
                    "insufficient balance to start a session".to_string(),
                ));
            }
            if self.start_policy.block_expired_plan {
                let latest = purchases::Entity::find()
                    .filter(purchases::Column::MemberId.eq(member.id.as_str()))
                    .order_by_desc(purchases::Column::PurchaseDate)
                    .one(&db_tx)
                    .await?;
                if let Some(latest) = latest {
                    let (expiry, _) = expiry_dates(latest.purchase_date);
                    if Utc::now().date_naive() > expiry {
                        return Err(EngineError::Validation(
                            "membership plan has expired".to_string(),
                        ));
                    }
                }
            }

            let session = GamingSession::new(
                member.id.clone(),
                cmd.branch_id.clone(),
                cmd.table_number.clone(),
                cmd.game_title.clone(),
                started_at,
                cmd.created_by.clone(),
            )?;
            sessions::ActiveModel::from(&session).insert(&db_tx).await?;
            Ok(session)
        })
    }

    /// Ends an active session and charges the consumed hours to the member.
    ///
    /// The charge is applied verbatim: a session that ran longer than the
    /// remaining balance pushes the balance negative rather than failing.
    pub async fn end_session(&self, session_id: &str, how: EndSession) -> ResultEngine<GamingSession> {
        with_tx!(self, |db_tx| {
            let session = require_session(&db_tx, session_id).await?;
            if session.status != SessionStatus::Active.as_str() {
                return Err(EngineError::InvalidStateTransition(format!(
                    "cannot end a {} session",
                    session.status
                )));
            }

            let (ended_at, hours) = match how {
                EndSession::At(ended_at) => {
                    if ended_at < session.started_at {
                        return Err(EngineError::Validation(
                            "session end precedes its start".to_string(),
                        ));
                    }
                    (ended_at, Hours::from_duration(ended_at - session.started_at)?)
                }
                EndSession::Manual(hours) => {
                    if hours.is_negative() {
                        return Err(EngineError::Validation(
                            "manual hours must not be negative".to_string(),
                        ));
                    }
                    // A forward-dated session keeps start <= end on the row.
                    (Utc::now().max(session.started_at), hours)
                }
            };

            let member = require_member(&db_tx, &session.member_id).await?;
            let new_used = Hours::new(member.total_hours_used_centi)
                .checked_add(hours)
                .ok_or_else(|| {
                    EngineError::Validation("session hours overflow the used-hours total".to_string())
                })?;

            let session_patch = sessions::ActiveModel {
                id: ActiveValue::Set(session.id.clone()),
                ended_at: ActiveValue::Set(Some(ended_at)),
                hours_consumed_centi: ActiveValue::Set(hours.centi()),
                status: ActiveValue::Set(SessionStatus::Completed.as_str().to_string()),
                ..Default::default()
            };
            session_patch.update(&db_tx).await?;

            let member_patch = members::ActiveModel {
                total_hours_used_centi: ActiveValue::Set(new_used.centi()),
                ..Default::default()
            };
            cas_update_member(&db_tx, &member, member_patch).await?;

            let updated = require_session(&db_tx, session_id).await?;
            GamingSession::try_from(updated)
        })
    }

    /// Discards an active session without charging any hours.
    pub async fn cancel_session(&self, session_id: &str) -> ResultEngine<GamingSession> {
        with_tx!(self, |db_tx| {
            let session = require_session(&db_tx, session_id).await?;
            if session.status != SessionStatus::Active.as_str() {
                return Err(EngineError::InvalidStateTransition(format!(
                    "cannot cancel a {} session",
                    session.status
                )));
            }

            let patch = sessions::ActiveModel {
                id: ActiveValue::Set(session.id.clone()),
                status: ActiveValue::Set(SessionStatus::Cancelled.as_str().to_string()),
                ..Default::default()
            };
            patch.update(&db_tx).await?;

            let updated = require_session(&db_tx, session_id).await?;
            GamingSession::try_from(updated)
        })
    }

    /// Voids a completed session, refunding exactly the hours it charged.
    ///
    /// Only `completed` sessions can be voided; voiding twice is rejected so
    /// a refund can never be applied twice.
    pub async fn void_session(&self, session_id: &str) -> ResultEngine<GamingSession> {
        with_tx!(self, |db_tx| {
            let session = require_session(&db_tx, session_id).await?;
            if session.status != SessionStatus::Completed.as_str() {
                return Err(EngineError::InvalidStateTransition(format!(
                    "cannot void a {} session",
                    session.status
                )));
            }

            let member = require_member(&db_tx, &session.member_id).await?;
            let new_used = Hours::new(member.total_hours_used_centi)
                .checked_sub(Hours::new(session.hours_consumed_centi))
                .ok_or_else(|| {
                    EngineError::Validation("refund overflows the used-hours total".to_string())
                })?;

            let session_patch = sessions::ActiveModel {
                id: ActiveValue::Set(session.id.clone()),
                status: ActiveValue::Set(SessionStatus::Voided.as_str().to_string()),
                ..Default::default()
            };
            session_patch.update(&db_tx).await?;

            let member_patch = members::ActiveModel {
                total_hours_used_centi: ActiveValue::Set(new_used.centi()),
                ..Default::default()
            };
            cas_update_member(&db_tx, &member, member_patch).await?;

            let updated = require_session(&db_tx, session_id).await?;
            GamingSession::try_from(updated)
        })
    }

    /// Fetches a session by id.
    pub async fn session(&self, session_id: &str) -> ResultEngine<GamingSession> {
        let model = require_session(&self.database, session_id).await?;
        GamingSession::try_from(model)
    }

    /// Lists a member's sessions, newest first. `page` is 1-indexed.
    pub async fn member_sessions(
        &self,
        member_id: &str,
        page: u64,
        page_size: u64,
    ) -> ResultEngine<(Vec<GamingSession>, u64)> {
        require_member(&self.database, member_id).await?;

        let page_size = page_size.clamp(1, 200);
        let paginator = sessions::Entity::find()
            .filter(sessions::Column::MemberId.eq(member_id))
            .order_by_desc(sessions::Column::StartedAt)
            .paginate(&self.database, page_size);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(GamingSession::try_from(model)?);
        }
        Ok((out, total))
    }

    /// Lists all currently active sessions, most recently started first.
    pub async fn active_sessions(&self) -> ResultEngine<Vec<GamingSession>> {
        let models = sessions::Entity::find()
            .filter(sessions::Column::Status.eq(SessionStatus::Active.as_str()))
            .order_by_desc(sessions::Column::StartedAt)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(GamingSession::try_from(model)?);
        }
        Ok(out)
    }
}

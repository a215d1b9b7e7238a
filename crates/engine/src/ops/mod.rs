use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseConnection, QueryFilter,
    sea_query::{Expr, Query, SelectStatement},
    prelude::*,
};

use crate::{EngineError, ResultEngine, purchases::PLAN_VALIDITY_DAYS};

mod balances;
mod branches;
mod members;
mod purchases;
mod sessions;

pub use balances::{BalanceSummary, DashboardStats, ExpiringMember};
pub use members::MemberSearchFilter;
pub use sessions::StartPolicy;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    start_policy: StartPolicy,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Fetch a member row or fail with [`EngineError::MemberNotFound`].
pub(crate) async fn require_member<C: ConnectionTrait>(
    db: &C,
    member_id: &str,
) -> ResultEngine<crate::members::Model> {
    crate::members::Entity::find_by_id(member_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::MemberNotFound(member_id.to_string()))
}

/// Apply a patch to a member row with an optimistic version check.
///
/// The update only matches when the row still carries the version that was
/// read at the start of the operation; zero affected rows means another
/// writer got there first and the caller must retry.
pub(crate) async fn cas_update_member<C: ConnectionTrait>(
    db: &C,
    member: &crate::members::Model,
    mut patch: crate::members::ActiveModel,
) -> ResultEngine<()> {
    patch.version = ActiveValue::Set(member.version + 1);
    let result = crate::members::Entity::update_many()
        .set(patch)
        .filter(crate::members::Column::Id.eq(member.id.as_str()))
        .filter(crate::members::Column::Version.eq(member.version))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(EngineError::ConcurrentModification(member.id.clone()));
    }
    Ok(())
}

/// Ensure a branch row exists or fail with [`EngineError::KeyNotFound`].
pub(crate) async fn require_branch<C: ConnectionTrait>(db: &C, branch_id: &str) -> ResultEngine<()> {
    crate::branches::Entity::find_by_id(branch_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| EngineError::KeyNotFound("branch not exists".to_string()))
}

/// UTC midnight at the start of `day`.
pub(crate) fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Subquery selecting ids of members whose latest purchase has expired as of
/// `today`.
///
/// A purchase expires `PLAN_VALIDITY_DAYS` after its purchase date, so an
/// expired member's latest purchase predates `today - PLAN_VALIDITY_DAYS`.
/// Members with no purchase never match.
pub(crate) fn expired_member_ids(today: NaiveDate) -> SelectStatement {
    let cutoff = day_start(today - Days::new(PLAN_VALIDITY_DAYS));
    Query::select()
        .column(crate::purchases::Column::MemberId)
        .from(crate::purchases::Entity)
        .group_by_col(crate::purchases::Column::MemberId)
        .and_having(
            Expr::expr(Expr::col(crate::purchases::Column::PurchaseDate).max()).lt(cutoff),
        )
        .to_owned()
}

/// Subquery selecting ids of members whose latest purchase expires within
/// `[today, today + days]`, inclusive on both ends.
///
/// `days` is caller-controlled; a window that pushes the date out of
/// chrono's representable range is rejected rather than panicking.
pub(crate) fn expiring_member_ids(today: NaiveDate, days: u64) -> ResultEngine<SelectStatement> {
    let until_day = today
        .checked_add_days(Days::new(days.saturating_add(1)))
        .ok_or_else(|| EngineError::Validation("expiry window too large".to_string()))?;
    let from = day_start(today - Days::new(PLAN_VALIDITY_DAYS));
    let until = day_start(until_day - Days::new(PLAN_VALIDITY_DAYS));
    Ok(Query::select()
        .column(crate::purchases::Column::MemberId)
        .from(crate::purchases::Entity)
        .group_by_col(crate::purchases::Column::MemberId)
        .and_having(Expr::expr(Expr::col(crate::purchases::Column::PurchaseDate).max()).gte(from))
        .and_having(Expr::expr(Expr::col(crate::purchases::Column::PurchaseDate).max()).lt(until))
        .to_owned())
}

pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    start_policy: StartPolicy,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the session start policy (defaults to both checks enabled).
    pub fn start_policy(mut self, policy: StartPolicy) -> EngineBuilder {
        self.start_policy = policy;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            start_policy: self.start_policy,
        })
    }
}

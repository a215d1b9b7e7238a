//! Gaming session primitives.
//!
//! State machine: `active → completed → voided` (terminal). An `active`
//! session may instead be discarded as `cancelled` before any end time is
//! recorded; a cancelled session never produces `hours_consumed`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Hours, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Voided,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Voided => "voided",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for SessionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "voided" => Ok(Self::Voided),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::Validation(format!(
                "invalid session status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamingSession {
    pub id: String,
    pub member_id: String,
    pub branch_id: String,
    pub table_number: String,
    pub game_title: String,
    pub started_at: DateTime<Utc>,
    /// Absent while the session is `active` or `cancelled`.
    pub ended_at: Option<DateTime<Utc>>,
    /// Defined and fixed once the session leaves `active`.
    pub hours_consumed: Hours,
    pub status: SessionStatus,
    pub created_by: String,
}

impl GamingSession {
    pub fn new(
        member_id: String,
        branch_id: String,
        table_number: String,
        game_title: String,
        started_at: DateTime<Utc>,
        created_by: String,
    ) -> ResultEngine<Self> {
        if table_number.trim().is_empty() {
            return Err(EngineError::Validation(
                "table number must not be empty".to_string(),
            ));
        }
        if game_title.trim().is_empty() {
            return Err(EngineError::Validation(
                "game title must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            member_id,
            branch_id,
            table_number,
            game_title,
            started_at,
            ended_at: None,
            hours_consumed: Hours::ZERO,
            status: SessionStatus::Active,
            created_by,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "gaming_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub member_id: String,
    pub branch_id: String,
    pub table_number: String,
    pub game_title: String,
    pub started_at: DateTimeUtc,
    pub ended_at: Option<DateTimeUtc>,
    pub hours_consumed_centi: i64,
    pub status: String,
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id"
    )]
    Members,
    #[sea_orm(
        belongs_to = "super::branches::Entity",
        from = "Column::BranchId",
        to = "super::branches::Column::Id"
    )]
    Branches,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::branches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&GamingSession> for ActiveModel {
    fn from(session: &GamingSession) -> Self {
        Self {
            id: ActiveValue::Set(session.id.clone()),
            member_id: ActiveValue::Set(session.member_id.clone()),
            branch_id: ActiveValue::Set(session.branch_id.clone()),
            table_number: ActiveValue::Set(session.table_number.clone()),
            game_title: ActiveValue::Set(session.game_title.clone()),
            started_at: ActiveValue::Set(session.started_at),
            ended_at: ActiveValue::Set(session.ended_at),
            hours_consumed_centi: ActiveValue::Set(session.hours_consumed.centi()),
            status: ActiveValue::Set(session.status.as_str().to_string()),
            created_by: ActiveValue::Set(session.created_by.clone()),
        }
    }
}

impl TryFrom<Model> for GamingSession {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            member_id: model.member_id,
            branch_id: model.branch_id,
            table_number: model.table_number,
            game_title: model.game_title,
            started_at: model.started_at,
            ended_at: model.ended_at,
            hours_consumed: Hours::new(model.hours_consumed_centi),
            status: SessionStatus::try_from(model.status.as_str())?,
            created_by: model.created_by,
        })
    }
}

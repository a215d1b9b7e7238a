//! Manual balance adjustment audit records.
//!
//! The only path allowed to change a balance outside the purchase/session
//! lifecycle. Every adjustment writes exactly one immutable audit row.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Hours;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceAdjustment {
    pub id: String,
    pub member_id: String,
    /// Signed delta applied to the member's used-hours total. A negative
    /// delta grants hours, a positive delta consumes them.
    pub delta: Hours,
    pub reason: String,
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

impl BalanceAdjustment {
    pub fn new(
        member_id: String,
        delta: Hours,
        reason: String,
        actor: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            member_id,
            delta,
            reason,
            actor,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "balance_adjustments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub member_id: String,
    pub delta_centi: i64,
    pub reason: String,
    pub actor: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id"
    )]
    Members,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BalanceAdjustment> for ActiveModel {
    fn from(adjustment: &BalanceAdjustment) -> Self {
        Self {
            id: ActiveValue::Set(adjustment.id.clone()),
            member_id: ActiveValue::Set(adjustment.member_id.clone()),
            delta_centi: ActiveValue::Set(adjustment.delta.centi()),
            reason: ActiveValue::Set(adjustment.reason.clone()),
            actor: ActiveValue::Set(adjustment.actor.clone()),
            created_at: ActiveValue::Set(adjustment.created_at),
        }
    }
}

impl From<Model> for BalanceAdjustment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            member_id: model.member_id,
            delta: Hours::new(model.delta_centi),
            reason: model.reason,
            actor: model.actor,
            created_at: model.created_at,
        }
    }
}

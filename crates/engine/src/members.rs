//! Member primitives.
//!
//! A `Member` is a venue customer identified by a normalized 10-digit mobile
//! number. Granted/used hour totals are maintained incrementally by the
//! engine; `balance` and `is_expired` are derived on read, never stored.
//! Expiry comes from the member's latest purchase, so the row carries no
//! expiry column of its own.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Hours, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub mobile: String,
    pub full_name: String,
    pub email: Option<String>,
    pub total_hours_granted: Hours,
    pub total_hours_used: Hours,
    pub branch_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(
        full_name: String,
        mobile: String,
        email: Option<String>,
        branch_id: Option<String>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if full_name.trim().is_empty() {
            return Err(EngineError::Validation(
                "member name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            mobile,
            full_name,
            email,
            total_hours_granted: Hours::ZERO,
            total_hours_used: Hours::ZERO,
            branch_id,
            created_at,
        })
    }

    /// Real-time balance: granted minus used. May be negative.
    #[must_use]
    pub fn balance(&self) -> Hours {
        self.total_hours_granted - self.total_hours_used
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub mobile: String,
    pub full_name: String,
    pub email: Option<String>,
    pub total_hours_granted_centi: i64,
    pub total_hours_used_centi: i64,
    pub branch_id: Option<String>,
    pub version: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchases::Entity")]
    Purchases,
    #[sea_orm(has_many = "super::sessions::Entity")]
    Sessions,
}

impl Related<super::purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Member> for ActiveModel {
    fn from(member: &Member) -> Self {
        Self {
            id: ActiveValue::Set(member.id.clone()),
            mobile: ActiveValue::Set(member.mobile.clone()),
            full_name: ActiveValue::Set(member.full_name.clone()),
            email: ActiveValue::Set(member.email.clone()),
            total_hours_granted_centi: ActiveValue::Set(member.total_hours_granted.centi()),
            total_hours_used_centi: ActiveValue::Set(member.total_hours_used.centi()),
            branch_id: ActiveValue::Set(member.branch_id.clone()),
            version: ActiveValue::Set(0),
            created_at: ActiveValue::Set(member.created_at),
        }
    }
}

impl From<Model> for Member {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            mobile: model.mobile,
            full_name: model.full_name,
            email: model.email,
            total_hours_granted: Hours::new(model.total_hours_granted_centi),
            total_hours_used: Hours::new(model.total_hours_used_centi),
            branch_id: model.branch_id,
            created_at: model.created_at,
        }
    }
}

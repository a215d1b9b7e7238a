//! Purchase primitives.
//!
//! A `Purchase` is one credit-grant event. `expiry_date` and
//! `rollover_deadline` are pure functions of the purchase date and are never
//! stored; the only field mutated after creation is `rollover_status`, set
//! exactly once when the *next* purchase evaluates the rollover.

use chrono::{DateTime, Days, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Hours, ResultEngine};

/// Validity window of a purchase.
pub const PLAN_VALIDITY_DAYS: u64 = 365;
/// Grace window after expiry in which unused hours may roll over.
pub const ROLLOVER_WINDOW_DAYS: u64 = 180;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloverStatus {
    /// First purchase of a member; there was nothing to roll over from.
    NotApplicable,
    /// Waiting to be superseded by the member's next purchase.
    Pending,
    /// Unused hours were carried into the next purchase.
    Applied,
    /// The next purchase came after the grace window; unused hours were lost.
    Forfeited,
}

impl RolloverStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotApplicable => "not_applicable",
            Self::Pending => "pending",
            Self::Applied => "applied",
            Self::Forfeited => "forfeited",
        }
    }
}

impl TryFrom<&str> for RolloverStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "not_applicable" => Ok(Self::NotApplicable),
            "pending" => Ok(Self::Pending),
            "applied" => Ok(Self::Applied),
            "forfeited" => Ok(Self::Forfeited),
            other => Err(EngineError::Validation(format!(
                "invalid rollover status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: String,
    pub member_id: String,
    pub plan_name: String,
    /// Base hours granted by the plan, excluding rollover.
    pub hours_granted: Hours,
    /// Base hours plus the rollover carried in from the previous purchase.
    pub total_valid_purchased: Hours,
    pub purchase_date: DateTime<Utc>,
    pub rollover_status: RolloverStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    pub fn new(
        member_id: String,
        plan_name: String,
        hours_granted: Hours,
        rollover: Hours,
        purchase_date: DateTime<Utc>,
        rollover_status: RolloverStatus,
        created_by: String,
    ) -> ResultEngine<Self> {
        if !hours_granted.is_positive() {
            return Err(EngineError::Validation(
                "hours granted must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            member_id,
            plan_name,
            hours_granted,
            total_valid_purchased: hours_granted + rollover,
            purchase_date,
            rollover_status,
            created_by,
            created_at: purchase_date,
        })
    }

    /// Last day this purchase's hours are valid.
    #[must_use]
    pub fn expiry_date(&self) -> NaiveDate {
        expiry_dates(self.purchase_date).0
    }

    /// Last day unused hours may still roll over into a renewal.
    #[must_use]
    pub fn rollover_deadline(&self) -> NaiveDate {
        expiry_dates(self.purchase_date).1
    }

    /// Whether this purchase has expired as of `today`.
    #[must_use]
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        today > self.expiry_date()
    }
}

/// Computes `(expiry_date, rollover_deadline)` from the purchase date.
///
/// Every purchase expires exactly 365 days after the purchase date; the
/// rollover deadline is 180 days after that (545 days total).
pub fn expiry_dates(purchase_date: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let day = purchase_date.date_naive();
    let expiry = day + Days::new(PLAN_VALIDITY_DAYS);
    let deadline = expiry + Days::new(ROLLOVER_WINDOW_DAYS);
    (expiry, deadline)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub member_id: String,
    pub plan_name: String,
    pub hours_granted_centi: i64,
    pub total_valid_purchased_centi: i64,
    pub purchase_date: DateTimeUtc,
    pub rollover_status: String,
    pub created_by: String,
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

impl From<&Purchase> for ActiveModel {
    fn from(purchase: &Purchase) -> Self {
        Self {
            id: ActiveValue::Set(purchase.id.clone()),
            member_id: ActiveValue::Set(purchase.member_id.clone()),
            plan_name: ActiveValue::Set(purchase.plan_name.clone()),
            hours_granted_centi: ActiveValue::Set(purchase.hours_granted.centi()),
            total_valid_purchased_centi: ActiveValue::Set(purchase.total_valid_purchased.centi()),
            purchase_date: ActiveValue::Set(purchase.purchase_date),
            rollover_status: ActiveValue::Set(purchase.rollover_status.as_str().to_string()),
            created_by: ActiveValue::Set(purchase.created_by.clone()),
            created_at: ActiveValue::Set(purchase.created_at),
        }
    }
}

impl TryFrom<Model> for Purchase {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            member_id: model.member_id,
            plan_name: model.plan_name,
            hours_granted: Hours::new(model.hours_granted_centi),
            total_valid_purchased: Hours::new(model.total_valid_purchased_centi),
            purchase_date: model.purchase_date,
            rollover_status: RolloverStatus::try_from(model.rollover_status.as_str())?,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}

//! Command structs for engine operations.
//!
//! These types group parameters for write operations (purchases, sessions,
//! adjustments, member upserts), keeping call sites readable and avoiding
//! long argument lists.

use chrono::{DateTime, Utc};

use crate::Hours;

/// Record a new purchase for a member.
#[derive(Clone, Debug)]
pub struct RecordPurchaseCmd {
    pub member_id: String,
    pub plan_name: String,
    /// Base hours granted by the plan, excluding any rollover.
    pub hours: Hours,
    /// Defaults to now when unset.
    pub purchased_at: Option<DateTime<Utc>>,
    pub created_by: String,
}

impl RecordPurchaseCmd {
    #[must_use]
    pub fn new(member_id: impl Into<String>, hours: Hours, created_by: impl Into<String>) -> Self {
        Self {
            member_id: member_id.into(),
            plan_name: format!("{hours} plan"),
            hours,
            purchased_at: None,
            created_by: created_by.into(),
        }
    }

    #[must_use]
    pub fn plan_name(mut self, plan_name: impl Into<String>) -> Self {
        self.plan_name = plan_name.into();
        self
    }

    #[must_use]
    pub fn purchased_at(mut self, purchased_at: DateTime<Utc>) -> Self {
        self.purchased_at = Some(purchased_at);
        self
    }
}

/// Start a gaming session for a member.
#[derive(Clone, Debug)]
pub struct StartSessionCmd {
    pub member_id: String,
    pub branch_id: String,
    pub table_number: String,
    pub game_title: String,
    /// Defaults to now when unset.
    pub started_at: Option<DateTime<Utc>>,
    pub created_by: String,
}

impl StartSessionCmd {
    #[must_use]
    pub fn new(
        member_id: impl Into<String>,
        branch_id: impl Into<String>,
        table_number: impl Into<String>,
        game_title: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            branch_id: branch_id.into(),
            table_number: table_number.into(),
            game_title: game_title.into(),
            started_at: None,
            created_by: created_by.into(),
        }
    }

    #[must_use]
    pub fn started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }
}

/// How an active session ends: at a wall-clock time, or with a manual hour
/// override used verbatim.
#[derive(Clone, Copy, Debug)]
pub enum EndSession {
    At(DateTime<Utc>),
    Manual(Hours),
}

/// Apply a manual, audited balance adjustment.
#[derive(Clone, Debug)]
pub struct AdjustBalanceCmd {
    pub member_id: String,
    /// Signed delta applied to the used-hours total; negative grants hours.
    pub delta: Hours,
    pub reason: String,
    pub actor: String,
}

impl AdjustBalanceCmd {
    #[must_use]
    pub fn new(
        member_id: impl Into<String>,
        delta: Hours,
        reason: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            delta,
            reason: reason.into(),
            actor: actor.into(),
        }
    }
}

/// Register a new member.
#[derive(Clone, Debug)]
pub struct CreateMemberCmd {
    pub full_name: String,
    /// Raw mobile number; normalized to the 10-digit key before storage.
    pub mobile: String,
    pub email: Option<String>,
    pub branch_id: Option<String>,
}

impl CreateMemberCmd {
    #[must_use]
    pub fn new(full_name: impl Into<String>, mobile: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            mobile: mobile.into(),
            email: None,
            branch_id: None,
        }
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn branch_id(mut self, branch_id: impl Into<String>) -> Self {
        self.branch_id = Some(branch_id.into());
        self
    }
}

/// Patch an existing member; unset fields are left unchanged.
#[derive(Clone, Debug, Default)]
pub struct UpdateMemberCmd {
    pub full_name: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub branch_id: Option<String>,
}

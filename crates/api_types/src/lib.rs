use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Common pagination query parameters. Pages are 1-indexed; the server
/// clamps `page_size`.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

pub mod member {
    use super::*;

    /// Request body for registering a member.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub full_name: String,
        /// Raw mobile number in any common format; normalized server-side.
        pub mobile: String,
        pub email: Option<String>,
        pub branch_id: Option<String>,
    }

    /// Request body for patching a member. Absent fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MemberUpdate {
        pub full_name: Option<String>,
        pub mobile: Option<String>,
        pub email: Option<String>,
        pub branch_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub id: String,
        pub full_name: String,
        /// Normalized 10-digit mobile number.
        pub mobile: String,
        pub email: Option<String>,
        pub branch_id: Option<String>,
        pub total_hours_granted_centi: i64,
        pub total_hours_used_centi: i64,
        /// `granted - used`, computed at read time.
        pub balance_centi: i64,
        pub created_at: DateTime<Utc>,
    }

    /// Query parameters for member search.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MemberSearch {
        /// Substring match against full name or mobile number.
        pub search: Option<String>,
        pub branch_id: Option<String>,
        pub is_expired: Option<bool>,
        pub page: Option<u64>,
        pub page_size: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberListResponse {
        pub members: Vec<MemberView>,
        pub total: u64,
    }

    /// Query parameters for the expiring-soon report.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpiringQuery {
        /// Window in days from today; the server applies a default when
        /// absent.
        pub days: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpiringView {
        pub member: MemberView,
        pub expiry_date: NaiveDate,
        pub days_left: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpiringListResponse {
        pub members: Vec<ExpiringView>,
    }
}

pub mod balance {
    use super::*;

    /// A member's real-time balance.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub granted_centi: i64,
        pub used_centi: i64,
        /// May be negative after voids or corrections.
        pub balance_centi: i64,
        pub is_expired: bool,
    }

    /// Request body for a manual balance adjustment.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdjustmentNew {
        /// Signed delta applied to the used-hours total; negative grants
        /// hours.
        pub delta_centi: i64,
        pub reason: String,
        pub actor: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdjustmentView {
        pub id: String,
        pub delta_centi: i64,
        pub reason: String,
        pub actor: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdjustmentListResponse {
        pub adjustments: Vec<AdjustmentView>,
        pub total: u64,
    }
}

pub mod purchase {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RolloverStatus {
        NotApplicable,
        Pending,
        Applied,
        Forfeited,
    }

    impl RolloverStatus {
        /// Returns the canonical status string used by the engine/database.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::NotApplicable => "not_applicable",
                Self::Pending => "pending",
                Self::Applied => "applied",
                Self::Forfeited => "forfeited",
            }
        }
    }

    /// Request body for recording a purchase.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseNew {
        pub member_id: String,
        /// Defaults to a name derived from the hours when absent.
        pub plan_name: Option<String>,
        /// Base hours granted by the plan, in centihours.
        pub hours_centi: i64,
        /// Defaults to now when absent. Must postdate the member's latest
        /// purchase.
        pub purchased_at: Option<DateTime<Utc>>,
        pub created_by: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseView {
        pub id: String,
        pub member_id: String,
        pub plan_name: String,
        pub hours_granted_centi: i64,
        /// Base hours plus any rollover carried from the predecessor.
        pub total_valid_purchased_centi: i64,
        pub purchase_date: DateTime<Utc>,
        /// Derived: purchase date + 365 days.
        pub expiry_date: NaiveDate,
        /// Derived: expiry date + 180 days.
        pub rollover_deadline: NaiveDate,
        pub rollover_status: RolloverStatus,
        pub created_by: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseListResponse {
        pub purchases: Vec<PurchaseView>,
        pub total: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RolloverView {
        pub status: RolloverStatus,
    }
}

pub mod session {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SessionStatus {
        Active,
        Completed,
        Voided,
        Cancelled,
    }

    impl SessionStatus {
        /// Returns the canonical status string used by the engine/database.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Active => "active",
                Self::Completed => "completed",
                Self::Voided => "voided",
                Self::Cancelled => "cancelled",
            }
        }
    }

    /// Request body for starting a session.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionNew {
        pub member_id: String,
        pub branch_id: String,
        pub table_number: String,
        pub game_title: String,
        /// Defaults to now when absent.
        pub started_at: Option<DateTime<Utc>>,
        pub created_by: String,
    }

    /// Request body for ending a session.
    ///
    /// Exactly one of `ended_at` and `manual_hours_centi` must be set:
    /// either the wall-clock end time, or a manual hour override used
    /// verbatim.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SessionEnd {
        pub ended_at: Option<DateTime<Utc>>,
        pub manual_hours_centi: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionView {
        pub id: String,
        pub member_id: String,
        pub branch_id: String,
        pub table_number: String,
        pub game_title: String,
        pub started_at: DateTime<Utc>,
        pub ended_at: Option<DateTime<Utc>>,
        pub hours_consumed_centi: i64,
        pub status: SessionStatus,
        pub created_by: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionListResponse {
        pub sessions: Vec<SessionView>,
        pub total: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ActiveSessionsResponse {
        pub sessions: Vec<SessionView>,
    }
}

pub mod branch {
    use super::*;

    /// Request body for creating a branch.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BranchNew {
        pub name: String,
        pub address: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BranchView {
        pub id: String,
        pub name: String,
        pub address: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BranchListResponse {
        pub branches: Vec<BranchView>,
    }
}

pub mod stats {
    use super::*;

    /// Query parameters for the dashboard statistics endpoint.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StatsQuery {
        pub branch_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Statistics {
        pub total_members: u64,
        pub active_members: u64,
        pub expired_members: u64,
        pub total_hours_granted_centi: i64,
        pub total_hours_used_centi: i64,
        pub total_balance_centi: i64,
        pub active_sessions: u64,
        pub members_expiring_soon: u64,
        pub pending_rollovers: u64,
    }
}

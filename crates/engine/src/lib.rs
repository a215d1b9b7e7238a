pub use adjustments::BalanceAdjustment;
pub use branches::Branch;
pub use commands::{
    AdjustBalanceCmd, CreateMemberCmd, EndSession, RecordPurchaseCmd, StartSessionCmd,
    UpdateMemberCmd,
};
pub use error::EngineError;
pub use hours::Hours;
pub use members::Member;
pub use mobile::normalize_mobile;
pub use ops::{
    BalanceSummary, DashboardStats, Engine, EngineBuilder, ExpiringMember, MemberSearchFilter,
    StartPolicy,
};
pub use purchases::{PLAN_VALIDITY_DAYS, Purchase, ROLLOVER_WINDOW_DAYS, RolloverStatus};
pub use sessions::{GamingSession, SessionStatus};

mod adjustments;
mod branches;
mod commands;
mod error;
mod hours;
mod members;
mod mobile;
mod ops;
mod purchases;
mod sessions;

pub type ResultEngine<T> = Result<T, EngineError>;

use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{app, run, run_with_listener, spawn_with_listener};

mod balances;
mod branches;
mod members;
mod purchases;
mod server;
mod sessions;
mod statistics;
mod user;

pub mod types {
    pub mod member {
        pub use api_types::member::{
            ExpiringListResponse, ExpiringQuery, ExpiringView, MemberListResponse, MemberNew,
            MemberSearch, MemberUpdate, MemberView,
        };
    }

    pub mod balance {
        pub use api_types::balance::{
            AdjustmentListResponse, AdjustmentNew, AdjustmentView, BalanceView,
        };
    }

    pub mod purchase {
        pub use api_types::purchase::{
            PurchaseListResponse, PurchaseNew, PurchaseView, RolloverStatus, RolloverView,
        };
    }

    pub mod session {
        pub use api_types::session::{
            ActiveSessionsResponse, SessionEnd, SessionListResponse, SessionNew, SessionStatus,
            SessionView,
        };
    }

    pub mod branch {
        pub use api_types::branch::{BranchListResponse, BranchNew, BranchView};
    }

    pub mod stats {
        pub use api_types::stats::{Statistics, StatsQuery};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::MemberNotFound(_) | EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::ConcurrentModification(_) => {
            StatusCode::CONFLICT
        }
        EngineError::InvalidPurchaseOrder(_)
        | EngineError::InvalidStateTransition(_)
        | EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::MemberNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn key_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn existing_key_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn concurrent_modification_maps_to_409() {
        let res =
            ServerError::from(EngineError::ConcurrentModification("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn invalid_purchase_order_maps_to_422() {
        let res =
            ServerError::from(EngineError::InvalidPurchaseOrder("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn invalid_state_transition_maps_to_422() {
        let res =
            ServerError::from(EngineError::InvalidStateTransition("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn validation_maps_to_422() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

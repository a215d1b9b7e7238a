//! Balance and adjustment API endpoints

use api_types::PageQuery;
use api_types::balance::{AdjustmentListResponse, AdjustmentNew, AdjustmentView, BalanceView};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{AdjustBalanceCmd, BalanceAdjustment, Hours};

use crate::{ServerError, server::ServerState};

fn adjustment_view(adjustment: BalanceAdjustment) -> AdjustmentView {
    AdjustmentView {
        id: adjustment.id,
        delta_centi: adjustment.delta.centi(),
        reason: adjustment.reason,
        actor: adjustment.actor,
        created_at: adjustment.created_at,
    }
}

/// Handle requests for a member's real-time balance
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<BalanceView>, ServerError> {
    let summary = state.engine.balance(&id).await?;
    Ok(Json(BalanceView {
        granted_centi: summary.granted.centi(),
        used_centi: summary.used.centi(),
        balance_centi: summary.balance.centi(),
        is_expired: summary.is_expired,
    }))
}

/// Handle requests for applying a manual balance adjustment
pub async fn adjust(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AdjustmentNew>,
) -> Result<(StatusCode, Json<AdjustmentView>), ServerError> {
    let adjustment = state
        .engine
        .adjust_balance(AdjustBalanceCmd::new(
            id,
            Hours::new(payload.delta_centi),
            payload.reason,
            payload.actor,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(adjustment_view(adjustment))))
}

/// Handle requests for a member's adjustment audit trail
pub async fn list(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<AdjustmentListResponse>, ServerError> {
    let (adjustments, total) = state
        .engine
        .member_adjustments(&id, query.page.unwrap_or(1), query.page_size.unwrap_or(50))
        .await?;

    Ok(Json(AdjustmentListResponse {
        adjustments: adjustments.into_iter().map(adjustment_view).collect(),
        total,
    }))
}

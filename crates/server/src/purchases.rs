//! Purchase API endpoints

use api_types::PageQuery;
use api_types::purchase::{
    PurchaseListResponse, PurchaseNew, PurchaseView, RolloverStatus, RolloverView,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Hours, Purchase, RecordPurchaseCmd};

use crate::{ServerError, server::ServerState};

fn status_view(status: engine::RolloverStatus) -> RolloverStatus {
    match status {
        engine::RolloverStatus::NotApplicable => RolloverStatus::NotApplicable,
        engine::RolloverStatus::Pending => RolloverStatus::Pending,
        engine::RolloverStatus::Applied => RolloverStatus::Applied,
        engine::RolloverStatus::Forfeited => RolloverStatus::Forfeited,
    }
}

fn view(purchase: Purchase) -> PurchaseView {
    PurchaseView {
        expiry_date: purchase.expiry_date(),
        rollover_deadline: purchase.rollover_deadline(),
        id: purchase.id,
        member_id: purchase.member_id,
        plan_name: purchase.plan_name,
        hours_granted_centi: purchase.hours_granted.centi(),
        total_valid_purchased_centi: purchase.total_valid_purchased.centi(),
        purchase_date: purchase.purchase_date,
        rollover_status: status_view(purchase.rollover_status),
        created_by: purchase.created_by,
    }
}

/// Handle requests for recording a new purchase
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PurchaseNew>,
) -> Result<(StatusCode, Json<PurchaseView>), ServerError> {
    let mut cmd = RecordPurchaseCmd::new(
        payload.member_id,
        Hours::new(payload.hours_centi),
        payload.created_by,
    );
    if let Some(plan_name) = payload.plan_name {
        cmd = cmd.plan_name(plan_name);
    }
    if let Some(purchased_at) = payload.purchased_at {
        cmd = cmd.purchased_at(purchased_at);
    }

    let purchase = state.engine.record_purchase(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(purchase))))
}

/// Handle requests for a purchase's rollover status
pub async fn rollover(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<RolloverView>, ServerError> {
    let status = state.engine.rollover_status(&id).await?;
    Ok(Json(RolloverView {
        status: status_view(status),
    }))
}

/// Handle requests for a member's purchase history
pub async fn list_for_member(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PurchaseListResponse>, ServerError> {
    let (purchases, total) = state
        .engine
        .member_purchases(&id, query.page.unwrap_or(1), query.page_size.unwrap_or(50))
        .await?;

    Ok(Json(PurchaseListResponse {
        purchases: purchases.into_iter().map(view).collect(),
        total,
    }))
}

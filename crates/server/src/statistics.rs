//! Statistics API endpoints

use api_types::stats::{Statistics, StatsQuery};
use axum::{
    Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState};

/// Handle requests for the dashboard statistics
pub async fn get_stats(
    State(state): State<ServerState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<Statistics>, ServerError> {
    let stats = state
        .engine
        .dashboard_stats(query.branch_id.as_deref())
        .await?;

    Ok(Json(Statistics {
        total_members: stats.total_members,
        active_members: stats.active_members,
        expired_members: stats.expired_members,
        total_hours_granted_centi: stats.total_hours_granted.centi(),
        total_hours_used_centi: stats.total_hours_used.centi(),
        total_balance_centi: stats.total_balance.centi(),
        active_sessions: stats.active_sessions,
        members_expiring_soon: stats.members_expiring_soon,
        pending_rollovers: stats.pending_rollovers,
    }))
}

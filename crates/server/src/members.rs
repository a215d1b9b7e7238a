//! Member API endpoints

use api_types::member::{
    ExpiringListResponse, ExpiringQuery, ExpiringView, MemberListResponse, MemberNew,
    MemberSearch, MemberUpdate, MemberView,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{CreateMemberCmd, Member, MemberSearchFilter, UpdateMemberCmd};

use crate::{ServerError, server::ServerState};

/// Default window for the expiring-soon report, in days.
const DEFAULT_EXPIRING_DAYS: u64 = 30;

pub(crate) fn view(member: Member) -> MemberView {
    let balance = member.balance();
    MemberView {
        id: member.id,
        full_name: member.full_name,
        mobile: member.mobile,
        email: member.email,
        branch_id: member.branch_id,
        total_hours_granted_centi: member.total_hours_granted.centi(),
        total_hours_used_centi: member.total_hours_used.centi(),
        balance_centi: balance.centi(),
        created_at: member.created_at,
    }
}

/// Handle requests for registering a new member
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MemberNew>,
) -> Result<(StatusCode, Json<MemberView>), ServerError> {
    let mut cmd = CreateMemberCmd::new(payload.full_name, payload.mobile);
    if let Some(email) = payload.email {
        cmd = cmd.email(email);
    }
    if let Some(branch_id) = payload.branch_id {
        cmd = cmd.branch_id(branch_id);
    }

    let member = state.engine.create_member(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(member))))
}

/// Handle requests for searching members
pub async fn search(
    State(state): State<ServerState>,
    Query(query): Query<MemberSearch>,
) -> Result<Json<MemberListResponse>, ServerError> {
    let filter = MemberSearchFilter {
        search: query.search,
        branch_id: query.branch_id,
        is_expired: query.is_expired,
    };
    let (members, total) = state
        .engine
        .search_members(
            &filter,
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(50),
        )
        .await?;

    Ok(Json(MemberListResponse {
        members: members.into_iter().map(view).collect(),
        total,
    }))
}

/// Handle requests for fetching one member
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<MemberView>, ServerError> {
    let member = state.engine.member(&id).await?;
    Ok(Json(view(member)))
}

/// Handle requests for patching a member
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MemberUpdate>,
) -> Result<Json<MemberView>, ServerError> {
    let cmd = UpdateMemberCmd {
        full_name: payload.full_name,
        mobile: payload.mobile,
        email: payload.email,
        branch_id: payload.branch_id,
    };
    let member = state.engine.update_member(&id, cmd).await?;
    Ok(Json(view(member)))
}

/// Handle requests for deleting a member and their history
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_member(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle requests for the expiring-soon report
pub async fn expiring(
    State(state): State<ServerState>,
    Query(query): Query<ExpiringQuery>,
) -> Result<Json<ExpiringListResponse>, ServerError> {
    let days = query.days.unwrap_or(DEFAULT_EXPIRING_DAYS);
    let expiring = state.engine.members_expiring_soon(days).await?;

    Ok(Json(ExpiringListResponse {
        members: expiring
            .into_iter()
            .map(|entry| ExpiringView {
                member: view(entry.member),
                expiry_date: entry.expiry_date,
                days_left: entry.days_left,
            })
            .collect(),
    }))
}

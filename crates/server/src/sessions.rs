//! Gaming session API endpoints

use api_types::PageQuery;
use api_types::session::{
    ActiveSessionsResponse, SessionEnd, SessionListResponse, SessionNew, SessionStatus,
    SessionView,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{EndSession, GamingSession, Hours, StartSessionCmd};

use crate::{ServerError, server::ServerState};

fn status_view(status: engine::SessionStatus) -> SessionStatus {
    match status {
        engine::SessionStatus::Active => SessionStatus::Active,
        engine::SessionStatus::Completed => SessionStatus::Completed,
        engine::SessionStatus::Voided => SessionStatus::Voided,
        engine::SessionStatus::Cancelled => SessionStatus::Cancelled,
    }
}

fn view(session: GamingSession) -> SessionView {
    SessionView {
        id: session.id,
        member_id: session.member_id,
        branch_id: session.branch_id,
        table_number: session.table_number,
        game_title: session.game_title,
        started_at: session.started_at,
        ended_at: session.ended_at,
        hours_consumed_centi: session.hours_consumed.centi(),
        status: status_view(session.status),
        created_by: session.created_by,
    }
}

/// Handle requests for starting a session
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SessionNew>,
) -> Result<(StatusCode, Json<SessionView>), ServerError> {
    let mut cmd = StartSessionCmd::new(
        payload.member_id,
        payload.branch_id,
        payload.table_number,
        payload.game_title,
        payload.created_by,
    );
    if let Some(started_at) = payload.started_at {
        cmd = cmd.started_at(started_at);
    }

    let session = state.engine.start_session(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(session))))
}

/// Handle requests for ending a session
pub async fn end(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<SessionEnd>,
) -> Result<Json<SessionView>, ServerError> {
    let how = match (payload.ended_at, payload.manual_hours_centi) {
        (Some(ended_at), None) => EndSession::At(ended_at),
        (None, Some(centi)) => EndSession::Manual(Hours::new(centi)),
        _ => {
            return Err(ServerError::Generic(
                "exactly one of ended_at and manual_hours_centi is required".to_string(),
            ));
        }
    };

    let session = state.engine.end_session(&id, how).await?;
    Ok(Json(view(session)))
}

/// Handle requests for voiding a completed session
pub async fn void(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ServerError> {
    let session = state.engine.void_session(&id).await?;
    Ok(Json(view(session)))
}

/// Handle requests for cancelling an active session
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ServerError> {
    let session = state.engine.cancel_session(&id).await?;
    Ok(Json(view(session)))
}

/// Handle requests for the currently active sessions
pub async fn active(
    State(state): State<ServerState>,
) -> Result<Json<ActiveSessionsResponse>, ServerError> {
    let sessions = state.engine.active_sessions().await?;
    Ok(Json(ActiveSessionsResponse {
        sessions: sessions.into_iter().map(view).collect(),
    }))
}

/// Handle requests for a member's session history
pub async fn list_for_member(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<SessionListResponse>, ServerError> {
    let (sessions, total) = state
        .engine
        .member_sessions(&id, query.page.unwrap_or(1), query.page_size.unwrap_or(50))
        .await?;

    Ok(Json(SessionListResponse {
        sessions: sessions.into_iter().map(view).collect(),
        total,
    }))
}

//! Branch API endpoints

use api_types::branch::{BranchListResponse, BranchNew, BranchView};
use axum::{Json, extract::State, http::StatusCode};
use engine::Branch;

use crate::{ServerError, server::ServerState};

fn view(branch: Branch) -> BranchView {
    BranchView {
        id: branch.id,
        name: branch.name,
        address: branch.address,
    }
}

/// Handle requests for creating a new branch
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<BranchNew>,
) -> Result<(StatusCode, Json<BranchView>), ServerError> {
    let branch = state
        .engine
        .create_branch(&payload.name, payload.address.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(view(branch))))
}

/// Handle requests for listing all branches
pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<BranchListResponse>, ServerError> {
    let branches = state.engine.branches().await?;
    Ok(Json(BranchListResponse {
        branches: branches.into_iter().map(view).collect(),
    }))
}

//! User administration handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use domain::models::{ApproveUserRequest, CreateUserRequest, UpdateUserRequest, UserProfile};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentActor;

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserProfile>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserProfile,
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
) -> Result<Json<UsersResponse>, ApiError> {
    let users = state.users.list(&ctx.actor).await?;
    Ok(Json(UsersResponse { users }))
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state.users.create(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

/// PATCH /api/v1/users/:user_id
pub async fn update_user(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Path(user_id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.update(&ctx, user_id, request).await?;
    Ok(Json(UserResponse { user }))
}

/// Approves or suspends an account.
///
/// POST /api/v1/users/approve
pub async fn change_user_status(
    State(state): State<AppState>,
    CurrentActor(ctx): CurrentActor,
    Json(request): Json<ApproveUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.change_status(&ctx, request).await?;
    Ok(Json(UserResponse { user }))
}

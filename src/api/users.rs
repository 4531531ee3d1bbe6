use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::domain::UserId;
use crate::models::{User, UserDraft};

pub async fn add_user(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<UserDraft>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.users().add_user(draft).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// Full-record update; the target id rides in the body.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Json(user): Json<User>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.users().update_user(user).await?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let users = state.users().list_users().await?;
    Ok(Json(ApiResponse::success(users)))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.users().get_user(UserId::new(id)).await?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.users().delete_user(UserId::new(id)).await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn add_friend(
    State(state): State<Arc<AppState>>,
    Path((user_id, friend_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .users()
        .add_friend(UserId::new(user_id), UserId::new(friend_id))
        .await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn remove_friend(
    State(state): State<Arc<AppState>>,
    Path((user_id, friend_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .users()
        .remove_friend(UserId::new(user_id), UserId::new(friend_id))
        .await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn list_friends(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let friends = state.users().friends_of(UserId::new(id)).await?;
    Ok(Json(ApiResponse::success(friends)))
}

pub async fn common_friends(
    State(state): State<Arc<AppState>>,
    Path((user_id, other_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let friends = state
        .users()
        .common_friends(UserId::new(user_id), UserId::new(other_id))
        .await?;
    Ok(Json(ApiResponse::success(friends)))
}

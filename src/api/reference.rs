//! Read-only endpoints for the closed MPA rating and genre tables.

use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::models::{Genre, MpaRating};

pub async fn list_ratings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<MpaRating>>>, ApiError> {
    let ratings = state.films().list_ratings().await?;
    Ok(Json(ApiResponse::success(ratings)))
}

pub async fn get_rating(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MpaRating>>, ApiError> {
    let rating = state.films().get_rating(id).await?;
    Ok(Json(ApiResponse::success(rating)))
}

pub async fn list_genres(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Genre>>>, ApiError> {
    let genres = state.films().list_genres().await?;
    Ok(Json(ApiResponse::success(genres)))
}

pub async fn get_genre(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Genre>>, ApiError> {
    let genre = state.films().get_genre(id).await?;
    Ok(Json(ApiResponse::success(genre)))
}

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::domain::{FilmId, UserId};
use crate::models::{Film, FilmDraft};

/// Default page size for the popularity ranking.
const DEFAULT_POPULAR_COUNT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct PopularParams {
    pub count: Option<i64>,
}

pub async fn add_film(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<FilmDraft>,
) -> Result<Json<ApiResponse<Film>>, ApiError> {
    let film = state.films().add_film(draft).await?;
    Ok(Json(ApiResponse::success(film)))
}

/// Full-record update; the target id rides in the body.
pub async fn update_film(
    State(state): State<Arc<AppState>>,
    Json(film): Json<Film>,
) -> Result<Json<ApiResponse<Film>>, ApiError> {
    let film = state.films().update_film(film).await?;
    Ok(Json(ApiResponse::success(film)))
}

pub async fn list_films(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Film>>>, ApiError> {
    let films = state.films().list_films().await?;
    Ok(Json(ApiResponse::success(films)))
}

pub async fn get_film(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Film>>, ApiError> {
    let film = state.films().get_film(FilmId::new(id)).await?;
    Ok(Json(ApiResponse::success(film)))
}

pub async fn delete_film(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.films().delete_film(FilmId::new(id)).await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn like_film(
    State(state): State<Arc<AppState>>,
    Path((film_id, user_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .films()
        .like_film(FilmId::new(film_id), UserId::new(user_id))
        .await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn unlike_film(
    State(state): State<Arc<AppState>>,
    Path((film_id, user_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .films()
        .unlike_film(FilmId::new(film_id), UserId::new(user_id))
        .await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn popular_films(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PopularParams>,
) -> Result<Json<ApiResponse<Vec<Film>>>, ApiError> {
    let count = params.count.unwrap_or(DEFAULT_POPULAR_COUNT);
    let films = state.films().popular_films(count).await?;
    Ok(Json(ApiResponse::success(films)))
}

use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::services::{FilmService, UserService};
use crate::state::SharedState;

mod error;
mod films;
mod reference;
mod system;
mod types;
mod users;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,
}

impl AppState {
    #[must_use]
    pub fn new(shared: Arc<SharedState>) -> Self {
        Self {
            shared,
            start_time: std::time::Instant::now(),
        }
    }

    #[must_use]
    pub fn films(&self) -> &Arc<dyn FilmService> {
        &self.shared.film_service
    }

    #[must_use]
    pub fn users(&self) -> &Arc<dyn UserService> {
        &self.shared.user_service
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.shared.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/films", get(films::list_films))
        .route("/films", post(films::add_film))
        .route("/films", put(films::update_film))
        .route("/films/popular", get(films::popular_films))
        .route("/films/{id}", get(films::get_film))
        .route("/films/{id}", delete(films::delete_film))
        .route("/films/{id}/like/{user_id}", put(films::like_film))
        .route("/films/{id}/like/{user_id}", delete(films::unlike_film))
        .route("/users", get(users::list_users))
        .route("/users", post(users::add_user))
        .route("/users", put(users::update_user))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", delete(users::delete_user))
        .route("/users/{id}/friends", get(users::list_friends))
        .route("/users/{id}/friends/{friend_id}", put(users::add_friend))
        .route(
            "/users/{id}/friends/{friend_id}",
            delete(users::remove_friend),
        )
        .route(
            "/users/{id}/friends/common/{other_id}",
            get(users::common_friends),
        )
        .route("/mpa", get(reference::list_ratings))
        .route("/mpa/{id}", get(reference::get_rating))
        .route("/genres", get(reference::list_genres))
        .route("/genres/{id}", get(reference::get_genre))
        .route("/system/status", get(system::get_status))
        .route("/system/health/live", get(system::health_live))
        .route("/system/health/ready", get(system::health_ready))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

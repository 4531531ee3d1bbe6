//! Domain services for the catalog.
//!
//! Handlers never touch storage directly; they go through these traits
//! so the business rules (validation order, error taxonomy, cascades)
//! live in one place and the storage backend stays swappable.

pub mod film_service;
pub mod film_service_impl;
pub mod user_service;
pub mod user_service_impl;

use crate::domain::{FilmId, UserId};
use thiserror::Error;

pub use film_service::FilmService;
pub use film_service_impl::DefaultFilmService;
pub use user_service::UserService;
pub use user_service_impl::DefaultUserService;

/// Error taxonomy shared by both services.
///
/// The split matters to the HTTP layer: reference errors (a non-positive
/// or unknown id) map to 404, rule violations map to 400, and backend
/// faults map to 500.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Film not found: {0}")]
    FilmNotFound(FilmId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("MPA rating not found: {0}")]
    RatingNotFound(i32),

    #[error("Genre not found: {0}")]
    GenreNotFound(i32),

    /// An id that can never name an entity (zero or negative). Rejected
    /// before storage is consulted.
    #[error("Invalid id reference: {0}")]
    InvalidReference(i64),

    #[error("User {0} cannot befriend themselves")]
    SelfFriendship(UserId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

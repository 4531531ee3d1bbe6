//! Film operations: CRUD, the like registry and popularity ranking.

use super::CatalogError;
use crate::domain::{FilmId, UserId};
use crate::models::{Film, FilmDraft, Genre, MpaRating};
use chrono::NaiveDate;

/// Earliest admissible release date (the first public film screening).
pub const CINEMA_BIRTHDAY: (i32, u32, u32) = (1895, 12, 28);

/// Longest admissible description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 200;

#[async_trait::async_trait]
pub trait FilmService: Send + Sync {
    /// Validates the draft, assigns a fresh id and stores the film.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Validation`] if a field or a rating/genre
    ///   reference fails the rules
    /// - [`CatalogError::Storage`] on backend failures
    async fn add_film(&self, draft: FilmDraft) -> Result<Film, CatalogError>;

    /// Full-record replace. The like set is preserved regardless of what
    /// the incoming record carries.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidReference`] if the id is non-positive
    /// - [`CatalogError::FilmNotFound`] if no film with that id exists
    /// - [`CatalogError::Validation`] on field or reference violations
    async fn update_film(&self, film: Film) -> Result<Film, CatalogError>;

    /// Removes the film and every like edge referencing it.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidReference`] if the id is non-positive
    /// - [`CatalogError::FilmNotFound`] if no film with that id exists
    async fn delete_film(&self, id: FilmId) -> Result<(), CatalogError>;

    async fn get_film(&self, id: FilmId) -> Result<Film, CatalogError>;

    async fn list_films(&self) -> Result<Vec<Film>, CatalogError>;

    /// Records that `user` likes `film`. Re-liking is a no-op.
    ///
    /// # Errors
    ///
    /// Both the film and the user must exist; a non-positive id on
    /// either side fails with [`CatalogError::InvalidReference`].
    async fn like_film(&self, film: FilmId, user: UserId) -> Result<(), CatalogError>;

    /// Withdraws a like. Removing a like that was never given is a no-op,
    /// but both entities must still exist.
    async fn unlike_film(&self, film: FilmId, user: UserId) -> Result<(), CatalogError>;

    /// The `count` most-liked films.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] if `count` is not positive.
    async fn popular_films(&self, count: i64) -> Result<Vec<Film>, CatalogError>;

    async fn get_rating(&self, id: i32) -> Result<MpaRating, CatalogError>;

    async fn list_ratings(&self) -> Result<Vec<MpaRating>, CatalogError>;

    async fn get_genre(&self, id: i32) -> Result<Genre, CatalogError>;

    async fn list_genres(&self) -> Result<Vec<Genre>, CatalogError>;
}

/// Ranks films by like count, most liked first. Ties break toward the
/// higher film id, so the newer entry wins. Pure so it can be tested
/// without storage.
#[must_use]
pub fn rank_by_popularity(mut films: Vec<Film>, count: usize) -> Vec<Film> {
    films.sort_by(|a, b| {
        b.likes
            .len()
            .cmp(&a.likes.len())
            .then_with(|| b.id.value().cmp(&a.id.value()))
    });
    films.truncate(count);
    films
}

/// Field rules for films. Pure, shared by create and update.
pub fn validate_film_fields(
    name: &str,
    description: &str,
    release_date: NaiveDate,
    duration: i32,
) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::Validation(
            "film name must not be blank".to_string(),
        ));
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(CatalogError::Validation(format!(
            "film description exceeds {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    let (y, m, d) = CINEMA_BIRTHDAY;
    let earliest = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| CatalogError::Storage("invalid cinema birthday constant".to_string()))?;
    if release_date < earliest {
        return Err(CatalogError::Validation(format!(
            "release date must not be before {earliest}"
        )));
    }
    if duration <= 0 {
        return Err(CatalogError::Validation(
            "film duration must be positive".to_string(),
        ));
    }
    Ok(())
}

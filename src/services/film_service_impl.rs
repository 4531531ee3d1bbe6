use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use super::film_service::{rank_by_popularity, validate_film_fields, FilmService};
use super::CatalogError;
use crate::domain::{FilmId, UserId};
use crate::models::{Film, FilmDraft, Genre, MpaRating};
use crate::storage::{FilmStorage, UserStorage};

/// Production [`FilmService`] backed by the storage traits.
pub struct DefaultFilmService {
    films: Arc<dyn FilmStorage>,
    users: Arc<dyn UserStorage>,
}

impl DefaultFilmService {
    pub fn new(films: Arc<dyn FilmStorage>, users: Arc<dyn UserStorage>) -> Self {
        Self { films, users }
    }

    /// Non-positive ids can never name an entity and are rejected
    /// before storage is consulted.
    fn check_film_id(id: FilmId) -> Result<(), CatalogError> {
        if id.is_valid() {
            Ok(())
        } else {
            Err(CatalogError::InvalidReference(id.value()))
        }
    }

    fn check_user_id(id: UserId) -> Result<(), CatalogError> {
        if id.is_valid() {
            Ok(())
        } else {
            Err(CatalogError::InvalidReference(id.value()))
        }
    }

    async fn require_film(&self, id: FilmId) -> Result<Film, CatalogError> {
        Self::check_film_id(id)?;
        self.films
            .get_film(id)
            .await?
            .ok_or(CatalogError::FilmNotFound(id))
    }

    async fn require_user(&self, id: UserId) -> Result<(), CatalogError> {
        Self::check_user_id(id)?;
        self.users
            .get_user(id)
            .await?
            .map(|_| ())
            .ok_or(CatalogError::UserNotFound(id))
    }

    /// Rating and genre references point into closed tables; attaching
    /// an unknown one is a rule violation, not a missing resource.
    async fn check_references(
        &self,
        mpa: Option<i32>,
        genres: &BTreeSet<i32>,
    ) -> Result<(), CatalogError> {
        if let Some(rating_id) = mpa {
            if self.films.get_rating(rating_id).await?.is_none() {
                return Err(CatalogError::Validation(format!(
                    "unknown MPA rating id {rating_id}"
                )));
            }
        }
        for genre_id in genres {
            if self.films.get_genre(*genre_id).await?.is_none() {
                return Err(CatalogError::Validation(format!(
                    "unknown genre id {genre_id}"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl FilmService for DefaultFilmService {
    async fn add_film(&self, draft: FilmDraft) -> Result<Film, CatalogError> {
        validate_film_fields(
            &draft.name,
            &draft.description,
            draft.release_date,
            draft.duration,
        )?;
        self.check_references(draft.mpa, &draft.genres).await?;

        let film = self.films.add_film(draft).await?;
        debug!(film_id = %film.id, name = %film.name, "film added");
        Ok(film)
    }

    async fn update_film(&self, film: Film) -> Result<Film, CatalogError> {
        Self::check_film_id(film.id)?;
        validate_film_fields(
            &film.name,
            &film.description,
            film.release_date,
            film.duration,
        )?;
        self.check_references(film.mpa, &film.genres).await?;

        let id = film.id;
        self.films
            .update_film(film)
            .await?
            .ok_or(CatalogError::FilmNotFound(id))
    }

    async fn delete_film(&self, id: FilmId) -> Result<(), CatalogError> {
        Self::check_film_id(id)?;
        if self.films.delete_film(id).await? {
            debug!(film_id = %id, "film deleted");
            Ok(())
        } else {
            Err(CatalogError::FilmNotFound(id))
        }
    }

    async fn get_film(&self, id: FilmId) -> Result<Film, CatalogError> {
        self.require_film(id).await
    }

    async fn list_films(&self) -> Result<Vec<Film>, CatalogError> {
        Ok(self.films.list_films().await?)
    }

    async fn like_film(&self, film: FilmId, user: UserId) -> Result<(), CatalogError> {
        self.require_film(film).await?;
        self.require_user(user).await?;
        self.films.add_like(film, user).await?;
        debug!(film_id = %film, user_id = %user, "like recorded");
        Ok(())
    }

    async fn unlike_film(&self, film: FilmId, user: UserId) -> Result<(), CatalogError> {
        self.require_film(film).await?;
        self.require_user(user).await?;
        self.films.remove_like(film, user).await?;
        Ok(())
    }

    async fn popular_films(&self, count: i64) -> Result<Vec<Film>, CatalogError> {
        if count <= 0 {
            return Err(CatalogError::Validation(
                "popular film count must be positive".to_string(),
            ));
        }
        let films = self.films.list_films().await?;
        let count = usize::try_from(count).unwrap_or(usize::MAX);
        Ok(rank_by_popularity(films, count))
    }

    async fn get_rating(&self, id: i32) -> Result<MpaRating, CatalogError> {
        self.films
            .get_rating(id)
            .await?
            .ok_or(CatalogError::RatingNotFound(id))
    }

    async fn list_ratings(&self) -> Result<Vec<MpaRating>, CatalogError> {
        Ok(self.films.list_ratings().await?)
    }

    async fn get_genre(&self, id: i32) -> Result<Genre, CatalogError> {
        self.films
            .get_genre(id)
            .await?
            .ok_or(CatalogError::GenreNotFound(id))
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        Ok(self.films.list_genres().await?)
    }
}

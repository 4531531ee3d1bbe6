//! In-memory storage backend.
//!
//! Everything lives in two `RwLock`-guarded maps. Each mutation takes a
//! single write guard, which is what makes the symmetric friend-pair
//! update and the delete cascades atomic with respect to observers.

use anyhow::Result;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::{FilmId, UserId};
use crate::models::{Film, FilmDraft, Genre, MpaRating, User, UserDraft};

use super::{FilmStorage, IdAllocator, UserStorage, reference_genres, reference_ratings};

/// Map-backed implementation of both storage traits.
///
/// Holds the same seeded rating/genre reference tables as the SQL
/// backend's seed migration.
pub struct MemoryCatalog {
    films: RwLock<HashMap<i64, Film>>,
    users: RwLock<HashMap<i64, User>>,
    film_ids: IdAllocator,
    user_ids: IdAllocator,
    ratings: Vec<MpaRating>,
    genres: Vec<Genre>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            films: RwLock::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
            film_ids: IdAllocator::new(),
            user_ids: IdAllocator::new(),
            ratings: reference_ratings(),
            genres: reference_genres(),
        }
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl FilmStorage for MemoryCatalog {
    async fn add_film(&self, draft: FilmDraft) -> Result<Film> {
        let mut films = self.films.write().await;
        let film = draft.into_film(FilmId::new(self.film_ids.next()));
        films.insert(film.id.value(), film.clone());
        tracing::debug!(film_id = %film.id, "film added");
        Ok(film)
    }

    async fn update_film(&self, mut film: Film) -> Result<Option<Film>> {
        let mut films = self.films.write().await;
        let Some(existing) = films.get(&film.id.value()) else {
            return Ok(None);
        };
        // The like set belongs to the like registry, not the record.
        film.likes = existing.likes.clone();
        films.insert(film.id.value(), film.clone());
        tracing::debug!(film_id = %film.id, "film updated");
        Ok(Some(film))
    }

    async fn delete_film(&self, id: FilmId) -> Result<bool> {
        let mut films = self.films.write().await;
        Ok(films.remove(&id.value()).is_some())
    }

    async fn get_film(&self, id: FilmId) -> Result<Option<Film>> {
        let films = self.films.read().await;
        Ok(films.get(&id.value()).cloned())
    }

    async fn list_films(&self) -> Result<Vec<Film>> {
        let films = self.films.read().await;
        Ok(films.values().cloned().collect())
    }

    async fn add_like(&self, film: FilmId, user: UserId) -> Result<()> {
        let mut films = self.films.write().await;
        if let Some(f) = films.get_mut(&film.value()) {
            f.likes.insert(user);
        }
        Ok(())
    }

    async fn remove_like(&self, film: FilmId, user: UserId) -> Result<()> {
        let mut films = self.films.write().await;
        if let Some(f) = films.get_mut(&film.value()) {
            f.likes.remove(&user);
        }
        Ok(())
    }

    async fn like_count(&self, film: FilmId) -> Result<u64> {
        let films = self.films.read().await;
        Ok(films.get(&film.value()).map_or(0, |f| f.likes.len() as u64))
    }

    async fn remove_likes_by_user(&self, user: UserId) -> Result<()> {
        let mut films = self.films.write().await;
        for film in films.values_mut() {
            film.likes.remove(&user);
        }
        Ok(())
    }

    async fn get_rating(&self, id: i32) -> Result<Option<MpaRating>> {
        Ok(self.ratings.iter().find(|r| r.id == id).cloned())
    }

    async fn list_ratings(&self) -> Result<Vec<MpaRating>> {
        Ok(self.ratings.clone())
    }

    async fn get_genre(&self, id: i32) -> Result<Option<Genre>> {
        Ok(self.genres.iter().find(|g| g.id == id).cloned())
    }

    async fn list_genres(&self) -> Result<Vec<Genre>> {
        Ok(self.genres.clone())
    }
}

#[async_trait::async_trait]
impl UserStorage for MemoryCatalog {
    async fn add_user(&self, draft: UserDraft) -> Result<User> {
        let mut users = self.users.write().await;
        let user = draft.into_user(UserId::new(self.user_ids.next()));
        users.insert(user.id.value(), user.clone());
        tracing::debug!(user_id = %user.id, login = %user.login, "user added");
        Ok(user)
    }

    async fn update_user(&self, mut user: User) -> Result<Option<User>> {
        let mut users = self.users.write().await;
        let Some(existing) = users.get(&user.id.value()) else {
            return Ok(None);
        };
        user.friends = existing.friends.clone();
        user.normalize_name();
        users.insert(user.id.value(), user.clone());
        tracing::debug!(user_id = %user.id, "user updated");
        Ok(Some(user))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let mut users = self.users.write().await;
        if users.remove(&id.value()).is_none() {
            return Ok(false);
        }
        // Cascade: no surviving friend set may still reference the id.
        for user in users.values_mut() {
            user.friends.remove(&id);
        }
        Ok(true)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id.value()).cloned())
    }

    async fn get_users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| users.get(&id.value()).cloned())
            .collect())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.values().cloned().collect())
    }

    async fn add_friend_pair(&self, a: UserId, b: UserId) -> Result<()> {
        // Both sides under one write guard, so the edge is never
        // observable half-inserted.
        let mut users = self.users.write().await;
        if let Some(user) = users.get_mut(&a.value()) {
            user.friends.insert(b);
        }
        if let Some(user) = users.get_mut(&b.value()) {
            user.friends.insert(a);
        }
        Ok(())
    }

    async fn remove_friend_pair(&self, a: UserId, b: UserId) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.get_mut(&a.value()) {
            user.friends.remove(&b);
        }
        if let Some(user) = users.get_mut(&b.value()) {
            user.friends.remove(&a);
        }
        Ok(())
    }
}

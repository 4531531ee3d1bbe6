use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::domain::{FilmId, UserId};
use crate::models::{Film, FilmDraft, Genre, MpaRating, User, UserDraft};
use crate::storage::{FilmStorage, IdAllocator, UserStorage};

pub mod migrator;
pub mod repositories;

/// SQLite-backed catalog store.
///
/// Entity ids come from the same in-process allocators the in-memory
/// backend uses, not from SQLite rowids. The high-water mark is
/// recovered from `MAX(id)` at startup, so ids stay strictly
/// increasing across restarts and are never reissued after a delete.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    film_ids: Arc<IdAllocator>,
    user_ids: Arc<IdAllocator>,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // A pooled in-memory database would give every connection its
        // own empty database, so pin those to a single connection.
        let in_memory = db_url.contains(":memory:");
        let max_connections = if in_memory { 1 } else { max_connections };

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections.min(max_connections))
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        let film_high_water = repositories::film::FilmRepository::new(conn.clone())
            .max_id()
            .await?;
        let user_high_water = repositories::user::UserRepository::new(conn.clone())
            .max_id()
            .await?;

        info!(
            film_high_water,
            user_high_water, "Database connected & migrations applied"
        );

        Ok(Self {
            conn,
            film_ids: Arc::new(IdAllocator::starting_after(film_high_water)),
            user_ids: Arc::new(IdAllocator::starting_after(user_high_water)),
        })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn film_repo(&self) -> repositories::film::FilmRepository {
        repositories::film::FilmRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }
}

#[async_trait::async_trait]
impl FilmStorage for Store {
    async fn add_film(&self, draft: FilmDraft) -> Result<Film> {
        let film = draft.into_film(FilmId::new(self.film_ids.next()));
        self.film_repo().add(&film).await?;
        Ok(film)
    }

    async fn update_film(&self, film: Film) -> Result<Option<Film>> {
        let repo = self.film_repo();
        if !repo.update(&film).await? {
            return Ok(None);
        }
        // Re-read so the returned record carries the stored like set
        // rather than whatever the caller sent.
        repo.get(film.id).await
    }

    async fn delete_film(&self, id: FilmId) -> Result<bool> {
        self.film_repo().delete(id).await
    }

    async fn get_film(&self, id: FilmId) -> Result<Option<Film>> {
        self.film_repo().get(id).await
    }

    async fn list_films(&self) -> Result<Vec<Film>> {
        self.film_repo().list().await
    }

    async fn add_like(&self, film: FilmId, user: UserId) -> Result<()> {
        self.film_repo().add_like(film, user).await
    }

    async fn remove_like(&self, film: FilmId, user: UserId) -> Result<()> {
        self.film_repo().remove_like(film, user).await
    }

    async fn like_count(&self, film: FilmId) -> Result<u64> {
        self.film_repo().like_count(film).await
    }

    async fn remove_likes_by_user(&self, user: UserId) -> Result<()> {
        self.film_repo().remove_likes_by_user(user).await
    }

    async fn get_rating(&self, id: i32) -> Result<Option<MpaRating>> {
        self.film_repo().get_rating(id).await
    }

    async fn list_ratings(&self) -> Result<Vec<MpaRating>> {
        self.film_repo().list_ratings().await
    }

    async fn get_genre(&self, id: i32) -> Result<Option<Genre>> {
        self.film_repo().get_genre(id).await
    }

    async fn list_genres(&self) -> Result<Vec<Genre>> {
        self.film_repo().list_genres().await
    }
}

#[async_trait::async_trait]
impl UserStorage for Store {
    async fn add_user(&self, draft: UserDraft) -> Result<User> {
        let user = draft.into_user(UserId::new(self.user_ids.next()));
        self.user_repo().add(&user).await?;
        Ok(user)
    }

    async fn update_user(&self, user: User) -> Result<Option<User>> {
        let repo = self.user_repo();
        if !repo.update(&user).await? {
            return Ok(None);
        }
        repo.get(user.id).await
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.user_repo().get(id).await
    }

    async fn get_users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>> {
        self.user_repo().get_by_ids(ids).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    async fn add_friend_pair(&self, a: UserId, b: UserId) -> Result<()> {
        self.user_repo().add_friend_pair(a, b).await
    }

    async fn remove_friend_pair(&self, a: UserId, b: UserId) -> Result<()> {
        self.user_repo().remove_friend_pair(a, b).await
    }
}

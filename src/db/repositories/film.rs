use crate::domain::{FilmId, UserId};
use crate::entities::{film_genres, film_likes, films, genres, mpa_ratings, prelude::*};
use crate::models::{Film, Genre, MpaRating};
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Repository for films, their genre attachments and the like registry.
pub struct FilmRepository {
    conn: DatabaseConnection,
}

impl FilmRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Model Conversion Helpers
    // ========================================================================

    fn map_film(row: films::Model, genres: BTreeSet<i32>, likes: BTreeSet<UserId>) -> Film {
        Film {
            id: FilmId::new(row.id),
            name: row.name,
            description: row.description,
            release_date: row.release_date,
            duration: row.duration,
            rate: row.rate,
            mpa: row.mpa_id,
            genres,
            likes,
        }
    }

    fn film_row(film: &Film) -> films::ActiveModel {
        films::ActiveModel {
            id: Set(film.id.value()),
            name: Set(film.name.clone()),
            description: Set(film.description.clone()),
            release_date: Set(film.release_date),
            duration: Set(film.duration),
            rate: Set(film.rate),
            mpa_id: Set(film.mpa),
        }
    }

    // A duplicate (film, user) or (film, genre) pair is a no-op, which
    // sea-orm reports as RecordNotInserted.
    fn ignore_duplicate<T>(res: Result<T, DbErr>) -> Result<(), DbErr> {
        match res {
            Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // Film CRUD
    // ========================================================================

    /// Persists a freshly allocated film and its genre attachments in
    /// one transaction; a failed genre write leaves no film row behind.
    pub async fn add(&self, film: &Film) -> Result<()> {
        let txn = self.conn.begin().await?;

        Films::insert(Self::film_row(film)).exec(&txn).await?;
        for genre_id in &film.genres {
            let row = film_genres::ActiveModel {
                film_id: Set(film.id.value()),
                genre_id: Set(*genre_id),
            };
            Self::ignore_duplicate(FilmGenres::insert(row).exec(&txn).await)?;
        }

        txn.commit().await?;
        debug!(film_id = %film.id, "film row inserted");
        Ok(())
    }

    /// Full-record replace; genre attachments are deleted and rewritten.
    /// Returns `false` when no row with that id exists.
    pub async fn update(&self, film: &Film) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let updated = Films::update_many()
            .set(Self::film_row(film))
            .filter(films::Column::Id.eq(film.id.value()))
            .exec(&txn)
            .await?;
        if updated.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(false);
        }

        FilmGenres::delete_many()
            .filter(film_genres::Column::FilmId.eq(film.id.value()))
            .exec(&txn)
            .await?;
        for genre_id in &film.genres {
            let row = film_genres::ActiveModel {
                film_id: Set(film.id.value()),
                genre_id: Set(*genre_id),
            };
            Self::ignore_duplicate(FilmGenres::insert(row).exec(&txn).await)?;
        }

        txn.commit().await?;
        Ok(true)
    }

    /// Deletes the film and cascades its like and genre edges in the
    /// same transaction.
    pub async fn delete(&self, id: FilmId) -> Result<bool> {
        let txn = self.conn.begin().await?;

        FilmLikes::delete_many()
            .filter(film_likes::Column::FilmId.eq(id.value()))
            .exec(&txn)
            .await?;
        FilmGenres::delete_many()
            .filter(film_genres::Column::FilmId.eq(id.value()))
            .exec(&txn)
            .await?;
        let deleted = Films::delete_by_id(id.value()).exec(&txn).await?;

        txn.commit().await?;
        Ok(deleted.rows_affected > 0)
    }

    pub async fn get(&self, id: FilmId) -> Result<Option<Film>> {
        let Some(row) = Films::find_by_id(id.value()).one(&self.conn).await? else {
            return Ok(None);
        };

        let genres: BTreeSet<i32> = FilmGenres::find()
            .filter(film_genres::Column::FilmId.eq(id.value()))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|g| g.genre_id)
            .collect();

        let likes: BTreeSet<UserId> = FilmLikes::find()
            .filter(film_likes::Column::FilmId.eq(id.value()))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|l| UserId::new(l.user_id))
            .collect();

        Ok(Some(Self::map_film(row, genres, likes)))
    }

    /// All films with their edges, assembled from three batch queries.
    pub async fn list(&self) -> Result<Vec<Film>> {
        let rows = Films::find().all(&self.conn).await?;

        let mut genre_map: HashMap<i64, BTreeSet<i32>> = HashMap::new();
        for edge in FilmGenres::find().all(&self.conn).await? {
            genre_map.entry(edge.film_id).or_default().insert(edge.genre_id);
        }

        let mut like_map: HashMap<i64, BTreeSet<UserId>> = HashMap::new();
        for edge in FilmLikes::find().all(&self.conn).await? {
            like_map
                .entry(edge.film_id)
                .or_default()
                .insert(UserId::new(edge.user_id));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let genres = genre_map.remove(&row.id).unwrap_or_default();
                let likes = like_map.remove(&row.id).unwrap_or_default();
                Self::map_film(row, genres, likes)
            })
            .collect())
    }

    /// High-water mark for the id allocator.
    pub async fn max_id(&self) -> Result<i64> {
        let newest = Films::find()
            .order_by_desc(films::Column::Id)
            .one(&self.conn)
            .await?;
        Ok(newest.map_or(0, |f| f.id))
    }

    // ========================================================================
    // Like Registry
    // ========================================================================

    pub async fn add_like(&self, film: FilmId, user: UserId) -> Result<()> {
        let row = film_likes::ActiveModel {
            film_id: Set(film.value()),
            user_id: Set(user.value()),
        };
        let insert = FilmLikes::insert(row).on_conflict(
            OnConflict::columns([film_likes::Column::FilmId, film_likes::Column::UserId])
                .do_nothing()
                .to_owned(),
        );
        Self::ignore_duplicate(insert.exec(&self.conn).await)?;
        Ok(())
    }

    pub async fn remove_like(&self, film: FilmId, user: UserId) -> Result<()> {
        FilmLikes::delete_many()
            .filter(film_likes::Column::FilmId.eq(film.value()))
            .filter(film_likes::Column::UserId.eq(user.value()))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    pub async fn like_count(&self, film: FilmId) -> Result<u64> {
        let count = FilmLikes::find()
            .filter(film_likes::Column::FilmId.eq(film.value()))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    pub async fn remove_likes_by_user(&self, user: UserId) -> Result<()> {
        FilmLikes::delete_many()
            .filter(film_likes::Column::UserId.eq(user.value()))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    // ========================================================================
    // Reference Tables
    // ========================================================================

    pub async fn get_rating(&self, id: i32) -> Result<Option<MpaRating>> {
        let row = MpaRatings::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(|r| MpaRating {
            id: r.id,
            name: r.name,
        }))
    }

    pub async fn list_ratings(&self) -> Result<Vec<MpaRating>> {
        let rows = MpaRatings::find()
            .order_by_asc(mpa_ratings::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| MpaRating {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    pub async fn get_genre(&self, id: i32) -> Result<Option<Genre>> {
        let row = Genres::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(|g| Genre {
            id: g.id,
            name: g.name,
        }))
    }

    pub async fn list_genres(&self) -> Result<Vec<Genre>> {
        let rows = Genres::find()
            .order_by_asc(genres::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows
            .into_iter()
            .map(|g| Genre {
                id: g.id,
                name: g.name,
            })
            .collect())
    }
}

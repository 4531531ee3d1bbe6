//! Storage contract for the catalog.
//!
//! Two interchangeable backends implement these traits: an in-memory
//! map ([`memory::MemoryCatalog`]) and a SQLite-backed store
//! (`crate::db::Store`). The backend is selected once at process
//! wiring time; the services only ever see `Arc<dyn FilmStorage>` /
//! `Arc<dyn UserStorage>`.
//!
//! Absence is reported as `Ok(None)` / `Ok(false)` here; translating
//! that into the caller-facing error taxonomy is the service layer's
//! job. Storage-level faults (connection loss, constraint failures)
//! surface as `Err`.

pub mod memory;

use anyhow::Result;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::{FilmId, UserId};
use crate::models::{Film, FilmDraft, Genre, MpaRating, User, UserDraft};

/// Issues unique, strictly increasing entity ids, starting at 1.
///
/// One allocator exists per entity kind. Ids are never handed out
/// twice within a process lifetime, even after deletions. A durable
/// backend reconstructs the high-water mark from its existing max id
/// on startup via [`IdAllocator::starting_after`].
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicI64,
}

impl IdAllocator {
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_after(0)
    }

    /// Creates an allocator whose first issued id is `high_water + 1`.
    #[must_use]
    pub const fn starting_after(high_water: i64) -> Self {
        Self {
            next: AtomicI64::new(high_water + 1),
        }
    }

    pub fn next(&self) -> i64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Keyed film storage plus the like registry and the closed
/// rating/genre reference tables.
#[async_trait::async_trait]
pub trait FilmStorage: Send + Sync {
    /// Assigns a fresh id, persists the film with an empty like set and
    /// returns the stored copy.
    async fn add_film(&self, draft: FilmDraft) -> Result<Film>;

    /// Full-record replace of the mutable fields. The like set is owned
    /// by the like registry and survives the update untouched.
    /// Returns `None` if no film with that id exists.
    async fn update_film(&self, film: Film) -> Result<Option<Film>>;

    /// Removes the film and every like edge referencing it.
    /// Returns `false` if no film with that id existed.
    async fn delete_film(&self, id: FilmId) -> Result<bool>;

    async fn get_film(&self, id: FilmId) -> Result<Option<Film>>;

    /// All films, in no guaranteed order.
    async fn list_films(&self) -> Result<Vec<Film>>;

    /// Records "user likes film". Idempotent: re-liking is a no-op.
    async fn add_like(&self, film: FilmId, user: UserId) -> Result<()>;

    /// Removes the like edge if present; no-op otherwise.
    async fn remove_like(&self, film: FilmId, user: UserId) -> Result<()>;

    async fn like_count(&self, film: FilmId) -> Result<u64>;

    /// Cascade hook: drops every like edge left behind by a deleted user.
    async fn remove_likes_by_user(&self, user: UserId) -> Result<()>;

    async fn get_rating(&self, id: i32) -> Result<Option<MpaRating>>;

    async fn list_ratings(&self) -> Result<Vec<MpaRating>>;

    async fn get_genre(&self, id: i32) -> Result<Option<Genre>>;

    async fn list_genres(&self) -> Result<Vec<Genre>>;
}

/// Keyed user storage plus the friendship graph.
///
/// Friend sets are stored embedded in each [`User`] record; the pair
/// operations keep the relation symmetric and must apply both sides as
/// one atomic step so no observer sees a half-updated edge.
#[async_trait::async_trait]
pub trait UserStorage: Send + Sync {
    /// Assigns a fresh id, applies the display-name fallback, persists
    /// the user with an empty friend set and returns the stored copy.
    async fn add_user(&self, draft: UserDraft) -> Result<User>;

    /// Full-record replace of the mutable fields. The friend set is
    /// owned by the friendship graph and survives the update untouched.
    /// Returns `None` if no user with that id exists.
    async fn update_user(&self, user: User) -> Result<Option<User>>;

    /// Removes the user and scrubs them out of every other user's
    /// friend set. Returns `false` if no user with that id existed.
    async fn delete_user(&self, id: UserId) -> Result<bool>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Batch lookup; ids without a matching user are silently skipped.
    async fn get_users_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>>;

    /// All users, in no guaranteed order.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Inserts `b` into `a`'s friend set and `a` into `b`'s, atomically.
    /// Idempotent if already friends. Callers guarantee both ids exist
    /// and `a != b`.
    async fn add_friend_pair(&self, a: UserId, b: UserId) -> Result<()>;

    /// Removes each id from the other's friend set; no-op if they were
    /// not friends.
    async fn remove_friend_pair(&self, a: UserId, b: UserId) -> Result<()>;
}

/// The closed MPA rating table. Both backends seed exactly this set so
/// reference-integrity checks behave identically regardless of backend.
#[must_use]
pub fn reference_ratings() -> Vec<MpaRating> {
    ["G", "PG", "PG-13", "R", "NC-17"]
        .iter()
        .enumerate()
        .map(|(i, name)| MpaRating {
            id: i as i32 + 1,
            name: (*name).to_string(),
        })
        .collect()
}

/// The closed genre table.
#[must_use]
pub fn reference_genres() -> Vec<Genre> {
    [
        "Comedy",
        "Drama",
        "Cartoon",
        "Thriller",
        "Documentary",
        "Action",
    ]
    .iter()
    .enumerate()
    .map(|(i, name)| Genre {
        id: i as i32 + 1,
        name: (*name).to_string(),
    })
    .collect()
}

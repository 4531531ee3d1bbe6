use crate::domain::UserId;
use crate::entities::{friendships, prelude::*, users};
use crate::models::User;
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Repository for users and the friendship edge table.
///
/// Friendship is stored as one row per direction; the pair writers keep
/// both directions in a single transaction so a crash can never leave a
/// one-sided friendship behind.
pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_user(row: users::Model, friends: BTreeSet<UserId>) -> User {
        User {
            id: UserId::new(row.id),
            email: row.email,
            login: row.login,
            name: row.name,
            birthday: row.birthday,
            friends,
        }
    }

    fn user_row(user: &User) -> users::ActiveModel {
        users::ActiveModel {
            id: Set(user.id.value()),
            email: Set(user.email.clone()),
            login: Set(user.login.clone()),
            name: Set(user.name.clone()),
            birthday: Set(user.birthday),
        }
    }

    fn ignore_duplicate<T>(res: Result<T, DbErr>) -> Result<(), DbErr> {
        match res {
            Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // User CRUD
    // ========================================================================

    pub async fn add(&self, user: &User) -> Result<()> {
        Users::insert(Self::user_row(user)).exec(&self.conn).await?;
        debug!(user_id = %user.id, "user row inserted");
        Ok(())
    }

    /// Full-record replace of the profile columns. Friendship edges are
    /// untouched. Returns `false` when no row with that id exists.
    pub async fn update(&self, user: &User) -> Result<bool> {
        let updated = Users::update_many()
            .set(Self::user_row(user))
            .filter(users::Column::Id.eq(user.id.value()))
            .exec(&self.conn)
            .await?;
        Ok(updated.rows_affected > 0)
    }

    /// Deletes the user and every friendship edge touching them, in
    /// both directions, within one transaction. Like rows are handled
    /// by the film repository.
    pub async fn delete(&self, id: UserId) -> Result<bool> {
        let txn = self.conn.begin().await?;

        Friendships::delete_many()
            .filter(
                Condition::any()
                    .add(friendships::Column::UserId.eq(id.value()))
                    .add(friendships::Column::FriendId.eq(id.value())),
            )
            .exec(&txn)
            .await?;
        let deleted = Users::delete_by_id(id.value()).exec(&txn).await?;

        txn.commit().await?;
        Ok(deleted.rows_affected > 0)
    }

    pub async fn get(&self, id: UserId) -> Result<Option<User>> {
        let Some(row) = Users::find_by_id(id.value()).one(&self.conn).await? else {
            return Ok(None);
        };

        let friends: BTreeSet<UserId> = Friendships::find()
            .filter(friendships::Column::UserId.eq(id.value()))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|f| UserId::new(f.friend_id))
            .collect();

        Ok(Some(Self::map_user(row, friends)))
    }

    /// Fetches the named users in id order; ids with no row are skipped.
    pub async fn get_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.value()).collect();

        let rows = Users::find()
            .filter(users::Column::Id.is_in(raw.clone()))
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await?;

        let mut friend_map: HashMap<i64, BTreeSet<UserId>> = HashMap::new();
        for edge in Friendships::find()
            .filter(friendships::Column::UserId.is_in(raw))
            .all(&self.conn)
            .await?
        {
            friend_map
                .entry(edge.user_id)
                .or_default()
                .insert(UserId::new(edge.friend_id));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let friends = friend_map.remove(&row.id).unwrap_or_default();
                Self::map_user(row, friends)
            })
            .collect())
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = Users::find().all(&self.conn).await?;

        let mut friend_map: HashMap<i64, BTreeSet<UserId>> = HashMap::new();
        for edge in Friendships::find().all(&self.conn).await? {
            friend_map
                .entry(edge.user_id)
                .or_default()
                .insert(UserId::new(edge.friend_id));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let friends = friend_map.remove(&row.id).unwrap_or_default();
                Self::map_user(row, friends)
            })
            .collect())
    }

    /// High-water mark for the id allocator.
    pub async fn max_id(&self) -> Result<i64> {
        let newest = Users::find()
            .order_by_desc(users::Column::Id)
            .one(&self.conn)
            .await?;
        Ok(newest.map_or(0, |u| u.id))
    }

    // ========================================================================
    // Friendship Edges
    // ========================================================================

    pub async fn add_friend_pair(&self, a: UserId, b: UserId) -> Result<()> {
        let txn = self.conn.begin().await?;

        for (from, to) in [(a, b), (b, a)] {
            let row = friendships::ActiveModel {
                user_id: Set(from.value()),
                friend_id: Set(to.value()),
            };
            let insert = Friendships::insert(row).on_conflict(
                OnConflict::columns([
                    friendships::Column::UserId,
                    friendships::Column::FriendId,
                ])
                .do_nothing()
                .to_owned(),
            );
            Self::ignore_duplicate(insert.exec(&txn).await)?;
        }

        txn.commit().await?;
        Ok(())
    }

    pub async fn remove_friend_pair(&self, a: UserId, b: UserId) -> Result<()> {
        let txn = self.conn.begin().await?;

        for (from, to) in [(a, b), (b, a)] {
            Friendships::delete_many()
                .filter(friendships::Column::UserId.eq(from.value()))
                .filter(friendships::Column::FriendId.eq(to.value()))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }
}

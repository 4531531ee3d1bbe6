//! User operations: CRUD and the symmetric friendship graph.

use super::CatalogError;
use crate::domain::UserId;
use crate::models::{User, UserDraft};
use chrono::NaiveDate;

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Validates the draft, applies the display-name fallback, assigns a
    /// fresh id and stores the user.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Validation`] on field violations
    /// - [`CatalogError::Storage`] on backend failures
    async fn add_user(&self, draft: UserDraft) -> Result<User, CatalogError>;

    /// Full-record replace of the profile fields. The friend set is
    /// preserved regardless of what the incoming record carries, and a
    /// blank name falls back to the login here too.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidReference`] if the id is non-positive
    /// - [`CatalogError::UserNotFound`] if no user with that id exists
    /// - [`CatalogError::Validation`] on field violations
    async fn update_user(&self, user: User) -> Result<User, CatalogError>;

    /// Removes the user, scrubs them out of every friend set and drops
    /// every like they ever placed.
    async fn delete_user(&self, id: UserId) -> Result<(), CatalogError>;

    async fn get_user(&self, id: UserId) -> Result<User, CatalogError>;

    async fn list_users(&self) -> Result<Vec<User>, CatalogError>;

    /// Makes `a` and `b` friends of each other in one step. Idempotent.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::SelfFriendship`] when `a == b`, checked before
    ///   existence so it fires even for unknown ids
    /// - [`CatalogError::UserNotFound`] if either side does not exist
    async fn add_friend(&self, a: UserId, b: UserId) -> Result<(), CatalogError>;

    /// Dissolves the friendship from both sides. Removing a friendship
    /// that never existed is a no-op, but both users must exist.
    async fn remove_friend(&self, a: UserId, b: UserId) -> Result<(), CatalogError>;

    /// The user's friends as full records, ordered by id.
    async fn friends_of(&self, id: UserId) -> Result<Vec<User>, CatalogError>;

    /// Users who are friends with both `a` and `b`, ordered by id.
    /// Rejects `a == b` the same way the friend mutations do.
    async fn common_friends(&self, a: UserId, b: UserId) -> Result<Vec<User>, CatalogError>;
}

/// Field rules for users. Pure, shared by create and update. `today` is
/// passed in so the future-birthday rule stays testable.
pub fn validate_user_fields(
    email: &str,
    login: &str,
    birthday: NaiveDate,
    today: NaiveDate,
) -> Result<(), CatalogError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(CatalogError::Validation(
            "email must not be blank and must contain '@'".to_string(),
        ));
    }
    if login.trim().is_empty() || login.contains(char::is_whitespace) {
        return Err(CatalogError::Validation(
            "login must not be blank or contain whitespace".to_string(),
        ));
    }
    if birthday > today {
        return Err(CatalogError::Validation(
            "birthday must not be in the future".to_string(),
        ));
    }
    Ok(())
}

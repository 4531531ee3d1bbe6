use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::UserId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub login: String,
    /// Display name; falls back to the login when left blank.
    pub name: String,
    pub birthday: NaiveDate,
    /// Ids of this user's friends. Friendship is symmetric: every id in
    /// here has this user in its own set.
    #[serde(default)]
    pub friends: BTreeSet<UserId>,
}

impl User {
    /// Applies the display-name rule: a missing or blank name is
    /// replaced by the login. Runs on both create and update.
    pub fn normalize_name(&mut self) {
        if self.name.trim().is_empty() {
            self.name = self.login.clone();
        }
    }
}

/// A user as submitted for creation, before an id is assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDraft {
    pub email: String,
    pub login: String,
    #[serde(default)]
    pub name: String,
    pub birthday: NaiveDate,
}

impl UserDraft {
    /// Materializes the draft under a fresh id with an empty friend set,
    /// applying the display-name fallback.
    #[must_use]
    pub fn into_user(self, id: UserId) -> User {
        let mut user = User {
            id,
            email: self.email,
            login: self.login,
            name: self.name,
            birthday: self.birthday,
            friends: BTreeSet::new(),
        };
        user.normalize_name();
        user
    }
}

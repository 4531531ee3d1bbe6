use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use super::user_service::{validate_user_fields, UserService};
use super::CatalogError;
use crate::domain::UserId;
use crate::models::{User, UserDraft};
use crate::storage::{FilmStorage, UserStorage};

/// Production [`UserService`] backed by the storage traits. Holds the
/// film storage too so a user deletion can drop the likes they placed.
pub struct DefaultUserService {
    users: Arc<dyn UserStorage>,
    films: Arc<dyn FilmStorage>,
}

impl DefaultUserService {
    pub fn new(users: Arc<dyn UserStorage>, films: Arc<dyn FilmStorage>) -> Self {
        Self { users, films }
    }

    fn check_user_id(id: UserId) -> Result<(), CatalogError> {
        if id.is_valid() {
            Ok(())
        } else {
            Err(CatalogError::InvalidReference(id.value()))
        }
    }

    async fn require_user(&self, id: UserId) -> Result<User, CatalogError> {
        Self::check_user_id(id)?;
        self.users
            .get_user(id)
            .await?
            .ok_or(CatalogError::UserNotFound(id))
    }
}

#[async_trait::async_trait]
impl UserService for DefaultUserService {
    async fn add_user(&self, draft: UserDraft) -> Result<User, CatalogError> {
        validate_user_fields(
            &draft.email,
            &draft.login,
            draft.birthday,
            Utc::now().date_naive(),
        )?;
        let user = self.users.add_user(draft).await?;
        debug!(user_id = %user.id, login = %user.login, "user added");
        Ok(user)
    }

    async fn update_user(&self, mut user: User) -> Result<User, CatalogError> {
        Self::check_user_id(user.id)?;
        validate_user_fields(
            &user.email,
            &user.login,
            user.birthday,
            Utc::now().date_naive(),
        )?;
        user.normalize_name();

        let id = user.id;
        self.users
            .update_user(user)
            .await?
            .ok_or(CatalogError::UserNotFound(id))
    }

    async fn delete_user(&self, id: UserId) -> Result<(), CatalogError> {
        Self::check_user_id(id)?;
        if !self.users.delete_user(id).await? {
            return Err(CatalogError::UserNotFound(id));
        }
        // The friend-set scrub happens inside the user storage; likes
        // live with the films and are cascaded here.
        self.films.remove_likes_by_user(id).await?;
        debug!(user_id = %id, "user deleted");
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<User, CatalogError> {
        self.require_user(id).await
    }

    async fn list_users(&self) -> Result<Vec<User>, CatalogError> {
        Ok(self.users.list_users().await?)
    }

    async fn add_friend(&self, a: UserId, b: UserId) -> Result<(), CatalogError> {
        Self::check_user_id(a)?;
        Self::check_user_id(b)?;
        if a == b {
            return Err(CatalogError::SelfFriendship(a));
        }
        self.require_user(a).await?;
        self.require_user(b).await?;
        self.users.add_friend_pair(a, b).await?;
        debug!(user_id = %a, friend_id = %b, "friendship added");
        Ok(())
    }

    async fn remove_friend(&self, a: UserId, b: UserId) -> Result<(), CatalogError> {
        Self::check_user_id(a)?;
        Self::check_user_id(b)?;
        if a == b {
            return Err(CatalogError::SelfFriendship(a));
        }
        self.require_user(a).await?;
        self.require_user(b).await?;
        self.users.remove_friend_pair(a, b).await?;
        Ok(())
    }

    async fn friends_of(&self, id: UserId) -> Result<Vec<User>, CatalogError> {
        let user = self.require_user(id).await?;
        let ids: Vec<UserId> = user.friends.iter().copied().collect();
        let mut friends = self.users.get_users_by_ids(&ids).await?;
        friends.sort_by_key(|u| u.id.value());
        Ok(friends)
    }

    async fn common_friends(&self, a: UserId, b: UserId) -> Result<Vec<User>, CatalogError> {
        Self::check_user_id(a)?;
        Self::check_user_id(b)?;
        if a == b {
            return Err(CatalogError::SelfFriendship(a));
        }
        let first = self.require_user(a).await?;
        let second = self.require_user(b).await?;
        let shared: Vec<UserId> = first.friends.intersection(&second.friends).copied().collect();
        let mut friends = self.users.get_users_by_ids(&shared).await?;
        friends.sort_by_key(|u| u.id.value());
        Ok(friends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FilmId;
    use crate::models::FilmDraft;
    use crate::storage::memory::MemoryCatalog;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn service() -> (DefaultUserService, Arc<MemoryCatalog>) {
        let catalog = Arc::new(MemoryCatalog::new());
        let service = DefaultUserService::new(catalog.clone(), catalog.clone());
        (service, catalog)
    }

    fn draft(login: &str) -> UserDraft {
        UserDraft {
            email: format!("{login}@example.com"),
            login: login.to_string(),
            name: String::new(),
            birthday: NaiveDate::from_ymd_opt(1990, 5, 5).unwrap(),
        }
    }

    #[tokio::test]
    async fn add_applies_name_fallback() {
        let (service, _) = service();
        let user = service.add_user(draft("ada")).await.unwrap();
        assert_eq!(user.name, "ada");
    }

    #[tokio::test]
    async fn add_rejects_invalid_fields() {
        let (service, _) = service();
        let mut bad = draft("ada");
        bad.email = "no-at-sign".to_string();
        assert!(matches!(
            service.add_user(bad).await.unwrap_err(),
            CatalogError::Validation(_)
        ));

        let mut bad = draft("ada");
        bad.login = "with space".to_string();
        assert!(matches!(
            service.add_user(bad).await.unwrap_err(),
            CatalogError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn update_applies_name_fallback_and_preserves_friends() {
        let (service, _) = service();
        let a = service.add_user(draft("ada")).await.unwrap();
        let b = service.add_user(draft("bob")).await.unwrap();
        service.add_friend(a.id, b.id).await.unwrap();

        let mut incoming = a.clone();
        incoming.name = String::new();
        incoming.email = "ada@new.example".to_string();
        incoming.friends = BTreeSet::new();
        let updated = service.update_user(incoming).await.unwrap();

        assert_eq!(updated.name, "ada");
        assert_eq!(updated.email, "ada@new.example");
        assert!(updated.friends.contains(&b.id));
    }

    #[tokio::test]
    async fn update_missing_user_is_not_found() {
        let (service, _) = service();
        let ghost = draft("ghost").into_user(UserId::new(9999));
        assert!(matches!(
            service.update_user(ghost).await.unwrap_err(),
            CatalogError::UserNotFound(_)
        ));
    }

    #[tokio::test]
    async fn friendship_is_symmetric_and_idempotent() {
        let (service, _) = service();
        let a = service.add_user(draft("ada")).await.unwrap();
        let b = service.add_user(draft("bob")).await.unwrap();

        service.add_friend(a.id, b.id).await.unwrap();
        service.add_friend(a.id, b.id).await.unwrap();

        let a_friends = service.friends_of(a.id).await.unwrap();
        let b_friends = service.friends_of(b.id).await.unwrap();
        assert_eq!(a_friends.len(), 1);
        assert_eq!(a_friends[0].id, b.id);
        assert_eq!(b_friends.len(), 1);
        assert_eq!(b_friends[0].id, a.id);
    }

    #[tokio::test]
    async fn self_friendship_is_rejected_even_for_unknown_id() {
        let (service, _) = service();
        let a = service.add_user(draft("ada")).await.unwrap();
        assert!(matches!(
            service.add_friend(a.id, a.id).await.unwrap_err(),
            CatalogError::SelfFriendship(_)
        ));

        // The self check fires before existence is consulted.
        let ghost = UserId::new(777);
        assert!(matches!(
            service.add_friend(ghost, ghost).await.unwrap_err(),
            CatalogError::SelfFriendship(_)
        ));
    }

    #[tokio::test]
    async fn friend_ops_require_both_users() {
        let (service, _) = service();
        let a = service.add_user(draft("ada")).await.unwrap();
        assert!(matches!(
            service.add_friend(a.id, UserId::new(404)).await.unwrap_err(),
            CatalogError::UserNotFound(_)
        ));
        assert!(matches!(
            service.add_friend(a.id, UserId::new(0)).await.unwrap_err(),
            CatalogError::InvalidReference(0)
        ));
    }

    #[tokio::test]
    async fn remove_friend_dissolves_both_sides() {
        let (service, _) = service();
        let a = service.add_user(draft("ada")).await.unwrap();
        let b = service.add_user(draft("bob")).await.unwrap();
        service.add_friend(a.id, b.id).await.unwrap();

        service.remove_friend(b.id, a.id).await.unwrap();

        assert!(service.friends_of(a.id).await.unwrap().is_empty());
        assert!(service.friends_of(b.id).await.unwrap().is_empty());

        // Removing again is a no-op.
        service.remove_friend(a.id, b.id).await.unwrap();
    }

    #[tokio::test]
    async fn common_friends_is_the_intersection() {
        let (service, _) = service();
        let a = service.add_user(draft("ada")).await.unwrap();
        let b = service.add_user(draft("bob")).await.unwrap();
        let c = service.add_user(draft("cyd")).await.unwrap();
        let d = service.add_user(draft("dee")).await.unwrap();

        service.add_friend(a.id, c.id).await.unwrap();
        service.add_friend(b.id, c.id).await.unwrap();
        service.add_friend(a.id, d.id).await.unwrap();

        let shared = service.common_friends(a.id, b.id).await.unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].id, c.id);

        assert!(matches!(
            service.common_friends(a.id, a.id).await.unwrap_err(),
            CatalogError::SelfFriendship(_)
        ));
    }

    #[tokio::test]
    async fn delete_cascades_friend_sets_and_likes() {
        let (service, catalog) = service();
        let a = service.add_user(draft("ada")).await.unwrap();
        let b = service.add_user(draft("bob")).await.unwrap();
        service.add_friend(a.id, b.id).await.unwrap();

        let film = catalog
            .add_film(FilmDraft {
                name: "Alien".to_string(),
                description: String::new(),
                release_date: NaiveDate::from_ymd_opt(1979, 5, 25).unwrap(),
                duration: 117,
                rate: 0,
                mpa: None,
                genres: BTreeSet::new(),
            })
            .await
            .unwrap();
        catalog.add_like(film.id, a.id).await.unwrap();

        service.delete_user(a.id).await.unwrap();

        assert!(matches!(
            service.get_user(a.id).await.unwrap_err(),
            CatalogError::UserNotFound(_)
        ));
        assert!(service.friends_of(b.id).await.unwrap().is_empty());
        assert_eq!(catalog.like_count(film.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn friends_are_sorted_by_id() {
        let (service, _) = service();
        let a = service.add_user(draft("ada")).await.unwrap();
        let b = service.add_user(draft("bob")).await.unwrap();
        let c = service.add_user(draft("cyd")).await.unwrap();

        service.add_friend(a.id, c.id).await.unwrap();
        service.add_friend(a.id, b.id).await.unwrap();

        let friends = service.friends_of(a.id).await.unwrap();
        let ids: Vec<i64> = friends.iter().map(|u| u.id.value()).collect();
        assert_eq!(ids, vec![b.id.value(), c.id.value()]);
    }

    #[tokio::test]
    async fn delete_with_non_positive_id_is_invalid_reference() {
        let (service, _) = service();
        assert!(matches!(
            service.delete_user(UserId::new(-1)).await.unwrap_err(),
            CatalogError::InvalidReference(-1)
        ));
    }
}

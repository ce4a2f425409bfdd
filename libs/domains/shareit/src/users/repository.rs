use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use super::models::{CreateUser, UpdateUser, User, same_email};
use crate::error::{ShareItError, ShareItResult};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `DuplicateEmail` when the e-mail is taken
    async fn create(&self, input: CreateUser) -> ShareItResult<User>;

    async fn get_by_id(&self, id: i64) -> ShareItResult<Option<User>>;

    /// All users ordered by id
    async fn list(&self) -> ShareItResult<Vec<User>>;

    async fn update(&self, id: i64, input: UpdateUser) -> ShareItResult<User>;

    /// Returns false when no such user existed
    async fn delete(&self, id: i64) -> ShareItResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<BTreeMap<i64, User>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, input: CreateUser) -> ShareItResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| same_email(&u.email, &input.email)) {
            return Err(ShareItError::DuplicateEmail(input.email));
        }

        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: input.name,
            email: input.email,
        };
        users.insert(user.id, user.clone());

        tracing::info!(user_id = user.id, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> ShareItResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn list(&self) -> ShareItResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.values().cloned().collect())
    }

    async fn update(&self, id: i64, input: UpdateUser) -> ShareItResult<User> {
        let mut users = self.users.write().await;

        if let Some(ref email) = input.email {
            let taken = users
                .values()
                .any(|u| u.id != id && same_email(&u.email, email));
            if taken {
                return Err(ShareItError::DuplicateEmail(email.clone()));
            }
        }

        let user = users
            .get_mut(&id)
            .ok_or_else(|| ShareItError::user_not_found(id))?;
        user.apply_update(input);

        tracing::info!(user_id = id, "Updated user");
        Ok(user.clone())
    }

    async fn delete(&self, id: i64) -> ShareItResult<bool> {
        let mut users = self.users.write().await;
        let removed = users.remove(&id).is_some();

        if removed {
            tracing::info!(user_id = id, "Deleted user");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> CreateUser {
        CreateUser {
            name: "Ann".into(),
            email: "ann@example.com".into(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create(ann()).await.unwrap();
        let second = repo
            .create(CreateUser {
                name: "Bob".into(),
                email: "bob@example.com".into(),
            })
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_ignores_case() {
        let repo = InMemoryUserRepository::new();
        repo.create(ann()).await.unwrap();

        let result = repo
            .create(CreateUser {
                name: "Other Ann".into(),
                email: "ANN@example.com".into(),
            })
            .await;
        assert!(matches!(result, Err(ShareItError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_update_may_keep_own_email() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(ann()).await.unwrap();

        let updated = repo
            .update(
                user.id,
                UpdateUser {
                    name: Some("Anna".into()),
                    email: Some("ann@example.com".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Anna");
    }

    #[tokio::test]
    async fn test_update_rejects_taken_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(ann()).await.unwrap();
        let bob = repo
            .create(CreateUser {
                name: "Bob".into(),
                email: "bob@example.com".into(),
            })
            .await
            .unwrap();

        let result = repo
            .update(
                bob.id,
                UpdateUser {
                    name: None,
                    email: Some("ann@example.com".into()),
                },
            )
            .await;
        assert!(matches!(result, Err(ShareItError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(ann()).await.unwrap();

        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert!(repo.get_by_id(user.id).await.unwrap().is_none());
    }
}

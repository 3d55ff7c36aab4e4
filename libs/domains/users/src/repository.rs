use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{UserChanges, UserDocument, UserFilter};

/// Document-store capability used by the user service.
///
/// Each method maps to a single atomic store primitive. Counts returned by
/// `update_one` and `delete_one` follow store semantics: the number of
/// documents modified or removed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find the first document matching the filter
    async fn find_one(&self, filter: UserFilter) -> UserResult<Option<UserDocument>>;

    /// Return every document in store iteration order
    async fn find_all(&self) -> UserResult<Vec<UserDocument>>;

    /// Insert a document, returning whether the store acknowledged it
    async fn insert_one(&self, document: UserDocument) -> UserResult<bool>;

    /// Apply a partial update to the first matching document
    async fn update_one(&self, filter: UserFilter, changes: UserChanges) -> UserResult<u64>;

    /// Delete the first matching document
    async fn delete_one(&self, filter: UserFilter) -> UserResult<u64>;
}

/// In-memory implementation of UserRepository (for development/testing)
///
/// Documents are kept in insertion order. Email uniqueness is enforced on
/// write, mirroring the unique index the MongoDB store installs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<UserDocument>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with pre-existing documents, e.g. legacy records
    pub fn with_documents(documents: Vec<UserDocument>) -> Self {
        Self {
            users: Arc::new(RwLock::new(documents)),
        }
    }
}

fn matches(doc: &UserDocument, filter: &UserFilter) -> bool {
    match filter {
        UserFilter::Email(email) => doc.email == *email,
        UserFilter::UserId(id) => doc.user_id == id.to_string(),
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_one(&self, filter: UserFilter) -> UserResult<Option<UserDocument>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| matches(u, &filter)).cloned())
    }

    async fn find_all(&self) -> UserResult<Vec<UserDocument>> {
        let users = self.users.read().await;
        Ok(users.clone())
    }

    async fn insert_one(&self, document: UserDocument) -> UserResult<bool> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.email == document.email) {
            return Err(UserError::DuplicateEmail(document.email));
        }

        tracing::debug!(user_id = %document.user_id, "Inserted user document");
        users.push(document);
        Ok(true)
    }

    async fn update_one(&self, filter: UserFilter, changes: UserChanges) -> UserResult<u64> {
        let mut users = self.users.write().await;

        let Some(index) = users.iter().position(|u| matches(u, &filter)) else {
            return Ok(0);
        };

        if let Some(ref email) = changes.email {
            let taken = users
                .iter()
                .enumerate()
                .any(|(i, u)| i != index && u.email == *email);
            if taken {
                return Err(UserError::DuplicateEmail(email.clone()));
            }
        }

        let before = users[index].clone();
        users[index].apply(&changes);

        Ok(u64::from(users[index] != before))
    }

    async fn delete_one(&self, filter: UserFilter) -> UserResult<u64> {
        let mut users = self.users.write().await;

        match users.iter().position(|u| matches(u, &filter)) {
            Some(index) => {
                let removed = users.remove(index);
                tracing::debug!(user_id = %removed.user_id, "Deleted user document");
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

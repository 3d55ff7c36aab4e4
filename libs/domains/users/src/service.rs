//! User Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{
    CreateUser, UpdateUser, UserChanges, UserDocument, UserFilter, UserResponse, parse_user_id,
};
use crate::repository::UserRepository;

/// User service providing the CRUD operations
///
/// Validates input, enforces email uniqueness and translates stored documents
/// into responses. Every repository call is a single store primitive.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new UserService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new user
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        self.create(input)
            .await
            .map_err(|e| e.during("Error creating user"))
    }

    /// List all users in store order
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> UserResult<Vec<UserResponse>> {
        self.list().await.map_err(|e| e.during("Error fetching users"))
    }

    /// Get a user by its identifier
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: &str) -> UserResult<UserResponse> {
        self.get(user_id)
            .await
            .map_err(|e| e.during("Error fetching user"))
    }

    /// Apply a partial update to an existing user
    #[instrument(skip(self, input))]
    pub async fn update_user(&self, user_id: &str, input: UpdateUser) -> UserResult<UserResponse> {
        self.update(user_id, input)
            .await
            .map_err(|e| e.during("Error updating user"))
    }

    /// Delete a user
    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: &str) -> UserResult<()> {
        self.delete(user_id)
            .await
            .map_err(|e| e.during("Error deleting user"))
    }

    async fn create(&self, input: CreateUser) -> UserResult<UserResponse> {
        input.validate()?;

        if self
            .repository
            .find_one(UserFilter::Email(input.email.clone()))
            .await?
            .is_some()
        {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let document = UserDocument::new(input);
        let user_id = document.user_id.clone();

        if !self.repository.insert_one(document.clone()).await? {
            return Err(UserError::Persistence("Failed to create user".to_string()));
        }

        tracing::info!(user_id = %user_id, "User created");
        document.try_into()
    }

    async fn list(&self) -> UserResult<Vec<UserResponse>> {
        self.repository
            .find_all()
            .await?
            .into_iter()
            .map(UserResponse::try_from)
            .collect()
    }

    async fn get(&self, user_id: &str) -> UserResult<UserResponse> {
        let id = parse_user_id(user_id)?;

        self.repository
            .find_one(UserFilter::UserId(id))
            .await?
            .ok_or(UserError::NotFound(id))?
            .try_into()
    }

    async fn update(&self, user_id: &str, input: UpdateUser) -> UserResult<UserResponse> {
        let id = parse_user_id(user_id)?;
        input.validate()?;
        if input.is_empty() {
            return Err(UserError::EmptyUpdate);
        }

        let existing = self
            .repository
            .find_one(UserFilter::UserId(id))
            .await?
            .ok_or(UserError::NotFound(id))?;

        if let Some(ref new_email) = input.email {
            if *new_email != existing.email
                && self
                    .repository
                    .find_one(UserFilter::Email(new_email.clone()))
                    .await?
                    .is_some()
            {
                return Err(UserError::DuplicateEmail(new_email.clone()));
            }
        }

        // Zero when the $set rewrites identical values within the same millisecond
        let modified = self
            .repository
            .update_one(UserFilter::UserId(id), UserChanges::from(input))
            .await?;
        if modified == 0 {
            return Err(UserError::Persistence("Failed to update user".to_string()));
        }

        tracing::info!(user_id = %id, "User updated");

        // A concurrent delete between update and re-read surfaces as not found
        self.repository
            .find_one(UserFilter::UserId(id))
            .await?
            .ok_or(UserError::NotFound(id))?
            .try_into()
    }

    async fn delete(&self, user_id: &str) -> UserResult<()> {
        let id = parse_user_id(user_id)?;

        let deleted = self.repository.delete_one(UserFilter::UserId(id)).await?;
        if deleted == 0 {
            return Err(UserError::NotFound(id));
        }

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use mockall::predicate::eq;
    use uuid::Uuid;

    const USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

    fn john() -> CreateUser {
        CreateUser {
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            age: 30,
        }
    }

    fn stored_john() -> UserDocument {
        UserDocument {
            user_id: USER_ID.to_string(),
            ..UserDocument::new(john())
        }
    }

    fn user_id() -> Uuid {
        Uuid::parse_str(USER_ID).unwrap()
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let service = UserService::new(InMemoryUserRepository::new());

        let created = service.create_user(john()).await.unwrap();
        assert_eq!(created.name, "John Doe");
        assert_eq!(created.email, "john@example.com");
        assert_eq!(created.age, 30);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = service
            .get_user(&created.user_id.to_string())
            .await
            .unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_one()
            .with(eq(UserFilter::Email("john@example.com".to_string())))
            .times(1)
            .returning(|_| Ok(Some(stored_john())));
        mock_repo.expect_insert_one().never();

        let service = UserService::new(mock_repo);
        let result = service.create_user(john()).await;

        assert!(matches!(
            result,
            Err(UserError::DuplicateEmail(email)) if email == "john@example.com"
        ));
    }

    #[tokio::test]
    async fn test_create_user_invalid_input_skips_store() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_find_one().never();
        mock_repo.expect_insert_one().never();

        let service = UserService::new(mock_repo);
        let result = service
            .create_user(CreateUser {
                email: "invalid-email".to_string(),
                ..john()
            })
            .await;

        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_user_not_acknowledged() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_find_one().returning(|_| Ok(None));
        mock_repo.expect_insert_one().times(1).returning(|_| Ok(false));

        let service = UserService::new(mock_repo);
        let result = service.create_user(john()).await;

        assert!(matches!(
            result,
            Err(UserError::Persistence(msg)) if msg == "Failed to create user"
        ));
    }

    #[tokio::test]
    async fn test_list_users_empty() {
        let service = UserService::new(InMemoryUserRepository::new());
        assert!(service.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_users_store_order() {
        let service = UserService::new(InMemoryUserRepository::new());
        for (i, email) in ["b@example.com", "a@example.com"].into_iter().enumerate() {
            service
                .create_user(CreateUser {
                    name: format!("User {}", i),
                    email: email.to_string(),
                    age: 20,
                })
                .await
                .unwrap();
        }

        let users = service.list_users().await.unwrap();
        let emails: Vec<&str> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, ["b@example.com", "a@example.com"]);
    }

    #[tokio::test]
    async fn test_list_users_corrupt_document_is_internal_error() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_find_all().returning(|| {
            Ok(vec![UserDocument {
                user_id: "not-a-uuid".to_string(),
                ..stored_john()
            }])
        });

        let service = UserService::new(mock_repo);
        assert!(matches!(
            service.list_users().await,
            Err(UserError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_id_skips_store() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_find_one().never();
        mock_repo.expect_update_one().never();
        mock_repo.expect_delete_one().never();

        let service = UserService::new(mock_repo);
        let update = UpdateUser {
            age: Some(31),
            ..Default::default()
        };

        assert!(matches!(
            service.get_user("invalid-uuid").await,
            Err(UserError::InvalidId(_))
        ));
        assert!(matches!(
            service.update_user("invalid-uuid", update).await,
            Err(UserError::InvalidId(_))
        ));
        assert!(matches!(
            service.delete_user("invalid-uuid").await,
            Err(UserError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_one()
            .with(eq(UserFilter::UserId(user_id())))
            .returning(|_| Ok(None));

        let service = UserService::new(mock_repo);
        assert!(matches!(
            service.get_user(USER_ID).await,
            Err(UserError::NotFound(id)) if id == user_id()
        ));
    }

    #[tokio::test]
    async fn test_get_user_backfills_legacy_timestamps() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_find_one().returning(|_| {
            Ok(Some(UserDocument {
                created_at: None,
                updated_at: None,
                ..stored_john()
            }))
        });

        let service = UserService::new(mock_repo);
        let user = service.get_user(USER_ID).await.unwrap();
        assert_eq!(user.user_id, user_id());
    }

    #[tokio::test]
    async fn test_update_user_empty_skips_store() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_find_one().never();
        mock_repo.expect_update_one().never();

        let service = UserService::new(mock_repo);
        let result = service.update_user(USER_ID, UpdateUser::default()).await;

        assert!(matches!(result, Err(UserError::EmptyUpdate)));
    }

    #[tokio::test]
    async fn test_update_user_invalid_field_skips_store() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_find_one().never();

        let service = UserService::new(mock_repo);
        let update = UpdateUser {
            age: Some(0),
            ..Default::default()
        };

        assert!(matches!(
            service.update_user(USER_ID, update).await,
            Err(UserError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_user_not_found() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_find_one().returning(|_| Ok(None));
        mock_repo.expect_update_one().never();

        let service = UserService::new(mock_repo);
        let update = UpdateUser {
            age: Some(31),
            ..Default::default()
        };

        assert!(matches!(
            service.update_user(USER_ID, update).await,
            Err(UserError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_user_keeps_unsupplied_fields() {
        let service = UserService::new(InMemoryUserRepository::new());
        let created = service.create_user(john()).await.unwrap();

        let updated = service
            .update_user(
                &created.user_id.to_string(),
                UpdateUser {
                    age: Some(31),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.age, 31);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_user_same_email_is_not_duplicate() {
        let service = UserService::new(InMemoryUserRepository::new());
        let created = service.create_user(john()).await.unwrap();

        let updated = service
            .update_user(
                &created.user_id.to_string(),
                UpdateUser {
                    email: Some("john@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.email, "john@example.com");
    }

    #[tokio::test]
    async fn test_update_user_email_taken_by_other() {
        let service = UserService::new(InMemoryUserRepository::new());
        let created = service.create_user(john()).await.unwrap();
        service
            .create_user(CreateUser {
                name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                age: 28,
            })
            .await
            .unwrap();

        let result = service
            .update_user(
                &created.user_id.to_string(),
                UpdateUser {
                    email: Some("jane@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(UserError::DuplicateEmail(email)) if email == "jane@example.com"
        ));
        let unchanged = service
            .get_user(&created.user_id.to_string())
            .await
            .unwrap();
        assert_eq!(unchanged, created);
    }

    #[tokio::test]
    async fn test_update_user_nothing_modified() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_one()
            .returning(|_| Ok(Some(stored_john())));
        mock_repo.expect_update_one().times(1).returning(|_, _| Ok(0));

        let service = UserService::new(mock_repo);
        let update = UpdateUser {
            name: Some("Johnny".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            service.update_user(USER_ID, update).await,
            Err(UserError::Persistence(msg)) if msg == "Failed to update user"
        ));
    }

    #[tokio::test]
    async fn test_update_user_identical_write_is_persistence_error() {
        let stamp = crate::models::now_millis();
        let stored = UserDocument {
            created_at: Some(stamp),
            updated_at: Some(stamp),
            ..stored_john()
        };
        let repo = InMemoryUserRepository::with_documents(vec![stored.clone()]);

        // Same values and same millisecond: the store reports nothing modified
        let changes = UserChanges {
            name: None,
            email: None,
            age: Some(30),
            updated_at: stamp,
        };
        assert_eq!(
            repo.update_one(UserFilter::UserId(user_id()), changes)
                .await
                .unwrap(),
            0
        );

        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_one()
            .returning(move |_| Ok(Some(stored.clone())));
        mock_repo.expect_update_one().returning(|_, _| Ok(0));

        let service = UserService::new(mock_repo);
        let update = UpdateUser {
            age: Some(30),
            ..Default::default()
        };
        assert!(matches!(
            service.update_user(USER_ID, update).await,
            Err(UserError::Persistence(msg)) if msg == "Failed to update user"
        ));
    }

    #[tokio::test]
    async fn test_update_user_deleted_before_reread() {
        let mut mock_repo = MockUserRepository::new();
        let mut seq = mockall::Sequence::new();
        mock_repo
            .expect_find_one()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(stored_john())));
        mock_repo
            .expect_update_one()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(1));
        mock_repo
            .expect_find_one()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));

        let service = UserService::new(mock_repo);
        let update = UpdateUser {
            age: Some(31),
            ..Default::default()
        };

        assert!(matches!(
            service.update_user(USER_ID, update).await,
            Err(UserError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let service = UserService::new(InMemoryUserRepository::new());
        let created = service.create_user(john()).await.unwrap();
        let id = created.user_id.to_string();

        service.delete_user(&id).await.unwrap();

        assert!(matches!(
            service.get_user(&id).await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_user(&id).await,
            Err(UserError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_store_fault_propagates() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_all()
            .returning(|| Err(UserError::Database("connection refused".to_string())));

        let service = UserService::new(mock_repo);
        assert!(matches!(
            service.list_users().await,
            Err(UserError::Database(msg)) if msg == "Error fetching users: connection refused"
        ));
    }

    #[tokio::test]
    async fn test_store_fault_names_the_operation() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_find_one()
            .returning(|_| Err(UserError::Database("connection refused".to_string())));
        mock_repo
            .expect_delete_one()
            .returning(|_| Err(UserError::Database("connection refused".to_string())));

        let service = UserService::new(mock_repo);

        assert!(matches!(
            service.create_user(john()).await,
            Err(UserError::Database(msg)) if msg == "Error creating user: connection refused"
        ));
        assert!(matches!(
            service.get_user(USER_ID).await,
            Err(UserError::Database(msg)) if msg == "Error fetching user: connection refused"
        ));
        assert!(matches!(
            service.delete_user(USER_ID).await,
            Err(UserError::Database(msg)) if msg == "Error deleting user: connection refused"
        ));
    }
}

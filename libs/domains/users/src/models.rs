use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};

/// DTO for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({"name": "John Doe", "email": "john.doe@example.com", "age": 30}))]
pub struct CreateUser {
    /// User's full name
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// User's email address, unique across all users
    #[validate(email)]
    pub email: String,
    /// User's age
    #[validate(range(min = 1, max = 150))]
    pub age: i32,
}

/// DTO for a partial update. Only the fields that are present are changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(range(min = 1, max = 150))]
    pub age: Option<i32>,
}

impl UpdateUser {
    /// True when no field was supplied (absent and `null` are the same here)
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none()
    }
}

/// Public representation of a user returned by every endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "user_id": "123e4567-e89b-12d3-a456-426614174000",
    "name": "John Doe",
    "email": "john.doe@example.com",
    "age": 30,
    "created_at": "2024-01-01T00:00:00Z",
    "updated_at": "2024-01-01T00:00:00Z"
}))]
pub struct UserResponse {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user record as held by the document store.
///
/// `user_id` is kept as the canonical string form; the store's own primary
/// key never leaves the store implementation. Timestamps are optional because
/// documents written by older versions of the service may not carry them.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDocument {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserDocument {
    /// Build a fresh document from a validated create payload
    pub fn new(input: CreateUser) -> Self {
        let now = now_millis();
        Self {
            user_id: Uuid::new_v4().to_string(),
            name: input.name,
            email: input.email,
            age: input.age,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Apply a partial change set in place
    pub fn apply(&mut self, changes: &UserChanges) {
        if let Some(ref name) = changes.name {
            self.name = name.clone();
        }
        if let Some(ref email) = changes.email {
            self.email = email.clone();
        }
        if let Some(age) = changes.age {
            self.age = age;
        }
        self.updated_at = Some(changes.updated_at);
    }
}

/// Partial field set written by an update
#[derive(Debug, Clone, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

impl From<UpdateUser> for UserChanges {
    fn from(update: UpdateUser) -> Self {
        Self {
            name: update.name,
            email: update.email,
            age: update.age,
            updated_at: now_millis(),
        }
    }
}

/// Exact-match lookups supported by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    Email(String),
    UserId(Uuid),
}

impl TryFrom<UserDocument> for UserResponse {
    type Error = UserError;

    fn try_from(doc: UserDocument) -> UserResult<Self> {
        let user_id = Uuid::parse_str(&doc.user_id).map_err(|e| {
            UserError::Internal(format!("Stored user_id '{}' is not a UUID: {}", doc.user_id, e))
        })?;

        // Legacy documents without timestamps are backfilled, not rejected
        let now = now_millis();

        Ok(Self {
            user_id,
            name: doc.name,
            email: doc.email,
            age: doc.age,
            created_at: doc.created_at.unwrap_or(now),
            updated_at: doc.updated_at.unwrap_or(now),
        })
    }
}

/// Parse an externally supplied identifier
pub fn parse_user_id(raw: &str) -> UserResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| UserError::InvalidId(raw.to_string()))
}

/// Current time at the store's millisecond precision
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

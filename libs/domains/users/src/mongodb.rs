//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, Document, doc},
    options::IndexOptions,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{UserError, UserResult, is_duplicate_key};
use crate::models::{UserChanges, UserDocument, UserFilter};
use crate::repository::UserRepository;

/// Default collection holding user documents
pub const DEFAULT_COLLECTION: &str = "users";

/// Wire shape of a user document.
///
/// The store-assigned `_id` is ignored on read and never written.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    user_id: String,
    name: String,
    email: String,
    age: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<bson::DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<bson::DateTime>,
}

fn to_bson_datetime(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

fn from_bson_datetime(dt: bson::DateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())
}

impl From<UserDocument> for StoredUser {
    fn from(doc: UserDocument) -> Self {
        Self {
            user_id: doc.user_id,
            name: doc.name,
            email: doc.email,
            age: doc.age,
            created_at: doc.created_at.map(to_bson_datetime),
            updated_at: doc.updated_at.map(to_bson_datetime),
        }
    }
}

impl From<StoredUser> for UserDocument {
    fn from(stored: StoredUser) -> Self {
        Self {
            user_id: stored.user_id,
            name: stored.name,
            email: stored.email,
            age: stored.age,
            created_at: stored.created_at.and_then(from_bson_datetime),
            updated_at: stored.updated_at.and_then(from_bson_datetime),
        }
    }
}

/// MongoDB implementation of the UserRepository
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<StoredUser>,
}

impl MongoUserRepository {
    /// Create a repository over the default `users` collection
    ///
    /// # Example
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let repo = MongoUserRepository::new(client.database("user_management"));
    /// ```
    pub fn new(db: Database) -> Self {
        Self::with_collection(db, DEFAULT_COLLECTION)
    }

    /// Create a repository over a custom collection name
    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<StoredUser>(collection_name);
        Self { collection }
    }

    /// Install unique indexes on `user_id` and `email`.
    ///
    /// Idempotent; safe to call on every startup.
    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    pub async fn create_indexes(&self) -> UserResult<()> {
        let unique = || IndexOptions::builder().unique(true).build();

        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "user_id": 1 })
                .options(unique())
                .build(),
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique())
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("User indexes ensured");
        Ok(())
    }

    fn build_filter(filter: &UserFilter) -> Document {
        match filter {
            UserFilter::Email(email) => doc! { "email": email },
            UserFilter::UserId(id) => doc! { "user_id": id.to_string() },
        }
    }

    fn build_update(changes: &UserChanges) -> Document {
        let mut set = doc! { "updated_at": to_bson_datetime(changes.updated_at) };

        if let Some(ref name) = changes.name {
            set.insert("name", name);
        }
        if let Some(ref email) = changes.email {
            set.insert("email", email);
        }
        if let Some(age) = changes.age {
            set.insert("age", age);
        }

        doc! { "$set": set }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self))]
    async fn find_one(&self, filter: UserFilter) -> UserResult<Option<UserDocument>> {
        let stored = self
            .collection
            .find_one(Self::build_filter(&filter))
            .await?;
        Ok(stored.map(UserDocument::from))
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> UserResult<Vec<UserDocument>> {
        use futures_util::TryStreamExt;

        let cursor = self.collection.find(doc! {}).await?;
        let stored: Vec<StoredUser> = cursor.try_collect().await?;

        Ok(stored.into_iter().map(UserDocument::from).collect())
    }

    #[instrument(skip(self, document), fields(user_id = %document.user_id))]
    async fn insert_one(&self, document: UserDocument) -> UserResult<bool> {
        let email = document.email.clone();

        let result = self
            .collection
            .insert_one(StoredUser::from(document))
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    UserError::DuplicateEmail(email)
                } else {
                    e.into()
                }
            })?;

        Ok(!matches!(result.inserted_id, bson::Bson::Null))
    }

    #[instrument(skip(self, changes))]
    async fn update_one(&self, filter: UserFilter, changes: UserChanges) -> UserResult<u64> {
        let result = self
            .collection
            .update_one(Self::build_filter(&filter), Self::build_update(&changes))
            .await
            .map_err(|e| match changes.email {
                Some(ref email) if is_duplicate_key(&e) => {
                    UserError::DuplicateEmail(email.clone())
                }
                _ => e.into(),
            })?;

        Ok(result.modified_count)
    }

    #[instrument(skip(self))]
    async fn delete_one(&self, filter: UserFilter) -> UserResult<u64> {
        let result = self
            .collection
            .delete_one(Self::build_filter(&filter))
            .await?;
        Ok(result.deleted_count)
    }
}

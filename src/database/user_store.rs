// ==================== USER RECORD STORE ====================
// Persistence contract for User documents plus the MongoDB implementation.

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::Collection;

use crate::database::{is_duplicate_key, MongoDB};
use crate::models::{NewUser, User};
use crate::utils::error::StoreError;

pub const USERS_COLLECTION: &str = "users";

/// Capability set over the User entity. Every call hits the backing storage;
/// implementations do not cache.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `DuplicateEmail` when the email is already taken.
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError>;

    async fn list_all(&self) -> Result<Vec<User>, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<User, StoreError>;

    /// Replaces name, email and age in one atomic write and returns the
    /// updated record.
    async fn replace_by_id(&self, id: &str, new_user: NewUser) -> Result<User, StoreError>;

    /// Returns the record as it was before deletion.
    async fn delete_by_id(&self, id: &str) -> Result<User, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Parses a path id. Anything that is not an ObjectId can never match a
/// stored document, so it is reported as not found (404). Mongoose-style
/// servers answer 500 here through a cast error; this service does not.
pub(crate) fn parse_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::NotFound(id.to_string()))
}

fn map_write_error(err: mongodb::error::Error, email: &str) -> StoreError {
    if is_duplicate_key(&err) {
        StoreError::DuplicateEmail(email.to_string())
    } else {
        StoreError::from(err)
    }
}

pub struct MongoUserStore {
    db: MongoDB,
    users: Collection<User>,
}

impl MongoUserStore {
    pub fn new(db: MongoDB) -> Self {
        let users = db.collection::<User>(USERS_COLLECTION);
        Self { db, users }
    }

    /// Writes that touch `email` wait for the unique index. Without it the
    /// collection would accept duplicates.
    async fn require_unique_index(&self) -> Result<(), StoreError> {
        self.db.ensure_indexes().await.map_err(|e| {
            StoreError::DatabaseError(format!("unique email index unavailable: {}", e))
        })
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        self.require_unique_index().await?;
        let user = User::from_new(ObjectId::new(), new_user);

        self.users
            .insert_one(&user)
            .await
            .map_err(|e| map_write_error(e, &user.email))?;

        log::debug!("💾 Inserted user {}", user.email);
        Ok(user)
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let cursor = self.users.find(doc! {}).await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn get_by_id(&self, id: &str) -> Result<User, StoreError> {
        let object_id = parse_id(id)?;

        self.users
            .find_one(doc! { "_id": object_id })
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn replace_by_id(&self, id: &str, new_user: NewUser) -> Result<User, StoreError> {
        let object_id = parse_id(id)?;
        self.require_unique_index().await?;

        let update = doc! {
            "$set": {
                "name": new_user.name.as_str(),
                "email": new_user.email.as_str(),
                "age": new_user.age,
            }
        };

        self.users
            .find_one_and_update(doc! { "_id": object_id }, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| map_write_error(e, &new_user.email))?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn delete_by_id(&self, id: &str) -> Result<User, StoreError> {
        let object_id = parse_id(id)?;

        self.users
            .find_one_and_delete(doc! { "_id": object_id })
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await.map_err(StoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_id_is_not_found() {
        assert!(matches!(parse_id("not-an-id"), Err(StoreError::NotFound(_))));
        assert!(parse_id("65f1c0a2b3d4e5f60718293a").is_ok());
    }

    #[tokio::test]
    async fn test_email_writes_refused_without_unique_index() {
        let db = MongoDB::new(
            "mongodb://127.0.0.1:1/users_test?serverSelectionTimeoutMS=200&connectTimeoutMS=200",
        )
        .await
        .unwrap();
        let store = MongoUserStore::new(db);
        let new_user = || NewUser { name: "Ana".into(), email: "ana@x.com".into(), age: 30.0 };

        match store.insert(new_user()).await {
            Err(StoreError::DatabaseError(msg)) => {
                assert!(msg.starts_with("unique email index unavailable"))
            }
            other => panic!("expected index failure, got {:?}", other),
        }

        let id = ObjectId::new().to_hex();
        match store.replace_by_id(&id, new_user()).await {
            Err(StoreError::DatabaseError(msg)) => {
                assert!(msg.starts_with("unique email index unavailable"))
            }
            other => panic!("expected index failure, got {:?}", other),
        }
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongo_store_lifecycle() {
        dotenv::dotenv().ok();

        let uri = std::env::var("MONGO_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017/user_service_test".to_string());
        let db = MongoDB::new(&uri).await.unwrap();
        let store = MongoUserStore::new(db.clone());

        let email = format!("{}@x.com", ObjectId::new().to_hex());
        let created = store
            .insert(NewUser { name: "Ana".into(), email: email.clone(), age: 30.0 })
            .await
            .unwrap();
        let id = created.id.unwrap().to_hex();
        assert!(db.indexes_ready());

        let duplicate = store
            .insert(NewUser { name: "Other".into(), email: email.clone(), age: 40.0 })
            .await;
        assert!(matches!(duplicate, Err(StoreError::DuplicateEmail(_))));

        let updated = store
            .replace_by_id(&id, NewUser { name: "Ana".into(), email: email.clone(), age: 31.0 })
            .await
            .unwrap();
        assert_eq!(updated.age, 31.0);

        let deleted = store.delete_by_id(&id).await.unwrap();
        assert_eq!(deleted.age, 31.0);
        assert!(matches!(store.get_by_id(&id).await, Err(StoreError::NotFound(_))));
    }
}

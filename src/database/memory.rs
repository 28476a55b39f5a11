use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::database::user_store::{parse_id, UserStore};
use crate::models::{NewUser, User};
use crate::utils::error::StoreError;

/// In-process user store with the same contract as the MongoDB one,
/// including email uniqueness. Records keep insertion order.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.email == new_user.email) {
            return Err(StoreError::DuplicateEmail(new_user.email));
        }

        let user = User::from_new(ObjectId::new(), new_user);
        users.push(user.clone());
        Ok(user)
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<User, StoreError> {
        let object_id = parse_id(id)?;

        self.users
            .read()
            .await
            .iter()
            .find(|u| u.id == Some(object_id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn replace_by_id(&self, id: &str, new_user: NewUser) -> Result<User, StoreError> {
        let object_id = parse_id(id)?;
        let mut users = self.users.write().await;

        let index = users
            .iter()
            .position(|u| u.id == Some(object_id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let taken = users
            .iter()
            .any(|u| u.id != Some(object_id) && u.email == new_user.email);
        if taken {
            return Err(StoreError::DuplicateEmail(new_user.email));
        }

        let updated = User::from_new(object_id, new_user);
        users[index] = updated.clone();
        Ok(updated)
    }

    async fn delete_by_id(&self, id: &str) -> Result<User, StoreError> {
        let object_id = parse_id(id)?;
        let mut users = self.users.write().await;

        let index = users
            .iter()
            .position(|u| u.id == Some(object_id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        Ok(users.remove(index))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str, email: &str, age: f64) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            age,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_rejects_duplicate_email() {
        let store = MemoryUserStore::new();

        let ana = store.insert(new_user("Ana", "ana@x.com", 30.0)).await.unwrap();
        assert!(ana.id.is_some());

        let result = store.insert(new_user("Other", "ana@x.com", 41.0)).await;
        assert!(matches!(result, Err(StoreError::DuplicateEmail(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = MemoryUserStore::new();
        assert!(store.list_all().await.unwrap().is_empty());

        store.insert(new_user("Ana", "ana@x.com", 30.0)).await.unwrap();
        store.insert(new_user("Bo", "bo@x.com", 25.0)).await.unwrap();

        let names: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["Ana", "Bo"]);
    }

    #[tokio::test]
    async fn test_replace_updates_all_fields() {
        let store = MemoryUserStore::new();
        let ana = store.insert(new_user("Ana", "ana@x.com", 30.0)).await.unwrap();
        let id = ana.id.unwrap().to_hex();

        let updated = store
            .replace_by_id(&id, new_user("Ana Maria", "anamaria@x.com", 31.0))
            .await
            .unwrap();
        assert_eq!(updated.id, ana.id);

        let fetched = store.get_by_id(&id).await.unwrap();
        assert_eq!(fetched.name, "Ana Maria");
        assert_eq!(fetched.email, "anamaria@x.com");
        assert_eq!(fetched.age, 31.0);
    }

    #[tokio::test]
    async fn test_replace_may_keep_own_email_but_not_take_another() {
        let store = MemoryUserStore::new();
        let ana = store.insert(new_user("Ana", "ana@x.com", 30.0)).await.unwrap();
        store.insert(new_user("Bo", "bo@x.com", 25.0)).await.unwrap();
        let id = ana.id.unwrap().to_hex();

        assert!(store.replace_by_id(&id, new_user("Ana", "ana@x.com", 32.0)).await.is_ok());

        let result = store.replace_by_id(&id, new_user("Ana", "bo@x.com", 32.0)).await;
        assert!(matches!(result, Err(StoreError::DuplicateEmail(_))));
        assert_eq!(store.get_by_id(&id).await.unwrap().email, "ana@x.com");
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_ids_are_not_found() {
        let store = MemoryUserStore::new();
        store.insert(new_user("Ana", "ana@x.com", 30.0)).await.unwrap();
        let missing = ObjectId::new().to_hex();

        assert!(matches!(store.get_by_id(&missing).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.get_by_id("nope").await, Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.replace_by_id(&missing, new_user("X", "x@x.com", 1.0)).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(store.delete_by_id(&missing).await, Err(StoreError::NotFound(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_returns_removed_record_once() {
        let store = MemoryUserStore::new();
        let ana = store.insert(new_user("Ana", "ana@x.com", 30.0)).await.unwrap();
        let id = ana.id.unwrap().to_hex();

        let deleted = store.delete_by_id(&id).await.unwrap();
        assert_eq!(deleted.email, "ana@x.com");
        assert!(matches!(store.delete_by_id(&id).await, Err(StoreError::NotFound(_))));
    }
}

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeMap;

use super::{CredentialStore, InsertOutcome, UserId, UserRecord};

#[derive(Debug, Default)]
struct Inner {
    next_id: UserId,
    users: BTreeMap<UserId, UserRecord>,
}

/// Process-local store used by tests and local runs without a database.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Inner>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().users.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let inner = self.inner.lock();
        Ok(inner.users.values().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>> {
        Ok(self.inner.lock().users.get(&id).cloned())
    }

    async fn insert(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<InsertOutcome> {
        let mut inner = self.inner.lock();
        if inner.users.values().any(|user| user.email == email) {
            return Ok(InsertOutcome::Conflict);
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let now = Utc::now();
        inner.users.insert(
            id,
            UserRecord {
                id,
                username: username.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(InsertOutcome::Created(id))
    }

    async fn update_username(&self, id: UserId, username: &str) -> Result<bool> {
        let mut inner = self.inner.lock();
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(false);
        };
        username.clone_into(&mut user.username);
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_assigns_sequential_ids() -> Result<()> {
        let store = MemoryCredentialStore::new();
        assert_eq!(
            store.insert("alice", "alice@example.com", "h").await?,
            InsertOutcome::Created(1)
        );
        assert_eq!(
            store.insert("bob", "bob@example.com", "h").await?,
            InsertOutcome::Created(2)
        );
        assert_eq!(store.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() -> Result<()> {
        let store = MemoryCredentialStore::new();
        store.insert("alice", "alice@example.com", "h").await?;
        assert_eq!(
            store.insert("other", "alice@example.com", "h").await?,
            InsertOutcome::Conflict
        );
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn lookups_by_email_and_id() -> Result<()> {
        let store = MemoryCredentialStore::new();
        store.insert("alice", "alice@example.com", "hash").await?;

        let by_email = store.find_by_email("alice@example.com").await?;
        let by_id = store.find_by_id(1).await?;
        assert_eq!(by_email, by_id);
        assert_eq!(by_email.map(|user| user.password_hash), Some("hash".to_string()));

        assert!(store.find_by_email("nobody@example.com").await?.is_none());
        assert!(store.find_by_id(99).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn update_username() -> Result<()> {
        let store = MemoryCredentialStore::new();
        store.insert("alice", "alice@example.com", "h").await?;

        assert!(store.update_username(1, "alicia").await?);
        assert!(!store.update_username(2, "ghost").await?);
        let user = store.find_by_id(1).await?;
        assert_eq!(user.map(|user| user.username), Some("alicia".to_string()));
        Ok(())
    }
}

//! User credential persistence.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

mod memory;
mod postgres;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

pub type UserId = i64;

/// Stored user row, including the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome when attempting to create a new user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created(UserId),
    Conflict,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>>;

    /// Insert a new user; a duplicate email yields [`InsertOutcome::Conflict`].
    async fn insert(&self, username: &str, email: &str, password_hash: &str)
        -> Result<InsertOutcome>;

    /// Returns `false` when no row matched `id`.
    async fn update_username(&self, id: UserId, username: &str) -> Result<bool>;

    /// Cheap liveness probe for the health endpoint.
    async fn ping(&self) -> Result<()>;
}

//! Port interfaces for user persistence
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations for user operations.

use async_trait::async_trait;
use convene_domain::{Page, Result, User, UserFilter};
use uuid::Uuid;

/// Trait for user persistence and retrieval
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get a user by id, attended events included
    async fn find_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Get a user by email (exact, case-insensitive)
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Load several users at once; missing ids are skipped, order unspecified
    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>>;

    /// Persist a new user.
    ///
    /// Returns `EmailTaken` when the email is already in use, also under
    /// concurrent inserts.
    async fn insert_user(&self, user: &User) -> Result<()>;

    /// Persist edits to a user's own fields (not their attended set)
    async fn update_user(&self, user: &User) -> Result<()>;

    /// Delete a user atomically, together with their registrations and the
    /// events they created (including those events' registrations).
    ///
    /// Returns `NotFound` when the user does not exist.
    async fn delete_user(&self, id: Uuid) -> Result<()>;

    /// List users matching a filter, ordered by name
    async fn list_users(&self, filter: &UserFilter) -> Result<Page<User>>;
}

//! User management service - admin-facing account operations

use std::sync::Arc;

use convene_domain::constants::MIN_PASSWORD_LENGTH;
use convene_domain::{ConveneError, NewUser, Page, Result, User, UserFilter, UserPatch};
use tracing::info;
use uuid::Uuid;

use super::password::hash_password;
use super::ports::UserStore;
use crate::clock::Clock;

/// User management service
pub struct UserService {
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    /// Create a new user service
    pub fn new(users: Arc<dyn UserStore>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    /// List users matching a filter.
    pub async fn list_users(&self, filter: &UserFilter) -> Result<Page<User>> {
        self.users.list_users(filter).await
    }

    /// Fetch one user.
    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        self.users
            .find_user(id)
            .await?
            .ok_or_else(|| ConveneError::NotFound("User not found".to_string()))
    }

    /// Create an account. Emails are unique; the role defaults to student.
    pub async fn create_user(&self, input: NewUser) -> Result<User> {
        validate_new_user(&input)?;

        let email = input.email.trim().to_lowercase();
        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(ConveneError::EmailTaken(email));
        }

        let now = self.clock.now();
        let user = User {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            email,
            password_hash: hash_password(&input.password),
            role: input.role,
            events_attended: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.users.insert_user(&user).await?;

        info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    /// Apply a partial update: name, role, or a new password.
    pub async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User> {
        let mut user = self
            .users
            .find_user(id)
            .await?
            .ok_or_else(|| ConveneError::NotFound("User not found".to_string()))?;

        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(ConveneError::Validation("Name is required".to_string()));
            }
            user.name = name.trim().to_string();
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(password) = patch.password {
            validate_password(&password)?;
            user.password_hash = hash_password(&password);
        }
        user.updated_at = self.clock.now();

        self.users.update_user(&user).await?;
        info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    /// Delete an account along with its registrations.
    pub async fn delete_user(&self, id: Uuid) -> Result<()> {
        self.users.delete_user(id).await?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }
}

fn validate_new_user(input: &NewUser) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(ConveneError::Validation("Name is required".to_string()));
    }
    let email = input.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ConveneError::Validation("A valid email is required".to_string()));
    }
    validate_password(&input.password)
}

fn validate_password(password: &str) -> Result<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ConveneError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

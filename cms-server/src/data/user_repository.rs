use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::role::Role;
use crate::domain::user::{ProfilePatch, User};

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) role: Role,
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError>;
    async fn find_by_username(&self, username: &str)
    -> Result<Option<UserCredentials>, DomainError>;
    async fn get_credentials(&self, id: i64) -> Result<Option<UserCredentials>, DomainError>;
    async fn update_profile(&self, id: i64, patch: ProfilePatch)
    -> Result<Option<User>, DomainError>;
    async fn update_password(&self, id: i64, password_hash: String) -> Result<bool, DomainError>;
    async fn update_role(&self, id: i64, role: Role) -> Result<Option<User>, DomainError>;
    /// Deletes the user; the user's posts and comments go with it.
    async fn delete_user(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_users(&self) -> Result<Vec<User>, DomainError>;
    async fn total_users(&self) -> Result<i64, DomainError>;
}

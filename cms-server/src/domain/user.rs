use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;
use super::role::Role;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;
pub(crate) const MAX_PASSWORD_LEN: usize = 128;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Profile {
    pub(crate) image: Option<String>,
    pub(crate) bio: String,
}

#[derive(Debug, Clone)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) role: Role,
    pub(crate) is_verified: bool,
    pub(crate) is_active: bool,
    pub(crate) profile: Profile,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl User {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: i64,
        username: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        is_verified: bool,
        is_active: bool,
        profile: Profile,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation {
                field: "id",
                message: "must be > 0",
            });
        }
        let username = normalize_username(&username.into())?;
        let email = normalize_email(&email.into())?;

        Ok(Self {
            id,
            username,
            email,
            role,
            is_verified,
            is_active,
            profile,
            created_at,
            updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = normalize_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        validate_password(&self.password)?;
        Ok(Self {
            username,
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = self.username.trim();
        if username.is_empty() || username.len() > 64 {
            return Err(DomainError::Validation {
                field: "username",
                message: "must be 1..64 chars",
            });
        }
        if self.password.is_empty() {
            return Err(DomainError::Validation {
                field: "password",
                message: "must not be empty",
            });
        }
        Ok(Self {
            username: username.to_string(),
            password: self.password,
        })
    }
}

/// Admin-account creation payload. `role` defaults to admin; superadmin is
/// not creatable through this path.
#[derive(Debug, Clone)]
pub(crate) struct CreateAdminRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) role: Option<Role>,
}

impl CreateAdminRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = normalize_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        validate_password(&self.password)?;
        if self.role == Some(Role::Superadmin) {
            return Err(DomainError::Validation {
                field: "role",
                message: "superadmin accounts cannot be created",
            });
        }
        Ok(Self {
            username,
            email,
            password: self.password,
            role: self.role,
        })
    }
}

/// Partial profile update. Absent fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProfilePatch {
    pub(crate) bio: Option<String>,
    pub(crate) image: Option<String>,
}

impl ProfilePatch {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if let Some(bio) = &self.bio
            && bio.chars().count() > 300
        {
            return Err(DomainError::Validation {
                field: "bio",
                message: "must be at most 300 chars",
            });
        }
        Ok(self)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.bio.is_none() && self.image.is_none()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ChangePasswordRequest {
    pub(crate) current_password: String,
    pub(crate) new_password: String,
}

impl ChangePasswordRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if self.current_password.is_empty() {
            return Err(DomainError::Validation {
                field: "current_password",
                message: "must not be empty",
            });
        }
        validate_password(&self.new_password)?;
        Ok(self)
    }
}

pub(crate) fn validate_password(password: &str) -> Result<(), DomainError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN || len > MAX_PASSWORD_LEN {
        return Err(DomainError::Validation {
            field: "password",
            message: "must be 8..128 chars",
        });
    }
    Ok(())
}

fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    if username.len() < 3 || username.len() > 50 {
        return Err(DomainError::Validation {
            field: "username",
            message: "must be 3..50 chars",
        });
    }
    Ok(username.to_string())
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}

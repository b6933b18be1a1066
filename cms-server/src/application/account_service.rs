use crate::application::password;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::{ChangePasswordRequest, ProfilePatch, User};

pub(crate) struct AccountService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> AccountService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn get_profile(&self, user_id: i64) -> Result<User, DomainError> {
        self.repo
            .get_user(user_id)
            .await?
            .ok_or(DomainError::NotFound(format!("user id: {user_id}")))
    }

    pub(crate) async fn update_profile(
        &self,
        user_id: i64,
        patch: ProfilePatch,
    ) -> Result<User, DomainError> {
        let patch = patch.validate()?;
        if patch.is_empty() {
            return self.get_profile(user_id).await;
        }
        self.repo
            .update_profile(user_id, patch)
            .await?
            .ok_or(DomainError::NotFound(format!("user id: {user_id}")))
    }

    pub(crate) async fn change_password(
        &self,
        user_id: i64,
        req: ChangePasswordRequest,
    ) -> Result<(), DomainError> {
        let req = req.validate()?;

        let creds = self
            .repo
            .get_credentials(user_id)
            .await?
            .ok_or(DomainError::NotFound(format!("user id: {user_id}")))?;

        password::verify_password(&req.current_password, &creds.password_hash).map_err(|err| {
            match err {
                DomainError::InvalidCredentials => DomainError::Validation {
                    field: "current_password",
                    message: "is incorrect",
                },
                other => other,
            }
        })?;

        let password_hash = password::hash_password(&req.new_password)?;
        let updated = self.repo.update_password(user_id, password_hash).await?;
        if !updated {
            return Err(DomainError::NotFound(format!("user id: {user_id}")));
        }
        Ok(())
    }

    pub(crate) async fn delete_account(&self, user_id: i64) -> Result<(), DomainError> {
        let deleted = self.repo.delete_user(user_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("user id: {user_id}")));
        }
        Ok(())
    }
}

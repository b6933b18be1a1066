use crate::application::password;
use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::role::Role;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::infrastructure::jwt::JwtService;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) access_token: String,
}

pub(crate) struct AuthService<R: UserRepository> {
    repo: R,
    jwt: Arc<JwtService>,
}

impl<R: UserRepository> AuthService<R> {
    pub(crate) fn new(repo: R, jwt: Arc<JwtService>) -> Self {
        Self { repo, jwt }
    }

    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let password_hash = password::hash_password(&req.password)?;
        let new_user = NewUser {
            username: req.username,
            email: req.email,
            password_hash,
            role: Role::User,
        };
        let user = self.repo.create_user(new_user).await?;

        let access_token = self
            .jwt
            .generate_token(user.id, &user.username, user.role)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;

        Ok(AuthResult { user, access_token })
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let user_creds = match self.repo.find_by_username(&req.username).await? {
            Some(user_creds) => user_creds,
            None => {
                // Keep the miss path as slow as a real verification.
                match password::verify_password(&req.password, password::DUMMY_PASSWORD_HASH) {
                    Ok(()) | Err(DomainError::InvalidCredentials) => {}
                    Err(err) => return Err(err),
                }
                return Err(DomainError::InvalidCredentials);
            }
        };

        password::verify_password(&req.password, &user_creds.password_hash)?;

        let user = user_creds.user;
        let access_token = self
            .jwt
            .generate_token(user.id, &user.username, user.role)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;

        Ok(AuthResult { user, access_token })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::AuthService;
    use crate::application::password;
    use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
    use crate::domain::error::DomainError;
    use crate::domain::role::Role;
    use crate::domain::user::{LoginRequest, Profile, ProfilePatch, RegisterRequest, User};
    use crate::infrastructure::jwt::JwtService;

    #[derive(Clone)]
    struct FakeUserRepo {
        created_input: Arc<Mutex<Option<NewUser>>>,
        login_credentials: Arc<Mutex<Option<UserCredentials>>>,
        create_user_out: User,
    }

    impl FakeUserRepo {
        fn new(create_user_out: User) -> Self {
            Self {
                created_input: Arc::new(Mutex::new(None)),
                login_credentials: Arc::new(Mutex::new(None)),
                create_user_out,
            }
        }

        fn set_login_credentials(&self, creds: Option<UserCredentials>) {
            *self
                .login_credentials
                .lock()
                .expect("login credentials mutex poisoned") = creds;
        }

        fn take_created_input(&self) -> Option<NewUser> {
            self.created_input
                .lock()
                .expect("created input mutex poisoned")
                .take()
        }
    }

    #[async_trait]
    impl UserRepository for FakeUserRepo {
        async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
            *self
                .created_input
                .lock()
                .expect("created input mutex poisoned") = Some(input);
            Ok(self.create_user_out.clone())
        }

        async fn get_user(&self, _id: i64) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn find_by_username(
            &self,
            _username: &str,
        ) -> Result<Option<UserCredentials>, DomainError> {
            Ok(self
                .login_credentials
                .lock()
                .expect("login credentials mutex poisoned")
                .clone())
        }

        async fn get_credentials(&self, _id: i64) -> Result<Option<UserCredentials>, DomainError> {
            Ok(None)
        }

        async fn update_profile(
            &self,
            _id: i64,
            _patch: ProfilePatch,
        ) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn update_password(
            &self,
            _id: i64,
            _password_hash: String,
        ) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn update_role(&self, _id: i64, _role: Role) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn delete_user(&self, _id: i64) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn list_users(&self) -> Result<Vec<User>, DomainError> {
            Ok(Vec::new())
        }

        async fn total_users(&self) -> Result<i64, DomainError> {
            Ok(0)
        }
    }

    fn sample_user(id: i64, username: &str, email: &str) -> User {
        User::new(
            id,
            username,
            email,
            Role::User,
            false,
            true,
            Profile::default(),
            Utc::now(),
            Utc::now(),
        )
        .expect("sample user must be valid")
    }

    fn test_jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new("0123456789abcdef0123456789abcdef", 3600))
    }

    #[tokio::test]
    async fn register_creates_regular_user_and_returns_token() {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com"));
        let service = AuthService::new(repo.clone(), test_jwt());

        let req = RegisterRequest {
            username: "  valid_user  ".to_string(),
            email: "  VALID@EXAMPLE.COM  ".to_string(),
            password: "very-secure-password".to_string(),
        };

        let result = service.register(req).await.expect("register must succeed");

        assert_eq!(result.user.username, "valid_user");
        assert!(!result.access_token.is_empty());

        let created = repo
            .take_created_input()
            .expect("create_user must be called");
        assert_eq!(created.username, "valid_user");
        assert_eq!(created.email, "valid@example.com");
        assert_eq!(created.role, Role::User);
        assert!(!created.password_hash.is_empty());
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_missing_user() {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com"));
        repo.set_login_credentials(None);
        let service = AuthService::new(repo, test_jwt());

        let req = LoginRequest {
            username: "valid_user".to_string(),
            password: "some-password".to_string(),
        };

        let err = service.login(req).await.expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_wrong_password() {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com"));
        let service = AuthService::new(repo.clone(), test_jwt());

        let hash = password::hash_password("correct-password").expect("hash must be created");
        repo.set_login_credentials(Some(UserCredentials {
            user: sample_user(1, "valid_user", "valid@example.com"),
            password_hash: hash,
        }));

        let req = LoginRequest {
            username: "valid_user".to_string(),
            password: "wrong-password".to_string(),
        };

        let err = service.login(req).await.expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_token_for_valid_credentials() {
        let repo = FakeUserRepo::new(sample_user(1, "valid_user", "valid@example.com"));
        let service = AuthService::new(repo.clone(), test_jwt());

        let hash = password::hash_password("correct-password").expect("hash must be created");
        repo.set_login_credentials(Some(UserCredentials {
            user: sample_user(1, "valid_user", "valid@example.com"),
            password_hash: hash,
        }));

        let req = LoginRequest {
            username: "valid_user".to_string(),
            password: "correct-password".to_string(),
        };

        let result = service.login(req).await.expect("login must succeed");
        assert_eq!(result.user.id, 1);
        assert!(!result.access_token.is_empty());
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::role::Role;
use crate::domain::user::{Profile, ProfilePatch, User};

const USER_COLUMNS: &str = "id, username, email, role, is_verified, is_active, \
     profile_image, profile_bio, created_at, updated_at";

#[derive(Debug, Clone)]
pub(crate) struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    role: String,
    is_verified: bool,
    is_active: bool,
    profile_image: Option<String>,
    profile_bio: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        map_row_to_user(row)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        row.map(map_row_to_user).transpose()
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let sql = format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = $1"
        );
        let row = sqlx::query_as::<_, CredentialsRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        row.map(map_row_to_credentials).transpose()
    }

    async fn get_credentials(&self, id: i64) -> Result<Option<UserCredentials>, DomainError> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, CredentialsRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        row.map(map_row_to_credentials).transpose()
    }

    async fn update_profile(
        &self,
        id: i64,
        patch: ProfilePatch,
    ) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "UPDATE users \
             SET profile_bio = COALESCE($2, profile_bio), \
                 profile_image = COALESCE($3, profile_image), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(patch.bio)
            .bind(patch.image)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        row.map(map_row_to_user).transpose()
    }

    async fn update_password(&self, id: i64, password_hash: String) -> Result<bool, DomainError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await
                .map_err(map_user_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_role(&self, id: i64, role: Role) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        row.map(map_row_to_user).transpose()
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_user_db_error)?;

        // The FK cascade removes this user's like memberships, so the
        // denormalized counters on surviving posts/comments must come
        // down first to stay equal to the membership set size.
        sqlx::query(
            "UPDATE posts p SET likes_count = likes_count - 1 \
             FROM post_likes pl \
             WHERE pl.post_id = p.id AND pl.user_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_user_db_error)?;

        sqlx::query(
            "UPDATE comments c SET likes_count = likes_count - 1 \
             FROM comment_likes cl \
             WHERE cl.comment_id = c.id AND cl.user_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_user_db_error)?;

        // Posts and comments follow via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_user_db_error)?;

        tx.commit().await.map_err(map_user_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        rows.into_iter().map(map_row_to_user).collect()
    }

    async fn total_users(&self) -> Result<i64, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        Ok(count)
    }
}

fn map_row_to_user(row: UserRow) -> Result<User, DomainError> {
    let role: Role = row
        .role
        .parse()
        .map_err(|_| DomainError::Unexpected(format!("unknown role in store: {}", row.role)))?;

    User::new(
        row.id,
        row.username,
        row.email,
        role,
        row.is_verified,
        row.is_active,
        Profile {
            image: row.profile_image,
            bio: row.profile_bio,
        },
        row.created_at,
        row.updated_at,
    )
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_row_to_credentials(row: CredentialsRow) -> Result<UserCredentials, DomainError> {
    Ok(UserCredentials {
        password_hash: row.password_hash,
        user: map_row_to_user(row.user)?,
    })
}

fn map_user_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        let resource = match db_err.constraint() {
            Some("users_username_key") => "username",
            Some("users_email_key") => "email",
            _ => "user",
        };
        return DomainError::Conflict(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::comment_repository::{AuthorCommentSummary, CommentRepository, NewComment};
use crate::data::post_repository::LikeOutcome;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;

const COMMENT_COLUMNS: &str =
    "id, post_id, author_id, content, parent_id, likes_count, created_at, updated_at";

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: i64,
    content: String,
    parent_id: Option<i64>,
    likes_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct AuthorSummaryRow {
    id: i64,
    content: String,
    post_id: i64,
    post_title: String,
    post_slug: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let sql = format!(
            "INSERT INTO comments (post_id, author_id, content, parent_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COMMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(input.post_id)
            .bind(input.author_id)
            .bind(&input.content)
            .bind(input.parent_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(map_row_to_comment(row))
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1");
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(row.map(map_row_to_comment))
    }

    async fn update_comment(
        &self,
        id: i64,
        content: String,
    ) -> Result<Option<Comment>, DomainError> {
        let sql = format!(
            "UPDATE comments SET content = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {COMMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .bind(content)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(row.map(map_row_to_comment))
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(rows.into_iter().map(map_row_to_comment).collect())
    }

    async fn toggle_like(
        &self,
        comment_id: i64,
        user_id: i64,
    ) -> Result<Option<LikeOutcome>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_comment_db_error)?;

        let removed =
            sqlx::query("DELETE FROM comment_likes WHERE comment_id = $1 AND user_id = $2")
                .bind(comment_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(map_comment_db_error)?
                .rows_affected();

        let liked = removed == 0;
        if liked {
            let inserted =
                sqlx::query("INSERT INTO comment_likes (comment_id, user_id) VALUES ($1, $2)")
                    .bind(comment_id)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await;
            if let Err(err) = inserted {
                if is_foreign_key_violation(&err) {
                    tx.rollback().await.map_err(map_comment_db_error)?;
                    return Ok(None);
                }
                return Err(map_comment_db_error(err));
            }
        }

        let delta: i64 = if liked { 1 } else { -1 };
        let likes_count: Option<i64> = sqlx::query_scalar(
            "UPDATE comments SET likes_count = likes_count + $2 WHERE id = $1 \
             RETURNING likes_count",
        )
        .bind(comment_id)
        .bind(delta)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_comment_db_error)?;

        let Some(likes_count) = likes_count else {
            tx.rollback().await.map_err(map_comment_db_error)?;
            return Ok(None);
        };

        tx.commit().await.map_err(map_comment_db_error)?;
        Ok(Some(LikeOutcome { liked, likes_count }))
    }

    async fn summaries_by_author(
        &self,
        author_id: i64,
    ) -> Result<Vec<AuthorCommentSummary>, DomainError> {
        let rows = sqlx::query_as::<_, AuthorSummaryRow>(
            "SELECT cm.id, cm.content, cm.post_id, p.title AS post_title, \
                    p.slug AS post_slug, cm.created_at \
             FROM comments cm \
             JOIN posts p ON p.id = cm.post_id \
             WHERE cm.author_id = $1 \
             ORDER BY cm.created_at DESC, cm.id DESC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| AuthorCommentSummary {
                id: row.id,
                content: row.content,
                post_id: row.post_id,
                post_title: row.post_title,
                post_slug: row.post_slug,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn total_comments(&self) -> Result<i64, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(count)
    }
}

fn map_row_to_comment(row: CommentRow) -> Comment {
    Comment {
        id: row.id,
        post_id: row.post_id,
        author_id: row.author_id,
        content: row.content,
        parent_id: row.parent_id,
        likes_count: row.likes_count,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503"))
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        let resource = match db_err.constraint() {
            Some("comments_post_id_fkey") => "post",
            Some("comments_parent_id_fkey") => "parent comment",
            Some("comments_author_id_fkey") => "author",
            _ => "reference",
        };
        return DomainError::NotFound(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}

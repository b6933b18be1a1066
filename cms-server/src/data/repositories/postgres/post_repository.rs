use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::post_repository::{
    AuthorPostSummary, LikeOutcome, NewPost, PostPatch, PostRepository, PostWithRefs,
};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostStatus};

const POST_COLUMNS: &str = "id, title, slug, content, author_id, category_id, tags, status, \
     likes_count, views, images, created_at, updated_at";

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    slug: String,
    content: String,
    author_id: i64,
    category_id: i64,
    tags: Option<String>,
    status: String,
    likes_count: i64,
    views: i64,
    images: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PostWithRefsRow {
    #[sqlx(flatten)]
    post: PostRow,
    author_username: String,
    category_name: String,
}

#[derive(sqlx::FromRow)]
struct AuthorSummaryRow {
    id: i64,
    title: String,
    slug: String,
    status: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let sql = format!(
            "INSERT INTO posts (title, slug, content, author_id, category_id, tags, status, images) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.content)
            .bind(input.author_id)
            .bind(input.category_id)
            .bind(&input.tags)
            .bind(input.status.as_str())
            .bind(&input.images)
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn get_post_and_bump_views(
        &self,
        id: i64,
    ) -> Result<Option<PostWithRefs>, DomainError> {
        // Increment and fetch in one statement so concurrent reads never
        // lose an update.
        let row = sqlx::query_as::<_, PostWithRefsRow>(
            "UPDATE posts p \
             SET views = p.views + 1 \
             FROM users u, categories c \
             WHERE p.id = $1 AND u.id = p.author_id AND c.id = p.category_id \
             RETURNING p.id, p.title, p.slug, p.content, p.author_id, p.category_id, \
                       p.tags, p.status, p.likes_count, p.views, p.images, \
                       p.created_at, p.updated_at, \
                       u.username AS author_username, c.name AS category_name",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post_with_refs).transpose()
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let (title, slug) = match patch.title_slug {
            Some((title, slug)) => (Some(title), Some(slug)),
            None => (None, None),
        };

        let sql = format!(
            "UPDATE posts \
             SET title = COALESCE($2, title), \
                 slug = COALESCE($3, slug), \
                 content = COALESCE($4, content), \
                 category_id = COALESCE($5, category_id), \
                 tags = COALESCE($6, tags), \
                 status = COALESCE($7, status), \
                 images = images || $8, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(title)
            .bind(slug)
            .bind(patch.content)
            .bind(patch.category_id)
            .bind(patch.tags)
            .bind(patch.status.map(PostStatus::as_str))
            .bind(&patch.new_images)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        // Comments follow via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(&self) -> Result<Vec<PostWithRefs>, DomainError> {
        let rows = sqlx::query_as::<_, PostWithRefsRow>(
            "SELECT p.id, p.title, p.slug, p.content, p.author_id, p.category_id, \
                    p.tags, p.status, p.likes_count, p.views, p.images, \
                    p.created_at, p.updated_at, \
                    u.username AS author_username, c.name AS category_name \
             FROM posts p \
             JOIN users u ON u.id = p.author_id \
             JOIN categories c ON c.id = p.category_id \
             ORDER BY p.created_at DESC, p.id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post_with_refs).collect()
    }

    async fn toggle_like(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<LikeOutcome>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(map_post_db_error)?;

        let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?
            .rows_affected();

        let liked = removed == 0;
        if liked {
            let inserted =
                sqlx::query("INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2)")
                    .bind(post_id)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await;
            if let Err(err) = inserted {
                // FK violation: the post vanished under us.
                if is_foreign_key_violation(&err) {
                    tx.rollback().await.map_err(map_post_db_error)?;
                    return Ok(None);
                }
                return Err(map_post_db_error(err));
            }
        }

        let delta: i64 = if liked { 1 } else { -1 };
        let likes_count: Option<i64> = sqlx::query_scalar(
            "UPDATE posts SET likes_count = likes_count + $2 WHERE id = $1 \
             RETURNING likes_count",
        )
        .bind(post_id)
        .bind(delta)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_post_db_error)?;

        let Some(likes_count) = likes_count else {
            tx.rollback().await.map_err(map_post_db_error)?;
            return Ok(None);
        };

        tx.commit().await.map_err(map_post_db_error)?;
        Ok(Some(LikeOutcome { liked, likes_count }))
    }

    async fn summaries_by_author(
        &self,
        author_id: i64,
    ) -> Result<Vec<AuthorPostSummary>, DomainError> {
        let rows = sqlx::query_as::<_, AuthorSummaryRow>(
            "SELECT id, title, slug, status, created_at \
             FROM posts WHERE author_id = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(AuthorPostSummary {
                    id: row.id,
                    title: row.title,
                    slug: row.slug,
                    status: parse_status(&row.status)?,
                    created_at: row.created_at,
                })
            })
            .collect()
    }

    async fn total_posts(&self) -> Result<i64, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(count)
    }
}

fn parse_status(status: &str) -> Result<PostStatus, DomainError> {
    status
        .parse()
        .map_err(|_| DomainError::Unexpected(format!("unknown status in store: {status}")))
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    Ok(Post {
        id: row.id,
        title: row.title,
        slug: row.slug,
        content: row.content,
        author_id: row.author_id,
        category_id: row.category_id,
        tags: row.tags,
        status: parse_status(&row.status)?,
        likes_count: row.likes_count,
        views: row.views,
        images: row.images,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn map_row_to_post_with_refs(row: PostWithRefsRow) -> Result<PostWithRefs, DomainError> {
    Ok(PostWithRefs {
        post: map_row_to_post(row.post)?,
        author_username: row.author_username,
        category_name: row.category_name,
    })
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503"))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => {
                let resource = match db_err.constraint() {
                    Some("posts_slug_key") => "post slug",
                    _ => "post",
                };
                return DomainError::Conflict(resource.to_string());
            }
            Some("23503") => {
                let resource = match db_err.constraint() {
                    Some("posts_category_id_fkey") => "category",
                    Some("posts_author_id_fkey") => "author",
                    _ => "reference",
                };
                return DomainError::NotFound(resource.to_string());
            }
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}

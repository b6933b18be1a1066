use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::category_repository::{
    CategoryDeleteOutcome, CategoryPatch, CategoryPostSummary, CategoryRepository,
    CategoryWithCount, NewCategory,
};
use crate::domain::category::Category;
use crate::domain::error::DomainError;
use crate::domain::post::PostStatus;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    slug: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CategoryCountRow {
    #[sqlx(flatten)]
    category: CategoryRow,
    post_count: i64,
}

#[derive(sqlx::FromRow)]
struct PostSummaryRow {
    id: i64,
    title: String,
    slug: String,
    status: String,
    author_id: i64,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn create_category(&self, input: NewCategory) -> Result<Category, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (name, slug, description) \
             VALUES ($1, $2, $3) \
             RETURNING id, name, slug, description, created_at, updated_at",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(map_row_to_category(row))
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, DomainError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug, description, created_at, updated_at \
             FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(row.map(map_row_to_category))
    }

    async fn update_category(
        &self,
        id: i64,
        patch: CategoryPatch,
    ) -> Result<Option<Category>, DomainError> {
        let (name, slug) = match patch.name_slug {
            Some((name, slug)) => (Some(name), Some(slug)),
            None => (None, None),
        };
        // Some(None) clears the description; None keeps it.
        let (set_description, description) = match patch.description {
            Some(value) => (true, value.unwrap_or_default()),
            None => (false, String::new()),
        };

        let row = sqlx::query_as::<_, CategoryRow>(
            "UPDATE categories \
             SET name = COALESCE($2, name), \
                 slug = COALESCE($3, slug), \
                 description = CASE WHEN $4 THEN $5 ELSE description END, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, name, slug, description, created_at, updated_at",
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(set_description)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(row.map(map_row_to_category))
    }

    async fn delete_category_if_unused(
        &self,
        id: i64,
    ) -> Result<CategoryDeleteOutcome, DomainError> {
        let result = sqlx::query(
            "DELETE FROM categories \
             WHERE id = $1 \
               AND NOT EXISTS (SELECT 1 FROM posts WHERE category_id = $1)",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        if result.rows_affected() > 0 {
            return Ok(CategoryDeleteOutcome::Deleted);
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_category_db_error)?;

        if exists {
            Ok(CategoryDeleteOutcome::HasPosts)
        } else {
            Ok(CategoryDeleteOutcome::NotFound)
        }
    }

    async fn list_categories(&self) -> Result<Vec<CategoryWithCount>, DomainError> {
        let rows = sqlx::query_as::<_, CategoryCountRow>(
            "SELECT c.id, c.name, c.slug, c.description, c.created_at, c.updated_at, \
                    COUNT(p.id) AS post_count \
             FROM categories c \
             LEFT JOIN posts p ON p.category_id = c.id \
             GROUP BY c.id \
             ORDER BY c.name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryWithCount {
                category: map_row_to_category(row.category),
                post_count: row.post_count,
            })
            .collect())
    }

    async fn post_summaries(
        &self,
        category_id: i64,
    ) -> Result<Vec<CategoryPostSummary>, DomainError> {
        let rows = sqlx::query_as::<_, PostSummaryRow>(
            "SELECT id, title, slug, status, author_id, created_at \
             FROM posts WHERE category_id = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        rows.into_iter().map(map_row_to_summary).collect()
    }
}

fn map_row_to_category(row: CategoryRow) -> Category {
    Category {
        id: row.id,
        name: row.name,
        slug: row.slug,
        description: row.description,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn map_row_to_summary(row: PostSummaryRow) -> Result<CategoryPostSummary, DomainError> {
    let status: PostStatus = row
        .status
        .parse()
        .map_err(|_| DomainError::Unexpected(format!("unknown status in store: {}", row.status)))?;

    Ok(CategoryPostSummary {
        id: row.id,
        title: row.title,
        slug: row.slug,
        status,
        author_id: row.author_id,
        created_at: row.created_at,
    })
}

fn map_category_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        let resource = match db_err.constraint() {
            Some("categories_name_key") => "category name",
            Some("categories_slug_key") => "category slug",
            _ => "category",
        };
        return DomainError::Conflict(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}

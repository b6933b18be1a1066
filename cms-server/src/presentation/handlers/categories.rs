use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::category_repository::{CategoryPostSummary, CategoryWithCount};
use crate::domain::category::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use crate::domain::post::PostStatus;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateCategoryDto {
    #[validate(length(min = 1, max = 100))]
    pub(crate) name: String,
    #[validate(length(max = 500))]
    pub(crate) description: Option<String>,
}

/// `description` is tri-state: absent keeps the stored value, an explicit
/// `null` clears it, a string replaces it.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 100))]
    pub(crate) name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub(crate) description: Option<Option<String>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryListItemDto {
    #[serde(flatten)]
    pub(crate) category: CategoryDto,
    pub(crate) post_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryPostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) status: PostStatus,
    pub(crate) author_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryDetailDto {
    #[serde(flatten)]
    pub(crate) category: CategoryDto,
    pub(crate) posts: Vec<CategoryPostDto>,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

impl From<CategoryWithCount> for CategoryListItemDto {
    fn from(listed: CategoryWithCount) -> Self {
        Self {
            category: listed.category.into(),
            post_count: listed.post_count,
        }
    }
}

impl From<CategoryPostSummary> for CategoryPostDto {
    fn from(post: CategoryPostSummary) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            status: post.status,
            author_id: post.author_id,
            created_at: post.created_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "categories",
    responses(
        (status = 200, description = "Categories listed with post counts", body = [CategoryListItemDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<CategoryListItemDto>>)> {
    let listed = state.category_service.list_categories().await?;
    let listed = listed.into_iter().map(CategoryListItemDto::from).collect();
    Ok((StatusCode::OK, Json(listed)))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "categories",
    params(
        ("id" = i64, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category with its posts", body = CategoryDetailDto),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<CategoryDetailDto>)> {
    let (category, posts) = state.category_service.get_category(id).await?;

    Ok((
        StatusCode::OK,
        Json(CategoryDetailDto {
            category: category.into(),
            posts: posts.into_iter().map(CategoryPostDto::from).collect(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "categories",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Name or slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_category(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<CreateCategoryDto>,
) -> AppResult<(StatusCode, Json<CategoryDto>)> {
    dto.validate()?;
    let req = CreateCategoryRequest {
        name: dto.name,
        description: dto.description,
    };

    let category = state.category_service.create_category(auth.role, req).await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

#[utoipa::path(
    patch,
    path = "/api/categories/{id}",
    tag = "categories",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Category id")
    ),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = CategoryDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Name or slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_category(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<UpdateCategoryDto>,
) -> AppResult<(StatusCode, Json<CategoryDto>)> {
    dto.validate()?;
    let req = UpdateCategoryRequest {
        name: dto.name,
        description: dto.description,
    };

    let category = state
        .category_service
        .update_category(auth.role, id, req)
        .await?;
    Ok((StatusCode::OK, Json(category.into())))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "categories",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Category id")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still has posts"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_category(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.category_service.delete_category(auth.role, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

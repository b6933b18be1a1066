use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::post_repository::{LikeOutcome, PostWithRefs};
use crate::domain::post::{CreatePostRequest, Post, PostStatus, UpdatePostRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) content: String,
    pub(crate) category_id: i64,
    #[validate(length(max = 255))]
    pub(crate) tags: Option<String>,
    pub(crate) status: Option<PostStatus>,
    #[serde(default)]
    pub(crate) images: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: Option<String>,
    #[validate(length(min = 1))]
    pub(crate) content: Option<String>,
    pub(crate) category_id: Option<i64>,
    #[validate(length(max = 255))]
    pub(crate) tags: Option<String>,
    pub(crate) status: Option<PostStatus>,
    #[serde(default)]
    pub(crate) new_images: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) content: String,
    pub(crate) author_id: i64,
    pub(crate) category_id: i64,
    pub(crate) tags: Option<String>,
    pub(crate) status: PostStatus,
    pub(crate) likes_count: i64,
    pub(crate) views: i64,
    pub(crate) images: Vec<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostWithRefsDto {
    #[serde(flatten)]
    pub(crate) post: PostDto,
    pub(crate) author_username: String,
    pub(crate) category_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LikeOutcomeDto {
    pub(crate) liked: bool,
    pub(crate) likes_count: i64,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            content: post.content,
            author_id: post.author_id,
            category_id: post.category_id,
            tags: post.tags,
            status: post.status,
            likes_count: post.likes_count,
            views: post.views,
            images: post.images,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<PostWithRefs> for PostWithRefsDto {
    fn from(listed: PostWithRefs) -> Self {
        Self {
            post: listed.post.into(),
            author_username: listed.author_username,
            category_name: listed.category_name,
        }
    }
}

impl From<LikeOutcome> for LikeOutcomeDto {
    fn from(outcome: LikeOutcome) -> Self {
        Self {
            liked: outcome.liked,
            likes_count: outcome.likes_count,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    responses(
        (status = 200, description = "Posts listed, newest first", body = [PostWithRefsDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<PostWithRefsDto>>)> {
    let posts = state.post_service.list_posts().await?;
    let posts = posts.into_iter().map(PostWithRefsDto::from).collect();
    Ok((StatusCode::OK, Json(posts)))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found, view counted", body = PostWithRefsDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<PostWithRefsDto>)> {
    let post = state.post_service.get_post(id).await?;
    Ok((StatusCode::OK, Json(post.into())))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;
    let req = CreatePostRequest {
        title: dto.title,
        content: dto.content,
        category_id: dto.category_id,
        tags: dto.tags,
        status: dto.status,
        images: dto.images,
    };

    let post = state.post_service.create_post(auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(post.into())))
}

#[utoipa::path(
    patch,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<UpdatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;
    let req = UpdatePostRequest {
        title: dto.title,
        content: dto.content,
        category_id: dto.category_id,
        tags: dto.tags,
        status: dto.status,
        new_images: dto.new_images,
    };

    let post = state
        .post_service
        .update_post(auth.user_id, auth.role, id, req)
        .await?;
    Ok((StatusCode::OK, Json(post.into())))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted with its comments"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state
        .post_service
        .delete_post(auth.user_id, auth.role, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/like",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Like toggled", body = LikeOutcomeDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn toggle_like(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<LikeOutcomeDto>)> {
    let outcome = state.post_service.toggle_like(auth.user_id, id).await?;
    Ok((StatusCode::OK, Json(outcome.into())))
}

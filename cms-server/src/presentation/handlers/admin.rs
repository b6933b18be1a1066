use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::admin_service::{DashboardStats, UserWithActivity};
use crate::data::comment_repository::AuthorCommentSummary;
use crate::data::post_repository::AuthorPostSummary;
use crate::domain::post::PostStatus;
use crate::domain::role::Role;
use crate::domain::user::CreateAdminRequest;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::auth::UserDto;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateAdminDto {
    #[validate(length(min = 3, max = 50))]
    pub(crate) username: String,
    #[validate(email)]
    pub(crate) email: String,
    #[validate(length(min = 8, max = 128))]
    pub(crate) password: String,
    pub(crate) role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateRoleDto {
    #[validate(length(min = 1))]
    pub(crate) action: String,
    #[validate(length(min = 1))]
    pub(crate) role: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorPostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) status: PostStatus,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorCommentDto {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) post_id: i64,
    pub(crate) post_title: String,
    pub(crate) post_slug: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserWithActivityDto {
    #[serde(flatten)]
    pub(crate) user: UserDto,
    pub(crate) posts: Vec<AuthorPostDto>,
    pub(crate) comments: Vec<AuthorCommentDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct DashboardStatsDto {
    pub(crate) total_users: i64,
    pub(crate) total_posts: i64,
    pub(crate) total_comments: i64,
}

impl From<AuthorPostSummary> for AuthorPostDto {
    fn from(post: AuthorPostSummary) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            status: post.status,
            created_at: post.created_at,
        }
    }
}

impl From<AuthorCommentSummary> for AuthorCommentDto {
    fn from(comment: AuthorCommentSummary) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            post_id: comment.post_id,
            post_title: comment.post_title,
            post_slug: comment.post_slug,
            created_at: comment.created_at,
        }
    }
}

impl From<UserWithActivity> for UserWithActivityDto {
    fn from(entry: UserWithActivity) -> Self {
        Self {
            user: entry.user.into(),
            posts: entry.posts.into_iter().map(AuthorPostDto::from).collect(),
            comments: entry
                .comments
                .into_iter()
                .map(AuthorCommentDto::from)
                .collect(),
        }
    }
}

impl From<DashboardStats> for DashboardStatsDto {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_users: stats.total_users,
            total_posts: stats.total_posts,
            total_comments: stats.total_comments,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/create-admin",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateAdminDto,
    responses(
        (status = 201, description = "Admin account created", body = UserDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Superadmin only"),
        (status = 409, description = "User already exists"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_admin(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<CreateAdminDto>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    dto.validate()?;
    let req = CreateAdminRequest {
        username: dto.username,
        email: dto.email,
        password: dto.password,
        role: dto.role,
    };

    let user = state.admin_service.create_admin(auth.role, req).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All users with their posts and comments", body = [UserWithActivityDto]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_all_users(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<Vec<UserWithActivityDto>>)> {
    let users = state.admin_service.get_all_users(auth.role).await?;
    let users = users.into_iter().map(UserWithActivityDto::from).collect();
    Ok((StatusCode::OK, Json(users)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/role",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Target user id")
    ),
    request_body = UpdateRoleDto,
    responses(
        (status = 200, description = "Role updated", body = UserDto),
        (status = 400, description = "Unknown action or role"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role not assignable by this actor"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_user_role(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<UpdateRoleDto>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    dto.validate()?;

    let user = state
        .admin_service
        .manage_user_role(auth.role, id, &dto.action, &dto.role)
        .await?;
    Ok((StatusCode::OK, Json(user.into())))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Target user id")
    ),
    responses(
        (status = 204, description = "User deleted with all posts and comments"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.admin_service.delete_user(auth.role, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Dashboard totals", body = DashboardStatsDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn dashboard_stats(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<DashboardStatsDto>)> {
    let stats = state.admin_service.dashboard_stats(auth.role).await?;
    Ok((StatusCode::OK, Json(stats.into())))
}

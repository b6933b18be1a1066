use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::comment::{
    Comment, CommentNode, CreateCommentRequest, UpdateCommentRequest,
};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::posts::LikeOutcomeDto;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateCommentDto {
    #[validate(length(min = 1, max = 1000))]
    pub(crate) content: String,
    pub(crate) parent_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateCommentDto {
    #[validate(length(min = 1, max = 1000))]
    pub(crate) content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) content: String,
    pub(crate) parent_id: Option<i64>,
    pub(crate) likes_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentNodeDto {
    #[serde(flatten)]
    pub(crate) comment: CommentDto,
    pub(crate) replies: Vec<CommentNodeDto>,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            content: comment.content,
            parent_id: comment.parent_id,
            likes_count: comment.likes_count,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

impl From<CommentNode> for CommentNodeDto {
    fn from(node: CommentNode) -> Self {
        Self {
            comment: node.comment.into(),
            replies: node.replies.into_iter().map(CommentNodeDto::from).collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/comments/post/{post_id}",
    tag = "comments",
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Comment thread, newest roots first", body = [CommentNodeDto]),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_comments_by_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> AppResult<(StatusCode, Json<Vec<CommentNodeDto>>)> {
    let thread = state.comment_service.get_comments_by_post(post_id).await?;
    let thread = thread.into_iter().map(CommentNodeDto::from).collect();
    Ok((StatusCode::OK, Json(thread)))
}

#[utoipa::path(
    post,
    path = "/api/comments/post/{post_id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created", body = CommentDto),
        (status = 400, description = "Validation error or parent from another post"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post or parent comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
    Json(dto): Json<CreateCommentDto>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    dto.validate()?;
    let req = CreateCommentRequest {
        content: dto.content,
        parent_id: dto.parent_id,
    };

    let comment = state
        .comment_service
        .create_comment(auth.user_id, post_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Comment updated", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only the author may edit"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<UpdateCommentDto>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    dto.validate()?;
    let req = UpdateCommentRequest {
        content: dto.content,
    };

    let comment = state
        .comment_service
        .update_comment(auth.user_id, id, req)
        .await?;
    Ok((StatusCode::OK, Json(comment.into())))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 204, description = "Comment deleted with its replies"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state
        .comment_service
        .delete_comment(auth.user_id, auth.role, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/comments/{id}/like",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Like toggled", body = LikeOutcomeDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn toggle_like(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<LikeOutcomeDto>)> {
    let outcome = state.comment_service.toggle_like(auth.user_id, id).await?;
    Ok((StatusCode::OK, Json(outcome.into())))
}

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::user::{ChangePasswordRequest, ProfilePatch};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::handlers::auth::UserDto;
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateProfileDto {
    #[validate(length(max = 300))]
    pub(crate) bio: Option<String>,
    #[validate(url)]
    pub(crate) image: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct ChangePasswordDto {
    #[validate(length(min = 1))]
    pub(crate) current_password: String,
    #[validate(length(min = 8, max = 128))]
    pub(crate) new_password: String,
}

#[utoipa::path(
    get,
    path = "/api/users/profile",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current user profile", body = UserDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    let user = state.account_service.get_profile(auth.user_id).await?;
    Ok((StatusCode::OK, Json(user.into())))
}

#[utoipa::path(
    patch,
    path = "/api/users/update-profile",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = UserDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<UpdateProfileDto>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    dto.validate()?;
    let patch = ProfilePatch {
        bio: dto.bio,
        image: dto.image,
    };

    let user = state
        .account_service
        .update_profile(auth.user_id, patch)
        .await?;
    Ok((StatusCode::OK, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/api/users/change-password",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    request_body = ChangePasswordDto,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Validation error or wrong current password"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn change_password(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<ChangePasswordDto>,
) -> AppResult<StatusCode> {
    dto.validate()?;
    let req = ChangePasswordRequest {
        current_password: dto.current_password,
        new_password: dto.new_password,
    };

    state
        .account_service
        .change_password(auth.user_id, req)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/users/delete-account",
    tag = "users",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Account deleted with all posts and comments"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_account(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<StatusCode> {
    state.account_service.delete_account(auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::admin::{
    AuthorCommentDto, AuthorPostDto, CreateAdminDto, DashboardStatsDto, UpdateRoleDto,
    UserWithActivityDto,
};
use crate::presentation::handlers::auth::{AuthResponseDto, LoginDto, RegisterDto, UserDto};
use crate::presentation::handlers::categories::{
    CategoryDetailDto, CategoryDto, CategoryListItemDto, CategoryPostDto, CreateCategoryDto,
    UpdateCategoryDto,
};
use crate::presentation::handlers::comments::{
    CommentDto, CommentNodeDto, CreateCommentDto, UpdateCommentDto,
};
use crate::presentation::handlers::posts::{
    CreatePostDto, LikeOutcomeDto, PostDto, PostWithRefsDto, UpdatePostDto,
};
use crate::presentation::handlers::users::{ChangePasswordDto, UpdateProfileDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::users::get_profile,
        crate::presentation::handlers::users::update_profile,
        crate::presentation::handlers::users::change_password,
        crate::presentation::handlers::users::delete_account,
        crate::presentation::handlers::categories::list_categories,
        crate::presentation::handlers::categories::get_category,
        crate::presentation::handlers::categories::create_category,
        crate::presentation::handlers::categories::update_category,
        crate::presentation::handlers::categories::delete_category,
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::posts::toggle_like,
        crate::presentation::handlers::comments::get_comments_by_post,
        crate::presentation::handlers::comments::create_comment,
        crate::presentation::handlers::comments::update_comment,
        crate::presentation::handlers::comments::delete_comment,
        crate::presentation::handlers::comments::toggle_like,
        crate::presentation::handlers::admin::create_admin,
        crate::presentation::handlers::admin::get_all_users,
        crate::presentation::handlers::admin::update_user_role,
        crate::presentation::handlers::admin::delete_user,
        crate::presentation::handlers::admin::dashboard_stats
    ),
    components(
        schemas(
            RegisterDto,
            LoginDto,
            AuthResponseDto,
            UserDto,
            UpdateProfileDto,
            ChangePasswordDto,
            CreateCategoryDto,
            UpdateCategoryDto,
            CategoryDto,
            CategoryListItemDto,
            CategoryPostDto,
            CategoryDetailDto,
            CreatePostDto,
            UpdatePostDto,
            PostDto,
            PostWithRefsDto,
            LikeOutcomeDto,
            CreateCommentDto,
            UpdateCommentDto,
            CommentDto,
            CommentNodeDto,
            CreateAdminDto,
            UpdateRoleDto,
            AuthorPostDto,
            AuthorCommentDto,
            UserWithActivityDto,
            DashboardStatsDto
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "Account endpoints"),
        (name = "categories", description = "Category endpoints"),
        (name = "posts", description = "Post endpoints"),
        (name = "comments", description = "Comment endpoints"),
        (name = "admin", description = "Administration endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}

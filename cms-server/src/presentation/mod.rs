use sqlx::PgPool;
use std::sync::Arc;

use crate::application::account_service::AccountService;
use crate::application::admin_service::AdminService;
use crate::application::auth_service::AuthService;
use crate::application::category_service::CategoryService;
use crate::application::comment_service::CommentService;
use crate::application::post_service::PostService;
use crate::data::repositories::postgres::category_repository::PostgresCategoryRepository;
use crate::data::repositories::postgres::comment_repository::PostgresCommentRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::mailer::LogMailer;

pub(crate) mod app_error;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService<PostgresUserRepository>>,
    pub(crate) account_service: Arc<AccountService<PostgresUserRepository>>,
    pub(crate) category_service: Arc<CategoryService<PostgresCategoryRepository>>,
    pub(crate) post_service: Arc<PostService<PostgresPostRepository>>,
    pub(crate) comment_service:
        Arc<CommentService<PostgresCommentRepository, PostgresPostRepository>>,
    pub(crate) admin_service: Arc<
        AdminService<
            PostgresUserRepository,
            PostgresPostRepository,
            PostgresCommentRepository,
            LogMailer,
        >,
    >,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    pub(crate) fn build(pool: PgPool, jwt_secret: &str, jwt_ttl_seconds: i64, mail_from: &str) -> Self {
        let users = PostgresUserRepository::new(pool.clone());
        let categories = PostgresCategoryRepository::new(pool.clone());
        let posts = PostgresPostRepository::new(pool.clone());
        let comments = PostgresCommentRepository::new(pool.clone());
        let mailer = LogMailer::new(mail_from);
        let jwt = Arc::new(JwtService::new(jwt_secret, jwt_ttl_seconds));

        Self {
            auth_service: Arc::new(AuthService::new(users.clone(), jwt.clone())),
            account_service: Arc::new(AccountService::new(users.clone())),
            category_service: Arc::new(CategoryService::new(categories)),
            post_service: Arc::new(PostService::new(posts.clone())),
            comment_service: Arc::new(CommentService::new(comments.clone(), posts.clone())),
            admin_service: Arc::new(AdminService::new(users, posts, comments, mailer)),
            jwt,
        }
    }
}

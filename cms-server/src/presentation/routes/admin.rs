use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, patch, post};

use crate::presentation::AppState;
use crate::presentation::handlers::admin::{
    create_admin, dashboard_stats, delete_user, get_all_users, update_user_role,
};
use crate::presentation::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/create-admin", post(create_admin))
        .route("/users", get(get_all_users))
        .route("/users/{id}", delete(delete_user))
        .route("/users/{id}/role", patch(update_user_role))
        .route("/stats", get(dashboard_stats))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

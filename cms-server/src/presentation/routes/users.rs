use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, patch, post};

use crate::presentation::AppState;
use crate::presentation::handlers::users::{
    change_password, delete_account, get_profile, update_profile,
};
use crate::presentation::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/update-profile", patch(update_profile))
        .route("/change-password", post(change_password))
        .route("/delete-account", delete(delete_account))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

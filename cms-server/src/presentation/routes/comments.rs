use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::handlers::comments::{
    create_comment, delete_comment, get_comments_by_post, toggle_like, update_comment,
};
use crate::presentation::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/post/{post_id}", get(get_comments_by_post));

    let protected = Router::new()
        .route("/post/{post_id}", post(create_comment))
        .route("/{id}", put(update_comment).delete(delete_comment))
        .route("/{id}/like", post(toggle_like))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(protected)
}

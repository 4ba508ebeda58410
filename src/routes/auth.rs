use axum::routing::{get, post};
use axum::Router;

use crate::auth::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(handlers::register_page))
        .route("/register", post(handlers::register_submit))
        .route("/login", get(handlers::login_page))
        .route("/login", post(handlers::login_submit))
        .route("/logout", get(handlers::logout))
}

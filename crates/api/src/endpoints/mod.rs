//! API endpoints.

mod articles;
mod auth;
mod blog;
mod links;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/blog", blog::router())
        .nest("/articles", articles::router())
        .nest("/links", links::router())
}

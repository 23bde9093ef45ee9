//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use arbor_core::{ArticleService, AuthService, BlogService, LinkService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub blog_service: BlogService,
    pub article_service: ArticleService,
    pub link_service: LinkService,
}

/// Authentication middleware. Resolves a bearer token to a user and
/// stashes it in request extensions; handlers decide whether auth is
/// required.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.auth_service.authenticate(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}

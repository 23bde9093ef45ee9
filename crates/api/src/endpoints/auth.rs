//! Authentication endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use arbor_common::AppResult;
use arbor_core::{LoginInput, LoginResponse};

use crate::{extractors::AuthUser, middleware::AppState, response::{ApiResponse, ok}};

/// Sign in and receive a fresh API token.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginInput>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let response = state.auth_service.login(req).await?;
    Ok(ApiResponse::ok(response))
}

/// Invalidate the current API token.
async fn logout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    state.auth_service.logout(&user.id).await?;
    Ok(ok())
}

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

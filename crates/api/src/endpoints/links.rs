//! Curated link endpoints.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use arbor_common::AppResult;
use arbor_core::{CreateLinkInput, LinkListQuery, LinkResponse, UpdateLinkInput};
use arbor_db::entities::link_category;

use crate::extractors::{AdminUser, MaybeAuthUser};
use crate::form::FormData;
use crate::middleware::AppState;
use crate::response::{ApiResponse, PagedResponse, ok};

/// Public directory listing, optionally filtered by category name.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<LinkListQuery>,
) -> AppResult<ApiResponse<PagedResponse<LinkResponse>>> {
    let paged = state.link_service.list(query).await?;
    Ok(ApiResponse::ok(paged.into()))
}

/// Unpublished links, admin only.
async fn unpublished(
    AdminUser(_user): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<LinkResponse>>> {
    Ok(ApiResponse::ok(state.link_service.list_unpublished().await?))
}

/// All link categories.
async fn categories(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<link_category::Model>>> {
    Ok(ApiResponse::ok(state.link_service.categories().await?))
}

/// Category creation request.
#[derive(Debug, Deserialize)]
struct CreateCategoryRequest {
    name: String,
}

/// Create a link category.
async fn create_category(
    AdminUser(_user): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> AppResult<ApiResponse<link_category::Model>> {
    Ok(ApiResponse::ok(
        state.link_service.create_category(&req.name).await?,
    ))
}

/// Fetch a link by slug.
async fn get_link(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<LinkResponse>> {
    let link = state.link_service.get_by_slug(&slug, user.is_admin()).await?;
    Ok(ApiResponse::ok(link))
}

/// Create a link from a multipart form.
async fn create_link(
    AdminUser(_user): AdminUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<LinkResponse>> {
    let mut form = FormData::from_multipart(multipart).await?;

    let input = CreateLinkInput {
        title: form.required("title")?,
        url: form.required("url")?,
        description: form.non_empty("description").map(str::to_string),
        category_id: form.non_empty("categoryId").map(str::to_string),
        published: form.flag("published").unwrap_or(false),
    };
    let thumbnail = form.take_file("image");

    let link = state.link_service.create(input, thumbnail).await?;
    Ok(ApiResponse::ok(link))
}

/// Update a link from a multipart form.
async fn update_link(
    AdminUser(_user): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<LinkResponse>> {
    let mut form = FormData::from_multipart(multipart).await?;

    let input = UpdateLinkInput {
        title: form.non_empty("title").map(str::to_string),
        url: form.non_empty("url").map(str::to_string),
        description: form
            .text("description")
            .map(|s| (!s.is_empty()).then(|| s.to_string())),
        category_id: form
            .text("categoryId")
            .map(|s| (!s.is_empty()).then(|| s.to_string())),
        published: form.flag("published"),
    };
    let thumbnail = form.take_file("image");

    let link = state.link_service.update(&id, input, thumbnail).await?;
    Ok(ApiResponse::ok(link))
}

/// Delete a link and its thumbnail.
async fn delete_link(
    AdminUser(_user): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.link_service.delete(&id).await?;
    Ok(ok())
}

/// Create the links router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create_link))
        .route("/unpublished", get(unpublished))
        .route("/categories", get(categories).post(create_category))
        .route("/{slug}", get(get_link).put(update_link).delete(delete_link))
}

//! Article endpoints.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use arbor_common::{AppError, AppResult};
use arbor_core::{ArticleResponse, CreateArticleInput, GalleryItem, UpdateArticleInput};
use arbor_db::entities::article_category;

use crate::extractors::{AdminUser, MaybeAuthUser};
use crate::form::FormData;
use crate::middleware::AppState;
use crate::response::{ApiResponse, ok};

/// Published articles in display order.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<ArticleResponse>>> {
    Ok(ApiResponse::ok(state.article_service.list().await?))
}

/// Every article, admin only.
async fn list_all(
    AdminUser(_user): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ArticleResponse>>> {
    Ok(ApiResponse::ok(state.article_service.list_all().await?))
}

/// All article categories.
async fn categories(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<article_category::Model>>> {
    Ok(ApiResponse::ok(state.article_service.categories().await?))
}

/// Category creation request.
#[derive(Debug, Deserialize)]
struct CreateCategoryRequest {
    name: String,
}

/// Create an article category.
async fn create_category(
    AdminUser(_user): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> AppResult<ApiResponse<article_category::Model>> {
    Ok(ApiResponse::ok(
        state.article_service.create_category(&req.name).await?,
    ))
}

/// Fetch an article by slug.
async fn get_article(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<ArticleResponse>> {
    let article = state
        .article_service
        .get_by_slug(&slug, user.is_admin())
        .await?;
    Ok(ApiResponse::ok(article))
}

/// Create an article from a multipart form.
async fn create_article(
    AdminUser(user): AdminUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<ArticleResponse>> {
    let mut form = FormData::from_multipart(multipart).await?;

    let input = CreateArticleInput {
        title: form.required("title")?,
        summary: form.non_empty("summary").map(str::to_string),
        body: form.required("body")?,
        date: form
            .date("date")?
            .ok_or_else(|| AppError::BadRequest("Missing field: date".to_string()))?,
        category_id: form.non_empty("categoryId").map(str::to_string),
        display_order: form.int("displayOrder")?.unwrap_or(0),
        published: form.flag("published").unwrap_or(false),
    };
    let featured_image = form.take_file("image");
    let gallery_images = form.take_files("images");

    let article = state
        .article_service
        .create(&user.id, input, featured_image, gallery_images)
        .await?;
    Ok(ApiResponse::ok(article))
}

/// Update an article from a multipart form.
async fn update_article(
    AdminUser(_user): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<ArticleResponse>> {
    let mut form = FormData::from_multipart(multipart).await?;

    let input = UpdateArticleInput {
        title: form.non_empty("title").map(str::to_string),
        summary: form
            .text("summary")
            .map(|s| (!s.is_empty()).then(|| s.to_string())),
        body: form.non_empty("body").map(str::to_string),
        date: form.date("date")?,
        category_id: form
            .text("categoryId")
            .map(|s| (!s.is_empty()).then(|| s.to_string())),
        display_order: form.int("displayOrder")?,
        published: form.flag("published"),
    };
    let featured_image = form.take_file("image");
    let gallery_images = form.take_files("images");

    let article = state
        .article_service
        .update(&id, input, featured_image, gallery_images)
        .await?;
    Ok(ApiResponse::ok(article))
}

/// Delete an article and its images.
async fn delete_article(
    AdminUser(_user): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.article_service.delete(&id).await?;
    Ok(ok())
}

/// Upload one gallery image for the editor.
async fn upload_image(
    AdminUser(_user): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<GalleryItem>> {
    let mut form = FormData::from_multipart(multipart).await?;
    let upload = form
        .take_file("image")
        .ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    let item = state
        .article_service
        .upload_gallery_image(&id, upload)
        .await?;
    Ok(ApiResponse::ok(item))
}

/// Create the articles router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create_article))
        .route("/all", get(list_all))
        .route("/categories", get(categories).post(create_category))
        .route(
            "/{slug}",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/{id}/images", post(upload_image))
}

//! Blog endpoints.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use arbor_common::{AppError, AppResult};
use arbor_core::{
    BlogListQuery, BlogPostResponse, CreateBlogPostInput, GalleryItem, UpdateBlogPostInput,
};
use arbor_db::entities::blog_category;
use arbor_db::repositories::TagUsage;

use crate::extractors::{AdminUser, MaybeAuthUser};
use crate::form::FormData;
use crate::middleware::AppState;
use crate::response::{ApiResponse, PagedResponse, ok};

/// Public listing. Search wins over category, category over tag.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<BlogListQuery>,
) -> AppResult<ApiResponse<PagedResponse<BlogPostResponse>>> {
    let paged = state.blog_service.list(query).await?;
    Ok(ApiResponse::ok(paged.into()))
}

/// Unpublished posts, admin only.
async fn unpublished(
    AdminUser(_user): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<BlogPostResponse>>> {
    Ok(ApiResponse::ok(state.blog_service.list_unpublished().await?))
}

/// Recent published posts for sidebars.
async fn recent(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<BlogPostResponse>>> {
    Ok(ApiResponse::ok(state.blog_service.recent(5).await?))
}

/// Most-used tags.
async fn popular_tags(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<TagUsage>>> {
    Ok(ApiResponse::ok(state.blog_service.popular_tags(15).await?))
}

/// All blog categories.
async fn categories(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<blog_category::Model>>> {
    Ok(ApiResponse::ok(state.blog_service.categories().await?))
}

/// Category creation request.
#[derive(Debug, Deserialize)]
struct CreateCategoryRequest {
    name: String,
}

/// Create a blog category.
async fn create_category(
    AdminUser(_user): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> AppResult<ApiResponse<blog_category::Model>> {
    Ok(ApiResponse::ok(
        state.blog_service.create_category(&req.name).await?,
    ))
}

/// Fetch a post by slug.
async fn get_post(
    user: MaybeAuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<BlogPostResponse>> {
    let post = state.blog_service.get_by_slug(&slug, user.is_admin()).await?;
    Ok(ApiResponse::ok(post))
}

/// Create a post from a multipart form.
async fn create_post(
    AdminUser(user): AdminUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<BlogPostResponse>> {
    let mut form = FormData::from_multipart(multipart).await?;

    let input = CreateBlogPostInput {
        title: form.required("title")?,
        summary: form.non_empty("summary").map(str::to_string),
        body: form.required("body")?,
        date: form
            .date("date")?
            .ok_or_else(|| AppError::BadRequest("Missing field: date".to_string()))?,
        category_id: form.non_empty("categoryId").map(str::to_string),
        tags: form.non_empty("tags").map(str::to_string),
        published: form.flag("published").unwrap_or(false),
        featured: form.flag("featured").unwrap_or(false),
    };
    let featured_image = form.take_file("image");
    let gallery_images = form.take_files("images");

    let post = state
        .blog_service
        .create(&user.id, input, featured_image, gallery_images)
        .await?;
    Ok(ApiResponse::ok(post))
}

/// Update a post from a multipart form. Sent fields overwrite; empty
/// nullable fields clear.
async fn update_post(
    AdminUser(_user): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<BlogPostResponse>> {
    let mut form = FormData::from_multipart(multipart).await?;

    let input = UpdateBlogPostInput {
        title: form.non_empty("title").map(str::to_string),
        summary: form
            .text("summary")
            .map(|s| (!s.is_empty()).then(|| s.to_string())),
        body: form.non_empty("body").map(str::to_string),
        date: form.date("date")?,
        category_id: form
            .text("categoryId")
            .map(|s| (!s.is_empty()).then(|| s.to_string())),
        tags: form.text("tags").map(str::to_string),
        published: form.flag("published"),
        featured: form.flag("featured"),
    };
    let featured_image = form.take_file("image");
    let gallery_images = form.take_files("images");

    let post = state
        .blog_service
        .update(&id, input, featured_image, gallery_images)
        .await?;
    Ok(ApiResponse::ok(post))
}

/// Delete a post and its images.
async fn delete_post(
    AdminUser(_user): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.blog_service.delete(&id).await?;
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

    let item = state.blog_service.upload_gallery_image(&id, upload).await?;
    Ok(ApiResponse::ok(item))
}

/// Create the blog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create_post))
        .route("/unpublished", get(unpublished))
        .route("/recent", get(recent))
        .route("/tags/popular", get(popular_tags))
        .route("/categories", get(categories).post(create_category))
        .route("/{slug}", get(get_post).put(update_post).delete(delete_post))
        .route("/{id}/images", post(upload_image))
}

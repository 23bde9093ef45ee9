//! API integration tests.
//!
//! These run the real router against a mock database connection.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
use tower::ServiceExt;

use arbor_api::{AppState, router as api_router};
use arbor_core::{
    ArticleService, AuthService, BlogService, ImageService, LinkService, MemoryStore, RasterCodec,
    UlidNamer,
};
use arbor_db::entities::blog_post;
use arbor_db::repositories::{
    ArticleCategoryRepository, ArticleRepository, BlogCategoryRepository, BlogPostRepository,
    BlogTagRepository, LinkCategoryRepository, LinkRepository, UserRepository,
};

/// Wire the full router against the given (mock) connection.
fn test_router(db: DatabaseConnection) -> Router {
    let db = Arc::new(db);

    let image_service = ImageService::new(
        Arc::new(MemoryStore::new()),
        Arc::new(RasterCodec::new()),
        Arc::new(UlidNamer::new()),
        "/assets/images/uploads",
    );

    let auth_service = AuthService::new(UserRepository::new(Arc::clone(&db)));
    let blog_service = BlogService::new(
        BlogPostRepository::new(Arc::clone(&db)),
        BlogCategoryRepository::new(Arc::clone(&db)),
        BlogTagRepository::new(Arc::clone(&db)),
        image_service.clone(),
    );
    let article_service = ArticleService::new(
        ArticleRepository::new(Arc::clone(&db)),
        ArticleCategoryRepository::new(Arc::clone(&db)),
        image_service.clone(),
    );
    let link_service = LinkService::new(
        LinkRepository::new(Arc::clone(&db)),
        LinkCategoryRepository::new(Arc::clone(&db)),
        image_service,
    );

    let state = AppState {
        auth_service,
        blog_service,
        article_service,
        link_service,
    };

    api_router().with_state(state)
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn sample_post(published: bool) -> blog_post::Model {
    blog_post::Model {
        id: "01hq3ka9w2n5x8r4d7f6b1c0e9".to_string(),
        user_id: "01hq3ka9w2n5x8r4d7f6b1c0aa".to_string(),
        category_id: None,
        title: "Hello".to_string(),
        slug: "hello".to_string(),
        summary: None,
        body: "First post".to_string(),
        date: chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        original_image: None,
        image_manifest: None,
        images: serde_json::json!([]),
        published,
        featured: false,
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    }
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_with_unknown_user_returns_unauthorized() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<arbor_db::entities::user::Model>::new()])
        .into_connection();
    let app = test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/login")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"username":"ghost","password":"nope1234"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unpublished_listing_requires_auth() {
    let app = test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/blog/unpublished")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_post_returns_404() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<blog_post::Model>::new()])
        .into_connection();
    let app = test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/blog/no-such-post")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unpublished_post_hidden_from_anonymous_readers() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_post(false)]])
        .into_connection();
    let app = test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/blog/hello")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_published_post_is_served() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_post(true)]])
        .append_query_results([Vec::<arbor_db::entities::blog_tag::Model>::new()])
        .into_connection();
    let app = test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/blog/hello")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_link_listing_returns_empty_page() {
    // The paginator counts first, then fetches the page.
    let count_row: BTreeMap<&str, Value> = [("num_items", Value::from(0i64))].into();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row]])
        .append_query_results([Vec::<arbor_db::entities::link::Model>::new()])
        .into_connection();
    let app = test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/links/?page=1")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_post_creation_requires_admin() {
    let app = test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/blog/")
                .method("POST")
                .header("Content-Type", "multipart/form-data; boundary=X")
                .body(Body::from("--X--\r\n"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

//! Arbor server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arbor_api::{AppState, router as api_router};
use arbor_common::Config;
use arbor_core::{
    ArticleService, AuthService, BlogService, ImageService, LinkService, LocalMediaStore,
    RasterCodec, TimestampNamer, UlidNamer, UploadNamer,
};
use arbor_db::repositories::{
    ArticleCategoryRepository, ArticleRepository, BlogCategoryRepository, BlogPostRepository,
    BlogTagRepository, LinkCategoryRepository, LinkRepository, UserRepository,
};

/// Request bodies above this size are rejected before any handler runs.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Bootstrap an admin account without going through the API.
///
/// `arbor create-admin <username> <password>`
async fn create_admin(username: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = arbor_db::init(&config).await?;
    arbor_db::migrate(&db).await?;

    let auth = AuthService::new(UserRepository::new(Arc::new(db)));
    let user = auth.create_user(username, password, true).await?;
    info!(user_id = %user.id, username = %user.username, "admin account created");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arbor=debug,tower_http=debug".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => {}
        [cmd, username, password] if cmd == "create-admin" => {
            return create_admin(username, password).await;
        }
        _ => return Err("usage: arbor [create-admin <username> <password>]".into()),
    }

    info!("Starting arbor server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = arbor_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    arbor_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let blog_post_repo = BlogPostRepository::new(Arc::clone(&db));
    let blog_category_repo = BlogCategoryRepository::new(Arc::clone(&db));
    let blog_tag_repo = BlogTagRepository::new(Arc::clone(&db));
    let article_repo = ArticleRepository::new(Arc::clone(&db));
    let article_category_repo = ArticleCategoryRepository::new(Arc::clone(&db));
    let link_repo = LinkRepository::new(Arc::clone(&db));
    let link_category_repo = LinkCategoryRepository::new(Arc::clone(&db));

    // Initialize the image pipeline
    let store = Arc::new(LocalMediaStore::new(config.uploads.root.clone()));
    let namer: Arc<dyn UploadNamer> = if config.uploads.legacy_timestamp_names {
        Arc::new(TimestampNamer)
    } else {
        Arc::new(UlidNamer::new())
    };
    let image_service = ImageService::new(
        store,
        Arc::new(RasterCodec::new()),
        namer,
        config.uploads.public_prefix.clone(),
    );

    // Initialize services
    let auth_service = AuthService::new(user_repo);
    let blog_service = BlogService::new(
        blog_post_repo,
        blog_category_repo,
        blog_tag_repo,
        image_service.clone(),
    );
    let article_service = ArticleService::new(
        article_repo,
        article_category_repo,
        image_service.clone(),
    );
    let link_service = LinkService::new(link_repo, link_category_repo, image_service);

    let state = AppState {
        auth_service,
        blog_service,
        article_service,
        link_service,
    };

    // Build router: the API plus static serving of the uploads tree
    let app = Router::new()
        .nest("/api", api_router())
        .nest_service(
            &config.uploads.public_prefix,
            ServeDir::new(&config.uploads.root),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            arbor_api::middleware::auth_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

//! HTTP API layer.
//!
//! - **Endpoints**: blog, articles, links, auth
//! - **Extractors**: authentication from request extensions
//! - **Middleware**: bearer-token resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod form;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;

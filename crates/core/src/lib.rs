//! Business logic for the content platform.
//!
//! Services own the repositories and the image pipeline; HTTP handlers
//! stay thin and delegate here.

pub mod services;

pub use services::*;

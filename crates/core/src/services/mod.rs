//! Business logic services.

#![allow(missing_docs)]

pub mod article;
pub mod auth;
pub mod blog;
pub mod codec;
pub mod image;
pub mod link;
pub mod store;

pub use article::{
    ArticleResponse, ArticleService, CreateArticleInput, UpdateArticleInput,
};
pub use auth::{AuthService, LoginInput, LoginResponse, UserResponse};
pub use blog::{
    BlogListQuery, BlogPostResponse, BlogService, CreateBlogPostInput, UpdateBlogPostInput,
};
pub use codec::{ImageCodec, RasterCodec, SUPPORTED_EXTENSIONS};
pub use image::{
    FEATURED_VARIANTS, FeaturedImage, GalleryItem, ImageManifest, ImageService, ImageUpload,
    ImageVariant, TimestampNamer, UlidNamer, UploadNamer, VariantSpec,
};
pub use link::{
    CreateLinkInput, LinkListQuery, LinkResponse, LinkService, UpdateLinkInput,
};
pub use store::{LocalMediaStore, MediaStore, MemoryStore, SharedMediaStore};

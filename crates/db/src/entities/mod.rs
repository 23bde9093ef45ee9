//! Database entities.

pub mod article;
pub mod article_category;
pub mod blog_category;
pub mod blog_post;
pub mod blog_post_tag;
pub mod blog_tag;
pub mod link;
pub mod link_category;
pub mod user;

pub use article::Entity as Article;
pub use article_category::Entity as ArticleCategory;
pub use blog_category::Entity as BlogCategory;
pub use blog_post::Entity as BlogPost;
pub use blog_post_tag::Entity as BlogPostTag;
pub use blog_tag::Entity as BlogTag;
pub use link::Entity as Link;
pub use link_category::Entity as LinkCategory;
pub use user::Entity as User;

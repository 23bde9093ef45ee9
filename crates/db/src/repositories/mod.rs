//! Database repositories.

mod article;
mod article_category;
mod blog_category;
mod blog_post;
mod blog_tag;
mod link;
mod link_category;
mod user;

pub use article::ArticleRepository;
pub use article_category::ArticleCategoryRepository;
pub use blog_category::BlogCategoryRepository;
pub use blog_post::BlogPostRepository;
pub use blog_tag::{BlogTagRepository, TagUsage};
pub use link::LinkRepository;
pub use link_category::LinkCategoryRepository;
pub use user::UserRepository;

/// One page of a paginated listing.
#[derive(Debug, Clone)]
pub struct Paged<T> {
    /// Records on this page.
    pub items: Vec<T>,
    /// Total number of matching records across all pages.
    pub total: u64,
    /// 1-based page number.
    pub page: u64,
    /// Page size the listing was built with.
    pub per_page: u64,
}

impl<T> Paged<T> {
    /// Total number of pages.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            0
        } else {
            self.total.div_ceil(self.per_page)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Paged;

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Paged {
            items: Vec::<()>::new(),
            total: 13,
            page: 1,
            per_page: 6,
        };
        assert_eq!(page.total_pages(), 3);
    }
}

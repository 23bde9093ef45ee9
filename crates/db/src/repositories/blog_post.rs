//! Blog post repository.

use std::sync::Arc;

use crate::entities::{BlogPost, blog_post, blog_post_tag, blog_tag};
use crate::repositories::Paged;
use arbor_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};

/// Blog post repository for database operations.
#[derive(Clone)]
pub struct BlogPostRepository {
    db: Arc<DatabaseConnection>,
}

impl BlogPostRepository {
    /// Create a new blog post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<blog_post::Model>> {
        BlogPost::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<blog_post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Blog post: {id}")))
    }

    /// Find a post by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<blog_post::Model>> {
        BlogPost::find()
            .filter(blog_post::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List published posts, newest first.
    pub async fn find_published(
        &self,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<blog_post::Model>> {
        let query = BlogPost::find()
            .filter(blog_post::Column::Published.eq(true))
            .order_by_desc(blog_post::Column::Date);
        self.page(query, page, per_page).await
    }

    /// Search published posts by title or body substring.
    pub async fn search(
        &self,
        term: &str,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<blog_post::Model>> {
        let query = BlogPost::find()
            .filter(blog_post::Column::Published.eq(true))
            .filter(
                Condition::any()
                    .add(blog_post::Column::Title.contains(term))
                    .add(blog_post::Column::Body.contains(term)),
            )
            .order_by_desc(blog_post::Column::Date);
        self.page(query, page, per_page).await
    }

    /// List published posts in a category, newest first.
    pub async fn find_by_category(
        &self,
        category_id: &str,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<blog_post::Model>> {
        let query = BlogPost::find()
            .filter(blog_post::Column::Published.eq(true))
            .filter(blog_post::Column::CategoryId.eq(category_id))
            .order_by_desc(blog_post::Column::Date);
        self.page(query, page, per_page).await
    }

    /// List published posts carrying a tag, matched by tag name via the
    /// join table.
    pub async fn find_by_tag(
        &self,
        tag_name: &str,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<blog_post::Model>> {
        let query = BlogPost::find()
            .join(JoinType::InnerJoin, blog_post::Relation::PostTags.def())
            .join(JoinType::InnerJoin, blog_post_tag::Relation::Tag.def())
            .filter(blog_post::Column::Published.eq(true))
            .filter(blog_tag::Column::Name.eq(tag_name))
            .order_by_desc(blog_post::Column::Date);
        self.page(query, page, per_page).await
    }

    /// List unpublished posts (admin view).
    pub async fn find_unpublished(&self) -> AppResult<Vec<blog_post::Model>> {
        BlogPost::find()
            .filter(blog_post::Column::Published.eq(false))
            .order_by_desc(blog_post::Column::Date)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the most recent posts, for "recent posts" sidebars.
    pub async fn find_recent(&self, limit: u64) -> AppResult<Vec<blog_post::Model>> {
        BlogPost::find()
            .filter(blog_post::Column::Published.eq(true))
            .order_by_desc(blog_post::Column::Date)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: blog_post::ActiveModel) -> AppResult<blog_post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: blog_post::ActiveModel) -> AppResult<blog_post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post. Join rows cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        BlogPost::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn page(
        &self,
        query: sea_orm::Select<BlogPost>,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<blog_post::Model>> {
        let paginator = query.paginate(self.db.as_ref(), per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let items = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(Paged {
            items,
            total,
            page,
            per_page,
        })
    }
}

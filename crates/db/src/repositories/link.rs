//! Curated link repository.

use std::sync::Arc;

use crate::entities::{Link, link, link_category};
use crate::repositories::Paged;
use arbor_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};

/// Curated link repository for database operations.
#[derive(Clone)]
pub struct LinkRepository {
    db: Arc<DatabaseConnection>,
}

impl LinkRepository {
    /// Create a new link repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a link by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<link::Model>> {
        Link::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a link by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<link::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Link: {id}")))
    }

    /// Find a link by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<link::Model>> {
        Link::find()
            .filter(link::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List published links, newest first.
    pub async fn find_published(&self, page: u64, per_page: u64) -> AppResult<Paged<link::Model>> {
        let query = Link::find()
            .filter(link::Column::Published.eq(true))
            .order_by_desc(link::Column::CreatedAt);
        self.page(query, page, per_page).await
    }

    /// List published links in the named category, newest first.
    pub async fn find_by_category_name(
        &self,
        category_name: &str,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<link::Model>> {
        let query = Link::find()
            .join(JoinType::InnerJoin, link::Relation::Category.def())
            .filter(link_category::Column::Name.eq(category_name))
            .filter(link::Column::Published.eq(true))
            .order_by_desc(link::Column::CreatedAt);
        self.page(query, page, per_page).await
    }

    /// List unpublished links (admin view).
    pub async fn find_unpublished(&self) -> AppResult<Vec<link::Model>> {
        Link::find()
            .filter(link::Column::Published.eq(false))
            .order_by_desc(link::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new link.
    pub async fn create(&self, model: link::ActiveModel) -> AppResult<link::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a link.
    pub async fn update(&self, model: link::ActiveModel) -> AppResult<link::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a link.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Link::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn page(
        &self,
        query: sea_orm::Select<Link>,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<link::Model>> {
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

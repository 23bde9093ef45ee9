//! Blog category repository.

use std::sync::Arc;

use crate::entities::{BlogCategory, blog_category};
use arbor_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Blog category repository for database operations.
#[derive(Clone)]
pub struct BlogCategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl BlogCategoryRepository {
    /// Create a new blog category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List all categories.
    pub async fn all(&self) -> AppResult<Vec<blog_category::Model>> {
        BlogCategory::find()
            .order_by_asc(blog_category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<blog_category::Model>> {
        BlogCategory::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a category by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<blog_category::Model>> {
        BlogCategory::find()
            .filter(blog_category::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new category.
    pub async fn create(&self, model: blog_category::ActiveModel) -> AppResult<blog_category::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

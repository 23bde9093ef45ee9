//! Link category repository.

use std::sync::Arc;

use crate::entities::{LinkCategory, link_category};
use arbor_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Link category repository for database operations.
#[derive(Clone)]
pub struct LinkCategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl LinkCategoryRepository {
    /// Create a new link category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List all categories.
    pub async fn all(&self) -> AppResult<Vec<link_category::Model>> {
        LinkCategory::find()
            .order_by_asc(link_category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<link_category::Model>> {
        LinkCategory::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a category by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<link_category::Model>> {
        LinkCategory::find()
            .filter(link_category::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new category.
    pub async fn create(
        &self,
        model: link_category::ActiveModel,
    ) -> AppResult<link_category::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

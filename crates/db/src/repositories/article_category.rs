//! Article category repository.

use std::sync::Arc;

use crate::entities::{ArticleCategory, article_category};
use arbor_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Article category repository for database operations.
#[derive(Clone)]
pub struct ArticleCategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl ArticleCategoryRepository {
    /// Create a new article category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List all categories.
    pub async fn all(&self) -> AppResult<Vec<article_category::Model>> {
        ArticleCategory::find()
            .order_by_asc(article_category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<article_category::Model>> {
        ArticleCategory::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a category by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<article_category::Model>> {
        ArticleCategory::find()
            .filter(article_category::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new category.
    pub async fn create(
        &self,
        model: article_category::ActiveModel,
    ) -> AppResult<article_category::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

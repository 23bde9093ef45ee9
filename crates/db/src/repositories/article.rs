//! Article repository.

use std::sync::Arc;

use crate::entities::{Article, article};
use arbor_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Article repository for database operations.
#[derive(Clone)]
pub struct ArticleRepository {
    db: Arc<DatabaseConnection>,
}

impl ArticleRepository {
    /// Create a new article repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an article by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<article::Model>> {
        Article::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an article by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<article::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Article: {id}")))
    }

    /// Find an article by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<article::Model>> {
        Article::find()
            .filter(article::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List every article in display order (admin view).
    pub async fn all(&self) -> AppResult<Vec<article::Model>> {
        Article::find()
            .order_by_asc(article::Column::DisplayOrder)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List published articles in display order.
    pub async fn find_published(&self) -> AppResult<Vec<article::Model>> {
        Article::find()
            .filter(article::Column::Published.eq(true))
            .order_by_asc(article::Column::DisplayOrder)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new article.
    pub async fn create(&self, model: article::ActiveModel) -> AppResult<article::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an article.
    pub async fn update(&self, model: article::ActiveModel) -> AppResult<article::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an article.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Article::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

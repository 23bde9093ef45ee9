//! Blog tag repository.

use std::sync::Arc;

use crate::entities::{BlogPostTag, BlogTag, blog_post_tag, blog_tag};
use arbor_common::{AppError, AppResult, IdGenerator};
use sea_orm::sea_query::Alias;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

/// Tag usage count for the popular-tags sidebar.
#[derive(Debug, Clone, FromQueryResult, serde::Serialize)]
pub struct TagUsage {
    /// Tag ID.
    pub tag_id: String,
    /// Tag name.
    pub name: String,
    /// Number of posts carrying the tag.
    pub total: i64,
}

/// Blog tag repository for database operations.
#[derive(Clone)]
pub struct BlogTagRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
}

impl BlogTagRepository {
    /// Create a new blog tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Find a tag by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<blog_tag::Model>> {
        BlogTag::find()
            .filter(blog_tag::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a tag by name, creating it if absent.
    pub async fn find_or_create(&self, name: &str) -> AppResult<blog_tag::Model> {
        if let Some(tag) = self.find_by_name(name).await? {
            return Ok(tag);
        }

        let model = blog_tag::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
        };
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replace a post's tag set with the given tag IDs.
    pub async fn set_post_tags(&self, post_id: &str, tag_ids: &[String]) -> AppResult<()> {
        BlogPostTag::delete_many()
            .filter(blog_post_tag::Column::PostId.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if tag_ids.is_empty() {
            return Ok(());
        }

        let rows = tag_ids.iter().map(|tag_id| blog_post_tag::ActiveModel {
            post_id: Set(post_id.to_string()),
            tag_id: Set(tag_id.clone()),
        });
        BlogPostTag::insert_many(rows)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List the tags attached to a post.
    pub async fn find_for_post(&self, post_id: &str) -> AppResult<Vec<blog_tag::Model>> {
        BlogTag::find()
            .join(JoinType::InnerJoin, blog_tag::Relation::PostTags.def())
            .filter(blog_post_tag::Column::PostId.eq(post_id))
            .order_by_asc(blog_tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most-used tags, descending by usage count.
    pub async fn find_popular(&self, limit: u64) -> AppResult<Vec<TagUsage>> {
        BlogPostTag::find()
            .select_only()
            .column(blog_post_tag::Column::TagId)
            .column(blog_tag::Column::Name)
            .column_as(blog_post_tag::Column::TagId.count(), "total")
            .join(JoinType::LeftJoin, blog_post_tag::Relation::Tag.def())
            .group_by(blog_post_tag::Column::TagId)
            .group_by(blog_tag::Column::Name)
            .order_by_desc(sea_orm::sea_query::Expr::col(Alias::new("total")))
            .limit(limit)
            .into_model::<TagUsage>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

//! Blog post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog_post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author user ID
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Category ID
    #[sea_orm(nullable, indexed)]
    pub category_id: Option<String>,

    /// Post title
    pub title: String,

    /// URL slug derived from the title
    #[sea_orm(indexed)]
    pub slug: String,

    /// Short summary shown in listings
    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,

    /// Post body (rich text)
    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// Publication date shown to readers
    pub date: Date,

    /// Base name of the featured image, when one was uploaded.
    /// Variant files share this name with a `small_`/`medium_`/`large_`
    /// prefix.
    #[sea_orm(nullable)]
    pub original_image: Option<String>,

    /// Variant manifest for the featured image (prefix, box, quality per
    /// rendition). Null on rows written before manifests existed; those
    /// fall back to prefix reconstruction.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub image_manifest: Option<Json>,

    /// Gallery/editor image paths (JSON array, append-only across edits)
    #[sea_orm(column_type = "JsonBinary")]
    pub images: Json,

    /// Whether the post is publicly visible
    #[sea_orm(default_value = false)]
    pub published: bool,

    /// Whether the post is pinned as featured
    #[sea_orm(default_value = false)]
    pub featured: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::blog_category::Entity",
        from = "Column::CategoryId",
        to = "super::blog_category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,

    #[sea_orm(has_many = "super::blog_post_tag::Entity")]
    PostTags,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::blog_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::blog_tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::blog_post_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::blog_post_tag::Relation::Post.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Article entity (static ordered pages).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "article")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author user ID
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Category ID
    #[sea_orm(nullable, indexed)]
    pub category_id: Option<String>,

    /// Article title
    pub title: String,

    /// URL slug derived from the title
    #[sea_orm(indexed)]
    pub slug: String,

    /// Short summary
    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,

    /// Article body (rich text)
    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// Publication date shown to readers
    pub date: Date,

    /// Manual ordering within the article section
    #[sea_orm(default_value = 0)]
    pub display_order: i32,

    /// Base name of the featured image, when one was uploaded
    #[sea_orm(nullable)]
    pub original_image: Option<String>,

    /// Variant manifest for the featured image (null on legacy rows)
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub image_manifest: Option<Json>,

    /// Gallery/editor image paths (JSON array, append-only across edits)
    #[sea_orm(column_type = "JsonBinary")]
    pub images: Json,

    /// Whether the article is publicly visible
    #[sea_orm(default_value = false)]
    pub published: bool,

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
        belongs_to = "super::article_category::Entity",
        from = "Column::CategoryId",
        to = "super::article_category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::article_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Curated link entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "link")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Category ID
    #[sea_orm(nullable, indexed)]
    pub category_id: Option<String>,

    /// Link title
    pub title: String,

    /// URL slug derived from the title
    #[sea_orm(indexed)]
    pub slug: String,

    /// Target URL
    pub url: String,

    /// Description shown in the directory
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Base name of the 200x200 thumbnail (`link_` prefixed), when one
    /// was uploaded. Link thumbnails have no size variants.
    #[sea_orm(nullable)]
    pub image: Option<String>,

    /// Whether the link is publicly visible
    #[sea_orm(default_value = false)]
    pub published: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::link_category::Entity",
        from = "Column::CategoryId",
        to = "super::link_category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::link_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

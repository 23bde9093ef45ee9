//! Blog tag entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog_tag")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Tag name (unique, case-preserving)
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::blog_post_tag::Entity")]
    PostTags,
}

impl Related<super::blog_post::Entity> for Entity {
    fn to() -> RelationDef {
        super::blog_post_tag::Relation::Post.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::blog_post_tag::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

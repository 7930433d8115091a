//! News item on the portal front page.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "news_posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub author_id: Uuid,
    pub category_id: Uuid,
    /// Pinned posts lead every listing
    pub is_pinned: bool,
    /// Posts dated in the future stay out of listings until then
    pub published_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::news_category::Entity",
        from = "Column::CategoryId",
        to = "super::news_category::Column::Id"
    )]
    NewsCategory,
    #[sea_orm(has_many = "super::news_comment::Entity")]
    NewsComment,
}

impl Related<super::news_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NewsCategory.def()
    }
}

impl Related<super::news_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NewsComment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

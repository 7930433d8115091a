use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote_selections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub vote_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub option_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vote::Entity",
        from = "Column::VoteId",
        to = "super::vote::Column::Id"
    )]
    Vote,
    #[sea_orm(
        belongs_to = "super::vote_option::Entity",
        from = "Column::OptionId",
        to = "super::vote_option::Column::Id"
    )]
    VoteOption,
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vote.def()
    }
}

impl Related<super::vote_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoteOption.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

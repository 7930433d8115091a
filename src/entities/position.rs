use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "positions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::employment_history::Entity")]
    EmploymentHistory,
}

impl Related<super::employment_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmploymentHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Union member record.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::EmployeeStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub department_id: Uuid,
    /// Personnel number, unique across the registry
    #[sea_orm(unique)]
    pub employee_number: String,
    pub full_name: String,
    pub short_name: String,
    pub date_of_birth: Date,
    /// Union membership card number, unique across the registry
    #[sea_orm(unique)]
    pub union_ticket_number: String,
    pub union_join_date: Date,
    pub status: EmployeeStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id"
    )]
    Department,
    #[sea_orm(has_many = "super::employment_history::Entity")]
    EmploymentHistory,
    #[sea_orm(has_many = "super::child::Entity")]
    Child,
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::employment_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmploymentHistory.def()
    }
}

impl Related<super::child::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Child.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

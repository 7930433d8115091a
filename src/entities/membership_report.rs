//! Membership coverage of an organization over a period.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "membership_reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub organization_id: Uuid,
    pub period_start: Date,
    pub period_end: Date,
    /// Members on the roll at period end
    pub total_members: i32,
    pub new_members: i32,
    pub left_members: i32,
    /// Members as a share of the workforce at period end
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub membership_rate: Decimal,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub generated_by: Uuid,
    pub generated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Ledger entry for fund income and expenses.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::RecordType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub record_type: RecordType,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub related_request_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::support_request::Entity",
        from = "Column::RelatedRequestId",
        to = "super::support_request::Column::Id"
    )]
    SupportRequest,
}

impl Related<super::support_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupportRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Request for a payout from the mutual aid fund.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::{SupportReason, SupportStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "support_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Member the payout is for
    pub employee_id: Uuid,
    /// User who filed the request
    pub requestor_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount: Decimal,
    pub reason: SupportReason,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: SupportStatus,
    /// Opaque reference to the uploaded supporting documents
    pub supporting_document: Option<String>,
    /// User who approved or rejected the request
    pub approver_id: Option<Uuid>,
    /// Set only once the request is approved
    pub approved_at: Option<DateTimeWithTimeZone>,
    /// Opaque reference to the payment order
    pub payment_document: Option<String>,
    /// Set only once the request is paid
    pub paid_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
    #[sea_orm(has_many = "super::financial_record::Entity")]
    FinancialRecord,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::financial_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

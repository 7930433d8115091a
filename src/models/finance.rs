use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::enums::{SupportReason, SupportStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportRequestCreate {
    pub employee_id: Uuid,
    pub requestor_id: Uuid,
    pub amount: Decimal,
    pub reason: SupportReason,
    pub description: String,
    pub supporting_document: Option<String>,
}

/// Body for approve and reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub approver_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub payment_document: Option<String>,
    pub recorded_by: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportRequestFilter {
    pub status: Option<SupportStatus>,
    pub employee_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeCreateRequest {
    pub employee_id: Uuid,
    pub amount: Decimal,
    pub percentage_rate: Decimal,
    pub period: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePaymentRequest {
    pub paid_by: Uuid,
}

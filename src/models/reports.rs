use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::enums::{EmployeeStatus, SupportStatus, VotingStatus};
use crate::entities::movement_report;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub membership: MembershipStats,
    pub finance: FinanceStats,
    pub voting: VotingStats,
    pub generated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipStats {
    pub total_members: u64,
    pub by_status: Vec<StatusCount<EmployeeStatus>>,
    pub by_department: Vec<DepartmentHeadcount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentHeadcount {
    pub department_id: Uuid,
    pub members: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount<S> {
    pub status: S,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceStats {
    pub requests_by_status: Vec<StatusCount<SupportStatus>>,
    pub total_support_paid: Decimal,
    pub unpaid_fees: u64,
    pub unpaid_fees_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingStats {
    pub by_status: Vec<StatusCount<VotingStatus>>,
    /// Mean participation percentage over closed quorum votings
    pub average_quorum_percentage: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialReportRequest {
    pub title: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub generated_by: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipReportRequest {
    pub title: String,
    pub organization_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub generated_by: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementReportRequest {
    pub title: String,
    pub department_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub generated_by: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementReportView {
    #[serde(flatten)]
    pub report: movement_report::Model,
    pub arrived: Vec<Uuid>,
    pub left: Vec<Uuid>,
}

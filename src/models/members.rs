use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::enums::{DisabilityStatus, EmployeeStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationCreateRequest {
    pub name: String,
    pub short_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentCreateRequest {
    pub organization_id: Uuid,
    pub name: String,
    pub short_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionCreateRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeCreateRequest {
    pub department_id: Uuid,
    pub employee_number: String,
    pub full_name: String,
    pub short_name: String,
    pub date_of_birth: NaiveDate,
    pub union_ticket_number: String,
    pub union_join_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeStatusUpdateRequest {
    pub status: EmployeeStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFilter {
    pub department_id: Option<Uuid>,
    pub status: Option<EmployeeStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentRecordRequest {
    pub position_id: Uuid,
    pub appointment_date: NaiveDate,
    pub rate: Decimal,
    #[serde(default)]
    pub is_main_position: bool,
    pub employment_start_date: NaiveDate,
    pub employment_end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPositionView {
    pub employee_id: Uuid,
    pub position_id: Uuid,
    pub position_name: String,
    pub appointment_date: NaiveDate,
    pub rate: Decimal,
    pub is_main_position: bool,
}

/// Body for adding a child or replacing a child's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRequest {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub disability_status: DisabilityStatus,
}

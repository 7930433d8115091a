use chrono::Utc;
use sea_orm::prelude::*;
use sea_orm::{ActiveValue::Set, Condition, QueryOrder, QuerySelect};
use tracing::info;
use uuid::Uuid;

use crate::entities::enums::EmployeeStatus;
use crate::entities::{child, department, employee, employment_history, organization, position};
use crate::error::{WorkflowError, is_unique_violation};
use crate::models::members::{
    ChildRequest, CurrentPositionView, DepartmentCreateRequest, EmployeeCreateRequest,
    EmployeeFilter, EmploymentRecordRequest, OrganizationCreateRequest, PositionCreateRequest,
};
use crate::validation::{self, MAX_NAME_LEN, MAX_NUMBER_LEN, MAX_SHORT_NAME_LEN, MAX_TEXT_LEN};

use super::{Page, count_to_u64, now};

pub async fn create_organization(
    db: &DatabaseConnection,
    request: OrganizationCreateRequest,
) -> Result<organization::Model, WorkflowError> {
    let organization = organization::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(validation::required_text(&request.name, "name", MAX_NAME_LEN)?),
        short_name: Set(validation::required_text(
            &request.short_name,
            "short_name",
            MAX_SHORT_NAME_LEN,
        )?),
        description: Set(validation::optional_text(
            request.description.as_deref(),
            "description",
            MAX_TEXT_LEN,
        )?),
        created_at: Set(now()),
    }
    .insert(db)
    .await?;
    info!(organization_id = %organization.id, "Organization created");
    Ok(organization)
}

pub async fn list_organizations(
    db: &DatabaseConnection,
) -> Result<Vec<organization::Model>, WorkflowError> {
    Ok(organization::Entity::find()
        .order_by_asc(organization::Column::Name)
        .all(db)
        .await?)
}

pub async fn get_organization(
    db: &impl ConnectionTrait,
    id: Uuid,
) -> Result<organization::Model, WorkflowError> {
    organization::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found("organization", id))
}

pub async fn create_department(
    db: &DatabaseConnection,
    request: DepartmentCreateRequest,
) -> Result<department::Model, WorkflowError> {
    let name = validation::required_text(&request.name, "name", MAX_NAME_LEN)?;
    let short_name =
        validation::required_text(&request.short_name, "short_name", MAX_SHORT_NAME_LEN)?;
    let description =
        validation::optional_text(request.description.as_deref(), "description", MAX_TEXT_LEN)?;
    get_organization(db, request.organization_id).await?;

    let department = department::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(request.organization_id),
        name: Set(name),
        short_name: Set(short_name),
        description: Set(description),
        created_at: Set(now()),
    }
    .insert(db)
    .await?;
    info!(
        department_id = %department.id,
        organization_id = %department.organization_id,
        "Department created"
    );
    Ok(department)
}

pub async fn list_departments(
    db: &DatabaseConnection,
    organization_id: Option<Uuid>,
) -> Result<Vec<department::Model>, WorkflowError> {
    let mut select = department::Entity::find();
    if let Some(organization_id) = organization_id {
        select = select.filter(department::Column::OrganizationId.eq(organization_id));
    }
    Ok(select.order_by_asc(department::Column::Name).all(db).await?)
}

pub async fn get_department(
    db: &impl ConnectionTrait,
    id: Uuid,
) -> Result<department::Model, WorkflowError> {
    department::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found("department", id))
}

/// Fails with a validation error naming the first id that does not resolve.
pub async fn ensure_departments_exist(
    db: &impl ConnectionTrait,
    ids: &[Uuid],
) -> Result<(), WorkflowError> {
    if ids.is_empty() {
        return Ok(());
    }
    let found: Vec<Uuid> = department::Entity::find()
        .select_only()
        .column(department::Column::Id)
        .filter(department::Column::Id.is_in(ids.iter().copied()))
        .into_tuple()
        .all(db)
        .await?;
    match ids.iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(WorkflowError::validation(format!(
            "department {missing} does not exist"
        ))),
        None => Ok(()),
    }
}

pub async fn create_position(
    db: &DatabaseConnection,
    request: PositionCreateRequest,
) -> Result<position::Model, WorkflowError> {
    let position = position::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(validation::required_text(&request.name, "name", MAX_NAME_LEN)?),
        description: Set(validation::optional_text(
            request.description.as_deref(),
            "description",
            MAX_TEXT_LEN,
        )?),
    }
    .insert(db)
    .await?;
    Ok(position)
}

pub async fn list_positions(db: &DatabaseConnection) -> Result<Vec<position::Model>, WorkflowError> {
    Ok(position::Entity::find()
        .order_by_asc(position::Column::Name)
        .all(db)
        .await?)
}

pub async fn create_employee(
    db: &DatabaseConnection,
    request: EmployeeCreateRequest,
) -> Result<employee::Model, WorkflowError> {
    let full_name = validation::required_text(&request.full_name, "full_name", MAX_NAME_LEN)?;
    let short_name =
        validation::required_text(&request.short_name, "short_name", MAX_SHORT_NAME_LEN)?;
    let employee_number =
        validation::required_text(&request.employee_number, "employee_number", MAX_NUMBER_LEN)?;
    let union_ticket_number = validation::required_text(
        &request.union_ticket_number,
        "union_ticket_number",
        MAX_NUMBER_LEN,
    )?;
    if request.date_of_birth > Utc::now().date_naive() {
        return Err(WorkflowError::validation("date_of_birth lies in the future"));
    }
    if request.union_join_date < request.date_of_birth {
        return Err(WorkflowError::validation(
            "union_join_date must not precede date_of_birth",
        ));
    }
    get_department(db, request.department_id).await?;

    let clash = employee::Entity::find()
        .filter(
            Condition::any()
                .add(employee::Column::EmployeeNumber.eq(employee_number.as_str()))
                .add(employee::Column::UnionTicketNumber.eq(union_ticket_number.as_str())),
        )
        .one(db)
        .await?;
    if let Some(existing) = clash {
        return Err(registry_conflict(&existing, &employee_number));
    }

    let created_at = now();
    let employee = employee::ActiveModel {
        id: Set(Uuid::new_v4()),
        department_id: Set(request.department_id),
        employee_number: Set(employee_number),
        full_name: Set(full_name),
        short_name: Set(short_name),
        date_of_birth: Set(request.date_of_birth),
        union_ticket_number: Set(union_ticket_number),
        union_join_date: Set(request.union_join_date),
        status: Set(EmployeeStatus::Active),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
    .insert(db)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            WorkflowError::validation("employee number or union ticket number is already registered")
        } else {
            WorkflowError::from(err)
        }
    })?;

    info!(
        employee_id = %employee.id,
        department_id = %employee.department_id,
        "Employee registered"
    );
    Ok(employee)
}

fn registry_conflict(existing: &employee::Model, employee_number: &str) -> WorkflowError {
    if existing.employee_number == employee_number {
        WorkflowError::validation(format!(
            "employee number {employee_number} is already registered"
        ))
    } else {
        WorkflowError::validation(format!(
            "union ticket number {} is already registered",
            existing.union_ticket_number
        ))
    }
}

pub async fn get_employee(
    db: &impl ConnectionTrait,
    id: Uuid,
) -> Result<employee::Model, WorkflowError> {
    employee::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found("employee", id))
}

pub async fn list_employees(
    db: &DatabaseConnection,
    filter: &EmployeeFilter,
    page: Page,
) -> Result<Vec<employee::Model>, WorkflowError> {
    let mut select = employee::Entity::find();
    if let Some(department_id) = filter.department_id {
        select = select.filter(employee::Column::DepartmentId.eq(department_id));
    }
    if let Some(status) = filter.status {
        select = select.filter(employee::Column::Status.eq(status));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(employee::Column::FullName.contains(search))
                .add(employee::Column::EmployeeNumber.contains(search))
                .add(employee::Column::UnionTicketNumber.contains(search)),
        );
    }
    let employees = select
        .order_by_asc(employee::Column::FullName)
        .limit(page.limit)
        .offset(page.offset)
        .all(db)
        .await?;
    assert!(employees.len() as u64 <= page.limit, "Listing exceeded page limit");
    Ok(employees)
}

/// Members leave the registry by status change; records are never deleted.
pub async fn update_employee_status(
    db: &DatabaseConnection,
    id: Uuid,
    status: EmployeeStatus,
) -> Result<employee::Model, WorkflowError> {
    let current = get_employee(db, id).await?;
    if current.status == status {
        return Ok(current);
    }
    let mut active: employee::ActiveModel = current.into();
    active.status = Set(status);
    active.updated_at = Set(now());
    let updated = active.update(db).await?;
    info!(employee_id = %id, status = %status, "Employee status updated");
    Ok(updated)
}

pub async fn add_employment_record(
    db: &DatabaseConnection,
    employee_id: Uuid,
    request: EmploymentRecordRequest,
) -> Result<employment_history::Model, WorkflowError> {
    let rate = validation::percentage(request.rate, "rate")?;
    if rate == Decimal::ZERO {
        return Err(WorkflowError::validation("rate must be greater than zero"));
    }
    if let Some(end) = request.employment_end_date {
        if end < request.employment_start_date {
            return Err(WorkflowError::validation(
                "employment_end_date must not precede employment_start_date",
            ));
        }
    }
    get_employee(db, employee_id).await?;
    position::Entity::find_by_id(request.position_id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found("position", request.position_id))?;

    let record = employment_history::ActiveModel {
        id: Set(Uuid::new_v4()),
        employee_id: Set(employee_id),
        position_id: Set(request.position_id),
        appointment_date: Set(request.appointment_date),
        rate: Set(rate),
        is_main_position: Set(request.is_main_position),
        employment_start_date: Set(request.employment_start_date),
        employment_end_date: Set(request.employment_end_date),
    }
    .insert(db)
    .await?;
    Ok(record)
}

pub async fn employment_history(
    db: &DatabaseConnection,
    employee_id: Uuid,
) -> Result<Vec<employment_history::Model>, WorkflowError> {
    get_employee(db, employee_id).await?;
    Ok(employment_history::Entity::find()
        .filter(employment_history::Column::EmployeeId.eq(employee_id))
        .order_by_desc(employment_history::Column::AppointmentDate)
        .all(db)
        .await?)
}

/// Most recent open appointment of the employee, by appointment date.
pub async fn current_position(
    db: &DatabaseConnection,
    employee_id: Uuid,
) -> Result<Option<CurrentPositionView>, WorkflowError> {
    let row = employment_history::Entity::find()
        .filter(employment_history::Column::EmployeeId.eq(employee_id))
        .filter(employment_history::Column::EmploymentEndDate.is_null())
        .order_by_desc(employment_history::Column::AppointmentDate)
        .find_also_related(position::Entity)
        .one(db)
        .await?;

    Ok(row.and_then(|(record, position)| {
        position.map(|position| CurrentPositionView {
            employee_id: record.employee_id,
            position_id: position.id,
            position_name: position.name,
            appointment_date: record.appointment_date,
            rate: record.rate,
            is_main_position: record.is_main_position,
        })
    }))
}

fn check_child(parent: &employee::Model, request: &ChildRequest) -> Result<String, WorkflowError> {
    let full_name = validation::required_text(&request.full_name, "full_name", MAX_NAME_LEN)?;
    if request.date_of_birth > Utc::now().date_naive() {
        return Err(WorkflowError::validation("date_of_birth lies in the future"));
    }
    if request.date_of_birth <= parent.date_of_birth {
        return Err(WorkflowError::validation(
            "child date_of_birth must follow the parent's date_of_birth",
        ));
    }
    Ok(full_name)
}

pub async fn add_child(
    db: &DatabaseConnection,
    employee_id: Uuid,
    request: ChildRequest,
) -> Result<child::Model, WorkflowError> {
    let parent = get_employee(db, employee_id).await?;
    let full_name = check_child(&parent, &request)?;

    let child = child::ActiveModel {
        id: Set(Uuid::new_v4()),
        employee_id: Set(employee_id),
        full_name: Set(full_name),
        date_of_birth: Set(request.date_of_birth),
        disability_status: Set(request.disability_status),
    }
    .insert(db)
    .await?;
    info!(
        child_id = %child.id,
        employee_id = %employee_id,
        disability_status = %child.disability_status,
        "Child registered"
    );
    Ok(child)
}

/// Children of the employee, eldest first.
pub async fn list_children(
    db: &DatabaseConnection,
    employee_id: Uuid,
) -> Result<Vec<child::Model>, WorkflowError> {
    get_employee(db, employee_id).await?;
    Ok(child::Entity::find()
        .filter(child::Column::EmployeeId.eq(employee_id))
        .order_by_asc(child::Column::DateOfBirth)
        .all(db)
        .await?)
}

pub async fn update_child(
    db: &DatabaseConnection,
    id: Uuid,
    request: ChildRequest,
) -> Result<child::Model, WorkflowError> {
    let current = child::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found("child", id))?;
    let parent = get_employee(db, current.employee_id).await?;
    let full_name = check_child(&parent, &request)?;

    let mut child: child::ActiveModel = current.into();
    child.full_name = Set(full_name);
    child.date_of_birth = Set(request.date_of_birth);
    child.disability_status = Set(request.disability_status);
    let updated = child.update(db).await?;
    info!(child_id = %id, disability_status = %updated.disability_status, "Child updated");
    Ok(updated)
}

pub async fn delete_child(db: &DatabaseConnection, id: Uuid) -> Result<(), WorkflowError> {
    let removed = child::Entity::delete_by_id(id).exec(db).await?;
    if removed.rows_affected == 0 {
        return Err(WorkflowError::not_found("child", id));
    }
    info!(child_id = %id, "Child removed");
    Ok(())
}

/// Headcount of the given departments, or of the whole registry when none are named.
pub async fn count_employees(
    db: &impl ConnectionTrait,
    departments: &[Uuid],
) -> Result<u64, WorkflowError> {
    let mut select = employee::Entity::find();
    if !departments.is_empty() {
        select = select.filter(employee::Column::DepartmentId.is_in(departments.iter().copied()));
    }
    Ok(select.count(db).await?)
}

pub(crate) async fn headcount_by_department(
    db: &DatabaseConnection,
) -> Result<Vec<(Uuid, u64)>, WorkflowError> {
    let rows: Vec<(Uuid, i64)> = employee::Entity::find()
        .select_only()
        .column(employee::Column::DepartmentId)
        .column_as(employee::Column::Id.count(), "members")
        .group_by(employee::Column::DepartmentId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(department_id, members)| (department_id, count_to_u64(members)))
        .collect())
}

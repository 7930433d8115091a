use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::enums::EmployeeStatus;
use crate::entities::{child, department, employee, employment_history, organization, position};
use crate::models::members::{
    ChildRequest, CurrentPositionView, DepartmentCreateRequest, EmployeeCreateRequest, EmployeeFilter,
    EmployeeStatusUpdateRequest, EmploymentRecordRequest, OrganizationCreateRequest,
    PositionCreateRequest,
};
use crate::state::AppState;
use crate::store::members as store;

use super::HttpError;

const MAX_SEARCH_LEN: usize = 100;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations",
            get(list_organizations).post(create_organization),
        )
        .route("/organizations/{id}", get(get_organization))
        .route("/departments", get(list_departments).post(create_department))
        .route("/departments/{id}", get(get_department))
        .route("/positions", get(list_positions).post(create_position))
        .route("/employees", get(list_employees).post(create_employee))
        .route("/employees/{id}", get(get_employee))
        .route("/employees/{id}/status", put(update_employee_status))
        .route(
            "/employees/{id}/employment",
            get(employment_history).post(add_employment_record),
        )
        .route("/employees/{id}/current-position", get(current_position))
        .route(
            "/employees/{id}/children",
            get(list_children).post(add_child),
        )
        .route("/children/{id}", put(update_child).delete(delete_child))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DepartmentQuery {
    organization_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct EmployeeQuery {
    department_id: Option<Uuid>,
    status: Option<EmployeeStatus>,
    search: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

async fn create_organization(
    State(state): State<AppState>,
    Json(request): Json<OrganizationCreateRequest>,
) -> Result<(StatusCode, Json<organization::Model>), HttpError> {
    let organization = store::create_organization(state.db(), request).await?;
    Ok((StatusCode::CREATED, Json(organization)))
}

async fn list_organizations(
    State(state): State<AppState>,
) -> Result<Json<Vec<organization::Model>>, HttpError> {
    Ok(Json(store::list_organizations(state.db()).await?))
}

async fn get_organization(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<organization::Model>, HttpError> {
    Ok(Json(store::get_organization(state.db(), id).await?))
}

async fn create_department(
    State(state): State<AppState>,
    Json(request): Json<DepartmentCreateRequest>,
) -> Result<(StatusCode, Json<department::Model>), HttpError> {
    let department = store::create_department(state.db(), request).await?;
    state.cache.invalidate_dashboard().await;
    Ok((StatusCode::CREATED, Json(department)))
}

async fn list_departments(
    Query(query): Query<DepartmentQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<department::Model>>, HttpError> {
    Ok(Json(
        store::list_departments(state.db(), query.organization_id).await?,
    ))
}

async fn get_department(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<department::Model>, HttpError> {
    Ok(Json(store::get_department(state.db(), id).await?))
}

async fn create_position(
    State(state): State<AppState>,
    Json(request): Json<PositionCreateRequest>,
) -> Result<(StatusCode, Json<position::Model>), HttpError> {
    let position = store::create_position(state.db(), request).await?;
    Ok((StatusCode::CREATED, Json(position)))
}

async fn list_positions(
    State(state): State<AppState>,
) -> Result<Json<Vec<position::Model>>, HttpError> {
    Ok(Json(store::list_positions(state.db()).await?))
}

async fn create_employee(
    State(state): State<AppState>,
    Json(request): Json<EmployeeCreateRequest>,
) -> Result<(StatusCode, Json<employee::Model>), HttpError> {
    let employee = store::create_employee(state.db(), request).await?;
    state.cache.invalidate_dashboard().await;
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn list_employees(
    Query(query): Query<EmployeeQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<employee::Model>>, HttpError> {
    if let Some(search) = query.search.as_deref() {
        if search.chars().count() > MAX_SEARCH_LEN {
            return Err(HttpError::new(
                StatusCode::BAD_REQUEST,
                format!("search exceeds {MAX_SEARCH_LEN} character limit"),
            ));
        }
    }
    let page = state.page(query.limit, query.offset);
    let filter = EmployeeFilter {
        department_id: query.department_id,
        status: query.status,
        search: query.search,
    };
    Ok(Json(
        store::list_employees(state.db(), &filter, page).await?,
    ))
}

async fn get_employee(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<employee::Model>, HttpError> {
    Ok(Json(store::get_employee(state.db(), id).await?))
}

async fn update_employee_status(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<EmployeeStatusUpdateRequest>,
) -> Result<Json<employee::Model>, HttpError> {
    let employee = store::update_employee_status(state.db(), id, request.status).await?;
    state.cache.invalidate_dashboard().await;
    Ok(Json(employee))
}

async fn employment_history(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<employment_history::Model>>, HttpError> {
    Ok(Json(store::employment_history(state.db(), id).await?))
}

async fn add_employment_record(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<EmploymentRecordRequest>,
) -> Result<(StatusCode, Json<employment_history::Model>), HttpError> {
    let record = store::add_employment_record(state.db(), id, request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn current_position(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<CurrentPositionView>, HttpError> {
    store::get_employee(state.db(), id).await?;
    store::current_position(state.db(), id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            HttpError::new(
                StatusCode::NOT_FOUND,
                format!("employee {id} holds no open position"),
            )
        })
}

async fn add_child(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<ChildRequest>,
) -> Result<(StatusCode, Json<child::Model>), HttpError> {
    let child = store::add_child(state.db(), id, request).await?;
    Ok((StatusCode::CREATED, Json(child)))
}

async fn list_children(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<child::Model>>, HttpError> {
    Ok(Json(store::list_children(state.db(), id).await?))
}

async fn update_child(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<ChildRequest>,
) -> Result<Json<child::Model>, HttpError> {
    Ok(Json(store::update_child(state.db(), id, request).await?))
}

async fn delete_child(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, HttpError> {
    store::delete_child(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{financial_report, membership_report, movement_report};
use crate::models::reports::{
    DashboardSummary, FinancialReportRequest, MembershipReportRequest, MovementReportRequest,
    MovementReportView,
};
use crate::state::AppState;
use crate::store::reports as store;

use super::HttpError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route(
            "/financial",
            get(list_financial_reports).post(generate_financial_report),
        )
        .route("/financial/{id}", get(get_financial_report))
        .route(
            "/membership",
            get(list_membership_reports).post(generate_membership_report),
        )
        .route("/membership/{id}", get(get_membership_report))
        .route(
            "/movement",
            get(list_movement_reports).post(generate_movement_report),
        )
        .route("/movement/{id}", get(get_movement_report))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ReportQuery {
    limit: Option<u64>,
    offset: Option<u64>,
}

async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, HttpError> {
    let summary = state
        .cache
        .dashboard_or_compute(|| store::dashboard_summary(state.db()))
        .await?;
    Ok(Json(DashboardSummary::clone(&summary)))
}

async fn generate_financial_report(
    State(state): State<AppState>,
    Json(request): Json<FinancialReportRequest>,
) -> Result<(StatusCode, Json<financial_report::Model>), HttpError> {
    let report = store::generate_financial_report(state.db(), request).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

async fn list_financial_reports(
    Query(query): Query<ReportQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<financial_report::Model>>, HttpError> {
    let page = state.page(query.limit, query.offset);
    Ok(Json(
        store::list_financial_reports(state.db(), page).await?,
    ))
}

async fn get_financial_report(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<financial_report::Model>, HttpError> {
    Ok(Json(store::get_financial_report(state.db(), id).await?))
}

async fn generate_membership_report(
    State(state): State<AppState>,
    Json(request): Json<MembershipReportRequest>,
) -> Result<(StatusCode, Json<membership_report::Model>), HttpError> {
    let report = store::generate_membership_report(state.db(), request).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

async fn list_membership_reports(
    Query(query): Query<ReportQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<membership_report::Model>>, HttpError> {
    let page = state.page(query.limit, query.offset);
    Ok(Json(
        store::list_membership_reports(state.db(), page).await?,
    ))
}

async fn get_membership_report(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<membership_report::Model>, HttpError> {
    Ok(Json(store::get_membership_report(state.db(), id).await?))
}

async fn generate_movement_report(
    State(state): State<AppState>,
    Json(request): Json<MovementReportRequest>,
) -> Result<(StatusCode, Json<MovementReportView>), HttpError> {
    let view = store::generate_movement_report(state.db(), request).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_movement_reports(
    Query(query): Query<ReportQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<movement_report::Model>>, HttpError> {
    let page = state.page(query.limit, query.offset);
    Ok(Json(store::list_movement_reports(state.db(), page).await?))
}

async fn get_movement_report(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<MovementReportView>, HttpError> {
    Ok(Json(store::get_movement_report(state.db(), id).await?))
}

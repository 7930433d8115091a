use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::enums::{RecordType, SupportStatus};
use crate::entities::{financial_record, membership_fee, support_request};
use crate::models::finance::{
    DecisionRequest, FeeCreateRequest, FeePaymentRequest, PaymentRequest, SupportRequestCreate,
    SupportRequestFilter,
};
use crate::state::AppState;
use crate::store::finance as store;

use super::HttpError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/support-requests",
            get(list_requests).post(submit_request),
        )
        .route("/support-requests/{id}", get(get_request))
        .route("/support-requests/{id}/review", post(review_request))
        .route("/support-requests/{id}/approve", post(approve_request))
        .route("/support-requests/{id}/reject", post(reject_request))
        .route("/support-requests/{id}/pay", post(pay_request))
        .route("/support-requests/{id}/cancel", post(cancel_request))
        .route("/fees", get(list_fees).post(accrue_fee))
        .route("/fees/{id}/pay", post(pay_fee))
        .route("/records", get(list_records))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RequestQuery {
    status: Option<SupportStatus>,
    employee_id: Option<Uuid>,
    limit: Option<u64>,
    offset: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FeeQuery {
    employee_id: Option<Uuid>,
    unpaid_only: bool,
    limit: Option<u64>,
    offset: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RecordQuery {
    record_type: Option<RecordType>,
    limit: Option<u64>,
    offset: Option<u64>,
}

async fn submit_request(
    State(state): State<AppState>,
    Json(request): Json<SupportRequestCreate>,
) -> Result<(StatusCode, Json<support_request::Model>), HttpError> {
    let created = store::submit(state.db(), request).await?;
    state.cache.invalidate_dashboard().await;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_requests(
    Query(query): Query<RequestQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<support_request::Model>>, HttpError> {
    let page = state.page(query.limit, query.offset);
    let filter = SupportRequestFilter {
        status: query.status,
        employee_id: query.employee_id,
    };
    Ok(Json(store::list(state.db(), &filter, page).await?))
}

async fn get_request(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<support_request::Model>, HttpError> {
    Ok(Json(store::get(state.db(), id).await?))
}

async fn review_request(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<support_request::Model>, HttpError> {
    let updated = store::advance_to_review(state.db(), id).await?;
    state.cache.invalidate_dashboard().await;
    Ok(Json(updated))
}

async fn approve_request(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(decision): Json<DecisionRequest>,
) -> Result<Json<support_request::Model>, HttpError> {
    let updated = store::approve(state.db(), id, decision.approver_id).await?;
    state.cache.invalidate_dashboard().await;
    Ok(Json(updated))
}

async fn reject_request(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(decision): Json<DecisionRequest>,
) -> Result<Json<support_request::Model>, HttpError> {
    let updated = store::reject(state.db(), id, decision.approver_id).await?;
    state.cache.invalidate_dashboard().await;
    Ok(Json(updated))
}

async fn pay_request(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payment): Json<PaymentRequest>,
) -> Result<Json<support_request::Model>, HttpError> {
    let updated = store::mark_paid(state.db(), id, payment).await?;
    state.cache.invalidate_dashboard().await;
    Ok(Json(updated))
}

async fn cancel_request(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<support_request::Model>, HttpError> {
    let updated = store::cancel(state.db(), id).await?;
    state.cache.invalidate_dashboard().await;
    Ok(Json(updated))
}

async fn accrue_fee(
    State(state): State<AppState>,
    Json(request): Json<FeeCreateRequest>,
) -> Result<(StatusCode, Json<membership_fee::Model>), HttpError> {
    let fee = store::accrue_fee(state.db(), request).await?;
    state.cache.invalidate_dashboard().await;
    Ok((StatusCode::CREATED, Json(fee)))
}

async fn pay_fee(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payment): Json<FeePaymentRequest>,
) -> Result<Json<membership_fee::Model>, HttpError> {
    let fee = store::pay_fee(state.db(), id, payment.paid_by).await?;
    state.cache.invalidate_dashboard().await;
    Ok(Json(fee))
}

async fn list_fees(
    Query(query): Query<FeeQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<membership_fee::Model>>, HttpError> {
    let page = state.page(query.limit, query.offset);
    Ok(Json(
        store::list_fees(state.db(), query.employee_id, query.unpaid_only, page).await?,
    ))
}

async fn list_records(
    Query(query): Query<RecordQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<financial_record::Model>>, HttpError> {
    let page = state.page(query.limit, query.offset);
    Ok(Json(
        store::list_records(state.db(), query.record_type, page).await?,
    ))
}

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{document_signature, meeting, motivated_opinion};
use crate::models::protocols::{
    MeetingCreateRequest, MeetingView, OpinionCreateRequest, ProtocolPublishRequest,
    SignatureFilter, SignatureRequest,
};
use crate::state::AppState;
use crate::store::protocols as store;

use super::HttpError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meetings", get(list_meetings).post(create_meeting))
        .route("/meetings/{id}", get(get_meeting))
        .route("/meetings/{id}/protocol", post(publish_protocol))
        .route(
            "/meetings/{id}/opinions",
            get(list_opinions).post(draft_opinion),
        )
        .route("/opinions/{id}/submit", post(submit_opinion))
        .route("/opinions/{id}/review", post(review_opinion))
        .route("/opinions/{id}/approve", post(approve_opinion))
        .route("/opinions/{id}/reject", post(reject_opinion))
        .route("/signatures", get(list_signatures).post(sign_document))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct MeetingQuery {
    limit: Option<u64>,
    offset: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SignatureQuery {
    signer_id: Option<Uuid>,
    document_type: Option<String>,
    document_id: Option<Uuid>,
    limit: Option<u64>,
    offset: Option<u64>,
}

async fn create_meeting(
    State(state): State<AppState>,
    Json(request): Json<MeetingCreateRequest>,
) -> Result<(StatusCode, Json<MeetingView>), HttpError> {
    let view = store::create_meeting(state.db(), request).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_meetings(
    Query(query): Query<MeetingQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<meeting::Model>>, HttpError> {
    let page = state.page(query.limit, query.offset);
    Ok(Json(store::list_meetings(state.db(), page).await?))
}

async fn get_meeting(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<MeetingView>, HttpError> {
    Ok(Json(store::get_meeting(state.db(), id).await?))
}

async fn publish_protocol(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<ProtocolPublishRequest>,
) -> Result<Json<meeting::Model>, HttpError> {
    Ok(Json(
        store::publish_protocol(state.db(), id, &request.protocol).await?,
    ))
}

async fn draft_opinion(
    Path(meeting_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<OpinionCreateRequest>,
) -> Result<(StatusCode, Json<motivated_opinion::Model>), HttpError> {
    let opinion = store::draft_opinion(state.db(), meeting_id, request).await?;
    Ok((StatusCode::CREATED, Json(opinion)))
}

async fn list_opinions(
    Path(meeting_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<motivated_opinion::Model>>, HttpError> {
    Ok(Json(store::list_opinions(state.db(), meeting_id).await?))
}

async fn submit_opinion(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<motivated_opinion::Model>, HttpError> {
    Ok(Json(store::submit_opinion(state.db(), id).await?))
}

async fn review_opinion(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<motivated_opinion::Model>, HttpError> {
    Ok(Json(store::review_opinion(state.db(), id).await?))
}

async fn approve_opinion(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<motivated_opinion::Model>, HttpError> {
    Ok(Json(store::approve_opinion(state.db(), id).await?))
}

async fn reject_opinion(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<motivated_opinion::Model>, HttpError> {
    Ok(Json(store::reject_opinion(state.db(), id).await?))
}

async fn sign_document(
    State(state): State<AppState>,
    Json(request): Json<SignatureRequest>,
) -> Result<(StatusCode, Json<document_signature::Model>), HttpError> {
    let signature = store::sign_document(state.db(), request).await?;
    Ok((StatusCode::CREATED, Json(signature)))
}

async fn list_signatures(
    Query(query): Query<SignatureQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<document_signature::Model>>, HttpError> {
    let page = state.page(query.limit, query.offset);
    let filter = SignatureFilter {
        signer_id: query.signer_id,
        document_type: query.document_type,
        document_id: query.document_id,
    };
    Ok(Json(store::list_signatures(state.db(), &filter, page).await?))
}

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::entities::enums::VotingStatus;
use crate::entities::{quorum_voting_result, voting};
use crate::models::voting::{
    BallotReceipt, BallotRequest, ClosedVotingView, VotingCreateRequest, VotingResultsView,
    VotingView,
};
use crate::state::AppState;
use crate::store::voting as store;
use crate::workflow::voting::Tally;

use super::HttpError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/votings", get(list_votings).post(create_voting))
        .route("/votings/{id}", get(get_voting))
        .route("/votings/{id}/publish", post(publish_voting))
        .route("/votings/{id}/votes", post(cast_vote))
        .route("/votings/{id}/close", post(close_voting))
        .route("/votings/{id}/tally", get(get_tally))
        .route("/votings/{id}/results", get(get_results))
        .route("/votings/{id}/quorum", get(get_quorum_result))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct VotingQuery {
    status: Option<VotingStatus>,
    limit: Option<u64>,
    offset: Option<u64>,
}

async fn create_voting(
    State(state): State<AppState>,
    Json(request): Json<VotingCreateRequest>,
) -> Result<(StatusCode, Json<VotingView>), HttpError> {
    let view = store::create_voting(state.db(), request).await?;
    state.cache.invalidate_dashboard().await;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_votings(
    Query(query): Query<VotingQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<voting::Model>>, HttpError> {
    let page = state.page(query.limit, query.offset);
    Ok(Json(
        store::list_votings(state.db(), query.status, page).await?,
    ))
}

async fn get_voting(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<VotingView>, HttpError> {
    Ok(Json(store::get_voting(state.db(), id).await?))
}

async fn publish_voting(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<VotingView>, HttpError> {
    let view = store::publish(state.db(), id).await?;
    state.cache.invalidate_dashboard().await;
    Ok(Json(view))
}

async fn cast_vote(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(ballot): Json<BallotRequest>,
) -> Result<(StatusCode, Json<BallotReceipt>), HttpError> {
    let receipt = store::cast_vote(state.db(), id, ballot).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn close_voting(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ClosedVotingView>, HttpError> {
    let closed = store::close(state.db(), id).await?;
    state.cache.voting_results.invalidate(&id).await;
    state.cache.invalidate_dashboard().await;
    Ok(Json(closed))
}

async fn get_tally(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Tally>, HttpError> {
    if let Some(cached) = state.cache.voting_results.get(&id).await {
        return Ok(Json(cached.tally.clone()));
    }
    Ok(Json(store::tally(state.db(), id).await?))
}

/// Results of closed votings are final and served from cache.
async fn get_results(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<VotingResultsView>, HttpError> {
    if let Some(cached) = state.cache.voting_results.get(&id).await {
        debug!(voting_id = %id, "Voting results served from cache");
        return Ok(Json(VotingResultsView::clone(&cached)));
    }

    let results = store::results(state.db(), id).await?;
    if results.status == VotingStatus::Closed {
        state
            .cache
            .voting_results
            .insert(id, Arc::new(results.clone()))
            .await;
    }
    Ok(Json(results))
}

async fn get_quorum_result(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<quorum_voting_result::Model>, HttpError> {
    store::quorum_result(state.db(), id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            HttpError::new(
                StatusCode::NOT_FOUND,
                format!("voting {id} has no quorum result"),
            )
        })
}

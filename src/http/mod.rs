use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::WorkflowError;
use crate::state::AppState;

mod finance;
mod members;
mod news;
mod protocols;
mod reports;
mod voting;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_live))
        .route("/health/ready", get(health_ready))
        .nest("/members", members::router().with_state(state.clone()))
        .nest("/finance", finance::router().with_state(state.clone()))
        .nest("/voting", voting::router().with_state(state.clone()))
        .nest("/protocols", protocols::router().with_state(state.clone()))
        .nest("/reports", reports::router().with_state(state.clone()))
        .nest("/news", news::router().with_state(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn health_live(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "live",
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

async fn health_ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, HttpError> {
    state
        .database
        .ping()
        .await
        .map_err(|err| HttpError::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string()))?;

    let response = ReadyResponse {
        status: "ready",
        cache_entries: CacheSummary {
            dashboard: state.cache.dashboard.entry_count(),
            voting_results: state.cache.voting_results.entry_count(),
        },
    };
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
struct ReadyResponse {
    status: &'static str,
    cache_entries: CacheSummary,
}

#[derive(Debug, Serialize)]
struct CacheSummary {
    dashboard: u64,
    voting_results: u64,
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: String) -> Self {
        assert!(status != StatusCode::OK, "Error status cannot be 200");
        assert!(!message.is_empty(), "Error message cannot be empty");
        Self { status, message }
    }
}

impl From<WorkflowError> for HttpError {
    fn from(err: WorkflowError) -> Self {
        let status = match &err {
            WorkflowError::Validation(_) => StatusCode::BAD_REQUEST,
            WorkflowError::NotFound { .. } => StatusCode::NOT_FOUND,
            WorkflowError::InvalidTransition { .. } | WorkflowError::DuplicateVote => {
                StatusCode::CONFLICT
            }
            WorkflowError::OutOfWindow(_) | WorkflowError::PreconditionFailed(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            WorkflowError::Database(db_err) => {
                error!(error = %db_err, "Storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        info!(status = self.status.as_u16(), "HTTP error: {}", self.message);
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_errors_map_to_statuses() {
        let cases = [
            (WorkflowError::validation("amount must be greater than zero"), StatusCode::BAD_REQUEST),
            (WorkflowError::not_found("voting", "42"), StatusCode::NOT_FOUND),
            (
                WorkflowError::invalid_transition("support request", "approve", "created"),
                StatusCode::CONFLICT,
            ),
            (WorkflowError::DuplicateVote, StatusCode::CONFLICT),
            (
                WorkflowError::OutOfWindow("voting is closed".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                WorkflowError::PreconditionFailed("payment document missing".to_string()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                WorkflowError::Database(sea_orm::DbErr::Custom("down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(HttpError::from(err).status, expected);
        }
    }

    #[test]
    fn message_survives_conversion() {
        let err = HttpError::from(WorkflowError::DuplicateVote);
        assert_eq!(err.message, "voter has already cast a ballot in this voting");
    }
}

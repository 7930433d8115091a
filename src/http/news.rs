use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{news_category, news_comment, news_post};
use crate::models::news::{
    CategoryCreateRequest, CommentCreateRequest, PostCreateRequest, PostUpdateRequest, PostView,
};
use crate::state::AppState;
use crate::store::news as store;

use super::HttpError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route(
            "/posts/{id}/comments",
            get(list_comments).post(add_comment),
        )
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PostQuery {
    category_id: Option<Uuid>,
    limit: Option<u64>,
    offset: Option<u64>,
}

async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CategoryCreateRequest>,
) -> Result<(StatusCode, Json<news_category::Model>), HttpError> {
    let category = store::create_category(state.db(), request).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<news_category::Model>>, HttpError> {
    Ok(Json(store::list_categories(state.db()).await?))
}

async fn create_post(
    State(state): State<AppState>,
    Json(request): Json<PostCreateRequest>,
) -> Result<(StatusCode, Json<news_post::Model>), HttpError> {
    let post = store::create_post(state.db(), request).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn list_posts(
    Query(query): Query<PostQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<news_post::Model>>, HttpError> {
    let page = state.page(query.limit, query.offset);
    Ok(Json(
        store::list_posts(state.db(), query.category_id, page).await?,
    ))
}

async fn get_post(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<PostView>, HttpError> {
    Ok(Json(store::get_post(state.db(), id).await?))
}

async fn update_post(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(changes): Json<PostUpdateRequest>,
) -> Result<Json<news_post::Model>, HttpError> {
    Ok(Json(store::update_post(state.db(), id, changes).await?))
}

async fn delete_post(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, HttpError> {
    store::delete_post(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_comment(
    Path(post_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<CommentCreateRequest>,
) -> Result<(StatusCode, Json<news_comment::Model>), HttpError> {
    let comment = store::add_comment(state.db(), post_id, request).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_comments(
    Path(post_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<news_comment::Model>>, HttpError> {
    Ok(Json(store::list_comments(state.db(), post_id).await?))
}

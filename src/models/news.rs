use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{news_comment, news_post};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCreateRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCreateRequest {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub category_id: Uuid,
    #[serde(default)]
    pub is_pinned: bool,
    /// Defaults to now; a later date schedules the post
    pub published_at: Option<DateTime<Utc>>,
}

/// Partial edit of a post. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostUpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_pinned: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentCreateRequest {
    pub author_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: news_post::Model,
    pub comments: Vec<news_comment::Model>,
}

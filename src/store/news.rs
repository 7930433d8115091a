use sea_orm::prelude::*;
use sea_orm::{ActiveValue::Set, QueryOrder, QuerySelect, TransactionTrait};
use tracing::info;
use uuid::Uuid;

use crate::entities::{news_category, news_comment, news_post};
use crate::error::{WorkflowError, violates_unique_index};
use crate::models::news::{
    CategoryCreateRequest, CommentCreateRequest, PostCreateRequest, PostUpdateRequest, PostView,
};
use crate::validation::{self, MAX_NAME_LEN, MAX_SHORT_NAME_LEN, MAX_TEXT_LEN};

use super::{Page, now};

const CATEGORY: &str = "news category";
const POST: &str = "news post";
/// Unique index on `news_categories.name`.
const CATEGORY_NAME_INDEX: &str = "news_categories_name_key";

pub const MAX_COMMENT_LEN: usize = 4_000;

pub async fn create_category(
    db: &DatabaseConnection,
    request: CategoryCreateRequest,
) -> Result<news_category::Model, WorkflowError> {
    let name = validation::required_text(&request.name, "name", MAX_SHORT_NAME_LEN)?;
    let description =
        validation::optional_text(request.description.as_deref(), "description", MAX_TEXT_LEN)?;

    let taken = news_category::Entity::find()
        .filter(news_category::Column::Name.eq(name.as_str()))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(duplicate_category(&name));
    }

    let category = news_category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.clone()),
        description: Set(description),
    }
    .insert(db)
    .await
    .map_err(|err| {
        if violates_unique_index(&err, CATEGORY_NAME_INDEX) {
            duplicate_category(&name)
        } else {
            WorkflowError::from(err)
        }
    })?;
    info!(category_id = %category.id, name = %category.name, "News category created");
    Ok(category)
}

fn duplicate_category(name: &str) -> WorkflowError {
    WorkflowError::validation(format!("news category '{name}' already exists"))
}

pub async fn list_categories(
    db: &DatabaseConnection,
) -> Result<Vec<news_category::Model>, WorkflowError> {
    Ok(news_category::Entity::find()
        .order_by_asc(news_category::Column::Name)
        .all(db)
        .await?)
}

async fn ensure_category(db: &impl ConnectionTrait, id: Uuid) -> Result<(), WorkflowError> {
    news_category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found(CATEGORY, id))?;
    Ok(())
}

pub async fn create_post(
    db: &DatabaseConnection,
    request: PostCreateRequest,
) -> Result<news_post::Model, WorkflowError> {
    let title = validation::required_text(&request.title, "title", MAX_NAME_LEN)?;
    let content = validation::required_text(&request.content, "content", MAX_TEXT_LEN)?;
    ensure_category(db, request.category_id).await?;

    let created_at = now();
    let post = news_post::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        content: Set(content),
        author_id: Set(request.author_id),
        category_id: Set(request.category_id),
        is_pinned: Set(request.is_pinned),
        published_at: Set(request
            .published_at
            .map(|at| at.fixed_offset())
            .unwrap_or(created_at)),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
    .insert(db)
    .await?;
    info!(post_id = %post.id, category_id = %post.category_id, pinned = post.is_pinned, "News post created");
    Ok(post)
}

pub async fn get_post(db: &DatabaseConnection, id: Uuid) -> Result<PostView, WorkflowError> {
    let post = find_post(db, id).await?;
    let comments = comments_of(db, id).await?;
    Ok(PostView { post, comments })
}

/// Published posts, pinned first and newest next. Scheduled posts are left out.
pub async fn list_posts(
    db: &DatabaseConnection,
    category: Option<Uuid>,
    page: Page,
) -> Result<Vec<news_post::Model>, WorkflowError> {
    let mut select = news_post::Entity::find().filter(news_post::Column::PublishedAt.lte(now()));
    if let Some(category) = category {
        select = select.filter(news_post::Column::CategoryId.eq(category));
    }
    Ok(select
        .order_by_desc(news_post::Column::IsPinned)
        .order_by_desc(news_post::Column::PublishedAt)
        .limit(page.limit)
        .offset(page.offset)
        .all(db)
        .await?)
}

pub async fn update_post(
    db: &DatabaseConnection,
    id: Uuid,
    changes: PostUpdateRequest,
) -> Result<news_post::Model, WorkflowError> {
    let current = find_post(db, id).await?;
    let mut post: news_post::ActiveModel = current.into();
    if let Some(title) = changes.title.as_deref() {
        post.title = Set(validation::required_text(title, "title", MAX_NAME_LEN)?);
    }
    if let Some(content) = changes.content.as_deref() {
        post.content = Set(validation::required_text(content, "content", MAX_TEXT_LEN)?);
    }
    if let Some(category_id) = changes.category_id {
        ensure_category(db, category_id).await?;
        post.category_id = Set(category_id);
    }
    if let Some(is_pinned) = changes.is_pinned {
        post.is_pinned = Set(is_pinned);
    }
    if let Some(published_at) = changes.published_at {
        post.published_at = Set(published_at.fixed_offset());
    }
    post.updated_at = Set(now());

    let updated = post.update(db).await?;
    info!(post_id = %id, "News post updated");
    Ok(updated)
}

/// Removes a post together with its comments.
pub async fn delete_post(db: &DatabaseConnection, id: Uuid) -> Result<(), WorkflowError> {
    let txn = db.begin().await?;
    let comments = news_comment::Entity::delete_many()
        .filter(news_comment::Column::PostId.eq(id))
        .exec(&txn)
        .await?;
    let removed = news_post::Entity::delete_by_id(id).exec(&txn).await?;
    if removed.rows_affected == 0 {
        return Err(WorkflowError::not_found(POST, id));
    }
    txn.commit().await?;

    info!(post_id = %id, comments = comments.rows_affected, "News post deleted");
    Ok(())
}

pub async fn add_comment(
    db: &DatabaseConnection,
    post_id: Uuid,
    request: CommentCreateRequest,
) -> Result<news_comment::Model, WorkflowError> {
    let content = validation::required_text(&request.content, "content", MAX_COMMENT_LEN)?;
    find_post(db, post_id).await?;

    let created_at = now();
    let comment = news_comment::ActiveModel {
        id: Set(Uuid::new_v4()),
        post_id: Set(post_id),
        author_id: Set(request.author_id),
        content: Set(content),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
    .insert(db)
    .await?;
    info!(comment_id = %comment.id, post_id = %post_id, "Comment added");
    Ok(comment)
}

pub async fn list_comments(
    db: &DatabaseConnection,
    post_id: Uuid,
) -> Result<Vec<news_comment::Model>, WorkflowError> {
    find_post(db, post_id).await?;
    comments_of(db, post_id).await
}

async fn find_post(db: &impl ConnectionTrait, id: Uuid) -> Result<news_post::Model, WorkflowError> {
    news_post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found(POST, id))
}

async fn comments_of(
    db: &impl ConnectionTrait,
    post_id: Uuid,
) -> Result<Vec<news_comment::Model>, WorkflowError> {
    Ok(news_comment::Entity::find()
        .filter(news_comment::Column::PostId.eq(post_id))
        .order_by_asc(news_comment::Column::CreatedAt)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn category(name: &str) -> news_category::Model {
        news_category::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
        }
    }

    fn post_row(category_id: Uuid) -> news_post::Model {
        let at = Utc::now().fixed_offset();
        news_post::Model {
            id: Uuid::new_v4(),
            title: "New collective agreement signed".to_string(),
            content: "The agreement takes effect on the first of next month.".to_string(),
            author_id: Uuid::new_v4(),
            category_id,
            is_pinned: false,
            published_at: at,
            created_at: at,
            updated_at: at,
        }
    }

    fn deleted(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn category_name_is_unique() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![category("Announcements")]])
            .into_connection();
        let request = CategoryCreateRequest {
            name: " Announcements ".to_string(),
            description: None,
        };
        let err = create_category(&db, request).await.unwrap_err();
        match err {
            WorkflowError::Validation(message) => assert!(message.contains("Announcements")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn post_needs_known_category() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<news_category::Model>::new()])
            .into_connection();
        let request = PostCreateRequest {
            title: "Summer camp places".to_string(),
            content: "Applications open on Monday.".to_string(),
            author_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            is_pinned: false,
            published_at: None,
        };
        let err = create_post(&db, request).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { entity: CATEGORY, .. }));
    }

    #[tokio::test]
    async fn scheduled_post_keeps_its_date() {
        let events = category("Events");
        let later = Utc::now() + Duration::days(3);
        let mut stored = post_row(events.id);
        stored.published_at = later.fixed_offset();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![events.clone()]])
            .append_query_results([vec![stored.clone()]])
            .into_connection();
        let request = PostCreateRequest {
            title: stored.title.clone(),
            content: stored.content.clone(),
            author_id: stored.author_id,
            category_id: events.id,
            is_pinned: false,
            published_at: Some(later),
        };
        let post = create_post(&db, request).await.unwrap();
        assert_eq!(post.published_at, later.fixed_offset());

        let log = db.into_transaction_log();
        assert!(
            log.iter()
                .flat_map(|transaction| transaction.statements())
                .any(|statement| statement.sql.starts_with(r#"INSERT INTO "news_posts""#))
        );
    }

    #[tokio::test]
    async fn blank_edit_is_rejected() {
        let stored = post_row(Uuid::new_v4());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored.clone()]])
            .into_connection();
        let changes = PostUpdateRequest {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        let err = update_post(&db, stored.id, changes).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn deleting_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([deleted(0), deleted(0)])
            .into_connection();
        let err = delete_post(&db, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { entity: POST, .. }));
    }

    #[tokio::test]
    async fn deleting_post_drops_comments() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([deleted(3), deleted(1)])
            .into_connection();
        assert!(delete_post(&db, Uuid::new_v4()).await.is_ok());
    }

    #[tokio::test]
    async fn comment_on_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<news_post::Model>::new()])
            .into_connection();
        let request = CommentCreateRequest {
            author_id: Uuid::new_v4(),
            content: "Great news".to_string(),
        };
        let err = add_comment(&db, Uuid::new_v4(), request).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { entity: POST, .. }));
    }
}

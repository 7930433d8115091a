use std::collections::BTreeSet;

use sea_orm::prelude::*;
use sea_orm::{ActiveValue::Set, QueryOrder, QuerySelect, TransactionTrait};
use tracing::info;
use uuid::Uuid;

use crate::entities::enums::OpinionStatus;
use crate::entities::{document_signature, employee, meeting, meeting_attendee, motivated_opinion};
use crate::error::{WorkflowError, violates_unique_index};
use crate::models::protocols::{
    MeetingCreateRequest, MeetingView, OpinionCreateRequest, SignatureFilter, SignatureRequest,
};
use crate::validation::{self, MAX_NAME_LEN, MAX_NUMBER_LEN, MAX_SHORT_NAME_LEN, MAX_TEXT_LEN};
use crate::workflow::opinion::{self, OpinionAction};

use super::members::get_employee;
use super::{Page, ensure_applied, now};

const MEETING: &str = "meeting";
const OPINION: &str = "motivated opinion";
/// One signature per signer and document.
const SIGNATURE_UNIQUE_INDEX: &str = "uq_document_signatures_signer";

pub async fn create_meeting(
    db: &DatabaseConnection,
    request: MeetingCreateRequest,
) -> Result<MeetingView, WorkflowError> {
    let title = validation::required_text(&request.title, "title", MAX_NAME_LEN)?;
    let meeting_type =
        validation::required_text(&request.meeting_type, "meeting_type", MAX_SHORT_NAME_LEN)?;
    let agenda = validation::required_text(&request.agenda, "agenda", MAX_TEXT_LEN)?;
    let location = validation::required_text(&request.location, "location", MAX_NAME_LEN)?;

    let attendees: Vec<Uuid> = request
        .attendees
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if !attendees.is_empty() {
        let known = employee::Entity::find()
            .filter(employee::Column::Id.is_in(attendees.iter().copied()))
            .count(db)
            .await?;
        if known != attendees.len() as u64 {
            return Err(WorkflowError::validation(
                "every attendee must be a registered employee",
            ));
        }
    }

    let txn = db.begin().await?;
    let created_at = now();
    let meeting = meeting::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        meeting_type: Set(meeting_type),
        agenda: Set(agenda),
        meeting_date: Set(request.meeting_date.fixed_offset()),
        location: Set(location),
        organizer_id: Set(request.organizer_id),
        protocol: Set(String::new()),
        is_published: Set(false),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
    .insert(&txn)
    .await?;

    if !attendees.is_empty() {
        let rows = attendees.iter().map(|employee_id| meeting_attendee::ActiveModel {
            meeting_id: Set(meeting.id),
            employee_id: Set(*employee_id),
        });
        meeting_attendee::Entity::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;
    }
    txn.commit().await?;

    info!(meeting_id = %meeting.id, attendees = attendees.len(), "Meeting scheduled");
    Ok(MeetingView { meeting, attendees })
}

pub async fn get_meeting(db: &DatabaseConnection, id: Uuid) -> Result<MeetingView, WorkflowError> {
    let meeting = find_meeting(db, id).await?;
    let attendees = meeting_attendee::Entity::find()
        .select_only()
        .column(meeting_attendee::Column::EmployeeId)
        .filter(meeting_attendee::Column::MeetingId.eq(id))
        .into_tuple()
        .all(db)
        .await?;
    Ok(MeetingView { meeting, attendees })
}

pub async fn list_meetings(
    db: &DatabaseConnection,
    page: Page,
) -> Result<Vec<meeting::Model>, WorkflowError> {
    Ok(meeting::Entity::find()
        .order_by_desc(meeting::Column::MeetingDate)
        .limit(page.limit)
        .offset(page.offset)
        .all(db)
        .await?)
}

/// Attaches the protocol text and publishes it. A protocol is published once.
pub async fn publish_protocol(
    db: &DatabaseConnection,
    id: Uuid,
    protocol: &str,
) -> Result<meeting::Model, WorkflowError> {
    let protocol = validation::required_text(protocol, "protocol", MAX_TEXT_LEN)?;

    let txn = db.begin().await?;
    let current = find_meeting(&txn, id).await?;
    if current.is_published {
        return Err(WorkflowError::invalid_transition(
            "meeting protocol",
            "publish",
            "published",
        ));
    }
    let changes = meeting::ActiveModel {
        protocol: Set(protocol),
        is_published: Set(true),
        updated_at: Set(now()),
        ..Default::default()
    };
    let result = meeting::Entity::update_many()
        .set(changes)
        .filter(meeting::Column::Id.eq(id))
        .filter(meeting::Column::IsPublished.eq(false))
        .exec(&txn)
        .await?;
    ensure_applied(result.rows_affected, "meeting protocol", "publish", "draft")?;
    let published = find_meeting(&txn, id).await?;
    txn.commit().await?;

    info!(meeting_id = %id, "Protocol published");
    Ok(published)
}

async fn find_meeting(db: &impl ConnectionTrait, id: Uuid) -> Result<meeting::Model, WorkflowError> {
    meeting::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found(MEETING, id))
}

pub async fn draft_opinion(
    db: &DatabaseConnection,
    meeting_id: Uuid,
    request: OpinionCreateRequest,
) -> Result<motivated_opinion::Model, WorkflowError> {
    let title = validation::required_text(&request.title, "title", MAX_NAME_LEN)?;
    let content = validation::required_text(&request.content, "content", MAX_TEXT_LEN)?;
    find_meeting(db, meeting_id).await?;
    get_employee(db, request.author_id).await?;

    let created_at = now();
    let opinion = motivated_opinion::ActiveModel {
        id: Set(Uuid::new_v4()),
        meeting_id: Set(meeting_id),
        author_id: Set(request.author_id),
        title: Set(title),
        content: Set(content),
        status: Set(OpinionStatus::Draft),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
    .insert(db)
    .await?;
    info!(opinion_id = %opinion.id, meeting_id = %meeting_id, "Motivated opinion drafted");
    Ok(opinion)
}

pub async fn submit_opinion(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<motivated_opinion::Model, WorkflowError> {
    advance_opinion(db, id, OpinionAction::Submit).await
}

pub async fn review_opinion(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<motivated_opinion::Model, WorkflowError> {
    advance_opinion(db, id, OpinionAction::Review).await
}

pub async fn approve_opinion(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<motivated_opinion::Model, WorkflowError> {
    advance_opinion(db, id, OpinionAction::Approve).await
}

pub async fn reject_opinion(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<motivated_opinion::Model, WorkflowError> {
    advance_opinion(db, id, OpinionAction::Reject).await
}

async fn advance_opinion(
    db: &DatabaseConnection,
    id: Uuid,
    action: OpinionAction,
) -> Result<motivated_opinion::Model, WorkflowError> {
    let txn = db.begin().await?;
    let current = find_opinion(&txn, id).await?;
    let next = opinion::next_status(current.status, action)?;

    let changes = motivated_opinion::ActiveModel {
        status: Set(next),
        updated_at: Set(now()),
        ..Default::default()
    };
    let result = motivated_opinion::Entity::update_many()
        .set(changes)
        .filter(motivated_opinion::Column::Id.eq(id))
        .filter(motivated_opinion::Column::Status.eq(current.status))
        .exec(&txn)
        .await?;
    ensure_applied(result.rows_affected, OPINION, action.verb(), current.status)?;
    let updated = find_opinion(&txn, id).await?;
    txn.commit().await?;

    info!(opinion_id = %id, from = %current.status, to = %next, "Motivated opinion transitioned");
    Ok(updated)
}

async fn find_opinion(
    db: &impl ConnectionTrait,
    id: Uuid,
) -> Result<motivated_opinion::Model, WorkflowError> {
    motivated_opinion::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found(OPINION, id))
}

pub async fn list_opinions(
    db: &DatabaseConnection,
    meeting_id: Uuid,
) -> Result<Vec<motivated_opinion::Model>, WorkflowError> {
    find_meeting(db, meeting_id).await?;
    Ok(motivated_opinion::Entity::find()
        .filter(motivated_opinion::Column::MeetingId.eq(meeting_id))
        .order_by_asc(motivated_opinion::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Records a member's signature under a document. A document is signed once per signer.
pub async fn sign_document(
    db: &DatabaseConnection,
    request: SignatureRequest,
) -> Result<document_signature::Model, WorkflowError> {
    let document_type =
        validation::required_text(&request.document_type, "document_type", MAX_NUMBER_LEN)?;
    let signature_hash =
        validation::required_text(&request.signature_hash, "signature_hash", MAX_NAME_LEN)?;
    get_employee(db, request.signer_id).await?;

    let signed = document_signature::Entity::find()
        .filter(document_signature::Column::DocumentType.eq(document_type.as_str()))
        .filter(document_signature::Column::DocumentId.eq(request.document_id))
        .filter(document_signature::Column::SignerId.eq(request.signer_id))
        .one(db)
        .await?;
    if signed.is_some() {
        return Err(already_signed());
    }

    let signature = document_signature::ActiveModel {
        id: Set(Uuid::new_v4()),
        document_type: Set(document_type),
        document_id: Set(request.document_id),
        signer_id: Set(request.signer_id),
        signature_hash: Set(signature_hash),
        signed_at: Set(now()),
        ip_address: Set(request.ip_address.map(|ip| ip.to_string())),
    }
    .insert(db)
    .await
    .map_err(|err| {
        if violates_unique_index(&err, SIGNATURE_UNIQUE_INDEX) {
            already_signed()
        } else {
            WorkflowError::from(err)
        }
    })?;
    info!(
        signature_id = %signature.id,
        document_type = %signature.document_type,
        document_id = %signature.document_id,
        signer_id = %signature.signer_id,
        "Document signed"
    );
    Ok(signature)
}

fn already_signed() -> WorkflowError {
    WorkflowError::invalid_transition("document", "sign", "signed")
}

pub async fn list_signatures(
    db: &DatabaseConnection,
    filter: &SignatureFilter,
    page: Page,
) -> Result<Vec<document_signature::Model>, WorkflowError> {
    let mut select = document_signature::Entity::find();
    if let Some(signer_id) = filter.signer_id {
        select = select.filter(document_signature::Column::SignerId.eq(signer_id));
    }
    if let Some(document_type) = filter.document_type.as_deref() {
        select = select.filter(document_signature::Column::DocumentType.eq(document_type));
    }
    if let Some(document_id) = filter.document_id {
        select = select.filter(document_signature::Column::DocumentId.eq(document_id));
    }
    Ok(select
        .order_by_desc(document_signature::Column::SignedAt)
        .limit(page.limit)
        .offset(page.offset)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn meeting_row(is_published: bool) -> meeting::Model {
        let at = Utc::now().fixed_offset();
        meeting::Model {
            id: Uuid::new_v4(),
            title: "Conference of delegates".to_string(),
            meeting_type: "conference".to_string(),
            agenda: "1. Annual report".to_string(),
            meeting_date: at,
            location: "Assembly hall".to_string(),
            organizer_id: Uuid::new_v4(),
            protocol: if is_published { "Minutes".to_string() } else { String::new() },
            is_published,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn protocol_is_published_once() {
        let published = meeting_row(true);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![published.clone()]])
            .into_connection();
        let err = publish_protocol(&db, published.id, "Amended minutes")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn blank_protocol_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = publish_protocol(&db, Uuid::new_v4(), "  \n ").await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn draft_protocol_gets_published() {
        let draft = meeting_row(false);
        let mut published = draft.clone();
        published.protocol = "Minutes of the conference".to_string();
        published.is_published = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![draft.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![published]])
            .into_connection();
        let meeting = publish_protocol(&db, draft.id, "Minutes of the conference")
            .await
            .unwrap();
        assert!(meeting.is_published);
    }

    #[tokio::test]
    async fn organizer_need_not_be_registered() {
        let mut stored = meeting_row(false);
        stored.title = "Budget session".to_string();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored.clone()]])
            .into_connection();
        let request = MeetingCreateRequest {
            title: "Budget session".to_string(),
            meeting_type: "board".to_string(),
            agenda: "1. Dues for next year".to_string(),
            meeting_date: Utc::now(),
            location: "Room 12".to_string(),
            organizer_id: stored.organizer_id,
            attendees: vec![],
        };
        let view = create_meeting(&db, request).await.unwrap();
        assert_eq!(view.meeting.organizer_id, stored.organizer_id);
        assert!(view.attendees.is_empty());
    }

    #[tokio::test]
    async fn opinion_cannot_skip_submission() {
        let at = Utc::now().fixed_offset();
        let draft = motivated_opinion::Model {
            id: Uuid::new_v4(),
            meeting_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            title: "On the wage indexation clause".to_string(),
            content: "The clause should track regional inflation".to_string(),
            status: OpinionStatus::Draft,
            created_at: at,
            updated_at: at,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![draft.clone()]])
            .into_connection();
        let err = approve_opinion(&db, draft.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    fn signer_row() -> employee::Model {
        use crate::entities::enums::EmployeeStatus;
        use chrono::NaiveDate;

        let at = Utc::now().fixed_offset();
        employee::Model {
            id: Uuid::new_v4(),
            department_id: Uuid::new_v4(),
            employee_number: "T-0107".to_string(),
            full_name: "Sidorov Pavel Olegovich".to_string(),
            short_name: "Sidorov P.O.".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1978, 3, 9).unwrap(),
            union_ticket_number: "UT-0311".to_string(),
            union_join_date: NaiveDate::from_ymd_opt(2003, 5, 1).unwrap(),
            status: EmployeeStatus::Active,
            created_at: at,
            updated_at: at,
        }
    }

    fn signature_request(signer_id: Uuid) -> SignatureRequest {
        SignatureRequest {
            document_type: "protocol".to_string(),
            document_id: Uuid::new_v4(),
            signer_id,
            signature_hash: "9f86d081884c7d659a2feaa0c55ad015".to_string(),
            ip_address: Some("192.0.2.17".parse().unwrap()),
        }
    }

    fn signature_row(request: &SignatureRequest) -> document_signature::Model {
        document_signature::Model {
            id: Uuid::new_v4(),
            document_type: request.document_type.clone(),
            document_id: request.document_id,
            signer_id: request.signer_id,
            signature_hash: request.signature_hash.clone(),
            signed_at: Utc::now().fixed_offset(),
            ip_address: Some("192.0.2.17".to_string()),
        }
    }

    #[tokio::test]
    async fn document_is_signed() {
        let signer = signer_row();
        let request = signature_request(signer.id);
        let stored = signature_row(&request);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![signer]])
            .append_query_results([Vec::<document_signature::Model>::new()])
            .append_query_results([vec![stored.clone()]])
            .into_connection();
        let signature = sign_document(&db, request).await.unwrap();
        assert_eq!(signature, stored);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("192.0.2.17"));
    }

    #[tokio::test]
    async fn second_signature_is_conflict() {
        let signer = signer_row();
        let request = signature_request(signer.id);
        let existing = signature_row(&request);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![signer]])
            .append_query_results([vec![existing]])
            .into_connection();
        let err = sign_document(&db, request).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn concurrent_signature_hits_unique_index() {
        let signer = signer_row();
        let request = signature_request(signer.id);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![signer]])
            .append_query_results([Vec::<document_signature::Model>::new()])
            .append_query_errors([DbErr::Query(sea_orm::RuntimeErr::Internal(
                "duplicate key value violates unique constraint \"uq_document_signatures_signer\""
                    .to_string(),
            ))])
            .into_connection();
        let err = sign_document(&db, request).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn unknown_signer_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<employee::Model>::new()])
            .into_connection();
        let err = sign_document(&db, signature_request(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { entity: "employee", .. }));
    }
}

use chrono::Utc;
use sea_orm::prelude::*;
use sea_orm::{ActiveValue::Set, DatabaseTransaction, QueryOrder, QuerySelect, TransactionTrait};
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::enums::{VotingKind, VotingStatus};
use crate::entities::{
    quorum_voting_result, vote, vote_option, vote_selection, voting, voting_audience,
};
use crate::error::{WorkflowError, violates_unique_index};
use crate::models::voting::{
    BallotReceipt, BallotRequest, ClosedVotingView, VotingCreateRequest, VotingResultsView,
    VotingView,
};
use crate::workflow::quorum;
use crate::workflow::voting::{self as rules, Tally, VotingDraft};

use super::members::{count_employees, ensure_departments_exist, get_employee};
use super::{Page, ensure_applied, now, to_column};

const ENTITY: &str = "voting";
/// Unique index on `votes (voting_id, voter_id)` created by the voting migration.
const BALLOT_UNIQUE_INDEX: &str = "uq_votes_voting_voter";

pub async fn create_voting(
    db: &DatabaseConnection,
    request: VotingCreateRequest,
) -> Result<VotingView, WorkflowError> {
    let draft = rules::validate_draft(VotingDraft {
        title: request.title,
        description: request.description,
        kind: request.kind,
        vote_type: request.vote_type,
        start_date: request.start_date,
        end_date: request.end_date,
        quorum_required: request.quorum_required,
        options: request.options,
        audience: request.target_audience,
    })?;
    ensure_departments_exist(db, &draft.audience).await?;

    let txn = db.begin().await?;
    let created_at = now();
    let voting_id = Uuid::new_v4();
    voting::ActiveModel {
        id: Set(voting_id),
        title: Set(draft.title),
        description: Set(draft.description),
        kind: Set(draft.kind),
        vote_type: Set(draft.vote_type),
        status: Set(VotingStatus::Draft),
        author_id: Set(request.author_id),
        start_date: Set(draft.start_date.fixed_offset()),
        end_date: Set(draft.end_date.fixed_offset()),
        quorum_required: Set(draft.quorum_required),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
    .insert(&txn)
    .await?;

    let options = draft
        .options
        .into_iter()
        .enumerate()
        .map(|(index, text)| vote_option::ActiveModel {
            id: Set(Uuid::new_v4()),
            voting_id: Set(voting_id),
            text: Set(text),
            order: Set(index as i32 + 1),
        });
    vote_option::Entity::insert_many(options)
        .exec_without_returning(&txn)
        .await?;

    if !draft.audience.is_empty() {
        let audience = draft
            .audience
            .iter()
            .map(|department_id| voting_audience::ActiveModel {
                voting_id: Set(voting_id),
                department_id: Set(*department_id),
            });
        voting_audience::Entity::insert_many(audience)
            .exec_without_returning(&txn)
            .await?;
    }

    let view = load_view(&txn, voting_id).await?;
    txn.commit().await?;

    info!(
        voting_id = %voting_id,
        kind = %view.voting.kind,
        vote_type = %view.voting.vote_type,
        options = view.options.len(),
        audience = view.target_audience.len(),
        "Voting drafted"
    );
    Ok(view)
}

pub async fn get_voting(db: &DatabaseConnection, id: Uuid) -> Result<VotingView, WorkflowError> {
    load_view(db, id).await
}

pub async fn list_votings(
    db: &DatabaseConnection,
    status: Option<VotingStatus>,
    page: Page,
) -> Result<Vec<voting::Model>, WorkflowError> {
    let mut select = voting::Entity::find();
    if let Some(status) = status {
        select = select.filter(voting::Column::Status.eq(status));
    }
    Ok(select
        .order_by_desc(voting::Column::StartDate)
        .limit(page.limit)
        .offset(page.offset)
        .all(db)
        .await?)
}

pub async fn publish(db: &DatabaseConnection, id: Uuid) -> Result<VotingView, WorkflowError> {
    let txn = db.begin().await?;
    let current = find(&txn, id).await?;
    let next = rules::publish(&current, Utc::now())?;
    transition(&txn, &current, next, "publish").await?;
    let view = load_view(&txn, id).await?;
    txn.commit().await?;

    info!(voting_id = %id, "Voting published");
    Ok(view)
}

/// Records a ballot. Checks run in order: window, voter, audience, previous
/// ballot, selection.
pub async fn cast_vote(
    db: &DatabaseConnection,
    voting_id: Uuid,
    ballot: BallotRequest,
) -> Result<BallotReceipt, WorkflowError> {
    let txn = db.begin().await?;
    let voting = voting::Entity::find_by_id(voting_id)
        .lock_shared()
        .one(&txn)
        .await?
        .ok_or_else(|| WorkflowError::not_found(ENTITY, voting_id))?;
    rules::ensure_accepting_ballots(&voting, Utc::now())?;

    let voter = get_employee(&txn, ballot.voter_id).await?;
    let audience = audience_of(&txn, voting_id).await?;
    rules::ensure_in_audience(&audience, voter.department_id)?;

    let previous = vote::Entity::find()
        .filter(vote::Column::VotingId.eq(voting_id))
        .filter(vote::Column::VoterId.eq(voter.id))
        .one(&txn)
        .await?;
    if previous.is_some() {
        warn!(voting_id = %voting_id, voter_id = %voter.id, "Repeated ballot rejected");
        return Err(WorkflowError::DuplicateVote);
    }

    let options = options_of(&txn, voting_id).await?;
    let selected = rules::validate_selection(voting.vote_type, &options, &ballot.option_ids)?;

    let cast_at = now();
    let ballot_row = vote::ActiveModel {
        id: Set(Uuid::new_v4()),
        voting_id: Set(voting_id),
        voter_id: Set(voter.id),
        created_at: Set(cast_at),
    }
    .insert(&txn)
    .await
    .map_err(|err| {
        if violates_unique_index(&err, BALLOT_UNIQUE_INDEX) {
            warn!(voting_id = %voting_id, voter_id = %voter.id, "Concurrent repeated ballot rejected");
            WorkflowError::DuplicateVote
        } else {
            WorkflowError::from(err)
        }
    })?;

    let selections = selected.iter().map(|option_id| vote_selection::ActiveModel {
        vote_id: Set(ballot_row.id),
        option_id: Set(*option_id),
    });
    vote_selection::Entity::insert_many(selections)
        .exec_without_returning(&txn)
        .await?;
    txn.commit().await?;

    info!(
        voting_id = %voting_id,
        vote_id = %ballot_row.id,
        selections = selected.len(),
        "Ballot recorded"
    );
    Ok(BallotReceipt {
        vote_id: ballot_row.id,
        voting_id,
        voter_id: voter.id,
        option_ids: selected,
        cast_at: cast_at.timestamp(),
    })
}

/// Closes an active voting. Quorum votings get their participation result
/// computed against the electorate as it stands now.
pub async fn close(db: &DatabaseConnection, id: Uuid) -> Result<ClosedVotingView, WorkflowError> {
    let txn = db.begin().await?;
    let current = voting::Entity::find_by_id(id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| WorkflowError::not_found(ENTITY, id))?;
    let next = rules::close(&current)?;
    transition(&txn, &current, next, "close").await?;

    let quorum_result = if current.kind == VotingKind::Quorum {
        Some(record_quorum(&txn, &current).await?)
    } else {
        None
    };
    let voting = find(&txn, id).await?;
    txn.commit().await?;

    info!(
        voting_id = %id,
        quorum_reached = quorum_result.as_ref().map(|r| r.is_quorum_reached),
        "Voting closed"
    );
    Ok(ClosedVotingView {
        voting,
        quorum_result,
    })
}

async fn record_quorum(
    txn: &DatabaseTransaction,
    voting: &voting::Model,
) -> Result<quorum_voting_result::Model, WorkflowError> {
    let Some(quorum_required) = voting.quorum_required else {
        return Err(WorkflowError::PreconditionFailed(
            "quorum voting has no quorum requirement".to_string(),
        ));
    };

    let tally = load_tally(txn, voting).await?;
    let audience = audience_of(txn, voting.id).await?;
    let eligible = count_employees(txn, &audience).await?;
    let outcome = quorum::compute(tally.total_ballots, eligible, quorum_required);
    let (decision_made, decision_description) = quorum::decide(&outcome, &tally);

    quorum_voting_result::Entity::delete_many()
        .filter(quorum_voting_result::Column::VotingId.eq(voting.id))
        .exec(txn)
        .await?;
    let result = quorum_voting_result::ActiveModel {
        voting_id: Set(voting.id),
        quorum_percentage: Set(outcome.quorum_percentage),
        total_voters: Set(to_column(outcome.total_voters)?),
        required_voters: Set(to_column(outcome.required_voters)?),
        is_quorum_reached: Set(outcome.is_quorum_reached),
        decision_made: Set(decision_made),
        decision_description: Set(decision_description),
        created_at: Set(now()),
    }
    .insert(txn)
    .await?;

    info!(
        voting_id = %voting.id,
        eligible,
        ballots = outcome.total_voters,
        percentage = %outcome.quorum_percentage,
        decision_made,
        "Quorum evaluated"
    );
    Ok(result)
}

/// Per-option counts. Reading never changes the voting.
pub async fn tally(db: &DatabaseConnection, id: Uuid) -> Result<Tally, WorkflowError> {
    let voting = find(db, id).await?;
    load_tally(db, &voting).await
}

pub async fn quorum_result(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<quorum_voting_result::Model>, WorkflowError> {
    find(db, id).await?;
    Ok(quorum_voting_result::Entity::find_by_id(id).one(db).await?)
}

pub async fn results(db: &DatabaseConnection, id: Uuid) -> Result<VotingResultsView, WorkflowError> {
    let voting = find(db, id).await?;
    let tally = load_tally(db, &voting).await?;
    let quorum_result = quorum_voting_result::Entity::find_by_id(id).one(db).await?;
    Ok(VotingResultsView {
        voting_id: id,
        status: voting.status,
        tally,
        quorum_result,
    })
}

async fn find(db: &impl ConnectionTrait, id: Uuid) -> Result<voting::Model, WorkflowError> {
    voting::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found(ENTITY, id))
}

async fn transition(
    txn: &DatabaseTransaction,
    current: &voting::Model,
    next: VotingStatus,
    action: &'static str,
) -> Result<(), WorkflowError> {
    let changes = voting::ActiveModel {
        status: Set(next),
        updated_at: Set(now()),
        ..Default::default()
    };
    let result = voting::Entity::update_many()
        .set(changes)
        .filter(voting::Column::Id.eq(current.id))
        .filter(voting::Column::Status.eq(current.status))
        .exec(txn)
        .await?;
    ensure_applied(result.rows_affected, ENTITY, action, current.status)
}

async fn load_view(db: &impl ConnectionTrait, id: Uuid) -> Result<VotingView, WorkflowError> {
    let voting = find(db, id).await?;
    let options = options_of(db, id).await?;
    let target_audience = audience_of(db, id).await?;
    let is_active = rules::is_active(&voting, Utc::now());
    Ok(VotingView {
        voting,
        options,
        target_audience,
        is_active,
    })
}

async fn options_of(
    db: &impl ConnectionTrait,
    voting_id: Uuid,
) -> Result<Vec<vote_option::Model>, WorkflowError> {
    Ok(vote_option::Entity::find()
        .filter(vote_option::Column::VotingId.eq(voting_id))
        .order_by_asc(vote_option::Column::Order)
        .all(db)
        .await?)
}

async fn audience_of(db: &impl ConnectionTrait, voting_id: Uuid) -> Result<Vec<Uuid>, WorkflowError> {
    Ok(voting_audience::Entity::find()
        .select_only()
        .column(voting_audience::Column::DepartmentId)
        .filter(voting_audience::Column::VotingId.eq(voting_id))
        .into_tuple()
        .all(db)
        .await?)
}

async fn load_tally(db: &impl ConnectionTrait, voting: &voting::Model) -> Result<Tally, WorkflowError> {
    let options = options_of(db, voting.id).await?;
    let selections = vote_selection::Entity::find()
        .filter(vote_selection::Column::OptionId.is_in(options.iter().map(|option| option.id)))
        .all(db)
        .await?;
    let total_ballots = vote::Entity::find()
        .filter(vote::Column::VotingId.eq(voting.id))
        .count(db)
        .await?;
    Ok(rules::tally(voting.vote_type, &options, &selections, total_ballots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::Duration;
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, RuntimeErr, Value};

    use crate::entities::employee;
    use crate::entities::enums::{EmployeeStatus, VoteType};

    fn voting_row(status: VotingStatus) -> voting::Model {
        let at = Utc::now();
        voting::Model {
            id: Uuid::new_v4(),
            title: "Board election".to_string(),
            description: "Elect the trade union committee".to_string(),
            kind: VotingKind::Open,
            vote_type: VoteType::Single,
            status,
            author_id: Uuid::new_v4(),
            start_date: (at - Duration::hours(1)).fixed_offset(),
            end_date: (at + Duration::hours(1)).fixed_offset(),
            quorum_required: None,
            created_at: at.fixed_offset(),
            updated_at: at.fixed_offset(),
        }
    }

    fn member(department_id: Uuid) -> employee::Model {
        let at = Utc::now().fixed_offset();
        employee::Model {
            id: Uuid::new_v4(),
            department_id,
            employee_number: "T-7".to_string(),
            full_name: "Sidorov Ivan".to_string(),
            short_name: "Sidorov I.".to_string(),
            date_of_birth: chrono::NaiveDate::from_ymd_opt(1990, 6, 1).unwrap(),
            union_ticket_number: "UT-7".to_string(),
            union_join_date: chrono::NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            status: EmployeeStatus::Active,
            created_at: at,
            updated_at: at,
        }
    }

    fn options_for(voting_id: Uuid) -> Vec<vote_option::Model> {
        ["yes", "no"]
            .iter()
            .enumerate()
            .map(|(index, text)| vote_option::Model {
                id: Uuid::new_v4(),
                voting_id,
                text: ToString::to_string(text),
                order: index as i32 + 1,
            })
            .collect()
    }

    fn count_row(count: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::from(count))])
    }

    fn audience_row(department_id: Uuid) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("department_id", Value::from(department_id))])
    }

    fn applied(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn publish_activates_draft() {
        let draft = voting_row(VotingStatus::Draft);
        let mut active = draft.clone();
        active.status = VotingStatus::Active;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![draft.clone()]])
            .append_exec_results([applied(1)])
            .append_query_results([vec![active]])
            .append_query_results([options_for(draft.id)])
            .append_query_results([Vec::<voting_audience::Model>::new()])
            .into_connection();

        let view = publish(&db, draft.id).await.unwrap();
        assert_eq!(view.voting.status, VotingStatus::Active);
        assert!(view.is_active);
        assert_eq!(view.options.len(), 2);
        assert!(view.target_audience.is_empty());
    }

    #[tokio::test]
    async fn publish_losing_race_is_invalid_transition() {
        let draft = voting_row(VotingStatus::Draft);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![draft.clone()]])
            .append_exec_results([applied(0)])
            .into_connection();
        let err = publish(&db, draft.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn ballot_is_recorded() {
        let active = voting_row(VotingStatus::Active);
        let voter = member(Uuid::new_v4());
        let options = options_for(active.id);
        let chosen = options[0].id;
        let stored = vote::Model {
            id: Uuid::new_v4(),
            voting_id: active.id,
            voter_id: voter.id,
            created_at: Utc::now().fixed_offset(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![active.clone()]])
            .append_query_results([vec![voter.clone()]])
            .append_query_results([vec![audience_row(voter.department_id)]])
            .append_query_results([Vec::<vote::Model>::new()])
            .append_query_results([options])
            .append_query_results([vec![stored.clone()]])
            .append_exec_results([applied(1)])
            .into_connection();

        let ballot = BallotRequest {
            voter_id: voter.id,
            option_ids: vec![chosen, chosen],
        };
        let receipt = cast_vote(&db, active.id, ballot).await.unwrap();
        assert_eq!(receipt.vote_id, stored.id);
        assert_eq!(receipt.voter_id, voter.id);
        assert_eq!(receipt.option_ids, vec![chosen]);
    }

    #[tokio::test]
    async fn voter_outside_audience_is_refused() {
        let active = voting_row(VotingStatus::Active);
        let voter = member(Uuid::new_v4());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![active.clone()]])
            .append_query_results([vec![voter.clone()]])
            .append_query_results([vec![audience_row(Uuid::new_v4())]])
            .into_connection();
        let ballot = BallotRequest {
            voter_id: voter.id,
            option_ids: vec![Uuid::new_v4()],
        };
        let err = cast_vote(&db, active.id, ballot).await.unwrap_err();
        assert!(matches!(err, WorkflowError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn concurrent_ballot_hits_unique_index() {
        let active = voting_row(VotingStatus::Active);
        let voter = member(Uuid::new_v4());
        let options = options_for(active.id);
        let chosen = options[1].id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![active.clone()]])
            .append_query_results([vec![voter.clone()]])
            .append_query_results([Vec::<voting_audience::Model>::new()])
            .append_query_results([Vec::<vote::Model>::new()])
            .append_query_results([options])
            .append_query_errors([DbErr::Query(RuntimeErr::Internal(format!(
                "duplicate key value violates unique constraint \"{BALLOT_UNIQUE_INDEX}\""
            )))])
            .into_connection();
        let ballot = BallotRequest {
            voter_id: voter.id,
            option_ids: vec![chosen],
        };
        let err = cast_vote(&db, active.id, ballot).await.unwrap_err();
        assert!(matches!(err, WorkflowError::DuplicateVote));
    }

    #[tokio::test]
    async fn closing_quorum_voting_persists_participation() {
        let mut active = voting_row(VotingStatus::Active);
        active.kind = VotingKind::Quorum;
        active.quorum_required = Some(Decimal::from(50));
        let mut closed = active.clone();
        closed.status = VotingStatus::Closed;

        let options = options_for(active.id);
        let selections: Vec<vote_selection::Model> = (0..6)
            .map(|ballot| vote_selection::Model {
                vote_id: Uuid::new_v4(),
                option_id: if ballot < 4 { options[0].id } else { options[1].id },
            })
            .collect();
        let department_id = Uuid::new_v4();
        let stored = quorum_voting_result::Model {
            voting_id: active.id,
            quorum_percentage: Decimal::new(6000, 2),
            total_voters: 6,
            required_voters: 5,
            is_quorum_reached: true,
            decision_made: true,
            decision_description: "Decision: \"yes\" with 4 votes".to_string(),
            created_at: Utc::now().fixed_offset(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![active.clone()]])
            .append_exec_results([applied(1)])
            .append_query_results([options])
            .append_query_results([selections])
            .append_query_results([vec![count_row(6)]])
            .append_query_results([vec![audience_row(department_id)]])
            .append_query_results([vec![count_row(10)]])
            .append_exec_results([applied(0)])
            .append_query_results([vec![stored]])
            .append_query_results([vec![closed]])
            .into_connection();

        let view = close(&db, active.id).await.unwrap();
        assert_eq!(view.voting.status, VotingStatus::Closed);
        assert!(view.quorum_result.is_some());

        let log = db.into_transaction_log();
        let insert = log
            .iter()
            .flat_map(|transaction| transaction.statements())
            .find(|statement| statement.sql.starts_with(r#"INSERT INTO "quorum_voting_results""#))
            .expect("quorum result is written");
        let values = &insert.values.as_ref().expect("insert carries values").0;
        assert!(values.contains(&Value::from(Decimal::new(6000, 2))));
        assert!(values.contains(&Value::from(6i32)));
        assert!(values.contains(&Value::from(5i32)));
        assert!(values.contains(&Value::from(true)));
        assert!(values.contains(&Value::from("Decision: \"yes\" with 4 votes".to_string())));
    }

    #[tokio::test]
    async fn ballot_after_close_is_out_of_window() {
        let closed = voting_row(VotingStatus::Closed);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![closed.clone()]])
            .into_connection();
        let ballot = BallotRequest {
            voter_id: Uuid::new_v4(),
            option_ids: vec![Uuid::new_v4()],
        };
        let err = cast_vote(&db, closed.id, ballot).await.unwrap_err();
        assert!(matches!(err, WorkflowError::OutOfWindow(_)));
    }

    #[tokio::test]
    async fn second_ballot_is_duplicate() {
        let active = voting_row(VotingStatus::Active);
        let voter = member(Uuid::new_v4());
        let earlier = vote::Model {
            id: Uuid::new_v4(),
            voting_id: active.id,
            voter_id: voter.id,
            created_at: Utc::now().fixed_offset(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![active.clone()]])
            .append_query_results([vec![voter.clone()]])
            .append_query_results([Vec::<voting_audience::Model>::new()])
            .append_query_results([vec![earlier]])
            .into_connection();
        let ballot = BallotRequest {
            voter_id: voter.id,
            option_ids: vec![Uuid::new_v4()],
        };
        let err = cast_vote(&db, active.id, ballot).await.unwrap_err();
        assert!(matches!(err, WorkflowError::DuplicateVote));
    }

    #[tokio::test]
    async fn closing_a_draft_is_invalid() {
        let draft = voting_row(VotingStatus::Draft);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![draft.clone()]])
            .into_connection();
        let err = close(&db, draft.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn draft_with_single_option_never_reaches_storage() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let now = Utc::now();
        let request = VotingCreateRequest {
            title: "Holiday schedule".to_string(),
            description: "Pick the summer closure weeks".to_string(),
            kind: VotingKind::Quorum,
            vote_type: VoteType::Single,
            author_id: Uuid::new_v4(),
            start_date: now,
            end_date: now + Duration::days(2),
            quorum_required: Some(Decimal::from(50)),
            options: vec!["July".to_string()],
            target_audience: vec![],
        };
        let err = create_voting(&db, request).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }
}

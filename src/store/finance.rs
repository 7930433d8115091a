use sea_orm::prelude::*;
use sea_orm::{
    ActiveValue::Set, DatabaseTransaction, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::enums::{RecordType, SupportStatus};
use crate::entities::{employee, financial_record, membership_fee, support_request};
use crate::error::{WorkflowError, is_unique_violation};
use crate::models::finance::{
    FeeCreateRequest, PaymentRequest, SupportRequestCreate, SupportRequestFilter,
};
use crate::validation;
use crate::workflow::financial::{self, SupportAction};

use super::{Page, ensure_applied, now};

const REQUEST: &str = "support request";
const FEE: &str = "membership fee";

pub async fn submit(
    db: &DatabaseConnection,
    request: SupportRequestCreate,
) -> Result<support_request::Model, WorkflowError> {
    let submission = financial::validate_submission(
        request.amount,
        &request.description,
        request.supporting_document.as_deref(),
    )?;
    ensure_employee(db, request.employee_id).await?;

    let created_at = now();
    let model = support_request::ActiveModel {
        id: Set(Uuid::new_v4()),
        employee_id: Set(request.employee_id),
        requestor_id: Set(request.requestor_id),
        amount: Set(submission.amount),
        reason: Set(request.reason),
        description: Set(submission.description),
        status: Set(SupportStatus::Created),
        supporting_document: Set(submission.supporting_document),
        approver_id: Set(None),
        approved_at: Set(None),
        payment_document: Set(None),
        paid_at: Set(None),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
    .insert(db)
    .await?;

    info!(
        request_id = %model.id,
        employee_id = %model.employee_id,
        amount = %model.amount,
        reason = %model.reason,
        "Support request submitted"
    );
    Ok(model)
}

pub async fn get(
    db: &impl ConnectionTrait,
    id: Uuid,
) -> Result<support_request::Model, WorkflowError> {
    support_request::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found(REQUEST, id))
}

pub async fn list(
    db: &DatabaseConnection,
    filter: &SupportRequestFilter,
    page: Page,
) -> Result<Vec<support_request::Model>, WorkflowError> {
    let mut select = support_request::Entity::find();
    if let Some(status) = filter.status {
        select = select.filter(support_request::Column::Status.eq(status));
    }
    if let Some(employee_id) = filter.employee_id {
        select = select.filter(support_request::Column::EmployeeId.eq(employee_id));
    }
    let requests = select
        .order_by_desc(support_request::Column::CreatedAt)
        .limit(page.limit)
        .offset(page.offset)
        .all(db)
        .await?;
    assert!(requests.len() as u64 <= page.limit, "Listing exceeded page limit");
    Ok(requests)
}

pub async fn advance_to_review(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<support_request::Model, WorkflowError> {
    let txn = db.begin().await?;
    let updated = apply(&txn, id, SupportAction::Review, |_, _| {}).await?;
    txn.commit().await?;
    Ok(updated)
}

pub async fn approve(
    db: &DatabaseConnection,
    id: Uuid,
    approver_id: Uuid,
) -> Result<support_request::Model, WorkflowError> {
    let txn = db.begin().await?;
    let updated = apply(&txn, id, SupportAction::Approve, |active, at| {
        active.approver_id = Set(Some(approver_id));
        active.approved_at = Set(Some(at));
    })
    .await?;
    txn.commit().await?;
    Ok(updated)
}

/// Rejection names the decision maker but never stamps `approved_at`.
pub async fn reject(
    db: &DatabaseConnection,
    id: Uuid,
    approver_id: Uuid,
) -> Result<support_request::Model, WorkflowError> {
    let txn = db.begin().await?;
    let updated = apply(&txn, id, SupportAction::Reject, |active, _| {
        active.approver_id = Set(Some(approver_id));
    })
    .await?;
    txn.commit().await?;
    Ok(updated)
}

/// Pays an approved request and books the payout as an expense.
pub async fn mark_paid(
    db: &DatabaseConnection,
    id: Uuid,
    payment: PaymentRequest,
) -> Result<support_request::Model, WorkflowError> {
    let document = financial::require_payment_document(payment.payment_document.as_deref())?;

    let txn = db.begin().await?;
    let updated = apply(&txn, id, SupportAction::Pay, |active, at| {
        active.payment_document = Set(Some(document));
        active.paid_at = Set(Some(at));
    })
    .await?;

    let record = book(
        &txn,
        RecordType::Expense,
        updated.amount,
        format!("Support payout ({}) for request {}", updated.reason, updated.id),
        Some(updated.id),
        payment.recorded_by,
    )
    .await?;
    txn.commit().await?;

    info!(request_id = %updated.id, record_id = %record.id, "Support payout booked");
    Ok(updated)
}

pub async fn cancel(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<support_request::Model, WorkflowError> {
    let txn = db.begin().await?;
    let updated = apply(&txn, id, SupportAction::Cancel, |_, _| {}).await?;
    txn.commit().await?;
    Ok(updated)
}

async fn apply<F>(
    txn: &DatabaseTransaction,
    id: Uuid,
    action: SupportAction,
    amend: F,
) -> Result<support_request::Model, WorkflowError>
where
    F: FnOnce(&mut support_request::ActiveModel, DateTimeWithTimeZone),
{
    let current = get(txn, id).await?;
    let next = financial::next_status(current.status, action)?;

    let at = now();
    let mut changes = support_request::ActiveModel {
        status: Set(next),
        updated_at: Set(at),
        ..Default::default()
    };
    amend(&mut changes, at);

    let result = support_request::Entity::update_many()
        .set(changes)
        .filter(support_request::Column::Id.eq(id))
        .filter(support_request::Column::Status.eq(current.status))
        .exec(txn)
        .await?;
    ensure_applied(result.rows_affected, REQUEST, action.verb(), current.status)?;

    let updated = get(txn, id).await?;
    assert_eq!(updated.status, next, "Conditional update must land the next status");
    info!(
        request_id = %id,
        from = %current.status,
        to = %next,
        terminal = next.is_terminal(),
        "Support request transitioned"
    );
    Ok(updated)
}

pub async fn accrue_fee(
    db: &DatabaseConnection,
    request: FeeCreateRequest,
) -> Result<membership_fee::Model, WorkflowError> {
    let amount = validation::money(request.amount, "amount", financial::MAX_FEE_AMOUNT)?;
    let percentage_rate = validation::percentage(request.percentage_rate, "percentage_rate")?;
    let period = validation::month_start(request.period);
    ensure_employee(db, request.employee_id).await?;

    let existing = membership_fee::Entity::find()
        .filter(membership_fee::Column::EmployeeId.eq(request.employee_id))
        .filter(membership_fee::Column::Period.eq(period))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(duplicate_fee(period));
    }

    let created_at = now();
    let fee = membership_fee::ActiveModel {
        id: Set(Uuid::new_v4()),
        employee_id: Set(request.employee_id),
        amount: Set(amount),
        percentage_rate: Set(percentage_rate),
        period: Set(period),
        paid_at: Set(None),
        paid_by: Set(None),
        created_at: Set(created_at),
        updated_at: Set(created_at),
    }
    .insert(db)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            duplicate_fee(period)
        } else {
            WorkflowError::from(err)
        }
    })?;

    info!(fee_id = %fee.id, employee_id = %fee.employee_id, period = %fee.period, "Membership fee accrued");
    Ok(fee)
}

fn duplicate_fee(period: Date) -> WorkflowError {
    WorkflowError::validation(format!(
        "a membership fee for {} is already accrued",
        period.format("%Y-%m")
    ))
}

/// Settles an unpaid fee and books it as income.
pub async fn pay_fee(
    db: &DatabaseConnection,
    id: Uuid,
    paid_by: Uuid,
) -> Result<membership_fee::Model, WorkflowError> {
    let txn = db.begin().await?;
    let fee = membership_fee::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| WorkflowError::not_found(FEE, id))?;
    financial::ensure_fee_unpaid(fee.is_paid())?;

    let at = now();
    let changes = membership_fee::ActiveModel {
        paid_at: Set(Some(at)),
        paid_by: Set(Some(paid_by)),
        updated_at: Set(at),
        ..Default::default()
    };
    let result = membership_fee::Entity::update_many()
        .set(changes)
        .filter(membership_fee::Column::Id.eq(id))
        .filter(membership_fee::Column::PaidAt.is_null())
        .exec(&txn)
        .await?;
    ensure_applied(result.rows_affected, FEE, "pay", "unpaid")?;

    book(
        &txn,
        RecordType::Income,
        fee.amount,
        format!(
            "Membership fee for {} from employee {}",
            fee.period.format("%Y-%m"),
            fee.employee_id
        ),
        None,
        paid_by,
    )
    .await?;

    let paid = membership_fee::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| WorkflowError::not_found(FEE, id))?;
    txn.commit().await?;

    info!(fee_id = %id, paid_by = %paid_by, "Membership fee paid");
    Ok(paid)
}

pub async fn list_fees(
    db: &DatabaseConnection,
    employee_id: Option<Uuid>,
    unpaid_only: bool,
    page: Page,
) -> Result<Vec<membership_fee::Model>, WorkflowError> {
    let mut select = membership_fee::Entity::find();
    if let Some(employee_id) = employee_id {
        select = select.filter(membership_fee::Column::EmployeeId.eq(employee_id));
    }
    if unpaid_only {
        select = select.filter(membership_fee::Column::PaidAt.is_null());
    }
    Ok(select
        .order_by_desc(membership_fee::Column::Period)
        .limit(page.limit)
        .offset(page.offset)
        .all(db)
        .await?)
}

pub async fn list_records(
    db: &DatabaseConnection,
    record_type: Option<RecordType>,
    page: Page,
) -> Result<Vec<financial_record::Model>, WorkflowError> {
    let mut select = financial_record::Entity::find();
    if let Some(record_type) = record_type {
        select = select.filter(financial_record::Column::RecordType.eq(record_type));
    }
    Ok(select
        .order_by_desc(financial_record::Column::CreatedAt)
        .limit(page.limit)
        .offset(page.offset)
        .all(db)
        .await?)
}

async fn book(
    txn: &DatabaseTransaction,
    record_type: RecordType,
    amount: Decimal,
    description: String,
    related_request_id: Option<Uuid>,
    created_by: Uuid,
) -> Result<financial_record::Model, WorkflowError> {
    assert!(amount > Decimal::ZERO, "Booked amounts are positive");
    let record = financial_record::ActiveModel {
        id: Set(Uuid::new_v4()),
        record_type: Set(record_type),
        amount: Set(amount),
        description: Set(description),
        related_request_id: Set(related_request_id),
        created_by: Set(created_by),
        created_at: Set(now()),
    }
    .insert(txn)
    .await?;
    Ok(record)
}

async fn ensure_employee(db: &impl ConnectionTrait, id: Uuid) -> Result<(), WorkflowError> {
    employee::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| WorkflowError::not_found("employee", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use crate::entities::enums::SupportReason;

    fn request(status: SupportStatus) -> support_request::Model {
        let at = Utc::now().fixed_offset();
        support_request::Model {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            requestor_id: Uuid::new_v4(),
            amount: Decimal::new(150_000, 2),
            reason: SupportReason::Illness,
            description: "Hospital stay".to_string(),
            status,
            supporting_document: Some("s3://docs/discharge.pdf".to_string()),
            approver_id: None,
            approved_at: None,
            payment_document: None,
            paid_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn updated(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn approve_records_approver() {
        let reviewing = request(SupportStatus::Reviewing);
        let approver = Uuid::new_v4();
        let mut approved = reviewing.clone();
        approved.status = SupportStatus::Approved;
        approved.approver_id = Some(approver);
        approved.approved_at = Some(Utc::now().fixed_offset());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![reviewing.clone()]])
            .append_exec_results([updated(1)])
            .append_query_results([vec![approved.clone()]])
            .into_connection();

        let result = approve(&db, reviewing.id, approver).await.unwrap();
        assert_eq!(result.status, SupportStatus::Approved);
        assert_eq!(result.approver_id, Some(approver));
        assert!(result.approved_at.is_some());
    }

    #[tokio::test]
    async fn lost_race_is_invalid_transition() {
        let reviewing = request(SupportStatus::Reviewing);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![reviewing.clone()]])
            .append_exec_results([updated(0)])
            .into_connection();

        let err = approve(&db, reviewing.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn approve_from_created_touches_nothing() {
        let created = request(SupportStatus::Created);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![created.clone()]])
            .into_connection();

        let err = approve(&db, created.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn payment_requires_document() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let payment = PaymentRequest {
            payment_document: Some("   ".to_string()),
            recorded_by: Uuid::new_v4(),
        };
        let err = mark_paid(&db, Uuid::new_v4(), payment).await.unwrap_err();
        assert!(matches!(err, WorkflowError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn negative_amount_is_rejected_before_lookup() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let submission = SupportRequestCreate {
            employee_id: Uuid::new_v4(),
            requestor_id: Uuid::new_v4(),
            amount: Decimal::from(-5),
            reason: SupportReason::MaterialAid,
            description: "Flood damage".to_string(),
            supporting_document: None,
        };
        let err = submit(&db, submission).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_request_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<support_request::Model>::new()])
            .into_connection();
        let err = cancel(&db, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { .. }));
    }

    #[tokio::test]
    async fn paying_a_paid_fee_is_rejected() {
        let at = Utc::now().fixed_offset();
        let fee = membership_fee::Model {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            amount: Decimal::new(2_500, 2),
            percentage_rate: Decimal::ONE,
            period: chrono::NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            paid_at: Some(at),
            paid_by: Some(Uuid::new_v4()),
            created_at: at,
            updated_at: at,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![fee.clone()]])
            .into_connection();
        let err = pay_fee(&db, fee.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }
}

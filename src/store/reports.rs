use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::RoundingStrategy;
use sea_orm::prelude::*;
use sea_orm::{ActiveValue::Set, QueryOrder, QuerySelect, TransactionTrait};
use tracing::info;
use uuid::Uuid;

use crate::entities::enums::{EmployeeStatus, Movement, RecordType, SupportStatus, VotingStatus};
use crate::entities::{
    department, employee, employment_history, financial_record, financial_report,
    membership_fee, membership_report, movement_report, movement_report_entry,
    quorum_voting_result, support_request, voting,
};
use crate::error::WorkflowError;
use crate::models::reports::{
    DashboardSummary, DepartmentHeadcount, FinanceStats, FinancialReportRequest,
    MembershipReportRequest, MembershipStats, MovementReportRequest, MovementReportView,
    StatusCount, VotingStats,
};
use crate::validation::{self, MAX_NAME_LEN};

use super::members::{get_department, get_organization, headcount_by_department};
use super::{Page, count_to_u64, now, to_column};

/// Longest period a single financial report may cover.
pub const MAX_REPORT_DAYS: i64 = 3_660;

pub async fn dashboard_summary(db: &DatabaseConnection) -> Result<DashboardSummary, WorkflowError> {
    let membership = membership_stats(db).await?;
    let finance = finance_stats(db).await?;
    let voting = voting_stats(db).await?;
    Ok(DashboardSummary {
        membership,
        finance,
        voting,
        generated_at: Utc::now().timestamp(),
    })
}

async fn membership_stats(db: &DatabaseConnection) -> Result<MembershipStats, WorkflowError> {
    let by_status: Vec<(EmployeeStatus, i64)> = employee::Entity::find()
        .select_only()
        .column(employee::Column::Status)
        .column_as(employee::Column::Id.count(), "count")
        .group_by(employee::Column::Status)
        .into_tuple()
        .all(db)
        .await?;
    let by_status = status_counts(by_status);
    let total_members = by_status.iter().map(|entry| entry.count).sum();

    let by_department = headcount_by_department(db)
        .await?
        .into_iter()
        .map(|(department_id, members)| DepartmentHeadcount {
            department_id,
            members,
        })
        .collect();

    Ok(MembershipStats {
        total_members,
        by_status,
        by_department,
    })
}

async fn finance_stats(db: &DatabaseConnection) -> Result<FinanceStats, WorkflowError> {
    let requests: Vec<(SupportStatus, i64)> = support_request::Entity::find()
        .select_only()
        .column(support_request::Column::Status)
        .column_as(support_request::Column::Id.count(), "count")
        .group_by(support_request::Column::Status)
        .into_tuple()
        .all(db)
        .await?;

    let total_support_paid: Option<Option<Decimal>> = support_request::Entity::find()
        .select_only()
        .column_as(support_request::Column::Amount.sum(), "total")
        .filter(support_request::Column::Status.eq(SupportStatus::Paid))
        .into_tuple()
        .one(db)
        .await?;

    let unpaid: Option<(i64, Option<Decimal>)> = membership_fee::Entity::find()
        .select_only()
        .column_as(membership_fee::Column::Id.count(), "count")
        .column_as(membership_fee::Column::Amount.sum(), "total")
        .filter(membership_fee::Column::PaidAt.is_null())
        .into_tuple()
        .one(db)
        .await?;
    let (unpaid_fees, unpaid_fees_amount) = unpaid.unwrap_or((0, None));

    Ok(FinanceStats {
        requests_by_status: status_counts(requests),
        total_support_paid: total_support_paid.flatten().unwrap_or(Decimal::ZERO),
        unpaid_fees: count_to_u64(unpaid_fees),
        unpaid_fees_amount: unpaid_fees_amount.unwrap_or(Decimal::ZERO),
    })
}

async fn voting_stats(db: &DatabaseConnection) -> Result<VotingStats, WorkflowError> {
    let by_status: Vec<(VotingStatus, i64)> = voting::Entity::find()
        .select_only()
        .column(voting::Column::Status)
        .column_as(voting::Column::Id.count(), "count")
        .group_by(voting::Column::Status)
        .into_tuple()
        .all(db)
        .await?;

    let participation: Option<(i64, Option<Decimal>)> = quorum_voting_result::Entity::find()
        .select_only()
        .column_as(quorum_voting_result::Column::VotingId.count(), "count")
        .column_as(quorum_voting_result::Column::QuorumPercentage.sum(), "total")
        .into_tuple()
        .one(db)
        .await?;
    let (closed, total) = participation.unwrap_or((0, None));

    Ok(VotingStats {
        by_status: status_counts(by_status),
        average_quorum_percentage: average_percentage(
            total.unwrap_or(Decimal::ZERO),
            count_to_u64(closed),
        ),
    })
}

fn status_counts<S: Ord + Copy>(rows: Vec<(S, i64)>) -> Vec<StatusCount<S>> {
    let mut counts: Vec<StatusCount<S>> = rows
        .into_iter()
        .map(|(status, count)| StatusCount {
            status,
            count: count_to_u64(count),
        })
        .collect();
    counts.sort_by_key(|entry| entry.status);
    counts
}

fn average_percentage(total: Decimal, samples: u64) -> Option<Decimal> {
    if samples == 0 {
        return None;
    }
    let mut average = (total / Decimal::from(samples))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    average.rescale(2);
    Some(average)
}

/// Totals for a reporting period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodTotals {
    pub income: Decimal,
    pub expense: Decimal,
    pub support_paid: Decimal,
    pub support_payouts: u64,
    pub records: u64,
}

/// Books the period's income, expenses and support payouts into a stored report.
pub async fn generate_financial_report(
    db: &DatabaseConnection,
    request: FinancialReportRequest,
) -> Result<financial_report::Model, WorkflowError> {
    let title = validation::required_text(&request.title, "title", MAX_NAME_LEN)?;
    check_period(request.period_start, request.period_end)?;

    let (from, until) = period_bounds(request.period_start, request.period_end);
    let records = financial_record::Entity::find()
        .filter(financial_record::Column::CreatedAt.gte(from))
        .filter(financial_record::Column::CreatedAt.lt(until))
        .all(db)
        .await?;
    let payouts = support_request::Entity::find()
        .filter(support_request::Column::Status.eq(SupportStatus::Paid))
        .filter(support_request::Column::PaidAt.gte(from))
        .filter(support_request::Column::PaidAt.lt(until))
        .all(db)
        .await?;

    let totals = summarize(&records, &payouts);
    let content = render_report(&title, request.period_start, request.period_end, &totals);

    let report = financial_report::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        period_start: Set(request.period_start),
        period_end: Set(request.period_end),
        content: Set(content),
        generated_by: Set(request.generated_by),
        generated_at: Set(now()),
    }
    .insert(db)
    .await?;

    info!(
        report_id = %report.id,
        income = %totals.income,
        expense = %totals.expense,
        records = totals.records,
        "Financial report generated"
    );
    Ok(report)
}

pub async fn list_financial_reports(
    db: &DatabaseConnection,
    page: Page,
) -> Result<Vec<financial_report::Model>, WorkflowError> {
    Ok(financial_report::Entity::find()
        .order_by_desc(financial_report::Column::GeneratedAt)
        .limit(page.limit)
        .offset(page.offset)
        .all(db)
        .await?)
}

pub async fn get_financial_report(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<financial_report::Model, WorkflowError> {
    financial_report::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found("financial report", id))
}

fn check_period(start: NaiveDate, end: NaiveDate) -> Result<(), WorkflowError> {
    if end < start {
        return Err(WorkflowError::validation(
            "period_end must not precede period_start",
        ));
    }
    if (end - start).num_days() > MAX_REPORT_DAYS {
        return Err(WorkflowError::validation(format!(
            "a report covers at most {MAX_REPORT_DAYS} days"
        )));
    }
    Ok(())
}

/// Half-open UTC range covering both period dates in full.
fn period_bounds(start: NaiveDate, end: NaiveDate) -> (DateTimeWithTimeZone, DateTimeWithTimeZone) {
    let from = start.and_time(NaiveTime::MIN).and_utc().fixed_offset();
    let until = (end + Duration::days(1))
        .and_time(NaiveTime::MIN)
        .and_utc()
        .fixed_offset();
    (from, until)
}

pub fn summarize(
    records: &[financial_record::Model],
    payouts: &[support_request::Model],
) -> PeriodTotals {
    let mut totals = PeriodTotals::default();
    for record in records {
        match record.record_type {
            RecordType::Income => totals.income += record.amount,
            RecordType::Expense => totals.expense += record.amount,
        }
    }
    totals.records = records.len() as u64;
    totals.support_paid = payouts.iter().map(|request| request.amount).sum();
    totals.support_payouts = payouts.len() as u64;
    totals
}

pub fn render_report(
    title: &str,
    period_start: NaiveDate,
    period_end: NaiveDate,
    totals: &PeriodTotals,
) -> String {
    let balance = totals.income - totals.expense;
    [
        title.to_string(),
        format!("Period: {period_start} to {period_end}"),
        String::new(),
        format!("Income: {}", money(totals.income)),
        format!("Expense: {}", money(totals.expense)),
        format!("Balance: {}", money(balance)),
        String::new(),
        format!(
            "Support paid: {} across {} request(s)",
            money(totals.support_paid),
            totals.support_payouts
        ),
        format!("Ledger entries: {}", totals.records),
    ]
    .join("\n")
}

fn money(amount: Decimal) -> String {
    let mut amount = amount.round_dp(2);
    amount.rescale(2);
    amount.to_string()
}

/// Time an employee spent on the payroll, read from their employment history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tenure {
    /// Earliest employment start; unknown without history
    pub arrival: Option<NaiveDate>,
    /// Latest end date, set only once every appointment has ended
    pub departure: Option<NaiveDate>,
}

impl Tenure {
    pub fn from_history<'a>(records: impl IntoIterator<Item = &'a employment_history::Model>) -> Self {
        let mut tenure = Self::default();
        let mut open = false;
        let mut seen = false;
        for record in records {
            seen = true;
            tenure.arrival = Some(match tenure.arrival {
                Some(arrival) => arrival.min(record.employment_start_date),
                None => record.employment_start_date,
            });
            match record.employment_end_date {
                Some(end) => tenure.departure = tenure.departure.max(Some(end)),
                None => open = true,
            }
        }
        if open || !seen {
            tenure.departure = None;
        }
        tenure
    }

    /// Still employed at the close of `day`.
    pub fn on_roll(&self, day: NaiveDate) -> bool {
        self.arrival.is_none_or(|arrival| arrival <= day)
            && self.departure.is_none_or(|departure| departure > day)
    }
}

fn within(day: Option<NaiveDate>, start: NaiveDate, end: NaiveDate) -> bool {
    day.is_some_and(|day| start <= day && day <= end)
}

/// Tenure of every employee that has employment history.
pub fn tenures(records: &[employment_history::Model]) -> BTreeMap<Uuid, Tenure> {
    let mut grouped: BTreeMap<Uuid, Vec<&employment_history::Model>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.employee_id).or_default().push(record);
    }
    grouped
        .into_iter()
        .map(|(employee_id, records)| (employee_id, Tenure::from_history(records)))
        .collect()
}

/// Membership counts of a workforce over a period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipFigures {
    pub workforce: u64,
    pub total_members: u64,
    pub new_members: u64,
    pub left_members: u64,
    pub membership_rate: Decimal,
}

pub fn membership_figures(
    employees: &[employee::Model],
    tenures: &BTreeMap<Uuid, Tenure>,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> MembershipFigures {
    let mut figures = MembershipFigures::default();
    for employee in employees {
        let tenure = tenures.get(&employee.id).copied().unwrap_or_default();
        let joined = employee.union_join_date;
        if tenure.on_roll(period_end) {
            figures.workforce += 1;
            if joined <= period_end {
                figures.total_members += 1;
            }
        }
        if within(Some(joined), period_start, period_end) {
            figures.new_members += 1;
        }
        if within(tenure.departure, period_start, period_end)
            && tenure.departure.is_some_and(|departure| joined <= departure)
        {
            figures.left_members += 1;
        }
    }
    figures.membership_rate = if figures.workforce == 0 {
        Decimal::ZERO
    } else {
        Decimal::from(figures.total_members * 100) / Decimal::from(figures.workforce)
    };
    figures.membership_rate = figures
        .membership_rate
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    figures.membership_rate.rescale(2);
    figures
}

async fn workforce(
    db: &impl ConnectionTrait,
    departments: Vec<Uuid>,
) -> Result<(Vec<employee::Model>, BTreeMap<Uuid, Tenure>), WorkflowError> {
    if departments.is_empty() {
        return Ok((Vec::new(), BTreeMap::new()));
    }
    let employees = employee::Entity::find()
        .filter(employee::Column::DepartmentId.is_in(departments))
        .order_by_asc(employee::Column::FullName)
        .all(db)
        .await?;
    if employees.is_empty() {
        return Ok((employees, BTreeMap::new()));
    }
    let history = employment_history::Entity::find()
        .filter(employment_history::Column::EmployeeId.is_in(employees.iter().map(|e| e.id)))
        .all(db)
        .await?;
    Ok((employees, tenures(&history)))
}

/// Stores the membership coverage of an organization's workforce over a period.
pub async fn generate_membership_report(
    db: &DatabaseConnection,
    request: MembershipReportRequest,
) -> Result<membership_report::Model, WorkflowError> {
    let title = validation::required_text(&request.title, "title", MAX_NAME_LEN)?;
    check_period(request.period_start, request.period_end)?;
    let organization = get_organization(db, request.organization_id).await?;

    let departments: Vec<Uuid> = department::Entity::find()
        .select_only()
        .column(department::Column::Id)
        .filter(department::Column::OrganizationId.eq(organization.id))
        .into_tuple()
        .all(db)
        .await?;
    let (employees, tenures) = workforce(db, departments).await?;
    let figures = membership_figures(&employees, &tenures, request.period_start, request.period_end);
    let content = render_membership(
        &title,
        &organization.name,
        request.period_start,
        request.period_end,
        &figures,
    );

    let report = membership_report::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        organization_id: Set(organization.id),
        period_start: Set(request.period_start),
        period_end: Set(request.period_end),
        total_members: Set(to_column(figures.total_members)?),
        new_members: Set(to_column(figures.new_members)?),
        left_members: Set(to_column(figures.left_members)?),
        membership_rate: Set(figures.membership_rate),
        content: Set(content),
        generated_by: Set(request.generated_by),
        generated_at: Set(now()),
    }
    .insert(db)
    .await?;

    info!(
        report_id = %report.id,
        organization_id = %organization.id,
        members = figures.total_members,
        workforce = figures.workforce,
        rate = %figures.membership_rate,
        "Membership report generated"
    );
    Ok(report)
}

pub async fn list_membership_reports(
    db: &DatabaseConnection,
    page: Page,
) -> Result<Vec<membership_report::Model>, WorkflowError> {
    Ok(membership_report::Entity::find()
        .order_by_desc(membership_report::Column::GeneratedAt)
        .limit(page.limit)
        .offset(page.offset)
        .all(db)
        .await?)
}

pub async fn get_membership_report(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<membership_report::Model, WorkflowError> {
    membership_report::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found("membership report", id))
}

pub fn render_membership(
    title: &str,
    organization: &str,
    period_start: NaiveDate,
    period_end: NaiveDate,
    figures: &MembershipFigures,
) -> String {
    [
        title.to_string(),
        format!("Organization: {organization}"),
        format!("Period: {period_start} to {period_end}"),
        String::new(),
        format!("Workforce at period end: {}", figures.workforce),
        format!("Union members: {}", figures.total_members),
        format!("Joined: {}", figures.new_members),
        format!("Left: {}", figures.left_members),
        format!("Membership rate: {}%", figures.membership_rate),
    ]
    .join("\n")
}

/// Stores who arrived in and who left a department over a period.
pub async fn generate_movement_report(
    db: &DatabaseConnection,
    request: MovementReportRequest,
) -> Result<MovementReportView, WorkflowError> {
    let title = validation::required_text(&request.title, "title", MAX_NAME_LEN)?;
    check_period(request.period_start, request.period_end)?;
    let department = get_department(db, request.department_id).await?;

    let (employees, tenures) = workforce(db, vec![department.id]).await?;
    let mut arrived = Vec::new();
    let mut left = Vec::new();
    for employee in &employees {
        let tenure = tenures.get(&employee.id).copied().unwrap_or_default();
        if within(tenure.arrival, request.period_start, request.period_end) {
            arrived.push(employee);
        }
        if within(tenure.departure, request.period_start, request.period_end) {
            left.push(employee);
        }
    }
    let content = render_movement(
        &title,
        &department.name,
        request.period_start,
        request.period_end,
        &arrived,
        &left,
    );

    let txn = db.begin().await?;
    let report = movement_report::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        department_id: Set(department.id),
        period_start: Set(request.period_start),
        period_end: Set(request.period_end),
        content: Set(content),
        generated_by: Set(request.generated_by),
        generated_at: Set(now()),
    }
    .insert(&txn)
    .await?;

    let entries: Vec<movement_report_entry::ActiveModel> = arrived
        .iter()
        .map(|employee| (employee.id, Movement::Arrived))
        .chain(left.iter().map(|employee| (employee.id, Movement::Left)))
        .map(|(employee_id, movement)| movement_report_entry::ActiveModel {
            id: Set(Uuid::new_v4()),
            report_id: Set(report.id),
            employee_id: Set(employee_id),
            movement: Set(movement),
        })
        .collect();
    if !entries.is_empty() {
        movement_report_entry::Entity::insert_many(entries)
            .exec_without_returning(&txn)
            .await?;
    }
    txn.commit().await?;

    info!(
        report_id = %report.id,
        department_id = %department.id,
        arrived = arrived.len(),
        left = left.len(),
        "Movement report generated"
    );
    Ok(MovementReportView {
        report,
        arrived: arrived.iter().map(|employee| employee.id).collect(),
        left: left.iter().map(|employee| employee.id).collect(),
    })
}

pub async fn list_movement_reports(
    db: &DatabaseConnection,
    page: Page,
) -> Result<Vec<movement_report::Model>, WorkflowError> {
    Ok(movement_report::Entity::find()
        .order_by_desc(movement_report::Column::GeneratedAt)
        .limit(page.limit)
        .offset(page.offset)
        .all(db)
        .await?)
}

pub async fn get_movement_report(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<MovementReportView, WorkflowError> {
    let report = movement_report::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| WorkflowError::not_found("movement report", id))?;
    let entries = movement_report_entry::Entity::find()
        .filter(movement_report_entry::Column::ReportId.eq(id))
        .all(db)
        .await?;
    let (arrived, left): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|entry| entry.movement == Movement::Arrived);
    Ok(MovementReportView {
        report,
        arrived: arrived.into_iter().map(|entry| entry.employee_id).collect(),
        left: left.into_iter().map(|entry| entry.employee_id).collect(),
    })
}

pub fn render_movement(
    title: &str,
    department: &str,
    period_start: NaiveDate,
    period_end: NaiveDate,
    arrived: &[&employee::Model],
    left: &[&employee::Model],
) -> String {
    let mut lines = vec![
        title.to_string(),
        format!("Department: {department}"),
        format!("Period: {period_start} to {period_end}"),
    ];
    for (heading, employees) in [("Arrived", arrived), ("Left", left)] {
        lines.push(String::new());
        lines.push(format!("{heading}: {}", employees.len()));
        lines.extend(
            employees
                .iter()
                .map(|employee| format!("  {} ({})", employee.full_name, employee.employee_number)),
        );
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    use crate::entities::enums::SupportReason;

    fn record(record_type: RecordType, cents: i64) -> financial_record::Model {
        financial_record::Model {
            id: Uuid::new_v4(),
            record_type,
            amount: Decimal::new(cents, 2),
            description: "entry".to_string(),
            related_request_id: None,
            created_by: Uuid::new_v4(),
            created_at: Utc::now().fixed_offset(),
        }
    }

    fn payout(cents: i64) -> support_request::Model {
        let at = Utc::now().fixed_offset();
        support_request::Model {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            requestor_id: Uuid::new_v4(),
            amount: Decimal::new(cents, 2),
            reason: SupportReason::ChildBirth,
            description: "Newborn".to_string(),
            status: SupportStatus::Paid,
            supporting_document: None,
            approver_id: Some(Uuid::new_v4()),
            approved_at: Some(at),
            payment_document: Some("pay-order-9".to_string()),
            paid_at: Some(at),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn totals_split_by_record_type() {
        let records = [
            record(RecordType::Income, 10_000),
            record(RecordType::Income, 2_550),
            record(RecordType::Expense, 5_000),
        ];
        let totals = summarize(&records, &[payout(5_000)]);
        assert_eq!(totals.income, Decimal::new(12_550, 2));
        assert_eq!(totals.expense, Decimal::new(5_000, 2));
        assert_eq!(totals.support_paid, Decimal::new(5_000, 2));
        assert_eq!(totals.support_payouts, 1);
        assert_eq!(totals.records, 3);
    }

    #[test]
    fn report_body_lists_balance() {
        let totals = PeriodTotals {
            income: Decimal::new(12_550, 2),
            expense: Decimal::from(50),
            support_paid: Decimal::from(50),
            support_payouts: 1,
            records: 3,
        };
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let body = render_report("Q1 2026", start, end, &totals);
        assert!(body.starts_with("Q1 2026\nPeriod: 2026-01-01 to 2026-03-31"));
        assert!(body.contains("Expense: 50.00"));
        assert!(body.contains("Balance: 75.50"));
        assert!(body.contains("across 1 request(s)"));
    }

    #[test]
    fn period_bounds_cover_last_day() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let (from, until) = period_bounds(day, day);
        assert_eq!((until - from).num_hours(), 24);
    }

    #[test]
    fn average_participation() {
        assert_eq!(average_percentage(Decimal::ZERO, 0), None);
        let average = average_percentage(Decimal::new(16_000, 2), 3).unwrap();
        assert_eq!(average.to_string(), "53.33");
    }

    #[test]
    fn status_counts_are_sorted() {
        let counts = status_counts(vec![
            (VotingStatus::Closed, 2),
            (VotingStatus::Draft, 1),
        ]);
        assert_eq!(counts[0].status, VotingStatus::Draft);
        assert_eq!(counts[1].count, 2);
    }

    fn day(year: i32, month: u32, date: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, date).unwrap()
    }

    fn staff(name: &str, department_id: Uuid, joined: NaiveDate) -> employee::Model {
        let at = Utc::now().fixed_offset();
        employee::Model {
            id: Uuid::new_v4(),
            department_id,
            employee_number: format!("T-{}", name.len()),
            full_name: name.to_string(),
            short_name: name.to_string(),
            date_of_birth: day(1980, 1, 1),
            union_ticket_number: format!("UT-{name}"),
            union_join_date: joined,
            status: EmployeeStatus::Active,
            created_at: at,
            updated_at: at,
        }
    }

    fn appointment(
        employee_id: Uuid,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> employment_history::Model {
        employment_history::Model {
            id: Uuid::new_v4(),
            employee_id,
            position_id: Uuid::new_v4(),
            appointment_date: start,
            rate: Decimal::ONE_HUNDRED,
            is_main_position: true,
            employment_start_date: start,
            employment_end_date: end,
        }
    }

    /// Four employees of one department over the first half of 2026:
    /// a long-standing member, a new member, a non-member and a member who left.
    fn half_year_staff() -> (Vec<employee::Model>, Vec<employment_history::Model>) {
        let department_id = Uuid::new_v4();
        let veteran = staff("Orlova", department_id, day(2010, 9, 1));
        let newcomer = staff("Belov", department_id, day(2026, 2, 1));
        let outsider = staff("Gromov", department_id, day(2026, 12, 1));
        let leaver = staff("Zueva", department_id, day(2012, 3, 1));
        let history = vec![
            appointment(veteran.id, day(2009, 1, 12), Some(day(2015, 6, 30))),
            appointment(veteran.id, day(2015, 7, 1), None),
            appointment(newcomer.id, day(2026, 1, 15), None),
            appointment(outsider.id, day(2020, 4, 1), None),
            appointment(leaver.id, day(2011, 2, 1), Some(day(2026, 3, 10))),
        ];
        (vec![veteran, newcomer, outsider, leaver], history)
    }

    #[test]
    fn tenure_follows_history() {
        let id = Uuid::new_v4();
        let moved = [
            appointment(id, day(2015, 7, 1), Some(day(2020, 1, 31))),
            appointment(id, day(2020, 2, 1), None),
        ];
        let tenure = Tenure::from_history(&moved);
        assert_eq!(tenure.arrival, Some(day(2015, 7, 1)));
        assert_eq!(tenure.departure, None);

        let ended = [
            appointment(id, day(2015, 7, 1), Some(day(2020, 1, 31))),
            appointment(id, day(2020, 2, 1), Some(day(2024, 8, 15))),
        ];
        let tenure = Tenure::from_history(&ended);
        assert_eq!(tenure.departure, Some(day(2024, 8, 15)));
        assert!(tenure.on_roll(day(2024, 8, 14)));
        assert!(!tenure.on_roll(day(2024, 8, 15)));
        assert!(!tenure.on_roll(day(2015, 6, 30)));

        assert_eq!(Tenure::from_history(&[]), Tenure::default());
        assert!(Tenure::default().on_roll(day(2026, 1, 1)));
    }

    #[test]
    fn membership_counts_over_half_year() {
        let (employees, history) = half_year_staff();
        let figures =
            membership_figures(&employees, &tenures(&history), day(2026, 1, 1), day(2026, 6, 30));
        assert_eq!(figures.workforce, 3);
        assert_eq!(figures.total_members, 2);
        assert_eq!(figures.new_members, 1);
        assert_eq!(figures.left_members, 1);
        assert_eq!(figures.membership_rate.to_string(), "66.67");
    }

    #[test]
    fn empty_workforce_has_zero_rate() {
        let figures = membership_figures(&[], &BTreeMap::new(), day(2026, 1, 1), day(2026, 6, 30));
        assert_eq!(figures.workforce, 0);
        assert_eq!(figures.membership_rate.to_string(), "0.00");
    }

    #[test]
    fn movement_body_names_employees() {
        let department_id = Uuid::new_v4();
        let arrived = staff("Belov", department_id, day(2026, 2, 1));
        let left = staff("Zueva", department_id, day(2012, 3, 1));
        let body = render_movement(
            "Physics, H1 2026",
            "Department of Physics",
            day(2026, 1, 1),
            day(2026, 6, 30),
            &[&arrived],
            &[&left],
        );
        assert!(body.contains("Department: Department of Physics"));
        assert!(body.contains("Arrived: 1\n  Belov (T-5)"));
        assert!(body.contains("Left: 1\n  Zueva (T-5)"));
    }

    #[tokio::test]
    async fn inverted_period_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let request = MembershipReportRequest {
            title: "H1 2026".to_string(),
            organization_id: Uuid::new_v4(),
            period_start: day(2026, 6, 30),
            period_end: day(2026, 1, 1),
            generated_by: Uuid::new_v4(),
        };
        let err = generate_membership_report(&db, request).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn membership_report_stores_figures() {
        let at = Utc::now().fixed_offset();
        let organization = crate::entities::organization::Model {
            id: Uuid::new_v4(),
            name: "State University".to_string(),
            short_name: "SU".to_string(),
            description: String::new(),
            created_at: at,
        };
        let (employees, history) = half_year_staff();
        let department_id = employees[0].department_id;
        let stored = membership_report::Model {
            id: Uuid::new_v4(),
            title: "H1 2026".to_string(),
            organization_id: organization.id,
            period_start: day(2026, 1, 1),
            period_end: day(2026, 6, 30),
            total_members: 2,
            new_members: 1,
            left_members: 1,
            membership_rate: Decimal::new(6667, 2),
            content: String::new(),
            generated_by: Uuid::new_v4(),
            generated_at: at,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![organization.clone()]])
            .append_query_results([vec![BTreeMap::from([("id", Value::from(department_id))])]])
            .append_query_results([employees])
            .append_query_results([history])
            .append_query_results([vec![stored.clone()]])
            .into_connection();
        let request = MembershipReportRequest {
            title: stored.title.clone(),
            organization_id: organization.id,
            period_start: stored.period_start,
            period_end: stored.period_end,
            generated_by: stored.generated_by,
        };
        let report = generate_membership_report(&db, request).await.unwrap();
        assert_eq!(report.id, stored.id);

        let log = db.into_transaction_log();
        let insert = log
            .iter()
            .flat_map(|transaction| transaction.statements())
            .find(|statement| statement.sql.starts_with(r#"INSERT INTO "membership_reports""#))
            .expect("membership report is written");
        let values = &insert.values.as_ref().expect("insert carries values").0;
        assert!(values.contains(&Value::from(Decimal::new(6667, 2))));
        assert!(values.contains(&Value::from(2i32)));
        assert!(values.contains(&Value::from(1i32)));
    }

    #[tokio::test]
    async fn movement_report_records_arrivals_and_departures() {
        let at = Utc::now().fixed_offset();
        let (employees, history) = half_year_staff();
        let department = department::Model {
            id: employees[0].department_id,
            organization_id: Uuid::new_v4(),
            name: "Department of Physics".to_string(),
            short_name: "Physics".to_string(),
            description: String::new(),
            created_at: at,
        };
        let stored = movement_report::Model {
            id: Uuid::new_v4(),
            title: "Physics, H1 2026".to_string(),
            department_id: department.id,
            period_start: day(2026, 1, 1),
            period_end: day(2026, 6, 30),
            content: String::new(),
            generated_by: Uuid::new_v4(),
            generated_at: at,
        };
        let newcomer = employees[1].id;
        let leaver = employees[3].id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![department.clone()]])
            .append_query_results([employees])
            .append_query_results([history])
            .append_query_results([vec![stored.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();
        let request = MovementReportRequest {
            title: stored.title.clone(),
            department_id: department.id,
            period_start: stored.period_start,
            period_end: stored.period_end,
            generated_by: stored.generated_by,
        };
        let view = generate_movement_report(&db, request).await.unwrap();
        assert_eq!(view.arrived, vec![newcomer]);
        assert_eq!(view.left, vec![leaver]);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains(r#"INSERT INTO \"movement_report_entries\""#));
    }
}

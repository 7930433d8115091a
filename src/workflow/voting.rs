use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::entities::enums::{VoteType, VotingKind, VotingStatus};
use crate::entities::{vote_option, vote_selection, voting};
use crate::error::WorkflowError;
use crate::validation;

const ENTITY: &str = "voting";

pub const MAX_OPTIONS: usize = 50;
pub const MAX_OPTION_TEXT_LEN: usize = 255;

/// True iff the voting is published and `now` falls inside its window, bounds inclusive.
pub fn is_active(voting: &voting::Model, now: DateTime<Utc>) -> bool {
    voting.status == VotingStatus::Active && voting.start_date <= now && now <= voting.end_date
}

/// draft → active, once the start date has been reached.
pub fn publish(voting: &voting::Model, now: DateTime<Utc>) -> Result<VotingStatus, WorkflowError> {
    if voting.status != VotingStatus::Draft {
        return Err(WorkflowError::invalid_transition(ENTITY, "publish", voting.status));
    }
    if now < voting.start_date {
        return Err(WorkflowError::PreconditionFailed(format!(
            "voting cannot be published before its start date {}",
            voting.start_date.to_rfc3339()
        )));
    }
    if now > voting.end_date {
        return Err(WorkflowError::OutOfWindow(format!(
            "voting window ended at {}",
            voting.end_date.to_rfc3339()
        )));
    }
    Ok(VotingStatus::Active)
}

/// active → closed.
pub fn close(voting: &voting::Model) -> Result<VotingStatus, WorkflowError> {
    if voting.status != VotingStatus::Active {
        return Err(WorkflowError::invalid_transition(ENTITY, "close", voting.status));
    }
    Ok(VotingStatus::Closed)
}

/// Ballots are only accepted while the voting is active.
pub fn ensure_accepting_ballots(
    voting: &voting::Model,
    now: DateTime<Utc>,
) -> Result<(), WorkflowError> {
    if is_active(voting, now) {
        return Ok(());
    }
    let reason = match voting.status {
        VotingStatus::Draft => "voting has not been published".to_string(),
        VotingStatus::Closed => "voting is closed".to_string(),
        VotingStatus::Active if now < voting.start_date => format!(
            "voting opens at {}",
            voting.start_date.to_rfc3339()
        ),
        VotingStatus::Active => format!("voting ended at {}", voting.end_date.to_rfc3339()),
    };
    Err(WorkflowError::OutOfWindow(reason))
}

/// An empty audience admits every member.
pub fn ensure_in_audience(audience: &[Uuid], voter_department: Uuid) -> Result<(), WorkflowError> {
    if audience.is_empty() || audience.contains(&voter_department) {
        return Ok(());
    }
    Err(WorkflowError::PreconditionFailed(
        "voter is not part of this voting's target audience".to_string(),
    ))
}

/// Checks the selected option ids against the ballot shape and returns them deduplicated.
pub fn validate_selection(
    vote_type: VoteType,
    options: &[vote_option::Model],
    selected: &[Uuid],
) -> Result<Vec<Uuid>, WorkflowError> {
    let unique: BTreeSet<Uuid> = selected.iter().copied().collect();
    if unique.is_empty() {
        return Err(WorkflowError::validation("at least one option must be selected"));
    }
    if unique.len() > 1 && vote_type != VoteType::Multiple {
        return Err(WorkflowError::validation(format!(
            "a {vote_type} voting accepts exactly one option"
        )));
    }
    if let Some(unknown) = unique
        .iter()
        .find(|id| !options.iter().any(|option| option.id == **id))
    {
        return Err(WorkflowError::validation(format!(
            "option {unknown} does not belong to this voting"
        )));
    }
    Ok(unique.into_iter().collect())
}

/// Validated input for a new voting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotingDraft {
    pub title: String,
    pub description: String,
    pub kind: VotingKind,
    pub vote_type: VoteType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub quorum_required: Option<Decimal>,
    pub options: Vec<String>,
    pub audience: Vec<Uuid>,
}

pub fn validate_draft(draft: VotingDraft) -> Result<VotingDraft, WorkflowError> {
    let title = validation::required_text(&draft.title, "title", validation::MAX_NAME_LEN)?;
    let description =
        validation::required_text(&draft.description, "description", validation::MAX_TEXT_LEN)?;

    if draft.end_date < draft.start_date {
        return Err(WorkflowError::validation(
            "end_date must not precede start_date",
        ));
    }

    let options = draft
        .options
        .iter()
        .map(|text| validation::required_text(text, "option text", MAX_OPTION_TEXT_LEN))
        .collect::<Result<Vec<_>, _>>()?;
    if options.len() < 2 {
        return Err(WorkflowError::validation("a voting needs at least two options"));
    }
    if options.len() > MAX_OPTIONS {
        return Err(WorkflowError::validation(format!(
            "a voting accepts at most {MAX_OPTIONS} options"
        )));
    }

    let quorum_required = draft
        .quorum_required
        .map(|value| validation::percentage(value, "quorum_required"))
        .transpose()?;
    match (draft.kind, quorum_required) {
        (VotingKind::Quorum, None) => {
            return Err(WorkflowError::validation(
                "quorum votings require quorum_required",
            ));
        }
        (VotingKind::Quorum, Some(value)) if value <= Decimal::ZERO => {
            return Err(WorkflowError::validation(
                "quorum_required must be greater than zero",
            ));
        }
        _ => {}
    }

    let audience: BTreeSet<Uuid> = draft.audience.iter().copied().collect();

    Ok(VotingDraft {
        title,
        description,
        quorum_required,
        options,
        audience: audience.into_iter().collect(),
        ..draft
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionCount {
    pub option_id: Uuid,
    pub text: String,
    pub order: i32,
    pub votes: u64,
}

/// Per-option vote counts. Scale votings also carry the mean score, where an
/// option's score is its `order`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tally {
    pub total_ballots: u64,
    pub options: Vec<OptionCount>,
    pub mean_score: Option<f64>,
}

pub fn tally(
    vote_type: VoteType,
    options: &[vote_option::Model],
    selections: &[vote_selection::Model],
    total_ballots: u64,
) -> Tally {
    let mut counts: HashMap<Uuid, u64> = HashMap::with_capacity(options.len());
    for selection in selections {
        *counts.entry(selection.option_id).or_default() += 1;
    }

    let mut ordered: Vec<&vote_option::Model> = options.iter().collect();
    ordered.sort_by_key(|option| option.order);

    let option_counts: Vec<OptionCount> = ordered
        .into_iter()
        .map(|option| OptionCount {
            option_id: option.id,
            text: option.text.clone(),
            order: option.order,
            votes: counts.get(&option.id).copied().unwrap_or(0),
        })
        .collect();

    let mean_score = match vote_type {
        VoteType::Scale => {
            let scored: u64 = option_counts.iter().map(|o| o.votes).sum();
            if scored == 0 {
                None
            } else {
                let sum: f64 = option_counts
                    .iter()
                    .map(|o| f64::from(o.order) * o.votes as f64)
                    .sum();
                Some(sum / scored as f64)
            }
        }
        VoteType::Single | VoteType::Multiple => None,
    };

    Tally {
        total_ballots,
        options: option_counts,
        mean_score,
    }
}

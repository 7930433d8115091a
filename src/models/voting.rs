use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::enums::{VoteType, VotingKind, VotingStatus};
use crate::entities::{quorum_voting_result, vote_option, voting};
use crate::workflow::voting::Tally;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingCreateRequest {
    pub title: String,
    pub description: String,
    pub kind: VotingKind,
    pub vote_type: VoteType,
    pub author_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub quorum_required: Option<Decimal>,
    pub options: Vec<String>,
    /// Departments allowed to vote; empty admits every member
    #[serde(default)]
    pub target_audience: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotRequest {
    pub voter_id: Uuid,
    pub option_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingView {
    #[serde(flatten)]
    pub voting: voting::Model,
    pub options: Vec<vote_option::Model>,
    pub target_audience: Vec<Uuid>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotReceipt {
    pub vote_id: Uuid,
    pub voting_id: Uuid,
    pub voter_id: Uuid,
    pub option_ids: Vec<Uuid>,
    pub cast_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedVotingView {
    #[serde(flatten)]
    pub voting: voting::Model,
    pub quorum_result: Option<quorum_voting_result::Model>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VotingResultsView {
    pub voting_id: Uuid,
    pub status: VotingStatus,
    pub tally: Tally,
    pub quorum_result: Option<quorum_voting_result::Model>,
}

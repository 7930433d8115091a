//! A vote put to members, with its lifecycle status and eligibility window.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::{VoteType, VotingKind, VotingStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "votings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub kind: VotingKind,
    pub vote_type: VoteType,
    pub status: VotingStatus,
    pub author_id: Uuid,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    /// Minimum participation in percent; required for quorum votings
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub quorum_required: Option<Decimal>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vote_option::Entity")]
    VoteOption,
    #[sea_orm(has_many = "super::vote::Entity")]
    Vote,
    #[sea_orm(has_many = "super::voting_audience::Entity")]
    VotingAudience,
    #[sea_orm(has_one = "super::quorum_voting_result::Entity")]
    QuorumVotingResult,
}

impl Related<super::vote_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoteOption.def()
    }
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vote.def()
    }
}

impl Related<super::voting_audience::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VotingAudience.def()
    }
}

impl Related<super::quorum_voting_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuorumVotingResult.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

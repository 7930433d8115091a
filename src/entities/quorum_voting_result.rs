//! Snapshot of quorum arithmetic taken when a quorum voting closes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quorum_voting_results")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub voting_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub quorum_percentage: Decimal,
    /// Ballots cast
    pub total_voters: i32,
    /// Ballots needed to meet the quorum
    pub required_voters: i32,
    pub is_quorum_reached: bool,
    pub decision_made: bool,
    #[sea_orm(column_type = "Text")]
    pub decision_description: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::voting::Entity",
        from = "Column::VotingId",
        to = "super::voting::Column::Id"
    )]
    Voting,
}

impl Related<super::voting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Voting.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

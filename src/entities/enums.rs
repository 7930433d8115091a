//! Closed choice sets persisted as short strings.

use std::fmt;

use sea_orm::ActiveEnum;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

macro_rules! display_as_value {
    ($($name:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.to_value())
                }
            }
        )+
    };
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "retired")]
    Retired,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum SupportStatus {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "reviewing")]
    Reviewing,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl SupportStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Paid | Self::Cancelled)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum SupportReason {
    #[sea_orm(string_value = "material_aid")]
    MaterialAid,
    #[sea_orm(string_value = "child_birth")]
    ChildBirth,
    #[sea_orm(string_value = "illness")]
    Illness,
    #[sea_orm(string_value = "death")]
    Death,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// How a voting is conducted. Only `Quorum` votings produce a quorum result.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum VotingKind {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "anonymous")]
    Anonymous,
    #[sea_orm(string_value = "quorum")]
    Quorum,
}

/// Shape of a single ballot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    #[sea_orm(string_value = "single")]
    Single,
    #[sea_orm(string_value = "multiple")]
    Multiple,
    #[sea_orm(string_value = "scale")]
    Scale,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum VotingStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "closed")]
    Closed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum OpinionStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "reviewing")]
    Reviewing,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Benefit category of an employee's child.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum,
    Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum DisabilityStatus {
    #[default]
    #[sea_orm(string_value = "none")]
    None,
    #[sea_orm(string_value = "disability")]
    Disability,
    #[sea_orm(string_value = "multichild")]
    Multichild,
    #[sea_orm(string_value = "other")]
    Other,
}

/// Direction of a staff movement in a department report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum Movement {
    #[sea_orm(string_value = "arrived")]
    Arrived,
    #[sea_orm(string_value = "left")]
    Left,
}

display_as_value!(
    EmployeeStatus,
    SupportStatus,
    SupportReason,
    RecordType,
    VotingKind,
    VoteType,
    VotingStatus,
    OpinionStatus,
    DisabilityStatus,
    Movement,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_support_states() {
        assert!(SupportStatus::Paid.is_terminal());
        assert!(SupportStatus::Rejected.is_terminal());
        assert!(SupportStatus::Cancelled.is_terminal());
        assert!(!SupportStatus::Approved.is_terminal());
        assert!(!SupportStatus::Created.is_terminal());
    }

    #[test]
    fn display_matches_stored_value() {
        assert_eq!(SupportReason::ChildBirth.to_string(), "child_birth");
        assert_eq!(VotingStatus::Closed.to_string(), "closed");
        assert_eq!(DisabilityStatus::default().to_string(), "none");
        assert_eq!(Movement::Left.to_string(), "left");
        assert_eq!(
            serde_json::to_string(&SupportReason::MaterialAid).unwrap(),
            "\"material_aid\""
        );
    }
}

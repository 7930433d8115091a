use crate::entities::enums::OpinionStatus;
use crate::error::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpinionAction {
    Submit,
    Review,
    Approve,
    Reject,
}

impl OpinionAction {
    pub fn verb(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Review => "review",
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

/// draft → submitted → reviewing → approved | rejected
pub fn next_status(
    current: OpinionStatus,
    action: OpinionAction,
) -> Result<OpinionStatus, WorkflowError> {
    use OpinionAction as A;
    use OpinionStatus as S;

    match (current, action) {
        (S::Draft, A::Submit) => Ok(S::Submitted),
        (S::Submitted, A::Review) => Ok(S::Reviewing),
        (S::Reviewing, A::Approve) => Ok(S::Approved),
        (S::Reviewing, A::Reject) => Ok(S::Rejected),
        (from, action) => Err(WorkflowError::invalid_transition(
            "motivated opinion",
            action.verb(),
            from,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opinion_lifecycle() {
        let submitted = next_status(OpinionStatus::Draft, OpinionAction::Submit).unwrap();
        let reviewing = next_status(submitted, OpinionAction::Review).unwrap();
        assert_eq!(
            next_status(reviewing, OpinionAction::Approve).unwrap(),
            OpinionStatus::Approved
        );
        assert_eq!(
            next_status(reviewing, OpinionAction::Reject).unwrap(),
            OpinionStatus::Rejected
        );
    }

    #[test]
    fn cannot_skip_review() {
        assert!(next_status(OpinionStatus::Submitted, OpinionAction::Approve).is_err());
        assert!(next_status(OpinionStatus::Draft, OpinionAction::Review).is_err());
        assert!(next_status(OpinionStatus::Approved, OpinionAction::Reject).is_err());
    }
}

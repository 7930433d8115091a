use rust_decimal::Decimal;

use crate::entities::enums::SupportStatus;
use crate::error::WorkflowError;
use crate::validation;

const ENTITY: &str = "support request";

/// Largest amount a single request may ask for; bounded by the column scale.
pub const MAX_SUPPORT_AMOUNT: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 0);
pub const MAX_FEE_AMOUNT: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportAction {
    Review,
    Approve,
    Reject,
    Pay,
    Cancel,
}

impl SupportAction {
    #[cfg(test)]
    pub const ALL: [SupportAction; 5] = [
        SupportAction::Review,
        SupportAction::Approve,
        SupportAction::Reject,
        SupportAction::Pay,
        SupportAction::Cancel,
    ];

    pub fn verb(self) -> &'static str {
        match self {
            Self::Review => "send to review",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Pay => "mark paid",
            Self::Cancel => "cancel",
        }
    }
}

/// Resolves the status reached by applying `action` in `current`.
///
/// The table is closed: any pair not listed is an invalid transition, which
/// also makes every transition non-repeatable.
pub fn next_status(
    current: SupportStatus,
    action: SupportAction,
) -> Result<SupportStatus, WorkflowError> {
    use SupportAction as A;
    use SupportStatus as S;

    let next = match (current, action) {
        (S::Created, A::Review) => S::Reviewing,
        (S::Reviewing, A::Approve) => S::Approved,
        (S::Reviewing, A::Reject) => S::Rejected,
        (S::Approved, A::Pay) => S::Paid,
        (S::Created | S::Reviewing | S::Approved, A::Cancel) => S::Cancelled,
        (from, action) => {
            return Err(WorkflowError::invalid_transition(ENTITY, action.verb(), from));
        }
    };
    assert!(next != current, "Transitions must change status");
    Ok(next)
}

/// Validated input for a new support request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportSubmission {
    pub amount: Decimal,
    pub description: String,
    pub supporting_document: Option<String>,
}

pub fn validate_submission(
    amount: Decimal,
    description: &str,
    supporting_document: Option<&str>,
) -> Result<SupportSubmission, WorkflowError> {
    let amount = validation::money(amount, "amount", MAX_SUPPORT_AMOUNT)?;
    let description = validation::required_text(description, "description", validation::MAX_TEXT_LEN)?;
    let supporting_document = validation::document_reference(supporting_document)?;
    Ok(SupportSubmission {
        amount,
        description,
        supporting_document,
    })
}

/// A request can only be paid against an attached payment order.
pub fn require_payment_document(document: Option<&str>) -> Result<String, WorkflowError> {
    validation::document_reference(document)?.ok_or_else(|| {
        WorkflowError::PreconditionFailed(
            "a payment document must be attached before marking the request paid".to_string(),
        )
    })
}

/// Paying an already paid membership fee is rejected like any repeated transition.
pub fn ensure_fee_unpaid(already_paid: bool) -> Result<(), WorkflowError> {
    if already_paid {
        return Err(WorkflowError::invalid_transition("membership fee", "pay", "paid"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn happy_path_reaches_paid() {
        let mut status = SupportStatus::Created;
        for action in [SupportAction::Review, SupportAction::Approve, SupportAction::Pay] {
            status = next_status(status, action).expect("transition allowed");
        }
        assert_eq!(status, SupportStatus::Paid);
    }

    #[test]
    fn approve_requires_review() {
        let err = next_status(SupportStatus::Created, SupportAction::Approve).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[test]
    fn transitions_are_not_repeatable() {
        for status in SupportStatus::iter() {
            for action in SupportAction::ALL {
                if let Ok(next) = next_status(status, action) {
                    assert!(
                        next_status(next, action).is_err(),
                        "{action:?} applied twice from {status}"
                    );
                }
            }
        }
    }

    #[test]
    fn cancel_only_from_open_states() {
        for status in SupportStatus::iter() {
            let result = next_status(status, SupportAction::Cancel);
            assert_eq!(result.is_ok(), !status.is_terminal(), "cancel from {status}");
        }
    }

    #[test]
    fn paid_is_only_reachable_through_approved() {
        // Walk every action sequence up to six steps and record the status
        // observed immediately before each transition into `paid`.
        let mut frontier = vec![vec![SupportStatus::Created]];
        for _ in 0..6 {
            let mut next_frontier = Vec::new();
            for path in &frontier {
                let current = *path.last().unwrap();
                for action in SupportAction::ALL {
                    if let Ok(next) = next_status(current, action) {
                        if next == SupportStatus::Paid {
                            assert_eq!(current, SupportStatus::Approved);
                            assert!(path.contains(&SupportStatus::Reviewing));
                        }
                        let mut extended = path.clone();
                        extended.push(next);
                        next_frontier.push(extended);
                    }
                }
            }
            frontier = next_frontier;
        }
    }

    #[test]
    fn negative_amount_is_rejected() {
        let err = validate_submission(Decimal::from(-5), "burst pipe", None).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn blank_description_is_rejected() {
        assert!(validate_submission(Decimal::from(100), "  ", None).is_err());
    }

    #[test]
    fn payment_document_is_required() {
        let err = require_payment_document(Some("  ")).unwrap_err();
        assert!(matches!(err, WorkflowError::PreconditionFailed(_)));
        assert_eq!(
            require_payment_document(Some("docs/pp-42.pdf")).unwrap(),
            "docs/pp-42.pdf"
        );
    }

    #[test]
    fn fee_cannot_be_paid_twice() {
        assert!(ensure_fee_unpaid(false).is_ok());
        assert!(matches!(
            ensure_fee_unpaid(true),
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }
}

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Failure of a registry or workflow operation. Every variant is reported
/// to the caller; nothing is retried on its behalf.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),
    #[error("cannot {action} {entity} in state '{from}'")]
    InvalidTransition {
        entity: &'static str,
        action: &'static str,
        from: String,
    },
    #[error("voter has already cast a ballot in this voting")]
    DuplicateVote,
    #[error("{0}")]
    OutOfWindow(String),
    #[error("{0}")]
    PreconditionFailed(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("storage failure: {0}")]
    Database(#[from] DbErr),
}

impl WorkflowError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_transition(
        entity: &'static str,
        action: &'static str,
        from: impl ToString,
    ) -> Self {
        Self::InvalidTransition {
            entity,
            action,
            from: from.to_string(),
        }
    }
}

/// True when the database rejected a write because of a unique index.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// True when the write tripped the named unique index. Errors the driver
/// does not classify are matched on the index name in the message.
pub fn violates_unique_index(err: &DbErr, index: &str) -> bool {
    assert!(!index.is_empty(), "Index name must not be empty");
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => message.contains(index),
        _ => err.to_string().contains(index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_message_names_state() {
        let err = WorkflowError::invalid_transition("support request", "approve", "created");
        assert_eq!(
            err.to_string(),
            "cannot approve support request in state 'created'"
        );
    }

    #[test]
    fn plain_db_error_is_not_unique_violation() {
        let err = DbErr::Custom("boom".to_string());
        assert!(!is_unique_violation(&err));
        assert!(!violates_unique_index(&err, "uq_votes_voting_voter"));
    }

    #[test]
    fn named_index_is_recognized() {
        let err = DbErr::Query(sea_orm::RuntimeErr::Internal(
            "duplicate key value violates unique constraint \"uq_votes_voting_voter\"".to_string(),
        ));
        assert!(violates_unique_index(&err, "uq_votes_voting_voter"));
        assert!(!violates_unique_index(&err, "uq_membership_fees_employee_period"));
    }
}

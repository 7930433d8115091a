//! Persistence for the member registry and its workflows.
//!
//! Every state change runs inside a database transaction that re-reads the
//! row, resolves the next state through [`crate::workflow`] and writes it
//! back with a conditional `UPDATE ... WHERE status = <observed>`. A write
//! that matches no row lost a race against a concurrent transition and is
//! reported as [`WorkflowError::InvalidTransition`].

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::error::WorkflowError;

pub mod finance;
pub mod members;
pub mod news;
pub mod protocols;
pub mod reports;
pub mod voting;

/// Bounded window into a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    pub fn new(limit: u64, offset: u64) -> Self {
        assert!(limit > 0, "Page limit must be positive");
        assert!(offset <= i64::MAX as u64, "Page offset exceeds database bounds");
        Self { limit, offset }
    }
}

pub(crate) fn now() -> DateTimeWithTimeZone {
    Utc::now().fixed_offset()
}

/// Rejects a conditional update that matched no row.
pub(crate) fn ensure_applied(
    rows_affected: u64,
    entity: &'static str,
    action: &'static str,
    observed: impl ToString,
) -> Result<(), WorkflowError> {
    assert!(rows_affected <= 1, "Conditional update touched several rows");
    if rows_affected == 0 {
        return Err(WorkflowError::invalid_transition(entity, action, observed));
    }
    Ok(())
}

pub(crate) fn count_to_u64(count: i64) -> u64 {
    assert!(count >= 0, "Row counts are never negative");
    count as u64
}

/// Narrows a count to the `INTEGER` columns reports are stored in.
pub(crate) fn to_column(count: u64) -> Result<i32, WorkflowError> {
    i32::try_from(count)
        .map_err(|_| WorkflowError::validation(format!("count {count} exceeds storage bounds")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_update_is_invalid_transition() {
        let err = ensure_applied(0, "support request", "approve", "reviewing").unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
        assert!(ensure_applied(1, "support request", "approve", "reviewing").is_ok());
    }

    #[test]
    fn oversized_count_is_rejected() {
        assert_eq!(to_column(42).unwrap(), 42);
        assert!(matches!(
            to_column(u64::from(u32::MAX)),
            Err(WorkflowError::Validation(_))
        ));
    }
}

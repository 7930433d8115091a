//! Status machines for support requests, votings and motivated opinions.
//!
//! Everything here is pure: functions take the current record state plus
//! the caller's clock reading and either return the next state or a
//! [`WorkflowError`](crate::error::WorkflowError). Persisting the outcome
//! with a conditional write is the job of [`crate::store`].

pub mod financial;
pub mod opinion;
pub mod quorum;
pub mod voting;

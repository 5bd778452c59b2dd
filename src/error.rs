use thiserror::Error;

use crate::filter::FilterError;

/// Request-level failures the operations report back to the caller.
#[derive(Debug, Error)]
pub enum DeskError {
    #[error("branch_id is required")]
    MissingBranch,

    #[error("owner (branch name) is required")]
    MissingOwner,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("role '{role}' may not {action}")]
    Forbidden { role: String, action: &'static str },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: i64 },

    #[error(transparent)]
    Filter(#[from] FilterError),
}

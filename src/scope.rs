use serde::{Deserialize, Serialize};

use crate::error::DeskError;

/// How operations treat a missing branch or owner scope.
///
/// One policy applies to every scoped operation: either the scope is
/// required, or a missing scope falls back to `default_branch` (and with no
/// default, the operation runs across all branches).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScopePolicy {
    pub require_branch: bool,
    pub default_branch: Option<i64>,
}

impl Default for ScopePolicy {
    fn default() -> Self {
        ScopePolicy {
            require_branch: true,
            default_branch: None,
        }
    }
}

impl ScopePolicy {
    /// Resolve the branch a read is restricted to. `None` means all branches.
    pub fn branch(&self, requested: Option<i64>) -> Result<Option<i64>, DeskError> {
        match requested {
            Some(id) => Ok(Some(id)),
            None if self.require_branch => Err(DeskError::MissingBranch),
            None => Ok(self.default_branch),
        }
    }

    /// Resolve a branch for operations that need exactly one branch
    /// (targets, trends, new tasks).
    pub fn concrete_branch(&self, requested: Option<i64>) -> Result<i64, DeskError> {
        self.branch(requested)?.ok_or(DeskError::MissingBranch)
    }

    /// Resolve the task owner (branch name). Blank counts as missing.
    pub fn owner(&self, requested: Option<&str>) -> Result<Option<String>, DeskError> {
        match requested.map(str::trim).filter(|o| !o.is_empty()) {
            Some(owner) => Ok(Some(owner.to_string())),
            None if self.require_branch => Err(DeskError::MissingOwner),
            None => Ok(None),
        }
    }
}

/// Allow an editing action only for `editor_role`.
pub fn require_role(role: &str, editor_role: &str, action: &'static str) -> Result<(), DeskError> {
    if role.trim() == editor_role {
        Ok(())
    } else {
        Err(DeskError::Forbidden {
            role: role.to_string(),
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_editor_role_passes() {
        assert!(require_role("head_of_department", "head_of_department", "add posts").is_ok());
        assert!(require_role(" head_of_department ", "head_of_department", "add posts").is_ok());
        assert!(matches!(
            require_role("staff", "head_of_department", "add posts"),
            Err(DeskError::Forbidden { action: "add posts", .. })
        ));
    }

    #[test]
    fn required_scope_rejects_missing_branch() {
        let policy = ScopePolicy::default();
        assert_eq!(policy.branch(Some(3)).unwrap(), Some(3));
        assert!(matches!(policy.branch(None), Err(DeskError::MissingBranch)));
        assert!(matches!(policy.owner(Some("  ")), Err(DeskError::MissingOwner)));
    }

    #[test]
    fn optional_scope_falls_back() {
        let policy = ScopePolicy {
            require_branch: false,
            default_branch: Some(7),
        };
        assert_eq!(policy.branch(None).unwrap(), Some(7));
        assert_eq!(policy.concrete_branch(None).unwrap(), 7);

        let open = ScopePolicy {
            require_branch: false,
            default_branch: None,
        };
        assert_eq!(open.branch(None).unwrap(), None);
        assert!(matches!(open.concrete_branch(None), Err(DeskError::MissingBranch)));
        assert_eq!(open.owner(None).unwrap(), None);
        assert_eq!(open.owner(Some(" North ")).unwrap().as_deref(), Some("North"));
    }
}

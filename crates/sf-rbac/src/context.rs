//! RBAC context snapshot fetched from the backend

use crate::action::ActionSet;
use serde::{Deserialize, Serialize};

/// Journal restrictions attached to an RBAC context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalScope {
    /// Whether the backend filters data by journal
    pub enforcement_enabled: bool,
    /// Journals the user may see when enforcement is on
    pub allowed_journal_ids: Vec<String>,
    /// Admins bypass journal scoping
    pub is_admin: bool,
}

impl JournalScope {
    /// Whether data from `journal_id` is visible under this scope
    #[must_use]
    pub fn permits(&self, journal_id: &str) -> bool {
        if !self.enforcement_enabled || self.is_admin {
            return true;
        }
        let journal_id = journal_id.trim();
        self.allowed_journal_ids
            .iter()
            .any(|allowed| allowed.trim() == journal_id)
    }

    /// Scoped, non-admin and without a single journal
    #[inline]
    #[must_use]
    pub fn is_locked_out(&self) -> bool {
        self.enforcement_enabled && !self.is_admin && self.allowed_journal_ids.is_empty()
    }
}

/// Server-issued snapshot of a user's permitted actions
///
/// Read-only input: it is recreated by the backend on every request and is
/// never mutated client-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RbacContext {
    /// Backend user id
    pub user_id: String,
    /// Roles as assigned
    pub roles: Vec<String>,
    /// Roles after backend normalization (aliases folded)
    pub normalized_roles: Vec<String>,
    /// Granted action tokens
    pub allowed_actions: ActionSet,
    /// Journal restrictions
    pub journal_scope: JournalScope,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;

    #[test]
    fn deserializes_backend_payload() {
        let json = r#"{
            "user_id": "u-7",
            "roles": ["managing_editor"],
            "normalized_roles": ["managing_editor"],
            "allowed_actions": ["process:view", "decision:record_first", "unknown:thing"],
            "journal_scope": {
                "enforcement_enabled": true,
                "allowed_journal_ids": ["j-1"],
                "is_admin": false
            }
        }"#;
        let ctx: RbacContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.user_id, "u-7");
        assert!(ctx.allowed_actions.contains(Action::ProcessView));
        assert!(!ctx.allowed_actions.contains(Action::DecisionSubmitFinal));
        assert_eq!(ctx.journal_scope.allowed_journal_ids, vec!["j-1".to_string()]);
    }

    #[test]
    fn null_action_list_grants_nothing() {
        let ctx: RbacContext =
            serde_json::from_str(r#"{"user_id":"u-1","allowed_actions":null}"#).unwrap();
        assert_eq!(ctx.allowed_actions, ActionSet::empty());
    }

    #[test]
    fn missing_fields_default() {
        let ctx: RbacContext = serde_json::from_str(r#"{"user_id":"u-1"}"#).unwrap();
        assert_eq!(ctx.allowed_actions, ActionSet::empty());
        assert!(!ctx.journal_scope.enforcement_enabled);
    }

    #[test]
    fn journal_scope_permits() {
        let scope = JournalScope {
            enforcement_enabled: true,
            allowed_journal_ids: vec!["j-1".into()],
            is_admin: false,
        };
        assert!(scope.permits(" j-1 "));
        assert!(!scope.permits("j-2"));

        let admin = JournalScope { is_admin: true, ..scope.clone() };
        assert!(admin.permits("j-2"));

        let open = JournalScope { enforcement_enabled: false, ..scope };
        assert!(open.permits("anything"));
    }
}

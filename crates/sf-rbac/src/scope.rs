//! Journal-scope hint shown next to empty lists

use crate::context::RbacContext;

/// Explanation shown when journal scoping hides every manuscript
pub const EMPTY_JOURNAL_SCOPE_HINT: &str = "Journal scope enforcement is enabled and no journal \
     is assigned to your account, so lists may appear empty. Ask an administrator to grant \
     access to at least one journal.";

/// Explain why a scoped list is empty
///
/// Only returns a hint for a non-admin under enforced scope with no allowed
/// journals; admins and unscoped users never get one.
#[must_use]
pub fn scope_hint(context: Option<&RbacContext>) -> Option<&'static str> {
    let scope = &context?.journal_scope;
    scope.is_locked_out().then_some(EMPTY_JOURNAL_SCOPE_HINT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::JournalScope;

    fn with_scope(enforcement_enabled: bool, is_admin: bool, journals: &[&str]) -> RbacContext {
        RbacContext {
            journal_scope: JournalScope {
                enforcement_enabled,
                allowed_journal_ids: journals.iter().map(|j| (*j).to_string()).collect(),
                is_admin,
            },
            ..RbacContext::default()
        }
    }

    #[test]
    fn hint_when_scoped_without_journals() {
        let hint = scope_hint(Some(&with_scope(true, false, &[]))).unwrap();
        assert!(hint.to_lowercase().contains("journal"));
    }

    #[test]
    fn no_hint_for_admin() {
        assert!(scope_hint(Some(&with_scope(true, true, &[]))).is_none());
    }

    #[test]
    fn no_hint_when_enforcement_disabled() {
        assert!(scope_hint(Some(&with_scope(false, false, &[]))).is_none());
    }

    #[test]
    fn no_hint_with_allowed_journals() {
        assert!(scope_hint(Some(&with_scope(true, false, &["j-1"]))).is_none());
    }

    #[test]
    fn no_hint_without_context() {
        assert!(scope_hint(None).is_none());
    }
}

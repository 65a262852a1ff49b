//! Action tokens issued by the backend
//!
//! The backend grants editorial permissions as string tokens such as
//! `process:view`. They are parsed into the closed [`Action`] enum, with the
//! `*` token represented by [`Grant::All`] / [`ActionSet::All`].

use crate::error::RbacError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Wire token granting every action
pub const WILDCARD_TOKEN: &str = "*";

/// Editorial action the backend may grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// See the manuscripts-in-process board
    ProcessView,
    /// Open a manuscript's detail page
    ManuscriptViewDetail,
    /// Bind an owning editor to a manuscript
    ManuscriptBindOwner,
    /// Assign an assistant editor
    ManuscriptAssignAssistantEditor,
    /// Invite reviewers
    ReviewerInvite,
    /// Manage reviewer assignments
    ReviewerManage,
    /// Record a first-round decision
    DecisionRecordFirst,
    /// Submit a final decision
    DecisionSubmitFinal,
    /// Override the article processing charge
    InvoiceOverrideApc,
    /// Confirm an invoice as paid
    InvoiceConfirmPaid,
    /// Run production tasks
    ProductionManage,
    /// Manage user accounts
    UserManage,
}

impl Action {
    /// Every known action
    pub const ALL: [Action; 12] = [
        Action::ProcessView,
        Action::ManuscriptViewDetail,
        Action::ManuscriptBindOwner,
        Action::ManuscriptAssignAssistantEditor,
        Action::ReviewerInvite,
        Action::ReviewerManage,
        Action::DecisionRecordFirst,
        Action::DecisionSubmitFinal,
        Action::InvoiceOverrideApc,
        Action::InvoiceConfirmPaid,
        Action::ProductionManage,
        Action::UserManage,
    ];

    /// Canonical wire token
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::ProcessView => "process:view",
            Action::ManuscriptViewDetail => "manuscript:view_detail",
            Action::ManuscriptBindOwner => "manuscript:bind_owner",
            Action::ManuscriptAssignAssistantEditor => "manuscript:assign_ae",
            Action::ReviewerInvite => "reviewer:invite",
            Action::ReviewerManage => "reviewer:manage",
            Action::DecisionRecordFirst => "decision:record_first",
            Action::DecisionSubmitFinal => "decision:submit_final",
            Action::InvoiceOverrideApc => "invoice:override_apc",
            Action::InvoiceConfirmPaid => "invoice:confirm_paid",
            Action::ProductionManage => "production:manage",
            Action::UserManage => "user:manage",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = RbacError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let token = value.trim();
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == token)
            .ok_or_else(|| RbacError::UnknownAction(token.to_string()))
    }
}

/// A single parsed grant token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grant {
    /// The `*` wildcard
    All,
    /// One specific action
    Action(Action),
}

impl FromStr for Grant {
    type Err = RbacError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim() == WILDCARD_TOKEN {
            return Ok(Grant::All);
        }
        value.parse().map(Grant::Action)
    }
}

/// Set of actions granted to a user
///
/// Deserializes from the backend's `allowed_actions` token list. Tokens this
/// client does not know are skipped, so a newer backend never breaks an
/// older client; they simply grant nothing here. A `null` list grants
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Vec<String>>", into = "Vec<String>")]
pub enum ActionSet {
    /// Wildcard grant: every action, including ones added later
    All,
    /// Explicit grants
    Only(BTreeSet<Action>),
}

impl ActionSet {
    /// Set granting nothing
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        ActionSet::Only(BTreeSet::new())
    }

    /// Parse a token list, skipping unknown tokens
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut actions = BTreeSet::new();
        for token in tokens {
            match token.as_ref().parse::<Grant>() {
                Ok(Grant::All) => return ActionSet::All,
                Ok(Grant::Action(action)) => {
                    actions.insert(action);
                }
                Err(err) => tracing::debug!(error = %err, "skipping action token"),
            }
        }
        ActionSet::Only(actions)
    }

    /// Whether the wildcard was granted
    #[inline]
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, ActionSet::All)
    }

    /// Whether `action` is granted
    #[must_use]
    pub fn contains(&self, action: Action) -> bool {
        match self {
            ActionSet::All => true,
            ActionSet::Only(actions) => actions.contains(&action),
        }
    }

    /// Whether at least one of `actions` is granted
    #[must_use]
    pub fn contains_any(&self, actions: &[Action]) -> bool {
        actions.iter().any(|action| self.contains(*action))
    }

    /// Wire tokens for this set
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        match self {
            ActionSet::All => vec![WILDCARD_TOKEN.to_string()],
            ActionSet::Only(actions) => actions.iter().map(|a| a.as_str().to_string()).collect(),
        }
    }
}

impl Default for ActionSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<String>> for ActionSet {
    fn from(tokens: Vec<String>) -> Self {
        ActionSet::from_tokens(tokens)
    }
}

impl From<Option<Vec<String>>> for ActionSet {
    fn from(tokens: Option<Vec<String>>) -> Self {
        tokens.map_or_else(ActionSet::empty, ActionSet::from)
    }
}

impl From<ActionSet> for Vec<String> {
    fn from(set: ActionSet) -> Self {
        set.tokens()
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<T: IntoIterator<Item = Action>>(iter: T) -> Self {
        ActionSet::Only(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_string_roundtrip() {
        for action in Action::ALL {
            let token = action.as_str();
            assert_eq!(token.parse::<Action>().ok(), Some(action));
            assert_eq!(action.to_string(), token);
        }
    }

    #[test]
    fn action_from_str_invalid() {
        let err = "process:delete".parse::<Action>().unwrap_err();
        assert!(matches!(err, RbacError::UnknownAction(ref t) if t == "process:delete"));
    }

    #[test]
    fn grant_parses_wildcard() {
        assert_eq!(" * ".parse::<Grant>().unwrap(), Grant::All);
        assert_eq!(
            "decision:submit_final".parse::<Grant>().unwrap(),
            Grant::Action(Action::DecisionSubmitFinal)
        );
    }

    #[test]
    fn action_set_skips_unknown_tokens() {
        let set = ActionSet::from_tokens(["process:view", "journal:archive", ""]);
        assert_eq!(set, [Action::ProcessView].into_iter().collect());
    }

    #[test]
    fn action_set_wildcard_wins() {
        let set = ActionSet::from_tokens(["process:view", "*"]);
        assert!(set.is_all());
        assert!(set.contains(Action::UserManage));
        assert_eq!(set.tokens(), vec!["*".to_string()]);
    }

    #[test]
    fn action_set_contains_any() {
        let set = ActionSet::from_tokens(["reviewer:manage"]);
        assert!(set.contains_any(&[Action::ReviewerInvite, Action::ReviewerManage]));
        assert!(!set.contains_any(&[Action::ReviewerInvite]));
        assert!(!ActionSet::empty().contains_any(&Action::ALL));
    }

    #[test]
    fn action_set_serde() {
        let set: ActionSet =
            serde_json::from_str(r#"["decision:record_first","process:view"]"#).unwrap();
        assert!(set.contains(Action::DecisionRecordFirst));
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["process:view","decision:record_first"]"#);
    }

    #[test]
    fn action_set_from_null() {
        let set: ActionSet = serde_json::from_str("null").unwrap();
        assert_eq!(set, ActionSet::empty());
        assert_eq!(serde_json::to_string(&set).unwrap(), "[]");
    }
}

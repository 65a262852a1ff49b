//! Capability derivation
//!
//! Maps an RBAC context onto the flat set of booleans UI code uses to decide
//! which actions to render or enable. Derivation is total and pure: a missing
//! context yields no capabilities, a wildcard grant yields all of them.

use crate::action::{Action, ActionSet};
use crate::context::RbacContext;
use crate::error::RbacError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One UI-facing capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// See the manuscripts-in-process board
    ViewProcess,
    /// Open manuscript detail
    ViewManuscriptDetail,
    /// Bind an owning editor
    BindOwner,
    /// Assign an assistant editor
    AssignAssistantEditor,
    /// Invite or manage reviewers
    ManageReviewers,
    /// Record a first decision
    RecordFirstDecision,
    /// Submit a final decision
    SubmitFinalDecision,
    /// Override the APC amount
    OverrideApc,
    /// Mark an invoice as paid
    ConfirmInvoicePaid,
    /// Run production tasks
    ManageProduction,
    /// Administer users
    ManageUsers,
}

impl Capability {
    /// Every capability
    pub const ALL: [Capability; 11] = [
        Capability::ViewProcess,
        Capability::ViewManuscriptDetail,
        Capability::BindOwner,
        Capability::AssignAssistantEditor,
        Capability::ManageReviewers,
        Capability::RecordFirstDecision,
        Capability::SubmitFinalDecision,
        Capability::OverrideApc,
        Capability::ConfirmInvoicePaid,
        Capability::ManageProduction,
        Capability::ManageUsers,
    ];

    /// Actions any one of which grants this capability
    #[must_use]
    pub const fn required_actions(self) -> &'static [Action] {
        match self {
            Capability::ViewProcess => &[Action::ProcessView],
            Capability::ViewManuscriptDetail => &[Action::ManuscriptViewDetail],
            Capability::BindOwner => &[Action::ManuscriptBindOwner],
            Capability::AssignAssistantEditor => &[Action::ManuscriptAssignAssistantEditor],
            Capability::ManageReviewers => &[Action::ReviewerInvite, Action::ReviewerManage],
            Capability::RecordFirstDecision => &[Action::DecisionRecordFirst],
            Capability::SubmitFinalDecision => &[Action::DecisionSubmitFinal],
            Capability::OverrideApc => &[Action::InvoiceOverrideApc],
            Capability::ConfirmInvoicePaid => &[Action::InvoiceConfirmPaid],
            Capability::ManageProduction => &[Action::ProductionManage],
            Capability::ManageUsers => &[Action::UserManage],
        }
    }

    /// Field name as serialized in [`Capabilities`]
    #[must_use]
    pub const fn flag_name(self) -> &'static str {
        match self {
            Capability::ViewProcess => "canViewProcess",
            Capability::ViewManuscriptDetail => "canViewManuscriptDetail",
            Capability::BindOwner => "canBindOwner",
            Capability::AssignAssistantEditor => "canAssignAssistantEditor",
            Capability::ManageReviewers => "canManageReviewers",
            Capability::RecordFirstDecision => "canRecordFirstDecision",
            Capability::SubmitFinalDecision => "canSubmitFinalDecision",
            Capability::OverrideApc => "canOverrideApc",
            Capability::ConfirmInvoicePaid => "canConfirmInvoicePaid",
            Capability::ManageProduction => "canManageProduction",
            Capability::ManageUsers => "canManageUsers",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.flag_name())
    }
}

impl FromStr for Capability {
    type Err = RbacError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let name = value.trim();
        Capability::ALL
            .into_iter()
            .find(|cap| cap.flag_name() == name)
            .ok_or_else(|| RbacError::UnknownCapability(name.to_string()))
    }
}

/// Derived capability flags
#[allow(missing_docs, clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_view_process: bool,
    pub can_view_manuscript_detail: bool,
    pub can_bind_owner: bool,
    pub can_assign_assistant_editor: bool,
    pub can_manage_reviewers: bool,
    pub can_record_first_decision: bool,
    pub can_submit_final_decision: bool,
    pub can_override_apc: bool,
    pub can_confirm_invoice_paid: bool,
    pub can_manage_production: bool,
    pub can_manage_users: bool,
}

impl Capabilities {
    /// No capabilities at all
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Every capability granted
    #[must_use]
    pub fn all() -> Self {
        Self::from_actions(&ActionSet::All)
    }

    /// Derive flags from a granted action set
    #[must_use]
    pub fn from_actions(actions: &ActionSet) -> Self {
        let mut caps = Self::none();
        for cap in Capability::ALL {
            let granted = actions.is_all() || actions.contains_any(cap.required_actions());
            *caps.flag_mut(cap) = granted;
        }
        caps
    }

    /// Whether `cap` is granted
    #[must_use]
    pub fn allows(&self, cap: Capability) -> bool {
        match cap {
            Capability::ViewProcess => self.can_view_process,
            Capability::ViewManuscriptDetail => self.can_view_manuscript_detail,
            Capability::BindOwner => self.can_bind_owner,
            Capability::AssignAssistantEditor => self.can_assign_assistant_editor,
            Capability::ManageReviewers => self.can_manage_reviewers,
            Capability::RecordFirstDecision => self.can_record_first_decision,
            Capability::SubmitFinalDecision => self.can_submit_final_decision,
            Capability::OverrideApc => self.can_override_apc,
            Capability::ConfirmInvoicePaid => self.can_confirm_invoice_paid,
            Capability::ManageProduction => self.can_manage_production,
            Capability::ManageUsers => self.can_manage_users,
        }
    }

    /// Granted capabilities in declaration order
    pub fn granted(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|cap| self.allows(*cap))
    }

    fn flag_mut(&mut self, cap: Capability) -> &mut bool {
        match cap {
            Capability::ViewProcess => &mut self.can_view_process,
            Capability::ViewManuscriptDetail => &mut self.can_view_manuscript_detail,
            Capability::BindOwner => &mut self.can_bind_owner,
            Capability::AssignAssistantEditor => &mut self.can_assign_assistant_editor,
            Capability::ManageReviewers => &mut self.can_manage_reviewers,
            Capability::RecordFirstDecision => &mut self.can_record_first_decision,
            Capability::SubmitFinalDecision => &mut self.can_submit_final_decision,
            Capability::OverrideApc => &mut self.can_override_apc,
            Capability::ConfirmInvoicePaid => &mut self.can_confirm_invoice_paid,
            Capability::ManageProduction => &mut self.can_manage_production,
            Capability::ManageUsers => &mut self.can_manage_users,
        }
    }
}

/// Derive capabilities from an optional RBAC context
///
/// Absence of a context means nothing is granted.
#[must_use]
pub fn derive_capabilities(context: Option<&RbacContext>) -> Capabilities {
    context.map_or_else(Capabilities::none, |ctx| {
        Capabilities::from_actions(&ctx.allowed_actions)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::JournalScope;
    use proptest::prelude::*;

    fn context_with(tokens: &[&str]) -> RbacContext {
        RbacContext {
            user_id: "u-1".into(),
            allowed_actions: ActionSet::from_tokens(tokens),
            ..RbacContext::default()
        }
    }

    #[test]
    fn missing_context_grants_nothing() {
        let caps = derive_capabilities(None);
        assert_eq!(caps, Capabilities::none());
        assert_eq!(caps.granted().count(), 0);
    }

    #[test]
    fn wildcard_grants_everything() {
        let caps = derive_capabilities(Some(&context_with(&["*"])));
        assert_eq!(caps, Capabilities::all());
        assert_eq!(caps.granted().count(), Capability::ALL.len());
    }

    #[test]
    fn editor_scenario() {
        let ctx = RbacContext {
            allowed_actions: ActionSet::from_tokens([
                "process:view",
                "manuscript:view_detail",
                "decision:record_first",
            ]),
            journal_scope: JournalScope {
                enforcement_enabled: true,
                allowed_journal_ids: vec!["j-1".into()],
                is_admin: false,
            },
            ..RbacContext::default()
        };
        let caps = derive_capabilities(Some(&ctx));
        assert!(caps.can_view_process);
        assert!(caps.can_view_manuscript_detail);
        assert!(caps.can_record_first_decision);
        assert!(!caps.can_submit_final_decision);
        assert!(!caps.can_confirm_invoice_paid);
    }

    #[test]
    fn reviewer_capability_uses_or_semantics() {
        let invite = derive_capabilities(Some(&context_with(&["reviewer:invite"])));
        let manage = derive_capabilities(Some(&context_with(&["reviewer:manage"])));
        assert!(invite.can_manage_reviewers);
        assert!(manage.can_manage_reviewers);
    }

    #[test]
    fn serializes_camel_case() {
        let caps = derive_capabilities(Some(&context_with(&["invoice:confirm_paid"])));
        let json = serde_json::to_value(caps).unwrap();
        assert_eq!(json["canConfirmInvoicePaid"], true);
        assert_eq!(json["canViewProcess"], false);
    }

    #[test]
    fn capability_names_roundtrip() {
        for cap in Capability::ALL {
            assert_eq!(cap.flag_name().parse::<Capability>().unwrap(), cap);
        }
        assert!("canFly".parse::<Capability>().is_err());
    }

    fn action_subset() -> impl Strategy<Value = Vec<Action>> {
        proptest::sample::subsequence(Action::ALL.to_vec(), 0..=Action::ALL.len())
    }

    proptest! {
        #[test]
        fn wildcard_always_grants_all(actions in action_subset()) {
            let mut tokens: Vec<&str> = actions.iter().map(|a| a.as_str()).collect();
            tokens.push("*");
            let caps = derive_capabilities(Some(&context_with(&tokens)));
            prop_assert_eq!(caps, Capabilities::all());
        }

        #[test]
        fn capability_iff_mapped_action_present(actions in action_subset()) {
            let tokens: Vec<&str> = actions.iter().map(|a| a.as_str()).collect();
            let caps = derive_capabilities(Some(&context_with(&tokens)));
            for cap in Capability::ALL {
                let expected = cap.required_actions().iter().any(|a| actions.contains(a));
                prop_assert_eq!(caps.allows(cap), expected, "capability {}", cap);
            }
        }
    }
}

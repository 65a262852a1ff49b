//! ScholarFlow RBAC
//!
//! Turns the backend's RBAC context into UI capability flags.
//!
//! # Core Operations
//!
//! - **Parse**: action tokens become the closed [`Action`] enum, `*` becomes [`ActionSet::All`]
//! - **Derive**: [`derive_capabilities`] maps granted actions onto [`Capabilities`]
//! - **Explain**: [`scope_hint`] says why a journal-scoped list is empty
//!
//! # Example
//!
//! ```rust
//! use sf_rbac::{derive_capabilities, ActionSet, RbacContext};
//!
//! let ctx = RbacContext {
//!     allowed_actions: ActionSet::from_tokens(["process:view"]),
//!     ..RbacContext::default()
//! };
//! let caps = derive_capabilities(Some(&ctx));
//! assert!(caps.can_view_process);
//! assert!(!caps.can_submit_final_decision);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod action;
pub mod capability;
pub mod context;
pub mod error;
pub mod scope;

pub use action::{Action, ActionSet, Grant, WILDCARD_TOKEN};
pub use capability::{derive_capabilities, Capabilities, Capability};
pub use context::{JournalScope, RbacContext};
pub use error::RbacError;
pub use scope::{scope_hint, EMPTY_JOURNAL_SCOPE_HINT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

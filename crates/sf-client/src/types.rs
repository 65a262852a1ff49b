//! Editorial DTOs and request parameters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sf_cache::{CacheKey, KeyBuilder, ToCacheKey};

/// Cache family names; also used as key prefixes
pub mod family {
    /// RBAC context
    pub const RBAC_CONTEXT: &str = "rbac_context";
    /// Assistant editor list
    pub const ASSISTANT_EDITORS: &str = "assistant_editors";
    /// Manuscripts in process
    pub const MANUSCRIPTS_IN_PROCESS: &str = "manuscripts_in_process";
    /// Reviews for one manuscript
    pub const MANUSCRIPT_REVIEWS: &str = "manuscript_reviews";
}

/// Assistant editor available for assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantEditor {
    /// User id
    pub id: String,
    /// Display name
    #[serde(default)]
    pub full_name: String,
    /// Contact email
    #[serde(default)]
    pub email: Option<String>,
    /// Journals this editor works on
    #[serde(default)]
    pub journal_ids: Vec<String>,
    /// Manuscripts currently assigned
    #[serde(default)]
    pub active_manuscripts: u32,
}

/// Manuscript row on the process dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManuscriptSummary {
    /// Manuscript id
    pub id: String,
    /// Title
    #[serde(default)]
    pub title: String,
    /// Workflow status, e.g. `under_review`
    #[serde(default)]
    pub status: String,
    /// Owning journal
    #[serde(default)]
    pub journal_id: Option<String>,
    /// Bound owner (managing editor)
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Assigned assistant editor
    #[serde(default)]
    pub assistant_editor_id: Option<String>,
    /// Submission time
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    /// Last change
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Past its stage deadline
    #[serde(default)]
    pub is_overdue: bool,
}

/// One reviewer's report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewReport {
    /// Report id
    pub id: String,
    /// Reviewer user id
    #[serde(default)]
    pub reviewer_id: Option<String>,
    /// Reviewer display name
    #[serde(default)]
    pub reviewer_name: Option<String>,
    /// `invited`, `accepted`, `submitted`, ...
    #[serde(default)]
    pub status: String,
    /// Reviewer recommendation
    #[serde(default)]
    pub recommendation: Option<String>,
    /// Comments shared with the author; untrusted rich text
    #[serde(default)]
    pub comments_for_author: Option<String>,
    /// Comments for editors only; untrusted rich text
    #[serde(default)]
    pub confidential_comments: Option<String>,
    /// Submission time
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Filters for the assistant editor list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantEditorQuery {
    /// Restrict to one journal
    pub journal_id: Option<String>,
    /// Name or email search
    pub search: Option<String>,
}

impl AssistantEditorQuery {
    /// Query pairs sent to the backend
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "journal_id", self.journal_id.as_deref());
        push_text(&mut pairs, "search", self.search.as_deref());
        pairs
    }
}

impl ToCacheKey for AssistantEditorQuery {
    fn cache_key(&self) -> CacheKey {
        KeyBuilder::new(family::ASSISTANT_EDITORS)
            .text("journal_id", self.journal_id.as_deref())
            .text("search", self.search.as_deref())
            .build()
    }
}

/// Filters for the manuscripts-in-process dashboard
///
/// Ordering and surrounding whitespace of list values carry no meaning;
/// both the cache key and the wire query are normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessFilters {
    /// Free-text search
    pub q: Option<String>,
    /// Workflow statuses
    pub statuses: Vec<String>,
    /// Journals
    pub journal_ids: Vec<String>,
    /// Bound owner
    pub owner_id: Option<String>,
    /// Only overdue manuscripts
    pub overdue_only: Option<bool>,
    /// Page number, 1-based
    pub page: Option<u64>,
    /// Page size
    pub page_size: Option<u64>,
}

impl ProcessFilters {
    /// Query pairs sent to the backend
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "q", self.q.as_deref());
        push_list(&mut pairs, "status", &self.statuses);
        push_list(&mut pairs, "journal_id", &self.journal_ids);
        push_text(&mut pairs, "owner_id", self.owner_id.as_deref());
        if let Some(overdue) = self.overdue_only {
            pairs.push(("overdue_only".into(), overdue.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page".into(), page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            pairs.push(("page_size".into(), page_size.to_string()));
        }
        pairs
    }
}

impl ToCacheKey for ProcessFilters {
    fn cache_key(&self) -> CacheKey {
        KeyBuilder::new(family::MANUSCRIPTS_IN_PROCESS)
            .text("q", self.q.as_deref())
            .list("status", &self.statuses)
            .list("journal_id", &self.journal_ids)
            .text("owner_id", self.owner_id.as_deref())
            .flag("overdue_only", self.overdue_only)
            .number("page", self.page)
            .number("page_size", self.page_size)
            .build()
    }
}

/// Cache key for one manuscript's reviews
#[must_use]
pub fn reviews_key(manuscript_id: &str) -> CacheKey {
    KeyBuilder::new(family::MANUSCRIPT_REVIEWS)
        .id("manuscript_id", manuscript_id)
        .build()
}

/// Cache key for the caller's RBAC context
#[must_use]
pub fn rbac_context_key() -> CacheKey {
    KeyBuilder::new(family::RBAC_CONTEXT).build()
}

/// Editorial decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Accept
    Accept,
    /// Minor revision
    MinorRevision,
    /// Major revision
    MajorRevision,
    /// Reject
    Reject,
}

/// Which decision is being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStage {
    /// Assistant editor's first decision
    First,
    /// Editor-in-chief's final decision
    Final,
}

/// Decision payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionSubmission {
    /// Decision
    pub decision: DecisionKind,
    /// Stage
    pub stage: DecisionStage,
    /// Letter or note to the author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

fn push_text(pairs: &mut Vec<(String, String)>, name: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        pairs.push((name.to_string(), value.to_string()));
    }
}

fn push_list(pairs: &mut Vec<(String, String)>, name: &str, values: &[String]) {
    let mut items: Vec<&str> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    if items.is_empty() {
        return;
    }
    items.sort_unstable();
    items.dedup();
    pairs.push((name.to_string(), items.join(",")));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filters(statuses: &[&str], q: Option<&str>) -> ProcessFilters {
        ProcessFilters {
            q: q.map(str::to_string),
            statuses: statuses.iter().map(|s| (*s).to_string()).collect(),
            ..ProcessFilters::default()
        }
    }

    #[test]
    fn equivalent_filters_share_key_and_query() {
        let a = filters(&["under_review", "pending_decision"], Some("crispr"));
        let b = filters(&[" pending_decision", "under_review ", "under_review"], Some("  crispr "));
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.query_pairs(), b.query_pairs());
    }

    #[test]
    fn different_filters_differ() {
        let a = filters(&["under_review"], None);
        let b = filters(&["pending_decision"], None);
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn query_pairs_skip_blank_values() {
        let f = ProcessFilters {
            q: Some("   ".into()),
            owner_id: Some("u-7".into()),
            overdue_only: Some(true),
            ..ProcessFilters::default()
        };
        assert_eq!(
            f.query_pairs(),
            vec![
                ("owner_id".to_string(), "u-7".to_string()),
                ("overdue_only".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn reviews_keys_are_per_manuscript() {
        assert_ne!(reviews_key("m-1"), reviews_key("m-2"));
        assert_eq!(reviews_key(" m-1 "), reviews_key("m-1"));
    }

    #[test]
    fn manuscript_summary_tolerates_sparse_rows() {
        let row: ManuscriptSummary = serde_json::from_value(serde_json::json!({
            "id": "m-1",
            "submitted_at": "2026-03-01T09:30:00Z"
        }))
        .unwrap();
        assert_eq!(row.id, "m-1");
        assert!(row.submitted_at.is_some());
        assert!(!row.is_overdue);
    }

    #[test]
    fn decision_wire_format() {
        let body = serde_json::to_value(DecisionSubmission {
            decision: DecisionKind::MinorRevision,
            stage: DecisionStage::First,
            comment: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"decision": "minor_revision", "stage": "first"}));
    }
}

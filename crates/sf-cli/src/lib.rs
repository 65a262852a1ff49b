//! Support code for the `scholarflow` binary

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use sf_client::{ClientConfig, Envelope, ManuscriptSummary, ProcessFilters, ReviewReport};
use sf_rbac::{derive_capabilities, scope_hint, Capabilities, Capability, RbacContext};
use sf_sanitize::Sanitizer;
use std::fmt::Write as _;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber; `RUST_LOG` wins over `-v`
pub fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info,sf_client=debug,sf_cache=debug",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load client configuration from `path` (or defaults) plus environment overrides
///
/// # Errors
/// Unreadable or invalid configuration.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Parse an RBAC context, either bare or wrapped in the backend envelope
///
/// # Errors
/// Malformed JSON, a failed envelope, or an envelope without data.
pub fn parse_rbac_document(text: &str) -> Result<RbacContext> {
    let value: Value = serde_json::from_str(text).context("RBAC document is not valid JSON")?;
    if value.get("success").is_none() {
        return serde_json::from_value(value).context("RBAC document has unexpected shape");
    }

    let envelope: Envelope<RbacContext> =
        serde_json::from_value(value).context("RBAC envelope has unexpected shape")?;
    if !envelope.success {
        bail!(
            "RBAC envelope reports failure: {}",
            envelope.error_message().unwrap_or_else(|| "no detail".into())
        );
    }
    envelope.data.context("RBAC envelope has no data")
}

/// Capability flags plus the empty-scope hint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityReport {
    /// Derived flags
    pub capabilities: Capabilities,
    /// Hint for empty lists, if any
    pub scope_hint: Option<&'static str>,
}

impl CapabilityReport {
    /// Derive the report for `context`
    #[must_use]
    pub fn derive(context: &RbacContext) -> Self {
        Self {
            capabilities: derive_capabilities(Some(context)),
            scope_hint: scope_hint(Some(context)),
        }
    }

    /// One `flag: bool` line per capability, then the hint
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for capability in Capability::ALL {
            let _ = writeln!(
                out,
                "{:<28} {}",
                capability.flag_name(),
                self.capabilities.allows(capability)
            );
        }
        if let Some(hint) = self.scope_hint {
            let _ = writeln!(out, "\nnote: {hint}");
        }
        out
    }
}

/// Build process filters from command line values
#[must_use]
pub fn process_filters(
    q: Option<String>,
    statuses: Vec<String>,
    journal_ids: Vec<String>,
    owner_id: Option<String>,
    overdue_only: bool,
) -> ProcessFilters {
    ProcessFilters {
        q,
        statuses,
        journal_ids,
        owner_id,
        overdue_only: overdue_only.then_some(true),
        ..ProcessFilters::default()
    }
}

/// Tab-separated manuscript rows
#[must_use]
pub fn render_manuscripts(rows: &[ManuscriptSummary]) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "{}\t{}\t{}{}",
            row.id,
            row.status,
            row.title,
            if row.is_overdue { "\t(overdue)" } else { "" }
        );
    }
    if rows.is_empty() {
        out.push_str("no manuscripts\n");
    }
    out
}

/// Review reports with author comments passed through `sanitizer`
#[must_use]
pub fn render_reviews(rows: &[ReviewReport], sanitizer: &Sanitizer) -> String {
    let mut out = String::new();
    for row in rows {
        let reviewer = row
            .reviewer_name
            .as_deref()
            .or(row.reviewer_id.as_deref())
            .unwrap_or("unknown reviewer");
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}",
            row.id,
            reviewer,
            row.status,
            row.recommendation.as_deref().unwrap_or("-")
        );
        if let Some(comments) = row.comments_for_author.as_deref() {
            let _ = writeln!(out, "  {}", sanitizer.sanitize(comments));
        }
    }
    if rows.is_empty() {
        out.push_str("no reviews\n");
    }
    out
}

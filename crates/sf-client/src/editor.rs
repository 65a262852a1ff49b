//! Editor workspace endpoints
//!
//! Read endpoints go through one [`RequestCache`] per family, so repeated
//! dashboard renders within the TTL reuse one response and concurrent
//! renders share one request. Mutations invalidate the families they make
//! stale, and a change of session token drops every family.

use crate::client::ApiClient;
use crate::config::{CachePolicy, ClientConfig};
use crate::error::{ApiError, ApiResult};
use crate::session::SessionProvider;
use crate::transport::ApiRequest;
use crate::types::{
    family, rbac_context_key, reviews_key, AssistantEditor, AssistantEditorQuery,
    DecisionSubmission, ManuscriptSummary, ProcessFilters, ReviewReport,
};
use parking_lot::Mutex;
use serde_json::json;
use sf_cache::{CacheStats, FetchOptions, RequestCache, ToCacheKey};
use sf_rbac::{derive_capabilities, scope_hint, Capabilities, RbacContext};
use std::sync::Arc;

/// Backend paths
pub mod paths {
    /// Caller's RBAC context
    pub const RBAC_CONTEXT: &str = "/api/v1/editor/rbac/context";
    /// Assistant editors available for assignment
    pub const ASSISTANT_EDITORS: &str = "/api/v1/editor/assistant-editors";
    /// Manuscripts in process
    pub const MANUSCRIPTS_IN_PROCESS: &str = "/api/v1/editor/manuscripts/process";

    /// Reviews of one manuscript
    #[must_use]
    pub fn manuscript_reviews(manuscript_id: &str) -> String {
        format!("/api/v1/manuscripts/{manuscript_id}/reviews")
    }

    /// Bind the owning editor
    #[must_use]
    pub fn bind_owner(manuscript_id: &str) -> String {
        format!("/api/v1/editor/manuscripts/{manuscript_id}/bind-owner")
    }

    /// Assign an assistant editor
    #[must_use]
    pub fn assign_assistant_editor(manuscript_id: &str) -> String {
        format!("/api/v1/editor/manuscripts/{manuscript_id}/assign-ae")
    }

    /// Record a decision
    #[must_use]
    pub fn decision(manuscript_id: &str) -> String {
        format!("/api/v1/editor/manuscripts/{manuscript_id}/decision")
    }
}

/// Editor-facing API with per-family request caches
///
/// Each instance owns its caches; two instances never share entries.
#[derive(Debug, Clone)]
pub struct EditorApi {
    client: ApiClient,
    rbac: RequestCache<RbacContext>,
    assistant_editors: RequestCache<Vec<AssistantEditor>>,
    process: RequestCache<Vec<ManuscriptSummary>>,
    reviews: RequestCache<Vec<ReviewReport>>,
    // fingerprint of the token the cached entries were fetched with
    session: Arc<Mutex<Option<u64>>>,
}

impl EditorApi {
    /// Wrap `client` with caches tuned by `policy`
    #[must_use]
    pub fn new(client: ApiClient, policy: &CachePolicy) -> Self {
        let session = client.session_fingerprint();
        Self {
            client,
            rbac: RequestCache::new(family::RBAC_CONTEXT, policy.rbac_context),
            assistant_editors: RequestCache::new(
                family::ASSISTANT_EDITORS,
                policy.assistant_editors,
            ),
            process: RequestCache::new(
                family::MANUSCRIPTS_IN_PROCESS,
                policy.manuscripts_in_process,
            ),
            reviews: RequestCache::new(family::MANUSCRIPT_REVIEWS, policy.manuscript_reviews),
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Build from configuration over the reqwest backend
    ///
    /// # Errors
    /// `ApiError::Config` when the configuration is invalid.
    pub fn from_config(
        config: &ClientConfig,
        session: Arc<dyn SessionProvider>,
    ) -> ApiResult<Self> {
        let client = ApiClient::from_config(config, session)?;
        Ok(Self::new(client, &config.cache))
    }

    /// Underlying client
    #[inline]
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Caller's RBAC context
    ///
    /// # Errors
    /// Any [`ApiError`] from the request.
    pub async fn rbac_context(&self, options: FetchOptions) -> ApiResult<RbacContext> {
        self.sync_session();
        self.rbac
            .get(rbac_context_key(), options, |mode| {
                self.client
                    .fetch(ApiRequest::get(paths::RBAC_CONTEXT).force_refresh(mode.is_forced()))
            })
            .await
    }

    /// Capability flags derived from the caller's RBAC context
    ///
    /// # Errors
    /// Any [`ApiError`] from fetching the context.
    pub async fn capabilities(&self, options: FetchOptions) -> ApiResult<Capabilities> {
        let context = self.rbac_context(options).await?;
        Ok(derive_capabilities(Some(&context)))
    }

    /// Hint explaining empty lists under journal scoping
    ///
    /// # Errors
    /// Any [`ApiError`] from fetching the context.
    pub async fn scope_hint(&self, options: FetchOptions) -> ApiResult<Option<&'static str>> {
        let context = self.rbac_context(options).await?;
        Ok(scope_hint(Some(&context)))
    }

    /// Assistant editors available for assignment
    ///
    /// # Errors
    /// Any [`ApiError`] from the request.
    pub async fn assistant_editors(
        &self,
        query: &AssistantEditorQuery,
        options: FetchOptions,
    ) -> ApiResult<Vec<AssistantEditor>> {
        self.sync_session();
        let request = ApiRequest::get(paths::ASSISTANT_EDITORS).query_pairs(query.query_pairs());
        self.assistant_editors
            .get(query.cache_key(), options, |mode| {
                self.client.fetch(request.force_refresh(mode.is_forced()))
            })
            .await
    }

    /// Manuscripts in process, filtered
    ///
    /// # Errors
    /// Any [`ApiError`] from the request.
    pub async fn manuscripts_in_process(
        &self,
        filters: &ProcessFilters,
        options: FetchOptions,
    ) -> ApiResult<Vec<ManuscriptSummary>> {
        self.sync_session();
        let request =
            ApiRequest::get(paths::MANUSCRIPTS_IN_PROCESS).query_pairs(filters.query_pairs());
        self.process
            .get(filters.cache_key(), options, |mode| {
                self.client.fetch(request.force_refresh(mode.is_forced()))
            })
            .await
    }

    /// Review reports of one manuscript
    ///
    /// # Errors
    /// `ApiError::InvalidArgument` for a malformed id, otherwise any
    /// [`ApiError`] from the request.
    pub async fn manuscript_reviews(
        &self,
        manuscript_id: &str,
        options: FetchOptions,
    ) -> ApiResult<Vec<ReviewReport>> {
        let manuscript_id = checked_id("manuscript_id", manuscript_id)?;
        self.sync_session();
        let request = ApiRequest::get(paths::manuscript_reviews(manuscript_id));
        self.reviews
            .get(reviews_key(manuscript_id), options, |mode| {
                self.client.fetch(request.force_refresh(mode.is_forced()))
            })
            .await
    }

    /// Bind the owning editor of a manuscript
    ///
    /// # Errors
    /// `ApiError::InvalidArgument` for malformed ids, otherwise any
    /// [`ApiError`] from the request.
    pub async fn bind_owner(&self, manuscript_id: &str, owner_id: &str) -> ApiResult<()> {
        let manuscript_id = checked_id("manuscript_id", manuscript_id)?;
        let owner_id = checked_id("owner_id", owner_id)?;
        let request = ApiRequest::post(paths::bind_owner(manuscript_id))
            .json(json!({ "owner_id": owner_id }));
        self.client.execute_command(request).await?;

        tracing::info!(manuscript_id, owner_id, "owner bound");
        self.process.invalidate();
        Ok(())
    }

    /// Assign an assistant editor to a manuscript
    ///
    /// # Errors
    /// `ApiError::InvalidArgument` for malformed ids, otherwise any
    /// [`ApiError`] from the request.
    pub async fn assign_assistant_editor(
        &self,
        manuscript_id: &str,
        assistant_editor_id: &str,
    ) -> ApiResult<()> {
        let manuscript_id = checked_id("manuscript_id", manuscript_id)?;
        let assistant_editor_id = checked_id("assistant_editor_id", assistant_editor_id)?;
        let request = ApiRequest::post(paths::assign_assistant_editor(manuscript_id))
            .json(json!({ "assistant_editor_id": assistant_editor_id }));
        self.client.execute_command(request).await?;

        tracing::info!(manuscript_id, assistant_editor_id, "assistant editor assigned");
        self.process.invalidate();
        // workload counts changed
        self.assistant_editors.invalidate();
        Ok(())
    }

    /// Record a first or final decision
    ///
    /// # Errors
    /// `ApiError::InvalidArgument` for a malformed id, otherwise any
    /// [`ApiError`] from the request.
    pub async fn submit_decision(
        &self,
        manuscript_id: &str,
        decision: &DecisionSubmission,
    ) -> ApiResult<()> {
        let manuscript_id = checked_id("manuscript_id", manuscript_id)?;
        let body = serde_json::to_value(decision)
            .map_err(|err| ApiError::InvalidArgument(err.to_string()))?;
        let request = ApiRequest::post(paths::decision(manuscript_id)).json(body);
        self.client.execute_command(request).await?;

        tracing::info!(
            manuscript_id,
            stage = ?decision.stage,
            decision = ?decision.decision,
            "decision recorded"
        );
        self.process.invalidate();
        self.reviews.invalidate_key(&reviews_key(manuscript_id)).await;
        Ok(())
    }

    /// Drop every cached entry in every family
    pub fn invalidate_all(&self) {
        self.rbac.invalidate();
        self.assistant_editors.invalidate();
        self.process.invalidate();
        self.reviews.invalidate();
    }

    /// Drop every family when the session token changed since the last read
    fn sync_session(&self) {
        let current = self.client.session_fingerprint();
        let mut last = self.session.lock();
        if *last == current {
            return;
        }
        if last.is_some() {
            tracing::info!("session changed, dropping cached responses");
            self.invalidate_all();
        }
        *last = current;
    }

    /// Statistics per family
    pub async fn cache_stats(&self) -> Vec<(&'static str, CacheStats)> {
        vec![
            (self.rbac.family(), self.rbac.stats().await),
            (self.assistant_editors.family(), self.assistant_editors.stats().await),
            (self.process.family(), self.process.stats().await),
            (self.reviews.family(), self.reviews.stats().await),
        ]
    }
}

/// Trim and check an identifier destined for a URL path segment
fn checked_id<'a>(name: &str, value: &'a str) -> ApiResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::InvalidArgument(format!("{name} must not be empty")));
    }
    if !value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
        || value.chars().all(|ch| ch == '.')
    {
        return Err(ApiError::InvalidArgument(format!("{name} '{value}' is not a valid id")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StaticSession;
    use crate::transport::{MockHttpBackend, RawResponse, FORCE_REFRESH_HEADER};

    fn api(backend: MockHttpBackend) -> EditorApi {
        let client = ApiClient::new(Arc::new(backend), Arc::new(StaticSession::new("tok")));
        EditorApi::new(client, &CachePolicy::default())
    }

    const RBAC_BODY: &str = r#"{"success":true,"data":{
        "user_id":"u-1",
        "roles":["assistant_editor"],
        "normalized_roles":["assistant_editor"],
        "allowed_actions":["process:view","manuscript:view_detail","decision:record_first"],
        "journal_scope":{"enforcement_enabled":true,"allowed_journal_ids":["j-1"],"is_admin":false}
    }}"#;

    #[tokio::test]
    async fn capabilities_from_backend_context() {
        let mut backend = MockHttpBackend::new();
        backend
            .expect_execute()
            .withf(|req| req.path == paths::RBAC_CONTEXT)
            .times(1)
            .returning(|_| Ok(RawResponse::new(200, RBAC_BODY)));

        let api = api(backend);
        let caps = api.capabilities(FetchOptions::cached()).await.unwrap();
        assert!(caps.can_view_process);
        assert!(caps.can_record_first_decision);
        assert!(!caps.can_submit_final_decision);
        assert!(!caps.can_confirm_invoice_paid);
        // second read is served from cache
        assert_eq!(api.scope_hint(FetchOptions::cached()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn forced_fetch_carries_refresh_header() {
        let mut backend = MockHttpBackend::new();
        let mut seq = mockall::Sequence::new();
        backend
            .expect_execute()
            .withf(|req| req.header_value(FORCE_REFRESH_HEADER).is_none())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(RawResponse::new(200, r#"{"success":true,"data":[]}"#)));
        backend
            .expect_execute()
            .withf(|req| req.header_value(FORCE_REFRESH_HEADER) == Some("1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(RawResponse::new(200, r#"{"success":true,"data":[]}"#)));

        let api = api(backend);
        api.manuscript_reviews("m-1", FetchOptions::cached()).await.unwrap();
        api.manuscript_reviews("m-1", FetchOptions::forced()).await.unwrap();
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected_locally() {
        let mut backend = MockHttpBackend::new();
        backend.expect_execute().never();

        let api = api(backend);
        for bad in ["", "  ", "../admin", "m 1", "..", "m-1?x=1"] {
            let err = api.manuscript_reviews(bad, FetchOptions::cached()).await.unwrap_err();
            assert!(matches!(err, ApiError::InvalidArgument(_)), "{bad:?}");
        }
    }

    #[tokio::test]
    async fn failed_mutation_keeps_cache() {
        let mut backend = MockHttpBackend::new();
        backend
            .expect_execute()
            .withf(|req| req.path == paths::MANUSCRIPTS_IN_PROCESS)
            .times(1)
            .returning(|_| Ok(RawResponse::new(200, r#"{"success":true,"data":[]}"#)));
        backend
            .expect_execute()
            .withf(|req| req.path == paths::bind_owner("m-1"))
            .times(1)
            .returning(|_| Ok(RawResponse::new(409, r#"{"detail":"Owner already bound"}"#)));

        let api = api(backend);
        let filters = ProcessFilters::default();
        api.manuscripts_in_process(&filters, FetchOptions::cached()).await.unwrap();
        let err = api.bind_owner("m-1", "u-2").await.unwrap_err();
        assert_eq!(err, ApiError::status(409, "Owner already bound"));
        // still cached: the mock allows only one list call
        api.manuscripts_in_process(&filters, FetchOptions::cached()).await.unwrap();
    }
}

//! Testing utilities for the ScholarFlow workspace
//!
//! Shared fixtures and a scripted in-memory backend.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use sf_client::{
    ApiClient, ApiError, ApiRequest, CachePolicy, EditorApi, HttpBackend, HttpMethod, RawResponse,
    SessionProvider, StaticSession,
};
use sf_rbac::{ActionSet, JournalScope, RbacContext};
use std::sync::Arc;
use std::time::Duration;

pub const TEST_TOKEN: &str = "test-token";

pub fn rbac_context(tokens: &[&str]) -> RbacContext {
    RbacContext {
        user_id: "u-test".into(),
        roles: vec!["editor".into()],
        normalized_roles: vec!["editor".into()],
        allowed_actions: ActionSet::from_tokens(tokens),
        journal_scope: JournalScope::default(),
    }
}

pub fn scoped_rbac_context(tokens: &[&str], journals: &[&str], is_admin: bool) -> RbacContext {
    RbacContext {
        journal_scope: JournalScope {
            enforcement_enabled: true,
            allowed_journal_ids: journals.iter().map(|j| (*j).to_string()).collect(),
            is_admin,
        },
        ..rbac_context(tokens)
    }
}

pub fn ok_envelope(data: Value) -> RawResponse {
    RawResponse::new(200, json!({ "success": true, "data": data }).to_string())
}

pub fn rejected_envelope(detail: &str) -> RawResponse {
    RawResponse::new(200, json!({ "success": false, "detail": detail }).to_string())
}

pub fn error_envelope(status: u16, detail: &str) -> RawResponse {
    RawResponse::new(status, json!({ "success": false, "detail": detail }).to_string())
}

pub fn manuscript(id: &str, status: &str) -> Value {
    json!({ "id": id, "title": format!("Manuscript {id}"), "status": status, "journal_id": "j-1" })
}

pub fn review(id: &str, reviewer: &str) -> Value {
    json!({
        "id": id,
        "reviewer_id": reviewer,
        "status": "submitted",
        "recommendation": "minor_revision"
    })
}

type Responder = Box<dyn Fn(&ApiRequest) -> Result<RawResponse, ApiError> + Send + Sync>;

struct Route {
    method: HttpMethod,
    path: String,
    respond: Responder,
}

/// In-memory [`HttpBackend`] answering from scripted routes and recording
/// every request it sees
pub struct ScriptedBackend {
    routes: Vec<Route>,
    requests: Mutex<Vec<ApiRequest>>,
    latency: Duration,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            requests: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
        }
    }

    /// Delay every response, keeping requests in flight long enough to overlap
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn route<F>(mut self, method: HttpMethod, path: impl Into<String>, respond: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<RawResponse, ApiError> + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.into(),
            respond: Box::new(respond),
        });
        self
    }

    pub fn on_get(self, path: impl Into<String>, data: Value) -> Self {
        self.route(HttpMethod::Get, path, move |_| Ok(ok_envelope(data.clone())))
    }

    pub fn on_post(self, path: impl Into<String>) -> Self {
        self.route(HttpMethod::Post, path, |_| Ok(ok_envelope(Value::Null)))
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.path == path).count()
    }

    pub fn forced_count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.path == path && r.is_forced())
            .count()
    }

    pub fn total(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl HttpBackend for ScriptedBackend {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        self.requests.lock().push(request.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self
            .routes
            .iter()
            .find(|route| route.method == request.method && route.path == request.path)
        {
            Some(route) => (route.respond)(&request),
            None => Ok(error_envelope(404, "Not Found")),
        }
    }
}

/// [`EditorApi`] over `backend` with a signed-in session and default caches
pub fn editor_api(backend: Arc<ScriptedBackend>) -> EditorApi {
    editor_api_with_policy(backend, &CachePolicy::default())
}

pub fn editor_api_with_policy(backend: Arc<ScriptedBackend>, policy: &CachePolicy) -> EditorApi {
    editor_api_with_session(backend, Arc::new(StaticSession::new(TEST_TOKEN)), policy)
}

pub fn editor_api_with_session(
    backend: Arc<ScriptedBackend>,
    session: Arc<dyn SessionProvider>,
    policy: &CachePolicy,
) -> EditorApi {
    EditorApi::new(ApiClient::new(backend, session), policy)
}

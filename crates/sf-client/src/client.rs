//! Authenticated envelope-aware client

use crate::config::ClientConfig;
use crate::envelope::{decode_data, decode_envelope};
use crate::error::{ApiError, ApiResult};
use crate::session::SessionProvider;
use crate::transport::{
    ApiRequest, HttpBackend, RawResponse, ReqwestBackend, AUTHORIZATION_HEADER,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Sends requests with the current session's bearer token and decodes the
/// backend envelope
#[derive(Clone)]
pub struct ApiClient {
    backend: Arc<dyn HttpBackend>,
    session: Arc<dyn SessionProvider>,
}

impl ApiClient {
    /// Client over an arbitrary backend
    pub fn new(backend: Arc<dyn HttpBackend>, session: Arc<dyn SessionProvider>) -> Self {
        Self { backend, session }
    }

    /// Client over [`ReqwestBackend`]
    ///
    /// # Errors
    /// `ApiError::Config` when the configuration is invalid.
    pub fn from_config(
        config: &ClientConfig,
        session: Arc<dyn SessionProvider>,
    ) -> ApiResult<Self> {
        config.validate()?;
        let backend = ReqwestBackend::new(
            &config.base_url,
            config.request_timeout(),
            &config.user_agent,
        )?;
        Ok(Self::new(Arc::new(backend), session))
    }

    /// Opaque identity of the current session token, `None` when signed out
    ///
    /// Equal tokens give equal fingerprints within one process; the token
    /// itself is not retained.
    #[must_use]
    pub fn session_fingerprint(&self) -> Option<u64> {
        self.session.access_token().map(|token| {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            hasher.finish()
        })
    }

    async fn dispatch(&self, request: ApiRequest) -> ApiResult<RawResponse> {
        let Some(token) = self.session.access_token() else {
            tracing::debug!(path = %request.path, "no session token; request not sent");
            return Err(ApiError::Unauthenticated);
        };
        let request = request.header(AUTHORIZATION_HEADER, token.bearer_header());

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            forced = request.is_forced(),
            "sending request"
        );
        let response = self.backend.execute(request).await;
        match &response {
            Ok(raw) if !raw.is_success() => {
                tracing::warn!(status = raw.status, "backend returned error status");
            }
            Err(err) => tracing::warn!(error = %err, "request failed"),
            Ok(_) => {}
        }
        response
    }

    /// Send `request` and return the envelope's `data`
    ///
    /// # Errors
    /// Transport, status, rejection, and decode failures; `Unauthenticated`
    /// when no token is available.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let response = self.dispatch(request).await?;
        decode_data(&response)
    }

    /// Send a command whose payload is not needed
    ///
    /// # Errors
    /// As [`ApiClient::fetch`], except a missing `data` is accepted.
    pub async fn execute_command(&self, request: ApiRequest) -> ApiResult<()> {
        let response = self.dispatch(request).await?;
        decode_envelope::<Value>(&response)?;
        Ok(())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

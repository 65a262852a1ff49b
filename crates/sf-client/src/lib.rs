//! ScholarFlow editorial backend client
//!
//! Typed access to the editor workspace endpoints:
//! - [`ApiClient`] attaches the session token and decodes the backend envelope
//! - [`EditorApi`] fronts read endpoints with short-TTL request caches and
//!   invalidates them after mutations
//! - [`HttpBackend`] is the transport seam; [`ReqwestBackend`] is the default
//!
//! # Example
//!
//! ```rust,no_run
//! use sf_client::{ClientConfig, EditorApi, EnvSession, FetchOptions, ProcessFilters};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), sf_client::ApiError> {
//! let config = ClientConfig::default().with_env_overrides();
//! let api = EditorApi::from_config(&config, Arc::new(EnvSession::new(&config.token_env)))?;
//!
//! let caps = api.capabilities(FetchOptions::cached()).await?;
//! if caps.can_view_process {
//!     let filters = ProcessFilters {
//!         statuses: vec!["under_review".into()],
//!         ..Default::default()
//!     };
//!     let rows = api.manuscripts_in_process(&filters, FetchOptions::cached()).await?;
//!     println!("{} manuscripts", rows.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod client;
pub mod config;
pub mod editor;
pub mod envelope;
pub mod error;
pub mod session;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use config::{CachePolicy, ClientConfig, API_URL_ENV, DEFAULT_TOKEN_ENV};
pub use editor::EditorApi;
pub use envelope::{decode_data, decode_envelope, Envelope};
pub use error::{ApiError, ApiResult};
pub use session::{AccessToken, EnvSession, SessionProvider, StaticSession};
pub use transport::{
    ApiRequest, HttpBackend, HttpMethod, RawResponse, ReqwestBackend, FORCE_REFRESH_HEADER,
};
pub use types::{
    AssistantEditor, AssistantEditorQuery, DecisionKind, DecisionStage, DecisionSubmission,
    ManuscriptSummary, ProcessFilters, ReviewReport,
};

pub use sf_cache::{CacheSettings, CacheStats, FetchMode, FetchOptions};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

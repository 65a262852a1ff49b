//! ScholarFlow request cache
//!
//! A short-TTL memo layer placed in front of read endpoints. Each endpoint
//! family owns one [`RequestCache`], constructed by the service that uses it,
//! so tests get isolation simply by building a fresh instance.
//!
//! # Architecture
//!
//! ```text
//! caller → RequestCache::get(key, options, fetch)
//!            ├─ force ──────────────→ fetch(Forced) → overwrite entry
//!            ├─ fresh entry ────────→ return
//!            ├─ fetch in flight ────→ await the same fetch
//!            └─ miss ───────────────→ fetch(Cached) → populate entry
//! ```
//!
//! # Example
//!
//! ```rust
//! use sf_cache::{CacheSettings, FetchOptions, KeyBuilder, RequestCache};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), String> {
//! let cache: RequestCache<Vec<String>> =
//!     RequestCache::new("assistant_editors", CacheSettings::new(Duration::from_secs(60)));
//! let key = KeyBuilder::new("assistant_editors").text("journal", Some("j-1")).build();
//!
//! let editors = cache
//!     .get(key, FetchOptions::cached(), |_mode| async { Ok::<_, String>(vec!["ae-1".into()]) })
//!     .await?;
//! assert_eq!(editors.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod key;

pub use cache::{CacheSettings, CacheStats, FetchMode, FetchOptions, RequestCache};
pub use key::{CacheKey, KeyBuilder, ToCacheKey};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

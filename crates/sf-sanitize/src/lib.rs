//! ScholarFlow content sanitizer
//!
//! Author- and reviewer-supplied rich text (abstracts, cover letters, review
//! comments) is cleaned before it is rendered anywhere.
//!
//! - Dangerous tags (`script`, `iframe`, `object`, ...) are removed
//! - Event-handler attributes and inline styles are stripped
//! - `href`/`src` must pass [`is_safe_url`]
//! - Anchors get `rel="noopener noreferrer nofollow"` and a safe `target`
//!
//! [`RenderMode::EscapeOnly`] renders everything as text instead.
//!
//! # Example
//!
//! ```rust
//! use sf_sanitize::Sanitizer;
//!
//! let clean = Sanitizer::default().sanitize(r#"<p onclick="x()">Hi</p><script>bad()</script>"#);
//! assert_eq!(clean, "<p>Hi</p>");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod sanitizer;
pub mod url;

pub use sanitizer::{escape_html, RenderMode, Sanitizer, SanitizerConfig, BLOCKED_TAGS, LINK_REL};
pub use url::{is_safe_url, ALLOWED_DATA_IMAGE_TYPES, ALLOWED_SCHEMES};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

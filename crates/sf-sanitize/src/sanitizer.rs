//! Rich-content sanitizer
//!
//! Uses ammonia's allow-list cleaner, tightened with a URL policy and link
//! hardening. In [`RenderMode::EscapeOnly`] no markup survives at all.

use crate::url::{is_safe_url, ALLOWED_SCHEMES};
use ammonia::{Builder, UrlRelative};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;

/// Tags that are always removed
pub static BLOCKED_TAGS: [&str; 20] = [
    "script", "style", "iframe", "object", "embed", "frame", "frameset", "applet", "noscript",
    "template", "form", "input", "button", "textarea", "select", "link", "meta", "base", "svg",
    "math",
];

/// Blocked tags whose text content is dropped as well
static CONTENT_DROPPED_TAGS: [&str; 7] =
    ["iframe", "object", "embed", "noscript", "template", "svg", "math"];

/// `rel` applied to every anchor
pub const LINK_REL: &str = "noopener noreferrer nofollow";

/// How untrusted content is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Keep allow-listed markup
    #[default]
    Rich,
    /// Escape everything; nothing is interpreted as markup
    EscapeOnly,
}

/// Sanitizer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Rendering mode
    pub mode: RenderMode,
    /// `target` forced onto anchors
    pub link_target: String,
}

impl SanitizerConfig {
    /// With render mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::Rich,
            link_target: "_blank".to_string(),
        }
    }
}

/// Sanitizer for user-supplied rich text (abstracts, cover letters, review comments)
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    config: SanitizerConfig,
}

impl Sanitizer {
    /// Build a sanitizer
    #[must_use]
    pub fn new(config: SanitizerConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Sanitize `input` according to the configured mode
    #[must_use]
    pub fn sanitize(&self, input: &str) -> String {
        match self.config.mode {
            RenderMode::Rich => self.policy().clean(input).to_string(),
            RenderMode::EscapeOnly => escape_html(input),
        }
    }

    /// Cleaner borrowing the configured link target
    fn policy(&self) -> Builder<'_> {
        let mut schemes: HashSet<&str> = ALLOWED_SCHEMES.into_iter().collect();
        // data: is narrowed to raster images by the attribute filter
        schemes.insert("data");

        let mut policy = Builder::default();
        policy
            .rm_tags(BLOCKED_TAGS.iter())
            .add_clean_content_tags(CONTENT_DROPPED_TAGS.iter())
            .url_schemes(schemes)
            .url_relative(UrlRelative::PassThrough)
            .attribute_filter(filter_attribute)
            .link_rel(Some(LINK_REL))
            .set_tag_attribute_value("a", "target", self.config.link_target.as_str());
        policy
    }
}

fn filter_attribute<'u>(element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    match attribute {
        "href" | "src" => {
            if is_safe_url(element, attribute, value) {
                Some(Cow::Borrowed(value))
            } else {
                tracing::debug!(element, attribute, "dropping unsafe url");
                None
            }
        }
        _ => Some(Cow::Borrowed(value)),
    }
}

/// Escape `input` so no part of it is interpreted as markup
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 8);
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn sanitize(input: &str) -> String {
        Sanitizer::default().sanitize(input)
    }

    #[test]
    fn removes_script_tags_and_content() {
        let out = sanitize("<p>Abstract</p><script>alert('x')</script>");
        assert!(!out.contains("<script"));
        assert!(!out.contains("alert"));
        assert!(out.contains("<p>Abstract</p>"));
    }

    #[test]
    fn removes_embedded_frames() {
        let out = sanitize(
            r#"<iframe src="https://evil.example">frame</iframe><object data="x">obj</object>ok"#,
        );
        assert!(!out.contains("iframe"));
        assert!(!out.contains("object"));
        assert!(!out.contains("frame<"));
        assert!(out.contains("ok"));
    }

    #[test]
    fn strips_event_handlers_and_inline_styles() {
        let out = sanitize(r#"<p onclick="steal()" style="color:red">Hi</p>"#);
        assert_eq!(out, "<p>Hi</p>");
    }

    #[test]
    fn removes_javascript_uris() {
        let out = sanitize(r#"<a href="javascript:alert(1)">click</a>"#);
        assert!(!out.contains("javascript"));
        assert!(out.contains("click"));
    }

    #[test]
    fn keeps_relative_and_https_links() {
        let out = sanitize(
            r#"<a href="/editor/manuscripts/42">ms</a> <a href="https://doi.org/10.1/x">doi</a>"#,
        );
        assert!(out.contains(r#"href="/editor/manuscripts/42""#));
        assert!(out.contains(r#"href="https://doi.org/10.1/x""#));
    }

    #[test]
    fn hardens_every_anchor() {
        let out =
            sanitize(r#"<a href="/a">one</a><a href="https://b.example" target="_self">two</a>"#);
        assert_eq!(out.matches(r#"rel="noopener noreferrer nofollow""#).count(), 2);
        assert_eq!(out.matches(r#"target="_blank""#).count(), 2);
        assert!(!out.contains("_self"));
    }

    #[test]
    fn configured_link_target_is_applied() {
        let config = SanitizerConfig {
            link_target: "_top".to_string(),
            ..SanitizerConfig::default()
        };
        let sanitizer = Sanitizer::new(config);
        let out = sanitizer.sanitize(r#"<a href="/a" target="_blank">one</a>"#);
        assert!(out.contains(r#"target="_top""#));
        assert!(!out.contains("_blank"));
        // the same sanitizer is reusable
        assert_eq!(sanitizer.sanitize("<b>x</b>"), "<b>x</b>");
    }

    #[test]
    fn keeps_inline_raster_images_only() {
        let png = r#"<img src="data:image/png;base64,iVBORw0KGgo=" alt="fig">"#;
        assert!(sanitize(png).contains("data:image/png;base64,iVBORw0KGgo="));

        let svg = r#"<img src="data:image/svg+xml;base64,PHN2Zz4=" alt="fig">"#;
        assert!(!sanitize(svg).contains("data:"));
    }

    #[test]
    fn escape_only_mode_renders_text() {
        let sanitizer =
            Sanitizer::new(SanitizerConfig::default().with_mode(RenderMode::EscapeOnly));
        assert_eq!(
            sanitizer.sanitize(r#"<b onclick="x">A & B's "note"</b>"#),
            "&lt;b onclick=&quot;x&quot;&gt;A &amp; B&#x27;s &quot;note&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn config_deserializes_mode() {
        let config: SanitizerConfig = serde_json::from_str(r#"{"mode":"escape_only"}"#).unwrap();
        assert_eq!(config.mode, RenderMode::EscapeOnly);
        assert_eq!(config.link_target, "_blank");
    }

    proptest! {
        #[test]
        fn escaped_output_has_no_markup(input in ".*") {
            let out = escape_html(&input);
            prop_assert!(!out.contains('<'));
            prop_assert!(!out.contains('>'));
            prop_assert!(!out.contains('"'));
        }
    }
}

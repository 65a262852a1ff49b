//! URL policy for `href` and `src` attributes

/// Schemes accepted on links and media
pub const ALLOWED_SCHEMES: [&str; 4] = ["http", "https", "mailto", "tel"];

/// Inline image types accepted as base64 `data:` URIs on `img src`
pub const ALLOWED_DATA_IMAGE_TYPES: [&str; 5] =
    ["image/png", "image/jpeg", "image/jpg", "image/gif", "image/webp"];

/// Whether `value` may be kept on `element`'s `attribute`
///
/// Accepts `http`/`https` everywhere, `mailto`/`tel` on links, root-relative
/// paths, fragment links, and base64 raster images on `img src`. Everything
/// else, including other relative forms and protocol-relative `//host` URLs,
/// is rejected.
#[must_use]
pub fn is_safe_url(element: &str, attribute: &str, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    if value.starts_with('#') {
        return attribute == "href";
    }
    if let Some(path) = value.strip_prefix('/') {
        return !path.starts_with('/') && !path.starts_with('\\');
    }

    let Some((scheme, rest)) = value.split_once(':') else {
        return false;
    };
    match scheme.to_ascii_lowercase().as_str() {
        "http" | "https" => true,
        "mailto" | "tel" => attribute == "href",
        "data" => element == "img" && attribute == "src" && is_safe_data_image(rest),
        _ => false,
    }
}

/// Check the part of a `data:` URI after the scheme
fn is_safe_data_image(rest: &str) -> bool {
    let Some((meta, payload)) = rest.split_once(',') else {
        return false;
    };
    let Some(mime) = meta.to_ascii_lowercase().strip_suffix(";base64").map(str::to_string) else {
        return false;
    };
    ALLOWED_DATA_IMAGE_TYPES.contains(&mime.as_str())
        && !payload.is_empty()
        && payload
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_web_urls() {
        assert!(is_safe_url("a", "href", "https://doi.org/10.1000/xyz"));
        assert!(is_safe_url("img", "src", "http://cdn.example.org/fig1.png"));
        assert!(is_safe_url("a", "href", "HTTPS://EXAMPLE.ORG"));
    }

    #[test]
    fn accepts_root_relative_and_fragments() {
        assert!(is_safe_url("a", "href", "/editor/manuscripts/42"));
        assert!(is_safe_url("a", "href", "#section-2"));
        assert!(!is_safe_url("img", "src", "#section-2"));
    }

    #[test]
    fn rejects_protocol_relative_and_bare_relative() {
        assert!(!is_safe_url("a", "href", "//evil.example"));
        assert!(!is_safe_url("a", "href", "/\\evil.example"));
        assert!(!is_safe_url("a", "href", "manuscripts/42"));
        assert!(!is_safe_url("a", "href", "../secret"));
    }

    #[test]
    fn rejects_script_schemes() {
        assert!(!is_safe_url("a", "href", "javascript:alert(1)"));
        assert!(!is_safe_url("a", "href", " JaVaScRiPt:alert(1)"));
        assert!(!is_safe_url("a", "href", "vbscript:msgbox(1)"));
        assert!(!is_safe_url("a", "href", ""));
    }

    #[test]
    fn contact_schemes_only_on_links() {
        assert!(is_safe_url("a", "href", "mailto:editor@journal.org"));
        assert!(is_safe_url("a", "href", "tel:+15551234"));
        assert!(!is_safe_url("img", "src", "mailto:editor@journal.org"));
    }

    #[test]
    fn data_uris_restricted_to_raster_images() {
        assert!(is_safe_url("img", "src", "data:image/png;base64,iVBORw0KGgo="));
        assert!(is_safe_url("img", "src", "data:IMAGE/JPEG;base64,/9j/4AAQ"));
        assert!(!is_safe_url("img", "src", "data:image/svg+xml;base64,PHN2Zz4="));
        assert!(!is_safe_url("img", "src", "data:image/png,rawbytes"));
        assert!(!is_safe_url("img", "src", "data:image/png;base64,<script>"));
        assert!(!is_safe_url("a", "href", "data:image/png;base64,iVBORw0KGgo="));
        assert!(!is_safe_url("img", "src", "data:text/html;base64,PGgxPg=="));
    }
}

//! URL resolution utilities.
//!
//! [URL Standard](https://url.spec.whatwg.org/)
//!
//! Only the subset needed to locate stylesheets, images and link targets is
//! implemented: scheme detection, protocol-relative and path-absolute
//! references, and dot-segment removal for relative paths.

/// Whether `href` carries a scheme we know how to load directly.
#[must_use]
pub fn is_absolute(href: &str) -> bool {
    scheme_of(href).is_some()
}

/// The scheme of an absolute URL (`"http"`, `"file"`, `"data"`, ...).
///
/// [URL Standard § 4.3](https://url.spec.whatwg.org/#url-parsing)
/// "An absolute-URL string is a URL-scheme string, followed by U+003A (:),
/// followed by a scheme-specific part."
#[must_use]
pub fn scheme_of(href: &str) -> Option<&str> {
    let colon = href.find(':')?;
    let scheme = &href[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    // A single letter before the colon is a Windows drive, not a scheme.
    if scheme.len() < 2 || !first.is_ascii_alphabetic() {
        return None;
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(scheme)
}

/// Resolve a potentially relative URL against a base URL.
///
/// # Algorithm
///
/// [§ 2.5 URLs](https://html.spec.whatwg.org/multipage/urls-and-fetching.html#resolving-urls)
///
/// STEP 1: "If url is an absolute URL, return url."
///
/// STEP 2: "Otherwise, resolve url relative to base."
#[must_use]
pub fn resolve_url(href: &str, base_url: Option<&str>) -> String {
    // STEP 1: Already absolute.
    if is_absolute(href) {
        return href.to_string();
    }

    let Some(base) = base_url else {
        return href.to_string();
    };

    // Fragment-only references stay on the base document.
    if href.starts_with('#') {
        let (doc, _) = split_fragment(base);
        return format!("{doc}{href}");
    }

    // STEP 2: Relative against base.
    let (origin, base_path) = split_origin(base);

    if let Some(rest) = href.strip_prefix("//") {
        let scheme = scheme_of(base).unwrap_or("http");
        return format!("{scheme}://{rest}");
    }

    if href.starts_with('/') {
        return format!("{origin}{}", remove_dot_segments(href));
    }

    let base_dir = base_path.rsplit_once('/').map_or("", |(dir, _)| dir);
    let joined = if base_dir.is_empty() && origin.is_empty() {
        href.to_string()
    } else {
        format!("{base_dir}/{href}")
    };
    format!("{origin}{}", remove_dot_segments(&joined))
}

/// Split `url` into the part before `#` and the fragment (without `#`).
#[must_use]
pub fn split_fragment(url: &str) -> (&str, Option<&str>) {
    match url.split_once('#') {
        Some((doc, frag)) => (doc, Some(frag)),
        None => (url, None),
    }
}

/// The element id a same-document reference such as `"#intro"` points at.
///
/// Returns `None` for references without a fragment or with an empty one.
#[must_use]
pub fn fragment_id(url: &str) -> Option<&str> {
    split_fragment(url).1.filter(|f| !f.is_empty())
}

/// Split an absolute URL into `scheme://authority` and the remaining path.
///
/// `file:` URLs and plain paths have an empty origin unless they use the
/// `file://` form.
fn split_origin(url: &str) -> (&str, &str) {
    let (doc, _) = split_fragment(url);
    match doc.find("://") {
        Some(scheme_end) => {
            let after = scheme_end + 3;
            match doc[after..].find('/') {
                Some(path_start) => doc.split_at(after + path_start),
                None => (doc, ""),
            }
        }
        None => ("", doc),
    }
}

/// [RFC 3986 § 5.2.4 Remove Dot Segments](https://www.rfc-editor.org/rfc/rfc3986#section-5.2.4)
fn remove_dot_segments(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut out: Vec<&str> = Vec::new();
    let segments: Vec<&str> = path.split('/').collect();
    let last = segments.len().saturating_sub(1);
    for (i, segment) in segments.iter().enumerate() {
        match *segment {
            "." => {
                if i == last {
                    out.push("");
                }
            }
            ".." => {
                if out.last().is_some_and(|s| !s.is_empty()) {
                    let _ = out.pop();
                }
                if i == last {
                    out.push("");
                }
            }
            "" if i != last => {}
            s => out.push(s),
        }
    }
    let joined = out.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_pass_through() {
        assert_eq!(
            resolve_url("https://a.example/x.css", Some("file:///doc/index.html")),
            "https://a.example/x.css"
        );
        assert_eq!(resolve_url("data:text/css,p{}", None), "data:text/css,p{}");
    }

    #[test]
    fn relative_paths_are_normalized() {
        let base = Some("https://example.com/docs/guide/index.html");
        assert_eq!(
            resolve_url("../css/print.css", base),
            "https://example.com/docs/css/print.css"
        );
        assert_eq!(
            resolve_url("./a.css", base),
            "https://example.com/docs/guide/a.css"
        );
        assert_eq!(resolve_url("/root.css", base), "https://example.com/root.css");
        assert_eq!(
            resolve_url("//cdn.example.com/x.css", base),
            "https://cdn.example.com/x.css"
        );
    }

    #[test]
    fn file_paths_without_scheme() {
        assert_eq!(
            resolve_url("b.css", Some("/srv/book/main.css")),
            "/srv/book/b.css"
        );
        assert_eq!(resolve_url("b.css", Some("main.css")), "b.css");
        assert_eq!(
            resolve_url("b.css", Some("file:///srv/book/main.css")),
            "file:///srv/book/b.css"
        );
    }

    #[test]
    fn fragments() {
        assert_eq!(fragment_id("#ch2"), Some("ch2"));
        assert_eq!(fragment_id("book.html#ch2"), Some("ch2"));
        assert_eq!(fragment_id("book.html"), None);
        assert_eq!(fragment_id("#"), None);
        assert_eq!(
            resolve_url("#top", Some("https://e.com/a.html#old")),
            "https://e.com/a.html#top"
        );
    }

    #[test]
    fn windows_drive_is_not_a_scheme() {
        assert!(!is_absolute("C:/fonts/a.css"));
        assert_eq!(scheme_of("mailto:x@y"), Some("mailto"));
    }
}

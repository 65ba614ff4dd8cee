//! Author stylesheet collection and `@import` resolution.
//!
//! Selector matching and the cascade belong to the external style resolver;
//! this module only gathers the CSS text it needs, in cascade order:
//!
//! 1. `<link rel="stylesheet">` and `<style>` elements in document order
//!    ([`StylesheetLoader::load_document`]).
//! 2. Each sheet's `@import` rules, recursively, ahead of the sheet's own
//!    rules.
//!
//! [§ 6.1 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
//! "Declarations from style sheets independently linked by the originating
//! document are treated as if they were concatenated in linking order."

use quire_common::{DiagnosticId, Diagnostics, ResourceFetcher, resolve_url};
use quire_dom::{DomTree, ElementData, NodeId};
use serde::Serialize;

use crate::config::MediaType;

/// CSS text ready for the style resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadedStylesheet {
    /// Concatenated CSS with `@import` rules replaced by the imported text.
    pub css: String,
    /// Absolute URLs of every fetched sheet, in load order.
    pub sources: Vec<String>,
    /// `import-cycle` and `resource-fetch-failed` reports.
    pub diagnostics: Diagnostics,
}

/// Resolves stylesheets through a [`ResourceFetcher`].
pub struct StylesheetLoader<'a> {
    fetcher: &'a dyn ResourceFetcher,
    media: MediaType,
}

/// One `@import` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ImportRule {
    href: String,
    media: String,
}

impl<'a> StylesheetLoader<'a> {
    /// A loader for documents rendered as `media`.
    #[must_use]
    pub fn new(fetcher: &'a dyn ResourceFetcher, media: MediaType) -> Self {
        Self { fetcher, media }
    }

    /// Fetch the sheet at `href` and everything it imports.
    ///
    /// An unavailable sheet is reported and treated as empty.
    #[must_use]
    pub fn load(&self, href: &str, base_url: Option<&str>) -> LoadedStylesheet {
        let mut out = LoadedStylesheet::default();
        let url = resolve_url(href, base_url);
        self.load_url(&url, &mut Vec::new(), &mut out);
        out
    }

    /// Resolve the imports of CSS text embedded in a document at `base_url`.
    #[must_use]
    pub fn load_inline(&self, css: &str, base_url: Option<&str>) -> LoadedStylesheet {
        let mut out = LoadedStylesheet::default();
        self.expand(css, base_url, &mut Vec::new(), &mut out);
        out
    }

    /// [§ 4.2.4 The link element](https://html.spec.whatwg.org/multipage/semantics.html#the-link-element)
    /// [§ 4.2.6 The style element](https://html.spec.whatwg.org/multipage/semantics.html#the-style-element)
    ///
    /// All author stylesheets of `tree`, in document order. `media`
    /// attributes that do not match the loader's media type exclude the
    /// sheet.
    #[must_use]
    pub fn load_document(&self, tree: &DomTree, base_url: Option<&str>) -> LoadedStylesheet {
        let mut out = LoadedStylesheet::default();
        for id in tree.descendants(NodeId::ROOT) {
            let Some(data) = tree.as_element(id) else {
                continue;
            };
            if !self.media.matches(data.attr("media").unwrap_or("")) {
                continue;
            }
            if data.is("link") && is_stylesheet_link(data) {
                if let Some(href) = data.attr("href").map(str::trim)
                    && !href.is_empty()
                {
                    let url = resolve_url(href, base_url);
                    self.load_url(&url, &mut Vec::new(), &mut out);
                }
            } else if data.is("style") {
                let css = tree.text_content(id);
                self.expand(&css, base_url, &mut Vec::new(), &mut out);
            }
        }
        out
    }

    /// STEP 1: detect cycles against the chain of sheets being loaded.
    /// STEP 2: fetch; on failure act as if the sheet were empty.
    /// STEP 3: expand the sheet's own imports.
    fn load_url(&self, url: &str, chain: &mut Vec<String>, out: &mut LoadedStylesheet) {
        if chain.iter().any(|u| u == url) {
            let mut cycle = chain.clone();
            cycle.push(url.to_string());
            out.diagnostics
                .warn(DiagnosticId::ImportCycle, cycle.join(" -> "));
            return;
        }
        let text = match self.fetcher.fetch_text(url) {
            Ok(text) => text,
            Err(e) => {
                // "If the resource is not available, the user agent must act
                // as if the resource was an empty style sheet."
                out.diagnostics.error(DiagnosticId::ResourceFetchFailed, e.to_string());
                return;
            }
        };
        #[cfg(feature = "layout-trace")]
        eprintln!("[STYLESHEET] loaded {url} ({} bytes)", text.len());
        out.sources.push(url.to_string());
        chain.push(url.to_string());
        self.expand(&text, Some(url), chain, out);
        let _ = chain.pop();
    }

    fn expand(
        &self,
        css: &str,
        base_url: Option<&str>,
        chain: &mut Vec<String>,
        out: &mut LoadedStylesheet,
    ) {
        let (imports, rest) = split_imports(css);
        for import in imports {
            if !self.media.matches(&import.media) {
                continue;
            }
            let url = resolve_url(&import.href, base_url);
            self.load_url(&url, chain, out);
        }
        let rest = rest.trim();
        if !rest.is_empty() {
            if !out.css.is_empty() {
                out.css.push('\n');
            }
            out.css.push_str(rest);
        }
    }
}

fn is_stylesheet_link(data: &ElementData) -> bool {
    data.attr("rel").is_some_and(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    })
}

/// Byte offset of the first character after whitespace and comments.
fn skip_trivia(css: &str, mut pos: usize) -> usize {
    loop {
        let rest = &css[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        if let Some(body) = trimmed.strip_prefix("/*") {
            pos += 2 + body.find("*/").map_or(body.len(), |end| end + 2);
        } else {
            return pos;
        }
    }
}

/// Offset just past the `;` that ends the statement starting at `pos`,
/// ignoring semicolons inside quotes and parentheses.
fn statement_end(css: &str, pos: usize) -> usize {
    let mut quote = None;
    let mut depth = 0usize;
    for (i, c) in css[pos..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => return pos + i + 1,
            _ => {}
        }
    }
    css.len()
}

/// Parse the prelude of an `@import` rule: `url(...)` or a string, then an
/// optional media query list.
fn parse_import(prelude: &str) -> Option<ImportRule> {
    let prelude = prelude.trim().trim_end_matches(';').trim();
    let unquote = |s: &str| {
        let s = s.trim();
        s.strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
            .unwrap_or(s)
            .to_string()
    };
    let (href, media) = if prelude.get(..4).is_some_and(|s| s.eq_ignore_ascii_case("url(")) {
        let close = prelude.find(')')?;
        (unquote(&prelude[4..close]), &prelude[close + 1..])
    } else if let Some(quote @ ('"' | '\'')) = prelude.chars().next() {
        let close = prelude[1..].find(quote)? + 1;
        (prelude[1..close].to_string(), &prelude[close + 1..])
    } else {
        return None;
    };
    (!href.is_empty()).then(|| ImportRule {
        href,
        media: media.trim().to_string(),
    })
}

/// [§ 2.1 Importing Style Sheets](https://www.w3.org/TR/css-cascade-4/#at-import)
///
/// "Any @import rules must precede all other valid at-rules and style
/// rules in a style sheet (ignoring @charset and @layer statement rules)"
///
/// Returns the leading imports and the remainder of the sheet.
fn split_imports(css: &str) -> (Vec<ImportRule>, &str) {
    let mut imports = Vec::new();
    let mut pos = skip_trivia(css, 0);
    loop {
        let rest = &css[pos..];
        let keyword = |k: &str| rest.get(..k.len()).is_some_and(|s| s.eq_ignore_ascii_case(k));
        if keyword("@charset") {
            pos = skip_trivia(css, statement_end(css, pos));
        } else if keyword("@import") {
            let end = statement_end(css, pos);
            if let Some(rule) = parse_import(&css[pos + "@import".len()..end]) {
                imports.push(rule);
            }
            pos = skip_trivia(css, end);
        } else {
            return (imports, rest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_imports_forms() {
        let css = "@charset \"utf-8\";\n/* c */ @import url(\"a.css\");\n@import 'b.css' print;\
                   @import url(c.css) screen, print;\np { color: red }\n@import 'late.css';";
        let (imports, rest) = split_imports(css);
        let hrefs: Vec<&str> = imports.iter().map(|i| i.href.as_str()).collect();
        assert_eq!(hrefs, ["a.css", "b.css", "c.css"]);
        assert_eq!(imports[1].media, "print");
        assert_eq!(imports[2].media, "screen, print");
        assert!(rest.starts_with("p { color: red }"));
    }

    #[test]
    fn test_malformed_import_is_dropped() {
        let (imports, rest) = split_imports("@import foo;\nh1 {}");
        assert!(imports.is_empty());
        assert_eq!(rest, "h1 {}");
    }
}

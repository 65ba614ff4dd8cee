//! `@import` resolution and document stylesheet collection.

use quire_common::{DiagnosticId, MapFetcher, Severity};
use quire_dom::{StyledDocumentSpec, StyledNodeSpec as N};
use quire_layout::{MediaType, StylesheetLoader};

const BASE: &str = "https://docs.test/css/";

/// Helper to build an absolute URL under [`BASE`].
fn url(name: &str) -> String {
    format!("{BASE}{name}")
}

#[test]
fn test_imports_precede_the_importing_sheet() {
    let fetcher = MapFetcher::new()
        .with(url("main.css"), "@import 'base.css';\n@import url(\"../type.css\");\nh1 { color: red }")
        .with(url("base.css"), "body { margin: 0 }")
        .with("https://docs.test/type.css", "p { orphans: 3 }");
    let loaded = StylesheetLoader::new(&fetcher, MediaType::Print).load("main.css", Some(BASE));

    assert_eq!(
        loaded.css,
        "body { margin: 0 }\np { orphans: 3 }\nh1 { color: red }"
    );
    assert_eq!(
        loaded.sources,
        [url("main.css"), url("base.css"), "https://docs.test/type.css".to_string()]
    );
    assert!(loaded.diagnostics.is_empty());
}

#[test]
fn test_import_cycle_is_broken() {
    let fetcher = MapFetcher::new()
        .with(url("a.css"), "@import 'b.css';\na { color: red }")
        .with(url("b.css"), "@import url(a.css);\nb { color: blue }");
    let loaded = StylesheetLoader::new(&fetcher, MediaType::Print).load(&url("a.css"), None);

    assert_eq!(loaded.css, "b { color: blue }\na { color: red }");
    assert_eq!(loaded.sources, [url("a.css"), url("b.css")]);
    assert_eq!(loaded.diagnostics.count(DiagnosticId::ImportCycle), 1);
}

#[test]
fn test_missing_import_is_an_error_and_empty() {
    let fetcher = MapFetcher::new().with(url("main.css"), "@import 'gone.css';\np {}");
    let loaded = StylesheetLoader::new(&fetcher, MediaType::Print).load(&url("main.css"), None);

    assert_eq!(loaded.css, "p {}");
    assert_eq!(loaded.diagnostics.count(DiagnosticId::ResourceFetchFailed), 1);
    assert_eq!(loaded.diagnostics.count_severity(Severity::Error), 1);
    assert!(loaded.diagnostics.has_errors());
}

#[test]
fn test_media_lists_filter_imports() {
    let fetcher = MapFetcher::new()
        .with(url("main.css"), "@import 'screen.css' screen;\n@import 'print.css' print;")
        .with(url("screen.css"), "s {}")
        .with(url("print.css"), "p {}");

    let print = StylesheetLoader::new(&fetcher, MediaType::Print).load(&url("main.css"), None);
    assert_eq!(print.css, "p {}");

    let screen = StylesheetLoader::new(&fetcher, MediaType::Screen).load(&url("main.css"), None);
    assert_eq!(screen.css, "s {}");
}

#[test]
fn test_data_url_import() {
    // "p {}" in base64.
    let fetcher = MapFetcher::new();
    let loaded = StylesheetLoader::new(&fetcher, MediaType::Print)
        .load_inline("@import url(data:text/css;base64,cCB7fQ==);\nh2 {}", Some(BASE));
    assert_eq!(loaded.css, "p {}\nh2 {}");
    assert!(loaded.diagnostics.is_empty());
}

#[test]
fn test_document_sheets_in_order() {
    let doc = StyledDocumentSpec::new(
        N::element("html").child(
            N::element("head")
                .child(
                    N::element("link")
                        .attr("rel", "stylesheet")
                        .attr("href", "first.css"),
                )
                .child(N::element("style").child(N::text("@import 'second.css';\nem {}")))
                .child(
                    N::element("link")
                        .attr("rel", "stylesheet")
                        .attr("href", "screen-only.css")
                        .attr("media", "screen"),
                )
                .child(N::element("link").attr("rel", "icon").attr("href", "icon.png")),
        ),
    );
    let tree = doc.into_styled_tree().unwrap();
    let fetcher = MapFetcher::new()
        .with(url("first.css"), "h1 {}")
        .with(url("second.css"), "h2 {}")
        .with(url("screen-only.css"), "nav {}");

    let loaded =
        StylesheetLoader::new(&fetcher, MediaType::Print).load_document(tree.dom(), Some(BASE));
    assert_eq!(loaded.css, "h1 {}\nh2 {}\nem {}");
    assert_eq!(loaded.sources, [url("first.css"), url("second.css")]);
}

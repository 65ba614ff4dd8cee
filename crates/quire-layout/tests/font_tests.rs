//! Font matching and fallback tests.

use quire_common::DiagnosticId;
use quire_dom::{StyledDocumentSpec, StyledNodeSpec as N};
use quire_layout::{
    ConversionConfig, FallbackStrategy, FontFace, FontProvider, PagedDocument, convert,
};

/// Latin, Greek and monospace faces, each covering one script.
fn script_faces() -> FontProvider {
    FontProvider::new(vec![
        FontFace::new("Body Latin", "body").with_coverage(&[(0x20, 0x7E)]),
        FontFace::new("Body Greek", "greek").with_coverage(&[(0x370, 0x3FF)]),
        FontFace::new("Code", "mono")
            .with_coverage(&[(0x20, 0x7E)])
            .with_advance(0.6),
    ])
}

/// Helper to convert one paragraph of `text` set in `family`.
fn set_text(text: &str, family: &str, config: &ConversionConfig) -> PagedDocument {
    let root = N::element("html").child(
        N::element("p")
            .style("font-family", family)
            .child(N::text(text)),
    );
    let tree = StyledDocumentSpec::new(root).into_styled_tree().unwrap();
    convert(&tree, config).unwrap()
}

#[test]
fn test_default_faces() {
    let paged = set_text("plain", "monospace", &ConversionConfig::default());
    assert_eq!(paged.fonts_used, ["Quire Mono"]);
}

#[test]
fn test_fallback_picks_covering_face() {
    let config = ConversionConfig::default().with_fonts(script_faces());
    let paged = set_text("alpha αβγ omega", "body", &config);
    assert_eq!(paged.fonts_used, ["Body Latin", "Body Greek"]);

    let greek: Vec<&str> = paged.pages[0].lines[0]
        .texts
        .iter()
        .filter(|t| t.font == "Body Greek")
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(greek.concat().trim(), "αβγ");
    assert!(paged.diagnostics.is_empty());
}

#[test]
fn test_family_list_is_tried_in_order() {
    let config = ConversionConfig::default().with_fonts(script_faces());
    let paged = set_text("code", "mono, body", &config);
    assert_eq!(paged.fonts_used, ["Code"]);
}

#[test]
fn test_uncovered_character_is_reported_once() {
    let config = ConversionConfig::default()
        .with_fonts(script_faces())
        .with_fallback(FallbackStrategy::RangeRestricted);
    let paged = set_text("a → b → c", "body", &config);
    assert_eq!(paged.diagnostics.count(DiagnosticId::MissingGlyph), 1);
    // The character is still set, in the primary face.
    assert_eq!(paged.fonts_used, ["Body Latin"]);
}

#[test]
fn test_faces_without_coverage_match_everything_under_best_match() {
    let fonts = FontProvider::new(vec![
        FontFace::new("Narrow", "narrow").with_coverage(&[(0x20, 0x7E)]),
        FontFace::new("Anything", "wide"),
    ]);
    let config = ConversionConfig::default().with_fonts(fonts.clone());
    let paged = set_text("x → y", "narrow", &config);
    assert_eq!(paged.fonts_used, ["Narrow", "Anything"]);
    assert!(paged.diagnostics.is_empty());

    let config = ConversionConfig::default()
        .with_fonts(fonts)
        .with_fallback(FallbackStrategy::RangeRestricted);
    let paged = set_text("x → y", "narrow", &config);
    assert_eq!(paged.fonts_used, ["Narrow"]);
    assert_eq!(paged.diagnostics.count(DiagnosticId::MissingGlyph), 1);
}

#[test]
fn test_wider_face_makes_wider_lines() {
    let config = ConversionConfig::default().with_fonts(script_faces());
    let width = |family: &str| {
        let paged = set_text("measure", family, &config);
        paged.pages[0].lines[0].texts.iter().map(|t| t.rect.width).sum::<f32>()
    };
    assert!(width("mono") > width("body"));
}

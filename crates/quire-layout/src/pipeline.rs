//! The conversion pipeline.
//!
//! One pass is: build boxes → lay out the strip → fragment into pages →
//! resolve `target-counter()` requests. Page numbers feed back into generated
//! text, which can move content to other pages, so passes repeat until the
//! resolved values stop changing or the configured pass limit is reached.

use std::collections::BTreeSet;

use quire_common::{DiagnosticId, Diagnostics};
use quire_dom::StyledTree;

use crate::builder::BoxTreeBuilder;
use crate::config::ConversionConfig;
use crate::error::QuireError;
use crate::layout::{LayoutContext, layout_document};
use crate::paginate::{Fragmenter, PagedDocument, Page};
use crate::target::{TargetValues, resolve_requests};

/// Convert a styled tree into pages.
///
/// Diagnostics of the final pass are returned in the document; earlier
/// passes' reports are discarded, so each problem is reported once.
///
/// # Errors
///
/// Returns an error for an invalid configuration or a tree without a root
/// element. Everything else degrades with a diagnostic.
pub fn convert(tree: &StyledTree, config: &ConversionConfig) -> Result<PagedDocument, QuireError> {
    config.validate()?;
    let area = config.page_area();
    let mut targets = TargetValues::new();
    let mut pass = 0;
    loop {
        pass += 1;
        let mut diagnostics = Diagnostics::new();

        // STEP 1: Box tree, rendering target-counter() from the last pass.
        let built = BoxTreeBuilder::new(tree, config, &targets, &mut diagnostics).build()?;
        let mut root = built.root;

        // STEP 2: Layout on the continuous strip.
        {
            let mut ctx =
                LayoutContext::new(&config.fonts, config.fallback, &mut diagnostics, area);
            layout_document(&mut root, &mut ctx, area.width);
        }

        // STEP 3: Fragmentation.
        let pagination = Fragmenter::new(config, &mut diagnostics).paginate(&root);

        // STEP 4: Cross references.
        let resolved = resolve_requests(
            &built.requests,
            &built.snapshots,
            |id| pagination.anchors.get(id).copied(),
            &mut diagnostics,
        );
        #[cfg(feature = "layout-trace")]
        eprintln!(
            "[PIPELINE] pass {pass}: {} pages, {} target-counter requests, {} resolved",
            pagination.pages.len(),
            built.requests.len(),
            resolved.len()
        );

        let stable = built.requests.is_empty() || resolved == targets;
        if stable || pass >= config.max_relayouts {
            if !stable {
                diagnostics.warn(
                    DiagnosticId::RelayoutBudgetExceeded,
                    format!(
                        "target-counter() values still changing after {pass} pass(es); \
                         keeping the last layout"
                    ),
                );
            }
            return Ok(PagedDocument {
                fonts_used: fonts_used(config, &pagination.pages),
                pages: pagination.pages,
                box_tree: root,
                diagnostics,
                relayout_passes: pass,
                anchors: pagination.anchors,
            });
        }
        targets = resolved;
    }
}

/// The faces that set at least one piece of text, in provider order.
fn fonts_used(config: &ConversionConfig, pages: &[Page]) -> Vec<String> {
    let used: BTreeSet<&str> = pages
        .iter()
        .flat_map(|p| p.lines.iter())
        .flat_map(|l| l.texts.iter())
        .map(|t| t.font.as_str())
        .collect();
    config
        .fonts
        .faces()
        .iter()
        .filter(|face| used.contains(face.name.as_str()))
        .map(|face| face.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_dom::{StyledDocumentSpec, StyledNodeSpec as N};

    fn tree(root: N) -> StyledTree {
        StyledDocumentSpec::new(root).into_styled_tree().unwrap()
    }

    #[test]
    fn test_single_pass_without_references() {
        let tree = tree(N::element("html").child(N::element("p").child(N::text("Hello"))));
        let paged = convert(&tree, &ConversionConfig::default()).unwrap();
        assert_eq!(paged.relayout_passes, 1);
        assert_eq!(paged.pages.len(), 1);
        assert_eq!(paged.pages[0].text(), "Hello");
        assert_eq!(paged.fonts_used, ["Quire Serif"]);
    }

    #[test]
    fn test_pass_limit_is_reported() {
        let tree = tree(
            N::element("html")
                .child(
                    N::element("p")
                        .attr("id", "me")
                        .before("content", "target-counter(url(#me), page)"),
                ),
        );
        let config = ConversionConfig::default().with_max_relayouts(1);
        let paged = convert(&tree, &config).unwrap();
        assert_eq!(paged.relayout_passes, 1);
        assert_eq!(
            paged.diagnostics.count(DiagnosticId::RelayoutBudgetExceeded),
            1
        );
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let tree = tree(N::element("html"));
        let config = ConversionConfig::default().with_margins([600.0; 4]);
        assert!(matches!(
            convert(&tree, &config),
            Err(QuireError::InvalidConfig(_))
        ));
    }
}

//! Paginated HTML+CSS layout for the Quire engine.
//!
//! This crate turns a [`quire_dom::StyledTree`] into a [`PagedDocument`]:
//!
//! 1. **Box tree builder** ([`builder`]) - generates layout boxes from styled
//!    elements, including anonymous boxes, list markers and generated content.
//! 2. **Formatting contexts** ([`layout`]) - block, inline, float, flex,
//!    table and positioned layout on one continuous strip of page width.
//! 3. **Fragmentation** ([`paginate`]) - splits the laid-out strip into pages,
//!    honouring forced breaks, orphans/widows and keep-together rules.
//! 4. **Counters** ([`counters`], [`target`]) - CSS counters and
//!    `target-counter()` cross references, resolved by a bounded relayout
//!    loop in [`pipeline`].
//!
//! # Example
//!
//! ```
//! use quire_dom::{StyledDocumentSpec, StyledNodeSpec};
//! use quire_layout::{convert, ConversionConfig};
//!
//! let doc = StyledDocumentSpec::new(
//!     StyledNodeSpec::element("html")
//!         .child(StyledNodeSpec::element("p").child(StyledNodeSpec::text("Hello"))),
//! );
//! let tree = doc.into_styled_tree().unwrap();
//! let paged = convert(&tree, &ConversionConfig::default()).unwrap();
//! assert_eq!(paged.pages.len(), 1);
//! ```

pub mod builder;
pub mod config;
pub mod content;
pub mod counters;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod paginate;
pub mod pipeline;
pub mod style;
pub mod stylesheet;
pub mod target;

pub use config::{ConfigFile, ConversionConfig, MediaType, PageSize};
pub use error::QuireError;
pub use fonts::{FallbackStrategy, FontFace, FontProvider};
pub use layout::{BoxDimensions, BoxId, BoxKind, EdgeSizes, LayoutBox, Rect};
pub use paginate::{Fragment, Page, PagedDocument, PlacedLine, PlacedText};
pub use pipeline::convert;
pub use style::{CssValidator, DeviceCmykValidator, PropertyValidator};
pub use stylesheet::{LoadedStylesheet, StylesheetLoader};

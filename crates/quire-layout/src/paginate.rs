//! Fragmentation of the continuous layout into pages.
//!
//! [CSS Fragmentation Module Level 3](https://www.w3.org/TR/css-break-3/)
//!
//! "A fragmentation container (fragmentainer) is a box, such as a page box,
//! that contains a portion (or all) of a fragmented flow."
//!
//! Layout runs once on a strip as wide as the page content area and as tall
//! as the content. [`Fragmenter`] then walks the laid-out tree in document
//! order choosing break points on that strip:
//!
//! - **Class A** breaks between sibling block boxes, forced by
//!   `break-before`/`break-after` or needed because the next box overflows.
//! - **Class C** breaks between line boxes, constrained by `orphans` and
//!   `widows`.
//!
//! Every page is then the strip slice between two break points. Pushing a box
//! to the next page starts that page at the box's border edge, which
//! truncates the margin above it: "When an unforced break occurs between
//! block-level boxes, any margins adjoining the break are truncated to zero."

use std::collections::{BTreeMap, HashMap};

use quire_common::{DiagnosticId, Diagnostics};
use quire_dom::NodeId;
use serde::Serialize;

use crate::builder::is_continuous_container;
use crate::config::ConversionConfig;
use crate::layout::{BoxId, BoxKind, EPSILON, FragmentContent, LayoutBox, LineBox, Rect};
use crate::style::{BreakBetween, PositionType};

/// How much of a box has been emitted as fragments so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementState {
    /// No fragment yet.
    #[default]
    NotStarted,
    /// Some fragments placed; the box continues on a later page.
    PartiallyPlaced,
    /// The last fragment has been placed.
    FullyPlaced,
}

/// The piece of one box that lies on one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment {
    /// Box the fragment belongs to.
    pub box_id: BoxId,
    /// DOM node that generated the box, if any.
    pub node: Option<NodeId>,
    /// Index of the page in [`PagedDocument::pages`].
    pub page_index: usize,
    /// Border box slice in page coordinates.
    pub rect: Rect,
    /// Whether the box continues on a later page.
    pub continues: bool,
}

/// Text in one face on a placed line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedText {
    /// The characters.
    pub text: String,
    /// Face name, as listed in [`PagedDocument::fonts_used`].
    pub font: String,
    /// Font size in px.
    pub font_size: f32,
    /// Position in page coordinates.
    pub rect: Rect,
    /// Computed `color`.
    pub color: String,
}

/// A line box on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLine {
    /// Line box rectangle in page coordinates.
    pub rect: Rect,
    /// Baseline y in page coordinates.
    pub baseline: f32,
    /// Box the line belongs to.
    pub box_id: BoxId,
    /// Text on the line. Atomic inlines are fragments of their own.
    pub texts: Vec<PlacedText>,
}

/// [CSS Paged Media 3 § 3 Page Model](https://www.w3.org/TR/css-page-3/#page-model)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// Zero-based position in the document.
    pub index: usize,
    /// Page number, counting from 1. Odd pages are right pages.
    pub number: usize,
    /// A page inserted only to satisfy `break-before: left`/`right`.
    pub blank: bool,
    /// Page box width.
    pub width: f32,
    /// Page box height.
    pub height: f32,
    /// The page area inside the margins.
    pub content_area: Rect,
    /// Box fragments in document order.
    pub fragments: Vec<Fragment>,
    /// Line boxes in document order.
    pub lines: Vec<PlacedLine>,
}

impl Page {
    /// The text of the page, one line per line box.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                line.texts
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The result of a conversion.
#[derive(Debug, Clone, Serialize)]
pub struct PagedDocument {
    /// Pages in order.
    pub pages: Vec<Page>,
    /// Names of the faces that set text, in provider order.
    pub fonts_used: Vec<String>,
    /// The laid-out box tree of the final pass, in continuous coordinates.
    pub box_tree: LayoutBox,
    /// Diagnostics of the final pass.
    pub diagnostics: Diagnostics,
    /// Number of layout passes run.
    pub relayout_passes: usize,
    /// Page number of the first fragment of every element with an `id`.
    pub anchors: BTreeMap<String, usize>,
}

impl PagedDocument {
    /// Fragments of one box across all pages.
    #[must_use]
    pub fn fragments_of(&self, id: BoxId) -> Vec<&Fragment> {
        self.pages
            .iter()
            .flat_map(|p| p.fragments.iter())
            .filter(|f| f.box_id == id)
            .collect()
    }

    /// Page number of the element with `id`.
    #[must_use]
    pub fn page_of(&self, id: &str) -> Option<usize> {
        self.anchors.get(id).copied()
    }
}

/// Pages cut from a laid-out tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    /// Pages in order.
    pub pages: Vec<Page>,
    /// Page number of the first fragment of every element with an `id`.
    pub anchors: BTreeMap<String, usize>,
}

/// One page before fragments are assigned: where it starts on the strip.
#[derive(Debug, Clone, Copy)]
struct PageSlot {
    start: f32,
    blank: bool,
}

/// Chooses break points on the continuous strip.
pub struct Fragmenter<'a> {
    config: &'a ConversionConfig,
    diagnostics: &'a mut Diagnostics,
    page_height: f32,
    slots: Vec<PageSlot>,
}

/// Which pages a subtree is drawn on.
#[derive(Debug, Clone, Copy)]
enum Pin {
    /// In the flow: sliced by the page ranges.
    Flow,
    /// Out of flow: whole, on the page holding its top.
    Page(usize),
    /// `position: fixed`: on every page, relative to the page area.
    Every,
}

impl<'a> Fragmenter<'a> {
    /// A fragmenter for pages of `config`'s page area.
    pub fn new(config: &'a ConversionConfig, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            config,
            diagnostics,
            page_height: config.page_area().height,
            slots: vec![PageSlot {
                start: 0.0,
                blank: false,
            }],
        }
    }

    /// Split `root` into pages.
    pub fn paginate(mut self, root: &LayoutBox) -> Pagination {
        self.place(root);
        #[cfg(feature = "layout-trace")]
        eprintln!(
            "[PAGINATE] {} pages, breaks at {:?}",
            self.slots.len(),
            self.slots.iter().map(|s| s.start).collect::<Vec<_>>()
        );
        let pages = PageAssigner::new(self.config, &self.slots).assign(root);
        let anchors = anchors(root, &pages);
        Pagination { pages, anchors }
    }

    /// Strip offset where the current page starts.
    fn start(&self) -> f32 {
        self.slots.last().map_or(0.0, |s| s.start)
    }

    /// Strip offset where the current page ends.
    fn end(&self) -> f32 {
        self.start() + self.page_height
    }

    /// Start a new page at `y`, unless the current page is still empty
    /// there.
    fn break_at(&mut self, y: f32) {
        if y > self.start() + EPSILON {
            self.slots.push(PageSlot {
                start: y,
                blank: false,
            });
        }
    }

    /// [§ 3.1 Breaks Between Boxes](https://www.w3.org/TR/css-break-3/#break-between)
    ///
    /// "left: Force one or two page breaks before/after the principal box so
    /// that the next page is formatted as a left page."
    fn forced_break(&mut self, y: f32, kind: BreakBetween) {
        self.break_at(y);
        let number = self.slots.len();
        let wants_even = match kind {
            BreakBetween::Left => Some(true),
            BreakBetween::Right => Some(false),
            _ => None,
        };
        if let Some(even) = wants_even
            && (number % 2 == 0) != even
        {
            let start = self.start();
            let at = self.slots.len() - 1;
            self.slots.insert(at, PageSlot { start, blank: true });
        }
    }

    /// Break opportunities inside a box: between its lines, then between
    /// its in-flow block children.
    fn place(&mut self, b: &LayoutBox) {
        if !b.lines.is_empty() {
            let floats = line_floats(b);
            self.place_lines(b, &floats);
            for float in floats {
                self.place_float(float, &b.lines);
            }
        }
        let mut previous_after = BreakBetween::Auto;
        for child in &b.children {
            if is_page_float(child) && b.lines.is_empty() {
                self.place_float(child, &[]);
            }
            if !child.is_in_flow_block() {
                continue;
            }
            let forced = if child.style.break_before.is_forced() {
                Some(child.style.break_before)
            } else {
                previous_after.is_forced().then_some(previous_after)
            };
            if let Some(kind) = forced {
                self.forced_break(child.border_box().y, kind);
            }
            self.place_block(child);
            previous_after = child.style.break_after;
        }
    }

    /// [§ 4.4 Unforced Breaks](https://www.w3.org/TR/css-break-3/#unforced-breaks)
    fn place_block(&mut self, b: &LayoutBox) {
        let rect = b.border_box();
        let monolithic = is_monolithic(b);
        let keep = b.style.avoids_break_inside()
            || (self.config.continuous_container && is_continuous_container(b));
        if rect.bottom() > self.end() + EPSILON {
            if b.kind == BoxKind::TableWrapper && keep {
                // Rows are the unit of table fragmentation.
                self.diagnostics.warn(
                    DiagnosticId::KeepTogetherUnsupported,
                    format!("{}: table split between rows", b.describe()),
                );
            } else if monolithic || keep {
                if rect.height <= self.page_height + EPSILON {
                    // Fits on an empty page: move it there whole.
                    self.break_at(rect.y);
                } else {
                    self.does_not_fit(b);
                }
            }
        }
        if !monolithic {
            self.place(b);
        }
    }

    /// Floats are monolithic. One crossing the end of the page holding its
    /// top moves to a new page starting at the line beside it, or at its own
    /// top when there are no lines.
    fn place_float(&mut self, float: &LayoutBox, lines: &[LineBox]) {
        let rect = float.border_box();
        let page_start = self
            .slots
            .iter()
            .rev()
            .find(|s| s.start <= rect.y + EPSILON)
            .map_or(0.0, |s| s.start);
        if rect.bottom() <= page_start + self.page_height + EPSILON {
            return;
        }
        if rect.height > self.page_height + EPSILON {
            self.does_not_fit(float);
            return;
        }
        self.insert_break(line_top(lines, rect.y));
    }

    /// Start a new page at `y`, which may lie before the current page. The
    /// page that held `y` ends there.
    fn insert_break(&mut self, y: f32) {
        let at = self
            .slots
            .iter()
            .rposition(|s| s.start <= y + EPSILON)
            .unwrap_or(0);
        if y > self.slots[at].start + EPSILON {
            self.slots.insert(at + 1, PageSlot {
                start: y,
                blank: false,
            });
        }
    }

    /// Report a box that cannot be kept on one page.
    fn does_not_fit(&mut self, b: &LayoutBox) {
        self.diagnostics.warn(
            DiagnosticId::ElementDoesNotFit,
            format!(
                "{}: {:.0}px tall, page area is {:.0}px",
                b.describe(),
                b.border_box().height,
                self.page_height
            ),
        );
    }

    /// [§ 3.3 Breaks Between Lines: orphans, widows](https://www.w3.org/TR/css-break-3/#widows-orphans)
    ///
    /// "The orphans property specifies the minimum number of line boxes in a
    /// block container that must be left in a fragment before a
    /// fragmentation break. The widows property specifies the minimum number
    /// of line boxes of a block container that must be left in a fragment
    /// after a break."
    fn place_lines(&mut self, b: &LayoutBox, floats: &[&LayoutBox]) {
        let lines = &b.lines;
        let n = lines.len();
        let orphans = b.style.orphans.max(1) as usize;
        let widows = b.style.widows.max(1) as usize;
        let allow = self.config.allow_widow_orphan_violation;
        // First line of the block on the current page.
        let mut first = 0;
        while first < n {
            let end = self.end();
            // A float crossing the page end takes the line beside it to the
            // next page.
            let start = self.start();
            let float_break = floats
                .iter()
                .map(|f| f.border_box())
                .filter(|r| {
                    r.y >= start - EPSILON
                        && r.y < end
                        && r.bottom() > end + EPSILON
                        && r.height <= self.page_height + EPSILON
                })
                .map(|r| line_top(lines, r.y))
                .filter(|&y| y > start + EPSILON && y >= lines[first].rect.y - EPSILON)
                .reduce(f32::min);
            if let Some(y) = float_break {
                self.break_at(y);
                first = lines.iter().position(|l| l.rect.y >= y - EPSILON).unwrap_or(n);
                continue;
            }
            let Some(overflow) = (first..n).find(|&k| lines[k].rect.bottom() > end + EPSILON)
            else {
                return;
            };
            if overflow == first && lines[first].rect.y <= self.start() + EPSILON {
                // A line taller than the page: it stays and overflows.
                first += 1;
                continue;
            }
            let satisfies = |k: usize| k - first >= orphans && n - k >= widows;

            // STEP 1: The last break point that leaves enough lines on both
            //         sides.
            let chosen = if allow {
                None
            } else {
                (first + 1..=overflow).rev().find(|&k| satisfies(k))
            };
            let split = match chosen {
                Some(k) => k,
                None => {
                    // STEP 2: Push the whole block when an empty page would
                    //         satisfy both.
                    let top = b.border_box().y;
                    if !allow
                        && first == 0
                        && top > self.start() + EPSILON
                        && fits_from(lines, top, self.page_height, orphans, widows)
                    {
                        self.break_at(top);
                        continue;
                    }
                    // STEP 3: Split anyway.
                    if overflow > first && !satisfies(overflow) {
                        self.diagnostics.warn(
                            DiagnosticId::WidowOrphanViolation,
                            format!(
                                "{}: {} line(s) before and {} after the break, \
                                 orphans {orphans} widows {widows}",
                                b.describe(),
                                overflow - first,
                                n - overflow
                            ),
                        );
                    }
                    overflow
                }
            };
            self.break_at(lines[split].rect.y);
            first = split;
        }
    }
}

/// Whether lines starting on an empty page at `top` can be split with
/// enough lines on both sides of the first break.
fn fits_from(lines: &[LineBox], top: f32, page_height: f32, orphans: usize, widows: usize) -> bool {
    let end = top + page_height;
    let n = lines.len();
    match lines.iter().position(|l| l.rect.bottom() > end + EPSILON) {
        None => true,
        Some(overflow) => (1..=overflow).any(|k| k >= orphans && n - k >= widows),
    }
}

/// Top of the line box holding strip offset `y`, or `y` itself.
fn line_top(lines: &[LineBox], y: f32) -> f32 {
    lines
        .iter()
        .find(|l| l.rect.y <= y + EPSILON && y < l.rect.bottom() - EPSILON)
        .map_or(y, |l| l.rect.y)
}

/// A float placed by the fragmenter. Floats inside absolutely positioned
/// boxes travel with them.
fn is_page_float(b: &LayoutBox) -> bool {
    b.style.is_floated() && !b.style.is_absolutely_positioned()
}

/// Floats among the inline content of `b`, including those inside inline
/// boxes.
fn line_floats(b: &LayoutBox) -> Vec<&LayoutBox> {
    let mut out = Vec::new();
    for child in &b.children {
        if is_page_float(child) {
            out.push(child);
        } else if child.kind == BoxKind::Inline {
            out.extend(line_floats(child));
        }
    }
    out
}

/// [§ 4.1 Monolithic elements](https://www.w3.org/TR/css-break-3/#monolithic)
///
/// "Monolithic elements ... can't be fragmented." Row flex containers and
/// table rows are treated the same way, as are boxes with nothing inside to
/// break between.
fn is_monolithic(b: &LayoutBox) -> bool {
    match b.kind {
        BoxKind::Replaced | BoxKind::InlineBlock | BoxKind::TableRow => true,
        BoxKind::FlexContainer => b.style.flex_direction.is_row(),
        _ => {
            b.lines.is_empty()
                && !b
                    .children
                    .iter()
                    .any(|c| c.is_in_flow_block() || is_page_float(c))
        }
    }
}

/// Turns strip slices into page-local fragments.
struct PageAssigner<'a> {
    config: &'a ConversionConfig,
    /// `(start, end)` on the strip of every page; `None` for blank pages.
    ranges: Vec<Option<(f32, f32)>>,
    states: HashMap<BoxId, PlacementState>,
}

impl<'a> PageAssigner<'a> {
    fn new(config: &'a ConversionConfig, slots: &[PageSlot]) -> Self {
        let ranges = slots
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                (!slot.blank).then(|| {
                    let end = slots[i + 1..]
                        .iter()
                        .find(|s| !s.blank)
                        .map_or(f32::INFINITY, |s| s.start);
                    (slot.start, end)
                })
            })
            .collect();
        Self {
            config,
            ranges,
            states: HashMap::new(),
        }
    }

    fn assign(mut self, root: &LayoutBox) -> Vec<Page> {
        let [top, _, _, left] = self.config.margins;
        let area = self.config.page_area();
        let mut pages = Vec::with_capacity(self.ranges.len());
        for index in 0..self.ranges.len() {
            let mut page = Page {
                index,
                number: index + 1,
                blank: self.ranges[index].is_none(),
                width: self.config.page.width,
                height: self.config.page.height,
                content_area: area.translated(left, top),
                fragments: Vec::new(),
                lines: Vec::new(),
            };
            if !page.blank {
                self.walk(root, Pin::Flow, &mut page);
            }
            pages.push(page);
        }
        #[cfg(feature = "layout-trace")]
        eprintln!(
            "[PAGINATE] {} boxes still continuing after the last page",
            self.states
                .values()
                .filter(|s| **s == PlacementState::PartiallyPlaced)
                .count()
        );
        pages
    }

    /// Index of the content page whose slice holds strip offset `y`.
    fn page_holding(&self, y: f32) -> usize {
        let mut found = None;
        for (i, range) in self.ranges.iter().enumerate() {
            if let Some((start, _)) = range {
                if found.is_none() || *start <= y + EPSILON {
                    found = Some(i);
                }
                if *start > y + EPSILON {
                    break;
                }
            }
        }
        found.unwrap_or(0)
    }

    fn walk(&mut self, b: &LayoutBox, pin: Pin, page: &mut Page) {
        let pin = match pin {
            Pin::Flow if b.style.position == PositionType::Fixed => Pin::Every,
            Pin::Flow if b.is_out_of_flow() => Pin::Page(self.page_holding(b.border_box().y)),
            other => other,
        };
        let Some((start, end)) = self.ranges[page.index] else {
            return;
        };
        let [top, _, _, left] = self.config.margins;
        let offset = match pin {
            Pin::Flow => start,
            Pin::Page(i) => self.ranges[i].map_or(start, |(s, _)| s),
            Pin::Every => 0.0,
        };
        let to_page = |r: Rect| r.translated(left, top - offset);
        let on_page = match pin {
            Pin::Flow => true,
            Pin::Page(i) => i == page.index,
            Pin::Every => true,
        };

        if on_page && !matches!(b.kind, BoxKind::Text(_)) {
            let rect = b.border_box();
            let fragment = match pin {
                Pin::Flow => {
                    let hit = if rect.height <= EPSILON {
                        rect.y >= start - EPSILON && rect.y < end - EPSILON
                    } else {
                        rect.y < end - EPSILON && rect.bottom() > start + EPSILON
                    };
                    hit.then(|| {
                        let y0 = rect.y.max(start);
                        let y1 = rect.bottom().min(end);
                        let clipped = Rect::new(rect.x, y0, rect.width, (y1 - y0).max(0.0));
                        (to_page(clipped), rect.bottom() > end + EPSILON)
                    })
                }
                Pin::Page(_) | Pin::Every => Some((to_page(rect), false)),
            };
            if let Some((rect, continues)) = fragment {
                let state = if continues {
                    PlacementState::PartiallyPlaced
                } else {
                    PlacementState::FullyPlaced
                };
                let _ = self.states.insert(b.id, state);
                page.fragments.push(Fragment {
                    box_id: b.id,
                    node: b.node,
                    page_index: page.index,
                    rect,
                    continues,
                });
            }
        }

        if on_page {
            for line in &b.lines {
                let belongs = match pin {
                    Pin::Flow => line.rect.y >= start - EPSILON && line.rect.y < end - EPSILON,
                    Pin::Page(_) | Pin::Every => true,
                };
                if belongs {
                    page.lines.push(place_line(line, b.id, &to_page));
                }
            }
        }
        for child in &b.children {
            self.walk(child, pin, page);
        }
    }
}

fn place_line(line: &LineBox, box_id: BoxId, to_page: &impl Fn(Rect) -> Rect) -> PlacedLine {
    let rect = to_page(line.rect);
    let texts = line
        .fragments
        .iter()
        .filter_map(|fragment| match &fragment.content {
            FragmentContent::Text {
                text,
                font,
                font_size,
                color,
            } => Some(PlacedText {
                text: text.clone(),
                font: font.clone(),
                font_size: *font_size,
                rect: to_page(fragment.rect),
                color: color.clone(),
            }),
            FragmentContent::Atomic { .. } => None,
        })
        .collect();
    PlacedLine {
        rect,
        baseline: line.baseline + rect.y - line.rect.y,
        box_id,
        texts,
    }
}

/// Page numbers of elements with an `id`: the first page holding a
/// fragment or a line of the element's subtree.
fn anchors(root: &LayoutBox, pages: &[Page]) -> BTreeMap<String, usize> {
    let mut first_page: HashMap<BoxId, usize> = HashMap::new();
    let mut record = |id: BoxId, number: usize| {
        let _ = first_page.entry(id).or_insert(number);
    };
    for page in pages {
        for fragment in &page.fragments {
            record(fragment.box_id, page.number);
        }
        for line in &page.lines {
            record(line.box_id, page.number);
        }
    }

    fn visit(
        b: &LayoutBox,
        inherited: usize,
        first_page: &HashMap<BoxId, usize>,
        out: &mut BTreeMap<String, usize>,
    ) -> Option<usize> {
        let own = first_page.get(&b.id).copied();
        let mut earliest = own;
        for child in &b.children {
            let child_page = visit(child, own.unwrap_or(inherited), first_page, out);
            earliest = match (earliest, child_page) {
                (Some(a), Some(c)) => Some(a.min(c)),
                (a, c) => a.or(c),
            };
        }
        if let Some(id) = &b.element_id {
            let _ = out.entry(id.clone()).or_insert(earliest.unwrap_or(inherited));
        }
        earliest
    }

    let mut out = BTreeMap::new();
    let _ = visit(root, 1, &first_page, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageSize;
    use crate::style::ComputedStyle;

    const LINE: f32 = 10.0;

    fn config(page_height: f32) -> ConversionConfig {
        ConversionConfig::default()
            .with_page(PageSize {
                width: 100.0,
                height: page_height,
            })
            .with_margins([0.0; 4])
    }

    /// A paragraph at `top` with `n` lines of height 10.
    fn paragraph(top: f32, n: usize, style: ComputedStyle) -> LayoutBox {
        let mut p = LayoutBox::new(BoxKind::Block, style);
        p.dimensions.content = Rect::new(0.0, top, 100.0, LINE * n as f32);
        p.lines = (0..n)
            .map(|i| LineBox {
                rect: Rect::new(0.0, top + LINE * i as f32, 100.0, LINE),
                baseline: top + LINE * i as f32 + 8.0,
                fragments: Vec::new(),
            })
            .collect();
        p
    }

    fn document(children: Vec<LayoutBox>) -> LayoutBox {
        let height = children.last().map_or(0.0, |c| c.border_box().bottom());
        let mut root = LayoutBox::new(BoxKind::Block, ComputedStyle::default());
        root.dimensions.content = Rect::new(0.0, 0.0, 100.0, height);
        root.children = children;
        root.assign_ids(&mut 0);
        root
    }

    fn line_counts(pagination: &Pagination) -> Vec<usize> {
        pagination.pages.iter().map(|p| p.lines.len()).collect()
    }

    #[test]
    fn test_orphans_push_paragraph() {
        // 45px page: the first paragraph takes 4 lines, the second only
        // has room for one line before the break.
        let root = document(vec![
            paragraph(0.0, 4, ComputedStyle::default()),
            paragraph(40.0, 3, ComputedStyle::default()),
        ]);
        let config = config(45.0);
        let mut diagnostics = Diagnostics::new();
        let pagination = Fragmenter::new(&config, &mut diagnostics).paginate(&root);
        assert_eq!(line_counts(&pagination), [4, 3]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_widows_pull_lines_back() {
        // 5 lines on a 45px page: a greedy split leaves one widow.
        let root = document(vec![paragraph(0.0, 5, ComputedStyle::default())]);
        let config = config(45.0);
        let mut diagnostics = Diagnostics::new();
        let pagination = Fragmenter::new(&config, &mut diagnostics).paginate(&root);
        assert_eq!(line_counts(&pagination), [3, 2]);
    }

    #[test]
    fn test_violation_allowed_splits_greedily() {
        let root = document(vec![paragraph(0.0, 5, ComputedStyle::default())]);
        let config = config(45.0).with_widow_orphan_violation(true);
        let mut diagnostics = Diagnostics::new();
        let pagination = Fragmenter::new(&config, &mut diagnostics).paginate(&root);
        assert_eq!(line_counts(&pagination), [4, 1]);
        assert_eq!(diagnostics.count(DiagnosticId::WidowOrphanViolation), 1);
    }

    #[test]
    fn test_forced_right_break_inserts_blank_page() {
        let right = ComputedStyle {
            break_before: BreakBetween::Right,
            ..ComputedStyle::default()
        };
        let root = document(vec![
            paragraph(0.0, 1, ComputedStyle::default()),
            paragraph(10.0, 1, right),
        ]);
        let config = config(100.0);
        let mut diagnostics = Diagnostics::new();
        let pagination = Fragmenter::new(&config, &mut diagnostics).paginate(&root);
        let blank: Vec<bool> = pagination.pages.iter().map(|p| p.blank).collect();
        assert_eq!(blank, [false, true, false]);
        assert_eq!(pagination.pages[2].lines[0].rect.y, 0.0);
    }

    #[test]
    fn test_continuing_fragments() {
        let root = document(vec![paragraph(0.0, 6, ComputedStyle::default())]);
        let config = config(30.0);
        let mut diagnostics = Diagnostics::new();
        let pagination = Fragmenter::new(&config, &mut diagnostics).paginate(&root);
        assert_eq!(pagination.pages.len(), 2);
        let paragraph_id = root.children[0].id;
        let continues: Vec<bool> = pagination
            .pages
            .iter()
            .flat_map(|p| p.fragments.iter())
            .filter(|f| f.box_id == paragraph_id)
            .map(|f| f.continues)
            .collect();
        assert_eq!(continues, [true, false]);
    }
}

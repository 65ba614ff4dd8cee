//! Inline formatting context.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block... The
//! rectangular area that contains the boxes that form a line is called a
//! line box."
//!
//! Layout happens in two passes over the inline subtree of a block
//! container. [`collect`] flattens it into [`Item`]s: shaped text pieces,
//! inline box edges and atomic inlines. The line breaker then fills line
//! boxes greedily, shortened around floats.

use quire_dom::NodeId;
use serde::Serialize;
use std::collections::BTreeMap;

use super::block::layout_float;
use super::box_model::{EPSILON, Rect};
use super::float::{FloatContext, Lane};
use super::formatting_context::LayoutContext;
use super::layout_box::{BoxId, BoxKind, LayoutBox};
use crate::style::{ListStylePosition, TextAlign};

/// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
/// One line of a block container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineBox {
    /// Line box rectangle, from the left edge of the available space.
    pub rect: Rect,
    /// Absolute y of the line's baseline.
    pub baseline: f32,
    /// Inline content on the line, in visual order.
    pub fragments: Vec<LineFragment>,
}

impl LineBox {
    /// Move the line and its fragments by `(dx, dy)`.
    pub fn shift(&mut self, dx: f32, dy: f32) {
        self.rect = self.rect.translated(dx, dy);
        self.baseline += dy;
        for fragment in &mut self.fragments {
            fragment.rect = fragment.rect.translated(dx, dy);
        }
    }
}

/// A piece of inline content placed on a line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineFragment {
    /// Position and size of the piece.
    pub rect: Rect,
    /// Box the content belongs to.
    pub box_id: BoxId,
    /// DOM node of that box.
    pub node: Option<NodeId>,
    /// What the piece is.
    pub content: FragmentContent,
}

/// Content of a [`LineFragment`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FragmentContent {
    /// Text set in one face.
    Text {
        /// The characters.
        text: String,
        /// Face name.
        font: String,
        /// Font size in px.
        font_size: f32,
        /// Computed `color`.
        color: String,
    },
    /// An atomic inline box; its own geometry lives in the box tree.
    Atomic {
        /// Child-index path of the box from the block container.
        #[serde(skip)]
        path: Vec<usize>,
    },
}

/// A shaped piece of text in one face.
#[derive(Debug, Clone)]
struct TextPiece {
    path: Vec<usize>,
    text: String,
    face: usize,
    width: f32,
    /// A white space character, stretched by justification.
    space: bool,
    /// Removed at the start and end of a line.
    collapsible: bool,
    /// A soft wrap opportunity follows this piece.
    break_after: bool,
    /// Outside list marker text, placed left of the line.
    hanging: bool,
}

/// Flattened inline content.
#[derive(Debug, Clone)]
enum Item {
    Text(TextPiece),
    /// Start of an inline box; `width` is its left margin, border and padding.
    Open { path: Vec<usize>, width: f32 },
    /// End of an inline box; `width` is its right margin, border and padding.
    Close { width: f32 },
    /// Atomic inline with its margin-box width and baseline split.
    Atomic {
        path: Vec<usize>,
        width: f32,
        ascent: f32,
        descent: f32,
    },
    Float { path: Vec<usize> },
    OutOfFlow { path: Vec<usize> },
    /// Forced line break: `<br>` or a preserved newline.
    Break,
}

impl Item {
    fn width(&self) -> f32 {
        match self {
            Self::Text(p) if p.hanging => 0.0,
            Self::Text(p) => p.width,
            Self::Open { width, .. } | Self::Close { width } | Self::Atomic { width, .. } => *width,
            Self::Float { .. } | Self::OutOfFlow { .. } | Self::Break => 0.0,
        }
    }

    /// Content that makes a line box exist.
    fn is_content(&self) -> bool {
        match self {
            Self::Text(p) => !p.hanging && !p.collapsible,
            Self::Atomic { .. } => true,
            _ => false,
        }
    }

    fn is_collapsible_space(&self) -> bool {
        matches!(self, Self::Text(p) if p.collapsible)
    }
}

/// Walks an inline subtree, producing [`Item`]s.
struct Collector<'c, 'a> {
    ctx: &'c mut LayoutContext<'a>,
    cb_width: f32,
    items: Vec<Item>,
    /// The last item emitted was white space, or nothing has been emitted.
    after_space: bool,
}

impl Collector<'_, '_> {
    fn collect(&mut self, b: &LayoutBox, path: &mut Vec<usize>, hanging: bool) {
        for (i, child) in b.children.iter().enumerate() {
            path.push(i);
            if child.style.is_floated() {
                self.items.push(Item::Float { path: path.clone() });
            } else if child.style.is_absolutely_positioned() {
                self.items.push(Item::OutOfFlow { path: path.clone() });
            } else if child.forced_line_break {
                self.items.push(Item::Break);
                self.after_space = true;
            } else if child.is_atomic_inline() {
                self.items.push(Item::Atomic {
                    path: path.clone(),
                    width: 0.0,
                    ascent: 0.0,
                    descent: 0.0,
                });
                self.after_space = false;
            } else if let BoxKind::Text(text) = &child.kind {
                self.text(text, child, path, hanging);
            } else {
                let hangs = hanging
                    || (child.kind == BoxKind::Marker
                        && child.style.list_style_position == ListStylePosition::Outside);
                let (left, right) = if hangs {
                    (0.0, 0.0)
                } else {
                    inline_chrome(child, self.cb_width)
                };
                self.items.push(Item::Open {
                    path: path.clone(),
                    width: left,
                });
                self.collect(child, path, hangs);
                self.items.push(Item::Close { width: right });
            }
            let _ = path.pop();
        }
    }

    /// [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
    fn text(&mut self, text: &str, b: &LayoutBox, path: &[usize], hanging: bool) {
        let ws = b.style.white_space;
        let mut word = String::new();
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '\n' && ws.preserves_newlines() {
                self.word(&mut word, b, path, hanging);
                if ws.collapses_spaces() {
                    // "any collapsible spaces immediately preceding or
                    // following a segment break are removed"
                    self.trim_trailing_collapsible();
                    while chars.next_if(|c| *c == ' ' || *c == '\t').is_some() {}
                }
                self.items.push(Item::Break);
                self.after_space = true;
            } else if ch.is_whitespace() && ch != '\u{a0}' {
                self.word(&mut word, b, path, hanging);
                if ws.collapses_spaces() {
                    if !self.after_space {
                        self.space(" ", b, path, true, ws.wraps(), hanging);
                    }
                    self.after_space = true;
                } else {
                    let expanded = if ch == '\t' { "        " } else { " " };
                    self.space(expanded, b, path, false, ws.wraps(), hanging);
                    self.after_space = true;
                }
            } else {
                word.push(ch);
            }
        }
        self.word(&mut word, b, path, hanging);
    }

    fn trim_trailing_collapsible(&mut self) {
        while self.items.last().is_some_and(Item::is_collapsible_space) {
            let _ = self.items.pop();
        }
    }

    fn space(
        &mut self,
        text: &str,
        b: &LayoutBox,
        path: &[usize],
        collapsible: bool,
        break_after: bool,
        hanging: bool,
    ) {
        for run in self.ctx.shape(text, &b.style) {
            self.items.push(Item::Text(TextPiece {
                path: path.to_vec(),
                text: run.text,
                face: run.face,
                width: run.width,
                space: true,
                collapsible,
                break_after,
                hanging,
            }));
        }
    }

    fn word(&mut self, word: &mut String, b: &LayoutBox, path: &[usize], hanging: bool) {
        if word.is_empty() {
            return;
        }
        for run in self.ctx.shape(word, &b.style) {
            self.items.push(Item::Text(TextPiece {
                path: path.to_vec(),
                text: run.text,
                face: run.face,
                width: run.width,
                space: false,
                collapsible: false,
                break_after: false,
                hanging,
            }));
        }
        word.clear();
        self.after_space = false;
    }
}

/// Left and right margin + border + padding of an inline box.
fn inline_chrome(b: &LayoutBox, cb_width: f32) -> (f32, f32) {
    let s = &b.style;
    let left = s.margin.left.resolve_definite(Some(cb_width)).unwrap_or(0.0)
        + s.border_width[3]
        + s.padding.left.resolve(cb_width);
    let right = s.margin.right.resolve_definite(Some(cb_width)).unwrap_or(0.0)
        + s.border_width[1]
        + s.padding.right.resolve(cb_width);
    (left, right)
}

fn collect(b: &LayoutBox, ctx: &mut LayoutContext<'_>, cb_width: f32) -> Vec<Item> {
    let mut collector = Collector {
        ctx,
        cb_width,
        items: Vec::new(),
        after_space: true,
    };
    collector.collect(b, &mut Vec::new(), false);
    collector.items
}

/// The next unbreakable run of items starting at `start`.
///
/// Returns `(end, width, width without trailing collapsible spaces)`.
/// Soft wrap opportunities are after wrapping spaces and on both sides of
/// atomic inlines.
fn chunk_extent(items: &[Item], start: usize) -> (usize, f32, f32) {
    let mut width = 0.0;
    let mut trailing = 0.0;
    let mut end = start;
    while let Some(item) = items.get(end) {
        match item {
            Item::Float { .. } | Item::OutOfFlow { .. } | Item::Break => break,
            Item::Atomic { .. } if end > start => break,
            Item::Atomic { .. } => {
                width += item.width();
                end += 1;
                trailing = 0.0;
                break;
            }
            Item::Text(piece) => {
                width += item.width();
                trailing = if piece.collapsible {
                    trailing + item.width()
                } else {
                    0.0
                };
                end += 1;
                if piece.break_after {
                    break;
                }
            }
            Item::Open { .. } | Item::Close { .. } => {
                width += item.width();
                end += 1;
            }
        }
    }
    (end, width, width - trailing)
}

/// Items of one line awaiting placement.
struct PendingLine {
    indices: Vec<usize>,
    top: f32,
    left: f32,
    avail: f32,
    /// Last line of the paragraph or ended by a forced break.
    last: bool,
}

/// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// Lay out the inline content of `b` into line boxes below its content top.
/// Returns the content height.
pub(crate) fn layout_inline(
    b: &mut LayoutBox,
    ctx: &mut LayoutContext<'_>,
    floats: &mut FloatContext,
) -> f32 {
    let content = b.dimensions.content;
    let lane = Lane::of(content);
    let child_cb = Rect::new(content.x, content.y, content.width, f32::INFINITY);
    let mut items = collect(b, ctx, content.width);

    // STEP 1: Lay out atomic inlines to learn their size.
    for item in &mut items {
        if let Item::Atomic {
            path,
            width,
            ascent,
            descent,
        } = item
            && let Some(child) = b.descendant_mut(path)
        {
            child.layout(ctx, child_cb, content.y, &mut FloatContext::new());
            let margin_box = child.margin_box();
            let baseline = atomic_baseline(child);
            *width = margin_box.width;
            *ascent = baseline - margin_box.y;
            *descent = margin_box.bottom() - baseline;
        }
    }

    // STEP 2: Break lines.
    let (strut_ascent, strut_descent) = ctx.strut(&b.style);
    let strut_height = strut_ascent + strut_descent;
    let indent = b.style.text_indent.resolve(content.width);
    let mut lines = Vec::new();
    let mut owners: BTreeMap<Vec<usize>, Rect> = BTreeMap::new();
    let mut y = content.y;
    let mut first = true;
    let mut pending_floats: Vec<Vec<usize>> = Vec::new();
    let mut i = 0;

    while i < items.len() {
        for path in pending_floats.drain(..) {
            if let Some(child) = b.descendant_mut(&path) {
                layout_float(child, ctx, child_cb, y, floats);
            }
        }
        let (mut left, mut avail) = floats.available_range(y, strut_height, lane);
        let line_indent = if first { indent } else { 0.0 };
        let mut indices = Vec::new();
        let mut width = 0.0;
        let mut forced = false;

        // "A sequence of collapsible spaces at the beginning of a line is removed."
        while items.get(i).is_some_and(Item::is_collapsible_space) {
            i += 1;
        }
        while let Some(item) = items.get(i) {
            match item {
                Item::Float { path } => {
                    if indices.iter().any(|&k: &usize| items[k].is_content()) {
                        pending_floats.push(path.clone());
                    } else if let Some(child) = b.descendant_mut(path) {
                        layout_float(child, ctx, child_cb, y, floats);
                        (left, avail) = floats.available_range(y, strut_height, lane);
                    }
                    i += 1;
                    continue;
                }
                Item::OutOfFlow { .. } => {
                    indices.push(i);
                    i += 1;
                    continue;
                }
                Item::Break => {
                    indices.push(i);
                    i += 1;
                    forced = true;
                    break;
                }
                _ => {}
            }
            let (end, chunk_width, fit_width) = chunk_extent(&items, i);
            let has_content = indices.iter().any(|&k| items[k].is_content());
            if has_content && width + fit_width > avail - line_indent + EPSILON {
                break;
            }
            indices.extend(i..end);
            width += chunk_width;
            i = end;
        }

        let has_content = indices.iter().any(|&k| items[k].is_content());
        let line = PendingLine {
            indices: trim_trailing(&items, indices),
            top: y,
            left: left + line_indent,
            avail: (avail - line_indent).max(0.0),
            last: forced || i >= items.len(),
        };
        if has_content || forced {
            let line_box = place_line(b, ctx, &items, &line, &mut owners);
            y = line_box.rect.bottom();
            lines.push(line_box);
            first = false;
        } else {
            // Only out-of-flow content: record static positions, no line box.
            for &k in &line.indices {
                if let Item::OutOfFlow { path } = &items[k]
                    && let Some(child) = b.descendant_mut(path)
                {
                    child.static_position = Some((line.left, y));
                }
            }
        }
    }
    for path in pending_floats {
        if let Some(child) = b.descendant_mut(&path) {
            layout_float(child, ctx, child_cb, y, floats);
        }
    }

    // STEP 3: Inline boxes take the union of their fragments.
    for (path, rect) in owners {
        if let Some(owner) = b.descendant_mut(&path) {
            owner.resolve_padding_and_border(content.width);
            owner.dimensions.content = rect;
        }
    }
    b.lines = lines;
    y - content.y
}

/// "If spaces or tabs at the end of a line are non-collapsible but have
/// 'white-space' set to 'pre-wrap' the UA must either hang the white space
/// or visually collapse" - collapsible ones are simply removed.
fn trim_trailing(items: &[Item], mut indices: Vec<usize>) -> Vec<usize> {
    let mut k = indices.len();
    while k > 0 {
        match &items[indices[k - 1]] {
            Item::Close { .. } | Item::OutOfFlow { .. } | Item::Break => k -= 1,
            item if item.is_collapsible_space() => {
                let _ = indices.remove(k - 1);
                k -= 1;
            }
            _ => break,
        }
    }
    indices
}

/// Baseline of an atomic inline: its last line box's baseline, or the bottom
/// margin edge when it has none.
///
/// [§ 10.8.1](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
/// "The baseline of an 'inline-block' is the baseline of its last line box
/// in the normal flow, unless it has either no in-flow line boxes or if its
/// 'overflow' property has a computed value other than 'visible'"
fn atomic_baseline(b: &LayoutBox) -> f32 {
    fn last_baseline(b: &LayoutBox) -> Option<f32> {
        b.lines.last().map(|l| l.baseline).or_else(|| {
            b.children
                .iter()
                .rev()
                .filter(|c| c.is_in_flow_block())
                .find_map(last_baseline)
        })
    }
    let fallback = b.margin_box().bottom();
    if b.kind == BoxKind::Replaced || !b.style.overflow.is_visible() {
        return fallback;
    }
    last_baseline(b).unwrap_or(fallback)
}

/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// Align the items of one line on a common baseline, apply `text-align`
/// and emit the line box.
fn place_line(
    b: &mut LayoutBox,
    ctx: &mut LayoutContext<'_>,
    items: &[Item],
    line: &PendingLine,
    owners: &mut BTreeMap<Vec<usize>, Rect>,
) -> LineBox {
    // STEP 1: Line height from the strut and every inline-level box.
    // "The line box height is the distance between the uppermost box top and
    // the lowermost box bottom."
    let (mut ascent, mut descent) = ctx.strut(&b.style);
    for &k in &line.indices {
        let (a, d) = match &items[k] {
            Item::Text(piece) => match b.descendant(&piece.path) {
                Some(owner) => ctx.line_metrics(piece.face, &owner.style),
                None => continue,
            },
            Item::Atomic {
                ascent, descent, ..
            } => (*ascent, *descent),
            _ => continue,
        };
        ascent = ascent.max(a);
        descent = descent.max(d);
    }
    let baseline = line.top + ascent;

    // STEP 2: Horizontal alignment.
    // [§ 16.2 Alignment](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
    let used: f32 = line.indices.iter().map(|&k| items[k].width()).sum();
    let free = (line.avail - used).max(0.0);
    let spaces = line
        .indices
        .iter()
        .filter(|&&k| matches!(&items[k], Item::Text(p) if p.space && !p.hanging))
        .count();
    let (mut x, extra) = match b.style.text_align {
        TextAlign::Left => (line.left, 0.0),
        TextAlign::Right => (line.left + free, 0.0),
        TextAlign::Center => (line.left + free / 2.0, 0.0),
        // "Text is justified ... except the last line"
        TextAlign::Justify if !line.last && spaces > 0 => {
            #[allow(clippy::cast_precision_loss)]
            let per_space = free / spaces as f32;
            (line.left, per_space)
        }
        TextAlign::Justify => (line.left, 0.0),
    };
    let hanging_width: f32 = line
        .indices
        .iter()
        .filter_map(|&k| match &items[k] {
            Item::Text(p) if p.hanging => Some(p.width),
            _ => None,
        })
        .sum();
    let mut hang_x = line.left - hanging_width;

    // STEP 3: Place every item.
    let mut fragments: Vec<LineFragment> = Vec::new();
    let mut open: Vec<Vec<usize>> = Vec::new();
    for &k in &line.indices {
        match &items[k] {
            Item::Text(piece) => {
                let Some(owner) = b.descendant(&piece.path) else {
                    continue;
                };
                let (a, d) = ctx.line_metrics(piece.face, &owner.style);
                let advance = if piece.space && !piece.hanging {
                    piece.width + extra
                } else {
                    piece.width
                };
                let px = if piece.hanging { hang_x } else { x };
                let rect = Rect::new(px, baseline - a, advance, a + d);
                if piece.hanging {
                    hang_x += piece.width;
                } else {
                    x += advance;
                }
                for path in open.iter().chain(std::iter::once(&piece.path)) {
                    let entry = owners.entry(path.clone()).or_insert(rect);
                    *entry = entry.union(&rect);
                }
                let font = ctx.face_name(piece.face);
                push_text(&mut fragments, owner, rect, &piece.text, font);
            }
            Item::Open { path, width } => {
                open.push(path.clone());
                x += width;
            }
            Item::Close { width } => {
                let _ = open.pop();
                x += width;
            }
            Item::Atomic {
                path,
                width,
                ascent: a,
                ..
            } => {
                if let Some(child) = b.descendant_mut(path) {
                    let margin_box = child.margin_box();
                    child.shift(x - margin_box.x, baseline - a - margin_box.y);
                    fragments.push(LineFragment {
                        rect: child.margin_box(),
                        box_id: child.id,
                        node: child.node,
                        content: FragmentContent::Atomic { path: path.clone() },
                    });
                }
                x += width;
            }
            Item::OutOfFlow { path } => {
                if let Some(child) = b.descendant_mut(path) {
                    child.static_position = Some((x, line.top));
                }
            }
            Item::Float { .. } | Item::Break => {}
        }
    }

    #[cfg(feature = "layout-trace")]
    eprintln!(
        "[INLINE] line y={:.1} h={:.1} fragments={}",
        line.top,
        ascent + descent,
        fragments.len()
    );

    LineBox {
        rect: Rect::new(line.left, line.top, line.avail, ascent + descent),
        baseline,
        fragments,
    }
}

/// Append text to the line, extending the previous fragment when it belongs
/// to the same box and face.
fn push_text(
    fragments: &mut Vec<LineFragment>,
    owner: &LayoutBox,
    rect: Rect,
    text: &str,
    font: String,
) {
    if let Some(last) = fragments.last_mut()
        && last.box_id == owner.id
        && (last.rect.right() - rect.x).abs() < EPSILON
        && let FragmentContent::Text {
            text: last_text,
            font: last_font,
            ..
        } = &mut last.content
        && *last_font == font
    {
        last_text.push_str(text);
        last.rect = last.rect.union(&rect);
        return;
    }
    fragments.push(LineFragment {
        rect,
        box_id: owner.id,
        node: owner.node,
        content: FragmentContent::Text {
            text: text.to_string(),
            font,
            font_size: owner.style.font_size,
            color: owner.style.color.clone(),
        },
    });
}

/// [§ 5.1 Intrinsic Sizes](https://www.w3.org/TR/css-sizing-3/#intrinsic-sizes)
///
/// `(min-content, max-content)` inline size of the inline content of `b`:
/// the widest unbreakable run, and the widest line with no soft wraps.
pub(crate) fn measure_inline_content(b: &LayoutBox, ctx: &mut LayoutContext<'_>) -> (f32, f32) {
    let items = collect(b, ctx, 0.0);
    let mut min = 0.0_f32;
    let mut max = 0.0_f32;
    let mut line = 0.0_f32;
    let mut i = 0;
    let indent = b.style.text_indent.resolve(0.0);
    line += indent;
    while i < items.len() {
        match &items[i] {
            Item::Break => {
                max = max.max(line);
                line = 0.0;
                i += 1;
            }
            Item::Float { path } => {
                if let Some(child) = b.descendant(path) {
                    let (cmin, cmax) = child.outer_intrinsic_widths(ctx);
                    min = min.max(cmin);
                    line += cmax;
                }
                i += 1;
            }
            Item::OutOfFlow { .. } => i += 1,
            Item::Atomic { path, .. } => {
                if let Some(child) = b.descendant(path) {
                    let (cmin, cmax) = child.outer_intrinsic_widths(ctx);
                    min = min.max(cmin);
                    line += cmax;
                }
                i += 1;
            }
            _ => {
                let (end, width, fit) = chunk_extent(&items, i);
                min = min.max(fit);
                line += width;
                i = end.max(i + 1);
            }
        }
    }
    // Trailing collapsible spaces do not count.
    let trailing: f32 = items
        .iter()
        .rev()
        .take_while(|item| item.is_collapsible_space() || matches!(item, Item::Close { .. }))
        .filter(|item| item.is_collapsible_space())
        .map(Item::width)
        .sum();
    max = max.max(line - trailing.min(line));
    (min, max)
}

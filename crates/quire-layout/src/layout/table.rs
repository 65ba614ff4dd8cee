//! CSS Table Layout.
//!
//! [§ 17 Tables](https://www.w3.org/TR/CSS2/tables.html)
//!
//! The automatic table layout algorithm (§ 17.5.2) in the separated borders
//! model:
//! - rows and cells, row groups flattened by the box tree builder
//! - `colspan`
//! - column widths from cell min/max content widths, fixed cell widths
//!   honoured
//! - `border-spacing`
//!
//! Not implemented: `rowspan`, `border-collapse: collapse`, captions,
//! `table-layout: fixed`, `vertical-align` within cells.

use super::box_model::Rect;
use super::float::FloatContext;
use super::formatting_context::LayoutContext;
use super::layout_box::{BoxKind, LayoutBox};
use crate::style::{AutoLength, BoxSizing, LengthValue};

/// One row: its index in the table and `(cell index, colspan)` per cell.
struct RowInfo {
    index: usize,
    cells: Vec<(usize, usize)>,
}

/// [§ 17.2 The CSS table model](https://www.w3.org/TR/CSS2/tables.html#table-display)
fn collect_rows(table: &LayoutBox) -> Vec<RowInfo> {
    table
        .children
        .iter()
        .enumerate()
        .filter(|(_, row)| row.kind == BoxKind::TableRow && !row.style.is_absolutely_positioned())
        .map(|(index, row)| RowInfo {
            index,
            cells: row
                .children
                .iter()
                .enumerate()
                .filter(|(_, cell)| cell.kind == BoxKind::TableCell)
                .map(|(i, cell)| (i, cell.colspan.max(1)))
                .collect(),
        })
        .collect()
}

/// "The number of columns is determined by ... the row with the most cells."
fn column_count(rows: &[RowInfo]) -> usize {
    rows.iter()
        .map(|r| r.cells.iter().map(|(_, span)| span).sum::<usize>())
        .max()
        .unwrap_or(0)
}

/// [§ 17.5.2.2 Column width determination](https://www.w3.org/TR/CSS2/tables.html#auto-table-layout)
///
/// "Calculate the minimum content width (MCW) of each cell ... For each
/// column, determine a maximum and minimum column width from the cells that
/// span only that column." Spanning cells then widen their columns evenly
/// where their own widths exceed the columns' sum.
fn column_bounds(
    table: &LayoutBox,
    rows: &[RowInfo],
    columns: usize,
    ctx: &mut LayoutContext<'_>,
) -> (Vec<f32>, Vec<f32>) {
    let spacing = table.style.border_spacing.0;
    let mut min = vec![0.0_f32; columns];
    let mut max = vec![0.0_f32; columns];
    let mut spanning = Vec::new();
    for row in rows {
        let tr = &table.children[row.index];
        let mut col = 0;
        for &(cell_index, span) in &row.cells {
            let (cmin, cmax) = tr.children[cell_index].outer_intrinsic_widths(ctx);
            if span == 1 && col < columns {
                min[col] = min[col].max(cmin);
                max[col] = max[col].max(cmax);
            } else if col < columns {
                spanning.push((col, span.min(columns - col), cmin, cmax));
            }
            col += span;
        }
    }
    for (start, span, cmin, cmax) in spanning {
        #[allow(clippy::cast_precision_loss)]
        let inner_spacing = spacing * (span - 1) as f32;
        #[allow(clippy::cast_precision_loss)]
        let share = |need: f32, have: f32| (need - inner_spacing - have).max(0.0) / span as f32;
        let have_min: f32 = min[start..start + span].iter().sum();
        let have_max: f32 = max[start..start + span].iter().sum();
        let extra_min = share(cmin, have_min);
        let extra_max = share(cmax, have_max);
        for c in start..start + span {
            min[c] += extra_min;
            max[c] += extra_max;
        }
    }
    for c in 0..columns {
        max[c] = max[c].max(min[c]);
    }
    (min, max)
}

/// Total horizontal border spacing for `columns` columns.
fn horizontal_spacing(table: &LayoutBox, columns: usize) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let gaps = (columns + 1) as f32;
    table.style.border_spacing.0 * gaps
}

/// Distribute `available` width over the columns.
///
/// Columns get their max-content widths when they fit; otherwise widths are
/// interpolated between min and max; below the minimum the table overflows.
/// A table with an explicit width hands extra space out proportionally.
fn distribute(min: &[f32], max: &[f32], available: f32, explicit_width: bool) -> Vec<f32> {
    let sum_min: f32 = min.iter().sum();
    let sum_max: f32 = max.iter().sum();
    if sum_max <= available {
        if !explicit_width || sum_max >= available {
            return max.to_vec();
        }
        let extra = available - sum_max;
        if sum_max <= 0.0 {
            #[allow(clippy::cast_precision_loss)]
            let each = available / max.len().max(1) as f32;
            return vec![each; max.len()];
        }
        return max.iter().map(|w| w + extra * w / sum_max).collect();
    }
    if sum_min >= available || sum_max <= sum_min {
        return min.to_vec();
    }
    let t = (available - sum_min) / (sum_max - sum_min);
    min.iter()
        .zip(max)
        .map(|(lo, hi)| (hi - lo).mul_add(t, *lo))
        .collect()
}

/// Main entry point for table layout.
///
/// [§ 17.5.2 Automatic table layout](https://www.w3.org/TR/CSS2/tables.html#auto-table-layout)
pub(crate) fn layout_table(table: &mut LayoutBox, ctx: &mut LayoutContext<'_>, cb: Rect, y: f32) {
    // STEP 1: Resolve the table's own width and position.
    table.compute_width(ctx, cb.width);
    table.resolve_vertical_margins(cb.width);
    let d = &mut table.dimensions;
    d.content.x = cb.x + d.margin.left + d.border.left + d.padding.left;
    d.content.y = y + d.border.top + d.padding.top;

    // STEP 2: Identify the table structure.
    let rows = collect_rows(table);
    let columns = column_count(&rows);
    let (hs, vs) = table.style.border_spacing;

    // STEP 3: Column widths.
    let (min, max) = column_bounds(table, &rows, columns, ctx);
    let spacing = horizontal_spacing(table, columns);
    let explicit_width = !table.style.width.is_auto();
    let widths = distribute(&min, &max, table.dimensions.content.width - spacing, explicit_width);
    if !explicit_width && columns > 0 {
        // Auto-width tables shrink to their columns.
        let used: f32 = widths.iter().sum::<f32>() + spacing;
        table.dimensions.content.width = table.clamp_content_width(used, cb.width);
    }
    let content = table.dimensions.content;

    // STEP 4: Lay out rows top to bottom, cells left to right.
    let mut row_y = content.y + if rows.is_empty() { 0.0 } else { vs };
    for row in &rows {
        let mut col = 0;
        let mut x = content.x + hs;
        let mut row_height: f32 = 0.0;
        let tr = &mut table.children[row.index];
        for &(cell_index, span) in &row.cells {
            if col >= columns {
                break;
            }
            let span = span.min(columns - col);
            #[allow(clippy::cast_precision_loss)]
            let width = widths[col..col + span].iter().sum::<f32>() + hs * (span - 1) as f32;
            let cell = &mut tr.children[cell_index];
            layout_cell(cell, ctx, Rect::new(x, row_y, width, f32::INFINITY));
            row_height = row_height.max(cell.margin_box().height);
            x += width + hs;
            col += span;
        }

        // [§ 17.5.3 Table height algorithms](https://www.w3.org/TR/CSS2/tables.html#height-layout)
        // "The height of a 'table-row' element's box is calculated once the
        // user agent has all the cells in the row available: it is the
        // maximum of the row's computed 'height', the computed 'height' of
        // each cell in the row, and the minimum height (MIN) required by the
        // cells."
        if let Some(h) = tr.style.height.resolve_definite(None) {
            row_height = row_height.max(h);
        }
        for cell in tr.children.iter_mut().filter(|c| c.kind == BoxKind::TableCell) {
            let grow = row_height - cell.margin_box().height;
            if grow > 0.0 {
                cell.dimensions.content.height += grow;
            }
        }
        tr.dimensions.content = Rect::new(content.x, row_y, content.width, row_height);
        row_y += row_height + vs;
    }

    // STEP 5: Table height.
    // "the height of the table ... is the greater of the 'height' property
    // and the height of the rows", so explicit heights never truncate.
    let content_height = (row_y - content.y).max(0.0);
    let cb_height = cb.height.is_finite().then_some(cb.height);
    let height = table
        .specified_content_height(cb_height)
        .map_or(content_height, |h| h.max(content_height));
    table.dimensions.content.height = table.clamp_content_height(height, cb_height);
}

/// Lay out one cell at a fixed border-box width.
fn layout_cell(cell: &mut LayoutBox, ctx: &mut LayoutContext<'_>, slot: Rect) {
    let saved = cell.style.width;
    cell.resolve_padding_and_border(slot.width);
    let chrome = cell.dimensions.horizontal_chrome();
    let specified = match cell.style.box_sizing {
        BoxSizing::ContentBox => (slot.width - chrome).max(0.0),
        BoxSizing::BorderBox => slot.width,
    };
    cell.style.width = AutoLength::Length(LengthValue::Px(specified));
    cell.layout(ctx, slot, slot.y, &mut FloatContext::new());
    cell.style.width = saved;
}

/// `(min-content, max-content)` content widths of a table.
pub(crate) fn intrinsic_widths(table: &LayoutBox, ctx: &mut LayoutContext<'_>) -> (f32, f32) {
    let rows = collect_rows(table);
    let columns = column_count(&rows);
    let (min, max) = column_bounds(table, &rows, columns, ctx);
    let spacing = if columns == 0 {
        0.0
    } else {
        horizontal_spacing(table, columns)
    };
    (
        min.iter().sum::<f32>() + spacing,
        max.iter().sum::<f32>() + spacing,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribute_uses_max_content_when_it_fits() {
        assert_eq!(distribute(&[10.0, 20.0], &[40.0, 60.0], 200.0, false), [40.0, 60.0]);
    }

    #[test]
    fn test_distribute_interpolates_between_min_and_max() {
        let widths = distribute(&[10.0, 10.0], &[50.0, 90.0], 50.0, false);
        assert_eq!(widths, [20.0, 30.0]);
    }

    #[test]
    fn test_distribute_explicit_width_shares_extra_proportionally() {
        let widths = distribute(&[0.0, 0.0], &[25.0, 75.0], 200.0, true);
        assert_eq!(widths, [50.0, 150.0]);
    }

    #[test]
    fn test_distribute_overflows_at_minimum() {
        assert_eq!(distribute(&[80.0, 80.0], &[100.0, 100.0], 100.0, false), [80.0, 80.0]);
    }
}

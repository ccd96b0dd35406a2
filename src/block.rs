//! Recognising rectangular selections spread over several carets.
//!
//! Hosts without a native block selection show Vim's `Ctrl-V` as one caret per
//! line. When such a set of selections shows up from outside the engine (a
//! column-select mouse drag, say) it has to be recognised as a block again.

use crate::traits::HostEditor;
use crate::types::{Position, RawSelection};

/// The rectangle covered by a block selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockBounds {
    /// Offset of the top-left corner.
    pub start: usize,
    /// Offset on the bottom line at `right_col`, clamped to that line.
    pub end: usize,
    pub top_line: usize,
    pub bottom_line: usize,
    pub left_col: usize,
    /// Exclusive right edge; may lie past the end of short lines.
    pub right_col: usize,
}

fn sorted(selections: &[RawSelection]) -> Vec<RawSelection> {
    let mut rows: Vec<RawSelection> = selections.iter().map(|s| s.normalized()).collect();
    rows.sort_by_key(|s| s.start);
    rows
}

/// Whether the selections form one rectangle, one row per consecutive line.
///
/// Rows on lines shorter than the rectangle's right edge may stop at their
/// line end.
pub fn is_block<H: HostEditor + ?Sized>(host: &H, selections: &[RawSelection]) -> bool {
    let rows = sorted(selections);
    let Some(first) = rows.first() else {
        return false;
    };
    let first = host.offset_to_position(first.start);

    let mut max_end_col = 0;
    let mut ends = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let start = host.offset_to_position(row.start);
        let end = host.offset_to_position(row.end);
        if start.line != end.line || start.col != first.col || start.line != first.line + i {
            return false;
        }
        max_end_col = max_end_col.max(end.col);
        ends.push(end);
    }

    ends.iter()
        .all(|end| end.col == max_end_col.min(host.line_len(end.line)))
}

/// Bounds of a block selection; `None` for an empty slice.
///
/// Does not check the geometry, see [`is_block`].
pub fn compute_bounds<H: HostEditor + ?Sized>(
    host: &H,
    selections: &[RawSelection],
) -> Option<BlockBounds> {
    let rows = sorted(selections);
    let first = rows.first()?;
    let last = rows.last()?;

    let top_left = host.offset_to_position(first.start);
    let bottom_line = host.line_of(last.start);
    let right_col = rows
        .iter()
        .map(|row| host.offset_to_position(row.end).col)
        .max()
        .unwrap_or(top_left.col);

    Some(BlockBounds {
        start: first.start,
        end: host.position_to_offset(Position {
            line: bottom_line,
            col: right_col,
        }),
        top_line: top_left.line,
        bottom_line,
        left_col: top_left.col,
        right_col,
    })
}

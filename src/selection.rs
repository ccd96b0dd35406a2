//! Translation between the host's raw selections and Vim selections.
//!
//! Raw selections are half-open `[start, end)`. Vim ranges name the first and
//! last selected characters. With `'selection'` inclusive the raw end sits one
//! past the semantic head; exclusive, it sits on it. Every conversion goes
//! through [`SelectionStyle::adjustment`] so the two never drift apart.

use crate::block::{self, BlockBounds};
use crate::config::SelectionStyle;
use crate::traits::HostEditor;
use crate::types::{ColumnGoal, Position, RawSelection, SubMode, VisualRange};

/// A caret's raw selection together with where its caret sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaretSelection {
    pub selection: RawSelection,
    pub offset: usize,
}

/// The Vim view of a set of raw selections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticSelection {
    /// One range per caret, or a single range spanning a block.
    pub ranges: Vec<VisualRange>,
    /// Head column of a block. It can lie past the end of the head's line,
    /// which the head offset alone cannot express.
    pub column: Option<ColumnGoal>,
}

/// Semantic range of a single characterwise or linewise raw selection.
///
/// A caret on the raw start means the selection was made backwards.
pub fn caret_range(sel: CaretSelection, kind: SubMode, style: SelectionStyle) -> VisualRange {
    let raw = sel.selection.normalized();
    let trailing = match kind {
        SubMode::LineWise => 1,
        _ => style.adjustment(),
    };
    let last = raw.end.saturating_sub(trailing).max(raw.start);
    let (anchor, head) = if sel.offset == raw.start && !raw.is_empty() {
        (last, raw.start)
    } else {
        (raw.start, last)
    };
    VisualRange { anchor, head, kind }
}

/// Semantic range of a block shown as one selection per line.
///
/// The anchor is the top-left corner and the head the bottom-right.
pub fn block_range<H: HostEditor + ?Sized>(
    host: &H,
    rows: &[RawSelection],
    style: SelectionStyle,
) -> Option<(VisualRange, ColumnGoal)> {
    let BlockBounds {
        start,
        bottom_line,
        left_col,
        right_col,
        ..
    } = block::compute_bounds(host, rows)?;
    let head_col = right_col.saturating_sub(style.adjustment()).max(left_col);
    let head = host.position_to_offset(Position {
        line: bottom_line,
        col: head_col,
    });
    let range = VisualRange {
        anchor: start,
        head,
        kind: SubMode::BlockWise,
    };
    Some((range, ColumnGoal::Column(head_col)))
}

/// Normalises the carets' raw selections and reads them as `kind`.
pub fn to_semantic<H: HostEditor + ?Sized>(
    host: &H,
    carets: &[CaretSelection],
    kind: SubMode,
    style: SelectionStyle,
) -> SemanticSelection {
    if kind == SubMode::BlockWise {
        let rows: Vec<RawSelection> = carets.iter().map(|c| c.selection).collect();
        if let Some((range, column)) = block_range(host, &rows, style) {
            return SemanticSelection {
                ranges: vec![range],
                column: Some(column),
            };
        }
    }
    SemanticSelection {
        ranges: carets
            .iter()
            .map(|&sel| caret_range(sel, kind, style))
            .collect(),
        column: None,
    }
}

/// The raw selections the host should display for `range`.
///
/// Characterwise and linewise ranges give one selection; blockwise ranges
/// give one per line, top to bottom. `column` overrides the head's column of a
/// block.
pub fn from_semantic<H: HostEditor + ?Sized>(
    host: &H,
    range: VisualRange,
    column: Option<ColumnGoal>,
    style: SelectionStyle,
) -> Vec<RawSelection> {
    let text_len = host.text_len();
    match range.kind {
        SubMode::None | SubMode::CharWise => {
            let end = (range.end() + style.adjustment()).min(text_len);
            vec![RawSelection::new(range.start(), end.max(range.start()))]
        }
        SubMode::LineWise => {
            let start = host.line_start_offset(host.line_of(range.start()));
            let end = (host.line_end_offset(host.line_of(range.end())) + 1).min(text_len);
            vec![RawSelection::new(start, end)]
        }
        SubMode::BlockWise => block_rows(host, range, column, style),
    }
}

fn block_rows<H: HostEditor + ?Sized>(
    host: &H,
    range: VisualRange,
    column: Option<ColumnGoal>,
    style: SelectionStyle,
) -> Vec<RawSelection> {
    let anchor = host.offset_to_position(range.anchor);
    let head = host.offset_to_position(range.head);
    let (left, right) = match column {
        Some(ColumnGoal::LineEnd) => (anchor.col, None),
        Some(ColumnGoal::Column(col)) => (
            anchor.col.min(col),
            Some(anchor.col.max(col) + style.adjustment()),
        ),
        None => (
            anchor.col.min(head.col),
            Some(anchor.col.max(head.col) + style.adjustment()),
        ),
    };

    let top = anchor.line.min(head.line);
    let bottom = anchor.line.max(head.line);
    (top..=bottom)
        .map(|line| {
            let line_start = host.line_start_offset(line);
            let len = host.line_len(line);
            let end = right.map_or(len, |right| right.min(len));
            RawSelection::new(line_start + left.min(len), line_start + end.max(left.min(len)))
        })
        .collect()
}

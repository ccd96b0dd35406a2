use modal_bridge::selection::{self, CaretSelection};
use modal_bridge::{ColumnGoal, RawSelection, SelectionStyle, SubMode, VisualRange};

mod support;
use support::mock_host::MockHost;

fn caret_sel(start: usize, end: usize, offset: usize) -> CaretSelection {
    CaretSelection {
        selection: RawSelection::new(start, end),
        offset,
    }
}

#[test]
fn inclusive_charwise_round_trip() {
    let host = MockHost::new("hello world");
    let style = SelectionStyle::Inclusive;

    let range = selection::caret_range(caret_sel(0, 5, 5), SubMode::CharWise, style);
    assert_eq!(
        range,
        VisualRange {
            anchor: 0,
            head: 4,
            kind: SubMode::CharWise
        }
    );
    assert_eq!(
        selection::from_semantic(&host, range, None, style),
        vec![RawSelection::new(0, 5)]
    );
}

#[test]
fn caret_on_raw_start_reads_as_backward_selection() {
    let range = selection::caret_range(
        caret_sel(0, 5, 0),
        SubMode::CharWise,
        SelectionStyle::Inclusive,
    );
    assert_eq!(range.anchor, 4);
    assert_eq!(range.head, 0);
}

#[test]
fn exclusive_keeps_raw_end_as_head() {
    let host = MockHost::new("hello world");
    let style = SelectionStyle::Exclusive;

    let range = selection::caret_range(caret_sel(0, 5, 5), SubMode::CharWise, style);
    assert_eq!((range.anchor, range.head), (0, 5));
    assert_eq!(
        selection::from_semantic(&host, range, None, style),
        vec![RawSelection::new(0, 5)]
    );
}

#[test]
fn single_character_inclusive_selection() {
    let host = MockHost::new("abc");
    let range = VisualRange {
        anchor: 1,
        head: 1,
        kind: SubMode::CharWise,
    };
    assert_eq!(
        selection::from_semantic(&host, range, None, SelectionStyle::Inclusive),
        vec![RawSelection::new(1, 2)]
    );
}

#[test]
fn linewise_covers_whole_lines_with_newline() {
    let host = MockHost::new("one\ntwo\nthree\n");
    let style = SelectionStyle::Inclusive;

    let range = selection::caret_range(caret_sel(4, 8, 8), SubMode::LineWise, style);
    assert_eq!((range.anchor, range.head), (4, 7));
    assert_eq!(
        selection::from_semantic(&host, range, None, style),
        vec![RawSelection::new(4, 8)]
    );

    // Exclusive style does not change linewise trailing
    let range = selection::caret_range(caret_sel(4, 8, 8), SubMode::LineWise, SelectionStyle::Exclusive);
    assert_eq!(range.head, 7);
}

#[test]
fn linewise_from_mid_line_offsets() {
    let host = MockHost::new("one\ntwo\nthree\n");
    let range = VisualRange {
        anchor: 9,
        head: 1,
        kind: SubMode::LineWise,
    };
    assert_eq!(
        selection::from_semantic(&host, range, None, SelectionStyle::Inclusive),
        vec![RawSelection::new(0, 14)]
    );
}

#[test]
fn block_rows_round_trip() {
    let host = MockHost::new("0123456789\n0123456789\n0123456789\n");
    let style = SelectionStyle::Inclusive;
    let rows = [
        RawSelection::new(0, 3),
        RawSelection::new(11, 14),
        RawSelection::new(22, 25),
    ];

    let (range, column) = selection::block_range(&host, &rows, style).unwrap();
    assert_eq!(range.anchor, 0);
    assert_eq!(range.head, 24);
    assert_eq!(column, ColumnGoal::Column(2));

    let back = selection::from_semantic(&host, range, Some(column), style);
    assert_eq!(back, rows.to_vec());
}

#[test]
fn to_semantic_folds_block_into_one_range() {
    let host = MockHost::new("0123456789\n0123456789\n0123456789\n");
    let carets = [caret_sel(22, 25, 25), caret_sel(0, 3, 3), caret_sel(11, 14, 14)];

    let semantic = selection::to_semantic(&host, &carets, SubMode::BlockWise, SelectionStyle::Inclusive);
    assert_eq!(semantic.ranges.len(), 1);
    assert_eq!(semantic.column, Some(ColumnGoal::Column(2)));

    let semantic = selection::to_semantic(&host, &carets, SubMode::CharWise, SelectionStyle::Inclusive);
    assert_eq!(semantic.ranges.len(), 3);
    assert_eq!(semantic.column, None);
}

#[test]
fn block_rows_clamp_to_short_lines() {
    let host = MockHost::new("abcdef\nab\nabcdef\n");
    let range = VisualRange {
        anchor: 1,
        head: 13,
        kind: SubMode::BlockWise,
    };
    let rows = selection::from_semantic(&host, range, None, SelectionStyle::Inclusive);
    assert_eq!(
        rows,
        vec![
            RawSelection::new(1, 4),
            RawSelection::new(8, 9),
            RawSelection::new(11, 14),
        ]
    );
}

#[test]
fn block_to_line_end_follows_each_line() {
    let host = MockHost::new("abcdef\nab\nabcd\n");
    let range = VisualRange {
        anchor: 1,
        head: 14,
        kind: SubMode::BlockWise,
    };
    let rows = selection::from_semantic(&host, range, Some(ColumnGoal::LineEnd), SelectionStyle::Inclusive);
    assert_eq!(
        rows,
        vec![
            RawSelection::new(1, 6),
            RawSelection::new(8, 9),
            RawSelection::new(11, 14),
        ]
    );
}

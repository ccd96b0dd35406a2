/// A position within a text buffer.
///
/// Positions are zero-indexed. Columns are whatever unit the host counts offsets in;
/// the engine never looks inside a line, it only asks the host to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Zero-based line number.
    pub line: usize,
    /// Zero-based column.
    pub col: usize,
}

impl Position {
    /// The origin position (0, 0).
    pub const ZERO: Position = Position { line: 0, col: 0 };
}

/// Host-side identifier of a caret.
///
/// The engine decorates host carets with semantic state keyed by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaretId(pub usize);

/// The editing mode of a single mode frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Normal mode - for navigation and operators.
    Normal,
    /// Insert mode - for typing text.
    Insert,
    /// Visual mode - a Vim-owned selection.
    Visual,
    /// Select mode - a selection that typing replaces.
    Select,
    /// Replace mode - typing overwrites.
    Replace,
    /// An operator is waiting for its motion.
    OpPending,
}

impl Mode {
    pub fn is_visual_or_select(self) -> bool {
        matches!(self, Mode::Visual | Mode::Select)
    }
}

/// The shape qualifier of visual and select mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubMode {
    /// No shape; used by every non-selecting mode.
    None,
    /// Character-wise selection (v).
    CharWise,
    /// Line-wise selection (V).
    LineWise,
    /// Rectangular block selection (Ctrl-V).
    BlockWise,
}

/// Which key table applies while a frame is on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingScope {
    Normal,
    Insert,
    Visual,
    Select,
    OpPending,
}

impl MappingScope {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Normal => MappingScope::Normal,
            Mode::Insert | Mode::Replace => MappingScope::Insert,
            Mode::Visual => MappingScope::Visual,
            Mode::Select => MappingScope::Select,
            Mode::OpPending => MappingScope::OpPending,
        }
    }
}

/// One entry of the mode stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeFrame {
    pub mode: Mode,
    pub sub_mode: SubMode,
    pub scope: MappingScope,
}

impl ModeFrame {
    /// A frame whose mapping scope follows from its mode.
    pub fn new(mode: Mode, sub_mode: SubMode) -> Self {
        Self {
            mode,
            sub_mode,
            scope: MappingScope::for_mode(mode),
        }
    }
}

/// The host's raw selection of one caret, as half-open offsets `[start, end)`.
///
/// Hosts may report `start > end`; [`RawSelection::normalized`] fixes that up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSelection {
    pub start: usize,
    pub end: usize,
}

impl RawSelection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn normalized(self) -> Self {
        if self.start <= self.end {
            self
        } else {
            Self {
                start: self.end,
                end: self.start,
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.abs_diff(self.start)
    }
}

/// A Vim selection: a fixed anchor, a moving head, and a shape.
///
/// Both ends are character offsets that are part of the selection; which one is
/// numerically smaller carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualRange {
    pub anchor: usize,
    pub head: usize,
    pub kind: SubMode,
}

impl VisualRange {
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }
}

/// Horizontal extent of a [`VisualChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSpan {
    Count(usize),
    /// The selection followed the end of every line (`$` in block mode).
    ToLineEnd,
}

/// Where vertical motions try to put a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnGoal {
    Column(usize),
    LineEnd,
}

/// Size and shape of a visual selection, independent of where it was.
///
/// Recorded when an operator consumes a visual selection so that a counted
/// `v`/`V`/`Ctrl-V` can select "N times the last shape" elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualChange {
    pub line_span: usize,
    pub column_span: ColumnSpan,
    pub kind: SubMode,
}

/// The `'<` and `'>` marks of the most recently exited selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualMarks {
    pub start_offset: usize,
    pub end_offset: usize,
}

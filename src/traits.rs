use crate::key::KeyEvent;
use crate::types::{CaretId, Position, RawSelection};

/// What the engine needs from the editor it runs inside.
///
/// Offsets are linear positions in the host's document. The host owns the
/// carets; the engine only reads and writes their offsets and selections.
pub trait HostEditor {
    // Carets. The primary caret comes first.
    fn carets(&self) -> Vec<CaretId>;
    fn caret_offset(&self, caret: CaretId) -> usize;
    fn move_caret(&mut self, caret: CaretId, offset: usize);
    /// The caret's selection, or `None` when it selects nothing.
    fn selection(&self, caret: CaretId) -> Option<RawSelection>;
    fn set_selection(&mut self, caret: CaretId, selection: RawSelection);
    fn remove_selection(&mut self, caret: CaretId);
    fn add_caret(&mut self, offset: usize) -> CaretId;
    fn remove_secondary_carets(&mut self);

    fn primary_caret(&self) -> Option<CaretId> {
        self.carets().first().copied()
    }

    // Text geometry.
    fn text_len(&self) -> usize;
    fn line_count(&self) -> usize;
    fn offset_to_position(&self, offset: usize) -> Position;
    /// Columns past the end of the line clamp to the line end.
    fn position_to_offset(&self, pos: Position) -> usize;
    fn line_start_offset(&self, line: usize) -> usize;
    /// Offset just before the line terminator.
    fn line_end_offset(&self, line: usize) -> usize;

    fn line_len(&self, line: usize) -> usize {
        self.line_end_offset(line) - self.line_start_offset(line)
    }

    fn line_of(&self, offset: usize) -> usize {
        self.offset_to_position(offset).line
    }

    fn scroll_to_caret(&mut self, caret: CaretId);

    // UI state, queried at the moment of each decision.
    fn is_popup_active(&self) -> bool;
    fn is_template_active(&self) -> bool;
    fn is_single_line(&self) -> bool;
    fn is_file_backed(&self) -> bool;

    /// Whether keys are arriving at the main editing surface rather than
    /// an embedded widget (console, debugger input).
    fn is_primary_surface(&self) -> bool {
        self.is_file_backed()
    }

    /// Whether the host has its own command bound to `key` in the current context.
    fn has_binding(&self, key: &KeyEvent) -> bool;
}

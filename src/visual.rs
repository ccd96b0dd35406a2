//! Visual and select mode.
//!
//! Every caret in visual mode has a semantic anchor in its [`CaretState`] and
//! uses its host offset as the head. The host selection is always derived
//! from the two through [`selection::from_semantic`]; the only time it is read
//! back is when a selection arrives from outside the engine.
//!
//! [`CaretState`]: crate::session::CaretState

use crate::block;
use crate::error::Result;
use crate::selection::{self, CaretSelection};
use crate::session::EditorSession;
use crate::traits::HostEditor;
use crate::types::{
    CaretId, ColumnGoal, ColumnSpan, Mode, ModeFrame, Position, RawSelection, SubMode,
    VisualChange, VisualMarks, VisualRange,
};

/// A selection handed to an operator when it consumes visual mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualTarget {
    pub caret: CaretId,
    pub range: VisualRange,
    /// Head column of a block, see [`selection::SemanticSelection::column`].
    pub column: Option<ColumnGoal>,
    pub change: VisualChange,
}

fn caret_selection<H: HostEditor + ?Sized>(host: &H, caret: CaretId) -> CaretSelection {
    let offset = host.caret_offset(caret);
    CaretSelection {
        selection: host
            .selection(caret)
            .unwrap_or(RawSelection::new(offset, offset)),
        offset,
    }
}

fn has_selection<H: HostEditor + ?Sized>(host: &H, caret: CaretId) -> bool {
    host.selection(caret).is_some_and(|s| !s.is_empty())
}

/// Whether the selection starts at a line start and stops at that line's end
/// or just past it.
fn is_line_aligned<H: HostEditor + ?Sized>(host: &H, sel: RawSelection) -> bool {
    let sel = sel.normalized();
    if sel.is_empty() || sel.start != host.line_start_offset(host.line_of(sel.start)) {
        return false;
    }
    sel.end == host.line_end_offset(host.line_of(sel.end))
        || sel.end == host.line_end_offset(host.line_of(sel.end - 1)) + 1
}

impl EditorSession {
    fn trailing(&self, kind: SubMode) -> usize {
        match kind {
            SubMode::LineWise => 1,
            _ => self.style.adjustment(),
        }
    }

    /// The caret's offset, unless the host left it on the raw end of its
    /// selection, in which case the last selected character.
    fn head_of<H: HostEditor + ?Sized>(&self, host: &H, caret: CaretId, kind: SubMode) -> usize {
        let sel = caret_selection(host, caret);
        let raw = sel.selection.normalized();
        if !raw.is_empty() && sel.offset == raw.end {
            raw.end.saturating_sub(self.trailing(kind)).max(raw.start)
        } else {
            sel.offset
        }
    }

    /// Offset of the furthest head on `line`.
    fn last_head_on_line<H: HostEditor + ?Sized>(&self, host: &H, line: usize) -> usize {
        let start = host.line_start_offset(line);
        host.line_end_offset(line)
            .saturating_sub(self.style.adjustment())
            .max(start)
    }

    fn remembered_column(&self, caret: CaretId) -> Option<ColumnGoal> {
        self.caret_state(caret).and_then(|s| s.remembered_column)
    }

    /// Writes `range` to the host. The caller holds the guard.
    fn show<H: HostEditor + ?Sized>(
        &mut self,
        host: &mut H,
        caret: CaretId,
        range: VisualRange,
        column: Option<ColumnGoal>,
    ) {
        let rows = selection::from_semantic(host, range, column, self.style);
        if range.kind != SubMode::BlockWise {
            host.move_caret(caret, range.head);
            match rows.first() {
                Some(row) if !row.is_empty() => host.set_selection(caret, *row),
                _ => host.remove_selection(caret),
            }
            return;
        }

        host.remove_secondary_carets();
        self.forget_stale_carets(host);
        let head = host.offset_to_position(range.head);
        let top = host.line_of(range.anchor).min(head.line);
        let head_col = match column {
            Some(ColumnGoal::Column(col)) => col,
            Some(ColumnGoal::LineEnd) => usize::MAX,
            None => head.col,
        };
        for (i, row) in rows.into_iter().enumerate() {
            let line = top + i;
            let id = if line == head.line {
                host.move_caret(caret, range.head);
                caret
            } else {
                host.add_caret(host.position_to_offset(Position { line, col: head_col }))
            };
            if row.is_empty() {
                host.remove_selection(id);
            } else {
                host.set_selection(id, row);
            }
        }
    }

    /// Redraws every caret's selection for the current sub-mode.
    ///
    /// `displayed` is the shape the host selection currently has.
    fn refresh<H: HostEditor + ?Sized>(&mut self, host: &mut H, displayed: SubMode) -> Result<()> {
        let kind = self.modes.sub_mode();
        let carets = self.carets_of(host)?;
        let primary = self.primary(host)?;
        let _scope = self.guard.acquire();

        let anchored: Vec<CaretId> = carets
            .iter()
            .copied()
            .filter(|c| self.anchor(*c).is_some())
            .collect();

        if kind == SubMode::BlockWise || anchored.len() != carets.len() {
            let head = self.head_of(host, primary, displayed);
            let anchor = self.anchor(primary).unwrap_or(head);
            host.remove_secondary_carets();
            self.forget_stale_carets(host);
            let column = match (kind, self.remembered_column(primary)) {
                (SubMode::BlockWise, Some(ColumnGoal::LineEnd)) => Some(ColumnGoal::LineEnd),
                (SubMode::BlockWise, goal) if displayed == SubMode::BlockWise => goal,
                _ => None,
            };
            self.show(host, primary, VisualRange { anchor, head, kind }, column);
            return Ok(());
        }

        let ranges: Vec<(CaretId, VisualRange)> = anchored
            .iter()
            .map(|&c| {
                let head = self.head_of(host, c, displayed);
                let anchor = self.anchor(c).unwrap_or(head);
                (c, VisualRange { anchor, head, kind })
            })
            .collect();
        for (caret, range) in ranges {
            self.show(host, caret, range, None);
        }
        Ok(())
    }

    /// Anchors an adopted multi-caret block on its left edge, on the line
    /// opposite the primary caret, and pins the head column to the right edge.
    fn anchor_block<H: HostEditor + ?Sized>(&mut self, host: &H, carets: &[CaretId]) {
        let rows: Vec<RawSelection> = carets.iter().filter_map(|c| host.selection(*c)).collect();
        let primary = carets[0];
        for caret in &carets[1..] {
            self.caret_state_mut(*caret).anchor = None;
        }
        let offset = host.caret_offset(primary);
        let Some(bounds) = block::compute_bounds(host, &rows) else {
            self.caret_state_mut(primary).anchor = Some(offset);
            return;
        };
        let anchor_line = if host.line_of(offset) == bounds.top_line {
            bounds.bottom_line
        } else {
            bounds.top_line
        };
        let anchor = host.position_to_offset(Position {
            line: anchor_line,
            col: bounds.left_col,
        });
        let head_col = bounds
            .right_col
            .saturating_sub(self.style.adjustment())
            .max(bounds.left_col);
        let state = self.caret_state_mut(primary);
        state.anchor = Some(anchor);
        state.remembered_column = Some(ColumnGoal::Column(head_col));
    }

    fn enter_selecting<H: HostEditor + ?Sized>(
        &mut self,
        host: &H,
        mode: Mode,
        sub_mode: Option<SubMode>,
    ) -> Result<()> {
        let carets = self.carets_of(host)?;
        let kind = match sub_mode {
            Some(kind) => kind,
            None => self.autodetect_sub_mode(host)?,
        };
        let was_selecting = self.modes.mode().is_visual_or_select();
        if was_selecting {
            self.modes.pop()?;
        }
        self.modes.push(ModeFrame::new(mode, kind));

        if kind == SubMode::BlockWise && carets.len() > 1 {
            self.anchor_block(host, &carets);
        } else {
            for caret in carets {
                if was_selecting && self.anchor(caret).is_some() {
                    continue;
                }
                let sel = caret_selection(host, caret);
                let anchor = if sel.selection.is_empty() {
                    sel.offset
                } else {
                    selection::caret_range(sel, kind, self.style).anchor
                };
                self.caret_state_mut(caret).anchor = Some(anchor);
            }
        }
        tracing::debug!(?mode, ?kind, "entered selecting mode");
        Ok(())
    }

    /// Pushes a visual frame and anchors every caret at its selection start.
    ///
    /// Neither carets nor selections move. Without a sub-mode the shape is
    /// read from the current selections.
    pub fn enter_visual<H: HostEditor + ?Sized>(
        &mut self,
        host: &H,
        sub_mode: Option<SubMode>,
    ) -> Result<()> {
        self.enter_selecting(host, Mode::Visual, sub_mode)
    }

    pub fn enter_select<H: HostEditor + ?Sized>(&mut self, host: &H, sub_mode: SubMode) -> Result<()> {
        self.enter_selecting(host, Mode::Select, Some(sub_mode))
    }

    fn exit_selecting<H: HostEditor + ?Sized>(
        &mut self,
        host: &mut H,
        move_to_head: bool,
        adjust_caret: bool,
    ) -> Result<bool> {
        let primary = self.primary(host)?;
        let frame = self.modes.pop()?;
        let head = self.head_of(host, primary, frame.sub_mode);
        let anchor = self.anchor(primary).unwrap_or(head);
        self.marks = Some(VisualMarks {
            start_offset: anchor.min(head),
            end_offset: anchor.max(head),
        });
        self.last_selection_kind = Some(frame.sub_mode);

        let _scope = self.guard.acquire();
        if frame.sub_mode == SubMode::BlockWise {
            host.remove_secondary_carets();
        }
        for caret in host.carets() {
            let caret_head = if caret == primary {
                head
            } else {
                self.head_of(host, caret, frame.sub_mode)
            };
            host.remove_selection(caret);
            if move_to_head {
                host.move_caret(caret, caret_head);
            }
            if adjust_caret {
                let offset = host.caret_offset(caret);
                let line = host.line_of(offset);
                let line_end = host.line_end_offset(line);
                if offset == line_end && line_end != host.line_start_offset(line) {
                    host.move_caret(caret, offset - 1);
                }
            }
            let state = self.caret_state_mut(caret);
            state.anchor = None;
            state.remembered_column = None;
        }
        self.forget_stale_carets(host);
        self.mode_before_selection = None;
        tracing::debug!(mode = ?frame.mode, kind = ?frame.sub_mode, ?anchor, ?head, "left selecting mode");
        Ok(true)
    }

    /// Leaves visual mode, saving `'<`/`'>` and clearing all selections.
    ///
    /// `Ok(false)` when not in visual mode.
    pub fn exit_visual<H: HostEditor + ?Sized>(&mut self, host: &mut H) -> Result<bool> {
        if self.modes.mode() != Mode::Visual {
            return Ok(false);
        }
        self.exit_selecting(host, true, false)
    }

    /// Leaves select mode. With `adjust_caret_position` a caret left on the
    /// end of a non-empty line steps back onto its last character.
    pub fn exit_select<H: HostEditor + ?Sized>(
        &mut self,
        host: &mut H,
        adjust_caret_position: bool,
    ) -> Result<bool> {
        if self.modes.mode() != Mode::Select {
            return Ok(false);
        }
        self.exit_selecting(host, false, adjust_caret_position)
    }

    /// `v`, `V` and `Ctrl-V`.
    ///
    /// With a count outside visual mode, selects `count` times the shape of the
    /// last visual operation from the caret. Returns `Ok(false)` when nothing
    /// changed.
    pub fn toggle_visual<H: HostEditor + ?Sized>(
        &mut self,
        host: &mut H,
        sub_mode: SubMode,
        count: usize,
    ) -> Result<bool> {
        self.carets_of(host)?;
        let frame = self.modes.current();
        if frame.mode != Mode::Visual {
            if count > 0 {
                return self.repeat_last_visual(host, sub_mode, count);
            }
            let displayed = frame.sub_mode;
            self.enter_visual(host, Some(sub_mode))?;
            self.refresh(host, displayed)?;
            return Ok(true);
        }
        if frame.sub_mode == sub_mode {
            return self.exit_visual(host);
        }

        self.modes.set_sub_mode(sub_mode);
        if sub_mode == SubMode::BlockWise {
            let primary = self.primary(host)?;
            if self.remembered_column(primary) != Some(ColumnGoal::LineEnd) {
                self.caret_state_mut(primary).remembered_column = None;
            }
        }
        tracing::debug!(from = ?frame.sub_mode, to = ?sub_mode, "switched visual sub-mode");
        self.refresh(host, frame.sub_mode)?;
        Ok(true)
    }

    fn repeat_last_visual<H: HostEditor + ?Sized>(
        &mut self,
        host: &mut H,
        sub_mode: SubMode,
        count: usize,
    ) -> Result<bool> {
        let carets = self.carets_of(host)?;
        if carets.len() > 1 {
            tracing::debug!(carets = carets.len(), "counted visual repeat needs a single caret");
            return Ok(false);
        }
        let caret = carets[0];
        let start = host.caret_offset(caret);
        let pos = host.offset_to_position(start);
        let adj = self.style.adjustment();
        let last_line = host.line_count().saturating_sub(1);

        let change = self.caret_state(caret).and_then(|s| s.last_visual_operator_range);
        let (kind, head, column) = match change {
            None => {
                let head = (start + count).saturating_sub(adj).max(start);
                (sub_mode, head.min(self.last_head_on_line(host, pos.line).max(start)), None)
            }
            Some(change) => {
                let line = (pos.line + change.line_span.max(1) * count - 1).min(last_line);
                match (change.kind, change.column_span) {
                    (SubMode::LineWise, _) => {
                        let head = host.position_to_offset(Position { line, col: pos.col });
                        (SubMode::LineWise, head, None)
                    }
                    (SubMode::BlockWise, ColumnSpan::ToLineEnd) => {
                        let head = host.line_end_offset(line);
                        (SubMode::BlockWise, head, Some(ColumnGoal::LineEnd))
                    }
                    (SubMode::BlockWise, ColumnSpan::Count(n)) => {
                        let col = (pos.col + n * count).saturating_sub(adj).max(pos.col);
                        let head = host.position_to_offset(Position { line, col });
                        (SubMode::BlockWise, head, Some(ColumnGoal::Column(col)))
                    }
                    (_, span) if change.line_span > 1 => {
                        let col = match span {
                            ColumnSpan::Count(n) => n.saturating_sub(adj),
                            ColumnSpan::ToLineEnd => usize::MAX,
                        };
                        let head = host.position_to_offset(Position { line, col });
                        (SubMode::CharWise, head, None)
                    }
                    (_, span) => {
                        let head = match span {
                            ColumnSpan::Count(n) => (start + n * count).saturating_sub(adj).max(start),
                            ColumnSpan::ToLineEnd => usize::MAX,
                        };
                        let head = head.min(self.last_head_on_line(host, pos.line).max(start));
                        (SubMode::CharWise, head, None)
                    }
                }
            }
        };

        if self.modes.mode() == Mode::Select {
            self.modes.pop()?;
        }
        self.modes.push(ModeFrame::new(Mode::Visual, kind));
        let state = self.caret_state_mut(caret);
        state.anchor = Some(start);
        if kind == SubMode::BlockWise {
            state.remembered_column = column;
        }
        let _scope = self.guard.acquire();
        self.show(
            host,
            caret,
            VisualRange {
                anchor: start,
                head,
                kind,
            },
            column,
        );
        tracing::debug!(?kind, count, ?change, "repeated last visual shape");
        Ok(true)
    }

    /// Moves the head of a visual or select selection, as motions do.
    ///
    /// A block belongs to the primary caret; `Ok(false)` for any other.
    pub fn extend_to<H: HostEditor + ?Sized>(
        &mut self,
        host: &mut H,
        caret: CaretId,
        offset: usize,
    ) -> Result<bool> {
        if !self.modes.mode().is_visual_or_select() {
            return Ok(false);
        }
        let kind = self.modes.sub_mode();
        if kind == SubMode::BlockWise && caret != self.primary(host)? {
            return Ok(false);
        }
        let head = offset.min(host.text_len());
        let anchor = match self.anchor(caret) {
            Some(anchor) => anchor,
            None => self.head_of(host, caret, kind),
        };
        let column = match (kind, self.remembered_column(caret)) {
            (SubMode::BlockWise, Some(ColumnGoal::LineEnd)) => Some(ColumnGoal::LineEnd),
            (SubMode::BlockWise, Some(ColumnGoal::Column(_))) => {
                Some(ColumnGoal::Column(host.offset_to_position(head).col))
            }
            _ => None,
        };
        let state = self.caret_state_mut(caret);
        state.anchor = Some(anchor);
        if kind == SubMode::BlockWise {
            state.remembered_column = column;
        }
        let _scope = self.guard.acquire();
        self.show(host, caret, VisualRange { anchor, head, kind }, column);
        Ok(true)
    }

    /// `o`: the anchor and the head trade places, the extent stays.
    pub fn swap_ends<H: HostEditor + ?Sized>(&mut self, host: &mut H, caret: CaretId) -> Result<bool> {
        if !self.modes.mode().is_visual_or_select() {
            return Ok(false);
        }
        let kind = self.modes.sub_mode();
        let Some(anchor) = self.anchor(caret) else {
            return Ok(false);
        };
        let head = self.head_of(host, caret, kind);
        let column = match kind {
            SubMode::BlockWise => self.remembered_column(caret),
            _ => None,
        };

        let (new_anchor, new_column) = match column {
            Some(ColumnGoal::Column(col)) => {
                let line = host.line_of(head);
                let corner = host.position_to_offset(Position { line, col });
                let anchor_col = host.offset_to_position(anchor).col;
                (corner, Some(ColumnGoal::Column(anchor_col)))
            }
            other => (head, other),
        };
        let state = self.caret_state_mut(caret);
        state.anchor = Some(new_anchor);
        if kind == SubMode::BlockWise {
            state.remembered_column = new_column;
        }

        let _scope = self.guard.acquire();
        let range = VisualRange {
            anchor: new_anchor,
            head: anchor,
            kind,
        };
        self.show(host, caret, range, new_column);
        host.scroll_to_caret(caret);
        Ok(true)
    }

    /// [`swap_ends`](Self::swap_ends) for every caret that has an anchor.
    pub fn swap_all_ends<H: HostEditor + ?Sized>(&mut self, host: &mut H) -> Result<bool> {
        let carets = self.carets_of(host)?;
        let anchored: Vec<CaretId> = carets
            .into_iter()
            .filter(|c| self.anchor(*c).is_some())
            .collect();
        let mut swapped = false;
        for caret in anchored {
            swapped |= self.swap_ends(host, caret)?;
        }
        Ok(swapped)
    }

    /// `gv`: selects the marks of the last visual selection again.
    ///
    /// `Ok(false)` without touching anything when there is nothing to resume.
    pub fn resume_last_visual<H: HostEditor + ?Sized>(&mut self, host: &mut H) -> Result<bool> {
        let (Some(marks), Some(kind)) = (self.marks, self.last_selection_kind) else {
            return Ok(false);
        };
        let primary = self.primary(host)?;
        match self.modes.mode() {
            Mode::Visual => {
                self.exit_selecting(host, true, false)?;
            }
            Mode::Select => {
                self.exit_selecting(host, false, false)?;
            }
            _ => {}
        }

        let kind = match kind {
            SubMode::None => SubMode::CharWise,
            kind => kind,
        };
        let text_len = host.text_len();
        let range = VisualRange {
            anchor: marks.start_offset.min(text_len),
            head: marks.end_offset.min(text_len),
            kind,
        };

        let _scope = self.guard.acquire();
        host.remove_secondary_carets();
        self.forget_stale_carets(host);
        self.modes.push(ModeFrame::new(Mode::Visual, kind));
        let state = self.caret_state_mut(primary);
        state.anchor = Some(range.anchor);
        state.remembered_column = None;
        self.show(host, primary, range, None);
        host.scroll_to_caret(primary);
        tracing::debug!(?kind, ?marks, "resumed last visual selection");
        Ok(true)
    }

    /// Shape of the caret's selection, for replaying with a count later.
    pub fn compute_operator_range<H: HostEditor + ?Sized>(
        &self,
        host: &H,
        caret: CaretId,
        sub_mode: SubMode,
    ) -> VisualChange {
        if sub_mode == SubMode::BlockWise {
            let mut rows: Vec<RawSelection> =
                host.carets().iter().filter_map(|c| host.selection(*c)).collect();
            if rows.is_empty() {
                rows.push(caret_selection(host, caret).selection);
            }
            let (line_span, columns) = match block::compute_bounds(host, &rows) {
                Some(b) => (
                    b.bottom_line - b.top_line + 1,
                    b.right_col.saturating_sub(b.left_col),
                ),
                None => (1, 0),
            };
            let column_span = match self.remembered_column(caret) {
                Some(ColumnGoal::LineEnd) => ColumnSpan::ToLineEnd,
                _ => ColumnSpan::Count(columns),
            };
            return VisualChange {
                line_span,
                column_span,
                kind: SubMode::BlockWise,
            };
        }

        let head = self.head_of(host, caret, sub_mode);
        let anchor = self.anchor(caret).unwrap_or_else(|| {
            selection::caret_range(caret_selection(host, caret), sub_mode, self.style).anchor
        });
        let start = host.offset_to_position(anchor.min(head));
        let end = host.offset_to_position(anchor.max(head));
        let line_span = end.line - start.line + 1;
        let adj = self.style.adjustment();
        let columns = match sub_mode {
            SubMode::LineWise => end.col,
            _ if line_span > 1 => end.col + adj,
            _ => end.col + adj - start.col,
        };
        VisualChange {
            line_span,
            column_span: ColumnSpan::Count(columns),
            kind: match sub_mode {
                SubMode::None => SubMode::CharWise,
                kind => kind,
            },
        }
    }

    /// Hands the current selections to an operator and leaves visual or select
    /// mode. Each caret remembers the shape for a later counted `v`.
    pub fn finish_visual_operator<H: HostEditor + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<Vec<VisualTarget>> {
        let mode = self.modes.mode();
        if !mode.is_visual_or_select() {
            return Ok(Vec::new());
        }
        let kind = self.modes.sub_mode();
        let primary = self.primary(host)?;
        let carets: Vec<CaretId> = match kind {
            SubMode::BlockWise => vec![primary],
            _ => self
                .carets_of(host)?
                .into_iter()
                .filter(|c| *c == primary || self.anchor(*c).is_some())
                .collect(),
        };

        let mut targets = Vec::with_capacity(carets.len());
        for caret in carets {
            let head = self.head_of(host, caret, kind);
            let anchor = self.anchor(caret).unwrap_or(head);
            let column = match kind {
                SubMode::BlockWise => self.remembered_column(caret),
                _ => None,
            };
            let change = self.compute_operator_range(host, caret, kind);
            self.caret_state_mut(caret).last_visual_operator_range = Some(change);
            targets.push(VisualTarget {
                caret,
                range: VisualRange { anchor, head, kind },
                column,
                change,
            });
        }
        self.exit_selecting(host, mode == Mode::Visual, false)?;
        Ok(targets)
    }

    /// Typing over a select-mode selection: leaves select mode for insert mode
    /// but keeps the host selection, so the host's own typing replaces it.
    pub fn begin_select_replacement<H: HostEditor + ?Sized>(&mut self, host: &H) -> Result<bool> {
        if self.modes.mode() != Mode::Select {
            return Ok(false);
        }
        let primary = self.primary(host)?;
        let frame = self.modes.pop()?;
        let head = self.head_of(host, primary, frame.sub_mode);
        let anchor = self.anchor(primary).unwrap_or(head);
        self.marks = Some(VisualMarks {
            start_offset: anchor.min(head),
            end_offset: anchor.max(head),
        });
        self.last_selection_kind = Some(frame.sub_mode);
        for caret in host.carets() {
            let state = self.caret_state_mut(caret);
            state.anchor = None;
            state.remembered_column = None;
        }
        self.mode_before_selection = None;
        self.modes.push(ModeFrame::new(Mode::Insert, SubMode::None));
        Ok(true)
    }

    /// `Ctrl-G`: visual becomes select and back, keeping the selection.
    pub fn switch_visual_select(&mut self) -> Result<bool> {
        let frame = self.modes.current();
        let target = match frame.mode {
            Mode::Visual => Mode::Select,
            Mode::Select => Mode::Visual,
            _ => return Ok(false),
        };
        self.modes.pop()?;
        self.modes.push(ModeFrame::new(target, frame.sub_mode));
        Ok(true)
    }

    /// Classifies selections the engine did not make.
    pub fn autodetect_sub_mode<H: HostEditor + ?Sized>(&self, host: &H) -> Result<SubMode> {
        let carets = self.carets_of(host)?;
        let selections: Vec<RawSelection> = carets
            .iter()
            .filter_map(|c| host.selection(*c))
            .filter(|s| !s.is_empty())
            .collect();

        let kind = if carets.len() > 1
            && selections.len() == carets.len()
            && block::is_block(host, &selections)
        {
            SubMode::BlockWise
        } else if !selections.is_empty() && selections.iter().all(|s| is_line_aligned(host, *s)) {
            SubMode::LineWise
        } else {
            SubMode::CharWise
        };
        tracing::debug!(?kind, carets = carets.len(), "autodetected selection shape");
        Ok(kind)
    }

    /// Adopts a selection change the host made on its own.
    ///
    /// A new selection puts the session into visual mode (select mode inside
    /// templates and single-line fields) with the detected shape. A cleared
    /// selection ends visual or select mode and returns to insertion when
    /// that is where the selection started, when a template is running, or
    /// when `reset_caret_to_insert` asks for it.
    pub fn on_host_selection_changed<H: HostEditor + ?Sized>(
        &mut self,
        host: &mut H,
        reset_caret_to_insert: bool,
    ) -> Result<()> {
        if self.guard.is_held() {
            tracing::trace!("ignoring selection change made by the engine");
            return Ok(());
        }
        let carets = self.carets_of(host)?;

        if carets.iter().any(|c| has_selection(host, *c)) {
            let current = self.modes.mode();
            if !current.is_visual_or_select() {
                self.mode_before_selection = Some(current);
            }
            // Anchors are re-read from the host's selection below.
            self.modes.pop_to_base();
            let kind = self.autodetect_sub_mode(host)?;
            if host.is_template_active() || host.is_single_line() {
                self.enter_select(host, kind)?;
            } else {
                self.enter_visual(host, Some(kind))?;
            }
            return Ok(());
        }

        let prior = self.mode_before_selection.take();
        match self.modes.mode() {
            Mode::Visual => {
                self.exit_selecting(host, true, false)?;
            }
            Mode::Select => {
                self.exit_selecting(host, false, false)?;
            }
            _ => {}
        }
        let back_to_insert =
            prior == Some(Mode::Insert) || host.is_template_active() || reset_caret_to_insert;
        if back_to_insert && self.modes.mode() != Mode::Insert {
            self.modes.pop_to_base();
            self.modes.push(ModeFrame::new(Mode::Insert, SubMode::None));
        }
        Ok(())
    }
}

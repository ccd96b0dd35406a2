use modal_bridge::guard::ReentrancyGuard;
use modal_bridge::key::KeyEvent;
use modal_bridge::traits::HostEditor;
use modal_bridge::types::{CaretId, Position, RawSelection};
use ropey::Rope;

#[derive(Debug, Clone)]
struct MockCaret {
    id: CaretId,
    offset: usize,
    selection: Option<RawSelection>,
}

/// A rope-backed editor view with any number of carets.
///
/// Selection writes are counted the way a host's selection listener would see
/// them: suppressed while the observed guard is held, reported otherwise.
pub struct MockHost {
    rope: Rope,
    carets: Vec<MockCaret>,
    next_id: usize,
    observer: Option<ReentrancyGuard>,
    pub popup: bool,
    pub template: bool,
    pub single_line: bool,
    pub file_backed: bool,
    pub primary_surface: bool,
    pub bindings: Vec<KeyEvent>,
    pub notifications: usize,
    pub suppressed: usize,
    pub scrolls: usize,
}

impl MockHost {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            carets: vec![MockCaret {
                id: CaretId(0),
                offset: 0,
                selection: None,
            }],
            next_id: 1,
            observer: None,
            popup: false,
            template: false,
            single_line: false,
            file_backed: true,
            primary_surface: true,
            bindings: Vec::new(),
            notifications: 0,
            suppressed: 0,
            scrolls: 0,
        }
    }

    pub fn with_caret(mut self, offset: usize) -> Self {
        self.carets[0].offset = offset;
        self
    }

    pub fn primary(&self) -> CaretId {
        self.carets[0].id
    }

    /// Listen for selection changes the way a host listener would.
    pub fn observe(&mut self, guard: ReentrancyGuard) {
        self.observer = Some(guard);
    }

    /// A selection made by the user, caret left on the raw end.
    pub fn select(&mut self, caret: CaretId, start: usize, end: usize) {
        self.move_caret(caret, end);
        self.set_selection(caret, RawSelection::new(start, end));
    }

    /// Adds a caret selecting `[start, end)`, as a column drag would.
    pub fn add_selected_caret(&mut self, start: usize, end: usize) -> CaretId {
        let id = self.add_caret(end);
        self.set_selection(id, RawSelection::new(start, end));
        id
    }

    pub fn clear_selections(&mut self) {
        for caret in self.carets() {
            self.remove_selection(caret);
        }
    }

    pub fn remove_all_carets(&mut self) {
        self.carets.clear();
    }

    pub fn selections(&self) -> Vec<RawSelection> {
        self.carets.iter().filter_map(|c| c.selection).collect()
    }

    pub fn primary_selection(&self) -> Option<RawSelection> {
        self.carets[0].selection
    }

    pub fn primary_offset(&self) -> usize {
        self.carets[0].offset
    }

    fn caret(&self, id: CaretId) -> &MockCaret {
        self.carets
            .iter()
            .find(|c| c.id == id)
            .expect("unknown caret")
    }

    fn caret_mut(&mut self, id: CaretId) -> &mut MockCaret {
        self.carets
            .iter_mut()
            .find(|c| c.id == id)
            .expect("unknown caret")
    }

    fn notify(&mut self) {
        match &self.observer {
            Some(guard) if guard.is_held() => self.suppressed += 1,
            _ => self.notifications += 1,
        }
    }

    fn last_line(&self) -> usize {
        self.rope.len_lines().saturating_sub(1)
    }
}

impl HostEditor for MockHost {
    fn carets(&self) -> Vec<CaretId> {
        self.carets.iter().map(|c| c.id).collect()
    }

    fn caret_offset(&self, caret: CaretId) -> usize {
        self.caret(caret).offset
    }

    fn move_caret(&mut self, caret: CaretId, offset: usize) {
        let len = self.rope.len_chars();
        self.caret_mut(caret).offset = offset.min(len);
    }

    fn selection(&self, caret: CaretId) -> Option<RawSelection> {
        self.caret(caret).selection.filter(|s| !s.is_empty())
    }

    fn set_selection(&mut self, caret: CaretId, selection: RawSelection) {
        self.caret_mut(caret).selection = Some(selection);
        self.notify();
    }

    fn remove_selection(&mut self, caret: CaretId) {
        if self.caret_mut(caret).selection.take().is_some() {
            self.notify();
        }
    }

    fn add_caret(&mut self, offset: usize) -> CaretId {
        let id = CaretId(self.next_id);
        self.next_id += 1;
        self.carets.push(MockCaret {
            id,
            offset: offset.min(self.rope.len_chars()),
            selection: None,
        });
        id
    }

    fn remove_secondary_carets(&mut self) {
        self.carets.truncate(1);
    }

    fn text_len(&self) -> usize {
        self.rope.len_chars()
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        Position {
            line,
            col: offset - self.rope.line_to_char(line),
        }
    }

    fn position_to_offset(&self, pos: Position) -> usize {
        let line = pos.line.min(self.last_line());
        self.line_start_offset(line) + pos.col.min(self.line_len(line))
    }

    fn line_start_offset(&self, line: usize) -> usize {
        self.rope.line_to_char(line.min(self.last_line()))
    }

    fn line_end_offset(&self, line: usize) -> usize {
        let line = line.min(self.last_line());
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
        }
        self.rope.line_to_char(line) + len
    }

    fn scroll_to_caret(&mut self, _caret: CaretId) {
        self.scrolls += 1;
    }

    fn is_popup_active(&self) -> bool {
        self.popup
    }

    fn is_template_active(&self) -> bool {
        self.template
    }

    fn is_single_line(&self) -> bool {
        self.single_line
    }

    fn is_file_backed(&self) -> bool {
        self.file_backed
    }

    fn is_primary_surface(&self) -> bool {
        self.primary_surface
    }

    fn has_binding(&self, key: &KeyEvent) -> bool {
        self.bindings.contains(key)
    }
}

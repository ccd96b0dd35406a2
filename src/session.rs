use std::collections::HashMap;

use crate::config::{Config, SelectionStyle};
use crate::engine::InputState;
use crate::error::{Error, Result};
use crate::guard::ReentrancyGuard;
use crate::mode_stack::ModeStack;
use crate::traits::HostEditor;
use crate::types::{CaretId, ColumnGoal, Mode, SubMode, VisualChange, VisualMarks};

/// Engine-side state attached to one host caret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaretState {
    /// Fixed end of the visual selection; `None` outside visual and select.
    pub anchor: Option<usize>,
    /// Shape of the last visual selection an operator consumed.
    pub last_visual_operator_range: Option<VisualChange>,
    pub remembered_column: Option<ColumnGoal>,
}

/// Modal state of one open buffer view.
///
/// Sessions share nothing with each other; the selection style is copied out
/// of the process-wide [`Config`] when the view opens.
#[derive(Debug)]
pub struct EditorSession {
    pub(crate) modes: ModeStack,
    pub(crate) carets: HashMap<CaretId, CaretState>,
    pub(crate) marks: Option<VisualMarks>,
    pub(crate) last_selection_kind: Option<SubMode>,
    /// Mode that was active when a host selection pulled the session into visual.
    pub(crate) mode_before_selection: Option<Mode>,
    pub(crate) style: SelectionStyle,
    pub(crate) guard: ReentrancyGuard,
    pub(crate) tab_requested: bool,
    pub(crate) input: InputState,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl EditorSession {
    pub fn new(config: &Config) -> Self {
        Self {
            modes: ModeStack::default(),
            carets: HashMap::new(),
            marks: None,
            last_selection_kind: None,
            mode_before_selection: None,
            style: config.selection,
            guard: ReentrancyGuard::new(),
            tab_requested: false,
            input: InputState::default(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.modes.mode()
    }

    pub fn sub_mode(&self) -> SubMode {
        self.modes.sub_mode()
    }

    pub fn mode_stack(&self) -> &ModeStack {
        &self.modes
    }

    pub fn mode_stack_mut(&mut self) -> &mut ModeStack {
        &mut self.modes
    }

    pub fn selection_style(&self) -> SelectionStyle {
        self.style
    }

    /// Marks of the last exited visual or select selection.
    pub fn visual_marks(&self) -> Option<VisualMarks> {
        self.marks
    }

    pub fn last_selection_kind(&self) -> Option<SubMode> {
        self.last_selection_kind
    }

    pub fn mode_before_selection(&self) -> Option<Mode> {
        self.mode_before_selection
    }

    /// A handle for the host's selection listener; see [`ReentrancyGuard`].
    pub fn guard(&self) -> ReentrancyGuard {
        self.guard.clone()
    }

    pub fn caret_state(&self, caret: CaretId) -> Option<&CaretState> {
        self.carets.get(&caret)
    }

    pub fn caret_state_mut(&mut self, caret: CaretId) -> &mut CaretState {
        self.carets.entry(caret).or_default()
    }

    pub fn anchor(&self, caret: CaretId) -> Option<usize> {
        self.carets.get(&caret).and_then(|state| state.anchor)
    }

    /// Set by motions; `LineEnd` makes a block follow every line's end.
    pub fn set_remembered_column(&mut self, caret: CaretId, goal: Option<ColumnGoal>) {
        self.caret_state_mut(caret).remembered_column = goal;
    }

    /// Whether a tab was declined in insert mode since the last call.
    pub fn take_tab_requested(&mut self) -> bool {
        std::mem::take(&mut self.tab_requested)
    }

    pub(crate) fn carets_of<H: HostEditor + ?Sized>(&self, host: &H) -> Result<Vec<CaretId>> {
        let carets = host.carets();
        if carets.is_empty() {
            tracing::error!("host view has no carets");
            return Err(Error::NoCarets);
        }
        Ok(carets)
    }

    pub(crate) fn primary<H: HostEditor + ?Sized>(&self, host: &H) -> Result<CaretId> {
        host.primary_caret().ok_or_else(|| {
            tracing::error!("host view has no primary caret");
            Error::NoCarets
        })
    }

    /// Drops state of carets the host no longer has.
    pub(crate) fn forget_stale_carets<H: HostEditor + ?Sized>(&mut self, host: &H) {
        let live = host.carets();
        self.carets.retain(|id, _| live.contains(id));
    }
}

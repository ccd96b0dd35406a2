use crate::error::{Error, Result};
use crate::types::{Mode, ModeFrame, SubMode};

/// The modes a session has entered, innermost last.
///
/// Never empty. The bottom frame is the base editing mode and cannot be popped.
#[derive(Debug, Clone)]
pub struct ModeStack {
    frames: Vec<ModeFrame>,
}

impl Default for ModeStack {
    fn default() -> Self {
        Self::new(Mode::Normal)
    }
}

impl ModeStack {
    pub fn new(base: Mode) -> Self {
        Self {
            frames: vec![ModeFrame::new(base, SubMode::None)],
        }
    }

    pub fn current(&self) -> ModeFrame {
        // The constructor seeds one frame and `pop` refuses to remove it.
        self.frames[self.frames.len() - 1]
    }

    pub fn mode(&self) -> Mode {
        self.current().mode
    }

    pub fn sub_mode(&self) -> SubMode {
        self.current().sub_mode
    }

    pub fn base(&self) -> ModeFrame {
        self.frames[0]
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True when nothing is stacked on top of a normal-mode base.
    pub fn is_base_command_mode(&self) -> bool {
        self.frames.len() == 1 && self.frames[0].mode == Mode::Normal
    }

    pub fn push(&mut self, frame: ModeFrame) {
        tracing::debug!(mode = ?frame.mode, sub_mode = ?frame.sub_mode, depth = self.frames.len() + 1, "push mode");
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Result<ModeFrame> {
        if self.frames.len() == 1 {
            tracing::error!(mode = ?self.frames[0].mode, "refusing to pop the base mode frame");
            return Err(Error::BaseFramePop);
        }
        let frame = self.frames.pop().ok_or(Error::BaseFramePop)?;
        tracing::debug!(mode = ?frame.mode, depth = self.frames.len(), "pop mode");
        Ok(frame)
    }

    /// Pops frames until `stop` accepts the top one or only the base remains.
    ///
    /// Returns the popped frames, innermost first.
    pub fn pop_to(&mut self, mut stop: impl FnMut(&ModeFrame) -> bool) -> Vec<ModeFrame> {
        let mut popped = Vec::new();
        while self.frames.len() > 1 && !stop(&self.current()) {
            if let Some(frame) = self.frames.pop() {
                popped.push(frame);
            }
        }
        if !popped.is_empty() {
            tracing::debug!(popped = popped.len(), mode = ?self.mode(), "unwound mode stack");
        }
        popped
    }

    pub fn pop_to_base(&mut self) -> Vec<ModeFrame> {
        self.pop_to(|_| false)
    }

    /// Changes the shape of the top frame without pushing or popping.
    pub fn set_sub_mode(&mut self, sub_mode: SubMode) {
        let last = self.frames.len() - 1;
        self.frames[last].sub_mode = sub_mode;
    }

    pub fn frames(&self) -> &[ModeFrame] {
        &self.frames
    }
}

use crate::arbiter::{KeyOwnershipArbiter, Ownership};
use crate::config::Config;
use crate::error::Result;
use crate::key::{KeyCode, KeyEvent};
use crate::keymap::{Handler, Keymap, Lookup, Operator};
use crate::session::EditorSession;
use crate::traits::HostEditor;
use crate::types::{MappingScope, Mode, ModeFrame, SubMode, VisualMarks};
use crate::visual::VisualTarget;

#[derive(Debug, Default, Clone)]
struct Counts {
    current: Option<u32>,
}

impl Counts {
    fn push_digit(&mut self, d: u32) {
        let next = self
            .current
            .unwrap_or(0)
            .saturating_mul(10)
            .saturating_add(d);
        self.current = Some(next);
    }
}

/// Half-typed input of one session.
#[derive(Debug, Default, Clone)]
pub(crate) struct InputState {
    counts: Counts,
    keys: Vec<KeyEvent>,
    operator: Option<(Operator, Option<u32>)>,
}

impl InputState {
    fn reset(&mut self) {
        self.counts.current = None;
        self.keys.clear();
    }
}

/// What happened to a keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The host owns the key and runs its own command for it.
    Declined,
    /// Part of a count or a longer binding; nothing ran yet.
    Pending,
    Handled(Handler),
    /// The handler ran but refused, e.g. `3v` with several carets.
    Rejected(Handler),
    /// A visual operator consumed the selection.
    Operator {
        operator: Operator,
        targets: Vec<VisualTarget>,
    },
    /// An operator got its motion keys; applying it is up to the motion catalog.
    Motion {
        operator: Operator,
        count: Option<u32>,
        keys: Vec<KeyEvent>,
    },
    /// Claimed by the engine, and the host should still perform its own
    /// editing action (typing, backspace in insert mode).
    PassThrough,
    /// Claimed and not bound in the current mode.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct EngineSnapshot {
    pub mode: Mode,
    pub sub_mode: SubMode,
    pub depth: usize,
    pub pending_count: Option<u32>,
    pub marks: Option<VisualMarks>,
}

pub struct EngineBuilder {
    config: Config,
    keymap: Keymap,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            keymap: Keymap::default(),
        }
    }
}

impl EngineBuilder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            arbiter: KeyOwnershipArbiter::new(&self.config),
            keymap: self.keymap,
            config: self.config,
        }
    }
}

/// Process-wide half of the engine: settings, key table and conflict table.
///
/// Per-view state lives in [`EditorSession`]s created by [`Engine::open_session`].
#[derive(Debug, Clone)]
pub struct Engine {
    config: Config,
    arbiter: KeyOwnershipArbiter,
    keymap: Keymap,
}

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::default().build()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn arbiter(&self) -> &KeyOwnershipArbiter {
        &self.arbiter
    }

    pub fn arbiter_mut(&mut self) -> &mut KeyOwnershipArbiter {
        &mut self.arbiter
    }

    pub fn open_session(&self) -> EditorSession {
        EditorSession::new(&self.config)
    }

    pub fn snapshot(&self, session: &EditorSession) -> EngineSnapshot {
        EngineSnapshot {
            mode: session.mode(),
            sub_mode: session.sub_mode(),
            depth: session.mode_stack().depth(),
            pending_count: session.input.counts.current,
            marks: session.visual_marks(),
        }
    }

    /// Routes one keystroke: arbitration first, then the key table of the
    /// session's current mode.
    pub fn handle_keystroke<H: HostEditor + ?Sized>(
        &mut self,
        session: &mut EditorSession,
        host: &mut H,
        key: KeyEvent,
    ) -> Result<KeyOutcome> {
        if self.arbiter.decide(&key, session, host) == Ownership::Host {
            session.input.reset();
            return Ok(KeyOutcome::Declined);
        }

        let scope = session.mode_stack().current().scope;

        // Count digits
        if matches!(
            scope,
            MappingScope::Normal | MappingScope::Visual | MappingScope::OpPending
        ) && session.input.keys.is_empty()
            && key.mods.is_empty()
            && let KeyCode::Char(c) = key.code
            && let Some(d) = c.to_digit(10)
            // Leading zero is a key, not a count
            && (d != 0 || session.input.counts.current.is_some())
        {
            session.input.counts.push_digit(d);
            return Ok(KeyOutcome::Pending);
        }

        session.input.keys.push(key);
        match self.keymap.lookup(scope, &session.input.keys) {
            Lookup::Prefix => Ok(KeyOutcome::Pending),
            Lookup::Match(handler) => {
                let count = session.input.counts.current.take();
                session.input.keys.clear();
                tracing::trace!(%key, ?handler, ?count, "dispatching");
                self.run(handler, count, session, host)
            }
            Lookup::None => {
                let count = session.input.counts.current.take();
                let keys = std::mem::take(&mut session.input.keys);
                self.unbound(scope, count, keys, session, host)
            }
        }
    }

    fn unbound<H: HostEditor + ?Sized>(
        &mut self,
        scope: MappingScope,
        count: Option<u32>,
        keys: Vec<KeyEvent>,
        session: &mut EditorSession,
        host: &mut H,
    ) -> Result<KeyOutcome> {
        match scope {
            MappingScope::OpPending => {
                session.mode_stack_mut().pop()?;
                let Some((operator, op_count)) = session.input.operator.take() else {
                    return Ok(KeyOutcome::Ignored);
                };
                let count = match (op_count, count) {
                    (Some(a), Some(b)) => Some(a.saturating_mul(b)),
                    (a, b) => a.or(b),
                };
                Ok(KeyOutcome::Motion {
                    operator,
                    count,
                    keys,
                })
            }
            MappingScope::Select if keys.iter().all(KeyEvent::is_printable) => {
                self.run(Handler::SelectTyped, count, session, host)
            }
            MappingScope::Insert => Ok(KeyOutcome::PassThrough),
            _ => Ok(KeyOutcome::Ignored),
        }
    }

    fn run<H: HostEditor + ?Sized>(
        &mut self,
        handler: Handler,
        count: Option<u32>,
        session: &mut EditorSession,
        host: &mut H,
    ) -> Result<KeyOutcome> {
        let done = match handler {
            Handler::ToggleVisual(kind) => {
                session.toggle_visual(host, kind, count.unwrap_or(0) as usize)?
            }
            Handler::EnterSelect(kind) => {
                if session.mode() == Mode::Normal {
                    session.toggle_visual(host, kind, 0)? && session.switch_visual_select()?
                } else {
                    false
                }
            }
            Handler::SwitchVisualSelect => session.switch_visual_select()?,
            Handler::SwapEnds => session.swap_all_ends(host)?,
            Handler::ResumeLastVisual => session.resume_last_visual(host)?,
            Handler::ExitVisual => session.exit_visual(host)?,
            Handler::ExitSelect => session.exit_select(host, true)?,
            Handler::SelectTyped => {
                if session.begin_select_replacement(host)? {
                    return Ok(KeyOutcome::PassThrough);
                }
                false
            }
            Handler::VisualOperator(operator) => {
                let targets = session.finish_visual_operator(host)?;
                if operator == Operator::Change {
                    session
                        .mode_stack_mut()
                        .push(ModeFrame::new(Mode::Insert, SubMode::None));
                }
                return Ok(KeyOutcome::Operator { operator, targets });
            }
            Handler::PushOperator(operator) => {
                session.input.operator = Some((operator, count));
                session
                    .mode_stack_mut()
                    .push(ModeFrame::new(Mode::OpPending, SubMode::None));
                true
            }
            Handler::CancelOperator => {
                session.input.operator = None;
                session.mode_stack_mut().pop()?;
                true
            }
            Handler::EnterInsert { append } => {
                if append {
                    let _scope = session.guard().acquire();
                    for caret in session.carets_of(host)? {
                        let offset = host.caret_offset(caret);
                        if offset < host.line_end_offset(host.line_of(offset)) {
                            host.move_caret(caret, offset + 1);
                        }
                    }
                }
                session
                    .mode_stack_mut()
                    .push(ModeFrame::new(Mode::Insert, SubMode::None));
                true
            }
            Handler::EnterReplace => {
                session
                    .mode_stack_mut()
                    .push(ModeFrame::new(Mode::Replace, SubMode::None));
                true
            }
            Handler::ExitInsert => {
                session.mode_stack_mut().pop_to_base();
                let _scope = session.guard().acquire();
                for caret in session.carets_of(host)? {
                    let offset = host.caret_offset(caret);
                    if offset > host.line_start_offset(host.line_of(offset)) {
                        host.move_caret(caret, offset - 1);
                    }
                }
                true
            }
            Handler::ResetNormal => {
                session.input.reset();
                true
            }
        };
        Ok(if done {
            KeyOutcome::Handled(handler)
        } else {
            KeyOutcome::Rejected(handler)
        })
    }
}

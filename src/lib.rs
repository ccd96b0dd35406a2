pub mod arbiter;
pub mod block;
pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod key;
pub mod keymap;
pub mod mode_stack;
pub mod selection;
pub mod session;
pub mod traits;
pub mod types;
pub mod visual;

pub use crate::arbiter::{ConflictTable, KeyOwnershipArbiter, Owner, Ownership};
pub use crate::block::BlockBounds;
pub use crate::config::{Config, SelectionStyle};
pub use crate::engine::{Engine, EngineBuilder, EngineSnapshot, KeyOutcome};
pub use crate::error::{Error, Result};
pub use crate::guard::{GuardScope, ReentrancyGuard};
pub use crate::key::{KeyCode, KeyEvent, Modifiers, parse_keys};
pub use crate::keymap::{Handler, Keymap, Operator};
pub use crate::mode_stack::ModeStack;
pub use crate::session::{CaretState, EditorSession};
pub use crate::traits::HostEditor;
pub use crate::types::{
    CaretId, ColumnGoal, ColumnSpan, MappingScope, Mode, ModeFrame, Position, RawSelection,
    SubMode, VisualChange, VisualMarks, VisualRange,
};
pub use crate::visual::VisualTarget;

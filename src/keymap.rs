use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::key::{KeyCode, KeyEvent, parse_keys};
use crate::types::{MappingScope, SubMode};

/// Operators the engine knows enough about to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Delete,
    Yank,
    Change,
}

/// Everything a key can trigger in this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    ToggleVisual(SubMode),
    EnterSelect(SubMode),
    SwitchVisualSelect,
    SwapEnds,
    ResumeLastVisual,
    ExitVisual,
    ExitSelect,
    /// A printable key in select mode: the selection gets replaced by typing.
    SelectTyped,
    VisualOperator(Operator),
    PushOperator(Operator),
    CancelOperator,
    EnterInsert { append: bool },
    EnterReplace,
    ExitInsert,
    ResetNormal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Match(Handler),
    /// The keys so far start a longer binding.
    Prefix,
    None,
}

/// Bindings from (scope, key sequence) to a [`Handler`].
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<(MappingScope, Vec<KeyEvent>), Handler>,
    prefixes: HashSet<(MappingScope, Vec<KeyEvent>)>,
}

const ESCAPES: [KeyEvent; 3] = [
    KeyEvent::plain(KeyCode::Esc),
    KeyEvent::ctrl('['),
    KeyEvent::ctrl('c'),
];

impl Default for Keymap {
    fn default() -> Self {
        use Handler::*;
        use MappingScope as S;

        let mut map = Keymap::empty();
        let c = KeyEvent::char;
        let toggles = [
            (c('v'), SubMode::CharWise),
            (c('V'), SubMode::LineWise),
            (KeyEvent::ctrl('v'), SubMode::BlockWise),
        ];

        for (key, kind) in toggles {
            map.bind_keys(S::Normal, vec![key], ToggleVisual(kind));
            map.bind_keys(S::Visual, vec![key], ToggleVisual(kind));
        }
        map.bind_keys(S::Normal, vec![c('g'), c('v')], ResumeLastVisual);
        map.bind_keys(S::Normal, vec![c('g'), c('h')], EnterSelect(SubMode::CharWise));
        map.bind_keys(S::Normal, vec![c('g'), c('H')], EnterSelect(SubMode::LineWise));
        map.bind_keys(S::Normal, vec![c('g'), KeyEvent::ctrl('h')], EnterSelect(SubMode::BlockWise));
        map.bind_keys(S::Normal, vec![c('i')], EnterInsert { append: false });
        map.bind_keys(S::Normal, vec![c('a')], EnterInsert { append: true });
        map.bind_keys(S::Normal, vec![c('R')], EnterReplace);
        map.bind_keys(S::Normal, vec![c('d')], PushOperator(Operator::Delete));
        map.bind_keys(S::Normal, vec![c('c')], PushOperator(Operator::Change));
        map.bind_keys(S::Normal, vec![c('y')], PushOperator(Operator::Yank));

        map.bind_keys(S::Visual, vec![c('o')], SwapEnds);
        map.bind_keys(S::Visual, vec![KeyEvent::ctrl('g')], SwitchVisualSelect);
        map.bind_keys(S::Visual, vec![c('g'), c('v')], ResumeLastVisual);
        map.bind_keys(S::Visual, vec![c('d')], VisualOperator(Operator::Delete));
        map.bind_keys(S::Visual, vec![c('x')], VisualOperator(Operator::Delete));
        map.bind_keys(S::Visual, vec![c('y')], VisualOperator(Operator::Yank));
        map.bind_keys(S::Visual, vec![c('c')], VisualOperator(Operator::Change));
        map.bind_keys(S::Visual, vec![c('s')], VisualOperator(Operator::Change));

        map.bind_keys(S::Select, vec![KeyEvent::ctrl('g')], SwitchVisualSelect);

        for key in ESCAPES {
            map.bind_keys(S::Normal, vec![key], ResetNormal);
            map.bind_keys(S::Visual, vec![key], ExitVisual);
            map.bind_keys(S::Select, vec![key], ExitSelect);
            map.bind_keys(S::Insert, vec![key], ExitInsert);
            map.bind_keys(S::OpPending, vec![key], CancelOperator);
        }
        map
    }
}

impl Keymap {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
            prefixes: HashSet::new(),
        }
    }

    pub fn bind_keys(&mut self, scope: MappingScope, keys: Vec<KeyEvent>, handler: Handler) {
        for len in 1..keys.len() {
            self.prefixes.insert((scope, keys[..len].to_vec()));
        }
        self.bindings.insert((scope, keys), handler);
    }

    /// Binds a sequence written in key notation, e.g. `g<C-h>`.
    pub fn bind(&mut self, scope: MappingScope, notation: &str, handler: Handler) -> Result<()> {
        let keys = parse_keys(notation)?;
        self.bind_keys(scope, keys, handler);
        Ok(())
    }

    pub fn lookup(&self, scope: MappingScope, keys: &[KeyEvent]) -> Lookup {
        let probe = (scope, keys.to_vec());
        if let Some(handler) = self.bindings.get(&probe) {
            return Lookup::Match(*handler);
        }
        if self.prefixes.contains(&probe) {
            return Lookup::Prefix;
        }
        Lookup::None
    }
}

//! Deciding, per keystroke, whether the engine or the host reacts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::key::{KeyCode, KeyEvent, Modifiers};
use crate::session::EditorSession;
use crate::traits::HostEditor;
use crate::types::Mode;

/// Saved preference for a key that both sides bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Owner {
    Engine,
    Host,
    /// Conflict seen, user has not chosen yet. The engine keeps the key meanwhile.
    Undecided,
}

/// Result of arbitration for one keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Engine,
    Host,
}

/// Keys the engine claims in every context.
const RESERVED: &[KeyEvent] = &[
    KeyEvent::plain(KeyCode::Esc),
    KeyEvent::ctrl('['),
    KeyEvent::ctrl('c'),
    KeyEvent::plain(KeyCode::Enter),
    KeyEvent::plain(KeyCode::Tab),
    KeyEvent::plain(KeyCode::Backspace),
    KeyEvent::plain(KeyCode::Delete),
    KeyEvent::plain(KeyCode::Up),
    KeyEvent::plain(KeyCode::Down),
    KeyEvent::plain(KeyCode::Left),
    KeyEvent::plain(KeyCode::Right),
    KeyEvent::plain(KeyCode::Home),
    KeyEvent::plain(KeyCode::End),
    KeyEvent::plain(KeyCode::PageUp),
    KeyEvent::plain(KeyCode::PageDown),
    KeyEvent::ctrl('h'),
    KeyEvent::ctrl('w'),
    KeyEvent::ctrl('u'),
];

/// Keys the engine still takes while a completion list or similar popup is open.
const POPUP_KEYS: &[KeyEvent] = &[
    KeyEvent::plain(KeyCode::Esc),
    KeyEvent::ctrl('['),
    KeyEvent::ctrl('c'),
    KeyEvent::plain(KeyCode::Backspace),
    KeyEvent::ctrl('p'),
    KeyEvent::ctrl('n'),
];

/// Left to embedded consoles and debugger inputs while inserting.
const INSERT_NAVIGATION: &[KeyEvent] = &[
    KeyEvent::plain(KeyCode::Up),
    KeyEvent::plain(KeyCode::Down),
    KeyEvent::plain(KeyCode::Left),
    KeyEvent::plain(KeyCode::Right),
    KeyEvent::plain(KeyCode::Home),
    KeyEvent::plain(KeyCode::End),
    KeyEvent::plain(KeyCode::PageUp),
    KeyEvent::plain(KeyCode::PageDown),
];

/// Who gets shortcuts both the engine and the host bind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictTable {
    owners: HashMap<KeyEvent, Owner>,
}

impl ConflictTable {
    pub fn new(owners: HashMap<KeyEvent, Owner>) -> Self {
        Self { owners }
    }

    pub fn get(&self, key: &KeyEvent) -> Option<Owner> {
        self.owners.get(key).copied()
    }

    pub fn set(&mut self, key: KeyEvent, owner: Owner) {
        self.owners.insert(key, owner);
    }

    /// Keys waiting for the user to pick a side.
    pub fn undecided(&self) -> impl Iterator<Item = &KeyEvent> {
        self.owners
            .iter()
            .filter(|(_, owner)| **owner == Owner::Undecided)
            .map(|(key, _)| key)
    }

    pub fn owners(&self) -> &HashMap<KeyEvent, Owner> {
        &self.owners
    }
}

#[derive(Debug, Clone)]
pub struct KeyOwnershipArbiter {
    enabled: bool,
    popup_keys: Vec<KeyEvent>,
    table: ConflictTable,
}

impl KeyOwnershipArbiter {
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.enabled,
            popup_keys: config.popup_keys.clone(),
            table: ConflictTable::new(config.key_owners.clone()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn conflicts(&self) -> &ConflictTable {
        &self.table
    }

    /// Records the user's answer for a conflicting key.
    pub fn resolve(&mut self, key: KeyEvent, owner: Owner) {
        self.table.set(key, owner);
    }

    /// Copies the learned table back for saving.
    pub fn save_into(&self, config: &mut Config) {
        config.key_owners = self.table.owners().clone();
    }

    pub fn decide<H: HostEditor + ?Sized>(
        &mut self,
        key: &KeyEvent,
        session: &mut EditorSession,
        host: &H,
    ) -> Ownership {
        if !self.enabled {
            return Ownership::Host;
        }

        if key.is_escape() {
            return if host.is_primary_surface() || !session.mode_stack().is_base_command_mode() {
                Ownership::Engine
            } else {
                tracing::debug!(%key, "escape in base mode of a secondary surface goes to host");
                Ownership::Host
            };
        }

        if host.is_popup_active() {
            let keep = POPUP_KEYS.contains(key) || self.popup_keys.contains(key);
            if !keep {
                tracing::trace!(%key, "popup active, leaving key to host");
            }
            return if keep { Ownership::Engine } else { Ownership::Host };
        }

        match session.mode() {
            Mode::Insert | Mode::Replace => {
                if key.code == KeyCode::Tab && !key.mods.intersects(Modifiers::CTRL | Modifiers::ALT) {
                    session.tab_requested = true;
                    return Ownership::Host;
                }
                if INSERT_NAVIGATION.contains(key) && !host.is_file_backed() {
                    tracing::debug!(%key, "navigation in a non-file editor goes to host");
                    return Ownership::Host;
                }
                if key.is_printable() {
                    return Ownership::Host;
                }
            }
            _ => {
                if key.is_printable() {
                    return Ownership::Engine;
                }
            }
        }

        if RESERVED.contains(key) {
            return Ownership::Engine;
        }

        let conflict = host.has_binding(key);
        match self.table.get(key) {
            Some(Owner::Engine) => Ownership::Engine,
            Some(Owner::Host) if conflict => Ownership::Host,
            Some(Owner::Host) => Ownership::Engine,
            Some(Owner::Undecided) => Ownership::Engine,
            None => {
                if conflict {
                    tracing::debug!(%key, "host also binds key, recording as undecided");
                    self.table.set(*key, Owner::Undecided);
                }
                Ownership::Engine
            }
        }
    }
}

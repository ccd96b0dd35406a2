use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::arbiter::Owner;
use crate::error::Result;
use crate::key::KeyEvent;

/// Vim's `'selection'` option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStyle {
    /// The character under the head is part of the selection.
    #[default]
    Inclusive,
    Exclusive,
}

impl SelectionStyle {
    /// How far the host's raw end sits past the semantic head.
    pub fn adjustment(self) -> usize {
        match self {
            SelectionStyle::Inclusive => 1,
            SelectionStyle::Exclusive => 0,
        }
    }
}

/// Process-wide engine settings.
///
/// Loaded once and read-only while events are handled. The key owner table
/// is the persisted form of what the arbiter learned about conflicting keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub enabled: bool,
    pub selection: SelectionStyle,
    /// Extra keys the engine keeps while a host popup is showing.
    pub popup_keys: Vec<KeyEvent>,
    pub key_owners: HashMap<KeyEvent, Owner>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            selection: SelectionStyle::default(),
            popup_keys: Vec::new(),
            key_owners: HashMap::new(),
        }
    }
}

impl Config {
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

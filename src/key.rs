use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Key codes representing individual keys on the keyboard.
///
/// This enum provides a platform-agnostic representation of keys.
/// Hosts should map their platform-specific key events to these codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character key, carrying the character the keystroke produces.
    /// `V` arrives as `Char('V')` without SHIFT; SHIFT is only meaningful
    /// for non-printing keys and control combinations.
    Char(char),
    /// The Escape key, used to exit modes and cancel operations.
    Esc,
    /// The Enter/Return key.
    Enter,
    Tab,
    /// The Backspace key.
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags::bitflags! {
    /// Keyboard modifier flags.
    ///
    /// These can be combined to represent multiple modifiers held simultaneously.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// A key press event with optional modifiers.
///
/// Written and read in Vim key notation: `a`, `<Esc>`, `<C-w>`, `<S-Tab>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyEvent {
    /// The key that was pressed.
    pub code: KeyCode,
    /// Modifier keys held during the key press.
    pub mods: Modifiers,
}

impl KeyEvent {
    pub const fn new(code: KeyCode, mods: Modifiers) -> Self {
        Self { code, mods }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), Modifiers::CTRL)
    }

    /// A key that would insert text if the host received it.
    pub fn is_printable(&self) -> bool {
        matches!(self.code, KeyCode::Char(_))
            && !self
                .mods
                .intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::META)
    }

    /// `<Esc>`, `<C-[>` and `<C-c>`.
    pub fn is_escape(&self) -> bool {
        *self == KeyEvent::plain(KeyCode::Esc)
            || *self == KeyEvent::ctrl('[')
            || *self == KeyEvent::ctrl('c')
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        KeyEvent::plain(code)
    }
}

fn named_code(name: &str) -> Option<KeyCode> {
    let code = match name.to_ascii_lowercase().as_str() {
        "esc" | "escape" => KeyCode::Esc,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "bs" | "backspace" => KeyCode::Backspace,
        "del" | "delete" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        _ => {
            let mut chars = name.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(c)
        }
    };
    Some(code)
}

fn code_name(code: KeyCode) -> Option<&'static str> {
    let name = match code {
        KeyCode::Char(' ') => "Space",
        KeyCode::Char('<') => "lt",
        KeyCode::Char(_) => return None,
        KeyCode::Esc => "Esc",
        KeyCode::Enter => "CR",
        KeyCode::Tab => "Tab",
        KeyCode::Backspace => "BS",
        KeyCode::Delete => "Del",
        KeyCode::Up => "Up",
        KeyCode::Down => "Down",
        KeyCode::Left => "Left",
        KeyCode::Right => "Right",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
    };
    Some(name)
}

fn parse_bracketed(inner: &str) -> Option<KeyEvent> {
    let mut mods = Modifiers::empty();
    let mut rest = inner;
    // "C-" style prefixes; the final segment may itself be "-".
    while rest.len() > 2 && rest.as_bytes()[1] == b'-' {
        let flag = match rest.as_bytes()[0].to_ascii_uppercase() {
            b'C' => Modifiers::CTRL,
            b'S' => Modifiers::SHIFT,
            b'A' => Modifiers::ALT,
            b'M' | b'D' => Modifiers::META,
            _ => return None,
        };
        mods |= flag;
        rest = &rest[2..];
    }
    let code = named_code(rest)?;
    Some(KeyEvent::new(code, mods))
}

impl FromStr for KeyEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = if s.len() > 2 && s.starts_with('<') && s.ends_with('>') {
            parse_bracketed(&s[1..s.len() - 1])
        } else {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyEvent::char(c)),
                _ => None,
            }
        };
        parsed.ok_or_else(|| Error::KeyNotation(s.to_string()))
    }
}

impl TryFrom<String> for KeyEvent {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyEvent> for String {
    fn from(key: KeyEvent) -> Self {
        key.to_string()
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = code_name(self.code);
        if self.mods.is_empty() {
            return match (name, self.code) {
                (Some(name), _) => write!(f, "<{name}>"),
                (None, KeyCode::Char(c)) => write!(f, "{c}"),
                (None, _) => Ok(()),
            };
        }
        f.write_str("<")?;
        for (flag, prefix) in [
            (Modifiers::CTRL, "C-"),
            (Modifiers::SHIFT, "S-"),
            (Modifiers::ALT, "A-"),
            (Modifiers::META, "M-"),
        ] {
            if self.mods.contains(flag) {
                f.write_str(prefix)?;
            }
        }
        match (name, self.code) {
            (Some(name), _) => f.write_str(name)?,
            (None, KeyCode::Char(c)) => write!(f, "{c}")?,
            (None, _) => {}
        }
        f.write_str(">")
    }
}

/// Splits a key sequence such as `g<C-h>` into its keystrokes.
///
/// A `<` that does not open a valid bracketed key is taken literally.
pub fn parse_keys(seq: &str) -> Result<Vec<KeyEvent>, Error> {
    let mut keys = Vec::new();
    let mut rest = seq;
    while let Some(c) = rest.chars().next() {
        if c == '<'
            && let Some(close) = rest[1..].find('>')
            && let Some(key) = parse_bracketed(&rest[1..close + 1])
        {
            keys.push(key);
            rest = &rest[close + 2..];
            continue;
        }
        keys.push(KeyEvent::char(c));
        rest = &rest[c.len_utf8()..];
    }
    if keys.is_empty() {
        return Err(Error::KeyNotation(seq.to_string()));
    }
    Ok(keys)
}

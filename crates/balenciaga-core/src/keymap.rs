//! Keyboard mapping.
//!
//! ## Learning: Lookup Tables over Match Trees
//!
//! Menu shortcuts are data, not code: a `Vec<KeyBinding>` plus a
//! `HashMap<KeyPress, usize>` index. User overrides from the config file
//! replace entries in the same table, and the front end only ever asks
//! "which command does this key press mean?".

use crate::command::Command;
use crate::config::Config;
use crate::pane::SplitMode;
use std::collections::HashMap;
use tracing::warn;

/// Held modifier keys. `meta` is Cmd on macOS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers::from_flags(false, false, false);
    pub const CMD: Modifiers = Modifiers::from_flags(true, false, false);
    pub const CMD_SHIFT: Modifiers = Modifiers::from_flags(true, true, false);
    pub const CMD_ALT: Modifiers = Modifiers::from_flags(true, false, true);

    const fn from_flags(meta: bool, shift: bool, alt: bool) -> Self {
        Modifiers {
            ctrl: false,
            alt,
            shift,
            meta,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Modifiers::NONE
    }

    /// Reads `"cmd+shift"` style text. Unrecognised names are ignored.
    pub fn parse(s: &str) -> Self {
        s.split('+')
            .map(|part| part.trim().to_ascii_lowercase())
            .fold(Modifiers::NONE, |mut mods, part| {
                match part.as_str() {
                    "ctrl" | "control" => mods.ctrl = true,
                    "alt" | "opt" | "option" => mods.alt = true,
                    "shift" => mods.shift = true,
                    "cmd" | "command" | "meta" => mods.meta = true,
                    _ => {}
                }
                mods
            })
    }
}

impl std::fmt::Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = [
            (self.ctrl, "Ctrl"),
            (self.alt, "Opt"),
            (self.shift, "Shift"),
            (self.meta, "Cmd"),
        ];
        let held: Vec<&str> = names
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&held.join("+"))
    }
}

/// The non-modifier part of a chord.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable key, stored lowercase
    Char(char),
    Enter,
    Tab,
    Escape,
    /// Function key, `F(1)` through `F(12)`
    F(u8),
}

impl Key {
    /// Single characters map to [`Key::Char`]; longer text must name a key.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        let mut chars = lower.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => return Some(Key::Char(c)),
            (None, _) => return None,
            _ => {}
        }
        match lower.as_str() {
            "enter" | "return" => Some(Key::Enter),
            "tab" => Some(Key::Tab),
            "escape" | "esc" => Some(Key::Escape),
            "space" => Some(Key::Char(' ')),
            _ if lower.starts_with('f') => lower[1..].parse().ok().map(Key::F),
            _ => None,
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Key::Char(' ') => "Space",
            Key::Char(c) => return write!(f, "{}", c.to_uppercase()),
            Key::Enter => "Enter",
            Key::Tab => "Tab",
            Key::Escape => "Escape",
            Key::F(n) => return write!(f, "F{n}"),
        };
        f.write_str(name)
    }
}

/// A chord such as Cmd+Shift+S.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Character keys are stored lowercase so Shift is only a modifier.
    pub fn char(c: char, modifiers: Modifiers) -> Self {
        Self::new(Key::Char(c.to_ascii_lowercase()), modifiers)
    }

    /// Reads `"cmd+shift+s"`: everything before the last `+` is modifiers.
    pub fn parse(s: &str) -> Option<Self> {
        let (mod_str, key_str) = s.rsplit_once('+').unwrap_or(("", s));
        let key = Key::parse(key_str)?;
        Some(Self {
            key,
            modifiers: Modifiers::parse(mod_str),
        })
    }
}

impl std::fmt::Display for KeyPress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifiers.is_empty() {
            return write!(f, "{}", self.key);
        }
        write!(f, "{}+{}", self.modifiers, self.key)
    }
}

/// One row of the shortcut table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: KeyPress,
    pub command: Command,
}

impl KeyBinding {
    pub fn new(key: KeyPress, command: Command) -> Self {
        Self { key, command }
    }
}

/// Shortcut table with an index for lookup by chord.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<KeyBinding>,
    /// Position of each chord in `bindings`
    by_key: HashMap<KeyPress, usize>,
}

impl Keymap {
    /// Creates a keymap with the default menu shortcuts.
    pub fn new() -> Self {
        let mut keymap = Self {
            bindings: Vec::new(),
            by_key: HashMap::new(),
        };
        keymap.add_default_bindings();
        keymap
    }

    /// Creates a keymap from configuration.
    ///
    /// User bindings replace defaults on the same key. Entries that fail to
    /// parse are logged and skipped.
    pub fn from_config(config: &Config) -> Self {
        let mut keymap = Self::new();

        for (key_str, cmd_str) in &config.keyboard.bindings {
            match (KeyPress::parse(key_str), Command::parse(cmd_str)) {
                (Some(key), Some(cmd)) => keymap.bind(key, cmd),
                _ => warn!(key = %key_str, command = %cmd_str, "ignoring invalid key binding"),
            }
        }

        keymap
    }

    fn add_default_bindings(&mut self) {
        use crate::command::Command::*;

        let cmd = Modifiers::CMD;
        let cmd_shift = Modifiers::CMD_SHIFT;
        let cmd_alt = Modifiers::CMD_ALT;

        let bindings = [
            // File
            ('n', cmd, NewDocument),
            ('o', cmd, OpenFile { path: None }),
            ('s', cmd, Save),
            ('s', cmd_shift, SaveAll),
            ('s', cmd_alt, SaveAs { path: None }),
            ('w', cmd, CloseDocument),
            // Navigation
            ('f', cmd, Find),
            ('l', cmd, ShowGoToLine),
            ('p', cmd, QuickOpen),
            // Format
            ('b', cmd, Bold),
            ('i', cmd, Italic),
            ('k', cmd_shift, InlineCode),
            ('h', cmd_shift, Heading),
            ('8', cmd_shift, BulletList),
            ('\'', cmd_shift, Quote),
            ('d', cmd_shift, InsertDate),
            // View
            ('f', cmd_alt, ToggleFocusMode),
            ('p', cmd_alt, TogglePreview),
            ('t', cmd_alt, ToggleTypewriter),
            ('l', cmd_alt, ToggleLineNumbers),
            ('0', cmd_alt, ToggleSidebar),
            ('i', cmd_alt, ToggleInspector),
            ('\\', cmd, SetSplitMode(SplitMode::Vertical)),
            ('\\', cmd_shift, SetSplitMode(SplitMode::Horizontal)),
        ];

        for (c, modifiers, command) in bindings {
            self.bind(KeyPress::char(c, modifiers), command);
        }
    }

    /// Binds `key` to `command`, replacing any existing binding for `key`.
    pub fn bind(&mut self, key: KeyPress, command: Command) {
        match self.by_key.get(&key) {
            Some(&index) => self.bindings[index].command = command,
            None => {
                self.by_key.insert(key.clone(), self.bindings.len());
                self.bindings.push(KeyBinding::new(key, command));
            }
        }
    }

    /// Returns the command bound to `key`.
    pub fn lookup(&self, key: &KeyPress) -> Option<&Command> {
        self.by_key.get(key).map(|&index| &self.bindings[index].command)
    }

    /// Returns the first key bound to `command`, for menu labels.
    pub fn key_for(&self, command: &Command) -> Option<&KeyPress> {
        self.bindings
            .iter()
            .find(|b| &b.command == command)
            .map(|b| &b.key)
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

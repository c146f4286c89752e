// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Keyboard chords for the undo and redo shortcuts.
//!
//! Chords are written as `+`-separated tokens such as `Ctrl+Shift+Z`.
//! `Ctrl` and `Cmd` both map to the platform command modifier, so the same
//! configuration works on macOS and elsewhere.

use std::fmt;
use std::str::FromStr;

use egui::{Key, KeyboardShortcut, Modifiers};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChordError {
    #[error("empty shortcut")]
    Empty,

    #[error("unknown modifier {0:?}")]
    UnknownModifier(String),

    #[error("unknown key {0:?}")]
    UnknownKey(String),
}

/// A parsed keyboard chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chord {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl Chord {
    pub fn shortcut(self) -> KeyboardShortcut {
        KeyboardShortcut::new(self.modifiers, self.key)
    }

    /// Shift and Alt held by this chord, the modifiers egui matches loosely.
    fn extra_modifiers(&self) -> u8 {
        u8::from(self.modifiers.shift) + u8::from(self.modifiers.alt)
    }

    /// Parse `text`, falling back to `default` with a warning when invalid.
    pub fn parse_or(text: &str, default: Chord) -> Chord {
        match text.parse() {
            Ok(chord) => chord,
            Err(err) => {
                log::warn!("Ignoring shortcut {:?} ({}); using {}", text, err, default);
                default
            }
        }
    }
}

impl FromStr for Chord {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split('+').map(str::trim).collect();
        let Some((key_token, modifier_tokens)) = tokens.split_last() else {
            return Err(ChordError::Empty);
        };
        if key_token.is_empty() {
            return Err(ChordError::Empty);
        }

        let mut modifiers = Modifiers::NONE;
        for token in modifier_tokens {
            match token.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "cmd" | "command" => modifiers.command = true,
                "shift" => modifiers.shift = true,
                "alt" | "option" => modifiers.alt = true,
                _ => return Err(ChordError::UnknownModifier(token.to_string())),
            }
        }

        let key_name = if key_token.len() == 1 {
            key_token.to_ascii_uppercase()
        } else {
            key_token.to_string()
        };
        let key = Key::from_name(&key_name)
            .ok_or_else(|| ChordError::UnknownKey(key_token.to_string()))?;

        Ok(Self { modifiers, key })
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.command {
            write!(f, "Ctrl+")?;
        }
        if self.modifiers.alt {
            write!(f, "Alt+")?;
        }
        if self.modifiers.shift {
            write!(f, "Shift+")?;
        }
        write!(f, "{}", self.key.name())
    }
}

/// Undo/redo shortcuts resolved from configuration.
#[derive(Debug, Clone, Copy)]
pub struct HistoryKeys {
    pub undo: Chord,
    pub redo: Chord,
}

/// What the history chords asked for this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryCommand {
    Undo,
    Redo,
}

impl HistoryKeys {
    pub fn new(undo: &str, redo: &str) -> Self {
        let defaults = Self::default();
        Self {
            undo: Chord::parse_or(undo, defaults.undo),
            redo: Chord::parse_or(redo, defaults.redo),
        }
    }

    /// Consume a pressed history chord, if any.
    ///
    /// egui lets a chord without Shift or Alt match the same key pressed
    /// with them, so the chord holding more of those is tried first. Chords
    /// typed into a focused text field are left for the field.
    pub fn consume(&self, ctx: &egui::Context) -> Option<HistoryCommand> {
        if ctx.wants_keyboard_input() {
            return None;
        }
        let mut order = [
            (self.redo, HistoryCommand::Redo),
            (self.undo, HistoryCommand::Undo),
        ];
        order.sort_by_key(|(chord, _)| std::cmp::Reverse(chord.extra_modifiers()));
        ctx.input_mut(|input| {
            order
                .iter()
                .find(|(chord, _)| input.consume_shortcut(&chord.shortcut()))
                .map(|(_, command)| *command)
        })
    }
}

impl Default for HistoryKeys {
    fn default() -> Self {
        let mut redo_modifiers = Modifiers::NONE;
        redo_modifiers.command = true;
        redo_modifiers.shift = true;
        let mut undo_modifiers = Modifiers::NONE;
        undo_modifiers.command = true;
        Self {
            undo: Chord {
                modifiers: undo_modifiers,
                key: Key::Z,
            },
            redo: Chord {
                modifiers: redo_modifiers,
                key: Key::Z,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn press(keys: &HistoryKeys, key: Key, modifiers: Modifiers) -> Option<HistoryCommand> {
        press_with(keys, key, modifiers, false)
    }

    fn press_with(
        keys: &HistoryKeys,
        key: Key,
        modifiers: Modifiers,
        text_focused: bool,
    ) -> Option<HistoryCommand> {
        let ctx = egui::Context::default();
        ctx.begin_frame(egui::RawInput {
            modifiers,
            events: vec![egui::Event::Key {
                key,
                physical_key: None,
                pressed: true,
                repeat: false,
                modifiers,
            }],
            ..Default::default()
        });
        if text_focused {
            ctx.memory_mut(|memory| memory.request_focus(egui::Id::new("prompt")));
        }
        let command = keys.consume(&ctx);
        let _ = ctx.end_frame();
        command
    }

    #[test]
    fn default_chords_dispatch() {
        let keys = HistoryKeys::default();
        let ctrl = Modifiers::CTRL | Modifiers::COMMAND;
        assert_eq!(press(&keys, Key::Z, ctrl), Some(HistoryCommand::Undo));
        assert_eq!(
            press(&keys, Key::Z, ctrl | Modifiers::SHIFT),
            Some(HistoryCommand::Redo)
        );
        assert_eq!(press(&keys, Key::Y, ctrl), None);
    }

    #[test]
    fn shifted_undo_wins_over_plain_redo() {
        let keys = HistoryKeys::new("Ctrl+Shift+Z", "Ctrl+Z");
        let ctrl = Modifiers::CTRL | Modifiers::COMMAND;
        assert_eq!(
            press(&keys, Key::Z, ctrl | Modifiers::SHIFT),
            Some(HistoryCommand::Undo)
        );
        assert_eq!(press(&keys, Key::Z, ctrl), Some(HistoryCommand::Redo));
    }

    #[test]
    fn focused_text_field_keeps_its_chords() {
        let keys = HistoryKeys::default();
        let ctrl = Modifiers::CTRL | Modifiers::COMMAND;
        assert_eq!(press_with(&keys, Key::Z, ctrl, true), None);
        assert_eq!(press_with(&keys, Key::Z, ctrl, false), Some(HistoryCommand::Undo));
    }

    #[test]
    fn parses_default_chords() {
        let keys = HistoryKeys::new("Ctrl+Z", "ctrl + shift + z");
        let defaults = HistoryKeys::default();
        assert_eq!(keys.undo, defaults.undo);
        assert_eq!(keys.redo, defaults.redo);
        assert_eq!(keys.redo.to_string(), "Ctrl+Shift+Z");
    }

    #[test]
    fn cmd_is_an_alias_for_ctrl() {
        let cmd: Chord = "Cmd+Y".parse().unwrap();
        let ctrl: Chord = "Ctrl+Y".parse().unwrap();
        assert_eq!(cmd, ctrl);
        assert_eq!(cmd.key, Key::Y);
    }

    #[test]
    fn rejects_bad_chords() {
        assert_matches!("".parse::<Chord>(), Err(ChordError::Empty));
        assert_matches!("Ctrl+".parse::<Chord>(), Err(ChordError::Empty));
        assert_matches!("Hyper+Z".parse::<Chord>(), Err(ChordError::UnknownModifier(m)) if m == "Hyper");
        assert_matches!("Ctrl+Banana".parse::<Chord>(), Err(ChordError::UnknownKey(k)) if k == "Banana");
    }

    #[test]
    fn invalid_config_falls_back() {
        let keys = HistoryKeys::new("nonsense+", "Ctrl+Y");
        assert_eq!(keys.undo, HistoryKeys::default().undo);
        assert_eq!(keys.redo.key, Key::Y);
    }
}

//! Remote-control keys
//!
//! Front ends forward remote-control presses by name. Each press maps to a
//! single projector command.

use crate::keys;

/// Remote-control buttons the projector accepts over RS-232
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RemoteKey {
    /// Toggle the on-screen menu
    Menu,
    /// Close the on-screen menu
    Back,
    /// Confirm the highlighted item
    Select,
    Up,
    Down,
    Left,
    Right,
}

impl RemoteKey {
    /// Parse a key from its front-end name (case-insensitive)
    ///
    /// `INFO` is accepted as the menu button, matching smart-home remotes.
    pub fn from_name(name: &str) -> Option<Self> {
        const NAMES: [(&str, RemoteKey); 8] = [
            ("INFO", RemoteKey::Menu),
            ("MENU", RemoteKey::Menu),
            ("BACK", RemoteKey::Back),
            ("SELECT", RemoteKey::Select),
            ("UP", RemoteKey::Up),
            ("DOWN", RemoteKey::Down),
            ("LEFT", RemoteKey::Left),
            ("RIGHT", RemoteKey::Right),
        ];

        NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, key)| key)
    }

    /// The command this key sends, as `(key, value)`
    ///
    /// A `None` value means a bare command with no `=`.
    pub const fn command(&self) -> (&'static str, Option<&'static str>) {
        match self {
            RemoteKey::Menu => (keys::MENU, None),
            RemoteKey::Back => (keys::MENU, Some(keys::OFF)),
            RemoteKey::Select => ("enter", None),
            RemoteKey::Up => ("up", None),
            RemoteKey::Down => ("down", None),
            RemoteKey::Left => ("left", None),
            RemoteKey::Right => ("right", None),
        }
    }
}

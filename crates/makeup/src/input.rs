//! Keyboard and window event predicates.
//!
//! The host toolkit's event, key and modifier values are mapped onto the
//! small types here; the predicates then decide whether the user quit or
//! opened/closed the command line. Mode flags live on [`Session`].

use std::collections::HashSet;

use bitflags::bitflags;

/// The part of a toolkit event the predicates care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// The window close button was clicked.
    Quit,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Q,
    Semicolon,
    Escape,
    /// Any other key, by toolkit key code.
    Other(u32),
}

/// Keys currently held down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressedKeys {
    keys: HashSet<Key>,
}

impl PressedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.keys.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.keys.remove(&key);
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }
}

impl FromIterator<Key> for PressedKeys {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

bitflags! {
    /// Modifier keys held down.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u16 {
        const SHIFT = 0x0001;
        const CTRL  = 0x0002;
        const ALT   = 0x0004;
        const META  = 0x0008;
    }
}

/// Per-application mode flags.
///
/// In dev mode a bare `q` quits, unless the command line is open (command
/// mode), where `q` is just text being typed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    dev_mode: bool,
    cmd_mode: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    pub fn set_dev_mode(&mut self, on: bool) {
        log::debug!("dev mode {}", if on { "enabled" } else { "disabled" });
        self.dev_mode = on;
    }

    pub fn cmd_mode(&self) -> bool {
        self.cmd_mode
    }

    pub fn set_cmd_mode(&mut self, on: bool) {
        self.cmd_mode = on;
    }

    /// True if the user closed the window, pressed Ctrl+Q, or pressed Q in
    /// dev mode outside the command line.
    pub fn user_quit(&self, event: InputEvent, keys: &PressedKeys, mods: Modifiers) -> bool {
        let pressed_q = keys.is_pressed(Key::Q);
        event == InputEvent::Quit
            || (mods.contains(Modifiers::CTRL) && pressed_q)
            || (self.dev_mode && pressed_q && !self.cmd_mode)
    }
}

/// Colon is Shift+Semicolon.
pub fn user_opens_cmdline(keys: &PressedKeys, mods: Modifiers) -> bool {
    mods.contains(Modifiers::SHIFT) && keys.is_pressed(Key::Semicolon)
}

pub fn user_closes_cmdline(keys: &PressedKeys) -> bool {
    keys.is_pressed(Key::Escape)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pressed: &[Key]) -> PressedKeys {
        pressed.iter().copied().collect()
    }

    #[test]
    fn dev_mode_defaults_off_and_toggles() {
        let mut session = Session::new();
        assert!(!session.dev_mode());
        session.set_dev_mode(true);
        assert!(session.dev_mode());
        session.set_dev_mode(false);
        assert!(!session.dev_mode());
    }

    #[test]
    fn window_close_quits() {
        let session = Session::new();
        assert!(session.user_quit(InputEvent::Quit, &keys(&[]), Modifiers::empty()));
    }

    #[test]
    fn q_alone_does_not_quit_outside_dev_mode() {
        let session = Session::new();
        assert!(!session.user_quit(InputEvent::Other, &keys(&[Key::Q]), Modifiers::empty()));
    }

    #[test]
    fn q_quits_in_dev_mode() {
        let mut session = Session::new();
        session.set_dev_mode(true);
        assert!(session.user_quit(InputEvent::Other, &keys(&[Key::Q]), Modifiers::empty()));
    }

    #[test]
    fn q_does_not_quit_while_typing_a_command() {
        let mut session = Session::new();
        session.set_dev_mode(true);
        session.set_cmd_mode(true);
        assert!(!session.user_quit(InputEvent::Other, &keys(&[Key::Q]), Modifiers::empty()));
    }

    #[test]
    fn ctrl_q_always_quits() {
        let mut session = Session::new();
        session.set_cmd_mode(true);
        assert!(session.user_quit(InputEvent::Other, &keys(&[Key::Q]), Modifiers::CTRL));
    }

    #[test]
    fn no_quit_without_input() {
        let session = Session::new();
        assert!(!session.user_quit(InputEvent::Other, &keys(&[Key::Other(42)]), Modifiers::CTRL));
    }

    #[test]
    fn colon_opens_cmdline() {
        assert!(user_opens_cmdline(&keys(&[Key::Semicolon]), Modifiers::SHIFT));
        assert!(!user_opens_cmdline(&keys(&[Key::Semicolon]), Modifiers::empty()));
        assert!(!user_opens_cmdline(&keys(&[]), Modifiers::SHIFT));
    }

    #[test]
    fn escape_closes_cmdline() {
        let mut pressed = PressedKeys::new();
        assert!(!user_closes_cmdline(&pressed));
        pressed.press(Key::Escape);
        assert!(user_closes_cmdline(&pressed));
        pressed.release(Key::Escape);
        assert!(!user_closes_cmdline(&pressed));
    }
}

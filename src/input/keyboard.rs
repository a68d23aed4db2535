// Keyboard input mapping module
//
// Maps physical keys onto logical console buttons. Several keys may share a
// button; the button stays held while any of its keys is down.

use super::event::Modifiers;
use super::Button;
use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// Key bindings for every logical button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    /// Keys for each button, indexed by bit position
    keys: [Vec<KeyCode>; 8],
}

impl KeyBindings {
    /// Default layout
    ///
    /// # Default Mappings
    /// - Arrow keys: directions
    /// - Z: Action1
    /// - X: Action2
    /// - P or Enter: Confirm
    /// - Escape: Menu
    pub fn default_mapping() -> Self {
        let mut bindings = Self::empty();
        bindings.bind(Button::Left, KeyCode::ArrowLeft);
        bindings.bind(Button::Right, KeyCode::ArrowRight);
        bindings.bind(Button::Up, KeyCode::ArrowUp);
        bindings.bind(Button::Down, KeyCode::ArrowDown);
        bindings.bind(Button::Action1, KeyCode::KeyZ);
        bindings.bind(Button::Action2, KeyCode::KeyX);
        bindings.bind(Button::Confirm, KeyCode::KeyP);
        bindings.bind(Button::Confirm, KeyCode::Enter);
        bindings.bind(Button::Menu, KeyCode::Escape);
        bindings
    }

    /// Bindings with no keys assigned
    pub fn empty() -> Self {
        Self {
            keys: Default::default(),
        }
    }

    /// Add a key to a button
    pub fn bind(&mut self, button: Button, key: KeyCode) {
        let keys = &mut self.keys[button.bit() as usize];
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    /// Replace all keys of a button
    pub fn set_keys(&mut self, button: Button, keys: Vec<KeyCode>) {
        self.keys[button.bit() as usize] = keys;
    }

    /// Keys bound to a button
    pub fn keys(&self, button: Button) -> &[KeyCode] {
        &self.keys[button.bit() as usize]
    }

    /// Button bound to a key, if any
    pub fn get_button(&self, key: KeyCode) -> Option<Button> {
        Button::ALL
            .iter()
            .copied()
            .find(|button| self.keys(*button).contains(&key))
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::default_mapping()
    }
}

/// Per-physical-key keyboard tracking
///
/// Keeps the set of held keys rather than the last event per button, so
/// releasing one of two keys bound to the same button keeps it held.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    bindings: KeyBindings,
    pressed_keys: HashSet<KeyCode>,
}

impl KeyboardState {
    /// Create keyboard state with the given bindings
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            pressed_keys: HashSet::new(),
        }
    }

    /// Record a key press
    pub fn handle_key_press(&mut self, key: KeyCode) {
        self.pressed_keys.insert(key);
    }

    /// Record a key release
    pub fn handle_key_release(&mut self, key: KeyCode) {
        self.pressed_keys.remove(&key);
    }

    /// Whether a key is currently held
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    /// Forget all held keys, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.pressed_keys.clear();
    }

    /// Button byte built from every held key
    pub fn button_mask(&self) -> u8 {
        self.pressed_keys
            .iter()
            .filter_map(|&key| self.bindings.get_button(key))
            .fold(0u8, |mask, button| mask | button.mask())
    }

    /// Current bindings
    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Replace the bindings; held keys are re-evaluated on the next query
    pub fn set_bindings(&mut self, bindings: KeyBindings) {
        self.bindings = bindings;
    }
}

/// Host-level action triggered by a hotkey
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    ToggleFullscreen,
    Quit,
    ToggleTrace,
    Reload,
    Screenshot,
}

/// A key plus an optional Ctrl requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkey {
    pub key: KeyCode,
    pub ctrl: bool,
}

impl Hotkey {
    /// Plain key
    pub const fn key(key: KeyCode) -> Self {
        Self { key, ctrl: false }
    }

    /// Ctrl + key
    pub const fn ctrl(key: KeyCode) -> Self {
        Self { key, ctrl: true }
    }

    /// Whether a key press triggers this hotkey
    pub fn matches(&self, key: KeyCode, modifiers: Modifiers) -> bool {
        self.key == key && (!self.ctrl || modifiers.ctrl)
    }
}

/// Hotkey table checked before key presses reach the button state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotkeys {
    pub fullscreen: Hotkey,
    pub quit: Hotkey,
    pub trace: Hotkey,
    pub reload: Hotkey,
    pub screenshot: Hotkey,
}

impl Hotkeys {
    /// F11 fullscreen, Ctrl+Q quit, Ctrl+T trace, Ctrl+R reload, F6 screenshot
    pub fn default_mapping() -> Self {
        Self {
            fullscreen: Hotkey::key(KeyCode::F11),
            quit: Hotkey::ctrl(KeyCode::KeyQ),
            trace: Hotkey::ctrl(KeyCode::KeyT),
            reload: Hotkey::ctrl(KeyCode::KeyR),
            screenshot: Hotkey::key(KeyCode::F6),
        }
    }

    /// Action for a key press, if it is a hotkey
    ///
    /// Ctrl-qualified hotkeys are checked first so that Ctrl+key never
    /// falls through to a plain binding of the same key.
    pub fn action_for(&self, key: KeyCode, modifiers: Modifiers) -> Option<HotkeyAction> {
        let table = [
            (self.quit, HotkeyAction::Quit),
            (self.trace, HotkeyAction::ToggleTrace),
            (self.reload, HotkeyAction::Reload),
            (self.fullscreen, HotkeyAction::ToggleFullscreen),
            (self.screenshot, HotkeyAction::Screenshot),
        ];

        table
            .iter()
            .filter(|(hotkey, _)| hotkey.ctrl)
            .chain(table.iter().filter(|(hotkey, _)| !hotkey.ctrl))
            .find(|(hotkey, _)| hotkey.matches(key, modifiers))
            .map(|&(_, action)| action)
    }
}

impl Default for Hotkeys {
    fn default() -> Self {
        Self::default_mapping()
    }
}

// Input configuration module
//
// Serializable forms of the keyboard bindings, joystick mapping and
// hotkeys. Key names use winit's `KeyCode` variant names ("KeyZ",
// "ArrowLeft", "F11"); hotkeys may carry a "Ctrl+" prefix.

use super::joystick::{JoystickMapping, AXIS_DEADZONE};
use super::keyboard::{Hotkey, Hotkeys, KeyBindings};
use super::Button;
use crate::error::{HalError, Result};
use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

/// Key names bound to each logical button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindingsConfig {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub action1: Vec<String>,
    pub action2: Vec<String>,
    pub confirm: Vec<String>,
    pub menu: Vec<String>,
}

impl KeyBindingsConfig {
    /// Default key names, matching `KeyBindings::default_mapping`
    pub fn default_mapping() -> Self {
        Self::from_key_bindings(&KeyBindings::default_mapping())
    }

    fn names(&self, button: Button) -> &[String] {
        match button {
            Button::Left => &self.left,
            Button::Right => &self.right,
            Button::Up => &self.up,
            Button::Down => &self.down,
            Button::Action1 => &self.action1,
            Button::Action2 => &self.action2,
            Button::Confirm => &self.confirm,
            Button::Menu => &self.menu,
        }
    }

    fn names_mut(&mut self, button: Button) -> &mut Vec<String> {
        match button {
            Button::Left => &mut self.left,
            Button::Right => &mut self.right,
            Button::Up => &mut self.up,
            Button::Down => &mut self.down,
            Button::Action1 => &mut self.action1,
            Button::Action2 => &mut self.action2,
            Button::Confirm => &mut self.confirm,
            Button::Menu => &mut self.menu,
        }
    }

    /// Convert to runtime KeyBindings
    ///
    /// # Returns
    /// The bindings, or `HalError::Config` naming the first unknown key
    pub fn to_key_bindings(&self) -> Result<KeyBindings> {
        let mut bindings = KeyBindings::empty();
        for button in Button::ALL {
            let keys = self
                .names(button)
                .iter()
                .map(|name| string_to_keycode(name))
                .collect::<Result<Vec<_>>>()?;
            bindings.set_keys(button, keys);
        }
        Ok(bindings)
    }

    /// Create from runtime KeyBindings
    pub fn from_key_bindings(bindings: &KeyBindings) -> Self {
        let mut config = Self {
            left: Vec::new(),
            right: Vec::new(),
            up: Vec::new(),
            down: Vec::new(),
            action1: Vec::new(),
            action2: Vec::new(),
            confirm: Vec::new(),
            menu: Vec::new(),
        };
        for button in Button::ALL {
            *config.names_mut(button) = bindings
                .keys(button)
                .iter()
                .map(|&key| keycode_to_string(key))
                .collect();
        }
        config
    }
}

impl Default for KeyBindingsConfig {
    fn default() -> Self {
        Self::default_mapping()
    }
}

/// `[input]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Axis magnitude that counts as a press
    pub axis_deadzone: i16,
    /// Joystick button index for Action1
    pub action1_button: u8,
    /// Joystick button index for Action2
    pub action2_button: u8,
    /// Joystick button index for Confirm
    pub confirm_button: u8,
    /// Keyboard bindings
    pub keys: KeyBindingsConfig,
}

impl InputConfig {
    /// Create a new input configuration with default mappings
    pub fn new() -> Self {
        let joystick = JoystickMapping::default_mapping();
        Self {
            axis_deadzone: AXIS_DEADZONE,
            action1_button: joystick.action1_button,
            action2_button: joystick.action2_button,
            confirm_button: joystick.confirm_button,
            keys: KeyBindingsConfig::default_mapping(),
        }
    }

    /// Convert the joystick settings to a runtime mapping
    pub fn to_joystick_mapping(&self) -> Result<JoystickMapping> {
        if self.axis_deadzone < 0 {
            return Err(HalError::Config(format!(
                "axis_deadzone must not be negative (got {})",
                self.axis_deadzone
            )));
        }
        Ok(JoystickMapping {
            deadzone: self.axis_deadzone,
            action1_button: self.action1_button,
            action2_button: self.action2_button,
            confirm_button: self.confirm_button,
        })
    }

    /// Convert the keyboard settings to runtime bindings
    pub fn to_key_bindings(&self) -> Result<KeyBindings> {
        self.keys.to_key_bindings()
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// `[hotkeys]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    pub fullscreen: String,
    pub quit: String,
    pub trace: String,
    pub reload: String,
    pub screenshot: String,
}

impl HotkeyConfig {
    /// Default hotkey names, matching `Hotkeys::default_mapping`
    pub fn default_mapping() -> Self {
        Self::from_hotkeys(&Hotkeys::default_mapping())
    }

    /// Convert to runtime Hotkeys
    pub fn to_hotkeys(&self) -> Result<Hotkeys> {
        Ok(Hotkeys {
            fullscreen: parse_hotkey(&self.fullscreen)?,
            quit: parse_hotkey(&self.quit)?,
            trace: parse_hotkey(&self.trace)?,
            reload: parse_hotkey(&self.reload)?,
            screenshot: parse_hotkey(&self.screenshot)?,
        })
    }

    /// Create from runtime Hotkeys
    pub fn from_hotkeys(hotkeys: &Hotkeys) -> Self {
        Self {
            fullscreen: hotkey_to_string(hotkeys.fullscreen),
            quit: hotkey_to_string(hotkeys.quit),
            trace: hotkey_to_string(hotkeys.trace),
            reload: hotkey_to_string(hotkeys.reload),
            screenshot: hotkey_to_string(hotkeys.screenshot),
        }
    }
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self::default_mapping()
    }
}

/// Parse "Key" or "Ctrl+Key"
pub fn parse_hotkey(s: &str) -> Result<Hotkey> {
    match s.trim().strip_prefix("Ctrl+") {
        Some(key) => Ok(Hotkey::ctrl(string_to_keycode(key.trim())?)),
        None => Ok(Hotkey::key(string_to_keycode(s.trim())?)),
    }
}

fn hotkey_to_string(hotkey: Hotkey) -> String {
    if hotkey.ctrl {
        format!("Ctrl+{}", keycode_to_string(hotkey.key))
    } else {
        keycode_to_string(hotkey.key)
    }
}

/// Convert KeyCode to string representation
pub fn keycode_to_string(key: KeyCode) -> String {
    format!("{:?}", key)
}

/// Convert string to KeyCode
pub fn string_to_keycode(s: &str) -> Result<KeyCode> {
    let key = match s {
        "KeyA" => KeyCode::KeyA,
        "KeyB" => KeyCode::KeyB,
        "KeyC" => KeyCode::KeyC,
        "KeyD" => KeyCode::KeyD,
        "KeyE" => KeyCode::KeyE,
        "KeyF" => KeyCode::KeyF,
        "KeyG" => KeyCode::KeyG,
        "KeyH" => KeyCode::KeyH,
        "KeyI" => KeyCode::KeyI,
        "KeyJ" => KeyCode::KeyJ,
        "KeyK" => KeyCode::KeyK,
        "KeyL" => KeyCode::KeyL,
        "KeyM" => KeyCode::KeyM,
        "KeyN" => KeyCode::KeyN,
        "KeyO" => KeyCode::KeyO,
        "KeyP" => KeyCode::KeyP,
        "KeyQ" => KeyCode::KeyQ,
        "KeyR" => KeyCode::KeyR,
        "KeyS" => KeyCode::KeyS,
        "KeyT" => KeyCode::KeyT,
        "KeyU" => KeyCode::KeyU,
        "KeyV" => KeyCode::KeyV,
        "KeyW" => KeyCode::KeyW,
        "KeyX" => KeyCode::KeyX,
        "KeyY" => KeyCode::KeyY,
        "KeyZ" => KeyCode::KeyZ,
        "Digit0" => KeyCode::Digit0,
        "Digit1" => KeyCode::Digit1,
        "Digit2" => KeyCode::Digit2,
        "Digit3" => KeyCode::Digit3,
        "Digit4" => KeyCode::Digit4,
        "Digit5" => KeyCode::Digit5,
        "Digit6" => KeyCode::Digit6,
        "Digit7" => KeyCode::Digit7,
        "Digit8" => KeyCode::Digit8,
        "Digit9" => KeyCode::Digit9,
        "ArrowUp" => KeyCode::ArrowUp,
        "ArrowDown" => KeyCode::ArrowDown,
        "ArrowLeft" => KeyCode::ArrowLeft,
        "ArrowRight" => KeyCode::ArrowRight,
        "Enter" => KeyCode::Enter,
        "Space" => KeyCode::Space,
        "Escape" => KeyCode::Escape,
        "Backspace" => KeyCode::Backspace,
        "Tab" => KeyCode::Tab,
        "ShiftLeft" => KeyCode::ShiftLeft,
        "ShiftRight" => KeyCode::ShiftRight,
        "ControlLeft" => KeyCode::ControlLeft,
        "ControlRight" => KeyCode::ControlRight,
        "AltLeft" => KeyCode::AltLeft,
        "AltRight" => KeyCode::AltRight,
        "F1" => KeyCode::F1,
        "F2" => KeyCode::F2,
        "F3" => KeyCode::F3,
        "F4" => KeyCode::F4,
        "F5" => KeyCode::F5,
        "F6" => KeyCode::F6,
        "F7" => KeyCode::F7,
        "F8" => KeyCode::F8,
        "F9" => KeyCode::F9,
        "F10" => KeyCode::F10,
        "F11" => KeyCode::F11,
        "F12" => KeyCode::F12,
        _ => return Err(HalError::Config(format!("Unknown key code: {}", s))),
    };
    Ok(key)
}

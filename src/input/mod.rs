// Input module - Unified input state for the console
//
// Keyboard, joystick, touch and mouse events are merged into one polled
// byte plus pointer and touch snapshots. Each logical button owns a fixed
// bit position so recorded input logs stay replayable.

pub mod aggregator;
pub mod config;
pub mod event;
pub mod joystick;
pub mod keyboard;
pub mod mouse;
pub mod replay;
pub mod touch;

pub use aggregator::{InputAggregator, Viewport};
pub use config::{HotkeyConfig, InputConfig, KeyBindingsConfig};
pub use event::{HatDirection, Modifiers, MouseButton, RawEvent};
pub use joystick::{JoystickMapping, JoystickState, AXIS_DEADZONE};
pub use keyboard::{Hotkey, HotkeyAction, Hotkeys, KeyBindings, KeyboardState};
pub use mouse::MouseState;
pub use replay::{InputLog, InputPlayback, InputRecorder};
pub use touch::{TouchPhase, TouchSlot, TouchSlots, MAX_TOUCHES};

/// Logical console button, one bit of the polled input byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Bit 0
    Left,
    /// Bit 1
    Right,
    /// Bit 2
    Up,
    /// Bit 3
    Down,
    /// Bit 4, primary action (Z key, joystick button 1)
    Action1,
    /// Bit 5, secondary action (X key, joystick button 0)
    Action2,
    /// Bit 6, confirm / pause (P or Enter, joystick button 7)
    Confirm,
    /// Bit 7, menu / escape
    Menu,
}

impl Button {
    /// All buttons in bit order
    pub const ALL: [Button; 8] = [
        Button::Left,
        Button::Right,
        Button::Up,
        Button::Down,
        Button::Action1,
        Button::Action2,
        Button::Confirm,
        Button::Menu,
    ];

    /// Bit position in the polled byte
    #[inline]
    pub const fn bit(self) -> u8 {
        match self {
            Button::Left => 0,
            Button::Right => 1,
            Button::Up => 2,
            Button::Down => 3,
            Button::Action1 => 4,
            Button::Action2 => 5,
            Button::Confirm => 6,
            Button::Menu => 7,
        }
    }

    /// Single-bit mask for this button
    #[inline]
    pub const fn mask(self) -> u8 {
        1 << self.bit()
    }
}

/// Whether the host loop should keep running after an event batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Set or clear one button in a state byte
#[inline]
pub(crate) fn set_button(state: &mut u8, button: Button, pressed: bool) {
    if pressed {
        *state |= button.mask();
    } else {
        *state &= !button.mask();
    }
}

/// The four independently owned sources of the polled input byte
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    /// Keyboard buttons
    pub key_state: u8,
    /// Joystick axes and buttons
    pub joy_state: u8,
    /// Joystick hat directions
    pub hat_state: u8,
    /// Simulated input injected by scripts or replays
    pub sim_state: u8,
}

impl InputState {
    /// The OR of all four sources
    #[inline]
    pub fn poll(&self) -> u8 {
        self.key_state | self.joy_state | self.hat_state | self.sim_state
    }

    /// Whether a button is held by any source
    #[inline]
    pub fn is_pressed(&self, button: Button) -> bool {
        self.poll() & button.mask() != 0
    }
}

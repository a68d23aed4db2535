// Joystick input mapping module
//
// Converts axis, hat and button events from the primary joystick into the
// joystick and hat bytes of the input state.

use super::event::HatDirection;
use super::{set_button, Button};

/// Minimum axis magnitude, in signed 16-bit units, that counts as a press
pub const AXIS_DEADZONE: i16 = 1500;

/// Joystick button indices and axis threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoystickMapping {
    /// Axis magnitude threshold
    pub deadzone: i16,
    /// Button index for Action1
    pub action1_button: u8,
    /// Button index for Action2
    pub action2_button: u8,
    /// Button index for Confirm
    pub confirm_button: u8,
}

impl JoystickMapping {
    /// Default mapping: deadzone 1500, buttons 1 / 0 / 7
    pub fn default_mapping() -> Self {
        Self {
            deadzone: AXIS_DEADZONE,
            action1_button: 1,
            action2_button: 0,
            confirm_button: 7,
        }
    }

    /// Logical button for a joystick button index
    fn get_button(&self, index: u8) -> Option<Button> {
        if index == self.action1_button {
            Some(Button::Action1)
        } else if index == self.action2_button {
            Some(Button::Action2)
        } else if index == self.confirm_button {
            Some(Button::Confirm)
        } else {
            None
        }
    }
}

impl Default for JoystickMapping {
    fn default() -> Self {
        Self::default_mapping()
    }
}

/// Joystick and hat bytes of the input state
#[derive(Debug, Clone, Default)]
pub struct JoystickState {
    mapping: JoystickMapping,
    joy_state: u8,
    hat_state: u8,
}

impl JoystickState {
    /// Create joystick state with a mapping
    pub fn new(mapping: JoystickMapping) -> Self {
        Self {
            mapping,
            joy_state: 0,
            hat_state: 0,
        }
    }

    /// Apply an axis event
    ///
    /// Axis 0 drives Left/Right and axis 1 drives Up/Down; only the two
    /// bits of the event's axis change. Other axes are ignored.
    pub fn handle_axis(&mut self, axis: u8, value: i16) {
        let (negative, positive) = match axis {
            0 => (Button::Left, Button::Right),
            1 => (Button::Up, Button::Down),
            _ => return,
        };

        let deadzone = self.mapping.deadzone;
        set_button(&mut self.joy_state, negative, value < deadzone.saturating_neg());
        set_button(&mut self.joy_state, positive, value > deadzone);
    }

    /// Apply a hat event
    ///
    /// The direction is the hat's current polled state and overwrites all
    /// four directional bits. Only the primary hat is honored.
    pub fn handle_hat(&mut self, hat: u8, direction: HatDirection) {
        if hat != 0 {
            log::debug!("Ignoring secondary hat {}", hat);
            return;
        }

        set_button(&mut self.hat_state, Button::Left, direction.contains(HatDirection::LEFT));
        set_button(&mut self.hat_state, Button::Right, direction.contains(HatDirection::RIGHT));
        set_button(&mut self.hat_state, Button::Up, direction.contains(HatDirection::UP));
        set_button(&mut self.hat_state, Button::Down, direction.contains(HatDirection::DOWN));
    }

    /// Apply a button press or release; unmapped buttons are ignored
    pub fn handle_button(&mut self, index: u8, pressed: bool) {
        if let Some(button) = self.mapping.get_button(index) {
            set_button(&mut self.joy_state, button, pressed);
        }
    }

    /// Clear everything, e.g. when the joystick is disconnected
    pub fn reset(&mut self) {
        self.joy_state = 0;
        self.hat_state = 0;
    }

    /// Buttons held through axes and joystick buttons
    #[inline]
    pub fn joy_state(&self) -> u8 {
        self.joy_state
    }

    /// Directions held through the hat
    #[inline]
    pub fn hat_state(&self) -> u8 {
        self.hat_state
    }

    /// Current mapping
    pub fn mapping(&self) -> &JoystickMapping {
        &self.mapping
    }

    /// Replace the mapping; bits already held stay until their next event
    pub fn set_mapping(&mut self, mapping: JoystickMapping) {
        self.mapping = mapping;
    }
}

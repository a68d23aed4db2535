// Gamepad backend
//
// Reads the first connected gamepad with more than one button through gilrs and turns its events into
// raw joystick events: stick axes as signed 16-bit values, the D-pad as a
// hat carrying its current direction, face buttons as button indices.

use crate::error::{HalError, Result};
use crate::input::{HatDirection, RawEvent};
use gilrs::{Axis, Button as GilrsButton, Event, EventType, Gamepad, GamepadId, Gilrs};

/// Threshold for treating an analog D-pad axis as pressed
const DPAD_AXIS_THRESHOLD: f32 = 0.5;

/// Joystick button index for a gamepad button
///
/// Uses the common controller layout: South 0, East 1, West 2, North 3,
/// shoulders 4 and 5, Select 6, Start 7.
pub fn button_index(button: GilrsButton) -> Option<u8> {
    match button {
        GilrsButton::South => Some(0),
        GilrsButton::East => Some(1),
        GilrsButton::West => Some(2),
        GilrsButton::North => Some(3),
        GilrsButton::LeftTrigger => Some(4),
        GilrsButton::RightTrigger => Some(5),
        GilrsButton::Select => Some(6),
        GilrsButton::Start => Some(7),
        _ => None,
    }
}

/// Whether a button belongs to the D-pad
fn is_dpad(button: GilrsButton) -> bool {
    matches!(
        button,
        GilrsButton::DPadUp | GilrsButton::DPadDown | GilrsButton::DPadLeft | GilrsButton::DPadRight
    )
}

/// Convert a stick axis value in `[-1, 1]` to an axis event
///
/// The left stick maps to axes 0 and 1. The Y axis is inverted so that
/// down is positive, as on screen.
pub fn axis_event(axis: Axis, value: f32) -> Option<RawEvent> {
    let (index, value) = match axis {
        Axis::LeftStickX => (0, value),
        Axis::LeftStickY => (1, -value),
        _ => return None,
    };
    Some(RawEvent::AxisMotion {
        axis: index,
        value: axis_to_i16(value),
    })
}

fn axis_to_i16(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Hat direction from the four D-pad states
pub fn hat_direction(up: bool, right: bool, down: bool, left: bool) -> HatDirection {
    let mut direction = HatDirection::CENTERED;
    for (pressed, bit) in [
        (up, HatDirection::UP),
        (right, HatDirection::RIGHT),
        (down, HatDirection::DOWN),
        (left, HatDirection::LEFT),
    ] {
        if pressed {
            direction = direction.union(bit);
        }
    }
    direction
}

/// Current D-pad direction of a gamepad, from buttons or D-pad axes
fn polled_hat(gamepad: &Gamepad<'_>) -> HatDirection {
    let dpad_x = gamepad.value(Axis::DPadX);
    let dpad_y = gamepad.value(Axis::DPadY);
    hat_direction(
        gamepad.is_pressed(GilrsButton::DPadUp) || dpad_y > DPAD_AXIS_THRESHOLD,
        gamepad.is_pressed(GilrsButton::DPadRight) || dpad_x > DPAD_AXIS_THRESHOLD,
        gamepad.is_pressed(GilrsButton::DPadDown) || dpad_y < -DPAD_AXIS_THRESHOLD,
        gamepad.is_pressed(GilrsButton::DPadLeft) || dpad_x < -DPAD_AXIS_THRESHOLD,
    )
}

/// Buttons, axes and hats a gamepad reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoystickCaps {
    pub buttons: usize,
    pub axes: usize,
    pub hats: usize,
}

impl JoystickCaps {
    /// Count the controls the platform maps for a gamepad
    ///
    /// D-pad buttons or D-pad axes count as one hat.
    fn of(gamepad: &Gamepad<'_>) -> Self {
        let buttons = CAPS_BUTTONS
            .iter()
            .filter(|&&b| gamepad.button_code(b).is_some())
            .count();
        let axes = CAPS_AXES
            .iter()
            .filter(|&&a| gamepad.axis_code(a).is_some())
            .count();
        let has_hat = [GilrsButton::DPadUp, GilrsButton::DPadLeft]
            .iter()
            .any(|&b| gamepad.button_code(b).is_some())
            || gamepad.axis_code(Axis::DPadX).is_some();
        Self {
            buttons,
            axes,
            hats: usize::from(has_hat),
        }
    }

    /// Whether the device can drive the console: more than one button
    pub fn is_usable(&self) -> bool {
        self.buttons > 1
    }
}

/// Buttons counted in `JoystickCaps`
const CAPS_BUTTONS: [GilrsButton; 10] = [
    GilrsButton::South,
    GilrsButton::East,
    GilrsButton::West,
    GilrsButton::North,
    GilrsButton::LeftTrigger,
    GilrsButton::RightTrigger,
    GilrsButton::LeftTrigger2,
    GilrsButton::RightTrigger2,
    GilrsButton::Select,
    GilrsButton::Start,
];

/// Axes counted in `JoystickCaps`
const CAPS_AXES: [Axis; 6] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::LeftZ,
    Axis::RightZ,
];

/// Primary joystick source
pub struct JoystickBackend {
    gilrs: Gilrs,
    active: Option<GamepadId>,
}

impl JoystickBackend {
    /// Initialize gamepad support and pick the first connected gamepad
    ///
    /// # Errors
    /// `HalError::ResourceInit` if the platform gamepad backend fails.
    pub fn new() -> Result<Self> {
        let gilrs = Gilrs::new()
            .map_err(|e| HalError::ResourceInit(format!("gamepad support: {}", e)))?;

        let mut backend = Self {
            gilrs,
            active: None,
        };
        backend.pick_first_connected();
        Ok(backend)
    }

    /// Pick the first connected joystick with more than one button
    fn pick_first_connected(&mut self) {
        self.active = None;
        for (id, gamepad) in self.gilrs.gamepads() {
            if !gamepad.is_connected() {
                continue;
            }
            let caps = JoystickCaps::of(&gamepad);
            log::info!(
                "Joystick {}: '{}', buttons {}, axes {}, hats {}",
                id,
                gamepad.name(),
                caps.buttons,
                caps.axes,
                caps.hats
            );
            if self.active.is_none() && caps.is_usable() {
                self.active = Some(id);
            }
        }

        match self.active {
            Some(id) => log::info!("Opened joystick {}", id),
            None => log::info!("No usable joystick detected"),
        }
    }

    /// Whether a joystick is in use
    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    /// Drain pending gamepad events into `out`
    pub fn poll_events(&mut self, out: &mut Vec<RawEvent>) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            if self.active.is_none() {
                if let EventType::Connected = event {
                    let caps = JoystickCaps::of(&self.gilrs.gamepad(id));
                    log::info!("Joystick {} connected, {} buttons", id, caps.buttons);
                    if caps.is_usable() {
                        self.active = Some(id);
                    }
                }
                continue;
            }
            if self.active != Some(id) {
                continue;
            }

            match event {
                EventType::ButtonPressed(button, _) if is_dpad(button) => {
                    out.push(self.hat_event(id));
                }
                EventType::ButtonReleased(button, _) if is_dpad(button) => {
                    out.push(self.hat_event(id));
                }
                EventType::ButtonPressed(button, _) => {
                    if let Some(button) = button_index(button) {
                        out.push(RawEvent::ButtonDown { button });
                    }
                }
                EventType::ButtonReleased(button, _) => {
                    if let Some(button) = button_index(button) {
                        out.push(RawEvent::ButtonUp { button });
                    }
                }
                EventType::AxisChanged(Axis::DPadX | Axis::DPadY, _, _) => {
                    out.push(self.hat_event(id));
                }
                EventType::AxisChanged(axis, value, _) => {
                    out.extend(axis_event(axis, value));
                }
                EventType::Disconnected => {
                    log::info!("Joystick {} disconnected", id);
                    out.push(RawEvent::JoystickRemoved);
                    self.pick_first_connected();
                }
                _ => {}
            }
        }
    }

    fn hat_event(&self, id: GamepadId) -> RawEvent {
        RawEvent::HatMotion {
            hat: 0,
            direction: polled_hat(&self.gilrs.gamepad(id)),
        }
    }
}

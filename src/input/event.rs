// Raw device events
//
// The host translates platform events into `RawEvent`s and feeds them to
// the aggregator in arrival order.

use winit::keyboard::KeyCode;

/// Keyboard modifier state at the time of a key press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    /// No modifiers held
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
    };

    /// Only Ctrl held
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        shift: false,
        alt: false,
    };
}

/// Mouse buttons reported in `MouseState::buttons`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

impl MouseButton {
    /// Bit in `MouseState::buttons`, or 0 for unreported buttons
    pub fn mask(self) -> u8 {
        match self {
            MouseButton::Left => 1,
            MouseButton::Right => 2,
            MouseButton::Middle => 4,
            MouseButton::Other(_) => 0,
        }
    }
}

/// Direction mask of a joystick hat, using the common hat bit layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HatDirection(pub u8);

impl HatDirection {
    pub const CENTERED: HatDirection = HatDirection(0x00);
    pub const UP: HatDirection = HatDirection(0x01);
    pub const RIGHT: HatDirection = HatDirection(0x02);
    pub const DOWN: HatDirection = HatDirection(0x04);
    pub const LEFT: HatDirection = HatDirection(0x08);

    /// Whether every bit of `other` is set
    #[inline]
    pub fn contains(self, other: HatDirection) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    /// Union of two directions
    #[inline]
    pub fn union(self, other: HatDirection) -> HatDirection {
        HatDirection(self.0 | other.0)
    }
}

/// A single input event from the host platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawEvent {
    /// A key went down (repeats are not reported)
    KeyDown { key: KeyCode, modifiers: Modifiers },
    /// A key went up
    KeyUp { key: KeyCode },
    /// Analog axis moved, value in signed 16-bit device units
    AxisMotion { axis: u8, value: i16 },
    /// Hat changed; `direction` is the hat's current state polled after the
    /// event
    HatMotion { hat: u8, direction: HatDirection },
    /// Joystick button pressed
    ButtonDown { button: u8 },
    /// Joystick button released
    ButtonUp { button: u8 },
    /// The active joystick went away
    JoystickRemoved,
    /// Contact began; `x`, `y` normalized to `[0, 1]` over the window
    FingerDown { finger_id: u64, x: f32, y: f32 },
    /// Contact moved
    FingerMotion { finger_id: u64, x: f32, y: f32 },
    /// Contact ended
    FingerUp { finger_id: u64, x: f32, y: f32 },
    /// Cursor moved, in window pixels
    MouseMotion { x: i32, y: i32 },
    /// Mouse button pressed
    MouseButtonDown { button: MouseButton },
    /// Mouse button released
    MouseButtonUp { button: MouseButton },
    /// Vertical wheel movement in notches
    WheelScroll { delta: i32 },
    /// The user asked to close the application
    Quit,
}

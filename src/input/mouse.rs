// Mouse tracking
//
// The cursor position and buttons are tracked from events; the VM gets a
// snapshot mapped into logical coordinates, and the wheel counter drains
// on every snapshot.

use super::event::MouseButton;

/// Mouse snapshot in logical screen coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseState {
    pub x: i32,
    pub y: i32,
    /// Bit 0 left, bit 1 right, bit 2 middle
    pub buttons: u8,
    /// Wheel notches since the previous snapshot
    pub wheel: i32,
}

/// Raw cursor state in window pixels
#[derive(Debug, Clone, Default)]
pub(crate) struct MouseTracker {
    pub(crate) window_x: i32,
    pub(crate) window_y: i32,
    pub(crate) buttons: u8,
    pending_wheel: i32,
}

impl MouseTracker {
    pub(crate) fn handle_motion(&mut self, x: i32, y: i32) {
        self.window_x = x;
        self.window_y = y;
    }

    pub(crate) fn handle_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.buttons |= button.mask();
        } else {
            self.buttons &= !button.mask();
        }
    }

    pub(crate) fn handle_wheel(&mut self, delta: i32) {
        self.pending_wheel = self.pending_wheel.saturating_add(delta);
    }

    /// Take the accumulated wheel movement, leaving zero behind
    pub(crate) fn take_wheel(&mut self) -> i32 {
        std::mem::take(&mut self.pending_wheel)
    }
}

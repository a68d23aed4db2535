// Input aggregator
//
// Merges keyboard, joystick, touch and mouse events into the state the
// console polls once per frame. Pointer coordinates are mapped into the
// logical screen with the same display mapping used for presenting.

use super::event::RawEvent;
use super::joystick::{JoystickMapping, JoystickState};
use super::keyboard::{HotkeyAction, Hotkeys, KeyBindings, KeyboardState};
use super::mouse::{MouseState, MouseTracker};
use super::touch::{TouchSlot, TouchSlots};
use super::{Flow, InputState};
use crate::display::mapper::{compute_display_rect, DisplayRect};
use crate::lifecycle::HostSignals;

/// Window and logical screen sizes used to map pointer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Window size in pixels
    pub window: (u32, u32),
    /// Logical screen size in pixels
    pub logical: (usize, usize),
}

impl Viewport {
    /// Create a viewport
    pub fn new(window: (u32, u32), logical: (usize, usize)) -> Self {
        Self { window, logical }
    }

    /// Current destination rectangle of the logical screen
    pub fn display_rect(&self) -> DisplayRect {
        compute_display_rect(self.window.0, self.window.1, self.logical.0, self.logical.1)
    }

    /// Map a window pixel to logical coordinates
    pub fn window_to_logical(&self, wx: i32, wy: i32) -> (i32, i32) {
        self.display_rect().window_to_logical(wx, wy)
    }

    /// Map normalized `[0, 1]` window coordinates to logical coordinates
    pub fn normalized_to_logical(&self, nx: f32, ny: f32) -> (i32, i32) {
        let wx = (nx as f64 * self.window.0 as f64) as i32;
        let wy = (ny as f64 * self.window.1 as f64) as i32;
        self.window_to_logical(wx, wy)
    }
}

/// Unified input state for the console
pub struct InputAggregator {
    keyboard: KeyboardState,
    joystick: JoystickState,
    hotkeys: Hotkeys,
    key_state: u8,
    sim_state: u8,
    touches: TouchSlots,
    touch_available: bool,
    mouse: MouseTracker,
    signals: HostSignals,
}

impl InputAggregator {
    /// Create an aggregator with default bindings
    pub fn new() -> Self {
        Self::with_mappings(
            KeyBindings::default_mapping(),
            JoystickMapping::default_mapping(),
            Hotkeys::default_mapping(),
        )
    }

    /// Create an aggregator with custom bindings
    pub fn with_mappings(
        bindings: KeyBindings,
        joystick: JoystickMapping,
        hotkeys: Hotkeys,
    ) -> Self {
        Self {
            keyboard: KeyboardState::new(bindings),
            joystick: JoystickState::new(joystick),
            hotkeys,
            key_state: 0,
            sim_state: 0,
            touches: TouchSlots::new(),
            touch_available: false,
            mouse: MouseTracker::default(),
            signals: HostSignals::default(),
        }
    }

    /// Swap key, joystick and hotkey bindings in place
    ///
    /// Held keys are re-evaluated against the new bindings. Joystick, hat,
    /// touch, mouse and simulated input and the host signals are kept.
    pub fn set_mappings(
        &mut self,
        bindings: KeyBindings,
        joystick: JoystickMapping,
        hotkeys: Hotkeys,
    ) {
        self.keyboard.set_bindings(bindings);
        self.joystick.set_mapping(joystick);
        self.hotkeys = hotkeys;
        self.key_state = self.keyboard.button_mask();
    }

    /// Apply one raw event
    ///
    /// Returns `Flow::Quit` for a quit event or the quit hotkey.
    pub fn apply_event(&mut self, event: RawEvent, viewport: &Viewport) -> Flow {
        match event {
            RawEvent::KeyDown { key, modifiers } => {
                if let Some(action) = self.hotkeys.action_for(key, modifiers) {
                    return self.run_hotkey(action);
                }
                self.keyboard.handle_key_press(key);
                self.key_state = self.keyboard.button_mask();
            }
            RawEvent::KeyUp { key } => {
                self.keyboard.handle_key_release(key);
                self.key_state = self.keyboard.button_mask();
            }
            RawEvent::AxisMotion { axis, value } => {
                self.joystick.handle_axis(axis, value);
            }
            RawEvent::HatMotion { hat, direction } => {
                self.joystick.handle_hat(hat, direction);
            }
            RawEvent::ButtonDown { button } => {
                self.joystick.handle_button(button, true);
            }
            RawEvent::ButtonUp { button } => {
                self.joystick.handle_button(button, false);
            }
            RawEvent::JoystickRemoved => {
                log::info!("Joystick removed, clearing joystick state");
                self.joystick.reset();
            }
            RawEvent::FingerDown { finger_id, x, y } => {
                self.touch_available = true;
                let (lx, ly) = viewport.normalized_to_logical(x, y);
                self.touches.finger_down(finger_id, lx, ly);
            }
            RawEvent::FingerMotion { finger_id, x, y } => {
                self.touch_available = true;
                let (lx, ly) = viewport.normalized_to_logical(x, y);
                self.touches.finger_motion(finger_id, lx, ly);
            }
            RawEvent::FingerUp { finger_id, .. } => {
                self.touches.finger_up(finger_id);
            }
            RawEvent::MouseMotion { x, y } => {
                self.mouse.handle_motion(x, y);
            }
            RawEvent::MouseButtonDown { button } => {
                self.mouse.handle_button(button, true);
            }
            RawEvent::MouseButtonUp { button } => {
                self.mouse.handle_button(button, false);
            }
            RawEvent::WheelScroll { delta } => {
                self.mouse.handle_wheel(delta);
            }
            RawEvent::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Drain an event source, stopping at the first quit
    pub fn process_events<I>(&mut self, events: I, viewport: &Viewport) -> Flow
    where
        I: IntoIterator<Item = RawEvent>,
    {
        for event in events {
            if self.apply_event(event, viewport) == Flow::Quit {
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    fn run_hotkey(&mut self, action: HotkeyAction) -> Flow {
        match action {
            HotkeyAction::Quit => return Flow::Quit,
            HotkeyAction::ToggleTrace => self.signals.toggle_debug_trace(),
            HotkeyAction::Reload => self.signals.request_reload(),
            HotkeyAction::ToggleFullscreen => self.signals.request_fullscreen_toggle(),
            HotkeyAction::Screenshot => self.signals.request_screenshot(),
        }
        Flow::Continue
    }

    /// Polled input byte: keyboard | joystick | hat | simulated
    #[inline]
    pub fn poll_state(&self) -> u8 {
        self.state().poll()
    }

    /// The four input sources
    pub fn state(&self) -> InputState {
        InputState {
            key_state: self.key_state,
            joy_state: self.joystick.joy_state(),
            hat_state: self.joystick.hat_state(),
            sim_state: self.sim_state,
        }
    }

    /// Overwrite the simulated input byte until the next frame start
    pub fn inject_sim_state(&mut self, state: u8) {
        self.sim_state = state;
    }

    /// Mouse snapshot in logical coordinates; drains the wheel counter
    pub fn mouse_state(&mut self, viewport: &Viewport) -> MouseState {
        let (x, y) = viewport.window_to_logical(self.mouse.window_x, self.mouse.window_y);
        MouseState {
            x,
            y,
            buttons: self.mouse.buttons,
            wheel: self.mouse.take_wheel(),
        }
    }

    /// Bit `n` set for every touch slot in use
    pub fn touch_mask(&self) -> u8 {
        self.touches.mask()
    }

    /// Snapshot of touch slot `index`
    pub fn touch_info(&self, index: usize) -> TouchSlot {
        self.touches.get(index)
    }

    /// Whether a touch device has reported contacts
    pub fn touch_available(&self) -> bool {
        self.touch_available
    }

    /// Mark touch input as present, e.g. from host device enumeration
    pub fn set_touch_available(&mut self, available: bool) {
        self.touch_available = available;
    }

    /// Forget held keys, e.g. after the window loses focus
    pub fn release_keys(&mut self) {
        self.keyboard.release_all();
        self.key_state = 0;
    }

    /// Frame start: clear simulated input and one-frame signals
    pub fn start_frame(&mut self) {
        self.sim_state = 0;
        self.signals.begin_frame();
    }

    /// Clear touch edges: JustPressed ends, JustReleased becomes None
    pub fn flush_touches(&mut self) {
        self.touches.flush();
    }

    /// Frame end: flush touch edges
    pub fn end_frame(&mut self) {
        self.flush_touches();
    }

    /// Host signals raised by hotkeys
    pub fn signals(&self) -> &HostSignals {
        &self.signals
    }

    /// Mutable host signals
    pub fn signals_mut(&mut self) -> &mut HostSignals {
        &mut self.signals
    }
}

impl Default for InputAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::event::{HatDirection, Modifiers, MouseButton};
    use crate::input::touch::TouchPhase;
    use crate::input::Button;
    use winit::keyboard::KeyCode;

    fn viewport() -> Viewport {
        // 128x128 logical in 800x600: pillarboxed at x=100, scale 4.6875
        Viewport::new((800, 600), (128, 128))
    }

    fn key_down(key: KeyCode) -> RawEvent {
        RawEvent::KeyDown {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    #[test]
    fn test_keyboard_sets_and_clears_bits() {
        let mut input = InputAggregator::new();
        let vp = viewport();

        input.apply_event(key_down(KeyCode::ArrowLeft), &vp);
        input.apply_event(key_down(KeyCode::KeyZ), &vp);
        assert_eq!(
            input.poll_state(),
            Button::Left.mask() | Button::Action1.mask()
        );

        input.apply_event(RawEvent::KeyUp { key: KeyCode::ArrowLeft }, &vp);
        assert_eq!(input.poll_state(), Button::Action1.mask());
    }

    #[test]
    fn test_aliased_keys_interleaved() {
        let mut input = InputAggregator::new();
        let vp = viewport();

        input.apply_event(key_down(KeyCode::KeyP), &vp);
        input.apply_event(key_down(KeyCode::Enter), &vp);
        input.apply_event(RawEvent::KeyUp { key: KeyCode::KeyP }, &vp);
        assert_eq!(input.poll_state(), Button::Confirm.mask());

        input.apply_event(RawEvent::KeyUp { key: KeyCode::Enter }, &vp);
        assert_eq!(input.poll_state(), 0);
    }

    #[test]
    fn test_sources_are_independent() {
        let mut input = InputAggregator::new();
        let vp = viewport();

        input.apply_event(key_down(KeyCode::ArrowUp), &vp);
        input.apply_event(
            RawEvent::HatMotion {
                hat: 0,
                direction: HatDirection::UP,
            },
            &vp,
        );
        input.apply_event(RawEvent::KeyUp { key: KeyCode::ArrowUp }, &vp);

        // The hat still holds Up after the key is released
        assert_eq!(input.poll_state(), Button::Up.mask());
        assert_eq!(input.state().key_state, 0);
    }

    #[test]
    fn test_axis_sequence() {
        let mut input = InputAggregator::new();
        let vp = viewport();
        let mut seen = Vec::new();

        for value in [0, 1600, -1600, 0] {
            input.apply_event(RawEvent::AxisMotion { axis: 0, value }, &vp);
            seen.push(input.poll_state());
        }

        assert_eq!(
            seen,
            vec![0, Button::Right.mask(), Button::Left.mask(), 0]
        );
    }

    #[test]
    fn test_joystick_removed_clears_state() {
        let mut input = InputAggregator::new();
        let vp = viewport();
        input.apply_event(RawEvent::ButtonDown { button: 7 }, &vp);
        input.apply_event(RawEvent::AxisMotion { axis: 1, value: 9000 }, &vp);
        input.apply_event(RawEvent::JoystickRemoved, &vp);
        assert_eq!(input.poll_state(), 0);
    }

    #[test]
    fn test_sim_state_cleared_at_frame_start() {
        let mut input = InputAggregator::new();
        input.inject_sim_state(0b1010_0000);
        assert_eq!(input.poll_state(), 0b1010_0000);
        assert_eq!(input.poll_state(), 0b1010_0000);

        input.start_frame();
        assert_eq!(input.poll_state(), 0);
    }

    #[test]
    fn test_quit_event_and_hotkey() {
        let mut input = InputAggregator::new();
        let vp = viewport();
        assert_eq!(input.apply_event(RawEvent::Quit, &vp), Flow::Quit);
        assert_eq!(
            input.apply_event(
                RawEvent::KeyDown {
                    key: KeyCode::KeyQ,
                    modifiers: Modifiers::CTRL
                },
                &vp
            ),
            Flow::Quit
        );
    }

    #[test]
    fn test_hotkeys_do_not_touch_key_state() {
        let mut input = InputAggregator::new();
        let vp = viewport();

        let mut bindings = KeyBindings::default_mapping();
        bindings.bind(Button::Action1, KeyCode::KeyR);
        input.keyboard.set_bindings(bindings);

        input.apply_event(
            RawEvent::KeyDown {
                key: KeyCode::KeyR,
                modifiers: Modifiers::CTRL,
            },
            &vp,
        );
        assert!(input.signals().reload_requested());
        assert_eq!(input.poll_state(), 0);

        input.start_frame();
        assert!(!input.signals().reload_requested());
    }

    #[test]
    fn test_set_mappings_keeps_held_input() {
        let mut input = InputAggregator::new();
        let vp = viewport();
        input.apply_event(key_down(KeyCode::KeyZ), &vp);
        input.apply_event(key_down(KeyCode::KeyJ), &vp);
        input.apply_event(RawEvent::ButtonDown { button: 7 }, &vp);
        input.apply_event(
            RawEvent::FingerDown {
                finger_id: 2,
                x: 0.5,
                y: 0.5,
            },
            &vp,
        );

        let mut bindings = KeyBindings::empty();
        bindings.bind(Button::Action2, KeyCode::KeyJ);
        input.set_mappings(
            bindings,
            JoystickMapping::default_mapping(),
            Hotkeys::default_mapping(),
        );

        // Z lost its binding, J picked one up while held
        assert_eq!(input.state().key_state, Button::Action2.mask());
        assert_eq!(input.state().joy_state, Button::Confirm.mask());
        assert_eq!(input.touch_mask(), 0b100);
    }

    #[test]
    fn test_trace_and_fullscreen_hotkeys() {
        let mut input = InputAggregator::new();
        let vp = viewport();
        input.apply_event(
            RawEvent::KeyDown {
                key: KeyCode::KeyT,
                modifiers: Modifiers::CTRL,
            },
            &vp,
        );
        input.apply_event(key_down(KeyCode::F11), &vp);

        assert!(input.signals().debug_trace());
        assert!(input.signals_mut().take_fullscreen_toggle());
    }

    #[test]
    fn test_process_events_stops_at_quit() {
        let mut input = InputAggregator::new();
        let vp = viewport();
        let events = vec![
            key_down(KeyCode::ArrowDown),
            RawEvent::Quit,
            key_down(KeyCode::ArrowUp),
        ];

        assert_eq!(input.process_events(events, &vp), Flow::Quit);
        assert_eq!(input.poll_state(), Button::Down.mask());
    }

    #[test]
    fn test_touch_mapped_to_logical() {
        let mut input = InputAggregator::new();
        let vp = viewport();

        // Window x = 0.5 * 800 = 400 -> (400 - 100) / 4.6875 = 64
        input.apply_event(
            RawEvent::FingerDown {
                finger_id: 0,
                x: 0.5,
                y: 0.5,
            },
            &vp,
        );

        let slot = input.touch_info(0);
        assert_eq!((slot.x, slot.y), (64, 64));
        assert_eq!(slot.phase, TouchPhase::Pressed { just_pressed: true });
        assert!(input.touch_available());
        assert_eq!(input.touch_mask(), 1);
    }

    #[test]
    fn test_touch_lifecycle_across_frames() {
        let mut input = InputAggregator::new();
        let vp = viewport();

        input.apply_event(
            RawEvent::FingerDown {
                finger_id: 0,
                x: 0.25,
                y: 0.25,
            },
            &vp,
        );
        input.end_frame();
        assert_eq!(
            input.touch_info(0).phase,
            TouchPhase::Pressed {
                just_pressed: false
            }
        );

        input.apply_event(
            RawEvent::FingerUp {
                finger_id: 0,
                x: 0.0,
                y: 0.0,
            },
            &vp,
        );
        assert!(input.touch_info(0).just_released());
        input.end_frame();
        assert_eq!(input.touch_mask(), 0);
    }

    #[test]
    fn test_mouse_state_mapping_and_wheel() {
        let mut input = InputAggregator::new();
        let vp = viewport();

        input.apply_event(RawEvent::MouseMotion { x: 699, y: 599 }, &vp);
        input.apply_event(
            RawEvent::MouseButtonDown {
                button: MouseButton::Right,
            },
            &vp,
        );
        input.apply_event(RawEvent::WheelScroll { delta: 3 }, &vp);
        input.apply_event(RawEvent::WheelScroll { delta: -1 }, &vp);

        let mouse = input.mouse_state(&vp);
        assert_eq!((mouse.x, mouse.y), (127, 127));
        assert_eq!(mouse.buttons, 2);
        assert_eq!(mouse.wheel, 2);

        assert_eq!(input.mouse_state(&vp).wheel, 0);
    }

    #[test]
    fn test_mouse_follows_window_resize() {
        let mut input = InputAggregator::new();
        input.apply_event(RawEvent::MouseMotion { x: 256, y: 256 }, &viewport());

        let small = Viewport::new((512, 512), (128, 128));
        let large = Viewport::new((1024, 1024), (128, 128));
        assert_eq!(input.mouse_state(&small).x, 64);
        assert_eq!(input.mouse_state(&large).x, 32);
    }
}

// Host window - winit event loop driving the HAL
//
// Creates a resizable window, translates winit events into raw events and
// runs one paced frame per redraw:
// start_frame -> events -> client.update -> client.draw -> flip -> end_frame.

use super::gamepad::JoystickBackend;
use super::surface::PixelsSurface;
use crate::config::HalConfig;
use crate::display::surface::DisplaySurface;
use crate::error::HalError;
use crate::hal::Hal;
use crate::input::{Flow, Modifiers, MouseButton, RawEvent, MAX_TOUCHES};
use crate::lifecycle::FramePacer;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, Touch, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Fullscreen, Window, WindowId};

/// Pixels per wheel notch for touchpad-style scrolling
const PIXELS_PER_NOTCH: f64 = 40.0;

/// The console side of the frame loop
pub trait FrameClient {
    /// Advance one frame; input for the frame has been applied
    fn update<S: DisplaySurface>(&mut self, hal: &mut Hal<S>);

    /// Draw the frame into the backbuffer
    fn draw<S: DisplaySurface>(&mut self, hal: &mut Hal<S>);
}

/// Maps platform touch ids onto small finger ids
///
/// Platforms hand out arbitrary touch ids; each new contact takes the
/// lowest free slot index so that it lands in the touch slot table. An
/// ended contact keeps its index until the frame's touch edges are flushed,
/// so a new contact never lands on a slot still showing its release.
#[derive(Debug, Default)]
pub struct FingerIds {
    ids: HashMap<u64, u64>,
    released: Vec<u64>,
}

impl FingerIds {
    /// Finger id for a contact that just started
    pub fn begin(&mut self, touch_id: u64) -> u64 {
        if let Some(&finger) = self.ids.get(&touch_id) {
            return finger;
        }
        let finger = (0..MAX_TOUCHES as u64)
            .find(|n| !self.ids.values().any(|v| v == n) && !self.released.contains(n))
            .unwrap_or(MAX_TOUCHES as u64);
        self.ids.insert(touch_id, finger);
        finger
    }

    /// Finger id for a known contact, allocating one if it was missed
    pub fn get(&mut self, touch_id: u64) -> u64 {
        self.begin(touch_id)
    }

    /// Finger id of an ended contact; the index stays reserved until `flush`
    pub fn end(&mut self, touch_id: u64) -> u64 {
        let finger = self.get(touch_id);
        self.ids.remove(&touch_id);
        if finger < MAX_TOUCHES as u64 {
            self.released.push(finger);
        }
        finger
    }

    /// Free the indices of contacts that ended before the last frame end
    pub fn flush(&mut self) {
        self.released.clear();
    }
}

/// Host application: window, surface, joystick and the frame loop
pub struct HostWindow<C: FrameClient> {
    config: HalConfig,
    config_path: Option<PathBuf>,
    client: C,
    window: Option<Arc<Window>>,
    hal: Option<Hal<PixelsSurface>>,
    joystick: Option<JoystickBackend>,
    pacer: FramePacer,
    modifiers: Modifiers,
    fingers: FingerIds,
    pending: Vec<RawEvent>,
    error: Option<HalError>,
}

impl<C: FrameClient> HostWindow<C> {
    /// Create the host; the window is created when the event loop starts
    ///
    /// # Arguments
    /// * `config` - HAL configuration
    /// * `config_path` - File re-read on a reload request, if any
    /// * `client` - The console driven every frame
    pub fn new(config: HalConfig, config_path: Option<PathBuf>, client: C) -> Self {
        let joystick = match JoystickBackend::new() {
            Ok(joystick) => Some(joystick),
            Err(e) => {
                log::warn!("Joystick input unavailable: {}", e);
                None
            }
        };

        Self {
            pacer: FramePacer::new(config.video.fps),
            config,
            config_path,
            client,
            window: None,
            hal: None,
            joystick,
            modifiers: Modifiers::NONE,
            fingers: FingerIds::default(),
            pending: Vec::new(),
            error: None,
        }
    }

    /// The console client
    pub fn client(&self) -> &C {
        &self.client
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> crate::error::Result<()> {
        let (width, height) = self.config.video.window_size();
        let mut attributes = Window::default_attributes()
            .with_title("fantasy-hal")
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(true);
        if self.config.video.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = event_loop
            .create_window(attributes)
            .map_err(|e| HalError::ResourceInit(format!("window: {}", e)))?;
        let window = Arc::new(window);
        // The console draws its own pointer
        window.set_cursor_visible(false);

        let format = self.config.video.pixel_format()?;
        let surface = PixelsSurface::new(window.clone(), format, self.config.video.vsync)?;
        let hal = Hal::from_config(&self.config, surface)?;

        log::info!(
            "Window {}x{}, target {} FPS, vsync {}",
            width,
            height,
            self.config.video.fps,
            self.config.video.vsync
        );

        self.window = Some(window);
        self.hal = Some(hal);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: HalError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    /// Translate a window event into raw events
    fn translate(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.pending.push(RawEvent::Quit),
            WindowEvent::ModifiersChanged(modifiers) => {
                let state = modifiers.state();
                self.modifiers = Modifiers {
                    ctrl: state.control_key(),
                    shift: state.shift_key(),
                    alt: state.alt_key(),
                };
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed if !repeat => self.pending.push(RawEvent::KeyDown {
                    key: *key,
                    modifiers: self.modifiers,
                }),
                ElementState::Pressed => {}
                ElementState::Released => self.pending.push(RawEvent::KeyUp { key: *key }),
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.pending.push(RawEvent::MouseMotion {
                    x: position.x as i32,
                    y: position.y as i32,
                });
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = translate_mouse_button(*button);
                self.pending.push(match state {
                    ElementState::Pressed => RawEvent::MouseButtonDown { button },
                    ElementState::Released => RawEvent::MouseButtonUp { button },
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y.round() as i32,
                    MouseScrollDelta::PixelDelta(position) => {
                        (position.y / PIXELS_PER_NOTCH).round() as i32
                    }
                };
                if delta != 0 {
                    self.pending.push(RawEvent::WheelScroll { delta });
                }
            }
            WindowEvent::Touch(touch) => self.translate_touch(touch),
            _ => {}
        }
    }

    fn translate_touch(&mut self, touch: &Touch) {
        let (width, height) = self
            .window
            .as_ref()
            .map(|w| {
                let size = w.inner_size();
                (size.width.max(1) as f64, size.height.max(1) as f64)
            })
            .unwrap_or((1.0, 1.0));
        let x = (touch.location.x / width) as f32;
        let y = (touch.location.y / height) as f32;

        let event = match touch.phase {
            TouchPhase::Started => RawEvent::FingerDown {
                finger_id: self.fingers.begin(touch.id),
                x,
                y,
            },
            TouchPhase::Moved => RawEvent::FingerMotion {
                finger_id: self.fingers.get(touch.id),
                x,
                y,
            },
            TouchPhase::Ended | TouchPhase::Cancelled => RawEvent::FingerUp {
                finger_id: self.fingers.end(touch.id),
                x,
                y,
            },
        };
        self.pending.push(event);
    }

    /// Run one frame if it is due
    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        if !self.pacer.should_run_frame() {
            return;
        }
        let Some(hal) = self.hal.as_mut() else {
            return;
        };

        if let Some(joystick) = &mut self.joystick {
            joystick.poll_events(&mut self.pending);
        }

        hal.start_frame();
        if hal.process_events(self.pending.drain(..)) == Flow::Quit {
            log::info!("Quit requested, exiting...");
            event_loop.exit();
            return;
        }

        if hal.take_fullscreen_toggle() {
            if let Some(window) = &self.window {
                let fullscreen = match window.fullscreen() {
                    Some(_) => None,
                    None => Some(Fullscreen::Borderless(None)),
                };
                window.set_fullscreen(fullscreen);
            }
        }

        if hal.reload_requested() {
            if let Some(path) = &self.config_path {
                match HalConfig::load_from_file(path).and_then(|c| hal.reload_config(&c).map(|_| c)) {
                    Ok(config) => self.config = config,
                    Err(e) => log::warn!("Reload failed: {}", e),
                }
            }
        }

        self.client.update(hal);
        self.client.draw(hal);

        if let Some(visible) = hal.take_hw_mouse_request() {
            if let Some(window) = &self.window {
                window.set_cursor_visible(visible);
            }
        }

        match hal.flip() {
            Ok(()) => {}
            Err(e) if e.is_transient() => {}
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        }

        if hal.take_screenshot_request() {
            if let Err(e) = hal.save_screenshot() {
                log::error!("Screenshot failed: {}", e);
            }
        }

        hal.end_frame();
        self.fingers.flush();
    }
}

fn translate_mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Other(3),
        winit::event::MouseButton::Forward => MouseButton::Other(4),
        winit::event::MouseButton::Other(n) => MouseButton::Other(n),
    }
}

impl<C: FrameClient> ApplicationHandler for HostWindow<C> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match &event {
            WindowEvent::Resized(size) => {
                let result = match &mut self.hal {
                    Some(hal) => hal.surface_mut().resize(size.width, size.height),
                    None => Ok(()),
                };
                if let Err(e) = result {
                    self.fail(event_loop, e);
                }
            }
            WindowEvent::Focused(false) => {
                if let Some(hal) = &mut self.hal {
                    hal.input_mut().release_keys();
                }
            }
            WindowEvent::RedrawRequested => self.tick(event_loop),
            _ => self.translate(&event),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.pacer.next_frame_at()));
    }
}

/// Create the event loop and run a client until it quits
///
/// # Arguments
/// * `config` - HAL configuration
/// * `config_path` - File re-read on a reload request, if any
/// * `client` - The console driven every frame
pub fn run<C: FrameClient>(
    config: HalConfig,
    config_path: Option<PathBuf>,
    client: C,
) -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;
    let mut host = HostWindow::new(config, config_path, client);

    event_loop.run_app(&mut host)?;

    match host.error.take() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

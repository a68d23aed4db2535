// HAL context
//
// The single owned object the host loop and the console talk to. It holds
// the palette, the compositor with its backbuffer, the input aggregator,
// the clock and the display surface. Nothing in the crate is global.

use crate::config::HalConfig;
use crate::display::compositor::FrameCompositor;
use crate::display::framebuffer::{Backbuffer, LogicalScreen};
use crate::display::mapper::DisplayRect;
use crate::display::palette::{PaletteLibrary, PaletteTable, PixelFormat};
use crate::display::screenshot::save_screenshot;
use crate::display::surface::{DisplaySurface, MemorySurface};
use crate::error::Result;
use crate::input::{
    Flow, InputAggregator, InputLog, InputPlayback, InputRecorder, InputState, MouseState,
    RawEvent, TouchSlot, Viewport,
};
use crate::lifecycle::{Clock, HostSignals};
use std::path::{Path, PathBuf};

/// Hardware abstraction layer over a display surface
pub struct Hal<S: DisplaySurface> {
    surface: S,
    palette: PaletteTable,
    palettes: PaletteLibrary,
    compositor: FrameCompositor,
    input: InputAggregator,
    clock: Clock,
    recorder: Option<InputRecorder>,
    playback: Option<InputPlayback>,
    screenshot_directory: PathBuf,
    frame_count: u64,
    dropped_frames: u64,
}

impl<S: DisplaySurface> Hal<S> {
    /// Create a HAL with default settings
    ///
    /// Uses the default logical screen, the RGBA8888 format and the
    /// `pico8` palette.
    pub fn new(surface: S) -> Result<Self> {
        Self::from_config(&HalConfig::default(), surface)
    }

    /// Create a HAL from a validated configuration
    ///
    /// # Arguments
    /// * `config` - Video, input, hotkey and palette settings
    /// * `surface` - Host display surface
    pub fn from_config(config: &HalConfig, surface: S) -> Result<Self> {
        let format = config.video.pixel_format()?;
        let palettes = config.palette_library();
        let mut palette = PaletteTable::new(format);
        palette.select_palette(&palettes, &config.video.palette)?;

        let compositor =
            FrameCompositor::new(config.video.logical_width, config.video.logical_height)?;
        let input = InputAggregator::with_mappings(
            config.input.to_key_bindings()?,
            config.input.to_joystick_mapping()?,
            config.hotkeys.to_hotkeys()?,
        );

        log::info!(
            "HAL ready: {}x{} logical screen, palette '{}', {:?}",
            config.video.logical_width,
            config.video.logical_height,
            config.video.palette,
            format
        );

        Ok(Self {
            surface,
            palette,
            palettes,
            compositor,
            input,
            clock: Clock::new(),
            recorder: None,
            playback: None,
            screenshot_directory: config.video.screenshot_directory.clone(),
            frame_count: 0,
            dropped_frames: 0,
        })
    }

    /// Re-apply input bindings and palettes from a new configuration
    ///
    /// The logical screen, the pixel format and the current palette
    /// overrides are kept. Held input and this frame's signals survive;
    /// held keys are re-read through the new bindings.
    pub fn reload_config(&mut self, config: &HalConfig) -> Result<()> {
        config.validate()?;
        let bindings = config.input.to_key_bindings()?;
        let joystick = config.input.to_joystick_mapping()?;
        let hotkeys = config.hotkeys.to_hotkeys()?;

        self.input.set_mappings(bindings, joystick, hotkeys);
        self.palettes = config.palette_library();
        self.screenshot_directory = config.video.screenshot_directory.clone();
        log::info!("Configuration reloaded");
        Ok(())
    }

    // ========================================
    // Palette
    // ========================================

    /// Select a registered palette by name
    ///
    /// On error the current palette stays active.
    pub fn select_palette(&mut self, name: &str) -> Result<()> {
        self.palette.select_palette(&self.palettes, name)
    }

    /// Restore every active entry from the originals
    pub fn restore_palette(&mut self) {
        self.palette.restore_all();
    }

    /// Restore one active entry from its original
    pub fn restore_palette_index(&mut self, index: u8) {
        self.palette.restore_index(index);
    }

    /// Override one active entry with an RGB color
    pub fn set_palette_index(&mut self, index: u8, r: u8, g: u8, b: u8) {
        self.palette.set_index(index, r, g, b);
    }

    /// The palette table
    pub fn palette(&self) -> &PaletteTable {
        &self.palette
    }

    /// Registered palettes
    pub fn palettes(&self) -> &PaletteLibrary {
        &self.palettes
    }

    /// Register an additional palette
    pub fn register_palette(&mut self, name: &str, colors: &[u32]) {
        self.palettes.register(name, colors);
    }

    /// Display-native pixel format
    pub fn pixel_format(&self) -> PixelFormat {
        self.palette.format()
    }

    // ========================================
    // Display
    // ========================================

    /// Resize the logical screen
    pub fn set_backbuffer_size(&mut self, width: usize, height: usize) -> Result<()> {
        self.compositor.set_logical_size(width, height)
    }

    /// Current logical screen size
    pub fn logical_size(&self) -> LogicalScreen {
        self.compositor.logical_size()
    }

    /// The indexed backbuffer
    pub fn backbuffer(&self) -> &Backbuffer {
        self.compositor.backbuffer()
    }

    /// The indexed backbuffer, for the console to draw into
    pub fn backbuffer_mut(&mut self) -> &mut Backbuffer {
        self.compositor.backbuffer_mut()
    }

    /// Composite the backbuffer and present it
    ///
    /// A lock or present failure drops this frame only: it is logged,
    /// counted and returned, and the next flip retries normally.
    pub fn flip(&mut self) -> Result<()> {
        match self.compositor.flip(&self.palette, &mut self.surface) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.dropped_frames += 1;
                if e.is_transient() {
                    log::warn!("Dropped frame {}: {}", self.frame_count, e);
                } else {
                    log::error!("Flip failed: {}", e);
                }
                Err(e)
            }
        }
    }

    /// Window and logical sizes used for coordinate mapping
    pub fn viewport(&self) -> Viewport {
        let screen = self.compositor.logical_size();
        Viewport::new(self.surface.window_size(), (screen.width, screen.height))
    }

    /// Where the logical screen is currently drawn in the window
    pub fn display_rect(&self) -> DisplayRect {
        self.viewport().display_rect()
    }

    /// The display surface
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable display surface, e.g. to forward a window resize
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Save the logical screen as a PNG in the screenshot directory
    pub fn save_screenshot(&self) -> Result<PathBuf> {
        self.save_screenshot_to(&self.screenshot_directory)
    }

    /// Save the logical screen as a PNG in `directory`
    pub fn save_screenshot_to(&self, directory: &Path) -> Result<PathBuf> {
        save_screenshot(directory, &self.palette, self.compositor.backbuffer())
    }

    // ========================================
    // Input
    // ========================================

    /// Apply one raw event
    pub fn apply_event(&mut self, event: RawEvent) -> Flow {
        let viewport = self.viewport();
        self.input.apply_event(event, &viewport)
    }

    /// Drain an event source, stopping at the first quit
    pub fn process_events<I>(&mut self, events: I) -> Flow
    where
        I: IntoIterator<Item = RawEvent>,
    {
        let viewport = self.viewport();
        self.input.process_events(events, &viewport)
    }

    /// Polled input byte
    pub fn poll_state(&self) -> u8 {
        self.input.poll_state()
    }

    /// The four input sources
    pub fn input_state(&self) -> InputState {
        self.input.state()
    }

    /// Overwrite the simulated input byte for this frame
    pub fn inject_sim_state(&mut self, state: u8) {
        self.input.inject_sim_state(state);
    }

    /// Mouse snapshot in logical coordinates; drains the wheel counter
    pub fn mouse_state(&mut self) -> MouseState {
        let viewport = self.viewport();
        self.input.mouse_state(&viewport)
    }

    /// Bit `n` set for every touch slot in use
    pub fn touch_mask(&self) -> u8 {
        self.input.touch_mask()
    }

    /// Snapshot of touch slot `index`
    pub fn touch_info(&self, index: usize) -> TouchSlot {
        self.input.touch_info(index)
    }

    /// Whether a touch device has reported contacts
    pub fn touch_available(&self) -> bool {
        self.input.touch_available()
    }

    /// The input aggregator
    pub fn input(&self) -> &InputAggregator {
        &self.input
    }

    /// Mutable input aggregator
    pub fn input_mut(&mut self) -> &mut InputAggregator {
        &mut self.input
    }

    // ========================================
    // Frame lifecycle
    // ========================================

    /// Begin a frame
    ///
    /// Clears the simulated input and the reload flag, then feeds the next
    /// recorded byte when a playback is running.
    pub fn start_frame(&mut self) {
        self.input.start_frame();

        let Some(playback) = &mut self.playback else {
            return;
        };
        match playback.next_frame() {
            Some(state) => self.input.inject_sim_state(state),
            None => {
                log::info!("Input playback finished after {} frames", playback.position());
                self.playback = None;
            }
        }
    }

    /// End a frame: record the polled byte and flush touch edges
    pub fn end_frame(&mut self) {
        if let Some(recorder) = &mut self.recorder {
            recorder.record(self.input.poll_state());
        }
        self.input.end_frame();
        self.frame_count += 1;
    }

    /// Frames completed since creation
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frames whose flip failed
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    /// Host signals raised by hotkeys
    pub fn signals(&self) -> &HostSignals {
        self.input.signals()
    }

    /// Mutable host signals
    pub fn signals_mut(&mut self) -> &mut HostSignals {
        self.input.signals_mut()
    }

    /// Whether debug tracing is enabled
    pub fn debug_trace(&self) -> bool {
        self.input.signals().debug_trace()
    }

    /// Whether a reload was requested this frame
    pub fn reload_requested(&self) -> bool {
        self.input.signals().reload_requested()
    }

    /// Take a pending fullscreen toggle
    pub fn take_fullscreen_toggle(&mut self) -> bool {
        self.input.signals_mut().take_fullscreen_toggle()
    }

    /// Take a pending screenshot request
    pub fn take_screenshot_request(&mut self) -> bool {
        self.input.signals_mut().take_screenshot_request()
    }

    /// Show or hide the OS cursor over the window
    ///
    /// The host hides it at startup; the console draws its own pointer.
    pub fn show_hw_mouse(&mut self, visible: bool) {
        self.input.signals_mut().request_hw_mouse(visible);
    }

    /// Take a pending cursor visibility change
    pub fn take_hw_mouse_request(&mut self) -> Option<bool> {
        self.input.signals_mut().take_hw_mouse_request()
    }

    /// The monotonic clock
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Milliseconds since the HAL was created
    pub fn time_ms(&self) -> u32 {
        self.clock.elapsed_ms()
    }

    // ========================================
    // Recording and playback
    // ========================================

    /// Start recording the polled byte of every frame
    pub fn start_recording(&mut self) {
        log::info!("Input recording started");
        self.recorder = Some(InputRecorder::new());
    }

    /// Stop recording and return the log
    pub fn stop_recording(&mut self) -> Option<InputLog> {
        let log = self.recorder.take()?.finish();
        log::info!("Input recording stopped after {} frames", log.len());
        Some(log)
    }

    /// Whether a recording is running
    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    /// Replay a log through the simulated input byte from the next frame
    pub fn start_playback(&mut self, log: InputLog) {
        log::info!("Input playback started ({} frames)", log.len());
        self.playback = Some(InputPlayback::new(log));
    }

    /// Whether a playback is running
    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }
}

impl Hal<MemorySurface> {
    /// HAL over a headless memory surface with the given window size
    pub fn headless(window_w: u32, window_h: u32) -> Result<Self> {
        Self::new(MemorySurface::new(window_w, window_h))
    }
}

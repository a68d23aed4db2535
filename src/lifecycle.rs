// Frame lifecycle - Per-frame boundaries, host signals and pacing
//
// The host loop brackets every tick with `start_frame` / `end_frame` on the
// HAL. Frame start clears one-shot signals and injected input, frame end
// flushes touch edges. This module holds the signal flags and the timing
// helpers the loop uses.

use std::time::{Duration, Instant};

/// Flags raised by hotkeys for the host loop and the VM
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSignals {
    debug_trace: bool,
    reload_requested: bool,
    fullscreen_toggle: bool,
    screenshot_request: bool,
    hw_mouse_request: Option<bool>,
}

impl HostSignals {
    /// Clear the flags that last one frame
    pub fn begin_frame(&mut self) {
        self.reload_requested = false;
    }

    /// Whether debug tracing is enabled
    pub fn debug_trace(&self) -> bool {
        self.debug_trace
    }

    /// Enable or disable debug tracing
    pub fn set_debug_trace(&mut self, enabled: bool) {
        self.debug_trace = enabled;
    }

    /// Flip debug tracing
    pub fn toggle_debug_trace(&mut self) {
        self.debug_trace = !self.debug_trace;
        log::info!(
            "Debug trace {}",
            if self.debug_trace { "enabled" } else { "disabled" }
        );
    }

    /// Whether a cartridge reload was requested this frame
    pub fn reload_requested(&self) -> bool {
        self.reload_requested
    }

    /// Request a cartridge reload, visible until the next frame start
    pub fn request_reload(&mut self) {
        self.reload_requested = true;
    }

    /// Queue a fullscreen toggle for the host window
    pub fn request_fullscreen_toggle(&mut self) {
        self.fullscreen_toggle = true;
    }

    /// Take a pending fullscreen toggle
    pub fn take_fullscreen_toggle(&mut self) -> bool {
        std::mem::take(&mut self.fullscreen_toggle)
    }

    /// Queue a screenshot
    pub fn request_screenshot(&mut self) {
        self.screenshot_request = true;
    }

    /// Take a pending screenshot request
    pub fn take_screenshot_request(&mut self) -> bool {
        std::mem::take(&mut self.screenshot_request)
    }

    /// Ask the host to show or hide the OS cursor; the last request wins
    pub fn request_hw_mouse(&mut self, visible: bool) {
        self.hw_mouse_request = Some(visible);
    }

    /// Take a pending cursor visibility change
    pub fn take_hw_mouse_request(&mut self) -> Option<bool> {
        self.hw_mouse_request.take()
    }
}

/// Fixed-rate frame pacing
#[derive(Debug, Clone)]
pub struct FramePacer {
    frame_duration: Duration,
    last_frame_time: Instant,
}

impl FramePacer {
    /// Pace frames at `fps` frames per second (at least 1)
    pub fn new(fps: u32) -> Self {
        Self {
            frame_duration: frame_duration(fps),
            last_frame_time: Instant::now(),
        }
    }

    /// Duration of one frame
    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Check if enough time has passed for the next frame
    pub fn should_run_frame(&mut self) -> bool {
        self.should_run_frame_at(Instant::now())
    }

    /// Same as `should_run_frame` with an explicit clock reading
    pub fn should_run_frame_at(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_frame_time) >= self.frame_duration {
            self.last_frame_time = now;
            true
        } else {
            false
        }
    }

    /// Instant at which the next frame becomes due
    pub fn next_frame_at(&self) -> Instant {
        self.last_frame_time + self.frame_duration
    }
}

/// Duration of one frame at `fps`
pub fn frame_duration(fps: u32) -> Duration {
    Duration::from_micros(1_000_000 / fps.max(1) as u64)
}

/// Monotonic clock for the VM's time queries
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    /// Start a clock at the current instant
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since the clock started
    pub fn elapsed_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    /// Milliseconds elapsed since an earlier `elapsed_ms` reading
    pub fn elapsed_since_ms(&self, start_ms: u32) -> u32 {
        self.elapsed_ms().wrapping_sub(start_ms)
    }

    /// High-resolution timestamp in microseconds for profiling
    pub fn profile_time_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    /// Microseconds elapsed since an earlier `profile_time_us` reading
    pub fn elapsed_profile_us(&self, start_us: u64) -> u64 {
        self.profile_time_us().saturating_sub(start_us)
    }

    /// Milliseconds elapsed since an earlier `profile_time_us` reading
    pub fn elapsed_profile_ms(&self, start_us: u64) -> u64 {
        self.elapsed_profile_us(start_us) / 1000
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_cleared_at_frame_start() {
        let mut signals = HostSignals::default();
        signals.request_reload();
        signals.toggle_debug_trace();
        assert!(signals.reload_requested());

        signals.begin_frame();
        assert!(!signals.reload_requested());
        assert!(signals.debug_trace());
    }

    #[test]
    fn test_take_flags_once() {
        let mut signals = HostSignals::default();
        signals.request_fullscreen_toggle();
        signals.request_screenshot();
        assert!(signals.take_fullscreen_toggle());
        assert!(!signals.take_fullscreen_toggle());
        assert!(signals.take_screenshot_request());
        assert!(!signals.take_screenshot_request());
    }

    #[test]
    fn test_hw_mouse_last_request_wins() {
        let mut signals = HostSignals::default();
        assert_eq!(signals.take_hw_mouse_request(), None);

        signals.request_hw_mouse(true);
        signals.request_hw_mouse(false);
        assert_eq!(signals.take_hw_mouse_request(), Some(false));
        assert_eq!(signals.take_hw_mouse_request(), None);

        // Survives the frame boundary until the host applies it
        signals.request_hw_mouse(true);
        signals.begin_frame();
        assert_eq!(signals.take_hw_mouse_request(), Some(true));
    }

    #[test]
    fn test_frame_duration() {
        assert_eq!(frame_duration(60).as_micros(), 16666);
        assert_eq!(frame_duration(0).as_micros(), 1_000_000);
    }

    #[test]
    fn test_pacer_waits_for_frame_duration() {
        let mut pacer = FramePacer::new(50);
        let start = pacer.next_frame_at() - pacer.frame_duration();

        assert!(!pacer.should_run_frame_at(start + Duration::from_millis(5)));
        assert!(pacer.should_run_frame_at(start + Duration::from_millis(20)));
        assert!(!pacer.should_run_frame_at(start + Duration::from_millis(25)));
        assert!(pacer.should_run_frame_at(start + Duration::from_millis(40)));
    }

    #[test]
    fn test_profile_time_is_monotonic() {
        let clock = Clock::new();
        let start = clock.profile_time_us();
        std::thread::sleep(Duration::from_millis(2));
        assert!(clock.elapsed_profile_us(start) >= 2000);
        assert!(clock.elapsed_profile_ms(start) >= 2);
        assert_eq!(clock.elapsed_profile_us(u64::MAX), 0);
    }

    #[test]
    fn test_clock_elapsed_wraps() {
        let clock = Clock::new();
        assert!(clock.elapsed_since_ms(u32::MAX) < 1000);
    }
}

// Common test utilities for HAL integration tests
//
// Builds headless HALs over a memory surface, plus short-hands for the raw
// events the tests feed in.

#![allow(dead_code)]

use fantasy_hal::input::Modifiers;
use fantasy_hal::{Hal, HalConfig, MemorySurface, RawEvent};
use std::path::PathBuf;
use winit::keyboard::KeyCode;

/// Window sizes covering square, landscape, portrait and odd shapes
pub const WINDOWS: [(u32, u32); 8] = [
    (128, 128),
    (512, 512),
    (800, 600),
    (600, 800),
    (1920, 1080),
    (1366, 768),
    (333, 777),
    (1000, 101),
];

/// Logical screen sizes within the backbuffer capacity
pub const LOGICAL: [(usize, usize); 5] = [(128, 128), (160, 144), (256, 240), (64, 32), (1, 256)];

/// Headless HAL with default configuration
pub fn headless(window_w: u32, window_h: u32) -> Hal<MemorySurface> {
    Hal::headless(window_w, window_h).expect("default HAL")
}

/// Headless HAL built from TOML configuration text
pub fn headless_with(toml: &str, window_w: u32, window_h: u32) -> Hal<MemorySurface> {
    let config = HalConfig::from_toml(toml).expect("valid test config");
    Hal::from_config(&config, MemorySurface::new(window_w, window_h)).expect("HAL")
}

/// Key press without modifiers
pub fn key_down(key: KeyCode) -> RawEvent {
    RawEvent::KeyDown {
        key,
        modifiers: Modifiers::NONE,
    }
}

/// Key press with Ctrl held
pub fn ctrl_key_down(key: KeyCode) -> RawEvent {
    RawEvent::KeyDown {
        key,
        modifiers: Modifiers::CTRL,
    }
}

/// Key release
pub fn key_up(key: KeyCode) -> RawEvent {
    RawEvent::KeyUp { key }
}

/// Run one frame with no console work: start, flip, end
pub fn run_frame(hal: &mut Hal<MemorySurface>) {
    hal.start_frame();
    hal.flip().expect("flip");
    hal.end_frame();
}

/// Scratch directory under the system temp dir, unique per test process
pub fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("fantasy_hal_{}_{}", name, std::process::id()))
}

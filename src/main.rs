// Fantasy HAL - Main Entry Point
//
// Opens a window and drives a small demo console through the HAL: a
// movable cursor, the palette swatches and live pointer/touch markers.

use fantasy_hal::config::CONFIG_FILE;
use fantasy_hal::host::{run, FrameClient};
use fantasy_hal::input::MAX_TOUCHES;
use fantasy_hal::{Button, DisplaySurface, Hal, HalConfig};
use std::path::PathBuf;

/// Palettes cycled with the Confirm button
const PALETTES: [&str; 2] = ["pico8", "grayscale"];

/// Demo console
struct DemoClient {
    x: i32,
    y: i32,
    previous: u8,
    palette: usize,
    pointer: Option<(i32, i32)>,
}

impl DemoClient {
    fn new() -> Self {
        Self {
            x: 60,
            y: 60,
            previous: 0,
            palette: 0,
            pointer: None,
        }
    }
}

impl FrameClient for DemoClient {
    fn update<S: DisplaySurface>(&mut self, hal: &mut Hal<S>) {
        let state = hal.poll_state();
        let pressed = |b: Button| state & b.mask() != 0;
        let just_pressed = |b: Button| pressed(b) && self.previous & b.mask() == 0;

        let screen = hal.logical_size();
        if pressed(Button::Left) {
            self.x -= 1;
        }
        if pressed(Button::Right) {
            self.x += 1;
        }
        if pressed(Button::Up) {
            self.y -= 1;
        }
        if pressed(Button::Down) {
            self.y += 1;
        }
        self.x = self.x.clamp(0, screen.width as i32 - 8);
        self.y = self.y.clamp(0, screen.height as i32 - 8);

        if just_pressed(Button::Confirm) {
            self.palette = (self.palette + 1) % PALETTES.len();
            if let Err(e) = hal.select_palette(PALETTES[self.palette]) {
                log::warn!("{}", e);
            }
        }
        if just_pressed(Button::Action1) {
            hal.set_palette_index(8, 0xFF, 0xFF, 0x00);
        }
        if just_pressed(Button::Action2) {
            hal.restore_palette();
        }

        let mouse = hal.mouse_state();
        self.pointer = (mouse.buttons != 0).then_some((mouse.x, mouse.y));

        if hal.debug_trace() {
            log::debug!(
                "frame {} state {:08b} cursor ({}, {}) mouse ({}, {})",
                hal.frame_count(),
                state,
                self.x,
                self.y,
                mouse.x,
                mouse.y
            );
        }
        self.previous = state;
    }

    fn draw<S: DisplaySurface>(&mut self, hal: &mut Hal<S>) {
        let touches: Vec<_> = (0..MAX_TOUCHES)
            .map(|i| hal.touch_info(i))
            .filter(|slot| slot.is_pressed())
            .collect();

        let buffer = hal.backbuffer_mut();
        let (width, height) = (buffer.width(), buffer.height());
        buffer.clear(0);

        // Palette swatches along the top
        for index in 0..16usize {
            for y in 0..6 {
                for x in 0..6 {
                    let px = 2 + index * 7 + x;
                    if px < width && 2 + y < height {
                        buffer.set_pixel(px, 2 + y, index as u8);
                    }
                }
            }
        }

        let mut fill = |x0: i32, y0: i32, size: i32, index: u8| {
            for y in y0..y0 + size {
                for x in x0..x0 + size {
                    if (0..width as i32).contains(&x) && (0..height as i32).contains(&y) {
                        buffer.set_pixel(x as usize, y as usize, index);
                    }
                }
            }
        };

        fill(self.x, self.y, 8, 8);
        if let Some((x, y)) = self.pointer {
            fill(x - 1, y - 1, 3, 7);
        }
        for slot in touches {
            fill(slot.x - 2, slot.y - 2, 5, 11);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("fantasy-hal v{}", env!("CARGO_PKG_VERSION"));

    // The first argument overrides the config file path
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let config = HalConfig::load_or_default(&config_path);

    log::info!("Arrows move, Z recolors, X restores, P/Enter cycles palettes");
    log::info!("Ctrl+Q quits, Ctrl+T traces, Ctrl+R reloads config, F11 fullscreen, F6 screenshot");

    run(config, Some(config_path), DemoClient::new())
}

// Fantasy console HAL
// Palette-indexed display compositing and unified input for a retro-style
// fantasy console runtime

// Public modules
pub mod config;
pub mod display;
pub mod error;
pub mod hal;
pub mod host;
pub mod input;
pub mod lifecycle;

// Re-export main types for convenience
pub use config::{HalConfig, PaletteConfig, VideoConfig};
pub use display::{
    compute_display_rect, Backbuffer, DisplayRect, DisplaySurface, FrameCompositor,
    LockedRegion, MemorySurface, PaletteLibrary, PaletteRegistry, PaletteTable, Pixel,
    PixelFormat, Rect,
};
pub use error::{HalError, Result};
pub use hal::Hal;
pub use host::{FrameClient, HostWindow, PixelsSurface};
pub use input::{
    Button, Flow, InputAggregator, InputLog, InputState, MouseState, RawEvent, TouchPhase,
    TouchSlot, Viewport,
};
pub use lifecycle::{Clock, FramePacer, HostSignals};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_components() {
        // Test that the headless components can be instantiated
        let _palettes = PaletteLibrary::new();
        let _table = PaletteTable::new(PixelFormat::Rgba8888);
        let _compositor = FrameCompositor::default();
        let _input = InputAggregator::new();
        let _hal = Hal::headless(256, 256).unwrap();
    }
}

// Display module - Indexed framebuffer compositing and display scaling
//
// This module provides:
// - Palette table with 256 active and original entries
// - Indexed backbuffer with a resizable logical screen
// - Compositing into a locked display surface
// - Aspect-preserving letterbox mapping and its inverse
// - PNG screenshots of the logical screen

pub mod compositor;
pub mod framebuffer;
pub mod mapper;
pub mod palette;
pub mod screenshot;
pub mod surface;

pub use compositor::{composite, FrameCompositor};
pub use framebuffer::{
    Backbuffer, LogicalScreen, DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH, MAX_SCREEN_HEIGHT,
    MAX_SCREEN_WIDTH,
};
pub use mapper::{compute_display_rect, window_to_logical, DisplayRect};
pub use palette::{
    PaletteLibrary, PaletteRegistry, PaletteTable, Pixel, PixelFormat, DEFAULT_PALETTE,
    PALETTE_SIZE,
};
pub use screenshot::save_screenshot;
pub use surface::{DisplaySurface, LockedRegion, MemorySurface, Rect};

// Display surface contract
//
// The compositor writes into a surface provided by the host. A surface
// hands out an exclusive lock over a rectangular region as a
// `LockedRegion` guard; dropping the guard unlocks the surface.

use super::framebuffer::{MAX_SCREEN_HEIGHT, MAX_SCREEN_WIDTH};
use super::palette::Pixel;
use crate::error::{HalError, Result};

/// Integer rectangle in surface or window pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    /// Create a rectangle
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle anchored at the origin
    pub const fn sized(w: u32, h: u32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    /// Whether the rectangle covers no pixels
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Whether `other` lies entirely inside this rectangle
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x as i64 + other.w as i64 <= self.x as i64 + self.w as i64
            && other.y as i64 + other.h as i64 <= self.y as i64 + self.h as i64
    }
}

/// Exclusive write access to a locked surface region
///
/// Row `y` of the region starts at `y * pitch` in `pixels`. The surface is
/// unlocked when the guard is dropped, on every exit path.
pub struct LockedRegion<'a> {
    pixels: &'a mut [Pixel],
    pitch: usize,
    locked: &'a mut bool,
}

impl<'a> LockedRegion<'a> {
    /// Wrap a surface's pixel storage and lock flag
    ///
    /// `locked` is set on creation and cleared on drop. `pitch` is the row
    /// stride in pixels.
    pub fn new(pixels: &'a mut [Pixel], pitch: usize, locked: &'a mut bool) -> Self {
        *locked = true;
        Self {
            pixels,
            pitch,
            locked,
        }
    }

    /// Row stride in pixels
    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Locked pixel storage
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        self.pixels
    }

    /// One destination row of `width` pixels
    #[inline]
    pub fn row_mut(&mut self, y: usize, width: usize) -> &mut [Pixel] {
        let start = y * self.pitch;
        &mut self.pixels[start..start + width]
    }
}

impl Drop for LockedRegion<'_> {
    fn drop(&mut self) {
        *self.locked = false;
    }
}

/// Host-provided display surface
pub trait DisplaySurface {
    /// Lock `rect` of the streaming texture for exclusive writing
    ///
    /// # Errors
    /// `HalError::SurfaceLock` when exclusive access cannot be acquired.
    fn lock(&mut self, rect: Rect) -> Result<LockedRegion<'_>>;

    /// Scale the `src` region of the texture into `dst` in the window and
    /// show it
    fn present(&mut self, src: Rect, dst: Rect) -> Result<()>;

    /// Current window size in pixels
    fn window_size(&self) -> (u32, u32);
}

/// Headless surface backed by memory
///
/// The texture has the maximum logical capacity with a pitch of
/// `MAX_SCREEN_WIDTH`. Presents are recorded instead of shown, which makes
/// it usable for tests, benchmarks and headless runs.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    pixels: Vec<Pixel>,
    locked: bool,
    window: (u32, u32),
    last_present: Option<(Rect, Rect)>,
    present_count: u64,
}

impl MemorySurface {
    /// Create a surface that reports the given window size
    pub fn new(window_w: u32, window_h: u32) -> Self {
        Self {
            pixels: vec![0; MAX_SCREEN_WIDTH * MAX_SCREEN_HEIGHT],
            locked: false,
            window: (window_w, window_h),
            last_present: None,
            present_count: 0,
        }
    }

    /// Simulate a window resize
    pub fn set_window_size(&mut self, window_w: u32, window_h: u32) {
        self.window = (window_w, window_h);
    }

    /// Row stride of the texture in pixels
    pub fn pitch(&self) -> usize {
        MAX_SCREEN_WIDTH
    }

    /// Texture pixel at `(x, y)`
    pub fn pixel(&self, x: usize, y: usize) -> Pixel {
        self.pixels[y * MAX_SCREEN_WIDTH + x]
    }

    /// Whole texture
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Whether a lock guard is alive
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Source and destination of the most recent present
    pub fn last_present(&self) -> Option<(Rect, Rect)> {
        self.last_present
    }

    /// Number of successful presents
    pub fn present_count(&self) -> u64 {
        self.present_count
    }
}

impl DisplaySurface for MemorySurface {
    fn lock(&mut self, rect: Rect) -> Result<LockedRegion<'_>> {
        if self.locked {
            return Err(HalError::SurfaceLock("surface already locked".to_string()));
        }
        let texture = Rect::sized(MAX_SCREEN_WIDTH as u32, MAX_SCREEN_HEIGHT as u32);
        if !texture.contains_rect(&rect) {
            return Err(HalError::SurfaceLock(format!(
                "lock region {}x{} at ({}, {}) outside texture",
                rect.w, rect.h, rect.x, rect.y
            )));
        }
        Ok(LockedRegion::new(
            &mut self.pixels,
            MAX_SCREEN_WIDTH,
            &mut self.locked,
        ))
    }

    fn present(&mut self, src: Rect, dst: Rect) -> Result<()> {
        self.last_present = Some((src, dst));
        self.present_count += 1;
        Ok(())
    }

    fn window_size(&self) -> (u32, u32) {
        self.window
    }
}

// Backbuffer - Indexed-color pixel storage written by the console
//
// Each pixel is a palette index (0-255). Storage is allocated once at the
// maximum capacity; the logical screen size can change at runtime without
// reallocating and is independent of the window size.

use crate::error::{HalError, Result};

/// Maximum logical screen width in pixels
pub const MAX_SCREEN_WIDTH: usize = 256;

/// Maximum logical screen height in pixels
pub const MAX_SCREEN_HEIGHT: usize = 256;

/// Logical screen width used until the console resizes it
pub const DEFAULT_SCREEN_WIDTH: usize = 128;

/// Logical screen height used until the console resizes it
pub const DEFAULT_SCREEN_HEIGHT: usize = 128;

/// Backbuffer capacity in pixels
pub const MAX_SCREEN_SIZE: usize = MAX_SCREEN_WIDTH * MAX_SCREEN_HEIGHT;

/// Logical screen dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalScreen {
    pub width: usize,
    pub height: usize,
}

impl LogicalScreen {
    /// Validate and create a logical screen size
    ///
    /// # Errors
    /// `HalError::InvalidScreenSize` if either dimension is zero or exceeds
    /// the backbuffer capacity.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 || width > MAX_SCREEN_WIDTH || height > MAX_SCREEN_HEIGHT {
            return Err(HalError::InvalidScreenSize { width, height });
        }
        Ok(Self { width, height })
    }

    /// Number of pixels on the logical screen
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

impl Default for LogicalScreen {
    fn default() -> Self {
        Self {
            width: DEFAULT_SCREEN_WIDTH,
            height: DEFAULT_SCREEN_HEIGHT,
        }
    }
}

/// Indexed-color backbuffer
///
/// Pixels are stored row-major with a stride equal to the current logical
/// width, so `as_slice()` is exactly `width * height` bytes.
pub struct Backbuffer {
    /// Palette indices, allocated at maximum capacity
    pixels: Box<[u8]>,
    /// Current logical size
    screen: LogicalScreen,
}

impl Backbuffer {
    /// Create a backbuffer of the default logical size cleared to index 0
    pub fn new() -> Self {
        Self {
            pixels: vec![0u8; MAX_SCREEN_SIZE].into_boxed_slice(),
            screen: LogicalScreen::default(),
        }
    }

    /// Create a backbuffer with a specific logical size
    pub fn with_size(width: usize, height: usize) -> Result<Self> {
        let mut buffer = Self::new();
        buffer.resize(width, height)?;
        Ok(buffer)
    }

    /// Change the logical size
    ///
    /// Existing contents are kept as raw bytes; callers normally redraw the
    /// whole screen after a resize.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        self.screen = LogicalScreen::new(width, height)?;
        Ok(())
    }

    /// Current logical size
    #[inline]
    pub fn screen(&self) -> LogicalScreen {
        self.screen
    }

    /// Logical width in pixels
    #[inline]
    pub fn width(&self) -> usize {
        self.screen.width
    }

    /// Logical height in pixels
    #[inline]
    pub fn height(&self) -> usize {
        self.screen.height
    }

    /// Set a pixel at the given coordinates
    ///
    /// # Panics
    /// Panics if coordinates are outside the logical screen
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, index: u8) {
        assert!(x < self.screen.width, "X coordinate {} out of bounds", x);
        assert!(y < self.screen.height, "Y coordinate {} out of bounds", y);

        self.pixels[y * self.screen.width + x] = index;
    }

    /// Get a pixel at the given coordinates
    ///
    /// # Panics
    /// Panics if coordinates are outside the logical screen
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> u8 {
        assert!(x < self.screen.width, "X coordinate {} out of bounds", x);
        assert!(y < self.screen.height, "Y coordinate {} out of bounds", y);

        self.pixels[y * self.screen.width + x]
    }

    /// Fill the logical screen with one palette index
    pub fn clear(&mut self, index: u8) {
        let area = self.screen.area();
        self.pixels[..area].fill(index);
    }

    /// Palette indices of the logical screen
    pub fn as_slice(&self) -> &[u8] {
        &self.pixels[..self.screen.area()]
    }

    /// Mutable palette indices of the logical screen
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        let area = self.screen.area();
        &mut self.pixels[..area]
    }

    /// Copy a full logical frame from the console
    ///
    /// # Panics
    /// Panics if `frame` is not exactly `width * height` bytes
    pub fn copy_from_slice(&mut self, frame: &[u8]) {
        assert_eq!(
            frame.len(),
            self.screen.area(),
            "Frame must match the logical screen size"
        );
        self.as_mut_slice().copy_from_slice(frame);
    }
}

impl Default for Backbuffer {
    fn default() -> Self {
        Self::new()
    }
}

// Frame compositor - Converts the indexed backbuffer into display pixels
//
// The compositor locks the top-left `w x h` region of the display surface,
// writes `palette.active[index]` for every backbuffer pixel, and unlocks the
// surface before returning.

use super::framebuffer::{Backbuffer, LogicalScreen, MAX_SCREEN_HEIGHT, MAX_SCREEN_WIDTH};
use super::mapper::compute_display_rect;
use super::palette::PaletteTable;
use super::surface::{DisplaySurface, Rect};
use crate::error::Result;

/// Write `w x h` palette-indexed pixels into a locked surface region
///
/// `indexed` is row-major with stride `w`. The destination pitch may be
/// larger than `w`. Pixels are copied two per iteration with a scalar tail
/// for odd widths.
///
/// # Errors
/// `HalError::SurfaceLock` if the surface cannot be locked; nothing is
/// written in that case.
pub fn composite<S: DisplaySurface + ?Sized>(
    palette: &PaletteTable,
    indexed: &[u8],
    w: usize,
    h: usize,
    surface: &mut S,
) -> Result<()> {
    debug_assert!(w <= MAX_SCREEN_WIDTH && h <= MAX_SCREEN_HEIGHT);
    debug_assert!(indexed.len() >= w * h);

    let entries = palette.active_entries();
    let mut region = surface.lock(Rect::sized(w as u32, h as u32))?;

    for (y, src_row) in indexed.chunks_exact(w.max(1)).take(h).enumerate() {
        let dst_row = region.row_mut(y, w);

        let mut src_pairs = src_row.chunks_exact(2);
        let mut dst_pairs = dst_row.chunks_exact_mut(2);
        for (dst, src) in (&mut dst_pairs).zip(&mut src_pairs) {
            dst[0] = entries[src[0] as usize];
            dst[1] = entries[src[1] as usize];
        }
        if let (Some(dst), Some(&src)) = (
            dst_pairs.into_remainder().first_mut(),
            src_pairs.remainder().first(),
        ) {
            *dst = entries[src as usize];
        }
    }

    Ok(())
}

/// Owns the backbuffer and its logical screen size, and turns it into
/// presented frames
pub struct FrameCompositor {
    backbuffer: Backbuffer,
}

impl FrameCompositor {
    /// Create a compositor with a backbuffer of the given logical size
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Ok(Self {
            backbuffer: Backbuffer::with_size(width, height)?,
        })
    }

    /// Change the logical screen size
    pub fn set_logical_size(&mut self, width: usize, height: usize) -> Result<()> {
        self.backbuffer.resize(width, height)?;
        log::debug!("Logical screen resized to {}x{}", width, height);
        Ok(())
    }

    /// Current logical screen size
    #[inline]
    pub fn logical_size(&self) -> LogicalScreen {
        self.backbuffer.screen()
    }

    /// The indexed backbuffer
    pub fn backbuffer(&self) -> &Backbuffer {
        &self.backbuffer
    }

    /// Mutable access to the indexed backbuffer
    pub fn backbuffer_mut(&mut self) -> &mut Backbuffer {
        &mut self.backbuffer
    }

    /// Source rectangle covering the logical screen in the surface texture
    pub fn source_rect(&self) -> Rect {
        let screen = self.logical_size();
        Rect::sized(screen.width as u32, screen.height as u32)
    }

    /// Composite the backbuffer into the surface
    pub fn composite<S: DisplaySurface + ?Sized>(
        &self,
        palette: &PaletteTable,
        surface: &mut S,
    ) -> Result<()> {
        let screen = self.logical_size();
        composite(
            palette,
            self.backbuffer.as_slice(),
            screen.width,
            screen.height,
            surface,
        )
    }

    /// Composite the backbuffer and present it letterboxed in the window
    pub fn flip<S: DisplaySurface + ?Sized>(
        &self,
        palette: &PaletteTable,
        surface: &mut S,
    ) -> Result<()> {
        self.composite(palette, surface)?;

        let screen = self.logical_size();
        let (window_w, window_h) = surface.window_size();
        let display = compute_display_rect(window_w, window_h, screen.width, screen.height);
        surface.present(self.source_rect(), display.rect())
    }
}

impl Default for FrameCompositor {
    fn default() -> Self {
        Self {
            backbuffer: Backbuffer::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::palette::{PaletteLibrary, PixelFormat};
    use crate::display::surface::LockedRegion;
    use crate::error::HalError;

    /// Surface backed by a plain vector with a configurable pitch
    struct VecSurface {
        pixels: Vec<u32>,
        pitch: usize,
        locked: bool,
        fail_lock: bool,
        presented: Vec<(Rect, Rect)>,
    }

    impl VecSurface {
        fn new(pitch: usize, rows: usize) -> Self {
            Self {
                pixels: vec![0; pitch * rows],
                pitch,
                locked: false,
                fail_lock: false,
                presented: Vec::new(),
            }
        }
    }

    impl DisplaySurface for VecSurface {
        fn lock(&mut self, _rect: Rect) -> Result<LockedRegion<'_>> {
            if self.fail_lock || self.locked {
                return Err(HalError::SurfaceLock("busy".to_string()));
            }
            Ok(LockedRegion::new(
                &mut self.pixels,
                self.pitch,
                &mut self.locked,
            ))
        }

        fn present(&mut self, src: Rect, dst: Rect) -> Result<()> {
            self.presented.push((src, dst));
            Ok(())
        }

        fn window_size(&self) -> (u32, u32) {
            (400, 200)
        }
    }

    fn abcd_palette() -> PaletteTable {
        let mut palette = PaletteTable::new(PixelFormat::Rgba8888);
        palette.set_index(0, 0xA0, 0, 0);
        palette.set_index(1, 0xB0, 0, 0);
        palette.set_index(2, 0xC0, 0, 0);
        palette.set_index(3, 0xD0, 0, 0);
        palette
    }

    #[test]
    fn test_composite_honors_pitch() {
        let palette = abcd_palette();
        let mut surface = VecSurface::new(4, 2);

        composite(&palette, &[0, 1, 2, 3], 2, 2, &mut surface).unwrap();

        let (a, b, c, d) = (
            palette.active(0),
            palette.active(1),
            palette.active(2),
            palette.active(3),
        );
        assert_eq!(&surface.pixels[0..2], &[a, b]);
        assert_eq!(&surface.pixels[4..6], &[c, d]);
        assert_eq!(&surface.pixels[2..4], &[0, 0]);
        assert!(!surface.locked);
    }

    #[test]
    fn test_composite_odd_width() {
        let palette = abcd_palette();
        let mut surface = VecSurface::new(8, 2);

        composite(&palette, &[0, 1, 2, 3, 2, 1], 3, 2, &mut surface).unwrap();

        assert_eq!(surface.pixels[2], palette.active(2));
        assert_eq!(surface.pixels[3], 0);
        assert_eq!(surface.pixels[8 + 2], palette.active(1));
    }

    #[test]
    fn test_composite_lock_failure_writes_nothing() {
        let palette = abcd_palette();
        let mut surface = VecSurface::new(4, 2);
        surface.fail_lock = true;

        let err = composite(&palette, &[1, 1, 1, 1], 2, 2, &mut surface).unwrap_err();

        assert!(matches!(err, HalError::SurfaceLock(_)));
        assert!(surface.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_palette_changes_visible_next_composite() {
        let mut palette = abcd_palette();
        let mut surface = VecSurface::new(2, 1);

        composite(&palette, &[0, 0], 2, 1, &mut surface).unwrap();
        palette.set_index(0, 1, 2, 3);
        composite(&palette, &[0, 0], 2, 1, &mut surface).unwrap();

        assert_eq!(surface.pixels[0], PixelFormat::Rgba8888.map_rgb(1, 2, 3));
    }

    #[test]
    fn test_flip_presents_letterboxed_rect() {
        let mut palette = PaletteTable::new(PixelFormat::Rgba8888);
        palette
            .select_palette(&PaletteLibrary::new(), "pico8")
            .unwrap();
        let compositor = FrameCompositor::new(100, 100).unwrap();
        let mut surface = VecSurface::new(256, 256);

        compositor.flip(&palette, &mut surface).unwrap();

        assert_eq!(
            surface.presented,
            vec![(Rect::sized(100, 100), Rect::new(100, 0, 200, 200))]
        );
    }

    #[test]
    fn test_set_logical_size() {
        let mut compositor = FrameCompositor::default();
        compositor.set_logical_size(64, 32).unwrap();
        assert_eq!(compositor.source_rect(), Rect::sized(64, 32));
        assert!(compositor.set_logical_size(1024, 32).is_err());
        assert_eq!(compositor.logical_size().width, 64);
    }
}

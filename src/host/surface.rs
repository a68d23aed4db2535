// Pixels-backed display surface
//
// The composited logical screen lives in a staging texture of maximum
// capacity. Presenting scales the source region nearest-neighbour into the
// destination rectangle of a window-sized pixel buffer, clears the
// letterbox bars to black and hands the buffer to `pixels` for rendering.

use crate::display::framebuffer::{MAX_SCREEN_HEIGHT, MAX_SCREEN_WIDTH};
use crate::display::palette::{Pixel, PixelFormat};
use crate::display::surface::{DisplaySurface, LockedRegion, Rect};
use crate::error::{HalError, Result};
use pixels::{Pixels, PixelsBuilder, SurfaceTexture};
use std::sync::Arc;
use winit::window::Window;

const LETTERBOX: [u8; 4] = [0x00, 0x00, 0x00, 0xFF];

/// Display surface drawing into a winit window through `pixels`
pub struct PixelsSurface {
    pixels: Pixels<'static>,
    format: PixelFormat,
    staging: Vec<Pixel>,
    locked: bool,
    window_size: (u32, u32),
}

impl PixelsSurface {
    /// Create a surface covering the window's physical size
    ///
    /// # Errors
    /// `HalError::ResourceInit` if the GPU surface cannot be created.
    pub fn new(window: Arc<Window>, format: PixelFormat, vsync: bool) -> Result<Self> {
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));
        let surface_texture = SurfaceTexture::new(width, height, window);

        let pixels = PixelsBuilder::new(width, height, surface_texture)
            .enable_vsync(vsync)
            .build()
            .map_err(|e| HalError::ResourceInit(format!("pixel buffer: {}", e)))?;

        Ok(Self {
            pixels,
            format,
            staging: vec![0; MAX_SCREEN_WIDTH * MAX_SCREEN_HEIGHT],
            locked: false,
            window_size: (size.width, size.height),
        })
    }

    /// Follow a window resize
    ///
    /// A minimized (zero-sized) window keeps the old buffers; presents are
    /// skipped until it has a size again.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.window_size = (width, height);
        if width == 0 || height == 0 {
            return Ok(());
        }

        self.pixels
            .resize_surface(width, height)
            .map_err(|e| HalError::ResourceInit(format!("surface resize: {}", e)))?;
        self.pixels
            .resize_buffer(width, height)
            .map_err(|e| HalError::ResourceInit(format!("buffer resize: {}", e)))?;
        log::debug!("Surface resized to {}x{}", width, height);
        Ok(())
    }
}

impl DisplaySurface for PixelsSurface {
    fn lock(&mut self, rect: Rect) -> Result<LockedRegion<'_>> {
        if self.locked {
            return Err(HalError::SurfaceLock("staging texture already locked".to_string()));
        }
        let texture = Rect::sized(MAX_SCREEN_WIDTH as u32, MAX_SCREEN_HEIGHT as u32);
        if !texture.contains_rect(&rect) {
            return Err(HalError::SurfaceLock(format!(
                "region {}x{} exceeds the staging texture",
                rect.w, rect.h
            )));
        }
        Ok(LockedRegion::new(
            &mut self.staging,
            MAX_SCREEN_WIDTH,
            &mut self.locked,
        ))
    }

    fn present(&mut self, src: Rect, dst: Rect) -> Result<()> {
        let (width, height) = self.window_size;
        if width == 0 || height == 0 {
            return Ok(());
        }

        blit_scaled(
            &self.staging,
            MAX_SCREEN_WIDTH,
            self.format,
            src,
            dst,
            self.pixels.frame_mut(),
            width as usize,
            height as usize,
        );

        self.pixels
            .render()
            .map_err(|e| HalError::Present(e.to_string()))
    }

    fn window_size(&self) -> (u32, u32) {
        self.window_size
    }
}

/// Scale `src` of the staging texture into `dst` of an RGBA frame
///
/// Everything outside `dst` is cleared to black. `dst` is clipped to the
/// frame.
#[allow(clippy::too_many_arguments)]
pub fn blit_scaled(
    staging: &[Pixel],
    pitch: usize,
    format: PixelFormat,
    src: Rect,
    dst: Rect,
    frame: &mut [u8],
    frame_w: usize,
    frame_h: usize,
) {
    for px in frame.chunks_exact_mut(4) {
        px.copy_from_slice(&LETTERBOX);
    }
    if src.is_empty() || dst.is_empty() {
        return;
    }

    let x0 = dst.x.max(0) as usize;
    let y0 = dst.y.max(0) as usize;
    let x1 = ((dst.x as i64 + dst.w as i64).max(0) as usize).min(frame_w);
    let y1 = ((dst.y as i64 + dst.h as i64).max(0) as usize).min(frame_h);

    for fy in y0..y1 {
        let dy = (fy as i64 - dst.y as i64) as usize;
        let sy = src.y as usize + dy * src.h as usize / dst.h as usize;
        let src_row = &staging[sy * pitch..];
        let dst_row = &mut frame[(fy * frame_w + x0) * 4..(fy * frame_w + x1) * 4];

        for (i, px) in dst_row.chunks_exact_mut(4).enumerate() {
            let dx = (x0 + i) as i64 - dst.x as i64;
            let sx = src.x as usize + dx as usize * src.w as usize / dst.w as usize;
            px.copy_from_slice(&format.to_rgba(src_row[sx]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blit_scales_and_letterboxes() {
        let format = PixelFormat::Rgba8888;
        let red = format.map_rgb(0xFF, 0, 0);
        let blue = format.map_rgb(0, 0, 0xFF);

        // 2x1 source texture with pitch 4
        let staging = vec![red, blue, 0, 0];
        let mut frame = vec![0xAAu8; 6 * 2 * 4];

        blit_scaled(
            &staging,
            4,
            format,
            Rect::sized(2, 1),
            Rect::new(1, 0, 4, 2),
            &mut frame,
            6,
            2,
        );

        let pixel = |x: usize, y: usize| &frame[(y * 6 + x) * 4..(y * 6 + x) * 4 + 4];
        assert_eq!(pixel(0, 0), &LETTERBOX);
        assert_eq!(pixel(1, 0), &[0xFF, 0, 0, 0xFF]);
        assert_eq!(pixel(2, 1), &[0xFF, 0, 0, 0xFF]);
        assert_eq!(pixel(3, 0), &[0, 0, 0xFF, 0xFF]);
        assert_eq!(pixel(4, 1), &[0, 0, 0xFF, 0xFF]);
        assert_eq!(pixel(5, 1), &LETTERBOX);
    }

    #[test]
    fn test_blit_clips_to_frame() {
        let format = PixelFormat::Rgb565;
        let white = format.map_rgb(0xFF, 0xFF, 0xFF);
        let staging = vec![white; 4];
        let mut frame = vec![0u8; 2 * 2 * 4];

        blit_scaled(
            &staging,
            2,
            format,
            Rect::sized(2, 2),
            Rect::new(-1, -1, 8, 8),
            &mut frame,
            2,
            2,
        );

        assert!(frame.chunks_exact(4).all(|px| px == [0xFF, 0xFF, 0xFF, 0xFF]));
    }

    #[test]
    fn test_blit_empty_destination_clears() {
        let mut frame = vec![7u8; 4 * 4];
        blit_scaled(
            &[0; 1],
            1,
            PixelFormat::Rgba8888,
            Rect::sized(1, 1),
            Rect::default(),
            &mut frame,
            2,
            2,
        );
        assert!(frame.chunks_exact(4).all(|px| px == LETTERBOX));
    }
}

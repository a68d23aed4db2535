// Display mapper - Aspect-correct placement of the logical screen in the window
//
// The logical screen is scaled uniformly to the largest size that fits the
// window and centered on the letterboxed axis. The inverse mapping turns
// window coordinates from pointer devices back into logical coordinates.
// Nothing is cached: the window may be resized between any two calls.

use super::surface::Rect;

/// Destination of the logical screen inside the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
    /// Uniform logical-to-window scale factor
    pub scale: f64,
}

impl DisplayRect {
    /// Destination rectangle without the scale
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Map window coordinates to logical coordinates
    ///
    /// Coordinates outside the displayed area map outside the logical
    /// screen (possibly negative). Results truncate toward zero.
    pub fn window_to_logical(&self, wx: i32, wy: i32) -> (i32, i32) {
        if self.scale <= 0.0 {
            return (0, 0);
        }
        let lx = (wx - self.x) as f64 / self.scale;
        let ly = (wy - self.y) as f64 / self.scale;
        (lx as i32, ly as i32)
    }

    /// Map a logical pixel to the window pixel at its center
    pub fn logical_to_window(&self, lx: i32, ly: i32) -> (i32, i32) {
        let wx = ((lx as f64 + 0.5) * self.scale).floor() as i32;
        let wy = ((ly as f64 + 0.5) * self.scale).floor() as i32;
        (self.x + wx, self.y + wy)
    }

    /// Whether a window coordinate falls on the displayed screen
    pub fn contains(&self, wx: i32, wy: i32) -> bool {
        wx >= self.x
            && wy >= self.y
            && (wx as i64) < self.x as i64 + self.w as i64
            && (wy as i64) < self.y as i64 + self.h as i64
    }
}

/// Compute where a `logical_w x logical_h` screen is drawn in the window
///
/// If scaling to the window width would overflow the window height, the
/// height binds and the screen is centered horizontally; otherwise the
/// width binds and it is centered vertically.
pub fn compute_display_rect(
    window_w: u32,
    window_h: u32,
    logical_w: usize,
    logical_h: usize,
) -> DisplayRect {
    if window_w == 0 || window_h == 0 || logical_w == 0 || logical_h == 0 {
        return DisplayRect {
            x: 0,
            y: 0,
            w: 0,
            h: 0,
            scale: 0.0,
        };
    }

    let xscale = window_w as f64 / logical_w as f64;
    let yscale = window_h as f64 / logical_h as f64;

    if xscale * logical_h as f64 > window_h as f64 {
        let w = ((yscale * logical_w as f64).round() as u32).min(window_w);
        DisplayRect {
            x: ((window_w - w) / 2) as i32,
            y: 0,
            w,
            h: window_h,
            scale: yscale,
        }
    } else {
        let h = ((xscale * logical_h as f64).round() as u32).min(window_h);
        DisplayRect {
            x: 0,
            y: ((window_h - h) / 2) as i32,
            w: window_w,
            h,
            scale: xscale,
        }
    }
}

/// Map window coordinates to logical coordinates for the current window
pub fn window_to_logical(
    window_size: (u32, u32),
    logical_size: (usize, usize),
    wx: i32,
    wy: i32,
) -> (i32, i32) {
    compute_display_rect(window_size.0, window_size.1, logical_size.0, logical_size.1)
        .window_to_logical(wx, wy)
}

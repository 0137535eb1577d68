use crate::foundation::error::{FlipError, FlipResult};

/// Grayscale sample value used for blank frames.
pub const WHITE: u8 = 255;

/// Fixed raster dimensions for every frame of an installation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Build a canvas, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> FlipResult<Self> {
        if width == 0 || height == 0 {
            return Err(FlipError::validation("canvas width/height must be non-zero"));
        }
        Ok(Self { width, height })
    }

    /// Number of samples in one frame (`width * height`).
    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major sample index for an in-bounds coordinate.
    pub fn index_of(self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Whether a signed coordinate lies inside the canvas.
    pub fn contains(self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as i64) < i64::from(self.width) && (y as i64) < i64::from(self.height)
    }
}

/// An integer pixel coordinate.
///
/// Points handed to the rasterizer are expected to be clamped into the canvas; use
/// [`Point::clamped`] or [`Point::from_view`] at the input boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Point {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Point {
    /// Build a point without clamping.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Clamp into `[0, width) x [0, height)`.
    pub fn clamped(self, canvas: Canvas) -> Self {
        let max_x = canvas.width.saturating_sub(1).min(i32::MAX as u32) as i32;
        let max_y = canvas.height.saturating_sub(1).min(i32::MAX as u32) as i32;
        Self {
            x: self.x.clamp(0, max_x),
            y: self.y.clamp(0, max_y),
        }
    }

    /// Map a position inside a displayed view of `view_w x view_h` units to a clamped pixel.
    ///
    /// Non-finite input and degenerate views map to the origin.
    pub fn from_view(vx: f64, vy: f64, view_w: f64, view_h: f64, canvas: Canvas) -> Self {
        let scale = |v: f64, view: f64, size: u32| -> i32 {
            if !v.is_finite() || !view.is_finite() || view <= 0.0 {
                return 0;
            }
            let p = (v * f64::from(size) / view).floor();
            p.clamp(0.0, f64::from(size.saturating_sub(1))) as i32
        };
        Self {
            x: scale(vx, view_w, canvas.width),
            y: scale(vy, view_h, canvas.height),
        }
    }
}

/// Half-open frame range `[start, end)` into a frame sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// First frame (inclusive).
    pub start: usize,
    /// One past the last frame (exclusive).
    pub end: usize,
}

impl FrameRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: usize, end: usize) -> FlipResult<Self> {
        if start > end {
            return Err(FlipError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// The full range `[0, len)`.
    pub fn full(len: usize) -> Self {
        Self { start: 0, end: len }
    }

    /// Number of frames covered; zero for inverted ranges.
    pub fn len_frames(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the range covers no frames.
    pub fn is_empty(self) -> bool {
        self.len_frames() == 0
    }

    /// Whether `f` lies in `[start, end)`.
    pub fn contains(self, f: usize) -> bool {
        self.start <= f && f < self.end
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

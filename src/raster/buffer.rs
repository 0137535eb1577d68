use crate::foundation::core::{Canvas, WHITE};
use crate::foundation::error::{FlipError, FlipResult};

/// One frame: a fixed-size grayscale raster (0 = black, 255 = white).
///
/// The sample vector always holds exactly `width * height` bytes; there is no way to
/// resize a buffer after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    canvas: Canvas,
    data: Vec<u8>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.canvas.width)
            .field("height", &self.canvas.height)
            .finish_non_exhaustive()
    }
}

impl PixelBuffer {
    /// A blank (all white) frame.
    pub fn blank(canvas: Canvas) -> Self {
        Self::filled(canvas, WHITE)
    }

    /// A frame with every sample set to `value`.
    pub fn filled(canvas: Canvas, value: u8) -> Self {
        Self {
            canvas,
            data: vec![value; canvas.pixel_count()],
        }
    }

    /// Wrap existing samples, rejecting a length other than `width * height`.
    pub fn from_samples(canvas: Canvas, data: Vec<u8>) -> FlipResult<Self> {
        if data.len() != canvas.pixel_count() {
            return Err(FlipError::validation(format!(
                "frame has invalid length ({}); expected {}",
                data.len(),
                canvas.pixel_count()
            )));
        }
        Ok(Self { canvas, data })
    }

    /// Frame dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    /// Row-major samples.
    pub fn samples(&self) -> &[u8] {
        &self.data
    }

    /// Sample at an in-bounds coordinate, `None` outside the canvas.
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        if !self.canvas.contains(x, y) {
            return None;
        }
        Some(self.data[self.canvas.index_of(x as u32, y as u32)])
    }

    /// Sample at a flat index.
    pub fn at(&self, idx: usize) -> u8 {
        self.data[idx]
    }

    /// Overwrite the sample at a flat index.
    pub fn set_at(&mut self, idx: usize, value: u8) {
        self.data[idx] = value;
    }

    /// Overwrite every sample with `value`.
    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// Copy all samples from another buffer of the same dimensions.
    pub fn copy_from(&mut self, other: &PixelBuffer) -> FlipResult<()> {
        if other.canvas != self.canvas {
            return Err(FlipError::validation(format!(
                "cannot copy {}x{} frame into {}x{} frame",
                other.canvas.width, other.canvas.height, self.canvas.width, self.canvas.height
            )));
        }
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Whether every sample is white.
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&v| v == WHITE)
    }

    /// Consume into the raw samples.
    pub fn into_samples(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/buffer.rs"]
mod tests;

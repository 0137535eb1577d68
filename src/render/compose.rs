use crate::foundation::core::WHITE;
use crate::foundation::error::{FlipError, FlipResult};
use crate::raster::buffer::PixelBuffer;

/// Ghost samples at or above this value count as paper, not ink.
pub const GHOST_INK_THRESHOLD: u8 = 250;

/// A composed frame as straight, opaque RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Expand grayscale samples to `(v, v, v, 255)`.
    pub fn from_gray(buf: &PixelBuffer) -> Self {
        let mut data = Vec::with_capacity(buf.samples().len() * 4);
        for &v in buf.samples() {
            data.extend_from_slice(&[v, v, v, 255]);
        }
        Self {
            width: buf.width(),
            height: buf.height(),
            data,
        }
    }

    /// Nearest-neighbour upscale to `out_w x out_h`.
    pub fn scaled(&self, out_w: u32, out_h: u32) -> Self {
        Self {
            width: out_w,
            height: out_h,
            data: scale_nearest(&self.data, 4, self.width, self.height, out_w, out_h),
        }
    }
}

/// Gray level of the onion ghost `d` frames back: `clamp(110 + (d - 1) * 30, 110, 235)`.
///
/// Closer ghosts are darker.
pub fn ghost_gray_for_distance(d: usize) -> u8 {
    let g = 110usize.saturating_add(d.saturating_sub(1).saturating_mul(30));
    g.clamp(110, 235) as u8
}

fn frame_at(buffers: &[PixelBuffer], index: usize) -> FlipResult<&PixelBuffer> {
    buffers.get(index).ok_or_else(|| {
        FlipError::validation(format!(
            "frame index {index} out of range (len {})",
            buffers.len()
        ))
    })
}

/// Grayscale onion-skin composite of frame `index` over up to `depth` preceding frames.
///
/// Starts from white; every ghost sample darker than [`GHOST_INK_THRESHOLD`] darkens the
/// canvas to its ghost gray (darkest wins across layers), then the active frame is laid
/// over by per-pixel minimum so its own strokes always stay fully visible.
pub fn onion_skin_gray(
    buffers: &[PixelBuffer],
    index: usize,
    depth: usize,
) -> FlipResult<PixelBuffer> {
    let cur = frame_at(buffers, index)?;
    let mut base = PixelBuffer::filled(cur.canvas(), WHITE);

    for d in 1..=depth.min(index) {
        let ghost = &buffers[index - d];
        if ghost.canvas() != cur.canvas() {
            return Err(FlipError::validation(format!(
                "onion frame {} does not match frame {index} dimensions",
                index - d
            )));
        }
        let g = ghost_gray_for_distance(d);
        for (p, &v) in ghost.samples().iter().enumerate() {
            if v < GHOST_INK_THRESHOLD && g < base.at(p) {
                base.set_at(p, g);
            }
        }
    }

    for (p, &v) in cur.samples().iter().enumerate() {
        if v < base.at(p) {
            base.set_at(p, v);
        }
    }
    Ok(base)
}

/// RGBA preview of frame `index` with onion skin; see [`onion_skin_gray`].
pub fn compose_with_onion_skin(
    buffers: &[PixelBuffer],
    index: usize,
    depth: usize,
) -> FlipResult<FrameRGBA> {
    onion_skin_gray(buffers, index, depth).map(|g| FrameRGBA::from_gray(&g))
}

/// RGBA image of frame `index` alone, as used for playback and export.
pub fn compose_frame_only(buffers: &[PixelBuffer], index: usize) -> FlipResult<FrameRGBA> {
    frame_at(buffers, index).map(FrameRGBA::from_gray)
}

/// Nearest-neighbour resample of a packed image with `channels` bytes per pixel.
pub fn scale_nearest(
    src: &[u8],
    channels: usize,
    src_w: u32,
    src_h: u32,
    out_w: u32,
    out_h: u32,
) -> Vec<u8> {
    let (sw, sh) = (src_w as usize, src_h as usize);
    let (ow, oh) = (out_w as usize, out_h as usize);
    if sw == 0 || sh == 0 || ow == 0 || oh == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(ow * oh * channels);
    for oy in 0..oh {
        let sy = oy * sh / oh;
        for ox in 0..ow {
            let sx = ox * sw / ow;
            let at = (sy * sw + sx) * channels;
            out.extend_from_slice(&src[at..at + channels]);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;

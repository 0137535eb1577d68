use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context as _;
use rayon::prelude::*;

use crate::foundation::config::EditorConfig;
use crate::foundation::error::{FlipError, FlipResult};
use crate::project::file::ensure_parent_dir;
use crate::raster::buffer::PixelBuffer;
use crate::render::compose::compose_frame_only;

/// Per-frame delay in GIF centiseconds: `round(100 / fps)`, at least 1.
pub fn gif_delay_cs(fps: u32) -> u16 {
    let fps = fps.max(1);
    (((100.0 / f64::from(fps)).round()) as u16).max(1)
}

/// 256-entry gray ramp; palette index `g` is `(g, g, g)`.
fn gray_palette() -> Vec<u8> {
    (0..=255u8).flat_map(|g| [g, g, g]).collect()
}

/// Compose every frame (no onion skin) and upscale it to `display x display`.
///
/// Returns one palette-index buffer per frame; for a grayscale image the index is the sample.
fn compose_indexed(frames: &[PixelBuffer], display: u32) -> FlipResult<Vec<Vec<u8>>> {
    (0..frames.len())
        .into_par_iter()
        .map(|i| -> FlipResult<Vec<u8>> {
            let rgba = compose_frame_only(frames, i)?.scaled(display, display);
            Ok(rgba.data.chunks_exact(4).map(|px| px[0]).collect())
        })
        .collect()
}

/// Encode `frames` as an infinitely looping animated GIF and hand back the writer.
///
/// Frames are composed in parallel, then written in order with a delay of
/// [`gif_delay_cs`]`(cfg.fps)`.
#[tracing::instrument(skip_all, fields(frames = frames.len(), display = cfg.display))]
pub fn encode_gif<W: Write>(frames: &[PixelBuffer], cfg: &EditorConfig, out: W) -> FlipResult<W> {
    if frames.is_empty() {
        return Err(FlipError::encode("no frames to encode"));
    }
    let side = match u16::try_from(cfg.display) {
        Ok(side) if side > 0 => side,
        _ => {
            return Err(FlipError::encode(format!(
                "display size {} is outside GIF limits",
                cfg.display
            )));
        }
    };

    let indexed = compose_indexed(frames, cfg.display)?;
    let delay = gif_delay_cs(cfg.fps);
    let palette = gray_palette();

    let mut encoder = gif::Encoder::new(out, side, side, &palette)
        .map_err(|e| FlipError::encode(format!("gif encoder init: {e}")))?;
    encoder
        .set_repeat(gif::Repeat::Infinite)
        .map_err(|e| FlipError::encode(format!("gif set repeat: {e}")))?;

    for (i, buffer) in indexed.into_iter().enumerate() {
        let frame = gif::Frame {
            width: side,
            height: side,
            delay,
            buffer: Cow::Owned(buffer),
            ..Default::default()
        };
        encoder
            .write_frame(&frame)
            .map_err(|e| FlipError::encode(format!("gif frame {i}: {e}")))?;
    }
    let mut out = encoder
        .into_inner()
        .map_err(|e| FlipError::encode(format!("gif trailer: {e}")))?;
    out.flush()
        .map_err(|e| FlipError::encode(format!("gif flush: {e}")))?;
    tracing::debug!(delay_cs = delay, "gif frames written");
    Ok(out)
}

/// Encode `frames` to a GIF file at `path`, creating parent directories.
pub fn write_gif(path: &Path, frames: &[PixelBuffer], cfg: &EditorConfig) -> FlipResult<()> {
    ensure_parent_dir(path)?;
    let file = File::create(path).with_context(|| format!("create gif '{}'", path.display()))?;
    encode_gif(frames, cfg, BufWriter::new(file))?;
    tracing::info!(path = %path.display(), frames = frames.len(), "exported gif");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/export/gif.rs"]
mod tests;

use std::path::Path;

use anyhow::Context as _;
use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::foundation::config::EditorConfig;
use crate::foundation::core::Canvas;
use crate::foundation::error::{FlipError, FlipResult};
use crate::raster::buffer::PixelBuffer;

/// Schema version written into every saved project.
pub const PROJECT_VERSION: &str = "1.3";

/// Standard base64 alphabet; padding optional on decode, always written on encode.
pub(crate) const FRAME_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Persisted project file.
///
/// Each entry of `frames` is base64 of exactly `width * height` grayscale bytes.
pub struct ProjectData {
    /// Schema version, e.g. `"1.3"`.
    #[serde(default)]
    pub version: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Playback frame rate.
    #[serde(default)]
    pub fps: u32,
    /// Declared frame count; zero means "use `frames.len()`".
    #[serde(default)]
    pub frame_count: usize,
    /// RFC 3339 save time.
    #[serde(default)]
    pub timestamp: String,
    /// Base64-encoded frames.
    pub frames: Vec<String>,
}

impl ProjectData {
    /// Snapshot `frames` into a project stamped with the current time.
    pub fn from_frames(frames: &[PixelBuffer], canvas: Canvas, fps: u32) -> Self {
        Self::from_encoded(frames.iter().map(encode_frame).collect(), canvas, fps)
    }

    /// Wrap already-encoded frames into a project stamped with the current time.
    pub fn from_encoded(frames: Vec<String>, canvas: Canvas, fps: u32) -> Self {
        Self {
            version: PROJECT_VERSION.to_string(),
            width: canvas.width,
            height: canvas.height,
            fps,
            frame_count: frames.len(),
            timestamp: now_timestamp(),
            frames,
        }
    }

    /// Project dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Declared frame count, falling back to the number of stored frames.
    pub fn declared_frames(&self) -> usize {
        if self.frame_count > 0 {
            self.frame_count
        } else {
            self.frames.len()
        }
    }

    /// Parse project JSON.
    pub fn from_json_str(text: &str) -> FlipResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| FlipError::serde(format!("invalid project file format: {e}")))
    }

    /// Read and parse a project file.
    pub fn read_from_path(path: &Path) -> FlipResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read project '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> FlipResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| FlipError::serde(e.to_string()))
    }

    /// Write pretty-printed JSON, creating parent directories.
    pub fn write_to_path(&self, path: &Path) -> FlipResult<()> {
        let json = self.to_json_pretty()?;
        ensure_parent_dir(path)?;
        std::fs::write(path, json)
            .with_context(|| format!("write project '{}'", path.display()))?;
        tracing::info!(path = %path.display(), frames = self.frames.len(), "saved project");
        Ok(())
    }
}

/// Base64 of a frame's raw samples.
pub fn encode_frame(buf: &PixelBuffer) -> String {
    FRAME_B64.encode(buf.samples())
}

/// Decode one base64 frame, requiring exactly `width * height` bytes.
pub fn decode_frame(b64: &str, canvas: Canvas) -> FlipResult<PixelBuffer> {
    let bytes = decode_bytes(b64, canvas).map_err(FlipError::validation)?;
    PixelBuffer::from_samples(canvas, bytes)
}

fn decode_bytes(b64: &str, canvas: Canvas) -> Result<Vec<u8>, String> {
    let bytes = FRAME_B64
        .decode(b64)
        .map_err(|e| format!("invalid base64 ({e})"))?;
    if bytes.len() != canvas.pixel_count() {
        return Err(format!(
            "invalid length ({}); expected {}",
            bytes.len(),
            canvas.pixel_count()
        ));
    }
    Ok(bytes)
}

/// Decode a project into frames for an installation.
///
/// Rejects mismatched dimensions. The frame count is the declared count (or
/// `frames.len()`, or 1) clamped to `1..=max_frames`; missing trailing frames are blank,
/// while any present frame that fails to decode to the right length fails the whole load.
#[tracing::instrument(skip_all, fields(frames = project.frames.len()))]
pub fn load_frames(project: &ProjectData, cfg: &EditorConfig) -> FlipResult<Vec<PixelBuffer>> {
    let canvas = cfg.canvas();
    if project.canvas() != canvas {
        return Err(FlipError::validation(format!(
            "project dimensions ({}x{}) don't match canvas ({}x{})",
            project.width, project.height, canvas.width, canvas.height
        )));
    }

    let count = project.declared_frames().clamp(1, cfg.max_frames.max(1));
    let mut frames = Vec::with_capacity(count);
    for i in 0..count {
        let frame = match project.frames.get(i) {
            Some(b64) => {
                let bytes = decode_bytes(b64, canvas)
                    .map_err(|e| FlipError::validation(format!("frame {} has {e}", i + 1)))?;
                PixelBuffer::from_samples(canvas, bytes)?
            }
            None => PixelBuffer::blank(canvas),
        };
        frames.push(frame);
    }
    tracing::debug!(count, "decoded project frames");
    Ok(frames)
}

/// Current UTC time as RFC 3339.
pub fn now_timestamp() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> FlipResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/project/file.rs"]
mod tests;

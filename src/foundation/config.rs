use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Canvas;
use crate::foundation::error::{FlipError, FlipResult};

/// Installation-wide constants for an editor.
///
/// All projects loaded into an editor must match `width`/`height`. Fields missing from a
/// JSON config fall back to [`EditorConfig::default`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Side length of the upscaled display / GIF export square.
    pub display: u32,
    /// Playback and export frame rate.
    pub fps: u32,
    /// Maximum number of frames in a project.
    pub max_frames: usize,
    /// Maximum undo entries kept per frame.
    pub undo_limit: usize,
    /// Frame count of a new project.
    pub initial_frames: usize,
    /// Default onion skin depth.
    pub onion_depth: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            display: 512,
            fps: 12,
            max_frames: 600,
            undo_limit: 100,
            initial_frames: 12,
            onion_depth: 5,
        }
    }
}

impl EditorConfig {
    /// Read and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> FlipResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| FlipError::serde(format!("parse config '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the invariants every other component relies on.
    pub fn validate(&self) -> FlipResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FlipError::validation("config width/height must be non-zero"));
        }
        if self.display == 0 {
            return Err(FlipError::validation("config display must be non-zero"));
        }
        if self.fps == 0 {
            return Err(FlipError::validation("config fps must be non-zero"));
        }
        if self.max_frames == 0 {
            return Err(FlipError::validation("config max_frames must be > 0"));
        }
        if self.undo_limit == 0 {
            return Err(FlipError::validation("config undo_limit must be > 0"));
        }
        if self.initial_frames == 0 || self.initial_frames > self.max_frames {
            return Err(FlipError::validation(
                "config initial_frames must be in 1..=max_frames",
            ));
        }
        Ok(())
    }

    /// Frame dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Playback tick interval in whole milliseconds (`round(1000 / fps)`).
    pub fn frame_interval_ms(&self) -> u64 {
        let fps = u64::from(self.fps.max(1));
        (1000 + fps / 2) / fps
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;

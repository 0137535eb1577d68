use std::collections::BTreeMap;
use std::sync::Arc;

use crate::foundation::core::{Canvas, FrameRange};
use crate::foundation::error::{FlipResult, Refusal};
use crate::project::file::{ProjectData, decode_frame};
use crate::raster::buffer::PixelBuffer;

/// Registered project snapshots that [`ChunkSource::Reference`] chunks resolve against.
pub type ProjectLibrary = BTreeMap<String, Arc<ProjectData>>;

/// Where a chunk's frames come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkSource {
    /// A project registered in a [`ProjectLibrary`] under this key.
    Reference(String),
    /// A snapshot owned (shared) by the chunk itself.
    Embedded(Arc<ProjectData>),
}

impl ChunkSource {
    /// Resolve to a project snapshot; `None` for a dangling reference.
    pub fn resolve<'a>(&'a self, library: &'a ProjectLibrary) -> Option<&'a ProjectData> {
        match self {
            Self::Reference(key) => library.get(key).map(|p| p.as_ref()),
            Self::Embedded(project) => Some(project.as_ref()),
        }
    }
}

/// A named sub-range of frames taken from one source project.
///
/// The range changes only through [`MontageChunk::trim`] and splitting; the snapshot's
/// declared frame count is kept so the full range can be restored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MontageChunk {
    id: String,
    name: String,
    source: ChunkSource,
    original_frames: usize,
    range: FrameRange,
    trimmed: bool,
}

impl MontageChunk {
    /// A chunk covering every declared frame of `project`.
    pub fn from_project(
        id: impl Into<String>,
        name: impl Into<String>,
        project: Arc<ProjectData>,
    ) -> Self {
        let original_frames = project.declared_frames();
        Self {
            id: id.into(),
            name: name.into(),
            source: ChunkSource::Embedded(project),
            original_frames,
            range: FrameRange::full(original_frames),
            trimmed: false,
        }
    }

    /// A chunk referring to `key` in a library, covering `original_frames` frames.
    pub fn from_reference(
        id: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
        original_frames: usize,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source: ChunkSource::Reference(key.into()),
            original_frames,
            range: FrameRange::full(original_frames),
            trimmed: false,
        }
    }

    /// Unique identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the chunk.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Frame source.
    pub fn source(&self) -> &ChunkSource {
        &self.source
    }

    /// Declared frame count of the source snapshot at creation time.
    pub fn original_frames(&self) -> usize {
        self.original_frames
    }

    /// Current `[start, end)` into the source.
    pub fn range(&self) -> FrameRange {
        self.range
    }

    /// Whether the range differs from the snapshot's full range.
    pub fn is_trimmed(&self) -> bool {
        self.trimmed
    }

    /// Frames this chunk contributes to a timeline.
    pub fn len_frames(&self) -> usize {
        self.range.len_frames()
    }

    /// Narrow the range to `[start, end)` and mark the chunk trimmed.
    ///
    /// `start` is clamped to `[0, original - 1]` and `end` to `[start + 1, original]`, so the
    /// result is never inverted and never exceeds the snapshot. A zero-frame snapshot keeps
    /// the inert range `[0, 0)`.
    pub fn trim(&mut self, start: usize, end: usize) {
        let total = self.original_frames;
        self.range = if total == 0 {
            FrameRange::full(0)
        } else {
            let start = start.min(total - 1);
            let end = end.clamp(start + 1, total);
            FrameRange { start, end }
        };
        self.trimmed = true;
    }

    /// Restore `[0, frame count)` of the resolved source and clear the trimmed flag.
    pub fn reset_trim(&mut self, library: &ProjectLibrary) -> Result<(), Refusal> {
        let project = self.source.resolve(library).ok_or(Refusal::NoSource)?;
        self.original_frames = project.declared_frames();
        self.range = FrameRange::full(self.original_frames);
        self.trimmed = false;
        Ok(())
    }

    /// Cut the chunk at `local` frames into its range.
    ///
    /// `self` keeps `[start, start + local)`; the returned chunk (sharing the source) gets
    /// `[start + local, end)`. Both are marked trimmed. `local` must leave at least one frame
    /// on each side.
    pub fn split_off(&mut self, local: usize, id: impl Into<String>) -> Option<MontageChunk> {
        if local == 0 || local >= self.len_frames() {
            return None;
        }
        let cut = self.range.start + local;
        let tail = MontageChunk {
            id: id.into(),
            name: format!("{} (2)", self.name),
            source: self.source.clone(),
            original_frames: self.original_frames,
            range: FrameRange {
                start: cut,
                end: self.range.end,
            },
            trimmed: true,
        };
        self.range.end = cut;
        self.trimmed = true;
        Some(tail)
    }

    /// Decode the frame at `local` offset into the range.
    ///
    /// `Ok(None)` when the source is unresolved, `local` is outside the range, or the snapshot
    /// stores fewer frames than it declared.
    pub fn frame_at(
        &self,
        local: usize,
        library: &ProjectLibrary,
        canvas: Canvas,
    ) -> FlipResult<Option<PixelBuffer>> {
        if local >= self.len_frames() {
            return Ok(None);
        }
        let Some(project) = self.source.resolve(library) else {
            return Ok(None);
        };
        match project.frames.get(self.range.start + local) {
            Some(b64) => decode_frame(b64, canvas).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/montage/chunk.rs"]
mod tests;

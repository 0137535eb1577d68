//! Montage timeline: an ordered list of chunks addressed by one global frame index.
//!
//! Chunks never copy pixel data; frames are decoded from the source snapshot on demand and
//! flattened only on export.

use std::path::Path;
use std::sync::Arc;

use crate::foundation::config::EditorConfig;
use crate::foundation::core::Canvas;
use crate::foundation::error::{FlipError, FlipResult, Refusal};
use crate::montage::chunk::{MontageChunk, ProjectLibrary};
use crate::project::file::ProjectData;
use crate::raster::buffer::PixelBuffer;

/// A position inside a timeline: chunk index plus offset into that chunk's range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkPosition {
    /// Index into the chunk list.
    pub chunk: usize,
    /// Offset from the chunk's range start.
    pub local: usize,
}

/// Sum of chunk lengths; inverted or empty ranges contribute zero. Saturates at `usize::MAX`.
pub fn total_frames(chunks: &[MontageChunk]) -> usize {
    chunks
        .iter()
        .fold(0usize, |acc, ch| acc.saturating_add(ch.len_frames()))
}

/// Resolve a global frame index to the chunk containing it.
///
/// The source frame is `chunks[pos.chunk].range().start + pos.local`. `None` once `global`
/// reaches the total length.
pub fn locate(chunks: &[MontageChunk], global: usize) -> Option<ChunkPosition> {
    let mut before = 0usize;
    for (chunk, ch) in chunks.iter().enumerate() {
        let len = ch.len_frames();
        if global < before.saturating_add(len) {
            return Some(ChunkPosition {
                chunk,
                local: global - before,
            });
        }
        before = before.saturating_add(len);
    }
    None
}

/// Global index of `pos`; the inverse of [`locate`] for valid positions.
pub fn global_position(chunks: &[MontageChunk], pos: ChunkPosition) -> usize {
    total_frames(&chunks[..pos.chunk.min(chunks.len())]).saturating_add(pos.local)
}

/// Concatenate every chunk's `[start, end)` source frames into one project.
///
/// Frames are copied as stored (no re-encoding or resampling). Chunks whose source cannot be
/// resolved are skipped, and a range past the end of its snapshot's frame list is cut short.
#[tracing::instrument(skip_all, fields(chunks = chunks.len()))]
pub fn export_flatten(
    chunks: &[MontageChunk],
    library: &ProjectLibrary,
    cfg: &EditorConfig,
) -> ProjectData {
    let mut slices = Vec::with_capacity(chunks.len());
    for ch in chunks {
        let Some(project) = ch.source().resolve(library) else {
            tracing::warn!(chunk = ch.id(), "skipping chunk without source project");
            continue;
        };
        let range = ch.range();
        let end = range.end.min(project.frames.len());
        if range.start < end {
            slices.push(&project.frames[range.start..end]);
        }
    }
    let mut frames = Vec::with_capacity(slices.iter().map(|s| s.len()).sum());
    for slice in slices {
        frames.extend_from_slice(slice);
    }
    tracing::info!(frames = frames.len(), "flattened montage");
    ProjectData::from_encoded(frames, cfg.canvas(), cfg.fps)
}

/// Editable montage: chunks, the projects they reference, and a selection.
#[derive(Clone, Debug)]
pub struct MontageTimeline {
    canvas: Canvas,
    chunks: Vec<MontageChunk>,
    library: ProjectLibrary,
    selected: Option<usize>,
    next_id: u64,
}

impl MontageTimeline {
    /// An empty timeline accepting projects of `canvas` dimensions.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            chunks: Vec::new(),
            library: ProjectLibrary::new(),
            selected: None,
            next_id: 0,
        }
    }

    /// Chunks in timeline order.
    pub fn chunks(&self) -> &[MontageChunk] {
        &self.chunks
    }

    /// Registered projects.
    pub fn library(&self) -> &ProjectLibrary {
        &self.library
    }

    /// Selected chunk index.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Total frames across all chunks.
    pub fn total_frames(&self) -> usize {
        total_frames(&self.chunks)
    }

    fn fresh_id(&mut self) -> String {
        self.next_id += 1;
        format!("chunk-{}", self.next_id)
    }

    fn check_compatible(&self, project: &ProjectData) -> FlipResult<()> {
        if project.canvas() != self.canvas {
            return Err(FlipError::validation(format!(
                "wrong dimensions ({}x{}); expected {}x{}",
                project.width, project.height, self.canvas.width, self.canvas.height
            )));
        }
        if project.declared_frames() > project.frames.len() {
            return Err(FlipError::validation(format!(
                "frameCount ({}) exceeds stored frames ({})",
                project.frame_count,
                project.frames.len()
            )));
        }
        Ok(())
    }

    /// Append a chunk embedding `project`; returns its index.
    pub fn import_project(
        &mut self,
        name: impl Into<String>,
        project: ProjectData,
    ) -> FlipResult<usize> {
        self.check_compatible(&project)?;
        let id = self.fresh_id();
        let chunk = MontageChunk::from_project(id, name, Arc::new(project));
        tracing::debug!(chunk = chunk.id(), frames = chunk.len_frames(), "imported chunk");
        self.chunks.push(chunk);
        Ok(self.chunks.len() - 1)
    }

    /// Read a project file and import it, named after the file stem.
    pub fn import_path(&mut self, path: &Path) -> FlipResult<usize> {
        let project = ProjectData::read_from_path(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.import_project(name, project).map_err(|e| match e {
            FlipError::Validation(msg) => {
                FlipError::validation(format!("skipped '{}': {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Register `project` under `key` for reference chunks, replacing any previous entry.
    pub fn register_project(
        &mut self,
        key: impl Into<String>,
        project: ProjectData,
    ) -> FlipResult<()> {
        self.check_compatible(&project)?;
        self.library.insert(key.into(), Arc::new(project));
        Ok(())
    }

    /// Append a chunk referring to the registered project `key`; returns its index.
    pub fn add_reference(&mut self, key: &str, name: impl Into<String>) -> FlipResult<usize> {
        let frames = self
            .library
            .get(key)
            .map(|p| p.declared_frames())
            .ok_or_else(|| FlipError::validation(format!("no registered project '{key}'")))?;
        let id = self.fresh_id();
        self.chunks.push(MontageChunk::from_reference(id, name, key, frames));
        Ok(self.chunks.len() - 1)
    }

    /// Select chunk `index` (clamped), or clear the selection with `None` or when empty.
    pub fn select(&mut self, index: Option<usize>) {
        self.selected = match index {
            Some(i) if !self.chunks.is_empty() => Some(i.min(self.chunks.len() - 1)),
            _ => None,
        };
    }

    /// Remove chunk `index`.
    pub fn remove(&mut self, index: usize) -> Result<MontageChunk, Refusal> {
        let len = self.chunks.len();
        if index >= len {
            return Err(Refusal::OutOfRange { index, len });
        }
        let removed = self.chunks.remove(index);
        self.selected = match self.selected {
            _ if self.chunks.is_empty() => None,
            Some(s) if s >= self.chunks.len() => Some(self.chunks.len() - 1),
            other => other,
        };
        Ok(removed)
    }

    /// Move chunk `from` so that it ends up at index `to` (clamped). The selection follows
    /// the chunk it pointed at.
    pub fn move_chunk(&mut self, from: usize, to: usize) -> Result<(), Refusal> {
        let len = self.chunks.len();
        if from >= len {
            return Err(Refusal::OutOfRange { index: from, len });
        }
        let to = to.min(len - 1);
        if from == to {
            return Ok(());
        }
        let selected_id = self
            .selected
            .and_then(|s| self.chunks.get(s))
            .map(|c| c.id().to_string());
        let chunk = self.chunks.remove(from);
        self.chunks.insert(to, chunk);
        if let Some(id) = selected_id {
            self.selected = self.chunks.iter().position(|c| c.id() == id);
        }
        Ok(())
    }

    fn chunk_mut(&mut self, index: usize) -> Result<&mut MontageChunk, Refusal> {
        let len = self.chunks.len();
        self.chunks
            .get_mut(index)
            .ok_or(Refusal::OutOfRange { index, len })
    }

    /// Trim chunk `index` to `[start, end)` (clamped to its snapshot).
    pub fn trim(&mut self, index: usize, start: usize, end: usize) -> Result<(), Refusal> {
        self.chunk_mut(index)?.trim(start, end);
        Ok(())
    }

    /// Restore chunk `index` to its full source range.
    pub fn reset_trim(&mut self, index: usize) -> Result<(), Refusal> {
        let len = self.chunks.len();
        let chunk = self
            .chunks
            .get_mut(index)
            .ok_or(Refusal::OutOfRange { index, len })?;
        chunk.reset_trim(&self.library)
    }

    /// Split chunk `index` at `local` frames into its range; the tail is inserted right
    /// after it. Returns the tail's index.
    pub fn split(&mut self, index: usize, local: usize) -> Result<usize, Refusal> {
        let id = format!("chunk-{}", self.next_id + 1);
        let chunk = self.chunk_mut(index)?;
        let len = chunk.len_frames();
        let tail = chunk
            .split_off(local, id)
            .ok_or(Refusal::OutOfRange { index: local, len })?;
        self.next_id += 1;
        self.chunks.insert(index + 1, tail);
        if let Some(s) = self.selected
            && s > index
        {
            self.selected = Some(s + 1);
        }
        Ok(index + 1)
    }

    /// Chunk and offset holding global frame `global`.
    pub fn locate(&self, global: usize) -> Option<ChunkPosition> {
        locate(&self.chunks, global)
    }

    /// Global index of a play position.
    pub fn global_position(&self, pos: ChunkPosition) -> usize {
        global_position(&self.chunks, pos)
    }

    /// Decoded frame at global position `global`; `Ok(None)` past the end or when the
    /// owning chunk has no frame there.
    pub fn frame_at(&self, global: usize) -> FlipResult<Option<PixelBuffer>> {
        match self.locate(global) {
            Some(pos) => self.chunks[pos.chunk].frame_at(pos.local, &self.library, self.canvas),
            None => Ok(None),
        }
    }

    /// Flatten the timeline into one project stamped with `cfg`'s dimensions and fps.
    pub fn export(&self, cfg: &EditorConfig) -> ProjectData {
        export_flatten(&self.chunks, &self.library, cfg)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/montage/timeline.rs"]
mod tests;

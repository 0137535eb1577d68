use crate::foundation::config::EditorConfig;
use crate::foundation::core::Canvas;
use crate::foundation::error::{FlipError, FlipResult, Refusal};
use crate::history::delta::ChangeSet;
use crate::history::stack::History;
use crate::raster::buffer::PixelBuffer;

/// Ordered frames with index-aligned per-frame history.
///
/// `frames[i]` and `histories[i]` always describe the same frame: every structural edit
/// moves, inserts or removes both together. Structural edits, strokes and undo/redo are
/// refused while the playing flag is set.
#[derive(Clone, Debug)]
pub struct FrameStore {
    canvas: Canvas,
    max_frames: usize,
    undo_limit: usize,
    frames: Vec<PixelBuffer>,
    histories: Vec<History>,
    current: usize,
    playing: bool,
}

impl FrameStore {
    /// A store of `cfg.initial_frames` blank frames.
    pub fn new(cfg: &EditorConfig) -> Self {
        let canvas = cfg.canvas();
        let count = cfg.initial_frames.clamp(1, cfg.max_frames.max(1));
        Self {
            canvas,
            max_frames: cfg.max_frames.max(1),
            undo_limit: cfg.undo_limit,
            frames: (0..count).map(|_| PixelBuffer::blank(canvas)).collect(),
            histories: (0..count).map(|_| History::new(cfg.undo_limit)).collect(),
            current: 0,
            playing: false,
        }
    }

    /// A store holding `frames` with empty history.
    pub fn with_frames(cfg: &EditorConfig, frames: Vec<PixelBuffer>) -> FlipResult<Self> {
        let mut store = Self::new(cfg);
        store.replace_all(frames)?;
        Ok(store)
    }

    /// Frame dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Configured maximum frame count.
    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// Number of frames (always at least one).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; a store never drops its last frame.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// All frames in order.
    pub fn buffers(&self) -> &[PixelBuffer] {
        &self.frames
    }

    /// Frame at `index`.
    pub fn buffer(&self, index: usize) -> Option<&PixelBuffer> {
        self.frames.get(index)
    }

    /// History of the frame at `index`.
    pub fn history(&self, index: usize) -> Option<&History> {
        self.histories.get(index)
    }

    /// Selected frame index.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Selected frame.
    pub fn current_buffer(&self) -> &PixelBuffer {
        &self.frames[self.current]
    }

    /// Select a frame, clamping into `[0, len - 1]`.
    pub fn set_current(&mut self, index: usize) {
        self.current = index.min(self.frames.len().saturating_sub(1));
    }

    /// Whether playback currently owns the frames.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Set by the playback owner when it starts or stops.
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    fn ensure_idle(&self) -> Result<(), Refusal> {
        if self.playing {
            return Err(Refusal::Playing);
        }
        Ok(())
    }

    /// Insert a blank frame, or a copy of `source`, directly after `index`.
    ///
    /// The new frame gets empty history and becomes current. Returns its index.
    pub fn insert_after(
        &mut self,
        index: usize,
        source: Option<&PixelBuffer>,
    ) -> Result<usize, Refusal> {
        self.ensure_idle()?;
        if self.frames.len() >= self.max_frames {
            return Err(Refusal::FrameLimit {
                max: self.max_frames,
            });
        }
        let frame = match source {
            Some(src) if src.canvas() != self.canvas => return Err(Refusal::DimensionMismatch),
            Some(src) => src.clone(),
            None => PixelBuffer::blank(self.canvas),
        };

        let insert_at = index.saturating_add(1).min(self.frames.len());
        self.frames.insert(insert_at, frame);
        self.histories
            .insert(insert_at, History::new(self.undo_limit));
        self.current = insert_at;
        self.debug_check_aligned();
        tracing::debug!(insert_at, len = self.frames.len(), "insert frame");
        Ok(insert_at)
    }

    /// Insert a blank frame after the current one.
    pub fn add_blank_after_current(&mut self) -> Result<usize, Refusal> {
        self.insert_after(self.current, None)
    }

    /// Insert a copy of the current frame after it.
    pub fn duplicate_after_current(&mut self) -> Result<usize, Refusal> {
        self.ensure_idle()?;
        let source = self.frames[self.current].clone();
        self.insert_after(self.current, Some(&source))
    }

    /// Remove the current frame and its history.
    ///
    /// `confirm` receives the index about to be removed and may decline. Returns the removed
    /// index.
    pub fn delete_current(
        &mut self,
        confirm: impl FnOnce(usize) -> bool,
    ) -> Result<usize, Refusal> {
        self.ensure_idle()?;
        if self.frames.len() <= 1 {
            return Err(Refusal::LastFrame);
        }
        let removed = self.current;
        if !confirm(removed) {
            return Err(Refusal::Cancelled);
        }
        self.frames.remove(removed);
        self.histories.remove(removed);
        self.set_current(removed);
        self.debug_check_aligned();
        tracing::debug!(removed, len = self.frames.len(), "delete frame");
        Ok(removed)
    }

    /// Move the frame at `from` (with its history) so it lands before position `to`.
    ///
    /// `to` ranges over `0..=len`; moving forward lands at `to - 1` because the frame is
    /// removed first. The previously selected frame stays selected. Returns `Ok(false)` for
    /// a no-op (`from == to` or an invalid index).
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<bool, Refusal> {
        self.ensure_idle()?;
        let len = self.frames.len();
        if from == to || from >= len || to > len {
            return Ok(false);
        }

        let frame = self.frames.remove(from);
        let history = self.histories.remove(from);
        let target = if from < to { to - 1 } else { to };
        let insert_at = target.min(self.frames.len());
        self.frames.insert(insert_at, frame);
        self.histories.insert(insert_at, history);

        let cur = self.current;
        self.current = if cur == from {
            insert_at
        } else if from < insert_at && cur > from && cur <= insert_at {
            cur - 1
        } else if from > insert_at && cur >= insert_at && cur < from {
            cur + 1
        } else {
            cur
        };
        self.debug_check_aligned();
        tracing::debug!(from, to = insert_at, "reorder frame");
        Ok(true)
    }

    /// Mutable access to the current frame for painting a stroke.
    pub fn stroke_target(&mut self) -> Result<&mut PixelBuffer, Refusal> {
        self.ensure_idle()?;
        Ok(&mut self.frames[self.current])
    }

    /// Commit a finished stroke on frame `index`. Returns whether an undo entry was recorded.
    pub fn commit_stroke(&mut self, index: usize, change_set: ChangeSet) -> bool {
        match (self.frames.get(index), self.histories.get_mut(index)) {
            (Some(buf), Some(history)) => history.commit(change_set, buf),
            _ => false,
        }
    }

    /// Undo the newest stroke on the current frame.
    pub fn undo(&mut self) -> Result<(), Refusal> {
        self.ensure_idle()?;
        let i = self.current;
        if !self.histories[i].undo(&mut self.frames[i]) {
            return Err(Refusal::NothingToUndo);
        }
        tracing::debug!(frame = i, "undo");
        Ok(())
    }

    /// Redo the most recently undone stroke on the current frame.
    pub fn redo(&mut self) -> Result<(), Refusal> {
        self.ensure_idle()?;
        let i = self.current;
        if !self.histories[i].redo(&mut self.frames[i]) {
            return Err(Refusal::NothingToRedo);
        }
        tracing::debug!(frame = i, "redo");
        Ok(())
    }

    /// Replace every frame at once, dropping all history and selecting frame 0.
    ///
    /// Every frame is checked before anything is replaced; on error the store is untouched.
    pub fn replace_all(&mut self, frames: Vec<PixelBuffer>) -> FlipResult<()> {
        if frames.is_empty() {
            return Err(FlipError::validation("a project needs at least one frame"));
        }
        if frames.len() > self.max_frames {
            return Err(FlipError::validation(format!(
                "{} frames exceed the maximum of {}",
                frames.len(),
                self.max_frames
            )));
        }
        if let Some((i, f)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.canvas() != self.canvas)
        {
            return Err(FlipError::validation(format!(
                "frame {} is {}x{}; expected {}x{}",
                i + 1,
                f.width(),
                f.height(),
                self.canvas.width,
                self.canvas.height
            )));
        }

        self.histories = (0..frames.len())
            .map(|_| History::new(self.undo_limit))
            .collect();
        self.frames = frames;
        self.current = 0;
        self.debug_check_aligned();
        Ok(())
    }

    /// Reset to `count` blank frames (clamped to `1..=max_frames`).
    pub fn reset(&mut self, count: usize) {
        let count = count.clamp(1, self.max_frames);
        self.frames = (0..count).map(|_| PixelBuffer::blank(self.canvas)).collect();
        self.histories = (0..count).map(|_| History::new(self.undo_limit)).collect();
        self.current = 0;
        self.debug_check_aligned();
    }

    fn debug_check_aligned(&self) {
        debug_assert_eq!(self.frames.len(), self.histories.len());
        debug_assert!(self.current < self.frames.len());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frames/store.rs"]
mod tests;

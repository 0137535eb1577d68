use std::collections::VecDeque;

use crate::history::delta::{ChangeSet, Delta};
use crate::raster::buffer::PixelBuffer;

/// Start recording a new stroke.
pub fn begin_stroke() -> ChangeSet {
    ChangeSet::new()
}

/// Per-frame undo/redo stacks with a bounded undo depth.
///
/// Only [`History::commit`] clears the redo stack; undo and redo move deltas between the
/// two stacks without discarding either.
#[derive(Clone, Debug)]
pub struct History {
    undo: VecDeque<Delta>,
    redo: Vec<Delta>,
    limit: usize,
}

impl History {
    /// Empty history keeping at most `limit` undo entries (at least one).
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Maximum undo depth.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of undoable strokes.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of redoable strokes.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Whether [`History::undo`] would succeed.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether [`History::redo`] would succeed.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Freeze `change_set` against `buffer` and push it as the newest undo entry.
    ///
    /// An empty change set records nothing and leaves both stacks untouched. Returns whether
    /// a delta was recorded.
    pub fn commit(&mut self, change_set: ChangeSet, buffer: &PixelBuffer) -> bool {
        let Some(delta) = Delta::freeze(change_set, buffer) else {
            return false;
        };
        tracing::debug!(pixels = delta.len(), "commit stroke");
        self.push_undo(delta);
        self.redo.clear();
        true
    }

    /// Revert the newest stroke. Returns false when there is nothing to undo.
    pub fn undo(&mut self, buffer: &mut PixelBuffer) -> bool {
        let Some(delta) = self.undo.pop_back() else {
            return false;
        };
        delta.revert(buffer);
        self.redo.push(delta);
        true
    }

    /// Re-apply the most recently undone stroke. Returns false when there is nothing to redo.
    pub fn redo(&mut self, buffer: &mut PixelBuffer) -> bool {
        let Some(delta) = self.redo.pop() else {
            return false;
        };
        delta.reapply(buffer);
        self.push_undo(delta);
        true
    }

    /// Drop every recorded delta.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn push_undo(&mut self, delta: Delta) {
        self.undo.push_back(delta);
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
    }
}

/// Commit a stroke into `history`; see [`History::commit`].
pub fn commit_stroke(change_set: ChangeSet, buffer: &PixelBuffer, history: &mut History) -> bool {
    history.commit(change_set, buffer)
}

#[cfg(test)]
#[path = "../../tests/unit/history/stack.rs"]
mod tests;

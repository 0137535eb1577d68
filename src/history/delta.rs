use crate::raster::buffer::PixelBuffer;

/// Original values of every pixel touched during one in-progress stroke.
///
/// Each index is recorded at most once; the first recorded value wins. Membership is a
/// bitmap lookup, so recording is O(1) amortized regardless of brush overlap.
#[derive(Clone, Debug, Default)]
pub struct ChangeSet {
    seen: Vec<u64>,
    entries: Vec<(u32, u8)>,
}

impl ChangeSet {
    /// An empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `prior` for `idx` unless `idx` was already recorded. Returns whether it was new.
    pub fn record(&mut self, idx: usize, prior: u8) -> bool {
        let word = idx / 64;
        let bit = 1u64 << (idx % 64);
        if word >= self.seen.len() {
            self.seen.resize(word + 1, 0);
        }
        if self.seen[word] & bit != 0 {
            return false;
        }
        self.seen[word] |= bit;
        self.entries.push((idx as u32, prior));
        true
    }

    /// Whether `idx` has been recorded.
    pub fn contains(&self, idx: usize) -> bool {
        self.seen
            .get(idx / 64)
            .is_some_and(|w| w & (1u64 << (idx % 64)) != 0)
    }

    /// Recorded original value for `idx`.
    ///
    /// Membership is a bitmap test; the value lookup scans the recorded entries (O(n)).
    pub fn original(&self, idx: usize) -> Option<u8> {
        if !self.contains(idx) {
            return None;
        }
        self.entries
            .iter()
            .find(|(i, _)| *i as usize == idx)
            .map(|&(_, v)| v)
    }

    /// Number of distinct pixels recorded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Committed, immutable effect of one stroke.
///
/// `indices`, `before` and `after` are parallel and always non-empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delta {
    indices: Vec<u32>,
    before: Vec<u8>,
    after: Vec<u8>,
}

impl Delta {
    /// Freeze a change set, reading `after` values from the current buffer.
    ///
    /// Returns `None` for an empty change set.
    pub fn freeze(change_set: ChangeSet, buffer: &PixelBuffer) -> Option<Self> {
        if change_set.is_empty() {
            return None;
        }
        let n = change_set.len();
        let mut indices = Vec::with_capacity(n);
        let mut before = Vec::with_capacity(n);
        let mut after = Vec::with_capacity(n);
        for (idx, prior) in change_set.entries {
            indices.push(idx);
            before.push(prior);
            after.push(buffer.at(idx as usize));
        }
        Some(Self {
            indices,
            before,
            after,
        })
    }

    /// Pixel indices touched by the stroke.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Values before the stroke.
    pub fn before(&self) -> &[u8] {
        &self.before
    }

    /// Values after the stroke.
    pub fn after(&self) -> &[u8] {
        &self.after
    }

    /// Number of pixels in the delta.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Always false for stored deltas.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Write the pre-stroke values back.
    pub fn revert(&self, buffer: &mut PixelBuffer) {
        apply(buffer, &self.indices, &self.before);
    }

    /// Write the post-stroke values again.
    pub fn reapply(&self, buffer: &mut PixelBuffer) {
        apply(buffer, &self.indices, &self.after);
    }
}

fn apply(buffer: &mut PixelBuffer, indices: &[u32], values: &[u8]) {
    for (&idx, &v) in indices.iter().zip(values) {
        buffer.set_at(idx as usize, v);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/delta.rs"]
mod tests;

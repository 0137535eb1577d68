use std::time::{Duration, Instant};

/// Owned playback timer.
///
/// The ticker does not spawn anything; the event loop calls [`Ticker::poll`] and renders the
/// returned frame. Each fire shows the cursor frame and then advances it, wrapping at the
/// frame count.
#[derive(Clone, Debug)]
pub struct Ticker {
    interval: Duration,
    cursor: usize,
    next_due: Option<Instant>,
}

impl Ticker {
    /// A stopped ticker firing every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            cursor: 0,
            next_due: None,
        }
    }

    /// A stopped ticker at `fps` frames per second (interval `round(1000 / fps)` ms).
    pub fn from_fps(fps: u32) -> Self {
        let fps = u64::from(fps.max(1));
        Self::new(Duration::from_millis((1000 + fps / 2) / fps))
    }

    /// Tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether playback is running.
    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Frame that the next fire will show.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Start from frame `from`; the first fire is one interval after `now`.
    pub fn start(&mut self, from: usize, now: Instant) {
        self.cursor = from;
        self.next_due = Some(now + self.interval);
    }

    /// Stop firing. The cursor is kept.
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Fire once unconditionally: returns the frame to show and advances the cursor.
    pub fn advance(&mut self, frame_count: usize) -> usize {
        let count = frame_count.max(1);
        let show = self.cursor % count;
        self.cursor = (show + 1) % count;
        show
    }

    /// Fire if running and due at `now`.
    ///
    /// A loop that fell more than one interval behind resynchronizes instead of replaying
    /// missed ticks.
    pub fn poll(&mut self, now: Instant, frame_count: usize) -> Option<usize> {
        let due = self.next_due?;
        if now < due {
            return None;
        }
        let mut next = due + self.interval;
        if next <= now {
            next = now + self.interval;
        }
        self.next_due = Some(next);
        Some(self.advance(frame_count))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/ticker.rs"]
mod tests;

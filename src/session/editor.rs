//! Editing session: the single owner of frames, tool state, playback and export.
//!
//! [`Editor`] is the adapter between input events and the core. Every editing entry point
//! first stops playback (so the store never rejects it for playing) and refuses while an
//! [`ExportJob`] is alive.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::export::gif::{encode_gif, write_gif};
use crate::foundation::config::EditorConfig;
use crate::foundation::core::Point;
use crate::foundation::error::{FlipError, FlipResult, Refusal};
use crate::frames::store::FrameStore;
use crate::history::delta::ChangeSet;
use crate::history::stack::begin_stroke;
use crate::playback::ticker::Ticker;
use crate::project::file::{ProjectData, load_frames};
use crate::raster::buffer::PixelBuffer;
use crate::raster::stroke::{Tool, apply_stroke};
use crate::render::compose::{FrameRGBA, compose_frame_only, compose_with_onion_skin};

#[derive(Debug)]
struct ActiveStroke {
    frame: usize,
    change_set: ChangeSet,
    last: Point,
}

/// Clears the export flag when dropped, whatever the export outcome.
#[derive(Debug)]
struct ExportGuard(Arc<AtomicBool>);

impl ExportGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> FlipResult<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            return Err(FlipError::busy("an export is already running"));
        }
        Ok(Self(Arc::clone(flag)))
    }
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Frames snapshotted for export by [`Editor::begin_export`].
///
/// The owning editor refuses edits, loads and further exports until the job is dropped.
/// The job is `Send`, so encoding can run on a worker thread.
#[derive(Debug)]
pub struct ExportJob {
    frames: Vec<PixelBuffer>,
    cfg: EditorConfig,
    _guard: ExportGuard,
}

impl ExportJob {
    /// Snapshotted frames.
    pub fn frames(&self) -> &[PixelBuffer] {
        &self.frames
    }

    /// Encode the snapshot as a GIF into `out`.
    pub fn encode<W: Write>(&self, out: W) -> FlipResult<W> {
        encode_gif(&self.frames, &self.cfg, out)
    }

    /// Encode the snapshot as a GIF file at `path`.
    pub fn write_gif(&self, path: &Path) -> FlipResult<()> {
        write_gif(path, &self.frames, &self.cfg)
    }
}

/// Interactive editing state for one project.
#[derive(Debug)]
pub struct Editor {
    cfg: EditorConfig,
    store: FrameStore,
    ticker: Ticker,
    tool: Tool,
    brush: u32,
    gray: u8,
    onion_depth: usize,
    stroke: Option<ActiveStroke>,
    exporting: Arc<AtomicBool>,
}

impl Editor {
    /// A session on a new project of `cfg.initial_frames` blank frames.
    pub fn new(cfg: EditorConfig) -> FlipResult<Self> {
        cfg.validate()?;
        Ok(Self {
            store: FrameStore::new(&cfg),
            ticker: Ticker::new(Duration::from_millis(cfg.frame_interval_ms())),
            tool: Tool::Pencil,
            brush: 1,
            gray: 0,
            onion_depth: cfg.onion_depth,
            stroke: None,
            exporting: Arc::new(AtomicBool::new(false)),
            cfg,
        })
    }

    /// Installation config.
    pub fn config(&self) -> &EditorConfig {
        &self.cfg
    }

    /// Frames and their history.
    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    /// Active tool.
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Select the drawing tool.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Brush size in pixels.
    pub fn brush(&self) -> u32 {
        self.brush
    }

    /// Set the brush size, clamped to `1..=width`.
    pub fn set_brush(&mut self, size: u32) {
        self.brush = size.clamp(1, self.cfg.width.max(1));
    }

    /// Gray level used by pencil and soft brush.
    pub fn gray(&self) -> u8 {
        self.gray
    }

    /// Set the drawing gray level.
    pub fn set_gray(&mut self, gray: u8) {
        self.gray = gray;
    }

    /// Number of preceding frames ghosted in the preview.
    pub fn onion_depth(&self) -> usize {
        self.onion_depth
    }

    /// Set the onion skin depth; zero disables ghosts.
    pub fn set_onion_depth(&mut self, depth: usize) {
        self.onion_depth = depth;
    }

    /// Whether playback is running.
    pub fn is_playing(&self) -> bool {
        self.ticker.is_running()
    }

    /// Whether an [`ExportJob`] currently holds the frames.
    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::Acquire)
    }

    /// Map a position in a `view_w x view_h` display to a canvas pixel.
    pub fn view_to_point(&self, vx: f64, vy: f64, view_w: f64, view_h: f64) -> Point {
        Point::from_view(vx, vy, view_w, view_h, self.cfg.canvas())
    }

    fn begin_edit(&mut self) -> Result<(), Refusal> {
        if self.is_exporting() {
            tracing::warn!("edit refused during export");
            return Err(Refusal::Exporting);
        }
        if self.ticker.is_running() {
            self.stop_playback();
        }
        Ok(())
    }

    /// Commit any half-finished stroke so its history is not lost.
    fn finish_stroke(&mut self) -> bool {
        match self.stroke.take() {
            Some(stroke) => self.store.commit_stroke(stroke.frame, stroke.change_set),
            None => false,
        }
    }

    /// Start a stroke on the current frame at `at` and paint its first dot.
    pub fn pointer_down(&mut self, at: Point) -> Result<(), Refusal> {
        self.begin_edit()?;
        self.finish_stroke();
        let at = at.clamped(self.cfg.canvas());
        let frame = self.store.current();
        let mut change_set = begin_stroke();
        let buf = self.store.stroke_target()?;
        apply_stroke(
            buf,
            self.tool,
            None,
            at,
            self.gray,
            self.brush,
            Some(&mut change_set),
        );
        self.stroke = Some(ActiveStroke {
            frame,
            change_set,
            last: at,
        });
        Ok(())
    }

    /// Continue the active stroke with a line to `to`. Returns `Ok(false)` with no stroke.
    pub fn pointer_move(&mut self, to: Point) -> Result<bool, Refusal> {
        if self.stroke.is_none() {
            return Ok(false);
        }
        self.begin_edit()?;
        let to = to.clamped(self.cfg.canvas());
        let (tool, gray, brush) = (self.tool, self.gray, self.brush);
        let Some(stroke) = self.stroke.as_mut() else {
            return Ok(false);
        };
        if stroke.frame != self.store.current() {
            return Ok(false);
        }
        let buf = self.store.stroke_target()?;
        apply_stroke(
            buf,
            tool,
            Some(stroke.last),
            to,
            gray,
            brush,
            Some(&mut stroke.change_set),
        );
        stroke.last = to;
        Ok(true)
    }

    /// End the active stroke and commit it. Returns whether an undo entry was recorded.
    pub fn pointer_up(&mut self) -> bool {
        self.finish_stroke()
    }

    /// Undo the newest stroke on the current frame.
    pub fn undo(&mut self) -> Result<(), Refusal> {
        self.begin_edit()?;
        self.finish_stroke();
        self.store.undo()
    }

    /// Redo the last undone stroke on the current frame.
    pub fn redo(&mut self) -> Result<(), Refusal> {
        self.begin_edit()?;
        self.finish_stroke();
        self.store.redo()
    }

    /// Insert a blank frame after the current one and select it.
    pub fn add_blank_after_current(&mut self) -> Result<usize, Refusal> {
        self.begin_edit()?;
        self.finish_stroke();
        self.store.add_blank_after_current().inspect_err(warn_refusal)
    }

    /// Insert a copy of the current frame after it and select the copy.
    pub fn duplicate_after_current(&mut self) -> Result<usize, Refusal> {
        self.begin_edit()?;
        self.finish_stroke();
        self.store.duplicate_after_current().inspect_err(warn_refusal)
    }

    /// Delete the current frame after `confirm` agrees.
    pub fn delete_current(
        &mut self,
        confirm: impl FnOnce(usize) -> bool,
    ) -> Result<usize, Refusal> {
        self.begin_edit()?;
        self.finish_stroke();
        self.store.delete_current(confirm).inspect_err(warn_refusal)
    }

    /// Move frame `from` so it lands before position `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<bool, Refusal> {
        self.begin_edit()?;
        self.finish_stroke();
        self.store.reorder(from, to)
    }

    /// Select frame `index` (clamped). Stops playback.
    pub fn select(&mut self, index: usize) -> Result<(), Refusal> {
        self.begin_edit()?;
        self.finish_stroke();
        self.store.set_current(index);
        Ok(())
    }

    fn stop_playback(&mut self) {
        self.ticker.stop();
        self.store.set_playing(false);
        tracing::debug!(frame = self.store.current(), "playback stopped");
    }

    /// Start or stop playback. Playback starts from the current frame.
    pub fn set_playing(&mut self, playing: bool, now: Instant) -> Result<(), Refusal> {
        if !playing {
            if self.ticker.is_running() {
                self.stop_playback();
            }
            return Ok(());
        }
        if self.is_exporting() {
            return Err(Refusal::Exporting);
        }
        if self.ticker.is_running() {
            return Ok(());
        }
        self.finish_stroke();
        self.ticker.start(self.store.current(), now);
        self.store.set_playing(true);
        tracing::debug!(
            from = self.store.current(),
            interval_ms = self.ticker.interval().as_millis() as u64,
            "playback started"
        );
        Ok(())
    }

    /// Flip playback on or off. Returns the new playing state.
    pub fn toggle_playback(&mut self, now: Instant) -> Result<bool, Refusal> {
        let playing = !self.is_playing();
        self.set_playing(playing, now)?;
        Ok(playing)
    }

    /// Drive playback. When a tick is due the shown frame becomes current and is returned.
    pub fn tick(&mut self, now: Instant) -> Option<usize> {
        let shown = self.ticker.poll(now, self.store.len())?;
        self.store.set_current(shown);
        Some(shown)
    }

    /// Image for the main view: the plain current frame while playing, otherwise the
    /// current frame over its onion skin.
    pub fn preview(&self) -> FlipResult<FrameRGBA> {
        let current = self.store.current();
        if self.is_playing() {
            compose_frame_only(self.store.buffers(), current)
        } else {
            compose_with_onion_skin(self.store.buffers(), current, self.onion_depth)
        }
    }

    /// Discard everything and start over with `initial_frames` blank frames.
    pub fn new_project(&mut self) -> Result<(), Refusal> {
        self.begin_edit()?;
        self.stroke = None;
        self.store.reset(self.cfg.initial_frames);
        tracing::info!(frames = self.store.len(), "new project");
        Ok(())
    }

    /// Replace the project with `project`.
    ///
    /// Decoding happens before anything is touched; on error the session is unchanged.
    pub fn load_project(&mut self, project: &ProjectData) -> FlipResult<()> {
        if self.is_exporting() {
            return Err(FlipError::busy("cannot load a project during export"));
        }
        let frames = load_frames(project, &self.cfg)?;
        if self.ticker.is_running() {
            self.stop_playback();
        }
        self.stroke = None;
        self.store.replace_all(frames)?;
        tracing::info!(frames = self.store.len(), "loaded project");
        Ok(())
    }

    /// Read a project file and load it.
    pub fn load_path(&mut self, path: &Path) -> FlipResult<()> {
        let project = ProjectData::read_from_path(path)?;
        self.load_project(&project)
    }

    /// Snapshot of the current frames as a project.
    pub fn save_project(&self) -> ProjectData {
        ProjectData::from_frames(self.store.buffers(), self.cfg.canvas(), self.cfg.fps)
    }

    /// Save the project to `path`.
    pub fn save_path(&self, path: &Path) -> FlipResult<()> {
        self.save_project().write_to_path(path)
    }

    /// Stop playback, commit any open stroke and snapshot the frames for export.
    ///
    /// Fails with [`FlipError::Busy`] while another job is alive.
    pub fn begin_export(&mut self) -> FlipResult<ExportJob> {
        let guard = ExportGuard::acquire(&self.exporting)?;
        if self.ticker.is_running() {
            self.stop_playback();
        }
        self.finish_stroke();
        tracing::debug!(frames = self.store.len(), "export started");
        Ok(ExportJob {
            frames: self.store.buffers().to_vec(),
            cfg: self.cfg.clone(),
            _guard: guard,
        })
    }

    /// Export every frame as an animated GIF at `path`.
    ///
    /// Editing is re-enabled when this returns, on success and on failure.
    pub fn export_gif(&mut self, path: &Path) -> FlipResult<()> {
        self.begin_export()?.write_gif(path)
    }
}

fn warn_refusal(refusal: &Refusal) {
    tracing::warn!(%refusal, "frame edit refused");
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;

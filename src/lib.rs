//! flipframe is a frame-based grayscale animation engine.
//!
//! A project is an ordered list of fixed-size grayscale frames. Strokes paint into frames
//! and are recorded as sparse deltas for per-frame undo/redo; frames are composed into RGBA
//! images for preview (with onion skin) or export; several projects can be concatenated into
//! a montage without copying pixel data.
//!
//! # Pipeline overview
//!
//! 1. **Paint**: pointer gestures -> [`apply_stroke`] -> [`PixelBuffer`] writes, recorded in a
//!    [`ChangeSet`]
//! 2. **Commit**: `ChangeSet -> Delta` pushed onto the frame's bounded [`History`]
//! 3. **Compose**: `&[PixelBuffer] -> FrameRGBA` via [`compose_with_onion_skin`] or
//!    [`compose_frame_only`]
//! 4. **Persist / export**: [`ProjectData`] JSON, animated GIF ([`write_gif`]), or a
//!    flattened [`MontageTimeline`]
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single owner**: all mutable state lives in one [`Editor`] (or a [`FrameStore`] used
//!   directly); playback is an owned [`Ticker`] polled by the caller.
//! - **Refusals are not errors**: expected precondition failures return [`Refusal`];
//!   [`FlipError`] is reserved for bad data and IO.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod export;
mod foundation;
mod frames;
mod history;
mod montage;
mod playback;
mod project;
mod raster;
mod render;
mod session;

pub use export::gif::{encode_gif, gif_delay_cs, write_gif};
pub use foundation::config::EditorConfig;
pub use foundation::core::{Canvas, FrameRange, Point, WHITE};
pub use foundation::error::{FlipError, FlipResult, Refusal};
pub use frames::store::FrameStore;
pub use history::delta::{ChangeSet, Delta};
pub use history::stack::{History, begin_stroke, commit_stroke};
pub use montage::chunk::{ChunkSource, MontageChunk, ProjectLibrary};
pub use montage::timeline::{
    ChunkPosition, MontageTimeline, export_flatten, global_position, locate, total_frames,
};
pub use playback::ticker::Ticker;
pub use project::file::{
    PROJECT_VERSION, ProjectData, decode_frame, encode_frame, ensure_parent_dir, load_frames,
    now_timestamp,
};
pub use project::validate::{Expected, ValidationReport, validate_project};
pub use raster::buffer::PixelBuffer;
pub use raster::stroke::{
    SOFT_GAMMA, Tool, apply_stroke, draw_dot, draw_line, draw_soft_dot, draw_soft_line,
    soft_alpha, walk_line,
};
pub use render::compose::{
    FrameRGBA, GHOST_INK_THRESHOLD, compose_frame_only, compose_with_onion_skin,
    ghost_gray_for_distance, onion_skin_gray, scale_nearest,
};
pub use session::editor::{Editor, ExportJob};

//! Stroke rasterization: square hard brushes, radial soft brushes, and Bresenham lines.
//!
//! Every primitive clips its footprint to the buffer and never faults on out-of-range
//! offsets. When a [`ChangeSet`] is supplied, each touched pixel's value *before* the first
//! write of the stroke is recorded exactly once.

use crate::foundation::core::{Point, WHITE};
use crate::history::delta::ChangeSet;
use crate::raster::buffer::PixelBuffer;

/// Exponent applied to the soft brush falloff.
pub const SOFT_GAMMA: f64 = 1.2;

/// Drawing tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Hard square brush in the configured gray.
    #[default]
    Pencil,
    /// Hard square brush that always paints white.
    Eraser,
    /// Radial blended brush in the configured gray.
    Soft,
}

impl Tool {
    /// Value painted by this tool for a configured gray level.
    pub fn paint_value(self, gray: u8) -> u8 {
        match self {
            Tool::Eraser => WHITE,
            Tool::Pencil | Tool::Soft => gray,
        }
    }
}

/// Footprint offsets `[start, start + s - 1]` for a brush size, with size 0 treated as 1.
fn footprint(size: u32) -> (i32, i32) {
    let s = size.clamp(1, i32::MAX as u32) as i32;
    let start = -(s / 2);
    (start, start + s - 1)
}

/// Paint an `s x s` square of `value` centered (floor-biased) on `(x, y)`.
pub fn draw_dot(
    buf: &mut PixelBuffer,
    x: i32,
    y: i32,
    value: u8,
    size: u32,
    mut change_set: Option<&mut ChangeSet>,
) {
    let canvas = buf.canvas();
    let (start, end) = footprint(size);
    for dy in start..=end {
        for dx in start..=end {
            let (xx, yy) = (x.saturating_add(dx), y.saturating_add(dy));
            if !canvas.contains(xx, yy) {
                continue;
            }
            let idx = canvas.index_of(xx as u32, yy as u32);
            if let Some(cs) = change_set.as_deref_mut() {
                cs.record(idx, buf.at(idx));
            }
            buf.set_at(idx, value);
        }
    }
}

/// Blend weight of the soft brush at offset `(dx, dy)` from its center.
///
/// `clamp(1 - dist / radius, 0, 1) ^ 1.2` with `radius = max(0.5, size / 2)`.
pub fn soft_alpha(dx: i32, dy: i32, size: u32) -> f64 {
    let s = size.max(1);
    let radius = (f64::from(s) / 2.0).max(0.5);
    let dist = f64::from(dx).hypot(f64::from(dy));
    (1.0 - dist / radius).clamp(0.0, 1.0).powf(SOFT_GAMMA)
}

/// Blend `value` into an `s x s` footprint with radial falloff.
pub fn draw_soft_dot(
    buf: &mut PixelBuffer,
    x: i32,
    y: i32,
    value: u8,
    size: u32,
    mut change_set: Option<&mut ChangeSet>,
) {
    let canvas = buf.canvas();
    let (start, end) = footprint(size);
    for dy in start..=end {
        for dx in start..=end {
            let (xx, yy) = (x.saturating_add(dx), y.saturating_add(dy));
            if !canvas.contains(xx, yy) {
                continue;
            }
            let idx = canvas.index_of(xx as u32, yy as u32);
            let alpha = soft_alpha(dx, dy, size);
            let prev = buf.at(idx);
            let blended = (f64::from(prev) * (1.0 - alpha) + f64::from(value) * alpha).round();
            if let Some(cs) = change_set.as_deref_mut() {
                cs.record(idx, prev);
            }
            buf.set_at(idx, blended.clamp(0.0, 255.0) as u8);
        }
    }
}

/// Visit every cell of the integer Bresenham line from `(x0, y0)` to `(x1, y1)`, both
/// endpoints included.
pub fn walk_line(x0: i32, y0: i32, x1: i32, y1: i32, mut visit: impl FnMut(i32, i32)) {
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        visit(x, y);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Hard-edged line: [`draw_dot`] at every Bresenham step.
pub fn draw_line(
    buf: &mut PixelBuffer,
    from: Point,
    to: Point,
    value: u8,
    size: u32,
    mut change_set: Option<&mut ChangeSet>,
) {
    walk_line(from.x, from.y, to.x, to.y, |x, y| {
        draw_dot(buf, x, y, value, size, change_set.as_deref_mut());
    });
}

/// Blended line: [`draw_soft_dot`] at every Bresenham step.
pub fn draw_soft_line(
    buf: &mut PixelBuffer,
    from: Point,
    to: Point,
    value: u8,
    size: u32,
    mut change_set: Option<&mut ChangeSet>,
) {
    walk_line(from.x, from.y, to.x, to.y, |x, y| {
        draw_soft_dot(buf, x, y, value, size, change_set.as_deref_mut());
    });
}

/// Apply one gesture segment with `tool`.
///
/// Without a previous point (gesture start) a single dot is painted; otherwise a line from
/// `from` to `to`.
pub fn apply_stroke(
    buf: &mut PixelBuffer,
    tool: Tool,
    from: Option<Point>,
    to: Point,
    gray: u8,
    brush: u32,
    change_set: Option<&mut ChangeSet>,
) {
    let value = tool.paint_value(gray);
    match (tool, from) {
        (Tool::Soft, None) => draw_soft_dot(buf, to.x, to.y, value, brush, change_set),
        (Tool::Soft, Some(from)) => draw_soft_line(buf, from, to, value, brush, change_set),
        (_, None) => draw_dot(buf, to.x, to.y, value, brush, change_set),
        (_, Some(from)) => draw_line(buf, from, to, value, brush, change_set),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/stroke.rs"]
mod tests;

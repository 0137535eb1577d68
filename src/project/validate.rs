//! Structural validation of candidate project JSON.
//!
//! Works on untyped [`serde_json::Value`] so that malformed files produce readable messages
//! instead of a single deserialization error. Numeric fields are coerced the way loosely
//! typed producers write them (numeric strings count as numbers).

use base64::Engine as _;
use serde_json::{Map, Value};

use crate::foundation::config::EditorConfig;
use crate::project::file::FRAME_B64;

/// Expected installation values; `None` skips the corresponding check.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Expected {
    /// Required width.
    pub width: Option<f64>,
    /// Required height.
    pub height: Option<f64>,
    /// Required fps (only checked when the project declares one).
    pub fps: Option<f64>,
}

impl Expected {
    /// Expectations matching an installation config.
    pub fn from_config(cfg: &EditorConfig) -> Self {
        Self {
            width: Some(f64::from(cfg.width)),
            height: Some(f64::from(cfg.height)),
            fps: Some(f64::from(cfg.fps)),
        }
    }
}

/// Outcome of [`validate_project`].
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ValidationReport {
    /// True iff `errors` is empty.
    pub ok: bool,
    /// Human-readable problems, in check order.
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn finish(errors: Vec<String>) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
        }
    }
}

/// Check a candidate project.
///
/// Order: object, frames list (stops here on failure), finite width/height, expected
/// width/height/fps, frameCount vs `frames.length`, then each frame's base64 and decoded
/// length (stops at the first bad frame).
pub fn validate_project(project: &Value, expected: &Expected) -> ValidationReport {
    let mut errors = Vec::new();
    let Some(obj) = project.as_object() else {
        errors.push("Invalid project object".to_string());
        return ValidationReport::finish(errors);
    };
    let Some(frames) = obj.get("frames").and_then(Value::as_array) else {
        errors.push("missing frames array".to_string());
        return ValidationReport::finish(errors);
    };

    let width = coerce_number(obj.get("width"));
    let height = coerce_number(obj.get("height"));
    if !width.is_finite() || !height.is_finite() {
        errors.push("invalid width/height".to_string());
    }

    if let Some(w) = expected.width
        && w != width
    {
        errors.push(format!("width mismatch ({} != {})", fmt_num(width), fmt_num(w)));
    }
    if let Some(h) = expected.height
        && h != height
    {
        errors.push(format!(
            "height mismatch ({} != {})",
            fmt_num(height),
            fmt_num(h)
        ));
    }
    if let (Some(f), Some(raw)) = (expected.fps, obj.get("fps")) {
        let fps = coerce_number(Some(raw));
        if fps != f {
            errors.push(format!("fps mismatch ({} != {})", fmt_num(fps), fmt_num(f)));
        }
    }

    let frame_count = declared_frame_count(obj, frames.len());
    if frame_count != frames.len() as f64 {
        errors.push(format!(
            "frameCount ({}) does not match frames.length ({})",
            fmt_num(frame_count),
            frames.len()
        ));
    }

    if width.is_finite() && height.is_finite() {
        let expected_len = width * height;
        for (i, frame) in frames.iter().enumerate() {
            if let Some(problem) = check_frame(i, frame, expected_len) {
                errors.push(problem);
                break;
            }
        }
    }

    ValidationReport::finish(errors)
}

fn check_frame(i: usize, frame: &Value, expected_len: f64) -> Option<String> {
    let Some(b64) = frame.as_str() else {
        return Some(format!("frame {i} not a string"));
    };
    let Ok(bytes) = FRAME_B64.decode(b64) else {
        return Some(format!("frame {i} invalid base64"));
    };
    let reencoded = FRAME_B64.encode(&bytes);
    if reencoded.trim_end_matches('=') != b64.trim_end_matches('=') {
        return Some(format!("frame {i} invalid base64"));
    }
    if bytes.len() as f64 != expected_len {
        return Some(format!(
            "frame {i} length {} != {}",
            bytes.len(),
            fmt_num(expected_len)
        ));
    }
    None
}

/// `frameCount` when present and truthy, else the number of frames.
fn declared_frame_count(obj: &Map<String, Value>, frames_len: usize) -> f64 {
    match obj.get("frameCount") {
        Some(v) if is_truthy(v) => coerce_number(Some(v)),
        _ => frames_len as f64,
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric coercion for loosely typed JSON fields; missing or non-numeric values are NaN.
fn coerce_number(v: Option<&Value>) -> f64 {
    match v {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => {
            let t = s.trim();
            if t.is_empty() {
                0.0
            } else {
                t.parse().unwrap_or(f64::NAN)
            }
        }
        Some(Value::Array(_) | Value::Object(_)) => f64::NAN,
    }
}

fn fmt_num(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/validate.rs"]
mod tests;

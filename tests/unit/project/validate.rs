use super::*;
use serde_json::json;

fn b64(bytes: &[u8]) -> String {
    FRAME_B64.encode(bytes)
}

fn expect_2x2() -> Expected {
    Expected {
        width: Some(2.0),
        height: Some(2.0),
        fps: Some(12.0),
    }
}

#[test]
fn valid_project_passes() {
    let p = json!({ "width": 2, "height": 2, "fps": 12, "frameCount": 1, "frames": [b64(&[0, 1, 2, 3])] });
    let res = validate_project(&p, &expect_2x2());
    assert!(res.ok);
    assert!(res.errors.is_empty());
}

#[test]
fn frame_count_mismatch_detected() {
    let p = json!({ "width": 2, "height": 2, "fps": 12, "frameCount": 2, "frames": [b64(&[0, 1, 2, 3])] });
    let res = validate_project(&p, &expect_2x2());
    assert!(!res.ok);
    assert!(res.errors.join(" ").contains("frameCount (2) does not match frames.length (1)"));
}

#[test]
fn missing_frame_count_falls_back_to_len() {
    let p = json!({ "width": 2, "height": 2, "frames": [b64(&[0; 4]), b64(&[1; 4])] });
    assert!(validate_project(&p, &expect_2x2()).ok);
}

#[test]
fn invalid_base64_detected() {
    let p = json!({ "width": 2, "height": 2, "fps": 12, "frameCount": 1, "frames": ["not-base64!!"] });
    let res = validate_project(&p, &expect_2x2());
    assert!(!res.ok);
    assert!(res.errors.join(" ").contains("invalid base64"));
}

#[test]
fn frame_length_mismatch_detected() {
    let p = json!({ "width": 2, "height": 2, "fps": 12, "frameCount": 1, "frames": [b64(&[1, 2])] });
    let res = validate_project(&p, &expect_2x2());
    assert!(!res.ok);
    assert_eq!(res.errors, vec!["frame 0 length 2 != 4".to_string()]);
}

#[test]
fn only_first_bad_frame_is_reported() {
    let p = json!({ "width": 2, "height": 2, "frames": [b64(&[0; 4]), 7, "@@@", b64(&[1])] });
    let res = validate_project(&p, &Expected::default());
    assert_eq!(res.errors, vec!["frame 1 not a string".to_string()]);
}

#[test]
fn width_height_mismatch_against_expected() {
    let p = json!({ "width": 2, "height": 2, "fps": 12, "frameCount": 1, "frames": [b64(&[0, 1, 2, 3])] });
    let exp = Expected {
        width: Some(3.0),
        ..expect_2x2()
    };
    let res = validate_project(&p, &exp);
    assert!(!res.ok);
    assert!(res.errors.join(" ").contains("width mismatch (2 != 3)"));
}

#[test]
fn fps_checked_only_when_declared() {
    let no_fps = json!({ "width": 2, "height": 2, "frames": [] });
    assert!(validate_project(&no_fps, &expect_2x2()).ok);

    let wrong = json!({ "width": 2, "height": 2, "fps": 24, "frames": [] });
    let res = validate_project(&wrong, &expect_2x2());
    assert_eq!(res.errors, vec!["fps mismatch (24 != 12)".to_string()]);
}

#[test]
fn structural_failures_short_circuit() {
    let res = validate_project(&json!([1, 2]), &Expected::default());
    assert_eq!(res.errors, vec!["Invalid project object".to_string()]);

    let res = validate_project(&json!({ "width": 2, "height": 2 }), &expect_2x2());
    assert_eq!(res.errors, vec!["missing frames array".to_string()]);
}

#[test]
fn non_numeric_dimensions_are_reported() {
    let p = json!({ "width": "wide", "height": 2, "frames": [b64(&[0; 4])] });
    let res = validate_project(&p, &Expected::default());
    assert_eq!(res.errors, vec!["invalid width/height".to_string()]);

    let numeric_strings = json!({ "width": "2", "height": "2", "frames": [b64(&[0; 4])] });
    assert!(validate_project(&numeric_strings, &expect_2x2()).ok);
}

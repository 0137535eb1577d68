use super::*;

#[test]
fn montage_input_without_range_is_a_path() {
    let (path, range) = parse_montage_input("shots/a.json").unwrap();
    assert_eq!(path, PathBuf::from("shots/a.json"));
    assert_eq!(range, None);
}

#[test]
fn montage_input_splits_trailing_range() {
    let (path, range) = parse_montage_input("shots@v2/a.json@1..3").unwrap();
    assert_eq!(path, PathBuf::from("shots@v2/a.json"));
    assert_eq!(range, Some((1, 3)));
}

#[test]
fn at_sign_inside_path_is_kept() {
    for input in ["shots@v2/a.json", "take@2.json", "x@a/../b.json"] {
        let (path, range) = parse_montage_input(input).unwrap();
        assert_eq!(path, PathBuf::from(input));
        assert_eq!(range, None);
    }
}

#[test]
fn malformed_range_bounds_are_rejected() {
    let err = parse_montage_input("a.json@x..3").unwrap_err();
    assert!(err.to_string().contains("invalid range start"));
    assert!(parse_montage_input("a.json@1..").is_err());
}

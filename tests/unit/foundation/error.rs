use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FlipError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        FlipError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(FlipError::encode("x").to_string().contains("encode error:"));
    assert!(FlipError::busy("x").to_string().contains("busy:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FlipError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn refusal_messages_are_user_facing() {
    assert_eq!(
        Refusal::FrameLimit { max: 600 }.to_string(),
        "max frames reached (600)"
    );
    assert_eq!(
        Refusal::LastFrame.to_string(),
        "cannot delete the last remaining frame"
    );
    assert!(
        Refusal::OutOfRange { index: 7, len: 3 }
            .to_string()
            .contains("7")
    );
}

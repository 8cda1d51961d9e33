use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MilkError::source_open("x")
            .to_string()
            .contains("source open error:")
    );
    assert!(
        MilkError::frame_decode("x")
            .to_string()
            .contains("frame decode error:")
    );
    assert!(
        MilkError::directory("x")
            .to_string()
            .contains("directory error:")
    );
    assert!(
        MilkError::encode_process("x")
            .to_string()
            .contains("encode process error:")
    );
    assert!(
        MilkError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(MilkError::filter("x").to_string().contains("filter error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MilkError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_frame_decode_is_recoverable() {
    assert!(MilkError::frame_decode("bad jpeg").is_frame_recoverable());
    assert!(!MilkError::directory("x").is_frame_recoverable());
    assert!(!MilkError::filter("x").is_frame_recoverable());
    assert!(!MilkError::Cancelled.is_frame_recoverable());
}

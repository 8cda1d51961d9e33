use super::*;

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(4)).is_err());
    assert!(FrameRange::new(FrameIndex(4), FrameIndex(4)).is_ok());
}

#[test]
fn inclusive_constructor_and_last_agree() {
    let r = FrameRange::inclusive(3, 5).unwrap();
    assert_eq!(r.start, FrameIndex(3));
    assert_eq!(r.end, FrameIndex(6));
    assert_eq!(r.last(), Some(FrameIndex(5)));
    assert_eq!(r.len_frames(), 3);
    assert_eq!(r.to_string(), "[3, 5]");
}

#[test]
fn empty_range_has_no_last_and_no_frames() {
    let r = FrameRange::new(FrameIndex(7), FrameIndex(7)).unwrap();
    assert!(r.is_empty());
    assert_eq!(r.last(), None);
    assert_eq!(r.iter().count(), 0);
    assert!(!r.contains(FrameIndex(7)));
    assert_eq!(r.to_string(), "[]");
}

#[test]
fn fps_parses_ffprobe_ratios() {
    assert_eq!(Fps::parse_ratio("30/1"), Some(Fps { num: 30, den: 1 }));
    assert_eq!(Fps::parse_ratio("25"), Some(Fps { num: 25, den: 1 }));
    let ntsc = Fps::parse_ratio("30000/1001").unwrap();
    assert!((ntsc.as_f64() - 29.97).abs() < 0.01);
    assert_eq!(Fps::parse_ratio("0/0"), None);
    assert_eq!(Fps::parse_ratio("abc"), None);
    assert_eq!(Fps::parse_ratio("1/2/3"), None);
}

#[test]
fn brightness_truncates() {
    assert_eq!(brightness([0, 0, 0]), 0);
    assert_eq!(brightness([255, 255, 255]), 255);
    // 26 / 3 = 8.67 -> 8
    assert_eq!(brightness([26, 0, 0]), 8);
    assert_eq!(brightness([25, 26, 26]), 25);
    assert_eq!(brightness(Rgb8::new(102, 0, 31).to_array()), 44);
}

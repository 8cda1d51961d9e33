use super::*;
use crate::foundation::core::FrameIndex;

fn checker(order: ChannelOrder) -> Frame {
    let (w, h) = (16u32, 16u32);
    let mut data = Vec::with_capacity((w * h * 3) as usize);
    for y in 0..h {
        for x in 0..w {
            if (x / 4 + y / 4) % 2 == 0 {
                data.extend_from_slice(&[240, 20, 20]);
            } else {
                data.extend_from_slice(&[20, 20, 240]);
            }
        }
    }
    Frame::new(FrameIndex(1), "frame000001.jpg", w, h, order, data).unwrap()
}

#[test]
fn niceness_is_bounded_and_maps_to_quality() {
    assert!(Niceness::new(101).is_err());
    assert_eq!(Niceness::new(0).unwrap().jpeg_quality(), 100);
    assert_eq!(Niceness::new(90).unwrap().jpeg_quality(), 10);
    assert_eq!(Niceness::new(100).unwrap().jpeg_quality(), 1);
}

#[test]
fn round_trip_keeps_identity_and_dimensions() {
    let input = checker(ChannelOrder::Rgb);
    let out = recompress(&input, Niceness::new(50).unwrap()).unwrap();
    assert_eq!(out.index, input.index);
    assert_eq!(out.name, input.name);
    assert_eq!((out.width, out.height), (16, 16));
    assert_eq!(out.order, ChannelOrder::Rgb);
}

#[test]
fn round_trip_preserves_channel_order() {
    let input = checker(ChannelOrder::Bgr);
    let out = recompress(&input, Niceness::new(0).unwrap()).unwrap();
    assert_eq!(out.order, ChannelOrder::Bgr);
    // Stored [240, 20, 20] in BGR is blue in RGB space; the top-left block must stay blue-ish.
    let [r, _, b] = out.rgb_at(1, 1).unwrap();
    assert!(b > r, "expected blue dominant, got r={r} b={b}");
}

#[test]
fn heavier_loss_moves_pixels_further() {
    let input = checker(ChannelOrder::Rgb);
    let err = |n: u8| -> u64 {
        let out = recompress(&input, Niceness::new(n).unwrap()).unwrap();
        out.data
            .iter()
            .zip(&input.data)
            .map(|(a, b)| u64::from(a.abs_diff(*b)))
            .sum()
    };
    assert!(err(100) >= err(0));
}

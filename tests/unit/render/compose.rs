use super::*;
use crate::foundation::core::Canvas;

fn canvas() -> Canvas {
    Canvas::new(4, 1).unwrap()
}

fn frame(samples: [u8; 4]) -> PixelBuffer {
    PixelBuffer::from_samples(canvas(), samples.to_vec()).unwrap()
}

fn gray_of(rgba: &FrameRGBA) -> Vec<u8> {
    rgba.data
        .chunks_exact(4)
        .map(|px| {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
            assert_eq!(px[3], 255);
            px[0]
        })
        .collect()
}

#[test]
fn ghost_gray_ramps_and_clamps() {
    assert_eq!(ghost_gray_for_distance(1), 110);
    assert_eq!(ghost_gray_for_distance(2), 140);
    assert_eq!(ghost_gray_for_distance(5), 230);
    assert_eq!(ghost_gray_for_distance(6), 235);
    assert_eq!(ghost_gray_for_distance(40), 235);
}

#[test]
fn frame_only_expands_gray() {
    let frames = vec![frame([0, 64, 200, 255])];
    let img = compose_frame_only(&frames, 0).unwrap();
    assert_eq!((img.width, img.height), (4, 1));
    assert_eq!(gray_of(&img), vec![0, 64, 200, 255]);
    assert!(compose_frame_only(&frames, 1).is_err());
}

#[test]
fn onion_skin_darkest_wins_and_current_stays_opaque() {
    let frames = vec![
        frame([0, 0, 255, 255]),   // d = 2 -> 140
        frame([0, 255, 249, 250]), // d = 1 -> 110
        frame([255, 255, 255, 30]),
    ];
    let img = compose_with_onion_skin(&frames, 2, 5).unwrap();
    // px0: both ghosts -> min(110, 140); px1: only d=2 ghost; px2: 249 counts as ink;
    // px3: 250 is paper, current ink 30 wins.
    assert_eq!(gray_of(&img), vec![110, 140, 110, 30]);
}

#[test]
fn onion_depth_limits_ghosts() {
    let frames = vec![frame([0, 255, 255, 255]), frame([255, 255, 255, 255])];
    assert_eq!(
        gray_of(&compose_with_onion_skin(&frames, 1, 0).unwrap()),
        vec![255, 255, 255, 255]
    );
    assert_eq!(
        gray_of(&compose_with_onion_skin(&frames, 1, 1).unwrap()),
        vec![110, 255, 255, 255]
    );
    // Frame 0 has no predecessors regardless of depth.
    assert_eq!(
        gray_of(&compose_with_onion_skin(&frames, 0, 5).unwrap()),
        vec![0, 255, 255, 255]
    );
}

#[test]
fn current_frame_ink_never_lightened_by_ghosts() {
    let frames = vec![frame([0, 0, 0, 0]), frame([20, 200, 120, 255])];
    let g = onion_skin_gray(&frames, 1, 1).unwrap();
    assert_eq!(g.samples(), &[20, 110, 110, 110]);
}

#[test]
fn scale_nearest_replicates_pixels() {
    let img = FrameRGBA::from_gray(&frame([0, 50, 100, 150]));
    let up = img.scaled(8, 2);
    assert_eq!(up.data.len(), 8 * 2 * 4);
    let row: Vec<u8> = up.data.chunks_exact(4).take(8).map(|p| p[0]).collect();
    assert_eq!(row, vec![0, 0, 50, 50, 100, 100, 150, 150]);
    assert_eq!(&up.data[..32], &up.data[32..]);
}

// Dance Skeleton 🕺 AGPL-3.0 License

//! Skeleton overlay drawing.
//!
//! Draws the fixed dance topology over a frame: one line per skeleton edge
//! and one filled circle per visible keypoint, all in the chosen overlay
//! color.

use image::{DynamicImage, Rgb};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use crate::results::PoseResult;
use crate::visualizer::color::SkeletonColor;
use crate::visualizer::skeleton::{DANCE_SKELETON, SKIP_POINT_INDICES};

/// Minimum keypoint confidence for a point to participate in the overlay.
pub const KPT_DRAW_CONF: f32 = 0.5;

/// Line thickness in pixels.
const LINE_THICKNESS: i32 = 2;

/// Keypoint circle radius in pixels.
const POINT_RADIUS: i32 = 3;

/// Draw the skeleton overlay for every detected pose onto a copy of the
/// frame.
#[must_use]
pub fn annotate_frame(
    frame: &DynamicImage,
    result: &PoseResult,
    color: SkeletonColor,
) -> DynamicImage {
    let mut img = frame.to_rgb8();
    let (width, height) = img.dimensions();
    let rgb = Rgb(color.color().rgb());

    let Some(ref keypoints) = result.keypoints else {
        return DynamicImage::ImageRgb8(img);
    };

    let num_kpts = keypoints.num_keypoints();

    for pose in 0..keypoints.len() {
        // Connection lines first, points on top
        for [start_idx, end_idx] in DANCE_SKELETON {
            if start_idx >= num_kpts || end_idx >= num_kpts {
                continue;
            }

            let start = point_at(keypoints, pose, start_idx);
            let end = point_at(keypoints, pose, end_idx);

            let (Some(start), Some(end)) = (start, end) else {
                continue;
            };

            draw_thick_line(&mut img, start, end, rgb);
        }

        for idx in 0..num_kpts {
            if SKIP_POINT_INDICES.contains(&idx) {
                continue;
            }
            if let Some((x, y)) = point_at(keypoints, pose, idx) {
                let cx = (x.round() as i32).clamp(0, width as i32 - 1);
                let cy = (y.round() as i32).clamp(0, height as i32 - 1);
                draw_filled_circle_mut(&mut img, (cx, cy), POINT_RADIUS, rgb);
            }
        }
    }

    DynamicImage::ImageRgb8(img)
}

/// A keypoint's pixel position, if it clears the draw confidence.
fn point_at(
    keypoints: &crate::results::Keypoints,
    pose: usize,
    idx: usize,
) -> Option<(f32, f32)> {
    let conf = keypoints.data[[pose, idx, 2]];
    if conf < KPT_DRAW_CONF {
        return None;
    }
    Some((keypoints.data[[pose, idx, 0]], keypoints.data[[pose, idx, 1]]))
}

/// Draw a line segment with thickness by offsetting parallel passes.
fn draw_thick_line(img: &mut image::RgbImage, start: (f32, f32), end: (f32, f32), color: Rgb<u8>) {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;

    // Offset perpendicular to the dominant direction
    let (ox, oy) = if dx.abs() >= dy.abs() {
        (0.0, 1.0)
    } else {
        (1.0, 0.0)
    };

    for t in 0..LINE_THICKNESS {
        let shift = t as f32;
        draw_line_segment_mut(
            img,
            (start.0 + ox * shift, start.1 + oy * shift),
            (end.0 + ox * shift, end.1 + oy * shift),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{Keypoints, Speed};
    use ndarray::Array3;
    use std::collections::HashMap;

    fn result_with_pose(data: Array3<f32>) -> PoseResult {
        let orig_shape = (480, 640);
        let mut result = PoseResult::new(
            orig_shape,
            (640, 640),
            HashMap::from([(0, "person".to_string())]),
            Speed::default(),
            "test.mp4".to_string(),
        );
        result.keypoints = Some(Keypoints::new(data, orig_shape));
        result
    }

    #[test]
    fn test_annotate_empty_result_is_unchanged() {
        let frame = DynamicImage::new_rgb8(64, 64);
        let result = result_with_pose(Array3::zeros((0, 17, 3)));

        let annotated = annotate_frame(&frame, &result, SkeletonColor::Default);
        assert_eq!(annotated.to_rgb8().as_raw(), frame.to_rgb8().as_raw());
    }

    #[test]
    fn test_annotate_draws_visible_keypoints() {
        let frame = DynamicImage::new_rgb8(64, 64);

        // One pose, all keypoints confident and stacked at (32, 32)
        let mut data = Array3::zeros((1, 17, 3));
        for k in 0..17 {
            data[[0, k, 0]] = 32.0;
            data[[0, k, 1]] = 32.0;
            data[[0, k, 2]] = 0.9;
        }
        let result = result_with_pose(data);

        let annotated = annotate_frame(&frame, &result, SkeletonColor::Red);
        let rgb = annotated.to_rgb8();
        assert_eq!(*rgb.get_pixel(32, 32), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_annotate_skips_low_confidence() {
        let frame = DynamicImage::new_rgb8(64, 64);

        let mut data = Array3::zeros((1, 17, 3));
        for k in 0..17 {
            data[[0, k, 0]] = 32.0;
            data[[0, k, 1]] = 32.0;
            data[[0, k, 2]] = 0.1; // below KPT_DRAW_CONF
        }
        let result = result_with_pose(data);

        let annotated = annotate_frame(&frame, &result, SkeletonColor::Red);
        assert_eq!(annotated.to_rgb8().as_raw(), frame.to_rgb8().as_raw());
    }

    #[test]
    fn test_annotate_color_selection() {
        let frame = DynamicImage::new_rgb8(64, 64);

        let mut data = Array3::zeros((1, 17, 3));
        for k in 0..17 {
            data[[0, k, 0]] = 20.0;
            data[[0, k, 1]] = 20.0;
            data[[0, k, 2]] = 0.9;
        }
        let result = result_with_pose(data);

        let annotated = annotate_frame(&frame, &result, SkeletonColor::Yellow);
        assert_eq!(*annotated.to_rgb8().get_pixel(20, 20), Rgb([255, 255, 0]));
    }
}

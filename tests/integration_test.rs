// Dance Skeleton 🕺 AGPL-3.0 License

//! Integration tests for the model-free surface of the library.

use dance_skeleton::{
    DANCE_SKELETON, KEYPOINT_NAMES, Keypoints, PoseConfig, PoseResult, SkeletonColor, Speed,
};
use ndarray::Array3;
use std::collections::HashMap;

#[test]
fn test_pose_config_defaults_match_app() {
    let config = PoseConfig::default();
    // The control panel ships with confidence 0.5
    assert!((config.confidence_threshold - 0.5).abs() < f32::EPSILON);
    assert!((config.iou_threshold - 0.45).abs() < f32::EPSILON);
}

#[test]
fn test_skeleton_topology_is_body_only() {
    // Every edge connects named body keypoints; the face is left bare
    for [a, b] in DANCE_SKELETON {
        assert!(KEYPOINT_NAMES[a].contains("shoulder")
            || KEYPOINT_NAMES[a].contains("elbow")
            || KEYPOINT_NAMES[a].contains("wrist")
            || KEYPOINT_NAMES[a].contains("hip")
            || KEYPOINT_NAMES[a].contains("knee")
            || KEYPOINT_NAMES[a].contains("ankle"));
        assert!(b < KEYPOINT_NAMES.len());
    }
}

#[test]
fn test_skeleton_color_round_trip() {
    for name in ["default", "green", "blue", "red", "yellow"] {
        let color: SkeletonColor = name.parse().unwrap();
        // Display form parses back to the same color
        let again: SkeletonColor = color.to_string().parse().unwrap();
        assert_eq!(color, again);
    }
}

#[test]
fn test_result_lifecycle() {
    let names = HashMap::from([(0, "person".to_string())]);
    let mut result = PoseResult::new(
        (720, 1280),
        (640, 640),
        names,
        Speed::new(1.0, 10.0, 0.5),
        "bachata.mp4".to_string(),
    );

    assert!(result.is_empty());
    assert!((result.speed.total() - 11.5).abs() < 1e-9);

    let mut data = Array3::zeros((1, 17, 3));
    for k in 0..17 {
        data[[0, k, 0]] = 640.0;
        data[[0, k, 1]] = 360.0;
        data[[0, k, 2]] = 0.9;
    }
    result.keypoints = Some(Keypoints::new(data, (720, 1280)));

    assert_eq!(result.len(), 1);
    assert_eq!(result.verbose(), "1 person");

    let kpts = result.keypoints.as_ref().unwrap();
    let xyn = kpts.xyn();
    assert!((xyn[[0, 0, 0]] - 0.5).abs() < 1e-6);
    assert!((xyn[[0, 0, 1]] - 0.5).abs() < 1e-6);
}

#[cfg(feature = "annotate")]
#[test]
fn test_annotate_frame_smoke() {
    use dance_skeleton::annotate::annotate_frame;

    let names = HashMap::from([(0, "person".to_string())]);
    let mut result = PoseResult::new(
        (480, 640),
        (640, 640),
        names,
        Speed::default(),
        "bachata.mp4".to_string(),
    );

    let mut data = Array3::zeros((1, 17, 3));
    for k in 0..17 {
        data[[0, k, 0]] = 100.0 + 10.0 * k as f32;
        data[[0, k, 1]] = 100.0 + 10.0 * k as f32;
        data[[0, k, 2]] = 0.9;
    }
    result.keypoints = Some(Keypoints::new(data, (480, 640)));

    let frame = image::DynamicImage::new_rgb8(640, 480);
    let annotated = annotate_frame(&frame, &result, SkeletonColor::Blue);

    // The overlay changed pixels somewhere
    assert_ne!(annotated.to_rgb8().as_raw(), frame.to_rgb8().as_raw());
    assert_eq!(annotated.width(), 640);
    assert_eq!(annotated.height(), 480);
}

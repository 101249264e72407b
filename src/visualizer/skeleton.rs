// Dance Skeleton 🕺 AGPL-3.0 License

/// COCO-Pose keypoint names, indexed by keypoint ID.
pub const KEYPOINT_NAMES: [&str; 17] = [
    "nose",
    "left_eye",
    "right_eye",
    "left_ear",
    "right_ear",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
];

/// Simplified dance skeleton (pairs of keypoint indices).
///
/// Body-only subset of the COCO-Pose skeleton: arms, shoulder line, torso
/// sides, hip line, and legs. Face keypoints carry no edges so the overlay
/// stays readable on a moving dancer.
pub const DANCE_SKELETON: [[usize; 2]; 12] = [
    [5, 6],   // left shoulder to right shoulder
    [5, 7],   // left shoulder to left elbow
    [7, 9],   // left elbow to left wrist
    [6, 8],   // right shoulder to right elbow
    [8, 10],  // right elbow to right wrist
    [5, 11],  // left shoulder to left hip
    [6, 12],  // right shoulder to right hip
    [11, 12], // left hip to right hip
    [11, 13], // left hip to left knee
    [13, 15], // left knee to left ankle
    [12, 14], // right hip to right knee
    [14, 16], // right knee to right ankle
];

/// Keypoint indices never drawn as points (eyes and ears).
pub const SKIP_POINT_INDICES: std::ops::RangeInclusive<usize> = 1..=4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton_indices_in_range() {
        for [a, b] in DANCE_SKELETON {
            assert!(a < KEYPOINT_NAMES.len());
            assert!(b < KEYPOINT_NAMES.len());
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_skeleton_has_no_face_edges() {
        for [a, b] in DANCE_SKELETON {
            assert!(a >= 5, "face keypoint {a} should carry no edge");
            assert!(b >= 5, "face keypoint {b} should carry no edge");
        }
    }
}

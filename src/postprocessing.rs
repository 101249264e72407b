// Dance Skeleton 🕺 AGPL-3.0 License

//! Post-processing for pose model output.
//!
//! Decodes the raw pose head tensor into boxes and keypoints in
//! original-frame pixel space: confidence filtering, NMS, and coordinate
//! un-letterboxing.

use std::collections::HashMap;

use ndarray::{Array2, Array3, s};

use crate::config::PoseConfig;
use crate::preprocessing::{PreprocessResult, clip_coords, scale_coords};
use crate::results::{Boxes, Keypoints, PoseResult, Speed};
use crate::utils::nms;

/// Post-process raw pose model output.
///
/// Pose models output shape is typically [1, 4 + nc + K*3, preds]
/// (e.g. [1, 56, 8400] for one class and 17 keypoints), where each
/// prediction carries a box (xywh), class scores, and K keypoints with
/// (x, y, confidence) each. Some exports transpose the last two axes;
/// both orientations are handled.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn postprocess_pose(
    output: &[f32],
    output_shape: &[usize],
    num_keypoints: usize,
    preprocess: &PreprocessResult,
    config: &PoseConfig,
    names: &HashMap<usize, String>,
    path: String,
    speed: Speed,
    inference_shape: (u32, u32),
) -> PoseResult {
    let mut results = PoseResult::new(
        preprocess.orig_shape,
        inference_shape,
        names.clone(),
        speed,
        path,
    );

    let kpt_dim = 3; // x, y, confidence
    let kpt_features = num_keypoints * kpt_dim;
    let num_classes = names.len().max(1);
    let expected_features = 4 + num_classes + kpt_features;

    // Determine prediction count and orientation from the shape
    let (num_preds, is_transposed) = match output_shape.len() {
        3 => {
            let (a, b) = (output_shape[1], output_shape[2]);
            if a == expected_features || (a < b && a >= 4 + kpt_features) {
                (b, false) // [1, features, preds]
            } else {
                (a, true) // [1, preds, features]
            }
        }
        2 => {
            let (a, b) = (output_shape[0], output_shape[1]);
            if a < b { (b, false) } else { (a, true) }
        }
        _ => (0, false),
    };

    if output.is_empty() || num_preds == 0 {
        return results;
    }

    // Infer the actual feature count from the data; exports without class
    // names in metadata still decode correctly this way
    let actual_features = output.len() / num_preds;
    if actual_features < 4 + kpt_features {
        return results;
    }
    let num_classes = actual_features.saturating_sub(4 + kpt_features).max(1);

    // Convert to 2D [preds, features]
    let output_2d = if is_transposed {
        Array2::from_shape_vec((num_preds, actual_features), output.to_vec())
            .unwrap_or_else(|_| Array2::zeros((0, 0)))
    } else {
        let arr = Array2::from_shape_vec((actual_features, num_preds), output.to_vec())
            .unwrap_or_else(|_| Array2::zeros((0, 0)));
        arr.t().to_owned()
    };

    if output_2d.is_empty() {
        return results;
    }

    // Filter by confidence, collecting candidates with their keypoints
    let mut candidates: Vec<([f32; 4], f32, usize, Vec<[f32; 3]>)> = Vec::new();

    for i in 0..num_preds {
        let class_scores = output_2d.slice(s![i, 4..4 + num_classes]);
        let (best_class, best_score) = class_scores
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Less))
            .map(|(idx, &score)| (idx, if score.is_nan() { 0.0 } else { score }))
            .unwrap_or((0, 0.0));

        if best_score < config.confidence_threshold {
            continue;
        }

        // Box arrives as xywh; convert to xyxy
        let cx = output_2d[[i, 0]];
        let cy = output_2d[[i, 1]];
        let w = output_2d[[i, 2]];
        let h = output_2d[[i, 3]];
        let x1 = cx - w / 2.0;
        let y1 = cy - h / 2.0;
        let x2 = cx + w / 2.0;
        let y2 = cy + h / 2.0;

        let scaled = scale_coords(&[x1, y1, x2, y2], preprocess.scale, preprocess.padding);
        let clipped = clip_coords(&scaled, preprocess.orig_shape);

        // Keypoints follow the class scores
        let kpt_start = 4 + num_classes;
        let (oh, ow) = preprocess.orig_shape;
        let mut keypoints = Vec::with_capacity(num_keypoints);
        for k in 0..num_keypoints {
            let offset = kpt_start + k * kpt_dim;
            let kpt_x = output_2d[[i, offset]];
            let kpt_y = output_2d[[i, offset + 1]];
            let kpt_conf = output_2d[[i, offset + 2]];

            let scaled_kpt = scale_coords(
                &[kpt_x, kpt_y, kpt_x, kpt_y],
                preprocess.scale,
                preprocess.padding,
            );
            let scaled_x = scaled_kpt[0].clamp(0.0, ow as f32);
            let scaled_y = scaled_kpt[1].clamp(0.0, oh as f32);

            keypoints.push([scaled_x, scaled_y, kpt_conf]);
        }

        candidates.push((
            [clipped[0], clipped[1], clipped[2], clipped[3]],
            best_score,
            best_class,
            keypoints,
        ));
    }

    if candidates.is_empty() {
        results.keypoints = Some(Keypoints::new(
            Array3::zeros((0, num_keypoints, kpt_dim)),
            preprocess.orig_shape,
        ));
        return results;
    }

    let nms_input: Vec<_> = candidates
        .iter()
        .map(|(bbox, score, _, _)| (*bbox, *score))
        .collect();
    let keep_indices = nms(&nms_input, config.iou_threshold);
    let num_kept = keep_indices.len().min(config.max_poses);

    let mut boxes_data = Array2::zeros((num_kept, 6));
    let mut keypoints_data = Array3::zeros((num_kept, num_keypoints, kpt_dim));

    for (out_idx, &keep_idx) in keep_indices.iter().take(num_kept).enumerate() {
        let (bbox, score, class, kpts) = &candidates[keep_idx];
        boxes_data[[out_idx, 0]] = bbox[0];
        boxes_data[[out_idx, 1]] = bbox[1];
        boxes_data[[out_idx, 2]] = bbox[2];
        boxes_data[[out_idx, 3]] = bbox[3];
        boxes_data[[out_idx, 4]] = *score;
        boxes_data[[out_idx, 5]] = *class as f32;

        for (k, kpt) in kpts.iter().enumerate() {
            keypoints_data[[out_idx, k, 0]] = kpt[0];
            keypoints_data[[out_idx, k, 1]] = kpt[1];
            keypoints_data[[out_idx, k, 2]] = kpt[2];
        }
    }

    results.boxes = Some(Boxes::new(boxes_data, preprocess.orig_shape));
    results.keypoints = Some(Keypoints::new(keypoints_data, preprocess.orig_shape));

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    fn names() -> HashMap<usize, String> {
        HashMap::from([(0, "person".to_string())])
    }

    fn identity_preprocess(h: u32, w: u32) -> PreprocessResult {
        PreprocessResult {
            tensor: Array4::zeros((1, 3, h as usize, w as usize)),
            tensor_f16: None,
            orig_shape: (h, w),
            scale: (1.0, 1.0),
            padding: (0.0, 0.0),
        }
    }

    /// Build a raw [1, 56, preds] output with a single confident pose.
    fn single_pose_output(num_preds: usize) -> (Vec<f32>, Vec<usize>) {
        let features = 4 + 1 + 17 * 3;
        let mut data = vec![0.0f32; features * num_preds];

        // Prediction 0: box centered at (100, 100), 50x80, score 0.9
        let set = |data: &mut Vec<f32>, feature: usize, value: f32| {
            data[feature * num_preds] = value;
        };
        set(&mut data, 0, 100.0);
        set(&mut data, 1, 100.0);
        set(&mut data, 2, 50.0);
        set(&mut data, 3, 80.0);
        set(&mut data, 4, 0.9);
        for k in 0..17 {
            set(&mut data, 5 + k * 3, 100.0);
            set(&mut data, 5 + k * 3 + 1, 90.0 + k as f32);
            set(&mut data, 5 + k * 3 + 2, 0.8);
        }

        (data, vec![1, features, num_preds])
    }

    #[test]
    fn test_postprocess_single_pose() {
        let (output, shape) = single_pose_output(84);
        let preprocess = identity_preprocess(640, 640);
        let config = PoseConfig::new().with_confidence(0.5);

        let result = postprocess_pose(
            &output,
            &shape,
            17,
            &preprocess,
            &config,
            &names(),
            "test.mp4".to_string(),
            Speed::default(),
            (640, 640),
        );

        assert_eq!(result.len(), 1);
        let boxes = result.boxes.as_ref().unwrap();
        assert!((boxes.conf()[0] - 0.9).abs() < 1e-6);
        let xyxy = boxes.xyxy();
        assert!((xyxy[[0, 0]] - 75.0).abs() < 1e-4); // 100 - 50/2

        let kpts = result.keypoints.as_ref().unwrap();
        assert_eq!(kpts.num_keypoints(), 17);
        let xy = kpts.xy();
        assert!((xy[[0, 0, 0]] - 100.0).abs() < 1e-4);
        assert!((xy[[0, 3, 1]] - 93.0).abs() < 1e-4);
    }

    #[test]
    fn test_postprocess_below_threshold() {
        let (output, shape) = single_pose_output(84);
        let preprocess = identity_preprocess(640, 640);
        let config = PoseConfig::new().with_confidence(0.95);

        let result = postprocess_pose(
            &output,
            &shape,
            17,
            &preprocess,
            &config,
            &names(),
            "test.mp4".to_string(),
            Speed::default(),
            (640, 640),
        );

        assert!(result.is_empty());
        // Keypoints container is present but empty
        assert!(result.keypoints.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_postprocess_empty_output() {
        let preprocess = identity_preprocess(640, 640);
        let config = PoseConfig::default();

        let result = postprocess_pose(
            &[],
            &[1, 56, 0],
            17,
            &preprocess,
            &config,
            &names(),
            "test.mp4".to_string(),
            Speed::default(),
            (640, 640),
        );

        assert!(result.is_empty());
    }

    #[test]
    fn test_postprocess_unletterboxes_coords() {
        let (output, shape) = single_pose_output(84);
        // Frame was scaled by 0.5 and padded 20px on top
        let preprocess = PreprocessResult {
            tensor: Array4::zeros((1, 3, 640, 640)),
            tensor_f16: None,
            orig_shape: (1200, 1280),
            scale: (0.5, 0.5),
            padding: (20.0, 0.0),
        };
        let config = PoseConfig::new().with_confidence(0.5);

        let result = postprocess_pose(
            &output,
            &shape,
            17,
            &preprocess,
            &config,
            &names(),
            "test.mp4".to_string(),
            Speed::default(),
            (640, 640),
        );

        let kpts = result.keypoints.as_ref().unwrap();
        let xy = kpts.xy();
        // x: 100 / 0.5 = 200; y: (90 - 20) / 0.5 = 140
        assert!((xy[[0, 0, 0]] - 200.0).abs() < 1e-4);
        assert!((xy[[0, 0, 1]] - 140.0).abs() < 1e-4);
    }
}

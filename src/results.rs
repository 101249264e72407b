// Dance Skeleton 🕺 AGPL-3.0 License

//! Result types for pose detection output.

use std::collections::HashMap;

use ndarray::{Array2, Array3, ArrayView1, ArrayView2, Axis, s};

/// Timing information for pose detection (in milliseconds).
#[derive(Debug, Clone, Default)]
pub struct Speed {
    /// Time spent on preprocessing.
    pub preprocess: Option<f64>,
    /// Time spent on model inference.
    pub inference: Option<f64>,
    /// Time spent on postprocessing.
    pub postprocess: Option<f64>,
}

impl Speed {
    /// Create a new Speed instance with all timings in milliseconds.
    #[must_use]
    pub const fn new(preprocess: f64, inference: f64, postprocess: f64) -> Self {
        Self {
            preprocess: Some(preprocess),
            inference: Some(inference),
            postprocess: Some(postprocess),
        }
    }

    /// Total time across all stages in milliseconds.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.preprocess.unwrap_or(0.0)
            + self.inference.unwrap_or(0.0)
            + self.postprocess.unwrap_or(0.0)
    }
}

/// Pose detection output for a single frame.
///
/// Detections are consumed per frame; nothing here is persisted.
#[derive(Debug, Clone)]
pub struct PoseResult {
    /// Original frame shape (height, width).
    pub orig_shape: (u32, u32),
    /// Inference tensor shape (height, width) after letterboxing.
    pub inference_shape: (u32, u32),
    /// Person bounding boxes.
    pub boxes: Option<Boxes>,
    /// Pose keypoints per detected person.
    pub keypoints: Option<Keypoints>,
    /// Detection timing information.
    pub speed: Speed,
    /// Class ID to name mapping from the model metadata.
    pub names: HashMap<usize, String>,
    /// Source path or identifier.
    pub path: String,
}

impl PoseResult {
    /// Create an empty result for a frame.
    #[must_use]
    pub fn new(
        orig_shape: (u32, u32),
        inference_shape: (u32, u32),
        names: HashMap<usize, String>,
        speed: Speed,
        path: String,
    ) -> Self {
        Self {
            orig_shape,
            inference_shape,
            boxes: None,
            keypoints: None,
            speed,
            names,
            path,
        }
    }

    /// Number of detected poses.
    #[must_use]
    pub fn len(&self) -> usize {
        if let Some(ref keypoints) = self.keypoints {
            return keypoints.len();
        }
        if let Some(ref boxes) = self.boxes {
            return boxes.len();
        }
        0
    }

    /// Check if no poses were detected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Summary string describing the detections (e.g., "2 persons").
    #[must_use]
    pub fn verbose(&self) -> String {
        let count = self.len();
        if count == 0 {
            return "(no detections)".to_string();
        }

        let name = self
            .names
            .get(&0)
            .map_or("person", String::as_str);
        if count == 1 {
            format!("1 {name}")
        } else {
            format!("{count} {name}s")
        }
    }
}

/// Person bounding boxes.
///
/// Stores boxes in xyxy format along with confidence scores and class IDs.
#[derive(Debug, Clone)]
pub struct Boxes {
    /// Raw data array with shape (N, 6) containing [x1, y1, x2, y2, conf, cls].
    pub data: Array2<f32>,
    /// Original frame shape (height, width) for normalization.
    pub orig_shape: (u32, u32),
}

impl Boxes {
    /// Create a new Boxes instance from an (N, 6) array.
    #[must_use]
    pub const fn new(data: Array2<f32>, orig_shape: (u32, u32)) -> Self {
        Self { data, orig_shape }
    }

    /// Number of boxes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    /// Check if there are no boxes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Boxes in xyxy format [x1, y1, x2, y2].
    #[must_use]
    pub fn xyxy(&self) -> ArrayView2<'_, f32> {
        self.data.slice(s![.., 0..4])
    }

    /// Confidence scores (0.0 to 1.0).
    #[must_use]
    pub fn conf(&self) -> ArrayView1<'_, f32> {
        self.data.slice(s![.., 4])
    }

    /// Class IDs.
    #[must_use]
    pub fn cls(&self) -> ArrayView1<'_, f32> {
        self.data.slice(s![.., 5])
    }

    /// Boxes in xyxy format normalized by frame size to [0.0, 1.0].
    #[must_use]
    pub fn xyxyn(&self) -> Array2<f32> {
        let mut xyxyn = self.xyxy().to_owned();
        let (h, w) = (self.orig_shape.0 as f32, self.orig_shape.1 as f32);

        for mut row in xyxyn.rows_mut() {
            row[0] /= w;
            row[1] /= h;
            row[2] /= w;
            row[3] /= h;
        }

        xyxyn
    }
}

/// Pose keypoints.
///
/// Coordinates are in original-frame pixel space.
#[derive(Debug, Clone)]
pub struct Keypoints {
    /// Raw keypoint data with shape (N, K, 2) or (N, K, 3) if confidence
    /// values are included.
    pub data: Array3<f32>,
    /// Original frame shape (height, width).
    pub orig_shape: (u32, u32),
    /// Whether confidence values are included.
    has_conf: bool,
}

impl Keypoints {
    /// Create a new Keypoints instance.
    #[must_use]
    pub fn new(data: Array3<f32>, orig_shape: (u32, u32)) -> Self {
        let has_conf = data.shape()[2] == 3;
        Self {
            data,
            orig_shape,
            has_conf,
        }
    }

    /// Number of detected poses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.shape()[0]
    }

    /// Check if there are no keypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of keypoints per pose.
    #[must_use]
    pub fn num_keypoints(&self) -> usize {
        self.data.shape()[1]
    }

    /// Keypoint xy coordinates with shape (N, K, 2).
    #[must_use]
    pub fn xy(&self) -> Array3<f32> {
        self.data.slice(s![.., .., 0..2]).to_owned()
    }

    /// Keypoint xy coordinates normalized by frame size.
    #[must_use]
    pub fn xyn(&self) -> Array3<f32> {
        let mut xyn = self.xy();
        let (h, w) = (self.orig_shape.0 as f32, self.orig_shape.1 as f32);

        for mut pose in xyn.axis_iter_mut(Axis(0)) {
            for mut point in pose.rows_mut() {
                point[0] /= w;
                point[1] /= h;
            }
        }

        xyn
    }

    /// Per-keypoint confidence values (if available) with shape (N, K).
    #[must_use]
    pub fn conf(&self) -> Option<Array2<f32>> {
        if self.has_conf {
            Some(self.data.slice(s![.., .., 2]).to_owned())
        } else {
            None
        }
    }
}

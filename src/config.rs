// Dance Skeleton 🕺 AGPL-3.0 License

//! Pose detection configuration.
//!
//! This module defines the [`PoseConfig`] struct, which controls the
//! parameters of pose detection: confidence threshold, Non-Maximum
//! Suppression (NMS), input image sizing, and execution options.

use crate::delegate::Delegate;

/// Configuration for pose detection.
///
/// Uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use dance_skeleton::PoseConfig;
///
/// let config = PoseConfig::new()
///     .with_confidence(0.5)
///     .with_iou(0.45)
///     .with_max_poses(10);
/// ```
#[derive(Debug, Clone)]
pub struct PoseConfig {
    /// Confidence threshold for detected persons (0.0 to 1.0).
    /// Detections scoring below this value are discarded.
    pub confidence_threshold: f32,
    /// Intersection over Union (IoU) threshold for NMS (0.0 to 1.0).
    /// Lower values suppress more overlapping detections.
    pub iou_threshold: f32,
    /// Maximum number of poses to keep per frame.
    pub max_poses: usize,
    /// Explicit input image size (height, width).
    /// If `None`, the model's metadata determines the input size.
    pub imgsz: Option<(usize, usize)>,
    /// Number of intra-op threads for ONNX Runtime.
    /// `0` lets ONNX Runtime choose.
    pub num_threads: usize,
    /// Whether to feed FP16 (half-precision) tensors to the model.
    pub half: bool,
    /// Compute backend used to run the model.
    pub delegate: Delegate,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            iou_threshold: 0.45,
            max_poses: 10,
            imgsz: None,
            num_threads: 0,
            half: false,
            delegate: Delegate::Cpu,
        }
    }
}

impl PoseConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the confidence threshold.
    ///
    /// Detections with a confidence score below this threshold are filtered
    /// out.
    #[must_use]
    pub const fn with_confidence(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the IoU threshold for Non-Maximum Suppression.
    #[must_use]
    pub const fn with_iou(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    /// Set the maximum number of poses to keep per frame.
    #[must_use]
    pub const fn with_max_poses(mut self, max: usize) -> Self {
        self.max_poses = max;
        self
    }

    /// Set the input image size explicitly instead of reading it from the
    /// model metadata.
    #[must_use]
    pub const fn with_imgsz(mut self, height: usize, width: usize) -> Self {
        self.imgsz = Some((height, width));
        self
    }

    /// Set the number of intra-op threads. `0` lets ONNX Runtime decide.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Enable or disable FP16 (half-precision) input tensors.
    #[must_use]
    pub const fn with_half(mut self, half: bool) -> Self {
        self.half = half;
        self
    }

    /// Set the compute backend used to run the model.
    #[must_use]
    pub fn with_delegate(mut self, delegate: Delegate) -> Self {
        self.delegate = delegate;
        self
    }

    /// Validate threshold ranges.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when a threshold falls outside [0.0, 1.0].
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(crate::error::SkeletonError::ConfigError(format!(
                "confidence threshold {} outside [0.0, 1.0]",
                self.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(crate::error::SkeletonError::ConfigError(format!(
                "IoU threshold {} outside [0.0, 1.0]",
                self.iou_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = PoseConfig::default();
        assert!((config.confidence_threshold - 0.5).abs() < f32::EPSILON);
        assert!((config.iou_threshold - 0.45).abs() < f32::EPSILON);
        assert_eq!(config.max_poses, 10);
        assert_eq!(config.delegate, Delegate::Cpu);
    }

    #[test]
    fn test_config_builder() {
        let config = PoseConfig::new()
            .with_confidence(0.7)
            .with_iou(0.6)
            .with_max_poses(2)
            .with_imgsz(640, 640)
            .with_threads(4)
            .with_half(true);

        assert!((config.confidence_threshold - 0.7).abs() < f32::EPSILON);
        assert!((config.iou_threshold - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.max_poses, 2);
        assert_eq!(config.imgsz, Some((640, 640)));
        assert_eq!(config.num_threads, 4);
        assert!(config.half);
    }

    #[test]
    fn test_config_validate() {
        assert!(PoseConfig::new().validate().is_ok());
        assert!(PoseConfig::new().with_confidence(1.5).validate().is_err());
        assert!(PoseConfig::new().with_iou(-0.1).validate().is_err());
    }
}

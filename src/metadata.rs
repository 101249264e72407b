// Dance Skeleton 🕺 AGPL-3.0 License

//! ONNX model metadata parsing.
//!
//! Pose models exported by Ultralytics embed their configuration as YAML in
//! the ONNX custom metadata properties: task, input size, keypoint layout,
//! and class names. This module parses that block without pulling in a full
//! YAML dependency.

use std::collections::HashMap;

use crate::error::{Result, SkeletonError};

/// Metadata extracted from a pose model ONNX file.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    /// Model description string.
    pub description: String,
    /// Export tool version.
    pub version: String,
    /// The task this model performs ("pose" expected).
    pub task: String,
    /// Model stride (typically 32).
    pub stride: u32,
    /// Batch size the model was exported with.
    pub batch: usize,
    /// Input image size as (height, width).
    pub imgsz: (usize, usize),
    /// Keypoint layout as (count, dims per keypoint).
    pub kpt_shape: (usize, usize),
    /// Number of input channels (typically 3 for RGB).
    pub channels: usize,
    /// Whether the model was exported with FP16 weights.
    pub half: bool,
    /// Class ID to class name mapping.
    pub names: HashMap<usize, String>,
}

impl ModelMetadata {
    /// Parse metadata from ONNX custom metadata properties.
    ///
    /// # Errors
    ///
    /// Returns an error when no metadata block is present or it is malformed.
    pub fn from_onnx_metadata(metadata_map: &HashMap<String, String>) -> Result<Self> {
        let yaml_str = metadata_map
            .get("metadata")
            .or_else(|| metadata_map.get("model_metadata"))
            .or_else(|| metadata_map.values().find(|v| v.contains("task:")))
            .ok_or_else(|| {
                SkeletonError::MetadataError(
                    "No metadata found in ONNX model. Ensure the model was exported with its metadata block.".to_string()
                )
            })?;

        Self::from_yaml_str(yaml_str)
    }

    /// Parse metadata from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed numeric fields.
    pub fn from_yaml_str(yaml_str: &str) -> Result<Self> {
        let mut metadata = Self::default();

        for line in yaml_str.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim();
                let value = value.trim().trim_matches('\'').trim_matches('"');

                match key {
                    "description" => metadata.description = value.to_string(),
                    "version" => metadata.version = value.to_string(),
                    "task" => metadata.task = value.to_string(),
                    "stride" => {
                        metadata.stride = value.parse().map_err(|_| {
                            SkeletonError::MetadataError(format!("Invalid stride value: {value}"))
                        })?;
                    }
                    "batch" => {
                        metadata.batch = value.parse().map_err(|_| {
                            SkeletonError::MetadataError(format!("Invalid batch value: {value}"))
                        })?;
                    }
                    "channels" => {
                        metadata.channels = value.parse().map_err(|_| {
                            SkeletonError::MetadataError(format!("Invalid channels value: {value}"))
                        })?;
                    }
                    "half" => {
                        metadata.half = value == "true";
                    }
                    _ => {
                        // Inline class name entries use numeric keys
                        if let Ok(class_id) = key.trim().parse::<usize>() {
                            metadata.names.insert(class_id, value.to_string());
                        }
                    }
                }
            }
        }

        // imgsz and kpt_shape can be inline lists or multi-line YAML lists
        if let Some(line) = yaml_str.lines().find(|l| l.contains("imgsz:")) {
            metadata.imgsz = parse_pair(yaml_str, line, "imgsz:", (640, 640));
        }
        if let Some(line) = yaml_str.lines().find(|l| l.contains("kpt_shape:")) {
            metadata.kpt_shape = parse_pair(yaml_str, line, "kpt_shape:", (17, 3));
        }

        if metadata.names.is_empty() {
            metadata.names = parse_names_block(yaml_str);
        }

        Ok(metadata)
    }

    /// Check that this model performs pose estimation.
    ///
    /// # Errors
    ///
    /// Returns a `MetadataError` naming the actual task otherwise.
    pub fn require_pose(&self) -> Result<()> {
        if self.task == "pose" {
            Ok(())
        } else {
            Err(SkeletonError::MetadataError(format!(
                "Expected a pose model, got task '{}'",
                self.task
            )))
        }
    }

    /// Number of keypoints per detected pose.
    #[must_use]
    pub const fn num_keypoints(&self) -> usize {
        self.kpt_shape.0
    }

    /// Number of classes in this model.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.names.len()
    }

    /// Get a class name by ID.
    #[must_use]
    pub fn class_name(&self, class_id: usize) -> Option<&str> {
        self.names.get(&class_id).map(String::as_str)
    }
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            description: String::new(),
            version: String::new(),
            task: "pose".to_string(),
            stride: 32,
            batch: 1,
            imgsz: (640, 640),
            kpt_shape: (17, 3),
            channels: 3,
            half: false,
            names: HashMap::new(),
        }
    }
}

/// Parse a two-element list field like `imgsz: [640, 640]`, also accepting
/// the multi-line YAML list form.
fn parse_pair(
    yaml_str: &str,
    field_line: &str,
    field: &str,
    default: (usize, usize),
) -> (usize, usize) {
    // Inline form: "field: [a, b]"
    if let Some(bracket_start) = field_line.find('[') {
        if let Some(bracket_end) = field_line.find(']') {
            let values: Vec<usize> = field_line[bracket_start + 1..bracket_end]
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if values.len() >= 2 {
                return (values[0], values[1]);
            }
        }
    }

    // Multi-line list form
    let lines: Vec<&str> = yaml_str.lines().collect();
    let mut values = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if line.contains(field) {
            for following in lines.iter().skip(i + 1) {
                let trimmed = following.trim();
                if trimmed.starts_with('-') {
                    if let Ok(val) = trimmed.trim_start_matches('-').trim().parse::<usize>() {
                        values.push(val);
                    }
                } else if !trimmed.is_empty() && !trimmed.starts_with('#') {
                    break;
                }
                if values.len() >= 2 {
                    break;
                }
            }
            break;
        }
    }

    if values.len() >= 2 {
        (values[0], values[1])
    } else {
        default
    }
}

/// Parse the names block from YAML or Python dict format.
fn parse_names_block(yaml_str: &str) -> HashMap<usize, String> {
    let mut names = HashMap::new();

    // Ultralytics exports store names as a Python dict: `names: {0: 'person'}`
    if let Some(start) = yaml_str.find("names:") {
        let after_names = &yaml_str[start + 6..];
        let trimmed = after_names.trim();

        if trimmed.starts_with('{') {
            if let Some(end) = trimmed.find('}') {
                for entry in trimmed[1..end].split(',') {
                    if let Some((key, value)) = entry.trim().split_once(':') {
                        let value = value.trim().trim_matches('\'').trim_matches('"');
                        if let Ok(class_id) = key.trim().parse::<usize>() {
                            names.insert(class_id, value.to_string());
                        }
                    }
                }
                return names;
            }
        }
    }

    // YAML block form
    let mut in_names_block = false;
    let mut names_indent = 0;

    for line in yaml_str.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("names:") {
            in_names_block = true;
            names_indent = line.len() - line.trim_start().len();
            continue;
        }

        if in_names_block {
            let current_indent = line.len() - line.trim_start().len();

            if !trimmed.is_empty() && !trimmed.starts_with('#') && current_indent <= names_indent {
                if !trimmed.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                    break;
                }
            }

            if let Some((key, value)) = trimmed.split_once(':') {
                if let Ok(class_id) = key.trim().parse::<usize>() {
                    let class_name = value.trim().trim_matches('\'').trim_matches('"');
                    names.insert(class_id, class_name.to_string());
                }
            }
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_METADATA: &str = r"
description: Ultralytics YOLO11n-pose model trained on /usr/src/ultralytics/ultralytics/cfg/datasets/coco-pose.yaml
version: 8.3.0
stride: 32
task: pose
batch: 1
imgsz:
- 640
- 640
kpt_shape:
- 17
- 3
names:
  0: person
channels: 3
";

    #[test]
    fn test_parse_metadata() {
        let metadata = ModelMetadata::from_yaml_str(SAMPLE_METADATA).unwrap();

        assert_eq!(metadata.task, "pose");
        assert_eq!(metadata.stride, 32);
        assert_eq!(metadata.batch, 1);
        assert_eq!(metadata.imgsz, (640, 640));
        assert_eq!(metadata.kpt_shape, (17, 3));
        assert_eq!(metadata.channels, 3);
        assert_eq!(metadata.num_classes(), 1);
        assert_eq!(metadata.class_name(0), Some("person"));
        assert!(metadata.require_pose().is_ok());
    }

    #[test]
    fn test_parse_inline_lists() {
        let yaml = "task: pose\nimgsz: [640, 640]\nkpt_shape: [17, 3]\nstride: 32";
        let metadata = ModelMetadata::from_yaml_str(yaml).unwrap();
        assert_eq!(metadata.imgsz, (640, 640));
        assert_eq!(metadata.kpt_shape, (17, 3));
    }

    #[test]
    fn test_parse_python_dict_names() {
        let yaml = "task: pose\nnames: {0: 'person'}";
        let metadata = ModelMetadata::from_yaml_str(yaml).unwrap();
        assert_eq!(metadata.class_name(0), Some("person"));
    }

    #[test]
    fn test_reject_non_pose_model() {
        let yaml = "task: detect\nstride: 32";
        let metadata = ModelMetadata::from_yaml_str(yaml).unwrap();
        assert!(metadata.require_pose().is_err());
    }

    #[test]
    fn test_default_metadata() {
        let metadata = ModelMetadata::default();
        assert_eq!(metadata.task, "pose");
        assert_eq!(metadata.stride, 32);
        assert_eq!(metadata.imgsz, (640, 640));
        assert_eq!(metadata.num_keypoints(), 17);
    }
}

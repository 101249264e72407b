// Dance Skeleton 🕺 AGPL-3.0 License

//! Pose model loading and per-frame detection.
//!
//! Wraps an ONNX Runtime session over a pre-trained pose estimation model.
//! All landmark computation happens inside the model; this module only feeds
//! it frames and decodes its output.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use image::DynamicImage;
use ort::session::Session;
use ort::value::TensorRef;

#[cfg(feature = "coreml")]
use ort::execution_providers::CoreMLExecutionProvider;
#[cfg(feature = "cuda")]
use ort::execution_providers::CUDAExecutionProvider;

use crate::config::PoseConfig;
use crate::delegate::Delegate;
use crate::error::{Result, SkeletonError};
use crate::metadata::ModelMetadata;
use crate::postprocessing::postprocess_pose;
use crate::preprocessing::preprocess_frame;
use crate::results::{PoseResult, Speed};

/// Pose landmarker backed by an ONNX Runtime session.
///
/// # Example
///
/// ```no_run
/// use dance_skeleton::PoseModel;
///
/// let mut model = PoseModel::load("yolo11n-pose.onnx").unwrap();
/// let frame = image::open("dancer.jpg").unwrap();
/// let result = model.detect(&frame, "dancer.jpg".to_string()).unwrap();
/// println!("Found {} poses", result.len());
/// ```
pub struct PoseModel {
    /// ONNX Runtime session.
    session: Session,
    /// Model metadata (input size, keypoint layout, names).
    metadata: ModelMetadata,
    /// Input tensor name.
    input_name: String,
    /// Output tensor names.
    output_names: Vec<String>,
    /// Detection configuration.
    config: PoseConfig,
    /// Whether the model has been warmed up.
    warmed_up: bool,
}

impl PoseModel {
    /// Load a pose model from an ONNX file with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist, can't be loaded, or is
    /// not a pose model.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_config(path, PoseConfig::default())
    }

    /// Load a pose model with custom configuration.
    ///
    /// The model metadata (keypoint layout, input size, class names) is read
    /// from the ONNX custom metadata properties.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist, can't be loaded, or is
    /// not a pose model.
    pub fn load_with_config<P: AsRef<Path>>(path: P, config: PoseConfig) -> Result<Self> {
        let path = path.as_ref();

        config.validate()?;

        if !path.exists() {
            return Err(SkeletonError::ModelLoadError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        #[allow(unused_mut)]
        let mut builder = Session::builder().map_err(|e| {
            SkeletonError::ModelLoadError(format!("Failed to create session builder: {e}"))
        })?;

        match config.delegate {
            Delegate::Cpu => {}
            Delegate::Cuda(_index) => {
                #[cfg(feature = "cuda")]
                {
                    builder = builder
                        .with_execution_providers([CUDAExecutionProvider::default()
                            .with_device_id(_index as i32)
                            .build()])
                        .map_err(|e| {
                            SkeletonError::ModelLoadError(format!(
                                "Failed to register CUDA EP: {e}"
                            ))
                        })?;
                }
                #[cfg(not(feature = "cuda"))]
                return Err(SkeletonError::FeatureNotEnabled(
                    "CUDA delegate requires the 'cuda' feature".to_string(),
                ));
            }
            Delegate::CoreMl => {
                #[cfg(feature = "coreml")]
                {
                    builder = builder
                        .with_execution_providers([CoreMLExecutionProvider::default()
                            .with_subgraphs(true)
                            .build()])
                        .map_err(|e| {
                            SkeletonError::ModelLoadError(format!(
                                "Failed to register CoreML EP: {e}"
                            ))
                        })?;
                }
                #[cfg(not(feature = "coreml"))]
                return Err(SkeletonError::FeatureNotEnabled(
                    "CoreML delegate requires the 'coreml' feature".to_string(),
                ));
            }
        }

        let session = builder
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .map_err(|e| {
                SkeletonError::ModelLoadError(format!("Failed to set optimization level: {e}"))
            })?
            .with_intra_threads(config.num_threads)
            .map_err(|e| {
                SkeletonError::ModelLoadError(format!("Failed to set intra-thread count: {e}"))
            })?
            .commit_from_file(path)
            .map_err(|e| SkeletonError::ModelLoadError(format!("Failed to load model: {e}")))?;

        let metadata = Self::extract_metadata(&session)?;
        metadata.require_pose()?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "images".to_string());

        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();

        // Model metadata supplies the input size unless overridden
        let config = PoseConfig {
            imgsz: config.imgsz.or(Some(metadata.imgsz)),
            ..config
        };

        Ok(Self {
            session,
            metadata,
            input_name,
            output_names,
            config,
            warmed_up: false,
        })
    }

    /// Warm up the model by running inference on a zeroed input.
    ///
    /// Pre-allocates memory and settles the execution graph so the first
    /// real frame doesn't pay the setup cost. Called automatically on first
    /// detect.
    ///
    /// # Errors
    ///
    /// Returns an error if the warmup inference fails.
    pub fn warmup(&mut self) -> Result<()> {
        if self.warmed_up {
            return Ok(());
        }

        let target_size = self.config.imgsz.unwrap_or(self.metadata.imgsz);
        if self.metadata.half {
            let dummy_input = ndarray::Array4::from_elem(
                (1, 3, target_size.0, target_size.1),
                half::f16::ZERO,
            );
            let _ = self.run_inference_f16(&dummy_input)?;
        } else {
            let dummy_input = ndarray::Array4::<f32>::zeros((1, 3, target_size.0, target_size.1));
            let _ = self.run_inference(&dummy_input)?;
        }

        self.warmed_up = true;
        Ok(())
    }

    /// Extract the Ultralytics metadata block from the session.
    fn extract_metadata(session: &Session) -> Result<ModelMetadata> {
        let model_metadata = session.metadata().map_err(|e| {
            SkeletonError::ModelLoadError(format!("Failed to get model metadata: {e}"))
        })?;

        let mut metadata_map: HashMap<String, String> = HashMap::new();

        // Metadata is stored under individual keys; collect them into one
        // YAML blob for the parser
        let keys = [
            "description",
            "author",
            "date",
            "version",
            "license",
            "stride",
            "task",
            "batch",
            "imgsz",
            "kpt_shape",
            "names",
            "half",
            "channels",
        ];

        for key in &keys {
            if let Ok(Some(value)) = model_metadata.custom(key) {
                metadata_map.insert((*key).to_string(), value);
            }
        }

        if !metadata_map.is_empty() {
            let combined_yaml = metadata_map
                .iter()
                .map(|(key, value)| format!("{key}: {value}"))
                .collect::<Vec<_>>()
                .join("\n");
            let mut combined_map = HashMap::new();
            combined_map.insert(String::new(), combined_yaml);
            return ModelMetadata::from_onnx_metadata(&combined_map);
        }

        // Fall back to a single combined key
        for key in &["", "metadata", "model_metadata"] {
            if let Ok(Some(value)) = model_metadata.custom(key) {
                metadata_map.insert((*key).to_string(), value);
            }
        }

        if metadata_map.is_empty() {
            return Ok(ModelMetadata::default());
        }

        ModelMetadata::from_onnx_metadata(&metadata_map)
    }

    /// Run pose detection on a single frame.
    ///
    /// # Arguments
    ///
    /// * `frame` - The frame to run detection on.
    /// * `path` - Source path or identifier carried into the result.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    pub fn detect(&mut self, frame: &DynamicImage, path: String) -> Result<PoseResult> {
        if !self.warmed_up {
            self.warmup()?;
        }

        let target_size = self.config.imgsz.unwrap_or(self.metadata.imgsz);
        // Input dtype follows the model's export precision
        let use_half = self.metadata.half;

        let start_preprocess = Instant::now();
        let preprocess_result = preprocess_frame(frame, target_size, use_half);
        let preprocess_time = start_preprocess.elapsed().as_secs_f64() * 1000.0;

        let start_inference = Instant::now();
        let (output_data, output_shape) = match &preprocess_result.tensor_f16 {
            Some(tensor_f16) => self.run_inference_f16(tensor_f16)?,
            None => self.run_inference(&preprocess_result.tensor)?,
        };
        let inference_time = start_inference.elapsed().as_secs_f64() * 1000.0;

        let start_postprocess = Instant::now();

        let speed = Speed::new(preprocess_time, inference_time, 0.0);
        let tensor_shape = preprocess_result.tensor.shape();
        let inference_shape = (tensor_shape[2] as u32, tensor_shape[3] as u32);

        let mut result = postprocess_pose(
            &output_data,
            &output_shape,
            self.metadata.num_keypoints(),
            &preprocess_result,
            &self.config,
            &self.metadata.names,
            path,
            speed,
            inference_shape,
        );

        result.speed.postprocess = Some(start_postprocess.elapsed().as_secs_f64() * 1000.0);

        Ok(result)
    }

    /// Run the session on an FP32 input tensor.
    fn run_inference(&mut self, input: &ndarray::Array4<f32>) -> Result<(Vec<f32>, Vec<usize>)> {
        let input_contiguous = input.as_standard_layout();
        let input_tensor = TensorRef::from_array_view(&input_contiguous).map_err(|e| {
            SkeletonError::InferenceError(format!("Failed to create input tensor: {e}"))
        })?;

        let inputs = ort::inputs![&self.input_name => input_tensor];

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| SkeletonError::InferenceError(format!("Inference failed: {e}")))?;

        let output_name = &self.output_names[0];
        let output = outputs.get(output_name.as_str()).ok_or_else(|| {
            SkeletonError::InferenceError(format!("Output '{output_name}' not found"))
        })?;

        // FP16 models return f16 outputs; widen them to f32
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let shape_vec: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
            return Ok((data.to_vec(), shape_vec));
        }

        let (shape, data) = output.try_extract_tensor::<half::f16>().map_err(|e| {
            SkeletonError::InferenceError(format!("Failed to extract output: {e}"))
        })?;
        let shape_vec: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        let data_vec: Vec<f32> = data.iter().map(|&v| f32::from(v)).collect();

        Ok((data_vec, shape_vec))
    }

    /// Run the session on an FP16 input tensor.
    fn run_inference_f16(
        &mut self,
        input: &ndarray::Array4<half::f16>,
    ) -> Result<(Vec<f32>, Vec<usize>)> {
        let input_contiguous = input.as_standard_layout();
        let input_tensor = TensorRef::from_array_view(&input_contiguous).map_err(|e| {
            SkeletonError::InferenceError(format!("Failed to create input tensor: {e}"))
        })?;

        let inputs = ort::inputs![&self.input_name => input_tensor];

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| SkeletonError::InferenceError(format!("Inference failed: {e}")))?;

        let output_name = &self.output_names[0];
        let output = outputs.get(output_name.as_str()).ok_or_else(|| {
            SkeletonError::InferenceError(format!("Output '{output_name}' not found"))
        })?;

        if let Ok((shape, data)) = output.try_extract_tensor::<half::f16>() {
            let shape_vec: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
            let data_vec: Vec<f32> = data.iter().map(|&v| f32::from(v)).collect();
            return Ok((data_vec, shape_vec));
        }

        let (shape, data) = output.try_extract_tensor::<f32>().map_err(|e| {
            SkeletonError::InferenceError(format!("Failed to extract output: {e}"))
        })?;
        let shape_vec: Vec<usize> = shape.iter().map(|&d| d as usize).collect();

        Ok((data.to_vec(), shape_vec))
    }

    /// The model's class names.
    #[must_use]
    pub fn names(&self) -> &HashMap<usize, String> {
        &self.metadata.names
    }

    /// The model's input size (height, width).
    #[must_use]
    pub const fn imgsz(&self) -> (usize, usize) {
        self.metadata.imgsz
    }

    /// Number of keypoints per detected pose.
    #[must_use]
    pub const fn num_keypoints(&self) -> usize {
        self.metadata.num_keypoints()
    }

    /// The model metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &PoseConfig {
        &self.config
    }
}

impl std::fmt::Debug for PoseModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseModel")
            .field("task", &self.metadata.task)
            .field("kpt_shape", &self.metadata.kpt_shape)
            .field("imgsz", &self.metadata.imgsz)
            .field("stride", &self.metadata.stride)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_not_found() {
        let result = PoseModel::load("nonexistent.onnx");
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            SkeletonError::ModelLoadError(_)
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PoseConfig::new().with_confidence(2.0);
        let result = PoseModel::load_with_config("nonexistent.onnx", config);
        assert!(matches!(
            result.unwrap_err(),
            SkeletonError::ConfigError(_)
        ));
    }
}

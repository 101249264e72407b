// Dance Skeleton 🕺 AGPL-3.0 License

#![allow(clippy::multiple_crate_versions)]

//! # Dance Skeleton
//!
//! Pose-estimation skeleton overlay for dance training videos, written in
//! Rust. Loads a video, runs a pre-trained ONNX pose model over each frame
//! through ONNX Runtime, draws a simplified stick-figure skeleton on the
//! dancer, and optionally writes the annotated video to disk.
//!
//! ## Features
//!
//! - **Pose estimation** - Pre-trained YOLO11-pose ONNX model via ONNX Runtime,
//!   auto-downloaded on first use
//! - **Simplified skeleton** - Body-only dance topology (arms, torso, legs),
//!   tuned for readability on a moving dancer
//! - **Video in/out** - FFmpeg-backed decode and H.264 encode via `video-rs`
//! - **Live display** - Optional window with pause/stop playback control
//! - **Tunable overlay** - Detection confidence and skeleton color
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use dance_skeleton::{PoseModel, PoseConfig, SkeletonColor, annotate::annotate_frame};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PoseConfig::new().with_confidence(0.5);
//!     let mut model = PoseModel::load_with_config("yolo11n-pose.onnx", config)?;
//!
//!     let frame = image::open("dancer.jpg")?;
//!     let result = model.detect(&frame, "dancer.jpg".to_string())?;
//!     println!("Found {} poses", result.len());
//!
//!     let annotated = annotate_frame(&frame, &result, SkeletonColor::Default);
//!     annotated.save("dancer_skeleton.jpg")?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Overlay the skeleton and save the annotated video (model auto-downloads)
//! dance-skeleton process --source bachata.mp4
//!
//! # Tune confidence and pick a color
//! dance-skeleton process -s bachata.mp4 --conf 0.6 --color blue
//!
//! # Watch live; Space pauses, Escape or Q stops
//! dance-skeleton process -s bachata.mp4 --show
//!
//! # Display only, no output file
//! dance-skeleton process -s bachata.mp4 --show --save false
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`model`] | [`PoseModel`] for loading the ONNX model and per-frame detection |
//! | [`results`] | Output types ([`PoseResult`], [`Boxes`], [`Keypoints`]) |
//! | [`config`] | [`PoseConfig`] detection settings |
//! | [`annotate`] | Skeleton overlay drawing |
//! | [`source`] | Video decoding ([`source::VideoReader`]) |
//! | [`io`] | Annotated video encoding ([`io::VideoWriter`]) |
//! | [`visualizer`] | Skeleton topology, colors, and the display window |
//! | [`download`] | Pose model auto-download |
//! | [`error`] | Error types ([`SkeletonError`], [`Result`]) |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `annotate` | Skeleton drawing support (default) |
//! | `visualize` | Real-time window display (default) |
//! | `video` | Video decode/encode via FFmpeg (default) |
//! | `cuda` | NVIDIA CUDA delegate |
//! | `coreml` | Apple `CoreML` delegate |

// Modules
#[cfg(feature = "annotate")]
pub mod annotate;
pub mod cli;
pub mod config;
pub mod delegate;
pub mod download;
pub mod error;
pub mod io;
pub mod metadata;
pub mod model;
pub mod postprocessing;
pub mod preprocessing;
pub mod results;
pub mod source;
pub mod utils;
pub mod visualizer;

// Re-export main types for convenience
pub use config::PoseConfig;
pub use delegate::Delegate;
pub use error::{Result, SkeletonError};
pub use model::PoseModel;
pub use results::{Boxes, Keypoints, PoseResult, Speed};
pub use source::SourceMeta;
pub use visualizer::{Color, DANCE_SKELETON, KEYPOINT_NAMES, SkeletonColor};

// Re-export metadata for advanced use
pub use metadata::ModelMetadata;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "dance-skeleton");
    }
}

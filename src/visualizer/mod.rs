// Dance Skeleton 🕺 AGPL-3.0 License

//! Visualization: skeleton topology, overlay colors, and the display window.

/// Color definitions and the skeleton color choices.
pub mod color;

/// Skeleton topology table and keypoint names.
pub mod skeleton;

#[cfg(feature = "visualize")]
pub mod viewer;

pub use color::{Color, SkeletonColor};
pub use skeleton::{DANCE_SKELETON, KEYPOINT_NAMES};

#[cfg(feature = "visualize")]
pub use viewer::{Viewer, ViewerState};

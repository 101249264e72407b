// Dance Skeleton 🕺 AGPL-3.0 License

//! Video input handling.
//!
//! Opens a video file and yields decoded frames with per-frame metadata.

use std::path::Path;
#[cfg(feature = "video")]
use std::path::PathBuf;

#[cfg(feature = "video")]
use image::DynamicImage;

#[cfg(feature = "video")]
use crate::error::{Result, SkeletonError};

/// Video container extensions accepted by the loader.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v", "mpeg", "mpg",
];

/// Check if a path looks like a video file based on its extension.
#[must_use]
pub fn is_video_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy().to_lowercase();
        VIDEO_EXTENSIONS.contains(&ext.as_str())
    })
}

/// Metadata about a source frame.
#[derive(Debug, Clone)]
pub struct SourceMeta {
    /// Frame index.
    pub frame_idx: usize,
    /// Total frames (estimated from duration and frame rate; may be unknown).
    pub total_frames: Option<usize>,
    /// Source path or identifier.
    pub path: String,
    /// Frames per second.
    pub fps: Option<f32>,
}

/// Static properties of an opened video.
#[derive(Debug, Clone, Copy)]
pub struct VideoInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second.
    pub fps: f32,
    /// Total frames, estimated from duration and frame rate.
    pub total_frames: Option<usize>,
}

/// Iterator over decoded frames of a video file.
#[cfg(feature = "video")]
pub struct VideoReader {
    path: PathBuf,
    decoder: video_rs::decode::Decoder,
    current_frame: usize,
    info: VideoInfo,
}

#[cfg(feature = "video")]
impl VideoReader {
    /// Open a video file for reading.
    ///
    /// # Errors
    ///
    /// Returns a `VideoError` when the extension isn't a known video
    /// container or the decoder cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !is_video_file(path) {
            return Err(SkeletonError::VideoError(format!(
                "Not a recognized video file: {} (expected one of: {})",
                path.display(),
                VIDEO_EXTENSIONS.join(", ")
            )));
        }

        if !path.exists() {
            return Err(SkeletonError::VideoError(format!(
                "Video file not found: {}",
                path.display()
            )));
        }

        crate::io::init_video();

        let decoder = video_rs::decode::Decoder::new(path).map_err(|e| {
            SkeletonError::VideoError(format!("Failed to open {}: {e}", path.display()))
        })?;

        let (width, height) = decoder.size();
        let fps = decoder.frame_rate();

        // Containers don't carry an exact frame count; duration x fps is the
        // usual estimate
        let total_frames = decoder.duration().ok().map(|duration| {
            let duration_seconds = duration.as_secs_f64();
            (duration_seconds * f64::from(fps)) as usize
        });

        let info = VideoInfo {
            width,
            height,
            fps,
            total_frames,
        };

        Ok(Self {
            path: path.to_path_buf(),
            decoder,
            current_frame: 0,
            info,
        })
    }

    /// Static properties of the opened video.
    #[must_use]
    pub const fn info(&self) -> VideoInfo {
        self.info
    }

    /// The source path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn next_frame(&mut self) -> Option<Result<(DynamicImage, SourceMeta)>> {
        match self.decoder.decode() {
            Ok((_ts, frame)) => {
                let meta = SourceMeta {
                    frame_idx: self.current_frame,
                    total_frames: self.info.total_frames,
                    path: self.path.to_string_lossy().to_string(),
                    fps: Some(self.info.fps),
                };
                self.current_frame += 1;

                match frame_to_image(&frame) {
                    Ok(img) => Some(Ok((img, meta))),
                    Err(e) => Some(Err(e)),
                }
            }
            // The decoder reports end-of-stream as an error; treat any decode
            // failure as end of video
            Err(_) => None,
        }
    }
}

#[cfg(feature = "video")]
impl Iterator for VideoReader {
    type Item = Result<(DynamicImage, SourceMeta)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame()
    }
}

/// Convert a decoded `video_rs` frame (HWC u8 ndarray) to a `DynamicImage`.
#[cfg(feature = "video")]
fn frame_to_image(arr: &video_rs::Frame) -> Result<DynamicImage> {
    let shape = arr.shape();
    let height = u32::try_from(shape[0])
        .map_err(|_| SkeletonError::ImageError("Frame height exceeds u32::MAX".to_string()))?;
    let width = u32::try_from(shape[1])
        .map_err(|_| SkeletonError::ImageError("Frame width exceeds u32::MAX".to_string()))?;

    let mut rgb_data = Vec::with_capacity((height * width * 3) as usize);
    for y in 0..height as usize {
        for x in 0..width as usize {
            rgb_data.push(arr[[y, x, 0]]);
            rgb_data.push(arr[[y, x, 1]]);
            rgb_data.push(arr[[y, x, 2]]);
        }
    }

    let img_buffer = image::RgbImage::from_raw(width, height, rgb_data)
        .ok_or_else(|| SkeletonError::ImageError("Failed to create image from frame".to_string()))?;

    Ok(DynamicImage::ImageRgb8(img_buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_video_file() {
        assert!(is_video_file(Path::new("dance.mp4")));
        assert!(is_video_file(Path::new("dance.MOV")));
        assert!(is_video_file(Path::new("clips/salsa.mkv")));
        assert!(!is_video_file(Path::new("dance.jpg")));
        assert!(!is_video_file(Path::new("dance")));
    }

    #[cfg(feature = "video")]
    #[test]
    fn test_open_rejects_non_video_extension() {
        let result = VideoReader::open("photo.png");
        assert!(matches!(
            result.unwrap_err(),
            SkeletonError::VideoError(_)
        ));
    }

    #[cfg(feature = "video")]
    #[test]
    fn test_open_missing_file() {
        let result = VideoReader::open("no_such_video.mp4");
        assert!(matches!(
            result.unwrap_err(),
            SkeletonError::VideoError(_)
        ));
    }
}

// Dance Skeleton 🕺 AGPL-3.0 License

//! Frame preprocessing for pose inference.
//!
//! Handles letterbox resizing, normalization, and conversion to the NCHW
//! tensor layout the model expects, plus the inverse coordinate mapping used
//! to bring detections back into original-frame pixel space.

use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use half::f16;
use image::{DynamicImage, GenericImageView, RgbImage};
use ndarray::Array4;

/// Letterbox padding color (gray), matching the value the model was trained
/// with.
pub const LETTERBOX_COLOR: [u8; 3] = [114, 114, 114];

/// Normalized letterbox padding value (114/255).
const LETTERBOX_NORM: f32 = 114.0 / 255.0;

/// Result of preprocessing a frame, containing the tensor and transform info.
#[derive(Debug, Clone)]
pub struct PreprocessResult {
    /// Preprocessed frame tensor in NCHW format, normalized to [0, 1].
    pub tensor: Array4<f32>,
    /// Preprocessed FP16 tensor (if requested).
    pub tensor_f16: Option<Array4<f16>>,
    /// Original frame dimensions (height, width).
    pub orig_shape: (u32, u32),
    /// Scale factors applied (`scale_y`, `scale_x`).
    pub scale: (f32, f32),
    /// Padding applied (`pad_top`, `pad_left`).
    pub padding: (f32, f32),
}

/// Preprocess a frame for pose inference.
///
/// Performs aspect-preserving letterbox resize with gray padding,
/// normalization to [0, 1], and conversion to NCHW tensor format.
///
/// # Arguments
///
/// * `image` - Input frame.
/// * `target_size` - Model input size as (height, width).
/// * `half` - If true, also produce an FP16 copy of the tensor.
#[must_use]
pub fn preprocess_frame(
    image: &DynamicImage,
    target_size: (usize, usize),
    half: bool,
) -> PreprocessResult {
    let (orig_width, orig_height) = image.dimensions();
    let orig_shape = (orig_height, orig_width);

    let (new_width, new_height, pad_left, pad_top, scale) =
        calculate_letterbox_params(orig_width, orig_height, target_size);

    let resized = resize_bilinear(image, new_width, new_height);
    let tensor = letterbox_to_tensor(&resized, target_size, pad_top, pad_left);

    let tensor_f16 = if half {
        Some(tensor.mapv(f16::from_f32))
    } else {
        None
    };

    PreprocessResult {
        tensor,
        tensor_f16,
        orig_shape,
        scale,
        padding: (pad_top as f32, pad_left as f32),
    }
}

/// Calculate letterbox parameters for resizing.
///
/// Computes new dimensions and centered padding so the frame fits the target
/// size while keeping its aspect ratio.
///
/// # Returns
///
/// `(new_width, new_height, pad_left, pad_top, (scale_y, scale_x))`.
fn calculate_letterbox_params(
    orig_width: u32,
    orig_height: u32,
    target_size: (usize, usize),
) -> (u32, u32, u32, u32, (f32, f32)) {
    let (target_h, target_w) = (target_size.0 as f32, target_size.1 as f32);
    let (orig_h, orig_w) = (orig_height as f32, orig_width as f32);

    let scale = (target_h / orig_h).min(target_w / orig_w);

    let new_w = ((orig_w * scale).round() as u32).max(1);
    let new_h = ((orig_h * scale).round() as u32).max(1);

    let pad_w = (target_size.1 as u32).saturating_sub(new_w);
    let pad_h = (target_size.0 as u32).saturating_sub(new_h);

    // Center alignment: split padding equally on both sides
    let pad_left = pad_w / 2;
    let pad_top = pad_h / 2;

    let scale_x = new_w as f32 / orig_w;
    let scale_y = new_h as f32 / orig_h;

    (new_w, new_h, pad_left, pad_top, (scale_y, scale_x))
}

/// Bilinear resize via `fast_image_resize`.
fn resize_bilinear(image: &DynamicImage, new_w: u32, new_h: u32) -> RgbImage {
    let (src_w, src_h) = image.dimensions();
    let src_rgb = image.to_rgb8();

    if src_w == new_w && src_h == new_h {
        return src_rgb;
    }

    let src_image = Image::from_vec_u8(src_w, src_h, src_rgb.into_raw(), PixelType::U8x3)
        .expect("Failed to create source image");

    let mut dst_image = Image::new(new_w, new_h, PixelType::U8x3);

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .expect("Failed to resize frame");

    RgbImage::from_raw(new_w, new_h, dst_image.into_vec())
        .expect("resized buffer matches dimensions")
}

/// Place a resized frame into a padded, normalized NCHW tensor.
fn letterbox_to_tensor(
    resized: &RgbImage,
    target_size: (usize, usize),
    pad_top: u32,
    pad_left: u32,
) -> Array4<f32> {
    let (dst_h, dst_w) = target_size;
    let (new_w, new_h) = resized.dimensions();
    let pixels = resized.as_raw();

    let mut tensor = Array4::from_elem((1, 3, dst_h, dst_w), LETTERBOX_NORM);

    let (pad_top, pad_left) = (pad_top as usize, pad_left as usize);
    let channel_size = dst_h * dst_w;

    // Split the backing slice into per-channel planes for contiguous writes
    let slice = tensor.as_slice_mut().expect("tensor is contiguous");
    let (r_plane, rest) = slice.split_at_mut(channel_size);
    let (g_plane, b_plane) = rest.split_at_mut(channel_size);

    for y in 0..new_h as usize {
        let dst_row = (pad_top + y) * dst_w + pad_left;
        let src_row = y * new_w as usize * 3;
        for x in 0..new_w as usize {
            let src = src_row + x * 3;
            let dst = dst_row + x;
            r_plane[dst] = f32::from(pixels[src]) / 255.0;
            g_plane[dst] = f32::from(pixels[src + 1]) / 255.0;
            b_plane[dst] = f32::from(pixels[src + 2]) / 255.0;
        }
    }

    tensor
}

/// Scale coordinates from model output space back to original frame space.
///
/// # Arguments
///
/// * `coords` - Coordinates in model space (after letterbox).
/// * `scale` - Scale factors (`scale_y`, `scale_x`) from preprocessing.
/// * `padding` - Padding (`pad_top`, `pad_left`) from preprocessing.
#[must_use]
pub fn scale_coords(coords: &[f32; 4], scale: (f32, f32), padding: (f32, f32)) -> [f32; 4] {
    let (scale_y, scale_x) = scale;
    let (pad_top, pad_left) = padding;

    [
        (coords[0] - pad_left) / scale_x, // x1
        (coords[1] - pad_top) / scale_y,  // y1
        (coords[2] - pad_left) / scale_x, // x2
        (coords[3] - pad_top) / scale_y,  // y2
    ]
}

/// Clip box coordinates to frame bounds.
#[must_use]
pub const fn clip_coords(coords: &[f32; 4], shape: (u32, u32)) -> [f32; 4] {
    let (h, w) = (shape.0 as f32, shape.1 as f32);
    [
        coords[0].clamp(0.0, w),
        coords[1].clamp(0.0, h),
        coords[2].clamp(0.0, w),
        coords[3].clamp(0.0, h),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_params_square() {
        let (new_w, new_h, pad_left, pad_top, _scale) =
            calculate_letterbox_params(640, 640, (640, 640));

        assert_eq!(new_w, 640);
        assert_eq!(new_h, 640);
        assert_eq!(pad_left, 0);
        assert_eq!(pad_top, 0);
    }

    #[test]
    fn test_letterbox_params_wide() {
        let (new_w, new_h, pad_left, pad_top, _scale) =
            calculate_letterbox_params(1280, 720, (640, 640));

        // Wide frame scales to full width with vertical padding
        assert_eq!(new_w, 640);
        assert_eq!(new_h, 360);
        assert_eq!(pad_left, 0);
        assert_eq!(pad_top, 140);
    }

    #[test]
    fn test_preprocess_shapes() {
        let img = DynamicImage::new_rgb8(320, 240);
        let result = preprocess_frame(&img, (640, 640), false);

        assert_eq!(result.tensor.shape(), &[1, 3, 640, 640]);
        assert_eq!(result.orig_shape, (240, 320));
        assert!(result.tensor_f16.is_none());

        // Top rows are padding
        assert!((result.tensor[[0, 0, 0, 0]] - 114.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_preprocess_half() {
        let img = DynamicImage::new_rgb8(64, 64);
        let result = preprocess_frame(&img, (64, 64), true);
        assert!(result.tensor_f16.is_some());
    }

    #[test]
    fn test_scale_coords() {
        let coords = [100.0, 100.0, 200.0, 200.0];
        let scaled = scale_coords(&coords, (1.0, 1.0), (10.0, 10.0));

        assert!((scaled[0] - 90.0).abs() < 1e-6);
        assert!((scaled[1] - 90.0).abs() < 1e-6);
        assert!((scaled[2] - 190.0).abs() < 1e-6);
        assert!((scaled[3] - 190.0).abs() < 1e-6);
    }

    #[test]
    fn test_clip_coords() {
        let coords = [-10.0, -20.0, 700.0, 500.0];
        let clipped = clip_coords(&coords, (480, 640));

        assert!((clipped[0] - 0.0).abs() < 1e-6);
        assert!((clipped[1] - 0.0).abs() < 1e-6);
        assert!((clipped[2] - 640.0).abs() < 1e-6);
        assert!((clipped[3] - 480.0).abs() < 1e-6);
    }
}

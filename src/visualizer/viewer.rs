// Dance Skeleton 🕺 AGPL-3.0 License

//! Display window for annotated frames.
//!
//! The window carries the playback controls: Escape or Q stops processing,
//! Space toggles pause.

use image::DynamicImage;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::error::{Result, SkeletonError};

/// Playback state reported by the viewer after each update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    /// Keep processing frames.
    Playing,
    /// Hold the current frame; processing is suspended.
    Paused,
    /// The user closed the window or pressed a stop key.
    Stopped,
}

/// A frame viewer using minifb.
pub struct Viewer {
    window: Window,
    pub width: usize,
    pub height: usize,
    buffer: Vec<u32>,
    paused: bool,
}

impl Viewer {
    /// Create a new viewer window.
    ///
    /// # Errors
    ///
    /// Returns a `ViewerError` when the window cannot be created.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| SkeletonError::ViewerError(format!("Failed to create window: {e}")))?;

        // Limit update rate
        window.limit_update_rate(Some(std::time::Duration::from_micros(16600)));

        Ok(Self {
            window,
            width,
            height,
            buffer: Vec::new(),
            paused: false,
        })
    }

    /// Whether playback is currently paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Update the window with a new frame and report the playback state.
    ///
    /// # Errors
    ///
    /// Returns a `ViewerError` when the buffer update fails.
    pub fn update(&mut self, frame: &DynamicImage) -> Result<ViewerState> {
        if self.stop_requested() {
            return Ok(ViewerState::Stopped);
        }
        self.poll_pause_key();

        let (img_width, img_height) = (frame.width() as usize, frame.height() as usize);

        let num_pixels = img_width * img_height;
        if self.buffer.len() != num_pixels {
            self.buffer.resize(num_pixels, 0);
        }

        // Pack pixels as 0x00RRGGBB, the format minifb expects
        let rgb = frame.to_rgb8();
        for (i, pixel) in rgb.pixels().enumerate() {
            let r = u32::from(pixel[0]);
            let g = u32::from(pixel[1]);
            let b = u32::from(pixel[2]);
            self.buffer[i] = (r << 16) | (g << 8) | b;
        }

        if self.width != img_width || self.height != img_height {
            self.width = img_width;
            self.height = img_height;
        }

        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| SkeletonError::ViewerError(format!("Failed to update window: {e}")))?;

        if self.paused {
            Ok(ViewerState::Paused)
        } else {
            Ok(ViewerState::Playing)
        }
    }

    /// Keep the window responsive while paused, without consuming a frame.
    ///
    /// Returns the state after polling input, so the caller can resume or
    /// stop. The last frame persists on screen.
    ///
    /// # Errors
    ///
    /// Returns a `ViewerError` when the buffer update fails.
    pub fn idle(&mut self) -> Result<ViewerState> {
        if self.stop_requested() {
            return Ok(ViewerState::Stopped);
        }
        self.poll_pause_key();

        if !self.buffer.is_empty() {
            self.window
                .update_with_buffer(&self.buffer, self.width, self.height)
                .map_err(|e| {
                    SkeletonError::ViewerError(format!("Failed to update window: {e}"))
                })?;
        } else {
            self.window.update();
        }

        if self.paused {
            Ok(ViewerState::Paused)
        } else {
            Ok(ViewerState::Playing)
        }
    }

    fn stop_requested(&self) -> bool {
        !self.window.is_open()
            || self.window.is_key_down(Key::Escape)
            || self.window.is_key_down(Key::Q)
    }

    fn poll_pause_key(&mut self) {
        if self.window.is_key_pressed(Key::Space, KeyRepeat::No) {
            self.paused = !self.paused;
        }
    }
}

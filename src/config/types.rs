use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which averaging implementation the worker pool delegates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process decoding and pixel averaging.
    Local,
    /// The HTTP image processor service (`/brightness`, `/average`).
    Remote,
}

/// Run configuration. Passed by reference into each component, never held as
/// global state, so every threshold is overridable in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How many consecutive selected images blend into one output frame.
    pub window_size: usize,
    /// Mean luma below this rejects a source image as a night shot.
    pub brightness_threshold: f64,
    pub canonical_width: u32,
    pub canonical_height: u32,
    /// Desired length of the finished clip.
    pub clip_duration_seconds: u32,
    pub frame_rate: u32,
    pub source_extension: String,
    pub backend: BackendKind,
    pub remote_url: String,
    /// Pixel height of the rendered timestamp text.
    pub font_scale: f32,
    /// Soundtrack muxed under the video, if any.
    pub audio_track: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_size: 12,
            brightness_threshold: 90.0,
            canonical_width: 1280,
            canonical_height: 720,
            clip_duration_seconds: 60,
            frame_rate: 20,
            source_extension: "jpg".to_string(),
            backend: BackendKind::Local,
            remote_url: "http://localhost:6000".to_string(),
            font_scale: 28.0,
            audio_track: None,
        }
    }
}

impl Settings {
    /// Frame budget the selector aims for: enough frames for the desired
    /// clip length, plus the window size so the tail batches stay full.
    #[must_use]
    pub fn target_frame_count(&self) -> usize {
        (self.clip_duration_seconds as usize) * (self.frame_rate as usize) + self.window_size
    }

    #[must_use]
    pub const fn canonical_resolution(&self) -> (u32, u32) {
        (self.canonical_width, self.canonical_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_frame_count() {
        let settings = Settings {
            clip_duration_seconds: 60,
            frame_rate: 20,
            window_size: 12,
            ..Settings::default()
        };
        assert_eq!(settings.target_frame_count(), 1212);
    }

    #[test]
    fn test_defaults_are_sane() {
        let settings = Settings::default();
        assert!(settings.window_size > 0);
        assert!(settings.brightness_threshold > 0.0);
        assert_eq!(settings.canonical_resolution(), (1280, 720));
    }
}

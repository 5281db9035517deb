// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline settings: frame rate, frame count and frame stepping.
//!
//! Settings are stored as RON. Normalized time `0.0..=1.0` is divided into
//! `frame_count` equal steps, so frame `n` sits at `n / frame_count`.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default frames per second
pub const DEFAULT_FRAME_RATE: f32 = 30.0;

/// Default number of frames across the timeline
pub const DEFAULT_FRAME_COUNT: u32 = 100;

/// Error loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Reading or writing the file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid RON for these settings
    #[error("Invalid settings file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The settings could not be written as RON
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),

    /// Frame rate is zero, negative or not a number
    #[error("Frame rate must be positive, got {0}")]
    InvalidFrameRate(f32),

    /// Frame count is zero
    #[error("Frame count must be at least 1")]
    InvalidFrameCount,
}

/// Playback and export settings of a timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Frames per second
    pub frame_rate: f32,
    /// Number of frame steps between time 0 and time 1
    pub frame_count: u32,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            frame_count: DEFAULT_FRAME_COUNT,
        }
    }
}

impl TimelineSettings {
    /// Create settings
    pub fn new(frame_rate: f32, frame_count: u32) -> Self {
        Self {
            frame_rate,
            frame_count,
        }
    }

    /// Check that both values are usable
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.frame_rate > 0.0 && self.frame_rate.is_finite()) {
            return Err(SettingsError::InvalidFrameRate(self.frame_rate));
        }
        if self.frame_count == 0 {
            return Err(SettingsError::InvalidFrameCount);
        }
        Ok(())
    }

    fn steps(&self) -> f64 {
        f64::from(self.frame_count.max(1))
    }

    /// Normalized time of a frame, clamped to `1.0`
    pub fn frame_to_time(&self, frame: u32) -> f64 {
        (f64::from(frame) / self.steps()).min(1.0)
    }

    /// Nearest frame to a normalized time
    pub fn time_to_frame(&self, time: f64) -> u32 {
        if !time.is_finite() {
            return 0;
        }
        (time.clamp(0.0, 1.0) * self.steps()).round() as u32
    }

    /// Times of every frame from `0.0` to `1.0` inclusive
    pub fn frame_times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..=self.frame_count.max(1)).map(|frame| self.frame_to_time(frame))
    }

    /// Advance a time by one frame, stopping at `1.0`
    pub fn step(&self, time: f64) -> f64 {
        (time + 1.0 / self.steps()).min(1.0)
    }

    /// Length of the whole timeline in seconds when played at `frame_rate`
    pub fn duration_secs(&self) -> f32 {
        self.frame_count as f32 / self.frame_rate
    }

    /// Parse settings from RON
    pub fn from_ron(content: &str) -> Result<Self, SettingsError> {
        let settings: TimelineSettings = ron::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Write settings as RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_ron(&content)?;
        tracing::info!("Loaded timeline settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        self.validate()?;
        std::fs::write(path, self.to_ron()?)?;
        tracing::info!("Saved timeline settings to {:?}", path);
        Ok(())
    }
}

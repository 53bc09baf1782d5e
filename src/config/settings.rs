//! Converter settings, defaults and TOML persistence.
//!
//! ```toml
//! converter = "sinc_medium_quality"
//! channels = 2
//! src_ratio = 1.0
//!
//! [stream]
//! read_frames = 1024
//! ```

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::ConfigPaths;
use crate::engine::{Converter, FrameProducer};
use crate::error::SrcError;
use crate::kernel::ConverterId;
use crate::ratio::is_valid_ratio;

// ---------------------------------------------------------------------------
// StreamSettings
// ---------------------------------------------------------------------------

/// Settings for streaming (pull) reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    /// Frames requested per `read` call.
    pub read_frames: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self { read_frames: 1024 }
    }
}

// ---------------------------------------------------------------------------
// ConverterSettings  (top-level)
// ---------------------------------------------------------------------------

/// Top-level converter configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use srconv::config::ConverterSettings;
///
/// // Load (returns Default when the file is missing)
/// let settings = ConverterSettings::load().unwrap();
/// let converter = settings.build().unwrap();
///
/// // settings.save().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterSettings {
    /// Converter name (`"linear"`, `"sinc_fastest"`, ...) or numeric id.
    pub converter: String,
    /// Interleaved channel count.
    pub channels: usize,
    /// Output rate divided by input rate.
    pub src_ratio: f64,
    /// Streaming read settings.
    pub stream: StreamSettings,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            converter: ConverterId::SINC_MEDIUM_QUALITY.to_string(),
            channels: 2,
            src_ratio: 1.0,
            stream: StreamSettings::default(),
        }
    }
}

impl ConverterSettings {
    /// Load settings from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(ConverterSettings::default())` when the file does not
    /// exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&ConfigPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("config: {} missing, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to the platform-appropriate `settings.toml`, creating
    /// parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&ConfigPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check the settings and return the parsed converter id.
    ///
    /// Only the id's syntax is checked here; whether a kernel exists for it
    /// is decided when the converter is built.
    pub fn validate(&self) -> Result<ConverterId, SrcError> {
        let id = self.converter.parse::<ConverterId>()?;
        if self.channels < 1 {
            return Err(SrcError::BadChannelCount);
        }
        if !is_valid_ratio(self.src_ratio) {
            return Err(SrcError::BadSrcRatio);
        }
        Ok(id)
    }

    /// Build a one-shot converter with `src_ratio` already in effect.
    pub fn build(&self) -> Result<Converter, SrcError> {
        let id = self.validate()?;
        let mut converter = Converter::new(id, self.channels)?;
        converter.set_ratio(self.src_ratio)?;
        Ok(converter)
    }

    /// Build a streaming converter pulling input from `producer`.
    pub fn build_callback<P>(&self, producer: P) -> Result<Converter, SrcError>
    where
        P: FrameProducer + 'static,
    {
        let id = self.validate()?;
        let mut converter = Converter::callback(id, self.channels, producer)?;
        converter.set_ratio(self.src_ratio)?;
        Ok(converter)
    }

    /// Zeroed output buffer holding `stream.read_frames` interleaved frames.
    pub fn read_buffer(&self) -> Vec<f32> {
        vec![0.0; self.stream.read_frames.saturating_mul(self.channels)]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Configuration for building converters from a settings file.
//!
//! Provides `ConverterSettings` (converter choice, channel layout, ratio and
//! streaming chunk size), `ConfigPaths` for the platform config directory,
//! and TOML persistence via `ConverterSettings::load` /
//! `ConverterSettings::save`.

pub mod paths;
pub mod settings;

pub use paths::ConfigPaths;
pub use settings::{ConverterSettings, StreamSettings};

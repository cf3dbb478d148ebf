use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{GravityModel, Result};

/// Construction-time settings plus the initial values of every tunable knob.
///
/// All fields are optional in serialized form; missing fields take the
/// defaults below. Knob values are clamped when they reach the
/// [`ParameterStore`](crate::ParameterStore), so a config can never put the
/// engine into an invalid state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Transform length in samples. Must be a power of two.
    pub fft_size: usize,
    /// Sample rate of the incoming audio, used to place the lowest bar edge.
    pub sample_rate: u32,
    /// Frequency in Hz where the logarithmic bar scale starts.
    pub min_frequency_hz: f32,
    pub gain: f32,
    pub smoothing: f32,
    pub gravity: f32,
    /// Calls a peak marker stays fixed before it starts falling.
    pub peak_hold_frames: u32,
    pub num_bars: usize,
    pub gravity_model: GravityModel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            sample_rate: 48_000,
            min_frequency_hz: 20.0,
            gain: 20.0,
            smoothing: 0.70,
            gravity: 0.005,
            peak_hold_frames: 30,
            num_bars: 32,
            gravity_model: GravityModel::Linear,
        }
    }
}

impl EngineConfig {
    pub fn live_defaults() -> Self {
        Self::default()
    }

    /// Defaults with an explicit transform length.
    pub fn with_fft_size(fft_size: usize) -> Self {
        Self {
            fft_size,
            ..Self::default()
        }
    }

    /// Parses a JSON document. Unknown fields are ignored.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Width of one transform bin in Hz.
    pub fn bin_width_hz(&self) -> f32 {
        self.sample_rate as f32 / self.fft_size.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SpectrumError;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "fft_size": 2048, "num_bars": 64 }"#)
            .expect("config should parse");

        assert_eq!(config.fft_size, 2048);
        assert_eq!(config.num_bars, 64);
        assert_eq!(config.gain, 20.0);
        assert_eq!(config.peak_hold_frames, 30);
        assert_eq!(config.gravity_model, GravityModel::Linear);
    }

    #[test]
    fn parses_gravity_model_by_name() {
        let config = EngineConfig::from_json_str(r#"{ "gravity_model": "accelerating" }"#).unwrap();
        assert_eq!(config.gravity_model, GravityModel::Accelerating);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = EngineConfig::from_json_str("{ fft_size: ").unwrap_err();
        assert!(matches!(err, SpectrumError::Config(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EngineConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SpectrumError::Io(_)));
    }

    #[test]
    fn bin_width_follows_sample_rate() {
        let config = EngineConfig {
            fft_size: 1000,
            sample_rate: 48_000,
            ..Default::default()
        };
        assert!((config.bin_width_hz() - 48.0).abs() < 1e-6);
    }
}

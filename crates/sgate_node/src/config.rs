use serde::{Deserialize, Serialize};
use sgate_core::{SpectralProcessor, ThresholdConfig, MAX_BINS, VIBRATION_BUFFER_SIZE};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::node::NodeSettings;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("num_bins must be in 3..={max}, got {value}")]
    NumBins { value: usize, max: usize },
    #[error("sample_rate_hz must be positive")]
    SampleRate,
    #[error("base_confidence must be in (0, 1], got {0}")]
    BaseConfidence(f32),
    #[error("low_battery_multiplier must be at least 1.0, got {0}")]
    LowMultiplier(f32),
    #[error("critical_battery_multiplier ({critical}) must not be below low_battery_multiplier ({low})")]
    CriticalMultiplier { low: f32, critical: f32 },
    #[error("window_size must be in 1..={max}, got {value}")]
    WindowSize { value: usize, max: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpectralSection {
    #[serde(default = "default_num_bins")]
    pub num_bins: usize,
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hz: u32,
}

impl Default for SpectralSection {
    fn default() -> Self {
        Self {
            num_bins: default_num_bins(),
            sample_rate_hz: default_sample_rate(),
        }
    }
}

fn default_num_bins() -> usize {
    sgate_core::NUM_SPECTRAL_BINS
}
fn default_sample_rate() -> u32 {
    sgate_core::DEFAULT_SAMPLE_RATE_HZ
}

/// Decision thresholds. Reals here; converted to Q15.16 once at load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdSection {
    #[serde(default = "default_base")]
    pub base_confidence: f32,
    #[serde(default = "default_low_mult")]
    pub low_battery_multiplier: f32,
    #[serde(default = "default_critical_mult")]
    pub critical_battery_multiplier: f32,
    #[serde(default = "default_min_peaks")]
    pub min_peaks_for_detection: u8,
}

impl Default for ThresholdSection {
    fn default() -> Self {
        Self {
            base_confidence: default_base(),
            low_battery_multiplier: default_low_mult(),
            critical_battery_multiplier: default_critical_mult(),
            min_peaks_for_detection: default_min_peaks(),
        }
    }
}

fn default_base() -> f32 {
    0.65
}
fn default_low_mult() -> f32 {
    1.2
}
fn default_critical_mult() -> f32 {
    1.5
}
fn default_min_peaks() -> u8 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeSection {
    #[serde(default = "default_sleep_interval")]
    pub sleep_interval_ms: u32,
    #[serde(default = "default_window")]
    pub window_size: usize,
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            sleep_interval_ms: default_sleep_interval(),
            window_size: default_window(),
        }
    }
}

fn default_sleep_interval() -> u32 {
    1000
}
fn default_window() -> usize {
    VIBRATION_BUFFER_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ModelSection {
    /// JSON model file; the baked default model is used when absent.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NodeConfig {
    #[serde(default)]
    pub spectral: SpectralSection,
    #[serde(default)]
    pub thresholds: ThresholdSection,
    #[serde(default)]
    pub node: NodeSection,
    #[serde(default)]
    pub model: ModelSection,
}

impl NodeConfig {
    /// Read and validate a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: NodeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bins = self.spectral.num_bins;
        if !(3..=MAX_BINS).contains(&bins) {
            return Err(ConfigError::NumBins {
                value: bins,
                max: MAX_BINS,
            });
        }
        if self.spectral.sample_rate_hz == 0 {
            return Err(ConfigError::SampleRate);
        }

        let t = &self.thresholds;
        if !(t.base_confidence > 0.0 && t.base_confidence <= 1.0) {
            return Err(ConfigError::BaseConfidence(t.base_confidence));
        }
        if !(t.low_battery_multiplier >= 1.0) {
            return Err(ConfigError::LowMultiplier(t.low_battery_multiplier));
        }
        if !(t.critical_battery_multiplier >= t.low_battery_multiplier) {
            return Err(ConfigError::CriticalMultiplier {
                low: t.low_battery_multiplier,
                critical: t.critical_battery_multiplier,
            });
        }

        let window = self.node.window_size;
        if !(1..=VIBRATION_BUFFER_SIZE).contains(&window) {
            return Err(ConfigError::WindowSize {
                value: window,
                max: VIBRATION_BUFFER_SIZE,
            });
        }
        Ok(())
    }

    pub fn threshold_config(&self) -> ThresholdConfig {
        let t = &self.thresholds;
        ThresholdConfig::from_real(
            t.base_confidence,
            t.low_battery_multiplier,
            t.critical_battery_multiplier,
            t.min_peaks_for_detection,
        )
    }

    pub fn spectral_processor(&self) -> SpectralProcessor {
        SpectralProcessor::new(self.spectral.num_bins, self.spectral.sample_rate_hz)
    }

    pub fn node_settings(&self) -> NodeSettings {
        NodeSettings {
            sleep_interval_ms: self.node.sleep_interval_ms,
            window_size: self.node.window_size,
        }
    }
}

use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Named conditioning/feature presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// MFCC + delta + delta-delta, gentle trim, 50-7500 Hz.
    #[default]
    Rich,
    /// MFCC only, firmer trim, 80-8000 Hz.
    Reduced,
}

/// Every tunable the conditioning and feature pipeline reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    pub variant: Variant,
    pub sample_rate: u32,
    pub min_duration_secs: f64,
    pub min_rms: f32,
    /// Boundary-trim threshold in dB below the loudest frame.
    pub top_db: f32,
    pub band_low_hz: f64,
    pub band_high_hz: f64,
    pub n_mfcc: usize,
    pub n_mels: usize,
    pub n_fft: usize,
    pub hop_length: usize,
    /// Time frames in every feature tensor.
    pub max_len: usize,
    pub include_deltas: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::rich()
    }
}

impl PipelineConfig {
    pub fn rich() -> Self {
        Self {
            variant: Variant::Rich,
            sample_rate: TARGET_SAMPLE_RATE,
            min_duration_secs: 0.5,
            min_rms: 0.005,
            top_db: 35.0,
            band_low_hz: 50.0,
            band_high_hz: 7500.0,
            n_mfcc: 40,
            n_mels: 128,
            n_fft: 2048,
            hop_length: 512,
            max_len: 200,
            include_deltas: true,
        }
    }

    pub fn reduced() -> Self {
        Self {
            variant: Variant::Reduced,
            top_db: 25.0,
            band_low_hz: 80.0,
            band_high_hz: 8000.0,
            include_deltas: false,
            ..Self::rich()
        }
    }

    pub fn preset(variant: Variant) -> Self {
        match variant {
            Variant::Rich => Self::rich(),
            Variant::Reduced => Self::reduced(),
        }
    }

    /// Rows of every feature tensor produced under this config.
    pub fn feature_rows(&self) -> usize {
        if self.include_deltas {
            self.n_mfcc * 3
        } else {
            self.n_mfcc
        }
    }

    /// Build a config from a preset, applying a JSON override file when given.
    pub fn load(variant: Variant, override_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::preset(variant);
        if let Some(path) = override_path {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read pipeline config {:?}", path))?;
            let overrides: ConfigOverrides = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse pipeline config {:?}", path))?;
            if let Some(v) = overrides.variant {
                if v != variant {
                    config = Self::preset(v);
                }
            }
            overrides.apply(&mut config);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.sample_rate > 0, "sample_rate must be positive");
        ensure!(
            self.min_duration_secs >= 0.0,
            "min_duration_secs must be non-negative"
        );
        ensure!(self.min_rms >= 0.0, "min_rms must be non-negative");
        ensure!(self.top_db > 0.0, "top_db must be positive");
        ensure!(self.n_mfcc > 0, "n_mfcc must be positive");
        ensure!(
            self.n_mels >= self.n_mfcc,
            "n_mels ({}) must be at least n_mfcc ({})",
            self.n_mels,
            self.n_mfcc
        );
        ensure!(self.n_fft >= 2, "n_fft must be at least 2");
        ensure!(self.hop_length > 0, "hop_length must be positive");
        ensure!(self.max_len > 0, "max_len must be positive");
        Ok(())
    }
}

/// Partial config read from JSON; absent fields keep the preset value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverrides {
    #[serde(default)]
    variant: Option<Variant>,
    #[serde(default)]
    sample_rate: Option<u32>,
    #[serde(default, alias = "min_duration")]
    min_duration_secs: Option<f64>,
    #[serde(default)]
    min_rms: Option<f32>,
    #[serde(default)]
    top_db: Option<f32>,
    #[serde(default, alias = "low")]
    band_low_hz: Option<f64>,
    #[serde(default, alias = "high")]
    band_high_hz: Option<f64>,
    #[serde(default)]
    n_mfcc: Option<usize>,
    #[serde(default)]
    n_mels: Option<usize>,
    #[serde(default)]
    n_fft: Option<usize>,
    #[serde(default)]
    hop_length: Option<usize>,
    #[serde(default)]
    max_len: Option<usize>,
    #[serde(default)]
    include_deltas: Option<bool>,
}

impl ConfigOverrides {
    fn apply(self, config: &mut PipelineConfig) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    config.$field = value;
                })*
            };
        }
        take!(
            sample_rate,
            min_duration_secs,
            min_rms,
            top_db,
            band_low_hz,
            band_high_hz,
            n_mfcc,
            n_mels,
            n_fft,
            hop_length,
            max_len,
            include_deltas
        );
    }
}

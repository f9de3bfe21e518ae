//! Signal validation and conditioning.
//!
//! Every consumer (cleanup pass, dataset, preview export) goes through the
//! same [`Validator`]; only the [`RejectAction`] differs between them.

mod action;

pub use action::{is_within, quarantine_path, relative_to, ActionOutcome, RejectAction};

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::audio::{decoder, filter, trim};
use crate::config::PipelineConfig;
use crate::types::{AudioData, ConditionedSignal};

/// Why a file did not yield a conditioned signal. Always recoverable.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Rejection {
    #[error("failed to load {}: {reason}", path.display())]
    LoadFailure { path: PathBuf, reason: String },

    #[error("{} is too short after trimming ({duration_secs:.3}s)", path.display())]
    TooShort { path: PathBuf, duration_secs: f64 },

    #[error("{} is too silent (rms {rms:.5})", path.display())]
    TooSilent { path: PathBuf, rms: f32 },
}

impl Rejection {
    pub fn path(&self) -> &Path {
        match self {
            Rejection::LoadFailure { path, .. }
            | Rejection::TooShort { path, .. }
            | Rejection::TooSilent { path, .. } => path,
        }
    }

    pub fn kind(&self) -> RejectionKind {
        match self {
            Rejection::LoadFailure { .. } => RejectionKind::LoadFailure,
            Rejection::TooShort { .. } => RejectionKind::TooShort,
            Rejection::TooSilent { .. } => RejectionKind::TooSilent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    LoadFailure,
    TooShort,
    TooSilent,
}

/// Loads, trims, checks, band-filters and peak-normalizes audio files.
#[derive(Debug, Clone)]
pub struct Validator {
    config: PipelineConfig,
}

impl Validator {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Condition `path`, applying `on_reject` if any check fails.
    ///
    /// A failing side effect is logged; the caller still gets the rejection.
    pub fn validate(
        &self,
        path: &Path,
        on_reject: &RejectAction,
    ) -> Result<ConditionedSignal, Rejection> {
        match self.check(path) {
            Ok(trimmed) => Ok(self.condition(trimmed)),
            Err(rejection) => {
                debug!(path = %path.display(), reason = %rejection, "rejected sample");
                if let Err(err) = on_reject.apply(path) {
                    warn!(path = %path.display(), error = %err, "reject action failed");
                }
                Err(rejection)
            }
        }
    }

    /// Load, trim and run the duration/silence checks without any side effect.
    pub fn check(&self, path: &Path) -> Result<AudioData, Rejection> {
        let audio = decoder::load_audio(path, self.config.sample_rate).map_err(|err| {
            Rejection::LoadFailure {
                path: path.to_path_buf(),
                reason: format!("{err:#}"),
            }
        })?;
        self.check_audio(path, audio)
    }

    /// Duration/silence checks on already-decoded audio at the pipeline rate.
    pub fn check_audio(&self, path: &Path, audio: AudioData) -> Result<AudioData, Rejection> {
        let trimmed = AudioData {
            samples: trim::trim_edges(&audio.samples, self.config.top_db).to_vec(),
            sample_rate: audio.sample_rate,
        };

        let duration_secs = trimmed.duration_secs();
        if duration_secs < self.config.min_duration_secs {
            return Err(Rejection::TooShort {
                path: path.to_path_buf(),
                duration_secs,
            });
        }

        let rms = trim::rms(&trimmed.samples);
        if rms < self.config.min_rms {
            return Err(Rejection::TooSilent {
                path: path.to_path_buf(),
                rms,
            });
        }
        Ok(trimmed)
    }

    /// Band-filter and peak-normalize audio that already passed the checks.
    pub fn condition(&self, audio: AudioData) -> ConditionedSignal {
        let mut samples = filter::band_pass(
            &audio.samples,
            audio.sample_rate,
            self.config.band_low_hz,
            self.config.band_high_hz,
        );
        filter::normalize_peak(&mut samples);
        ConditionedSignal {
            samples,
            sample_rate: audio.sample_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Validator {
        Validator::new(PipelineConfig::rich())
    }

    fn tone(seconds: f64, amplitude: f32) -> AudioData {
        let len = (16_000.0 * seconds) as usize;
        AudioData {
            samples: (0..len)
                .map(|i| amplitude * (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 16_000.0).sin())
                .collect(),
            sample_rate: 16_000,
        }
    }

    #[test]
    fn short_audio_is_rejected() {
        let err = validator()
            .check_audio(Path::new("a.wav"), tone(0.3, 0.5))
            .unwrap_err();
        assert_eq!(err.kind(), RejectionKind::TooShort);
    }

    #[test]
    fn quiet_audio_is_rejected() {
        let err = validator()
            .check_audio(Path::new("a.wav"), tone(1.0, 0.004))
            .unwrap_err();
        assert_eq!(err.kind(), RejectionKind::TooSilent);
        assert_eq!(err.path(), Path::new("a.wav"));
    }

    #[test]
    fn conditioned_signal_has_unit_peak() {
        let v = validator();
        let trimmed = v.check_audio(Path::new("a.wav"), tone(1.0, 0.3)).unwrap();
        let signal = v.condition(trimmed);
        assert_eq!(signal.sample_rate, 16_000);
        assert!((trim::peak(&signal.samples) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn unreadable_file_is_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let err = validator()
            .validate(&path, &RejectAction::None)
            .unwrap_err();
        assert_eq!(err.kind(), RejectionKind::LoadFailure);
        assert!(path.exists());
    }
}

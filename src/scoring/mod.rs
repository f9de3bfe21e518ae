//! Weak-supervision clarity labels.
//!
//! Scoring happens in two stages: a raw heuristic per utterance, then a
//! min-max normalization over every raw score of one speaker.

use std::path::Path;

use anyhow::{ensure, Result};
use tracing::debug;

use crate::audio::{decoder, trim};
use crate::types::{Label, Session};

pub const NORMAL_BASE: f64 = 0.9;
/// Spread below which a speaker's scores count as identical.
pub const DEGENERATE_RANGE: f64 = 1e-6;
pub const DEGENERATE_FALLBACK: f64 = 0.5;

const REFERENCE_DURATION_SECS: f64 = 5.0;
const REFERENCE_RMS: f64 = 0.05;
const FACTOR_MIN: f64 = 0.8;
const FACTOR_MAX: f64 = 1.2;
const DURATION_WEIGHT: f64 = 0.6;
const RMS_WEIGHT: f64 = 0.4;

/// Population/session prior, before any utterance-level modulation.
pub fn base_score(label: Label, session: Session) -> f64 {
    match label {
        Label::Normal => NORMAL_BASE,
        Label::Dysarthric => match session {
            Session::Session1 => 0.75,
            Session::Session2 => 0.55,
            Session::Session3 => 0.35,
            Session::Unknown => 0.30,
        },
    }
}

/// Utterance-level multiplier, or the identity when the signal could not be measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UtteranceModulation {
    Scaled(f64),
    Identity,
}

impl UtteranceModulation {
    /// Re-load `path` and derive the multiplier from its duration and RMS.
    pub fn measure(path: &Path, sample_rate: u32) -> Self {
        match Self::try_measure(path, sample_rate) {
            Ok(modulation) => modulation,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "utterance stats unavailable");
                UtteranceModulation::Identity
            }
        }
    }

    fn try_measure(path: &Path, sample_rate: u32) -> Result<Self> {
        let audio = decoder::load_audio(path, sample_rate)?;
        ensure!(!audio.samples.is_empty(), "decoded signal is empty");
        Ok(Self::from_stats(
            audio.duration_secs(),
            trim::rms(&audio.samples) as f64,
        ))
    }

    pub fn from_stats(duration_secs: f64, rms: f64) -> Self {
        let duration_factor = (duration_secs / REFERENCE_DURATION_SECS).clamp(FACTOR_MIN, FACTOR_MAX);
        let rms_factor = (rms / REFERENCE_RMS).clamp(FACTOR_MIN, FACTOR_MAX);
        let factor = DURATION_WEIGHT * duration_factor + RMS_WEIGHT * rms_factor;
        if factor.is_finite() {
            UtteranceModulation::Scaled(factor)
        } else {
            UtteranceModulation::Identity
        }
    }

    pub fn factor(self) -> f64 {
        match self {
            UtteranceModulation::Scaled(factor) => factor,
            UtteranceModulation::Identity => 1.0,
        }
    }
}

pub fn raw_score(label: Label, session: Session, modulation: UtteranceModulation) -> f64 {
    base_score(label, session) * modulation.factor()
}

/// Min-max normalize one speaker's raw scores into [0, 1].
///
/// A bucket whose spread is below [`DEGENERATE_RANGE`] maps every entry to 0.5.
pub fn normalize_within_speaker(scores: &[f64]) -> Vec<f64> {
    let Some(&first) = scores.first() else {
        return Vec::new();
    };
    let (min, max) = scores
        .iter()
        .fold((first, first), |(lo, hi), &s| (lo.min(s), hi.max(s)));
    let range = max - min;
    if range < DEGENERATE_RANGE {
        return vec![DEGENERATE_FALLBACK; scores.len()];
    }
    scores.iter().map(|&s| (s - min) / range).collect()
}

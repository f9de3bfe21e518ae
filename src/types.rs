//! Core types for the clarityprep conditioning pipeline

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Raw decoded audio (mono, f32 samples)
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Audio samples, normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioData {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Validated, band-filtered and peak-normalized waveform at the pipeline rate.
///
/// Peak absolute amplitude is 1.0 unless every sample is zero.
#[derive(Debug, Clone)]
pub struct ConditionedSignal {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl ConditionedSignal {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

impl From<ConditionedSignal> for AudioData {
    fn from(signal: ConditionedSignal) -> Self {
        AudioData {
            samples: signal.samples,
            sample_rate: signal.sample_rate,
        }
    }
}

/// Speaker population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Normal,
    Dysarthric,
}

impl Label {
    /// Label directories in scan order.
    pub const ALL: [Label; 2] = [Label::Normal, Label::Dysarthric];

    pub fn dir_name(self) -> &'static str {
        match self {
            Label::Normal => "normal",
            Label::Dysarthric => "dysarthric",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "normal" => Some(Label::Normal),
            "dysarthric" => Some(Label::Dysarthric),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Recording session inferred from the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Session {
    Session1,
    Session2,
    Session3,
    Unknown,
}

impl Session {
    /// Case-insensitive substring match, first token wins.
    pub fn from_file_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("session1") {
            Session::Session1
        } else if lower.contains("session2") {
            Session::Session2
        } else if lower.contains("session3") {
            Session::Session3
        } else {
            Session::Unknown
        }
    }
}

/// Microphone the utterance was captured with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MicType {
    HeadMic,
    ArrayMic,
}

impl MicType {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "headmic" => Some(MicType::HeadMic),
            "arraymic" => Some(MicType::ArrayMic),
            _ => None,
        }
    }
}

/// A corpus file and the metadata derived from its location and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSample {
    pub path: PathBuf,
    pub speaker_id: String,
    pub label: Label,
    pub session: Session,
    pub mic: MicType,
}

impl AudioSample {
    /// Derive metadata for `path`, found under the given label and mic directories.
    ///
    /// Returns `None` when the path has no usable file name.
    pub fn from_path(path: impl Into<PathBuf>, label: Label, mic: MicType) -> Option<Self> {
        let path = path.into();
        let file_name = path.file_name()?.to_str()?.to_string();
        let speaker_id = speaker_id_from_path(&path)?;
        Some(Self {
            speaker_id,
            label,
            session: Session::from_file_name(&file_name),
            mic,
            path,
        })
    }
}

/// Leading `_`-delimited token of the file stem (e.g. `F01` for `F01_0001.wav`).
pub fn speaker_id_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let speaker = stem.split('_').next().unwrap_or(stem);
    if speaker.is_empty() {
        None
    } else {
        Some(speaker.to_string())
    }
}

/// Raw heuristic score and its per-speaker normalized counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClarityScore {
    pub raw: f64,
    pub normalized: f64,
}

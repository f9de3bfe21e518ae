//! Corpus traversal, per-speaker labelling and batch drivers.

pub mod cleanup;
pub mod dataset;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::scoring::{self, UtteranceModulation};
use crate::types::{AudioSample, ClarityScore, Label, MicType, Session};

pub const AUDIO_EXTENSION: &str = "wav";

pub fn has_audio_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(AUDIO_EXTENSION))
}

/// Collect `root/<label>/<mic>/*.wav`, sorted within each directory.
///
/// Missing label directories and unrecognised microphone directories are skipped.
pub fn scan_corpus(root: &Path) -> Result<Vec<AudioSample>> {
    let mut samples = Vec::new();
    for label in Label::ALL {
        let label_dir = root.join(label.dir_name());
        if !label_dir.is_dir() {
            debug!(dir = %label_dir.display(), "label directory missing");
            continue;
        }
        for mic_dir in sorted_entries(&label_dir)? {
            if !mic_dir.is_dir() {
                continue;
            }
            let Some(mic) = mic_dir
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(MicType::parse)
            else {
                debug!(dir = %mic_dir.display(), "skipping unknown microphone directory");
                continue;
            };
            for path in sorted_entries(&mic_dir)? {
                if !path.is_file() || !has_audio_extension(&path) {
                    continue;
                }
                if let Some(sample) = AudioSample::from_path(path, label, mic) {
                    samples.push(sample);
                }
            }
        }
    }
    Ok(samples)
}

/// Every audio file below `root`, at any depth, in sorted order.
pub fn walk_audio_files(root: &Path) -> Result<Vec<PathBuf>> {
    fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
        for path in sorted_entries(dir)? {
            if path.is_dir() {
                walk(&path, out)?;
            } else if has_audio_extension(&path) {
                out.push(path);
            }
        }
        Ok(())
    }

    let mut files = Vec::new();
    walk(root, &mut files)?;
    Ok(files)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("failed to list directory {}", dir.display()))?;
    entries.sort();
    Ok(entries)
}

/// Samples grouped by speaker, speakers in lexical order.
pub type SpeakerBuckets = BTreeMap<String, Vec<AudioSample>>;

pub fn group_by_speaker(samples: Vec<AudioSample>) -> SpeakerBuckets {
    let mut buckets = SpeakerBuckets::new();
    for sample in samples {
        buckets
            .entry(sample.speaker_id.clone())
            .or_default()
            .push(sample);
    }
    buckets
}

#[derive(Debug, Clone)]
pub struct LabelledSample {
    pub sample: AudioSample,
    pub score: ClarityScore,
}

/// Manifest row describing one labelled sample.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub path: PathBuf,
    pub speaker_id: String,
    pub label: Label,
    pub session: Session,
    pub mic: MicType,
    pub raw_score: f64,
    pub clarity: f64,
}

/// Corpus with frozen, speaker-normalized clarity labels.
#[derive(Debug, Clone, Default)]
pub struct LabelledCorpus {
    samples: Vec<LabelledSample>,
}

impl LabelledCorpus {
    /// Scan `root`, raw-score every sample, then normalize per speaker.
    pub fn build(root: &Path, config: &PipelineConfig) -> Result<Self> {
        let buckets = group_by_speaker(scan_corpus(root)?);
        let sample_rate = config.sample_rate;
        Ok(Self::from_buckets(buckets, |sample| {
            UtteranceModulation::measure(&sample.path, sample_rate)
        }))
    }

    /// Label pre-grouped buckets with a custom modulation source.
    ///
    /// All raw scores are computed before any bucket is normalized.
    pub fn from_buckets<F>(buckets: SpeakerBuckets, modulation: F) -> Self
    where
        F: Fn(&AudioSample) -> UtteranceModulation + Sync,
    {
        let buckets: Vec<Vec<AudioSample>> = buckets.into_values().collect();
        let raw_scores: Vec<Vec<f64>> = buckets
            .par_iter()
            .map(|bucket| {
                bucket
                    .par_iter()
                    .map(|sample| {
                        scoring::raw_score(sample.label, sample.session, modulation(sample))
                    })
                    .collect()
            })
            .collect();

        // every raw score exists before any bucket is normalized
        let mut samples = Vec::with_capacity(raw_scores.iter().map(Vec::len).sum());
        for (bucket, raw) in buckets.into_iter().zip(raw_scores) {
            let normalized = scoring::normalize_within_speaker(&raw);
            for ((sample, raw), normalized) in bucket.into_iter().zip(raw).zip(normalized) {
                samples.push(LabelledSample {
                    sample,
                    score: ClarityScore { raw, normalized },
                });
            }
        }
        info!(samples = samples.len(), "labelled corpus");
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[LabelledSample] {
        &self.samples
    }

    /// `(path, normalized score)` pairs in corpus order.
    pub fn pairs(&self) -> impl Iterator<Item = (&Path, f64)> {
        self.samples
            .iter()
            .map(|s| (s.sample.path.as_path(), s.score.normalized))
    }

    pub fn to_manifest(&self) -> Vec<ManifestEntry> {
        self.samples
            .iter()
            .map(|s| ManifestEntry {
                path: s.sample.path.clone(),
                speaker_id: s.sample.speaker_id.clone(),
                label: s.sample.label,
                session: s.sample.session,
                mic: s.sample.mic,
                raw_score: s.score.raw,
                clarity: s.score.normalized,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(path: &str, label: Label) -> AudioSample {
        AudioSample::from_path(path, label, MicType::HeadMic).unwrap()
    }

    #[test]
    fn normalizes_each_speaker_independently() {
        let buckets = group_by_speaker(vec![
            sample("normal/headmic/FC01_a.wav", Label::Normal),
            sample("dysarthric/headmic/F01_Session1_a.wav", Label::Dysarthric),
            sample("dysarthric/headmic/F01_Session3_b.wav", Label::Dysarthric),
            sample("normal/headmic/FC01_b.wav", Label::Normal),
        ]);
        let corpus = LabelledCorpus::from_buckets(buckets, |_| UtteranceModulation::Identity);

        let scores: Vec<(String, f64, f64)> = corpus
            .samples()
            .iter()
            .map(|s| (s.sample.speaker_id.clone(), s.score.raw, s.score.normalized))
            .collect();
        assert_eq!(
            scores,
            vec![
                ("F01".to_string(), 0.75, 1.0),
                ("F01".to_string(), 0.35, 0.0),
                ("FC01".to_string(), 0.9, 0.5),
                ("FC01".to_string(), 0.9, 0.5),
            ]
        );
    }

    #[test]
    fn audio_extension_is_case_insensitive() {
        assert!(has_audio_extension(Path::new("a/B.WAV")));
        assert!(!has_audio_extension(Path::new("a/b.flac")));
    }
}

use std::path::Path;

use anyhow::Result;
use thiserror::Error;
use tracing::debug;

use crate::conditioning::{RejectAction, Validator};
use crate::config::PipelineConfig;
use crate::features::{FeatureExtractor, FeatureTensor};

use super::LabelledCorpus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("index {index} out of range for dataset of {len} samples")]
    OutOfRange { index: usize, len: usize },

    #[error("no sample in the dataset passed validation")]
    NoValidSamples,
}

/// One training example: feature tensor and normalized clarity label.
#[derive(Debug, Clone)]
pub struct DatasetItem {
    pub features: FeatureTensor,
    pub clarity: f32,
    /// Index that actually produced the item (differs from the requested
    /// index when earlier samples were rejected).
    pub source_index: usize,
}

/// Indexable, length-known view of a labelled corpus for model training.
///
/// Conditioning and feature extraction run on demand in [`ClarityDataset::get`].
#[derive(Debug, Clone)]
pub struct ClarityDataset {
    corpus: LabelledCorpus,
    validator: Validator,
    extractor: FeatureExtractor,
}

impl ClarityDataset {
    pub fn new(corpus: LabelledCorpus, config: PipelineConfig) -> Self {
        Self {
            corpus,
            validator: Validator::new(config.clone()),
            extractor: FeatureExtractor::new(config),
        }
    }

    /// Scan and label `root`, then wrap it.
    pub fn open(root: &Path, config: PipelineConfig) -> Result<Self> {
        let corpus = LabelledCorpus::build(root, &config)?;
        Ok(Self::new(corpus, config))
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    pub fn corpus(&self) -> &LabelledCorpus {
        &self.corpus
    }

    /// Features and label for `index`.
    ///
    /// A rejected sample is skipped in favour of the next index (wrapping),
    /// trying each sample at most once.
    pub fn get(&self, index: usize) -> Result<DatasetItem, DatasetError> {
        let len = self.len();
        if index >= len {
            return Err(DatasetError::OutOfRange { index, len });
        }
        let samples = self.corpus.samples();
        for offset in 0..len {
            let candidate = (index + offset) % len;
            let labelled = &samples[candidate];
            match self
                .validator
                .validate(&labelled.sample.path, &RejectAction::None)
            {
                Ok(signal) => {
                    return Ok(DatasetItem {
                        features: self.extractor.extract(&signal),
                        clarity: labelled.score.normalized as f32,
                        source_index: candidate,
                    });
                }
                Err(rejection) => {
                    debug!(index = candidate, reason = %rejection, "skipping invalid sample");
                }
            }
        }
        Err(DatasetError::NoValidSamples)
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<DatasetItem, DatasetError>> + '_ {
        (0..self.len()).map(move |index| self.get(index))
    }
}

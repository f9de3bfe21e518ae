//! Conditioning, feature extraction and clarity labelling for dysarthric
//! speech corpora.

pub mod audio;
pub mod cli;
pub mod conditioning;
pub mod config;
pub mod corpus;
pub mod features;
pub mod preview;
pub mod scoring;
pub mod types;

pub use conditioning::{RejectAction, Rejection, Validator};
pub use config::{PipelineConfig, Variant};
pub use corpus::cleanup::{CleanupPass, CleanupReport};
pub use corpus::dataset::{ClarityDataset, DatasetError, DatasetItem};
pub use corpus::LabelledCorpus;
pub use features::{FeatureExtractor, FeatureTensor};

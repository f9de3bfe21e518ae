use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::conditioning::{is_within, RejectAction};
use crate::config::{PipelineConfig, Variant};

#[derive(Parser, Debug)]
#[command(
    name = "clarityprep",
    version,
    about = "Condition dysarthric speech corpora and derive clarity labels"
)]
pub struct Cli {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate every WAV under a root and prune or quarantine rejects.
    Clean(CleanArgs),
    /// Write a conditioned copy of one file for listening.
    Preview(PreviewArgs),
    /// Scan a corpus and emit per-speaker normalized clarity labels as JSON.
    Labels(LabelsArgs),
    /// Extract the feature tensor of one file and print its shape.
    Features(FeaturesArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Feature/conditioning preset.
    #[arg(long, value_enum, default_value_t = VariantArg::Rich, global = true)]
    pub variant: VariantArg,
    /// JSON file overriding individual pipeline parameters.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

impl PipelineArgs {
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        PipelineConfig::load(self.variant.into(), self.config.as_deref())
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantArg {
    Rich,
    Reduced,
}

impl From<VariantArg> for Variant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::Rich => Variant::Rich,
            VariantArg::Reduced => Variant::Reduced,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyArg {
    /// Report only.
    DryRun,
    /// Permanently delete rejected files.
    Delete,
    /// Move rejected files under --quarantine-root.
    Quarantine,
}

#[derive(Args, Debug, Clone)]
pub struct CleanArgs {
    /// Dataset root to walk.
    #[arg(long, default_value = "data/audio")]
    pub root: PathBuf,
    #[arg(long, value_enum, default_value_t = PolicyArg::Quarantine)]
    pub policy: PolicyArg,
    /// Destination tree for quarantined files.
    #[arg(long = "quarantine-root", default_value = "data/quarantine")]
    pub quarantine_root: PathBuf,
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl CleanArgs {
    pub fn reject_action(&self) -> Result<RejectAction> {
        Ok(match self.policy {
            PolicyArg::DryRun => RejectAction::None,
            PolicyArg::Delete => RejectAction::Delete,
            PolicyArg::Quarantine => {
                if is_within(&self.quarantine_root, &self.root) {
                    bail!(
                        "quarantine root {:?} must not be inside the dataset root {:?}",
                        self.quarantine_root,
                        self.root
                    );
                }
                RejectAction::quarantine(&self.root, &self.quarantine_root)
            }
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct PreviewArgs {
    /// Audio files to condition.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,
    #[arg(long = "output-root", default_value = "data/audio_filtered")]
    pub output_root: PathBuf,
    #[arg(long = "dataset-root", default_value = "data/audio")]
    pub dataset_root: PathBuf,
    /// Write by file name instead of mirroring the dataset layout.
    #[arg(long)]
    pub flat: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LabelsArgs {
    /// Corpus root containing normal/ and dysarthric/.
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,
    /// Write the manifest here instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct FeaturesArgs {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
    /// Write the full tensor as JSON here.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

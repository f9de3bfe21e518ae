//! Listenable copies of conditioned audio for spot checks.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::audio::encoder;
use crate::conditioning::{relative_to, RejectAction, Validator};

#[derive(Debug, Clone)]
pub struct PreviewOptions {
    pub output_root: PathBuf,
    /// Inputs are laid out relative to this root when structure is preserved.
    pub dataset_root: PathBuf,
    pub preserve_structure: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("data/audio_filtered"),
            dataset_root: PathBuf::from("data/audio"),
            preserve_structure: true,
        }
    }
}

impl PreviewOptions {
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let file_name = || PathBuf::from(input.file_name().unwrap_or(input.as_os_str()));
        let relative = if self.preserve_structure {
            relative_to(input, &self.dataset_root).unwrap_or_else(|| strip_root(input))
        } else {
            file_name()
        };
        self.output_root.join(relative)
    }
}

/// Path with any root or prefix component dropped so it joins under another directory.
fn strip_root(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| matches!(c, std::path::Component::Normal(_)))
        .collect()
}

/// Condition `input` without touching it and write the result as WAV.
///
/// Returns `Ok(None)` when the input is rejected.
pub fn export_filtered(
    validator: &Validator,
    input: &Path,
    options: &PreviewOptions,
) -> Result<Option<PathBuf>> {
    let signal = match validator.validate(input, &RejectAction::None) {
        Ok(signal) => signal,
        Err(rejection) => {
            warn!(path = %input.display(), reason = %rejection, "audio invalid; preview not written");
            return Ok(None);
        }
    };

    let output = options.output_path(input);
    encoder::write_wav(&signal, &output)
        .with_context(|| format!("failed to write preview for {}", input.display()))?;
    info!(path = %output.display(), "filtered audio saved");
    Ok(Some(output))
}

use crate::types::ConditionedSignal;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Write a conditioned signal as 16-bit mono PCM WAV, creating parent directories.
pub fn write_wav<P: AsRef<Path>>(signal: &ConditionedSignal, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: signal.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    for &sample in &signal.samples {
        let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        writer
            .write_sample(scaled)
            .context("Failed to write audio sample")?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}

#![allow(dead_code)]

use std::f32::consts::PI;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use hound::{SampleFormat, WavSpec, WavWriter};

pub const SAMPLE_RATE: u32 = 16_000;

pub fn write_sine(path: &Path, frequency: f32, amplitude: f32, seconds: f32) -> Result<()> {
    let samples: Vec<f32> = (0..(SAMPLE_RATE as f32 * seconds) as usize)
        .map(|i| amplitude * (2.0 * PI * frequency * i as f32 / SAMPLE_RATE as f32).sin())
        .collect();
    write_samples(path, &samples)
}

pub fn write_silence(path: &Path, seconds: f32) -> Result<()> {
    write_samples(path, &vec![0.0; (SAMPLE_RATE as f32 * seconds) as usize])
}

/// Sine burst with `pad_secs` of digital silence before and after it.
pub fn write_padded_burst(path: &Path, burst_secs: f32, pad_secs: f32) -> Result<()> {
    let pad = vec![0.0; (SAMPLE_RATE as f32 * pad_secs) as usize];
    let burst = (0..(SAMPLE_RATE as f32 * burst_secs) as usize)
        .map(|i| 0.5 * (2.0 * PI * 440.0 * i as f32 / SAMPLE_RATE as f32).sin());
    let samples: Vec<f32> = pad.iter().copied().chain(burst).chain(pad.iter().copied()).collect();
    write_samples(path, &samples)
}

pub fn write_corrupt(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, b"RIFF but not really a wave file")?;
    Ok(())
}

pub fn write_samples(path: &Path, samples: &[f32]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Corpus with two valid files and one file per rejection reason.
pub struct MixedCorpus {
    pub root: PathBuf,
    pub valid: Vec<PathBuf>,
    pub silent: PathBuf,
    pub short: PathBuf,
    pub corrupt: PathBuf,
}

pub fn mixed_corpus(root: &Path) -> Result<MixedCorpus> {
    let head = root.join("normal/headmic");
    let dys = root.join("dysarthric/arraymic");

    let valid = vec![
        head.join("FC01_Session1_0001.wav"),
        dys.join("F03_Session2_0002.wav"),
    ];
    write_sine(&valid[0], 220.0, 0.5, 1.5)?;
    write_sine(&valid[1], 330.0, 0.2, 2.0)?;

    let silent = head.join("FC01_Session1_0003.wav");
    write_silence(&silent, 1.0)?;
    let short = dys.join("F03_Session2_0004.wav");
    write_sine(&short, 440.0, 0.5, 0.2)?;
    let corrupt = dys.join("F03_Session3_0005.wav");
    write_corrupt(&corrupt)?;

    Ok(MixedCorpus {
        root: root.to_path_buf(),
        valid,
        silent,
        short,
        corrupt,
    })
}

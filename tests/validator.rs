mod common;

use std::fs;
use std::path::Path;

use anyhow::Result;
use clarityprep::audio::trim::peak;
use clarityprep::conditioning::RejectionKind;
use clarityprep::{PipelineConfig, RejectAction, Validator};
use tempfile::tempdir;

use common::{write_corrupt, write_padded_burst, write_silence, write_sine, SAMPLE_RATE};

#[test]
fn audible_sines_always_condition() -> Result<()> {
    let temp = tempdir()?;
    let validator = Validator::new(PipelineConfig::rich());

    for (i, (frequency, amplitude, seconds)) in [
        (220.0, 0.05, 0.6),
        (1000.0, 0.3, 1.5),
        (3000.0, 0.9, 3.0),
        (120.0, 0.01, 1.0),
    ]
    .into_iter()
    .enumerate()
    {
        let path = temp.path().join(format!("S{i}_tone.wav"));
        write_sine(&path, frequency, amplitude, seconds)?;

        let signal = validator
            .validate(&path, &RejectAction::Delete)
            .unwrap_or_else(|r| panic!("{frequency} Hz sine rejected: {r}"));
        assert_eq!(signal.sample_rate, SAMPLE_RATE);
        assert!((peak(&signal.samples) - 1.0).abs() < 1e-6);
        assert!(path.exists(), "accepted file must not be touched");
    }
    Ok(())
}

#[test]
fn each_rejection_reason_is_reported() -> Result<()> {
    let temp = tempdir()?;
    let validator = Validator::new(PipelineConfig::rich());

    let silent = temp.path().join("silent.wav");
    write_silence(&silent, 1.0)?;
    let short = temp.path().join("short.wav");
    write_sine(&short, 440.0, 0.5, 0.3)?;
    let corrupt = temp.path().join("corrupt.wav");
    write_corrupt(&corrupt)?;
    let missing = temp.path().join("missing.wav");

    let kind = |path: &Path| validator.validate(path, &RejectAction::None).unwrap_err().kind();
    assert_eq!(kind(&silent), RejectionKind::TooSilent);
    assert_eq!(kind(&short), RejectionKind::TooShort);
    assert_eq!(kind(&corrupt), RejectionKind::LoadFailure);
    assert_eq!(kind(&missing), RejectionKind::LoadFailure);

    assert!(silent.exists() && short.exists() && corrupt.exists());
    Ok(())
}

#[test]
fn burst_under_floor_is_too_short_after_trimming() -> Result<()> {
    let temp = tempdir()?;
    let path = temp.path().join("burst.wav");
    // 2.35 s on disk, 0.35 s of speech
    write_padded_burst(&path, 0.35, 1.0)?;

    let rejection = Validator::new(PipelineConfig::rich())
        .validate(&path, &RejectAction::None)
        .unwrap_err();
    assert_eq!(rejection.kind(), RejectionKind::TooShort);
    Ok(())
}

#[test]
fn burst_over_floor_passes_with_silence_trimmed() -> Result<()> {
    let temp = tempdir()?;
    let path = temp.path().join("burst.wav");
    write_padded_burst(&path, 0.6, 1.0)?;

    let signal = Validator::new(PipelineConfig::rich())
        .validate(&path, &RejectAction::None)
        .unwrap_or_else(|r| panic!("0.6 s burst rejected: {r}"));
    let seconds = signal.duration_secs();
    assert!(seconds > 0.5 && seconds < 0.75, "trimmed to {seconds}s");
    Ok(())
}

#[test]
fn delete_policy_removes_rejected_file() -> Result<()> {
    let temp = tempdir()?;
    let path = temp.path().join("silent.wav");
    write_silence(&path, 1.0)?;

    let result = Validator::new(PipelineConfig::rich()).validate(&path, &RejectAction::Delete);
    assert!(result.is_err());
    assert!(!path.exists());
    Ok(())
}

#[test]
fn quarantine_mirrors_dataset_layout() -> Result<()> {
    let temp = tempdir()?;
    let dataset_root = temp.path().join("data/audio");
    let quarantine_root = temp.path().join("data/quarantine");
    let original = dataset_root.join("test/normal/headmic/x.wav");
    write_silence(&original, 1.0)?;

    let action = RejectAction::quarantine(&dataset_root, &quarantine_root);
    let result = Validator::new(PipelineConfig::rich()).validate(&original, &action);

    assert!(result.is_err());
    assert!(!original.exists());
    let moved = quarantine_root.join("test/normal/headmic/x.wav");
    assert!(moved.is_file());
    assert!(fs::metadata(&moved)?.len() > 0);
    Ok(())
}

#[test]
fn reduced_variant_uses_its_own_band() -> Result<()> {
    let temp = tempdir()?;
    let path = temp.path().join("tone.wav");
    write_sine(&path, 500.0, 0.4, 1.0)?;

    let signal = Validator::new(PipelineConfig::reduced()).validate(&path, &RejectAction::None);
    assert!(signal.is_ok());
    Ok(())
}

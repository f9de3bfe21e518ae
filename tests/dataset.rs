mod common;

use anyhow::Result;
use approx::assert_relative_eq;
use clarityprep::types::{Label, Session};
use clarityprep::{ClarityDataset, DatasetError, LabelledCorpus, PipelineConfig};
use tempfile::tempdir;

use common::{mixed_corpus, write_silence, write_sine};

#[test]
fn labels_are_normalized_per_speaker() -> Result<()> {
    let temp = tempdir()?;
    let root = temp.path();
    // F02: three utterances of different length and level
    write_sine(&root.join("dysarthric/headmic/F02_Session1_0001.wav"), 200.0, 0.5, 6.0)?;
    write_sine(&root.join("dysarthric/headmic/F02_Session2_0002.wav"), 200.0, 0.5, 1.0)?;
    write_sine(&root.join("dysarthric/headmic/F02_Session3_0003.wav"), 200.0, 0.01, 1.0)?;
    // MC01: identical recordings collapse to the midpoint
    write_sine(&root.join("normal/headmic/MC01_0001.wav"), 200.0, 0.5, 2.0)?;
    write_sine(&root.join("normal/arraymic/MC01_0002.wav"), 200.0, 0.5, 2.0)?;
    // ignored: unknown mic directory and wrong extension
    write_sine(&root.join("normal/lapel/MC01_0003.wav"), 200.0, 0.5, 2.0)?;
    std::fs::write(root.join("normal/headmic/notes.txt"), "x")?;

    let corpus = LabelledCorpus::build(root, &PipelineConfig::rich())?;
    assert_eq!(corpus.len(), 5);

    let samples = corpus.samples();
    assert_eq!(samples[0].sample.speaker_id, "F02");
    assert_eq!(samples[0].sample.session, Session::Session1);
    // 0.75 * (0.6 * 1.2 + 0.4 * 1.2)
    assert_relative_eq!(samples[0].score.raw, 0.9, epsilon = 1e-6);
    assert_relative_eq!(samples[0].score.normalized, 1.0);
    // 0.35 * (0.6 * 0.8 + 0.4 * clip(0.00707 / 0.05))
    assert_relative_eq!(samples[2].score.raw, 0.35 * 0.8, epsilon = 1e-3);
    assert_relative_eq!(samples[2].score.normalized, 0.0);
    assert!(samples[1].score.normalized > 0.0 && samples[1].score.normalized < 1.0);

    for labelled in &samples[3..] {
        assert_eq!(labelled.sample.label, Label::Normal);
        assert_eq!(labelled.score.normalized, 0.5);
    }

    let manifest = serde_json::to_value(corpus.to_manifest())?;
    assert_eq!(manifest[3]["label"], "normal");
    assert_eq!(manifest[0]["session"], "session1");
    Ok(())
}

#[test]
fn dataset_skips_rejected_samples() -> Result<()> {
    let temp = tempdir()?;
    let corpus = mixed_corpus(temp.path())?;
    let dataset = ClarityDataset::open(&corpus.root, PipelineConfig::rich())?;
    assert_eq!(dataset.len(), 5);

    for index in 0..dataset.len() {
        let item = dataset.get(index)?;
        assert_eq!(item.features.shape(), (120, 200));
        assert!((0.0..=1.0).contains(&item.clarity));
        let source = &dataset.corpus().samples()[item.source_index].sample.path;
        assert!(corpus.valid.contains(source), "{source:?} should be valid");
    }
    assert!(corpus.silent.exists(), "dataset access must not mutate the corpus");
    Ok(())
}

#[test]
fn dataset_with_no_valid_samples_reports_it() -> Result<()> {
    let temp = tempdir()?;
    write_silence(&temp.path().join("normal/headmic/FC01_0001.wav"), 1.0)?;
    write_silence(&temp.path().join("normal/headmic/FC02_0001.wav"), 1.0)?;

    let dataset = ClarityDataset::open(temp.path(), PipelineConfig::rich())?;
    assert_eq!(dataset.get(0).unwrap_err(), DatasetError::NoValidSamples);
    assert_eq!(
        dataset.get(2).unwrap_err(),
        DatasetError::OutOfRange { index: 2, len: 2 }
    );
    Ok(())
}

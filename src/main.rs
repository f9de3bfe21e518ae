use std::fs;
use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use clarityprep::cli::{CleanArgs, Cli, Command, FeaturesArgs, LabelsArgs, PreviewArgs};
use clarityprep::preview::{export_filtered, PreviewOptions};
use clarityprep::{
    CleanupPass, FeatureExtractor, LabelledCorpus, PipelineConfig, RejectAction, Validator,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli
        .pipeline
        .pipeline_config()
        .context("Failed to load pipeline configuration")?;

    match &cli.command {
        Command::Clean(args) => handle_clean(args, config),
        Command::Preview(args) => handle_preview(args, config),
        Command::Labels(args) => handle_labels(args, &config),
        Command::Features(args) => handle_features(args, config),
    }
}

fn handle_clean(args: &CleanArgs, config: PipelineConfig) -> Result<()> {
    let action = args.reject_action()?;
    let report = CleanupPass::new(config, action.clone())
        .run(&args.root)
        .with_context(|| format!("Cleanup of {:?} failed", args.root))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    let verb = match action {
        RejectAction::None => "Files rejected",
        RejectAction::Delete => "Files deleted",
        RejectAction::MoveTo { .. } => "Files quarantined",
    };
    println!("Total files checked : {}", report.checked);
    println!("{:<20}: {}", verb, report.rejected);
    println!("  load failures     : {}", report.load_failures);
    println!("  too short         : {}", report.too_short);
    println!("  too silent        : {}", report.too_silent);
    println!("Remaining files     : {}", report.remaining());
    Ok(())
}

fn handle_preview(args: &PreviewArgs, config: PipelineConfig) -> Result<()> {
    let validator = Validator::new(config);
    let options = PreviewOptions {
        output_root: args.output_root.clone(),
        dataset_root: args.dataset_root.clone(),
        preserve_structure: !args.flat,
    };
    for input in &args.inputs {
        match export_filtered(&validator, input, &options)? {
            Some(path) => println!("{}", path.display()),
            None => eprintln!("Skipped {:?}: audio invalid or too silent", input),
        }
    }
    Ok(())
}

fn handle_labels(args: &LabelsArgs, config: &PipelineConfig) -> Result<()> {
    let corpus = LabelledCorpus::build(&args.root, config)
        .with_context(|| format!("Failed to label corpus at {:?}", args.root))?;
    let manifest = serde_json::to_string_pretty(&corpus.to_manifest())?;
    match &args.output {
        Some(path) => fs::write(path, manifest)
            .with_context(|| format!("Failed to write manifest {:?}", path))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{manifest}")?;
        }
    }
    Ok(())
}

fn handle_features(args: &FeaturesArgs, config: PipelineConfig) -> Result<()> {
    let validator = Validator::new(config.clone());
    let signal = validator
        .validate(&args.input, &RejectAction::None)
        .with_context(|| format!("Cannot extract features from {:?}", args.input))?;
    let tensor = FeatureExtractor::new(config).extract(&signal);
    let (rows, cols) = tensor.shape();
    println!("{rows} x {cols}");
    if let Some(path) = &args.output {
        let json = serde_json::to_string(&tensor)?;
        fs::write(path, json).with_context(|| format!("Failed to write tensor {:?}", path))?;
    }
    Ok(())
}

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use csw_sweep::{generate_scenarios, load_config_from_path, MetadataStore};
use csw_ts::classify_artifact;
use tabwriter::TabWriter;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    match &cli.command {
        Commands::Generate {
            config,
            out,
            overwrite,
        } => generate(config, out, *overwrite),
        Commands::Classify { artifact, scenario } => classify(artifact, scenario.as_deref()),
        Commands::Verdicts { dir } => verdicts(dir),
    }
}

fn generate(config_path: &Path, out: &Path, overwrite: bool) -> Result<()> {
    let config = load_config_from_path(config_path)?;
    let store = MetadataStore::new(out);
    let existed = store.exists();
    let scenarios = generate_scenarios(&config.dimensions, &store, overwrite)?;
    if existed && !overwrite {
        info!(
            "metadata table '{}' already exists; loaded {} scenarios unchanged (pass --overwrite to regenerate)",
            out.display(),
            scenarios.len()
        );
    } else {
        info!("wrote {} scenarios to '{}'", scenarios.len(), out.display());
    }
    Ok(())
}

fn classify(artifact: &Path, scenario: Option<&str>) -> Result<()> {
    let verdict = classify_artifact(artifact, scenario)?;
    serde_json::to_writer_pretty(io::stdout(), &verdict).context("serializing verdict to JSON")?;
    println!();
    Ok(())
}

fn verdicts(dir: &Path) -> Result<()> {
    let mut artifacts: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading sweep output directory '{}'", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("parquet"))
        .collect();
    artifacts.sort();

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "SCENARIO\tSTATUS\tCOLLAPSED")?;
    for artifact in &artifacts {
        let verdict = classify_artifact(artifact, None)?;
        writeln!(
            writer,
            "{}\t{}\t{}",
            verdict.scenario_id,
            verdict.status.as_str(),
            verdict.collapsed_generators.join(", ")
        )?;
    }
    writer.flush()?;
    Ok(())
}

//! `hitsample`: reduce an ASN-annotated hitlist to a stratified sample
//!
//! ```text
//! hitsample annotated.txt sample.txt --target 400000 --seed 42
//! ```
//!
//! Log verbosity follows `RUST_LOG`, or `-v`/`-vv` when it is unset.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hitsample::config::SamplerConfig;
use hitsample::pipeline;
use hitsample::sampling::AcceptanceRule;

#[derive(Parser, Debug)]
#[command(
    name = "hitsample",
    version,
    about = "Stratified quota sampling of an ASN-annotated address hitlist"
)]
struct Cli {
    /// Annotated input, one `address,asn,prefix` record per line
    input: PathBuf,

    /// Output file, one sampled address per line
    output: PathBuf,

    /// Target overall sample size
    #[arg(short = 'n', long)]
    target: Option<u64>,

    /// Seed for the random source (omit for a non-deterministic run)
    #[arg(long)]
    seed: Option<u64>,

    /// Acceptance probability rule
    #[arg(long, value_enum)]
    rule: Option<AcceptanceRule>,

    /// JSON configuration file; command-line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a per-stratum JSON report here
    #[arg(long)]
    report: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn sampler_config(&self) -> Result<SamplerConfig> {
        let config = match &self.config {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("opening config {}", path.display()))?;
                serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => SamplerConfig::default(),
        };

        Ok(config.with_overrides(self.target, self.seed, self.rule)?)
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.sampler_config()?;
    info!(
        target_size = config.target_size,
        seed = ?config.seed,
        rule = %config.rule,
        "starting run"
    );

    let report = pipeline::run_files(&cli.input, &cli.output, &config).with_context(|| {
        format!(
            "sampling {} into {}",
            cli.input.display(),
            cli.output.display()
        )
    })?;

    if let Some(path) = &cli.report {
        let file =
            File::create(path).with_context(|| format!("creating report {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)
            .with_context(|| format!("writing report {}", path.display()))?;
    }

    info!(
        population = report.population,
        accepted = report.accepted,
        planned = report.planned,
        fill_rate = report.fill_rate(),
        underfilled = report.underfilled().count(),
        "done"
    );
    Ok(())
}

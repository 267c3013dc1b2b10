//! Two-pass driver over readers and files
//!
//! The planning pass must consume the whole input before the sampling pass
//! starts. For files, the input is simply opened twice; both passes must see
//! the same records in the same order.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{info, warn};

use crate::config::SamplerConfig;
use crate::error::Result;
use crate::quota::{PopulationCounts, QuotaPlanner, QuotaTable};
use crate::record::RecordReader;
use crate::sampling::{AcceptanceRule, SampleReport, StratifiedSampler};
use crate::traits::{AddressWriter, RecordSink};

/// Planning pass: count every record of `reader` and derive quotas
pub fn plan_reader<R: BufRead>(
    reader: R,
    planner: &QuotaPlanner,
) -> Result<(PopulationCounts, QuotaTable)> {
    let counts = PopulationCounts::from_records(RecordReader::new(reader))?;
    let table = planner.plan(&counts)?;
    Ok((counts, table))
}

/// Sampling pass: decide on every record of `reader` against `table`
pub fn sample_reader<R, G, S>(
    reader: R,
    table: &QuotaTable,
    rule: AcceptanceRule,
    rng: G,
    sink: S,
) -> Result<SampleReport>
where
    R: BufRead,
    G: Rng,
    S: RecordSink,
{
    StratifiedSampler::new(table, rng)
        .with_rule(rule)
        .sample_all(RecordReader::new(reader), sink)
}

/// Path the sample is written to before the run completes
pub fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// Plan and sample `input`, writing one accepted address per line to `output`
///
/// The output is created only after planning succeeds, so an empty or
/// malformed population leaves no file behind. The sample is written to
/// [`partial_path`] first and renamed into place once the sampling pass
/// completes; a file at `output` is therefore always a complete sample, and
/// a `.partial` file left by a failed run is not.
///
/// A failed run never touches `output`. If an earlier run left a sample
/// there, it survives unchanged and does not describe the current input.
pub fn run_files(input: &Path, output: &Path, config: &SamplerConfig) -> Result<SampleReport> {
    let planner = config.planner()?;

    info!(input = %input.display(), "planning pass");
    let (_, table) = plan_reader(BufReader::new(File::open(input)?), &planner)?;

    let partial = partial_path(output);
    info!(input = %input.display(), output = %partial.display(), "sampling pass");

    let result = sample_into(input, &partial, &table, config)
        .and_then(|report| fs::rename(&partial, output).map(|_| report).map_err(Into::into));
    match result {
        Ok(report) => {
            info!(output = %output.display(), accepted = report.accepted, "sample written");
            Ok(report)
        }
        Err(e) => {
            warn!(
                output = %partial.display(),
                error = %e,
                "sampling failed; partial output is incomplete and not a valid sample"
            );
            if output.exists() {
                warn!(
                    output = %output.display(),
                    "existing output is from an earlier run and was left unchanged"
                );
            }
            Err(e)
        }
    }
}

fn sample_into(
    input: &Path,
    partial: &Path,
    table: &QuotaTable,
    config: &SamplerConfig,
) -> Result<SampleReport> {
    let reader = BufReader::new(File::open(input)?);
    let writer = AddressWriter::new(BufWriter::new(File::create(partial)?));
    sample_reader(reader, table, config.rule, config.rng(), writer)
}

//! Stratified stream sampling
//!
//! The second pass over the annotated records. [`StratifiedSampler`] makes an
//! irrevocable accept/reject decision per record against the quotas of a
//! completed [`QuotaTable`](crate::quota::QuotaTable), keeping only
//! per-stratum counters in memory.
//!
//! # Example
//!
//! ```
//! use hitsample::quota::{PopulationCounts, QuotaPlanner};
//! use hitsample::record::RecordReader;
//! use hitsample::sampling::{AcceptanceRule, StratifiedSampler};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let input = "\
//! 10.0.0.1,AS1,10.0.0.0/24
//! 10.0.0.2,AS1,10.0.0.0/24
//! 10.0.0.3,AS1,10.0.0.0/24
//! 20.0.0.1,AS2,20.0.0.0/24
//! ";
//!
//! // Pass 1: plan
//! let counts = PopulationCounts::from_records(RecordReader::new(input.as_bytes())).unwrap();
//! let table = QuotaPlanner::new(2).unwrap().plan(&counts).unwrap();
//!
//! // Pass 2: sample
//! let mut sample: Vec<String> = Vec::new();
//! let report = StratifiedSampler::new(&table, StdRng::seed_from_u64(1))
//!     .with_rule(AcceptanceRule::RemainingPopulation)
//!     .sample_all(RecordReader::new(input.as_bytes()), &mut sample)
//!     .unwrap();
//!
//! // Selection sampling fills both single-slot strata
//! assert_eq!(report.accepted, 2);
//! ```

mod acceptance;
mod report;
mod stratified;
mod usage;

pub use acceptance::AcceptanceRule;
pub use report::{SampleReport, StratumFill};
pub use stratified::{Decision, StratifiedSampler};
pub use usage::{StratumUsage, UsageCounters};

//! # hitsample
//!
//! Stratified, quota-based streaming sampling of address hitlists.
//!
//! A hitlist annotated with each address's announcing ASN and covering
//! routing prefix is reduced to a sample whose distribution across ASNs and
//! prefixes mirrors the full population, using two sequential passes and
//! memory proportional to the number of strata.
//!
//! ## Passes
//!
//! - **Planning**: count records per ASN and per (ASN, prefix) stratum, then
//!   assign each stratum a quota proportional to its share of a target
//!   sample size, never less than 1
//! - **Sampling**: re-read the records and accept each with a probability
//!   derived from its stratum's remaining quota, never exceeding the quota
//!
//! ## Quick Start
//!
//! ```rust
//! use hitsample::prelude::*;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let hitlist = "\
//! 2001:db8::1,64500,2001:db8::/32
//! 2001:db8::2,64500,2001:db8::/32
//! 2001:db8:1::1,64500,2001:db8:1::/48
//! 2001:db9::1,64501,2001:db9::/32
//! ";
//!
//! let planner = QuotaPlanner::new(2).unwrap();
//! let counts = PopulationCounts::from_records(RecordReader::new(hitlist.as_bytes())).unwrap();
//! let table = planner.plan(&counts).unwrap();
//!
//! let mut sample: Vec<String> = Vec::new();
//! let report = StratifiedSampler::new(&table, StdRng::seed_from_u64(42))
//!     .sample_all(RecordReader::new(hitlist.as_bytes()), &mut sample)
//!     .unwrap();
//!
//! for stratum in &report.strata {
//!     assert!(stratum.accepted <= stratum.quota);
//! }
//! ```
//!
//! ## Input format
//!
//! One `address,asn,prefix` record per line, no header. ASN and prefix are
//! opaque strings. Malformed lines abort the run.
//!
//! ## Feature Flags
//!
//! - `serde`: serialization of configuration, quotas and reports
//! - `cli` (default): the `hitsample` binary

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod quota;
pub mod record;
pub mod sampling;
pub mod traits;

pub mod prelude {
    pub use crate::config::SamplerConfig;
    pub use crate::error::{Result, SamplerError};
    pub use crate::quota::{PopulationCounts, QuotaPlanner, QuotaTable};
    pub use crate::record::{AnnotatedRecord, RecordReader, StratumKey};
    pub use crate::sampling::{AcceptanceRule, SampleReport, StratifiedSampler};
    pub use crate::traits::*;
}

pub use error::{Result, SamplerError};
pub use quota::{QuotaPlanner, QuotaTable};
pub use sampling::StratifiedSampler;

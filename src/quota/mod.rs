//! Quota planning
//!
//! The planning pass counts every record per ASN and per (ASN, prefix)
//! stratum, then turns those counts into proportional quotas under a global
//! target sample size.
//!
//! # Example
//!
//! ```
//! use hitsample::quota::{PopulationCounts, QuotaPlanner};
//! use hitsample::record::RecordReader;
//!
//! let input = "\
//! 10.0.0.1,AS1,10.0.0.0/24
//! 10.0.0.2,AS1,10.0.0.0/24
//! 20.0.0.1,AS2,20.0.0.0/24
//! ";
//!
//! let counts = PopulationCounts::from_records(RecordReader::new(input.as_bytes())).unwrap();
//! let table = QuotaPlanner::new(2).unwrap().plan(&counts).unwrap();
//!
//! // Every observed stratum keeps at least one slot
//! assert_eq!(table.prefix_quota("AS2", "20.0.0.0/24"), Some(1));
//! ```

mod planner;
mod population;

pub use planner::{QuotaPlanner, QuotaTable, StratumQuota};
pub use population::PopulationCounts;

//! Proportional quota planning
//!
//! Quotas are assigned top-down: each ASN receives its share of the target
//! sample size, then each of its prefixes receives its share of the ASN
//! quota. Both levels are floored and raised to at least 1, so no observed
//! stratum is ever dropped entirely.

use tracing::{debug, info};

use crate::error::{Result, SamplerError};
use crate::quota::PopulationCounts;
use crate::record::{stratum_map, StratumKey, StratumMap};

/// `max(1, floor(target * count / total))` in exact integer arithmetic
fn proportional_share(target: u64, count: u64, total: u64) -> u64 {
    debug_assert!(total > 0);
    let share = (target as u128 * count as u128) / total as u128;
    (share as u64).max(1)
}

/// Quota and population of a single stratum
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StratumQuota {
    /// Target number of records to accept
    pub quota: u64,
    /// Records observed in the planning pass
    pub population: u64,
}

#[derive(Clone, Debug)]
pub(crate) struct AsnQuota {
    pub(crate) quota: u64,
    pub(crate) population: u64,
    pub(crate) prefixes: StratumMap<StratumQuota>,
}

/// Completed per-ASN and per-stratum quotas
///
/// Only [`QuotaPlanner::plan`] produces a table, and only from a finished
/// population count, so holding a `QuotaTable` means the planning pass is
/// over. The table also carries every stratum's population, which the
/// sampler uses as its acceptance denominator.
///
/// Prefix quotas are floored independently, so within one ASN they may sum
/// to more or less than the ASN quota. The ASN quota is informational.
#[derive(Clone, Debug)]
pub struct QuotaTable {
    pub(crate) asns: StratumMap<AsnQuota>,
    target: u64,
    population: u64,
    planned: u64,
    strata: usize,
}

impl QuotaTable {
    /// Target overall sample size the table was planned for
    pub fn target(&self) -> u64 {
        self.target
    }

    /// Population size of the planning pass
    pub fn population(&self) -> u64 {
        self.population
    }

    /// Sum of all stratum quotas
    ///
    /// Can differ from [`target`](Self::target) because of flooring and the
    /// per-stratum minimum of 1.
    pub fn planned_total(&self) -> u64 {
        self.planned
    }

    /// Quota of an ASN
    pub fn asn_quota(&self, asn: &str) -> Option<u64> {
        self.asns.get(asn).map(|e| e.quota)
    }

    /// Population of an ASN in the planning pass
    pub fn asn_population(&self, asn: &str) -> Option<u64> {
        self.asns.get(asn).map(|e| e.population)
    }

    /// Quota of a stratum
    pub fn prefix_quota(&self, asn: &str, prefix: &str) -> Option<u64> {
        self.stratum(asn, prefix).map(|s| s.quota)
    }

    /// Quota and population of a stratum
    pub fn stratum(&self, asn: &str, prefix: &str) -> Option<StratumQuota> {
        self.asns.get(asn)?.prefixes.get(prefix).copied()
    }

    /// Number of distinct ASNs
    pub fn num_asns(&self) -> usize {
        self.asns.len()
    }

    /// Number of strata
    pub fn num_strata(&self) -> usize {
        self.strata
    }

    /// Iterate over every stratum and its quota
    pub fn strata(&self) -> impl Iterator<Item = (&str, &str, StratumQuota)> + '_ {
        self.asns.iter().flat_map(|(asn, entry)| {
            entry
                .prefixes
                .iter()
                .map(move |(prefix, &q)| (asn.as_str(), prefix.as_str(), q))
        })
    }

    /// Strata sorted by key, for stable reporting
    pub fn sorted_strata(&self) -> Vec<(StratumKey, StratumQuota)> {
        let mut strata: Vec<_> = self
            .strata()
            .map(|(asn, prefix, q)| (StratumKey::new(asn, prefix), q))
            .collect();
        strata.sort_by(|a, b| a.0.cmp(&b.0));
        strata
    }
}

/// Derives a [`QuotaTable`] from population counts
///
/// # Example
///
/// ```
/// use hitsample::quota::{PopulationCounts, QuotaPlanner};
///
/// let mut counts = PopulationCounts::new();
/// for _ in 0..7 {
///     counts.observe("AS1", "10.0.0.0/24");
/// }
/// for _ in 0..3 {
///     counts.observe("AS2", "20.0.0.0/24");
/// }
///
/// let table = QuotaPlanner::new(4).unwrap().plan(&counts).unwrap();
/// assert_eq!(table.asn_quota("AS1"), Some(2));
/// assert_eq!(table.asn_quota("AS2"), Some(1));
/// assert_eq!(table.prefix_quota("AS1", "10.0.0.0/24"), Some(2));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuotaPlanner {
    target: u64,
}

impl QuotaPlanner {
    /// Create a planner for a target overall sample size
    ///
    /// Returns a configuration error if `target` is zero.
    pub fn new(target: u64) -> Result<Self> {
        if target == 0 {
            return Err(SamplerError::Config {
                message: "target sample size must be positive".into(),
            });
        }
        Ok(Self { target })
    }

    /// Target overall sample size
    pub fn target(&self) -> u64 {
        self.target
    }

    /// Compute quotas for every observed ASN and stratum
    ///
    /// Fails with [`SamplerError::EmptyPopulation`] when no record was
    /// observed.
    pub fn plan(&self, counts: &PopulationCounts) -> Result<QuotaTable> {
        let total = counts.total();
        if total == 0 {
            return Err(SamplerError::EmptyPopulation);
        }

        let mut asns = stratum_map();
        let mut planned = 0u64;

        for (asn, population) in &counts.asns {
            let asn_quota = proportional_share(self.target, population.count, total);

            let mut prefixes = stratum_map();
            for (prefix, &count) in &population.prefixes {
                let quota = proportional_share(asn_quota, count, population.count);
                planned = planned.saturating_add(quota);
                prefixes.insert(
                    prefix.clone(),
                    StratumQuota {
                        quota,
                        population: count,
                    },
                );
            }

            debug!(
                asn = %asn,
                population = population.count,
                quota = asn_quota,
                prefixes = prefixes.len(),
                "planned asn quota"
            );

            asns.insert(
                asn.clone(),
                AsnQuota {
                    quota: asn_quota,
                    population: population.count,
                    prefixes,
                },
            );
        }

        info!(
            population = total,
            target = self.target,
            planned,
            asns = counts.num_asns(),
            strata = counts.num_strata(),
            "quota plan complete"
        );

        Ok(QuotaTable {
            asns,
            target: self.target,
            population: total,
            planned,
            strata: counts.num_strata(),
        })
    }
}

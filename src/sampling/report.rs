//! Summary of a completed sampling pass

use crate::quota::QuotaTable;
use crate::sampling::{AcceptanceRule, UsageCounters};

/// Planned and realized sample of one stratum
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StratumFill {
    /// Announcing ASN
    pub asn: String,
    /// Covering prefix
    pub prefix: String,
    /// Records counted in the planning pass
    pub population: u64,
    /// Quota assigned by the planner
    pub quota: u64,
    /// Records accepted by the sampler
    pub accepted: u64,
}

impl StratumFill {
    /// Slots of the quota left unused
    pub fn shortfall(&self) -> u64 {
        self.quota.saturating_sub(self.accepted)
    }

    /// Whether the stratum could still have supplied more records
    ///
    /// A stratum whose quota exceeds its population cannot fill, so it only
    /// counts as under-filled when some records were left unsampled.
    pub fn is_underfilled(&self) -> bool {
        self.accepted < self.quota.min(self.population)
    }
}

/// Outcome of a sampling pass
///
/// Strata are sorted by (ASN, prefix).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleReport {
    /// Acceptance rule used
    pub rule: AcceptanceRule,
    /// Target overall sample size
    pub target: u64,
    /// Population counted in the planning pass
    pub population: u64,
    /// Sum of all stratum quotas
    pub planned: u64,
    /// Records offered to the sampler
    pub offered: u64,
    /// Records accepted
    pub accepted: u64,
    /// Records rejected because their stratum had used its quota
    pub exhausted: u64,
    /// Per-stratum detail
    pub strata: Vec<StratumFill>,
}

impl SampleReport {
    pub(crate) fn build(
        table: &QuotaTable,
        usage: &UsageCounters,
        rule: AcceptanceRule,
        offered: u64,
        accepted: u64,
        exhausted: u64,
    ) -> Self {
        let strata = table
            .sorted_strata()
            .into_iter()
            .map(|(key, q)| StratumFill {
                accepted: usage.used(&key.asn, &key.prefix),
                asn: key.asn,
                prefix: key.prefix,
                population: q.population,
                quota: q.quota,
            })
            .collect();

        Self {
            rule,
            target: table.target(),
            population: table.population(),
            planned: table.planned_total(),
            offered,
            accepted,
            exhausted,
            strata,
        }
    }

    /// Strata that finished below their attainable quota
    pub fn underfilled(&self) -> impl Iterator<Item = &StratumFill> + '_ {
        self.strata.iter().filter(|s| s.is_underfilled())
    }

    /// Records accepted from an ASN across all its prefixes
    pub fn accepted_for_asn(&self, asn: &str) -> u64 {
        self.strata
            .iter()
            .filter(|s| s.asn == asn)
            .map(|s| s.accepted)
            .sum()
    }

    /// Accepted records as a fraction of the planned total
    pub fn fill_rate(&self) -> f64 {
        if self.planned == 0 {
            0.0
        } else {
            self.accepted as f64 / self.planned as f64
        }
    }
}

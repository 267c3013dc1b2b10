//! Running per-stratum state of the sampling pass

use crate::record::{stratum_map, StratumMap};

/// Progress of one stratum through the sampling pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StratumUsage {
    /// Records accepted so far
    pub used: u64,
    /// Records offered so far
    pub seen: u64,
}

/// Accepted and offered counts per (ASN, prefix) stratum
///
/// Created empty for each sampling pass and mutated only by the sampler.
/// `used` never decreases and never exceeds the stratum's quota.
#[derive(Clone, Debug)]
pub struct UsageCounters {
    asns: StratumMap<StratumMap<StratumUsage>>,
}

impl Default for UsageCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageCounters {
    /// Create empty counters
    pub fn new() -> Self {
        Self {
            asns: stratum_map(),
        }
    }

    /// Usage of a stratum, zero if it has not been offered yet
    pub fn get(&self, asn: &str, prefix: &str) -> StratumUsage {
        self.asns
            .get(asn)
            .and_then(|prefixes| prefixes.get(prefix))
            .copied()
            .unwrap_or_default()
    }

    /// Records accepted from a stratum
    pub fn used(&self, asn: &str, prefix: &str) -> u64 {
        self.get(asn, prefix).used
    }

    pub(crate) fn store(&mut self, asn: &str, prefix: &str, usage: StratumUsage) {
        match self.asns.get_mut(asn) {
            Some(prefixes) => match prefixes.get_mut(prefix) {
                Some(slot) => *slot = usage,
                None => {
                    prefixes.insert(prefix.to_owned(), usage);
                }
            },
            None => {
                let mut prefixes = stratum_map();
                prefixes.insert(prefix.to_owned(), usage);
                self.asns.insert(asn.to_owned(), prefixes);
            }
        }
    }

    /// Number of strata offered at least once
    pub fn num_strata(&self) -> usize {
        self.asns.values().map(|p| p.len()).sum()
    }
}

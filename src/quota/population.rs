//! Population counts per ASN and per (ASN, prefix) stratum
//!
//! Built in the planning pass and read-only afterwards.

use crate::error::Result;
use crate::record::{stratum_map, AnnotatedRecord, StratumMap};

/// Observed population of one ASN
#[derive(Clone, Debug)]
pub(crate) struct AsnPopulation {
    pub(crate) count: u64,
    pub(crate) prefixes: StratumMap<u64>,
}

impl AsnPopulation {
    fn new() -> Self {
        Self {
            count: 0,
            prefixes: stratum_map(),
        }
    }
}

/// Record counts per ASN and per (ASN, prefix) stratum
///
/// Memory grows with the number of distinct strata, not with the number of
/// records observed.
///
/// # Example
///
/// ```
/// use hitsample::quota::PopulationCounts;
///
/// let mut counts = PopulationCounts::new();
/// counts.observe("AS1", "10.0.0.0/24");
/// counts.observe("AS1", "10.0.1.0/24");
/// counts.observe("AS2", "20.0.0.0/24");
///
/// assert_eq!(counts.total(), 3);
/// assert_eq!(counts.asn_count("AS1"), Some(2));
/// assert_eq!(counts.prefix_count("AS1", "10.0.1.0/24"), Some(1));
/// assert_eq!(counts.num_strata(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct PopulationCounts {
    pub(crate) asns: StratumMap<AsnPopulation>,
    total: u64,
    strata: usize,
}

impl Default for PopulationCounts {
    fn default() -> Self {
        Self::new()
    }
}

impl PopulationCounts {
    /// Create empty counts
    pub fn new() -> Self {
        Self {
            asns: stratum_map(),
            total: 0,
            strata: 0,
        }
    }

    /// Count every record of an iterator, stopping at the first error
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<AnnotatedRecord>>,
    {
        let mut counts = Self::new();
        for record in records {
            counts.observe_record(&record?);
        }
        Ok(counts)
    }

    /// Count one record
    pub fn observe_record(&mut self, record: &AnnotatedRecord) {
        self.observe(&record.asn, &record.prefix);
    }

    /// Count one observation of the stratum `(asn, prefix)`
    pub fn observe(&mut self, asn: &str, prefix: &str) {
        self.add(asn, prefix, 1);
    }

    fn add(&mut self, asn: &str, prefix: &str, n: u64) {
        // Lookup by &str first so the common path allocates nothing.
        match self.asns.get_mut(asn) {
            Some(entry) => {
                entry.count += n;
                match entry.prefixes.get_mut(prefix) {
                    Some(count) => *count += n,
                    None => {
                        entry.prefixes.insert(prefix.to_owned(), n);
                        self.strata += 1;
                    }
                }
            }
            None => {
                let mut entry = AsnPopulation::new();
                entry.count = n;
                entry.prefixes.insert(prefix.to_owned(), n);
                self.asns.insert(asn.to_owned(), entry);
                self.strata += 1;
            }
        }
        self.total += n;
    }

    /// Fold counts built over another partition of the same dataset
    ///
    /// Merging the counts of two disjoint partitions gives the counts of
    /// their concatenation.
    pub fn merge(&mut self, other: &Self) {
        for (asn, entry) in &other.asns {
            for (prefix, &count) in &entry.prefixes {
                self.add(asn, prefix, count);
            }
        }
    }

    /// Total number of records observed
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Check if no record has been observed
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Records observed for an ASN
    pub fn asn_count(&self, asn: &str) -> Option<u64> {
        self.asns.get(asn).map(|e| e.count)
    }

    /// Records observed for a stratum
    pub fn prefix_count(&self, asn: &str, prefix: &str) -> Option<u64> {
        self.asns.get(asn)?.prefixes.get(prefix).copied()
    }

    /// Number of distinct ASNs
    pub fn num_asns(&self) -> usize {
        self.asns.len()
    }

    /// Number of distinct (ASN, prefix) strata
    pub fn num_strata(&self) -> usize {
        self.strata
    }

    /// Iterate over `(asn, prefix, count)` for every stratum
    pub fn strata(&self) -> impl Iterator<Item = (&str, &str, u64)> + '_ {
        self.asns.iter().flat_map(|(asn, entry)| {
            entry
                .prefixes
                .iter()
                .map(move |(prefix, &count)| (asn.as_str(), prefix.as_str(), count))
        })
    }

    /// Approximate heap usage in bytes
    pub fn size_bytes(&self) -> usize {
        let strings: usize = self
            .asns
            .iter()
            .map(|(asn, e)| asn.capacity() + e.prefixes.keys().map(String::capacity).sum::<usize>())
            .sum();
        strings
            + self.asns.capacity() * core::mem::size_of::<(String, AsnPopulation)>()
            + self.strata * core::mem::size_of::<(String, u64)>()
    }
}

//! Quota-driven streaming sampler
//!
//! The sampler walks the annotated records a second time and decides on each
//! one immediately. A record is accepted with probability derived from its
//! stratum's remaining quota, and a stratum that has used its quota rejects
//! every further record without drawing.

use rand::Rng;
use tracing::{debug, info};

use crate::error::{Result, SamplerError};
use crate::quota::QuotaTable;
use crate::record::AnnotatedRecord;
use crate::sampling::{AcceptanceRule, SampleReport, UsageCounters};
use crate::traits::RecordSink;

/// Outcome of offering one record to the sampler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The random draw accepted the record
    Accepted,
    /// The random draw rejected the record
    Rejected,
    /// The stratum had already used its quota; no draw was made
    Exhausted,
}

impl Decision {
    /// Whether the record belongs in the sample
    pub fn is_accepted(self) -> bool {
        self == Decision::Accepted
    }
}

/// Single-pass stratified sampler
///
/// Borrowing a finished [`QuotaTable`] is the only way to build one, so
/// sampling cannot start before planning has consumed the whole population.
/// The random source is consumed in record order; seed it for reproducible
/// runs.
///
/// # Example
///
/// ```
/// use hitsample::quota::{PopulationCounts, QuotaPlanner};
/// use hitsample::record::AnnotatedRecord;
/// use hitsample::sampling::StratifiedSampler;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let records: Vec<_> = (0..10)
///     .map(|i| {
///         let asn = if i < 7 { "AS1" } else { "AS2" };
///         let prefix = if i < 7 { "10.0.0.0/24" } else { "20.0.0.0/24" };
///         AnnotatedRecord::new(format!("host{}", i), asn, prefix)
///     })
///     .collect();
///
/// let mut counts = PopulationCounts::new();
/// records.iter().for_each(|r| counts.observe_record(r));
/// let table = QuotaPlanner::new(4).unwrap().plan(&counts).unwrap();
///
/// let mut sampler = StratifiedSampler::new(&table, StdRng::seed_from_u64(7));
/// let mut sample: Vec<String> = Vec::new();
/// let report = sampler
///     .sample_all(records.into_iter().map(Ok), &mut sample)
///     .unwrap();
///
/// assert!(report.accepted_for_asn("AS1") <= 2);
/// assert!(report.accepted_for_asn("AS2") <= 1);
/// assert_eq!(sample.len() as u64, report.accepted);
/// ```
#[derive(Debug)]
pub struct StratifiedSampler<'q, R> {
    table: &'q QuotaTable,
    usage: UsageCounters,
    rule: AcceptanceRule,
    rng: R,
    offered: u64,
    accepted: u64,
    exhausted: u64,
}

impl<'q, R: Rng> StratifiedSampler<'q, R> {
    /// Create a sampler over a completed quota table
    pub fn new(table: &'q QuotaTable, rng: R) -> Self {
        Self {
            table,
            usage: UsageCounters::new(),
            rule: AcceptanceRule::default(),
            rng,
            offered: 0,
            accepted: 0,
            exhausted: 0,
        }
    }

    /// Use a different acceptance rule
    pub fn with_rule(mut self, rule: AcceptanceRule) -> Self {
        self.rule = rule;
        self
    }

    /// Acceptance rule in use
    pub fn rule(&self) -> AcceptanceRule {
        self.rule
    }

    /// Decide on one record
    ///
    /// Fails with [`SamplerError::MissingQuota`] if the record's stratum was
    /// not part of the planned population.
    pub fn offer(&mut self, record: &AnnotatedRecord) -> Result<Decision> {
        let stratum = self
            .table
            .stratum(&record.asn, &record.prefix)
            .ok_or_else(|| SamplerError::missing_quota(&record.asn, &record.prefix))?;

        self.offered += 1;
        let mut usage = self.usage.get(&record.asn, &record.prefix);
        let seen_before = usage.seen;
        usage.seen += 1;

        let decision = if usage.used >= stratum.quota {
            self.exhausted += 1;
            Decision::Exhausted
        } else {
            let p = self
                .rule
                .probability(stratum.quota, usage.used, stratum.population, seen_before);
            let r: f64 = self.rng.gen();
            if r < p {
                usage.used += 1;
                self.accepted += 1;
                Decision::Accepted
            } else {
                Decision::Rejected
            }
        };
        self.usage.store(&record.asn, &record.prefix, usage);

        if decision.is_accepted() && usage.used == stratum.quota {
            debug!(
                asn = %record.asn,
                prefix = %record.prefix,
                quota = stratum.quota,
                seen = usage.seen,
                population = stratum.population,
                "stratum quota filled"
            );
        }
        Ok(decision)
    }

    /// Offer every record in order and pass the accepted ones to `sink`
    ///
    /// Stops at the first error. Records already handed to the sink stay
    /// there, so a failed run leaves an incomplete sample behind.
    pub fn sample_all<I, S>(&mut self, records: I, mut sink: S) -> Result<SampleReport>
    where
        I: IntoIterator<Item = Result<AnnotatedRecord>>,
        S: RecordSink,
    {
        for record in records {
            let record = record?;
            if self.offer(&record)?.is_accepted() {
                sink.accept(&record)?;
            }
        }
        sink.finish()?;

        let report = self.report();
        info!(
            rule = %self.rule,
            offered = report.offered,
            accepted = report.accepted,
            planned = report.planned,
            exhausted = report.exhausted,
            underfilled = report.underfilled().count(),
            "sampling pass complete"
        );
        Ok(report)
    }

    /// Per-stratum usage so far
    pub fn usage(&self) -> &UsageCounters {
        &self.usage
    }

    /// Records offered so far
    pub fn offered(&self) -> u64 {
        self.offered
    }

    /// Records accepted so far
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Summary of the pass so far
    pub fn report(&self) -> SampleReport {
        SampleReport::build(
            self.table,
            &self.usage,
            self.rule,
            self.offered,
            self.accepted,
            self.exhausted,
        )
    }
}

//! Correctness and invariant tests for hitsample
//!
//! These tests drive the planner and the sampler together over synthetic
//! hitlists. They complement the unit tests in each module by focusing on
//! properties that must hold for every run.
//!
//! Run with: cargo test --test correctness

use hitsample::pipeline::{plan_reader, sample_reader};
use hitsample::quota::{PopulationCounts, QuotaPlanner, QuotaTable};
use hitsample::record::{AnnotatedRecord, RecordReader};
use hitsample::sampling::{AcceptanceRule, SampleReport, StratifiedSampler};
use hitsample::SamplerError;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn hitlist(strata: &[(&str, &str, usize)]) -> Vec<AnnotatedRecord> {
    let mut out = Vec::new();
    for &(asn, prefix, n) in strata {
        for i in 0..n {
            out.push(AnnotatedRecord::new(format!("{}#{}", prefix, i), asn, prefix));
        }
    }
    out
}

fn plan(records: &[AnnotatedRecord], target: u64) -> QuotaTable {
    let counts = PopulationCounts::from_records(records.iter().cloned().map(Ok)).unwrap();
    QuotaPlanner::new(target).unwrap().plan(&counts).unwrap()
}

fn sample(
    records: &[AnnotatedRecord],
    table: &QuotaTable,
    rule: AcceptanceRule,
    seed: u64,
) -> (Vec<String>, SampleReport) {
    let mut out: Vec<String> = Vec::new();
    let report = StratifiedSampler::new(table, StdRng::seed_from_u64(seed))
        .with_rule(rule)
        .sample_all(records.iter().cloned().map(Ok), &mut out)
        .unwrap();
    (out, report)
}

/// Four strata, each with a quota of 2% of its population
fn proportional_population() -> Vec<AnnotatedRecord> {
    hitlist(&[
        ("AS1", "10.0.0.0/16", 3000),
        ("AS1", "10.1.0.0/16", 3000),
        ("AS2", "20.0.0.0/16", 3000),
        ("AS3", "30.0.0.0/16", 1000),
    ])
}

// ============================================================================
// Reference scenario
// ============================================================================

mod reference_scenario {
    use super::*;

    fn population() -> Vec<AnnotatedRecord> {
        hitlist(&[("AS1", "10.0.0.0/24", 7), ("AS2", "20.0.0.0/24", 3)])
    }

    #[test]
    fn quotas_match_worked_example() {
        let table = plan(&population(), 4);

        assert_eq!(table.asn_quota("AS1"), Some(2));
        assert_eq!(table.asn_quota("AS2"), Some(1));
        assert_eq!(table.prefix_quota("AS1", "10.0.0.0/24"), Some(2));
        assert_eq!(table.prefix_quota("AS2", "20.0.0.0/24"), Some(1));
    }

    #[test]
    fn never_more_than_quota_for_any_seed() {
        let records = population();
        let table = plan(&records, 4);

        for rule in [AcceptanceRule::FixedPopulation, AcceptanceRule::RemainingPopulation] {
            for seed in 0..500 {
                let (_, report) = sample(&records, &table, rule, seed);
                assert!(
                    report.accepted_for_asn("AS1") <= 2,
                    "seed {} with {} accepted {} from AS1",
                    seed,
                    rule,
                    report.accepted_for_asn("AS1")
                );
                assert!(report.accepted_for_asn("AS2") <= 1);
            }
        }
    }
}

// ============================================================================
// Quota planning
// ============================================================================

mod planning {
    use super::*;

    #[test]
    fn empty_population_is_an_error() {
        let planner = QuotaPlanner::new(10).unwrap();
        let err = plan_reader("".as_bytes(), &planner).unwrap_err();
        assert!(matches!(err, SamplerError::EmptyPopulation));
    }

    #[test]
    fn malformed_line_is_an_error_not_a_skip() {
        let planner = QuotaPlanner::new(10).unwrap();
        let input = "a,AS1,p1\nb;AS1;p1\nc,AS1,p1\n";

        match plan_reader(input.as_bytes(), &planner).unwrap_err() {
            SamplerError::RecordFormat { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn merged_partition_counts_plan_like_the_whole() {
        let records = proportional_population();
        let (left, right) = records.split_at(4321);

        let mut merged = PopulationCounts::from_records(left.iter().cloned().map(Ok)).unwrap();
        merged.merge(&PopulationCounts::from_records(right.iter().cloned().map(Ok)).unwrap());

        let planner = QuotaPlanner::new(200).unwrap();
        let from_merged = planner.plan(&merged).unwrap();
        let from_whole = plan(&records, 200);

        assert_eq!(from_merged.sorted_strata(), from_whole.sorted_strata());
    }

    proptest! {
        #[test]
        fn every_observed_stratum_gets_a_quota(
            strata in prop::collection::vec((0u8..6, 0u8..4, 1usize..40), 1..24),
            target in 1u64..2_000,
        ) {
            let mut counts = PopulationCounts::new();
            for &(asn, prefix, n) in &strata {
                for _ in 0..n {
                    counts.observe(&format!("AS{}", asn), &format!("p{}", prefix));
                }
            }
            let table = QuotaPlanner::new(target).unwrap().plan(&counts).unwrap();

            prop_assert_eq!(table.num_strata(), counts.num_strata());
            for (asn, prefix, population) in counts.strata() {
                let q = table.stratum(asn, prefix).unwrap();
                prop_assert!(q.quota >= 1);
                prop_assert_eq!(q.population, population);
                prop_assert!(table.asn_quota(asn).unwrap() >= 1);
            }
        }
    }
}

// ============================================================================
// Streaming sampler
// ============================================================================

mod sampling {
    use super::*;

    #[test]
    fn seeded_runs_are_identical() {
        let records = proportional_population();
        let table = plan(&records, 200);

        for rule in [AcceptanceRule::FixedPopulation, AcceptanceRule::RemainingPopulation] {
            let (a, report_a) = sample(&records, &table, rule, 2024);
            let (b, report_b) = sample(&records, &table, rule, 2024);
            assert_eq!(a, b);
            assert_eq!(report_a, report_b);
        }
    }

    #[test]
    fn output_follows_input_order() {
        let records = proportional_population();
        let table = plan(&records, 200);
        let (out, _) = sample(&records, &table, AcceptanceRule::FixedPopulation, 3);

        let position = |addr: &String| records.iter().position(|r| &r.address == addr).unwrap();
        let positions: Vec<usize> = out.iter().map(position).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn plan_from_other_dataset_is_rejected() {
        let planned = hitlist(&[("AS1", "10.0.0.0/24", 10)]);
        let other = hitlist(&[("AS9", "90.0.0.0/24", 10)]);
        let table = plan(&planned, 5);

        let mut out: Vec<String> = Vec::new();
        let err = StratifiedSampler::new(&table, StdRng::seed_from_u64(1))
            .sample_all(other.into_iter().map(Ok), &mut out)
            .unwrap_err();

        assert!(matches!(err, SamplerError::MissingQuota { .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn reader_passes_round_trip() {
        let text = "\
2001:db8::1,64500,2001:db8::/32
2001:db8::2,64500,2001:db8::/32
2001:db8:ff::1,64500,2001:db8:ff::/48
2001:db9::1,64501,2001:db9::/32
";
        let planner = QuotaPlanner::new(3).unwrap();
        let (_, table) = plan_reader(text.as_bytes(), &planner).unwrap();

        let mut out: Vec<String> = Vec::new();
        let report = sample_reader(
            text.as_bytes(),
            &table,
            AcceptanceRule::RemainingPopulation,
            StdRng::seed_from_u64(11),
            &mut out,
        )
        .unwrap();

        assert_eq!(report.offered, 4);
        assert_eq!(out.len() as u64, report.accepted);
        let parsed: Vec<_> = RecordReader::new(text.as_bytes())
            .map(|r| r.unwrap().address)
            .collect();
        assert!(out.iter().all(|a| parsed.contains(a)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn accepted_never_exceeds_quota(
            strata in prop::collection::vec((0u8..4, 0u8..3, 1usize..60), 1..12),
            target in 1u64..300,
            seed in any::<u64>(),
            remaining in any::<bool>(),
        ) {
            let mut records = Vec::new();
            for (i, &(asn, prefix, n)) in strata.iter().enumerate() {
                for j in 0..n {
                    records.push(AnnotatedRecord::new(
                        format!("{}-{}", i, j),
                        format!("AS{}", asn),
                        format!("p{}", prefix),
                    ));
                }
            }
            let rule = if remaining {
                AcceptanceRule::RemainingPopulation
            } else {
                AcceptanceRule::FixedPopulation
            };

            let table = plan(&records, target);
            let (_, report) = sample(&records, &table, rule, seed);

            for stratum in &report.strata {
                prop_assert!(stratum.accepted <= stratum.quota);
            }
        }
    }
}

// ============================================================================
// Statistical behaviour
// ============================================================================

mod statistics {
    use super::*;

    #[test]
    fn asn_shares_converge_to_population_shares() {
        let records = proportional_population();
        let table = plan(&records, 200);
        let runs = 50;

        let mut per_asn = [0u64; 3];
        for seed in 0..runs {
            let (_, report) = sample(&records, &table, AcceptanceRule::FixedPopulation, seed);
            for (slot, asn) in per_asn.iter_mut().zip(["AS1", "AS2", "AS3"]) {
                *slot += report.accepted_for_asn(asn);
            }
        }

        let total: u64 = per_asn.iter().sum();
        for (count, expected) in per_asn.iter().zip([0.6, 0.3, 0.1]) {
            let share = *count as f64 / total as f64;
            assert!(
                (share - expected).abs() < 0.03,
                "share {:.3} too far from population share {}",
                share,
                expected
            );
        }
    }

    #[test]
    fn fixed_denominator_underfills_large_strata() {
        // With the fixed denominator the expected fill of a large stratum is
        // about 1 - 1/e of its quota.
        let records = proportional_population();
        let table = plan(&records, 200);

        let runs = 20;
        let mean_fill: f64 = (0..runs)
            .map(|seed| sample(&records, &table, AcceptanceRule::FixedPopulation, seed).1.fill_rate())
            .sum::<f64>()
            / runs as f64;

        assert!(
            (0.55..0.72).contains(&mean_fill),
            "mean fill rate {:.3} outside the expected band",
            mean_fill
        );
    }

    #[test]
    fn remaining_denominator_fills_every_quota() {
        let records = proportional_population();
        let table = plan(&records, 200);

        for seed in 0..10 {
            let (_, report) = sample(&records, &table, AcceptanceRule::RemainingPopulation, seed);
            assert_eq!(report.underfilled().count(), 0);
            assert_eq!(report.accepted, report.planned);
            assert_eq!(report.accepted_for_asn("AS1"), 120);
            assert_eq!(report.accepted_for_asn("AS2"), 60);
            assert_eq!(report.accepted_for_asn("AS3"), 20);
        }
    }
}

//! Per-record acceptance probabilities
//!
//! Both rules share the never-exceed check: once a stratum has used its
//! quota the probability is zero and no random draw is made.

use core::fmt;
use core::str::FromStr;

/// How the sampler turns a stratum's remaining quota into a probability
///
/// # Example
///
/// ```
/// use hitsample::sampling::AcceptanceRule;
///
/// // 2 of 4 slots left in a stratum of 100 records, 60 already seen
/// let fixed = AcceptanceRule::FixedPopulation.probability(4, 2, 100, 60);
/// let remaining = AcceptanceRule::RemainingPopulation.probability(4, 2, 100, 60);
///
/// assert!((fixed - 0.02).abs() < 1e-12);
/// assert!((remaining - 0.05).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum AcceptanceRule {
    /// `p = remaining_quota / stratum_population`
    ///
    /// The denominator is the stratum's full population and never shrinks,
    /// so a stratum can finish the pass with fewer accepted records than its
    /// quota. This is the default.
    #[default]
    FixedPopulation,

    /// `p = remaining_quota / unseen_records_in_stratum`
    ///
    /// Selection sampling: when the sampling pass matches the planning pass,
    /// every stratum fills its quota exactly (or takes every record when the
    /// quota exceeds the population).
    RemainingPopulation,
}

impl AcceptanceRule {
    /// Acceptance probability for the next record of a stratum
    ///
    /// * `quota` - the stratum's quota
    /// * `used` - records already accepted from the stratum
    /// * `population` - records counted for the stratum in the planning pass
    /// * `seen_before` - records of the stratum already offered in this pass
    pub fn probability(self, quota: u64, used: u64, population: u64, seen_before: u64) -> f64 {
        if used >= quota {
            return 0.0;
        }
        let remaining = quota - used;

        let denominator = match self {
            AcceptanceRule::FixedPopulation => population,
            // More records than planned means the passes diverged; the
            // quota check above still bounds acceptance.
            AcceptanceRule::RemainingPopulation => population.saturating_sub(seen_before),
        }
        .max(1);

        (remaining as f64 / denominator as f64).min(1.0)
    }

    /// Name used on the command line and in configuration files
    pub fn as_str(self) -> &'static str {
        match self {
            AcceptanceRule::FixedPopulation => "fixed-population",
            AcceptanceRule::RemainingPopulation => "remaining-population",
        }
    }
}

impl fmt::Display for AcceptanceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AcceptanceRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed-population" => Ok(AcceptanceRule::FixedPopulation),
            "remaining-population" => Ok(AcceptanceRule::RemainingPopulation),
            other => Err(format!("unknown acceptance rule: {}", other)),
        }
    }
}

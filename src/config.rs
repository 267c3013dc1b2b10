//! Run parameters
//!
//! A run is fully described by its target sample size, its acceptance rule
//! and an optional seed. Everything else is derived from the data.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Result, SamplerError};
use crate::quota::QuotaPlanner;
use crate::sampling::AcceptanceRule;

/// Default target overall sample size
pub const DEFAULT_TARGET_SIZE: u64 = 400_000;

/// Parameters of one planning and sampling run
///
/// # Example
///
/// ```
/// use hitsample::config::SamplerConfig;
///
/// let config = SamplerConfig::new(1_000).with_seed(42);
/// assert!(config.validate().is_ok());
/// assert!(SamplerConfig::new(0).validate().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct SamplerConfig {
    /// Target overall sample size `N`
    pub target_size: u64,
    /// Seed for the random source; `None` draws one from the OS
    pub seed: Option<u64>,
    /// Acceptance probability rule
    pub rule: AcceptanceRule,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            seed: None,
            rule: AcceptanceRule::default(),
        }
    }
}

impl SamplerConfig {
    /// Create a configuration with the given target size
    pub fn new(target_size: u64) -> Self {
        Self {
            target_size,
            ..Self::default()
        }
    }

    /// Fix the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Choose the acceptance rule
    pub fn with_rule(mut self, rule: AcceptanceRule) -> Self {
        self.rule = rule;
        self
    }

    /// Apply values given explicitly, e.g. on the command line, over this
    /// configuration and validate the result
    ///
    /// `None` keeps the current value.
    pub fn with_overrides(
        mut self,
        target_size: Option<u64>,
        seed: Option<u64>,
        rule: Option<AcceptanceRule>,
    ) -> Result<Self> {
        if let Some(target_size) = target_size {
            self.target_size = target_size;
        }
        if let Some(seed) = seed {
            self.seed = Some(seed);
        }
        if let Some(rule) = rule {
            self.rule = rule;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check that the parameters describe a valid run
    pub fn validate(&self) -> Result<()> {
        if self.target_size == 0 {
            return Err(SamplerError::Config {
                message: "target_size must be a positive integer".into(),
            });
        }
        Ok(())
    }

    /// Planner for this configuration
    pub fn planner(&self) -> Result<QuotaPlanner> {
        self.validate()?;
        QuotaPlanner::new(self.target_size)
    }

    /// Random source for the sampling pass
    ///
    /// Seeded configurations always produce the same sequence.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

//! Error types for planning and sampling
//!
//! Every variant is a data-integrity failure. None of them are retried: a run
//! that hits one has produced no valid sample.

use thiserror::Error;

/// Errors raised while reading, planning or sampling a hitlist
#[derive(Error, Debug)]
pub enum SamplerError {
    /// The planning pass saw no records, so no proportional quota exists
    #[error("empty population: the planning pass observed no annotated records")]
    EmptyPopulation,

    /// An input line is not a well-formed `address,asn,prefix` record
    #[error("malformed record at line {line}: {reason}")]
    RecordFormat {
        /// 1-based line number in the input stream
        line: u64,
        /// What was wrong with the line
        reason: String,
    },

    /// The sampling pass met a stratum the planning pass never observed
    #[error(
        "no quota for stratum ({asn}, {prefix}): the sampling pass does not \
         match the planned population"
    )]
    MissingQuota {
        /// ASN of the offending record
        asn: String,
        /// Prefix of the offending record
        prefix: String,
    },

    /// Invalid run parameters
    #[error("invalid configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Underlying read or write failure
    #[error("I/O error: {source}")]
    Io {
        /// I/O error source
        #[from]
        source: std::io::Error,
    },
}

impl SamplerError {
    pub(crate) fn format(line: u64, reason: impl Into<String>) -> Self {
        SamplerError::RecordFormat {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn missing_quota(asn: &str, prefix: &str) -> Self {
        SamplerError::MissingQuota {
            asn: asn.to_owned(),
            prefix: prefix.to_owned(),
        }
    }
}

/// Result type for hitsample operations
pub type Result<T> = std::result::Result<T, SamplerError>;

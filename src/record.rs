//! Annotated hitlist records and their line format
//!
//! Each input line is `address,asn,prefix` with no header. The ASN and the
//! prefix are opaque strings: two records share a stratum exactly when both
//! strings compare equal.
//!
//! A field wrapped in double quotes has the quotes removed. Quoted fields
//! containing commas are not supported; they split like unquoted ones.

use std::collections::HashMap;
use std::io::BufRead;

use xxhash_rust::xxh3::Xxh3Builder;

use crate::error::{Result, SamplerError};

/// Map keyed by ASN or prefix string
///
/// XXH3 with a fixed seed keeps iteration order identical across runs,
/// unlike the randomly keyed std hasher.
pub(crate) type StratumMap<V> = HashMap<String, V, Xxh3Builder>;

pub(crate) fn stratum_map<V>() -> StratumMap<V> {
    HashMap::with_hasher(Xxh3Builder::new())
}

/// Identity of a stratum: the announcing ASN and the covering prefix
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StratumKey {
    /// Announcing ASN
    pub asn: String,
    /// Covering prefix in CIDR notation
    pub prefix: String,
}

impl StratumKey {
    /// Create a key from its two components
    pub fn new(asn: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            asn: asn.into(),
            prefix: prefix.into(),
        }
    }
}

impl core::fmt::Display for StratumKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.asn, self.prefix)
    }
}

/// A hitlist address annotated with its ASN and routing prefix
///
/// # Example
///
/// ```
/// use hitsample::record::AnnotatedRecord;
///
/// let record = AnnotatedRecord::parse("2001:db8::1,64500,2001:db8::/32", 1).unwrap();
/// assert_eq!(record.address, "2001:db8::1");
/// assert_eq!(record.asn, "64500");
/// assert_eq!(record.prefix, "2001:db8::/32");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotatedRecord {
    /// The sampled address
    pub address: String,
    /// Announcing ASN
    pub asn: String,
    /// Covering prefix in CIDR notation
    pub prefix: String,
}

impl AnnotatedRecord {
    /// Create a record from its components without validation
    pub fn new(
        address: impl Into<String>,
        asn: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            asn: asn.into(),
            prefix: prefix.into(),
        }
    }

    /// Parse one `address,asn,prefix` line
    ///
    /// `line` is the 1-based line number reported on failure. A trailing
    /// carriage return is ignored. All three fields must be present and
    /// non-empty; unresolved addresses are expected to be filtered upstream.
    pub fn parse(text: &str, line: u64) -> Result<Self> {
        let text = text.strip_suffix('\r').unwrap_or(text);

        let mut fields = text.split(',').map(unquote);
        let (address, asn, prefix) = match (fields.next(), fields.next(), fields.next()) {
            (Some(address), Some(asn), Some(prefix)) => (address, asn, prefix),
            _ => {
                return Err(SamplerError::format(
                    line,
                    format!("expected 3 fields, found {}", text.split(',').count()),
                ))
            }
        };
        let extra = fields.count();
        if extra > 0 {
            return Err(SamplerError::format(
                line,
                format!("expected 3 fields, found {}", 3 + extra),
            ));
        }

        for (name, value) in [("address", address), ("asn", asn), ("prefix", prefix)] {
            if value.trim().is_empty() {
                return Err(SamplerError::format(line, format!("empty {} field", name)));
            }
        }

        Ok(Self::new(address, asn, prefix))
    }

    /// Owned stratum key of this record
    pub fn stratum(&self) -> StratumKey {
        StratumKey::new(self.asn.as_str(), self.prefix.as_str())
    }
}

fn unquote(field: &str) -> &str {
    if field.len() >= 2 && field.starts_with('"') && field.ends_with('"') {
        &field[1..field.len() - 1]
    } else {
        field
    }
}

/// Iterator over the annotated records of a buffered reader
///
/// Yields one `Result` per line; the first malformed line or I/O failure is
/// returned as an error and the caller is expected to stop there. A line
/// that is not valid UTF-8 is a format error for that line.
///
/// # Example
///
/// ```
/// use hitsample::record::RecordReader;
///
/// let input = "10.0.0.1,AS1,10.0.0.0/24\n10.0.0.2,AS1,10.0.0.0/24\n";
/// let records: Vec<_> = RecordReader::new(input.as_bytes())
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(records.len(), 2);
/// ```
#[derive(Debug)]
pub struct RecordReader<R> {
    reader: R,
    buf: Vec<u8>,
    line: u64,
}

impl<R: BufRead> RecordReader<R> {
    /// Wrap a buffered reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line: 0,
        }
    }

    /// Number of lines consumed so far
    pub fn lines_read(&self) -> u64 {
        self.line
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<AnnotatedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line += 1;
                let bytes = self.buf.strip_suffix(b"\n").unwrap_or(self.buf.as_slice());
                match std::str::from_utf8(bytes) {
                    Ok(text) => Some(AnnotatedRecord::parse(text, self.line)),
                    Err(_) => Some(Err(SamplerError::format(self.line, "invalid UTF-8"))),
                }
            }
            Err(e) => Some(Err(e.into())),
        }
    }
}

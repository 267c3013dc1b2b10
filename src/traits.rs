//! Core traits shared by the sampling pipeline
//!
//! [`RecordSink`] is the seam between the streaming sampler and whatever
//! stores the accepted records.

use std::io::Write;

use crate::error::Result;
use crate::record::AnnotatedRecord;

/// Destination for records accepted by the sampler
///
/// Records arrive in input encounter order. `finish` is called once after the
/// sampling pass completes successfully.
pub trait RecordSink {
    /// Receive one accepted record
    fn accept(&mut self, record: &AnnotatedRecord) -> Result<()>;

    /// Flush any buffered output
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Collects the accepted addresses in memory
impl RecordSink for Vec<String> {
    fn accept(&mut self, record: &AnnotatedRecord) -> Result<()> {
        self.push(record.address.clone());
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn accept(&mut self, record: &AnnotatedRecord) -> Result<()> {
        (**self).accept(record)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

/// Writes one accepted address per line
///
/// # Example
///
/// ```
/// use hitsample::record::AnnotatedRecord;
/// use hitsample::traits::{AddressWriter, RecordSink};
///
/// let mut out = Vec::new();
/// let mut sink = AddressWriter::new(&mut out);
/// sink.accept(&AnnotatedRecord::new("10.0.0.1", "AS1", "10.0.0.0/24")).unwrap();
/// sink.finish().unwrap();
/// drop(sink);
///
/// assert_eq!(out, b"10.0.0.1\n");
/// ```
#[derive(Debug)]
pub struct AddressWriter<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> AddressWriter<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of addresses written
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Unwrap the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for AddressWriter<W> {
    fn accept(&mut self, record: &AnnotatedRecord) -> Result<()> {
        self.writer.write_all(record.address.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

use crate::errors::{KinaseMotifError, Result};
use crate::models::MatchResult;
use csv::{QuoteStyle, Writer, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Tab separated per-sequence hit table.
///
/// The header is an empty cell followed by the kinase names; each row is a
/// sequence identifier followed by its 0/1 counts in header order.
pub struct MotifHitsWriter<W: Write> {
    writer: Writer<W>,
    kinase_names: Vec<String>,
    rows_written: u64,
}

impl MotifHitsWriter<File> {
    pub fn from_path<P: AsRef<Path>>(out_path: P, kinase_names: &[&str]) -> Result<Self> {
        let out_path = out_path.as_ref();
        let file = File::create(out_path).map_err(|e| KinaseMotifError::io_at(out_path, e))?;
        Self::from_writer(file, kinase_names)
    }
}

impl<W: Write> MotifHitsWriter<W> {
    /// Writes the header row right away.
    pub fn from_writer(inner: W, kinase_names: &[&str]) -> Result<Self> {
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Never)
            .from_writer(inner);

        let header = std::iter::once("").chain(kinase_names.iter().copied());
        writer.write_record(header)?;

        Ok(Self {
            writer,
            kinase_names: kinase_names.iter().map(|x| x.to_string()).collect(),
            rows_written: 0,
        })
    }

    /// Sequences without any hit are not written. Returns whether a row was
    /// emitted.
    pub fn write_hits(&mut self, sequence_id: &str, result: &MatchResult) -> Result<bool> {
        if result.is_empty() {
            return Ok(false);
        }
        let counts = self
            .kinase_names
            .iter()
            .map(|k| result.count(k).to_string());
        let record = std::iter::once(sequence_id.to_string()).chain(counts);
        self.writer.write_record(record)?;
        self.rows_written += 1;
        Ok(true)
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| KinaseMotifError::from(e.into_error()))
    }
}

use super::models::{SequenceRecord, SequenceRecordBuilder};
use crate::errors::{KinaseMotifError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const RECORD_MARKER: char = '>';

/// Lazily yields the records of a FASTA stream, one at a time.
///
/// Only the record currently being assembled is held in memory. Lines are
/// trimmed, blank lines are ignored and do not end a record. Anything before
/// the first header, and the body of any header with an empty identifier, is
/// discarded. Bytes that are not valid UTF-8 are replaced rather than
/// failing the read; only real I/O errors come back as `Err`.
pub struct FastaReader<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    current: SequenceRecordBuilder,
    source: Option<PathBuf>,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            current: SequenceRecordBuilder::new(),
            source: None,
            done: false,
        }
    }

    /// Next raw line, without its terminator. `Ok(None)` at end of input.
    fn next_line(&mut self) -> std::io::Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }

    fn take_current(&mut self) -> Option<SequenceRecord> {
        std::mem::take(&mut self.current).build()
    }

    fn wrap_err(&self, e: std::io::Error) -> KinaseMotifError {
        match &self.source {
            Some(path) => KinaseMotifError::io_at(path, e),
            None => e.into(),
        }
    }
}

impl FastaReader<BufReader<File>> {
    /// Opens the file anew, so every call replays the same records.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| KinaseMotifError::io_at(path, e))?;
        let mut out = Self::new(BufReader::new(file));
        out.source = Some(path.to_path_buf());
        Ok(out)
    }
}

impl<'a> FastaReader<&'a [u8]> {
    pub fn from_text(fasta: &'a str) -> Self {
        Self::new(fasta.as_bytes())
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<SequenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let line = match self.next_line() {
                Ok(Some(line)) => line,
                Err(e) => {
                    self.done = true;
                    return Some(Err(self.wrap_err(e)));
                }
                Ok(None) => {
                    self.done = true;
                    return self.take_current().map(Ok);
                }
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match line.strip_prefix(RECORD_MARKER) {
                Some(header) => {
                    let finished = std::mem::replace(
                        &mut self.current,
                        SequenceRecordBuilder::new().with_id(header),
                    );
                    if let Some(record) = finished.build() {
                        return Some(Ok(record));
                    }
                }
                None => self.current.append_sequence(line),
            }
        }
    }
}

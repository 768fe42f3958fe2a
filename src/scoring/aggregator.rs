use crate::errors::{KinaseMotifError, Result};
use crate::models::MatchResult;
use log::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Running per-file counters, fed one match result per sequence.
#[derive(Debug, Clone)]
pub struct FileAggregator {
    file_id: String,
    n_sequences: u64,
    sequences_with_match: u64,
    totals: BTreeMap<String, u64>,
}

impl FileAggregator {
    /// Every kinase of the table gets a total, so all files of a run share
    /// the same columns even when some kinases never match.
    pub fn new(file_id: &str, kinase_names: &[&str]) -> Self {
        Self {
            file_id: file_id.to_string(),
            n_sequences: 0,
            sequences_with_match: 0,
            totals: kinase_names.iter().map(|k| (k.to_string(), 0)).collect(),
        }
    }

    pub fn record(&mut self, result: &MatchResult) {
        self.n_sequences += 1;
        if result.is_empty() {
            return;
        }
        self.sequences_with_match += 1;
        for (kinase, count) in result.iter() {
            match self.totals.get_mut(kinase) {
                Some(total) => *total += count as u64,
                None => warn!(
                    "Kinase {} is not part of the table used for {}, ignoring",
                    kinase, self.file_id
                ),
            }
        }
    }

    pub fn finalize(self) -> FileSummary {
        let n = self.n_sequences;
        let percentages = self
            .totals
            .iter()
            .map(|(k, v)| {
                let pct = if n == 0 {
                    0.0
                } else {
                    100.0 * (*v as f64) / (n as f64)
                };
                (k.clone(), pct)
            })
            .collect();

        FileSummary {
            file_id: self.file_id,
            n_sequences: self.n_sequences,
            sequences_with_match: self.sequences_with_match,
            totals: self.totals,
            percentages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSummary {
    pub file_id: String,
    pub n_sequences: u64,
    pub sequences_with_match: u64,
    pub totals: BTreeMap<String, u64>,
    /// Share of the file's sequences carrying each kinase motif, 0 to 100.
    /// All zero for a file without sequences.
    pub percentages: BTreeMap<String, f64>,
}

impl FileSummary {
    pub fn percentage(&self, kinase: &str) -> f64 {
        self.percentages.get(kinase).copied().unwrap_or(0.0)
    }

    pub fn total(&self, kinase: &str) -> u64 {
        self.totals.get(kinase).copied().unwrap_or(0)
    }

    pub fn kinase_names(&self) -> Vec<&str> {
        self.totals.keys().map(|x| x.as_str()).collect()
    }
}

/// File summaries of a whole run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub files: Vec<FileSummary>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, summary: FileSummary) {
        self.files.push(summary);
    }

    pub fn kinase_names(&self) -> Vec<&str> {
        self.files
            .first()
            .map(|x| x.kinase_names())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn write_json<P: AsRef<Path>>(&self, out_path: P) -> Result<()> {
        let out_path = out_path.as_ref();
        let file = std::fs::File::create(out_path)
            .map_err(|e| KinaseMotifError::io_at(out_path, e))?;
        let mut writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer
            .flush()
            .map_err(|e| KinaseMotifError::io_at(out_path, e))?;
        info!("Written summary file {}", out_path.display());
        Ok(())
    }
}

pub mod chart;

use crate::errors::{KinaseMotifError, Result};
use crate::motifs::matcher::scan_record;
use crate::motifs::table::MotifTable;
use crate::protein::fasta::FastaReader;
use crate::scoring::aggregator::{FileAggregator, FileSummary, RunSummary};
use crate::scoring::results::MotifHitsWriter;
use chart::SummaryChart;
use indicatif::{ProgressBar, ProgressStyle};
use log::*;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const DEFAULT_SUFFIX: &str = "_kinase_motifs";
pub const DEFAULT_CHART_NAME: &str = "motif_counts.svg";

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// FASTA files, processed in this order.
    pub inputs: Vec<PathBuf>,
    /// Appended to the input file stem to name its table.
    pub out_suffix: String,
    /// Where the chart goes; next to the first input when unset.
    pub chart_path: Option<PathBuf>,
    /// Show the chart in the terminal instead of writing it.
    pub screen_gfx: bool,
    pub summary_json: Option<PathBuf>,
}

impl ScanConfig {
    pub fn new(inputs: Vec<PathBuf>) -> Self {
        Self {
            inputs,
            out_suffix: DEFAULT_SUFFIX.to_string(),
            chart_path: None,
            screen_gfx: false,
            summary_json: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(KinaseMotifError::Configuration(
                "at least one FASTA file is required".to_string(),
            ));
        }
        if self.out_suffix.contains(std::path::MAIN_SEPARATOR) || self.out_suffix.contains('/') {
            return Err(KinaseMotifError::Configuration(format!(
                "output suffix {:?} must not contain a path separator",
                self.out_suffix
            )));
        }
        if self.screen_gfx && !cfg!(feature = "tui") {
            return Err(KinaseMotifError::Configuration(
                "on-screen graphics need the `tui` feature".to_string(),
            ));
        }
        Ok(())
    }

    /// `dir/name.fasta` -> `dir/name{suffix}.tsv`
    pub fn table_path_for(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|x| x.to_string_lossy().into_owned())
            .unwrap_or_default();
        input.with_file_name(format!("{}{}.tsv", stem, self.out_suffix))
    }

    pub fn resolved_chart_path(&self) -> PathBuf {
        if let Some(path) = &self.chart_path {
            return path.clone();
        }
        self.inputs
            .first()
            .and_then(|x| x.parent())
            .unwrap_or_else(|| Path::new(""))
            .join(DEFAULT_CHART_NAME)
    }
}

/// Name a file goes by in the summary and chart legend.
pub fn file_id_for(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|name| name.to_str())
        .unwrap_or("unknown")
        .to_string()
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub summary: RunSummary,
    pub failures: Vec<(PathBuf, KinaseMotifError)>,
}

impl ScanOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

fn sequence_spinner(file_id: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}: {pos} sequences ({per_sec})") {
        pb.set_style(style);
    }
    pb.set_message(file_id.to_string());
    pb
}

/// Drives the scan: reader -> matcher -> aggregator + table, file by file.
pub struct Reporter<'a> {
    table: &'a MotifTable,
    config: &'a ScanConfig,
}

impl<'a> Reporter<'a> {
    pub fn new(table: &'a MotifTable, config: &'a ScanConfig) -> Self {
        Self { table, config }
    }

    /// Streams one FASTA source into a hit table and returns its summary.
    pub fn scan_stream<R: BufRead, W: Write>(
        &self,
        file_id: &str,
        reader: FastaReader<R>,
        writer: &mut MotifHitsWriter<W>,
    ) -> Result<FileSummary> {
        self.scan_stream_with(file_id, reader, writer, sequence_spinner(file_id))
    }

    fn scan_stream_with<R: BufRead, W: Write>(
        &self,
        file_id: &str,
        reader: FastaReader<R>,
        writer: &mut MotifHitsWriter<W>,
        pb: ProgressBar,
    ) -> Result<FileSummary> {
        let kinases = self.table.all_kinase_names();
        let mut aggregator = FileAggregator::new(file_id, &kinases);

        let scanned = (|| -> Result<()> {
            for record in reader {
                let record = record?;
                let hits = scan_record(self.table, &record);
                aggregator.record(&hits);
                writer.write_hits(&record.id, &hits)?;
                pb.inc(1);
            }
            writer.flush()
        })();
        // Cleared on failure too, the next file gets a fresh line.
        pb.finish_and_clear();
        scanned?;

        Ok(aggregator.finalize())
    }

    pub fn process_file(&self, input: &Path) -> Result<FileSummary> {
        let start = Instant::now();
        let file_id = file_id_for(input);
        let out_path = self.config.table_path_for(input);

        let reader = FastaReader::from_path(input)?;
        let mut writer = MotifHitsWriter::from_path(&out_path, &self.table.all_kinase_names())?;
        let summary = self
            .scan_stream(&file_id, reader, &mut writer)
            .map_err(|e| match e {
                // Writer failures carry no path of their own.
                KinaseMotifError::Io { path: None, source } => {
                    KinaseMotifError::io_at(&out_path, source)
                }
                other => other,
            })?;

        info!(
            "Processed {} sequences in {}: found {} kinase matches",
            summary.n_sequences,
            input.display(),
            summary.sequences_with_match
        );
        info!(
            "Written text file {} with {} rows",
            out_path.display(),
            writer.rows_written()
        );
        debug!("Scanning {} took {:?}", input.display(), start.elapsed());
        Ok(summary)
    }

    /// Processes every input; a failing file is logged and skipped.
    pub fn scan_all(&self) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        for input in &self.config.inputs {
            match self.process_file(input) {
                Ok(summary) => outcome.summary.push(summary),
                Err(e) => {
                    error!("Skipping {}: {}", input.display(), e);
                    outcome.failures.push((input.clone(), e));
                }
            }
        }
        outcome
    }

    pub fn render(&self, summary: &RunSummary) -> Result<()> {
        if summary.is_empty() {
            warn!("No input file could be processed, no chart to draw");
            return Ok(());
        }
        if let Some(json_path) = &self.config.summary_json {
            summary.write_json(json_path)?;
        }
        if self.config.screen_gfx {
            return self.show_on_screen(summary);
        }
        SummaryChart::new(summary).write_to_file(self.config.resolved_chart_path())
    }

    #[cfg(feature = "tui")]
    fn show_on_screen(&self, summary: &RunSummary) -> Result<()> {
        crate::tui::show_summary(summary)?;
        info!("Done");
        Ok(())
    }

    #[cfg(not(feature = "tui"))]
    fn show_on_screen(&self, _summary: &RunSummary) -> Result<()> {
        Err(KinaseMotifError::Configuration(
            "on-screen graphics need the `tui` feature".to_string(),
        ))
    }

    pub fn run(&self) -> Result<ScanOutcome> {
        self.config.validate()?;
        let outcome = self.scan_all();
        self.render(&outcome.summary)?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SCENARIO: &str = ">seq1\nGGGRRSTGGG\n>seq2\nAAAAAAAAAA\n";

    fn write_fasta(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_paths() {
        let mut config = ScanConfig::new(vec![PathBuf::from("data/run1/prots.fasta")]);
        assert_eq!(
            config.table_path_for(Path::new("data/run1/prots.fasta")),
            PathBuf::from("data/run1/prots_kinase_motifs.tsv")
        );
        assert_eq!(
            config.table_path_for(Path::new("noext")),
            PathBuf::from("noext_kinase_motifs.tsv")
        );
        assert_eq!(
            config.resolved_chart_path(),
            PathBuf::from("data/run1/motif_counts.svg")
        );
        config.chart_path = Some(PathBuf::from("out.svg"));
        assert_eq!(config.resolved_chart_path(), PathBuf::from("out.svg"));
        assert_eq!(file_id_for(Path::new("data/run1/prots.fasta")), "prots");
    }

    #[test]
    fn test_validate() {
        assert!(ScanConfig::new(vec![]).validate().is_err());
        let mut config = ScanConfig::new(vec![PathBuf::from("a.fasta")]);
        assert!(config.validate().is_ok());
        config.out_suffix = "../escape".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scan_stream_scenario() {
        let table = MotifTable::phosida().unwrap();
        let config = ScanConfig::new(vec![PathBuf::from("mem.fasta")]);
        let reporter = Reporter::new(&table, &config);

        let kinases = table.all_kinase_names();
        let mut writer = MotifHitsWriter::from_writer(Vec::new(), &kinases).unwrap();
        let summary = reporter
            .scan_stream("mem", FastaReader::from_text(SCENARIO), &mut writer)
            .unwrap();

        assert_eq!(summary.n_sequences, 2);
        assert_eq!(summary.sequences_with_match, 1);
        assert_eq!(summary.total("PKA"), 1);
        assert_eq!(summary.percentage("PKA"), 50.0);

        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!("\t{}", kinases.join("\t")));

        let row: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(row[0], "seq1");
        let pka_col = kinases.iter().position(|k| *k == "PKA").unwrap() + 1;
        assert_eq!(row[pka_col], "1");
        assert!(!out.contains("seq2"));
    }

    /// Yields its bytes, then fails like a disk read error.
    struct BrokenSource {
        data: &'static [u8],
    }

    impl std::io::Read for BrokenSource {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.data.is_empty() {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "device gone"));
            }
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_spinner_cleared_on_read_error() {
        let table = MotifTable::phosida().unwrap();
        let config = ScanConfig::new(vec![PathBuf::from("broken.fasta")]);
        let reporter = Reporter::new(&table, &config);

        let reader = FastaReader::new(std::io::BufReader::new(BrokenSource {
            data: b">seq1\nGGGRRSTGGG\n>seq2\nAAAA",
        }));
        let mut writer =
            MotifHitsWriter::from_writer(Vec::new(), &table.all_kinase_names()).unwrap();
        let pb = ProgressBar::hidden();

        let res = reporter.scan_stream_with("broken", reader, &mut writer, pb.clone());
        assert!(matches!(res, Err(KinaseMotifError::Io { .. })));
        assert!(pb.is_finished());
    }

    #[test]
    fn test_process_file_without_records() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fasta(dir.path(), "empty.fasta", "\n\nno header here\n");
        let table = MotifTable::phosida().unwrap();
        let config = ScanConfig::new(vec![input.clone()]);

        let summary = Reporter::new(&table, &config).process_file(&input).unwrap();
        assert_eq!(summary.n_sequences, 0);
        assert!(summary.percentages.values().all(|x| *x == 0.0));

        let table_text = fs::read_to_string(config.table_path_for(&input)).unwrap();
        assert_eq!(table_text.lines().count(), 1);
        assert!(table_text.starts_with("\tABL\t"));
    }

    #[test]
    fn test_run_isolates_failing_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_fasta(dir.path(), "first.fasta", SCENARIO);
        let missing = dir.path().join("missing.fasta");
        let last = write_fasta(dir.path(), "last.fa", ">x\nAAAAKRAASEEE\n");

        let table = MotifTable::phosida().unwrap();
        let mut config = ScanConfig::new(vec![first.clone(), missing.clone(), last.clone()]);
        config.summary_json = Some(dir.path().join("summary.json"));

        let outcome = Reporter::new(&table, &config).run().unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, missing);

        let ids: Vec<&str> = outcome
            .summary
            .files
            .iter()
            .map(|x| x.file_id.as_str())
            .collect();
        assert_eq!(ids, vec!["first", "last"]);
        assert_eq!(outcome.summary.files[1].n_sequences, 1);

        // Same columns for every file.
        assert_eq!(
            outcome.summary.files[0].kinase_names(),
            outcome.summary.files[1].kinase_names()
        );

        assert!(config.table_path_for(&first).exists());
        assert!(config.table_path_for(&last).exists());
        assert!(dir.path().join("motif_counts.svg").exists());
        assert!(dir.path().join("summary.json").exists());
    }
}

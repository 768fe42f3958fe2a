use clap::Parser;
use kinmotif::errors::KinaseMotifError;
use kinmotif::motifs::table::MotifTable;
use kinmotif::report::{Reporter, ScanConfig, DEFAULT_SUFFIX};
use log::{error, info};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "kinmotif")]
#[command(about = "Identify protein kinase motifs, as collected at the PHOSIDA database, in FASTA files")]
#[command(version)]
struct Cli {
    /// One or more FASTA files containing named protein sequences
    #[arg(value_name = "FASTA_FILES", required_unless_present = "list_motifs")]
    inputs: Vec<PathBuf>,

    /// Suffix for the tab-separated table written next to each input
    #[arg(short = 't', long = "suffix", default_value = DEFAULT_SUFFIX)]
    out_suffix: String,

    /// Output SVG chart (default: motif_counts.svg next to the first input)
    #[arg(short = 'o', long = "out-chart")]
    out_chart: Option<PathBuf>,

    /// Show the chart on-screen instead of writing it
    #[arg(short = 'g', long = "gfx", default_value = "false")]
    gfx: bool,

    /// Also write the per-file summary as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// JSON motif table to use instead of the built-in PHOSIDA motifs
    #[arg(short, long)]
    motifs: Option<PathBuf>,

    /// Print the active motif table and exit
    #[arg(long, default_value = "false")]
    list_motifs: bool,
}

fn main() -> std::result::Result<(), KinaseMotifError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let table = match &cli.motifs {
        Some(path) => MotifTable::from_json_file(path)?,
        None => MotifTable::phosida()?,
    };

    if cli.list_motifs {
        for entry in table.entries() {
            for rule in &entry.rules {
                println!("{}\t{}\t{}", entry.name, rule.pattern, rule.anchor_offset);
            }
        }
        return Ok(());
    }

    let config = ScanConfig {
        inputs: cli.inputs,
        out_suffix: cli.out_suffix,
        chart_path: cli.out_chart,
        screen_gfx: cli.gfx,
        summary_json: cli.summary_json,
    };

    let start = Instant::now();
    let outcome = Reporter::new(&table, &config).run()?;
    info!(
        "Scanned {} of {} files in {:?}",
        outcome.summary.len(),
        config.inputs.len(),
        start.elapsed()
    );

    if !outcome.is_success() {
        for (path, e) in &outcome.failures {
            error!("{}: {}", path.display(), e);
        }
        std::process::exit(1);
    }
    Ok(())
}

use clap::Parser;
use kinmotif::disorder::client::{fetch_all, read_seqids, D2p2Client, D2P2_ENDPOINT};
use kinmotif::errors::KinaseMotifError;
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kinmotif-disorder")]
#[command(about = "Fetch consensus disorder ranges from the D2P2 database for a list of sequence ids")]
#[command(version)]
struct Cli {
    /// File with one sequence id per line
    #[arg(long)]
    seqid_file: PathBuf,

    /// Directory receiving one `<seqid>_d2p2_result.out` file per id
    #[arg(long)]
    outdir: PathBuf,

    /// D2P2 seqid endpoint
    #[arg(long, default_value = D2P2_ENDPOINT)]
    endpoint: String,
}

fn main() -> std::result::Result<(), KinaseMotifError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let seqids = read_seqids(&cli.seqid_file)?;
    info!("Fetching {} sequence ids from {}", seqids.len(), cli.endpoint);

    let client = D2p2Client::new(&cli.endpoint)?;
    let outcome = fetch_all(&client, &seqids, &cli.outdir)?;

    info!(
        "Written {} files, {} ids not annotated, {} failed",
        outcome.written.len(),
        outcome.not_found.len(),
        outcome.failed.len()
    );
    if !outcome.failed.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

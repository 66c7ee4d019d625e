use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Local;
use clap::Parser;
use tracing::{debug, info, warn};

use mega_tournament::{
    default_table_file_name, run_trials_with, ChampionWinRates, ExperimentConfig, TrialReader,
    TrialWriter, CHAMPION_WIN_PROBABILITY, CHUNK_SIZE, ITERATIONS_PER_PLAYER_COUNT, MAX_PLAYERS,
    MIN_PLAYERS, REGULAR_PLAYER_WIN_PROBABILITY,
};

/// Estimates how often the champion wins a tournament as the field grows.
#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// previously simulated trial table to tally instead of simulating
    results: Option<PathBuf>,

    /// champion's chance of winning each of its matches
    #[clap(long, default_value_t = CHAMPION_WIN_PROBABILITY)]
    champion_prob: f64,

    /// lower-indexed player's chance of winning a match between regular players
    #[clap(long, default_value_t = REGULAR_PLAYER_WIN_PROBABILITY)]
    regular_prob: f64,

    #[clap(long, default_value_t = MIN_PLAYERS)]
    min_players: usize,

    #[clap(long, default_value_t = MAX_PLAYERS)]
    max_players: usize,

    /// tournaments per field size
    #[clap(long, default_value_t = ITERATIONS_PER_PLAYER_COUNT)]
    iterations: usize,

    #[clap(long, default_value_t = CHUNK_SIZE)]
    chunk_size: usize,

    /// worker threads (defaults to one per core)
    #[clap(long)]
    threads: Option<usize>,

    /// seed for reproducible sweeps
    #[clap(long)]
    seed: Option<u64>,

    /// where to write the simulated trial table
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// confidence level of the reported intervals
    #[clap(long, default_value_t = 0.95)]
    confidence: f64,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.results.is_some() && self.output.is_some() {
            bail!("--output cannot be combined with an existing results table");
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            bail!("--confidence must lie strictly between 0 and 1");
        }
        self.config().validate()?;
        Ok(())
    }

    fn config(&self) -> ExperimentConfig {
        ExperimentConfig {
            champion_win_probability: self.champion_prob,
            regular_win_probability: self.regular_prob,
            min_players: self.min_players,
            max_players: self.max_players,
            iterations_per_player_count: self.iterations,
            chunk_size: self.chunk_size,
            seed: self.seed,
            threads: self.threads,
        }
    }
}

fn main() -> anyhow::Result<()> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let rates = tally(&args)?;
    if !rates.is_complete() {
        warn!(
            "table does not hold exactly {} trials for every field size; rates use the trials found",
            args.iterations
        );
    }

    for rate in rates.rates() {
        let (low, high) = rate.confidence_interval(args.confidence)?;
        println!(" {:4}  {}  [{:.6}, {:.6}]", rate.total_players, rate.probability, low, high);
    }

    Ok(())
}

/// Tally an existing table when one is given, otherwise simulate and save a new one.
fn tally(args: &Args) -> anyhow::Result<ChampionWinRates> {
    let config = args.config();
    let mut rates = ChampionWinRates::new(&config)?;

    match &args.results {
        Some(path) => {
            info!("tallying trials from {}", path.display());
            let reader = TrialReader::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            for record in reader {
                rates.record(&record?)?;
            }
        }
        None => {
            let path = args
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(default_table_file_name(Local::now().naive_local())));
            let mut writer = TrialWriter::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            run_trials_with(&config, |records| {
                writer.append(records)?;
                records.iter().try_for_each(|record| rates.record(record))
            })?;
            writer.finish()?;
            info!("trial table saved to {}", path.display());
        }
    }

    Ok(rates)
}

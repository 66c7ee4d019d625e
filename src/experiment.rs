//! Champion win-rate sweep.
//!
//! Runs many independent tournaments for every field size in a range and
//! estimates how often the champion finishes as the unique winner.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, info};

use crate::constants::{
    CHAMPION, CHAMPION_WIN_PROBABILITY, CHUNK_SIZE, ITERATIONS_PER_PLAYER_COUNT, MAX_PLAYERS,
    MIN_PLAYERS, REGULAR_PLAYER_WIN_PROBABILITY,
};
use crate::error::{Result, TournamentError};
use crate::random::RngSource;
use crate::tournament::run_tournament;

/// Chunks run in parallel before their records are handed to the sink.
const CHUNKS_PER_THREAD_PER_BATCH: usize = 4;

/// Parameters of a sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct ExperimentConfig {
    pub champion_win_probability: f64,
    pub regular_win_probability: f64,
    pub min_players: usize,
    pub max_players: usize,
    pub iterations_per_player_count: usize,
    pub chunk_size: usize,
    /// Base seed; drawn from entropy and logged when absent
    pub seed: Option<u64>,
    /// Worker threads; rayon's global pool when absent
    pub threads: Option<usize>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            champion_win_probability: CHAMPION_WIN_PROBABILITY,
            regular_win_probability: REGULAR_PLAYER_WIN_PROBABILITY,
            min_players: MIN_PLAYERS,
            max_players: MAX_PLAYERS,
            iterations_per_player_count: ITERATIONS_PER_PLAYER_COUNT,
            chunk_size: CHUNK_SIZE,
            seed: None,
            threads: None,
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(TournamentError::InvalidConfig(reason));

        if !self.champion_win_probability.is_finite() || !self.regular_win_probability.is_finite() {
            return invalid("win probabilities must be finite".to_string());
        }
        if self.min_players == 0 {
            return invalid("min_players must be at least 1".to_string());
        }
        if self.min_players > self.max_players {
            return invalid(format!(
                "min_players ({}) exceeds max_players ({})",
                self.min_players, self.max_players
            ));
        }
        if self.iterations_per_player_count == 0 {
            return invalid("iterations_per_player_count must be positive".to_string());
        }
        if self.chunk_size == 0 {
            return invalid("chunk_size must be positive".to_string());
        }
        if self.threads == Some(0) {
            return invalid("threads must be positive".to_string());
        }
        if self.total_trials().is_none() {
            return invalid("total number of trials overflows".to_string());
        }
        Ok(())
    }

    /// Number of distinct field sizes swept.
    pub fn player_counts(&self) -> usize {
        if self.min_players > self.max_players {
            0
        } else {
            (self.max_players - self.min_players).saturating_add(1)
        }
    }

    pub fn total_trials(&self) -> Option<usize> {
        self.player_counts()
            .checked_mul(self.iterations_per_player_count)
    }

    /// Field size and iteration number of the `index`th trial.
    fn task(&self, index: usize) -> (usize, usize) {
        (
            self.min_players + index / self.iterations_per_player_count,
            index % self.iterations_per_player_count,
        )
    }
}

/// One simulated tournament of a sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrialRecord {
    pub total_players: usize,
    pub iteration: usize,
    /// Winner index, or `-1` without a unique winner
    pub best_player: i64,
}

/// Run every trial of the sweep, handing records to `sink` in trial order.
///
/// Trials are grouped into chunks of `chunk_size`; each chunk draws from its
/// own ChaCha stream derived from the base seed, so a seeded sweep yields the
/// same records regardless of how many threads run it.
pub fn run_trials_with<F>(config: &ExperimentConfig, mut sink: F) -> Result<()>
where
    F: FnMut(&[TrialRecord]) -> Result<()>,
{
    config.validate()?;
    let total_trials = config.total_trials().unwrap_or_default();
    let total_chunks = total_trials.div_ceil(config.chunk_size);
    let seed = config
        .seed
        .unwrap_or_else(|| ChaCha8Rng::from_entropy().gen::<u64>());

    info!(
        "simulating {} tournaments for {}..={} players in {} chunks (seed {})",
        total_trials, config.min_players, config.max_players, total_chunks, seed
    );

    let pool = match config.threads {
        Some(threads) => Some(rayon::ThreadPoolBuilder::new().num_threads(threads).build()?),
        None => None,
    };
    let workers = pool
        .as_ref()
        .map_or_else(rayon::current_num_threads, |pool| pool.current_num_threads());
    let batch_chunks = workers * CHUNKS_PER_THREAD_PER_BATCH;

    let mut first_chunk = 0;
    while first_chunk < total_chunks {
        let last_chunk = usize::min(first_chunk + batch_chunks, total_chunks);
        let run_batch = || {
            (first_chunk..last_chunk)
                .into_par_iter()
                .map(|chunk| run_chunk(config, seed, chunk, total_trials))
                .collect::<Vec<_>>()
        };
        let batch = match &pool {
            Some(pool) => pool.install(run_batch),
            None => run_batch(),
        };
        for records in &batch {
            sink(records)?;
        }
        debug!("completed chunks {}..{} of {}", first_chunk, last_chunk, total_chunks);
        first_chunk = last_chunk;
    }

    Ok(())
}

/// Run every trial of the sweep and collect the records in trial order.
pub fn run_trials(config: &ExperimentConfig) -> Result<Vec<TrialRecord>> {
    config.validate()?;
    let mut records = Vec::with_capacity(config.total_trials().unwrap_or_default());
    run_trials_with(config, |chunk| {
        records.extend_from_slice(chunk);
        Ok(())
    })?;
    Ok(records)
}

fn run_chunk(config: &ExperimentConfig, seed: u64, chunk: usize, total_trials: usize) -> Vec<TrialRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(chunk as u64);
    let mut source = RngSource::new(rng);

    let start = chunk * config.chunk_size;
    let end = usize::min(start + config.chunk_size, total_trials);
    (start..end)
        .map(|index| {
            let (total_players, iteration) = config.task(index);
            let best_player = run_tournament(
                total_players,
                config.champion_win_probability,
                config.regular_win_probability,
                &mut source,
            );
            TrialRecord {
                total_players,
                iteration,
                best_player,
            }
        })
        .collect()
}

/// Champion's estimated chance of winning a tournament of a given size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WinRate {
    pub total_players: usize,
    pub champion_wins: usize,
    pub trials: usize,
    pub probability: f64,
}

impl WinRate {
    /// Two-sided Wald interval for the win probability at confidence `level`, clamped to `[0, 1]`.
    pub fn confidence_interval(&self, level: f64) -> Result<(f64, f64)> {
        if !(level > 0.0 && level < 1.0) {
            return Err(TournamentError::InvalidConfig(format!(
                "confidence level must lie strictly between 0 and 1, got {}",
                level
            )));
        }
        if self.trials == 0 {
            return Ok((0.0, 1.0));
        }
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| TournamentError::InvalidConfig(e.to_string()))?;
        let z = normal.inverse_cdf(1.0 - (1.0 - level) / 2.0);
        let p = self.probability;
        let margin = z * (p * (1.0 - p) / self.trials as f64).sqrt();
        Ok(((p - margin).max(0.0), (p + margin).min(1.0)))
    }
}

/// Running tally of champion wins per field size.
/// Running tally of champion wins per field size.
///
/// Each field size accepts iterations `0..iterations_per_player_count`, at most
/// once apiece; rates are taken over the trials actually recorded.
#[derive(Clone, Debug)]
pub struct ChampionWinRates {
    min_players: usize,
    max_players: usize,
    iterations_per_player_count: usize,
    champion_wins: Vec<usize>,
    trials: Vec<usize>,
}

impl ChampionWinRates {
    pub fn new(config: &ExperimentConfig) -> Result<Self> {
        config.validate()?;
        let player_counts = config.player_counts();
        Ok(ChampionWinRates {
            min_players: config.min_players,
            max_players: config.max_players,
            iterations_per_player_count: config.iterations_per_player_count,
            champion_wins: vec![0; player_counts],
            trials: vec![0; player_counts],
        })
    }

    /// Tally a complete set of records.
    pub fn tally<'a, I>(config: &ExperimentConfig, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a TrialRecord>,
    {
        let mut rates = ChampionWinRates::new(config)?;
        for record in records {
            rates.record(record)?;
        }
        Ok(rates)
    }

    pub fn record(&mut self, record: &TrialRecord) -> Result<()> {
        if record.total_players < self.min_players || record.total_players > self.max_players {
            return Err(TournamentError::UnexpectedPlayerCount {
                total_players: record.total_players,
                min_players: self.min_players,
                max_players: self.max_players,
            });
        }
        if record.iteration >= self.iterations_per_player_count {
            return Err(TournamentError::UnexpectedIteration {
                total_players: record.total_players,
                iteration: record.iteration,
                iterations: self.iterations_per_player_count,
            });
        }

        let offset = record.total_players - self.min_players;
        if self.trials[offset] == self.iterations_per_player_count {
            return Err(TournamentError::TooManyTrials {
                total_players: record.total_players,
                iterations: self.iterations_per_player_count,
            });
        }
        self.trials[offset] += 1;
        if record.best_player == CHAMPION as i64 {
            self.champion_wins[offset] += 1;
        }
        Ok(())
    }

    /// Win rates in increasing order of field size; a size with no trials reports zero.
    pub fn rates(&self) -> Vec<WinRate> {
        self.champion_wins
            .iter()
            .zip(&self.trials)
            .enumerate()
            .map(|(offset, (&champion_wins, &trials))| WinRate {
                total_players: self.min_players + offset,
                champion_wins,
                trials,
                probability: if trials == 0 {
                    0.0
                } else {
                    champion_wins as f64 / trials as f64
                },
            })
            .collect()
    }

    /// True when every field size holds exactly the configured number of trials.
    pub fn is_complete(&self) -> bool {
        self.trials
            .iter()
            .all(|&trials| trials == self.iterations_per_player_count)
    }
}

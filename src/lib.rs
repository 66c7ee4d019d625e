//! Mega Tournament - champion-versus-field tournament simulation.
//!
//! Every player meets every other player once; player 0, the champion, wins its
//! matches with its own probability. This library finds the unique winner of a
//! simulated tournament and sweeps field sizes to estimate how often the
//! champion comes out on top. Python bindings are available behind the
//! `python` feature.

pub mod constants;
pub mod error;
pub mod experiment;
#[cfg(feature = "python")]
mod python;
pub mod random;
pub mod results;
pub mod tournament;

pub use constants::{
    total_matches, CHAMPION, CHAMPION_WIN_PROBABILITY, CHUNK_SIZE, ITERATIONS_PER_PLAYER_COUNT,
    MAX_PLAYERS, MIN_PLAYERS, NO_WINNER, REGULAR_PLAYER_WIN_PROBABILITY,
};
pub use error::{Result, TournamentError};
pub use experiment::{
    run_trials, run_trials_with, ChampionWinRates, ExperimentConfig, TrialRecord, WinRate,
};
pub use random::{with_thread_rng, RandomSource, RngSource, ScriptedDraws};
pub use results::{default_table_file_name, read_trials, write_trials, TrialReader, TrialWriter};
pub use tournament::{run_tournament, simulate, Outcome, Standings};

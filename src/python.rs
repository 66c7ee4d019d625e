//! Python bindings. Argument count and type checking is left to PyO3.

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::constants::{
    CHAMPION_WIN_PROBABILITY, CHUNK_SIZE, ITERATIONS_PER_PLAYER_COUNT, MAX_PLAYERS, MIN_PLAYERS,
    NO_WINNER, REGULAR_PLAYER_WIN_PROBABILITY,
};
use crate::error::TournamentError;
use crate::experiment::{run_trials_with, ChampionWinRates, ExperimentConfig};
use crate::random::with_thread_rng;
use crate::tournament;

impl From<TournamentError> for PyErr {
    fn from(err: TournamentError) -> PyErr {
        match err {
            TournamentError::Io(_) => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Simulate one tournament with this thread's generator.
///
/// Returns the winner's index, or -1 without a unique winner.
#[pyfunction]
#[pyo3(signature = (total_players, champion_win_probability, regular_player_win_probability))]
fn run_tournament(
    total_players: usize,
    champion_win_probability: f64,
    regular_player_win_probability: f64,
) -> i64 {
    with_thread_rng(|source| {
        tournament::run_tournament(
            total_players,
            champion_win_probability,
            regular_player_win_probability,
            source,
        )
    })
}

/// Sweep field sizes and return `(total_players, champion_win_probability)` pairs.
#[pyfunction]
#[pyo3(signature = (
    champion_win_probability = CHAMPION_WIN_PROBABILITY,
    regular_player_win_probability = REGULAR_PLAYER_WIN_PROBABILITY,
    min_players = MIN_PLAYERS,
    max_players = MAX_PLAYERS,
    iterations = ITERATIONS_PER_PLAYER_COUNT,
    seed = None,
))]
fn champion_win_rates(
    py: Python<'_>,
    champion_win_probability: f64,
    regular_player_win_probability: f64,
    min_players: usize,
    max_players: usize,
    iterations: usize,
    seed: Option<u64>,
) -> PyResult<Vec<(usize, f64)>> {
    let config = ExperimentConfig {
        champion_win_probability,
        regular_win_probability: regular_player_win_probability,
        min_players,
        max_players,
        iterations_per_player_count: iterations,
        seed,
        ..ExperimentConfig::default()
    };
    let rates = py.allow_threads(|| {
        let mut rates = ChampionWinRates::new(&config)?;
        run_trials_with(&config, |records| records.iter().try_for_each(|r| rates.record(r)))?;
        Ok::<_, TournamentError>(rates)
    })?;

    Ok(rates
        .rates()
        .into_iter()
        .map(|rate| (rate.total_players, rate.probability))
        .collect())
}

/// Python module definition
#[pymodule]
fn mega_tournament(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(run_tournament, m)?)?;
    m.add_function(wrap_pyfunction!(champion_win_rates, m)?)?;

    // Constants
    m.add("CHAMPION_WIN_PROBABILITY", CHAMPION_WIN_PROBABILITY)?;
    m.add("REGULAR_PLAYER_WIN_PROBABILITY", REGULAR_PLAYER_WIN_PROBABILITY)?;
    m.add("ITERATIONS_PER_PLAYER_COUNT", ITERATIONS_PER_PLAYER_COUNT)?;
    m.add("MIN_PLAYERS", MIN_PLAYERS)?;
    m.add("MAX_PLAYERS", MAX_PLAYERS)?;
    m.add("CHUNK_SIZE", CHUNK_SIZE)?;
    m.add("NO_WINNER", NO_WINNER)?;

    Ok(())
}

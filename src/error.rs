use std::io;

/// Errors raised outside the simulator itself.
///
/// A single tournament never fails; these cover experiment configuration,
/// result tables and scripted draws.
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("invalid experiment config: {0}")]
    InvalidConfig(String),

    #[error("trial for {total_players} players is outside the range {min_players}..={max_players}")]
    UnexpectedPlayerCount {
        total_players: usize,
        min_players: usize,
        max_players: usize,
    },

    #[error("trial {iteration} for {total_players} players is outside the configured {iterations} iterations")]
    UnexpectedIteration {
        total_players: usize,
        iteration: usize,
        iterations: usize,
    },

    #[error("more than {iterations} trials recorded for {total_players} players")]
    TooManyTrials { total_players: usize, iterations: usize },

    #[error("scripted draws must contain at least one value")]
    EmptyScript,

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, TournamentError>;

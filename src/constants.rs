/// Per-match win probability of the champion (player 0)
pub const CHAMPION_WIN_PROBABILITY: f64 = 0.75;

/// Probability of the lower-indexed player winning a match between two regular players
pub const REGULAR_PLAYER_WIN_PROBABILITY: f64 = 0.5;

/// Tournaments simulated for each field size in a sweep
pub const ITERATIONS_PER_PLAYER_COUNT: usize = 1_000_000;

/// Smallest field size in a sweep
pub const MIN_PLAYERS: usize = 2;

/// Largest field size in a sweep
pub const MAX_PLAYERS: usize = 100;

/// Tournaments handed to a worker at a time
pub const CHUNK_SIZE: usize = 1000;

/// Result code for a tournament without a unique winner: a shared top score or an empty field
pub const NO_WINNER: i64 = -1;

/// Index of the champion
pub const CHAMPION: usize = 0;

/// Number of matches played in a field of `total_players`
pub fn total_matches(total_players: usize) -> usize {
    total_players * total_players.saturating_sub(1) / 2
}

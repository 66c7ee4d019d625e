use crate::constants::{CHAMPION, NO_WINNER};
use crate::random::RandomSource;

/// Result of a single tournament.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// One player holds the top score alone.
    Winner(usize),
    /// Two or more players share the top score.
    Tie,
    /// Empty field: nobody played, so nobody won.
    NoPlayers,
}

impl Outcome {
    /// Integer form handed to callers: the winner's index, or `-1` when there is no unique winner.
    pub fn code(self) -> i64 {
        match self {
            Outcome::Winner(player) => player as i64,
            Outcome::Tie | Outcome::NoPlayers => NO_WINNER,
        }
    }

    pub fn winner(self) -> Option<usize> {
        match self {
            Outcome::Winner(player) => Some(player),
            _ => None,
        }
    }
}

/// Win counts per player after every pairing has been played.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Standings {
    scores: Vec<usize>,
}

impl Standings {
    fn new(total_players: usize) -> Self {
        Standings {
            scores: vec![0; total_players],
        }
    }

    pub fn scores(&self) -> &[usize] {
        &self.scores
    }

    pub fn total_players(&self) -> usize {
        self.scores.len()
    }

    /// Sum of all scores; equals the number of matches played.
    pub fn total_wins(&self) -> usize {
        self.scores.iter().sum()
    }

    /// Lowest-indexed player holding the maximum score, with that score.
    pub fn leader(&self) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        for (player, &score) in self.scores.iter().enumerate() {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((player, score)),
            }
        }
        best
    }

    /// Find the leader, then check nobody else matches the leader's score.
    pub fn outcome(&self) -> Outcome {
        let Some((best_player, best_score)) = self.leader() else {
            return Outcome::NoPlayers;
        };

        let shared = self
            .scores
            .iter()
            .enumerate()
            .any(|(player, &score)| score == best_score && player != best_player);

        if shared {
            Outcome::Tie
        } else {
            Outcome::Winner(best_player)
        }
    }
}

/// Play every pairing `(player1, player2)` with `player1 < player2` exactly once.
///
/// Pairings are enumerated by increasing `player2`, then increasing `player1`,
/// consuming one draw each. `player1` wins when the draw falls below the
/// applicable probability: `champion_win_probability` when `player1` is the
/// champion, `regular_win_probability` otherwise. Probabilities are used as
/// given; values at or below 0 never favour `player1` and values at or above 1
/// always do.
pub fn simulate<S: RandomSource + ?Sized>(
    total_players: usize,
    champion_win_probability: f64,
    regular_win_probability: f64,
    source: &mut S,
) -> Standings {
    let mut standings = Standings::new(total_players);

    for player2 in 0..total_players {
        for player1 in 0..player2 {
            let win_probability = if player1 == CHAMPION {
                champion_win_probability
            } else {
                regular_win_probability
            };
            let winner = if source.next_unit() < win_probability {
                player1
            } else {
                player2
            };
            standings.scores[winner] += 1;
        }
    }

    standings
}

/// Simulate a tournament and return the winner's index, or `-1` without a unique winner.
///
/// # Arguments
/// * `total_players` - Field size; player `0` is the champion
/// * `champion_win_probability` - Champion's chance of winning each of its matches
/// * `regular_win_probability` - Lower index's chance of winning any other match
/// * `source` - Uniform draws, one per match
pub fn run_tournament<S: RandomSource + ?Sized>(
    total_players: usize,
    champion_win_probability: f64,
    regular_win_probability: f64,
    source: &mut S,
) -> i64 {
    simulate(
        total_players,
        champion_win_probability,
        regular_win_probability,
        source,
    )
    .outcome()
    .code()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::total_matches;
    use crate::random::{RngSource, ScriptedDraws};

    fn standings_of(scores: Vec<usize>) -> Standings {
        Standings { scores }
    }

    #[test]
    fn test_conservation_of_wins() {
        let mut source = RngSource::seeded(42);
        for n in 0..40 {
            let standings = simulate(n, 0.75, 0.5, &mut source);
            assert_eq!(standings.total_players(), n);
            assert_eq!(standings.total_wins(), total_matches(n));
        }
    }

    #[test]
    fn test_single_player_wins_by_default() {
        let mut source = RngSource::seeded(1);
        assert_eq!(run_tournament(1, 0.0, 0.0, &mut source), 0);
    }

    #[test]
    fn test_empty_field_has_no_winner() {
        let mut source = RngSource::seeded(1);
        let standings = simulate(0, 0.75, 0.5, &mut source);
        assert_eq!(standings.outcome(), Outcome::NoPlayers);
        assert_eq!(standings.outcome().code(), -1);
    }

    #[test]
    fn test_certain_champion_always_wins_three_player_field() {
        let mut source = RngSource::seeded(99);
        for _ in 0..1000 {
            assert_eq!(run_tournament(3, 1.0, 0.5, &mut source), 0);
        }
    }

    #[test]
    fn test_two_players_never_tie() {
        let mut source = RngSource::seeded(5);
        for _ in 0..1000 {
            let result = run_tournament(2, 0.3, 0.9, &mut source);
            assert!(result == 0 || result == 1, "unexpected result {}", result);
        }
    }

    #[test]
    fn test_draw_order_and_champion_probability() {
        // Pairings for n = 3 in order: (0,1), (0,2), (1,2).
        let mut script = ScriptedDraws::new(vec![0.7, 0.8, 0.7]).unwrap();
        let standings = simulate(3, 0.75, 0.5, &mut script);
        // 0.7 < 0.75 -> 0 beats 1; 0.8 >= 0.75 -> 2 beats 0; 0.7 >= 0.5 -> 2 beats 1
        assert_eq!(standings.scores(), &[1, 0, 2]);
        assert_eq!(standings.outcome(), Outcome::Winner(2));
        assert_eq!(script.consumed(), 3);
    }

    #[test]
    fn test_forced_tie() {
        // (0,1) -> 0, (0,2) -> 2, (1,2) -> 1: everyone on one win.
        let mut script = ScriptedDraws::new(vec![0.0, 0.99, 0.0]).unwrap();
        let standings = simulate(3, 0.5, 0.5, &mut script);
        assert_eq!(standings.scores(), &[1, 1, 1]);
        assert_eq!(standings.outcome(), Outcome::Tie);
    }

    #[test]
    fn test_tie_between_non_leading_indices() {
        let standings = standings_of(vec![1, 3, 0, 3]);
        assert_eq!(standings.leader(), Some((1, 3)));
        assert_eq!(standings.outcome(), Outcome::Tie);
    }

    #[test]
    fn test_out_of_range_probabilities_degenerate() {
        let mut source = RngSource::seeded(3);
        // Champion never wins, and among regulars the higher index always wins.
        let standings = simulate(4, -0.5, -1.0, &mut source);
        assert_eq!(standings.scores(), &[0, 1, 2, 3]);
        assert_eq!(standings.outcome(), Outcome::Winner(3));

        let standings = simulate(4, 1.5, 2.0, &mut source);
        assert_eq!(standings.scores(), &[3, 2, 1, 0]);
        assert_eq!(standings.outcome(), Outcome::Winner(0));
    }

    #[test]
    fn test_outcome_code_and_winner() {
        assert_eq!(Outcome::Winner(4).code(), 4);
        assert_eq!(Outcome::Winner(4).winner(), Some(4));
        assert_eq!(Outcome::Tie.code(), NO_WINNER);
        assert_eq!(Outcome::Tie.winner(), None);
        assert_eq!(Outcome::NoPlayers.code(), NO_WINNER);
        assert_eq!(NO_WINNER, -1);
    }

    #[test]
    fn test_simulate_deterministic_with_seed() {
        let a = simulate(25, 0.75, 0.5, &mut RngSource::seeded(42));
        let b = simulate(25, 0.75, 0.5, &mut RngSource::seeded(42));
        assert_eq!(a, b);
    }
}

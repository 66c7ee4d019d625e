use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;

use crate::error::{Result, TournamentError};

/// Source of uniform draws in `[0, 1)` consumed by the simulator, one per match.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Adapts a `rand` generator into a [`RandomSource`].
#[derive(Clone, Debug)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        RngSource { rng }
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

impl RngSource<ChaCha8Rng> {
    /// Reproducible source for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        RngSource::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Source seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        RngSource::new(ChaCha8Rng::from_entropy())
    }
}

/// Replays a fixed list of draws, wrapping around once exhausted.
///
/// Lets tests force particular match outcomes: a draw below the applicable
/// win probability goes to the lower-indexed player.
#[derive(Clone, Debug)]
pub struct ScriptedDraws {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedDraws {
    pub fn new(draws: Vec<f64>) -> Result<Self> {
        if draws.is_empty() {
            return Err(TournamentError::EmptyScript);
        }
        Ok(ScriptedDraws { draws, cursor: 0 })
    }

    /// Number of draws handed out so far, counting repeats.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedDraws {
    fn next_unit(&mut self) -> f64 {
        let draw = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        draw
    }
}

thread_local! {
    static THREAD_SOURCE: RefCell<RngSource<ChaCha8Rng>> = RefCell::new(RngSource::from_entropy());
}

/// Runs `f` against this thread's generator, seeding it from entropy on first use.
///
/// Must not be called re-entrantly from within `f`.
pub fn with_thread_rng<T>(f: impl FnOnce(&mut RngSource<ChaCha8Rng>) -> T) -> T {
    THREAD_SOURCE.with(|source| f(&mut source.borrow_mut()))
}

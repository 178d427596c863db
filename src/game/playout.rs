//! # Random playouts
//!
//! Plays uniformly random legal games from a starting board. Mostly useful to
//! shake the move generator with positions no hand-written test reaches.

use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};

use super::board::{Board, Termination};

/// Outcome of a single random game.
#[derive(Clone, Debug)]
pub struct PlayoutReport {
    /// Number of plies played.
    pub plies: usize,
    /// How the game ended, if it ended before the ply limit.
    pub termination: Option<Termination>,
    /// Final board.
    pub board: Board,
}

/// Builder pattern to configure random playouts.
#[derive(Clone, Copy, Debug)]
pub struct PlayoutConfig {
    pub games: usize,
    pub max_plies: usize,
    pub seed: u64,
}
impl Default for PlayoutConfig {
    fn default() -> Self {
        Self {
            games: 1,
            max_plies: 200,
            seed: 0,
        }
    }
}
impl PlayoutConfig {
    /// Sets the number of games to play.
    pub fn with_games(mut self, games: usize) -> Self {
        self.games = games;
        self
    }

    /// Sets the ply limit of each game.
    pub fn with_max_plies(mut self, plies: usize) -> Self {
        self.max_plies = plies;
        self
    }

    /// Seeds the random generator, making runs reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Plays every configured game from `start`.
    pub fn go(&self, start: &Board) -> Vec<PlayoutReport> {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        (0..self.games)
            .map(|game| {
                let report = play(start.clone(), self.max_plies, &mut rng);
                log::info!(
                    "game {game}: {} plies, {}",
                    report.plies,
                    match report.termination {
                        Some(termination) => format!("{termination:?}"),
                        None => String::from("unfinished"),
                    }
                );
                report
            })
            .collect()
    }
}

/// Plays random legal moves on `board` until the game ends or `max_plies`
/// have been played.
pub fn play(mut board: Board, max_plies: usize, rng: &mut SmallRng) -> PlayoutReport {
    let mut plies = 0;
    while plies < max_plies {
        if let Some(termination) = board.termination() {
            return PlayoutReport {
                plies,
                termination: Some(termination),
                board,
            };
        }
        let moves = board.legal_move_list();
        let Some(&(origin, target)) = moves.choose(rng) else {
            break;
        };
        if let Err(e) = board.make(origin, target) {
            log::error!("generated move {origin}{target} was rejected: {e}");
            break;
        }
        plies += 1;
    }
    PlayoutReport {
        plies,
        termination: board.termination(),
        board,
    }
}

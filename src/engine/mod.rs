//! Engine module: packed 4x4 board, table-driven shifts, and the game rules
//! (spawn policy, move acceptance, win/loss classification).
//!
//! - `Board` is the packed state with useful query methods.
//! - `Rules` carries the win tile and spawn odds; the free functions below
//!   use [`Rules::STANDARD`].
//! - Internals (tables and line merging) live in submodules.

mod rules;
mod state;
mod tables;

pub use rules::{is_terminal, GameState, MoveOutcome, Rules, Status};
pub use state::{Board, Move, Shift, MAX_TILE};

use rand::Rng;

/// Build the line lookup tables now instead of on the first move.
/// Safe to call multiple times.
pub fn new() {
    tables::init();
}

/// Fresh board with two spawned tiles.
pub fn initialize<R: Rng + ?Sized>(rng: &mut R) -> Board {
    Rules::STANDARD.initialize(rng)
}

/// Apply `direction` to `state` under [`Rules::STANDARD`].
pub fn apply_move<R: Rng + ?Sized>(state: GameState, direction: Move, rng: &mut R) -> MoveOutcome {
    Rules::STANDARD.apply_move(state, direction, rng)
}

/// Spawn one tile under [`Rules::STANDARD`]; a full board is returned as is.
///
/// ```
/// use slide_2048::engine::{self, Board};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(3);
/// let board = engine::spawn_tile(Board::EMPTY, &mut rng);
/// assert_eq!(board.count_empty(), 15);
/// assert!(matches!(board.highest_tile(), 2 | 4));
/// ```
pub fn spawn_tile<R: Rng + ?Sized>(board: Board, rng: &mut R) -> Board {
    Rules::STANDARD.spawn_tile(board, rng)
}

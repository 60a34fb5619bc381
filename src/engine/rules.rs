//! Game rules on top of the board: spawning, move acceptance, win/loss.
//!
//! Everything here is a pure function of its inputs plus the RNG handed in
//! by the caller. The caller keeps the [`GameState`] between moves.

use log::{debug, trace};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

use super::state::{Board, Move, MAX_TILE};
use crate::error::ConfigError;

/// Tunable parameters of a game. [`Rules::STANDARD`] is classic 2048.
///
/// Invalid combinations cannot be constructed, so the spawn and move paths
/// never have to re-check them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rules {
    win_tile: u32,
    four_probability: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RulesDef {
    #[serde(default = "defaults::win_tile")]
    win_tile: u32,
    #[serde(default = "defaults::four_probability")]
    four_probability: f64,
}

mod defaults {
    pub fn win_tile() -> u32 { 2048 }
    pub fn four_probability() -> f64 { 0.1 }
}

impl<'de> Deserialize<'de> for Rules {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let def = RulesDef::deserialize(deserializer)?;
        Rules::new(def.win_tile, def.four_probability).map_err(serde::de::Error::custom)
    }
}

impl Default for Rules {
    fn default() -> Self {
        Rules::STANDARD
    }
}

/// Where a game stands after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl Status {
    /// Won and lost both end active play.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::InProgress)
    }
}

/// The caller-owned state carried from one move to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub score: u64,
    pub status: Status,
}

impl GameState {
    /// A fresh game under [`Rules::STANDARD`].
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Rules::STANDARD.new_game(rng)
    }

    /// Resume from a saved board and score. The status is derived from the
    /// board, so a stuck board comes back as lost; a previous win is not
    /// recoverable from the board alone.
    pub fn resume(board: Board, score: u64) -> Self {
        GameState { board, score, status: is_terminal(board) }
    }
}

/// What [`Rules::apply_move`] hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub state: GameState,
    pub score_delta: u64,
    pub merges: u32,
    /// False when the move was rejected: nothing slid, or the game was over.
    pub moved: bool,
}

impl Rules {
    pub const STANDARD: Rules = Rules { win_tile: 2048, four_probability: 0.1 };

    pub fn new(win_tile: u32, four_probability: f64) -> Result<Self, ConfigError> {
        if !win_tile.is_power_of_two() || win_tile < 4 || win_tile > MAX_TILE {
            return Err(ConfigError::WinTile { value: win_tile, max: MAX_TILE });
        }
        if !(0.0..=1.0).contains(&four_probability) {
            return Err(ConfigError::FourProbability(four_probability));
        }
        Ok(Rules { win_tile, four_probability })
    }

    pub fn win_tile(&self) -> u32 {
        self.win_tile
    }

    pub fn four_probability(&self) -> f64 {
        self.four_probability
    }

    /// An empty board with two tiles spawned into distinct cells.
    pub fn initialize<R: Rng + ?Sized>(&self, rng: &mut R) -> Board {
        let board = self.spawn_tile(self.spawn_tile(Board::EMPTY, rng), rng);
        debug!("initialized board {:?}", board);
        board
    }

    /// Start a new game: fresh board, zero score, in progress.
    pub fn new_game<R: Rng + ?Sized>(&self, rng: &mut R) -> GameState {
        GameState { board: self.initialize(rng), score: 0, status: Status::InProgress }
    }

    /// Put a new tile into a uniformly chosen empty cell.
    ///
    /// Returns the board unchanged if it is already full.
    pub fn spawn_tile<R: Rng + ?Sized>(&self, board: Board, rng: &mut R) -> Board {
        if board.count_empty() == 0 {
            debug!("spawn requested on a full board; ignoring");
            return board;
        }
        let spawned = board.with_random_tile(rng, self.four_probability);
        trace!("spawned tile: {:?} -> {:?}", board, spawned);
        spawned
    }

    /// Slide `state.board` in `direction`, spawn a tile if anything moved and
    /// reclassify the game.
    ///
    /// A move on a finished game, or one that changes no cell, is a no-op:
    /// same board, same score, no spawn.
    ///
    /// ```
    /// use slide_2048::engine::{Board, GameState, Move, Rules, Status};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let board = Board::from_rows([[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// let out = Rules::STANDARD.apply_move(GameState::resume(board, 0), Move::Left, &mut rng);
    /// assert!(out.moved);
    /// assert_eq!(out.score_delta, 2048);
    /// assert_eq!(out.state.status, Status::Won);
    /// ```
    pub fn apply_move<R: Rng + ?Sized>(&self, state: GameState, direction: Move, rng: &mut R) -> MoveOutcome {
        if state.status.is_terminal() {
            debug!("ignoring {} on finished game ({:?})", direction, state.status);
            return MoveOutcome { state, score_delta: 0, merges: 0, moved: false };
        }

        let shift = state.board.shift(direction);
        if shift.board == state.board {
            let status = is_terminal(state.board);
            debug!("{} does not change the board; status {:?}", direction, status);
            return MoveOutcome { state: GameState { status, ..state }, score_delta: 0, merges: 0, moved: false };
        }

        let board = self.spawn_tile(shift.board, rng);
        let status = if shift.produced(self.win_tile) { Status::Won } else { is_terminal(board) };
        if status.is_terminal() {
            debug!("game ended with {:?} at score {}", status, state.score + shift.score_delta);
        }
        MoveOutcome {
            state: GameState { board, score: state.score + shift.score_delta, status },
            score_delta: shift.score_delta,
            merges: shift.merges,
            moved: true,
        }
    }
}

/// Lost iff the board is full and no two adjacent tiles match; otherwise in
/// progress. Never reports [`Status::Won`].
pub fn is_terminal(board: Board) -> Status {
    if board.count_empty() == 0 && !board.has_adjacent_pair() {
        Status::Lost
    } else {
        Status::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn board(rows: [[u32; 4]; 4]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    #[test]
    fn rules_validation() {
        assert!(Rules::new(2048, 0.1).is_ok());
        assert!(Rules::new(4, 0.0).is_ok());
        assert!(Rules::new(MAX_TILE, 1.0).is_ok());
        assert!(matches!(Rules::new(2, 0.1), Err(ConfigError::WinTile { value: 2, .. })));
        assert!(matches!(Rules::new(1000, 0.1), Err(ConfigError::WinTile { .. })));
        assert!(matches!(Rules::new(2 * MAX_TILE, 0.1), Err(ConfigError::WinTile { .. })));
        assert!(matches!(Rules::new(2048, 1.5), Err(ConfigError::FourProbability(_))));
        assert!(matches!(Rules::new(2048, f64::NAN), Err(ConfigError::FourProbability(_))));
    }

    #[test]
    fn initialize_places_two_small_tiles() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let b = Rules::STANDARD.initialize(&mut rng);
            assert_eq!(b.count_empty(), 14);
            assert!(b.to_vec().iter().all(|&v| v == 0 || v == 2 || v == 4));
        }
    }

    #[test]
    fn four_probability_extremes() {
        let mut rng = StdRng::seed_from_u64(3);
        let twos = Rules::new(2048, 0.0).unwrap();
        let fours = Rules::new(2048, 1.0).unwrap();
        assert_eq!(twos.spawn_tile(Board::EMPTY, &mut rng).tile_sum(), 2);
        assert_eq!(fours.spawn_tile(Board::EMPTY, &mut rng).tile_sum(), 4);
    }

    #[test]
    fn spawn_on_full_board_is_noop() {
        let full = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(Rules::STANDARD.spawn_tile(full, &mut rng), full);
    }

    #[test]
    fn spawn_fills_the_only_gap() {
        let gap = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 0, 4], [4, 2, 4, 2]]);
        let mut rng = StdRng::seed_from_u64(5);
        let filled = Rules::new(2048, 0.0).unwrap().spawn_tile(gap, &mut rng);
        assert_eq!(filled.rows()[2], [2, 4, 2, 4]);
    }

    #[test]
    fn checkerboard_is_lost() {
        let b = board([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert_eq!(is_terminal(b), Status::Lost);
        let with_pair = board([[2, 2, 8, 4], [4, 8, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert_eq!(is_terminal(with_pair), Status::InProgress);
        assert_eq!(is_terminal(Board::EMPTY), Status::InProgress);
    }

    #[test]
    fn ceiling_pair_is_lost() {
        // The two 32768s cannot merge, so no direction changes this board.
        let b = board([[32768, 32768, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert_eq!(is_terminal(b), Status::Lost);
        let mut rng = StdRng::seed_from_u64(8);
        let state = GameState { board: b, score: 0, status: Status::InProgress };
        for dir in Move::ALL {
            let out = Rules::STANDARD.apply_move(state, dir, &mut rng);
            assert!(!out.moved);
            assert_eq!(out.state.board, b);
            assert_eq!(out.state.status, Status::Lost);
        }
    }

    #[test]
    fn win_overrides_lost() {
        // Merging the 1024s leaves one gap; the spawn fills it and the board
        // is stuck, yet the move reports a win.
        let b = board([[1024, 1024, 2, 4], [4, 8, 16, 32], [8, 16, 32, 64], [16, 32, 64, 128]]);
        let mut rng = StdRng::seed_from_u64(1);
        let twos = Rules::new(2048, 0.0).unwrap();
        let out = twos.apply_move(GameState::resume(b, 100), Move::Left, &mut rng);
        assert!(out.moved);
        assert_eq!(out.state.board.rows()[0], [2048, 2, 4, 2]);
        assert_eq!(is_terminal(out.state.board), Status::Lost);
        assert_eq!(out.state.status, Status::Won);
        assert_eq!(out.state.score, 100 + 2048);
    }

    #[test]
    fn finished_games_reject_moves() {
        let b = board([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut rng = StdRng::seed_from_u64(9);
        for status in [Status::Won, Status::Lost] {
            let state = GameState { board: b, score: 40, status };
            let out = Rules::STANDARD.apply_move(state, Move::Left, &mut rng);
            assert!(!out.moved);
            assert_eq!(out.state, state);
            assert_eq!(out.score_delta, 0);
        }
    }

    #[test]
    fn blocked_direction_is_noop() {
        let b = board([[2, 4, 0, 0], [8, 0, 0, 0], [0; 4], [0; 4]]);
        let mut rng = StdRng::seed_from_u64(2);
        let state = GameState::resume(b, 12);
        let out = Rules::STANDARD.apply_move(state, Move::Left, &mut rng);
        assert!(!out.moved);
        assert_eq!(out.state, state);
    }

    #[test]
    fn custom_win_tile() {
        let rules = Rules::new(16, 0.1).unwrap();
        let b = board([[8, 8, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut rng = StdRng::seed_from_u64(4);
        let out = rules.apply_move(GameState::resume(b, 0), Move::Right, &mut rng);
        assert_eq!(out.state.status, Status::Won);
    }
}

//! slide-2048: a deterministic 2048 sliding-tile engine
//!
//! This crate provides:
//! - A compact `Board` type (16 packed exponents in a `u64`) with table-driven shifts
//! - `Rules` for spawning tiles, accepting moves and classifying won/lost games
//! - A TOML-backed `Config` for the bundled terminal driver
//!
//! The engine keeps no state between calls: the caller owns the `GameState`
//! and passes in the RNG, so a seeded generator reproduces a game exactly.
//!
//! Quick start:
//! ```
//! use slide_2048::engine::{self as GameEngine, GameState, Move, Status};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Optional: build lookup tables up front
//! GameEngine::new();
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut state = GameState::new(&mut rng);
//! assert_eq!(state.board.count_empty(), 14);
//!
//! for dir in [Move::Left, Move::Up, Move::Right, Move::Down] {
//!     let out = GameEngine::apply_move(state, dir, &mut rng);
//!     state = out.state;
//! }
//! assert_eq!(state.status, Status::InProgress);
//! ```
//!
pub mod config;
pub mod engine;
pub mod error;

pub use config::Config;
pub use engine::{Board, GameState, Move, MoveOutcome, Rules, Status};
pub use error::{BoardError, ConfigError, ParseMoveError};

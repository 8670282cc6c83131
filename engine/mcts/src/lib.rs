//! Monte Carlo Tree Search move selection for tic-tac-toe boards.
//!
//! # Overview
//!
//! The engine answers one question: given a position and the player about to
//! move, which move should that player make? It builds a search tree by
//! repeatedly running four phases:
//!
//! 1. **Selection**: walk from the root by UCT score until reaching an
//!    unexpanded or terminal node
//! 2. **Expansion**: materialize one child per legal action of the leaf
//! 3. **Simulation**: play the first new child out to a terminal state with
//!    a [`RolloutPolicy`] (uniform random by default)
//! 4. **Backpropagation**: update visit counts and value sums along the
//!    path, flipping the value's sign at each level (the players alternate)
//!
//! After the iteration budget the most-visited root child is the answer.
//!
//! # Usage
//!
//! ```
//! use mcts::{find_best_move, MctsConfig, UniformRandomRollout};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//! use tictactoe::{Board, Player};
//!
//! let board = Board::new(3).unwrap();
//! let config = MctsConfig::default().with_iterations(400);
//! let rollout = UniformRandomRollout::new();
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//!
//! let action = find_best_move(&board, Player::X, &config, &rollout, &mut rng).unwrap();
//! assert!(board.cell(action.row, action.col).is_some());
//! ```
//!
//! # Determinism
//!
//! No randomness is drawn from process-wide state: the caller passes a
//! `ChaCha20Rng` into every search, so identical inputs and an identical
//! seed always produce the identical move. Each search owns its tree; runs
//! are strictly sequential and never share mutable state.

pub mod config;
pub mod node;
pub mod rollout;
pub mod search;
pub mod tree;

pub use config::MctsConfig;
pub use node::{NodeId, SearchNode};
pub use rollout::{RolloutError, RolloutPolicy, UniformRandomRollout};
pub use search::{
    find_best_move, MctsSearch, SearchError, SearchProgress, SearchResult, SearchSignal,
};
pub use tree::{SearchTree, TreeStats};

//! Rollout policies: how a simulation finishes a game.
//!
//! The search core only needs the terminal outcome of a playout; how moves
//! are chosen along the way is a strategy decision. [`RolloutPolicy`] is the
//! seam: the default plays uniformly at random, and callers can substitute a
//! heuristic policy without touching the engine.

use rand::Rng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tictactoe::{Board, BoardError, Outcome, Player};

/// Errors that can occur during a rollout.
#[derive(Debug, Error)]
pub enum RolloutError {
    #[error("board error during rollout: {0}")]
    Board(#[from] BoardError),

    /// An unfinished board offered no legal action. This indicates a defect
    /// in outcome classification and aborts the search instead of looping.
    #[error("no legal action on an unfinished {size}x{size} board")]
    StuckBoard { size: usize },
}

/// Strategy that plays a position out to a terminal state.
pub trait RolloutPolicy {
    /// Play from `board` with `to_move` about to act until the game ends,
    /// and report the terminal outcome. A board that is already terminal
    /// plays zero moves. The injected `rng` is the only source of
    /// randomness, so a fixed seed replays the exact same game.
    fn play_out(
        &self,
        board: &Board,
        to_move: Player,
        rng: &mut ChaCha20Rng,
    ) -> Result<Outcome, RolloutError>;
}

/// The default policy: draw uniformly at random among the legal actions,
/// alternating players until the game ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformRandomRollout;

impl UniformRandomRollout {
    pub fn new() -> Self {
        Self
    }
}

impl RolloutPolicy for UniformRandomRollout {
    fn play_out(
        &self,
        board: &Board,
        to_move: Player,
        rng: &mut ChaCha20Rng,
    ) -> Result<Outcome, RolloutError> {
        let mut board = board.clone();
        let mut player = to_move;

        loop {
            let outcome = board.outcome();
            if outcome != Outcome::InProgress {
                return Ok(outcome);
            }

            let actions = board.legal_actions();
            if actions.is_empty() {
                return Err(RolloutError::StuckBoard { size: board.size() });
            }
            let action = actions[rng.gen_range(0..actions.len())];
            board = board.apply(action, player)?;
            player = player.opponent();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use tictactoe::{Action, Cell};

    #[test]
    fn test_rollout_reaches_terminal_state() {
        let policy = UniformRandomRollout::new();
        let board = Board::new(3).unwrap();
        for seed in 0..20 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let outcome = policy.play_out(&board, Player::X, &mut rng).unwrap();
            assert_ne!(outcome, Outcome::InProgress, "seed {seed}");
        }
    }

    #[test]
    fn test_rollout_on_terminal_board_reads_outcome_directly() {
        let policy = UniformRandomRollout::new();
        let board = Board::from_rows(vec![
            vec![Cell::X, Cell::X, Cell::X],
            vec![Cell::O, Cell::O, Cell::Empty],
            vec![Cell::Empty, Cell::Empty, Cell::Empty],
        ])
        .unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let outcome = policy.play_out(&board, Player::O, &mut rng).unwrap();
        assert_eq!(outcome, Outcome::Win(Player::X));
    }

    #[test]
    fn test_rollout_is_deterministic_given_seed() {
        let policy = UniformRandomRollout::new();
        let board = Board::new(3)
            .unwrap()
            .apply(Action::new(1, 1), Player::X)
            .unwrap();

        let mut first = ChaCha20Rng::seed_from_u64(42);
        let mut second = ChaCha20Rng::seed_from_u64(42);
        let a = policy.play_out(&board, Player::O, &mut first).unwrap();
        let b = policy.play_out(&board, Player::O, &mut second).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rollout_does_not_mutate_input_board() {
        let policy = UniformRandomRollout::new();
        let board = Board::new(3).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        policy.play_out(&board, Player::X, &mut rng).unwrap();
        assert_eq!(board.occupied(), 0);
    }

    #[test]
    fn test_one_cell_board_rollout() {
        let policy = UniformRandomRollout::new();
        let board = Board::new(1).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        // X fills the single cell and completes every line at once.
        let outcome = policy.play_out(&board, Player::X, &mut rng).unwrap();
        assert_eq!(outcome, Outcome::Win(Player::X));
    }
}

//! MCTS search implementation.
//!
//! Implements the core algorithm, one rollout per iteration:
//! 1. Selection: walk the tree by UCT score to a leaf or terminal node
//! 2. Expansion: materialize one child per legal action of the leaf
//! 3. Simulation: play out the first new child (or read a terminal outcome)
//! 4. Backpropagation: update statistics along the path, negamax-signed
//!
//! After the iteration budget is spent, the most-visited root child is the
//! move to play.

use std::time::Instant;

use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use tictactoe::{Action, Board, BoardError, Outcome, Player};

use crate::config::MctsConfig;
use crate::node::NodeId;
use crate::rollout::{RolloutError, RolloutPolicy};
use crate::tree::{SearchTree, TreeStats};

/// Errors that can occur during search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The caller asked for a move on a board whose game is already over.
    #[error("search invoked on a finished board: {outcome}")]
    TerminalRoot { outcome: Outcome },

    #[error("board error during search: {0}")]
    Board(#[from] BoardError),

    #[error("rollout error: {0}")]
    Rollout(#[from] RolloutError),

    /// The search stopped (budget, observer, or zero iterations) before a
    /// single iteration completed, so no candidate move exists.
    #[error("search stopped before completing any iteration")]
    NoIterations,

    /// An internal invariant was violated. Fatal for this search: retrying
    /// would loop on the same defect.
    #[error("invalid search state: {0}")]
    InvalidState(String),
}

/// Result of a completed search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best action found.
    pub action: Action,

    /// Mean value at the root, from the searching player's perspective
    /// (+1 certain win, -1 certain loss).
    pub value: f64,

    /// Number of iterations actually completed.
    pub simulations: u32,
}

/// Read-only progress snapshot handed to the observer between iterations.
#[derive(Debug, Clone)]
pub struct SearchProgress {
    /// Iterations completed so far (1-based).
    pub iteration: u32,
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f64,
}

/// Observer verdict after each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSignal {
    Continue,
    Stop,
}

/// MCTS search state for one position.
///
/// Each search owns an independent tree for its lifetime; nothing is shared
/// across concurrent searches. Randomness comes only from the `ChaCha20Rng`
/// passed to [`MctsSearch::run`], so a fixed seed reproduces the search
/// exactly.
pub struct MctsSearch<'a, P: RolloutPolicy> {
    tree: SearchTree,
    rollout: &'a P,
    config: MctsConfig,
}

impl<'a, P: RolloutPolicy> MctsSearch<'a, P> {
    /// Create a search rooted at `board` with `to_move` about to act.
    ///
    /// Fails with [`SearchError::TerminalRoot`] if the game is already over.
    pub fn new(
        board: Board,
        to_move: Player,
        rollout: &'a P,
        config: MctsConfig,
    ) -> Result<Self, SearchError> {
        let outcome = board.outcome();
        if outcome != Outcome::InProgress {
            return Err(SearchError::TerminalRoot { outcome });
        }
        Ok(Self {
            tree: SearchTree::new(board, to_move),
            rollout,
            config,
        })
    }

    /// Run the configured number of iterations and pick the best move.
    pub fn run(&mut self, rng: &mut ChaCha20Rng) -> Result<SearchResult, SearchError> {
        self.run_observed(rng, |_| SearchSignal::Continue)
    }

    /// Like [`MctsSearch::run`], with a progress observer invoked after each
    /// iteration. The observer sees a read-only snapshot and can stop the
    /// search; iterations themselves are never interrupted midway, so the
    /// tree is consistent whenever the observer runs.
    pub fn run_observed(
        &mut self,
        rng: &mut ChaCha20Rng,
        mut observe: impl FnMut(&SearchProgress) -> SearchSignal,
    ) -> Result<SearchResult, SearchError> {
        let deadline = self.config.time_budget.map(|budget| Instant::now() + budget);
        let mut completed = 0u32;

        for _ in 0..self.config.iterations {
            self.iterate(rng)?;
            completed += 1;

            let progress = self.progress(completed);
            trace!(
                iteration = progress.iteration,
                nodes = progress.total_nodes,
                root_value = progress.root_value,
                "iteration complete"
            );
            if observe(&progress) == SearchSignal::Stop {
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }
        }

        let (action, visits) = self.tree.best_action().ok_or(SearchError::NoIterations)?;
        let root = self.tree.get(self.tree.root());
        debug!(
            %action,
            visits,
            simulations = completed,
            nodes = self.tree.len(),
            value = root.mean_value(),
            "search finished"
        );
        Ok(SearchResult {
            action,
            value: root.mean_value(),
            simulations: completed,
        })
    }

    /// One full iteration: selection, expansion, simulation,
    /// backpropagation. Always completes atomically.
    fn iterate(&mut self, rng: &mut ChaCha20Rng) -> Result<(), SearchError> {
        let leaf = self.select();
        let simulated = if self.tree.get(leaf).board.is_terminal() {
            leaf
        } else {
            // One rollout per iteration: the first new child stands in for
            // the whole expansion.
            self.expand(leaf)?
        };
        let value = self.simulate(simulated, rng)?;
        self.tree.backpropagate(simulated, value);
        Ok(())
    }

    /// Walk down from the root by UCT score until reaching an unexpanded or
    /// terminal node. Iterative: depth is bounded by the cell count.
    fn select(&self) -> NodeId {
        let mut current = self.tree.root();
        loop {
            let node = self.tree.get(current);
            if !node.expanded || node.board.is_terminal() {
                return current;
            }
            match self.tree.select_child(current, self.config.exploration) {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    /// Materialize one child per legal action of `id` and return the first,
    /// the representative to simulate this iteration.
    fn expand(&mut self, id: NodeId) -> Result<NodeId, SearchError> {
        let (board, to_move) = {
            let node = self.tree.get(id);
            if node.expanded {
                return Err(SearchError::InvalidState(format!(
                    "expansion requested twice for node {}",
                    id.0
                )));
            }
            (node.board.clone(), node.to_move)
        };

        let actions = board.legal_actions();
        if actions.is_empty() {
            // An unfinished board must offer a move; anything else means the
            // outcome classifier is wrong and the search would spin forever.
            return Err(SearchError::InvalidState(format!(
                "no legal action on an unfinished board at node {}",
                id.0
            )));
        }

        let mut representative = NodeId::NONE;
        for action in actions {
            let child_board = board.apply(action, to_move)?;
            let child = self
                .tree
                .add_child(id, action, child_board, to_move.opponent());
            if representative.is_none() {
                representative = child;
            }
        }
        self.tree.get_mut(id).expanded = true;
        Ok(representative)
    }

    /// Value of a playout from `id`, signed for the node's own mover:
    /// +1 if that player wins, -1 if the opponent does, 0 for a draw.
    fn simulate(&self, id: NodeId, rng: &mut ChaCha20Rng) -> Result<f64, SearchError> {
        let node = self.tree.get(id);
        let outcome = if node.board.is_terminal() {
            node.board.outcome()
        } else {
            self.rollout.play_out(&node.board, node.to_move, rng)?
        };
        match outcome {
            Outcome::Win(winner) if winner == node.to_move => Ok(1.0),
            Outcome::Win(_) => Ok(-1.0),
            Outcome::Draw => Ok(0.0),
            Outcome::InProgress => Err(SearchError::InvalidState(
                "rollout reported an unfinished game".into(),
            )),
        }
    }

    fn progress(&self, iteration: u32) -> SearchProgress {
        let root = self.tree.get(self.tree.root());
        SearchProgress {
            iteration,
            total_nodes: self.tree.len(),
            root_visits: root.visit_count,
            root_value: root.mean_value(),
        }
    }

    /// Advance the root to the child reached by `action`, keeping its
    /// subtree for the next search on the same game (tree reuse).
    pub fn advance_root(&mut self, action: Action) -> Result<(), SearchError> {
        self.tree
            .advance_root(action)
            .map(|_| ())
            .ok_or_else(|| {
                SearchError::InvalidState(format!(
                    "cannot advance root: no searched child for action {action}"
                ))
            })
    }

    /// The search tree, for inspection and diagnostics.
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    /// Summary statistics of the current tree.
    pub fn stats(&self) -> TreeStats {
        self.tree.stats()
    }
}

/// Convenience entry point: search `board` for the best move of `to_move`.
pub fn find_best_move<P: RolloutPolicy>(
    board: &Board,
    to_move: Player,
    config: &MctsConfig,
    rollout: &P,
    rng: &mut ChaCha20Rng,
) -> Result<Action, SearchError> {
    let mut search = MctsSearch::new(board.clone(), to_move, rollout, config.clone())?;
    Ok(search.run(rng)?.action)
}

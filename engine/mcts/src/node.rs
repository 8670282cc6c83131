//! Search tree node representation.
//!
//! Each node represents one position reached by taking an action from its
//! parent. Nodes carry the visit and value statistics that drive UCT
//! selection and the final move choice.

use tictactoe::{Action, Board, Player};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the search tree.
///
/// Statistics are stored from the perspective of `to_move`, the player about
/// to act at this position: `value_sum / visit_count` estimates how well that
/// player will do from here. The parent handle exists only so
/// backpropagation can walk upward; the arena owns every node.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Parent node index (`NONE` for the root).
    pub parent: NodeId,

    /// Action that produced this node from its parent (`None` for the root).
    pub action: Option<Action>,

    /// The position at this node.
    pub board: Board,

    /// The player about to move at this position.
    pub to_move: Player,

    /// Number of times a simulation result passed through this node.
    pub visit_count: u32,

    /// Sum of simulation values seen from `to_move`'s perspective.
    /// Meaningless while `visit_count == 0`.
    pub value_sum: f64,

    /// Whether children have been materialized, one per legal action.
    pub expanded: bool,

    /// Child handles in row-major action order. Empty until expanded.
    pub children: Vec<NodeId>,
}

impl SearchNode {
    pub fn new_root(board: Board, to_move: Player) -> Self {
        Self {
            parent: NodeId::NONE,
            action: None,
            board,
            to_move,
            visit_count: 0,
            value_sum: 0.0,
            expanded: false,
            children: Vec::new(),
        }
    }

    pub fn new_child(parent: NodeId, action: Action, board: Board, to_move: Player) -> Self {
        Self {
            parent,
            action: Some(action),
            board,
            to_move,
            visit_count: 0,
            value_sum: 0.0,
            expanded: false,
            children: Vec::new(),
        }
    }

    /// Mean value from this node's own perspective, 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f64
        }
    }

    /// UCT score of this node as a candidate child of a parent with
    /// `parent_visits` visits.
    ///
    /// `score = -w/n + c * sqrt(ln(parent_visits) / n)`
    ///
    /// An unvisited node scores infinite, so every child of an expanded node
    /// is tried once before any mean value is trusted. The exploitation term
    /// is negated because this node stores its statistics from its own
    /// mover's perspective, which is the selecting parent's opponent.
    #[inline]
    pub fn uct_score(&self, parent_visits: u32, exploration: f64) -> f64 {
        if self.visit_count == 0 {
            return f64::INFINITY;
        }
        let n = self.visit_count as f64;
        let exploit = -self.value_sum / n;
        let explore = exploration * ((parent_visits as f64).ln() / n).sqrt();
        exploit + explore
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_node() -> SearchNode {
        SearchNode::new_root(Board::new(3).unwrap(), Player::X)
    }

    #[test]
    fn test_node_id_none() {
        assert!(NodeId::NONE.is_none());
        assert!(!NodeId::NONE.is_some());
        assert!(NodeId(0).is_some());
    }

    #[test]
    fn test_new_root() {
        let node = root_node();
        assert!(node.parent.is_none());
        assert!(node.action.is_none());
        assert_eq!(node.visit_count, 0);
        assert!(!node.expanded);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_new_child_provenance() {
        let action = Action::new(1, 2);
        let board = Board::new(3).unwrap().apply(action, Player::X).unwrap();
        let node = SearchNode::new_child(NodeId(0), action, board, Player::O);
        assert_eq!(node.parent, NodeId(0));
        assert_eq!(node.action, Some(action));
        assert_eq!(node.to_move, Player::O);
    }

    #[test]
    fn test_mean_value() {
        let mut node = root_node();
        assert_eq!(node.mean_value(), 0.0);

        node.visit_count = 4;
        node.value_sum = 2.0;
        assert!((node.mean_value() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unvisited_child_has_infinite_priority() {
        let node = root_node();
        assert_eq!(node.uct_score(10, 2.0), f64::INFINITY);
    }

    #[test]
    fn test_uct_score() {
        let mut node = root_node();
        node.visit_count = 4;
        node.value_sum = 2.0;

        // -0.5 + 2 * sqrt(ln(100) / 4)
        let expected = -0.5 + 2.0 * (100f64.ln() / 4.0).sqrt();
        assert!((node.uct_score(100, 2.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_uct_prefers_opponent_losses() {
        // A child whose own mover keeps losing is a good move for the parent.
        let mut losing_child = root_node();
        losing_child.visit_count = 10;
        losing_child.value_sum = -8.0;

        let mut winning_child = root_node();
        winning_child.visit_count = 10;
        winning_child.value_sum = 8.0;

        assert!(losing_child.uct_score(20, 2.0) > winning_child.uct_score(20, 2.0));
    }
}

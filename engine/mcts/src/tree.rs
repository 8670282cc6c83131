//! Arena-backed search tree.
//!
//! Nodes live in a contiguous `Vec` and reference each other through
//! [`NodeId`] indices, so parent back-references never form ownership
//! cycles: the arena owns everything, handles own nothing.

use tictactoe::{Action, Board, Player};

use crate::node::{NodeId, SearchNode};

/// The search tree for one position.
#[derive(Debug, Clone)]
pub struct SearchTree {
    /// Arena storing all nodes.
    nodes: Vec<SearchNode>,

    /// Current root handle. Starts at 0 and only changes through
    /// [`SearchTree::advance_root`].
    root: NodeId,
}

impl SearchTree {
    /// Create a tree whose root holds the given position.
    pub fn new(board: Board, to_move: Player) -> Self {
        Self {
            nodes: vec![SearchNode::new_root(board, to_move)],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Total number of allocated nodes, including any detached by
    /// [`SearchTree::advance_root`].
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a child of `parent` and link it in creation order.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        action: Action,
        board: Board,
        to_move: Player,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes
            .push(SearchNode::new_child(parent, action, board, to_move));
        self.get_mut(parent).children.push(id);
        id
    }

    /// Pick the child of `id` with the highest UCT score.
    ///
    /// Children are scored in row-major action order and a later child must
    /// score strictly higher to displace an earlier one, so ties always
    /// resolve to the first action. Unvisited children score infinite and
    /// therefore win immediately.
    pub fn select_child(&self, id: NodeId, exploration: f64) -> Option<NodeId> {
        let parent = self.get(id);
        let mut best: Option<(NodeId, f64)> = None;
        for &child_id in &parent.children {
            let score = self.get(child_id).uct_score(parent.visit_count, exploration);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child_id, score)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Propagate a simulation result from `from` up to the root.
    ///
    /// The starting node receives `value` as seen by its own mover; each
    /// ancestor receives the sign-flipped value of its child, because the
    /// players they represent alternate (negamax). Iterative on purpose:
    /// depth is bounded by the number of cells but never recursed over.
    pub fn backpropagate(&mut self, from: NodeId, value: f64) {
        let mut current = from;
        let mut current_value = value;

        while current.is_some() {
            let node = self.get_mut(current);
            node.visit_count += 1;
            node.value_sum += current_value;
            current_value = -current_value;
            current = node.parent;
        }
    }

    /// The most-visited root child: the move to play.
    ///
    /// Ties on visit count fall back to the better mean value from the root
    /// player's perspective, then to the earlier row-major action.
    pub fn best_action(&self) -> Option<(Action, u32)> {
        let root = self.get(self.root);
        let mut best: Option<(Action, u32, f64)> = None;
        for &child_id in &root.children {
            let child = self.get(child_id);
            let Some(action) = child.action else { continue };
            let visits = child.visit_count;
            // Child statistics are from the opponent's perspective.
            let mean = -child.mean_value();
            let better = match best {
                None => true,
                Some((_, best_visits, best_mean)) => {
                    visits > best_visits || (visits == best_visits && mean > best_mean)
                }
            };
            if better {
                best = Some((action, visits, mean));
            }
        }
        best.map(|(action, visits, _)| (action, visits))
    }

    /// Visit counts of the root's children in row-major action order.
    pub fn visit_counts(&self) -> Vec<(Action, u32)> {
        let root = self.get(self.root);
        root.children
            .iter()
            .filter_map(|&child_id| {
                let child = self.get(child_id);
                child.action.map(|action| (action, child.visit_count))
            })
            .collect()
    }

    /// Advance the root handle to the child reached by `action`, keeping its
    /// subtree for reuse after a real move is played.
    ///
    /// Siblings stay allocated in the arena but become unreachable; they are
    /// not reclaimed, the tree is short-lived per game. Returns `None` if the
    /// root is unexpanded or has no child for `action`.
    pub fn advance_root(&mut self, action: Action) -> Option<NodeId> {
        let root = self.get(self.root);
        if !root.expanded {
            return None;
        }
        let child_id = root
            .children
            .iter()
            .copied()
            .find(|&id| self.get(id).action == Some(action))?;
        self.get_mut(child_id).parent = NodeId::NONE;
        self.get_mut(child_id).action = None;
        self.root = child_id;
        Some(child_id)
    }

    /// Summary statistics for diagnostics.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 0u32)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for &child_id in &self.get(id).children {
                stack.push((child_id, depth + 1));
            }
        }
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visit_count,
            root_value: root.mean_value(),
            max_depth,
        }
    }
}

/// Statistics about a search tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f64,
    pub max_depth: u32,
}

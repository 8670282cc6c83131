//! Search configuration parameters.

use std::time::Duration;

/// Configuration for a Monte Carlo Tree Search run.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Number of search iterations (one rollout each) per move.
    pub iterations: u32,

    /// Exploration constant `c` in the UCT formula.
    /// Higher values favor exploration, lower values exploitation.
    pub exploration: f64,

    /// Optional wall-clock budget, checked between iterations only.
    /// A started iteration always runs to completion.
    pub time_budget: Option<Duration>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 800,
            exploration: 2.0,
            time_budget: None,
        }
    }
}

impl MctsConfig {
    /// A fast configuration for tests.
    pub fn for_testing() -> Self {
        Self {
            iterations: 200,
            ..Self::default()
        }
    }

    /// Builder pattern: set the iteration budget.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    /// Builder pattern: set the wall-clock budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }
}

//! Generalized tic-tac-toe board for the MCTS engine.
//!
//! The board is a square K×K grid (K = 3 by default) of three-valued cells.
//! `X` always moves first. A position is won by completing a full row, a
//! full column, or either main diagonal; a full board with no winner is a
//! draw.
//!
//! Boards are value types: [`Board::apply`] returns a new board and never
//! mutates the receiver, so a search tree can hold many positions that share
//! history without sharing storage.

use std::fmt;

use thiserror::Error;

/// Default board size (classic 3×3 tic-tac-toe).
pub const DEFAULT_SIZE: usize = 3;

/// Errors raised by board construction and play.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// The target cell is occupied or outside the grid. Raised by
    /// [`Board::apply`] and propagated to the caller unmodified.
    #[error("illegal move at ({row}, {col}): cell is not an empty cell of a {size}x{size} board")]
    IllegalMove { row: usize, col: usize, size: usize },

    /// The caller-supplied grid is empty, not square, or has ragged rows.
    /// Detected at construction, never later.
    #[error("malformed board: {0}")]
    MalformedBoard(String),
}

/// A single cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    /// The player occupying this cell, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Player::X),
            Cell::O => Some(Player::O),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::X => 'X',
            Cell::O => 'O',
        }
    }
}

/// One of the two players. `X` moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    pub fn to_cell(self) -> Cell {
        match self {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::X => write!(f, "X"),
            Player::O => write!(f, "O"),
        }
    }
}

/// A (row, col) move, 0-indexed from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Action {
    pub row: usize,
    pub col: usize,
}

impl Action {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Terminal classification of a board. Computed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win(Player),
    Draw,
    InProgress,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win(p) => write!(f, "{p} wins"),
            Outcome::Draw => write!(f, "draw"),
            Outcome::InProgress => write!(f, "in progress"),
        }
    }
}

/// A K×K tic-tac-toe position, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// An empty `size`×`size` board.
    pub fn new(size: usize) -> Result<Self, BoardError> {
        if size == 0 {
            return Err(BoardError::MalformedBoard("board size must be at least 1".into()));
        }
        Ok(Self {
            size,
            cells: vec![Cell::Empty; size * size],
        })
    }

    /// Build a board from caller-supplied rows.
    ///
    /// The grid must be square: N rows of N cells each.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, BoardError> {
        let size = rows.len();
        if size == 0 {
            return Err(BoardError::MalformedBoard("board has no rows".into()));
        }
        let mut cells = Vec::with_capacity(size * size);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(BoardError::MalformedBoard(format!(
                    "row {i} has {} cells, expected {size} for a square board",
                    row.len()
                )));
            }
            cells.extend_from_slice(row);
        }
        Ok(Self { size, cells })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// The cell at (row, col), or `None` outside the grid.
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.size && col < self.size {
            Some(self.cells[row * self.size + col])
        } else {
            None
        }
    }

    /// Number of non-empty cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| **c != Cell::Empty).count()
    }

    /// The player whose turn it is, derived from piece counts.
    ///
    /// Assumes the position arose from alternating play on an empty board
    /// with `X` first. Callers that track the mover themselves may pass it
    /// to the engine directly; this derivation is for convenience.
    pub fn to_move(&self) -> Player {
        let x = self.cells.iter().filter(|c| **c == Cell::X).count();
        let o = self.cells.iter().filter(|c| **c == Cell::O).count();
        if x <= o {
            Player::X
        } else {
            Player::O
        }
    }

    /// Every empty cell, enumerated row-major.
    ///
    /// The ordering is deterministic: tie-breaks during search rely on it.
    pub fn legal_actions(&self) -> Vec<Action> {
        let mut actions = Vec::with_capacity(self.cells.len() - self.occupied());
        for row in 0..self.size {
            for col in 0..self.size {
                if self.cells[row * self.size + col] == Cell::Empty {
                    actions.push(Action::new(row, col));
                }
            }
        }
        actions
    }

    /// Place `player` at `action`, returning the new position.
    ///
    /// The receiver is left untouched, so positions already referenced by
    /// search nodes never change underneath them.
    pub fn apply(&self, action: Action, player: Player) -> Result<Board, BoardError> {
        let occupied = match self.cell(action.row, action.col) {
            Some(Cell::Empty) => false,
            Some(_) => true,
            None => true,
        };
        if occupied {
            return Err(BoardError::IllegalMove {
                row: action.row,
                col: action.col,
                size: self.size,
            });
        }
        let mut next = self.clone();
        next.cells[action.row * self.size + action.col] = player.to_cell();
        Ok(next)
    }

    /// Classify the position: a win for either player, a draw, or still in
    /// progress. Checks every row and column plus the two main diagonals.
    pub fn outcome(&self) -> Outcome {
        let k = self.size;
        for row in 0..k {
            if let Some(p) = self.line_winner((0..k).map(|col| (row, col))) {
                return Outcome::Win(p);
            }
        }
        for col in 0..k {
            if let Some(p) = self.line_winner((0..k).map(|row| (row, col))) {
                return Outcome::Win(p);
            }
        }
        if let Some(p) = self.line_winner((0..k).map(|i| (i, i))) {
            return Outcome::Win(p);
        }
        if let Some(p) = self.line_winner((0..k).map(|i| (i, k - 1 - i))) {
            return Outcome::Win(p);
        }
        if self.cells.iter().any(|c| *c == Cell::Empty) {
            Outcome::InProgress
        } else {
            Outcome::Draw
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.outcome() != Outcome::InProgress
    }

    fn line_winner(&self, mut line: impl Iterator<Item = (usize, usize)>) -> Option<Player> {
        let (r0, c0) = line.next()?;
        let first = self.cells[r0 * self.size + c0].player()?;
        let cell = first.to_cell();
        line.all(|(r, c)| self.cells[r * self.size + c] == cell)
            .then_some(first)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            if row > 0 {
                writeln!(f, "{}", vec!["---"; self.size].join("+"))?;
            }
            let cells: Vec<String> = (0..self.size)
                .map(|col| format!(" {} ", self.cells[row * self.size + col].to_char()))
                .collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

use anyhow::Context;
use rand::Rng;

pub mod agent;
pub mod board;

pub use agent::{Agent, Sentence};
pub use board::Minefield;

/// Represents a 2D coordinate on the minesweeper board.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

/// The 8-neighborhood of a cell, clipped to the board bounds and excluding
/// the cell itself. Both the minefield and the agent reason over the same
/// geometry, so it lives here rather than in either module.
pub fn neighbors(height: usize, width: usize, cell: Point) -> impl Iterator<Item = Point> {
    (-1isize..=1).flat_map(move |dr| {
        (-1isize..=1).filter_map(move |dc| {
            // Skip the cell itself (dr=0, dc=0)
            if dr == 0 && dc == 0 {
                return None;
            }

            let row = cell.row as isize + dr;
            let col = cell.col as isize + dc;

            // Check if the neighbor is within board bounds
            if row >= 0 && row < height as isize && col >= 0 && col < width as isize {
                Some(Point {
                    row: row as usize,
                    col: col as usize,
                })
            } else {
                None
            }
        })
    })
}

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// A game in progress: the hidden minefield plus the agent's beliefs about it.
///
/// The agent side only ever sees `(cell, count)` observations for cells the
/// session has confirmed are not mines; it is never handed the minefield.
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Session {
    pub field: Minefield,
    pub agent: Agent,
    pub state: GameState,
}

impl Session {
    pub fn new(height: usize, width: usize, total_mines: usize) -> anyhow::Result<Self> {
        let field = Minefield::generate(height, width, total_mines, &mut rand::rng())?;
        Ok(Session {
            field,
            agent: Agent::new(height, width),
            state: GameState::Playing,
        })
    }

    /// Plays one agent turn: a known-safe cell if there is one, otherwise a
    /// random unplayed cell that is not a known mine.
    ///
    /// Returns the cell played, or `None` when no playable cell remains
    /// (every unplayed cell is a known mine, i.e. the board is cleared).
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<Option<Point>> {
        if self.state != GameState::Playing {
            anyhow::bail!("game_ended");
        }

        let cell = match self
            .agent
            .make_safe_move()
            .or_else(|| self.agent.make_random_move(rng))
        {
            Some(cell) => cell,
            None => {
                self.state = GameState::Won;
                return Ok(None);
            }
        };

        if self.field.is_mine(cell) {
            self.state = GameState::Lost;
            return Ok(Some(cell));
        }

        let count = self.field.nearby_mines(cell);
        self.agent
            .observe(cell, count)
            .with_context(|| format!("observation at {cell:?} broke the knowledge base"))?;

        if self.field.is_cleared(self.agent.moves_made.len()) {
            self.state = GameState::Won;
        }

        Ok(Some(cell))
    }

    /// Deserializes a session from bytes.
    pub fn deserialize(bts: &Vec<u8>) -> Self {
        bcs::from_bytes(bts).unwrap()
    }

    /// Serializes the session to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        bcs::to_bytes(self).unwrap()
    }
}

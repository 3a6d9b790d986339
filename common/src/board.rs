use crate::{Point, neighbors};
use rand::Rng;
use std::collections::HashSet;

/// Ground truth for one game: where the mines actually are.
///
/// The mine set is private on purpose. The agent deduces everything from
/// per-cell observations, so nothing outside this module may read the layout.
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Minefield {
    pub height: usize,
    pub width: usize,
    mines: HashSet<Point>,
}

impl Minefield {
    /// Places `total_mines` mines uniformly at random on a fresh board.
    pub fn generate<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        total_mines: usize,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(height > 0 && width > 0, "board must have positive dimensions");
        anyhow::ensure!(
            total_mines < height * width,
            "total mines must be less than the number of cells on the board"
        );

        let mut mines = HashSet::new();
        while mines.len() != total_mines {
            mines.insert(Point {
                row: rng.random_range(0..height),
                col: rng.random_range(0..width),
            });
        }

        Ok(Minefield {
            height,
            width,
            mines,
        })
    }

    /// Builds a board with a fixed layout, for reproducible games and tests.
    pub fn with_mines(
        height: usize,
        width: usize,
        mines: impl IntoIterator<Item = Point>,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(height > 0 && width > 0, "board must have positive dimensions");

        let mines: HashSet<Point> = mines.into_iter().collect();
        anyhow::ensure!(
            mines
                .iter()
                .all(|cell| cell.row < height && cell.col < width),
            "mine placed outside the board"
        );
        anyhow::ensure!(
            mines.len() < height * width,
            "total mines must be less than the number of cells on the board"
        );

        Ok(Minefield {
            height,
            width,
            mines,
        })
    }

    pub fn is_mine(&self, cell: Point) -> bool {
        self.mines.contains(&cell)
    }

    pub fn total_mines(&self) -> usize {
        self.mines.len()
    }

    /// The number of mines within one row and column of `cell`, not counting
    /// the cell itself. This is the observation handed to the agent when a
    /// safe cell is played.
    pub fn nearby_mines(&self, cell: Point) -> u8 {
        neighbors(self.height, self.width, cell)
            .filter(|neighbor| self.mines.contains(neighbor))
            .count() as u8
    }

    /// The game is cleared once every non-mine cell has been played.
    pub fn is_cleared(&self, cells_played: usize) -> bool {
        cells_played + self.mines.len() == self.height * self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_places_exact_count() {
        let mut rng = rand::rng();
        let field = Minefield::generate(8, 8, 8, &mut rng).unwrap();

        assert_eq!(field.total_mines(), 8);

        let on_board = (0..8)
            .flat_map(|row| (0..8).map(move |col| Point { row, col }))
            .filter(|&cell| field.is_mine(cell))
            .count();
        assert_eq!(on_board, 8);
    }

    #[test]
    fn test_generate_rejects_full_board() {
        let mut rng = rand::rng();
        assert!(Minefield::generate(3, 3, 9, &mut rng).is_err());
        assert!(Minefield::generate(0, 3, 0, &mut rng).is_err());
    }

    #[test]
    fn test_nearby_mines_counts_neighborhood_only() {
        let field = Minefield::with_mines(
            3,
            3,
            [Point { row: 2, col: 2 }, Point { row: 0, col: 0 }],
        )
        .unwrap();

        // (1,1) touches both mines
        assert_eq!(field.nearby_mines(Point { row: 1, col: 1 }), 2);
        // (0,1) touches only the corner mine
        assert_eq!(field.nearby_mines(Point { row: 0, col: 1 }), 1);
        // (0,2) touches neither
        assert_eq!(field.nearby_mines(Point { row: 0, col: 2 }), 0);
        // A mine's own cell is not counted: (2,2)'s neighborhood holds no
        // mine, so a self-counting bug would show up as 1 here
        assert_eq!(field.nearby_mines(Point { row: 2, col: 2 }), 0);
    }

    #[test]
    fn test_with_mines_rejects_out_of_bounds() {
        assert!(Minefield::with_mines(3, 3, [Point { row: 3, col: 0 }]).is_err());
    }

    #[test]
    fn test_is_cleared() {
        let field = Minefield::with_mines(3, 3, [Point { row: 2, col: 2 }]).unwrap();
        assert!(!field.is_cleared(0));
        assert!(!field.is_cleared(7));
        assert!(field.is_cleared(8));
    }
}

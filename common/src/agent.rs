use crate::{Point, neighbors};
use anyhow::Context;
use itertools::Itertools;
use rand::Rng;
use rand::prelude::IndexedRandom;
use std::collections::{BTreeSet, HashSet};

/// A logical statement about the board: exactly `count` of the cells in
/// `cells` are mines.
///
/// The cell set is kept in a `BTreeSet` so equality is order-independent,
/// which is what makes duplicate suppression in the knowledge base work.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Sentence {
    cells: BTreeSet<Point>,
    count: usize,
}

impl Sentence {
    /// A sentence claiming more mines than it has cells is a logic error, so
    /// construction refuses it up front.
    pub fn new(cells: impl IntoIterator<Item = Point>, count: usize) -> anyhow::Result<Self> {
        let cells: BTreeSet<Point> = cells.into_iter().collect();
        anyhow::ensure!(
            count <= cells.len(),
            "sentence claims {} mines among {} cells",
            count,
            cells.len()
        );
        Ok(Sentence { cells, count })
    }

    pub fn cells(&self) -> &BTreeSet<Point> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// An empty sentence carries no information and should be dropped.
    pub fn is_vacuous(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every remaining cell must be a mine when the count equals the set
    /// size. `None` means "no conclusion", which is distinct from an empty
    /// set of mines.
    pub fn resolved_mines(&self) -> Option<&BTreeSet<Point>> {
        (self.count == self.cells.len()).then_some(&self.cells)
    }

    /// Every remaining cell must be safe when the count is zero.
    pub fn resolved_safes(&self) -> Option<&BTreeSet<Point>> {
        (self.count == 0).then_some(&self.cells)
    }

    /// Bakes a known mine into the sentence: the cell leaves the set and the
    /// count drops by one. No-op if the cell is not in the set.
    pub fn reduce_for_mine(&mut self, cell: Point) -> anyhow::Result<()> {
        if self.cells.remove(&cell) {
            self.count = self.count.checked_sub(1).with_context(|| {
                format!("mine at {cell:?} contradicts a sentence counting zero mines")
            })?;
        }
        Ok(())
    }

    /// Bakes a known safe cell into the sentence: the cell leaves the set and
    /// the count is unchanged. No-op if the cell is not in the set.
    pub fn reduce_for_safe(&mut self, cell: Point) -> anyhow::Result<()> {
        if self.cells.remove(&cell) {
            anyhow::ensure!(
                self.count <= self.cells.len(),
                "safe cell {cell:?} leaves a sentence claiming {} mines among {} cells",
                self.count,
                self.cells.len()
            );
        }
        Ok(())
    }

    /// True when this sentence's cells strictly contain the other's.
    fn is_strict_superset_of(&self, other: &Sentence) -> bool {
        self.cells.len() > other.cells.len() && self.cells.is_superset(&other.cells)
    }

    /// Subset inference: if exactly `self.count` of a superset are mines and
    /// exactly `other.count` of a subset are mines, then exactly the
    /// difference of the counts are mines among the difference of the cells.
    fn subtract(&self, other: &Sentence) -> anyhow::Result<Sentence> {
        let cells: BTreeSet<Point> = self.cells.difference(&other.cells).copied().collect();
        let count = self
            .count
            .checked_sub(other.count)
            .context("subset sentence counts more mines than its superset")?;
        anyhow::ensure!(
            count <= cells.len(),
            "subset inference produced {} mines among {} cells",
            count,
            cells.len()
        );
        Ok(Sentence { cells, count })
    }
}

/// The knowledge-base engine: every classification it makes follows with
/// certainty from the observations it has been fed. It never sees the actual
/// mine layout.
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Agent {
    pub height: usize,
    pub width: usize,
    /// Cells the agent has already played. Grows monotonically.
    pub moves_made: HashSet<Point>,
    /// Cells known with certainty to be mine-free. Grows monotonically.
    pub safes: HashSet<Point>,
    /// Cells known with certainty to be mines. Grows monotonically.
    pub mines: HashSet<Point>,
    knowledge: Vec<Sentence>,
}

impl Agent {
    pub fn new(height: usize, width: usize) -> Self {
        Agent {
            height,
            width,
            moves_made: HashSet::new(),
            safes: HashSet::new(),
            mines: HashSet::new(),
            knowledge: Vec::new(),
        }
    }

    /// The live sentence store, for diagnostics and testing.
    pub fn knowledge(&self) -> &[Sentence] {
        &self.knowledge
    }

    /// Records that a cell is a mine and bakes that fact into every live
    /// sentence. Does not run closure; `observe` drives that.
    pub fn mark_mine(&mut self, cell: Point) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.safes.contains(&cell),
            "cell {cell:?} classified as both safe and mine"
        );
        self.mines.insert(cell);
        for sentence in &mut self.knowledge {
            sentence.reduce_for_mine(cell)?;
        }
        Ok(())
    }

    /// Records that a cell is safe and bakes that fact into every live
    /// sentence. Does not run closure; `observe` drives that.
    pub fn mark_safe(&mut self, cell: Point) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.mines.contains(&cell),
            "cell {cell:?} classified as both safe and mine"
        );
        self.safes.insert(cell);
        for sentence in &mut self.knowledge {
            sentence.reduce_for_safe(cell)?;
        }
        Ok(())
    }

    /// Feeds one turn's observation into the knowledge base: the played cell
    /// is safe and exactly `count` of its neighbors are mines.
    ///
    /// The caller must only report cells it has confirmed are not mines; the
    /// engine derives everything else. After folding the neighborhood into a
    /// new sentence this runs deduction to a fixed point.
    pub fn observe(&mut self, cell: Point, count: u8) -> anyhow::Result<()> {
        self.moves_made.insert(cell);
        self.mark_safe(cell)?;

        // Fold already-classified neighbors into the new sentence: known
        // mines lower the count, known safes just drop out.
        let mut adjusted = count as usize;
        let mut unknown = BTreeSet::new();
        for neighbor in neighbors(self.height, self.width, cell) {
            if self.mines.contains(&neighbor) {
                adjusted = adjusted.checked_sub(1).with_context(|| {
                    format!("observation at {cell:?} counts fewer mines than already known")
                })?;
            } else if !self.safes.contains(&neighbor) {
                unknown.insert(neighbor);
            }
        }

        if !unknown.is_empty() {
            self.insert_sentence(Sentence::new(unknown, adjusted)?);
        }

        self.run_closure()
    }

    /// Adds a sentence to the knowledge base unless it is vacuous or already
    /// present. Returns whether anything was added.
    fn insert_sentence(&mut self, sentence: Sentence) -> bool {
        if sentence.is_vacuous() || self.knowledge.contains(&sentence) {
            return false;
        }
        self.knowledge.push(sentence);
        true
    }

    /// Repeats resolution and subset inference until a full pass produces no
    /// new mark and no new sentence.
    ///
    /// Each pass reads an immutable snapshot and only then commits what it
    /// found, so the scan never observes its own mutations. Termination:
    /// every pass either grows the (bounded) sets of facts and sentences or
    /// changes nothing and stops.
    fn run_closure(&mut self) -> anyhow::Result<()> {
        loop {
            let mut changed = false;

            // Resolution: collect every cell the current sentences classify.
            let mut found_mines: BTreeSet<Point> = BTreeSet::new();
            let mut found_safes: BTreeSet<Point> = BTreeSet::new();
            for sentence in &self.knowledge {
                if let Some(cells) = sentence.resolved_mines() {
                    found_mines.extend(cells.iter().filter(|&c| !self.mines.contains(c)));
                }
                if let Some(cells) = sentence.resolved_safes() {
                    found_safes.extend(cells.iter().filter(|&c| !self.safes.contains(c)));
                }
            }
            for cell in found_mines {
                self.mark_mine(cell)?;
                changed = true;
            }
            for cell in found_safes {
                self.mark_safe(cell)?;
                changed = true;
            }

            // Reductions may have emptied sentences out or collapsed two
            // distinct sentences into the same statement; neither is kept.
            let mut unique: Vec<Sentence> = Vec::with_capacity(self.knowledge.len());
            for sentence in self.knowledge.drain(..) {
                if !sentence.is_vacuous() && !unique.contains(&sentence) {
                    unique.push(sentence);
                }
            }
            self.knowledge = unique;

            // Subset inference over every pair in the snapshot.
            let mut derived = Vec::new();
            for (a, b) in self.knowledge.iter().tuple_combinations() {
                if a.is_strict_superset_of(b) {
                    derived.push(a.subtract(b)?);
                } else if b.is_strict_superset_of(a) {
                    derived.push(b.subtract(a)?);
                }
            }
            for sentence in derived {
                if self.insert_sentence(sentence) {
                    changed = true;
                }
            }

            if !changed {
                return Ok(());
            }
        }
    }

    /// Any known-safe cell that has not been played yet. Read-only.
    pub fn make_safe_move(&self) -> Option<Point> {
        self.safes
            .iter()
            .find(|&cell| !self.moves_made.contains(cell))
            .copied()
    }

    /// A uniformly random cell that has not been played and is not a known
    /// mine. `None` only when no such cell exists anywhere on the board.
    pub fn make_random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Point> {
        let candidates: Vec<Point> = (0..self.height)
            .flat_map(|row| (0..self.width).map(move |col| Point { row, col }))
            .filter(|cell| !self.moves_made.contains(cell) && !self.mines.contains(cell))
            .collect();
        candidates.choose(rng).copied()
    }
}

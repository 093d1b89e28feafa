//! Local rule automata over a fixed Moore neighborhood (center excluded).
//!
//! Neighbors outside the grid never participate; there is no wraparound.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::grid::{Boundary, Grid};

/// Combines the neighbor values of one cell into its next value.
pub trait CellRule: Sync {
    type Cell: Copy + Default + Send + Sync;

    fn evaluate(&self, neighbors: impl Iterator<Item = Self::Cell>) -> Self::Cell;
}

/// Next state is the XOR of all neighbors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Parity;

impl CellRule for Parity {
    type Cell = bool;

    #[inline]
    fn evaluate(&self, neighbors: impl Iterator<Item = Self::Cell>) -> bool {
        neighbors.fold(false, |acc, v| acc ^ v)
    }
}

/// Next value is the scaled neighbor sum. A sum above 1.0 overflows back
/// to 0.0 instead of saturating.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decay {
    pub scale: f32,
}

impl CellRule for Decay {
    type Cell = f32;

    #[inline]
    fn evaluate(&self, neighbors: impl Iterator<Item = Self::Cell>) -> f32 {
        let sum: f32 = neighbors.map(|v| v * self.scale).sum();
        if sum > 1.0 { 0.0 } else { sum }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neighborhood {
    /// 3x3 minus center, 8 neighbors.
    #[default]
    Moore3,
    /// 5x5 minus center, 24 neighbors.
    Moore5,
}

impl Neighborhood {
    pub fn radius(self) -> i64 {
        match self {
            Neighborhood::Moore3 => 1,
            Neighborhood::Moore5 => 2,
        }
    }

    pub fn offsets(self) -> Vec<(i64, i64)> {
        let r = self.radius();
        (-r..=r)
            .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
            .filter(|&d| d != (0, 0))
            .collect()
    }
}

pub struct CellularRuleEngine<R> {
    pub rule: R,
    offsets: Vec<(i64, i64)>,
}

impl<R: CellRule> CellularRuleEngine<R> {
    pub fn new(rule: R, neighborhood: Neighborhood) -> Self {
        Self {
            rule,
            offsets: neighborhood.offsets(),
        }
    }

    pub fn apply(&self, input: &Grid<R::Cell>) -> Grid<R::Cell> {
        let w = input.w();
        let mut out = input.map(|_| R::Cell::default());

        out.data_mut()
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, cell) in row.iter_mut().enumerate() {
                    let (x, y) = (x as i64, y as i64);
                    let neighbors = self
                        .offsets
                        .iter()
                        .filter_map(|&(dx, dy)| input.sample(x + dx, y + dy, Boundary::ClampedSkip));
                    *cell = self.rule.evaluate(neighbors);
                }
            });

        out
    }
}

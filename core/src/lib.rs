#![no_std]

extern crate alloc;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use error::*;
pub use generator::*;
pub use types::*;

mod board;
mod cell;
mod error;
mod generator;
mod types;

/// Board dimensions and mine count, validated at construction.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub width: Coord,
    pub height: Coord,
    pub mines: usize,
}

impl BoardConfig {
    pub const fn new_unchecked(width: Coord, height: Coord, mines: usize) -> Self {
        Self {
            width,
            height,
            mines,
        }
    }

    /// Rejects configurations with more mines than cells before anything is
    /// allocated.
    pub fn new(width: Coord, height: Coord, mines: usize) -> Result<Self> {
        let config = Self::new_unchecked(width, height, mines);
        if mines > config.total_cells() {
            return Err(BoardError::InvalidConfiguration);
        }
        Ok(config)
    }

    pub const fn size(&self) -> Coord2 {
        (self.width, self.height)
    }

    pub const fn total_cells(&self) -> usize {
        self.width.saturating_mul(self.height)
    }
}

/// Mine placement produced by a [`LayoutGenerator`] and consumed by
/// [`Board::new`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: usize,
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count();
        Self {
            mine_mask,
            mine_count,
        }
    }

    /// Deterministic construction from explicit mine positions.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(BoardError::OutOfBounds);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.mine_mask.dim();
        (dim.1, dim.0)
    }

    pub fn total_cells(&self) -> usize {
        self.mine_mask.len()
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self.mine_mask[coords.to_nd_index()]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.mine_mask
            .iter_neighbors(coords)
            .filter(|&pos| self.mine_mask[pos.to_nd_index()])
            .count() as u8
    }
}

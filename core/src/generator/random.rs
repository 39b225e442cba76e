use ndarray::Array2;
use rand::prelude::*;

use super::*;

/// Seeded uniform placement: every subset of `mines` positions is equally
/// likely.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomLayout {
    seed: u64,
}

impl RandomLayout {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl LayoutGenerator for RandomLayout {
    fn generate(self, config: BoardConfig) -> MineLayout {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        sample_layout(config, &mut rng)
    }
}

/// Draws `config.mines` distinct positions from `rng` without replacement.
pub fn sample_layout(config: BoardConfig, rng: &mut impl Rng) -> MineLayout {
    let total_cells = config.total_cells();
    let shape = config.size().to_nd_index();

    // full boards need no draw
    if config.mines >= total_cells {
        if config.mines > total_cells {
            log::warn!(
                "Layout already full, requested {} mines but only {} cells fit",
                config.mines,
                total_cells
            );
        }
        return MineLayout::from_mine_mask(Array2::from_elem(shape, true));
    }

    let mut mine_mask: Array2<bool> = Array2::default(shape);
    {
        let cells = mine_mask.as_slice_mut().expect("layout should be standard");
        for place in rand::seq::index::sample(rng, total_cells, config.mines) {
            cells[place] = true;
        }
    }

    MineLayout::from_mine_mask(mine_mask)
}

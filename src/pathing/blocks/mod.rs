//! The fine grid is partitioned into square Blocks which act as the nodes of
//! the coarse graph used by the [PathEstimator].
//!
//! Blocks are indexed from the top-left of the map in `(column, row)` form.
//! When the grid is not an exact multiple of the block size the last column
//! and row of blocks are narrower:
//!
//! ```text
//!  block_size = 4, grid 10x6
//!  _______________________________
//! |  (0,0)    |  (1,0)    | (2,0) |
//! |           |           |       |
//! |___________|___________|_______|
//! |  (0,1)    |  (1,1)    | (2,1) |
//! |___________|___________|_______|
//! ```
//!

pub mod path_estimator;

use crate::prelude::*;
use bevy::prelude::*;

/// Unique ID of a block
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct BlockID((u32, u32));

impl BlockID {
	/// Create a new instance of [BlockID]
	pub fn new(column: u32, row: u32) -> Self {
		BlockID((column, row))
	}
	/// Get the block `(column, row)` tuple
	pub fn get(&self) -> (u32, u32) {
		self.0
	}
	/// Get the block column
	pub fn get_column(&self) -> u32 {
		self.0 .0
	}
	/// Get the block row
	pub fn get_row(&self) -> u32 {
		self.0 .1
	}
}

/// How a fine grid is divided into blocks
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct BlockLayout {
	/// The partitioned grid
	grid: GridIndex,
	/// Fine cells along each side of a full block
	block_size: u32,
	/// Number of blocks along `x` and `z`
	count: (u32, u32),
}

impl BlockLayout {
	/// Create a new instance of [BlockLayout]
	pub fn new(grid: GridIndex, block_size: u32) -> Self {
		if block_size < 2 {
			panic!("Block size must be at least 2, found {}", block_size);
		}
		let count = (
			grid.get_length().div_ceil(block_size),
			grid.get_depth().div_ceil(block_size),
		);
		BlockLayout {
			grid,
			block_size,
			count,
		}
	}
	pub fn get_grid(&self) -> &GridIndex {
		&self.grid
	}
	pub fn get_block_size(&self) -> u32 {
		self.block_size
	}
	/// Number of blocks along `x` and `z`
	pub fn get_count(&self) -> (u32, u32) {
		self.count
	}
	/// Total number of blocks
	pub fn block_count(&self) -> usize {
		self.count.0 as usize * self.count.1 as usize
	}
	/// Flat index of a block
	pub fn block_index(&self, block: BlockID) -> usize {
		block.get_row() as usize * self.count.0 as usize + block.get_column() as usize
	}
	/// Block at a flat index
	pub fn block_from_index(&self, index: usize) -> BlockID {
		let columns = self.count.0 as usize;
		BlockID::new((index % columns) as u32, (index / columns) as u32)
	}
	/// Does the block exist in this layout
	pub fn contains(&self, block: BlockID) -> bool {
		block.get_column() < self.count.0 && block.get_row() < self.count.1
	}
	/// The block containing a fine cell, cells off the grid are clamped
	pub fn block_of(&self, cell: GridCell) -> BlockID {
		let cell = self.grid.clamp(cell.get_column() as i64, cell.get_row() as i64);
		BlockID::new(
			cell.get_column() / self.block_size,
			cell.get_row() / self.block_size,
		)
	}
	/// The block containing a world position
	pub fn block_at(&self, position: Vec3) -> BlockID {
		self.block_of(self.grid.cell_from_world_pos(position))
	}
	/// Inclusive corner cells of a block, [None] if it is not part of the layout
	pub fn block_bounds(&self, block: BlockID) -> Option<(GridCell, GridCell)> {
		if !self.contains(block) {
			error!("Block {:?} is outside of the layout {:?}", block.get(), self.count);
			return None;
		}
		let min_x = block.get_column() * self.block_size;
		let min_z = block.get_row() * self.block_size;
		let max_x = (min_x + self.block_size - 1).min(self.grid.get_length() - 1);
		let max_z = (min_z + self.block_size - 1).min(self.grid.get_depth() - 1);
		Some((GridCell::new(min_x, min_z), GridCell::new(max_x, max_z)))
	}
	/// The neighbouring block in a direction, [None] at the edge of the map
	pub fn neighbour(&self, block: BlockID, ordinal: Ordinal) -> Option<BlockID> {
		ordinal
			.step_from(block.get(), self.count.0, self.count.1)
			.map(|(x, z)| BlockID::new(x, z))
	}
	/// Every neighbouring block with the direction towards it
	pub fn neighbours(&self, block: BlockID) -> Vec<(Ordinal, BlockID)> {
		Ordinal::ALL
			.into_iter()
			.filter_map(|o| self.neighbour(block, o).map(|n| (o, n)))
			.collect()
	}
	/// Every block overlapping the inclusive rectangle of cells
	pub fn blocks_touching(&self, min: GridCell, max: GridCell) -> Vec<BlockID> {
		let low = self.block_of(min);
		let high = self.block_of(max);
		let mut blocks = Vec::new();
		for row in low.get_row().min(high.get_row())..=low.get_row().max(high.get_row()) {
			for column in
				low.get_column().min(high.get_column())..=low.get_column().max(high.get_column())
			{
				blocks.push(BlockID::new(column, row));
			}
		}
		blocks
	}
}

//! The fine resolution grid the solver works on.
//!
//! The engine heightmap is down-sampled by an integer `resolution` so that one
//! fine cell spans `resolution` heightmap squares along each axis. Cells are
//! indexed from the top-left (`-x`, `-z`) corner of the map in `(column, row)`
//! form and flattened as `row * length + column`:
//!
//! ```text
//!   column →
//!  ___________________
//! |_0_|_1_|_2_|_3_|_4_|  row 0
//! |_5_|_6_|_7_|_8_|_9_|  row 1
//! |10_|11_|12_|13_|14_|  row 2
//! ```
//!

pub mod heightmap;
pub mod traversability;

use crate::prelude::*;
use bevy::prelude::*;

/// A `(column, row)` position within the fine grid
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct GridCell((u32, u32));

impl GridCell {
	/// Create a new instance of [GridCell]
	pub fn new(column: u32, row: u32) -> Self {
		GridCell((column, row))
	}
	/// Get the `(column, row)` tuple
	pub fn get(&self) -> (u32, u32) {
		self.0
	}
	/// Get the column
	pub fn get_column(&self) -> u32 {
		self.0 .0
	}
	/// Get the row
	pub fn get_row(&self) -> u32 {
		self.0 .1
	}
}

/// Coordinate and index conversions for a fine grid of a given size and
/// resolution. Every conversion is total: anything outside the grid is clamped
/// to the nearest border cell because units frequently report positions
/// slightly off the map
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Component, Default, Clone, Copy, Debug, PartialEq, Reflect)]
pub struct GridIndex {
	/// Number of fine cells along `x` and `z`
	size: (u32, u32),
	/// How many heightmap squares a fine cell spans along each axis
	resolution: u32,
}

impl GridIndex {
	/// Create a new instance of [GridIndex] from the dimensions of the engine
	/// heightmap (in squares) and the down-sampling `resolution`
	pub fn new(map_length: u32, map_depth: u32, resolution: u32) -> Self {
		if resolution == 0 {
			panic!("Grid resolution must be at least 1");
		}
		let length = map_length / resolution;
		let depth = map_depth / resolution;
		if length == 0 || depth == 0 {
			panic!(
				"Map dimensions `({}, {})` are too small for a resolution of {}",
				map_length, map_depth, resolution
			);
		}
		GridIndex {
			size: (length, depth),
			resolution,
		}
	}
	/// Get the `(length, depth)` of the grid in cells
	pub fn get_size(&self) -> (u32, u32) {
		self.size
	}
	/// Number of cells along `x`
	pub fn get_length(&self) -> u32 {
		self.size.0
	}
	/// Number of cells along `z`
	pub fn get_depth(&self) -> u32 {
		self.size.1
	}
	pub fn get_resolution(&self) -> u32 {
		self.resolution
	}
	/// Total number of cells
	pub fn node_count(&self) -> usize {
		self.size.0 as usize * self.size.1 as usize
	}
	/// World units covered by one side of a cell
	pub fn cell_size(&self) -> f32 {
		SQUARE_SIZE * self.resolution as f32
	}
	/// Clamp a possibly out of range coordinate onto the grid
	pub fn clamp(&self, x: i64, z: i64) -> GridCell {
		let column = x.clamp(0, self.size.0 as i64 - 1) as u32;
		let row = z.clamp(0, self.size.1 as i64 - 1) as u32;
		GridCell::new(column, row)
	}
	/// Flatten a `(x, z)` coordinate into a node index
	pub fn to_index(&self, x: i64, z: i64) -> usize {
		let cell = self.clamp(x, z);
		self.cell_to_index(cell)
	}
	/// Flatten a [GridCell] into a node index
	pub fn cell_to_index(&self, cell: GridCell) -> usize {
		let column = cell.get_column().min(self.size.0 - 1) as usize;
		let row = cell.get_row().min(self.size.1 - 1) as usize;
		row * self.size.0 as usize + column
	}
	/// Expand a node index into its [GridCell]
	pub fn to_coord(&self, node: usize) -> GridCell {
		let node = node.min(self.node_count() - 1);
		let length = self.size.0 as usize;
		GridCell::new((node % length) as u32, (node / length) as u32)
	}
	/// World position of the centre of a node, `y` is left at `0.0` as the
	/// grid carries no height
	pub fn to_world_pos(&self, node: usize) -> Vec3 {
		let cell = self.to_coord(node);
		let half = self.cell_size() / 2.0;
		Vec3::new(
			cell.get_column() as f32 * self.cell_size() + half,
			0.0,
			cell.get_row() as f32 * self.cell_size() + half,
		)
	}
	/// Find the node a world position sits on, using the `x` and `z` axes
	pub fn from_world_pos(&self, position: Vec3) -> usize {
		let cell = self.cell_from_world_pos(position);
		self.cell_to_index(cell)
	}
	/// Find the [GridCell] a world position sits on
	pub fn cell_from_world_pos(&self, position: Vec3) -> GridCell {
		let x = (position.x / self.cell_size()).floor() as i64;
		let z = (position.z / self.cell_size()).floor() as i64;
		self.clamp(x, z)
	}
	/// Is the cell part of the outermost ring of the grid
	pub fn is_border(&self, cell: GridCell) -> bool {
		cell.get_column() == 0
			|| cell.get_row() == 0
			|| cell.get_column() >= self.size.0 - 1
			|| cell.get_row() >= self.size.1 - 1
	}
	/// Node index of the neighbour in a direction, [None] when it would fall
	/// off the grid
	pub fn neighbour(&self, node: usize, ordinal: Ordinal) -> Option<usize> {
		let cell = self.to_coord(node);
		ordinal
			.step_from(cell.get(), self.size.0, self.size.1)
			.map(|(x, z)| self.cell_to_index(GridCell::new(x, z)))
	}
}

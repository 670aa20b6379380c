//! Useful structures and tools shared by the grids, solver and block graph
//!

use bevy::prelude::*;

/// World units spanned by one engine heightmap square
pub const SQUARE_SIZE: f32 = 8.0;
/// Default number of fine cells along each side of a [crate::prelude::BlockID]
pub const BLOCK_SIZE: u32 = 32;
/// Cost multiplier of a diagonal step relative to an axis step
pub const DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;
/// Cost recorded for a coarse edge whose bounded search found no path. Coarse
/// searches skip any edge at or above this value
pub const UNREACHABLE_COST: f32 = 1.0e7;

/// The 8 directions of movement between neighbouring cells or blocks
///
/// ```text
///  NW   N   NE
///    \  |  /
///  W -- x -- E
///    /  |  \
///  SW   S   SE
/// ```
///
/// The first four are axis moves, the last four are diagonals. `North` is the
/// `-z` direction
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Reflect)]
pub enum Ordinal {
	North,
	East,
	South,
	West,
	NorthEast,
	SouthEast,
	SouthWest,
	NorthWest,
}

impl Ordinal {
	/// Every direction, axis moves first
	pub const ALL: [Ordinal; 8] = [
		Ordinal::North,
		Ordinal::East,
		Ordinal::South,
		Ordinal::West,
		Ordinal::NorthEast,
		Ordinal::SouthEast,
		Ordinal::SouthWest,
		Ordinal::NorthWest,
	];
	/// The `(dx, dz)` step taken when moving in this direction
	pub fn offset(&self) -> (i32, i32) {
		match self {
			Ordinal::North => (0, -1),
			Ordinal::East => (1, 0),
			Ordinal::South => (0, 1),
			Ordinal::West => (-1, 0),
			Ordinal::NorthEast => (1, -1),
			Ordinal::SouthEast => (1, 1),
			Ordinal::SouthWest => (-1, 1),
			Ordinal::NorthWest => (-1, -1),
		}
	}
	/// Is the direction a diagonal
	pub fn is_diagonal(&self) -> bool {
		matches!(
			self,
			Ordinal::NorthEast | Ordinal::SouthEast | Ordinal::SouthWest | Ordinal::NorthWest
		)
	}
	/// Length of a single step in this direction measured in cells
	pub fn step_cost(&self) -> f32 {
		if self.is_diagonal() {
			DIAGONAL_COST
		} else {
			1.0
		}
	}
	/// Get the opposite direction
	pub fn inverse(&self) -> Ordinal {
		match self {
			Ordinal::North => Ordinal::South,
			Ordinal::East => Ordinal::West,
			Ordinal::South => Ordinal::North,
			Ordinal::West => Ordinal::East,
			Ordinal::NorthEast => Ordinal::SouthWest,
			Ordinal::SouthEast => Ordinal::NorthWest,
			Ordinal::SouthWest => Ordinal::NorthEast,
			Ordinal::NorthWest => Ordinal::SouthEast,
		}
	}
	/// Position in [Ordinal::ALL], used to index per-direction arrays
	pub fn index(&self) -> usize {
		match self {
			Ordinal::North => 0,
			Ordinal::East => 1,
			Ordinal::South => 2,
			Ordinal::West => 3,
			Ordinal::NorthEast => 4,
			Ordinal::SouthEast => 5,
			Ordinal::SouthWest => 6,
			Ordinal::NorthWest => 7,
		}
	}
	/// Step from `(column, row)` in this direction, [None] if the result
	/// falls outside a `length` by `depth` grid
	pub fn step_from(&self, cell: (u32, u32), length: u32, depth: u32) -> Option<(u32, u32)> {
		let (dx, dz) = self.offset();
		let x = cell.0 as i64 + dx as i64;
		let z = cell.1 as i64 + dz as i64;
		if x < 0 || z < 0 || x >= length as i64 || z >= depth as i64 {
			None
		} else {
			Some((x as u32, z as u32))
		}
	}
	/// Find the direction of travel from one cell to an adjacent one
	pub fn between(from: (u32, u32), to: (u32, u32)) -> Option<Ordinal> {
		let dx = to.0 as i64 - from.0 as i64;
		let dz = to.1 as i64 - from.1 as i64;
		Ordinal::ALL.into_iter().find(|o| {
			let (ox, oz) = o.offset();
			ox as i64 == dx && oz as i64 == dz
		})
	}
}

/// Octile distance between two cells, the number of axis steps plus `√2` for
/// each diagonal step of an unobstructed 8-directional walk
pub fn octile_distance(a: (u32, u32), b: (u32, u32)) -> f32 {
	let dx = a.0.abs_diff(b.0) as f32;
	let dz = a.1.abs_diff(b.1) as f32;
	let (short, long) = if dx < dz { (dx, dz) } else { (dz, dx) };
	(long - short) + DIAGONAL_COST * short
}

//! Goal sets describing a ring of cells at a given radius around a target.
//!
//! The ring is traced from the table of half-widths
//! `xend(dz) = floor(sqrt(r² - dz²))`, taking each `(xend(dz), dz)` together
//! with its transpose so that both octants of a quadrant stay 8-connected.
//! Only `O(r)` cells are visited:
//!
//! ```text
//! r = 3
//!  . . . x . . .
//!  . x x . x x .
//!  . x . . . x .
//!  x . . o . . x
//!  . x . . . x .
//!  . x x . x x .
//!  . . . x . . .
//! ```
//!

use crate::prelude::*;

/// Offsets `(dx, dz)` of every cell on the ring of `radius`, sorted and free
/// of duplicates. A radius of `0` is the centre alone
pub fn ring_offsets(radius: u32) -> Vec<(i32, i32)> {
	let r = radius as i32;
	if r == 0 {
		return vec![(0, 0)];
	}
	let mut offsets = Vec::with_capacity(radius as usize * 16);
	for dz in 0..=r {
		let xend = ((r * r - dz * dz) as f32).sqrt() as i32;
		for (x, z) in [(xend, dz), (dz, xend)] {
			offsets.push((x, z));
			offsets.push((-x, z));
			offsets.push((x, -z));
			offsets.push((-x, -z));
		}
	}
	offsets.sort_unstable();
	offsets.dedup();
	offsets
}

/// Node indices of the ring of `radius` cells around `centre`, clamped onto
/// the grid and free of duplicates
pub fn ring_around(grid: &GridIndex, centre: GridCell, radius: u32) -> Vec<usize> {
	let mut nodes: Vec<usize> = ring_offsets(radius)
		.into_iter()
		.map(|(dx, dz)| {
			grid.to_index(
				centre.get_column() as i64 + dx as i64,
				centre.get_row() as i64 + dz as i64,
			)
		})
		.collect();
	nodes.sort_unstable();
	nodes.dedup();
	nodes
}

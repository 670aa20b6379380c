//! Presents a [TraversabilityMap] to the solver as a [SearchGraph] for one
//! movement class, optionally confined to a rectangle of cells.
//!
//! Moving into a cell costs the step length (`1` or `√2`) multiplied by the
//! cell cost supplied by a [CostMap]. The heuristic is the octile distance
//! scaled by the cheapest possible cell cost so it never overestimates
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Supplies the cost multiplier of entering a cell
pub trait CostMap {
	/// Multiplier applied to the step length when entering `node`
	fn cell_cost(&self, node: usize) -> f32;
	/// Lowest value [CostMap::cell_cost] can return
	fn min_cost(&self) -> f32 {
		1.0
	}
}

/// Every cell costs the same
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformCost;

impl CostMap for UniformCost {
	fn cell_cost(&self, _node: usize) -> f32 {
		1.0
	}
}

/// Averages a base movement cost with the choke overlay value of each cell so
/// that paths shy away from heavily used cells
#[derive(Clone, Copy, Debug)]
pub struct ChokeWeightedCost<'a> {
	/// Cost of open terrain
	base: f32,
	/// Accumulated choke values of one movement class
	overlay: &'a [f32],
}

impl<'a> ChokeWeightedCost<'a> {
	/// Create a new instance of [ChokeWeightedCost]
	pub fn new(base: f32, overlay: &'a [f32]) -> Self {
		ChokeWeightedCost { base, overlay }
	}
}

impl CostMap for ChokeWeightedCost<'_> {
	fn cell_cost(&self, node: usize) -> f32 {
		let choke = self.overlay.get(node).copied().unwrap_or(CHOKE_BASELINE);
		(self.base + choke) * 0.5
	}
	fn min_cost(&self) -> f32 {
		(self.base + CHOKE_BASELINE) * 0.5
	}
}

/// A movement class view of a [TraversabilityMap]
pub struct TerrainGraph<'a, C: CostMap> {
	/// Terrain being searched
	map: &'a TraversabilityMap,
	/// Bits a cell must carry to be entered
	required: MoveClassMask,
	/// Per cell cost multiplier
	cost: C,
	/// Inclusive corners of the searchable area
	bounds: Option<(GridCell, GridCell)>,
}

impl<'a> TerrainGraph<'a, UniformCost> {
	/// Create a [TerrainGraph] where every passable cell costs the same
	pub fn uniform(map: &'a TraversabilityMap, class: MoveClassId) -> Self {
		TerrainGraph::new(map, class, UniformCost)
	}
}

impl<'a, C: CostMap> TerrainGraph<'a, C> {
	/// Create a new instance of [TerrainGraph]
	pub fn new(map: &'a TraversabilityMap, class: MoveClassId, cost: C) -> Self {
		TerrainGraph {
			map,
			required: MoveClassMask::single(class),
			cost,
			bounds: None,
		}
	}
	/// Confine the search to the inclusive rectangle between `min` and `max`
	pub fn with_bounds(mut self, min: GridCell, max: GridCell) -> Self {
		self.bounds = Some((min, max));
		self
	}
	/// Is a cell within the search rectangle
	fn in_bounds(&self, cell: GridCell) -> bool {
		match self.bounds {
			Some((min, max)) => {
				cell.get_column() >= min.get_column()
					&& cell.get_column() <= max.get_column()
					&& cell.get_row() >= min.get_row()
					&& cell.get_row() <= max.get_row()
			}
			None => true,
		}
	}
}

impl<C: CostMap> SearchGraph for TerrainGraph<'_, C> {
	fn node_count(&self) -> usize {
		self.map.get_grid().node_count()
	}
	fn is_passable(&self, node: usize) -> bool {
		node < self.node_count()
			&& self.map.get_mask(node).contains_all(self.required)
			&& self.in_bounds(self.map.get_grid().to_coord(node))
	}
	fn neighbours(&self, node: usize, edges: &mut Vec<(usize, f32)>) {
		let grid = self.map.get_grid();
		for ordinal in Ordinal::ALL {
			if let Some(next) = grid.neighbour(node, ordinal) {
				if self.is_passable(next) {
					edges.push((next, ordinal.step_cost() * self.cost.cell_cost(next)));
				}
			}
		}
	}
	fn heuristic(&self, from: usize, to: usize) -> f32 {
		let grid = self.map.get_grid();
		octile_distance(grid.to_coord(from).get(), grid.to_coord(to).get()) * self.cost.min_cost()
	}
	fn world_pos(&self, node: usize) -> Vec3 {
		let mut pos = self.map.get_grid().to_world_pos(node);
		pos.y = self.map.get_height(node);
		pos
	}
}

//! Coarse graph of blocks used to estimate travel costs cheaply.
//!
//! For every movement class each block elects a centre cell. Every block then
//! caches the cost of travelling from its centre to the centre of each of its
//! (up to 8) neighbours. That cost comes from a fine search confined to the
//! rectangle covering both blocks, which keeps each edge build small
//! regardless of map size:
//!
//! ```text
//!  ___________ ___________
//! |           |           |
//! |     a ----|----> b    |   search box = block A ∪ block B
//! |___________|___________|
//! ```
//!
//! A pair of centres with no route inside the box is stored as
//! [UNREACHABLE_COST], a large finite value rather than a distinct state.
//! Coarse searches skip such edges
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Centres and cached edge costs of every block for one movement class
#[derive(Clone, Debug, Default)]
struct ClassBlocks {
	/// The class these blocks were built for
	class: MoveClassId,
	/// Fine node used as the centre of each block
	centres: Vec<usize>,
	/// Cost from the centre of each block to the centre of its neighbour in
	/// each [Ordinal] direction
	costs: Vec<[f32; 8]>,
}

/// Block graph of each movement class
#[derive(Component, Clone, Debug, Default)]
pub struct PathEstimator {
	/// Partitioning of the fine grid
	layout: BlockLayout,
	/// Per class centres and costs
	classes: Vec<ClassBlocks>,
	/// Blocks awaiting a rebuild
	dirty: Vec<bool>,
}

impl PathEstimator {
	/// Create a new instance of [PathEstimator], electing centres and
	/// building every edge of each class in `classes`
	pub fn new(
		map: &TraversabilityMap,
		block_size: u32,
		classes: &[MoveClassId],
		solver: &mut AStarSolver,
	) -> Self {
		let layout = BlockLayout::new(*map.get_grid(), block_size);
		let block_count = layout.block_count();
		let mut estimator = PathEstimator {
			layout,
			classes: classes
				.iter()
				.map(|class| ClassBlocks {
					class: *class,
					centres: vec![0; block_count],
					costs: vec![[UNREACHABLE_COST; 8]; block_count],
				})
				.collect(),
			dirty: vec![false; block_count],
		};
		for slot in 0..estimator.classes.len() {
			for index in 0..block_count {
				let block = estimator.layout.block_from_index(index);
				estimator.classes[slot].centres[index] =
					estimator.find_centre(map, block, estimator.classes[slot].class);
			}
			for index in 0..block_count {
				let block = estimator.layout.block_from_index(index);
				for ordinal in Ordinal::ALL {
					estimator.build_edge(map, solver, slot, block, ordinal);
				}
			}
		}
		debug!(
			"Built path estimator of {:?} blocks for {} classes",
			estimator.layout.get_count(),
			estimator.classes.len()
		);
		estimator
	}
	pub fn get_layout(&self) -> &BlockLayout {
		&self.layout
	}
	/// Classes the estimator was built for
	pub fn get_classes(&self) -> Vec<MoveClassId> {
		self.classes.iter().map(|c| c.class).collect()
	}
	/// Fine node elected as the centre of a block for a class
	pub fn centre(&self, block: BlockID, class: MoveClassId) -> Option<usize> {
		let slot = self.slot(class)?;
		if !self.layout.contains(block) {
			return None;
		}
		Some(self.classes[slot].centres[self.layout.block_index(block)])
	}
	/// Cached cost from a block to its neighbour in a direction
	pub fn edge_cost(&self, block: BlockID, ordinal: Ordinal, class: MoveClassId) -> Option<f32> {
		let slot = self.slot(class)?;
		if !self.layout.contains(block) {
			return None;
		}
		Some(self.classes[slot].costs[self.layout.block_index(block)][ordinal.index()])
	}
	/// Is a block waiting for [PathEstimator::rebuild_dirty]
	pub fn is_dirty(&self, block: BlockID) -> bool {
		self.layout.contains(block) && self.dirty[self.layout.block_index(block)]
	}
	/// Flag every block overlapping the inclusive rectangle of changed cells
	pub fn mark_dirty(&mut self, min: GridCell, max: GridCell) {
		for block in self.layout.blocks_touching(min, max) {
			let index = self.layout.block_index(block);
			self.dirty[index] = true;
		}
	}
	/// Recompute the centres of dirty blocks and every edge whose search box
	/// overlaps a dirty block. Returns the rebuilt blocks
	pub fn rebuild_dirty(&mut self, map: &TraversabilityMap, solver: &mut AStarSolver) -> Vec<BlockID> {
		let dirty: Vec<BlockID> = (0..self.dirty.len())
			.filter(|i| self.dirty[*i])
			.map(|i| self.layout.block_from_index(i))
			.collect();
		if dirty.is_empty() {
			return dirty;
		}
		// a diagonal edge searches the 2x2 square of blocks around it so the
		// edges of neighbouring blocks may cross a dirty block too
		let mut stale = vec![[false; 8]; self.layout.block_count()];
		for block in dirty.iter() {
			let (bx, bz) = (block.get_column() as i64, block.get_row() as i64);
			for z in (bz - 1)..=(bz + 1) {
				for x in (bx - 1)..=(bx + 1) {
					if x < 0 || z < 0 {
						continue;
					}
					let source = BlockID::new(x as u32, z as u32);
					if !self.layout.contains(source) {
						continue;
					}
					for (ordinal, target) in self.layout.neighbours(source) {
						let (tx, tz) = (target.get_column() as i64, target.get_row() as i64);
						if x.min(tx) <= bx && bx <= x.max(tx) && z.min(tz) <= bz && bz <= z.max(tz) {
							stale[self.layout.block_index(source)][ordinal.index()] = true;
						}
					}
				}
			}
		}
		for slot in 0..self.classes.len() {
			let class = self.classes[slot].class;
			for block in dirty.iter() {
				let index = self.layout.block_index(*block);
				self.classes[slot].centres[index] = self.find_centre(map, *block, class);
			}
			for (index, ordinals) in stale.iter().enumerate() {
				let block = self.layout.block_from_index(index);
				for ordinal in Ordinal::ALL {
					if ordinals[ordinal.index()] {
						self.build_edge(map, solver, slot, block, ordinal);
					}
				}
			}
		}
		for block in dirty.iter() {
			let index = self.layout.block_index(*block);
			self.dirty[index] = false;
		}
		debug!("Rebuilt {} dirty blocks", dirty.len());
		dirty
	}
	/// Search the coarse graph between the blocks containing two world
	/// positions. Waypoints are block centres
	pub fn estimate(
		&self,
		map: &TraversabilityMap,
		solver: &mut AStarSolver,
		from: Vec3,
		to: Vec3,
		class: MoveClassId,
	) -> PathResult {
		let Some(graph) = self.graph(map, class) else {
			error!("Path estimator has no blocks for class {:?}", class);
			return PathResult::no_solution(false);
		};
		let start = self.layout.block_index(self.layout.block_at(from));
		let end = self.layout.block_index(self.layout.block_at(to));
		solver.solve(&graph, start, Goal::Single(end), None)
	}
	/// A [SearchGraph] view of the blocks of a class
	pub fn graph<'a>(&'a self, map: &'a TraversabilityMap, class: MoveClassId) -> Option<BlockGraph<'a>> {
		let slot = self.slot(class)?;
		Some(BlockGraph {
			estimator: self,
			map,
			slot,
		})
	}
	/// Position of a class within `classes`
	fn slot(&self, class: MoveClassId) -> Option<usize> {
		self.classes.iter().position(|c| c.class == class)
	}
	/// Elect the centre of a block, preferring passable cells near the middle.
	/// Only odd offsets within the block are considered and an impassable cell
	/// is only chosen when no candidate is passable
	fn find_centre(&self, map: &TraversabilityMap, block: BlockID, class: MoveClassId) -> usize {
		let grid = map.get_grid();
		let Some((min, max)) = self.layout.block_bounds(block) else {
			return 0;
		};
		let width = max.get_column() - min.get_column() + 1;
		let height = max.get_row() - min.get_row() + 1;
		let area = (self.layout.get_block_size() * self.layout.get_block_size()) as f32 / SQUARE_SIZE;
		let mut best = grid.cell_to_index(GridCell::new(
			min.get_column() + width / 2,
			min.get_row() + height / 2,
		));
		let mut best_cost = f32::MAX;
		for z in (1..height).step_by(2) {
			for x in (1..width).step_by(2) {
				let node = grid.cell_to_index(GridCell::new(min.get_column() + x, min.get_row() + z));
				let speed = if map.is_passable(node, class) { 1.0 } else { 0.0 };
				let dx = x as f32 - (width / 2) as f32;
				let dz = z as f32 - (height / 2) as f32;
				let cost = dx * dx + dz * dz + area / (0.001 + speed);
				if cost < best_cost {
					best_cost = cost;
					best = node;
				}
			}
		}
		if !map.is_passable(best, class) {
			trace!(
				"Block {:?} has no passable centre for class {:?}",
				block.get(),
				class
			);
		}
		best
	}
	/// Run the bounded fine search from a block centre to a neighbour centre
	/// and cache its cost
	fn build_edge(
		&mut self,
		map: &TraversabilityMap,
		solver: &mut AStarSolver,
		slot: usize,
		block: BlockID,
		ordinal: Ordinal,
	) {
		let index = self.layout.block_index(block);
		let cost = match self.bounded_cost(map, solver, slot, block, ordinal) {
			Some(cost) => cost,
			None => UNREACHABLE_COST,
		};
		self.classes[slot].costs[index][ordinal.index()] = cost;
	}
	/// Cost of the fine path between two neighbouring centres confined to the
	/// box covering both blocks
	fn bounded_cost(
		&self,
		map: &TraversabilityMap,
		solver: &mut AStarSolver,
		slot: usize,
		block: BlockID,
		ordinal: Ordinal,
	) -> Option<f32> {
		let neighbour = self.layout.neighbour(block, ordinal)?;
		let (a_min, a_max) = self.layout.block_bounds(block)?;
		let (b_min, b_max) = self.layout.block_bounds(neighbour)?;
		let min = GridCell::new(
			a_min.get_column().min(b_min.get_column()),
			a_min.get_row().min(b_min.get_row()),
		);
		let max = GridCell::new(
			a_max.get_column().max(b_max.get_column()),
			a_max.get_row().max(b_max.get_row()),
		);
		let classes = &self.classes[slot];
		let start = classes.centres[self.layout.block_index(block)];
		let end = classes.centres[self.layout.block_index(neighbour)];
		let graph = TerrainGraph::uniform(map, classes.class).with_bounds(min, max);
		let result = solver.solve(&graph, start, Goal::Single(end), None);
		match result.get_status() {
			PathStatus::NoSolution => None,
			_ => Some(result.get_cost()),
		}
	}
}

/// A [SearchGraph] over the blocks of one movement class where node ids are
/// flat block indices
pub struct BlockGraph<'a> {
	/// Source of centres and costs
	estimator: &'a PathEstimator,
	/// Terrain used for waypoint heights and centre passability
	map: &'a TraversabilityMap,
	/// Position of the class within the estimator
	slot: usize,
}

impl SearchGraph for BlockGraph<'_> {
	fn node_count(&self) -> usize {
		self.estimator.layout.block_count()
	}
	fn is_passable(&self, node: usize) -> bool {
		let classes = &self.estimator.classes[self.slot];
		node < self.node_count() && self.map.is_passable(classes.centres[node], classes.class)
	}
	fn neighbours(&self, node: usize, edges: &mut Vec<(usize, f32)>) {
		let layout = &self.estimator.layout;
		let block = layout.block_from_index(node);
		let costs = &self.estimator.classes[self.slot].costs[node];
		for ordinal in Ordinal::ALL {
			let cost = costs[ordinal.index()];
			if cost >= UNREACHABLE_COST {
				continue;
			}
			if let Some(neighbour) = layout.neighbour(block, ordinal) {
				edges.push((layout.block_index(neighbour), cost));
			}
		}
	}
	fn heuristic(&self, from: usize, to: usize) -> f32 {
		let grid = self.map.get_grid();
		let centres = &self.estimator.classes[self.slot].centres;
		octile_distance(
			grid.to_coord(centres[from]).get(),
			grid.to_coord(centres[to]).get(),
		)
	}
	fn world_pos(&self, node: usize) -> Vec3 {
		let centre = self.estimator.classes[self.slot].centres[node];
		let mut pos = self.map.get_grid().to_world_pos(centre);
		pos.y = self.map.get_height(centre);
		pos
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	/// First bit
	fn class() -> MoveClassId {
		MoveClassId::new(0).unwrap()
	}
	/// Open map split into 8x8 blocks
	fn open_estimator(length: u32, depth: u32) -> (TraversabilityMap, PathEstimator, AStarSolver) {
		let map = TraversabilityMap::open(length, depth);
		let mut solver = AStarSolver::new(map.get_grid().node_count());
		let estimator = PathEstimator::new(&map, 8, &[class()], &mut solver);
		(map, estimator, solver)
	}
	#[test]
	fn centre_prefers_middle() {
		let (map, estimator, _) = open_estimator(32, 32);
		let centre = estimator.centre(BlockID::new(1, 1), class()).unwrap();
		// odd offsets nearest to offset 4 are 3 and 5, the first found wins
		let actual = map.get_grid().to_index(8 + 3, 8 + 3);
		assert_eq!(actual, centre);
	}
	#[test]
	fn centre_avoids_blocked_cells() {
		let mut map = TraversabilityMap::open(32, 32);
		// close the middle of block (1, 1)
		for z in 10..14 {
			for x in 10..14 {
				map.set_mask(GridCell::new(x, z), MoveClassMask::EMPTY);
			}
		}
		let mut solver = AStarSolver::new(map.get_grid().node_count());
		let estimator = PathEstimator::new(&map, 8, &[class()], &mut solver);
		let centre = estimator.centre(BlockID::new(1, 1), class()).unwrap();
		assert!(map.is_passable(centre, class()));
	}
	#[test]
	fn unknown_class() {
		let (_, estimator, _) = open_estimator(16, 16);
		let other = MoveClassId::new(5).unwrap();
		assert_eq!(None, estimator.centre(BlockID::new(0, 0), other));
		assert_eq!(None, estimator.edge_cost(BlockID::new(0, 0), Ordinal::East, other));
	}
	#[test]
	fn map_edge_is_unreachable() {
		let (_, estimator, _) = open_estimator(32, 32);
		let result = estimator.edge_cost(BlockID::new(0, 0), Ordinal::North, class());
		assert_eq!(Some(UNREACHABLE_COST), result);
	}
	#[test]
	fn edges_match_bounded_search() {
		let mut map = TraversabilityMap::open(32, 32);
		for z in 2..14 {
			map.set_mask(GridCell::new(15, z), MoveClassMask::EMPTY);
		}
		let grid = *map.get_grid();
		let mut solver = AStarSolver::new(grid.node_count());
		let estimator = PathEstimator::new(&map, 8, &[class()], &mut solver);
		let layout = *estimator.get_layout();
		for index in 0..layout.block_count() {
			let block = layout.block_from_index(index);
			for (ordinal, neighbour) in layout.neighbours(block) {
				let (a_min, a_max) = layout.block_bounds(block).unwrap();
				let (b_min, b_max) = layout.block_bounds(neighbour).unwrap();
				let min = GridCell::new(
					a_min.get_column().min(b_min.get_column()),
					a_min.get_row().min(b_min.get_row()),
				);
				let max = GridCell::new(
					a_max.get_column().max(b_max.get_column()),
					a_max.get_row().max(b_max.get_row()),
				);
				let graph = TerrainGraph::uniform(&map, class()).with_bounds(min, max);
				let start = estimator.centre(block, class()).unwrap();
				let end = estimator.centre(neighbour, class()).unwrap();
				let fresh = solver.solve(&graph, start, Goal::Single(end), None);
				let cached = estimator.edge_cost(block, ordinal, class()).unwrap();
				if fresh.get_status() == PathStatus::NoSolution {
					assert_eq!(UNREACHABLE_COST, cached);
				} else {
					assert!((fresh.get_cost() - cached).abs() < 1e-4);
				}
			}
		}
	}
	#[test]
	fn walled_neighbour_is_unreachable() {
		// a full wall along the boundary between blocks (0, 1) and (1, 1)
		let mut map = TraversabilityMap::open(32, 32);
		for z in 0..32 {
			map.set_mask(GridCell::new(8, z), MoveClassMask::EMPTY);
		}
		let mut solver = AStarSolver::new(map.get_grid().node_count());
		let estimator = PathEstimator::new(&map, 8, &[class()], &mut solver);
		let result = estimator.edge_cost(BlockID::new(0, 1), Ordinal::East, class());
		assert_eq!(Some(UNREACHABLE_COST), result);
		let result = estimator.edge_cost(BlockID::new(1, 1), Ordinal::East, class());
		assert!(result.unwrap() < UNREACHABLE_COST);
	}
	#[test]
	fn coarse_estimate_crosses_map() {
		let (map, estimator, mut solver) = open_estimator(64, 64);
		let grid = *map.get_grid();
		let from = grid.to_world_pos(grid.to_index(3, 3));
		let to = grid.to_world_pos(grid.to_index(60, 60));
		let result = estimator.estimate(&map, &mut solver, from, to, class());
		assert_eq!(PathStatus::Solved, result.get_status());
		// diagonal run of blocks (0,0) .. (7,7)
		assert_eq!(8, result.get_nodes().len());
		let direct = octile_distance((3, 3), (60, 60));
		assert!(result.get_cost() >= direct * 0.5);
	}
	#[test]
	fn coarse_estimate_respects_walls() {
		// wall splitting the map with a single gap in the far south
		let mut map = TraversabilityMap::open(64, 64);
		for z in 0..56 {
			map.set_mask(GridCell::new(32, z), MoveClassMask::EMPTY);
		}
		let grid = *map.get_grid();
		let mut solver = AStarSolver::new(grid.node_count());
		let estimator = PathEstimator::new(&map, 8, &[class()], &mut solver);
		let from = grid.to_world_pos(grid.to_index(20, 4));
		let to = grid.to_world_pos(grid.to_index(44, 4));
		let result = estimator.estimate(&map, &mut solver, from, to, class());
		assert_eq!(PathStatus::Solved, result.get_status());
		let layout = estimator.get_layout();
		let deepest = result
			.get_nodes()
			.iter()
			.map(|n| layout.block_from_index(*n).get_row())
			.max()
			.unwrap();
		assert_eq!(7, deepest);
	}
	#[test]
	fn rebuild_only_dirty() {
		let (mut map, mut estimator, mut solver) = open_estimator(32, 32);
		let before = estimator.clone();
		// wall off the boundary between blocks (1, 1) and (2, 1)
		for z in 8..16 {
			map.set_mask(GridCell::new(16, z), MoveClassMask::EMPTY);
		}
		estimator.mark_dirty(GridCell::new(16, 8), GridCell::new(16, 15));
		assert!(estimator.is_dirty(BlockID::new(2, 1)));
		let rebuilt = estimator.rebuild_dirty(&map, &mut solver);
		assert_eq!(vec![BlockID::new(2, 1)], rebuilt);
		assert!(!estimator.is_dirty(BlockID::new(2, 1)));
		// the untouched corner block keeps its edges
		let corner = BlockID::new(0, 3);
		for ordinal in Ordinal::ALL {
			assert_eq!(
				before.edge_cost(corner, ordinal, class()),
				estimator.edge_cost(corner, ordinal, class())
			);
		}
		// the rebuilt state matches a full build
		let fresh = PathEstimator::new(&map, 8, &[class()], &mut solver);
		for index in 0..fresh.get_layout().block_count() {
			let block = fresh.get_layout().block_from_index(index);
			assert_eq!(fresh.centre(block, class()), estimator.centre(block, class()));
			for ordinal in Ordinal::ALL {
				assert_eq!(
					fresh.edge_cost(block, ordinal, class()),
					estimator.edge_cost(block, ordinal, class())
				);
			}
		}
	}
	#[test]
	fn nothing_dirty() {
		let (map, mut estimator, mut solver) = open_estimator(16, 16);
		assert!(estimator.rebuild_dirty(&map, &mut solver).is_empty());
	}
}

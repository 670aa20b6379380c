//! Query helpers for AI logic that thinks in world positions rather than node
//! ids.
//!
//! A [Pathfinder] borrows the terrain and a solver for one movement class.
//! Positions are snapped onto the fine grid with out of range values clamped.
//! When a choke overlay is supplied every step is weighted by it so routes
//! prefer quieter ground.
//!
//! Radius queries accept any cell on a ring of `radius` world units around a
//! target:
//!
//! ```text
//!  . . x x x . .
//!  . x . . . x .
//!  x . . . . . x
//!  x . . t . . x
//!  x . . . . . x
//!  . x . . . x .
//!  . . x x x . .
//! ```
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Position based path queries of a single movement class
pub struct Pathfinder<'a> {
	/// Terrain being searched
	map: &'a TraversabilityMap,
	/// Scratch space of the searches
	solver: &'a mut AStarSolver,
	/// Class whose mask bit must be set on every cell of a path
	class: MoveClassId,
	/// Optional choke layer of `class` weighting every step
	overlay: Option<&'a [f32]>,
}

impl<'a> Pathfinder<'a> {
	/// Create a new instance of [Pathfinder]
	pub fn new(map: &'a TraversabilityMap, solver: &'a mut AStarSolver, class: MoveClassId) -> Self {
		Pathfinder {
			map,
			solver,
			class,
			overlay: None,
		}
	}
	/// Weight every step by a choke overlay layer
	pub fn with_overlay(mut self, overlay: &'a [f32]) -> Self {
		if overlay.len() != self.map.get_grid().node_count() {
			warn!(
				"Choke overlay of {} cells does not cover the terrain, ignoring it",
				overlay.len()
			);
			return self;
		}
		self.overlay = Some(overlay);
		self
	}
	/// Path from `start` to `target`
	pub fn path_to_pos(&mut self, start: Vec3, target: Vec3, cutoff: Option<f32>) -> PathResult {
		let end = self.node_at(target);
		self.solve(start, Goal::Single(end), cutoff)
	}
	/// Path from `start` to any cell on the ring of `radius` world units around
	/// `target`
	pub fn path_to_pos_radius(
		&mut self,
		start: Vec3,
		target: Vec3,
		radius: f32,
		cutoff: Option<f32>,
	) -> PathResult {
		self.path_to_set_radius(start, &[target], radius, cutoff)
	}
	/// Path from `start` to the cheapest of `targets`. The reached goal index
	/// refers to `targets`
	pub fn path_to_set(&mut self, start: Vec3, targets: &[Vec3], cutoff: Option<f32>) -> PathResult {
		let goals = targets.iter().map(|t| self.node_at(*t)).collect();
		self.solve(start, Goal::AnySet(goals), cutoff)
	}
	/// Path from `start` to the cheapest cell on any ring of `radius` world
	/// units around one of `targets`. The reached goal index refers to
	/// `targets`
	pub fn path_to_set_radius(
		&mut self,
		start: Vec3,
		targets: &[Vec3],
		radius: f32,
		cutoff: Option<f32>,
	) -> PathResult {
		let grid = *self.map.get_grid();
		let cells = self.radius_in_cells(radius);
		let mut goals = Vec::new();
		let mut owners = Vec::new();
		for (index, target) in targets.iter().enumerate() {
			let centre = grid.cell_from_world_pos(*target);
			for node in ring_around(&grid, centre, cells) {
				goals.push(node);
				owners.push(index);
			}
		}
		self.solve(start, Goal::AnySet(goals), cutoff)
			.with_goal_owners(&owners)
	}
	/// Path from `start` to the first of `targets` that can be reached. An
	/// earlier target is always preferred over a later one regardless of cost
	pub fn path_to_priority_set(
		&mut self,
		start: Vec3,
		targets: &[Vec3],
		cutoff: Option<f32>,
	) -> PathResult {
		let goals = targets.iter().map(|t| self.node_at(*t)).collect();
		self.solve(start, Goal::Priority(goals), cutoff)
	}
	/// Can `target` be reached from `start`
	pub fn path_exists(&mut self, start: Vec3, target: Vec3) -> bool {
		self.path_to_pos(start, target, None).is_success()
	}
	/// Can any of `targets` be reached from `start`
	pub fn path_exists_to_any(&mut self, start: Vec3, targets: &[Vec3]) -> bool {
		self.path_to_set(start, targets, None).is_success()
	}
	/// Where a unit at `start` ends up when moving towards `target` along with
	/// the cost of getting there
	pub fn maneuver_to_pos(&mut self, start: Vec3, target: Vec3) -> Option<(Vec3, f32)> {
		let result = self.path_to_pos(start, target, None);
		result.get_destination().map(|d| (d, result.get_cost()))
	}
	/// Where a unit at `start` ends up when closing to `radius` world units of
	/// `target` along with the cost of getting there
	pub fn maneuver_to_pos_radius(
		&mut self,
		start: Vec3,
		target: Vec3,
		radius: f32,
	) -> Option<(Vec3, f32)> {
		let result = self.path_to_pos_radius(start, target, radius, None);
		result.get_destination().map(|d| (d, result.get_cost()))
	}
	/// Nearest node to a world position
	fn node_at(&self, position: Vec3) -> usize {
		self.map.get_grid().from_world_pos(position)
	}
	/// Whole cells covered by a world distance
	fn radius_in_cells(&self, radius: f32) -> u32 {
		if radius <= 0.0 {
			return 0;
		}
		(radius / self.map.get_grid().cell_size()) as u32
	}
	/// Run the solver with the cost model of this pathfinder
	fn solve(&mut self, start: Vec3, goal: Goal, cutoff: Option<f32>) -> PathResult {
		let start = self.node_at(start);
		match self.overlay {
			Some(overlay) => {
				let graph = TerrainGraph::new(
					self.map,
					self.class,
					ChokeWeightedCost::new(CHOKE_BASELINE, overlay),
				);
				self.solver.solve(&graph, start, goal, cutoff)
			}
			None => {
				let graph = TerrainGraph::uniform(self.map, self.class);
				self.solver.solve(&graph, start, goal, cutoff)
			}
		}
	}
}

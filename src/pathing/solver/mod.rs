//! A* search over abstract integer node ids.
//!
//! The solver knows nothing about terrain. A [SearchGraph] supplies
//! passability, neighbour edge costs, the heuristic and world positions, so the
//! same [AStarSolver] searches both the fine terrain grid and the coarse block
//! graph.
//!
//! Per-node search state lives in an arena indexed by node id. Each record is
//! stamped with the generation of the solve that last touched it, so bumping
//! the generation before a solve invalidates every record at once. Only when
//! the counter is about to overflow is the arena swept:
//!
//! ```text
//!  solve #1        solve #2        ...   solve #65535    solve #65536
//!  generation 1    generation 2          generation 65535  full reset, generation 1
//! ```
//!
//! A node moves from unseen to open when first discovered and from open to
//! closed when expanded. A closed node is never reopened.
//!

pub mod goal_rings;
pub mod open_list;
pub mod terrain_graph;

use bevy::prelude::*;
use open_list::{OpenEntry, OpenList};

/// Parent of a node with no predecessor
const NO_PARENT: usize = usize::MAX;
/// Goal slot of a node that is not a goal
const NOT_A_GOAL: usize = usize::MAX;

/// A graph the [AStarSolver] can search
pub trait SearchGraph {
	/// Number of node ids, valid ids are `0..node_count()`
	fn node_count(&self) -> usize;
	/// Can a path enter this node
	fn is_passable(&self, node: usize) -> bool;
	/// Append each reachable neighbour of `node` with the cost of the edge
	fn neighbours(&self, node: usize, edges: &mut Vec<(usize, f32)>);
	/// An estimate of the remaining cost that never exceeds the true cost
	fn heuristic(&self, from: usize, to: usize) -> f32;
	/// Position of the node in the world, used to build waypoints
	fn world_pos(&self, node: usize) -> Vec3;
}

/// What a solve is trying to reach
#[derive(Clone, Debug, PartialEq)]
pub enum Goal {
	/// A single end node
	Single(usize),
	/// Any node of the set is acceptable
	AnySet(Vec<usize>),
	/// Nodes in descending priority, the highest priority goal that can be
	/// reached wins
	Priority(Vec<usize>),
}

/// Outcome of a solve
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub enum PathStatus {
	/// A goal was reached
	Solved,
	/// No goal could be reached, or the cutoff was exceeded
	NoSolution,
	/// The start already satisfies the goal
	StartEndSame,
}

/// Result of [AStarSolver::solve]
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
	/// How the solve ended
	status: PathStatus,
	/// World positions from start to goal
	waypoints: Vec<Vec3>,
	/// Node ids from start to goal
	nodes: Vec<usize>,
	/// Sum of the edge costs along the path
	cost: f32,
	/// Which entry of a multi-node goal was reached
	reached_goal_index: Option<usize>,
	/// Set when the search stopped because of the cost cutoff rather than
	/// running out of nodes
	cutoff_exceeded: bool,
}

impl PathResult {
	/// A failed result
	pub fn no_solution(cutoff_exceeded: bool) -> Self {
		PathResult {
			status: PathStatus::NoSolution,
			waypoints: Vec::new(),
			nodes: Vec::new(),
			cost: 0.0,
			reached_goal_index: None,
			cutoff_exceeded,
		}
	}
	pub fn get_status(&self) -> PathStatus {
		self.status
	}
	pub fn get_waypoints(&self) -> &[Vec3] {
		&self.waypoints
	}
	pub fn get_nodes(&self) -> &[usize] {
		&self.nodes
	}
	pub fn get_cost(&self) -> f32 {
		self.cost
	}
	pub fn get_reached_goal_index(&self) -> Option<usize> {
		self.reached_goal_index
	}
	pub fn is_cutoff_exceeded(&self) -> bool {
		self.cutoff_exceeded
	}
	/// Did the solve produce a usable path, trivially or otherwise
	pub fn is_success(&self) -> bool {
		self.status != PathStatus::NoSolution
	}
	/// Last waypoint of the path
	pub fn get_destination(&self) -> Option<Vec3> {
		self.waypoints.last().copied()
	}
	/// Translate the reached goal slot through `owners` when several goal
	/// nodes stand in for one caller supplied target
	pub(crate) fn with_goal_owners(mut self, owners: &[usize]) -> Self {
		self.reached_goal_index = self
			.reached_goal_index
			.and_then(|slot| owners.get(slot).copied());
		self
	}
}

/// Expansion state of a node within the current generation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum Visit {
	/// Not discovered yet
	#[default]
	Unseen,
	/// In the open list
	Open,
	/// Expanded
	Closed,
}

/// Search record of a single node
#[derive(Clone, Copy, Debug)]
struct NodeState {
	/// Cost from the start
	g: f32,
	/// `g` plus the heuristic
	f: f32,
	/// Predecessor on the best known route
	parent: usize,
	/// Expansion state
	visit: Visit,
	/// Index into the goal list if this node is a goal
	goal: usize,
	/// Generation that wrote this record
	generation: u16,
}

impl Default for NodeState {
	fn default() -> Self {
		NodeState {
			g: 0.0,
			f: 0.0,
			parent: NO_PARENT,
			visit: Visit::Unseen,
			goal: NOT_A_GOAL,
			generation: 0,
		}
	}
}

/// Reusable A* engine. Scratch buffers are owned by the instance so a solve
/// takes `&mut self`, one search per instance at a time
#[derive(Component, Clone, Debug, Default)]
pub struct AStarSolver {
	/// Per-node search records
	nodes: Vec<NodeState>,
	/// Open list
	open: OpenList,
	/// Generation of the current or most recent solve
	generation: u16,
	/// Checksum of the most recent successful path
	checksum: u32,
	/// Scratch buffer for neighbour expansion
	edges: Vec<(usize, f32)>,
}

impl AStarSolver {
	/// Create a new instance of [AStarSolver] with scratch space for
	/// `node_count` nodes. The buffers grow if a larger graph is searched
	pub fn new(node_count: usize) -> Self {
		AStarSolver {
			nodes: vec![NodeState::default(); node_count],
			open: OpenList::new(node_count),
			generation: 0,
			checksum: 0,
			edges: Vec::with_capacity(8),
		}
	}
	/// Generation counter of the most recent solve
	pub fn generation(&self) -> u16 {
		self.generation
	}
	/// Checksum of the nodes along the most recent successful path, a trivial
	/// solve counts as the single node path of its start
	pub fn checksum(&self) -> u32 {
		self.checksum
	}
	/// Clear every node record and restart the generation counter
	pub fn reset(&mut self) {
		for node in self.nodes.iter_mut() {
			*node = NodeState::default();
		}
		self.open.clear();
		self.generation = 0;
	}
	/// Search `graph` from `start` towards `goal`. When a `cutoff` is given
	/// the search gives up as soon as the cheapest open node has an estimated
	/// total cost above it
	pub fn solve<G: SearchGraph>(
		&mut self,
		graph: &G,
		start: usize,
		goal: Goal,
		cutoff: Option<f32>,
	) -> PathResult {
		let node_count = graph.node_count();
		let (goals, directed) = match &goal {
			Goal::Single(end) => (std::slice::from_ref(end), true),
			Goal::AnySet(set) => (set.as_slice(), false),
			Goal::Priority(list) => (list.as_slice(), false),
		};
		// trivial solves never touch the node records
		let trivial = match &goal {
			Goal::Single(end) => (*end == start).then_some(0),
			Goal::AnySet(set) => set.iter().position(|n| *n == start),
			Goal::Priority(list) => (list.first() == Some(&start)).then_some(0),
		};
		if let Some(index) = trivial {
			self.checksum = path_checksum(&[start]);
			return PathResult {
				status: PathStatus::StartEndSame,
				waypoints: vec![graph.world_pos(start)],
				nodes: vec![start],
				cost: 0.0,
				reached_goal_index: match goal {
					Goal::Single(_) => None,
					_ => Some(index),
				},
				cutoff_exceeded: false,
			};
		}
		if start >= node_count || !graph.is_passable(start) {
			trace!("Start node {} is outside the graph or impassable", start);
			return PathResult::no_solution(false);
		}
		self.begin_generation(node_count);
		let mut any_goal = false;
		for (index, node) in goals.iter().enumerate() {
			if *node < node_count && graph.is_passable(*node) {
				let state = self.touch(*node);
				if state.goal == NOT_A_GOAL {
					state.goal = index;
				}
				any_goal = true;
			}
		}
		if !any_goal {
			trace!("No passable goal among {} candidates", goals.len());
			return PathResult::no_solution(false);
		}
		let target = goals[0];
		let estimate = |node: usize| {
			if directed {
				graph.heuristic(node, target)
			} else {
				0.0
			}
		};

		let h = estimate(start);
		let state = self.touch(start);
		state.g = 0.0;
		state.f = h;
		state.visit = Visit::Open;
		self.open.push(OpenEntry {
			f: h,
			g: 0.0,
			node: start,
		});

		let priority = matches!(goal, Goal::Priority(_));
		let mut best_priority: Option<(usize, usize)> = None;
		let mut cutoff_exceeded = false;
		let mut reached = None;
		while let Some(entry) = self.open.pop() {
			if cutoff.is_some_and(|limit| entry.f > limit) {
				cutoff_exceeded = true;
				break;
			}
			let current = entry.node;
			self.nodes[current].visit = Visit::Closed;
			let goal_index = self.nodes[current].goal;
			if goal_index != NOT_A_GOAL {
				if !priority || goal_index == 0 {
					reached = Some((current, goal_index));
					break;
				}
				if best_priority.is_none_or(|(_, best)| goal_index < best) {
					best_priority = Some((current, goal_index));
				}
			}
			let g = self.nodes[current].g;
			self.edges.clear();
			graph.neighbours(current, &mut self.edges);
			for i in 0..self.edges.len() {
				let (next, edge_cost) = self.edges[i];
				if next >= node_count || !graph.is_passable(next) {
					continue;
				}
				let new_g = g + edge_cost;
				let state = self.touch(next);
				match state.visit {
					Visit::Closed => {}
					Visit::Unseen => {
						let f = new_g + estimate(next);
						let state = self.touch(next);
						state.g = new_g;
						state.f = f;
						state.parent = current;
						state.visit = Visit::Open;
						self.open.push(OpenEntry {
							f,
							g: new_g,
							node: next,
						});
					}
					Visit::Open => {
						if new_g < state.g {
							let f = new_g + (state.f - state.g);
							state.g = new_g;
							state.f = f;
							state.parent = current;
							self.open.decrease(next, f, new_g);
						}
					}
				}
			}
		}
		self.open.clear();
		let reached = reached.or(best_priority);
		match reached {
			Some((node, goal_index)) => {
				let mut result = self.reconstruct(graph, node);
				if !matches!(goal, Goal::Single(_)) {
					result.reached_goal_index = Some(goal_index);
				}
				result
			}
			None => PathResult::no_solution(cutoff_exceeded),
		}
	}
	/// Bump the generation, sweeping the arena when the counter would overflow
	fn begin_generation(&mut self, node_count: usize) {
		if self.nodes.len() < node_count {
			self.nodes.resize(node_count, NodeState::default());
			self.open.resize(node_count);
		}
		if self.generation == u16::MAX {
			debug!("Solver generation counter exhausted, resetting node records");
			self.reset();
		}
		self.generation += 1;
	}
	/// Get the record of a node, clearing it first if it belongs to an older
	/// generation
	fn touch(&mut self, node: usize) -> &mut NodeState {
		let generation = self.generation;
		let state = &mut self.nodes[node];
		if state.generation != generation {
			*state = NodeState {
				generation,
				..NodeState::default()
			};
		}
		state
	}
	/// Walk parents back from `end` to build the result
	fn reconstruct<G: SearchGraph>(&mut self, graph: &G, end: usize) -> PathResult {
		let mut nodes = vec![end];
		let mut current = end;
		while self.nodes[current].parent != NO_PARENT {
			current = self.nodes[current].parent;
			nodes.push(current);
		}
		nodes.reverse();
		self.checksum = path_checksum(&nodes);
		PathResult {
			status: PathStatus::Solved,
			waypoints: nodes.iter().map(|n| graph.world_pos(*n)).collect(),
			nodes,
			cost: self.nodes[end].g,
			reached_goal_index: None,
			cutoff_exceeded: false,
		}
	}
}

/// Order sensitive hash of a node sequence
fn path_checksum(nodes: &[usize]) -> u32 {
	let mut checksum: u32 = 0;
	for (k, node) in nodes.iter().enumerate() {
		checksum = checksum.wrapping_add((*node as u32).wrapping_shl((k % 8) as u32));
	}
	checksum
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	use crate::prelude::*;

	/// Open 8-connected grid without a border where `true` cells are walls
	struct TestGrid {
		/// Cells along `x`
		length: usize,
		/// Cells along `z`
		depth: usize,
		/// Blocked cells
		walls: Vec<bool>,
	}

	impl TestGrid {
		/// Grid with no walls
		fn open(length: usize, depth: usize) -> Self {
			TestGrid {
				length,
				depth,
				walls: vec![false; length * depth],
			}
		}
		/// Index of `(x, z)`
		fn id(&self, x: usize, z: usize) -> usize {
			z * self.length + x
		}
	}

	impl SearchGraph for TestGrid {
		fn node_count(&self) -> usize {
			self.length * self.depth
		}
		fn is_passable(&self, node: usize) -> bool {
			!self.walls[node]
		}
		fn neighbours(&self, node: usize, edges: &mut Vec<(usize, f32)>) {
			let x = (node % self.length) as i64;
			let z = (node / self.length) as i64;
			for ordinal in Ordinal::ALL {
				let (dx, dz) = ordinal.offset();
				let (nx, nz) = (x + dx as i64, z + dz as i64);
				if nx < 0 || nz < 0 || nx >= self.length as i64 || nz >= self.depth as i64 {
					continue;
				}
				edges.push((self.id(nx as usize, nz as usize), ordinal.step_cost()));
			}
		}
		fn heuristic(&self, from: usize, to: usize) -> f32 {
			let a = ((from % self.length) as u32, (from / self.length) as u32);
			let b = ((to % self.length) as u32, (to / self.length) as u32);
			octile_distance(a, b)
		}
		fn world_pos(&self, node: usize) -> Vec3 {
			Vec3::new((node % self.length) as f32, 0.0, (node / self.length) as f32)
		}
	}

	/// Sum of the cost of each step along a node path
	fn path_cost(grid: &TestGrid, nodes: &[usize]) -> f32 {
		nodes
			.windows(2)
			.map(|w| {
				let a = ((w[0] % grid.length) as u32, (w[0] / grid.length) as u32);
				let b = ((w[1] % grid.length) as u32, (w[1] / grid.length) as u32);
				Ordinal::between(a, b).unwrap().step_cost()
			})
			.sum()
	}

	#[test]
	fn start_end_same() {
		let grid = TestGrid::open(10, 10);
		let mut solver = AStarSolver::new(grid.node_count());
		let result = solver.solve(&grid, 42, Goal::Single(42), None);
		assert_eq!(PathStatus::StartEndSame, result.get_status());
		assert_eq!(0.0, result.get_cost());
		assert_eq!(vec![42], result.get_nodes());
		assert_eq!(1, result.get_waypoints().len());
	}
	#[test]
	fn open_diagonal() {
		let grid = TestGrid::open(10, 10);
		let mut solver = AStarSolver::new(grid.node_count());
		let result = solver.solve(&grid, grid.id(0, 0), Goal::Single(grid.id(9, 9)), None);
		assert_eq!(PathStatus::Solved, result.get_status());
		assert!((result.get_cost() - 9.0 * DIAGONAL_COST).abs() < 1e-4);
		assert_eq!(10, result.get_waypoints().len());
		assert_eq!(grid.id(0, 0), result.get_nodes()[0]);
		assert_eq!(grid.id(9, 9), *result.get_nodes().last().unwrap());
	}
	#[test]
	fn blocked_column_detours() {
		//  _ _ _ _ _ x _ _ _ _
		// |_|_|_|_|_|x|_|_|_|_|
		//      ...  x
		// |_|_|_|_|_|_|_|_|_|_|  row 9 is the only gap
		let mut grid = TestGrid::open(10, 10);
		for z in 0..9 {
			let id = grid.id(5, z);
			grid.walls[id] = true;
		}
		let mut solver = AStarSolver::new(grid.node_count());
		let result = solver.solve(&grid, grid.id(0, 0), Goal::Single(grid.id(9, 9)), None);
		assert_eq!(PathStatus::Solved, result.get_status());
		assert!(result.get_cost() > 9.0 * DIAGONAL_COST);
		assert!(result.get_nodes().contains(&grid.id(5, 9)));
		for node in result.get_nodes() {
			assert!(!grid.walls[*node]);
		}
	}
	#[test]
	fn cost_matches_edges() {
		let mut grid = TestGrid::open(12, 8);
		for z in 1..8 {
			let id = grid.id(4, z);
			grid.walls[id] = true;
		}
		for z in 0..6 {
			let id = grid.id(8, z);
			grid.walls[id] = true;
		}
		let mut solver = AStarSolver::new(grid.node_count());
		let result = solver.solve(&grid, grid.id(0, 7), Goal::Single(grid.id(11, 0)), None);
		assert_eq!(PathStatus::Solved, result.get_status());
		let actual = path_cost(&grid, result.get_nodes());
		assert!((actual - result.get_cost()).abs() < 1e-4);
	}
	#[test]
	fn walled_off_goal() {
		let mut grid = TestGrid::open(6, 6);
		for z in 0..6 {
			let id = grid.id(3, z);
			grid.walls[id] = true;
		}
		let mut solver = AStarSolver::new(grid.node_count());
		let result = solver.solve(&grid, grid.id(0, 0), Goal::Single(grid.id(5, 5)), None);
		assert_eq!(PathStatus::NoSolution, result.get_status());
		assert!(!result.is_cutoff_exceeded());
		assert!(result.get_waypoints().is_empty());
	}
	#[test]
	fn start_outside_graph() {
		let grid = TestGrid::open(4, 4);
		let mut solver = AStarSolver::new(grid.node_count());
		let result = solver.solve(&grid, 99, Goal::Single(3), None);
		assert_eq!(PathStatus::NoSolution, result.get_status());
	}
	#[test]
	fn start_impassable() {
		let mut grid = TestGrid::open(4, 4);
		grid.walls[0] = true;
		let mut solver = AStarSolver::new(grid.node_count());
		let result = solver.solve(&grid, 0, Goal::Single(15), None);
		assert_eq!(PathStatus::NoSolution, result.get_status());
	}
	#[test]
	fn goal_impassable() {
		let mut grid = TestGrid::open(4, 4);
		grid.walls[15] = true;
		let mut solver = AStarSolver::new(grid.node_count());
		let result = solver.solve(&grid, 0, Goal::Single(15), None);
		assert_eq!(PathStatus::NoSolution, result.get_status());
	}
	#[test]
	fn cutoff_flags_result() {
		let grid = TestGrid::open(20, 20);
		let mut solver = AStarSolver::new(grid.node_count());
		let result = solver.solve(&grid, grid.id(0, 0), Goal::Single(grid.id(19, 0)), Some(5.0));
		assert_eq!(PathStatus::NoSolution, result.get_status());
		assert!(result.is_cutoff_exceeded());
		let result = solver.solve(&grid, grid.id(0, 0), Goal::Single(grid.id(19, 0)), Some(19.5));
		assert_eq!(PathStatus::Solved, result.get_status());
	}
	#[test]
	fn any_set_takes_cheapest() {
		let grid = TestGrid::open(10, 10);
		let start = grid.id(2, 2);
		let near = grid.id(4, 2);
		let far = grid.id(9, 9);
		let mut solver = AStarSolver::new(grid.node_count());
		let to_near = solver.solve(&grid, start, Goal::Single(near), None);
		let to_far = solver.solve(&grid, start, Goal::Single(far), None);
		let result = solver.solve(&grid, start, Goal::AnySet(vec![far, near]), None);
		assert_eq!(PathStatus::Solved, result.get_status());
		assert_eq!(Some(1), result.get_reached_goal_index());
		assert!(result.get_cost() <= to_near.get_cost().min(to_far.get_cost()) + 1e-4);
		assert!((result.get_cost() - to_near.get_cost()).abs() < 1e-4);
	}
	#[test]
	fn any_set_containing_start() {
		let grid = TestGrid::open(5, 5);
		let mut solver = AStarSolver::new(grid.node_count());
		let result = solver.solve(&grid, 7, Goal::AnySet(vec![3, 7]), None);
		assert_eq!(PathStatus::StartEndSame, result.get_status());
		assert_eq!(Some(1), result.get_reached_goal_index());
	}
	#[test]
	fn any_set_skips_blocked_goals() {
		let mut grid = TestGrid::open(5, 5);
		grid.walls[24] = true;
		let mut solver = AStarSolver::new(grid.node_count());
		let result = solver.solve(&grid, 0, Goal::AnySet(vec![24, 20]), None);
		assert_eq!(Some(1), result.get_reached_goal_index());
		assert_eq!(20, *result.get_nodes().last().unwrap());
	}
	#[test]
	fn priority_prefers_first_reachable() {
		// the top priority goal is sealed off, the second is far, the third is close
		let mut grid = TestGrid::open(10, 10);
		let sealed = grid.id(8, 1);
		for ordinal in Ordinal::ALL {
			let (dx, dz) = ordinal.offset();
			let id = grid.id((8 + dx) as usize, (1 + dz) as usize);
			grid.walls[id] = true;
		}
		let far = grid.id(9, 9);
		let close = grid.id(1, 0);
		let mut solver = AStarSolver::new(grid.node_count());
		let result = solver.solve(&grid, grid.id(0, 0), Goal::Priority(vec![sealed, far, close]), None);
		assert_eq!(PathStatus::Solved, result.get_status());
		assert_eq!(Some(1), result.get_reached_goal_index());
		assert_eq!(far, *result.get_nodes().last().unwrap());
	}
	#[test]
	fn priority_top_goal_wins() {
		let grid = TestGrid::open(10, 10);
		let mut solver = AStarSolver::new(grid.node_count());
		let result = solver.solve(&grid, 0, Goal::Priority(vec![grid.id(9, 9), grid.id(1, 1)]), None);
		assert_eq!(Some(0), result.get_reached_goal_index());
	}
	#[test]
	fn priority_cutoff_keeps_best_reached() {
		let grid = TestGrid::open(20, 20);
		let mut solver = AStarSolver::new(grid.node_count());
		let result = solver.solve(
			&grid,
			0,
			Goal::Priority(vec![grid.id(19, 19), grid.id(3, 0)]),
			Some(6.0),
		);
		assert_eq!(PathStatus::Solved, result.get_status());
		assert_eq!(Some(1), result.get_reached_goal_index());
		assert!((result.get_cost() - 3.0).abs() < 1e-4);
	}
	#[test]
	fn deterministic_with_equal_generation() {
		let mut grid = TestGrid::open(16, 16);
		for z in 2..14 {
			let id = grid.id(7, z);
			grid.walls[id] = true;
		}
		let mut first = AStarSolver::new(grid.node_count());
		let mut second = AStarSolver::new(grid.node_count());
		let a = first.solve(&grid, grid.id(1, 8), Goal::Single(grid.id(14, 8)), None);
		let b = second.solve(&grid, grid.id(1, 8), Goal::Single(grid.id(14, 8)), None);
		assert_eq!(first.generation(), second.generation());
		assert_eq!(a.get_nodes(), b.get_nodes());
		assert_eq!(a.get_waypoints(), b.get_waypoints());
		assert_eq!(first.checksum(), second.checksum());
	}
	#[test]
	fn generation_reuse_matches_fresh_solver() {
		let grid = TestGrid::open(8, 8);
		let mut reused = AStarSolver::new(grid.node_count());
		for _ in 0..5 {
			reused.solve(&grid, 0, Goal::Single(63), None);
		}
		let again = reused.solve(&grid, 9, Goal::Single(54), None);
		let mut fresh = AStarSolver::new(grid.node_count());
		let expected = fresh.solve(&grid, 9, Goal::Single(54), None);
		assert_eq!(expected, again);
		assert_eq!(6, reused.generation());
	}
	#[test]
	fn generation_overflow_resets() {
		let grid = TestGrid::open(4, 4);
		let mut solver = AStarSolver::new(grid.node_count());
		solver.generation = u16::MAX;
		let result = solver.solve(&grid, 0, Goal::Single(15), None);
		assert_eq!(PathStatus::Solved, result.get_status());
		assert_eq!(1, solver.generation());
	}
	#[test]
	fn optimal_against_brute_force() {
		// Bellman-Ford style relaxation over every pair on a small maze
		let mut grid = TestGrid::open(6, 6);
		for id in [8, 9, 10, 14, 20, 21, 27, 28, 29] {
			grid.walls[id] = true;
		}
		let n = grid.node_count();
		let mut solver = AStarSolver::new(n);
		for start in 0..n {
			if grid.walls[start] {
				continue;
			}
			let mut dist = vec![f32::INFINITY; n];
			dist[start] = 0.0;
			for _ in 0..n {
				for a in 0..n {
					if grid.walls[a] || dist[a].is_infinite() {
						continue;
					}
					let mut edges = Vec::new();
					grid.neighbours(a, &mut edges);
					for (b, c) in edges {
						if !grid.walls[b] && dist[a] + c < dist[b] {
							dist[b] = dist[a] + c;
						}
					}
				}
			}
			for end in 0..n {
				if grid.walls[end] || end == start {
					continue;
				}
				let result = solver.solve(&grid, start, Goal::Single(end), None);
				if dist[end].is_infinite() {
					assert_eq!(PathStatus::NoSolution, result.get_status());
				} else {
					assert!((dist[end] - result.get_cost()).abs() < 1e-3);
				}
			}
		}
	}
	#[test]
	fn checksum_tracks_last_success() {
		let grid = TestGrid::open(5, 5);
		let mut solver = AStarSolver::new(grid.node_count());
		let result = solver.solve(&grid, 0, Goal::Single(2), None);
		// path 0 -> 1 -> 2
		assert_eq!(vec![0, 1, 2], result.get_nodes());
		let actual = 0 + (1 << 1) + (2 << 2);
		assert_eq!(actual, solver.checksum());
		let mut walled = TestGrid::open(5, 5);
		walled.walls[24] = true;
		solver.solve(&walled, 0, Goal::Single(24), None);
		assert_eq!(actual, solver.checksum());
		// start on the goal
		solver.solve(&grid, 7, Goal::Single(7), None);
		assert_eq!(7, solver.checksum());
	}
}

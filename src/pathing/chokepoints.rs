//! Rates how tactically significant each cell is by splatting a falloff
//! kernel along many fine paths between origin and destination positions.
//!
//! Cells crossed by a lot of paths accumulate large values:
//!
//! ```text
//!  origins            destination
//!   o  .  .  .  .  .  .  .  .
//!   .  o  .  .  #  .  .  .  .
//!   .  .  .  .  #  .  .  .  .
//!   o  .  .  .  X  .  .  .  d     X - every route funnels through the gap
//!   .  .  .  .  #  .  .  .  .
//!   .  .  o  .  #  .  .  .  .
//! ```
//!
//! Each overlay starts from [CHOKE_BASELINE] and values only ever grow
//! during a pass. No normalisation is applied, consumers decide how to read
//! the raw magnitudes
//!

use crate::prelude::*;
use bevy::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Neutral value of an overlay cell
pub const CHOKE_BASELINE: f32 = 1.0;

/// Tuning of a choke point pass
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct ChokeConfig {
	/// Number of times every (origin, destination) pair is sampled
	pub repetitions: u32,
	/// Every `path_stride`th cell of a path receives the kernel, counted from
	/// the start of the path
	pub path_stride: u32,
	/// Cells skipped at each end of a path
	pub ignore_cells: u32,
	/// Radius of the kernel in cells, derived from the map size when [None]
	pub kernel_radius: Option<u32>,
	/// Origins are displaced by up to this many cells along each axis
	pub jitter: u32,
	/// Seed of the origin displacement
	pub seed: u64,
}

impl Default for ChokeConfig {
	fn default() -> Self {
		ChokeConfig {
			repetitions: 30,
			path_stride: 2,
			ignore_cells: 4,
			kernel_radius: None,
			jitter: 1,
			seed: 0,
		}
	}
}

/// Square window of weights decreasing with distance from its middle
#[derive(Clone, Debug, PartialEq)]
pub struct ChokeKernel {
	/// Cells from the middle to the edge of the window
	radius: u32,
	/// Row-major `(2r + 1)²` weights
	weights: Vec<f32>,
}

impl ChokeKernel {
	/// Create a new instance of [ChokeKernel]. The weight at squared
	/// distance `d2` is `floor((r² - d2)² / r²) * 2` inside the radius and
	/// zero beyond it
	pub fn new(radius: u32) -> Self {
		let r = radius.max(1) as i64;
		let width = 2 * r + 1;
		let square = r * r;
		let mut weights = Vec::with_capacity((width * width) as usize);
		for z in 0..width {
			for x in 0..width {
				let d2 = (x - r) * (x - r) + (z - r) * (z - r);
				if d2 <= square {
					weights.push(((d2 - square) * (d2 - square) / square * 2) as f32);
				} else {
					weights.push(0.0);
				}
			}
		}
		ChokeKernel {
			radius: r as u32,
			weights,
		}
	}
	/// Radius derived from a map of `length` x `depth` cells
	pub fn radius_for(length: u32, depth: u32) -> u32 {
		let cells = (length as f32 * depth as f32).sqrt() as u32;
		(cells / 3 / 8).max(1)
	}
	pub fn get_radius(&self) -> u32 {
		self.radius
	}
	/// Weight at an offset from the middle of the kernel
	pub fn weight(&self, dx: i32, dz: i32) -> f32 {
		let r = self.radius as i32;
		if dx.abs() > r || dz.abs() > r {
			return 0.0;
		}
		let width = 2 * r + 1;
		self.weights[((dz + r) * width + dx + r) as usize]
	}
	/// Add the kernel centred on a cell into a layer, clipped to the grid
	fn splat(&self, grid: &GridIndex, layer: &mut [f32], centre: GridCell) {
		let r = self.radius as i64;
		let (cx, cz) = (centre.get_column() as i64, centre.get_row() as i64);
		let x_start = (cx - r).max(0);
		let x_end = (cx + r).min(grid.get_length() as i64 - 1);
		let z_start = (cz - r).max(0);
		let z_end = (cz + r).min(grid.get_depth() as i64 - 1);
		for z in z_start..=z_end {
			for x in x_start..=x_end {
				let w = self.weight((x - cx) as i32, (z - cz) as i32);
				if w > 0.0 {
					layer[grid.to_index(x, z)] += w;
				}
			}
		}
	}
}

/// Accumulated choke values of each movement class over the fine grid
#[derive(Component, Clone, Debug, Default)]
pub struct ChokeOverlays {
	/// Fine grid the layers cover
	grid: GridIndex,
	/// One layer per class of the [MoveClassTable], indexed by class bit
	layers: Vec<Vec<f32>>,
}

impl ChokeOverlays {
	/// Create a new instance of [ChokeOverlays] with every layer at the baseline
	pub fn new(grid: GridIndex, class_count: usize) -> Self {
		ChokeOverlays {
			grid,
			layers: vec![vec![CHOKE_BASELINE; grid.node_count()]; class_count],
		}
	}
	pub fn get_grid(&self) -> &GridIndex {
		&self.grid
	}
	/// Overlay of a class as a flat slice of the grid
	pub fn layer(&self, class: MoveClassId) -> Option<&[f32]> {
		self.layers.get(class.get()).map(|l| l.as_slice())
	}
	/// Overlay value of a cell, coordinates off the grid are clamped
	pub fn value_at(&self, class: MoveClassId, x: i64, z: i64) -> Option<f32> {
		let layer = self.layers.get(class.get())?;
		Some(layer[self.grid.to_index(x, z)])
	}
	/// Return a class overlay to the baseline
	pub fn reset(&mut self, class: MoveClassId) {
		if let Some(layer) = self.layers.get_mut(class.get()) {
			layer.iter_mut().for_each(|v| *v = CHOKE_BASELINE);
		}
	}
	/// Mutable overlay of a class
	fn layer_mut(&mut self, class: MoveClassId) -> Option<&mut Vec<f32>> {
		self.layers.get_mut(class.get())
	}
}

/// Runs choke point passes with a fixed [ChokeConfig]
#[derive(Clone, Debug)]
pub struct ChokePointAnalyzer {
	/// Settings of each pass
	config: ChokeConfig,
	/// Kernel splatted along each path
	kernel: ChokeKernel,
}

impl ChokePointAnalyzer {
	/// Create a new instance of [ChokePointAnalyzer] for a grid
	pub fn new(config: ChokeConfig, grid: &GridIndex) -> Self {
		let radius = config
			.kernel_radius
			.unwrap_or_else(|| ChokeKernel::radius_for(grid.get_length(), grid.get_depth()));
		ChokePointAnalyzer {
			config,
			kernel: ChokeKernel::new(radius),
		}
	}
	pub fn get_config(&self) -> &ChokeConfig {
		&self.config
	}
	pub fn get_kernel(&self) -> &ChokeKernel {
		&self.kernel
	}
	/// Reset the overlay of `class` and accumulate a fresh pass into it
	pub fn run_pass(
		&self,
		overlays: &mut ChokeOverlays,
		solver: &mut AStarSolver,
		map: &TraversabilityMap,
		origins: &[Vec3],
		destinations: &[Vec3],
		class: MoveClassId,
	) -> u32 {
		overlays.reset(class);
		self.accumulate(overlays, solver, map, origins, destinations, class)
	}
	/// Splat the kernel along the paths between every origin and destination
	/// without resetting the overlay first. Paths are searched on plain
	/// terrain so repeated calls add identical increments. Returns the number
	/// of solved paths
	pub fn accumulate(
		&self,
		overlays: &mut ChokeOverlays,
		solver: &mut AStarSolver,
		map: &TraversabilityMap,
		origins: &[Vec3],
		destinations: &[Vec3],
		class: MoveClassId,
	) -> u32 {
		let grid = *map.get_grid();
		if *overlays.get_grid() != grid {
			error!(
				"Choke overlay of size {:?} does not match the terrain {:?}",
				overlays.get_grid().get_size(),
				grid.get_size()
			);
			return 0;
		}
		let Some(layer) = overlays.layer_mut(class) else {
			error!("No choke overlay exists for class {:?}", class);
			return 0;
		};
		let graph = TerrainGraph::uniform(map, class);
		let stride = self.config.path_stride.max(1) as usize;
		let ignore = self.config.ignore_cells as usize;
		let mut solved = 0;
		for repetition in 0..self.config.repetitions {
			for origin in origins.iter() {
				let origin = grid.cell_to_index(grid.cell_from_world_pos(*origin));
				for destination in destinations.iter() {
					let destination = grid.cell_to_index(grid.cell_from_world_pos(*destination));
					let start = self.jittered(map, class, origin, destination, repetition);
					let result = solver.solve(&graph, start, Goal::Single(destination), None);
					if !result.is_success() {
						continue;
					}
					solved += 1;
					let nodes = result.get_nodes();
					if nodes.len() <= ignore * 2 {
						continue;
					}
					// every stride-th cell counting from the path start, so the
					// default stride of 2 lands on the odd indices
					for (i, node) in nodes
						.iter()
						.enumerate()
						.take(nodes.len() - ignore)
						.skip(ignore)
					{
						if i % stride == stride - 1 {
							self.kernel.splat(&grid, layer, grid.to_coord(*node));
						}
					}
				}
			}
		}
		debug!(
			"Choke pass for class {:?} solved {} paths",
			class, solved
		);
		solved
	}
	/// Displace an origin by a few cells. The offset depends only on the
	/// seed, the pair and the repetition so extra pairs never disturb the
	/// samples of existing ones
	fn jittered(
		&self,
		map: &TraversabilityMap,
		class: MoveClassId,
		origin: usize,
		destination: usize,
		repetition: u32,
	) -> usize {
		let jitter = self.config.jitter as i64;
		if jitter == 0 {
			return origin;
		}
		let pair_seed = (origin as u64)
			.wrapping_mul(0x9E37_79B9_7F4A_7C15)
			.wrapping_add((destination as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F))
			.wrapping_add(repetition as u64);
		let mut rng = StdRng::seed_from_u64(self.config.seed ^ pair_seed);
		let grid = map.get_grid();
		let cell = grid.to_coord(origin);
		let x = cell.get_column() as i64 + rng.random_range(-jitter..=jitter);
		let z = cell.get_row() as i64 + rng.random_range(-jitter..=jitter);
		let moved = grid.to_index(x, z);
		if map.is_passable(moved, class) {
			moved
		} else {
			origin
		}
	}
}

//! Everything an entity needs to serve pathing queries over one map
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Terrain, coarse graph, choke overlays, solver scratch space and the path
/// cache of a map
#[derive(Bundle)]
pub struct TerrainPathingBundle {
	/// Dimensions of the fine grid
	grid: GridIndex,
	/// Per cell traversability of every class
	traversability_map: TraversabilityMap,
	/// Coarse block graph of every class
	path_estimator: PathEstimator,
	/// Choke values of every class
	choke_overlays: ChokeOverlays,
	/// Scratch space shared by the systems of this entity
	solver: AStarSolver,
	/// Paths solved on request
	path_cache: PathCache,
	/// Settings used to build the rest
	config: PathingConfig,
}

impl TerrainPathingBundle {
	/// Create a new instance of [TerrainPathingBundle] by evaluating every
	/// class of `classes` over the `heightmap`
	pub fn new(heightmap: &Heightmap, classes: MoveClassTable, config: PathingConfig) -> Self {
		let map = TraversabilityMap::new(heightmap, classes, config.resolution);
		TerrainPathingBundle::from_map(map, config)
	}
	/// Create a new instance of [TerrainPathingBundle] around an existing
	/// [TraversabilityMap]
	pub fn from_map(map: TraversabilityMap, config: PathingConfig) -> Self {
		let grid = *map.get_grid();
		let class_count = map.get_classes().len();
		let class_ids: Vec<MoveClassId> = (0..class_count).filter_map(MoveClassId::new).collect();
		let mut solver = AStarSolver::new(grid.node_count());
		let path_estimator = PathEstimator::new(&map, config.block_size, &class_ids, &mut solver);
		TerrainPathingBundle {
			grid,
			traversability_map: map,
			path_estimator,
			choke_overlays: ChokeOverlays::new(grid, class_count),
			solver,
			path_cache: PathCache::default(),
			config,
		}
	}
	/// Create a new instance of [TerrainPathingBundle] where the heights, the
	/// classes and the config are read from disk
	#[cfg(all(feature = "csv", feature = "ron"))]
	pub fn new_from_disk(heightmap_path: &str, classes_path: &str, config_path: &str) -> Self {
		let heightmap = Heightmap::from_csv(heightmap_path.to_string());
		let classes = MoveClassTable::from_ron(classes_path.to_string());
		let config = PathingConfig::from_ron(config_path.to_string());
		TerrainPathingBundle::new(&heightmap, classes, config)
	}
	pub fn get_traversability_map(&self) -> &TraversabilityMap {
		&self.traversability_map
	}
	pub fn get_path_estimator(&self) -> &PathEstimator {
		&self.path_estimator
	}
	pub fn get_choke_overlays(&self) -> &ChokeOverlays {
		&self.choke_overlays
	}
}

//! Logic for handling changes to terrain heights which in turn update the
//! [TraversabilityMap], rebuild dirty blocks of the [PathEstimator] and clean
//! out cached paths which may have been made invalid by the change
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Used to change the height of a single fine cell
#[derive(Event)]
pub struct EventUpdateTerrainCell {
	/// Fine cell to update
	cell: GridCell,
	/// The height the cell should be assigned
	height: f32,
}

impl EventUpdateTerrainCell {
	/// Create a new instance of [EventUpdateTerrainCell]
	#[cfg(not(tarpaulin_include))]
	pub fn new(cell: GridCell, height: f32) -> Self {
		EventUpdateTerrainCell { cell, height }
	}
	#[cfg(not(tarpaulin_include))]
	pub fn get_cell(&self) -> GridCell {
		self.cell
	}
	#[cfg(not(tarpaulin_include))]
	pub fn get_height(&self) -> f32 {
		self.height
	}
}

/// Read [EventUpdateTerrainCell], update the [TraversabilityMap] and rebuild
/// the blocks of the [PathEstimator] covering the changes
#[cfg(not(tarpaulin_include))]
pub fn process_terrain_updates(
	mut events: EventReader<EventUpdateTerrainCell>,
	mut query: Query<(
		&mut TraversabilityMap,
		&mut PathEstimator,
		&mut AStarSolver,
	)>,
	mut event_cache_clean: EventWriter<EventCleanCaches>,
) {
	// coalesce events so each block is rebuilt once however many cells changed
	let updates: Vec<(GridCell, f32)> = events
		.read()
		.map(|e| (e.get_cell(), e.get_height()))
		.collect();
	if updates.is_empty() {
		return;
	}
	for (mut map, mut estimator, mut solver) in query.iter_mut() {
		for (cell, height) in updates.iter() {
			let (min, max) = map.set_cell_height(*cell, *height);
			estimator.mark_dirty(min, max);
		}
		let rebuilt = estimator.rebuild_dirty(&map, solver.as_mut());
		if !rebuilt.is_empty() {
			debug!("Terrain change rebuilt blocks {:?}", rebuilt);
			event_cache_clean.write(EventCleanCaches(rebuilt));
		}
	}
}

/// Blocks whose centres and edges have been recomputed, any cached path
/// crossing them needs to be removed
#[derive(Event)]
pub struct EventCleanCaches(pub Vec<BlockID>);

/// Lookup any cached paths crossing blocks that have been rebuilt and remove
/// them from the cache
#[cfg(not(tarpaulin_include))]
pub fn clean_cache(
	mut events: EventReader<EventCleanCaches>,
	mut query: Query<(&mut PathCache, &PathEstimator)>,
) {
	let mut blocks = Vec::new();
	for event in events.read() {
		for block in event.0.iter() {
			if !blocks.contains(block) {
				blocks.push(*block);
			}
		}
	}
	if blocks.is_empty() {
		return;
	}
	for (mut cache, estimator) in query.iter_mut() {
		let purged = cache.purge_blocks(estimator.get_layout(), &blocks);
		if purged > 0 {
			debug!("Purged {} cached paths", purged);
		}
	}
}

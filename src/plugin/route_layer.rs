//! Logic relating to serving path requests and caching their results
//!

use std::collections::BTreeMap;
use std::time::Duration;

use crate::prelude::*;
use bevy::prelude::*;

/// Describes the properties of a cached path
#[derive(Clone, Copy, Debug, Reflect)]
pub struct PathMetadata {
	/// Fine cell the path starts from
	source: GridCell,
	/// Fine cell the path leads to
	target: GridCell,
	/// Movement class the path was searched for
	class: MoveClassId,
	/// Marks the path based on time elapsed since app start, used to enable
	/// automatic cleardown of long lived paths that are probably not needed
	/// anymore
	time_generated: Duration,
}

// `time_generated` takes no part in identifying a path
impl PartialEq for PathMetadata {
	fn eq(&self, other: &Self) -> bool {
		(self.source, self.target, self.class) == (other.source, other.target, other.class)
	}
}
impl Eq for PathMetadata {}

impl Ord for PathMetadata {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		(self.source, self.target, self.class).cmp(&(other.source, other.target, other.class))
	}
}

impl PartialOrd for PathMetadata {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl PathMetadata {
	/// Create a new instance of [PathMetadata]
	pub fn new(source: GridCell, target: GridCell, class: MoveClassId, time_generated: Duration) -> Self {
		PathMetadata {
			source,
			target,
			class,
			time_generated,
		}
	}
	pub fn get_source(&self) -> GridCell {
		self.source
	}
	pub fn get_target(&self) -> GridCell {
		self.target
	}
	pub fn get_class(&self) -> MoveClassId {
		self.class
	}
	/// Get when the path was generated
	pub fn get_time_generated(&self) -> Duration {
		self.time_generated
	}
}

/// Solved paths keyed by `(source, target, class)`. An actor polls the cache
/// after sending an [EventPathRequest]
#[derive(Component, Default, Clone)]
pub struct PathCache {
	/// Solved paths and how they were requested
	paths: BTreeMap<PathMetadata, PathResult>,
}

impl PathCache {
	/// Get the map of paths
	pub fn get(&self) -> &BTreeMap<PathMetadata, PathResult> {
		&self.paths
	}
	/// Get a cached path. Returns [None] if it doesn't exist
	pub fn get_path(&self, source: GridCell, target: GridCell, class: MoveClassId) -> Option<&PathResult> {
		let key = PathMetadata::new(source, target, class, Duration::default());
		let path = self.paths.get(&key);
		trace!("Path: {:?}", path.map(|p| p.get_nodes()));
		path
	}
	/// Does the cache hold a path matching the metadata
	pub fn contains(&self, metadata: &PathMetadata) -> bool {
		self.paths.contains_key(metadata)
	}
	/// Insert a solved path, replacing any older path with the same metadata
	pub fn insert_path(&mut self, metadata: PathMetadata, path: PathResult) {
		self.paths.insert(metadata, path);
	}
	/// Remove a path from the cache
	pub fn remove_path(&mut self, metadata: PathMetadata) {
		self.paths.remove(&metadata);
	}
	/// Remove every path with a node inside any of `blocks`. Returns how many
	/// were removed
	pub fn purge_blocks(&mut self, layout: &BlockLayout, blocks: &[BlockID]) -> usize {
		let grid = *layout.get_grid();
		let before = self.paths.len();
		self.paths.retain(|_, path| {
			!path
				.get_nodes()
				.iter()
				.any(|node| blocks.contains(&layout.block_of(grid.to_coord(*node))))
		});
		before - self.paths.len()
	}
	/// Remove every path of a movement class. Returns how many were removed
	pub fn purge_class(&mut self, class: MoveClassId) -> usize {
		let before = self.paths.len();
		self.paths.retain(|metadata, _| metadata.get_class() != class);
		before - self.paths.len()
	}
	/// Remove every path generated more than `max_age` before `now`
	pub fn purge_older_than(&mut self, now: Duration, max_age: Duration) -> usize {
		let before = self.paths.len();
		self.paths
			.retain(|metadata, _| now.saturating_sub(metadata.get_time_generated()) <= max_age);
		before - self.paths.len()
	}
}

/// A request to search for a path from the `source` position to the `target`
/// position for a movement class
#[derive(Event)]
pub struct EventPathRequest {
	/// Where the path starts
	source: Vec3,
	/// Where the path should end
	target: Vec3,
	/// Movement class of the actor
	class: MoveClassId,
	/// Give up once the path would cost more than this
	cutoff: Option<f32>,
}

impl EventPathRequest {
	/// Create a new instance of [EventPathRequest]
	pub fn new(source: Vec3, target: Vec3, class: MoveClassId, cutoff: Option<f32>) -> Self {
		EventPathRequest {
			source,
			target,
			class,
			cutoff,
		}
	}
}

/// Process [EventPathRequest] and insert solved paths into the [PathCache].
/// Steps are weighted by the [ChokeOverlays] of the class when present
#[cfg(not(tarpaulin_include))]
pub fn event_insert_path(
	mut events: EventReader<EventPathRequest>,
	mut query: Query<(
		&mut PathCache,
		&TraversabilityMap,
		&mut AStarSolver,
		Option<&ChokeOverlays>,
	)>,
	time: Res<Time>,
) {
	// several actors may send the same request at once, only the first of
	// each is searched
	let mut requests: Vec<&EventPathRequest> = Vec::new();
	for event in events.read() {
		let duplicate = requests.iter().any(|r| {
			r.source == event.source
				&& r.target == event.target
				&& r.class == event.class
				&& r.cutoff == event.cutoff
		});
		if !duplicate {
			requests.push(event);
		}
	}
	for (mut cache, map, mut solver, overlays) in query.iter_mut() {
		let grid = *map.get_grid();
		for request in requests.iter() {
			let metadata = PathMetadata::new(
				grid.cell_from_world_pos(request.source),
				grid.cell_from_world_pos(request.target),
				request.class,
				time.elapsed(),
			);
			// a cached path only serves requests whose cutoff it satisfies,
			// otherwise it is searched again under the tighter cutoff
			if let Some(cached) = cache.get().get(&metadata) {
				if request.cutoff.is_none_or(|c| cached.get_cost() <= c) {
					continue;
				}
				cache.remove_path(metadata);
			}
			let mut pathfinder = Pathfinder::new(map, solver.as_mut(), request.class);
			if let Some(layer) = overlays.and_then(|o| o.layer(request.class)) {
				pathfinder = pathfinder.with_overlay(layer);
			}
			let result = pathfinder.path_to_pos(request.source, request.target, request.cutoff);
			if result.is_success() {
				debug!(
					"Path found from {:?} to {:?} costing {}",
					metadata.get_source().get(),
					metadata.get_target().get(),
					result.get_cost()
				);
				cache.insert_path(metadata, result);
			} else {
				debug!(
					"No path from {:?} to {:?}",
					metadata.get_source().get(),
					metadata.get_target().get()
				);
			}
		}
	}
}

/// Purge any paths older than 15 minutes
#[cfg(not(tarpaulin_include))]
pub fn cleanup_old_paths(mut query: Query<&mut PathCache>, time: Res<Time>) {
	for mut cache in query.iter_mut() {
		cache.purge_older_than(time.elapsed(), Duration::from_secs(900));
	}
}

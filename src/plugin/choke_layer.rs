//! Logic for recomputing the [ChokeOverlays] on request
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Request a fresh choke point pass of a movement class between a set of
/// threat origins and the positions they are expected to head for
#[derive(Event)]
pub struct EventRecomputeChokepoints {
	/// Movement class whose overlay is rebuilt
	class: MoveClassId,
	/// Where threats start from
	origins: Vec<Vec3>,
	/// Where threats are heading
	destinations: Vec<Vec3>,
}

impl EventRecomputeChokepoints {
	/// Create a new instance of [EventRecomputeChokepoints]
	#[cfg(not(tarpaulin_include))]
	pub fn new(class: MoveClassId, origins: Vec<Vec3>, destinations: Vec<Vec3>) -> Self {
		EventRecomputeChokepoints {
			class,
			origins,
			destinations,
		}
	}
	#[cfg(not(tarpaulin_include))]
	pub fn get_class(&self) -> MoveClassId {
		self.class
	}
	#[cfg(not(tarpaulin_include))]
	pub fn get_origins(&self) -> &[Vec3] {
		&self.origins
	}
	#[cfg(not(tarpaulin_include))]
	pub fn get_destinations(&self) -> &[Vec3] {
		&self.destinations
	}
}

/// Read [EventRecomputeChokepoints] and run a choke point pass for each. A
/// later request for the same class replaces an earlier one in the same tick.
/// Cached paths of the class were weighted by the old overlay so they are
/// purged
#[cfg(not(tarpaulin_include))]
pub fn process_choke_requests(
	mut events: EventReader<EventRecomputeChokepoints>,
	mut query: Query<(
		&mut ChokeOverlays,
		&mut PathCache,
		&TraversabilityMap,
		&mut AStarSolver,
		&PathingConfig,
	)>,
) {
	let mut requests: Vec<&EventRecomputeChokepoints> = Vec::new();
	for event in events.read() {
		requests.retain(|r| r.get_class() != event.get_class());
		requests.push(event);
	}
	if requests.is_empty() {
		return;
	}
	for (mut overlays, mut cache, map, mut solver, config) in query.iter_mut() {
		let analyzer = ChokePointAnalyzer::new(config.choke, map.get_grid());
		for request in requests.iter() {
			let solved = analyzer.run_pass(
				overlays.as_mut(),
				solver.as_mut(),
				map,
				request.get_origins(),
				request.get_destinations(),
				request.get_class(),
			);
			let purged = cache.purge_class(request.get_class());
			debug!(
				"Recomputed choke points of class {:?} from {} paths, purged {} cached paths",
				request.get_class(),
				solved,
				purged
			);
		}
	}
}

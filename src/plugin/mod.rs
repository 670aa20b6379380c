//! Defines the Bevy [Plugin] for TerrainPathing
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod choke_layer;
pub mod route_layer;
pub mod terrain_layer;

/// Ordering of the plugin systems within [Update]
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum OrderingSet {
	/// Housekeeping of the caches
	Tidy,
	/// Terrain updates followed by searches
	Calculate,
}

/// Registers the pathing types, events and systems
pub struct TerrainPathingPlugin;

impl Plugin for TerrainPathingPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.register_type::<Ordinal>()
			.register_type::<GridIndex>()
			.register_type::<GridCell>()
			.register_type::<BlockID>()
			.register_type::<BlockLayout>()
			.register_type::<MoveClassId>()
			.register_type::<MoveClassMask>()
			.register_type::<PathStatus>()
			.register_type::<ChokeConfig>()
			.register_type::<PathingConfig>()
			.register_type::<PathMetadata>()
			.add_event::<EventUpdateTerrainCell>()
			.add_event::<EventCleanCaches>()
			.add_event::<EventPathRequest>()
			.add_event::<EventRecomputeChokepoints>()
			.configure_sets(Update, (OrderingSet::Tidy, OrderingSet::Calculate).chain())
			.add_systems(
				Update,
				(
					route_layer::cleanup_old_paths.in_set(OrderingSet::Tidy),
					(
						terrain_layer::process_terrain_updates,
						terrain_layer::clean_cache,
						choke_layer::process_choke_requests,
						route_layer::event_insert_path,
					)
						.chain()
						.in_set(OrderingSet::Calculate),
				),
			);
	}
}

//! `use bevy_terrain_pathing_plugin::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::pathing::{
	blocks::{path_estimator::*, *},
	chokepoints::*,
	config::*,
	grid::{heightmap::*, traversability::*, *},
	pathfinder::*,
	solver::{goal_rings::*, terrain_graph::*, *},
	utilities::*,
};

#[doc(hidden)]
pub use crate::{
	bundle::*,
	plugin::{choke_layer::*, route_layer::*, terrain_layer::*, *},
};

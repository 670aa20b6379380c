//! Drives the plugin systems through an [App] the way a game would, with
//! events in and cached results out
//!

use bevy::prelude::*;
use bevy_terrain_pathing_plugin::prelude::*;

/// First bit, the tank
fn tank() -> MoveClassId {
	MoveClassId::new(0).unwrap()
}

/// World position of the centre of a cell on a resolution 1 grid
fn cell_pos(x: u32, z: u32) -> Vec3 {
	Vec3::new(
		x as f32 * SQUARE_SIZE + SQUARE_SIZE / 2.0,
		0.0,
		z as f32 * SQUARE_SIZE + SQUARE_SIZE / 2.0,
	)
}

/// An app with a flat 32x32 map split into 8x8 blocks
fn setup_app() -> App {
	let mut app = App::new();
	app.add_plugins(TerrainPathingPlugin);
	app.insert_resource(Time::<()>::default());
	let heightmap = Heightmap::flat(32, 32, 10.0);
	let classes = MoveClassTable::new(vec![MoveClass::ground("tank", 0.3, 5.0, 10.0)]);
	let config = PathingConfig {
		block_size: 8,
		choke: ChokeConfig {
			repetitions: 3,
			..Default::default()
		},
		..Default::default()
	};
	app.world_mut()
		.spawn(TerrainPathingBundle::new(&heightmap, classes, config));
	app
}

/// Copy of the path cache of the single map entity
fn cache(app: &mut App) -> PathCache {
	let world = app.world_mut();
	let mut query = world.query::<&PathCache>();
	query.iter(world).next().unwrap().clone()
}

#[test]
fn path_request_fills_cache() {
	let mut app = setup_app();
	app.world_mut()
		.send_event(EventPathRequest::new(cell_pos(2, 5), cell_pos(20, 5), tank(), None));
	app.update();
	let cache = cache(&mut app);
	assert_eq!(1, cache.get().len());
	let path = cache
		.get_path(GridCell::new(2, 5), GridCell::new(20, 5), tank())
		.unwrap();
	assert_eq!(PathStatus::Solved, path.get_status());
	assert!((path.get_cost() - 18.0).abs() < 1e-4);
}

#[test]
fn duplicate_requests_solve_once() {
	let mut app = setup_app();
	for _ in 0..3 {
		app.world_mut()
			.send_event(EventPathRequest::new(cell_pos(2, 5), cell_pos(20, 5), tank(), None));
	}
	app.world_mut()
		.send_event(EventPathRequest::new(cell_pos(2, 5), cell_pos(20, 9), tank(), None));
	app.update();
	assert_eq!(2, cache(&mut app).get().len());
}

#[test]
fn unreachable_request_is_not_cached() {
	let mut app = setup_app();
	// the border ring is never passable
	app.world_mut()
		.send_event(EventPathRequest::new(cell_pos(2, 5), cell_pos(0, 5), tank(), None));
	app.update();
	assert!(cache(&mut app).get().is_empty());
}

#[test]
fn terrain_update_purges_crossing_paths() {
	let mut app = setup_app();
	app.world_mut()
		.send_event(EventPathRequest::new(cell_pos(2, 5), cell_pos(20, 5), tank(), None));
	// a path far away in other blocks
	app.world_mut()
		.send_event(EventPathRequest::new(cell_pos(2, 26), cell_pos(6, 26), tank(), None));
	app.update();
	assert_eq!(2, cache(&mut app).get().len());

	// a spike on the straight line closes it for the tank
	app.world_mut()
		.send_event(EventUpdateTerrainCell::new(GridCell::new(10, 5), 500.0));
	app.update();
	let purged = cache(&mut app);
	assert_eq!(1, purged.get().len());
	assert!(purged
		.get_path(GridCell::new(2, 26), GridCell::new(6, 26), tank())
		.is_some());

	app.world_mut()
		.send_event(EventPathRequest::new(cell_pos(2, 5), cell_pos(20, 5), tank(), None));
	app.update();
	let cache = cache(&mut app);
	let path = cache
		.get_path(GridCell::new(2, 5), GridCell::new(20, 5), tank())
		.unwrap();
	let world = app.world_mut();
	let mut query = world.query::<&TraversabilityMap>();
	let map = query.iter(world).next().unwrap();
	let spike = map.get_grid().to_index(10, 5);
	assert!(!map.is_passable(spike, tank()));
	assert!(!path.get_nodes().contains(&spike));
	assert!(path.get_cost() > 18.0);
}

#[test]
fn terrain_update_rebuilds_estimator() {
	let mut app = setup_app();
	// sink a block's middle into a deep pit the tank cannot ford
	for x in 10..14 {
		for z in 10..14 {
			app.world_mut()
				.send_event(EventUpdateTerrainCell::new(GridCell::new(x, z), -50.0));
		}
	}
	app.update();
	let world = app.world_mut();
	let mut query = world.query::<(&PathEstimator, &TraversabilityMap)>();
	let (estimator, map) = query.iter(world).next().unwrap();
	let block = BlockID::new(1, 1);
	assert!(!estimator.is_dirty(block));
	let centre = estimator.centre(block, tank()).unwrap();
	assert!(map.is_passable(centre, tank()));
}

#[test]
fn choke_request_raises_overlay() {
	let mut app = setup_app();
	let origins = vec![cell_pos(3, 10), cell_pos(3, 20)];
	let destinations = vec![cell_pos(28, 12), cell_pos(28, 18)];
	app.world_mut()
		.send_event(EventRecomputeChokepoints::new(tank(), origins, destinations));
	app.update();
	let world = app.world_mut();
	let mut query = world.query::<&ChokeOverlays>();
	let overlays = query.iter(world).next().unwrap();
	let layer = overlays.layer(tank()).unwrap();
	assert!(layer.iter().all(|v| *v >= CHOKE_BASELINE));
	assert!(layer.iter().any(|v| *v > CHOKE_BASELINE));
}

#[test]
fn tighter_cutoff_is_not_served_from_cache() {
	let mut app = setup_app();
	app.world_mut()
		.send_event(EventPathRequest::new(cell_pos(2, 5), cell_pos(20, 5), tank(), None));
	app.update();
	assert_eq!(1, cache(&mut app).get().len());

	// the cached path costs 18 so a cutoff of 5 cannot be honoured
	app.world_mut()
		.send_event(EventPathRequest::new(cell_pos(2, 5), cell_pos(20, 5), tank(), Some(5.0)));
	app.update();
	assert!(cache(&mut app)
		.get_path(GridCell::new(2, 5), GridCell::new(20, 5), tank())
		.is_none());

	// a looser cutoff is satisfied again
	app.world_mut()
		.send_event(EventPathRequest::new(cell_pos(2, 5), cell_pos(20, 5), tank(), Some(30.0)));
	app.update();
	let cache = cache(&mut app);
	let path = cache
		.get_path(GridCell::new(2, 5), GridCell::new(20, 5), tank())
		.unwrap();
	assert!((path.get_cost() - 18.0).abs() < 1e-4);
}

#[test]
fn choke_request_purges_paths_of_its_class() {
	let mut app = setup_app();
	app.world_mut()
		.send_event(EventPathRequest::new(cell_pos(2, 5), cell_pos(20, 5), tank(), None));
	app.update();
	assert_eq!(1, cache(&mut app).get().len());

	let origins = vec![cell_pos(3, 10)];
	let destinations = vec![cell_pos(28, 12)];
	app.world_mut()
		.send_event(EventRecomputeChokepoints::new(tank(), origins, destinations));
	app.update();
	assert!(cache(&mut app).get().is_empty());
}

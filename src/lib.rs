//! This is a plugin for Bevy game engine to setup and handle the logic for hierarchical A* pathfinding over heightmap terrain and for rating choke points
//!

pub mod bundle;
pub mod pathing;
pub mod plugin;

pub mod prelude;

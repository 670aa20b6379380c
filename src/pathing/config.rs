//! Tunables shared by the pathing components of a map
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Resolution of the fine grid, size of the coarse blocks and the choke pass
/// settings
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Component, Clone, Copy, Debug, PartialEq, Reflect)]
pub struct PathingConfig {
	/// Heightmap squares per fine cell along each axis
	pub resolution: u32,
	/// Fine cells along each side of a block
	pub block_size: u32,
	/// Settings of choke point passes
	pub choke: ChokeConfig,
}

impl Default for PathingConfig {
	fn default() -> Self {
		PathingConfig {
			resolution: 1,
			block_size: BLOCK_SIZE,
			choke: ChokeConfig::default(),
		}
	}
}

impl PathingConfig {
	/// Create a new instance of [PathingConfig]
	pub fn new(resolution: u32, block_size: u32, choke: ChokeConfig) -> Self {
		PathingConfig {
			resolution,
			block_size,
			choke,
		}
	}
	/// From a `.ron` file generate the [PathingConfig]
	#[cfg(feature = "ron")]
	pub fn from_ron(path: String) -> Self {
		let file = std::fs::File::open(path).expect("Failed opening PathingConfig file");
		let config: PathingConfig = match ron::de::from_reader(file) {
			Ok(config) => config,
			Err(e) => panic!("Failed deserializing PathingConfig: {}", e),
		};
		config
	}
}

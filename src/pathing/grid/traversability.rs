//! Per-cell height, slope and movement-class bitmask of the fine grid.
//!
//! Each [MoveClass] owns one bit of a [MoveClassMask]. A cell admits a class
//! when its slope is within the class tolerance and its water depth (the
//! negated height) sits between the class minimum and maximum depth. The
//! outermost ring of cells never admits anything so a search can never walk
//! off the map:
//!
//! ```text
//!  _______________
//! |_0_|_0_|_0_|_0_|
//! |_0_|_m_|_m_|_0_|
//! |_0_|_m_|_m_|_0_|
//! |_0_|_0_|_0_|_0_|
//! ```
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Checked bit position of a [MoveClass] within a [MoveClassMask]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash, Reflect)]
pub struct MoveClassId(u8);

impl MoveClassId {
	/// Largest number of classes a [MoveClassMask] can represent
	pub const MAX_CLASSES: usize = 32;
	/// Create a new instance of [MoveClassId], [None] if `bit` cannot fit in a
	/// [MoveClassMask]
	pub fn new(bit: usize) -> Option<Self> {
		if bit < Self::MAX_CLASSES {
			Some(MoveClassId(bit as u8))
		} else {
			None
		}
	}
	/// Get the bit position
	pub fn get(&self) -> usize {
		self.0 as usize
	}
}

/// Set of [MoveClassId] packed into a `u32`
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash, Reflect)]
pub struct MoveClassMask(u32);

impl MoveClassMask {
	/// A mask admitting no class
	pub const EMPTY: MoveClassMask = MoveClassMask(0);
	/// A mask admitting every class
	pub const ALL: MoveClassMask = MoveClassMask(u32::MAX);
	/// Create a mask from raw bits
	pub fn from_bits(bits: u32) -> Self {
		MoveClassMask(bits)
	}
	/// Create a mask holding a single class
	pub fn single(id: MoveClassId) -> Self {
		MoveClassMask(1 << id.get())
	}
	/// Get the raw bits
	pub fn bits(&self) -> u32 {
		self.0
	}
	pub fn is_empty(&self) -> bool {
		self.0 == 0
	}
	pub fn contains(&self, id: MoveClassId) -> bool {
		self.0 & (1 << id.get()) != 0
	}
	/// Does this mask contain every class of `other`
	pub fn contains_all(&self, other: MoveClassMask) -> bool {
		self.0 & other.0 == other.0
	}
	pub fn insert(&mut self, id: MoveClassId) {
		self.0 |= 1 << id.get();
	}
	pub fn remove(&mut self, id: MoveClassId) {
		self.0 &= !(1 << id.get());
	}
}

/// A movement capability profile shared by a family of units
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct MoveClass {
	/// Label used when logging
	name: String,
	/// Steepest normalised slope (`0..1`) the class can climb
	max_slope: f32,
	/// Shallowest water depth the class can occupy, negative values allow
	/// land above sea level
	min_depth: f32,
	/// Deepest water the class can occupy
	max_depth: f32,
	/// Strength of features the class can flatten while moving
	crush_strength: f32,
}

impl MoveClass {
	/// Create a new instance of [MoveClass]
	pub fn new(
		name: &str,
		max_slope: f32,
		min_depth: f32,
		max_depth: f32,
		crush_strength: f32,
	) -> Self {
		MoveClass {
			name: name.to_string(),
			max_slope,
			min_depth,
			max_depth,
			crush_strength,
		}
	}
	/// A class that can enter any cell regardless of slope or depth
	pub fn unrestricted(name: &str) -> Self {
		MoveClass::new(name, f32::MAX, f32::MIN, f32::MAX, 0.0)
	}
	/// A ground class that climbs up to `max_slope` and fords water up to
	/// `max_depth`
	pub fn ground(name: &str, max_slope: f32, max_depth: f32, crush_strength: f32) -> Self {
		MoveClass::new(name, max_slope, f32::MIN, max_depth, crush_strength)
	}
	/// A naval class requiring at least `min_depth` of water
	pub fn naval(name: &str, min_depth: f32, crush_strength: f32) -> Self {
		MoveClass::new(name, f32::MAX, min_depth, f32::MAX, crush_strength)
	}
	pub fn get_name(&self) -> &str {
		&self.name
	}
	pub fn get_max_slope(&self) -> f32 {
		self.max_slope
	}
	pub fn get_min_depth(&self) -> f32 {
		self.min_depth
	}
	pub fn get_max_depth(&self) -> f32 {
		self.max_depth
	}
	pub fn get_crush_strength(&self) -> f32 {
		self.crush_strength
	}
	/// Can the class occupy terrain of a given slope and height
	pub fn admits(&self, slope: f32, height: f32) -> bool {
		let depth = -height;
		slope <= self.max_slope && self.min_depth <= depth && depth <= self.max_depth
	}
}

/// Ordered list of [MoveClass] where the position of a class is its bit in a
/// [MoveClassMask]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MoveClassTable(Vec<MoveClass>);

impl MoveClassTable {
	/// Create a new instance of [MoveClassTable]
	pub fn new(classes: Vec<MoveClass>) -> Self {
		if classes.len() > MoveClassId::MAX_CLASSES {
			panic!(
				"Found {} move classes, a bitmask can only hold {}",
				classes.len(),
				MoveClassId::MAX_CLASSES
			);
		}
		MoveClassTable(classes)
	}
	/// Get a class by its id
	pub fn get(&self, id: MoveClassId) -> Option<&MoveClass> {
		self.0.get(id.get())
	}
	/// Look up the id of a class by name
	pub fn find(&self, name: &str) -> Option<MoveClassId> {
		self.0
			.iter()
			.position(|c| c.get_name() == name)
			.and_then(MoveClassId::new)
	}
	pub fn len(&self) -> usize {
		self.0.len()
	}
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
	/// Iterate over every `(id, class)` pair in bit order
	pub fn iter(&self) -> impl Iterator<Item = (MoveClassId, &MoveClass)> {
		self.0
			.iter()
			.enumerate()
			.filter_map(|(i, c)| MoveClassId::new(i).map(|id| (id, c)))
	}
	/// Compute which classes admit terrain of a given slope and height
	pub fn mask_for(&self, slope: f32, height: f32) -> MoveClassMask {
		let mut mask = MoveClassMask::EMPTY;
		for (id, class) in self.iter() {
			if class.admits(slope, height) {
				mask.insert(id);
			}
		}
		mask
	}
	/// From a `.ron` file generate the [MoveClassTable]
	#[cfg(feature = "ron")]
	pub fn from_ron(path: String) -> Self {
		let file = std::fs::File::open(path).expect("Failed opening MoveClassTable file");
		let table: MoveClassTable = match ron::de::from_reader(file) {
			Ok(table) => table,
			Err(e) => panic!("Failed deserializing MoveClassTable: {}", e),
		};
		MoveClassTable::new(table.0)
	}
}

/// Height, slope and [MoveClassMask] of every fine cell
#[derive(Component, Clone, Debug, Default)]
pub struct TraversabilityMap {
	/// Dimensions and conversions of the fine grid
	grid: GridIndex,
	/// Classes whose bits populate `masks`
	classes: MoveClassTable,
	/// Full resolution heights the cells were sampled from
	squares: Heightmap,
	/// Normalised slope of each heightmap square
	square_slopes: Vec<f32>,
	/// Height of each cell in world units
	heights: Vec<f32>,
	/// Steepest square slope within each cell, `0` is flat and `1` is vertical
	slopes: Vec<f32>,
	/// Which classes may occupy each cell
	masks: Vec<MoveClassMask>,
}

impl TraversabilityMap {
	/// Create a new instance of [TraversabilityMap] by down-sampling the
	/// `heightmap` by `resolution` and evaluating each class of `classes`
	pub fn new(heightmap: &Heightmap, classes: MoveClassTable, resolution: u32) -> Self {
		let grid = GridIndex::new(heightmap.get_length(), heightmap.get_depth(), resolution);
		let mut heights = Vec::with_capacity(grid.node_count());
		for z in 0..grid.get_depth() {
			for x in 0..grid.get_length() {
				heights.push(heightmap.height(x * resolution, z * resolution));
			}
		}
		let (length, depth) = heightmap.get_size();
		let mut square_slopes = Vec::with_capacity(length as usize * depth as usize);
		for z in 0..depth {
			for x in 0..length {
				square_slopes.push(square_slope(heightmap, x, z));
			}
		}
		let mut map = TraversabilityMap {
			grid,
			classes,
			squares: heightmap.clone(),
			square_slopes,
			slopes: vec![0.0; heights.len()],
			masks: vec![MoveClassMask::EMPTY; heights.len()],
			heights,
		};
		for node in 0..map.grid.node_count() {
			map.evaluate_cell(node);
		}
		debug!(
			"Built traversability map of {:?} cells for {} move classes",
			map.grid.get_size(),
			map.classes.len()
		);
		map
	}
	/// Create a flat [TraversabilityMap] from explicit masks, used for
	/// synthetic maps. The border is still forced closed
	pub fn from_masks(length: u32, depth: u32, masks: Vec<MoveClassMask>) -> Self {
		let grid = GridIndex::new(length, depth, 1);
		if masks.len() != grid.node_count() {
			panic!(
				"A `({}, {})` grid requires {} masks, found {}",
				length,
				depth,
				grid.node_count(),
				masks.len()
			);
		}
		let mut map = TraversabilityMap {
			grid,
			classes: MoveClassTable::default(),
			squares: Heightmap::flat(length, depth, 0.0),
			square_slopes: vec![0.0; masks.len()],
			heights: vec![0.0; masks.len()],
			slopes: vec![0.0; masks.len()],
			masks,
		};
		for node in 0..map.grid.node_count() {
			if map.grid.is_border(map.grid.to_coord(node)) {
				map.masks[node] = MoveClassMask::EMPTY;
			}
		}
		map
	}
	/// Create a flat [TraversabilityMap] where every interior cell is open to
	/// every class
	pub fn open(length: u32, depth: u32) -> Self {
		TraversabilityMap::from_masks(
			length,
			depth,
			vec![MoveClassMask::ALL; length as usize * depth as usize],
		)
	}
	pub fn get_grid(&self) -> &GridIndex {
		&self.grid
	}
	pub fn get_classes(&self) -> &MoveClassTable {
		&self.classes
	}
	/// Height of a node in world units
	pub fn get_height(&self, node: usize) -> f32 {
		self.heights[node.min(self.heights.len() - 1)]
	}
	/// Normalised slope of a node
	pub fn get_slope(&self, node: usize) -> f32 {
		self.slopes[node.min(self.slopes.len() - 1)]
	}
	/// Classes admitted by a node, out of range nodes admit nothing
	pub fn get_mask(&self, node: usize) -> MoveClassMask {
		self.masks.get(node).copied().unwrap_or(MoveClassMask::EMPTY)
	}
	/// Can `class` occupy `node`
	pub fn is_passable(&self, node: usize, class: MoveClassId) -> bool {
		self.get_mask(node).contains(class)
	}
	/// Overwrite a single mask, used for synthetic obstacles. Border cells
	/// stay closed
	pub fn set_mask(&mut self, cell: GridCell, mask: MoveClassMask) {
		if self.grid.is_border(cell) {
			warn!("Ignoring mask change of border cell {:?}", cell.get());
			return;
		}
		let node = self.grid.cell_to_index(cell);
		self.masks[node] = mask;
	}
	/// Change the height of a cell, flattening every heightmap square it
	/// covers, and re-evaluate it and its neighbours. Returns the inclusive
	/// corners of the area whose masks may have changed
	pub fn set_cell_height(&mut self, cell: GridCell, height: f32) -> (GridCell, GridCell) {
		let node = self.grid.cell_to_index(cell);
		self.heights[node] = height;
		let (x, z) = self.grid.to_coord(node).get();
		let res = self.grid.get_resolution();
		for sz in z * res..(z + 1) * res {
			for sx in x * res..(x + 1) * res {
				self.squares.set_height(sx, sz, height);
			}
		}
		// squares either side of the flattened patch see a new neighbour
		let (length, depth) = self.squares.get_size();
		let square_min = ((x * res).saturating_sub(1), (z * res).saturating_sub(1));
		let square_max = (((x + 1) * res).min(length - 1), ((z + 1) * res).min(depth - 1));
		for sz in square_min.1..=square_max.1 {
			for sx in square_min.0..=square_max.0 {
				self.square_slopes[(sz * length + sx) as usize] =
					square_slope(&self.squares, sx, sz);
			}
		}
		let min = self.grid.clamp(x as i64 - 1, z as i64 - 1);
		let max = self.grid.clamp(x as i64 + 1, z as i64 + 1);
		for row in min.get_row()..=max.get_row() {
			for column in min.get_column()..=max.get_column() {
				let n = self.grid.cell_to_index(GridCell::new(column, row));
				self.evaluate_cell(n);
			}
		}
		(min, max)
	}
	/// Mean height of the cells above water
	pub fn average_height(&self) -> f32 {
		let above: Vec<f32> = self.heights.iter().copied().filter(|h| *h > 0.0).collect();
		if above.is_empty() {
			0.0
		} else {
			above.iter().sum::<f32>() / above.len() as f32
		}
	}
	/// Cumulative count of cells whose slope is at or below the upper edge of
	/// each of `buckets` evenly sized slope ranges
	pub fn slope_histogram(&self, buckets: usize) -> Vec<u32> {
		let mut counts = vec![0; buckets];
		if buckets == 0 {
			return counts;
		}
		for slope in self.slopes.iter() {
			let bucket = ((slope * buckets as f32).ceil() as usize).saturating_sub(1);
			counts[bucket.min(buckets - 1)] += 1;
		}
		for i in 1..buckets {
			counts[i] += counts[i - 1];
		}
		counts
	}
	/// Recompute the slope and mask of a node from the current square slopes
	fn evaluate_cell(&mut self, node: usize) {
		let cell = self.grid.to_coord(node);
		let height = self.heights[node];
		let (x, z) = cell.get();
		let res = self.grid.get_resolution();
		let length = self.squares.get_length();
		// max pool the squares the cell spans, each square already looks at
		// its axis neighbours so a step on the cell seam is caught too
		let mut slope: f32 = 0.0;
		for sz in z * res..(z + 1) * res {
			for sx in x * res..(x + 1) * res {
				slope = slope.max(self.square_slopes[(sz * length + sx) as usize]);
			}
		}
		self.slopes[node] = slope;
		self.masks[node] = if self.grid.is_border(cell) {
			MoveClassMask::EMPTY
		} else {
			self.classes.mask_for(slope, height)
		};
	}
}

/// Normalised slope of a heightmap square from the steepest rise towards any
/// axis neighbour
fn square_slope(heightmap: &Heightmap, x: u32, z: u32) -> f32 {
	let (length, depth) = heightmap.get_size();
	let height = heightmap.height(x, z);
	let mut max_rise: f32 = 0.0;
	if x > 0 {
		max_rise = max_rise.max((height - heightmap.height(x - 1, z)).abs());
	}
	if x + 1 < length {
		max_rise = max_rise.max((height - heightmap.height(x + 1, z)).abs());
	}
	if z > 0 {
		max_rise = max_rise.max((height - heightmap.height(x, z - 1)).abs());
	}
	if z + 1 < depth {
		max_rise = max_rise.max((height - heightmap.height(x, z + 1)).abs());
	}
	let gradient = max_rise / SQUARE_SIZE;
	// 1 - cos(atan(gradient)) keeps the value within 0..1
	1.0 - 1.0 / (1.0 + gradient * gradient).sqrt()
}

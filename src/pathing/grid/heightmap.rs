//! The engine heightmap consumed when building a [TraversabilityMap]. Heights
//! are sampled per heightmap square, negative values are under water
//!

use bevy::prelude::*;

/// Dense row-major array of heights measured in heightmap squares
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Heightmap {
	/// Number of squares along `x` and `z`
	size: (u32, u32),
	/// Heights stored as `z * length + x`
	heights: Vec<f32>,
}

impl Heightmap {
	/// Create a new instance of [Heightmap] from a row-major list of heights
	pub fn new(length: u32, depth: u32, heights: Vec<f32>) -> Self {
		if length == 0 || depth == 0 {
			panic!("Heightmap dimensions must be non-zero");
		}
		let required = length as usize * depth as usize;
		if heights.len() != required {
			panic!(
				"Heightmap of `({}, {})` requires {} heights, found {}",
				length,
				depth,
				required,
				heights.len()
			);
		}
		Heightmap {
			size: (length, depth),
			heights,
		}
	}
	/// Create a [Heightmap] where every square has the same `height`
	pub fn flat(length: u32, depth: u32, height: f32) -> Self {
		Heightmap::new(length, depth, vec![height; length as usize * depth as usize])
	}
	/// Create a [Heightmap] by evaluating `f(x, z)` for each square
	pub fn from_fn(length: u32, depth: u32, f: impl Fn(u32, u32) -> f32) -> Self {
		let mut heights = Vec::with_capacity(length as usize * depth as usize);
		for z in 0..depth {
			for x in 0..length {
				heights.push(f(x, z));
			}
		}
		Heightmap::new(length, depth, heights)
	}
	/// Get the `(length, depth)` in squares
	pub fn get_size(&self) -> (u32, u32) {
		self.size
	}
	pub fn get_length(&self) -> u32 {
		self.size.0
	}
	pub fn get_depth(&self) -> u32 {
		self.size.1
	}
	/// Height at a square, out of range coordinates read the nearest edge
	pub fn height(&self, x: u32, z: u32) -> f32 {
		let x = x.min(self.size.0 - 1) as usize;
		let z = z.min(self.size.1 - 1) as usize;
		self.heights[z * self.size.0 as usize + x]
	}
	/// Overwrite the height of a square
	pub fn set_height(&mut self, x: u32, z: u32, height: f32) {
		if x >= self.size.0 || z >= self.size.1 {
			error!(
				"Cannot set height of square ({}, {}) outside of heightmap {:?}",
				x, z, self.size
			);
			return;
		}
		self.heights[z as usize * self.size.0 as usize + x as usize] = height;
	}
	/// From a CSV file of comma separated heights without headers, where each
	/// line is a row of constant `z`, generate a [Heightmap]
	#[cfg(feature = "csv")]
	pub fn from_csv(path: String) -> Self {
		let data = std::fs::File::open(path).expect("Failed opening heightmap csv");
		let mut rdr = csv::ReaderBuilder::new()
			.has_headers(false)
			.from_reader(data);
		let mut heights = Vec::new();
		let mut length = None;
		let mut depth = 0;
		for record in rdr.records() {
			let record = record.expect("Failed reading heightmap csv record");
			let row: Vec<f32> = record
				.iter()
				.map(|v| v.trim().parse().expect("CSV expects f32 heights"))
				.collect();
			match length {
				None => length = Some(row.len() as u32),
				Some(l) if l as usize != row.len() => {
					panic!("Heightmap csv rows must all have {} values", l)
				}
				_ => {}
			}
			heights.extend(row);
			depth += 1;
		}
		Heightmap::new(length.unwrap_or(0), depth, heights)
	}
	/// Create a [Heightmap] from a greyscale image where each pixel is one
	/// square. Black maps onto `min_height` and white onto `max_height`
	#[cfg(feature = "heightmap")]
	pub fn from_heightmap(path: String, min_height: f32, max_height: f32) -> Self {
		use photon_rs::native::open_image;
		let img = open_image(&path).expect("Failed to open heightmap");
		let img_width = img.get_width();
		let img_height = img.get_height();
		let raw_pixels = img.get_raw_pixels();
		// raw pixels come from the top left in sets of 3 or 4 (if alpha is included)
		let len_if_alpha = img_width * img_height * 4;
		let chunk_size = if len_if_alpha as usize == raw_pixels.len() {
			4
		} else {
			3
		};
		let heights = raw_pixels
			.chunks(chunk_size)
			.map(|rgb| {
				let grey = (rgb[0] as f32 + rgb[1] as f32 + rgb[2] as f32) / 3.0;
				min_height + (max_height - min_height) * grey / 255.0
			})
			.collect();
		Heightmap::new(img_width, img_height, heights)
	}
}

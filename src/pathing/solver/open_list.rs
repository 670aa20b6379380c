//! Index based binary heap used as the open list of the solver. Every node
//! in the heap has its heap position recorded so that a cheaper route to an
//! open node can be applied with a decrease-key rather than a duplicate push
//!

/// Marks a node that is not in the heap
const NOT_QUEUED: usize = usize::MAX;

/// An open node awaiting expansion
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpenEntry {
	/// Estimated total cost through the node
	pub f: f32,
	/// Cost from the start to the node
	pub g: f32,
	/// Node index
	pub node: usize,
}

impl OpenEntry {
	/// Should `self` be expanded before `other`. Lower `f` first, ties go to
	/// the lower `g` and then the lower node index
	fn precedes(&self, other: &OpenEntry) -> bool {
		if self.f != other.f {
			return self.f < other.f;
		}
		if self.g != other.g {
			return self.g < other.g;
		}
		self.node < other.node
	}
}

/// Min-heap of [OpenEntry]
#[derive(Clone, Debug, Default)]
pub struct OpenList {
	/// Heap ordered array of entries
	heap: Vec<OpenEntry>,
	/// Position of each node within `heap`
	positions: Vec<usize>,
}

impl OpenList {
	/// Create an [OpenList] able to hold `node_count` distinct nodes
	pub fn new(node_count: usize) -> Self {
		OpenList {
			heap: Vec::new(),
			positions: vec![NOT_QUEUED; node_count],
		}
	}
	/// Grow the position table to cover `node_count` nodes
	pub fn resize(&mut self, node_count: usize) {
		if self.positions.len() < node_count {
			self.positions.resize(node_count, NOT_QUEUED);
		}
	}
	pub fn len(&self) -> usize {
		self.heap.len()
	}
	pub fn is_empty(&self) -> bool {
		self.heap.is_empty()
	}
	pub fn contains(&self, node: usize) -> bool {
		self.positions.get(node).is_some_and(|p| *p != NOT_QUEUED)
	}
	/// Drop every entry
	pub fn clear(&mut self) {
		for entry in self.heap.iter() {
			self.positions[entry.node] = NOT_QUEUED;
		}
		self.heap.clear();
	}
	/// Add a node that is not yet queued
	pub fn push(&mut self, entry: OpenEntry) {
		let index = self.heap.len();
		self.heap.push(entry);
		self.positions[entry.node] = index;
		self.sift_up(index);
	}
	/// Remove the entry that should be expanded next
	pub fn pop(&mut self) -> Option<OpenEntry> {
		if self.heap.is_empty() {
			return None;
		}
		let last = self.heap.len() - 1;
		self.swap(0, last);
		let entry = self.heap.pop()?;
		self.positions[entry.node] = NOT_QUEUED;
		if !self.heap.is_empty() {
			self.sift_down(0);
		}
		Some(entry)
	}
	/// Lower the costs of a queued node and restore heap order
	pub fn decrease(&mut self, node: usize, f: f32, g: f32) {
		if let Some(&index) = self.positions.get(node) {
			if index == NOT_QUEUED {
				return;
			}
			self.heap[index].f = f;
			self.heap[index].g = g;
			self.sift_up(index);
		}
	}
	/// Swap two heap slots and their recorded positions
	fn swap(&mut self, a: usize, b: usize) {
		self.heap.swap(a, b);
		self.positions[self.heap[a].node] = a;
		self.positions[self.heap[b].node] = b;
	}
	/// Move an entry towards the root while it precedes its parent
	fn sift_up(&mut self, mut index: usize) {
		while index > 0 {
			let parent = (index - 1) / 2;
			if self.heap[index].precedes(&self.heap[parent]) {
				self.swap(index, parent);
				index = parent;
			} else {
				break;
			}
		}
	}
	/// Move an entry towards the leaves while a child precedes it
	fn sift_down(&mut self, mut index: usize) {
		let len = self.heap.len();
		loop {
			let left = index * 2 + 1;
			let right = left + 1;
			let mut best = index;
			if left < len && self.heap[left].precedes(&self.heap[best]) {
				best = left;
			}
			if right < len && self.heap[right].precedes(&self.heap[best]) {
				best = right;
			}
			if best == index {
				break;
			}
			self.swap(index, best);
			index = best;
		}
	}
}

pub mod node;

pub use node::*;
pub use node::build::{BuildConfig, ERROR_THRESHOLD, MAX_DEPTH};
pub use node::error::{BuildError, QueryError, RenderError};
pub use node::region::{PixelRect, Region};
pub use node::sample::RegionSampler;
pub use node::stats::{color_from_histogram, weighted_average, Color, Histogram};

/// A leaf region as handed out for reconstruction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeafDescriptor {
	pub region: Region,
	pub color: Color,
	pub depth: usize,
}

impl From<&QuadtreeNode> for LeafDescriptor {
	fn from(node: &QuadtreeNode) -> Self {
		Self { region: node.region, color: node.color, depth: node.depth }
	}
}

/// A fully built quadtree over one image.
///
/// Immutable once built; leaves can be collected at any depth up to
/// `max_depth` any number of times.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadTree {
	root: QuadtreeNode,
	width: u32,
	height: u32,
	max_depth: usize,
}

impl QuadTree {
	/// Analyzes `source` into a quadtree, subdividing every region whose
	/// error is above `config.error_threshold` until `config.max_depth`.
	pub fn build<S: RegionSampler + ?Sized>(source: &S, config: &BuildConfig) -> Result<Self, BuildError> {
		let (width, height) = source.dimensions();
		let (root, max_depth) = node::build::build_tree(source, config)?;
		Ok(Self { root, width, height, max_depth })
	}

	pub fn root(&self) -> &QuadtreeNode {
		&self.root
	}

	pub fn width(&self) -> u32 {
		self.width
	}

	pub fn height(&self) -> u32 {
		self.height
	}

	/// Depth of the deepest leaf.
	pub fn max_depth(&self) -> usize {
		self.max_depth
	}

	/// Collects the nodes that make up a reconstruction at `depth`.
	///
	/// Descent stops at leaves and at nodes exactly `depth` deep. A leaf
	/// finalized shallower than `depth` is returned at its own depth, so
	/// the result can mix block sizes. Order is top-left, top-right,
	/// bottom-left, bottom-right at every level.
	pub fn get_leaf_nodes(&self, depth: usize) -> Result<Vec<LeafDescriptor>, QueryError> {
		if depth > self.max_depth {
			return Err(QueryError::DepthOutOfRange { requested: depth, max: self.max_depth });
		}
		let mut leaves = Vec::new();
		collect_leaves(&self.root, depth, &mut leaves);
		Ok(leaves)
	}
}

fn collect_leaves(node: &QuadtreeNode, depth: usize, leaves: &mut Vec<LeafDescriptor>) {
	match node.sections() {
		Some(sections) if node.depth != depth => {
			for section in sections.iter() {
				collect_leaves(section, depth, leaves);
			}
		},
		_ => leaves.push(node.into()),
	}
}

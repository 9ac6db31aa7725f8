pub mod build;
pub mod error;
pub mod region;
pub mod sample;
pub mod stats;

use region::Region;
use sample::RegionSampler;
use stats::Color;

/// Node in a quadtree for storing an image.
///
/// Every node, leaf or branch, carries the average color of its region,
/// such that tree descent can stop at any level and give a meaningful
/// preview.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadtreeNode {
	pub region: Region,
	pub depth: usize,
	pub color: Color,
	pub error: f64,
	pub kind: NodeKind,
}

/// Whether a node was finalized or subdivided.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
	Leaf,
	/// Subsections ordered top-left, top-right, bottom-left, bottom-right.
	Internal(Box<[QuadtreeNode; 4]>),
}

impl QuadtreeNode {
	pub fn is_leaf(&self) -> bool {
		matches!(self.kind, NodeKind::Leaf)
	}

	pub fn sections(&self) -> Option<&[QuadtreeNode; 4]> {
		match &self.kind {
			NodeKind::Leaf => None,
			NodeKind::Internal(sections) => Some(sections),
		}
	}

	/// Number of nodes in this subtree, including this one.
	pub fn node_count(&self) -> usize {
		1 + self.sections()
			.map(|s| s.iter().map(QuadtreeNode::node_count).sum())
			.unwrap_or(0)
	}

	/// Depth of the deepest leaf below (or at) this node.
	pub fn deepest_leaf(&self) -> usize {
		match self.sections() {
			None => self.depth,
			Some(s) => s.iter().map(QuadtreeNode::deepest_leaf).max().unwrap_or(self.depth),
		}
	}
}

/// A region that has been sampled but not yet finalized.
///
/// Sampling happens exactly once, in `measure`; the resulting color and
/// error are carried into whichever `QuadtreeNode` the section becomes.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
	pub region: Region,
	pub depth: usize,
	pub color: Color,
	pub error: f64,
}

impl Section {
	/// Samples `region` from `source` and derives its color statistics.
	///
	/// Panics if `region` covers no pixels; `split` never produces such
	/// a region for a section where `region.is_divisible()` holds.
	pub fn measure<S: RegionSampler + ?Sized>(source: &S, region: Region, depth: usize) -> Self {
		let rect = region.pixel_rect();
		assert!(!rect.is_empty(), "sampled region {:?} covers no pixels", region);
		let (color, error) = stats::color_from_histogram(&source.sample(&rect));
		Self { region, depth, color, error }
	}

	/// Measures the four quadrants one level deeper.
	pub fn split<S: RegionSampler + ?Sized>(&self, source: &S) -> [Section; 4] {
		let [tl, tr, bl, br] = self.region.quadrants();
		let depth = self.depth + 1;
		[
			Section::measure(source, tl, depth),
			Section::measure(source, tr, depth),
			Section::measure(source, bl, depth),
			Section::measure(source, br, depth),
		]
	}

	pub fn into_leaf(self) -> QuadtreeNode {
		self.into_node(NodeKind::Leaf)
	}

	pub fn into_internal(self, sections: [QuadtreeNode; 4]) -> QuadtreeNode {
		self.into_node(NodeKind::Internal(Box::new(sections)))
	}

	fn into_node(self, kind: NodeKind) -> QuadtreeNode {
		QuadtreeNode {
			region: self.region,
			depth: self.depth,
			color: self.color,
			error: self.error,
			kind,
		}
	}
}

pub mod render;

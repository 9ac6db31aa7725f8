/// Axis-aligned rectangle of an image, left/top inclusive and right/bottom
/// exclusive.
///
/// Edges are kept as real numbers so that halving an odd-sized region
/// gives an exact midpoint. Conversion to whole pixels happens only
/// when sampling or drawing, through `pixel_rect`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
	pub left: f64,
	pub top: f64,
	pub right: f64,
	pub bottom: f64,
}

/// Whole-pixel rectangle, in the same inclusive-exclusive convention
/// as `Region`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelRect {
	pub left: u32,
	pub top: u32,
	pub right: u32,
	pub bottom: u32,
}

impl PixelRect {
	pub fn width(&self) -> u32 {
		self.right.saturating_sub(self.left)
	}

	pub fn height(&self) -> u32 {
		self.bottom.saturating_sub(self.top)
	}

	pub fn is_empty(&self) -> bool {
		self.width() == 0 || self.height() == 0
	}

	pub fn area(&self) -> u64 {
		self.width() as u64 * self.height() as u64
	}
}

/// Rounds one edge to a pixel boundary, ties to even. Every edge goes
/// through here so that an edge shared between two regions lands on the
/// same pixel.
fn snap(edge: f64) -> u32 {
	edge.round_ties_even().max(0.) as u32
}

impl Region {
	pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
		Self { left, top, right, bottom }
	}

	/// Region covering a whole `width` by `height` image.
	pub fn full(width: u32, height: u32) -> Self {
		Self::new(0., 0., width as f64, height as f64)
	}

	pub fn width(&self) -> f64 {
		self.right - self.left
	}

	pub fn height(&self) -> f64 {
		self.bottom - self.top
	}

	/// Exact center, used as the shared edge of all four quadrants.
	pub fn midpoint(&self) -> (f64, f64) {
		(
			self.left + (self.right - self.left) / 2.,
			self.top + (self.bottom - self.top) / 2.,
		)
	}

	/// The four quadrants, ordered top-left, top-right, bottom-left,
	/// bottom-right.
	pub fn quadrants(&self) -> [Region; 4] {
		let (mid_x, mid_y) = self.midpoint();
		[
			Region::new(self.left, self.top, mid_x, mid_y),
			Region::new(mid_x, self.top, self.right, mid_y),
			Region::new(self.left, mid_y, mid_x, self.bottom),
			Region::new(mid_x, mid_y, self.right, self.bottom),
		]
	}

	/// Pixels covered by this region.
	pub fn pixel_rect(&self) -> PixelRect {
		PixelRect {
			left: snap(self.left),
			top: snap(self.top),
			right: snap(self.right),
			bottom: snap(self.bottom),
		}
	}

	/// Whether every quadrant still covers at least one pixel.
	pub fn is_divisible(&self) -> bool {
		self.quadrants().iter().all(|q| !q.pixel_rect().is_empty())
	}
}

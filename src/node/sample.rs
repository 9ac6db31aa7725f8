use super::region::PixelRect;
use super::stats::Histogram;

/// Trait for sources a quadtree can be built from: anything with fixed
/// dimensions that can count the colors inside a pixel rectangle.
///
/// Implementors are shared between worker threads during a build, hence
/// the `Sync` bound.
pub trait RegionSampler: Sync {
	/// Width and height in pixels.
	fn dimensions(&self) -> (u32, u32);
	/// Counts the colors inside `rect`. `rect` is never empty and never
	/// extends past `dimensions`.
	fn sample(&self, rect: &PixelRect) -> Histogram;
}

impl RegionSampler for image::RgbImage {
	fn dimensions(&self) -> (u32, u32) {
		image::RgbImage::dimensions(self)
	}

	fn sample(&self, rect: &PixelRect) -> Histogram {
		let mut hist = Histogram::new();
		for y in rect.top..rect.bottom {
			for x in rect.left..rect.right {
				hist.add(*self.get_pixel(x, y));
			}
		}
		hist
	}
}

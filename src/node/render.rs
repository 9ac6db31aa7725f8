use std::io::Write;

use image::codecs::gif::GifEncoder;
use image::{Delay, DynamicImage, Frame, RgbImage};

use super::error::{QueryError, RenderError};
use super::region::PixelRect;
use super::stats::Color;
use crate::{LeafDescriptor, QuadTree};

/// Color of leaf outlines and of the empty canvas.
pub const BORDER_COLOR: Color = image::Rgb([0, 0, 0]);

/// Limits `rect` to the canvas so that foreign leaves can't draw out of
/// bounds.
fn clip(rect: PixelRect, canvas: &RgbImage) -> PixelRect {
	PixelRect {
		left: rect.left.min(canvas.width()),
		top: rect.top.min(canvas.height()),
		right: rect.right.min(canvas.width()),
		bottom: rect.bottom.min(canvas.height()),
	}
}

fn outline(canvas: &mut RgbImage, rect: &PixelRect, color: Color) {
	for x in rect.left..rect.right {
		canvas.put_pixel(x, rect.top, color);
		canvas.put_pixel(x, rect.bottom - 1, color);
	}
	for y in rect.top..rect.bottom {
		canvas.put_pixel(rect.left, y, color);
		canvas.put_pixel(rect.right - 1, y, color);
	}
}

/// Paints each leaf's region with its average color.
///
/// With `borders`, every leaf rectangle also gets a one pixel
/// `BORDER_COLOR` outline drawn inside its own area.
pub fn draw_leaves(canvas: &mut RgbImage, leaves: &[LeafDescriptor], borders: bool) {
	for leaf in leaves {
		let rect = clip(leaf.region.pixel_rect(), canvas);
		if rect.is_empty() {
			continue;
		}
		image::imageops::replace(
			canvas,
			&RgbImage::from_pixel(rect.width(), rect.height(), leaf.color),
			rect.left,
			rect.top,
		);
		if borders {
			outline(canvas, &rect, BORDER_COLOR);
		}
	}
}

impl QuadTree {
	/// Reconstructs the image from the leaves at `depth`.
	pub fn to_image(&self, depth: usize, borders: bool) -> Result<RgbImage, QueryError> {
		let leaves = self.get_leaf_nodes(depth)?;
		let mut canvas = RgbImage::from_pixel(self.width(), self.height(), BORDER_COLOR);
		draw_leaves(&mut canvas, &leaves, borders);
		Ok(canvas)
	}

	/// Writes an animated GIF with one frame per depth from the root down
	/// to `depth`, each shown for `frame_delay_ms`.
	pub fn write_gif<W: Write>(
		&self,
		writer: W,
		depth: usize,
		borders: bool,
		frame_delay_ms: u32,
	) -> Result<(), RenderError> {
		let mut frames = Vec::with_capacity(depth + 1);
		for d in 0..=depth {
			let rgba = DynamicImage::ImageRgb8(self.to_image(d, borders)?).into_rgba8();
			frames.push(Frame::from_parts(rgba, 0, 0, Delay::from_numer_denom_ms(frame_delay_ms, 1)));
		}
		GifEncoder::new(writer).encode_frames(frames)?;
		Ok(())
	}
}

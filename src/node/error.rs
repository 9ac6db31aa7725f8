use thiserror::Error;

/// Reason why an image couldn't be turned into a quadtree.
#[derive(Debug, Error)]
pub enum BuildError {
	/// The image has no pixels to sample.
	#[error("image has zero area: {width}x{height}")]
	EmptyImage { width: u32, height: u32 },
	/// A `BuildConfig` field is out of its valid range.
	#[error("invalid build configuration: {0}")]
	InvalidConfig(String),
}

/// Reason why leaves couldn't be collected from a quadtree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
	/// The requested depth is deeper than any node that was finalized.
	#[error("requested depth {requested} exceeds tree depth {max}")]
	DepthOutOfRange { requested: usize, max: usize },
}

/// Reason why a quadtree couldn't be rendered.
#[derive(Debug, Error)]
pub enum RenderError {
	#[error(transparent)]
	Query(#[from] QueryError),
	/// The GIF encoder rejected a frame or the writer failed.
	#[error("could not encode output: {0}")]
	Encode(#[from] image::ImageError),
}

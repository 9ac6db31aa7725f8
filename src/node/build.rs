use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use super::error::BuildError;
use super::region::Region;
use super::sample::RegionSampler;
use super::{QuadtreeNode, Section};

/// Default depth past which no region is subdivided.
pub const MAX_DEPTH: usize = 8;
/// Default error at or below which a region counts as flat.
pub const ERROR_THRESHOLD: f64 = 13.;
/// Default depth below which subtrees are built on the calling thread.
pub const PARALLEL_DEPTH: usize = 4;

/// Tunables for building a quadtree.
///
/// Lower `max_depth` or higher `error_threshold` give coarser trees and
/// stronger compression.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildConfig {
	pub max_depth: usize,
	pub error_threshold: f64,
	/// Nodes shallower than this build their four subtrees in parallel;
	/// deeper ones recurse sequentially. 0 disables parallelism.
	pub parallel_depth: usize,
	/// Size of a dedicated thread pool; `None` uses rayon's global pool.
	pub threads: Option<usize>,
	/// Time budget for the build. Once it runs out, every region not yet
	/// decided on is finalized as a leaf.
	pub deadline: Option<Duration>,
}

impl Default for BuildConfig {
	fn default() -> Self {
		Self {
			max_depth: MAX_DEPTH,
			error_threshold: ERROR_THRESHOLD,
			parallel_depth: PARALLEL_DEPTH,
			threads: None,
			deadline: None,
		}
	}
}

impl BuildConfig {
	pub fn validate(&self) -> Result<(), BuildError> {
		if !self.error_threshold.is_finite() || self.error_threshold < 0. {
			return Err(BuildError::InvalidConfig(format!(
				"error threshold must be a non-negative number, got {}",
				self.error_threshold
			)));
		}
		if self.threads == Some(0) {
			return Err(BuildError::InvalidConfig("thread count must be at least 1".into()));
		}
		Ok(())
	}
}

/// Shared state of one build. Subtrees only share the source image,
/// which is read-only, and the deepest-leaf counter.
struct Builder<'a, S: ?Sized> {
	source: &'a S,
	config: &'a BuildConfig,
	deadline: Option<Instant>,
	max_depth: AtomicUsize,
}

impl<'a, S: RegionSampler + ?Sized> Builder<'a, S> {
	fn should_stop(&self, section: &Section) -> bool {
		section.depth >= self.config.max_depth
			|| section.error <= self.config.error_threshold
			|| !section.region.is_divisible()
			|| self.deadline.map_or(false, |d| Instant::now() >= d)
	}

	fn build(&self, section: Section) -> QuadtreeNode {
		if self.should_stop(&section) {
			self.max_depth.fetch_max(section.depth, Ordering::Relaxed);
			trace!(depth = section.depth, error = section.error, "leaf");
			return section.into_leaf();
		}

		let [tl, tr, bl, br] = section.split(self.source);
		let sections = if section.depth < self.config.parallel_depth {
			let ((tl, tr), (bl, br)) = rayon::join(
				|| rayon::join(|| self.build(tl), || self.build(tr)),
				|| rayon::join(|| self.build(bl), || self.build(br)),
			);
			[tl, tr, bl, br]
		} else {
			[self.build(tl), self.build(tr), self.build(bl), self.build(br)]
		};
		section.into_internal(sections)
	}
}

/// Builds the complete tree for `source`.
///
/// Returns the root together with the depth of the deepest leaf.
pub fn build_tree<S: RegionSampler + ?Sized>(
	source: &S,
	config: &BuildConfig,
) -> Result<(QuadtreeNode, usize), BuildError> {
	config.validate()?;
	let (width, height) = source.dimensions();
	if width == 0 || height == 0 {
		return Err(BuildError::EmptyImage { width, height });
	}

	let started = Instant::now();
	let builder = Builder {
		source,
		config,
		deadline: config.deadline.map(|d| started + d),
		max_depth: AtomicUsize::new(0),
	};
	let root = Section::measure(source, Region::full(width, height), 0);
	let root = match config.threads {
		Some(n) => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
			Ok(pool) => pool.install(|| builder.build(root)),
			Err(e) => {
				warn!("could not start {} worker threads ({}), using the global pool", n, e);
				builder.build(root)
			},
		},
		None => builder.build(root),
	};
	let max_depth = builder.max_depth.into_inner();

	debug!(
		width,
		height,
		nodes = root.node_count(),
		max_depth,
		elapsed_ms = started.elapsed().as_millis() as u64,
		"built quadtree"
	);
	Ok((root, max_depth))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::node::region::PixelRect;
	use crate::node::stats::Histogram;

	/// Every region is a single flat color.
	struct Uniform(u32, u32);

	impl RegionSampler for Uniform {
		fn dimensions(&self) -> (u32, u32) {
			(self.0, self.1)
		}

		fn sample(&self, rect: &PixelRect) -> Histogram {
			let mut hist = Histogram::new();
			hist.add_n(image::Rgb([40, 80, 120]), rect.area());
			hist
		}
	}

	/// Every region is half black, half white: maximal variance
	/// at any scale.
	struct Checker(u32);

	impl RegionSampler for Checker {
		fn dimensions(&self) -> (u32, u32) {
			(self.0, self.0)
		}

		fn sample(&self, rect: &PixelRect) -> Histogram {
			let mut hist = Histogram::new();
			hist.add_n(image::Rgb([0, 0, 0]), rect.area() / 2);
			hist.add_n(image::Rgb([255, 255, 255]), rect.area() - rect.area() / 2);
			hist
		}
	}

	fn sequential(max_depth: usize) -> BuildConfig {
		BuildConfig { max_depth, parallel_depth: 0, ..Default::default() }
	}

	fn check_stop_condition(node: &QuadtreeNode, config: &BuildConfig) {
		let expect_leaf = node.depth >= config.max_depth || node.error <= config.error_threshold;
		assert_eq!(node.is_leaf(), expect_leaf, "node at depth {}", node.depth);
		if let Some(sections) = node.sections() {
			for s in sections.iter() {
				check_stop_condition(s, config);
			}
		}
	}

	#[test]
	fn uniform_root_is_leaf() {
		let (root, max_depth) = build_tree(&Uniform(64, 64), &BuildConfig::default()).unwrap();
		assert!(root.is_leaf());
		assert_eq!(root.depth, 0);
		assert_eq!(max_depth, 0);
		assert_eq!(root.color, image::Rgb([40, 80, 120]));
		assert_eq!(root.error, 0.);
	}

	#[test]
	fn checker_splits_to_max_depth() {
		let config = sequential(4);
		let (root, max_depth) = build_tree(&Checker(64), &config).unwrap();
		assert_eq!(max_depth, 4);
		assert_eq!(root.node_count(), 1 + 4 + 16 + 64 + 256);
		check_stop_condition(&root, &config);
	}

	#[test]
	fn parallel_matches_sequential() {
		let img = image::RgbImage::from_fn(50, 37, |x, y| {
			image::Rgb([(x * 5) as u8, (y * 7) as u8, ((x * y) % 256) as u8])
		});
		let (seq, seq_depth) = build_tree(&img, &sequential(6)).unwrap();
		let parallel = BuildConfig { max_depth: 6, parallel_depth: 6, ..Default::default() };
		for _ in 0..4 {
			let (par, par_depth) = build_tree(&img, &parallel).unwrap();
			assert_eq!(par, seq);
			assert_eq!(par_depth, seq_depth);
		}
	}

	#[test]
	fn dedicated_pool() {
		let config = BuildConfig { max_depth: 3, threads: Some(2), ..Default::default() };
		let (root, max_depth) = build_tree(&Checker(16), &config).unwrap();
		assert_eq!(max_depth, 3);
		assert_eq!(root.deepest_leaf(), 3);
	}

	#[test]
	fn tiny_image_stops_at_pixels() {
		let (root, max_depth) = build_tree(&Checker(2), &BuildConfig::default()).unwrap();
		assert_eq!(max_depth, 1);
		let sections = root.sections().unwrap();
		assert!(sections.iter().all(|s| s.is_leaf()));
	}

	#[test]
	fn expired_deadline_stops_at_root() {
		let config = BuildConfig { deadline: Some(Duration::from_secs(0)), ..Default::default() };
		let (root, max_depth) = build_tree(&Checker(64), &config).unwrap();
		assert!(root.is_leaf());
		assert_eq!(max_depth, 0);
	}

	#[test]
	fn rejects_empty_image() {
		match build_tree(&Uniform(0, 10), &BuildConfig::default()) {
			Err(BuildError::EmptyImage { width: 0, height: 10 }) => (),
			other => panic!("unexpected result {:?}", other.map(|(_, d)| d)),
		}
	}

	#[test]
	fn error_equal_to_threshold_stops() {
		let img = image::RgbImage::from_fn(4, 4, |x, _| {
			if x < 1 { image::Rgb([0, 0, 0]) } else { image::Rgb([20, 20, 20]) }
		});
		let error = Section::measure(&img, Region::full(4, 4), 0).error;
		assert!(error > 0.);

		let at = BuildConfig { error_threshold: error, ..sequential(MAX_DEPTH) };
		let (root, max_depth) = build_tree(&img, &at).unwrap();
		assert!(root.is_leaf());
		assert_eq!(max_depth, 0);

		let below = BuildConfig { error_threshold: error * 0.999, ..sequential(MAX_DEPTH) };
		let (root, _) = build_tree(&img, &below).unwrap();
		assert!(!root.is_leaf());
	}

	#[test]
	fn rejects_bad_threshold() {
		let config = BuildConfig { error_threshold: f64::NAN, ..Default::default() };
		assert!(matches!(
			build_tree(&Uniform(4, 4), &config),
			Err(BuildError::InvalidConfig(_))
		));
	}
}

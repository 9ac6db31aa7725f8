pub type Color = image::Rgb<u8>;

/// Buckets per color channel.
pub const CHANNEL_BUCKETS: usize = 256;

/// Length of a full red, green, blue histogram.
pub const HISTOGRAM_LEN: usize = 3 * CHANNEL_BUCKETS;

/// Luma coefficients used to fold the per-channel deviations into one error.
pub const LUMA_WEIGHTS: [f64; 3] = [0.2989, 0.5870, 0.1140];

/// Per-channel intensity counts of a region: red buckets first, then green,
/// then blue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
	counts: Box<[u64]>,
}

impl Default for Histogram {
	fn default() -> Self {
		Self { counts: vec![0; HISTOGRAM_LEN].into_boxed_slice() }
	}
}

impl Histogram {
	/// Empty histogram.
	pub fn new() -> Self {
		Default::default()
	}

	/// Builds a histogram from an existing slice of exactly
	/// `HISTOGRAM_LEN` counts.
	pub fn from_counts(counts: &[u64]) -> Option<Self> {
		if counts.len() != HISTOGRAM_LEN {
			return None;
		}
		Some(Self { counts: counts.to_vec().into_boxed_slice() })
	}

	/// Counts one pixel.
	pub fn add(&mut self, color: Color) {
		for (channel, value) in color.0.iter().enumerate() {
			self.counts[channel * CHANNEL_BUCKETS + *value as usize] += 1;
		}
	}

	/// Counts `n` pixels of the same color.
	pub fn add_n(&mut self, color: Color, n: u64) {
		for (channel, value) in color.0.iter().enumerate() {
			self.counts[channel * CHANNEL_BUCKETS + *value as usize] += n;
		}
	}

	/// The 256 buckets of channel 0 (red), 1 (green) or 2 (blue).
	pub fn channel(&self, channel: usize) -> &[u64] {
		&self.counts[channel * CHANNEL_BUCKETS..(channel + 1) * CHANNEL_BUCKETS]
	}

	pub fn as_slice(&self) -> &[u64] {
		&self.counts
	}

	/// Number of pixels counted (taken from the red channel).
	pub fn total(&self) -> u64 {
		self.channel(0).iter().sum()
	}
}

/// Returns the count-weighted mean bucket and the population standard
/// deviation around it. An all-zero histogram gives `(0., 0.)`.
pub fn weighted_average(counts: &[u64]) -> (f64, f64) {
	let total: u64 = counts.iter().sum();
	if total == 0 {
		return (0., 0.);
	}
	let total = total as f64;
	let value = counts.iter()
		.enumerate()
		.map(|(i, &n)| i as f64 * n as f64)
		.sum::<f64>() / total;
	let variance = counts.iter()
		.enumerate()
		.map(|(i, &n)| n as f64 * (value - i as f64).powi(2))
		.sum::<f64>() / total;
	(value, variance.sqrt())
}

/// Average color and error of a region.
///
/// Each channel value is truncated, not rounded. The error is the
/// luma-weighted sum of the three channel deviations.
pub fn color_from_histogram(hist: &Histogram) -> (Color, f64) {
	let mut color = [0u8; 3];
	let mut error = 0.;
	for channel in 0..3 {
		let (value, deviation) = weighted_average(hist.channel(channel));
		color[channel] = value.trunc().max(0.).min(255.) as u8;
		error += deviation * LUMA_WEIGHTS[channel];
	}
	(image::Rgb(color), error)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn spikes(points: &[(usize, u64)]) -> Vec<u64> {
		let mut counts = vec![0; CHANNEL_BUCKETS];
		for &(bucket, n) in points {
			counts[bucket] = n;
		}
		counts
	}

	#[test]
	fn empty_channel() {
		assert_eq!(weighted_average(&[0; CHANNEL_BUCKETS]), (0., 0.));
	}

	#[test]
	fn single_spike() {
		assert_eq!(weighted_average(&spikes(&[(100, 42)])), (100., 0.));
	}

	#[test]
	fn two_spikes() {
		let (value, error) = weighted_average(&spikes(&[(0, 10), (255, 10)]));
		assert_eq!(value, 127.5);
		assert!((error - 127.5).abs() < 1e-9);
	}

	#[test]
	fn color_is_truncated() {
		let mut hist = Histogram::new();
		// Red mean 100.5, green 0, blue 255
		hist.add(image::Rgb([100, 0, 255]));
		hist.add(image::Rgb([101, 0, 255]));
		let (color, error) = color_from_histogram(&hist);
		assert_eq!(color, image::Rgb([100, 0, 255]));
		assert!((error - 0.5 * LUMA_WEIGHTS[0]).abs() < 1e-9);
	}

	#[test]
	fn luma_weighting() {
		let mut hist = Histogram::new();
		hist.add_n(image::Rgb([0, 0, 0]), 5);
		hist.add_n(image::Rgb([255, 255, 255]), 5);
		let (color, error) = color_from_histogram(&hist);
		assert_eq!(color, image::Rgb([127, 127, 127]));
		let expected = 127.5 * (LUMA_WEIGHTS[0] + LUMA_WEIGHTS[1] + LUMA_WEIGHTS[2]);
		assert!((error - expected).abs() < 1e-9);
	}

	#[test]
	fn from_counts_checks_length() {
		assert!(Histogram::from_counts(&[0; 10]).is_none());
		let hist = Histogram::from_counts(&[1; HISTOGRAM_LEN]).unwrap();
		assert_eq!(hist.total(), CHANNEL_BUCKETS as u64);
	}
}

use image::error::ImageError;

use quadtree_compress::{BuildConfig, BuildError, QuadTree, RenderError};

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Extensions the input file may have.
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Delay between GIF frames.
const GIF_FRAME_DELAY_MS: u32 = 1000;

/// Helper function for `main`.
fn error_exit(msg: &str, code: i32) -> ! {
	eprintln!("{}", msg);
	std::process::exit(code)
}

/// `<stem>_quadtree.<extension>` next to `input`.
fn output_path(input: &Path, extension: &str) -> PathBuf {
	let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
	input.with_file_name(format!("{}_quadtree.{}", stem, extension))
}

/// Exit status for a failed build: bad tunables are argument errors, an
/// image without pixels is bad image data.
fn build_error_code(e: &BuildError) -> i32 {
	match e {
		BuildError::InvalidConfig(_) => 2,
		BuildError::EmptyImage { .. } => 4,
	}
}

fn parse_or_exit<T: std::str::FromStr>(value: Option<&str>, default: &str, name: &str) -> T {
	match value.unwrap_or(default).parse() {
		Ok(n) => n,
		Err(_) => error_exit(&format!("Non-numeric value for {}", name), 2)
	}
}

/// `clap`-based CLI for quadtree image compression.
///
/// May exit process with status code if there are errors:
///
/// 1: `clap` error
///
/// 2: invalid arguments
///
/// 3: file I/O issues
///
/// 4: invalid image data
///
/// 10: other, potentially unknown error
fn main() {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();

	let clap_matches = clap::App::new("quadtree_compress")
		.version(env!("CARGO_PKG_VERSION"))
		.author("vkcz")
		.about("Lossy image compression by recursive quadtree subdivision.")
		.arg_from_usage("-f, --file=<FILE> 'Source image (JPG or PNG)'")
		.arg_from_usage("-l, --level=<N> 'Compression level: depth at which the image is reconstructed, from 1 to the maximum depth'")
		.arg_from_usage("-b, --borders 'Outline every block in black'")
		.arg_from_usage("-g, --gif 'Also write an animated GIF stepping through every level'")
		.arg_from_usage("-m, --max-depth=[N] 'Maximum subdivision depth; defaults to 8'")
		.arg_from_usage("-t, --threshold=[N] 'Error at or below which a block is not subdivided; defaults to 13'")
		.arg_from_usage("-j, --jobs=[N] 'Number of worker threads; defaults to one per core'")
		.get_matches();

	// Both are required, so clap has already rejected missing values
	let input_path = Path::new(clap_matches.value_of("file").unwrap_or_default());
	let level: usize = parse_or_exit(clap_matches.value_of("level"), "", "level");
	let config = BuildConfig {
		max_depth: parse_or_exit(clap_matches.value_of("max-depth"), "8", "max-depth"),
		error_threshold: parse_or_exit(clap_matches.value_of("threshold"), "13", "threshold"),
		threads: clap_matches.value_of("jobs").map(|j| parse_or_exit(Some(j), "", "jobs")),
		..Default::default()
	};
	let (borders, gif) = (clap_matches.is_present("borders"), clap_matches.is_present("gif"));

	let extension = input_path.extension()
		.map(|e| e.to_string_lossy().to_lowercase())
		.unwrap_or_default();
	if !input_path.is_file() || !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
		error_exit("No such image file (expected an existing .jpg, .jpeg or .png)", 3);
	}
	if level < 1 || level > config.max_depth {
		error_exit(&format!("Compression level must be from 1 to {}", config.max_depth), 2);
	}

	let source = match image::open(input_path) {
		Ok(i) => i,
		Err(e) => {
			let (msg, code) = match e {
				ImageError::Decoding(_) | ImageError::Unsupported(_) => ("Invalid image data", 4),
				ImageError::IoError(_) => ("File not found or could not be read", 3),
				_ => ("An error occurred", 10)
			};
			error_exit(msg, code)
		}
	}.into_rgb8();

	let tree = match QuadTree::build(&source, &config) {
		Ok(t) => t,
		Err(e) => error_exit(&e.to_string(), build_error_code(&e))
	};
	tracing::info!(max_depth = tree.max_depth(), "quadtree built");

	let output = match tree.to_image(level, borders) {
		Ok(o) => o,
		Err(e) => error_exit(&format!("{}; choose a lower compression level", e), 2)
	};
	let out_path = output_path(input_path, &extension);
	if output.save(&out_path).is_err() {
		error_exit("Could not save output", 3);
	}
	tracing::info!(path = %out_path.display(), "wrote reconstruction");

	if gif {
		let gif_path = output_path(input_path, "gif");
		let gif_fh = match File::create(&gif_path) {
			Ok(f) => f,
			Err(_) => error_exit("Could not open output file", 3)
		};
		match tree.write_gif(BufWriter::new(gif_fh), level, borders, GIF_FRAME_DELAY_MS) {
			Ok(()) => (),
			Err(RenderError::Query(e)) => error_exit(&e.to_string(), 2),
			Err(RenderError::Encode(_)) => error_exit("Could not write to output file", 3)
		}
		tracing::info!(path = %gif_path.display(), "wrote animation");
	}
}

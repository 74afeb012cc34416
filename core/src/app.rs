//! Application options

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

/// Command line options. Parsed once by the executable and passed to the
/// components that need them.
#[derive(Parser, Clone, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Options {
    /// Number of threads to use for rendering.
    #[clap(
        long = "nthreads",
        short = 't',
        value_name = "NUM",
        default_value_t = 0,
        help = "Use specified number of threads for rendering (0 = one per logical core)."
    )]
    pub n_threads: usize,

    /// Suppress all text output other than error messages.
    #[clap(long, help = "Suppress all text output other than error messages.")]
    pub quiet: bool,

    /// Path to the image file.
    #[clap(
        long = "outfile",
        short = 'o',
        value_name = "FILE",
        default_value = "volpath.png",
        help = "Write the final image to the given filename."
    )]
    pub image_file: String,

    /// Tile size.
    #[clap(
        long = "tilesize",
        short = 'p',
        value_name = "NUM",
        default_value_t = 16,
        help = "Size in pixels of square tiles rendered per thread."
    )]
    pub tile_size: usize,

    /// Samples per pixel override.
    #[clap(
        long = "spp",
        value_name = "NUM",
        help = "Override the number of samples taken per pixel."
    )]
    pub spp: Option<usize>,

    /// Seed mixed into every sampler and into layered material hashing.
    #[clap(
        long = "seed",
        value_name = "NUM",
        default_value_t = 0,
        help = "Seed for the random number generators."
    )]
    pub seed: i64,

    /// Built-in scene to render.
    #[clap(
        long = "scene",
        value_name = "NAME",
        default_value = "spheres",
        help = "Built-in scene: spheres, fog, coated, glass, hair, skin."
    )]
    pub scene: String,

    /// Maximum path depth override.
    #[clap(
        long = "maxdepth",
        value_name = "NUM",
        help = "Override the integrator's maximum path depth."
    )]
    pub max_depth: Option<i32>,

    /// Print statistics.
    #[clap(long = "stats", help = "Print rendering statistics at exit.")]
    pub stats: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            n_threads: 0,
            quiet: false,
            image_file: String::from("volpath.png"),
            tile_size: 16,
            spp: None,
            seed: 0,
            scene: String::from("spheres"),
            max_depth: None,
            stats: false,
        }
    }
}

impl Options {
    /// Returns the number of worker threads to use.
    pub fn threads(&self) -> usize {
        let max_threads = num_cpus::get();
        match self.n_threads {
            0 => max_threads,
            n if n > max_threads => {
                warn!("Num threads > max logical CPUs {}", max_threads);
                max_threads
            }
            n => n,
        }
    }
}

/// Returns a progress bar for `len` steps. Hidden when `quiet` is set.
///
/// * `len`   - Number of steps.
/// * `quiet` - Hide the progress bar.
pub fn create_progress_bar(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(len);
    match ProgressStyle::with_template("{msg} [{elapsed_precise}] {wide_bar} {pos}/{len} ({eta})") {
        Ok(style) => progress.with_style(style),
        Err(_) => progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_line() {
        let options = Options::parse_from([
            "volpath-rs",
            "--nthreads",
            "2",
            "--spp",
            "4",
            "--seed",
            "9",
            "--scene",
            "fog",
            "--maxdepth",
            "3",
            "--stats",
        ]);
        assert_eq!(options.n_threads, 2);
        assert_eq!(options.spp, Some(4));
        assert_eq!(options.seed, 9);
        assert_eq!(options.scene, "fog");
        assert_eq!(options.max_depth, Some(3));
        assert!(options.stats);
        assert_eq!(options.image_file, "volpath.png");
    }

    #[test]
    fn zero_threads_uses_every_core() {
        let options = Options::default();
        assert_eq!(options.threads(), num_cpus::get());
    }
}

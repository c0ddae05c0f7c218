//! rasterkit - 8-bit RGB image processing from the command line
//!
//! One subcommand per operator, plus YAML recipes and batch mode.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rasterkit_ops::{BorderStrategy, FilterMode, params};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "rasterkit")]
#[command(author, version, about = "8-bit RGB image processing engine")]
#[command(long_about = "
Filters, tone operators and edge detection on 8-bit RGB images.
Every operator reads the untouched input and writes a full-size result.

Examples:
  rasterkit info photo.jpg --json               # Luma statistics
  rasterkit blur photo.jpg -o soft.png -s 2.0   # Gaussian blur
  rasterkit filter in.png -o out.png -k \"-1,0,1;-2,0,2;-1,0,1\"
  rasterkit --border mirror canny in.png -o edges.png --t-high 4
  rasterkit usm in.png -o sharp.png --sharpness 2
  rasterkit run recipe.yaml in.png -o out.png
  rasterkit batch -i \"shots/*.jpg\" -o out/ -r recipe.yaml -j 8
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Border strategy for filters: pad, clamp, mirror
    #[arg(short, long, global = true, default_value = "pad")]
    border: BorderStrategy,

    /// Number of threads for batch mode (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Display image size and luma statistics
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Convert to gray at each pixel's luma
    #[command(visible_alias = "grey")]
    Gray(IoArgs),

    /// Reduce each channel to fewer bits
    Quantize(QuantizeArgs),

    /// Draw a red diagonal cross
    Cross(CrossArgs),

    /// Shift luma
    Brightness(PercentArgs),

    /// Scale luma around the median
    Contrast(PercentArgs),

    /// Percentile stretch of luma
    #[command(name = "robust-contrast", visible_alias = "rc")]
    RobustContrast(PercentArgs),

    /// Convolve with an arbitrary kernel
    #[command(visible_alias = "f")]
    Filter(FilterArgs),

    /// Gaussian blur
    Blur(BlurArgs),

    /// Canny edge detection
    Canny(CannyArgs),

    /// Unsharp masking
    #[command(visible_alias = "sharpen")]
    Usm(UsmArgs),

    /// Apply a YAML recipe of operations
    Run(RunArgs),

    /// Process many files in parallel
    Batch(BatchArgs),
}

/// Arguments for the `info` command.
#[derive(Args)]
struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

/// Input and output paths shared by every operator.
#[derive(Args)]
struct IoArgs {
    /// Input image
    input: PathBuf,

    /// Output image (.png, .jpg)
    #[arg(short, long)]
    output: PathBuf,
}

/// Arguments for the `quantize` command.
#[derive(Args)]
struct QuantizeArgs {
    #[command(flatten)]
    io: IoArgs,

    /// Bits kept per channel (1-8)
    #[arg(long, default_value_t = params::QUANTIZE_BITS_DEFAULT)]
    bits: u8,
}

/// Arguments for the `cross` command.
#[derive(Args)]
struct CrossArgs {
    #[command(flatten)]
    io: IoArgs,

    /// Cross size in percent of the image (0-100)
    #[arg(short, long, default_value_t = params::CROSS_PERCENT_DEFAULT)]
    percent: u32,
}

/// Arguments for the percentage-driven tone commands.
#[derive(Args)]
struct PercentArgs {
    #[command(flatten)]
    io: IoArgs,

    /// Strength in percent (0-100)
    #[arg(short, long)]
    percent: f64,
}

/// Arguments for the `filter` command.
#[derive(Args)]
struct FilterArgs {
    #[command(flatten)]
    io: IoArgs,

    /// Kernel rows separated by ';', weights by ',' (default: 3x3 box)
    #[arg(short, long, allow_hyphen_values = true)]
    kernel: Option<String>,

    /// Response: auto, intensity, deviation
    #[arg(short, long, default_value = "auto")]
    mode: FilterMode,
}

/// Arguments for the `blur` command.
#[derive(Args)]
struct BlurArgs {
    #[command(flatten)]
    io: IoArgs,

    /// Gaussian sigma (0.5-8.0)
    #[arg(short, long, default_value_t = params::SIGMA_DEFAULT)]
    sigma: f64,
}

/// Arguments for the `canny` command.
#[derive(Args)]
struct CannyArgs {
    #[command(flatten)]
    io: IoArgs,

    /// Smoothing sigma (0.5-8.0)
    #[arg(short, long, default_value_t = params::CANNY_SIGMA_DEFAULT)]
    sigma: f64,

    /// Low hysteresis threshold
    #[arg(long, default_value_t = params::CANNY_T_LOW_DEFAULT)]
    t_low: f64,

    /// High hysteresis threshold
    #[arg(long, default_value_t = params::CANNY_T_HIGH_DEFAULT)]
    t_high: f64,
}

/// Arguments for the `usm` command.
#[derive(Args)]
struct UsmArgs {
    #[command(flatten)]
    io: IoArgs,

    /// Blur sigma (0.5-8.0)
    #[arg(short, long, default_value_t = params::USM_SIGMA_DEFAULT)]
    sigma: f64,

    /// Amount of detail added back (0.2-4.0)
    #[arg(short = 'a', long, default_value_t = params::USM_SHARPNESS_DEFAULT)]
    sharpness: f64,

    /// Gradient magnitude below which pixels are left alone
    #[arg(short, long, default_value_t = params::USM_T_C_DEFAULT)]
    threshold: f64,
}

/// Arguments for the `run` command.
#[derive(Args)]
struct RunArgs {
    /// Recipe file (YAML)
    recipe: PathBuf,

    #[command(flatten)]
    io: IoArgs,
}

/// Arguments for the `batch` command.
#[derive(Args)]
struct BatchArgs {
    /// Input glob pattern (e.g. "shots/*.png")
    #[arg(short, long)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Recipe file applied to every input
    #[arg(short, long, conflicts_with = "op")]
    recipe: Option<PathBuf>,

    /// Single operation instead of a recipe (gray, blur, canny, ...)
    #[arg(long)]
    op: Option<String>,

    /// Operation parameters as key=value
    #[arg(short, long)]
    args: Vec<String>,

    /// Output extension (default: same as input)
    #[arg(short, long)]
    format: Option<String>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let border = cli.border;
    let verbose = cli.verbose;
    match cli.command {
        Commands::Info(args) => commands::info::run(args, verbose),
        Commands::Gray(args) => commands::adjust::run_gray(args, border, verbose),
        Commands::Quantize(args) => commands::adjust::run_quantize(args, border, verbose),
        Commands::Cross(args) => commands::adjust::run_cross(args, border, verbose),
        Commands::Brightness(args) => commands::adjust::run_brightness(args, border, verbose),
        Commands::Contrast(args) => commands::adjust::run_contrast(args, border, verbose),
        Commands::RobustContrast(args) => {
            commands::adjust::run_robust_contrast(args, border, verbose)
        }
        Commands::Filter(args) => commands::filter::run_filter(args, border, verbose),
        Commands::Blur(args) => commands::filter::run_blur(args, border, verbose),
        Commands::Canny(args) => commands::edges::run_canny(args, border, verbose),
        Commands::Usm(args) => commands::edges::run_usm(args, border, verbose),
        Commands::Run(args) => commands::recipe::run(args, border, verbose),
        Commands::Batch(args) => commands::batch::run(args, border, verbose),
    }
}

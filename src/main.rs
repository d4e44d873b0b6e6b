use clap::{Parser, Subcommand};
use covercrop::pipeline::Framing;
use covercrop::{config, output, pipeline, rust_backend};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "covercrop")]
#[command(about = "Crop cover images to a fixed square with a byte budget")]
#[command(long_about = "\
Crop cover images to a fixed square with a byte budget

Every cover becomes a square of the configured side length (default 400px),
encoded as JPEG and re-encoded at decreasing quality until it fits the
configured byte budget.

Framing without a pointer:

  --zoom    magnification in [1, 3]; 1 shows as much of the image as the
            square allows, 3 shows a third of that
  --focus   x,y fractions of the pannable range: 0,0 is the top-left of
            the image, 1,1 the bottom-right, 0.5,0.5 (default) the center

Both are clamped the same way an interactive drag would be - the output can
never show past the image edge.

Run 'covercrop gen-config' to generate a documented crop.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = "crop.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Shared framing flags for crop commands.
#[derive(clap::Args, Clone, Copy)]
struct FramingArgs {
    /// Zoom factor, clamped to [1, 3]
    #[arg(long, default_value_t = 1.0, value_parser = parse_zoom)]
    zoom: f64,

    /// Focus point as "x,y" fractions of the pannable range
    #[arg(long, default_value = "0.5,0.5", value_parser = parse_focus)]
    focus: (f64, f64),
}

impl From<FramingArgs> for Framing {
    fn from(args: FramingArgs) -> Self {
        Framing {
            zoom: args.zoom,
            focus: args.focus,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Crop a single image
    Crop {
        /// Source image (jpg, png, webp)
        source: PathBuf,
        /// Output path (default: source stem + "-cover.jpg")
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        framing: FramingArgs,
    },
    /// Crop every image in a directory
    Batch {
        /// Input directory, walked recursively
        input: PathBuf,
        /// Output directory for cropped covers and report.json
        #[arg(long, default_value = "covers")]
        output: PathBuf,
        #[command(flatten)]
        framing: FramingArgs,
    },
    /// Print a stock crop.toml with all options documented
    GenConfig,
}

// The crop core assumes finite inputs; the CLI is where that gets enforced.

fn parse_zoom(s: &str) -> Result<f64, String> {
    let zoom: f64 = s.parse().map_err(|_| format!("bad zoom '{s}'"))?;
    if !zoom.is_finite() {
        return Err(format!("zoom must be a finite number, got '{s}'"));
    }
    Ok(zoom)
}

fn parse_focus(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got '{s}'"))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("bad focus x '{x}'"))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("bad focus y '{y}'"))?;
    if !x.is_finite() || !y.is_finite() {
        return Err(format!("focus must be finite numbers, got '{s}'"));
    }
    Ok((x, y))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Crop {
            source,
            output: out_path,
            framing,
        } => {
            let config = config::CropConfig::load_or_default(&cli.config)?;
            let backend = rust_backend::RustBackend::new();
            let out_path = out_path.unwrap_or_else(|| default_output(&source));
            let report =
                pipeline::crop_file(&backend, &source, &out_path, framing.into(), &config)?;
            for line in output::format_crop_summary(&report) {
                println!("{line}");
            }
        }
        Command::Batch {
            input,
            output: out_dir,
            framing,
        } => {
            let config = config::CropConfig::load_or_default(&cli.config)?;
            init_thread_pool(&config.processing);
            let backend = rust_backend::RustBackend::new();

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    if let Some(line) = output::format_batch_event(&event) {
                        println!("{line}");
                    }
                }
            });

            println!("==> Cropping {} → {}", input.display(), out_dir.display());
            let report =
                pipeline::batch(&backend, &input, &out_dir, framing.into(), &config, Some(tx))?;
            printer.join().unwrap();

            for line in output::format_batch_summary(&report) {
                println!("{line}");
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `art.png` next to the source becomes `art-cover.jpg` next to it too.
fn default_output(source: &std::path::Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "cover".to_string());
    source.with_file_name(format!("{stem}-cover.jpg"))
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

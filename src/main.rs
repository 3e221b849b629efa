use clap::{Parser, Subcommand};
use image_styler::{SessionStore, StyleEngine, UserId, config, output};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// The CLI drives a single local session.
const LOCAL_USER: UserId = UserId(0);

#[derive(Parser)]
#[command(name = "image-styler")]
#[command(about = "Apply a named visual style to an image")]
#[command(long_about = "\
Apply a named visual style to an image

Styles:
  ghibli       soft, dreamlike aesthetic
  contour      outlined edges
  vintage      old-time feel
  watercolor   painterly effect
  random       any of the above

Quality tiers scale the styled result:
  low = 50%, medium = 75%, high = 100% (default)

Output is always PNG. Set RUST_LOG=debug for engine tracing.")]
#[command(version)]
struct Cli {
    /// Config file (see `gen-config`); stock defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct ApplyArgs {
    /// Source image (JPEG, PNG, TIFF, WebP, GIF, BMP)
    #[arg(long, short)]
    input: PathBuf,

    /// Style name: ghibli, contour, vintage, watercolor or random
    #[arg(long, short)]
    style: String,

    /// Quality tier: low, medium or high
    #[arg(long, short)]
    quality: Option<String>,

    /// Output PNG path; defaults to `<style>_image.png`
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Style an image and write the result as PNG
    Apply(ApplyArgs),
    /// List available styles and quality tiers
    Styles,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Apply(args) => {
            let styler_config = config::load_config(cli.config.as_deref())?;
            init_thread_pool(&styler_config.processing);

            let engine = StyleEngine::from_config(Arc::new(SessionStore::new()), &styler_config);
            let bytes = std::fs::read(&args.input)?;
            let source = engine.upload_image(LOCAL_USER, &bytes)?;
            if let Some(quality) = &args.quality {
                engine.select_quality(LOCAL_USER, quality)?;
            }

            let styled = engine.apply_style(LOCAL_USER, &args.style)?;
            let output_path = args
                .output
                .unwrap_or_else(|| PathBuf::from(styled.file_name()));
            std::fs::write(&output_path, styled.encode_png()?)?;
            output::print_apply_result(&styled, source, &output_path);
        }
        Command::Styles => {
            output::print_catalog();
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so stdout carries only command output. `RUST_LOG` overrides
/// the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

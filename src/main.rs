use clap::{Parser, Subcommand};
use log::error;
use photo_ingest::config::{self, IngestConfig};
use photo_ingest::{logging, output, process};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photo-ingest")]
#[command(about = "Convert author-attributed photos into deduplicated, tagged JPEGs")]
#[command(long_about = "\
Convert author-attributed photos into deduplicated, tagged JPEGs

Each subfolder of the input directory is an author. Every supported image
inside is converted to JPEG, tagged with Artist, ImageDescription and
Copyright, and written to the output directory under a unique name. A ledger
of content hashes makes re-runs skip anything already converted.

Input structure:

  input-images/
  ├── alice/
  │   ├── IMG_0042.HEIC     → output/alice_20240319_142501_IMG_0042_3fa9c2d1.jpg
  │   └── scan.png          → output/alice_20240319_142502_scan_9b0e44a7.jpg
  ├── bob/
  │   └── holiday.webp      → output/bob_..._holiday_....jpg
  └── stray.jpg             (no author folder: not converted)

Supported: .heic .heif (with the `heic` feature) .jpg .jpeg .png .bmp .tiff .tif .webp

Logging: set PHOTO_INGEST_LOG (e.g. PHOTO_INGEST_LOG=debug) to change verbosity.

Run 'photo-ingest gen-config' to generate a documented photo-ingest.toml.")]
#[command(version)]
struct Cli {
    /// Config file [default: photo-ingest.toml, if present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Input directory (overrides config)
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Ledger file (overrides config)
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Convert every new image (default)
    Run,
    /// Show what a run would do without writing anything
    Check,
    /// Print a stock photo-ingest.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let command = cli.command.as_ref().unwrap_or(&Command::Run);
    if let Command::GenConfig = command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = resolve_config(&cli)?;

    match command {
        Command::Run => {
            logging::log_capabilities();
            let summary = process::ingest(&config).inspect_err(|e| error!("{}", e))?;
            output::print_summary(&summary);
        }
        Command::Check => {
            println!("==> Checking {}", config.input_dir.display());
            let plan = process::plan(&config).inspect_err(|e| error!("{}", e))?;
            output::print_plan(&plan);
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Config file (explicit or default) merged over stock values, then CLI
/// path overrides.
fn resolve_config(cli: &Cli) -> Result<IngestConfig, config::ConfigError> {
    let loaded = match &cli.config {
        Some(path) => config::load_required_config(path)?,
        None => config::load_config(std::path::Path::new(config::DEFAULT_CONFIG_FILE))?,
    };
    let config = loaded.with_overrides(cli.input.clone(), cli.output.clone(), cli.ledger.clone());
    config.validate()?;
    Ok(config)
}

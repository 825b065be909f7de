//! Journal Archiver CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use journal_archiver::{
    error::{AppError, Result},
    models::{Catalogue, Config},
    pipeline,
    storage::LocalStorage,
    utils::http::HttpFetcher,
};

/// Journal Archiver - archive crawler and PDF downloader
#[derive(Parser, Debug)]
#[command(
    name = "journal-archiver",
    version,
    about = "Catalogue a journal archive and download its article PDFs"
)]
struct Cli {
    /// Directory containing config.toml and catalogue.json
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover issues and extract their articles into catalogue.json
    Catalogue {
        /// Overwrite an existing catalogue
        #[arg(long)]
        force: bool,
    },

    /// Download every article PDF listed in the catalogue
    Download {
        /// Path to catalogue file (default: {data_dir}/catalogue.json)
        #[arg(long)]
        catalogue: Option<PathBuf>,

        /// Output directory (default: download.output_dir from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run full pipeline: Catalogue → Download
    Pipeline {
        /// Skip discovery, use existing catalogue
        #[arg(long)]
        skip_catalogue: bool,
    },

    /// Validate configuration
    Validate,

    /// Show catalogue and output directory info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.data_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    let catalogue_path = cli.data_dir.join("catalogue.json");
    let output_dir = PathBuf::from(&config.download.output_dir);

    match cli.command {
        Command::Catalogue { force } => {
            if catalogue_path.exists() && !force {
                log::warn!(
                    "Catalogue already exists at {}. Use --force to overwrite.",
                    catalogue_path.display()
                );
                return Ok(());
            }

            config.validate()?;
            let fetcher = HttpFetcher::from_config(&config.crawler)?;
            let (catalogue, stats) = pipeline::run_catalogue(&config, &fetcher).await?;
            catalogue.save(&catalogue_path)?;
            log::info!("Catalogue saved to {}", catalogue_path.display());

            if stats.issue_failures > 0 {
                return Err(AppError::Incomplete {
                    failed: stats.issue_failures,
                    total: stats.issue_count,
                });
            }
        }

        Command::Download { catalogue, output } => {
            let catalogue_path = catalogue.unwrap_or(catalogue_path);
            if !catalogue_path.exists() {
                log::error!(
                    "Catalogue not found at {}. Run 'catalogue' first.",
                    catalogue_path.display()
                );
                return Err(AppError::config("Catalogue not found"));
            }

            config.validate()?;
            let catalogue = Catalogue::load(&catalogue_path)?;
            let storage = LocalStorage::new(output.unwrap_or(output_dir));
            let fetcher = HttpFetcher::from_config(&config.crawler)?;

            let report = pipeline::run_download(&config, &fetcher, &storage, &catalogue).await?;
            if !report.is_complete() {
                return Err(AppError::Incomplete {
                    failed: report.failed(),
                    total: report.attempted,
                });
            }
        }

        Command::Pipeline { skip_catalogue } => {
            if skip_catalogue && !catalogue_path.exists() {
                return Err(AppError::config(
                    "Cannot skip catalogue: catalogue.json not found",
                ));
            }

            config.validate()?;
            let storage = LocalStorage::new(output_dir);
            let fetcher = HttpFetcher::from_config(&config.crawler)?;

            let report = pipeline::run_pipeline(
                &config,
                &fetcher,
                &storage,
                &catalogue_path,
                skip_catalogue,
            )
            .await?;
            if !report.is_complete() {
                return Err(AppError::Incomplete {
                    failed: report.failed(),
                    total: report.total(),
                });
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (selector, patterns, and output directory)");
        }

        Command::Info => {
            log::info!("Data directory: {}", cli.data_dir.display());
            log::info!("Output directory: {}", output_dir.display());

            if catalogue_path.exists() {
                let catalogue = Catalogue::load(&catalogue_path)?;
                if let Some(generated) = catalogue.generated_at {
                    log::info!("Catalogue generated: {}", generated.to_rfc3339());
                }
                log::info!(
                    "Catalogue: {} volumes, {} issues, {} articles",
                    catalogue.volumes.len(),
                    catalogue.issue_count(),
                    catalogue.article_count()
                );
            } else {
                log::info!("No catalogue found yet.");
            }
        }
    }

    log::info!("Done!");

    Ok(())
}

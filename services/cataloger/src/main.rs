//! ESM catalog builder service.
//!
//! Crawls object storage for Zarr stores, derives catalog attributes from
//! their paths and writes intake-esm catalogs (CSV + JSON collection).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cataloger::{parse_paths, CatalogPipeline, CatalogerConfig, LoggingSettings, ParserKind};
use catalog_builder::update_catalog_file_key;
use storage::{ObjectStorageConfig, StorageResolver};

#[derive(Parser, Debug)]
#[command(name = "cataloger")]
#[command(about = "Builds intake-esm catalogs from cloud-stored Zarr data")]
struct Args {
    /// Configuration directory (contains cataloger.yaml and catalogs/*.yaml)
    #[arg(long, env = "CONFIG_DIR", default_value = "config", global = true)]
    config_dir: PathBuf,

    /// Log level (overrides cataloger.yaml)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format: json or pretty (overrides cataloger.yaml)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build, clean and save enabled catalogs, then publish their catalog files
    Build {
        /// Specific catalog to build (default: all enabled)
        #[arg(short, long)]
        catalog: Option<String>,

        /// Write catalogs here instead of the configured directory (skips publishing)
        #[arg(long)]
        output_dir: Option<String>,
    },

    /// Parse asset paths and print the outcomes as JSON
    Parse {
        #[arg(required = true)]
        paths: Vec<String>,

        #[arg(long, value_enum, default_value_t = ParserKind::Renewables)]
        parser: ParserKind,

        /// Root prefix to strip (default: the collection's bucket)
        #[arg(long)]
        root: Option<String>,
    },

    /// List configured catalogs
    List,

    /// Point the catalog_file key of <directory>/<name>.json at <https-url>/<name>.csv
    UpdateCatalogFile {
        #[arg(long)]
        directory: String,

        #[arg(long)]
        https_url: String,

        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    match args.command {
        Command::Build {
            ref catalog,
            ref output_dir,
        } => {
            let config = load_config(&args.config_dir)?;
            init_tracing(&args, &config.logging)?;
            build(&config, catalog.as_deref(), output_dir.as_deref()).await
        }
        Command::Parse {
            ref paths,
            parser,
            ref root,
        } => {
            init_tracing(&args, &LoggingSettings::default())?;
            let rows = parse_paths(parser, root.as_deref(), paths)?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
            Ok(())
        }
        Command::List => {
            let config = load_config(&args.config_dir)?;
            for job in &config.catalogs {
                println!(
                    "{}\t{}\t{}\t{}",
                    job.id,
                    job.parser,
                    if job.enabled { "enabled" } else { "disabled" },
                    job.export.directory
                );
            }
            Ok(())
        }
        Command::UpdateCatalogFile {
            ref directory,
            ref https_url,
            ref name,
        } => {
            init_tracing(&args, &LoggingSettings::default())?;
            let resolver = StorageResolver::new(ObjectStorageConfig::from_env());
            let catalog_file = update_catalog_file_key(directory, https_url, name, &resolver)
                .await
                .context("Failed to update catalog_file")?;
            println!("{}", catalog_file);
            Ok(())
        }
    }
}

fn load_config(config_dir: &Path) -> Result<CatalogerConfig> {
    CatalogerConfig::from_yaml(config_dir)
        .with_context(|| format!("Failed to load configuration from {:?}", config_dir))
}

async fn build(config: &CatalogerConfig, catalog: Option<&str>, output_dir: Option<&str>) -> Result<()> {
    let mut jobs = match catalog {
        Some(id) => {
            let job = config
                .catalog(id)
                .with_context(|| format!("Unknown catalog '{}'", id))?;
            vec![job.clone()]
        }
        None => config.enabled_catalogs().cloned().collect(),
    };

    if let Some(dir) = output_dir {
        for job in &mut jobs {
            job.redirect_output(dir);
        }
    }

    info!(catalogs = ?jobs.iter().map(|j| j.id.as_str()).collect::<Vec<_>>(), "Starting catalog build");

    let pipeline = CatalogPipeline::new(&config.storage);
    let summaries = pipeline.run_all(&jobs).await?;

    for summary in &summaries {
        println!("{}", serde_json::to_string(summary)?);
    }
    Ok(())
}

fn init_tracing(args: &Args, logging: &LoggingSettings) -> Result<()> {
    let level_name = args.log_level.as_deref().unwrap_or(&logging.level);
    let level = match level_name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    match args.log_format.as_deref().unwrap_or(&logging.format) {
        "json" => tracing::subscriber::set_global_default(builder.json().finish())?,
        _ => tracing::subscriber::set_global_default(builder.pretty().finish())?,
    }

    Ok(())
}

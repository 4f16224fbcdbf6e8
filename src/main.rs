use anyhow::{Context, Result};
use clap::Parser;
use songplays_etl::config::{AppConfig, CliConfig, FileConfig};
use songplays_etl::pipeline::run_load;
use songplays_etl::warehouse::{InMemoryWarehouseStore, SqliteWarehouseStore, WarehouseStore};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

#[derive(Parser, Debug)]
#[clap(version = VERSION, about = "Load song and log data into the songplays warehouse")]
struct CliArgs {
    /// Root directory of the song metadata files.
    #[clap(long)]
    pub song_data: Option<PathBuf>,

    /// Root directory of the event log files.
    #[clap(long)]
    pub log_data: Option<PathBuf>,

    /// Path to the SQLite warehouse database file.
    #[clap(long)]
    pub db_path: Option<PathBuf>,

    /// Largest difference in seconds between a play's length and a song's
    /// duration that still counts as the same song.
    #[clap(long)]
    pub duration_tolerance: Option<f64>,

    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Run the load against an in-memory warehouse and discard the result.
    #[clap(long)]
    pub dry_run: bool,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    info!("songplays-etl {}", VERSION);

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };

    let cli_config = CliConfig {
        song_data_dir: cli_args.song_data,
        log_data_dir: cli_args.log_data,
        db_path: cli_args.db_path,
        duration_tolerance: cli_args.duration_tolerance,
        dry_run: cli_args.dry_run,
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    let mut store: Box<dyn WarehouseStore> = if app_config.dry_run {
        warn!("Dry run: rows are loaded into memory and discarded");
        Box::new(InMemoryWarehouseStore::new())
    } else {
        info!("Opening SQLite warehouse at {:?}...", app_config.db_path);
        let store = SqliteWarehouseStore::new(&app_config.db_path, app_config.statements.clone())
            .with_context(|| format!("Failed to open warehouse at {:?}", app_config.db_path))?;
        Box::new(store)
    };

    let report = run_load(store.as_mut(), &app_config.load_plan());
    info!("Load finished.\n{}", report);

    Ok(())
}
